//! PyInstaller bundler - freezes Python console entry points.
//!
//! This binary installs a Python project, freezes its entry points behind a
//! generated dispatcher and optionally packages the result as tar.gz, RPM and
//! DEB.

use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Run CLI and get exit code
    let exit_code = match pyinstaller_bundle::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  hint: {}", suggestion);
            }
            1
        }
    };

    process::exit(exit_code);
}
