//! `dispatcher` command: render the program without building.

use super::load_settings;
use crate::bundler::{DispatchTable, error::ErrorExt};
use crate::cli::args::DispatcherArgs;
use crate::error::Result;

/// Renders the dispatcher of the project to stdout or a file.
pub async fn execute_dispatcher(args: &DispatcherArgs) -> Result<i32> {
    let settings = load_settings(&args.project, |builder, manifest| {
        builder.bundle_settings(manifest.bundle_settings.clone())
    })?;
    let source = DispatchTable::from_settings(&settings)?.render()?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, source)
                .await
                .fs_context("writing dispatcher", path)?;
            log::info!("Wrote dispatcher to {}", path.display());
            println!("{}", path.display());
        }
        None => print!("{source}"),
    }
    Ok(0)
}
