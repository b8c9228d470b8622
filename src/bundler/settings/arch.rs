//! CPU architecture types and utilities.

/// CPU architecture of the machine the bundle is frozen on.
///
/// PyInstaller cannot cross-compile, so the bundle architecture is always the
/// host's. It is detected from the target triple or `std::env::consts::ARCH`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arch {
    /// x86_64 / AMD64 (64-bit)
    X86_64,
    /// x86 / i686 (32-bit)
    X86,
    /// AArch64 / ARM64 (64-bit)
    AArch64,
    /// ARM with hard-float (32-bit)
    Armhf,
    /// ARM with soft-float (32-bit)
    Armel,
    /// RISC-V (64-bit)
    Riscv64,
}

impl Arch {
    /// Parses a target triple or a bare architecture name.
    pub fn from_target(target: &str) -> Self {
        if target.starts_with("x86_64") || target.starts_with("amd64") {
            Self::X86_64
        } else if target.starts_with('i') || target == "x86" {
            Self::X86
        } else if target.starts_with("aarch64") || target.starts_with("arm64") {
            Self::AArch64
        } else if target.starts_with("arm") && target.ends_with("hf") {
            Self::Armhf
        } else if target.starts_with("arm") {
            Self::Armel
        } else if target.starts_with("riscv64") {
            Self::Riscv64
        } else {
            Self::X86_64 // fallback
        }
    }

    /// Architecture name in `BuildArch:` of an RPM spec.
    pub fn rpm_arch(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::X86 => "i686",
            Self::AArch64 => "aarch64",
            Self::Armhf => "armv7hl",
            Self::Armel => "armv7l",
            Self::Riscv64 => "riscv64",
        }
    }

    /// Debian architecture name.
    pub fn deb_arch(self) -> &'static str {
        match self {
            Self::X86_64 => "amd64",
            Self::X86 => "i386",
            Self::AArch64 => "arm64",
            Self::Armhf => "armhf",
            Self::Armel => "armel",
            Self::Riscv64 => "riscv64",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_triples_to_package_arch_names() {
        let arch = Arch::from_target("x86_64-unknown-linux-gnu");
        assert_eq!((arch.rpm_arch(), arch.deb_arch()), ("x86_64", "amd64"));

        let arch = Arch::from_target("aarch64");
        assert_eq!((arch.rpm_arch(), arch.deb_arch()), ("aarch64", "arm64"));

        assert_eq!(Arch::from_target("armv7-unknown-linux-gnueabihf"), Arch::Armhf);
        assert_eq!(Arch::from_target("x86"), Arch::X86);
    }
}
