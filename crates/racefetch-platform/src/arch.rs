//! Architecture identification.

use std::fmt;

/// CPU architecture types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86,
    X86_64,
    Arm,
    Arm64,
    Other,
}

impl Arch {
    /// Accepts both Rust (`x86_64`, `aarch64`) and Go (`amd64`, `arm64`)
    /// spellings, since release assets use either.
    pub fn from_name(name: &str) -> Self {
        match name {
            "x86" | "i386" | "i686" | "386" => Self::X86,
            "x86_64" | "amd64" => Self::X86_64,
            "arm" | "armv7l" => Self::Arm,
            "aarch64" | "arm64" => Self::Arm64,
            _ => Self::Other,
        }
    }

    pub fn current() -> Self {
        Self::from_name(std::env::consts::ARCH)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Arm => "arm",
            Self::Arm64 => "aarch64",
            Self::Other => std::env::consts::ARCH,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
