//! Platform naming for downloaded tool bundles.
//!
//! Everything here is a pure function of an explicit [`Platform`] value;
//! only [`Platform::current`] and [`dir::user_cache_dir`] look at the host.

pub mod arch;
pub mod dir;
pub mod os;

pub use arch::Arch;
pub use dir::{cache_dir, user_cache_dir};
pub use os::Os;

/// Target operating system and CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Self {
            os: Os::current(),
            arch: Arch::current(),
        }
    }

    /// Suffix of executables, e.g. `.exe` on Windows and empty elsewhere.
    pub fn executable_ext(&self) -> &'static str {
        match self.os {
            Os::Windows => ".exe",
            _ => "",
        }
    }

    /// Archive suffix release bundles conventionally use.
    pub fn bundle_ext(&self) -> &'static str {
        match self.os {
            Os::Windows => ".zip",
            _ => ".tar.gz",
        }
    }

    /// `name` with the executable suffix appended.
    pub fn executable_name(&self, name: &str) -> String {
        format!("{name}{}", self.executable_ext())
    }
}
