use crate::{Error, Result};
use std::path::Path;

/// Permission bits to apply to an extracted entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PermissionMode {
    /// Keep whatever the platform assigned on creation.
    #[default]
    Inherit,

    /// Unix mode bits (e.g. `0o755`).
    ///
    /// On Windows only the owner write bit matters: without it the path is
    /// marked read-only.
    Custom(u32),
}

impl PermissionMode {
    /// Build from archive metadata, dropping file-type bits.
    pub fn from_archive(mode: Option<u32>) -> Self {
        match mode {
            Some(mode) => Self::Custom(mode & 0o7777),
            None => Self::Inherit,
        }
    }

    /// Directories must stay traversable and writable by the owner so the
    /// rest of the archive can be written into them.
    pub fn for_directory(self) -> Self {
        match self {
            Self::Custom(mode) => Self::Custom(mode | 0o700),
            Self::Inherit => Self::Inherit,
        }
    }

    /// Apply the mode to an existing file or directory.
    pub fn apply_to_path(self, path: &Path) -> Result<()> {
        let mode = match self {
            Self::Inherit => return Ok(()),
            Self::Custom(mode) => mode,
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
                Error::Write {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }

        #[cfg(windows)]
        {
            let mut perms = std::fs::metadata(path)
                .map_err(|e| Error::Read {
                    path: path.to_path_buf(),
                    source: e,
                })?
                .permissions();
            perms.set_readonly(mode & 0o200 == 0);
            std::fs::set_permissions(path, perms).map_err(|e| Error::Write {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        Ok(())
    }
}
