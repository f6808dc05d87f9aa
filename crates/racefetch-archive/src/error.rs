use std::io;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::format::ArchiveFormat;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("zip-slip attack detected: entry '{entry}' resolves to '{resolved}'")]
    ZipSlip { entry: String, resolved: PathBuf },

    #[error("symlink target escapes base directory: '{target}' -> '{resolved}'")]
    SymlinkEscape { target: String, resolved: PathBuf },

    #[error("symlink target is absolute path: '{target}' in '{symlink}'")]
    AbsoluteSymlinkTarget { target: String, symlink: PathBuf },

    #[error("symlink entry '{0}' rejected")]
    SymlinkRejected(String),

    #[error("entry path is invalid: {0:?}")]
    InvalidPath(String),

    #[error("gzip decode failed: {0}")]
    Decode(io::Error),

    #[error("malformed {archive} archive: {source}")]
    Malformed {
        archive: ArchiveFormat,
        source: io::Error,
    },

    #[error("malformed zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Fs(#[from] racefetch_fs::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Error while reading archive structure. Failures of the payload
    /// reader itself stay plain I/O errors.
    pub(crate) fn malformed(archive: ArchiveFormat, source: io::Error) -> Self {
        if codec::is_decode_error(&source) {
            Self::Decode(source)
        } else if codec::is_upstream_error(&source) {
            Self::Io(source)
        } else {
            Self::Malformed { archive, source }
        }
    }

    /// Error while copying an entry's bytes to `path`.
    pub(crate) fn extraction(path: &Path, source: io::Error) -> Self {
        if codec::is_decode_error(&source) {
            Self::Decode(source)
        } else if codec::is_upstream_error(&source) {
            Self::Io(source)
        } else {
            Self::ExtractionFailed {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
