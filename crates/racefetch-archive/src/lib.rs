//! Archive extraction for downloaded payloads.
//!
//! # Architecture
//!
//! - `format.rs` - Payload layout from the trailing file name
//! - `codec.rs` - Optional gzip unwrap
//! - `sanitize.rs` - Separator normalization and zip-slip prevention
//! - `extract/` - Shared entry loop plus tar (streaming) and zip (buffered) sources

pub use entry::{ArchiveReport, Entry, EntryKind};
pub use error::{Error, Result};
pub use extract::{extract_payload, extract_plain, extract_tar, extract_zip};
pub use format::{ArchiveFormat, Payload};
pub use options::{ExtractOptions, SymlinkPolicy};
pub use sanitize::{
    SanitizedPath, normalize_separators, resolves_inside, sanitize_path, sanitize_symlink_target,
};

mod codec;
pub mod entry;
mod error;
pub mod extract;
mod format;
mod options;
mod sanitize;
