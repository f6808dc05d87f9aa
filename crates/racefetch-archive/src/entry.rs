use std::path::PathBuf;

use crate::format::ArchiveFormat;

/// An entry that was materialized (or deliberately skipped) during extraction.
#[derive(Clone, Debug)]
pub struct Entry {
    /// Name as stored in the archive, before separator normalization.
    pub original_path: String,
    pub target_path: Option<PathBuf>,
    pub size: u64,
    pub mode: Option<u32>,
    pub kind: EntryKind,
}

impl Entry {
    pub fn new(original_path: impl Into<String>, size: u64, mode: Option<u32>, kind: EntryKind) -> Self {
        Self {
            original_path: original_path.into(),
            target_path: None,
            size,
            mode,
            kind,
        }
    }

    pub fn with_target_path(mut self, target_path: PathBuf) -> Self {
        self.target_path = Some(target_path);
        self
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self.kind, EntryKind::Symlink { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink { target: PathBuf },
    /// Hard links, devices, fifos and symlinks under [`SymlinkPolicy::Skip`](crate::SymlinkPolicy::Skip).
    Skipped,
}

#[derive(Clone, Debug)]
pub struct ArchiveReport {
    pub format: ArchiveFormat,
    pub entry_count: usize,
    pub total_bytes: u64,
    pub entries: Vec<Entry>,
}

impl ArchiveReport {
    pub fn new(format: ArchiveFormat, entries: Vec<Entry>) -> Self {
        let total_bytes = entries.iter().filter(|e| e.is_file()).map(|e| e.size).sum();
        Self {
            format,
            entry_count: entries.len(),
            total_bytes,
            entries,
        }
    }

    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_file())
    }
}
