//! Shared entry loop plus the per-format entry sources.
//!
//! Tar is consumed straight off the stream. Zip keeps its index at the end
//! of the file, so the zip source buffers the payload first and then walks
//! the central directory. Both present the same sequential `EntrySource` to
//! one extraction loop.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use racefetch_core::{Event, Phase, ProgressTracker, TrackedWriter};
use racefetch_fs::PermissionMode;

use crate::codec;
use crate::entry::{ArchiveReport, Entry, EntryKind};
use crate::error::{Error, Result};
use crate::format::{ArchiveFormat, Payload};
use crate::options::{ExtractOptions, SymlinkPolicy};
use crate::sanitize::{resolves_inside, sanitize_path, sanitize_symlink_target};

mod tar;
mod zip;

pub(crate) struct PendingEntry<R> {
    pub original_path: String,
    pub size: u64,
    pub mode: Option<u32>,
    pub kind: PendingKind<R>,
}

pub(crate) enum PendingKind<R> {
    File(R),
    Directory,
    Symlink { target: String },
    /// Entry type we do not materialize, with its name for diagnostics.
    Unsupported(String),
}

/// Lending iterator over archive entries. The reader of one entry must be
/// dropped before the next entry is requested.
pub(crate) trait EntrySource {
    type Reader<'a>: Read
    where
        Self: 'a;

    fn next_entry(&mut self) -> Option<Result<PendingEntry<Self::Reader<'_>>>>;

    fn format(&self) -> ArchiveFormat;
}

/// Detect the layout from `name` and extract `reader` into `dest`.
///
/// `dest` is created with its parents. Entries already written stay on disk
/// when a later one fails.
pub fn extract_payload<R: Read>(
    reader: R,
    dest: &Path,
    name: &str,
    options: &ExtractOptions,
) -> Result<ArchiveReport> {
    let payload = Payload::from_name(name);
    tracing::debug!(
        name,
        gzip = payload.gzip,
        format = %payload.format,
        dest = %dest.display(),
        "extracting payload"
    );

    let reader = codec::wrap_reader(reader, payload.gzip);

    match payload.format {
        ArchiveFormat::Tar => extract_tar(reader, dest, options),
        ArchiveFormat::Zip => extract_zip(reader, dest, options),
        ArchiveFormat::Plain => extract_plain(reader, dest, &payload.name, options),
    }
}

/// Stream a tar archive into `dest`, one header at a time.
pub fn extract_tar<R: Read>(reader: R, dest: &Path, options: &ExtractOptions) -> Result<ArchiveReport> {
    create_dir(dest)?;
    let mut archive = tar::TarArchive::new(reader);
    let source = archive.entries()?;
    extract_entries(source, dest, options, None)
}

/// Buffer a zip archive and extract it into `dest`.
///
/// Emits [`Event::Unzip`] once the payload is in memory, then reports
/// extraction progress as [`Event::UnzipProgress`] over the summed size of
/// all file entries.
pub fn extract_zip<R: Read>(reader: R, dest: &Path, options: &ExtractOptions) -> Result<ArchiveReport> {
    create_dir(dest)?;
    let mut source = zip::ZipSource::buffer(reader)?;
    let total = source.total_size()?;

    options.logger.log(&Event::Unzip {
        dir: dest.to_path_buf(),
    });

    let mut tracker = ProgressTracker::new(
        Phase::Unzip,
        Some(total),
        options.min_report_span,
        options.logger.clone(),
    );
    extract_entries(source, dest, options, Some(&mut tracker))
}

/// Save a non-archive payload as the single file `dest/name`.
pub fn extract_plain<R: Read>(
    mut reader: R,
    dest: &Path,
    name: &str,
    options: &ExtractOptions,
) -> Result<ArchiveReport> {
    create_dir(dest)?;
    let entry = PendingEntry {
        original_path: name.to_string(),
        size: 0,
        mode: None,
        kind: PendingKind::File(&mut reader),
    };
    let mut entry = write_entry(entry, dest, options, None)?;
    if let Some(path) = &entry.target_path {
        entry.size = fs::metadata(path)
            .map_err(|e| Error::extraction(path, e))?
            .len();
    }
    Ok(ArchiveReport::new(ArchiveFormat::Plain, vec![entry]))
}

fn extract_entries<S: EntrySource>(
    mut source: S,
    dest: &Path,
    options: &ExtractOptions,
    mut progress: Option<&mut ProgressTracker>,
) -> Result<ArchiveReport> {
    let format = source.format();
    let mut entries = Vec::new();

    while let Some(pending) = source.next_entry() {
        let entry = write_entry(pending?, dest, options, progress.as_deref_mut())?;
        entries.push(entry);
    }

    tracing::debug!(%format, entries = entries.len(), dest = %dest.display(), "extraction finished");
    Ok(ArchiveReport::new(format, entries))
}

fn write_entry<R: Read>(
    pending: PendingEntry<R>,
    dest: &Path,
    options: &ExtractOptions,
    progress: Option<&mut ProgressTracker>,
) -> Result<Entry> {
    let PendingEntry {
        original_path,
        size,
        mode,
        kind,
    } = pending;

    let target = sanitize_path(&original_path, dest)?.resolved;
    let root = fs::canonicalize(dest).map_err(|e| Error::extraction(dest, e))?;
    let permissions = if options.preserve_permissions {
        PermissionMode::from_archive(mode)
    } else {
        PermissionMode::Inherit
    };

    let kind = match kind {
        PendingKind::Directory => {
            ensure_inside(&original_path, &target, &root)?;
            create_dir(&target)?;
            permissions.for_directory().apply_to_path(&target)?;
            EntryKind::Directory
        }
        PendingKind::File(mut reader) => {
            if let Some(parent) = target.parent() {
                ensure_inside(&original_path, parent, &root)?;
                create_dir(parent)?;
            }
            // Replace a link left by an earlier entry instead of writing through it.
            if fs::symlink_metadata(&target).is_ok_and(|m| m.file_type().is_symlink()) {
                fs::remove_file(&target).map_err(|e| Error::extraction(&target, e))?;
            }
            let mut file = fs::File::create(&target).map_err(|e| Error::extraction(&target, e))?;
            let copied = match progress {
                Some(tracker) => io::copy(&mut reader, &mut TrackedWriter::new(&mut file, tracker)),
                None => io::copy(&mut reader, &mut file),
            };
            copied.map_err(|e| Error::extraction(&target, e))?;
            drop(file);
            permissions.apply_to_path(&target)?;
            EntryKind::File
        }
        PendingKind::Symlink { target: link_target } => {
            write_symlink(&original_path, &link_target, &target, dest, &root, options.symlinks)?
        }
        PendingKind::Unsupported(what) => {
            tracing::debug!(entry = %original_path, kind = %what, "skipping unsupported entry");
            EntryKind::Skipped
        }
    };

    tracing::debug!(entry = %original_path, target = %target.display(), size, "extracted entry");
    Ok(Entry::new(original_path, size, mode, kind).with_target_path(target))
}

fn write_symlink(
    original_path: &str,
    link_target: &str,
    link: &Path,
    dest: &Path,
    root: &Path,
    policy: SymlinkPolicy,
) -> Result<EntryKind> {
    match policy {
        SymlinkPolicy::Reject => return Err(Error::SymlinkRejected(original_path.to_string())),
        SymlinkPolicy::Skip => {
            tracing::debug!(entry = original_path, "skipping symlink");
            return Ok(EntryKind::Skipped);
        }
        SymlinkPolicy::Recreate => {}
    }

    let target = sanitize_symlink_target(link_target, link, dest)?;
    if let Some(parent) = link.parent() {
        ensure_inside(original_path, parent, root)?;
        let resolved = parent.join(&target);
        if !resolves_inside(&resolved, root) {
            return Err(Error::SymlinkEscape {
                target: link_target.to_string(),
                resolved,
            });
        }
    }

    if !cfg!(unix) {
        tracing::debug!(entry = original_path, "symlinks are only recreated on unix");
        return Ok(EntryKind::Skipped);
    }

    if let Some(parent) = link.parent() {
        create_dir(parent)?;
    }
    racefetch_fs::symlink(&target, link)?;
    Ok(EntryKind::Symlink { target })
}

/// `path` must not leave `root` through a link already on disk.
fn ensure_inside(entry: &str, path: &Path, root: &Path) -> Result<()> {
    if resolves_inside(path, root) {
        Ok(())
    } else {
        Err(Error::ZipSlip {
            entry: entry.to_string(),
            resolved: path.to_path_buf(),
        })
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
