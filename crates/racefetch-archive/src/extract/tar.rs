use std::io::Read;

use crate::error::{Error, Result};
use crate::extract::{EntrySource, PendingEntry, PendingKind};
use crate::format::ArchiveFormat;

pub struct TarArchive<R: Read> {
    archive: tar::Archive<R>,
}

impl<R: Read> TarArchive<R> {
    pub fn new(reader: R) -> Self {
        Self {
            archive: tar::Archive::new(reader),
        }
    }

    pub fn entries(&mut self) -> Result<TarSource<'_, R>> {
        let entries = self
            .archive
            .entries()
            .map_err(|e| Error::malformed(ArchiveFormat::Tar, e))?;
        Ok(TarSource { entries })
    }
}

pub struct TarSource<'a, R: 'a + Read> {
    entries: tar::Entries<'a, R>,
}

impl<'a, R: Read + 'a> EntrySource for TarSource<'a, R> {
    // Entries borrow the archive, not the source, so 'b is unused.
    type Reader<'b>
        = tar::Entry<'a, R>
    where
        Self: 'b;

    fn next_entry(&mut self) -> Option<Result<PendingEntry<Self::Reader<'_>>>> {
        match self.entries.next()? {
            Ok(entry) => Some(pending(entry)),
            Err(e) => Some(Err(Error::malformed(ArchiveFormat::Tar, e))),
        }
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Tar
    }
}

fn pending<'a, R: Read>(entry: tar::Entry<'a, R>) -> Result<PendingEntry<tar::Entry<'a, R>>> {
    // Raw bytes: `path()` would reinterpret backslashes on Windows hosts.
    let original_path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
    let size = entry.header().size().unwrap_or(0);
    let mode = entry.header().mode().ok();
    let entry_type = entry.header().entry_type();

    let kind = if entry_type.is_dir() {
        PendingKind::Directory
    } else if entry_type.is_symlink() {
        let target = entry
            .link_name_bytes()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .ok_or_else(|| Error::InvalidPath(original_path.clone()))?;
        PendingKind::Symlink { target }
    } else if entry_type.is_file() || entry_type.is_contiguous() {
        PendingKind::File(entry)
    } else {
        PendingKind::Unsupported(format!("{entry_type:?}"))
    };

    Ok(PendingEntry {
        original_path,
        size,
        mode,
        kind,
    })
}
