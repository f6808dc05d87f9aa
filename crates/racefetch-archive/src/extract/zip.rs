use std::io::{Cursor, Read, Seek};

use crate::error::{Error, Result};
use crate::extract::{EntrySource, PendingEntry, PendingKind};
use crate::format::ArchiveFormat;

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

pub struct ZipSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
    index: usize,
}

impl ZipSource<Cursor<Vec<u8>>> {
    /// Read the whole payload into memory and open its central directory.
    pub fn buffer<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| Error::malformed(ArchiveFormat::Zip, e))?;
        tracing::debug!(bytes = buf.len(), "buffered zip payload");
        Self::new(Cursor::new(buf))
    }
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader)?;
        Ok(Self { archive, index: 0 })
    }

    /// Uncompressed bytes of all regular files. Directories and symlinks do
    /// not pass through the progress writer, so they are left out.
    pub fn total_size(&mut self) -> Result<u64> {
        let mut total = 0;
        for i in 0..self.archive.len() {
            let file = self.archive.by_index_raw(i)?;
            if !file.is_dir() && !is_symlink(file.unix_mode()) {
                total += file.size();
            }
        }
        Ok(total)
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    type Reader<'a>
        = zip::read::ZipFile<'a, R>
    where
        Self: 'a;

    fn next_entry(&mut self) -> Option<Result<PendingEntry<Self::Reader<'_>>>> {
        if self.index >= self.archive.len() {
            return None;
        }
        let index = self.index;
        self.index += 1;
        Some(open(&mut self.archive, index))
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }
}

fn open<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    index: usize,
) -> Result<PendingEntry<zip::read::ZipFile<'_, R>>> {
    let mut file = archive.by_index(index)?;

    // `name()` is the stored name; `enclosed_name()` would drop what we
    // want to reject loudly.
    let original_path = file.name().to_string();
    let size = file.size();
    let mode = file.unix_mode();

    let kind = if file.is_dir() {
        PendingKind::Directory
    } else if is_symlink(mode) {
        let mut target = String::new();
        file.read_to_string(&mut target)
            .map_err(|e| Error::malformed(ArchiveFormat::Zip, e))?;
        PendingKind::Symlink { target }
    } else {
        PendingKind::File(file)
    };

    Ok(PendingEntry {
        original_path,
        size,
        mode,
        kind,
    })
}

fn is_symlink(mode: Option<u32>) -> bool {
    mode.is_some_and(|m| m & S_IFMT == S_IFLNK)
}
