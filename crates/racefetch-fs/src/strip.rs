use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Replace the single top-level directory under `dir` with its children.
///
/// Release archives commonly wrap everything in one versioned folder
/// (`tool-1.2.3/bin/tool`); after this call `dir/bin/tool` exists and the
/// wrapper is gone. Regular files next to the wrapper are left alone.
///
/// Fails without touching the filesystem when `dir` holds no directory or
/// more than one. A child that would overwrite an existing entry of `dir`
/// fails the call, and the children already moved go back into the
/// wrapper. Not atomic: run it after extraction has finished.
pub fn strip_first_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    let wrapper = single_dir(dir)?;

    // Park the wrapper first so a child sharing its name can move up. The
    // parking dir is kept so a failure never deletes what is still inside.
    let parking = tempfile::Builder::new()
        .prefix(".strip-")
        .tempdir_in(dir)
        .map_err(|e| Error::Write {
            path: dir.to_path_buf(),
            source: e,
        })?
        .keep();
    let parked = parking.join("root");
    if let Err(e) = rename(&wrapper, &parked) {
        let _ = fs::remove_dir(&parking);
        return Err(e);
    }

    let mut moved = Vec::new();
    if let Err(e) = hoist(&parked, dir, &mut moved) {
        restore(dir, &wrapper, &parking, &moved);
        return Err(e);
    }

    remove_dir(&parked)?;
    remove_dir(&parking)?;

    tracing::debug!(dir = %dir.display(), wrapper = %wrapper.display(), "stripped top-level directory");
    Ok(())
}

/// Move every child of `parked` into `dir`, recording the names moved.
fn hoist(parked: &Path, dir: &Path, moved: &mut Vec<OsString>) -> Result<()> {
    for child in read_dir(parked)? {
        let name = child.file_name();
        let to = dir.join(&name);
        if fs::symlink_metadata(&to).is_ok() {
            return Err(Error::Rename {
                from: child.path(),
                to,
                source: io::ErrorKind::AlreadyExists.into(),
            });
        }
        rename(&child.path(), &to)?;
        moved.push(name);
    }
    Ok(())
}

/// Undo a partial [`hoist`] and put the wrapper back where it was.
fn restore(dir: &Path, wrapper: &Path, parking: &Path, moved: &[OsString]) {
    let parked = parking.join("root");
    let mut restored = true;
    for name in moved.iter().rev() {
        if let Err(e) = fs::rename(dir.join(name), parked.join(name)) {
            tracing::warn!(entry = ?name, error = %e, "failed to move entry back");
            restored = false;
        }
    }
    if let Err(e) = fs::rename(&parked, wrapper) {
        tracing::warn!(
            parked = %parked.display(),
            error = %e,
            "failed to restore wrapper directory; contents left in place"
        );
        return;
    }
    if restored {
        let _ = fs::remove_dir(parking);
    }
}

fn single_dir(dir: &Path) -> Result<PathBuf> {
    let mut dirs = Vec::new();
    for entry in read_dir(dir)? {
        let file_type = entry.file_type().map_err(|e| Error::Read {
            path: entry.path(),
            source: e,
        })?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        }
    }

    match dirs.len() {
        0 => Err(Error::NoDirectory(dir.to_path_buf())),
        1 => Ok(dirs.remove(0)),
        count => Err(Error::AmbiguousDirectory {
            dir: dir.to_path_buf(),
            count,
        }),
    }
}

fn read_dir(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let read_err = |e| Error::Read {
        path: dir.to_path_buf(),
        source: e,
    };
    fs::read_dir(dir)
        .map_err(read_err)?
        .collect::<io::Result<Vec<_>>>()
        .map_err(read_err)
}

fn remove_dir(path: &Path) -> Result<()> {
    fs::remove_dir(path).map_err(|e| Error::Remove {
        path: path.to_path_buf(),
        source: e,
    })
}

fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| Error::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_dir_ignores_files() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("v1")).unwrap();
        fs::write(root.path().join("README"), b"x").unwrap();

        assert_eq!(single_dir(root.path()).unwrap(), root.path().join("v1"));
    }

    #[test]
    fn single_dir_counts_dirs() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("a")).unwrap();
        fs::create_dir(root.path().join("b")).unwrap();
        fs::create_dir(root.path().join("c")).unwrap();

        match single_dir(root.path()) {
            Err(Error::AmbiguousDirectory { count, .. }) => assert_eq!(count, 3),
            other => panic!("expected AmbiguousDirectory, got {other:?}"),
        }
    }
}
