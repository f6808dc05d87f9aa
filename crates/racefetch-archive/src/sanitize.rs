use std::fs;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

use crate::error::{Error, Result};

/// Result of sanitizing an archive entry path.
#[derive(Clone, Debug)]
pub struct SanitizedPath {
    pub original: String,
    pub resolved: PathBuf,
}

/// Rewrite both `\` and `/` to the host separator.
///
/// Archives built on another OS use the other separator; without this a
/// Windows-built zip would produce file names containing backslashes on unix.
pub fn normalize_separators(name: &str) -> String {
    name.chars()
        .map(|c| if c == '\\' || c == '/' { MAIN_SEPARATOR } else { c })
        .collect()
}

/// Resolve an entry name against `base`, rejecting anything that escapes it.
pub fn sanitize_path(entry: &str, base: &Path) -> Result<SanitizedPath> {
    if entry.contains('\0') {
        return Err(Error::InvalidPath(entry.to_string()));
    }

    let native = PathBuf::from(normalize_separators(entry));

    // Reject absolute paths (zip-slip protection)
    if native.has_root() || native.is_absolute() {
        return Err(Error::ZipSlip {
            entry: entry.to_string(),
            resolved: native,
        });
    }

    let base = normalize_path(base);
    let resolved = normalize_path(&base.join(native));

    if !resolved.starts_with(&base) {
        return Err(Error::ZipSlip {
            entry: entry.to_string(),
            resolved,
        });
    }

    Ok(SanitizedPath {
        original: entry.to_string(),
        resolved,
    })
}

/// Validate a symlink target relative to the link's location.
///
/// Returns the target with host separators, suitable for storing in the link.
pub fn sanitize_symlink_target(target: &str, link: &Path, base: &Path) -> Result<PathBuf> {
    let native = PathBuf::from(normalize_separators(target));

    if native.has_root() || native.is_absolute() {
        return Err(Error::AbsoluteSymlinkTarget {
            target: target.to_string(),
            symlink: link.to_path_buf(),
        });
    }

    let base = normalize_path(base);
    let resolved = match link.parent() {
        Some(parent) => normalize_path(&parent.join(&native)),
        None => normalize_path(&native),
    };

    if !resolved.starts_with(&base) {
        return Err(Error::SymlinkEscape {
            target: target.to_string(),
            resolved,
        });
    }

    Ok(native)
}

/// Whether `path` stays under `root` once symlinks already on disk are
/// followed. `root` must be canonical.
///
/// The deepest existing ancestor of `path` is canonicalized; the rest does
/// not exist yet and was bounded lexically by [`sanitize_path`]. Catches
/// links planted by earlier entries that the lexical check cannot see.
pub fn resolves_inside(path: &Path, root: &Path) -> bool {
    for ancestor in path.ancestors() {
        if fs::symlink_metadata(ancestor).is_err() {
            continue;
        }
        return fs::canonicalize(ancestor).is_ok_and(|resolved| resolved.starts_with(root));
    }
    false
}

/// Lexically resolve `.` and `..`.
fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(part) => result.push(part),
            Component::RootDir => result.push(Component::RootDir.as_os_str()),
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::CurDir => {}
        }
    }

    result
}
