use crate::{Error, Result};
use std::path::Path;

/// Create `link` pointing at `target`. `target` is stored as given.
pub fn symlink(target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()> {
    let target = target.as_ref();
    let link = link.as_ref();

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).map_err(|e| Error::Write {
            path: link.to_path_buf(),
            source: e,
        })
    }

    #[cfg(windows)]
    {
        let resolved = link.parent().map(|p| p.join(target));
        let is_dir = resolved.as_deref().is_some_and(Path::is_dir);
        let result = if is_dir {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.map_err(|e| Error::Write {
            path: link.to_path_buf(),
            source: e,
        })
    }
}
