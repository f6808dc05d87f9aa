//! Filesystem helpers applied to extracted downloads.

mod error;
pub mod permissions;
mod strip;
mod symlink;

pub use error::{Error, Result};
pub use permissions::PermissionMode;
pub use strip::strip_first_dir;
pub use symlink::symlink;
