use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::{Os, Platform};

/// Per-user cache directory for `platform`.
///
/// Windows uses `APPDATA`; everything else uses `$HOME/.cache`. `env` looks
/// up environment variables, so the result does not depend on the host.
pub fn cache_dir<F>(platform: Platform, env: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    match platform.os {
        Os::Windows => env("APPDATA").map(PathBuf::from),
        _ => env("HOME").map(|home| PathBuf::from(home).join(".cache")),
    }
}

/// [`cache_dir`] for the host, falling back to the account's home directory
/// when `HOME` is unset.
pub fn user_cache_dir() -> Option<PathBuf> {
    let platform = Platform::current();
    cache_dir(platform, |key| env::var_os(key)).or_else(|| match platform.os {
        Os::Windows => None,
        _ => home::home_dir().map(|home| home.join(".cache")),
    })
}
