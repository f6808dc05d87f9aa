use std::fmt;
use std::path::PathBuf;

/// A line emitted while fetching.
///
/// The `Display` output is the exact line consumers parse, so the shapes here
/// must not drift: download progress carries a `Progress:` prefix while the
/// zip re-extraction phase prints a bare percentage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Emitted once, before the GET for the chosen URL is sent.
    Download { url: String },
    /// Download phase percentage.
    Progress { percent: u64 },
    /// Emitted once for zip payloads, after buffering and before extraction.
    Unzip { dir: PathBuf },
    /// Zip extraction phase percentage.
    UnzipProgress { percent: u64 },
    /// Emitted once when the whole fetch succeeded.
    Downloaded { dir: PathBuf },
}

impl Event {
    /// Short tag identifying the kind of event.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Download { .. } => "download",
            Self::Progress { .. } => "progress",
            Self::Unzip { .. } => "unzip",
            Self::UnzipProgress { .. } => "unzip_progress",
            Self::Downloaded { .. } => "downloaded",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download { url } => write!(f, "Download: {url}"),
            Self::Progress { percent } => write!(f, "Progress: {percent:02}%"),
            Self::Unzip { dir } => write!(f, "Unzip: {}", dir.display()),
            Self::UnzipProgress { percent } => write!(f, "{percent:02}%"),
            Self::Downloaded { dir } => write!(f, "Downloaded: {}", dir.display()),
        }
    }
}
