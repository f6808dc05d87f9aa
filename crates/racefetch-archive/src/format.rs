use std::fmt;

/// How the (already gunzipped) payload is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Streamed one header at a time.
    Tar,
    /// Buffered in full; the central directory sits at the end.
    Zip,
    /// Not an archive, saved as a single file.
    Plain,
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tar => write!(f, "tar"),
            Self::Zip => write!(f, "zip"),
            Self::Plain => write!(f, "plain"),
        }
    }
}

/// Processing plan derived from the trailing name of a resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    /// The stream is gzip-compressed and must be unwrapped first.
    pub gzip: bool,
    pub format: ArchiveFormat,
    /// Name with the gzip suffix removed, used for plain payloads.
    pub name: String,
}

impl Payload {
    /// `t.tar.gz` is gzip + tar, `t.tgz` is gzip + tar, `t.zip` is zip,
    /// `t.txt.gz` is gzip + plain. Suffix matching ignores ASCII case.
    pub fn from_name(name: &str) -> Self {
        let (gzip, name) = if let Some(stem) = strip_suffix(name, ".tgz") {
            (true, format!("{stem}.tar"))
        } else if let Some(stem) = strip_suffix(name, ".gz") {
            (true, stem.to_string())
        } else {
            (false, name.to_string())
        };

        let format = if strip_suffix(&name, ".tar").is_some() {
            ArchiveFormat::Tar
        } else if strip_suffix(&name, ".zip").is_some() {
            ArchiveFormat::Zip
        } else {
            ArchiveFormat::Plain
        };

        Self { gzip, format, name }
    }
}

fn strip_suffix<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(suffix.len())?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (stem, tail) = name.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(stem)
}
