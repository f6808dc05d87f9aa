use std::error::Error as StdError;
use std::io::{self, BufReader, Read};

use flate2::bufread::GzDecoder;

/// Compressed bytes are pulled from the body in blocks of this size.
const GZIP_INPUT_BUFFER: usize = 4096;

/// Marks an error raised by the gzip decoder itself, as opposed to one that
/// came up from the wrapped stream.
#[derive(Debug, thiserror::Error)]
#[error("gzip stream is corrupt: {0}")]
pub struct DecodeError(io::Error);

/// Marks an error raised by the payload reader rather than by the archive
/// or decoder reading it.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct UpstreamError(io::Error);

/// Tags errors from the payload reader so they can be told apart from
/// structural errors after passing through the decoder or archive reader.
struct TagUpstream<R>(R);

impl<R: Read> Read for TagUpstream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf).map_err(|e| match e.kind() {
            io::ErrorKind::Interrupted => e,
            kind => io::Error::new(kind, UpstreamError(e)),
        })
    }
}

/// Gzip decoder that never asks the underlying reader for more than
/// 4 KiB at a time, so byte counters below it advance in small steps.
pub struct GzipReader<R> {
    inner: GzDecoder<BufReader<TagUpstream<R>>>,
}

impl<R: Read> GzipReader<R> {
    pub fn new(reader: R) -> Self {
        let input = BufReader::with_capacity(GZIP_INPUT_BUFFER, TagUpstream(reader));
        Self {
            inner: GzDecoder::new(input),
        }
    }
}

impl<R: Read> Read for GzipReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::Interrupted || is_upstream_error(&e) {
                e
            } else {
                io::Error::new(io::ErrorKind::InvalidData, DecodeError(e))
            }
        })
    }
}

/// Unwrap gzip when the payload asks for it. Errors of `reader` come out
/// tagged as [`UpstreamError`] either way.
pub fn wrap_reader<'a, R: Read + 'a>(reader: R, gzip: bool) -> Box<dyn Read + 'a> {
    if gzip {
        Box::new(GzipReader::new(reader))
    } else {
        Box::new(TagUpstream(reader))
    }
}

/// Whether `e`, or anything it wraps, was produced by [`GzipReader`].
pub fn is_decode_error(e: &io::Error) -> bool {
    wraps::<DecodeError>(e)
}

/// Whether `e`, or anything it wraps, came from the payload reader.
pub fn is_upstream_error(e: &io::Error) -> bool {
    wraps::<UpstreamError>(e)
}

fn wraps<T: StdError + 'static>(e: &io::Error) -> bool {
    let mut current = e.get_ref().map(|inner| inner as &(dyn StdError + 'static));
    while let Some(err) = current {
        if err.is::<T>() {
            return true;
        }
        current = match err.downcast_ref::<io::Error>() {
            Some(io) => io.get_ref().map(|inner| inner as &(dyn StdError + 'static)),
            None => err.source(),
        };
    }
    false
}
