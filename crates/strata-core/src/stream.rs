//! Read-path helpers: decompression pass-through and line-shaped pulls

use std::io::{BufRead, BufReader, Lines};

use flate2::read::MultiGzDecoder;

use crate::{ByteStream, Error, Result};

/// Wrap `raw` in a decompressing filter when the path's extension calls for
/// one. Anything unrecognized passes through untouched.
pub fn decompress(path: &str, raw: ByteStream) -> ByteStream {
    if path.ends_with(".gz") {
        Box::new(MultiGzDecoder::new(raw))
    } else {
        raw
    }
}

/// Pull-based line iterator over a byte stream. Lines are yielded without
/// their terminators; the underlying stream is released when the iterator
/// is dropped.
pub struct LineIter {
    inner: Lines<BufReader<ByteStream>>,
}

/// Iterate `stream` line by line
pub fn lines(stream: ByteStream) -> LineIter {
    LineIter {
        inner: BufReader::new(stream).lines(),
    }
}

impl Iterator for LineIter {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|line| line.map_err(Error::from))
    }
}
