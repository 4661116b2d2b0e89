//! Blocking reads over an async object stream

use std::io::{self, Read};

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;

use crate::runtime::get_runtime;

/// Adapts the store's async byte stream to `std::io::Read`, pulling one
/// chunk at a time through the shared runtime. Dropping the reader drops
/// the stream and with it the underlying connection.
pub struct ObjectReader {
    stream: BoxStream<'static, object_store::Result<Bytes>>,
    current: Option<Bytes>,
    offset: usize,
}

impl ObjectReader {
    pub(crate) fn new(stream: BoxStream<'static, object_store::Result<Bytes>>) -> Self {
        ObjectReader {
            stream,
            current: None,
            offset: 0,
        }
    }
}

impl Read for ObjectReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if let Some(chunk) = &self.current {
                if self.offset < chunk.len() {
                    let n = buf.len().min(chunk.len() - self.offset);
                    buf[..n].copy_from_slice(&chunk[self.offset..self.offset + n]);
                    self.offset += n;
                    return Ok(n);
                }
                self.current = None;
            }

            match get_runtime().block_on(self.stream.next()) {
                Some(Ok(chunk)) => {
                    self.current = Some(chunk);
                    self.offset = 0;
                }
                Some(Err(e)) => {
                    return Err(io::Error::new(io::ErrorKind::Other, e));
                }
                None => return Ok(0),
            }
        }
    }
}
