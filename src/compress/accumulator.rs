use std::future::poll_fn;
use std::io;
use std::task::{Context, Poll};

use crc32fast::Hasher;
use futures::ready;
use log::trace;
use tokio_util::bytes::Bytes;

use crate::entry::ContentSource;

/// Final size and crc of a content, known once its source is exhausted.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ContentSummary {
    pub size: u64,
    pub crc32: u32,
}

#[derive(Debug)]
pub enum Accumulated {
    /// A chunk pulled from the source, unmodified.
    Chunk(Bytes),
    /// The source is exhausted.
    Complete(ContentSummary),
}

/// Forwards the chunks of a source while computing their crc and total size.
///
/// Empty chunks are swallowed. Pulling again after [`Accumulated::Complete`] is not supported.
pub struct Accumulator<'a> {
    source: ContentSource<'a>,
    hasher: Hasher,
    size: u64,
}

impl<'a> Accumulator<'a> {
    pub fn new(source: ContentSource<'a>) -> Self {
        Self {
            source,
            hasher: Hasher::new(),
            size: 0,
        }
    }

    pub fn poll_accumulate(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<Accumulated>> {
        loop {
            match ready!(self.source.poll_chunk(cx)) {
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => {
                    self.hasher.update(&chunk);
                    self.size += chunk.len() as u64;
                    trace!("chunk of {} bytes, {} so far", chunk.len(), self.size);
                    return Poll::Ready(Ok(Accumulated::Chunk(chunk)));
                }
                Some(Err(e)) => return Poll::Ready(Err(e)),
                None => return Poll::Ready(Ok(Accumulated::Complete(self.summary()))),
            }
        }
    }

    pub async fn next(&mut self) -> io::Result<Accumulated> {
        poll_fn(|cx| self.poll_accumulate(cx)).await
    }

    fn summary(&self) -> ContentSummary {
        ContentSummary {
            size: self.size,
            crc32: self.hasher.clone().finalize(),
        }
    }
}
