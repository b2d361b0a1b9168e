//! Archive entries: a name, a date and a lazily pulled content.

use std::io;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::bytes::Bytes;
use tokio_util::io::ReaderStream;

use crate::compress::FileOptions;
use crate::types::{EntryName, FileDateTime};

/// A single-pass sequence of byte chunks.
pub struct ContentSource<'a> {
    stream: BoxStream<'a, io::Result<Bytes>>,
}

impl<'a> ContentSource<'a> {
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'a,
    {
        Self {
            stream: stream.boxed(),
        }
    }

    /// Read `reader` in chunks of at most `buffer_size` bytes.
    pub fn from_reader<R>(reader: R, buffer_size: usize) -> Self
    where
        R: AsyncRead + Send + 'a,
    {
        Self::from_stream(ReaderStream::with_capacity(reader, buffer_size))
    }

    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::from_stream(stream::iter([Ok(data.into())]))
    }

    pub fn empty() -> Self {
        Self::from_stream(stream::empty())
    }

    pub(crate) fn poll_chunk(&mut self, cx: &mut Context<'_>) -> Poll<Option<io::Result<Bytes>>> {
        self.stream.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for ContentSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ContentSource")
    }
}

/// What is known about an entry's content before it is read.
#[derive(Debug)]
pub enum EntryContent<'a> {
    /// The size is known in advance; the crc may be.
    Sized {
        size: u64,
        crc32: Option<u32>,
        source: ContentSource<'a>,
    },
    /// Size and crc are only known once the source is exhausted.
    Unsized(ContentSource<'a>),
    Directory,
}

/// An entry to be archived.
///
/// Its local header carries the crc and sizes only when both are known
/// before the data is read; otherwise they follow the data in a data descriptor.
#[derive(Debug)]
pub struct ZipEntry<'a> {
    name: EntryName,
    last_modified_time: FileDateTime,
    unix_permissions: Option<u32>,
    content: EntryContent<'a>,
}

impl<'a> ZipEntry<'a> {
    pub fn new(
        name: impl Into<EntryName>,
        options: &FileOptions,
        content: EntryContent<'a>,
    ) -> Self {
        let name = name.into();
        let name = match content {
            EntryContent::Directory => name.into_directory(),
            _ => name,
        };
        Self {
            name,
            last_modified_time: options.last_modified_time,
            unix_permissions: options.unix_permissions,
            content,
        }
    }

    /// An in-memory entry: size and crc are computed right away.
    pub fn from_bytes(
        name: impl Into<EntryName>,
        options: &FileOptions,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        let content = EntryContent::Sized {
            size: data.len() as u64,
            crc32: Some(crc32fast::hash(&data)),
            source: ContentSource::from_bytes(data),
        };
        Self::new(name, options, content)
    }

    pub fn from_reader<R>(name: impl Into<EntryName>, options: &FileOptions, reader: R) -> Self
    where
        R: AsyncRead + Send + 'a,
    {
        let source = ContentSource::from_reader(reader, options.read_buffer_size);
        Self::new(name, options, EntryContent::Unsized(source))
    }

    pub fn from_stream<S>(name: impl Into<EntryName>, options: &FileOptions, stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'a,
    {
        Self::new(
            name,
            options,
            EntryContent::Unsized(ContentSource::from_stream(stream)),
        )
    }

    /// A directory entry. A trailing slash is appended to the name if missing.
    pub fn directory(name: impl Into<EntryName>, options: &FileOptions) -> Self {
        Self::new(name, options, EntryContent::Directory)
    }

    /// Declare the content size. The archive generation fails if the source disagrees.
    pub fn with_size(mut self, size: u64) -> Self {
        self.content = match self.content {
            EntryContent::Unsized(source) => EntryContent::Sized {
                size,
                crc32: None,
                source,
            },
            EntryContent::Sized { crc32, source, .. } => EntryContent::Sized {
                size,
                crc32,
                source,
            },
            EntryContent::Directory => EntryContent::Directory,
        };
        self
    }

    /// Declare the content crc. Only kept when the size is declared as well.
    pub fn with_crc32(mut self, crc32: u32) -> Self {
        if let EntryContent::Sized { crc32: declared, .. } = &mut self.content {
            *declared = Some(crc32);
        }
        self
    }

    pub fn name(&self) -> &EntryName {
        &self.name
    }

    pub fn content(&self) -> &EntryContent<'a> {
        &self.content
    }

    /// What the length predictor needs to know about this entry.
    pub fn metadata(&self) -> EntryMetadata {
        let (size, crc32, directory) = match &self.content {
            EntryContent::Sized { size, crc32, .. } => (Some(*size), *crc32, false),
            EntryContent::Unsized(_) => (None, None, false),
            EntryContent::Directory => (Some(0), Some(0), true),
        };
        EntryMetadata {
            name: self.name.clone(),
            size,
            crc32,
            directory,
        }
    }

    pub(crate) fn into_parts(self) -> (EntryName, FileDateTime, Option<u32>, EntryContent<'a>) {
        (
            self.name,
            self.last_modified_time,
            self.unix_permissions,
            self.content,
        )
    }
}

/// An entry without its content, as used by [`predict_length`](crate::predict_length).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryMetadata {
    name: EntryName,
    size: Option<u64>,
    crc32: Option<u32>,
    directory: bool,
}

impl EntryMetadata {
    /// An entry of `size` bytes whose crc is not known in advance.
    pub fn new(name: impl Into<EntryName>, size: u64) -> Self {
        Self {
            name: name.into(),
            size: Some(size),
            crc32: None,
            directory: false,
        }
    }

    /// An entry whose size is not known. Its length cannot be predicted.
    pub fn without_size(name: impl Into<EntryName>) -> Self {
        Self {
            name: name.into(),
            size: None,
            crc32: None,
            directory: false,
        }
    }

    pub fn directory(name: impl Into<EntryName>) -> Self {
        Self {
            name: name.into().into_directory(),
            size: Some(0),
            crc32: Some(0),
            directory: true,
        }
    }

    /// The crc is known in advance, so no data descriptor is written.
    pub fn with_crc32(mut self, crc32: u32) -> Self {
        if !self.directory {
            self.crc32 = Some(crc32);
        }
        self
    }

    pub fn name(&self) -> &EntryName {
        &self.name
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn crc32(&self) -> Option<u32> {
        self.crc32
    }

    pub fn is_directory(&self) -> bool {
        self.directory
    }
}
