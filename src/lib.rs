//! A library for creating ZIP archives in one pass. This is useful when it is not possible to
//! *seek* in the output such as stdout, a socket or an HTTP response body.
//!
//! Entries are stored without compression. Their content is pulled lazily, chunk by chunk,
//! while the archive bytes are produced, so only one chunk is held in memory at a time.
//! Archives are switched to ZIP64 field by field, only where a value does not fit in the
//! classic format.
//!
//! Since nothing is compressed, the exact archive length can be computed up front from the
//! entries' names and sizes with [`predict_length`], e.g. to send a `Content-Length` header
//! before the first byte.
//!
//! The current implementation is based on
//!
//! [PKWARE's APPNOTE.TXT v6.3.10](https://pkware.cachefly.net/webdocs/casestudies/APPNOTE.TXT)
//!
//! ## Examples
//! ### [File system](demos/fs.rs)
//!
//! A simple example to create an archive file using [tokio::fs::File]
//!
//!```no_run
//! use zipstream::{write_archive, ArchiveError, FileOptions, ZipEntry};
//!
//! use tokio::fs::File;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ArchiveError> {
//!     let file = File::create("archive.zip").await?;
//!
//!     let options = FileOptions::default();
//!     let entries = vec![
//!         ZipEntry::from_bytes("file1.txt", &options, &b"hello\n"[..]),
//!         ZipEntry::from_reader("file2.txt", &options, &b"world\n"[..]),
//!     ];
//!
//!     let (size, _file) = write_archive(entries, file).await?;
//!     println!("{} bytes written", size);
//!
//!     Ok(())
//! }
//!```
//!
//! ### Stream with a known length
//!
//! The archive is a [`Stream`](futures::Stream) of [`Bytes`](tokio_util::bytes::Bytes) chunks,
//! whose length is known before it is polled:
//!
//!```
//! use futures::StreamExt;
//! use zipstream::{generate_archive, predict_length, FileDateTime, FileOptions, ZipEntry};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), zipstream::ArchiveError> {
//! let options = FileOptions::default().last_modified_time(FileDateTime::Zero);
//! let entries = vec![
//!     ZipEntry::from_reader("data.bin", &options, std::io::Cursor::new(vec![0u8; 1000]))
//!         .with_size(1000),
//!     ZipEntry::directory("empty", &options),
//! ];
//!
//! let content_length = predict_length(entries.iter().map(ZipEntry::metadata))?;
//!
//! let mut archive = generate_archive(entries);
//! let mut length = 0;
//! while let Some(chunk) = archive.next().await {
//!     length += chunk?.len() as u64;
//! }
//! assert_eq!(length, content_length);
//! # Ok(())
//! # }
//!```
//!
//! ## Disclaimer
//!
//!This implementation is inspired by :
//!- <https://github.com/scotow/zipit> and
//!- <https://github.com/zip-rs/zip>

mod constants;

mod archive_common;
pub mod compress;
pub mod entry;
pub mod error;
pub mod predict;
pub mod types;
pub mod zip64;

pub use compress::stream::{generate_archive, ZipStream};
pub use compress::tokio::archive::{archive_reader, write_archive};
pub use compress::FileOptions;
pub use entry::{ContentSource, EntryContent, EntryMetadata, ZipEntry};
pub use error::ArchiveError;
pub use predict::predict_length;
pub use types::{DateTimeCS, EntryName, FileDateTime};
