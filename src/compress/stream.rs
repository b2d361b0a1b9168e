use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use log::debug;
use tokio_util::bytes::Bytes;

use super::accumulator::{Accumulated, Accumulator, ContentSummary};
use super::common::{
    build_central_directory_end, build_central_directory_file_header, build_data_descriptor,
    build_file_header, ArchiveFileEntry,
};
use crate::archive_common::ArchiveDescriptor;
use crate::entry::{ContentSource, EntryContent, ZipEntry};
use crate::error::ArchiveError;

/// Generate a zip archive from `entries`, in order.
///
/// Nothing is read before the returned stream is polled; each poll pulls at most
/// one chunk from the current entry's source. Dropping the stream stops the
/// generation and drops the source being read.
pub fn generate_archive<'a, I>(entries: I) -> ZipStream<'a>
where
    I: IntoIterator<Item = ZipEntry<'a>>,
    I::IntoIter: Send + 'a,
{
    ZipStream {
        entries: Box::new(entries.into_iter()),
        state: State::Idle,
        archive_size: 0,
        files_info: Vec::new(),
        central_directory_offset: 0,
        central_directory_size: 0,
    }
}

struct StreamingEntry<'a> {
    index: usize,
    entry: ArchiveFileEntry,
    declared_size: Option<u64>,
    declared_crc32: Option<u32>,
    data: Accumulator<'a>,
}

enum State<'a> {
    Idle,
    WritingEntry,
    StreamingData(StreamingEntry<'a>),
    WritingDescriptor(ArchiveFileEntry),
    WritingCentralDirectory(usize),
    WritingEnd,
    Done,
}

/// A zip archive being generated, as a stream of byte chunks.
///
/// Created by [`generate_archive`]. Once an error has been yielded, the stream ends.
pub struct ZipStream<'a> {
    entries: Box<dyn Iterator<Item = ZipEntry<'a>> + Send + 'a>,
    state: State<'a>,
    archive_size: u64,
    files_info: Vec<ArchiveFileEntry>,
    central_directory_offset: u64,
    central_directory_size: u64,
}

impl<'a> ZipStream<'a> {
    /// Get archive current total bytes yielded.
    pub fn get_archive_size(&self) -> u64 {
        self.archive_size
    }

    fn start_entry(
        &self,
        index: usize,
        entry: ZipEntry<'a>,
    ) -> Result<StreamingEntry<'a>, ArchiveError> {
        let (name, last_modified_time, unix_permissions, content) = entry.into_parts();
        name.check(index)?;
        let date_time = last_modified_time
            .ms_dos()
            .ok_or_else(|| ArchiveError::DateOutOfRange {
                index,
                name: name.display(),
            })?;
        let offset = self.archive_size;

        let (entry, declared_size, declared_crc32, source) = match content {
            EntryContent::Sized {
                size,
                crc32,
                source,
            } => (
                ArchiveFileEntry::new(name, date_time, offset, Some(size), crc32),
                Some(size),
                crc32,
                source,
            ),
            EntryContent::Unsized(source) => (
                ArchiveFileEntry::new(name, date_time, offset, None, None),
                None,
                None,
                source,
            ),
            EntryContent::Directory => (
                ArchiveFileEntry::directory(name, date_time, offset),
                Some(0),
                Some(0),
                ContentSource::empty(),
            ),
        };

        Ok(StreamingEntry {
            index,
            entry: entry.with_unix_permissions(unix_permissions),
            declared_size,
            declared_crc32,
            data: Accumulator::new(source),
        })
    }

    fn finish_entry(
        streaming: StreamingEntry<'a>,
        summary: ContentSummary,
    ) -> Result<ArchiveFileEntry, ArchiveError> {
        let StreamingEntry {
            index,
            mut entry,
            declared_size,
            declared_crc32,
            ..
        } = streaming;

        let mismatch = |detail: String| ArchiveError::ContentMismatch {
            index,
            name: entry.file_name.display(),
            detail,
        };
        if let Some(size) = declared_size.filter(|size| *size != summary.size) {
            return Err(mismatch(format!(
                "{} bytes declared, {} bytes read",
                size, summary.size
            )));
        }
        if let Some(crc32) = declared_crc32.filter(|crc32| *crc32 != summary.crc32) {
            return Err(mismatch(format!(
                "crc {:08x} declared, {:08x} computed",
                crc32, summary.crc32
            )));
        }

        entry.crc32 = summary.crc32;
        entry.uncompressed_size = summary.size;

        debug!(
            "entry #{} '{}' done: {} bytes, crc {:08x}",
            index,
            entry.file_name.display(),
            entry.uncompressed_size,
            entry.crc32
        );
        Ok(entry)
    }

    fn emit(&mut self, chunk: Bytes) -> Poll<Option<Result<Bytes, ArchiveError>>> {
        self.archive_size += chunk.len() as u64;
        Poll::Ready(Some(Ok(chunk)))
    }

    fn emit_record(
        &mut self,
        record: ArchiveDescriptor,
    ) -> Poll<Option<Result<Bytes, ArchiveError>>> {
        self.emit(Bytes::from(record.finish()))
    }
}

impl<'a> Stream for ZipStream<'a> {
    type Item = Result<Bytes, ArchiveError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            // Any early return leaves the state to `Done`.
            match std::mem::replace(&mut this.state, State::Done) {
                State::Idle => this.state = State::WritingEntry,

                State::WritingEntry => match this.entries.next() {
                    Some(entry) => {
                        let index = this.files_info.len();
                        let streaming = match this.start_entry(index, entry) {
                            Ok(streaming) => streaming,
                            Err(e) => return Poll::Ready(Some(Err(e))),
                        };
                        debug!(
                            "entry #{} '{}' at offset {}, deferred: {}",
                            index,
                            streaming.entry.file_name.display(),
                            streaming.entry.offset,
                            streaming.entry.is_deferred()
                        );
                        let file_header = build_file_header(&streaming.entry);
                        this.state = State::StreamingData(streaming);
                        return this.emit_record(file_header);
                    }
                    None => {
                        this.central_directory_offset = this.archive_size;
                        this.state = State::WritingCentralDirectory(0);
                    }
                },

                State::StreamingData(mut streaming) => match streaming.data.poll_accumulate(cx) {
                    Poll::Pending => {
                        this.state = State::StreamingData(streaming);
                        return Poll::Pending;
                    }
                    Poll::Ready(Ok(Accumulated::Chunk(chunk))) => {
                        this.state = State::StreamingData(streaming);
                        return this.emit(chunk);
                    }
                    Poll::Ready(Ok(Accumulated::Complete(summary))) => {
                        let entry = match Self::finish_entry(streaming, summary) {
                            Ok(entry) => entry,
                            Err(e) => return Poll::Ready(Some(Err(e))),
                        };
                        if entry.is_deferred() {
                            this.state = State::WritingDescriptor(entry);
                        } else {
                            this.files_info.push(entry);
                            this.state = State::WritingEntry;
                        }
                    }
                    Poll::Ready(Err(source)) => {
                        return Poll::Ready(Some(Err(ArchiveError::SourceRead {
                            index: streaming.index,
                            name: streaming.entry.file_name.display(),
                            source,
                        })));
                    }
                },

                State::WritingDescriptor(entry) => {
                    let data_descriptor = build_data_descriptor(&entry);
                    this.files_info.push(entry);
                    this.state = State::WritingEntry;
                    return this.emit_record(data_descriptor);
                }

                State::WritingCentralDirectory(next) => match this.files_info.get(next) {
                    Some(file_info) => {
                        let mut central_directory_header = ArchiveDescriptor::new(100);
                        build_central_directory_file_header(
                            &mut central_directory_header,
                            file_info,
                        );
                        this.central_directory_size += central_directory_header.len() as u64;
                        this.state = State::WritingCentralDirectory(next + 1);
                        return this.emit_record(central_directory_header);
                    }
                    None => this.state = State::WritingEnd,
                },

                State::WritingEnd => {
                    debug!(
                        "central directory of {} entries at offset {}, {} bytes",
                        this.files_info.len(),
                        this.central_directory_offset,
                        this.central_directory_size
                    );
                    let end_of_central_directory = build_central_directory_end(
                        this.files_info.len() as u64,
                        this.central_directory_offset,
                        this.central_directory_size,
                    );
                    return this.emit_record(end_of_central_directory);
                }

                State::Done => return Poll::Ready(None),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compress::FileOptions;
    use crate::types::{DateTimeCS, FileDateTime};
    use futures::{stream, StreamExt, TryStreamExt};
    use std::io;

    fn options() -> FileOptions {
        FileOptions::default().last_modified_time(FileDateTime::Custom(
            DateTimeCS::new(2019, 4, 26, 2, 0, 0).unwrap(),
        ))
    }

    async fn collect(entries: Vec<ZipEntry<'static>>) -> Result<Vec<u8>, ArchiveError> {
        let chunks: Vec<Bytes> = generate_archive(entries).try_collect().await?;
        Ok(chunks.concat())
    }

    #[tokio::test]
    async fn test_empty_archive() {
        let archive = collect(Vec::new()).await.unwrap();

        assert_eq!(
            archive,
            [0x50, 0x4b, 0x05, 0x06, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[tokio::test]
    async fn test_deferred_entry_layout() {
        let entry = ZipEntry::from_reader("hello.txt", &options(), &b"hello\n"[..]);
        let archive = collect(vec![entry]).await.unwrap();

        // local header, data, descriptor, central header, end
        assert_eq!(archive.len(), 39 + 6 + 16 + 55 + 22);
        assert_eq!(&archive[6..8], &[0x08, 0x08]);
        assert_eq!(&archive[18..26], &[0xff; 8]);
        assert_eq!(&archive[39..45], b"hello\n");
        assert_eq!(
            &archive[45..61],
            &[
                0x50, 0x4b, 0x07, 0x08, 0x20, 0x30, 0x3a, 0x36, 6, 0, 0, 0, 6, 0, 0, 0
            ]
        );
        // central header carries the real values
        assert_eq!(&archive[61..65], &[0x50, 0x4b, 0x01, 0x02]);
        assert_eq!(&archive[77..81], &[0x20, 0x30, 0x3a, 0x36]);
        assert_eq!(&archive[81..89], &[6, 0, 0, 0, 6, 0, 0, 0]);
        // end record: 1 entry, 55 bytes at offset 61
        assert_eq!(
            &archive[116..],
            &[0x50, 0x4b, 0x05, 0x06, 0, 0, 0, 0, 1, 0, 1, 0, 55, 0, 0, 0, 61, 0, 0, 0, 0, 0]
        );
    }

    #[tokio::test]
    async fn test_known_entry_has_no_descriptor() {
        let entry = ZipEntry::from_bytes("hello.txt", &options(), &b"hello\n"[..]);
        let archive = collect(vec![entry]).await.unwrap();

        assert_eq!(archive.len(), 39 + 6 + 55 + 22);
        assert_eq!(&archive[6..8], &[0x00, 0x08]);
        assert_eq!(&archive[14..18], &[0x20, 0x30, 0x3a, 0x36]);
        assert_eq!(&archive[45..49], &[0x50, 0x4b, 0x01, 0x02]);
    }

    #[tokio::test]
    async fn test_offsets_advance() {
        let entries = vec![
            ZipEntry::from_bytes("a", &options(), &b"12345"[..]),
            ZipEntry::from_reader("b", &options(), &b"678"[..]),
            ZipEntry::directory("c", &options()),
        ];
        let archive = collect(entries).await.unwrap();

        // a: 31 + 5, b: 31 + 3 + 16, c/: 32
        let central_directory_offset = 36 + 50 + 32;
        let read_u32 = |at: usize| u32::from_le_bytes(archive[at..at + 4].try_into().unwrap());

        assert_eq!(read_u32(central_directory_offset + 42), 0);
        assert_eq!(read_u32(central_directory_offset + 47 + 42), 36);
        assert_eq!(read_u32(central_directory_offset + 2 * 47 + 42), 86);
        assert_eq!(read_u32(archive.len() - 6), central_directory_offset as u32);
    }

    #[tokio::test]
    async fn test_source_failure_aborts() {
        let chunks = vec![
            Ok(Bytes::from_static(b"abc")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ];
        let entries = vec![
            ZipEntry::from_bytes("first", &options(), &b"ok"[..]),
            ZipEntry::from_stream("second", &options(), stream::iter(chunks)),
            ZipEntry::from_bytes("third", &options(), &b"never"[..]),
        ];
        let mut archive = generate_archive(entries);

        let mut yielded = Vec::new();
        let err = loop {
            match archive.next().await {
                Some(Ok(chunk)) => yielded.push(chunk),
                Some(Err(e)) => break e,
                None => panic!("the archive should have failed"),
            }
        };

        match err {
            ArchiveError::SourceRead { index, name, source } => {
                assert_eq!(index, 1);
                assert_eq!(name, "second");
                assert_eq!(source.kind(), io::ErrorKind::ConnectionReset);
            }
            e => panic!("unexpected error {:?}", e),
        }
        // header + data of "first", header + "abc" of "second"
        assert_eq!(yielded.len(), 4);
        assert!(archive.next().await.is_none());
    }

    #[tokio::test]
    async fn test_date_out_of_range() {
        let options = FileOptions::default().last_modified_time(FileDateTime::Custom(
            DateTimeCS::new(1970, 1, 1, 0, 0, 0).unwrap(),
        ));
        let entries = vec![
            ZipEntry::from_bytes("fine", &self::options(), &b""[..]),
            ZipEntry::from_bytes("old", &options, &b""[..]),
        ];

        match collect(entries).await {
            Err(ArchiveError::DateOutOfRange { index, name }) => {
                assert_eq!(index, 1);
                assert_eq!(name, "old");
            }
            other => panic!("unexpected result {:?}", other.map(|a| a.len())),
        }
    }

    #[tokio::test]
    async fn test_declared_size_mismatch() {
        let entry = ZipEntry::from_reader("short", &options(), &b"abc"[..]).with_size(4);

        assert!(matches!(
            collect(vec![entry]).await,
            Err(ArchiveError::ContentMismatch { index: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_declared_crc_mismatch() {
        let entry = ZipEntry::from_reader("bad", &options(), &b"abc"[..])
            .with_size(3)
            .with_crc32(0x1234);

        assert!(matches!(
            collect(vec![entry]).await,
            Err(ArchiveError::ContentMismatch { index: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_name() {
        let entry = ZipEntry::from_bytes("", &options(), &b"abc"[..]);

        assert!(matches!(
            collect(vec![entry]).await,
            Err(ArchiveError::InvalidName { index: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_archive_size_tracks_output() {
        let entries = vec![ZipEntry::from_reader("x", &options(), &b"xyz"[..])];
        let mut archive = generate_archive(entries);

        let mut total = 0;
        while let Some(chunk) = archive.next().await {
            total += chunk.unwrap().len() as u64;
            assert_eq!(archive.get_archive_size(), total);
        }
        assert_eq!(total, 31 + 3 + 16 + 47 + 22);
    }
}
