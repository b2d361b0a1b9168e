use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::bytes::Bytes;
use tokio_util::io::StreamReader;

use super::async_wrapper::AsyncWriteWrapper;
use crate::compress::stream::{generate_archive, ZipStream};
use crate::entry::ZipEntry;
use crate::error::ArchiveError;

/// Write the zip archive of `entries` to `sink`.
///
/// Returns the archive size (bytes) and the [`AsyncWrite`] object passed in.
///
/// # Error
///
/// This function will forward any error found while trying to read from an entry's source
/// or while writing to the underlying sink.
pub async fn write_archive<'a, I, W>(entries: I, sink: W) -> Result<(u64, W), ArchiveError>
where
    I: IntoIterator<Item = ZipEntry<'a>>,
    I::IntoIter: Send + 'a,
    W: AsyncWrite + Unpin,
{
    let mut sink = AsyncWriteWrapper::new(sink);
    let mut archive = generate_archive(entries);

    while let Some(chunk) = archive.next().await {
        sink.write_all(&chunk?).await?;
    }
    sink.flush().await?;

    Ok((sink.get_written_bytes_count(), sink.retrieve_writer()))
}

/// The zip archive of `entries` as an [`AsyncRead`](tokio::io::AsyncRead), e.g. to serve it
/// as a response body.
///
/// Generation errors surface as [`std::io::Error`]s wrapping the [`ArchiveError`].
pub fn archive_reader<'a, I>(entries: I) -> StreamReader<ZipStream<'a>, Bytes>
where
    I: IntoIterator<Item = ZipEntry<'a>>,
    I::IntoIter: Send + 'a,
{
    StreamReader::new(generate_archive(entries))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compress::FileOptions;
    use crate::types::FileDateTime;
    use futures::stream;
    use std::io;
    use tokio::io::AsyncReadExt;

    fn entries() -> Vec<ZipEntry<'static>> {
        let options = FileOptions::default().last_modified_time(FileDateTime::Zero);
        vec![
            ZipEntry::from_bytes("file1.txt", &options, &b"hello\n"[..]),
            ZipEntry::from_reader("file2.txt", &options, &b"world\n"[..]),
        ]
    }

    #[tokio::test]
    async fn test_write_archive() {
        let (size, data) = write_archive(entries(), Vec::new()).await.unwrap();

        assert_eq!(size, data.len() as u64);
        assert_eq!(size, (39 + 6) + (39 + 6 + 16) + 2 * 55 + 22);
    }

    #[tokio::test]
    async fn test_reader_matches_writer() {
        let (_, written) = write_archive(entries(), Vec::new()).await.unwrap();

        let mut read = Vec::new();
        archive_reader(entries())
            .read_to_end(&mut read)
            .await
            .unwrap();

        assert_eq!(read, written);
    }

    #[tokio::test]
    async fn test_reader_error() {
        let options = FileOptions::default().last_modified_time(FileDateTime::Zero);
        let failing = stream::iter(vec![Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "truncated",
        ))]);
        let entries = vec![ZipEntry::from_stream("broken", &options, failing)];

        let mut read = Vec::new();
        let err = archive_reader(entries)
            .read_to_end(&mut read)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::Other);
        // only the local header made it
        assert_eq!(read.len(), 36);
    }
}
