#![allow(dead_code)]
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::task::Poll;

use futures::stream::{self, Stream, StreamExt};
use tokio::{fs::File, io::AsyncRead};
use tokio_util::bytes::Bytes;
use zipstream::{generate_archive, ZipEntry};

const PACKAGE_NAME: &str = "zipstream";
const TEMP: &str = "/tmp";

pub fn out_path(file_name: &str) -> PathBuf {
    Path::new(TEMP).join(PACKAGE_NAME).join(file_name)
}

pub async fn create_new_clean_file(file_name: &str) -> File {
    let out_path = out_path(file_name);
    let out_dir = out_path.parent().unwrap();
    if !out_dir.exists() {
        tokio::fs::create_dir_all(out_dir)
            .await
            .unwrap_or_else(|error| {
                panic!("creating dir {:?} failed, because {:?}", out_dir, error);
            })
    }

    if out_path.exists() {
        tokio::fs::remove_file(&out_path)
            .await
            .unwrap_or_else(|error| {
                panic!("deleting file {:?} failed, because {:?}", &out_path, error);
            });
    }
    tokio::fs::File::create(&out_path)
        .await
        .unwrap_or_else(|error| {
            panic!("creating file {:?} failed, because {:?}", &out_path, error);
        })
}

/// Produces `size` bytes of `b'0'`, at most as many as the read buffer holds per poll.
pub struct MockAsyncReader {
    mock_size: u64,
}

impl MockAsyncReader {
    pub fn new(size: u64) -> Self {
        Self { mock_size: size }
    }
}

impl AsyncRead for MockAsyncReader {
    fn poll_read(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let size = (buf.remaining() as u64).min(self.mock_size) as usize;
        buf.initialize_unfilled_to(size).fill(b'0');
        buf.advance(size);

        self.get_mut().mock_size -= size as u64;
        Poll::Ready(Ok(()))
    }
}

/// `data` split in chunks of `chunk_size` bytes.
pub fn chunked(data: &'static [u8], chunk_size: usize) -> impl Stream<Item = io::Result<Bytes>> {
    let chunks: Vec<io::Result<Bytes>> = data
        .chunks(chunk_size)
        .map(|chunk| Ok(Bytes::from_static(chunk)))
        .collect();
    stream::iter(chunks)
}

/// Collect the whole archive in memory.
pub async fn generate(entries: Vec<ZipEntry<'static>>) -> Vec<u8> {
    let mut archive = generate_archive(entries);
    let mut data = Vec::new();
    while let Some(chunk) = archive.next().await {
        data.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(archive.get_archive_size(), data.len() as u64);
    data
}

/// Name, content and crc of every entry, as read back by the `zip` crate.
pub fn read_back(data: Vec<u8>) -> Vec<(String, Vec<u8>, u32)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            (file.name().to_owned(), content, file.crc32())
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::MockAsyncReader;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_reader() {
        let mut buf = [b'a'; 10];
        let mut reader = MockAsyncReader::new(105);

        let mut total = 0;
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(size) => {
                    assert!(buf[..size].iter().all(|b| *b == b'0'));
                    total += size;
                }
                Err(e) => panic!("Error {:?}", e),
            }
        }
        assert_eq!(total, 105);
    }
}
