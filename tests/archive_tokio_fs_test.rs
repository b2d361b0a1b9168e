mod common;

use common::{create_new_clean_file, out_path, MockAsyncReader};
use tokio::io::AsyncWriteExt;
use zipstream::{predict_length, write_archive, FileOptions, ZipEntry};

#[tokio::test]
async fn archive_to_file() {
    let file = create_new_clean_file("archive_to_file.zip").await;

    let options = FileOptions::default().unix_permissions(0o644);
    let entries = || {
        vec![
            ZipEntry::from_bytes("file1.txt", &options, &b"hello\n"[..]),
            ZipEntry::from_reader("file2.txt", &options, &b"world\n"[..]).with_size(6),
            ZipEntry::from_reader("zeros.bin", &options, MockAsyncReader::new(100_000))
                .with_size(100_000),
            ZipEntry::directory("subdir", &options),
        ]
    };
    let predicted = predict_length(entries().iter().map(ZipEntry::metadata)).unwrap();

    let (size, file) = write_archive(entries(), file).await.unwrap();
    drop(file);

    assert_eq!(size, predicted);

    let data = std::fs::read(out_path("archive_to_file.zip")).unwrap();
    assert_eq!(data.len() as u64, size);

    let files = common::read_back(data);
    assert_eq!(files.len(), 4);
    assert_eq!(files[2].1.len(), 100_000);
    assert_eq!(files[3].0, "subdir/");
}

#[tokio::test]
async fn archive_from_file() {
    let source_path = out_path("archive_from_file.txt");
    let mut source = create_new_clean_file("archive_from_file.txt").await;
    source.write_all(b"read from the file system").await.unwrap();
    source.flush().await.unwrap();
    drop(source);

    let options = FileOptions::default().read_buffer_size(4);
    let reader = tokio::fs::File::open(&source_path).await.unwrap();
    let entries = vec![ZipEntry::from_reader("copy.txt", &options, reader)];

    let (_, data) = write_archive(entries, Vec::new()).await.unwrap();

    let files = common::read_back(data);
    assert_eq!(files[0].1, b"read from the file system");
}
