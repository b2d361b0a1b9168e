use tokio::fs::File;
use zipstream::{predict_length, write_archive, ArchiveError, FileOptions, ZipEntry};

#[tokio::main]
async fn main() -> Result<(), ArchiveError> {
    let options = FileOptions::default().unix_permissions(0o644);

    let source = File::open("Cargo.toml").await?;
    let source_size = source.metadata().await?.len();

    let entries = vec![
        ZipEntry::from_bytes("file1.txt", &options, &b"hello\n"[..]),
        ZipEntry::from_reader("file2.txt", &options, &b"world\n"[..]).with_size(6),
        ZipEntry::directory("sources", &options),
        ZipEntry::from_reader("sources/Cargo.toml", &options, source).with_size(source_size),
    ];

    let predicted = predict_length(entries.iter().map(ZipEntry::metadata))?;

    let file = File::create("archive.zip").await?;
    let (size, _) = write_archive(entries, file).await?;

    println!("archive.zip: {} bytes written, {} predicted", size, predicted);
    Ok(())
}
