//! Length prediction.
//!
//! Walks the entries' metadata the way [`generate_archive`](crate::generate_archive)
//! walks the entries, summing the sizes of the records it would emit. No content is read.

use std::borrow::Borrow;

use log::debug;

use crate::archive_common::CentralDirectoryEnd;
use crate::compress::common::{
    central_directory_header_size, data_descriptor_size, file_header_size, ArchiveFileEntry,
};
use crate::entry::EntryMetadata;
use crate::error::{ArchiveError, Result};

/// The exact length of the archive generated for entries described by `entries`.
///
/// Every entry must have a known size. Entries with a known crc are predicted
/// without data descriptor, as [`ZipEntry::from_bytes`](crate::ZipEntry::from_bytes)
/// entries are generated.
///
/// # Error
///
/// [`ArchiveError::MissingSizeForPrediction`] if an entry has no size,
/// [`ArchiveError::InvalidName`] if a name cannot be stored. Entries are checked
/// before anything is computed.
pub fn predict_length<I>(entries: I) -> Result<u64>
where
    I: IntoIterator,
    I::Item: Borrow<EntryMetadata>,
{
    let entries: Vec<I::Item> = entries.into_iter().collect();

    for (index, metadata) in entries.iter().enumerate() {
        let metadata = metadata.borrow();
        metadata.name().check(index)?;
        if metadata.size().is_none() {
            return Err(ArchiveError::MissingSizeForPrediction {
                index,
                name: metadata.name().display(),
            });
        }
    }

    let mut offset = 0;
    let mut central_directory_size = 0;
    for metadata in &entries {
        let entry = ArchiveFileEntry::from_metadata(metadata.borrow(), offset);

        central_directory_size += central_directory_header_size(&entry);
        offset += file_header_size(&entry) + entry.uncompressed_size + data_descriptor_size(&entry);
    }

    let dir_end = CentralDirectoryEnd {
        total_number_of_entries: entries.len() as u64,
        central_directory_size,
        offset_of_start_of_central_directory: offset,
    };
    let length = offset + central_directory_size + dir_end.size();

    debug!(
        "predicted length of {} entries: {} bytes, ZIP64 end records: {}",
        entries.len(),
        length,
        dir_end.needs_zip64_format_extensions()
    );
    Ok(length)
}
