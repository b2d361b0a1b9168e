use log::debug;

use crate::constants::{
    CENTRAL_DIRECTORY_END_SIGNATURE, END_OF_CENTRAL_DIRECTORY_SIZE,
    VERSION_NEEDED_ZIP64, ZIP64_CENTRAL_DIRECTORY_END_SIGNATURE,
    ZIP64_END_OF_CENTRAL_DIRECTORY_SIZE, ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIGNATURE,
    ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIZE,
};
use crate::zip64::{field_u16, field_u32, needs_zip64, FieldKind};

/// Little-endian byte buffer a record is encoded into.
#[derive(Debug)]
pub struct ArchiveDescriptor {
    buffer: Vec<u8>,
}

impl ArchiveDescriptor {
    pub fn new(capacity: u64) -> ArchiveDescriptor {
        ArchiveDescriptor {
            buffer: Vec::with_capacity(capacity as usize),
        }
    }

    pub fn write_u16(&mut self, val: u16) {
        self.buffer.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_u32(&mut self, val: u32) {
        self.buffer.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_u64(&mut self, val: u64) {
        self.buffer.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_bytes(&mut self, val: &[u8]) {
        self.buffer.extend_from_slice(val);
    }

    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }
}

/// The following is the layout of the ZIP64 extended
/// information "extra" block. If one of the size or
/// offset fields in the Local or Central directory
/// record is too small to hold the required data,
/// a ZIP64 extended information record is created.
/// The order of the fields in the ZIP64 extended
/// information record is fixed, but the fields will
/// only appear if the corresponding Local or Central
/// directory record field is set to 0xFFFF or 0xFFFFFFFF.
///
/// If one entry does not fit into the classic LOC or CEN record,
/// only that entry is required to be moved into a ZIP64 extra
/// field. The other entries may stay in the classic record.
///
/// Note: all fields stored in Intel low-byte/high-byte order.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct ExtraFieldZIP64ExtendedInformation {
    uncompressed_size: Option<u64>,
    compressed_size: Option<u64>,
    offset: Option<u64>,
}

impl ExtraFieldZIP64ExtendedInformation {
    pub const HEADER_ID: u16 = 0x0001;
    const HEADER_SIZE: u16 = 4;

    /// Extra field of a local file header whose size is known before the data.
    ///
    /// A local header holding ZIP64 sizes must carry both of them.
    pub fn local(size: u64) -> Self {
        if needs_zip64(size, FieldKind::LocalEntrySize) {
            Self {
                uncompressed_size: Some(size),
                compressed_size: Some(size),
                offset: None,
            }
        } else {
            Self::default()
        }
    }

    /// Extra field of a central directory header: only the overflowing values.
    ///
    /// Entries are stored, so both sizes are equal and overflow together.
    pub fn central(size: u64, offset: u64) -> Self {
        let big_size = needs_zip64(size, FieldKind::CentralEntrySize);
        let big_offset = needs_zip64(offset, FieldKind::CentralOffset);
        Self {
            uncompressed_size: big_size.then_some(size),
            compressed_size: big_size.then_some(size),
            offset: big_offset.then_some(offset),
        }
    }

    fn values(&self) -> impl Iterator<Item = u64> {
        [self.uncompressed_size, self.compressed_size, self.offset]
            .into_iter()
            .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.values().next().is_none()
    }

    pub fn data_size(&self) -> u16 {
        8 * self.values().count() as u16
    }

    /// Bytes taken in the header, 0 when the field is not needed.
    pub fn size(&self) -> u16 {
        if self.is_empty() {
            0
        } else {
            Self::HEADER_SIZE + self.data_size()
        }
    }

    pub fn write(&self, archive_descriptor: &mut ArchiveDescriptor) {
        if self.is_empty() {
            return;
        }

        archive_descriptor.write_u16(ExtraFieldZIP64ExtendedInformation::HEADER_ID);
        archive_descriptor.write_u16(self.data_size());
        for value in self.values() {
            archive_descriptor.write_u64(value);
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct CentralDirectoryEnd {
    pub total_number_of_entries: u64,
    pub central_directory_size: u64,
    pub offset_of_start_of_central_directory: u64,
}

impl CentralDirectoryEnd {
    // Per APPNOTE 4.4.1.4 - a CentralDirectoryEnd field might be insufficient to hold the
    // required data. In this case the file SHOULD contain a ZIP64 format record
    // and the field of this record will be set to -1
    pub fn needs_zip64_format_extensions(&self) -> bool {
        needs_zip64(self.total_number_of_entries, FieldKind::TotalEntries)
            || needs_zip64(self.central_directory_size, FieldKind::CentralDirectorySize)
            || needs_zip64(
                self.offset_of_start_of_central_directory,
                FieldKind::CentralDirectoryOffset,
            )
    }

    pub fn size(&self) -> u64 {
        if self.needs_zip64_format_extensions() {
            ZIP64_END_OF_CENTRAL_DIRECTORY_SIZE
                + ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIZE
                + END_OF_CENTRAL_DIRECTORY_SIZE
        } else {
            END_OF_CENTRAL_DIRECTORY_SIZE
        }
    }

    pub fn write(&self, end_of_central_directory: &mut ArchiveDescriptor) {
        if self.needs_zip64_format_extensions() {
            debug!(
                "ZIP64 end of central directory: {} entries, size {}, offset {}",
                self.total_number_of_entries,
                self.central_directory_size,
                self.offset_of_start_of_central_directory
            );
            self.create_zip64_end_of_central_directory_record(end_of_central_directory);
            self.create_end_of_central_directory_locator(end_of_central_directory);
        }
        self.create_end_of_central_directory(end_of_central_directory);
    }

    fn create_zip64_end_of_central_directory_record(
        &self,
        end_of_central_directory: &mut ArchiveDescriptor,
    ) {
        const SIZE_OF_THE_EOCD64_MINUS_12: u64 = ZIP64_END_OF_CENTRAL_DIRECTORY_SIZE - 12;

        end_of_central_directory.write_u32(ZIP64_CENTRAL_DIRECTORY_END_SIGNATURE);
        end_of_central_directory.write_u64(SIZE_OF_THE_EOCD64_MINUS_12);
        end_of_central_directory.write_u16(VERSION_NEEDED_ZIP64); // Version made by.
        end_of_central_directory.write_u16(VERSION_NEEDED_ZIP64); // Version needed to extract.
        end_of_central_directory.write_u32(0); // Number of this disk.
        end_of_central_directory.write_u32(0); // Disk where central directory starts.
        end_of_central_directory.write_u64(self.total_number_of_entries);
        end_of_central_directory.write_u64(self.total_number_of_entries);
        end_of_central_directory.write_u64(self.central_directory_size);
        end_of_central_directory.write_u64(self.offset_of_start_of_central_directory);
    }

    fn create_end_of_central_directory_locator(
        &self,
        end_of_central_directory: &mut ArchiveDescriptor,
    ) {
        let zip64_end_of_central_directory_offset =
            self.offset_of_start_of_central_directory + self.central_directory_size;

        end_of_central_directory.write_u32(ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIGNATURE);
        end_of_central_directory.write_u32(0); // Disk with the ZIP64 end of central directory.
        end_of_central_directory.write_u64(zip64_end_of_central_directory_offset);
        end_of_central_directory.write_u32(1); // Total number of disks.
    }

    fn create_end_of_central_directory(&self, end_of_central_directory: &mut ArchiveDescriptor) {
        let entries = field_u16(self.total_number_of_entries);

        end_of_central_directory.write_u32(CENTRAL_DIRECTORY_END_SIGNATURE);
        end_of_central_directory.write_u16(0); // Number of this disk.
        end_of_central_directory.write_u16(0); // Disk where central directory starts.
        // Number of central directory records on this disk.
        end_of_central_directory.write_u16(entries);
        end_of_central_directory.write_u16(entries); // Total number of central directory records.
        end_of_central_directory.write_u32(field_u32(
            self.central_directory_size,
            FieldKind::CentralDirectorySize,
        ));
        end_of_central_directory.write_u32(field_u32(
            self.offset_of_start_of_central_directory,
            FieldKind::CentralDirectoryOffset,
        ));
        end_of_central_directory.write_u16(0); // Comment length.
    }
}

#[cfg(test)]
#[path = "./tests/external_fields.rs"]
mod external_fields_tests;
