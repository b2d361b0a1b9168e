//! Header encoders.
//!
//! Each `build_*` function has a `*_size` companion computing the number of
//! bytes it produces; the length predictor relies on the latter only.

use crate::archive_common::{
    ArchiveDescriptor, CentralDirectoryEnd, ExtraFieldZIP64ExtendedInformation,
};
use crate::constants::{
    CENTRAL_DIRECTORY_ENTRY_BASE_SIZE, CENTRAL_DIRECTORY_ENTRY_SIGNATURE,
    DATA_DESCRIPTOR_SIGNATURE, DESCRIPTOR_SIZE, DESCRIPTOR_ZIP64_SIZE,
    EXTENDED_LOCAL_HEADER_FLAG, FILE_HEADER_BASE_SIZE, HOST_MS_DOS, HOST_UNIX,
    LOCAL_FILE_HEADER_SIGNATURE, MS_DOS_DIRECTORY_ATTRIBUTE, STORE_COMPRESSION_METHOD,
    UNIX_DIRECTORY, UNIX_REGULAR_FILE, UTF8_NAME_FLAG, VERSION_NEEDED_DEFAULT,
    VERSION_NEEDED_ZIP64,
};
use crate::entry::EntryMetadata;
use crate::types::EntryName;
use crate::zip64::{field_u32, needs_zip64, FieldKind};

/// An entry as recorded in the headers.
///
/// Until its data is streamed, `crc32` and `uncompressed_size` hold the declared
/// values (or zero when unknown).
#[derive(Debug, Clone)]
pub struct ArchiveFileEntry {
    pub file_name: EntryName,
    pub general_purpose_flags: u16,
    pub last_mod_file_time: u16,
    pub last_mod_file_date: u16,
    pub crc32: u32,
    pub uncompressed_size: u64,
    pub offset: u64,
    pub directory: bool,
    pub unix_permissions: Option<u32>,
}

impl ArchiveFileEntry {
    /// A new entry located at `offset`. The crc and sizes are deferred to a data
    /// descriptor unless both are known.
    pub fn new(
        file_name: EntryName,
        (date, time): (u16, u16),
        offset: u64,
        size: Option<u64>,
        crc32: Option<u32>,
    ) -> Self {
        let mut general_purpose_flags = 0;
        if file_name.is_utf8() {
            general_purpose_flags |= UTF8_NAME_FLAG;
        }
        let (uncompressed_size, crc32) = match (size, crc32) {
            (Some(size), Some(crc32)) => (size, crc32),
            (size, _) => {
                general_purpose_flags |= EXTENDED_LOCAL_HEADER_FLAG;
                (size.unwrap_or(0), 0)
            }
        };

        Self {
            file_name,
            general_purpose_flags,
            last_mod_file_time: time,
            last_mod_file_date: date,
            crc32,
            uncompressed_size,
            offset,
            directory: false,
            unix_permissions: None,
        }
    }

    /// Entry for a directory: no data, never deferred.
    pub fn directory(file_name: EntryName, date_time: (u16, u16), offset: u64) -> Self {
        Self {
            directory: true,
            ..Self::new(file_name, date_time, offset, Some(0), Some(0))
        }
    }

    /// The entry as predicted from its metadata, the date being irrelevant to sizes.
    ///
    /// The size must be known.
    pub fn from_metadata(metadata: &EntryMetadata, offset: u64) -> Self {
        let name = metadata.name().clone();
        if metadata.is_directory() {
            Self::directory(name, (0, 0), offset)
        } else {
            Self::new(name, (0, 0), offset, metadata.size(), metadata.crc32())
        }
    }

    pub fn with_unix_permissions(mut self, unix_permissions: Option<u32>) -> Self {
        self.unix_permissions = unix_permissions;
        self
    }

    /// Crc and sizes follow the data in a data descriptor.
    pub fn is_deferred(&self) -> bool {
        self.general_purpose_flags & EXTENDED_LOCAL_HEADER_FLAG != 0
    }

    /// The local header uses ZIP64 sizes, either as placeholders or for real.
    pub fn is_local_zip64(&self) -> bool {
        self.is_deferred() || needs_zip64(self.uncompressed_size, FieldKind::LocalEntrySize)
    }

    pub fn version_needed(&self) -> u16 {
        if self.is_local_zip64() {
            VERSION_NEEDED_ZIP64
        } else {
            VERSION_NEEDED_DEFAULT
        }
    }

    pub fn central_version_needed(&self) -> u16 {
        if self.is_local_zip64() || !central_extra_field(self).is_empty() {
            VERSION_NEEDED_ZIP64
        } else {
            VERSION_NEEDED_DEFAULT
        }
    }

    pub fn version_made_by(&self) -> u16 {
        let host = if self.unix_permissions.is_some() {
            HOST_UNIX
        } else {
            HOST_MS_DOS
        };
        host << 8 | VERSION_NEEDED_ZIP64
    }

    pub fn external_file_attributes(&self) -> u32 {
        let unix_mode = |file_type: u32| {
            self.unix_permissions
                .map_or(0, |permissions| (file_type | permissions) << 16)
        };
        if self.directory {
            unix_mode(UNIX_DIRECTORY) | MS_DOS_DIRECTORY_ATTRIBUTE
        } else {
            unix_mode(UNIX_REGULAR_FILE)
        }
    }
}

pub fn local_extra_field(entry: &ArchiveFileEntry) -> ExtraFieldZIP64ExtendedInformation {
    if entry.is_deferred() {
        ExtraFieldZIP64ExtendedInformation::default()
    } else {
        ExtraFieldZIP64ExtendedInformation::local(entry.uncompressed_size)
    }
}

pub fn central_extra_field(entry: &ArchiveFileEntry) -> ExtraFieldZIP64ExtendedInformation {
    ExtraFieldZIP64ExtendedInformation::central(entry.uncompressed_size, entry.offset)
}

pub fn file_header_size(entry: &ArchiveFileEntry) -> u64 {
    FILE_HEADER_BASE_SIZE
        + entry.file_name.len() as u64
        + local_extra_field(entry).size() as u64
}

pub fn build_file_header(entry: &ArchiveFileEntry) -> ArchiveDescriptor {
    let extra_field = local_extra_field(entry);
    let (crc32, size) = if entry.is_deferred() {
        (0, u32::MAX)
    } else {
        (
            entry.crc32,
            field_u32(entry.uncompressed_size, FieldKind::LocalEntrySize),
        )
    };

    let mut file_header = ArchiveDescriptor::new(file_header_size(entry));
    file_header.write_u32(LOCAL_FILE_HEADER_SIGNATURE);
    file_header.write_u16(entry.version_needed());
    file_header.write_u16(entry.general_purpose_flags);
    file_header.write_u16(STORE_COMPRESSION_METHOD);
    file_header.write_u16(entry.last_mod_file_time);
    file_header.write_u16(entry.last_mod_file_date);
    file_header.write_u32(crc32);
    file_header.write_u32(size); // Compressed size.
    file_header.write_u32(size); // Uncompressed size.
    file_header.write_u16(entry.file_name.len() as u16);
    file_header.write_u16(extra_field.size());
    file_header.write_bytes(entry.file_name.as_bytes());
    extra_field.write(&mut file_header);
    file_header
}

pub fn data_descriptor_size(entry: &ArchiveFileEntry) -> u64 {
    if !entry.is_deferred() {
        0
    } else if needs_zip64(entry.uncompressed_size, FieldKind::LocalEntrySize) {
        DESCRIPTOR_ZIP64_SIZE
    } else {
        DESCRIPTOR_SIZE
    }
}

pub fn build_data_descriptor(entry: &ArchiveFileEntry) -> ArchiveDescriptor {
    let mut data_descriptor = ArchiveDescriptor::new(data_descriptor_size(entry));
    data_descriptor.write_u32(DATA_DESCRIPTOR_SIGNATURE);
    data_descriptor.write_u32(entry.crc32);
    if needs_zip64(entry.uncompressed_size, FieldKind::LocalEntrySize) {
        data_descriptor.write_u64(entry.uncompressed_size); // Compressed size.
        data_descriptor.write_u64(entry.uncompressed_size);
    } else {
        data_descriptor.write_u32(entry.uncompressed_size as u32); // Compressed size.
        data_descriptor.write_u32(entry.uncompressed_size as u32);
    }
    data_descriptor
}

pub fn central_directory_header_size(entry: &ArchiveFileEntry) -> u64 {
    CENTRAL_DIRECTORY_ENTRY_BASE_SIZE
        + entry.file_name.len() as u64
        + central_extra_field(entry).size() as u64
}

pub fn build_central_directory_file_header(
    central_directory_header: &mut ArchiveDescriptor,
    entry: &ArchiveFileEntry,
) {
    let extra_field = central_extra_field(entry);
    let size = field_u32(entry.uncompressed_size, FieldKind::CentralEntrySize);

    central_directory_header.write_u32(CENTRAL_DIRECTORY_ENTRY_SIGNATURE);
    central_directory_header.write_u16(entry.version_made_by());
    central_directory_header.write_u16(entry.central_version_needed());
    central_directory_header.write_u16(entry.general_purpose_flags);
    central_directory_header.write_u16(STORE_COMPRESSION_METHOD);
    central_directory_header.write_u16(entry.last_mod_file_time);
    central_directory_header.write_u16(entry.last_mod_file_date);
    central_directory_header.write_u32(entry.crc32);
    central_directory_header.write_u32(size); // Compressed size.
    central_directory_header.write_u32(size); // Uncompressed size.
    central_directory_header.write_u16(entry.file_name.len() as u16);
    central_directory_header.write_u16(extra_field.size());
    central_directory_header.write_u16(0); // File comment length.
    central_directory_header.write_u16(0); // File's Disk number.
    central_directory_header.write_u16(0); // Internal file attributes.
    central_directory_header.write_u32(entry.external_file_attributes());
    central_directory_header.write_u32(field_u32(entry.offset, FieldKind::CentralOffset));
    central_directory_header.write_bytes(entry.file_name.as_bytes());
    extra_field.write(central_directory_header);
}

pub fn build_central_directory_end(
    total_number_of_entries: u64,
    central_directory_offset: u64,
    central_directory_size: u64,
) -> ArchiveDescriptor {
    let dir_end = CentralDirectoryEnd {
        total_number_of_entries,
        central_directory_size,
        offset_of_start_of_central_directory: central_directory_offset,
    };
    let mut end_of_central_directory = ArchiveDescriptor::new(dir_end.size());
    dir_end.write(&mut end_of_central_directory);
    end_of_central_directory
}
