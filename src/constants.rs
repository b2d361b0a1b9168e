use std::mem::size_of;

pub const FILE_HEADER_BASE_SIZE: u64 = (7 * size_of::<u16>() + 4 * size_of::<u32>()) as u64;
pub const DESCRIPTOR_SIZE: u64 = 4 * size_of::<u32>() as u64;
pub const DESCRIPTOR_ZIP64_SIZE: u64 = (2 * size_of::<u32>() + 2 * size_of::<u64>()) as u64;
pub const CENTRAL_DIRECTORY_ENTRY_BASE_SIZE: u64 =
    (11 * size_of::<u16>() + 6 * size_of::<u32>()) as u64;
pub const END_OF_CENTRAL_DIRECTORY_SIZE: u64 = (5 * size_of::<u16>() + 3 * size_of::<u32>()) as u64;
pub const ZIP64_END_OF_CENTRAL_DIRECTORY_SIZE: u64 =
    (2 * size_of::<u16>() + 3 * size_of::<u32>() + 5 * size_of::<u64>()) as u64;
pub const ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIZE: u64 =
    (3 * size_of::<u32>() + size_of::<u64>()) as u64;

pub const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x04034b50;
pub const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x08074b50;
pub const CENTRAL_DIRECTORY_ENTRY_SIGNATURE: u32 = 0x02014b50;
pub const CENTRAL_DIRECTORY_END_SIGNATURE: u32 = 0x06054b50;
pub const ZIP64_CENTRAL_DIRECTORY_END_SIGNATURE: u32 = 0x06064b50;
pub const ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIGNATURE: u32 = 0x07064b50;

/// Bit 3: crc and sizes follow the data in a data descriptor.
pub const EXTENDED_LOCAL_HEADER_FLAG: u16 = 1 << 3;
/// Bit 11: file name is encoded in UTF-8.
pub const UTF8_NAME_FLAG: u16 = 1 << 11;

pub const STORE_COMPRESSION_METHOD: u16 = 0;

pub const VERSION_NEEDED_DEFAULT: u16 = 20;
pub const VERSION_NEEDED_ZIP64: u16 = 45;

pub const HOST_MS_DOS: u16 = 0;
pub const HOST_UNIX: u16 = 3;

pub const MS_DOS_DIRECTORY_ATTRIBUTE: u32 = 0x10;
pub const UNIX_REGULAR_FILE: u32 = 0o100000;
pub const UNIX_DIRECTORY: u32 = 0o040000;
