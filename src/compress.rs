//! <!--
//! This table shows the interpretation of the archive structure.
//!
//! <table>
//! <tr><th>Archive structure</th>
//!
//! <td>Local file header</td>
//! <td>Central directory file header</td>
//! <td>End of central directory record</td>
//! </tr>
//! <tr><th>Deferred (size or crc unknown)</th>
//! <td>
//! <p>Flag bit 3 set, crc set to 0</p>
//! <p>Uncompress and compress size set to 0xFFFFFFFF</p>
//! <p>ZIP64 Extra Field: No </p>
//! <p>Data Descriptor : Yes, ZIP64 format if size >= u32::MAX</p>
//! </td>
//! <td rowspan=2>
//! <p>Uncompress size set to 0xFFFFFFFF if >= u32::MAX</p>
//! <p>Compress size set to 0xFFFFFFFF if >= u32::MAX</p>
//! <p>Offset set to 0xFFFFFFFF if >= u32::MAX</p>
//! <p>ZIP64 Extra Field: Yes (only the fields set to 0xFFFFFFFF)</p>
//! </td>
//! <td rowspan=2>
//! <p>Zip64 format if
//! <ul>
//! <li>Number of entry >= u16::MAX OR</li>
//! <li>Central directory size >= u32::MAX OR</li>
//! <li>Central directory offset >= u32::MAX</li>
//! </ul>
//! </p>
//! </td>
//! </tr>
//! <tr><th>Known size and crc</th>
//! <td>
//! <p>uncompress size set to 0xFFFFFFFF if size >= u32::MAX</p>
//! <p>compress size set to 0xFFFFFFFF if size >= u32::MAX</p>
//! <p>ZIP64 Extra Field: Yes (if size >= u32::MAX)</p>
//! <p>Data Descriptor : N/A </p>
//! </td>
//! </tr>
//! </table>
//! -->
//!
//!

pub mod accumulator;
pub(crate) mod common;
pub mod stream;
pub mod tokio;

use crate::types::FileDateTime;

/// Metadata for a file to be archived
#[derive(Clone, Debug)]
pub struct FileOptions {
    /// The file modified time.
    pub last_modified_time: FileDateTime,

    /// Unix permissions.
    pub unix_permissions: Option<u32>,

    /// Size of the chunks read from an [`AsyncRead`](::tokio::io::AsyncRead) source.
    pub read_buffer_size: usize,
}

impl FileOptions {
    /// Set the last modified time
    ///
    /// The default is the current timestamp
    pub fn last_modified_time(mut self, mod_time: FileDateTime) -> FileOptions {
        self.last_modified_time = mod_time;
        self
    }

    /// Set the permissions for the new file.
    ///
    /// The format is represented with unix-style permissions, e.g. `0o644`
    /// for `rw-r--r--`. Without permissions, the external attributes of
    /// files are left to zero.
    ///
    /// This method only preserves the file permissions bits (via a `& 0o777`) and discards
    /// higher file mode bits. So it cannot be used to denote an entry as a directory,
    /// symlink, or other special file type.
    pub fn unix_permissions(mut self, mode: u32) -> FileOptions {
        self.unix_permissions = Some(mode & 0o777);
        self
    }

    /// Set the size of the chunks pulled from reader sources.
    ///
    /// A zero size is replaced by the default (4096).
    pub fn read_buffer_size(mut self, size: usize) -> FileOptions {
        self.read_buffer_size = if size == 0 {
            Self::DEFAULT_READ_BUFFER_SIZE
        } else {
            size
        };
        self
    }

    const DEFAULT_READ_BUFFER_SIZE: usize = 4096;
}

impl Default for FileOptions {
    /// Construct a new FileOptions object
    fn default() -> Self {
        Self {
            last_modified_time: FileDateTime::Now,
            unix_permissions: None,
            read_buffer_size: Self::DEFAULT_READ_BUFFER_SIZE,
        }
    }
}
