//! Field width policy.
//!
//! Per APPNOTE 4.4.1.4, a header field too small to hold its value is written
//! as its maximum value (the sentinel, `0xFFFF` or `0xFFFFFFFF`) and the real
//! value moves to a ZIP64 record attached to the same header. A value equal to
//! the sentinel is ambiguous, so it overflows too.

/// The header fields whose width can be exceeded.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FieldKind {
    /// Compressed and uncompressed sizes of a local file header.
    LocalEntrySize,
    /// Compressed and uncompressed sizes of a central directory header.
    CentralEntrySize,
    /// Local header offset in a central directory header.
    CentralOffset,
    /// Entry counts of the end of central directory record.
    TotalEntries,
    /// Central directory size in the end of central directory record.
    CentralDirectorySize,
    /// Central directory offset in the end of central directory record.
    CentralDirectoryOffset,
}

impl FieldKind {
    /// The sentinel written in the classic field when the value does not fit.
    pub const fn sentinel(self) -> u64 {
        match self {
            FieldKind::TotalEntries => u16::MAX as u64,
            _ => u32::MAX as u64,
        }
    }
}

/// Does `value` require the ZIP64 representation in a field of kind `kind`?
pub fn needs_zip64(value: u64, kind: FieldKind) -> bool {
    value >= kind.sentinel()
}

/// The value to write in the classic 32 bits field: the value itself or the sentinel.
pub(crate) fn field_u32(value: u64, kind: FieldKind) -> u32 {
    if needs_zip64(value, kind) {
        u32::MAX
    } else {
        value as u32
    }
}

/// The value to write in the classic 16 bits entry count field.
pub(crate) fn field_u16(value: u64) -> u16 {
    if needs_zip64(value, FieldKind::TotalEntries) {
        u16::MAX
    } else {
        value as u16
    }
}
