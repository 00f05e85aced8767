//! `HashcodeVerify` table module
//!
//! The generator records the hash code it computed for selected types. The runtime compares it
//! with its own hash of the type to detect a module built against a different type layout.

use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::{
        fixup::{FixupTypeRef, RawFixup},
        tables::{read_fixup_at, write_fixup_at, RowReadable, RowWritable, TableId},
    },
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// The `HashcodeVerify` table pairs a type with its expected hash code, `TableId` = 0x0D
pub struct HashcodeVerifyRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// The verified type
    pub type_handle: RawFixup,
    /// Hash code computed by the generator
    pub hash_code: u32,
}

impl HashcodeVerifyRaw {
    /// Convert a `HashcodeVerifyRaw` into a `HashcodeVerifyData`
    #[must_use]
    pub fn to_owned(&self) -> HashcodeVerifyData {
        HashcodeVerifyData {
            index: self.index,
            type_handle: FixupTypeRef::from_raw(self.type_handle),
            hash_code: self.hash_code,
        }
    }
}

impl RowReadable for HashcodeVerifyRaw {
    const TABLE: TableId = TableId::HashcodeVerify;

    #[rustfmt::skip]
    const ROW_SIZE: usize =
        /* type_handle */ 8 +
        /* hash_code */   4;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(HashcodeVerifyRaw {
            index,
            type_handle: read_fixup_at(data, offset)?,
            hash_code: read_le_at::<u32>(data, offset)?,
        })
    }
}

impl RowWritable for HashcodeVerifyRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_fixup_at(data, offset, self.type_handle)?;
        write_le_at(data, offset, self.hash_code)
    }
}

/// The `HashcodeVerify` table pairs a type with its expected hash code, lazily resolved
#[derive(Clone, Debug)]
pub struct HashcodeVerifyData {
    /// Zero-based index within the module
    pub index: u32,
    /// The verified type
    pub type_handle: FixupTypeRef,
    /// Hash code computed by the generator
    pub hash_code: u32,
}
