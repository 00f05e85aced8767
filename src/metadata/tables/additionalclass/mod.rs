//! `AdditionalClass` table module
//!
//! Native code may hand out instances of runtime classes that were never imported into managed
//! code. Each record maps such a runtime class, named by the parallel `AdditionalClassName` table,
//! to the closest class that was imported, so callers can still cast to what they know.

use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::{
        fixup::RawFixup,
        tables::{read_fixup_at, write_fixup_at, RecordLink, RowReadable, RowWritable, TableId},
    },
    Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// The `AdditionalClass` table names a fallback class, `TableId` = 0x09
pub struct AdditionalClassRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// Index of the fallback class in this module's `Class` table, `-1` if none
    pub class_index: i32,
    /// Identity of the fallback class, used when `class_index` is negative
    pub class_type: RawFixup,
}

impl Default for AdditionalClassRaw {
    fn default() -> Self {
        AdditionalClassRaw {
            index: 0,
            class_index: -1,
            class_type: RawFixup::NULL,
        }
    }
}

impl AdditionalClassRaw {
    /// Convert an `AdditionalClassRaw` into an `AdditionalClassData`
    #[must_use]
    pub fn to_owned(&self) -> AdditionalClassData {
        AdditionalClassData {
            index: self.index,
            class: RecordLink::decode(self.class_index, self.class_type),
        }
    }
}

impl RowReadable for AdditionalClassRaw {
    const TABLE: TableId = TableId::AdditionalClass;

    #[rustfmt::skip]
    const ROW_SIZE: usize =
        /* class_index */ 4 +
        /* class_type */  8;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(AdditionalClassRaw {
            index,
            class_index: read_le_at::<i32>(data, offset)?,
            class_type: read_fixup_at(data, offset)?,
        })
    }
}

impl RowWritable for AdditionalClassRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_le_at(data, offset, self.class_index)?;
        write_fixup_at(data, offset, self.class_type)
    }
}

/// The `AdditionalClass` table names a fallback class, with a decided link into the `Class` table
#[derive(Clone, Debug)]
pub struct AdditionalClassData {
    /// Zero-based index within the module
    pub index: u32,
    /// The fallback class
    pub class: RecordLink,
}
