//! `FieldOffset` table module
//!
//! Native byte offsets of struct fields, addressed by the windows of `StructMarshal` records.

use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::tables::{RowReadable, RowWritable, TableId},
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// The native offset of one struct field, `TableId` = 0x07
pub struct FieldOffsetRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// Offset of the field in bytes
    pub offset: u32,
}

impl RowReadable for FieldOffsetRaw {
    const TABLE: TableId = TableId::FieldOffset;
    const ROW_SIZE: usize = 4;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(FieldOffsetRaw {
            index,
            offset: read_le_at::<u32>(data, offset)?,
        })
    }
}

impl RowWritable for FieldOffsetRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_le_at(data, offset, self.offset)
    }
}
