//! Name tables
//!
//! The `BoxingName` and `AdditionalClassName` tables run parallel to the `Boxing` and
//! `AdditionalClass` tables: entry `i` names the runtime class of record `i` through an offset
//! into the module's string heap. Both are folded into name maps while the module is loaded.

use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::tables::{RowReadable, RowWritable, TableId},
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Runtime class name of a boxing record, `TableId` = 0x05
pub struct BoxingNameRaw {
    /// Zero-based index, equal to the index of the boxing record
    pub index: u32,
    /// Offset into the string heap
    pub name: u32,
}

impl RowReadable for BoxingNameRaw {
    const TABLE: TableId = TableId::BoxingName;
    const ROW_SIZE: usize = 4;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(BoxingNameRaw {
            index,
            name: read_le_at::<u32>(data, offset)?,
        })
    }
}

impl RowWritable for BoxingNameRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_le_at(data, offset, self.name)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Runtime class name of an additional class record, `TableId` = 0x0A
pub struct AdditionalClassNameRaw {
    /// Zero-based index, equal to the index of the additional class record
    pub index: u32,
    /// Offset into the string heap
    pub name: u32,
}

impl RowReadable for AdditionalClassNameRaw {
    const TABLE: TableId = TableId::AdditionalClassName;
    const ROW_SIZE: usize = 4;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(AdditionalClassNameRaw {
            index,
            name: read_le_at::<u32>(data, offset)?,
        })
    }
}

impl RowWritable for AdditionalClassNameRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_le_at(data, offset, self.name)
    }
}
