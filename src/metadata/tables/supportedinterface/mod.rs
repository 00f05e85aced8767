//! `SupportedInterface` table module
//!
//! Entries are shared by all templates of a module; each template addresses its own contiguous
//! window. Records decode straight into a [`crate::FixupTypeRef`], there is no separate owned type.

use crate::{
    metadata::{
        fixup::{FixupTypeRef, RawFixup},
        tables::{read_fixup_at, write_fixup_at, RowReadable, RowWritable, TableId},
    },
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// One interface of a template window, `TableId` = 0x03
pub struct SupportedInterfaceRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// The interface type
    pub interface: RawFixup,
}

impl SupportedInterfaceRaw {
    /// Convert a `SupportedInterfaceRaw` into its type reference
    #[must_use]
    pub fn to_owned(&self) -> FixupTypeRef {
        FixupTypeRef::from_raw(self.interface)
    }
}

impl RowReadable for SupportedInterfaceRaw {
    const TABLE: TableId = TableId::SupportedInterface;
    const ROW_SIZE: usize = 8;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(SupportedInterfaceRaw {
            index,
            interface: read_fixup_at(data, offset)?,
        })
    }
}

impl RowWritable for SupportedInterfaceRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_fixup_at(data, offset, self.interface)
    }
}
