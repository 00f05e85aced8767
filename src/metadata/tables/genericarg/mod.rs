//! `GenericArgument` table module
//!
//! Marshalling data of one generic argument `T`: its size and the projected types built over it.

use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::{
        fixup::{FixupTypeRef, RawFixup},
        tables::{read_fixup_at, write_fixup_at, RowReadable, RowWritable, TableId},
    },
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// The `GenericArgument` table describes one generic argument, `TableId` = 0x0B
pub struct GenericArgumentRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// Size of `T` in bytes
    pub element_size: u32,
    /// Class of `T` when it is a sealed runtime class
    pub element_class: RawFixup,
    /// Interface of `T` when it is an interface type
    pub element_interface: RawFixup,
    /// The asynchronous operation over `T`
    pub async_operation: RawFixup,
    /// The iterator over `T`
    pub iterator: RawFixup,
    /// The read-only list over `T`
    pub list_view: RawFixup,
}

impl GenericArgumentRaw {
    /// Convert a `GenericArgumentRaw` into a `GenericArgumentData`
    #[must_use]
    pub fn to_owned(&self) -> GenericArgumentData {
        GenericArgumentData {
            index: self.index,
            element_size: self.element_size,
            element_class: FixupTypeRef::from_raw(self.element_class),
            element_interface: FixupTypeRef::from_raw(self.element_interface),
            async_operation: FixupTypeRef::from_raw(self.async_operation),
            iterator: FixupTypeRef::from_raw(self.iterator),
            list_view: FixupTypeRef::from_raw(self.list_view),
        }
    }
}

impl RowReadable for GenericArgumentRaw {
    const TABLE: TableId = TableId::GenericArgument;

    #[rustfmt::skip]
    const ROW_SIZE: usize =
        /* element_size */      4 +
        /* element_class */     8 +
        /* element_interface */ 8 +
        /* async_operation */   8 +
        /* iterator */          8 +
        /* list_view */         8;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(GenericArgumentRaw {
            index,
            element_size: read_le_at::<u32>(data, offset)?,
            element_class: read_fixup_at(data, offset)?,
            element_interface: read_fixup_at(data, offset)?,
            async_operation: read_fixup_at(data, offset)?,
            iterator: read_fixup_at(data, offset)?,
            list_view: read_fixup_at(data, offset)?,
        })
    }
}

impl RowWritable for GenericArgumentRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_le_at(data, offset, self.element_size)?;
        write_fixup_at(data, offset, self.element_class)?;
        write_fixup_at(data, offset, self.element_interface)?;
        write_fixup_at(data, offset, self.async_operation)?;
        write_fixup_at(data, offset, self.iterator)?;
        write_fixup_at(data, offset, self.list_view)
    }
}

/// The `GenericArgument` table describes one generic argument, with lazily resolved types
#[derive(Clone, Debug)]
pub struct GenericArgumentData {
    /// Zero-based index within the module
    pub index: u32,
    /// Size of `T` in bytes
    pub element_size: u32,
    /// Class of `T` when it is a sealed runtime class
    pub element_class: FixupTypeRef,
    /// Interface of `T` when it is an interface type
    pub element_interface: FixupTypeRef,
    /// The asynchronous operation over `T`
    pub async_operation: FixupTypeRef,
    /// The iterator over `T`
    pub iterator: FixupTypeRef,
    /// The read-only list over `T`
    pub list_view: FixupTypeRef,
}
