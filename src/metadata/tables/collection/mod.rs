//! `Collection` table module
//!
//! A collection projection pairs a managed collection type with the element types it is
//! projected over (a key/value pair for dictionaries, a single element for lists).

use crate::{
    metadata::{
        fixup::{FixupTypeRef, RawFixup},
        tables::{read_fixup_at, write_fixup_at, RowReadable, RowWritable, TableId},
    },
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// The `Collection` table describes one collection projection, `TableId` = 0x08
pub struct CollectionRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// The projected collection type
    pub collection: RawFixup,
    /// The first element type
    pub first: RawFixup,
    /// The second element type, null for single element collections
    pub second: RawFixup,
}

impl CollectionRaw {
    /// Convert a `CollectionRaw` into a `CollectionData`
    #[must_use]
    pub fn to_owned(&self) -> CollectionData {
        CollectionData {
            index: self.index,
            collection: FixupTypeRef::from_raw(self.collection),
            first: FixupTypeRef::from_raw(self.first),
            second: FixupTypeRef::from_raw(self.second),
        }
    }
}

impl RowReadable for CollectionRaw {
    const TABLE: TableId = TableId::Collection;

    #[rustfmt::skip]
    const ROW_SIZE: usize =
        /* collection */ 8 +
        /* first */      8 +
        /* second */     8;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(CollectionRaw {
            index,
            collection: read_fixup_at(data, offset)?,
            first: read_fixup_at(data, offset)?,
            second: read_fixup_at(data, offset)?,
        })
    }
}

impl RowWritable for CollectionRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_fixup_at(data, offset, self.collection)?;
        write_fixup_at(data, offset, self.first)?;
        write_fixup_at(data, offset, self.second)
    }
}

/// The `Collection` table describes one collection projection, with lazily resolved types
#[derive(Clone, Debug)]
pub struct CollectionData {
    /// Zero-based index within the module
    pub index: u32,
    /// The projected collection type
    pub collection: FixupTypeRef,
    /// The first element type
    pub first: FixupTypeRef,
    /// The second element type, null for single element collections
    pub second: FixupTypeRef,
}
