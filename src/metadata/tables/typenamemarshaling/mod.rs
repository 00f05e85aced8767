//! `TypeNameMarshaling` table module
//!
//! Types the generator did not import as projected classes but whose runtime class names still
//! cross the boundary, for example when a type is passed by name to native code.

use crate::{
    metadata::{
        fixup::{FixupTypeRef, RawFixup},
        tables::{read_fixup_at, write_fixup_at, RowReadable, RowWritable, TableId},
    },
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// The `TypeNameMarshaling` table names a type marshalled by name, `TableId` = 0x0E
pub struct TypeNameMarshalingRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// The type marshalled by name
    pub class_type: RawFixup,
}

impl TypeNameMarshalingRaw {
    /// Convert a `TypeNameMarshalingRaw` into a `TypeNameMarshalingData`
    #[must_use]
    pub fn to_owned(&self) -> TypeNameMarshalingData {
        TypeNameMarshalingData {
            index: self.index,
            class_type: FixupTypeRef::from_raw(self.class_type),
        }
    }
}

impl RowReadable for TypeNameMarshalingRaw {
    const TABLE: TableId = TableId::TypeNameMarshaling;

    #[rustfmt::skip]
    const ROW_SIZE: usize =
        /* class_type */ 8;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(TypeNameMarshalingRaw {
            index,
            class_type: read_fixup_at(data, offset)?,
        })
    }
}

impl RowWritable for TypeNameMarshalingRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_fixup_at(data, offset, self.class_type)
    }
}

/// The `TypeNameMarshaling` table names a type marshalled by name, lazily resolved
#[derive(Clone, Debug)]
pub struct TypeNameMarshalingData {
    /// Zero-based index within the module
    pub index: u32,
    /// The type marshalled by name
    pub class_type: FixupTypeRef,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::MetadataTable;

    #[test]
    fn crafted_short() {
        #[rustfmt::skip]
        let data = vec![
            0x00, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // class_type
        ];

        let table = MetadataTable::<TypeNameMarshalingRaw>::new(&data).unwrap();
        let owned = table.get(0).unwrap().to_owned();
        assert_eq!(owned.index, 0);
        assert!(!owned.class_type.is_null());
        assert!(table.get(1).is_none());
    }
}
