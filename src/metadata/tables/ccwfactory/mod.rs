//! `CcwFactory` table module

use crate::{
    metadata::{
        fixup::{FixupTypeRef, RawFixup},
        tables::{read_fixup_at, write_fixup_at, RowReadable, RowWritable, TableId},
    },
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// The `CcwFactory` table names a managed activation factory exposed to native code,
/// `TableId` = 0x0F
pub struct CcwFactoryRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// The factory type
    pub factory_type: RawFixup,
}

impl CcwFactoryRaw {
    /// Convert a `CcwFactoryRaw` into a `CcwFactoryData`
    #[must_use]
    pub fn to_owned(&self) -> CcwFactoryData {
        CcwFactoryData {
            index: self.index,
            factory_type: FixupTypeRef::from_raw(self.factory_type),
        }
    }
}

impl RowReadable for CcwFactoryRaw {
    const TABLE: TableId = TableId::CcwFactory;

    #[rustfmt::skip]
    const ROW_SIZE: usize =
        /* factory_type */ 8;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(CcwFactoryRaw {
            index,
            factory_type: read_fixup_at(data, offset)?,
        })
    }
}

impl RowWritable for CcwFactoryRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_fixup_at(data, offset, self.factory_type)
    }
}

/// The `CcwFactory` table names a managed activation factory, lazily resolved
#[derive(Clone, Debug)]
pub struct CcwFactoryData {
    /// Zero-based index within the module
    pub index: u32,
    /// The factory type
    pub factory_type: FixupTypeRef,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{write_table, MetadataTable};

    #[test]
    fn crafted_short() {
        #[rustfmt::skip]
        let data = vec![
            0x00, 0x55, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // factory_type
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // factory_type
        ];

        let table = MetadataTable::<CcwFactoryRaw>::new(&data).unwrap();
        assert_eq!(table.get(0).unwrap().factory_type, RawFixup(0x5500));
        assert!(table.get(1).unwrap().to_owned().factory_type.is_null());

        let rows: Vec<CcwFactoryRaw> = table.iter().map(|row| row.unwrap()).collect();
        assert_eq!(write_table(&rows).unwrap(), data);
    }
}
