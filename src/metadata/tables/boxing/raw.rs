use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::{
        fixup::{FixupTypeRef, RawFixup},
        tables::{
            read_fixup_at, write_fixup_at, BoxingData, DecodeContext, RowReadable, RowWritable,
            TableId,
        },
    },
    Result,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// The `Boxing` table describes how one type is boxed for native code, `TableId` = 0x04
pub struct BoxingRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// The managed type being boxed
    pub managed_class: RawFixup,
    /// The wrapper class, null if boxing goes through stubs
    pub wrapper_class: RawFixup,
    /// One-based id of the boxing stub, `0` if none
    pub boxing_stub: u32,
    /// One-based id of the unboxing stub, `0` if none
    pub unboxing_stub: u32,
    /// Property type tag passed to value wrappers
    pub property_type: i16,
    /// Reserved, always zero
    pub reserved: i16,
}

impl BoxingRaw {
    /// Convert a `BoxingRaw` into a `BoxingData`, decoding both stubs.
    ///
    /// # Errors
    /// Returns an error if a stub id is out of range or names a stub of another kind.
    pub fn to_owned(&self, context: &DecodeContext) -> Result<BoxingData> {
        Ok(BoxingData {
            index: self.index,
            managed_class: FixupTypeRef::from_raw(self.managed_class),
            wrapper_class: FixupTypeRef::from_raw(self.wrapper_class),
            boxing_stub: context
                .stubs
                .decode(self.boxing_stub, TableId::Boxing, self.index)?,
            unboxing_stub: context
                .stubs
                .decode(self.unboxing_stub, TableId::Boxing, self.index)?,
            property_type: self.property_type,
        })
    }
}

impl RowReadable for BoxingRaw {
    const TABLE: TableId = TableId::Boxing;

    #[rustfmt::skip]
    const ROW_SIZE: usize =
        /* managed_class */ 8 +
        /* wrapper_class */ 8 +
        /* boxing_stub */   4 +
        /* unboxing_stub */ 4 +
        /* property_type */ 2 +
        /* reserved */      2;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(BoxingRaw {
            index,
            managed_class: read_fixup_at(data, offset)?,
            wrapper_class: read_fixup_at(data, offset)?,
            boxing_stub: read_le_at::<u32>(data, offset)?,
            unboxing_stub: read_le_at::<u32>(data, offset)?,
            property_type: read_le_at::<i16>(data, offset)?,
            reserved: read_le_at::<i16>(data, offset)?,
        })
    }
}

impl RowWritable for BoxingRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_fixup_at(data, offset, self.managed_class)?;
        write_fixup_at(data, offset, self.wrapper_class)?;
        write_le_at(data, offset, self.boxing_stub)?;
        write_le_at(data, offset, self.unboxing_stub)?;
        write_le_at(data, offset, self.property_type)?;
        write_le_at(data, offset, self.reserved)
    }
}
