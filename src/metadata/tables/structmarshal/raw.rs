use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::{
        fixup::{FixupTypeRef, RawFixup},
        tables::{
            decode_window, read_fixup_at, write_fixup_at, DecodeContext, RowReadable,
            RowWritable, StructMarshalData, StructMarshalFlags, TableId,
        },
    },
    Result,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// The `StructMarshal` table describes how a struct crosses the boundary, `TableId` = 0x06
pub struct StructMarshalRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// The managed struct as seen by managed code
    pub safe_struct: RawFixup,
    /// The blittable struct matching the native layout
    pub unsafe_struct: RawFixup,
    /// One-based id of the marshal stub, `0` if none
    pub marshal_stub: u32,
    /// One-based id of the unmarshal stub, `0` if none
    pub unmarshal_stub: u32,
    /// One-based id of the destroy stub, `0` if none
    pub destroy_stub: u32,
    /// Raw `StructMarshalFlags`
    pub flags: u32,
    /// First entry of the struct's window into the `FieldOffset` table
    pub field_offset_start: i32,
    /// Number of fields in the window
    pub field_count: i32,
}

impl StructMarshalRaw {
    /// Convert a `StructMarshalRaw` into a `StructMarshalData`, decoding the stubs.
    ///
    /// # Errors
    /// Returns an error if a stub id is invalid or the field window is negative.
    pub fn to_owned(&self, context: &DecodeContext) -> Result<StructMarshalData> {
        let Some(field_offsets) = decode_window(self.field_offset_start, self.field_count) else {
            return Err(malformed_error!(
                "Struct {} has an invalid field window {}+{}",
                self.index,
                self.field_offset_start,
                self.field_count
            ));
        };

        Ok(StructMarshalData {
            index: self.index,
            safe_struct: FixupTypeRef::from_raw(self.safe_struct),
            unsafe_struct: FixupTypeRef::from_raw(self.unsafe_struct),
            marshal_stub: context
                .stubs
                .decode(self.marshal_stub, TableId::StructMarshal, self.index)?,
            unmarshal_stub: context
                .stubs
                .decode(self.unmarshal_stub, TableId::StructMarshal, self.index)?,
            destroy_stub: context
                .stubs
                .decode(self.destroy_stub, TableId::StructMarshal, self.index)?,
            flags: StructMarshalFlags::from_bits_retain(self.flags),
            field_offsets,
        })
    }
}

impl RowReadable for StructMarshalRaw {
    const TABLE: TableId = TableId::StructMarshal;

    #[rustfmt::skip]
    const ROW_SIZE: usize =
        /* safe_struct */        8 +
        /* unsafe_struct */      8 +
        /* marshal_stub */       4 +
        /* unmarshal_stub */     4 +
        /* destroy_stub */       4 +
        /* flags */              4 +
        /* field_offset_start */ 4 +
        /* field_count */        4;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(StructMarshalRaw {
            index,
            safe_struct: read_fixup_at(data, offset)?,
            unsafe_struct: read_fixup_at(data, offset)?,
            marshal_stub: read_le_at::<u32>(data, offset)?,
            unmarshal_stub: read_le_at::<u32>(data, offset)?,
            destroy_stub: read_le_at::<u32>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            field_offset_start: read_le_at::<i32>(data, offset)?,
            field_count: read_le_at::<i32>(data, offset)?,
        })
    }
}

impl RowWritable for StructMarshalRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_fixup_at(data, offset, self.safe_struct)?;
        write_fixup_at(data, offset, self.unsafe_struct)?;
        write_le_at(data, offset, self.marshal_stub)?;
        write_le_at(data, offset, self.unmarshal_stub)?;
        write_le_at(data, offset, self.destroy_stub)?;
        write_le_at(data, offset, self.flags)?;
        write_le_at(data, offset, self.field_offset_start)?;
        write_le_at(data, offset, self.field_count)
    }
}
