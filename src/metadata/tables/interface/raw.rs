use crate::{
    file::io::{read_bytes_at, read_le_at, write_bytes_at, write_le_at},
    interop::dispatch::SharedShape,
    metadata::{
        fixup::{FixupTypeRef, RawFixup},
        tables::{
            read_fixup_at, write_fixup_at, DecodeContext, DispatchSource, InterfaceData,
            InterfaceFlags, RowReadable, RowWritable, TableId,
        },
    },
    Result,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// The `Interface` table describes one projected interface, `TableId` = 0x00
pub struct InterfaceRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// The managed interface type
    pub itf_type: RawFixup,
    /// The class implementing the interface's dispatch, may be null
    pub dispatch_class: RawFixup,
    /// The dynamic adapter class, may be null
    pub dynamic_adapter_class: RawFixup,
    /// The interface GUID in its Microsoft byte layout
    pub guid: [u8; 16],
    /// Raw `InterfaceFlags`, including the shared dispatch selector
    pub flags: u8,
    /// Reserved, always zero
    pub reserved: u8,
    /// Index of the interface's marshalling data
    pub marshal_index: i16,
    /// One-based id of the module's dispatch descriptor, `0` if the interface has none
    pub dispatch_descriptor: u32,
}

impl InterfaceRaw {
    /// Convert an `InterfaceRaw` into an `InterfaceData` with its dispatch source decided.
    ///
    /// # Errors
    /// Returns an error if the shared dispatch selector is out of range or the descriptor id does
    /// not name one of the module's descriptors.
    pub fn to_owned(&self, context: &DecodeContext) -> Result<InterfaceData> {
        let dispatch = match SharedShape::from_flags(self.flags)? {
            Some(shape) => DispatchSource::Shared(shape),
            None if self.dispatch_descriptor == 0 => DispatchSource::Own(None),
            None => match context
                .descriptors
                .get(self.dispatch_descriptor as usize - 1)
            {
                Some(descriptor) => DispatchSource::Own(Some(descriptor.clone())),
                None => {
                    return Err(malformed_error!(
                        "Interface {} references dispatch descriptor {} of {}",
                        self.index,
                        self.dispatch_descriptor,
                        context.descriptors.len()
                    ))
                }
            },
        };

        Ok(InterfaceData {
            index: self.index,
            itf_type: FixupTypeRef::from_raw(self.itf_type),
            dispatch_class: FixupTypeRef::from_raw(self.dispatch_class),
            dynamic_adapter_class: FixupTypeRef::from_raw(self.dynamic_adapter_class),
            guid: uguid::Guid::from_bytes(self.guid),
            flags: InterfaceFlags::from_bits_retain(self.flags),
            marshal_index: self.marshal_index,
            dispatch,
        })
    }
}

impl RowReadable for InterfaceRaw {
    const TABLE: TableId = TableId::Interface;

    #[rustfmt::skip]
    const ROW_SIZE: usize =
        /* itf_type */              8 +
        /* dispatch_class */        8 +
        /* dynamic_adapter_class */ 8 +
        /* guid */                  16 +
        /* flags */                 1 +
        /* reserved */              1 +
        /* marshal_index */         2 +
        /* dispatch_descriptor */   4;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(InterfaceRaw {
            index,
            itf_type: read_fixup_at(data, offset)?,
            dispatch_class: read_fixup_at(data, offset)?,
            dynamic_adapter_class: read_fixup_at(data, offset)?,
            guid: read_bytes_at::<16>(data, offset)?,
            flags: read_le_at::<u8>(data, offset)?,
            reserved: read_le_at::<u8>(data, offset)?,
            marshal_index: read_le_at::<i16>(data, offset)?,
            dispatch_descriptor: read_le_at::<u32>(data, offset)?,
        })
    }
}

impl RowWritable for InterfaceRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_fixup_at(data, offset, self.itf_type)?;
        write_fixup_at(data, offset, self.dispatch_class)?;
        write_fixup_at(data, offset, self.dynamic_adapter_class)?;
        write_bytes_at(data, offset, &self.guid)?;
        write_le_at(data, offset, self.flags)?;
        write_le_at(data, offset, self.reserved)?;
        write_le_at(data, offset, self.marshal_index)?;
        write_le_at(data, offset, self.dispatch_descriptor)
    }
}
