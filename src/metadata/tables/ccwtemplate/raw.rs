use crate::{
    file::io::{read_bytes_at, read_le_at, write_bytes_at, write_le_at},
    metadata::{
        fixup::{FixupTypeRef, RawFixup},
        tables::{
            decode_window, read_fixup_at, write_fixup_at, CcwTemplateData, RecordLink,
            RowReadable, RowWritable, TableId,
        },
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `CcwTemplate` table describes the native wrapper of a managed class, `TableId` = 0x02
pub struct CcwTemplateRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// The managed class the template wraps
    pub class_type: RawFixup,
    /// Identity of the base type, used when `parent_index` is negative
    pub base_type: RawFixup,
    /// Index of the parent template in this module, `-1` if none or defined elsewhere
    pub parent_index: i32,
    /// First entry of the template's window into the `SupportedInterface` table
    pub supported_interface_start: i32,
    /// Number of entries in the window
    pub supported_interface_count: i32,
    /// Non-zero if the template is a native root type, walked but never instantiated
    pub is_native_root: u8,
    /// Reserved, always zero
    pub reserved: [u8; 3],
}

impl Default for CcwTemplateRaw {
    fn default() -> Self {
        CcwTemplateRaw {
            index: 0,
            class_type: RawFixup::NULL,
            base_type: RawFixup::NULL,
            parent_index: -1,
            supported_interface_start: 0,
            supported_interface_count: 0,
            is_native_root: 0,
            reserved: [0; 3],
        }
    }
}

impl CcwTemplateRaw {
    /// Convert a `CcwTemplateRaw` into a `CcwTemplateData`.
    ///
    /// An empty window is valid wherever it starts; a non-empty one must have a non-negative
    /// start and count.
    ///
    /// # Errors
    /// Returns an error if the supported interface window is negative or overflows.
    pub fn to_owned(&self) -> Result<CcwTemplateData> {
        let Some(interfaces) =
            decode_window(self.supported_interface_start, self.supported_interface_count)
        else {
            return Err(malformed_error!(
                "Template {} has an invalid interface window {}+{}",
                self.index,
                self.supported_interface_start,
                self.supported_interface_count
            ));
        };

        Ok(CcwTemplateData {
            index: self.index,
            class_type: FixupTypeRef::from_raw(self.class_type),
            base_type: FixupTypeRef::from_raw(self.base_type),
            parent: RecordLink::decode(self.parent_index, self.base_type),
            interfaces,
            is_native_root: self.is_native_root != 0,
        })
    }
}

impl RowReadable for CcwTemplateRaw {
    const TABLE: TableId = TableId::CcwTemplate;

    #[rustfmt::skip]
    const ROW_SIZE: usize =
        /* class_type */                8 +
        /* base_type */                 8 +
        /* parent_index */              4 +
        /* supported_interface_start */ 4 +
        /* supported_interface_count */ 4 +
        /* is_native_root */            1 +
        /* reserved */                  3;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(CcwTemplateRaw {
            index,
            class_type: read_fixup_at(data, offset)?,
            base_type: read_fixup_at(data, offset)?,
            parent_index: read_le_at::<i32>(data, offset)?,
            supported_interface_start: read_le_at::<i32>(data, offset)?,
            supported_interface_count: read_le_at::<i32>(data, offset)?,
            is_native_root: read_le_at::<u8>(data, offset)?,
            reserved: read_bytes_at::<3>(data, offset)?,
        })
    }
}

impl RowWritable for CcwTemplateRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_fixup_at(data, offset, self.class_type)?;
        write_fixup_at(data, offset, self.base_type)?;
        write_le_at(data, offset, self.parent_index)?;
        write_le_at(data, offset, self.supported_interface_start)?;
        write_le_at(data, offset, self.supported_interface_count)?;
        write_le_at(data, offset, self.is_native_root)?;
        write_bytes_at(data, offset, &self.reserved)
    }
}
