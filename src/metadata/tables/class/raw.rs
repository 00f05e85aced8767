use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::{
        fixup::{FixupTypeRef, RawFixup},
        tables::{
            read_fixup_at, write_fixup_at, ClassData, ClassFlags, RecordLink, RowReadable,
            RowWritable, TableId,
        },
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `Class` table describes one projected class, `TableId` = 0x01
pub struct ClassRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// The managed class type
    pub class_type: RawFixup,
    /// Raw `ClassFlags`
    pub flags: u32,
    /// Identity of the base class, used when `base_class_index` is negative
    pub base_class: RawFixup,
    /// Index of the base class in this module's `Class` table, `-1` if none
    pub base_class_index: i16,
    /// Identity of the default interface, used when `default_interface_index` is negative
    pub default_interface: RawFixup,
    /// Index of the default interface in this module's `Interface` table, `-1` if none
    pub default_interface_index: i16,
}

impl Default for ClassRaw {
    fn default() -> Self {
        ClassRaw {
            index: 0,
            class_type: RawFixup::NULL,
            flags: 0,
            base_class: RawFixup::NULL,
            base_class_index: -1,
            default_interface: RawFixup::NULL,
            default_interface_index: -1,
        }
    }
}

impl ClassRaw {
    /// Convert a `ClassRaw` into a `ClassData`, deciding both links
    #[must_use]
    pub fn to_owned(&self) -> ClassData {
        ClassData {
            index: self.index,
            class_type: FixupTypeRef::from_raw(self.class_type),
            flags: ClassFlags::from_bits_retain(self.flags),
            base_class: RecordLink::decode(i32::from(self.base_class_index), self.base_class),
            default_interface: RecordLink::decode(
                i32::from(self.default_interface_index),
                self.default_interface,
            ),
        }
    }
}

impl RowReadable for ClassRaw {
    const TABLE: TableId = TableId::Class;

    #[rustfmt::skip]
    const ROW_SIZE: usize =
        /* class_type */              8 +
        /* flags */                   4 +
        /* base_class */              8 +
        /* base_class_index */        2 +
        /* default_interface */       8 +
        /* default_interface_index */ 2;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(ClassRaw {
            index,
            class_type: read_fixup_at(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            base_class: read_fixup_at(data, offset)?,
            base_class_index: read_le_at::<i16>(data, offset)?,
            default_interface: read_fixup_at(data, offset)?,
            default_interface_index: read_le_at::<i16>(data, offset)?,
        })
    }
}

impl RowWritable for ClassRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_fixup_at(data, offset, self.class_type)?;
        write_le_at(data, offset, self.flags)?;
        write_fixup_at(data, offset, self.base_class)?;
        write_le_at(data, offset, self.base_class_index)?;
        write_fixup_at(data, offset, self.default_interface)?;
        write_le_at(data, offset, self.default_interface_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        tables::{GcPressure, MarshalingBehavior, MetadataTable},
        token::TypeHandle,
    };

    #[test]
    fn crafted_short() {
        #[rustfmt::skip]
        let data = vec![
            0x00, 0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // class_type
            0xCE, 0x00, 0x00, 0x00,                         // flags
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // base_class
            0xFF, 0xFF,                                     // base_class_index
            0x00, 0x30, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // default_interface
            0x04, 0x00,                                     // default_interface_index
        ];

        let table = MetadataTable::<ClassRaw>::new(&data).unwrap();
        let row = table.get(0).unwrap();
        assert_eq!(row.class_type, RawFixup(0x2000));
        assert_eq!(row.flags, 0xCE);
        assert_eq!(row.base_class_index, -1);
        assert_eq!(row.default_interface_index, 4);

        let owned = row.to_owned();
        assert_eq!(owned.base_class, RecordLink::Absent);
        assert_eq!(owned.default_interface, RecordLink::Local(4));
        assert_eq!(owned.marshaling_behavior(), MarshalingBehavior::Free);
        assert_eq!(owned.gc_pressure(), GcPressure::Medium);
        assert!(owned.is_sealed());
        assert!(owned.is_native_projected_type());
        assert!(owned.is_native_object_backed());
        assert_eq!(
            owned.class_type,
            FixupTypeRef::resolved(TypeHandle::new(0x2000))
        );
    }

    #[test]
    fn flag_decoding() {
        let decode = |flags: u32| ClassFlags::from_bits_retain(flags);

        assert_eq!(MarshalingBehavior::from_flags(decode(0)), MarshalingBehavior::Unknown);
        assert_eq!(MarshalingBehavior::from_flags(decode(1)), MarshalingBehavior::Inhibit);
        assert_eq!(MarshalingBehavior::from_flags(decode(3)), MarshalingBehavior::Standard);
        assert_eq!(GcPressure::from_flags(decode(0x04)), GcPressure::Default);
        assert_eq!(GcPressure::from_flags(decode(0x08)), GcPressure::Low);
        assert_eq!(GcPressure::from_flags(decode(0x10)), GcPressure::High);
        assert_eq!(GcPressure::from_flags(decode(0x14)), GcPressure::None);

        let owned = ClassRaw {
            flags: 0x20,
            ..Default::default()
        }
        .to_owned();
        assert!(!owned.is_native_object_backed());
        assert!(!owned.is_sealed());
    }
}
