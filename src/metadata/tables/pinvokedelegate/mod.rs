//! `PInvokeDelegate` table module
//!
//! Native entry points generated for a delegate type: the reverse stub called by native code, its
//! open static variant, and the stub creating a delegate around a native function pointer.

use crate::{
    file::io::{read_le_at, write_le_at},
    interop::stubs::NativeEntry,
    metadata::{
        fixup::{FixupTypeRef, RawFixup},
        tables::{
            read_fixup_at, write_fixup_at, DecodeContext, RowReadable, RowWritable, TableId,
        },
    },
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// The `PInvokeDelegate` table lists the entry points of a delegate, `TableId` = 0x0C
pub struct PInvokeDelegateRaw {
    /// Zero-based index within the module
    pub index: u32,
    /// The delegate type
    pub delegate: RawFixup,
    /// One-based stub id of the reverse stub, `0` if none
    pub reverse_stub: u32,
    /// One-based stub id of the reverse stub for open static delegates, `0` if none
    pub reverse_open_static_stub: u32,
    /// One-based stub id of the delegate creation stub, `0` if none
    pub forward_creation_stub: u32,
}

impl PInvokeDelegateRaw {
    /// Convert a `PInvokeDelegateRaw` into a `PInvokeDelegateData`, decoding the entry points.
    ///
    /// # Errors
    /// Returns an error if a stub id is invalid or does not name a native entry point.
    pub fn to_owned(&self, context: &DecodeContext) -> Result<PInvokeDelegateData> {
        let entry = |id: u32| -> Result<Option<NativeEntry>> {
            context.stubs.decode(id, TableId::PInvokeDelegate, self.index)
        };

        Ok(PInvokeDelegateData {
            index: self.index,
            delegate: FixupTypeRef::from_raw(self.delegate),
            reverse_stub: entry(self.reverse_stub)?,
            reverse_open_static_stub: entry(self.reverse_open_static_stub)?,
            forward_creation_stub: entry(self.forward_creation_stub)?,
        })
    }
}

impl RowReadable for PInvokeDelegateRaw {
    const TABLE: TableId = TableId::PInvokeDelegate;

    #[rustfmt::skip]
    const ROW_SIZE: usize =
        /* delegate */                 8 +
        /* reverse_stub */             4 +
        /* reverse_open_static_stub */ 4 +
        /* forward_creation_stub */    4;

    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self> {
        Ok(PInvokeDelegateRaw {
            index,
            delegate: read_fixup_at(data, offset)?,
            reverse_stub: read_le_at::<u32>(data, offset)?,
            reverse_open_static_stub: read_le_at::<u32>(data, offset)?,
            forward_creation_stub: read_le_at::<u32>(data, offset)?,
        })
    }
}

impl RowWritable for PInvokeDelegateRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_fixup_at(data, offset, self.delegate)?;
        write_le_at(data, offset, self.reverse_stub)?;
        write_le_at(data, offset, self.reverse_open_static_stub)?;
        write_le_at(data, offset, self.forward_creation_stub)
    }
}

/// The `PInvokeDelegate` table lists the entry points of a delegate, with decoded stubs
#[derive(Clone, Debug)]
pub struct PInvokeDelegateData {
    /// Zero-based index within the module
    pub index: u32,
    /// The delegate type
    pub delegate: FixupTypeRef,
    /// Reverse stub called by native code
    pub reverse_stub: Option<NativeEntry>,
    /// Reverse stub for open static delegates
    pub reverse_open_static_stub: Option<NativeEntry>,
    /// Creates a delegate around a native function pointer
    pub forward_creation_stub: Option<NativeEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        interop::stubs::{Stub, StubTable},
        metadata::tables::MetadataTable,
    };

    #[test]
    fn crafted_short() {
        #[rustfmt::skip]
        let data = vec![
            0x00, 0xB0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // delegate
            0x01, 0x00, 0x00, 0x00,                         // reverse_stub
            0x00, 0x00, 0x00, 0x00,                         // reverse_open_static_stub
            0x02, 0x00, 0x00, 0x00,                         // forward_creation_stub
        ];

        let table = MetadataTable::<PInvokeDelegateRaw>::new(&data).unwrap();
        let row = table.get(0).unwrap();
        assert_eq!(row.delegate, RawFixup(0xB000));

        let mut stubs = StubTable::new();
        stubs.push(Stub::Native(NativeEntry(0x1000)));
        stubs.push(Stub::Native(NativeEntry(0x2000)));
        let context = DecodeContext {
            module: 0,
            stubs: &stubs,
            descriptors: &[],
        };

        let owned = row.to_owned(&context).unwrap();
        assert_eq!(owned.reverse_stub, Some(NativeEntry(0x1000)));
        assert_eq!(owned.reverse_open_static_stub, None);
        assert_eq!(owned.forward_creation_stub, Some(NativeEntry(0x2000)));
    }
}
