use std::ops::Range;

use crate::{
    interop::stubs::{DestroyStub, MarshalStub, UnmarshalStub},
    metadata::{fixup::FixupTypeRef, tables::StructMarshalFlags},
};

/// The `StructMarshal` table describes how a struct crosses the boundary, similar to
/// `StructMarshalRaw` but with typed stubs and a checked field window
#[derive(Clone, Debug)]
pub struct StructMarshalData {
    /// Zero-based index within the module
    pub index: u32,
    /// The managed struct as seen by managed code
    pub safe_struct: FixupTypeRef,
    /// The blittable struct matching the native layout
    pub unsafe_struct: FixupTypeRef,
    /// Copies the managed struct into native memory
    pub marshal_stub: Option<MarshalStub>,
    /// Reads the managed struct back from native memory
    pub unmarshal_stub: Option<UnmarshalStub>,
    /// Releases what the native layout owns
    pub destroy_stub: Option<DestroyStub>,
    /// Flag bits
    pub flags: StructMarshalFlags,
    /// The struct's entries of the `FieldOffset` table
    pub field_offsets: Range<u32>,
}

impl StructMarshalData {
    /// Returns true if the struct has no usable native layout
    #[must_use]
    pub fn has_invalid_layout(&self) -> bool {
        self.flags.contains(StructMarshalFlags::HAS_INVALID_LAYOUT)
    }

    /// Number of fields with a recorded offset
    #[must_use]
    pub fn field_count(&self) -> u32 {
        self.field_offsets.end - self.field_offsets.start
    }
}
