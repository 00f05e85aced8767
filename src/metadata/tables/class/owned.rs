use crate::metadata::{
    fixup::FixupTypeRef,
    tables::{ClassFlags, GcPressure, MarshalingBehavior, RecordLink},
};

/// The `Class` table describes one projected class, similar to `ClassRaw` but with typed flags and
/// decided links.
///
/// A local `base_class` addresses the `Class` table of the same module; a local
/// `default_interface` addresses its `Interface` table.
#[derive(Clone, Debug)]
pub struct ClassData {
    /// Zero-based index within the module
    pub index: u32,
    /// The managed class type
    pub class_type: FixupTypeRef,
    /// Flag bits
    pub flags: ClassFlags,
    /// The base class
    pub base_class: RecordLink,
    /// The default interface
    pub default_interface: RecordLink,
}

impl ClassData {
    /// How instances may be marshalled between threads
    #[must_use]
    pub fn marshaling_behavior(&self) -> MarshalingBehavior {
        MarshalingBehavior::from_flags(self.flags)
    }

    /// The native memory pressure of an instance
    #[must_use]
    pub fn gc_pressure(&self) -> GcPressure {
        GcPressure::from_flags(self.flags)
    }

    /// Returns true if the class cannot be derived from
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.flags.contains(ClassFlags::SEALED)
    }

    /// Returns true if the class projects a native runtime type
    #[must_use]
    pub fn is_native_projected_type(&self) -> bool {
        self.flags.contains(ClassFlags::NATIVE_PROJECTED)
    }

    /// Returns true if instances are backed by a native object
    #[must_use]
    pub fn is_native_object_backed(&self) -> bool {
        !self.flags.contains(ClassFlags::NOT_NATIVE_OBJECT_BACKED)
    }
}
