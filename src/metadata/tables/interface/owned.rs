use crate::{
    interop::dispatch::{DispatchDescriptor, SharedShape},
    metadata::{fixup::FixupTypeRef, tables::InterfaceFlags},
};

/// Where the dispatch table of an interface comes from, decided once at load.
#[derive(Clone, Debug)]
pub enum DispatchSource {
    /// The interface carries its own descriptor, or none at all
    Own(Option<DispatchDescriptor>),
    /// The interface uses the pooled table of a shared shape; any own descriptor is ignored
    Shared(SharedShape),
}

/// The `Interface` table describes one projected interface, similar to `InterfaceRaw` but with
/// typed flags, lazily resolved type references and a decided dispatch source
#[derive(Clone, Debug)]
pub struct InterfaceData {
    /// Zero-based index within the module
    pub index: u32,
    /// The managed interface type
    pub itf_type: FixupTypeRef,
    /// The class implementing the interface's dispatch, may be null
    pub dispatch_class: FixupTypeRef,
    /// The dynamic adapter class, may be null
    pub dynamic_adapter_class: FixupTypeRef,
    /// The interface GUID
    pub guid: uguid::Guid,
    /// Flag bits, including the shared dispatch selector
    pub flags: InterfaceFlags,
    /// Index of the interface's marshalling data
    pub marshal_index: i16,
    /// The decided dispatch source
    pub dispatch: DispatchSource,
}

impl InterfaceData {
    /// Returns true if the interface derives from the native base interface
    #[must_use]
    pub fn is_native_base_interface(&self) -> bool {
        self.flags.contains(InterfaceFlags::NATIVE_BASE)
    }

    /// Returns true if the interface is the shape of a delegate
    #[must_use]
    pub fn is_delegate(&self) -> bool {
        self.flags.contains(InterfaceFlags::DELEGATE)
    }

    /// Returns true if the interface is only used inside the runtime
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.flags.contains(InterfaceFlags::INTERNAL)
    }

    /// Returns true if the interface is either native-based or a delegate shape
    #[must_use]
    pub fn is_native_base_or_delegate(&self) -> bool {
        self.flags
            .intersects(InterfaceFlags::NATIVE_BASE | InterfaceFlags::DELEGATE)
    }

    /// Returns true if the record names a dynamic adapter class
    #[must_use]
    pub fn has_dynamic_adapter_class(&self) -> bool {
        !self.dynamic_adapter_class.is_null()
    }

    /// The shared shape selected by the flags, if any
    #[must_use]
    pub fn shared_shape(&self) -> Option<SharedShape> {
        match self.dispatch {
            DispatchSource::Shared(shape) => Some(shape),
            DispatchSource::Own(_) => None,
        }
    }
}
