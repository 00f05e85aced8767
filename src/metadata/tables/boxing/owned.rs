use crate::{
    interop::stubs::{BoxingStub, UnboxingStub},
    metadata::fixup::FixupTypeRef,
};

/// How values described by a boxing record are boxed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxingPolicy {
    /// Allocate an instance of the wrapper class and initialize it with the value
    Wrapper,
    /// Call the generated boxing stub
    Stub,
}

/// The `Boxing` table describes how one type is boxed for native code, similar to `BoxingRaw` but
/// with typed stubs
#[derive(Clone, Debug)]
pub struct BoxingData {
    /// Zero-based index within the module
    pub index: u32,
    /// The managed type being boxed
    pub managed_class: FixupTypeRef,
    /// The wrapper class, null if boxing goes through stubs
    pub wrapper_class: FixupTypeRef,
    /// The boxing stub
    pub boxing_stub: Option<BoxingStub>,
    /// The unboxing stub, used for objects without the wrapper capability
    pub unboxing_stub: Option<UnboxingStub>,
    /// Property type tag passed to value wrappers
    pub property_type: i16,
}

impl BoxingData {
    /// The boxing policy: wrapper if the record names a wrapper class
    #[must_use]
    pub fn policy(&self) -> BoxingPolicy {
        if self.wrapper_class.is_null() {
            BoxingPolicy::Stub
        } else {
            BoxingPolicy::Wrapper
        }
    }
}
