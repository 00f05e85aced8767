use std::ops::Range;

use crate::metadata::{fixup::FixupTypeRef, tables::RecordLink};

/// The `CcwTemplate` table describes the native wrapper of a managed class, similar to
/// `CcwTemplateRaw` but with a decided parent link and a checked interface window
#[derive(Clone, Debug)]
pub struct CcwTemplateData {
    /// Zero-based index within the module
    pub index: u32,
    /// The managed class the template wraps
    pub class_type: FixupTypeRef,
    /// Identity of the base type
    pub base_type: FixupTypeRef,
    /// The parent template
    pub parent: RecordLink,
    /// The template's own entries of the `SupportedInterface` table
    pub interfaces: Range<u32>,
    /// The template is a native root type
    pub is_native_root: bool,
}

impl CcwTemplateData {
    /// Returns false for native root types, which only contribute to parent chains
    #[must_use]
    pub fn instantiable(&self) -> bool {
        !self.is_native_root
    }
}
