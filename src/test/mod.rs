//! Shared fixtures for unit tests.

use crate::{
    metadata::{
        builder::ModuleDataBuilder,
        fixup::RawFixup,
        tables::{CcwTemplateRaw, InterfaceRaw},
        token::TypeHandle,
    },
    registry::InteropRegistry,
};

/// GUID `{00000035-0000-0000-C000-000000000046}` in its Microsoft byte layout
pub const IINSPECTABLE_GUID: [u8; 16] = [
    0x35, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46,
];

// Helper function to create a resolved type reference
pub fn handle(value: u64) -> RawFixup {
    RawFixup::from(TypeHandle::new(value))
}

// Helper function to create an interface record
pub fn create_interface(itf_type: u64, guid: [u8; 16], flags: u8) -> InterfaceRaw {
    InterfaceRaw {
        itf_type: handle(itf_type),
        guid,
        flags,
        ..Default::default()
    }
}

// Helper function to create a template with a local parent
pub fn create_template(class_type: u64, parent_index: Option<u32>) -> CcwTemplateRaw {
    CcwTemplateRaw {
        class_type: handle(class_type),
        parent_index: parent_index.map_or(-1, |index| index as i32),
        ..Default::default()
    }
}

// Helper function to create a template whose parent lives in another module
pub fn create_cross_template(class_type: u64, base_type: u64) -> CcwTemplateRaw {
    CcwTemplateRaw {
        class_type: handle(class_type),
        base_type: handle(base_type),
        ..Default::default()
    }
}

/// Two modules with a template chain crossing between them.
///
/// Module 0 ("framework"):
/// - template 0: root `0x0F00`, implements `0xA1`
/// - template 1: `0x1000`, parent template 0, implements `0xA2`, `0xA1`
///
/// Module 1 ("app"):
/// - template 0: `0x1100`, parent `0x1000` in module 0, implements `0xA3`
/// - template 1: `0x1200`, parent template 0, implements `0xA4`, `0xA3`
pub fn create_chain_registry() -> InteropRegistry {
    let mut framework = ModuleDataBuilder::new("framework");
    let root = framework.add_template(create_template(0x0F00, None), &[handle(0xA1)]);
    framework.add_template(
        create_template(0x1000, Some(root)),
        &[handle(0xA2), handle(0xA1)],
    );

    let mut app = ModuleDataBuilder::new("app");
    let t1 = app.add_template(create_cross_template(0x1100, 0x1000), &[handle(0xA3)]);
    app.add_template(
        create_template(0x1200, Some(t1)),
        &[handle(0xA4), handle(0xA3)],
    );

    InteropRegistry::builder()
        .module(framework.build().unwrap())
        .module(app.build().unwrap())
        .build()
        .unwrap()
}
