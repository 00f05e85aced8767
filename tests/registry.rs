//! Integration tests for registry queries spanning several modules.
//!
//! Every registry here is assembled from module tables written with [`ModuleDataBuilder`], so the
//! binary decoding path is exercised together with the queries.

use std::sync::Arc;

use projscope::metadata::tables::{CcwTemplateRaw, ClassRaw, InterfaceRaw};
use projscope::prelude::*;

/// GUID `{00000035-0000-0000-C000-000000000046}` as laid out in the interface table
const IINSPECTABLE_GUID: [u8; 16] = [
    0x35, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46,
];

fn handle(value: u64) -> RawFixup {
    RawFixup::from(TypeHandle::new(value))
}

fn template(class_type: u64, parent_index: i32, base_type: RawFixup) -> CcwTemplateRaw {
    CcwTemplateRaw {
        class_type: handle(class_type),
        base_type,
        parent_index,
        ..Default::default()
    }
}

fn collect(registry: &InteropRegistry, module: usize, index: u32) -> Result<Vec<TypeHandle>> {
    registry.implemented_interfaces(module, index)?.collect()
}

fn values(handles: &[u64]) -> Vec<TypeHandle> {
    handles.iter().copied().map(TypeHandle::new).collect()
}

#[test]
fn inspectable_uses_shared_pool_slot() -> Result<()> {
    let shared = Arc::new(DispatchTable::new("IInspectable", vec![0x1000, 0x1008, 0x1010]));

    let mut builder = ModuleDataBuilder::new("System.Runtime");
    builder.add_interface(InterfaceRaw {
        itf_type: handle(0x300),
        guid: IINSPECTABLE_GUID,
        flags: 0x08,
        dispatch_descriptor: 0,
        ..Default::default()
    });

    let registry = InteropRegistry::builder()
        .module(builder.build()?)
        .shared_dispatch(StaticDispatchProvider::new().with(SharedShape::List, shared.clone()))
        .build()?;

    let table = registry.dispatch_table(0, 0)?.expect("shared table");
    assert!(Arc::ptr_eq(&table, &shared));
    assert_eq!(table.entry(1), Some(0x1008));

    let guid = uguid::guid!("00000035-0000-0000-c000-000000000046");
    assert_eq!(
        registry.find_interface_by_guid(guid),
        Some(RecordLocation { module: 0, index: 0 })
    );
    Ok(())
}

#[test]
fn class_without_base() -> Result<()> {
    let mut builder = ModuleDataBuilder::new("classes");
    builder.add_class(ClassRaw {
        class_type: handle(0x500),
        base_class_index: -1,
        base_class: RawFixup::NULL,
        ..Default::default()
    });

    let registry = InteropRegistry::builder().module(builder.build()?).build()?;

    assert_eq!(registry.class_type(0, 0)?, TypeHandle::new(0x500));
    assert_eq!(registry.base_class(0, 0)?, None);
    assert_eq!(registry.default_interface(0, 0)?, None);
    Ok(())
}

#[test]
fn class_links_across_modules() -> Result<()> {
    let mut framework = ModuleDataBuilder::new("framework");
    framework.add_interface(InterfaceRaw {
        itf_type: handle(0x100),
        ..Default::default()
    });
    framework.add_class(ClassRaw {
        class_type: handle(0x600),
        ..Default::default()
    });

    let mut app = ModuleDataBuilder::new("app");
    app.add_class(ClassRaw {
        class_type: handle(0x700),
        base_class: handle(0x600),
        default_interface: handle(0x100),
        ..Default::default()
    });
    app.add_class(ClassRaw {
        class_type: handle(0x800),
        base_class_index: 0,
        ..Default::default()
    });

    let registry = InteropRegistry::builder()
        .modules([framework.build()?, app.build()?])
        .build()?;

    assert_eq!(registry.base_class(1, 0)?, Some(TypeHandle::new(0x600)));
    assert_eq!(registry.default_interface(1, 0)?, Some(TypeHandle::new(0x100)));
    assert_eq!(registry.base_class(1, 1)?, Some(TypeHandle::new(0x700)));
    assert_eq!(
        registry.find_class_by_type(TypeHandle::new(0x600)),
        Some(RecordLocation { module: 0, index: 0 })
    );
    Ok(())
}

#[test]
fn chain_follows_deferred_cross_module_parent() -> Result<()> {
    let parent_token = Token::new(0x0200_0010);

    // X in module 0
    let mut framework = ModuleDataBuilder::new("framework");
    framework.add_template(template(0x1000, -1, RawFixup::NULL), &[handle(0xB1)]);

    // T1 has a deferred cross-module parent X, T2 has local parent T1
    let mut app = ModuleDataBuilder::new("app");
    let t1 = app.add_template(
        template(0x2000, -1, RawFixup::from(parent_token)),
        &[handle(0xB2)],
    );
    app.add_template(template(0x3000, t1 as i32, RawFixup::NULL), &[handle(0xB3)]);

    let types = TypeMap::new();
    types.insert(parent_token, TypeHandle::new(0x1000));

    let registry = InteropRegistry::builder()
        .modules([framework.build()?, app.build()?])
        .resolver(types)
        .build()?;

    assert_eq!(collect(&registry, 1, 1)?, values(&[0xB3, 0xB2, 0xB1]));
    assert_eq!(registry.template_base_class(1, 0)?, Some(TypeHandle::new(0x1000)));

    // Memoized resolution gives the same answer on the second walk
    assert_eq!(collect(&registry, 1, 1)?, values(&[0xB3, 0xB2, 0xB1]));
    Ok(())
}

#[test]
fn unresolvable_record_does_not_break_chain() -> Result<()> {
    // Template 0 names a type no resolver knows, template 1 is the parent X
    let mut framework = ModuleDataBuilder::new("framework");
    framework.add_template(
        CcwTemplateRaw {
            class_type: RawFixup::from(Token::new(0x0200_0099)),
            ..Default::default()
        },
        &[handle(0xA1)],
    );
    framework.add_template(template(0x1000, -1, RawFixup::NULL), &[handle(0xB1)]);

    let mut app = ModuleDataBuilder::new("app");
    app.add_template(template(0x2000, -1, handle(0x1000)), &[handle(0xB2)]);

    let registry = InteropRegistry::builder()
        .modules([framework.build()?, app.build()?])
        .config(RegistryConfig::strict())
        .build()?;

    assert_eq!(
        registry.find_template_by_type(TypeHandle::new(0x1000)),
        Some(RecordLocation { module: 0, index: 1 })
    );
    assert_eq!(collect(&registry, 1, 0)?, values(&[0xB2, 0xB1]));

    // The failure still surfaces when the broken record itself is queried
    assert!(matches!(
        registry.resolve(&registry.template_data(0, 0)?.class_type),
        Err(Error::TypeResolution(_))
    ));
    Ok(())
}

#[test]
fn diamond_interfaces_are_reported_once() -> Result<()> {
    let mut builder = ModuleDataBuilder::new("diamond");
    let root = builder.add_template(
        template(0x10, -1, RawFixup::NULL),
        &[handle(0xC2), handle(0xC3)],
    );
    builder.add_template(
        template(0x20, root as i32, RawFixup::NULL),
        &[handle(0xC1), RawFixup::NULL, handle(0xC2), handle(0xC1)],
    );

    let registry = InteropRegistry::builder().module(builder.build()?).build()?;

    assert_eq!(collect(&registry, 0, 1)?, values(&[0xC1, 0xC2, 0xC3]));
    Ok(())
}

fn unknown_parent_module() -> Result<ModuleData> {
    let mut builder = ModuleDataBuilder::new("orphan");
    builder.add_template(template(0x40, -1, handle(0xDEAD)), &[handle(0xD1)]);
    builder.build()
}

#[test]
fn lenient_mode_ends_chain_at_unknown_parent() -> Result<()> {
    let registry = InteropRegistry::builder()
        .module(unknown_parent_module()?)
        .build()?;

    assert_eq!(collect(&registry, 0, 0)?, values(&[0xD1]));
    Ok(())
}

#[test]
fn strict_mode_rejects_unknown_parent() -> Result<()> {
    let registry = InteropRegistry::builder()
        .module(unknown_parent_module()?)
        .config(RegistryConfig::strict())
        .build()?;

    let mut walk = registry.implemented_interfaces(0, 0)?;
    assert_eq!(walk.next().transpose()?, Some(TypeHandle::new(0xD1)));
    assert!(matches!(
        walk.next(),
        Some(Err(Error::AmbiguousCrossModuleReference(missing))) if missing == TypeHandle::new(0xDEAD)
    ));
    assert!(walk.next().is_none());
    Ok(())
}

#[test]
fn unresolvable_token_is_reported() -> Result<()> {
    let mut builder = ModuleDataBuilder::new("deferred");
    builder.add_interface(InterfaceRaw {
        itf_type: RawFixup::from(Token::new(0x0200_0099)),
        ..Default::default()
    });

    let registry = InteropRegistry::builder().module(builder.build()?).build()?;

    assert!(matches!(
        registry.interface_type(0, 0),
        Err(Error::TypeResolution(token)) if token == Token::new(0x0200_0099)
    ));
    Ok(())
}

#[test]
fn bad_addresses() -> Result<()> {
    let registry = InteropRegistry::builder()
        .module(ModuleDataBuilder::new("empty").build()?)
        .build()?;

    assert!(matches!(
        registry.class_data(3, 0),
        Err(Error::ModuleNotFound(3))
    ));
    assert!(matches!(
        registry.interface_data(0, 0),
        Err(Error::IndexOutOfRange { index: 0, len: 0, .. })
    ));
    assert!(registry.implemented_interfaces(0, 0).is_err());
    Ok(())
}
