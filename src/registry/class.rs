use crate::{
    metadata::{
        tables::{ClassData, RecordLink},
        token::TypeHandle,
    },
    registry::InteropRegistry,
    Result,
};

impl InteropRegistry {
    /// The class record at `index` of `module`
    ///
    /// # Errors
    /// Returns [`crate::Error::ModuleNotFound`] or [`crate::Error::IndexOutOfRange`] for a bad
    /// address.
    pub fn class_data(&self, module: usize, index: u32) -> Result<&ClassData> {
        self.module(module)?.class(index)
    }

    /// The managed type of the class at `index` of `module`
    ///
    /// # Errors
    /// Returns an error for a bad address or an unresolvable type reference.
    pub fn class_type(&self, module: usize, index: u32) -> Result<TypeHandle> {
        self.resolve(&self.class_data(module, index)?.class_type)
    }

    /// The base class of the class at `index` of `module`.
    ///
    /// A local base is read from the same module's `Class` table; otherwise the stored identity
    /// is used. `None` if the class has no projected base.
    ///
    /// # Errors
    /// Returns an error for a bad address, including a dangling local base, or an unresolvable
    /// type reference.
    pub fn base_class(&self, module: usize, index: u32) -> Result<Option<TypeHandle>> {
        match &self.class_data(module, index)?.base_class {
            RecordLink::Local(base) => self.class_type(module, *base).map(Some),
            RecordLink::Cross(fixup) => self.resolve_present(fixup),
            RecordLink::Absent => Ok(None),
        }
    }

    /// The default interface of the class at `index` of `module`.
    ///
    /// A local default interface is read from the same module's `Interface` table.
    ///
    /// # Errors
    /// Returns an error for a bad address, including a dangling local interface, or an
    /// unresolvable type reference.
    pub fn default_interface(&self, module: usize, index: u32) -> Result<Option<TypeHandle>> {
        match &self.class_data(module, index)?.default_interface {
            RecordLink::Local(interface) => self.interface_type(module, *interface).map(Some),
            RecordLink::Cross(fixup) => self.resolve_present(fixup),
            RecordLink::Absent => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        metadata::{
            builder::ModuleDataBuilder,
            config::RegistryConfig,
            fixup::{RawFixup, TypeMap},
            tables::{ClassFlags, ClassRaw, GcPressure, InterfaceRaw, MarshalingBehavior},
            token::Token,
        },
        registry::InteropRegistry,
        Error, TypeHandle,
    };

    fn registry() -> InteropRegistry {
        let mut builder = ModuleDataBuilder::new("classes");
        let itf = builder.add_interface(InterfaceRaw {
            itf_type: RawFixup::from(TypeHandle::new(0x500)),
            ..Default::default()
        });
        let base = builder.add_class(ClassRaw {
            class_type: RawFixup::from(TypeHandle::new(0x100)),
            flags: (ClassFlags::SEALED | ClassFlags::NATIVE_PROJECTED).bits() | 0x03 | (2 << 2),
            ..Default::default()
        });
        builder.add_class(ClassRaw {
            class_type: RawFixup::from(TypeHandle::new(0x200)),
            base_class_index: base as i16,
            base_class: RawFixup::from(TypeHandle::new(0xDEAD)),
            default_interface_index: itf as i16,
            ..Default::default()
        });
        builder.add_class(ClassRaw {
            class_type: RawFixup::from(TypeHandle::new(0x300)),
            base_class: RawFixup::from(Token::new(0x02000001)),
            default_interface: RawFixup::from(TypeHandle::new(0x600)),
            ..Default::default()
        });
        builder.add_class(ClassRaw {
            class_type: RawFixup::from(Token::new(0x02000002)),
            ..Default::default()
        });

        let types = TypeMap::new();
        types.insert(Token::new(0x02000001), TypeHandle::new(0x900));

        InteropRegistry::builder()
            .module(builder.build().unwrap())
            .resolver(types)
            .build()
            .unwrap()
    }

    #[test]
    fn base_class_links() {
        let registry = registry();

        assert_eq!(registry.base_class(0, 0).unwrap(), None);
        assert_eq!(
            registry.base_class(0, 1).unwrap(),
            Some(TypeHandle::new(0x100))
        );
        assert_eq!(
            registry.base_class(0, 2).unwrap(),
            Some(TypeHandle::new(0x900))
        );
        assert_eq!(registry.base_class(0, 3).unwrap(), None);
        assert!(matches!(
            registry.class_type(0, 3),
            Err(Error::TypeResolution(token)) if token == Token::new(0x02000002)
        ));
    }

    #[test]
    fn default_interface_links() {
        let registry = registry();

        assert_eq!(registry.default_interface(0, 0).unwrap(), None);
        assert_eq!(
            registry.default_interface(0, 1).unwrap(),
            Some(TypeHandle::new(0x500))
        );
        assert_eq!(
            registry.default_interface(0, 2).unwrap(),
            Some(TypeHandle::new(0x600))
        );
    }

    #[test]
    fn class_flags() {
        let registry = registry();
        let class = registry.class_data(0, 0).unwrap();

        assert!(class.is_sealed());
        assert!(class.is_native_projected_type());
        assert!(class.is_native_object_backed());
        assert_eq!(class.marshaling_behavior(), MarshalingBehavior::Standard);
        assert_eq!(class.gc_pressure(), GcPressure::Low);
    }

    #[test]
    fn deferred_link_to_null_is_absent() {
        let mut builder = ModuleDataBuilder::new("erased");
        builder.add_class(ClassRaw {
            class_type: RawFixup::from(TypeHandle::new(0x100)),
            base_class: RawFixup::from(Token::new(0x02000003)),
            default_interface: RawFixup::from(Token::new(0x02000004)),
            ..Default::default()
        });

        let types = TypeMap::new();
        types.insert(Token::new(0x02000003), TypeHandle::NULL);
        types.insert(Token::new(0x02000004), TypeHandle::NULL);

        let registry = InteropRegistry::builder()
            .module(builder.build().unwrap())
            .resolver(types)
            .build()
            .unwrap();

        assert_eq!(registry.base_class(0, 0).unwrap(), None);
        assert_eq!(registry.default_interface(0, 0).unwrap(), None);
    }

    #[test]
    fn dangling_base_fails_on_query() {
        let mut builder = ModuleDataBuilder::new("dangling");
        builder.add_class(ClassRaw {
            base_class_index: 9,
            ..Default::default()
        });

        let registry = InteropRegistry::builder()
            .module(builder.build().unwrap())
            .config(RegistryConfig::minimal())
            .build()
            .unwrap();

        assert!(matches!(
            registry.base_class(0, 0),
            Err(Error::IndexOutOfRange { index: 9, .. })
        ));
    }
}
