//! Lookups by type identity, GUID and runtime class name.
//!
//! Identity lookups scan the modules in registration order and stop at the first match. Results,
//! including misses, are memoized per registry. A record whose type reference cannot be resolved
//! matches nothing; the failure belongs to queries that start from that record.

use std::hash::Hash;

use dashmap::DashMap;

use crate::{
    metadata::{
        fixup::FixupTypeRef,
        module::InteropModule,
        tables::{
            CollectionData, GenericArgumentData, HashcodeVerifyData, PInvokeDelegateData,
            RecordLink,
        },
        token::TypeHandle,
    },
    registry::{InteropRegistry, RecordLocation},
    Result,
};

/// Memoized lookup results of one registry.
#[derive(Default)]
pub(crate) struct LookupCache {
    interfaces: DashMap<TypeHandle, Option<RecordLocation>>,
    guids: DashMap<uguid::Guid, Option<RecordLocation>>,
    classes: DashMap<TypeHandle, Option<RecordLocation>>,
    templates: DashMap<TypeHandle, Option<RecordLocation>>,
    structs: DashMap<TypeHandle, Option<RecordLocation>>,
    collections: DashMap<TypeHandle, Option<RecordLocation>>,
    delegates: DashMap<TypeHandle, Option<RecordLocation>>,
    hashcodes: DashMap<TypeHandle, Option<RecordLocation>>,
    type_names: DashMap<TypeHandle, Option<RecordLocation>>,
    factories: DashMap<TypeHandle, Option<RecordLocation>>,
}

/// Index of the first record of `records` that `matches`.
fn position<T>(records: &[T], matches: impl Fn(&T) -> bool) -> Option<u32> {
    let index = records.iter().position(matches)?;
    u32::try_from(index).ok()
}

impl InteropRegistry {
    fn find_cached<K, F>(
        &self,
        cache: &DashMap<K, Option<RecordLocation>>,
        key: K,
        scan: F,
    ) -> Option<RecordLocation>
    where
        K: Eq + Hash,
        F: Fn(&InteropModule) -> Option<u32>,
    {
        if let Some(hit) = cache.get(&key) {
            return *hit;
        }

        let found = self
            .modules()
            .iter()
            .enumerate()
            .find_map(|(module, data)| scan(data).map(|index| RecordLocation { module, index }));

        cache.insert(key, found);
        found
    }

    /// Whether `fixup` resolves to `handle`. An unresolvable reference names no type.
    fn names(&self, fixup: &FixupTypeRef, handle: TypeHandle) -> bool {
        match self.resolve(fixup) {
            Ok(resolved) => resolved == handle,
            Err(error) => {
                log::debug!("lookup of {handle} skips a record: {error}");
                false
            }
        }
    }

    /// The interface record describing the managed interface `handle`
    #[must_use]
    pub fn find_interface_by_type(&self, handle: TypeHandle) -> Option<RecordLocation> {
        self.find_cached(&self.cache.interfaces, handle, |module| {
            position(module.interfaces(), |record| self.names(&record.itf_type, handle))
        })
    }

    /// The interface record with GUID `guid`
    #[must_use]
    pub fn find_interface_by_guid(&self, guid: uguid::Guid) -> Option<RecordLocation> {
        self.find_cached(&self.cache.guids, guid, |module| {
            position(module.interfaces(), |record| record.guid == guid)
        })
    }

    /// The class record describing `handle`
    #[must_use]
    pub fn find_class_by_type(&self, handle: TypeHandle) -> Option<RecordLocation> {
        self.find_cached(&self.cache.classes, handle, |module| {
            position(module.classes(), |record| self.names(&record.class_type, handle))
        })
    }

    /// The template of the managed class `handle`
    #[must_use]
    pub fn find_template_by_type(&self, handle: TypeHandle) -> Option<RecordLocation> {
        self.find_cached(&self.cache.templates, handle, |module| {
            position(module.templates(), |record| self.names(&record.class_type, handle))
        })
    }

    /// The struct marshalling record of the managed struct `handle`
    #[must_use]
    pub fn find_struct_marshal_data(&self, handle: TypeHandle) -> Option<RecordLocation> {
        self.find_cached(&self.cache.structs, handle, |module| {
            position(module.structs(), |record| self.names(&record.safe_struct, handle))
        })
    }

    /// The collection projection of the managed collection `handle`
    #[must_use]
    pub fn find_collection_projection(&self, handle: TypeHandle) -> Option<RecordLocation> {
        self.find_cached(&self.cache.collections, handle, |module| {
            position(module.collections(), |record| {
                self.names(&record.collection, handle)
            })
        })
    }

    /// The entry points of the delegate type `handle`
    #[must_use]
    pub fn pinvoke_delegate(&self, handle: TypeHandle) -> Option<&PInvokeDelegateData> {
        let location = self.find_cached(&self.cache.delegates, handle, |module| {
            position(module.pinvoke_delegates(), |record| {
                self.names(&record.delegate, handle)
            })
        })?;

        self.modules()
            .get(location.module)?
            .pinvoke_delegates()
            .get(location.index as usize)
    }

    /// The record of `handle` in the type name marshalling table
    #[must_use]
    pub fn find_type_name_marshaling(&self, handle: TypeHandle) -> Option<RecordLocation> {
        self.find_cached(&self.cache.type_names, handle, |module| {
            position(module.type_name_marshaling(), |record| {
                self.names(&record.class_type, handle)
            })
        })
    }

    /// The activation factory record of the factory type `handle`
    #[must_use]
    pub fn find_ccw_factory(&self, handle: TypeHandle) -> Option<RecordLocation> {
        self.find_cached(&self.cache.factories, handle, |module| {
            position(module.ccw_factories(), |record| {
                self.names(&record.factory_type, handle)
            })
        })
    }

    /// The hash code the generator recorded for `handle`, `None` if it recorded none
    #[must_use]
    pub fn expected_hashcode(&self, handle: TypeHandle) -> Option<u32> {
        let location = self.find_cached(&self.cache.hashcodes, handle, |module| {
            position(module.hashcode_verify(), |record| {
                self.names(&record.type_handle, handle)
            })
        })?;

        self.modules()
            .get(location.module)?
            .hashcode_verify()
            .get(location.index as usize)
            .map(|record| record.hash_code)
    }

    /// Check the runtime hash code `hash_code` of `handle` against the generator's.
    ///
    /// A type without a recorded hash code always passes.
    #[must_use]
    pub fn verify_hashcode(&self, handle: TypeHandle, hash_code: u32) -> bool {
        self.expected_hashcode(handle)
            .map_or(true, |expected| expected == hash_code)
    }

    /// The delegate record at `index` of `module`
    ///
    /// # Errors
    /// Returns an error for a bad address.
    pub fn pinvoke_delegate_data(&self, module: usize, index: u32) -> Result<&PInvokeDelegateData> {
        self.module(module)?.pinvoke_delegate(index)
    }

    /// The expected hash code record at `index` of `module`
    ///
    /// # Errors
    /// Returns an error for a bad address.
    pub fn hashcode_verify_data(&self, module: usize, index: u32) -> Result<&HashcodeVerifyData> {
        self.module(module)?.hashcode_verify_record(index)
    }

    /// The collection projection at `index` of `module`
    ///
    /// # Errors
    /// Returns an error for a bad address.
    pub fn collection_data(&self, module: usize, index: u32) -> Result<&CollectionData> {
        self.module(module)?.collection(index)
    }

    /// The generic argument record at `index` of `module`
    ///
    /// # Errors
    /// Returns an error for a bad address.
    pub fn generic_argument_data(&self, module: usize, index: u32) -> Result<&GenericArgumentData> {
        self.module(module)?.generic_argument(index)
    }

    /// The boxing record named by the runtime class `name`, first module first
    #[must_use]
    pub fn find_boxing_by_name(&self, name: &str) -> Option<RecordLocation> {
        self.modules()
            .iter()
            .enumerate()
            .find_map(|(module, data)| {
                data.boxing_by_name(name)
                    .map(|index| RecordLocation { module, index })
            })
    }

    /// The closest imported class for the runtime class `name`.
    ///
    /// Native code may hand out classes that were never imported; each module may name a
    /// fallback for them. `None` if no module does.
    ///
    /// # Errors
    /// Returns an error for a dangling fallback index or an unresolvable type reference.
    pub fn closest_class(&self, name: &str) -> Result<Option<TypeHandle>> {
        for (module, data) in self.modules().iter().enumerate() {
            let Some(index) = data.additional_class_by_name(name) else {
                continue;
            };

            match &data.additional_class(index)?.class {
                RecordLink::Local(class) => return self.class_type(module, *class).map(Some),
                RecordLink::Cross(fixup) => return self.resolve(fixup).map(Some),
                RecordLink::Absent => {}
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        interop::stubs::{NativeEntry, Stub},
        metadata::{
            builder::ModuleDataBuilder,
            fixup::{RawFixup, TypeMap},
            tables::{
                AdditionalClassRaw, BoxingRaw, CcwFactoryRaw, CcwTemplateRaw, ClassRaw,
                CollectionRaw, HashcodeVerifyRaw, InterfaceRaw, PInvokeDelegateRaw,
                StructMarshalRaw, TypeNameMarshalingRaw,
            },
            token::Token,
        },
        registry::{InteropRegistry, RecordLocation},
        TypeHandle,
    };

    fn handle(value: u64) -> RawFixup {
        RawFixup::from(TypeHandle::new(value))
    }

    fn registry() -> InteropRegistry {
        let mut first = ModuleDataBuilder::new("first");
        first.add_interface(InterfaceRaw {
            itf_type: handle(0x100),
            guid: [0x11; 16],
            ..Default::default()
        });
        first.add_class(ClassRaw {
            class_type: handle(0x200),
            ..Default::default()
        });
        first.add_boxing(BoxingRaw::default(), Some("Contoso.Shared"));
        first.add_additional_class(
            AdditionalClassRaw {
                class_index: 0,
                ..Default::default()
            },
            "Contoso.Hidden",
        );

        let mut second = ModuleDataBuilder::new("second");
        second.add_interface(InterfaceRaw::default());
        second.add_interface(InterfaceRaw {
            itf_type: RawFixup::from(Token::new(0x02000007)),
            guid: [0x22; 16],
            ..Default::default()
        });
        second.add_template(
            CcwTemplateRaw {
                class_type: handle(0x300),
                ..Default::default()
            },
            &[],
        );
        second.add_struct(
            StructMarshalRaw {
                safe_struct: handle(0x400),
                ..Default::default()
            },
            &[0, 4],
        );
        second.add_collection(CollectionRaw {
            collection: handle(0x500),
            first: handle(0x501),
            ..Default::default()
        });
        let reverse = second.add_stub(Stub::Native(NativeEntry(0xF000)));
        second.add_pinvoke_delegate(PInvokeDelegateRaw {
            delegate: handle(0x600),
            reverse_stub: reverse,
            ..Default::default()
        });
        second.add_boxing(BoxingRaw::default(), Some("Contoso.Shared"));
        second.add_boxing(BoxingRaw::default(), Some("Contoso.Point"));
        second.add_additional_class(
            AdditionalClassRaw {
                class_type: handle(0x700),
                ..Default::default()
            },
            "Contoso.Other",
        );
        second.add_hashcode_verify(HashcodeVerifyRaw {
            type_handle: handle(0x800),
            hash_code: 0xCAFE_F00D,
            ..Default::default()
        });
        second.add_type_name_marshaling(TypeNameMarshalingRaw {
            class_type: handle(0x900),
            ..Default::default()
        });
        second.add_ccw_factory(CcwFactoryRaw {
            factory_type: handle(0xA00),
            ..Default::default()
        });

        let types = TypeMap::new();
        types.insert(Token::new(0x02000007), TypeHandle::new(0x110));

        InteropRegistry::builder()
            .module(first.build().unwrap())
            .module(second.build().unwrap())
            .resolver(types)
            .build()
            .unwrap()
    }

    fn at(module: usize, index: u32) -> Option<RecordLocation> {
        Some(RecordLocation { module, index })
    }

    #[test]
    fn identity_lookups() {
        let registry = registry();

        assert_eq!(registry.find_interface_by_type(TypeHandle::new(0x100)), at(0, 0));
        assert_eq!(registry.find_interface_by_type(TypeHandle::new(0x110)), at(1, 1));
        assert_eq!(
            registry.find_interface_by_guid(uguid::Guid::from_bytes([0x22; 16])),
            at(1, 1)
        );
        assert_eq!(registry.find_class_by_type(TypeHandle::new(0x200)), at(0, 0));
        assert_eq!(registry.find_template_by_type(TypeHandle::new(0x300)), at(1, 0));
        assert_eq!(registry.find_struct_marshal_data(TypeHandle::new(0x400)), at(1, 0));
        assert_eq!(registry.find_collection_projection(TypeHandle::new(0x500)), at(1, 0));
        assert_eq!(registry.find_type_name_marshaling(TypeHandle::new(0x900)), at(1, 0));
        assert_eq!(registry.find_ccw_factory(TypeHandle::new(0xA00)), at(1, 0));
        assert_eq!(registry.find_ccw_factory(TypeHandle::new(0x900)), None);
        assert_eq!(registry.find_class_by_type(TypeHandle::new(0x999)), None);
    }

    #[test]
    fn misses_are_cached() {
        let registry = registry();
        assert_eq!(registry.find_template_by_type(TypeHandle::new(0x999)), None);
        assert!(registry.cache.templates.contains_key(&TypeHandle::new(0x999)));
    }

    #[test]
    fn unresolvable_records_are_skipped() {
        let mut builder = ModuleDataBuilder::new("deferred");
        builder.add_class(ClassRaw {
            class_type: RawFixup::from(Token::new(0x02000042)),
            ..Default::default()
        });
        builder.add_class(ClassRaw {
            class_type: handle(0x1),
            ..Default::default()
        });

        let registry = InteropRegistry::builder()
            .module(builder.build().unwrap())
            .build()
            .unwrap();
        assert_eq!(registry.find_class_by_type(TypeHandle::new(0x1)), at(0, 1));
        assert_eq!(registry.find_class_by_type(TypeHandle::new(0x2)), None);

        // The record itself still reports its failure
        assert!(registry.class_type(0, 0).is_err());
    }

    #[test]
    fn hashcodes() {
        let registry = registry();

        assert_eq!(
            registry.expected_hashcode(TypeHandle::new(0x800)),
            Some(0xCAFE_F00D)
        );
        assert!(registry.verify_hashcode(TypeHandle::new(0x800), 0xCAFE_F00D));
        assert!(!registry.verify_hashcode(TypeHandle::new(0x800), 0x1234));
        assert!(registry.verify_hashcode(TypeHandle::new(0x801), 0x1234));
        assert_eq!(registry.hashcode_verify_data(1, 0).unwrap().hash_code, 0xCAFE_F00D);
        assert!(registry.hashcode_verify_data(0, 0).is_err());
    }

    #[test]
    fn names() {
        let registry = registry();

        assert_eq!(registry.find_boxing_by_name("Contoso.Shared"), at(0, 0));
        assert_eq!(registry.find_boxing_by_name("Contoso.Point"), at(1, 1));
        assert_eq!(registry.find_boxing_by_name("Contoso.Missing"), None);

        assert_eq!(
            registry.closest_class("Contoso.Hidden").unwrap(),
            Some(TypeHandle::new(0x200))
        );
        assert_eq!(
            registry.closest_class("Contoso.Other").unwrap(),
            Some(TypeHandle::new(0x700))
        );
        assert_eq!(registry.closest_class("Contoso.Missing").unwrap(), None);
    }

    #[test]
    fn delegates_and_collections() {
        let registry = registry();

        let delegate = registry.pinvoke_delegate(TypeHandle::new(0x600)).unwrap();
        assert_eq!(delegate.reverse_stub, Some(NativeEntry(0xF000)));
        assert_eq!(delegate.forward_creation_stub, None);
        assert!(registry.pinvoke_delegate(TypeHandle::new(0x601)).is_none());

        let collection = registry.collection_data(1, 0).unwrap();
        assert_eq!(registry.resolve(&collection.first).unwrap(), TypeHandle::new(0x501));
        assert!(collection.second.is_null());
    }
}
