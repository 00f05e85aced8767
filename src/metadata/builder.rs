//! Programmatic construction of [`ModuleData`].
//!
//! The builder collects raw records, assigns their indices, lays out supported interface and
//! field offset windows, interns names into a string heap and finally serializes every table
//! through [`write_table`].
//!
//! # Example
//!
//! ```rust
//! use projscope::{ModuleDataBuilder, RawFixup, TypeHandle};
//! use projscope::metadata::tables::{CcwTemplateRaw, ClassRaw};
//!
//! let mut builder = ModuleDataBuilder::new("Contoso.Widgets");
//! builder.add_class(ClassRaw {
//!     class_type: RawFixup::from(TypeHandle::new(0x1000)),
//!     ..Default::default()
//! });
//! builder.add_template(
//!     CcwTemplateRaw {
//!         class_type: RawFixup::from(TypeHandle::new(0x1000)),
//!         ..Default::default()
//!     },
//!     &[RawFixup::from(TypeHandle::new(0x2000))],
//! );
//!
//! let data = builder.build()?;
//! assert_eq!(data.classes.len(), 32);
//! assert_eq!(data.supported_interfaces.len(), 8);
//! # Ok::<(), projscope::Error>(())
//! ```

use std::collections::HashMap;

use crate::{
    interop::{dispatch::DispatchDescriptor, stubs::Stub, stubs::StubTable},
    metadata::{
        fixup::RawFixup,
        module::ModuleData,
        tables::{
            write_table, AdditionalClassNameRaw, AdditionalClassRaw, BoxingNameRaw, BoxingRaw,
            CcwFactoryRaw, CcwTemplateRaw, ClassRaw, CollectionRaw, FieldOffsetRaw,
            GenericArgumentRaw, HashcodeVerifyRaw, InterfaceRaw, PInvokeDelegateRaw,
            StructMarshalRaw, SupportedInterfaceRaw, TableId, TypeNameMarshalingRaw,
        },
    },
    Result,
};

/// Collects the records of one module and serializes them into a [`ModuleData`].
///
/// Every `add_*` method returns the zero-based index the record will have in its table.
#[derive(Default)]
pub struct ModuleDataBuilder {
    name: String,
    interfaces: Vec<InterfaceRaw>,
    classes: Vec<ClassRaw>,
    templates: Vec<CcwTemplateRaw>,
    supported_interfaces: Vec<SupportedInterfaceRaw>,
    boxing: Vec<BoxingRaw>,
    boxing_names: Vec<u32>,
    structs: Vec<StructMarshalRaw>,
    field_offsets: Vec<FieldOffsetRaw>,
    collections: Vec<CollectionRaw>,
    additional_classes: Vec<AdditionalClassRaw>,
    additional_class_names: Vec<u32>,
    generic_arguments: Vec<GenericArgumentRaw>,
    pinvoke_delegates: Vec<PInvokeDelegateRaw>,
    hashcode_verify: Vec<HashcodeVerifyRaw>,
    type_name_marshaling: Vec<TypeNameMarshalingRaw>,
    ccw_factories: Vec<CcwFactoryRaw>,
    strings: StringHeapBuilder,
    descriptors: Vec<DispatchDescriptor>,
    stubs: StubTable,
}

impl ModuleDataBuilder {
    /// Start an empty module named `name`
    pub fn new(name: impl Into<String>) -> Self {
        ModuleDataBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append an interface record
    pub fn add_interface(&mut self, mut row: InterfaceRaw) -> u32 {
        let index = next_index(self.interfaces.len());
        row.index = index;
        self.interfaces.push(row);
        index
    }

    /// Append a class record
    pub fn add_class(&mut self, mut row: ClassRaw) -> u32 {
        let index = next_index(self.classes.len());
        row.index = index;
        self.classes.push(row);
        index
    }

    /// Append a template whose supported interface window holds exactly `interfaces`
    pub fn add_template(&mut self, mut row: CcwTemplateRaw, interfaces: &[RawFixup]) -> u32 {
        row.supported_interface_start = next_window(self.supported_interfaces.len());
        row.supported_interface_count = next_window(interfaces.len());
        for interface in interfaces {
            self.supported_interfaces.push(SupportedInterfaceRaw {
                index: next_index(self.supported_interfaces.len()),
                interface: *interface,
            });
        }

        self.add_raw_template(row)
    }

    /// Append a template keeping its window fields as given
    pub fn add_raw_template(&mut self, mut row: CcwTemplateRaw) -> u32 {
        let index = next_index(self.templates.len());
        row.index = index;
        self.templates.push(row);
        index
    }

    /// Append a boxing record, optionally named by its runtime class name
    pub fn add_boxing(&mut self, mut row: BoxingRaw, name: Option<&str>) -> u32 {
        let index = next_index(self.boxing.len());
        row.index = index;
        self.boxing.push(row);
        let name = name.map_or(0, |name| self.strings.intern(name));
        self.boxing_names.push(name);
        index
    }

    /// Append a struct whose field window holds exactly `offsets`
    pub fn add_struct(&mut self, mut row: StructMarshalRaw, offsets: &[u32]) -> u32 {
        row.field_offset_start = next_window(self.field_offsets.len());
        row.field_count = next_window(offsets.len());
        for offset in offsets {
            self.field_offsets.push(FieldOffsetRaw {
                index: next_index(self.field_offsets.len()),
                offset: *offset,
            });
        }

        self.add_raw_struct(row)
    }

    /// Append a struct keeping its window fields as given
    pub fn add_raw_struct(&mut self, mut row: StructMarshalRaw) -> u32 {
        let index = next_index(self.structs.len());
        row.index = index;
        self.structs.push(row);
        index
    }

    /// Append a collection projection
    pub fn add_collection(&mut self, mut row: CollectionRaw) -> u32 {
        let index = next_index(self.collections.len());
        row.index = index;
        self.collections.push(row);
        index
    }

    /// Append a fallback class record for the runtime class `name`
    pub fn add_additional_class(&mut self, mut row: AdditionalClassRaw, name: &str) -> u32 {
        let index = next_index(self.additional_classes.len());
        row.index = index;
        self.additional_classes.push(row);
        let name = self.strings.intern(name);
        self.additional_class_names.push(name);
        index
    }

    /// Append a generic argument record
    pub fn add_generic_argument(&mut self, mut row: GenericArgumentRaw) -> u32 {
        let index = next_index(self.generic_arguments.len());
        row.index = index;
        self.generic_arguments.push(row);
        index
    }

    /// Append a delegate record
    pub fn add_pinvoke_delegate(&mut self, mut row: PInvokeDelegateRaw) -> u32 {
        let index = next_index(self.pinvoke_delegates.len());
        row.index = index;
        self.pinvoke_delegates.push(row);
        index
    }

    /// Append the expected hash code of a type
    pub fn add_hashcode_verify(&mut self, mut row: HashcodeVerifyRaw) -> u32 {
        let index = next_index(self.hashcode_verify.len());
        row.index = index;
        self.hashcode_verify.push(row);
        index
    }

    /// Append a type marshalled by name
    pub fn add_type_name_marshaling(&mut self, mut row: TypeNameMarshalingRaw) -> u32 {
        let index = next_index(self.type_name_marshaling.len());
        row.index = index;
        self.type_name_marshaling.push(row);
        index
    }

    /// Append an activation factory
    pub fn add_ccw_factory(&mut self, mut row: CcwFactoryRaw) -> u32 {
        let index = next_index(self.ccw_factories.len());
        row.index = index;
        self.ccw_factories.push(row);
        index
    }

    /// Register a dispatch descriptor and return its one-based id
    pub fn add_descriptor(&mut self, descriptor: DispatchDescriptor) -> u32 {
        self.descriptors.push(descriptor);
        next_index(self.descriptors.len())
    }

    /// Register a stub and return its one-based id
    pub fn add_stub(&mut self, stub: Stub) -> u32 {
        self.stubs.push(stub)
    }

    /// Serialize every table.
    ///
    /// Name tables are only emitted when at least one record is named.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a window table outgrew its signed index range, or
    /// an error from serializing a record.
    pub fn build(self) -> Result<ModuleData> {
        for (table, len) in [
            (TableId::SupportedInterface, self.supported_interfaces.len()),
            (TableId::FieldOffset, self.field_offsets.len()),
        ] {
            if i32::try_from(len).is_err() {
                return Err(malformed_error!("{:?} table holds {} entries", table, len));
            }
        }

        let boxing_names = name_rows(&self.boxing_names, |index, name| BoxingNameRaw {
            index,
            name,
        });
        let additional_class_names =
            name_rows(&self.additional_class_names, |index, name| {
                AdditionalClassNameRaw { index, name }
            });

        Ok(ModuleData {
            name: self.name,
            interfaces: write_table(&self.interfaces)?,
            classes: write_table(&self.classes)?,
            ccw_templates: write_table(&self.templates)?,
            supported_interfaces: write_table(&self.supported_interfaces)?,
            boxing: write_table(&self.boxing)?,
            boxing_names: write_table(&boxing_names)?,
            struct_marshal: write_table(&self.structs)?,
            field_offsets: write_table(&self.field_offsets)?,
            collections: write_table(&self.collections)?,
            additional_classes: write_table(&self.additional_classes)?,
            additional_class_names: write_table(&additional_class_names)?,
            generic_arguments: write_table(&self.generic_arguments)?,
            pinvoke_delegates: write_table(&self.pinvoke_delegates)?,
            hashcode_verify: write_table(&self.hashcode_verify)?,
            type_name_marshaling: write_table(&self.type_name_marshaling)?,
            ccw_factories: write_table(&self.ccw_factories)?,
            strings: self.strings.finish(),
            descriptors: self.descriptors,
            stubs: self.stubs,
        })
    }
}

fn name_rows<T>(names: &[u32], row: impl Fn(u32, u32) -> T) -> Vec<T> {
    if names.iter().all(|name| *name == 0) {
        return Vec::new();
    }

    names
        .iter()
        .enumerate()
        .map(|(index, name)| row(next_index(index), *name))
        .collect()
}

fn next_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn next_window(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// Interns NUL-terminated strings into a heap whose first byte is the empty string.
#[derive(Default)]
struct StringHeapBuilder {
    data: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl StringHeapBuilder {
    fn intern(&mut self, value: &str) -> u32 {
        if value.is_empty() {
            return 0;
        }

        if let Some(offset) = self.offsets.get(value) {
            return *offset;
        }

        if self.data.is_empty() {
            self.data.push(0);
        }

        let offset = next_index(self.data.len());
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        self.offsets.insert(value.to_string(), offset);
        offset
    }

    fn finish(self) -> Vec<u8> {
        self.data
    }
}
