//! Interop modules: the raw tables a module was generated with, and their decoded form.
//!
//! A [`ModuleData`] is what the embedding runtime hands over for every independently compiled
//! module: one byte buffer per table, the string heap, the dispatch descriptors and the stub
//! table. [`InteropModule::load`] decodes it once. Afterwards every record is immutable; the only
//! state that still changes is the memoization inside type references.

use std::{collections::HashMap, ops::Range};

use crate::{
    interop::{dispatch::DispatchDescriptor, stubs::StubTable},
    metadata::{
        config::RegistryConfig,
        fixup::FixupTypeRef,
        strings::Strings,
        tables::{
            AdditionalClassData, AdditionalClassNameRaw, AdditionalClassRaw, BoxingData,
            BoxingNameRaw, BoxingRaw, CcwFactoryData, CcwFactoryRaw, CcwTemplateData,
            CcwTemplateRaw, ClassData, ClassRaw, CollectionData, CollectionRaw, DecodeContext,
            FieldOffsetRaw, GenericArgumentData, GenericArgumentRaw, HashcodeVerifyData,
            HashcodeVerifyRaw, InterfaceData, InterfaceRaw, MetadataTable, PInvokeDelegateData,
            PInvokeDelegateRaw, RowReadable, StructMarshalData, StructMarshalRaw,
            SupportedInterfaceRaw, TableId, TypeNameMarshalingData, TypeNameMarshalingRaw,
        },
        validation::ModuleValidator,
    },
    Error::IndexOutOfRange,
    Result,
};

/// The raw inputs of one interop module.
///
/// Every table is the packed little-endian byte form of its records; an empty buffer is an empty
/// table. Use [`crate::ModuleDataBuilder`] to produce one.
#[derive(Clone, Debug, Default)]
pub struct ModuleData {
    /// Diagnostic name of the module
    pub name: String,
    /// `Interface` table
    pub interfaces: Vec<u8>,
    /// `Class` table
    pub classes: Vec<u8>,
    /// `CcwTemplate` table
    pub ccw_templates: Vec<u8>,
    /// `SupportedInterface` table
    pub supported_interfaces: Vec<u8>,
    /// `Boxing` table
    pub boxing: Vec<u8>,
    /// `BoxingName` table, empty or parallel to `boxing`
    pub boxing_names: Vec<u8>,
    /// `StructMarshal` table
    pub struct_marshal: Vec<u8>,
    /// `FieldOffset` table
    pub field_offsets: Vec<u8>,
    /// `Collection` table
    pub collections: Vec<u8>,
    /// `AdditionalClass` table
    pub additional_classes: Vec<u8>,
    /// `AdditionalClassName` table, empty or parallel to `additional_classes`
    pub additional_class_names: Vec<u8>,
    /// `GenericArgument` table
    pub generic_arguments: Vec<u8>,
    /// `PInvokeDelegate` table
    pub pinvoke_delegates: Vec<u8>,
    /// `HashcodeVerify` table
    pub hashcode_verify: Vec<u8>,
    /// `TypeNameMarshaling` table
    pub type_name_marshaling: Vec<u8>,
    /// `CcwFactory` table
    pub ccw_factories: Vec<u8>,
    /// String heap referenced by the name tables
    pub strings: Vec<u8>,
    /// Dispatch descriptors, addressed by one-based id from interface records
    pub descriptors: Vec<DispatchDescriptor>,
    /// Generated stubs, addressed by one-based id
    pub stubs: StubTable,
}

impl ModuleData {
    /// The bytes of table `id`
    #[must_use]
    pub fn table(&self, id: TableId) -> &[u8] {
        match id {
            TableId::Interface => &self.interfaces,
            TableId::Class => &self.classes,
            TableId::CcwTemplate => &self.ccw_templates,
            TableId::SupportedInterface => &self.supported_interfaces,
            TableId::Boxing => &self.boxing,
            TableId::BoxingName => &self.boxing_names,
            TableId::StructMarshal => &self.struct_marshal,
            TableId::FieldOffset => &self.field_offsets,
            TableId::Collection => &self.collections,
            TableId::AdditionalClass => &self.additional_classes,
            TableId::AdditionalClassName => &self.additional_class_names,
            TableId::GenericArgument => &self.generic_arguments,
            TableId::PInvokeDelegate => &self.pinvoke_delegates,
            TableId::HashcodeVerify => &self.hashcode_verify,
            TableId::TypeNameMarshaling => &self.type_name_marshaling,
            TableId::CcwFactory => &self.ccw_factories,
        }
    }

    fn view<T: RowReadable>(&self) -> Result<MetadataTable<'_, T>> {
        MetadataTable::new(self.table(T::TABLE))
    }
}

/// A decoded interop module.
pub struct InteropModule {
    name: String,
    interfaces: Vec<InterfaceData>,
    classes: Vec<ClassData>,
    templates: Vec<CcwTemplateData>,
    supported_interfaces: Vec<FixupTypeRef>,
    boxing: Vec<BoxingData>,
    boxing_names: HashMap<String, u32>,
    structs: Vec<StructMarshalData>,
    field_offsets: Vec<u32>,
    collections: Vec<CollectionData>,
    additional_classes: Vec<AdditionalClassData>,
    additional_class_names: HashMap<String, u32>,
    generic_arguments: Vec<GenericArgumentData>,
    pinvoke_delegates: Vec<PInvokeDelegateData>,
    hashcode_verify: Vec<HashcodeVerifyData>,
    type_name_marshaling: Vec<TypeNameMarshalingData>,
    ccw_factories: Vec<CcwFactoryData>,
}

impl InteropModule {
    /// Decode `data` as the module at position `index` of a registry.
    ///
    /// Records of each table are decoded in parallel. With
    /// [`RegistryConfig::validate_on_load`] set, every in-module reference is checked afterwards.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] or [`crate::Error::OutOfBounds`] for damaged tables, and
    /// [`crate::Error::IndexOutOfRange`] for dangling references found by validation.
    pub fn load(index: usize, data: &ModuleData, config: &RegistryConfig) -> Result<Self> {
        let context = DecodeContext {
            module: index,
            stubs: &data.stubs,
            descriptors: &data.descriptors,
        };

        let strings = if data.strings.is_empty() {
            None
        } else {
            Some(Strings::from(&data.strings)?)
        };

        let boxing = data
            .view::<BoxingRaw>()?
            .decode(|row| row.to_owned(&context))?;
        let additional_classes = data
            .view::<AdditionalClassRaw>()?
            .decode(|row| Ok(row.to_owned()))?;

        let module = InteropModule {
            name: data.name.clone(),
            interfaces: data
                .view::<InterfaceRaw>()?
                .decode(|row| row.to_owned(&context))?,
            classes: data.view::<ClassRaw>()?.decode(|row| Ok(row.to_owned()))?,
            templates: data
                .view::<CcwTemplateRaw>()?
                .decode(|row| row.to_owned())?,
            supported_interfaces: data
                .view::<SupportedInterfaceRaw>()?
                .decode(|row| Ok(row.to_owned()))?,
            boxing_names: name_map(
                &data.view::<BoxingNameRaw>()?.decode(|row| Ok(row.name))?,
                boxing.len(),
                strings.as_ref(),
                TableId::BoxingName,
            )?,
            boxing,
            structs: data
                .view::<StructMarshalRaw>()?
                .decode(|row| row.to_owned(&context))?,
            field_offsets: data
                .view::<FieldOffsetRaw>()?
                .decode(|row| Ok(row.offset))?,
            collections: data
                .view::<CollectionRaw>()?
                .decode(|row| Ok(row.to_owned()))?,
            additional_class_names: name_map(
                &data
                    .view::<AdditionalClassNameRaw>()?
                    .decode(|row| Ok(row.name))?,
                additional_classes.len(),
                strings.as_ref(),
                TableId::AdditionalClassName,
            )?,
            additional_classes,
            generic_arguments: data
                .view::<GenericArgumentRaw>()?
                .decode(|row| Ok(row.to_owned()))?,
            pinvoke_delegates: data
                .view::<PInvokeDelegateRaw>()?
                .decode(|row| row.to_owned(&context))?,
            hashcode_verify: data
                .view::<HashcodeVerifyRaw>()?
                .decode(|row| Ok(row.to_owned()))?,
            type_name_marshaling: data
                .view::<TypeNameMarshalingRaw>()?
                .decode(|row| Ok(row.to_owned()))?,
            ccw_factories: data
                .view::<CcwFactoryRaw>()?
                .decode(|row| Ok(row.to_owned()))?,
        };

        if config.validate_on_load {
            ModuleValidator::validate(&module, config)?;
        }

        log::debug!(
            "loaded interop module {} '{}': {} interfaces, {} classes, {} templates, {} boxing, {} structs",
            index,
            module.name,
            module.interfaces.len(),
            module.classes.len(),
            module.templates.len(),
            module.boxing.len(),
            module.structs.len()
        );

        Ok(module)
    }

    /// Diagnostic name of the module
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of decoded records of table `id`
    #[must_use]
    pub fn table_len(&self, id: TableId) -> usize {
        match id {
            TableId::Interface => self.interfaces.len(),
            TableId::Class => self.classes.len(),
            TableId::CcwTemplate => self.templates.len(),
            TableId::SupportedInterface => self.supported_interfaces.len(),
            TableId::Boxing => self.boxing.len(),
            TableId::BoxingName => self.boxing_names.len(),
            TableId::StructMarshal => self.structs.len(),
            TableId::FieldOffset => self.field_offsets.len(),
            TableId::Collection => self.collections.len(),
            TableId::AdditionalClass => self.additional_classes.len(),
            TableId::AdditionalClassName => self.additional_class_names.len(),
            TableId::GenericArgument => self.generic_arguments.len(),
            TableId::PInvokeDelegate => self.pinvoke_delegates.len(),
            TableId::HashcodeVerify => self.hashcode_verify.len(),
            TableId::TypeNameMarshaling => self.type_name_marshaling.len(),
            TableId::CcwFactory => self.ccw_factories.len(),
        }
    }

    /// All interface records
    #[must_use]
    pub fn interfaces(&self) -> &[InterfaceData] {
        &self.interfaces
    }

    /// All class records
    #[must_use]
    pub fn classes(&self) -> &[ClassData] {
        &self.classes
    }

    /// All template records
    #[must_use]
    pub fn templates(&self) -> &[CcwTemplateData] {
        &self.templates
    }

    /// The shared list of supported interfaces
    #[must_use]
    pub fn supported_interfaces(&self) -> &[FixupTypeRef] {
        &self.supported_interfaces
    }

    /// All boxing records
    #[must_use]
    pub fn boxing(&self) -> &[BoxingData] {
        &self.boxing
    }

    /// All struct marshalling records
    #[must_use]
    pub fn structs(&self) -> &[StructMarshalData] {
        &self.structs
    }

    /// All collection projections
    #[must_use]
    pub fn collections(&self) -> &[CollectionData] {
        &self.collections
    }

    /// All additional class records
    #[must_use]
    pub fn additional_classes(&self) -> &[AdditionalClassData] {
        &self.additional_classes
    }

    /// All generic argument records
    #[must_use]
    pub fn generic_arguments(&self) -> &[GenericArgumentData] {
        &self.generic_arguments
    }

    /// All delegate records
    #[must_use]
    pub fn pinvoke_delegates(&self) -> &[PInvokeDelegateData] {
        &self.pinvoke_delegates
    }

    /// All expected type hash codes
    #[must_use]
    pub fn hashcode_verify(&self) -> &[HashcodeVerifyData] {
        &self.hashcode_verify
    }

    /// All types marshalled by name
    #[must_use]
    pub fn type_name_marshaling(&self) -> &[TypeNameMarshalingData] {
        &self.type_name_marshaling
    }

    /// All activation factory records
    #[must_use]
    pub fn ccw_factories(&self) -> &[CcwFactoryData] {
        &self.ccw_factories
    }

    /// The interface record at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if there is no such record.
    pub fn interface(&self, index: u32) -> Result<&InterfaceData> {
        record(&self.interfaces, index, TableId::Interface)
    }

    /// The class record at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if there is no such record.
    pub fn class(&self, index: u32) -> Result<&ClassData> {
        record(&self.classes, index, TableId::Class)
    }

    /// The template record at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if there is no such record.
    pub fn template(&self, index: u32) -> Result<&CcwTemplateData> {
        record(&self.templates, index, TableId::CcwTemplate)
    }

    /// The supported interface at `index` of the shared list
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if there is no such entry.
    pub fn supported_interface(&self, index: u32) -> Result<&FixupTypeRef> {
        record(&self.supported_interfaces, index, TableId::SupportedInterface)
    }

    /// The boxing record at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if there is no such record.
    pub fn boxing_record(&self, index: u32) -> Result<&BoxingData> {
        record(&self.boxing, index, TableId::Boxing)
    }

    /// The struct marshalling record at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if there is no such record.
    pub fn struct_marshal(&self, index: u32) -> Result<&StructMarshalData> {
        record(&self.structs, index, TableId::StructMarshal)
    }

    /// The field offsets of window `window`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if the window runs past the table.
    pub fn field_offsets(&self, window: &Range<u32>) -> Result<&[u32]> {
        self.field_offsets
            .get(window.start as usize..window.end as usize)
            .ok_or(IndexOutOfRange {
                table: TableId::FieldOffset,
                index: window.end as usize,
                len: self.field_offsets.len(),
            })
    }

    /// The collection projection at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if there is no such record.
    pub fn collection(&self, index: u32) -> Result<&CollectionData> {
        record(&self.collections, index, TableId::Collection)
    }

    /// The additional class record at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if there is no such record.
    pub fn additional_class(&self, index: u32) -> Result<&AdditionalClassData> {
        record(&self.additional_classes, index, TableId::AdditionalClass)
    }

    /// The generic argument record at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if there is no such record.
    pub fn generic_argument(&self, index: u32) -> Result<&GenericArgumentData> {
        record(&self.generic_arguments, index, TableId::GenericArgument)
    }

    /// The delegate record at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if there is no such record.
    pub fn pinvoke_delegate(&self, index: u32) -> Result<&PInvokeDelegateData> {
        record(&self.pinvoke_delegates, index, TableId::PInvokeDelegate)
    }

    /// The expected hash code record at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if there is no such record.
    pub fn hashcode_verify_record(&self, index: u32) -> Result<&HashcodeVerifyData> {
        record(&self.hashcode_verify, index, TableId::HashcodeVerify)
    }

    /// The type name marshalling record at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if there is no such record.
    pub fn type_name_marshaling_record(&self, index: u32) -> Result<&TypeNameMarshalingData> {
        record(&self.type_name_marshaling, index, TableId::TypeNameMarshaling)
    }

    /// The activation factory record at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if there is no such record.
    pub fn ccw_factory(&self, index: u32) -> Result<&CcwFactoryData> {
        record(&self.ccw_factories, index, TableId::CcwFactory)
    }

    /// Index of the boxing record named `name`
    #[must_use]
    pub fn boxing_by_name(&self, name: &str) -> Option<u32> {
        self.boxing_names.get(name).copied()
    }

    /// Index of the additional class record named `name`
    #[must_use]
    pub fn additional_class_by_name(&self, name: &str) -> Option<u32> {
        self.additional_class_names.get(name).copied()
    }
}

fn record<T>(records: &[T], index: u32, table: TableId) -> Result<&T> {
    records.get(index as usize).ok_or(IndexOutOfRange {
        table,
        index: index as usize,
        len: records.len(),
    })
}

/// Fold a name table into a map from name to record index.
///
/// An empty table means the records are unnamed. Offset `0` names no record, and the first record
/// of a duplicated name wins.
fn name_map(
    offsets: &[u32],
    records: usize,
    strings: Option<&Strings>,
    table: TableId,
) -> Result<HashMap<String, u32>> {
    let mut names = HashMap::with_capacity(offsets.len());
    if offsets.is_empty() {
        return Ok(names);
    }

    if offsets.len() != records {
        return Err(malformed_error!(
            "{:?} table has {} entries for {} records",
            table,
            offsets.len(),
            records
        ));
    }

    for (index, offset) in offsets.iter().enumerate() {
        if *offset == 0 {
            continue;
        }

        let Some(strings) = strings else {
            return Err(malformed_error!(
                "{:?} entry {} names offset {} without a string heap",
                table,
                index,
                offset
            ));
        };

        #[allow(clippy::cast_possible_truncation)]
        names
            .entry(strings.get(*offset as usize)?.to_string())
            .or_insert(index as u32);
    }

    Ok(names)
}
