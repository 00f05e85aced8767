//! Load-time validation of an interop module.
//!
//! Record decoding already rejects damaged bytes. [`ModuleValidator`] checks what decoding cannot
//! see on its own: that every in-module index and window stays inside its target table, and that
//! local parent chains terminate.
//!
//! The validator is stateless and safe for concurrent use.

use std::ops::Range;

use crate::{
    metadata::{
        config::RegistryConfig,
        module::InteropModule,
        tables::{RecordLink, TableId},
    },
    Error::IndexOutOfRange,
    Result,
};

/// Cross-record validation of an [`InteropModule`].
pub struct ModuleValidator;

impl ModuleValidator {
    /// Validate every in-module reference of `module`.
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] for an index or window past its table, and
    /// [`crate::Error::Malformed`] for a local parent cycle.
    pub fn validate(module: &InteropModule, config: &RegistryConfig) -> Result<()> {
        Self::validate_classes(module)?;
        Self::validate_templates(module, config)?;
        Self::validate_structs(module)?;

        let classes = module.table_len(TableId::Class);
        for additional in module.additional_classes() {
            Self::validate_link(&additional.class, TableId::Class, classes)?;
        }

        Ok(())
    }

    fn validate_classes(module: &InteropModule) -> Result<()> {
        let classes = module.table_len(TableId::Class);
        let interfaces = module.table_len(TableId::Interface);

        for class in module.classes() {
            Self::validate_link(&class.base_class, TableId::Class, classes)?;
            Self::validate_link(&class.default_interface, TableId::Interface, interfaces)?;
        }

        Self::validate_acyclic(classes, TableId::Class, |index| {
            module.classes()[index].base_class.local()
        })
    }

    fn validate_templates(module: &InteropModule, config: &RegistryConfig) -> Result<()> {
        let templates = module.table_len(TableId::CcwTemplate);
        let supported = module.table_len(TableId::SupportedInterface);

        for template in module.templates() {
            Self::validate_link(&template.parent, TableId::CcwTemplate, templates)?;
            Self::validate_window(&template.interfaces, TableId::SupportedInterface, supported)?;
        }

        Self::validate_acyclic(templates, TableId::CcwTemplate, |index| {
            module.templates()[index].parent.local()
        })?;

        log::trace!(
            "validated {} templates against a chain depth of {}",
            templates,
            config.max_chain_depth
        );
        Ok(())
    }

    fn validate_structs(module: &InteropModule) -> Result<()> {
        let offsets = module.table_len(TableId::FieldOffset);
        for record in module.structs() {
            Self::validate_window(&record.field_offsets, TableId::FieldOffset, offsets)?;
        }

        Ok(())
    }

    fn validate_link(link: &RecordLink, table: TableId, len: usize) -> Result<()> {
        match link {
            RecordLink::Local(index) if *index as usize >= len => Err(IndexOutOfRange {
                table,
                index: *index as usize,
                len,
            }),
            _ => Ok(()),
        }
    }

    fn validate_window(window: &Range<u32>, table: TableId, len: usize) -> Result<()> {
        if window.end as usize > len {
            return Err(IndexOutOfRange {
                table,
                index: window.end as usize,
                len,
            });
        }

        Ok(())
    }

    /// Check that following `parent` from any record ends, given links already checked in range.
    fn validate_acyclic<F>(len: usize, table: TableId, parent: F) -> Result<()>
    where
        F: Fn(usize) -> Option<u32>,
    {
        const UNVISITED: u8 = 0;
        const ON_PATH: u8 = 1;
        const TERMINATES: u8 = 2;

        let mut state = vec![UNVISITED; len];
        let mut path = Vec::new();

        for start in 0..len {
            let mut current = Some(start);
            while let Some(index) = current {
                match state[index] {
                    TERMINATES => break,
                    ON_PATH => {
                        return Err(malformed_error!(
                            "{:?} record {} is part of a parent cycle",
                            table,
                            index
                        ))
                    }
                    _ => {
                        state[index] = ON_PATH;
                        path.push(index);
                        current = parent(index).map(|next| next as usize);
                    }
                }
            }

            for index in path.drain(..) {
                state[index] = TERMINATES;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            builder::ModuleDataBuilder,
            fixup::RawFixup,
            tables::{AdditionalClassRaw, CcwTemplateRaw, ClassRaw, StructMarshalRaw},
            token::TypeHandle,
        },
        Error,
    };

    fn load(builder: ModuleDataBuilder) -> Result<InteropModule> {
        InteropModule::load(0, &builder.build()?, &RegistryConfig::default())
    }

    #[test]
    fn accepts_consistent_module() {
        let mut builder = ModuleDataBuilder::new("ok");
        let base = builder.add_class(ClassRaw::default());
        builder.add_class(ClassRaw {
            base_class_index: base as i16,
            ..Default::default()
        });
        let root = builder.add_template(CcwTemplateRaw::default(), &[RawFixup(0x100)]);
        builder.add_template(
            CcwTemplateRaw {
                parent_index: root as i32,
                ..Default::default()
            },
            &[RawFixup(0x200), RawFixup(0x300)],
        );
        builder.add_additional_class(
            AdditionalClassRaw {
                class_index: 1,
                ..Default::default()
            },
            "Contoso.Hidden",
        );

        let module = load(builder).unwrap();
        assert_eq!(module.templates()[1].interfaces, 1..3);
    }

    #[test]
    fn rejects_dangling_default_interface() {
        let mut builder = ModuleDataBuilder::new("bad");
        builder.add_class(ClassRaw {
            default_interface_index: 0,
            ..Default::default()
        });

        assert!(matches!(
            load(builder),
            Err(Error::IndexOutOfRange {
                table: TableId::Interface,
                index: 0,
                len: 0
            })
        ));
    }

    #[test]
    fn rejects_window_past_table() {
        let mut builder = ModuleDataBuilder::new("bad");
        builder.add_raw_template(CcwTemplateRaw {
            supported_interface_start: 0,
            supported_interface_count: 2,
            ..Default::default()
        });

        assert!(matches!(
            load(builder),
            Err(Error::IndexOutOfRange {
                table: TableId::SupportedInterface,
                index: 2,
                len: 0
            })
        ));

        let mut builder = ModuleDataBuilder::new("bad");
        builder.add_raw_struct(StructMarshalRaw {
            field_offset_start: 1,
            field_count: 1,
            ..Default::default()
        });
        assert!(matches!(
            load(builder),
            Err(Error::IndexOutOfRange {
                table: TableId::FieldOffset,
                ..
            })
        ));
    }

    #[test]
    fn rejects_parent_cycles() {
        let mut builder = ModuleDataBuilder::new("cycle");
        builder.add_raw_template(CcwTemplateRaw {
            parent_index: 1,
            ..Default::default()
        });
        builder.add_raw_template(CcwTemplateRaw {
            parent_index: 0,
            ..Default::default()
        });
        assert!(matches!(load(builder), Err(Error::Malformed { .. })));

        let mut builder = ModuleDataBuilder::new("self");
        builder.add_class(ClassRaw {
            base_class_index: 0,
            ..Default::default()
        });
        assert!(matches!(load(builder), Err(Error::Malformed { .. })));
    }

    #[test]
    fn cross_links_are_not_checked() {
        let mut builder = ModuleDataBuilder::new("cross");
        builder.add_class(ClassRaw {
            base_class: RawFixup::from(TypeHandle::new(0x5000)),
            ..Default::default()
        });

        let module = load(builder).unwrap();
        assert!(matches!(module.classes()[0].base_class, RecordLink::Cross(_)));
    }
}
