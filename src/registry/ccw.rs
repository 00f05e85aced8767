//! Native wrapper templates and their interface lists.
//!
//! The interfaces a native wrapper exposes are the union of its template's supported interface
//! window and the windows of every template up its parent chain. A parent in the same module is
//! followed by index; a parent defined elsewhere is found by searching all modules for the
//! template of the parent's type identity.

use std::{collections::HashSet, ops::Range};

use crate::{
    metadata::{
        tables::{CcwTemplateData, RecordLink},
        token::TypeHandle,
    },
    registry::InteropRegistry,
    Error, Result,
};

impl InteropRegistry {
    /// The template record at `index` of `module`
    ///
    /// # Errors
    /// Returns [`crate::Error::ModuleNotFound`] or [`crate::Error::IndexOutOfRange`] for a bad
    /// address.
    pub fn template_data(&self, module: usize, index: u32) -> Result<&CcwTemplateData> {
        self.module(module)?.template(index)
    }

    /// The base class of the template at `index` of `module`, `None` for a root template
    ///
    /// # Errors
    /// Returns an error for a bad address or an unresolvable type reference.
    pub fn template_base_class(&self, module: usize, index: u32) -> Result<Option<TypeHandle>> {
        match &self.template_data(module, index)?.parent {
            RecordLink::Local(parent) => self
                .resolve(&self.template_data(module, *parent)?.class_type)
                .map(Some),
            RecordLink::Cross(fixup) => self.resolve_present(fixup),
            RecordLink::Absent => Ok(None),
        }
    }

    /// Iterate the interfaces implemented by the template at `index` of `module`.
    ///
    /// The template's own interfaces come first, then those of each parent in chain order. Every
    /// identity is yielded once. The walk is lazy and recomputed on every call.
    ///
    /// # Errors
    /// Returns an error for a bad address. Errors met while walking are yielded by the iterator,
    /// which then ends.
    pub fn implemented_interfaces(
        &self,
        module: usize,
        index: u32,
    ) -> Result<ImplementedInterfaces<'_>> {
        let template = self.template_data(module, index)?;
        Ok(ImplementedInterfaces {
            registry: self,
            module,
            window: template.interfaces.clone(),
            parent: Some(&template.parent),
            seen: HashSet::new(),
            depth: 0,
            done: false,
        })
    }
}

/// Lazy walk over the interfaces of a template and its parents.
///
/// Created by [`InteropRegistry::implemented_interfaces`].
pub struct ImplementedInterfaces<'r> {
    registry: &'r InteropRegistry,
    module: usize,
    window: Range<u32>,
    parent: Option<&'r RecordLink>,
    seen: HashSet<TypeHandle>,
    depth: usize,
    done: bool,
}

impl ImplementedInterfaces<'_> {
    /// Move to the next template up the chain; `false` once the chain has ended.
    fn ascend(&mut self) -> Result<bool> {
        let (module, index) = match self.parent.take() {
            None | Some(RecordLink::Absent) => return Ok(false),
            Some(RecordLink::Local(index)) => (self.module, *index),
            Some(RecordLink::Cross(fixup)) => {
                let Some(handle) = self.registry.resolve_present(fixup)? else {
                    return Ok(false);
                };
                match self.registry.find_template_by_type(handle) {
                    Some(location) => (location.module, location.index),
                    None if self.registry.config().strict_cross_module => {
                        return Err(Error::AmbiguousCrossModuleReference(handle));
                    }
                    None => {
                        log::debug!(
                            "template chain in module {} ends at {}, no module defines it",
                            self.module,
                            handle
                        );
                        return Ok(false);
                    }
                }
            }
        };

        self.depth += 1;
        let limit = self.registry.config().max_chain_depth;
        if self.depth > limit {
            return Err(Error::RecursionLimit(limit));
        }

        let template = self.registry.template_data(module, index)?;
        if module != self.module {
            log::debug!(
                "template chain leaves module {} for template {} of module {}",
                self.module,
                index,
                module
            );
        }

        self.module = module;
        self.window = template.interfaces.clone();
        self.parent = Some(&template.parent);
        Ok(true)
    }

    fn step(&mut self) -> Result<Option<TypeHandle>> {
        loop {
            while let Some(slot) = self.window.next() {
                let fixup = self
                    .registry
                    .module(self.module)?
                    .supported_interface(slot)?;
                let handle = self.registry.resolve(fixup)?;
                if !handle.is_null() && self.seen.insert(handle) {
                    return Ok(Some(handle));
                }
            }

            if !self.ascend()? {
                return Ok(None);
            }
        }
    }
}

impl Iterator for ImplementedInterfaces<'_> {
    type Item = Result<TypeHandle>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.step() {
            Ok(Some(handle)) => Some(Ok(handle)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

impl std::iter::FusedIterator for ImplementedInterfaces<'_> {}
