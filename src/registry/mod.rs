//! The interop registry: queries across every loaded module.
//!
//! An [`InteropRegistry`] owns the decoded modules together with the capabilities supplied by the
//! embedding runtime: a [`TypeResolver`] for deferred type references, an [`ObjectAllocator`] for
//! boxing wrappers, and a [`SharedDispatchProvider`] feeding the shared dispatch pool.
//!
//! Queries are grouped by the record they start from:
//! - interfaces and their dispatch tables (`interface.rs`)
//! - classes, their base class and default interface (`class.rs`)
//! - native wrapper templates and the interfaces they implement (`ccw.rs`)
//! - lookups by type identity, GUID or runtime class name (`lookup.rs`)
//!
//! Boxing and struct marshalling live in [`crate::interop`].
//!
//! All queries take `&self` and may be issued from any thread. After [`InteropRegistryBuilder::build`]
//! the only state that changes is memoization: resolved type references, lookup caches and the
//! shared dispatch pool.
//!
//! # Examples
//!
//! ```rust
//! use projscope::{
//!     metadata::tables::InterfaceRaw, InteropRegistry, ModuleDataBuilder, RawFixup, TypeHandle,
//! };
//!
//! let mut builder = ModuleDataBuilder::new("Contoso");
//! builder.add_interface(InterfaceRaw {
//!     itf_type: RawFixup::from(TypeHandle::new(0x1000)),
//!     ..Default::default()
//! });
//!
//! let registry = InteropRegistry::builder().module(builder.build()?).build()?;
//! let location = registry.find_interface_by_type(TypeHandle::new(0x1000));
//! assert_eq!(location.map(|location| location.index), Some(0));
//! assert!(registry.dispatch_table(0, 0)?.is_none());
//! # Ok::<(), projscope::Error>(())
//! ```

mod ccw;
mod class;
mod interface;
mod lookup;
mod pool;

pub use ccw::ImplementedInterfaces;
pub use pool::{NoSharedDispatch, SharedDispatchPool, SharedDispatchProvider, StaticDispatchProvider};

use std::{fmt, sync::Arc};

use rayon::prelude::*;

use crate::{
    interop::object::{ClassAllocator, ObjectAllocator},
    metadata::{
        config::RegistryConfig,
        fixup::{FixupTypeRef, TypeMap, TypeResolver},
        module::{InteropModule, ModuleData},
        token::TypeHandle,
    },
    Error, Result,
};

use lookup::LookupCache;

/// Position of a record: the module that defines it and its index within that module's table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordLocation {
    /// Position of the module within the registry
    pub module: usize,
    /// Zero-based index within the module's table
    pub index: u32,
}

impl fmt::Display for RecordLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.index)
    }
}

/// Registry of every loaded interop module.
pub struct InteropRegistry {
    modules: Vec<InteropModule>,
    resolver: Arc<dyn TypeResolver>,
    allocator: Arc<dyn ObjectAllocator>,
    pool: SharedDispatchPool,
    config: RegistryConfig,
    cache: LookupCache,
}

impl InteropRegistry {
    /// Start configuring a registry
    #[must_use]
    pub fn builder() -> InteropRegistryBuilder {
        InteropRegistryBuilder::default()
    }

    /// The configuration the registry was built with
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Number of loaded modules
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// All loaded modules, in registration order
    #[must_use]
    pub fn modules(&self) -> &[InteropModule] {
        &self.modules
    }

    /// The module at position `module`
    ///
    /// # Errors
    /// Returns [`Error::ModuleNotFound`] if no module was registered at that position.
    pub fn module(&self, module: usize) -> Result<&InteropModule> {
        self.modules.get(module).ok_or(Error::ModuleNotFound(module))
    }

    /// The resolver used for deferred type references
    #[must_use]
    pub fn resolver(&self) -> &dyn TypeResolver {
        self.resolver.as_ref()
    }

    /// The allocator used for boxing wrappers
    #[must_use]
    pub fn allocator(&self) -> &dyn ObjectAllocator {
        self.allocator.as_ref()
    }

    /// The shared dispatch pool
    #[must_use]
    pub fn shared_dispatch(&self) -> &SharedDispatchPool {
        &self.pool
    }

    /// Resolve `fixup` through the registry's resolver
    ///
    /// # Errors
    /// Returns [`Error::TypeResolution`] if a deferred reference cannot be resolved.
    pub fn resolve(&self, fixup: &FixupTypeRef) -> Result<TypeHandle> {
        fixup.resolve(self.resolver.as_ref())
    }

    /// Resolve `fixup`, mapping the null identity to `None`
    pub(crate) fn resolve_present(&self, fixup: &FixupTypeRef) -> Result<Option<TypeHandle>> {
        let handle = self.resolve(fixup)?;
        Ok((!handle.is_null()).then_some(handle))
    }
}

impl fmt::Debug for InteropRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteropRegistry")
            .field("modules", &self.modules.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Configures and loads an [`InteropRegistry`].
///
/// Unset capabilities default to an empty [`TypeMap`] resolver, an empty [`ClassAllocator`] and
/// [`NoSharedDispatch`].
#[derive(Default)]
pub struct InteropRegistryBuilder {
    modules: Vec<ModuleData>,
    resolver: Option<Arc<dyn TypeResolver>>,
    allocator: Option<Arc<dyn ObjectAllocator>>,
    provider: Option<Arc<dyn SharedDispatchProvider>>,
    config: RegistryConfig,
}

impl InteropRegistryBuilder {
    /// Append a module; modules are numbered in the order they are added
    #[must_use]
    pub fn module(mut self, data: ModuleData) -> Self {
        self.modules.push(data);
        self
    }

    /// Append several modules
    #[must_use]
    pub fn modules(mut self, data: impl IntoIterator<Item = ModuleData>) -> Self {
        self.modules.extend(data);
        self
    }

    /// Resolve deferred type references with `resolver`
    #[must_use]
    pub fn resolver(mut self, resolver: impl TypeResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Allocate boxing wrappers with `allocator`
    #[must_use]
    pub fn allocator(mut self, allocator: impl ObjectAllocator + 'static) -> Self {
        self.allocator = Some(Arc::new(allocator));
        self
    }

    /// Fill the shared dispatch pool from `provider`
    #[must_use]
    pub fn shared_dispatch(mut self, provider: impl SharedDispatchProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Use `config` instead of [`RegistryConfig::default`]
    #[must_use]
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Decode every module and create the registry.
    ///
    /// Modules are decoded in parallel; the first failing module aborts the build.
    ///
    /// # Errors
    /// Returns the decoding or validation error of the first broken module.
    pub fn build(self) -> Result<InteropRegistry> {
        let config = self.config;
        let modules = self
            .modules
            .par_iter()
            .enumerate()
            .map(|(index, data)| InteropModule::load(index, data, &config))
            .collect::<Result<Vec<_>>>()?;

        log::debug!("interop registry loaded {} modules", modules.len());

        Ok(InteropRegistry {
            modules,
            resolver: self
                .resolver
                .unwrap_or_else(|| Arc::new(TypeMap::new())),
            allocator: self
                .allocator
                .unwrap_or_else(|| Arc::new(ClassAllocator::new())),
            pool: SharedDispatchPool::new(
                self.provider
                    .unwrap_or_else(|| Arc::new(NoSharedDispatch)),
            ),
            config,
            cache: LookupCache::default(),
        })
    }
}
