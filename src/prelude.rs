//! # projscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the projscope library. Import this module to get quick access to everything needed to
//! build module tables, load them into a registry and query it.
//!
//! ```rust
//! use projscope::prelude::*;
//!
//! let registry = InteropRegistry::builder()
//!     .module(ModuleDataBuilder::new("empty").build()?)
//!     .config(RegistryConfig::strict())
//!     .build()?;
//! assert_eq!(registry.module_count(), 1);
//! # Ok::<(), projscope::Error>(())
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all projscope operations
pub use crate::Error;

/// The result type for all projscope operations
pub use crate::Result;

/// Options controlling how modules are loaded and queried
pub use crate::RegistryConfig;

// ================================================================================================
// Registry
// ================================================================================================

/// The registry and its builder
pub use crate::{InteropRegistry, InteropRegistryBuilder, RecordLocation};

/// Sources of the shared dispatch tables
pub use crate::registry::{SharedDispatchProvider, StaticDispatchProvider};

// ================================================================================================
// Module Tables
// ================================================================================================

/// Raw and decoded per-module data
pub use crate::{InteropModule, ModuleData, ModuleDataBuilder};

/// Type references and their resolution
pub use crate::{FixupTypeRef, RawFixup, Token, TypeHandle, TypeMap, TypeResolver};

// ================================================================================================
// Runtime Objects
// ================================================================================================

/// Managed objects and boxing wrappers
pub use crate::{
    BoxedObject, ClassAllocator, ManagedObject, ObjectAllocator, PairWrapper, ReferenceWrapper,
    WrapperInstance,
};

/// Native dispatch tables
pub use crate::{DispatchDescriptor, DispatchTable, DispatchTableRef, SharedShape};
