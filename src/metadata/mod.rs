//! Interop metadata: the binary tables of each module and their decoded form.
//!
//! Each independently compiled module describes its projected types in a set of fixed-layout
//! tables. This module owns everything about those tables that does not involve other modules:
//! reading and writing records, decoding them into typed values, and checking that in-module
//! references are consistent.
//!
//! # Key Components
//!
//! - [`token`] - Metadata tokens and runtime type handles
//! - [`fixup`] - Type references that are either resolved or deferred to a [`fixup::TypeResolver`]
//! - [`tables`] - Raw and decoded records of all thirteen tables
//! - [`strings`] - The string heap naming boxing and fallback class records
//! - [`module`] - A module's raw inputs and its decoded, immutable form
//! - [`builder`] - Programmatic construction of module inputs
//! - [`validation`] - Load-time cross-record checks
//! - [`config`] - Registry configuration
//!
//! # Examples
//!
//! ```rust
//! use projscope::metadata::{
//!     builder::ModuleDataBuilder, config::RegistryConfig, module::InteropModule,
//!     tables::{ClassRaw, RecordLink},
//! };
//!
//! let mut builder = ModuleDataBuilder::new("Contoso");
//! let base = builder.add_class(ClassRaw::default());
//! builder.add_class(ClassRaw { base_class_index: base as i16, ..Default::default() });
//!
//! let module = InteropModule::load(0, &builder.build()?, &RegistryConfig::default())?;
//! assert_eq!(module.class(1)?.base_class, RecordLink::Local(0));
//! # Ok::<(), projscope::Error>(())
//! ```

/// Construction of module inputs
pub mod builder;
/// Registry configuration
pub mod config;
/// Lazily resolved type references
pub mod fixup;
/// Module inputs and decoded modules
pub mod module;
/// String heap
pub mod strings;
/// Table records
pub mod tables;
/// Tokens and type handles
pub mod token;
/// Load-time validation
pub mod validation;
