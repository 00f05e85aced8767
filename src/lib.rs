// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # projscope
//!
//! A type-projection registry for code that crosses between a garbage-collected managed object
//! model and a native, reference-counted component model.
//!
//! A code generator describes every projected type of a module in a set of compact binary
//! tables. At runtime `projscope` decodes those tables once and answers the questions the
//! interop layer asks on every boundary crossing:
//!
//! - which native dispatch table (vtable) serves an interface, either its own or one of eight
//!   tables shared by common generic shapes
//! - what the base class and default interface of a projected class are
//! - which interfaces a native wrapper for a managed object must expose, following parent
//!   templates across module boundaries
//! - how a value is boxed for native code and recovered again
//! - how a struct is copied to and from its native layout
//!
//! ## Quick Start
//!
//! ```rust
//! use projscope::prelude::*;
//! use projscope::metadata::tables::{CcwTemplateRaw, ClassRaw};
//!
//! let mut module = ModuleDataBuilder::new("Contoso.Widgets");
//! let widget = TypeHandle::new(0x1000);
//! module.add_class(ClassRaw { class_type: widget.into(), ..Default::default() });
//! module.add_template(
//!     CcwTemplateRaw { class_type: widget.into(), ..Default::default() },
//!     &[RawFixup::from(TypeHandle::new(0x2000)), RawFixup::from(TypeHandle::new(0x3000))],
//! );
//!
//! let registry = InteropRegistry::builder().module(module.build()?).build()?;
//!
//! let interfaces = registry
//!     .implemented_interfaces(0, 0)?
//!     .collect::<Result<Vec<_>>>()?;
//! assert_eq!(interfaces, vec![TypeHandle::new(0x2000), TypeHandle::new(0x3000)]);
//! assert_eq!(registry.base_class(0, 0)?, None);
//! # Ok::<(), projscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - Binary tables, their decoded records, and per-module loading
//! - [`interop`] - Dispatch tables, generated stubs, boxing and struct marshalling
//! - [`registry`] - The [`InteropRegistry`] answering queries across all modules
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Capabilities
//!
//! The registry never reaches into the host runtime directly. It is given three capabilities:
//!
//! - a [`TypeResolver`] turning deferred metadata tokens into runtime type handles
//! - an [`ObjectAllocator`] constructing boxing wrapper instances
//! - a [`registry::SharedDispatchProvider`] supplying the shared dispatch tables
//!
//! ## Concurrency
//!
//! Tables are immutable after loading. The only state that changes at runtime is memoization:
//! type references resolve at most once, lookup results are cached per registry, and the shared
//! dispatch pool is filled on first use. All of it is safe to share across threads.

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
pub mod prelude;

/// Dispatch tables, generated stubs, boxing and struct marshalling.
pub mod interop;

/// Binary metadata tables and their decoded form.
pub mod metadata;

/// The registry answering queries across all loaded modules.
pub mod registry;

/// `projscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `projscope` Error type
///
/// The main error type for all operations in this crate. See [`Error`] for the variants.
pub use error::Error;

pub use interop::{
    dispatch::{DispatchDescriptor, DispatchTable, DispatchTableRef, SharedShape},
    object::{
        BoxedKeyValuePair, BoxedObject, BoxedValue, ClassAllocator, ManagedObject,
        ObjectAllocator, PairWrapper, ReferenceWrapper, WrapperInstance,
    },
    stubs::{
        BoxingStub, DestroyStub, MarshalStub, NativeEntry, Stub, StubTable, UnboxingStub,
        UnmarshalStub,
    },
};
pub use metadata::{
    builder::ModuleDataBuilder,
    config::RegistryConfig,
    fixup::{FixupState, FixupTypeRef, RawFixup, TypeMap, TypeResolver},
    module::{InteropModule, ModuleData},
    token::{Token, TypeHandle},
};
pub use registry::{ImplementedInterfaces, InteropRegistry, InteropRegistryBuilder, RecordLocation};
