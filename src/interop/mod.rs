//! Crossing the boundary: dispatch tables, generated stubs, boxing and struct marshalling.
//!
//! The types here describe the runtime side of interop records: the callables a module was
//! generated with and the managed objects they operate on. The operations that combine them with
//! decoded records ([`crate::InteropRegistry::box_value`], [`crate::InteropRegistry::marshal`]
//! and friends) are implemented in [`boxing`] and [`marshal`].

pub mod boxing;
pub mod dispatch;
pub mod marshal;
pub mod object;
pub mod stubs;
