//! `Class` table module
//!
//! This module contains all components related to the `Class` table:
//! - `ClassRaw`: Raw record with undecoded flags and index/identity pairs
//! - `ClassData`: Owned variant with decided base class and default interface links
//! - `ClassFlags`, `MarshalingBehavior`, `GcPressure`: Flag decoding

use bitflags::bitflags;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    /// Flags of a class record
    pub struct ClassFlags: u32 {
        /// Bits 0-1, see [`MarshalingBehavior`]
        const MARSHALING_MASK = 0x0003;
        /// Bits 2-4, see [`GcPressure`]
        const GC_PRESSURE_MASK = 0x001C;
        /// Instances are not backed by a native object
        const NOT_NATIVE_OBJECT_BACKED = 0x0020;
        /// The class cannot be derived from
        const SEALED = 0x0040;
        /// The class is a projection of a native runtime type
        const NATIVE_PROJECTED = 0x0080;
    }
}

/// How instances of a class may be marshalled between threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarshalingBehavior {
    /// Not specified
    Unknown,
    /// Instances cannot be marshalled
    Inhibit,
    /// Instances are free-threaded
    Free,
    /// Instances use standard marshalling
    Standard,
}

impl MarshalingBehavior {
    /// Decode the marshaling bits of class `flags`
    #[must_use]
    pub fn from_flags(flags: ClassFlags) -> Self {
        match (flags & ClassFlags::MARSHALING_MASK).bits() {
            1 => MarshalingBehavior::Inhibit,
            2 => MarshalingBehavior::Free,
            3 => MarshalingBehavior::Standard,
            _ => MarshalingBehavior::Unknown,
        }
    }
}

/// The native memory pressure an instance of a class adds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GcPressure {
    /// No pressure recorded
    None,
    /// Default pressure
    Default,
    /// Low pressure
    Low,
    /// Medium pressure
    Medium,
    /// High pressure
    High,
}

impl GcPressure {
    /// Decode the GC pressure bits of class `flags`
    #[must_use]
    pub fn from_flags(flags: ClassFlags) -> Self {
        match (flags & ClassFlags::GC_PRESSURE_MASK).bits() >> 2 {
            1 => GcPressure::Default,
            2 => GcPressure::Low,
            3 => GcPressure::Medium,
            4 => GcPressure::High,
            _ => GcPressure::None,
        }
    }
}
