//! `StructMarshal` table module
//!
//! This module contains all components related to the `StructMarshal` table:
//! - `StructMarshalRaw`: Raw record with stub ids and the field offset window
//! - `StructMarshalData`: Owned variant with typed stubs and a checked window
//! - `StructMarshalFlags`: Flag bits of a struct record

use bitflags::bitflags;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    /// Flags of a struct marshalling record
    pub struct StructMarshalFlags: u32 {
        /// The struct has no usable native layout
        const HAS_INVALID_LAYOUT = 0x0001;
    }
}
