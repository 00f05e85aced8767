//! `Interface` table module
//!
//! This module contains all components related to the `Interface` table:
//! - `InterfaceRaw`: Raw record with undecoded flags, fixups and descriptor id
//! - `InterfaceData`: Owned variant with the dispatch source decided at load
//! - `InterfaceFlags`: Flag bits of an interface record

use bitflags::bitflags;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    /// Flags of an interface record
    pub struct InterfaceFlags: u8 {
        /// The interface derives from the native base interface (IInspectable)
        const NATIVE_BASE = 0x01;
        /// The interface is the shape of a delegate
        const DELEGATE = 0x02;
        /// The interface is only used inside the runtime
        const INTERNAL = 0x04;
        /// Selector bits naming a shared dispatch shape
        const SHARED_DISPATCH = 0xF8;
    }
}
