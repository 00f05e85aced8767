//! `Boxing` table module
//!
//! This module contains all components related to the `Boxing` table:
//! - `BoxingRaw`: Raw record with stub ids
//! - `BoxingData`: Owned variant with typed stubs and a decided policy
//!
//! Runtime class names of boxing records live in the parallel `BoxingName` table.

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;
