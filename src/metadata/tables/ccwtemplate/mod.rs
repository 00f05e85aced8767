//! `CcwTemplate` table module
//!
//! This module contains all components related to the `CcwTemplate` table:
//! - `CcwTemplateRaw`: Raw record with the parent index/identity pair and interface window
//! - `CcwTemplateData`: Owned variant with a decided parent link and a checked window

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;
