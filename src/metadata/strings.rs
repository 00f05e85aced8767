//! String heap of an interop module.
//!
//! Runtime class names referenced by the boxing and additional-class name tables are stored as
//! null-terminated UTF-8 strings in a per-module heap. The first byte of the heap is always `0`,
//! so offset `0` names the empty string.

use std::{ffi::CStr, str};

use crate::{Error::OutOfBounds, Result};

/// A read-only view over a module's string heap.
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Create a view over `data`
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap is empty or does not start with a null byte.
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided string heap is empty"));
        }

        Ok(Strings { data })
    }

    /// Read the string that starts at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is past the heap, or
    /// [`crate::Error::Malformed`] if the string is unterminated or not UTF-8.
    pub fn get(&self, index: usize) -> Result<&'a str> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(result) => match result.to_str() {
                Ok(result) => Ok(result),
                Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
            },
            Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
        }
    }

    /// Size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the heap only holds the leading null byte
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() <= 1
    }
}
