//! Deferred type references ("fixups") and their one-time resolution.
//!
//! Every type reference stored in a record is a [`FixupTypeRef`]. A fixup either carries a
//! resolved [`TypeHandle`] straight from the generator, or a [`Token`] that has to be looked up in
//! the runtime's type system exactly once. The lookup is delegated to a [`TypeResolver`]; its
//! result is memoized in a single-assignment cell, so every later resolution is a plain load.
//!
//! # Binary Encoding
//!
//! A fixup occupies 8 little-endian bytes:
//!
//! ```text
//! bit 63 | bits 32-62 | bits 0-31
//! -------|------------|----------------------------------------------
//! 1      | unused     | deferred Token
//! 0      | resolved TypeHandle value (0 = null identity)
//! ```
//!
//! # Thread Safety
//!
//! Two threads resolving the same fixup concurrently may both call the resolver, but only one
//! value is ever stored and both observe it. Resolution is deterministic, so the redundant call is
//! harmless.
//!
//! # Examples
//!
//! ```rust
//! use projscope::{FixupTypeRef, Token, TypeHandle, TypeMap};
//!
//! let resolver = TypeMap::new();
//! resolver.insert(Token::new(0x02000001), TypeHandle::new(0x1000));
//!
//! let fixup = FixupTypeRef::deferred(Token::new(0x02000001));
//! assert!(!fixup.is_resolved());
//! assert_eq!(fixup.resolve(&resolver)?, TypeHandle::new(0x1000));
//! assert!(fixup.is_resolved());
//! # Ok::<(), projscope::Error>(())
//! ```

use std::sync::OnceLock;

use dashmap::DashMap;

use crate::{
    metadata::token::{Token, TypeHandle},
    Error::TypeResolution,
    Result,
};

const DEFERRED_BIT: u64 = 1 << 63;

/// Capability to locate a type in the runtime's type system.
///
/// Implemented by the embedding runtime. Lookups must be deterministic: resolving the same token
/// twice yields the same handle.
pub trait TypeResolver: Send + Sync {
    /// Resolve `token` to a type identity, or `None` if the type cannot be located.
    fn resolve(&self, token: Token) -> Option<TypeHandle>;
}

impl<F> TypeResolver for F
where
    F: Fn(Token) -> Option<TypeHandle> + Send + Sync,
{
    fn resolve(&self, token: Token) -> Option<TypeHandle> {
        self(token)
    }
}

/// A concurrent token to handle table, usable as a [`TypeResolver`].
#[derive(Default)]
pub struct TypeMap {
    entries: DashMap<Token, TypeHandle>,
}

impl TypeMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handle that `token` resolves to
    pub fn insert(&self, token: Token, handle: TypeHandle) {
        self.entries.insert(token, handle);
    }

    /// Number of registered tokens
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no token is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TypeResolver for TypeMap {
    fn resolve(&self, token: Token) -> Option<TypeHandle> {
        self.entries.get(&token).map(|entry| *entry.value())
    }
}

/// The raw, undecoded form of a fixup as stored in a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RawFixup(pub u64);

impl RawFixup {
    /// The encoding of the null identity
    pub const NULL: RawFixup = RawFixup(0);
}

impl From<TypeHandle> for RawFixup {
    fn from(handle: TypeHandle) -> Self {
        RawFixup(handle.value() & !DEFERRED_BIT)
    }
}

impl From<Token> for RawFixup {
    fn from(token: Token) -> Self {
        RawFixup(DEFERRED_BIT | u64::from(token.value()))
    }
}

/// Observable state of a [`FixupTypeRef`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixupState {
    /// The reference waits for its first resolution
    Unresolved(Token),
    /// The reference holds a concrete identity
    Resolved(TypeHandle),
}

/// A type reference that is resolved at most once and memoized afterwards.
#[derive(Clone, Debug, Default)]
pub struct FixupTypeRef {
    token: Option<Token>,
    handle: OnceLock<TypeHandle>,
}

impl FixupTypeRef {
    /// A reference that already holds `handle`
    #[must_use]
    pub fn resolved(handle: TypeHandle) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(handle);
        FixupTypeRef {
            token: None,
            handle: cell,
        }
    }

    /// A reference that resolves `token` on first use
    #[must_use]
    pub fn deferred(token: Token) -> Self {
        FixupTypeRef {
            token: Some(token),
            handle: OnceLock::new(),
        }
    }

    /// The null reference
    #[must_use]
    pub fn null() -> Self {
        Self::resolved(TypeHandle::NULL)
    }

    /// Decode the binary form of a fixup
    #[must_use]
    pub fn from_raw(raw: RawFixup) -> Self {
        if raw.0 & DEFERRED_BIT != 0 {
            #[allow(clippy::cast_possible_truncation)]
            Self::deferred(Token::new(raw.0 as u32))
        } else {
            Self::resolved(TypeHandle::new(raw.0))
        }
    }

    /// Encode this reference back into its binary form.
    ///
    /// A deferred reference keeps its token encoding even after it has been resolved.
    #[must_use]
    pub fn to_raw(&self) -> RawFixup {
        match self.token {
            Some(token) => RawFixup::from(token),
            None => RawFixup::from(self.handle.get().copied().unwrap_or(TypeHandle::NULL)),
        }
    }

    /// Returns true if this reference names no type.
    ///
    /// Deferred references always name a type, so this never triggers a resolution.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.token.is_none() && self.handle.get().map_or(true, TypeHandle::is_null)
    }

    /// Returns true if the identity is already known
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.handle.get().is_some()
    }

    /// The deferred token, if this reference was emitted as one
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.token
    }

    /// Current state without triggering a resolution
    #[must_use]
    pub fn state(&self) -> FixupState {
        match (self.handle.get(), self.token) {
            (Some(handle), _) => FixupState::Resolved(*handle),
            (None, Some(token)) => FixupState::Unresolved(token),
            (None, None) => FixupState::Resolved(TypeHandle::NULL),
        }
    }

    /// Resolve this reference to a concrete identity.
    ///
    /// The first successful resolution is stored; subsequent calls return it without consulting
    /// `resolver` again.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeResolution`] if `resolver` cannot locate the deferred token.
    pub fn resolve(&self, resolver: &dyn TypeResolver) -> Result<TypeHandle> {
        if let Some(handle) = self.handle.get() {
            return Ok(*handle);
        }

        let Some(token) = self.token else {
            return Ok(TypeHandle::NULL);
        };

        match resolver.resolve(token) {
            Some(handle) if !handle.is_null() => {
                log::trace!("resolved type reference {token} to {handle}");
                Ok(*self.handle.get_or_init(|| handle))
            }
            _ => Err(TypeResolution(token)),
        }
    }
}

impl PartialEq for FixupTypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.state() == other.state()
    }
}

impl From<TypeHandle> for FixupTypeRef {
    fn from(handle: TypeHandle) -> Self {
        Self::resolved(handle)
    }
}
