//! Type identities and the deferred tokens that stand in for them.
//!
//! Records never embed a type directly. They hold either a resolved [`TypeHandle`], an opaque and
//! globally comparable identity shared by every module of the process, or a [`Token`] that the
//! runtime's type system resolves on first use.

use std::fmt;

/// An unresolved type reference, opaque outside the [`crate::TypeResolver`] of the module that
/// emitted it.
///
/// A fixup stores it in its low 32 bits with bit 63 set; see [`crate::RawFixup`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Token(pub u32);

impl Token {
    /// Wrap a raw token value
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Token(value)
    }

    /// The raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Whether this is the zero token
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({self})")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// The resolved identity of a type, comparable across module boundaries.
///
/// `TypeHandle::NULL` is the well-defined null identity used by records to mark an absent
/// relationship. Values with bit 63 set are reserved for the binary encoding of deferred
/// references and never name a type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TypeHandle(pub u64);

impl TypeHandle {
    /// The null identity
    pub const NULL: TypeHandle = TypeHandle(0);

    /// Creates a new handle from a raw value
    #[must_use]
    pub const fn new(value: u64) -> Self {
        TypeHandle(value)
    }

    /// Returns the raw handle value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns true if this is the null identity
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "TypeHandle(null)")
        } else {
            write!(f, "TypeHandle(0x{:016x})", self.0)
        }
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn token_formatting() {
        let token = Token::new(0x02000001);
        assert_eq!(token.to_string(), "0x02000001");
        assert_eq!(format!("{token:?}"), "Token(0x02000001)");
        assert!(Token::default().is_null());
        assert!(!token.is_null());
    }

    #[test]
    fn token_as_key() {
        let tokens: HashSet<Token> = [0x02000001, 0x02000002, 0x02000001]
            .into_iter()
            .map(Token::from)
            .collect();
        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains(&Token::new(0x02000002)));
    }

    #[test]
    fn test_handle_null() {
        assert!(TypeHandle::NULL.is_null());
        assert!(TypeHandle::default().is_null());
        assert!(!TypeHandle::new(0x1000).is_null());
        assert_eq!(format!("{:?}", TypeHandle::NULL), "TypeHandle(null)");
    }

    #[test]
    fn test_handle_as_key() {
        let mut map = HashMap::new();
        map.insert(TypeHandle::new(1), "IVector");
        map.insert(TypeHandle::new(2), "IIterable");

        assert_eq!(map.get(&TypeHandle::new(1)), Some(&"IVector"));
        assert_eq!(map.get(&TypeHandle::new(3)), None);
        assert_eq!(format!("{}", TypeHandle::new(0xAB)), "0x00000000000000ab");
    }
}
