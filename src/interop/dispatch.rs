//! Native dispatch tables (vtables) and the descriptors that produce them.
//!
//! An interface record either carries its own [`DispatchDescriptor`] or selects one of the
//! [`SharedShape`]s whose tables are pooled across all interfaces of the same generic shape.

use std::{fmt, sync::Arc};

use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::Result;

/// A native-callable function-pointer table implementing one interface shape.
///
/// Entries are opaque addresses owned by the thunk layer; the registry only hands tables out and
/// never calls through them.
#[derive(Clone, PartialEq, Eq)]
pub struct DispatchTable {
    name: String,
    entries: Vec<usize>,
}

/// A shared reference to a [`DispatchTable`]
pub type DispatchTableRef = Arc<DispatchTable>;

impl DispatchTable {
    /// Create a table named `name` holding `entries`
    pub fn new(name: impl Into<String>, entries: Vec<usize>) -> Self {
        DispatchTable {
            name: name.into(),
            entries,
        }
    }

    /// Diagnostic name of the interface shape
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All entries in slot order
    #[must_use]
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }

    /// The entry at `slot`
    #[must_use]
    pub fn entry(&self, slot: usize) -> Option<usize> {
        self.entries.get(slot).copied()
    }

    /// Number of slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no slots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DispatchTable({}, {} slots)", self.name, self.entries.len())
    }
}

/// The indirection an interface record stores instead of its dispatch table.
///
/// Generated dispatch tables are large, so records reference a descriptor that yields the table
/// when it is first needed.
#[derive(Clone)]
pub struct DispatchDescriptor(Arc<dyn Fn() -> DispatchTableRef + Send + Sync>);

impl DispatchDescriptor {
    /// A descriptor that calls `producer` on every lookup
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn() -> DispatchTableRef + Send + Sync + 'static,
    {
        DispatchDescriptor(Arc::new(producer))
    }

    /// A descriptor that always yields `table`
    #[must_use]
    pub fn fixed(table: DispatchTableRef) -> Self {
        Self::new(move || table.clone())
    }

    /// Follow the indirection
    #[must_use]
    pub fn table(&self) -> DispatchTableRef {
        (self.0)()
    }
}

impl fmt::Debug for DispatchDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DispatchDescriptor")
    }
}

/// The interface shapes whose dispatch tables are shared between interfaces.
///
/// The discriminant is the slot of the shape in the shared dispatch pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount)]
pub enum SharedShape {
    /// Mutable list of references
    List = 0,
    /// Read-only list of references
    ListView = 1,
    /// Iterable sequence
    Iterable = 2,
    /// Sequence iterator
    Iterator = 3,
    /// Completion callback of an asynchronous operation
    AsyncCompletionHandler = 4,
    /// Mutable list of blittable values
    ListBlittable = 5,
    /// Read-only list of blittable values
    ListViewBlittable = 6,
    /// Iterator over blittable values
    IteratorBlittable = 7,
}

impl SharedShape {
    /// Bits of the interface flags that select a shared shape
    pub const SELECTOR_MASK: u8 = 0xF8;

    /// Position of this shape in the shared dispatch pool
    #[must_use]
    pub fn slot(self) -> usize {
        self as usize
    }

    /// The shape stored at pool position `slot`
    #[must_use]
    pub fn from_slot(slot: usize) -> Option<Self> {
        SharedShape::iter().nth(slot)
    }

    /// The selector bits that name this shape in interface flags
    #[must_use]
    pub fn selector(self) -> u8 {
        ((self as u8) << 4) | 0x08
    }

    /// Decode the selector bits of interface `flags`.
    ///
    /// Returns `None` when no selector bit is set, meaning the interface has its own table.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the selector names a slot past the pool.
    pub fn from_flags(flags: u8) -> Result<Option<Self>> {
        let selector = flags & Self::SELECTOR_MASK;
        if selector == 0 {
            return Ok(None);
        }

        let slot = usize::from(selector >> 4);
        match Self::from_slot(slot) {
            Some(shape) => Ok(Some(shape)),
            None => Err(malformed_error!(
                "Shared dispatch selector 0x{:02x} names slot {} of {}",
                selector,
                slot,
                SharedShape::COUNT
            )),
        }
    }
}
