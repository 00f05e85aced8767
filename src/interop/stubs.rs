//! Opaque stubs emitted by the generator.
//!
//! Records reference stubs by a one-based id into the module's [`StubTable`]; id `0` means "no
//! stub". The ids are decoded into typed callables when a module is loaded, so a record whose id
//! points at the wrong kind of stub is rejected once, up front.
//!
//! | Stub | Signature |
//! |------|-----------|
//! | [`BoxingStub`] | managed value → native-backed object |
//! | [`UnboxingStub`] | native-backed object → managed value |
//! | [`MarshalStub`] | managed struct + field offsets → native bytes |
//! | [`UnmarshalStub`] | native bytes + field offsets → managed struct |
//! | [`DestroyStub`] | release resources referenced by native bytes |
//! | [`NativeEntry`] | raw native entry point used by the thunk layer |

use std::{fmt, sync::Arc};

use crate::{interop::object::ManagedObject, metadata::tables::TableId, Result};

type ConvertFn = dyn Fn(&ManagedObject) -> Result<ManagedObject> + Send + Sync;
type MarshalFn = dyn Fn(&ManagedObject, &[u32]) -> Result<Vec<u8>> + Send + Sync;
type UnmarshalFn = dyn Fn(&[u8], &[u32]) -> Result<ManagedObject> + Send + Sync;
type DestroyFn = dyn Fn(&mut [u8], &[u32]) -> Result<()> + Send + Sync;

/// Boxes a managed value into a native-backed object.
#[derive(Clone)]
pub struct BoxingStub(Arc<ConvertFn>);

impl BoxingStub {
    /// Wrap `stub`
    pub fn new<F>(stub: F) -> Self
    where
        F: Fn(&ManagedObject) -> Result<ManagedObject> + Send + Sync + 'static,
    {
        BoxingStub(Arc::new(stub))
    }

    /// Invoke the stub
    ///
    /// # Errors
    /// Propagates the failure reported by the stub.
    pub fn call(&self, value: &ManagedObject) -> Result<ManagedObject> {
        (self.0)(value)
    }
}

/// Unboxes a native-backed object into a managed value.
#[derive(Clone)]
pub struct UnboxingStub(Arc<ConvertFn>);

impl UnboxingStub {
    /// Wrap `stub`
    pub fn new<F>(stub: F) -> Self
    where
        F: Fn(&ManagedObject) -> Result<ManagedObject> + Send + Sync + 'static,
    {
        UnboxingStub(Arc::new(stub))
    }

    /// Invoke the stub
    ///
    /// # Errors
    /// Propagates the failure reported by the stub.
    pub fn call(&self, object: &ManagedObject) -> Result<ManagedObject> {
        (self.0)(object)
    }
}

/// Copies a managed struct into its native layout.
#[derive(Clone)]
pub struct MarshalStub(Arc<MarshalFn>);

impl MarshalStub {
    /// Wrap `stub`
    pub fn new<F>(stub: F) -> Self
    where
        F: Fn(&ManagedObject, &[u32]) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        MarshalStub(Arc::new(stub))
    }

    /// Invoke the stub with the struct's field offsets
    ///
    /// # Errors
    /// Propagates the failure reported by the stub.
    pub fn call(&self, value: &ManagedObject, offsets: &[u32]) -> Result<Vec<u8>> {
        (self.0)(value, offsets)
    }
}

/// Reads a managed struct back from its native layout.
#[derive(Clone)]
pub struct UnmarshalStub(Arc<UnmarshalFn>);

impl UnmarshalStub {
    /// Wrap `stub`
    pub fn new<F>(stub: F) -> Self
    where
        F: Fn(&[u8], &[u32]) -> Result<ManagedObject> + Send + Sync + 'static,
    {
        UnmarshalStub(Arc::new(stub))
    }

    /// Invoke the stub with the struct's field offsets
    ///
    /// # Errors
    /// Propagates the failure reported by the stub.
    pub fn call(&self, native: &[u8], offsets: &[u32]) -> Result<ManagedObject> {
        (self.0)(native, offsets)
    }
}

/// Releases whatever a native struct layout owns (strings, interface references).
#[derive(Clone)]
pub struct DestroyStub(Arc<DestroyFn>);

impl DestroyStub {
    /// Wrap `stub`
    pub fn new<F>(stub: F) -> Self
    where
        F: Fn(&mut [u8], &[u32]) -> Result<()> + Send + Sync + 'static,
    {
        DestroyStub(Arc::new(stub))
    }

    /// Invoke the stub with the struct's field offsets
    ///
    /// # Errors
    /// Propagates the failure reported by the stub.
    pub fn call(&self, native: &mut [u8], offsets: &[u32]) -> Result<()> {
        (self.0)(native, offsets)
    }
}

/// Address of a native-callable entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NativeEntry(pub usize);

macro_rules! opaque_debug {
    ($($name:ident),*) => {
        $(
            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(stringify!($name))
                }
            }
        )*
    };
}

opaque_debug!(BoxingStub, UnboxingStub, MarshalStub, UnmarshalStub, DestroyStub);

/// One entry of a module's stub table.
#[derive(Clone, Debug)]
pub enum Stub {
    /// See [`BoxingStub`]
    Boxing(BoxingStub),
    /// See [`UnboxingStub`]
    Unboxing(UnboxingStub),
    /// See [`MarshalStub`]
    Marshal(MarshalStub),
    /// See [`UnmarshalStub`]
    Unmarshal(UnmarshalStub),
    /// See [`DestroyStub`]
    Destroy(DestroyStub),
    /// See [`NativeEntry`]
    Native(NativeEntry),
}

impl Stub {
    fn kind(&self) -> &'static str {
        match self {
            Stub::Boxing(_) => "boxing",
            Stub::Unboxing(_) => "unboxing",
            Stub::Marshal(_) => "marshal",
            Stub::Unmarshal(_) => "unmarshal",
            Stub::Destroy(_) => "destroy",
            Stub::Native(_) => "native",
        }
    }
}

/// Conversion from a [`Stub`] table entry to one concrete stub kind.
pub trait StubKind: Sized {
    /// Human readable kind, used in load errors
    const KIND: &'static str;

    /// Extract the concrete stub, or `None` if `stub` is of another kind
    fn from_stub(stub: &Stub) -> Option<Self>;
}

macro_rules! impl_stub_kind {
    ($($variant:ident => $ty:ty, $kind:literal);* $(;)?) => {
        $(
            impl StubKind for $ty {
                const KIND: &'static str = $kind;

                fn from_stub(stub: &Stub) -> Option<Self> {
                    match stub {
                        Stub::$variant(inner) => Some(inner.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_stub_kind! {
    Boxing => BoxingStub, "boxing";
    Unboxing => UnboxingStub, "unboxing";
    Marshal => MarshalStub, "marshal";
    Unmarshal => UnmarshalStub, "unmarshal";
    Destroy => DestroyStub, "destroy";
    Native => NativeEntry, "native";
}

/// The stubs a module was generated with, addressed by one-based id.
#[derive(Clone, Debug, Default)]
pub struct StubTable {
    stubs: Vec<Stub>,
}

impl StubTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `stub` and return its id
    pub fn push(&mut self, stub: Stub) -> u32 {
        self.stubs.push(stub);
        #[allow(clippy::cast_possible_truncation)]
        let id = self.stubs.len() as u32;
        id
    }

    /// Number of stubs
    #[must_use]
    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    /// Returns true if the table holds no stubs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }

    /// Decode stub id `id` referenced by record `index` of `table`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `id` is past the end of the table or names a stub of
    /// a different kind.
    pub fn decode<T: StubKind>(&self, id: u32, table: TableId, index: u32) -> Result<Option<T>> {
        if id == 0 {
            return Ok(None);
        }

        let Some(stub) = self.stubs.get(id as usize - 1) else {
            return Err(malformed_error!(
                "{:?} record {} references stub {} of {}",
                table,
                index,
                id,
                self.stubs.len()
            ));
        };

        match T::from_stub(stub) {
            Some(typed) => Ok(Some(typed)),
            None => Err(malformed_error!(
                "{:?} record {} expects a {} stub at id {}, found {}",
                table,
                index,
                T::KIND,
                id,
                stub.kind()
            )),
        }
    }
}
