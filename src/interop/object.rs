//! Managed objects, boxing wrappers and the allocator capability.
//!
//! The garbage-collected object model is external to this crate. Managed values travel through
//! the registry as [`ManagedObject`] handles, and wrapper instances are obtained from an
//! [`ObjectAllocator`] supplied by the embedding runtime.
//!
//! Two wrapper shapes exist:
//! - [`BoxedValue`] - reference and reference-array wrappers, initialized with a value and its
//!   property type tag
//! - [`BoxedKeyValuePair`] - key/value pair wrappers, initialized with the pair alone
//!
//! Both expose the wrapper capability: the wrapped value can be read back without going through
//! a generated unboxing stub.

use std::{any::Any, fmt, sync::Arc};

use dashmap::DashMap;

use crate::{metadata::token::TypeHandle, Error, Result};

/// A reference to a value of the managed object model
pub type ManagedObject = Arc<dyn Any + Send + Sync>;

/// A reference or reference-array wrapper.
pub trait BoxedValue: Send + Sync {
    /// Store `value`, tagged with its property type
    fn initialize(&mut self, value: ManagedObject, property_type: i16);

    /// The wrapped value, once initialized
    fn target(&self) -> Option<ManagedObject>;

    /// The property type tag given at initialization
    fn property_type(&self) -> i16;
}

/// A key/value pair wrapper.
pub trait BoxedKeyValuePair: Send + Sync {
    /// Store the pair `value`
    ///
    /// # Errors
    /// Returns an error if `value` is not a pair this wrapper can hold.
    fn initialize(&mut self, value: ManagedObject) -> Result<()>;

    /// The wrapped pair, once initialized
    fn target(&self) -> Option<ManagedObject>;
}

/// A freshly allocated, not yet initialized wrapper.
pub enum WrapperInstance {
    /// A [`BoxedValue`] wrapper
    Value(Box<dyn BoxedValue>),
    /// A [`BoxedKeyValuePair`] wrapper
    KeyValuePair(Box<dyn BoxedKeyValuePair>),
}

/// Capability to allocate and construct instances of managed wrapper classes.
pub trait ObjectAllocator: Send + Sync {
    /// Allocate an instance of `class`
    ///
    /// # Errors
    /// Returns [`crate::Error::Allocation`] if `class` cannot be instantiated.
    fn allocate(&self, class: TypeHandle) -> Result<WrapperInstance>;
}

/// The result of boxing a value.
#[derive(Clone)]
pub enum BoxedObject {
    /// A managed reference wrapper
    Value(Arc<dyn BoxedValue>),
    /// A managed key/value pair wrapper
    KeyValuePair(Arc<dyn BoxedKeyValuePair>),
    /// An object produced by a boxing stub, or handed in from native code
    Native(ManagedObject),
}

impl BoxedObject {
    /// Returns true if this object exposes the wrapper capability
    #[must_use]
    pub fn is_wrapper(&self) -> bool {
        !matches!(self, BoxedObject::Native(_))
    }

    /// Read the wrapped value through the wrapper capability.
    ///
    /// `None` for native objects and for wrappers that were never initialized.
    #[must_use]
    pub fn target(&self) -> Option<ManagedObject> {
        match self {
            BoxedObject::Value(wrapper) => wrapper.target(),
            BoxedObject::KeyValuePair(wrapper) => wrapper.target(),
            BoxedObject::Native(_) => None,
        }
    }

    /// The underlying object of a native-backed result
    #[must_use]
    pub fn as_native(&self) -> Option<&ManagedObject> {
        match self {
            BoxedObject::Native(object) => Some(object),
            _ => None,
        }
    }
}

impl fmt::Debug for BoxedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxedObject::Value(wrapper) => write!(
                f,
                "BoxedObject::Value(property_type: {})",
                wrapper.property_type()
            ),
            BoxedObject::KeyValuePair(_) => f.write_str("BoxedObject::KeyValuePair"),
            BoxedObject::Native(_) => f.write_str("BoxedObject::Native"),
        }
    }
}

/// A general purpose [`BoxedValue`] holding any managed value.
#[derive(Default)]
pub struct ReferenceWrapper {
    data: Option<ManagedObject>,
    property_type: i16,
}

impl BoxedValue for ReferenceWrapper {
    fn initialize(&mut self, value: ManagedObject, property_type: i16) {
        self.data = Some(value);
        self.property_type = property_type;
    }

    fn target(&self) -> Option<ManagedObject> {
        self.data.clone()
    }

    fn property_type(&self) -> i16 {
        self.property_type
    }
}

/// A general purpose [`BoxedKeyValuePair`] holding any managed pair.
#[derive(Default)]
pub struct PairWrapper {
    pair: Option<ManagedObject>,
}

impl BoxedKeyValuePair for PairWrapper {
    fn initialize(&mut self, value: ManagedObject) -> Result<()> {
        self.pair = Some(value);
        Ok(())
    }

    fn target(&self) -> Option<ManagedObject> {
        self.pair.clone()
    }
}

type WrapperFactory = Arc<dyn Fn() -> WrapperInstance + Send + Sync>;

/// An [`ObjectAllocator`] backed by per-class factories.
///
/// Suitable for hosts that construct wrapper classes from a fixed set of Rust types.
///
/// ```rust
/// use projscope::{ClassAllocator, ObjectAllocator, ReferenceWrapper, TypeHandle, WrapperInstance};
///
/// let allocator = ClassAllocator::new();
/// allocator.register(TypeHandle::new(0x10), || {
///     WrapperInstance::Value(Box::new(ReferenceWrapper::default()))
/// });
///
/// assert!(allocator.allocate(TypeHandle::new(0x10)).is_ok());
/// assert!(allocator.allocate(TypeHandle::new(0x11)).is_err());
/// ```
#[derive(Default)]
pub struct ClassAllocator {
    factories: DashMap<TypeHandle, WrapperFactory>,
}

impl ClassAllocator {
    /// Create an allocator without any registered class
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the factory used for instances of `class`
    pub fn register<F>(&self, class: TypeHandle, factory: F)
    where
        F: Fn() -> WrapperInstance + Send + Sync + 'static,
    {
        self.factories.insert(class, Arc::new(factory));
    }
}

impl ObjectAllocator for ClassAllocator {
    fn allocate(&self, class: TypeHandle) -> Result<WrapperInstance> {
        let factory = self
            .factories
            .get(&class)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::Allocation(format!("no factory for class {class}")))?;

        Ok(factory())
    }
}
