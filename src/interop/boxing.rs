//! Boxing values for native code and unboxing them again.
//!
//! A boxing record selects one of two policies:
//! - [`BoxingPolicy::Wrapper`]: an instance of the record's wrapper class is allocated and
//!   initialized with the value. Reading the value back goes through the wrapper capability.
//! - [`BoxingPolicy::Stub`]: the record's generated stubs convert in both directions.

use std::sync::Arc;

use crate::{
    interop::object::{BoxedObject, ManagedObject, WrapperInstance},
    metadata::tables::{BoxingData, BoxingPolicy, TableId},
    registry::InteropRegistry,
    Error, Result,
};

impl InteropRegistry {
    /// The boxing record at `index` of `module`
    ///
    /// # Errors
    /// Returns [`crate::Error::ModuleNotFound`] or [`crate::Error::IndexOutOfRange`] for a bad
    /// address.
    pub fn boxing_data(&self, module: usize, index: u32) -> Result<&BoxingData> {
        self.module(module)?.boxing_record(index)
    }

    /// Box `value` as described by the boxing record at `index` of `module`.
    ///
    /// # Errors
    /// Returns an error for a bad address, an unresolvable wrapper class, a failed allocation,
    /// [`Error::MissingStub`] if the stub policy has no boxing stub, or the stub's own failure.
    pub fn box_value(&self, value: ManagedObject, module: usize, index: u32) -> Result<BoxedObject> {
        let record = self.boxing_data(module, index)?;

        match record.policy() {
            BoxingPolicy::Wrapper => {
                let class = self.resolve(&record.wrapper_class)?;
                match self.allocator().allocate(class)? {
                    WrapperInstance::Value(mut wrapper) => {
                        wrapper.initialize(value, record.property_type);
                        Ok(BoxedObject::Value(Arc::from(wrapper)))
                    }
                    WrapperInstance::KeyValuePair(mut wrapper) => {
                        wrapper.initialize(value)?;
                        Ok(BoxedObject::KeyValuePair(Arc::from(wrapper)))
                    }
                }
            }
            BoxingPolicy::Stub => {
                let stub = record.boxing_stub.as_ref().ok_or(Error::MissingStub {
                    table: TableId::Boxing,
                    index,
                })?;
                Ok(BoxedObject::Native(stub.call(&value)?))
            }
        }
    }

    /// Recover the value of `object`, boxed by the record at `index` of `module`.
    ///
    /// Objects with the wrapper capability are read directly; anything else goes through the
    /// record's unboxing stub.
    ///
    /// # Errors
    /// Returns an error for a bad address, [`Error::Error`] for a wrapper that holds no value,
    /// [`Error::MissingStub`] if the record has no unboxing stub, or the stub's own failure.
    pub fn unbox(&self, object: &BoxedObject, module: usize, index: u32) -> Result<ManagedObject> {
        let record = self.boxing_data(module, index)?;

        let native = match object {
            BoxedObject::Native(native) => native,
            wrapper => {
                return wrapper.target().ok_or_else(|| {
                    Error::Error(format!(
                        "wrapper for boxing record {index} of module {module} holds no value"
                    ))
                })
            }
        };

        let stub = record.unboxing_stub.as_ref().ok_or(Error::MissingStub {
            table: TableId::Boxing,
            index,
        })?;
        stub.call(native)
    }

    /// Box `value` through the boxing record named by the runtime class `name`.
    ///
    /// # Errors
    /// Returns [`Error::Error`] if no module names such a record, or any error of
    /// [`InteropRegistry::box_value`].
    pub fn box_value_by_name(&self, value: ManagedObject, name: &str) -> Result<BoxedObject> {
        let location = self
            .find_boxing_by_name(name)
            .ok_or_else(|| Error::Error(format!("no boxing record for '{name}'")))?;
        self.box_value(value, location.module, location.index)
    }
}
