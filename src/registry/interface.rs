use crate::{
    interop::dispatch::DispatchTableRef,
    metadata::{
        tables::{DispatchSource, InterfaceData},
        token::TypeHandle,
    },
    registry::InteropRegistry,
    Result,
};

impl InteropRegistry {
    /// The interface record at `index` of `module`
    ///
    /// # Errors
    /// Returns [`crate::Error::ModuleNotFound`] or [`crate::Error::IndexOutOfRange`] for a bad
    /// address.
    pub fn interface_data(&self, module: usize, index: u32) -> Result<&InterfaceData> {
        self.module(module)?.interface(index)
    }

    /// The dispatch table native callers use for the interface at `index` of `module`.
    ///
    /// A shared shape selector takes precedence over the record's own descriptor. `None` means
    /// the interface has no table, or its shared slot is unavailable.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModuleNotFound`] or [`crate::Error::IndexOutOfRange`] for a bad
    /// address.
    pub fn dispatch_table(&self, module: usize, index: u32) -> Result<Option<DispatchTableRef>> {
        Ok(match &self.interface_data(module, index)?.dispatch {
            DispatchSource::Shared(shape) => self.pool.get(*shape),
            DispatchSource::Own(None) => None,
            DispatchSource::Own(Some(descriptor)) => Some(descriptor.table()),
        })
    }

    /// The managed type of the interface at `index` of `module`
    ///
    /// # Errors
    /// Returns an error for a bad address or an unresolvable type reference.
    pub fn interface_type(&self, module: usize, index: u32) -> Result<TypeHandle> {
        self.resolve(&self.interface_data(module, index)?.itf_type)
    }

    /// The dispatch class of the interface at `index` of `module`, `None` if it has none
    ///
    /// # Errors
    /// Returns an error for a bad address or an unresolvable type reference.
    pub fn dispatch_class(&self, module: usize, index: u32) -> Result<Option<TypeHandle>> {
        self.resolve_present(&self.interface_data(module, index)?.dispatch_class)
    }

    /// The dynamic adapter class of the interface at `index` of `module`, `None` if it has none
    ///
    /// # Errors
    /// Returns an error for a bad address or an unresolvable type reference.
    pub fn dynamic_adapter_class(&self, module: usize, index: u32) -> Result<Option<TypeHandle>> {
        self.resolve_present(&self.interface_data(module, index)?.dynamic_adapter_class)
    }
}
