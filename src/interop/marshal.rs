//! Struct marshalling.
//!
//! A struct record pairs the managed struct with its native layout. The generated stubs copy
//! between the two using the struct's window of native field offsets. A struct flagged with an
//! invalid layout is rejected before any stub runs or any native memory is touched.

use crate::{
    interop::object::ManagedObject,
    metadata::tables::{StructMarshalData, TableId},
    registry::InteropRegistry,
    Error, Result,
};

impl InteropRegistry {
    /// The struct marshalling record at `index` of `module`
    ///
    /// # Errors
    /// Returns [`crate::Error::ModuleNotFound`] or [`crate::Error::IndexOutOfRange`] for a bad
    /// address.
    pub fn struct_marshal_data(&self, module: usize, index: u32) -> Result<&StructMarshalData> {
        self.module(module)?.struct_marshal(index)
    }

    /// The record at `index` of `module` together with its field offsets, once its layout is
    /// known to be valid.
    fn marshallable(&self, module: usize, index: u32) -> Result<(&StructMarshalData, &[u32])> {
        let data = self.module(module)?;
        let record = data.struct_marshal(index)?;
        if record.has_invalid_layout() {
            return Err(Error::InvalidLayout { module, index });
        }

        Ok((record, data.field_offsets(&record.field_offsets)?))
    }

    /// Copy the managed struct `value` into its native layout.
    ///
    /// # Errors
    /// Returns [`Error::InvalidLayout`] for a struct without a native layout,
    /// [`Error::MissingStub`] if no marshal stub was generated, or the stub's own failure.
    pub fn marshal(&self, value: &ManagedObject, module: usize, index: u32) -> Result<Vec<u8>> {
        let (record, offsets) = self.marshallable(module, index)?;
        let stub = record.marshal_stub.as_ref().ok_or(Error::MissingStub {
            table: TableId::StructMarshal,
            index,
        })?;

        stub.call(value, offsets)
    }

    /// Read a managed struct back from its native layout `native`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidLayout`] for a struct without a native layout,
    /// [`Error::MissingStub`] if no unmarshal stub was generated, or the stub's own failure.
    pub fn unmarshal(&self, native: &[u8], module: usize, index: u32) -> Result<ManagedObject> {
        let (record, offsets) = self.marshallable(module, index)?;
        let stub = record.unmarshal_stub.as_ref().ok_or(Error::MissingStub {
            table: TableId::StructMarshal,
            index,
        })?;

        stub.call(native, offsets)
    }

    /// Release whatever the native layout `native` owns.
    ///
    /// A struct without a destroy stub owns nothing and is left untouched.
    ///
    /// # Errors
    /// Returns [`Error::InvalidLayout`] for a struct without a native layout, or the stub's own
    /// failure.
    pub fn destroy(&self, native: &mut [u8], module: usize, index: u32) -> Result<()> {
        let (record, offsets) = self.marshallable(module, index)?;
        match &record.destroy_stub {
            Some(stub) => stub.call(native, offsets),
            None => Ok(()),
        }
    }

    /// The native offset of field `field` of the struct at `index` of `module`
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if the struct has fewer fields.
    pub fn field_offset(&self, module: usize, index: u32, field: u32) -> Result<u32> {
        let data = self.module(module)?;
        let offsets = data.field_offsets(&data.struct_marshal(index)?.field_offsets)?;

        offsets
            .get(field as usize)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                table: TableId::FieldOffset,
                index: field as usize,
                len: offsets.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use crate::{
        interop::{
            object::ManagedObject,
            stubs::{DestroyStub, MarshalStub, Stub, UnmarshalStub},
        },
        metadata::{
            builder::ModuleDataBuilder,
            tables::{StructMarshalFlags, StructMarshalRaw},
        },
        registry::InteropRegistry,
        Error,
    };

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i16,
    }

    fn registry(destroyed: Arc<AtomicUsize>) -> InteropRegistry {
        let mut builder = ModuleDataBuilder::new("structs");

        let marshal = builder.add_stub(Stub::Marshal(MarshalStub::new(|value, offsets| {
            let point = value
                .downcast_ref::<Point>()
                .ok_or_else(|| Error::Stub("expected a point".into()))?;
            let mut native = vec![0u8; 8];
            let x = offsets[0] as usize;
            let y = offsets[1] as usize;
            native[x..x + 4].copy_from_slice(&point.x.to_le_bytes());
            native[y..y + 2].copy_from_slice(&point.y.to_le_bytes());
            Ok(native)
        })));
        let unmarshal = builder.add_stub(Stub::Unmarshal(UnmarshalStub::new(|native, offsets| {
            let x = offsets[0] as usize;
            let y = offsets[1] as usize;
            let point = Point {
                x: i32::from_le_bytes([native[x], native[x + 1], native[x + 2], native[x + 3]]),
                y: i16::from_le_bytes([native[y], native[y + 1]]),
            };
            Ok(Arc::new(point) as ManagedObject)
        })));
        let destroy = builder.add_stub(Stub::Destroy(DestroyStub::new(move |native, _| {
            destroyed.fetch_add(1, Ordering::SeqCst);
            native.fill(0);
            Ok(())
        })));

        let stubs = StructMarshalRaw {
            marshal_stub: marshal,
            unmarshal_stub: unmarshal,
            destroy_stub: destroy,
            ..Default::default()
        };
        builder.add_struct(stubs.clone(), &[0, 4]);
        builder.add_struct(
            StructMarshalRaw {
                flags: StructMarshalFlags::HAS_INVALID_LAYOUT.bits(),
                ..stubs
            },
            &[0, 4],
        );
        builder.add_struct(StructMarshalRaw::default(), &[]);

        InteropRegistry::builder()
            .module(builder.build().unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn round_trip() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let registry = registry(destroyed.clone());

        let point: ManagedObject = Arc::new(Point { x: -7, y: 300 });
        let mut native = registry.marshal(&point, 0, 0).unwrap();
        assert_eq!(native, vec![0xF9, 0xFF, 0xFF, 0xFF, 0x2C, 0x01, 0x00, 0x00]);

        let back = registry.unmarshal(&native, 0, 0).unwrap();
        assert_eq!(back.downcast_ref::<Point>(), Some(&Point { x: -7, y: 300 }));

        registry.destroy(&mut native, 0, 0).unwrap();
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        assert!(native.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn invalid_layout_is_rejected_first() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let registry = registry(destroyed.clone());

        let point: ManagedObject = Arc::new(Point { x: 1, y: 2 });
        assert!(matches!(
            registry.marshal(&point, 0, 1),
            Err(Error::InvalidLayout { module: 0, index: 1 })
        ));
        assert!(matches!(
            registry.unmarshal(&[0; 8], 0, 1),
            Err(Error::InvalidLayout { .. })
        ));

        let mut native = vec![0xAA; 8];
        assert!(matches!(
            registry.destroy(&mut native, 0, 1),
            Err(Error::InvalidLayout { .. })
        ));
        assert_eq!(native, vec![0xAA; 8]);
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_stubs() {
        let registry = registry(Arc::new(AtomicUsize::new(0)));

        let point: ManagedObject = Arc::new(Point { x: 1, y: 2 });
        assert!(matches!(
            registry.marshal(&point, 0, 2),
            Err(Error::MissingStub { index: 2, .. })
        ));
        assert!(registry.destroy(&mut [], 0, 2).is_ok());
    }

    #[test]
    fn field_offsets() {
        let registry = registry(Arc::new(AtomicUsize::new(0)));

        assert_eq!(registry.field_offset(0, 0, 1).unwrap(), 4);
        assert_eq!(registry.struct_marshal_data(0, 0).unwrap().field_count(), 2);
        assert!(matches!(
            registry.field_offset(0, 0, 2),
            Err(Error::IndexOutOfRange { index: 2, len: 2, .. })
        ));
        assert!(registry.field_offset(0, 2, 0).is_err());
    }
}
