//! Fixed-layout metadata tables of an interop module.
//!
//! Each table is a packed array of little-endian records of one kind. Records are addressed by a
//! zero-based index within their module. Every table kind lives in its own submodule holding:
//! - a `*Raw` record, the exact binary layout, implementing [`RowReadable`] and [`RowWritable`]
//! - an owned record, decoded once at load with every flag, link and stub id turned into a typed
//!   value
//!
//! # Tables
//!
//! | Table | Record size | Purpose |
//! |-------|-------------|---------|
//! | [`TableId::Interface`] | 48 | Interface projections and their dispatch source |
//! | [`TableId::Class`] | 32 | Projected classes, base class and default interface |
//! | [`TableId::CcwTemplate`] | 32 | Wrapper templates for managed objects exposed to native code |
//! | [`TableId::SupportedInterface`] | 8 | Interface lists addressed by template windows |
//! | [`TableId::Boxing`] | 28 | Boxing policy per boxable type |
//! | [`TableId::BoxingName`] | 4 | Runtime class names of boxing records |
//! | [`TableId::StructMarshal`] | 40 | Struct marshalling stubs and field windows |
//! | [`TableId::FieldOffset`] | 4 | Native field offsets |
//! | [`TableId::Collection`] | 24 | Collection projections |
//! | [`TableId::AdditionalClass`] | 12 | Fallback classes for unimported runtime classes |
//! | [`TableId::AdditionalClassName`] | 4 | Runtime class names of additional class records |
//! | [`TableId::GenericArgument`] | 44 | Marshalling data of generic instantiations |
//! | [`TableId::PInvokeDelegate`] | 20 | Native entry points of delegates |
//! | [`TableId::HashcodeVerify`] | 12 | Expected hash codes of selected types |
//! | [`TableId::TypeNameMarshaling`] | 8 | Unimported types marshalled by name |
//! | [`TableId::CcwFactory`] | 8 | Managed activation factories exposed to native code |
//!
//! # Record Links
//!
//! Parent and base relationships are stored twice: as an in-module index and as a type identity.
//! [`RecordLink::decode`] applies the precedence rule once at load so lookups never re-check it.

mod additionalclass;
mod boxing;
mod ccwfactory;
mod ccwtemplate;
mod class;
mod collection;
mod fieldoffset;
mod genericarg;
mod hashcodeverify;
mod interface;
mod name;
mod pinvokedelegate;
mod structmarshal;
mod supportedinterface;
mod typenamemarshaling;

pub use additionalclass::*;
pub use boxing::*;
pub use ccwfactory::*;
pub use ccwtemplate::*;
pub use class::*;
pub use collection::*;
pub use fieldoffset::*;
pub use genericarg::*;
pub use hashcodeverify::*;
pub use interface::*;
pub use name::*;
pub use pinvokedelegate::*;
pub use structmarshal::*;
pub use supportedinterface::*;
pub use typenamemarshaling::*;

use std::{marker::PhantomData, ops::Range};

use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use strum::{EnumCount, EnumIter};

use crate::{
    file::io::{read_le_at, write_le_at},
    interop::{dispatch::DispatchDescriptor, stubs::StubTable},
    metadata::fixup::{FixupTypeRef, RawFixup},
    Result,
};

/// Identifies one table kind of an interop module.
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumCount, Eq, Hash)]
pub enum TableId {
    /// Interface projections
    Interface = 0x00,
    /// Projected classes
    Class = 0x01,
    /// Native wrapper templates
    CcwTemplate = 0x02,
    /// Interface lists of wrapper templates
    SupportedInterface = 0x03,
    /// Boxing records
    Boxing = 0x04,
    /// Names parallel to the boxing table
    BoxingName = 0x05,
    /// Struct marshalling records
    StructMarshal = 0x06,
    /// Native field offsets
    FieldOffset = 0x07,
    /// Collection projections
    Collection = 0x08,
    /// Fallback class records
    AdditionalClass = 0x09,
    /// Names parallel to the additional class table
    AdditionalClassName = 0x0A,
    /// Generic argument marshalling records
    GenericArgument = 0x0B,
    /// Delegate entry points
    PInvokeDelegate = 0x0C,
    /// Expected type hash codes
    HashcodeVerify = 0x0D,
    /// Types marshalled by name
    TypeNameMarshaling = 0x0E,
    /// Activation factories exposed to native code
    CcwFactory = 0x0F,
}

/// Reading of one fixed-size record.
pub trait RowReadable: Sized + Send {
    /// The table this record belongs to
    const TABLE: TableId;

    /// Size in bytes of one record
    const ROW_SIZE: usize;

    /// Read the record with zero-based `index` at `offset`, advancing `offset` past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the record is truncated.
    fn row_read(data: &[u8], offset: &mut usize, index: u32) -> Result<Self>;
}

/// Writing of one fixed-size record, the inverse of [`RowReadable`].
pub trait RowWritable: RowReadable {
    /// Write this record at `offset`, advancing `offset` past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` lacks space for the record.
    fn row_write(&self, data: &mut [u8], offset: &mut usize) -> Result<()>;
}

/// Inputs shared by every record while a module is decoded.
pub struct DecodeContext<'a> {
    /// Position of the module within the registry
    pub module: usize,
    /// The module's generated stubs
    pub stubs: &'a StubTable,
    /// The module's dispatch descriptors, addressed by one-based id
    pub descriptors: &'a [DispatchDescriptor],
}

/// A typed view over the bytes of one table.
pub struct MetadataTable<'a, T> {
    data: &'a [u8],
    row_count: u32,
    _phantom: PhantomData<fn() -> T>,
}

impl<'a, T: RowReadable> MetadataTable<'a, T> {
    /// Create a table over `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `data` is not a whole number of records.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() % T::ROW_SIZE != 0 {
            return Err(malformed_error!(
                "{:?} table holds {} bytes, not a multiple of its {} byte record",
                T::TABLE,
                data.len(),
                T::ROW_SIZE
            ));
        }

        let Ok(row_count) = u32::try_from(data.len() / T::ROW_SIZE) else {
            return Err(malformed_error!("{:?} table has too many records", T::TABLE));
        };

        Ok(MetadataTable {
            data,
            row_count,
            _phantom: PhantomData,
        })
    }

    /// Returns the total size of this table in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns the total number of records in this table
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Read the record at zero-based `index`, or `None` if it is out of range
    #[must_use]
    pub fn get(&self, index: u32) -> Option<T> {
        if index >= self.row_count {
            return None;
        }

        T::row_read(self.data, &mut (index as usize * T::ROW_SIZE), index).ok()
    }

    /// Sequential iterator over all records
    #[must_use]
    pub fn iter(&self) -> TableIterator<'_, 'a, T> {
        TableIterator {
            table: self,
            current_row: 0,
            current_offset: 0,
        }
    }

    /// Parallel iterator over all records, in index order when collected
    pub fn par_iter(&self) -> impl IndexedParallelIterator<Item = Result<T>> + '_ {
        let data = self.data;
        (0..self.row_count).into_par_iter().map(move |index| {
            let mut offset = index as usize * T::ROW_SIZE;
            T::row_read(data, &mut offset, index)
        })
    }

    /// Read and convert every record in parallel, keeping index order.
    ///
    /// # Errors
    /// Returns the first error reported by reading or converting a record.
    pub fn decode<O, F>(&self, convert: F) -> Result<Vec<O>>
    where
        O: Send,
        F: Fn(T) -> Result<O> + Send + Sync,
    {
        self.par_iter().map(|row| convert(row?)).collect()
    }
}

/// Sequential iterator for metadata table records.
pub struct TableIterator<'t, 'a, T> {
    table: &'t MetadataTable<'a, T>,
    current_row: u32,
    current_offset: usize,
}

impl<T: RowReadable> Iterator for TableIterator<'_, '_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row >= self.table.row_count {
            return None;
        }

        let row = T::row_read(self.table.data, &mut self.current_offset, self.current_row);
        self.current_row += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.table.row_count - self.current_row) as usize;
        (remaining, Some(remaining))
    }
}

impl<T: RowReadable> ExactSizeIterator for TableIterator<'_, '_, T> {}

/// Encode `rows` into the binary form of their table.
///
/// # Errors
/// Returns an error if a record fails to serialize.
pub fn write_table<T: RowWritable>(rows: &[T]) -> Result<Vec<u8>> {
    let mut data = vec![0u8; rows.len() * T::ROW_SIZE];
    let mut offset = 0;
    for row in rows {
        row.row_write(&mut data, &mut offset)?;
    }

    Ok(data)
}

/// Read a type reference at `offset`
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the data is truncated.
pub fn read_fixup_at(data: &[u8], offset: &mut usize) -> Result<RawFixup> {
    Ok(RawFixup(read_le_at::<u64>(data, offset)?))
}

/// Write a type reference at `offset`
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the data lacks space.
pub fn write_fixup_at(data: &mut [u8], offset: &mut usize, fixup: RawFixup) -> Result<()> {
    write_le_at(data, offset, fixup.0)
}

/// Convert a record index field into a `u32`, treating any negative value as "none".
#[must_use]
pub fn local_index(index: i32) -> Option<u32> {
    u32::try_from(index).ok()
}

/// Decode a window of `count` records starting at `start`.
///
/// An empty window is valid wherever it starts and decodes to `0..0`. Returns `None` if a
/// non-empty window has a negative bound or overflows.
#[must_use]
pub fn decode_window(start: i32, count: i32) -> Option<Range<u32>> {
    if count == 0 {
        return Some(0..0);
    }

    let start = u32::try_from(start).ok()?;
    let count = u32::try_from(count).ok()?;
    Some(start..start.checked_add(count)?)
}

/// A decoded relationship between two records.
///
/// Exactly one of the three cases holds for every relationship.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordLink {
    /// A record of the same module, by zero-based index
    Local(u32),
    /// A type described by some module, found by identity
    Cross(FixupTypeRef),
    /// No relationship
    Absent,
}

impl RecordLink {
    /// Apply the precedence rule: a non-negative index wins, then a non-null identity.
    #[must_use]
    pub fn decode(index: i32, fixup: RawFixup) -> Self {
        if let Some(local) = local_index(index) {
            return RecordLink::Local(local);
        }

        let fixup = FixupTypeRef::from_raw(fixup);
        if fixup.is_null() {
            RecordLink::Absent
        } else {
            RecordLink::Cross(fixup)
        }
    }

    /// Returns true if there is no relationship
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, RecordLink::Absent)
    }

    /// The local index, if the link stays within the module
    #[must_use]
    pub fn local(&self) -> Option<u32> {
        match self {
            RecordLink::Local(index) => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::metadata::token::{Token, TypeHandle};

    #[test]
    fn table_ids() {
        assert_eq!(TableId::iter().count(), TableId::COUNT);
        assert_eq!(TableId::PInvokeDelegate as u8, 0x0C);
        assert_eq!(TableId::CcwFactory as u8, 0x0F);
    }

    #[test]
    fn link_precedence() {
        let handle = RawFixup::from(TypeHandle::new(0x40));

        assert_eq!(RecordLink::decode(3, handle), RecordLink::Local(3));
        assert_eq!(RecordLink::decode(0, RawFixup::NULL), RecordLink::Local(0));
        assert_eq!(
            RecordLink::decode(-1, handle),
            RecordLink::Cross(FixupTypeRef::resolved(TypeHandle::new(0x40)))
        );
        assert_eq!(RecordLink::decode(-1, RawFixup::NULL), RecordLink::Absent);

        let deferred = RecordLink::decode(-1, RawFixup::from(Token::new(0x02000004)));
        assert!(matches!(deferred, RecordLink::Cross(ref fixup) if !fixup.is_resolved()));
        assert!(RecordLink::decode(-1, RawFixup::NULL).is_absent());
    }

    #[test]
    fn windows() {
        assert_eq!(decode_window(-1, 0), Some(0..0));
        assert_eq!(decode_window(4, 2), Some(4..6));
        assert_eq!(decode_window(-1, 1), None);
        assert_eq!(decode_window(0, -1), None);
        assert_eq!(decode_window(i32::MAX, i32::MAX), Some(0x7FFF_FFFF..0xFFFF_FFFE));
    }

    #[test]
    fn table_rejects_partial_records() {
        let data = [0u8; 9];
        assert!(matches!(
            MetadataTable::<FieldOffsetRaw>::new(&data),
            Err(crate::Error::Malformed { .. })
        ));

        let data = [1, 0, 0, 0, 2, 0, 0, 0];
        let table = MetadataTable::<FieldOffsetRaw>::new(&data).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.size(), 8);
        assert_eq!(table.get(1).unwrap().offset, 2);
        assert!(table.get(2).is_none());

        let offsets: Vec<u32> = table.iter().map(|row| row.unwrap().offset).collect();
        assert_eq!(offsets, vec![1, 2]);
    }

    #[test]
    fn parallel_decode_keeps_order() {
        let rows: Vec<FieldOffsetRaw> = (0..100)
            .map(|index| FieldOffsetRaw {
                index,
                offset: index * 4,
            })
            .collect();
        let data = write_table(&rows).unwrap();

        let table = MetadataTable::<FieldOffsetRaw>::new(&data).unwrap();
        let decoded = table.decode(|row| Ok(row.offset)).unwrap();
        assert_eq!(decoded.len(), 100);
        assert_eq!(decoded[25], 100);
        assert!(decoded.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
