//! Bounds-checked little-endian reading and writing of fixed-layout records.
//!
//! Every metadata table is a packed array of little-endian records. The helpers in this module
//! read or write one primitive at a time while advancing a caller-owned offset, and fail with
//! [`crate::Error::OutOfBounds`] instead of panicking when a table is truncated.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use projscope::file::io::{read_le_at, write_le_at};
//!
//! let mut data = [0u8; 6];
//! let mut offset = 0;
//! write_le_at(&mut data, &mut offset, 0x0102u16)?;
//! write_le_at(&mut data, &mut offset, 0x03040506u32)?;
//!
//! let mut offset = 0;
//! assert_eq!(read_le_at::<u16>(&data, &mut offset)?, 0x0102);
//! assert_eq!(read_le_at::<u32>(&data, &mut offset)?, 0x03040506);
//! # Ok::<(), projscope::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait for primitives that can be read from and written to record data.
pub trait RecordIO: Sized {
    /// Fixed-size byte representation of the primitive
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Decode a value from its little-endian representation
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Encode a value into its little-endian representation
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_record_io {
    ($($ty:ty),*) => {
        $(
            impl RecordIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_record_io!(u8, i8, u16, i16, u32, i32, u64, i64);

/// Read a value from the start of `data` in little-endian format.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is too short.
pub fn read_le<T: RecordIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Read a value at `offset` in little-endian format and advance `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit in the remaining data.
pub fn read_le_at<T: RecordIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Read `N` raw bytes at `offset` and advance `offset` past them.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the bytes do not fit in the remaining data.
pub fn read_bytes_at<const N: usize>(data: &[u8], offset: &mut usize) -> Result<[u8; N]> {
    let Some(end) = offset.checked_add(N) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let mut buffer = [0u8; N];
    buffer.copy_from_slice(&data[*offset..end]);
    *offset = end;

    Ok(buffer)
}

/// Write a value at `offset` in little-endian format and advance `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit in the remaining space.
pub fn write_le_at<T: RecordIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    write_bytes_at(data, offset, value.to_le_bytes().as_ref())
}

/// Write raw bytes at `offset` and advance `offset` past them.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the bytes do not fit in the remaining space.
pub fn write_bytes_at(data: &mut [u8], offset: &mut usize, bytes: &[u8]) -> Result<()> {
    let Some(end) = offset.checked_add(bytes.len()) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[*offset..end].copy_from_slice(bytes);
    *offset = end;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_le_u16() {
        let result = read_le::<u16>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0201);
    }

    #[test]
    fn read_le_i16_negative() {
        let result = read_le::<i16>(&[0xFF, 0xFF]).unwrap();
        assert_eq!(result, -1);
    }

    #[test]
    fn read_le_u64() {
        let result = read_le::<u64>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0807060504030201);
    }

    #[test]
    fn read_sequential() {
        let mut offset = 0;
        assert_eq!(read_le_at::<u16>(&TEST_BUFFER, &mut offset).unwrap(), 0x0201);
        assert_eq!(read_le_at::<u32>(&TEST_BUFFER, &mut offset).unwrap(), 0x06050403);
        assert_eq!(offset, 6);
    }

    #[test]
    fn read_out_of_bounds() {
        let mut offset = 6;
        assert!(matches!(
            read_le_at::<u32>(&TEST_BUFFER, &mut offset),
            Err(OutOfBounds)
        ));
        assert_eq!(offset, 6);

        let mut offset = usize::MAX;
        assert!(read_le_at::<u8>(&TEST_BUFFER, &mut offset).is_err());
    }

    #[test]
    fn read_raw_bytes() {
        let mut offset = 2;
        let bytes = read_bytes_at::<4>(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!(bytes, [0x03, 0x04, 0x05, 0x06]);
        assert_eq!(offset, 6);
    }

    #[test]
    fn write_then_read() {
        let mut data = [0u8; 7];
        let mut offset = 0;
        write_le_at(&mut data, &mut offset, -2i16).unwrap();
        write_le_at(&mut data, &mut offset, 0xAABBCCDDu32).unwrap();
        write_le_at(&mut data, &mut offset, 0x7Fu8).unwrap();
        assert_eq!(data, [0xFE, 0xFF, 0xDD, 0xCC, 0xBB, 0xAA, 0x7F]);

        assert!(write_le_at(&mut data, &mut offset, 1u8).is_err());
    }
}
