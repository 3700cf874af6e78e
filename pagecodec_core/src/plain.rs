//! PLAIN encoding of primitive values.
//!
//! Layout (no header, no length prefix, no type tag):
//!
//! ```text
//! BOOLEAN  bit-packed, LSB first, ceil(n/8) bytes, zero-padded tail
//! INT32    4 bytes LE two's complement per value
//! INT64    8 bytes LE two's complement per value
//! FLOAT    4 bytes LE IEEE 754 binary32 per value
//! DOUBLE   8 bytes LE IEEE 754 binary64 per value
//! ```
//!
//! The consumer must already know the value type, and for booleans the value
//! count, since padding bits look exactly like trailing `false` values.

use crate::error::{PageCodecError, Result};
use crate::format::{TYPE_BOOLEAN, TYPE_DOUBLE, TYPE_FLOAT, TYPE_INT32, TYPE_INT64};

/// A fixed-width primitive with a little-endian PLAIN layout.
pub trait PlainType: Copy {
    /// Encoded bytes per value.
    const WIDTH: usize;
    /// Type name used in error messages.
    const NAME: &'static str;

    fn write_le(self, out: &mut Vec<u8>);

    /// `chunk` is exactly `WIDTH` bytes.
    fn read_le(chunk: &[u8]) -> Self;
}

macro_rules! impl_plain_type {
    ($ty:ty, $name:literal) => {
        impl PlainType for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            const NAME: &'static str = $name;

            #[inline]
            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn read_le(chunk: &[u8]) -> Self {
                let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                bytes.copy_from_slice(chunk);
                <$ty>::from_le_bytes(bytes)
            }
        }
    };
}

impl_plain_type!(i32, "int32");
impl_plain_type!(i64, "int64");
impl_plain_type!(f32, "float");
impl_plain_type!(f64, "double");

pub fn encode_plain<T: PlainType>(values: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * T::WIDTH);
    for &v in values {
        v.write_le(&mut out);
    }
    out
}

/// Decode a fixed-width PLAIN buffer.
///
/// A length that is not a multiple of `T::WIDTH` is rejected rather than
/// truncated: a trailing partial value means the buffer boundary is wrong.
pub fn decode_plain<T: PlainType>(buf: &[u8]) -> Result<Vec<T>> {
    if buf.len() % T::WIDTH != 0 {
        return Err(PageCodecError::malformed(
            T::NAME,
            buf.len(),
            format!(
                "length is not a multiple of the {}-byte value width ({} trailing bytes)",
                T::WIDTH,
                buf.len() % T::WIDTH
            ),
        ));
    }
    Ok(buf.chunks_exact(T::WIDTH).map(T::read_le).collect())
}

// ── Booleans ───────────────────────────────────────────────────────────────

pub fn encode_bools(values: &[bool]) -> Vec<u8> {
    let mut out = vec![0u8; values.len().div_ceil(8)];
    for (i, &v) in values.iter().enumerate() {
        if v {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

/// Decode `count` bit-packed booleans.
///
/// `buf` must be exactly `ceil(count/8)` bytes and every padding bit past
/// `count` must be zero; anything else could not have come from
/// [`encode_bools`].
pub fn decode_bools(buf: &[u8], count: usize) -> Result<Vec<bool>> {
    let expected = count.div_ceil(8);
    if buf.len() != expected {
        return Err(PageCodecError::malformed(
            "boolean",
            buf.len(),
            format!("{} values need exactly {} bytes", count, expected),
        ));
    }

    let tail_bits = count % 8;
    if tail_bits != 0 {
        let padding = buf[expected - 1] >> tail_bits;
        if padding != 0 {
            return Err(PageCodecError::malformed(
                "boolean",
                buf.len(),
                format!("padding bits past value {} are not zero", count),
            ));
        }
    }

    Ok((0..count).map(|i| (buf[i / 8] >> (i % 8)) & 1 == 1).collect())
}

// ── Named entry points ─────────────────────────────────────────────────────

pub fn encode_int32s(values: &[i32]) -> Vec<u8> {
    encode_plain(values)
}

pub fn encode_int64s(values: &[i64]) -> Vec<u8> {
    encode_plain(values)
}

pub fn encode_float32s(values: &[f32]) -> Vec<u8> {
    encode_plain(values)
}

pub fn encode_float64s(values: &[f64]) -> Vec<u8> {
    encode_plain(values)
}

pub fn decode_int32s(buf: &[u8]) -> Result<Vec<i32>> {
    decode_plain(buf)
}

pub fn decode_int64s(buf: &[u8]) -> Result<Vec<i64>> {
    decode_plain(buf)
}

pub fn decode_float32s(buf: &[u8]) -> Result<Vec<f32>> {
    decode_plain(buf)
}

pub fn decode_float64s(buf: &[u8]) -> Result<Vec<f64>> {
    decode_plain(buf)
}

// ── Typed sequences ────────────────────────────────────────────────────────

/// Physical types that have a primitive PLAIN layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
}

impl PhysicalType {
    pub fn id(self) -> i32 {
        match self {
            PhysicalType::Boolean => TYPE_BOOLEAN,
            PhysicalType::Int32 => TYPE_INT32,
            PhysicalType::Int64 => TYPE_INT64,
            PhysicalType::Float => TYPE_FLOAT,
            PhysicalType::Double => TYPE_DOUBLE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PhysicalType::Boolean => "boolean",
            PhysicalType::Int32 => <i32 as PlainType>::NAME,
            PhysicalType::Int64 => <i64 as PlainType>::NAME,
            PhysicalType::Float => <f32 as PlainType>::NAME,
            PhysicalType::Double => <f64 as PlainType>::NAME,
        }
    }

    /// Bytes per value, or `None` for bit-packed booleans.
    pub fn width(self) -> Option<usize> {
        match self {
            PhysicalType::Boolean => None,
            PhysicalType::Int32 => Some(<i32 as PlainType>::WIDTH),
            PhysicalType::Int64 => Some(<i64 as PlainType>::WIDTH),
            PhysicalType::Float => Some(<f32 as PlainType>::WIDTH),
            PhysicalType::Double => Some(<f64 as PlainType>::WIDTH),
        }
    }

    /// Encoded size of `count` values.
    pub fn encoded_len(self, count: usize) -> Option<usize> {
        match self.width() {
            Some(width) => count.checked_mul(width),
            None => Some(count.div_ceil(8)),
        }
    }
}

impl TryFrom<i32> for PhysicalType {
    type Error = PageCodecError;

    fn try_from(id: i32) -> Result<Self> {
        match id {
            TYPE_BOOLEAN => Ok(PhysicalType::Boolean),
            TYPE_INT32 => Ok(PhysicalType::Int32),
            TYPE_INT64 => Ok(PhysicalType::Int64),
            TYPE_FLOAT => Ok(PhysicalType::Float),
            TYPE_DOUBLE => Ok(PhysicalType::Double),
            other => Err(PageCodecError::UnsupportedType(other)),
        }
    }
}

/// A decoded value sequence of one physical type.
#[derive(Debug, Clone, PartialEq)]
pub enum PlainValues {
    Boolean(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl PlainValues {
    pub fn physical_type(&self) -> PhysicalType {
        match self {
            PlainValues::Boolean(_) => PhysicalType::Boolean,
            PlainValues::Int32(_) => PhysicalType::Int32,
            PlainValues::Int64(_) => PhysicalType::Int64,
            PlainValues::Float(_) => PhysicalType::Float,
            PlainValues::Double(_) => PhysicalType::Double,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PlainValues::Boolean(v) => v.len(),
            PlainValues::Int32(v) => v.len(),
            PlainValues::Int64(v) => v.len(),
            PlainValues::Float(v) => v.len(),
            PlainValues::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            PlainValues::Boolean(v) => encode_bools(v),
            PlainValues::Int32(v) => encode_int32s(v),
            PlainValues::Int64(v) => encode_int64s(v),
            PlainValues::Float(v) => encode_float32s(v),
            PlainValues::Double(v) => encode_float64s(v),
        }
    }

    /// Decode exactly `count` values of `ty` from `buf`.
    ///
    /// The buffer must hold exactly `count` values; extra or missing bytes
    /// are reported as [`PageCodecError::MalformedBuffer`].
    pub fn decode(ty: PhysicalType, buf: &[u8], count: usize) -> Result<Self> {
        match ty {
            PhysicalType::Boolean => decode_bools(buf, count).map(PlainValues::Boolean),
            PhysicalType::Int32 => {
                check_fixed_len(ty, buf, count)?;
                decode_int32s(buf).map(PlainValues::Int32)
            }
            PhysicalType::Int64 => {
                check_fixed_len(ty, buf, count)?;
                decode_int64s(buf).map(PlainValues::Int64)
            }
            PhysicalType::Float => {
                check_fixed_len(ty, buf, count)?;
                decode_float32s(buf).map(PlainValues::Float)
            }
            PhysicalType::Double => {
                check_fixed_len(ty, buf, count)?;
                decode_float64s(buf).map(PlainValues::Double)
            }
        }
    }
}

fn check_fixed_len(ty: PhysicalType, buf: &[u8], count: usize) -> Result<()> {
    let expected = ty.encoded_len(count).ok_or_else(|| {
        PageCodecError::malformed(ty.name(), buf.len(), format!("value count {} overflows", count))
    })?;
    if buf.len() != expected {
        return Err(PageCodecError::malformed(
            ty.name(),
            buf.len(),
            format!("{} values need exactly {} bytes", count, expected),
        ));
    }
    Ok(())
}
