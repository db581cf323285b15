//! Fixed-width scalars and arrays of them.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{Marshal, MarshalError, Unmarshal};

/// A value with a constant encoded width
///
/// `read_from` is only called with at least `WIDTH` bytes remaining.
pub trait FixedWidth: Sized {
    const WIDTH: usize;

    fn write_to<B: BufMut>(&self, buf: &mut B);

    fn read_from<B: Buf>(buf: &mut B) -> Result<Self, MarshalError>;
}

pub(super) fn marshal_fixed<T: FixedWidth>(value: &T) -> Bytes {
    let mut buf = BytesMut::with_capacity(T::WIDTH);
    value.write_to(&mut buf);
    buf.freeze()
}

pub(super) fn unmarshal_fixed<T: FixedWidth>(bytes: &[u8]) -> Result<T, MarshalError> {
    if bytes.len() != T::WIDTH {
        return Err(MarshalError::WidthMismatch {
            expected: T::WIDTH,
            actual: bytes.len(),
        });
    }
    let mut buf = bytes;
    T::read_from(&mut buf)
}

macro_rules! fixed_marshal {
    ($($ty:ty),* $(,)?) => {$(
        impl Marshal for $ty {
            fn marshal(&self) -> Result<Bytes, MarshalError> {
                Ok(marshal_fixed(self))
            }
        }

        impl Unmarshal for $ty {
            fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError> {
                unmarshal_fixed(bytes)
            }
        }
    )*};
}

macro_rules! fixed_number {
    ($($ty:ty => $put:ident, $get:ident;)*) => {$(
        impl FixedWidth for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();

            fn write_to<B: BufMut>(&self, buf: &mut B) {
                buf.$put(*self);
            }

            fn read_from<B: Buf>(buf: &mut B) -> Result<Self, MarshalError> {
                Ok(buf.$get())
            }
        }

        fixed_marshal!($ty);
    )*};
}

fixed_number! {
    u8 => put_u8, get_u8;
    i8 => put_i8, get_i8;
    u16 => put_u16_le, get_u16_le;
    i16 => put_i16_le, get_i16_le;
    u32 => put_u32_le, get_u32_le;
    i32 => put_i32_le, get_i32_le;
    u64 => put_u64_le, get_u64_le;
    i64 => put_i64_le, get_i64_le;
    u128 => put_u128_le, get_u128_le;
    i128 => put_i128_le, get_i128_le;
    f32 => put_f32_le, get_f32_le;
    f64 => put_f64_le, get_f64_le;
}

impl FixedWidth for bool {
    const WIDTH: usize = 1;

    fn write_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(*self as u8);
    }

    fn read_from<B: Buf>(buf: &mut B) -> Result<Self, MarshalError> {
        match buf.get_u8() {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(MarshalError::InvalidValue { type_name: "bool" }),
        }
    }
}

impl FixedWidth for char {
    const WIDTH: usize = 4;

    fn write_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(*self as u32);
    }

    fn read_from<B: Buf>(buf: &mut B) -> Result<Self, MarshalError> {
        char::from_u32(buf.get_u32_le()).ok_or(MarshalError::InvalidValue { type_name: "char" })
    }
}

fixed_marshal!(bool, char);

// =============================================================================
// Arrays
// =============================================================================

impl<T: FixedWidth, const N: usize> FixedWidth for [T; N] {
    const WIDTH: usize = T::WIDTH * N;

    fn write_to<B: BufMut>(&self, buf: &mut B) {
        for item in self {
            item.write_to(buf);
        }
    }

    fn read_from<B: Buf>(buf: &mut B) -> Result<Self, MarshalError> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::read_from(buf)?);
        }
        items
            .try_into()
            .map_err(|_| MarshalError::InvalidValue { type_name: "array" })
    }
}

impl<T: FixedWidth, const N: usize> Marshal for [T; N] {
    fn marshal(&self) -> Result<Bytes, MarshalError> {
        Ok(marshal_fixed(self))
    }
}

impl<T: FixedWidth, const N: usize> Unmarshal for [T; N] {
    fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError> {
        unmarshal_fixed(bytes)
    }
}
