//! Scalar helpers shared by the bit writer and reader.
//!
//! # Wire shapes
//!
//! All shapes are written LSB-first through the bit writer:
//!
//! ```text
//! varint           7 payload bits + 1 continuation bit per byte
//! *_zero           [is_zero:1] [varint]?
//! *_dec_zeros      [is_zero:1] ([k:4] [varint of v / 10^k])?
//! signed forms     zigzag applied before the varint
//! ```
//!
//! For the signed decimal form, trailing zeros are stripped from the signed
//! value first and the residual is zigzag mapped afterwards.

/// Largest number of trailing decimal zeros recorded in the 4-bit count.
///
/// Values with more trailing zeros keep the excess in the residual varint.
pub const MAX_DECIMAL_ZEROS: u32 = 15;

/// Powers of ten indexed by the stripped decimal-zero count.
pub const POW10: [u64; 16] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
];

/// Continuation flag of a varint byte.
pub const CONTINUATION_FLAG: u8 = 0x80;

/// Payload mask of a varint byte.
pub const PAYLOAD_MASK: u8 = 0x7F;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// Unsigned integer widths accepted by the varint encoder.
///
/// Sealed: only `u8`, `u16`, `u32` and `u64` implement it, so passing a
/// signed or 128-bit integer to `put_var` is a compile error.
pub trait VarUint: sealed::Sealed + Copy {
    /// Widen to `u64`.
    fn to_u64(self) -> u64;
}

macro_rules! impl_var_uint {
    ($($t:ty),*) => {
        $(
            impl VarUint for $t {
                #[inline(always)]
                fn to_u64(self) -> u64 {
                    u64::from(self)
                }
            }
        )*
    };
}

impl_var_uint!(u8, u16, u32, u64);

/// Map a signed value onto an unsigned one so small magnitudes stay small.
///
/// `0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...`
#[inline(always)]
pub fn zigzag_encode(v: i64) -> u64 {
    ((v as u64) << 1) ^ ((v >> 63) as u64)
}

/// Inverse of [`zigzag_encode`].
#[inline(always)]
pub fn zigzag_decode(z: u64) -> i64 {
    ((z >> 1) as i64) ^ -((z & 1) as i64)
}

/// Strip up to [`MAX_DECIMAL_ZEROS`] trailing decimal zeros from `v`.
///
/// Returns the reduced value and the number of zeros removed. Zero is
/// returned unchanged with a count of 0.
#[inline]
pub fn strip_decimal_zeros(mut v: u64) -> (u64, u32) {
    let mut k = 0;
    while v != 0 && k < MAX_DECIMAL_ZEROS && v % 10 == 0 {
        v /= 10;
        k += 1;
    }
    (v, k)
}

/// Signed counterpart of [`strip_decimal_zeros`]; the sign is kept.
#[inline]
pub fn strip_decimal_zeros_signed(mut v: i64) -> (i64, u32) {
    let mut k = 0;
    while v != 0 && k < MAX_DECIMAL_ZEROS && v % 10 == 0 {
        v /= 10;
        k += 1;
    }
    (v, k)
}

/// Number of bytes `v` occupies as a varint.
#[inline]
pub fn varint_len(v: u64) -> usize {
    let bits = (u64::BITS - v.leading_zeros()).max(1);
    bits.div_ceil(7) as usize
}
