//! A sign-and-magnitude signed integer wide enough for any ABI `int<M>`,
//! together with its two's-complement wire representation.
//!
//! `alloy_primitives` has no public arbitrary-width signed integer that
//! exposes sign and magnitude separately, which is exactly the seam the
//! two's-complement mask-to-256-bits step in the decoder needs, so this
//! crate owns the type instead.

use alloy_primitives::U256;

/// A signed integer represented as a sign flag plus a `U256` magnitude.
/// `negative` is only meaningful when the magnitude is non-zero; `-0` is
/// normalized to `negative: false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedInt {
    negative: bool,
    magnitude: U256,
}

impl SignedInt {
    pub fn new(negative: bool, magnitude: U256) -> Self {
        Self { negative: negative && !magnitude.is_zero(), magnitude }
    }

    pub fn from_i128(value: i128) -> Self {
        if value < 0 {
            Self::new(true, U256::from(value.unsigned_abs()))
        } else {
            Self::new(false, U256::from(value as u128))
        }
    }

    pub fn zero() -> Self {
        Self { negative: false, magnitude: U256::ZERO }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }

    /// `true` iff this value fits in a signed two's-complement integer of
    /// `bits` width (8..=256, a multiple of 8).
    pub fn fits_signed_bits(&self, bits: u16) -> bool {
        if bits >= 256 {
            return true;
        }
        let limit = U256::from(1u8) << (u32::from(bits) - 1);
        if self.negative {
            self.magnitude <= limit
        } else {
            self.magnitude < limit
        }
    }

    /// Encodes this value as a 32-byte big-endian two's-complement word,
    /// the wire form every `int<M>` occupies regardless of its declared
    /// width (narrower widths are sign-extended to fill the word).
    pub fn to_twos_complement_be(&self) -> [u8; 32] {
        if !self.negative {
            return self.magnitude.to_be_bytes();
        }
        let wrapped = (!self.magnitude).wrapping_add(U256::from(1u8));
        wrapped.to_be_bytes()
    }

    /// Decodes a 32-byte big-endian two's-complement word into a signed
    /// value, using the top bit of the declared width (not necessarily
    /// bit 255) to decide the sign, then sign-extending/masking back down
    /// to that width's magnitude.
    pub fn from_twos_complement_be(word: &[u8; 32], bits: u16) -> Self {
        let raw = U256::from_be_bytes(*word);
        if bits >= 256 {
            let sign_bit = U256::from(1u8) << 255;
            return if raw & sign_bit == U256::ZERO {
                Self::new(false, raw)
            } else {
                Self::new(true, (!raw).wrapping_add(U256::from(1u8)))
            };
        }
        let sign_bit = U256::from(1u8) << (u32::from(bits) - 1);
        let mask = (U256::from(1u8) << u32::from(bits)) - U256::from(1u8);
        let truncated = raw & mask;
        if truncated & sign_bit == U256::ZERO {
            Self::new(false, truncated)
        } else {
            let magnitude = (!truncated & mask).wrapping_add(U256::from(1u8));
            Self::new(true, magnitude)
        }
    }
}

impl std::fmt::Display for SignedInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}
