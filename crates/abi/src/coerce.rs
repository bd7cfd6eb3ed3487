//! Coerces permissive host values (JSON, or native Rust scalars used
//! directly by library callers) into the strict wire-ready forms each
//! elementary class requires.

use std::str::FromStr;

use alloy_primitives::{Address, Bytes};
use bigdecimal::BigDecimal;

use crate::error::{AbiError, Result};
use crate::numeric::SignedInt;
use alloy_primitives::U256;

/// A permissive external scalar, abstracted away from any particular
/// host representation. `serde_json::Value` is the primary source; it is
/// also implemented for native Rust scalars so library callers can build
/// [`crate::value::ComponentValue`] trees without going through JSON.
pub trait FromExternal {
    /// Renders this value the way a user would expect it to read back in
    /// an error message (`"42"`, `"\"0xâ€¦\""`, `"true"`, ...).
    fn describe(&self) -> String;

    fn as_bool(&self) -> Option<bool>;
    /// A non-negative integer as an arbitrary-precision magnitude.
    fn as_uint(&self) -> Option<U256>;
    /// A signed integer, distinguishing the sign explicitly so that
    /// `-0` and very large magnitudes are represented exactly.
    fn as_int(&self) -> Option<SignedInt>;
    fn as_decimal(&self) -> Option<BigDecimal>;
    fn as_str(&self) -> Option<&str>;
    /// Raw bytes, accepting both `0x`-prefixed hex strings and (for
    /// native callers) byte slices.
    fn as_bytes(&self) -> Option<Bytes>;
    fn as_sequence(&self) -> Option<&[serde_json::Value]>;
    fn as_mapping(&self) -> Option<&serde_json::Map<String, serde_json::Value>>;

    /// `true` when this external value represents "no value at all" (a
    /// JSON `null`), distinguishing an absent root parameter from one
    /// whose shape simply doesn't match. Native Rust scalars can never be
    /// null, so the default is `false`.
    fn is_null(&self) -> bool {
        false
    }
}

impl FromExternal for serde_json::Value {
    fn describe(&self) -> String {
        match self {
            serde_json::Value::Null => "null".to_string(),
            other => other.to_string(),
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            serde_json::Value::Bool(b) => Some(*b),
            serde_json::Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    fn as_uint(&self) -> Option<U256> {
        match self {
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Some(U256::from(u))
                } else {
                    U256::from_str(&n.to_string()).ok()
                }
            }
            serde_json::Value::String(s) => parse_uint_str(s),
            _ => None,
        }
    }

    fn as_int(&self) -> Option<SignedInt> {
        match self {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(SignedInt::from_i128(i128::from(i)))
                } else {
                    parse_int_str(&n.to_string())
                }
            }
            serde_json::Value::String(s) => parse_int_str(s),
            _ => None,
        }
    }

    fn as_decimal(&self) -> Option<BigDecimal> {
        match self {
            serde_json::Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
            serde_json::Value::String(s) => BigDecimal::from_str(s).ok(),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        serde_json::Value::as_str(self)
    }

    fn as_bytes(&self) -> Option<Bytes> {
        match self {
            serde_json::Value::String(s) => {
                let hex = s.strip_prefix("0x").unwrap_or(s);
                alloy_primitives::hex::decode(hex).ok().map(Bytes::from)
            }
            serde_json::Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(u8::try_from(item.as_u64()?).ok()?);
                }
                Some(Bytes::from(out))
            }
            _ => None,
        }
    }

    fn as_sequence(&self) -> Option<&[serde_json::Value]> {
        self.as_array().map(Vec::as_slice)
    }

    fn as_mapping(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.as_object()
    }

    fn is_null(&self) -> bool {
        self.is_null()
    }
}

impl FromExternal for str {
    fn describe(&self) -> String {
        format!("{self:?}")
    }

    fn as_bool(&self) -> Option<bool> {
        match self.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn as_uint(&self) -> Option<U256> {
        parse_uint_str(self)
    }

    fn as_int(&self) -> Option<SignedInt> {
        parse_int_str(self)
    }

    fn as_decimal(&self) -> Option<BigDecimal> {
        BigDecimal::from_str(self).ok()
    }

    fn as_str(&self) -> Option<&str> {
        Some(self)
    }

    fn as_bytes(&self) -> Option<Bytes> {
        let hex = self.strip_prefix("0x").unwrap_or(self);
        alloy_primitives::hex::decode(hex).ok().map(Bytes::from)
    }

    fn as_sequence(&self) -> Option<&[serde_json::Value]> {
        None
    }

    fn as_mapping(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        None
    }
}

impl FromExternal for String {
    fn describe(&self) -> String {
        self.as_str().describe()
    }

    fn as_bool(&self) -> Option<bool> {
        self.as_str().as_bool()
    }

    fn as_uint(&self) -> Option<U256> {
        self.as_str().as_uint()
    }

    fn as_int(&self) -> Option<SignedInt> {
        self.as_str().as_int()
    }

    fn as_decimal(&self) -> Option<BigDecimal> {
        self.as_str().as_decimal()
    }

    fn as_str(&self) -> Option<&str> {
        Some(self.as_str())
    }

    fn as_bytes(&self) -> Option<Bytes> {
        self.as_str().as_bytes()
    }

    fn as_sequence(&self) -> Option<&[serde_json::Value]> {
        None
    }

    fn as_mapping(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        None
    }
}

impl FromExternal for bool {
    fn describe(&self) -> String {
        self.to_string()
    }

    fn as_bool(&self) -> Option<bool> {
        Some(*self)
    }

    fn as_uint(&self) -> Option<U256> {
        None
    }

    fn as_int(&self) -> Option<SignedInt> {
        None
    }

    fn as_decimal(&self) -> Option<BigDecimal> {
        None
    }

    fn as_str(&self) -> Option<&str> {
        None
    }

    fn as_bytes(&self) -> Option<Bytes> {
        None
    }

    fn as_sequence(&self) -> Option<&[serde_json::Value]> {
        None
    }

    fn as_mapping(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        None
    }
}

macro_rules! impl_from_external_signed {
    ($($t:ty),*) => {
        $(
            impl FromExternal for $t {
                fn describe(&self) -> String {
                    self.to_string()
                }

                fn as_bool(&self) -> Option<bool> {
                    None
                }

                fn as_uint(&self) -> Option<U256> {
                    if *self < 0 {
                        None
                    } else {
                        Some(U256::from(i128::from(*self) as u128))
                    }
                }

                fn as_int(&self) -> Option<SignedInt> {
                    Some(SignedInt::from_i128(i128::from(*self)))
                }

                fn as_decimal(&self) -> Option<BigDecimal> {
                    BigDecimal::from_str(&self.to_string()).ok()
                }

                fn as_str(&self) -> Option<&str> {
                    None
                }

                fn as_bytes(&self) -> Option<Bytes> {
                    None
                }

                fn as_sequence(&self) -> Option<&[serde_json::Value]> {
                    None
                }

                fn as_mapping(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
                    None
                }
            }
        )*
    };
}

macro_rules! impl_from_external_unsigned {
    ($($t:ty),*) => {
        $(
            impl FromExternal for $t {
                fn describe(&self) -> String {
                    self.to_string()
                }

                fn as_bool(&self) -> Option<bool> {
                    None
                }

                fn as_uint(&self) -> Option<U256> {
                    Some(U256::from(u128::from(*self)))
                }

                fn as_int(&self) -> Option<SignedInt> {
                    Some(SignedInt::new(false, U256::from(u128::from(*self))))
                }

                fn as_decimal(&self) -> Option<BigDecimal> {
                    BigDecimal::from_str(&self.to_string()).ok()
                }

                fn as_str(&self) -> Option<&str> {
                    None
                }

                fn as_bytes(&self) -> Option<Bytes> {
                    None
                }

                fn as_sequence(&self) -> Option<&[serde_json::Value]> {
                    None
                }

                fn as_mapping(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
                    None
                }
            }
        )*
    };
}

impl_from_external_signed!(i8, i16, i32, i64, i128);
impl_from_external_unsigned!(u8, u16, u32, u64, u128);

impl FromExternal for f64 {
    fn describe(&self) -> String {
        self.to_string()
    }

    fn as_bool(&self) -> Option<bool> {
        None
    }

    fn as_uint(&self) -> Option<U256> {
        None
    }

    fn as_int(&self) -> Option<SignedInt> {
        None
    }

    fn as_decimal(&self) -> Option<BigDecimal> {
        BigDecimal::from_str(&self.to_string()).ok()
    }

    fn as_str(&self) -> Option<&str> {
        None
    }

    fn as_bytes(&self) -> Option<Bytes> {
        None
    }

    fn as_sequence(&self) -> Option<&[serde_json::Value]> {
        None
    }

    fn as_mapping(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        None
    }
}

fn parse_uint_str(s: &str) -> Option<U256> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        U256::from_str_radix(hex, 16).ok()
    } else {
        U256::from_str(s).ok()
    }
}

fn parse_int_str(s: &str) -> Option<SignedInt> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = parse_uint_str(rest)?;
    Some(SignedInt::new(negative && !magnitude.is_zero(), magnitude))
}

/// Coerces to a signed integer for the `int<M>` class.
pub fn coerce_int(value: &dyn FromExternal, bits: u16, path: &str) -> Result<SignedInt> {
    let parsed = value.as_int().ok_or_else(|| AbiError::coercion("a signed integer", value.describe(), path))?;
    if !parsed.fits_signed_bits(bits) {
        return Err(AbiError::coercion(&format!("an int{bits}-range value"), value.describe(), path));
    }
    Ok(parsed)
}

/// Coerces to an unsigned integer for the `uint<M>` class.
pub fn coerce_uint(value: &dyn FromExternal, bits: u16, path: &str) -> Result<U256> {
    let parsed = value.as_uint().ok_or_else(|| AbiError::coercion("an unsigned integer", value.describe(), path))?;
    if bits < 256 && parsed.bit_len() > usize::from(bits) {
        return Err(AbiError::coercion(&format!("a uint{bits}-range value"), value.describe(), path));
    }
    Ok(parsed)
}

pub fn coerce_bool(value: &dyn FromExternal, path: &str) -> Result<bool> {
    value.as_bool().ok_or_else(|| AbiError::coercion("a boolean", value.describe(), path))
}

/// Coerces to a `fixed<M>x<N>`/`ufixed<M>x<N>` decimal, rejecting values
/// whose fractional part has more digits than `n` allows.
pub fn coerce_float(value: &dyn FromExternal, signed: bool, n: u16, path: &str) -> Result<BigDecimal> {
    let parsed = value.as_decimal().ok_or_else(|| AbiError::coercion("a decimal number", value.describe(), path))?;
    if !signed && parsed.sign() == bigdecimal::num_bigint::Sign::Minus {
        return Err(AbiError::coercion("a non-negative decimal", value.describe(), path));
    }
    if parsed.fractional_digit_count() > i64::from(n) {
        return Err(AbiError::coercion(&format!("a decimal with at most {n} fractional digit(s)"), value.describe(), path));
    }
    Ok(parsed)
}

/// Coerces to raw bytes. For the `bytes<M>` class (`fixed_len = Some(M)`),
/// an input shorter than `M` is rejected; an input longer than `M` is
/// accepted leniently and truncated to its first `M` bytes (callers that
/// need strict length checking should pre-validate).
pub fn coerce_bytes(value: &dyn FromExternal, fixed_len: Option<u16>, path: &str) -> Result<Bytes> {
    let parsed = value.as_bytes().ok_or_else(|| AbiError::coercion("a hex byte string", value.describe(), path))?;
    if let Some(len) = fixed_len {
        let len = usize::from(len);
        if parsed.len() < len {
            return Err(AbiError::bytes_too_short(path, len, parsed.len()));
        }
        if parsed.len() > len {
            return Ok(Bytes::copy_from_slice(&parsed[..len]));
        }
    }
    Ok(parsed)
}

pub fn coerce_string(value: &dyn FromExternal, path: &str) -> Result<String> {
    value.as_str().map(str::to_string).ok_or_else(|| AbiError::coercion("a string", value.describe(), path))
}

/// Coerces to a 20-byte `address`, accepting a `0x`-prefixed hex string
/// of any case (tolerating but not validating EIP-55 checksums) or a
/// raw 20-byte sequence.
pub fn coerce_address(value: &dyn FromExternal, path: &str) -> Result<Address> {
    if let Some(text) = value.as_str() {
        return Address::from_str(text).map_err(|_| AbiError::coercion("a well-formed address", value.describe(), path));
    }
    if let Some(bytes) = value.as_bytes() {
        if bytes.len() == 20 {
            return Ok(Address::from_slice(&bytes));
        }
        return Err(AbiError::wrong_length(20, bytes.len(), path));
    }
    Err(AbiError::coercion("a hex address string or 20-byte sequence", value.describe(), path))
}

/// Coerces a `function` value: a 24-byte blob (20-byte address + 4-byte
/// selector), accepted as a single hex string.
pub fn coerce_function(value: &dyn FromExternal, path: &str) -> Result<[u8; 24]> {
    let bytes = value.as_bytes().ok_or_else(|| AbiError::coercion("a 24-byte function pointer", value.describe(), path))?;
    if bytes.len() != 24 {
        return Err(AbiError::wrong_length(24, bytes.len(), path));
    }
    let mut out = [0u8; 24];
    out.copy_from_slice(&bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bool_accepts_case_insensitive_string() {
        assert_eq!(coerce_bool(&json!("TRUE"), "$").unwrap(), true);
        assert_eq!(coerce_bool(&json!("false"), "$").unwrap(), false);
        assert!(coerce_bool(&json!("nope"), "$").is_err());
    }

    #[test]
    fn address_accepts_hex_string_and_byte_sequence() {
        let from_hex = coerce_address(&json!("0x1111111111111111111111111111111111111111"), "$").unwrap();
        let from_bytes = coerce_address(&json!([17u8; 20]), "$").unwrap();
        assert_eq!(from_hex, from_bytes);
    }

    #[test]
    fn uint_accepts_hex_and_decimal_strings() {
        assert_eq!(coerce_uint(&json!("0x2a"), 256, "$").unwrap(), U256::from(42u64));
        assert_eq!(coerce_uint(&json!("42"), 256, "$").unwrap(), U256::from(42u64));
    }

    #[test]
    fn bytes_over_long_is_truncated_leniently() {
        let got = coerce_bytes(&json!("0x0102030405"), Some(3), "$").unwrap();
        assert_eq!(got.as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn bytes_too_short_is_rejected() {
        let err = coerce_bytes(&json!("0x0102"), Some(3), "$").unwrap_err();
        assert_eq!(err.code(), "E-BYTES-SHORT");
    }

    #[test]
    fn native_str_and_string_coerce_like_json() {
        assert_eq!(coerce_uint(&"0x2a", 256, "$").unwrap(), U256::from(42u64));
        assert_eq!(coerce_uint(&"42".to_string(), 256, "$").unwrap(), U256::from(42u64));
        assert!(coerce_bool(&"true", "$").unwrap());
        assert_eq!(coerce_string(&"hello".to_string(), "$").unwrap(), "hello");
    }

    #[test]
    fn native_integer_widths_coerce() {
        assert_eq!(coerce_uint(&42u32, 256, "$").unwrap(), U256::from(42u64));
        assert_eq!(coerce_int(&-7i64, 256, "$").unwrap(), SignedInt::from_i128(-7));
        assert!(coerce_uint(&-1i32, 256, "$").is_err());
    }

    #[test]
    fn native_bool_and_float_coerce() {
        assert!(coerce_bool(&true, "$").unwrap());
        let decimal = coerce_float(&1.5f64, true, 18, "$").unwrap();
        assert_eq!(decimal.to_string(), "1.5");
    }
}
