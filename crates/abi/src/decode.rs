//! Decodes ABI wire bytes against a [`TypeComponent`] into a
//! [`ComponentValue`] tree, following the head/tail offsets written by
//! [`crate::encode`].

use alloy_primitives::{Address, Bytes, U256};

use crate::component::{ElementaryKind, TypeComponent};
use crate::entry::Entry;
use crate::error::{AbiError, Result};
use crate::numeric::SignedInt;
use crate::value::{ComponentValue, LeafValue};

const WORD: usize = 32;

/// Maximum sequence length this decoder will allocate for, guarding
/// against a maliciously large length word causing an out-of-memory
/// allocation before the subsequent bounds check would otherwise fail.
const MAX_ARRAY_COUNT: u64 = u32::MAX as u64;

fn read_word(data: &[u8], at: usize) -> Result<&[u8; 32]> {
    data.get(at..at + WORD)
        .ok_or_else(|| AbiError::not_enough_bytes(at, WORD, data.len().saturating_sub(at)))
        .map(|slice| <&[u8; 32]>::try_from(slice).expect("slice has exactly WORD bytes"))
}

fn read_uint(data: &[u8], at: usize) -> Result<U256> {
    Ok(U256::from_be_bytes(*read_word(data, at)?))
}

fn read_offset(data: &[u8], at: usize) -> Result<usize> {
    let word = read_uint(data, at)?;
    usize::try_from(word).map_err(|_| AbiError::array_count_too_large(at))
}

fn read_length(data: &[u8], at: usize) -> Result<usize> {
    let word = read_uint(data, at)?;
    if word > U256::from(MAX_ARRAY_COUNT) {
        return Err(AbiError::array_count_too_large(at));
    }
    Ok(usize::try_from(word).expect("bounded above by MAX_ARRAY_COUNT"))
}

/// Decodes a single elementary component whose head occupies exactly one
/// word at `pos` within `data` (the word for dynamic `bytes`/`string` is
/// its length, with content immediately following).
fn decode_elementary(e: &crate::component::Elementary, data: &[u8], pos: usize) -> Result<LeafValue> {
    match e.kind {
        ElementaryKind::Int => {
            let word = read_word(data, pos)?;
            Ok(LeafValue::Int(SignedInt::from_twos_complement_be(word, e.m.unwrap_or(256))))
        }
        ElementaryKind::Uint => Ok(LeafValue::Uint(read_uint(data, pos)?)),
        ElementaryKind::Address => {
            let word = read_word(data, pos)?;
            Ok(LeafValue::Address(Address::from_slice(&word[12..32])))
        }
        ElementaryKind::Bool => {
            let word = read_word(data, pos)?;
            Ok(LeafValue::Bool(word[31] != 0))
        }
        ElementaryKind::Fixed | ElementaryKind::Ufixed => {
            let word = read_word(data, pos)?;
            let n = e.n.unwrap_or(18);
            let magnitude = if e.kind == ElementaryKind::Fixed {
                SignedInt::from_twos_complement_be(word, e.m.unwrap_or(128))
            } else {
                SignedInt::new(false, U256::from_be_bytes(*word))
            };
            Ok(LeafValue::Float(scaled_to_decimal(&magnitude, n)))
        }
        ElementaryKind::Bytes => {
            if let Some(m) = e.m {
                let word = read_word(data, pos)?;
                Ok(LeafValue::Bytes(Bytes::copy_from_slice(&word[..usize::from(m)])))
            } else {
                let len = read_length(data, pos)?;
                let content = data
                    .get(pos + WORD..pos + WORD + len)
                    .ok_or_else(|| AbiError::not_enough_bytes(pos + WORD, len, data.len().saturating_sub(pos + WORD)))?;
                Ok(LeafValue::Bytes(Bytes::copy_from_slice(content)))
            }
        }
        ElementaryKind::String => {
            let len = read_length(data, pos)?;
            let content = data
                .get(pos + WORD..pos + WORD + len)
                .ok_or_else(|| AbiError::not_enough_bytes(pos + WORD, len, data.len().saturating_sub(pos + WORD)))?;
            let text = String::from_utf8_lossy(content).into_owned();
            Ok(LeafValue::Str(text))
        }
        ElementaryKind::Function => {
            let word = read_word(data, pos)?;
            let mut out = [0u8; 24];
            out.copy_from_slice(&word[..24]);
            Ok(LeafValue::Function(out))
        }
    }
}

fn scaled_to_decimal(magnitude: &SignedInt, n: u16) -> bigdecimal::BigDecimal {
    use bigdecimal::num_bigint::{BigInt, Sign};
    let bytes = magnitude.magnitude().to_be_bytes::<32>();
    let sign = if magnitude.is_negative() { Sign::Minus } else { Sign::Plus };
    let unscaled = BigInt::from_bytes_be(sign, &bytes);
    bigdecimal::BigDecimal::new(unscaled, i64::from(n))
}

/// Decodes one *child* component at `pos` — a head slot belonging to a
/// parent array/tuple whose own head starts at `head_start`. Dynamic
/// components are represented at `pos` by a 32-byte offset relative to
/// `head_start` pointing at the component's actual encoding; this
/// indirection only exists for values reached through a parent's head,
/// so a standalone top-level value must go through [`decode_value`]
/// instead, never this function directly.
fn decode_component(ty: &TypeComponent, data: &[u8], head_start: usize, pos: usize) -> Result<ComponentValue> {
    match ty {
        TypeComponent::Elementary(e) => {
            if e.is_dynamic() {
                let offset = read_offset(data, pos)?;
                let at = head_start + offset;
                Ok(ComponentValue::Leaf(decode_elementary(e, data, at)?))
            } else {
                Ok(ComponentValue::Leaf(decode_elementary(e, data, pos)?))
            }
        }
        TypeComponent::FixedArray { len, child } => {
            if ty.is_dynamic() {
                let offset = read_offset(data, pos)?;
                let at = head_start + offset;
                decode_fixed_children(child, *len, data, at)
            } else {
                decode_fixed_children(child, *len, data, pos)
            }
        }
        TypeComponent::DynamicArray { child } => {
            let offset = read_offset(data, pos)?;
            let at = head_start + offset;
            let len = read_length(data, at)?;
            decode_fixed_children(child, len, data, at + WORD)
        }
        TypeComponent::Tuple { children, .. } => {
            if ty.is_dynamic() {
                let offset = read_offset(data, pos)?;
                let at = head_start + offset;
                decode_heterogeneous_children(children, data, at).map(ComponentValue::Tuple)
            } else {
                decode_heterogeneous_children(children, data, pos).map(ComponentValue::Tuple)
            }
        }
    }
}

/// Decodes `count` children of a single `child` type, each occupying one
/// head slot starting at `region_start`; dynamic children's heads are
/// offsets based at `region_start` itself.
fn decode_fixed_children(child: &TypeComponent, count: usize, data: &[u8], region_start: usize) -> Result<ComponentValue> {
    let mut items = Vec::with_capacity(count);
    for i in 0..count {
        let slot = region_start + i * WORD;
        items.push(decode_component(child, data, region_start, slot)?);
    }
    Ok(ComponentValue::Array(items))
}

/// Decodes a heterogeneous sequence of children (tuple fields), each
/// with its own type and its own head slot.
fn decode_heterogeneous_children(types: &[TypeComponent], data: &[u8], region_start: usize) -> Result<Vec<ComponentValue>> {
    let mut items = Vec::with_capacity(types.len());
    for (i, ty) in types.iter().enumerate() {
        let slot = region_start + i * WORD;
        items.push(decode_component(ty, data, region_start, slot)?);
    }
    Ok(items)
}

/// Decodes a standalone, top-level component occupying `data` from byte
/// 0 — e.g. a function's whole input tuple, or an event's non-indexed
/// data tuple. Unlike [`decode_component`], this never treats `ty` itself
/// as sitting behind an offset: the encoder never emits a self-offset for
/// the value it was asked to encode (only for *children* reached through
/// a parent's head slot, per the head/tail algorithm in `encode.rs`), so
/// the matching top-level decode must read the same region inline.
pub fn decode_value(ty: &TypeComponent, data: &[u8]) -> Result<ComponentValue> {
    match ty {
        TypeComponent::Elementary(e) => Ok(ComponentValue::Leaf(decode_elementary(e, data, 0)?)),
        TypeComponent::FixedArray { len, child } => decode_fixed_children(child, *len, data, 0),
        TypeComponent::DynamicArray { child } => {
            let len = read_length(data, 0)?;
            decode_fixed_children(child, len, data, WORD)
        }
        TypeComponent::Tuple { children, .. } => decode_heterogeneous_children(children, data, 0).map(ComponentValue::Tuple),
    }
}

/// Decodes full call data for `entry`: verifies the 4-byte selector (for
/// `function`/`error` kinds) and decodes the remaining bytes as the
/// input tuple.
pub fn decode_call_data(entry: &Entry, data: &[u8]) -> Result<ComponentValue> {
    let body = if entry.kind.has_selector() {
        if data.len() < 4 {
            return Err(AbiError::not_enough_signature_bytes(data.len()));
        }
        let expected = entry.selector()?;
        let mut got = [0u8; 4];
        got.copy_from_slice(&data[..4]);
        if got != expected {
            return Err(AbiError::incorrect_selector(expected, got));
        }
        &data[4..]
    } else {
        data
    };
    let tuple_ty = entry.inputs_tuple();
    decode_value(&tuple_ty, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode, grammar, value};
    use serde_json::json;

    fn round_trip(type_string: &str, json_value: serde_json::Value) {
        let ty = grammar::parse(type_string, None, "$").unwrap();
        let built = value::build(&ty, &json_value, "$").unwrap();
        let mut bytes = Vec::new();
        encode::encode_component(&ty, &built, "$", &mut bytes).unwrap();
        let decoded = decode_value(&ty, &bytes).unwrap();
        let mut re_encoded = Vec::new();
        encode::encode_component(&ty, &decoded, "$", &mut re_encoded).unwrap();
        assert_eq!(bytes, re_encoded);
    }

    #[test]
    fn uint256_round_trips() {
        round_trip("uint256", json!(42));
    }

    #[test]
    fn dynamic_bytes_round_trips() {
        round_trip("bytes", json!("0xdeadbeef"));
    }

    #[test]
    fn nested_dynamic_array_round_trips() {
        round_trip("string[]", json!(["hi", "there", "world"]));
    }

    #[test]
    fn fixed_bytes_array_round_trips() {
        round_trip("bytes3[2]", json!(["0x010203", "0x040506"]));
    }

    #[test]
    fn truncated_input_reports_not_enough_bytes() {
        let ty = grammar::parse("uint256", None, "$").unwrap();
        let err = decode_value(&ty, &[0u8; 16]).unwrap_err();
        assert_eq!(err.code(), "D-NOT-ENOUGH-BYTES");
    }

    #[test]
    fn array_length_word_overflow_rejected() {
        let ty = grammar::parse("uint256[]", None, "$").unwrap();
        // Top-level dynamic array: no self-offset, just the length word
        // directly at byte 0 (here, u256::MAX).
        let data = vec![0xffu8; 32];
        let err = decode_value(&ty, &data).unwrap_err();
        assert_eq!(err.code(), "D-ARRAY-COUNT-TOO-LARGE");
    }

    #[test]
    fn dynamic_tuple_top_level_decode_is_inline_not_offset() {
        // A standalone dynamic tuple `(bytes)` containing `0x01` must
        // round-trip through the exact bytes the encoder wrote: a length
        // word of 1 followed by the single byte 0x01, right-padded.
        let desc = [grammar::ComponentDesc { name: "a".to_string(), type_string: "bytes".to_string(), components: None }];
        let ty = grammar::parse("tuple", Some(&desc), "$").unwrap();
        let built = value::build(&ty, &json!(["0x01"]), "$").unwrap();
        let mut bytes = Vec::new();
        encode::encode_component(&ty, &built, "$", &mut bytes).unwrap();

        let decoded = decode_value(&ty, &bytes).unwrap();
        let children = decoded.as_children().unwrap();
        match children[0].as_leaf().unwrap() {
            LeafValue::Bytes(b) => assert_eq!(b.as_ref(), &[0x01]),
            other => panic!("expected bytes leaf, got {other:?}"),
        }
    }
}
