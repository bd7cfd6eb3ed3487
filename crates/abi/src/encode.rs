//! Encodes a [`ComponentValue`] tree against its [`TypeComponent`] into
//! the ABI head/tail wire layout.

use alloy_primitives::U256;

use crate::component::{ElementaryKind, TypeComponent};
use crate::entry::Entry;
use crate::error::{AbiError, Result};
use crate::value::{ComponentValue, LeafValue};

const WORD: usize = 32;

fn pad_left(bytes: &[u8], out: &mut Vec<u8>) {
    let pad = WORD - bytes.len();
    out.extend(std::iter::repeat(0u8).take(pad));
    out.extend_from_slice(bytes);
}

fn pad_right_to_word(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes);
    let rem = bytes.len() % WORD;
    if rem != 0 {
        out.extend(std::iter::repeat(0u8).take(WORD - rem));
    }
}

/// Encodes a single elementary leaf into exactly one word (or, for
/// dynamic `bytes`/`string`, a length word followed by right-padded
/// content words).
fn encode_leaf(leaf: &LeafValue, path: &str, out: &mut Vec<u8>) -> Result<()> {
    match leaf {
        LeafValue::Int(v) => out.extend_from_slice(&v.to_twos_complement_be()),
        LeafValue::Uint(v) => out.extend_from_slice(&v.to_be_bytes::<32>()),
        LeafValue::Address(a) => pad_left(a.as_slice(), out),
        LeafValue::Bool(b) => pad_left(&[u8::from(*b)], out),
        LeafValue::Float(_) => {
            return Err(AbiError::bad_component(path));
        }
        LeafValue::Bytes(b) => {
            // Fixed bytes<M>: right-pad into a single word. Dynamic
            // `bytes` is handled by the caller (needs a length word).
            pad_right_to_word(b, out);
        }
        LeafValue::Str(s) => pad_right_to_word(s.as_bytes(), out),
        LeafValue::Function(f) => {
            let mut padded = [0u8; WORD];
            padded[..24].copy_from_slice(f);
            out.extend_from_slice(&padded);
        }
    }
    Ok(())
}

/// Encodes a fixed-point leaf, which needs the type's scale (`n`) to
/// convert the decimal into its scaled integer wire form.
fn encode_float(value: &bigdecimal::BigDecimal, n: u16, signed: bool, path: &str, out: &mut Vec<u8>) -> Result<()> {
    use bigdecimal::num_bigint::BigInt;
    let ten_pow_n = bigdecimal::BigDecimal::new(BigInt::from(1), -i64::from(n));
    let scaled = (value * ten_pow_n).with_scale(0);
    let (integer, _) = scaled.into_bigint_and_exponent();
    if signed {
        let negative = integer.sign() == bigdecimal::num_bigint::Sign::Minus;
        let (_, magnitude_bytes) = integer.to_bytes_be();
        let magnitude = U256::from_be_slice(&magnitude_bytes);
        out.extend_from_slice(&crate::numeric::SignedInt::new(negative, magnitude).to_twos_complement_be());
    } else {
        if integer.sign() == bigdecimal::num_bigint::Sign::Minus {
            return Err(AbiError::numeric_range(path, "ufixed value must be non-negative"));
        }
        let (_, magnitude_bytes) = integer.to_bytes_be();
        let magnitude = U256::from_be_slice(&magnitude_bytes);
        out.extend_from_slice(&magnitude.to_be_bytes::<32>());
    }
    Ok(())
}

/// Encodes `value` against `ty`, appending to `out`. Used both for a
/// standalone top-level component and, recursively, for tuple/array
/// children via [`encode_children`].
pub fn encode_component(ty: &TypeComponent, value: &ComponentValue, path: &str, out: &mut Vec<u8>) -> Result<()> {
    match (ty, value) {
        (TypeComponent::Elementary(e), ComponentValue::Leaf(leaf)) => {
            if matches!(e.kind, ElementaryKind::Fixed | ElementaryKind::Ufixed) {
                if let LeafValue::Float(v) = leaf {
                    encode_float(v, e.n.unwrap_or(18), e.kind == ElementaryKind::Fixed, path, out)?;
                } else {
                    return Err(AbiError::bad_component(path));
                }
            } else if e.is_dynamic() {
                // bytes/string: length word, then the right-padded content.
                let bytes: &[u8] = match leaf {
                    LeafValue::Bytes(b) => b.as_ref(),
                    LeafValue::Str(s) => s.as_bytes(),
                    _ => return Err(AbiError::bad_component(path)),
                };
                out.extend_from_slice(&U256::from(bytes.len()).to_be_bytes::<32>());
                pad_right_to_word(bytes, out);
            } else {
                encode_leaf(leaf, path, out)?;
            }
            Ok(())
        }
        (TypeComponent::FixedArray { len, child }, ComponentValue::Array(items)) => {
            if items.len() != *len {
                return Err(AbiError::wrong_length(*len, items.len(), path));
            }
            encode_children(child, items, path, out)
        }
        (TypeComponent::DynamicArray { child }, ComponentValue::Array(items)) => {
            out.extend_from_slice(&U256::from(items.len()).to_be_bytes::<32>());
            encode_children(child, items, path, out)
        }
        (TypeComponent::Tuple { children, .. }, ComponentValue::Tuple(items)) => {
            encode_children_heterogeneous(children, items, path, out)
        }
        _ => Err(AbiError::bad_component(path)),
    }
}

/// Encodes a homogeneous sequence of children (array elements) sharing
/// one element type, via the two-pass head/tail algorithm.
fn encode_children(child_ty: &TypeComponent, items: &[ComponentValue], path: &str, out: &mut Vec<u8>) -> Result<()> {
    let types: Vec<&TypeComponent> = items.iter().map(|_| child_ty).collect();
    encode_heads_and_tails(&types, items, path, out)
}

/// Encodes a heterogeneous sequence of children (tuple fields), each
/// with its own type, via the same head/tail algorithm.
fn encode_children_heterogeneous(
    types: &[TypeComponent],
    items: &[ComponentValue],
    path: &str,
    out: &mut Vec<u8>,
) -> Result<()> {
    let refs: Vec<&TypeComponent> = types.iter().collect();
    encode_heads_and_tails(&refs, items, path, out)
}

fn encode_heads_and_tails(
    types: &[&TypeComponent],
    items: &[ComponentValue],
    path: &str,
    out: &mut Vec<u8>,
) -> Result<()> {
    let mut head_parts: Vec<Option<Vec<u8>>> = Vec::with_capacity(items.len());
    let mut tail_parts: Vec<Vec<u8>> = Vec::with_capacity(items.len());

    for (i, (ty, value)) in types.iter().zip(items).enumerate() {
        let child_path = format!("{path}[{i}]");
        if ty.is_dynamic() {
            head_parts.push(None);
            let mut tail = Vec::new();
            encode_component(ty, value, &child_path, &mut tail)?;
            tail_parts.push(tail);
        } else {
            let mut head = Vec::new();
            encode_component(ty, value, &child_path, &mut head)?;
            head_parts.push(Some(head));
            tail_parts.push(Vec::new());
        }
    }

    let head_length: usize = head_parts
        .iter()
        .map(|h| h.as_ref().map_or(WORD, Vec::len))
        .sum();

    let mut tail_offset = head_length;
    let mut offsets = Vec::with_capacity(items.len());
    for (head, tail) in head_parts.iter().zip(&tail_parts) {
        if head.is_none() {
            offsets.push(Some(tail_offset));
            tail_offset += tail.len();
        } else {
            offsets.push(None);
        }
    }

    for (head, offset) in head_parts.iter().zip(&offsets) {
        match (head, offset) {
            (Some(bytes), None) => out.extend_from_slice(bytes),
            (None, Some(off)) => out.extend_from_slice(&U256::from(*off).to_be_bytes::<32>()),
            _ => unreachable!("exactly one of head/offset is set per child"),
        }
    }
    for tail in &tail_parts {
        out.extend_from_slice(tail);
    }
    Ok(())
}

/// Encodes full call data for `entry` applied to `value`: the 4-byte
/// selector (for `function`/`error` kinds) followed by the encoded
/// input tuple.
pub fn encode_call_data(entry: &Entry, value: &ComponentValue) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    if entry.kind.has_selector() {
        out.extend_from_slice(&entry.selector()?);
    }
    let tuple_ty = entry.inputs_tuple();
    encode_component(&tuple_ty, value, "$", &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar;
    use crate::value;
    use serde_json::json;

    fn encode_json(type_string: &str, json_value: serde_json::Value) -> Vec<u8> {
        let ty = grammar::parse(type_string, None, "$").unwrap();
        let built = value::build(&ty, &json_value, "$").unwrap();
        let mut out = Vec::new();
        encode_component(&ty, &built, "$", &mut out).unwrap();
        out
    }

    #[test]
    fn uint256_is_one_word() {
        let out = encode_json("uint256", json!(1));
        assert_eq!(out.len(), 32);
        assert_eq!(out[31], 1);
    }

    #[test]
    fn negative_int256_is_all_ff_for_minus_one() {
        let out = encode_json("int256", json!(-1));
        assert_eq!(out, vec![0xffu8; 32]);
    }

    #[test]
    fn dynamic_bytes_has_length_prefix_and_padding() {
        let out = encode_json("bytes", json!("0x0102"));
        assert_eq!(out.len(), 64);
        assert_eq!(out[31], 2);
        assert_eq!(&out[32..34], &[1, 2]);
    }

    #[test]
    fn dynamic_array_of_dynamic_elements_uses_offsets() {
        let out = encode_json("string[]", json!(["a", "bb"]));
        // length word + 2 offset words + 2 tail entries (2 words each).
        assert_eq!(out.len(), 32 * (1 + 2 + 2 + 2));
    }

    #[test]
    fn fixed_array_of_static_elements_has_no_offsets() {
        let out = encode_json("uint256[2]", json!([1, 2]));
        assert_eq!(out.len(), 64);
    }
}
