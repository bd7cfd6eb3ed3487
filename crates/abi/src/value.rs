//! The value tree: a [`ComponentValue`] mirrors a [`TypeComponent`] tree
//! one-for-one, holding either a leaf scalar or child values built from a
//! permissive external input (see [`crate::coerce`]).

use alloy_primitives::{Address, Bytes, U256};
use bigdecimal::BigDecimal;

use crate::coerce::{self, FromExternal};
use crate::component::{ElementaryKind, TypeComponent};
use crate::error::{AbiError, Result};
use crate::numeric::SignedInt;

/// A fully coerced scalar. Event decoding can produce a `Bytes` leaf for
/// a nominally non-bytes type (a hashed indexed parameter, spec §4.7),
/// which is why serialization dispatches on this enum rather than on the
/// type tree's nominal kind.
#[derive(Debug, Clone)]
pub enum LeafValue {
    Int(SignedInt),
    Uint(U256),
    Address(Address),
    Bool(bool),
    Float(BigDecimal),
    Bytes(Bytes),
    Str(String),
    Function([u8; 24]),
}

/// A value tree node, structurally mirroring a [`TypeComponent`].
#[derive(Debug, Clone)]
pub enum ComponentValue {
    Leaf(LeafValue),
    Array(Vec<ComponentValue>),
    Tuple(Vec<ComponentValue>),
}

impl ComponentValue {
    pub fn as_leaf(&self) -> Option<&LeafValue> {
        match self {
            Self::Leaf(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_children(&self) -> Option<&[ComponentValue]> {
        match self {
            Self::Array(c) | Self::Tuple(c) => Some(c),
            Self::Leaf(_) => None,
        }
    }
}

/// Builds a [`ComponentValue`] tree from external input `value` against
/// type tree `ty`, with `path` as the error breadcrumb.
pub fn build(ty: &TypeComponent, value: &dyn FromExternal, path: &str) -> Result<ComponentValue> {
    if value.is_null() {
        return Err(AbiError::missing_root(path));
    }
    match ty {
        TypeComponent::Elementary(e) => build_leaf(e, value, path),
        TypeComponent::FixedArray { len, child } => {
            let items = value.as_sequence().ok_or_else(|| AbiError::wrong_shape("an array", path))?;
            if items.len() != *len {
                return Err(AbiError::wrong_length(*len, items.len(), path));
            }
            let children = items
                .iter()
                .enumerate()
                .map(|(i, item)| build(child, item, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>>>()?;
            Ok(ComponentValue::Array(children))
        }
        TypeComponent::DynamicArray { child } => {
            let items = value.as_sequence().ok_or_else(|| AbiError::wrong_shape("an array", path))?;
            let children = items
                .iter()
                .enumerate()
                .map(|(i, item)| build(child, item, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>>>()?;
            Ok(ComponentValue::Array(children))
        }
        TypeComponent::Tuple { children, key_names } => build_tuple(children, key_names, value, path),
    }
}

fn build_leaf(e: &crate::component::Elementary, value: &dyn FromExternal, path: &str) -> Result<ComponentValue> {
    let leaf = match e.kind {
        ElementaryKind::Int => LeafValue::Int(coerce::coerce_int(value, e.m.unwrap_or(256), path)?),
        ElementaryKind::Uint => LeafValue::Uint(coerce::coerce_uint(value, e.m.unwrap_or(256), path)?),
        ElementaryKind::Address => LeafValue::Address(coerce::coerce_address(value, path)?),
        ElementaryKind::Bool => LeafValue::Bool(coerce::coerce_bool(value, path)?),
        ElementaryKind::Fixed => LeafValue::Float(coerce::coerce_float(value, true, e.n.unwrap_or(18), path)?),
        ElementaryKind::Ufixed => LeafValue::Float(coerce::coerce_float(value, false, e.n.unwrap_or(18), path)?),
        ElementaryKind::Bytes => LeafValue::Bytes(coerce::coerce_bytes(value, e.m, path)?),
        ElementaryKind::String => LeafValue::Str(coerce::coerce_string(value, path)?),
        ElementaryKind::Function => LeafValue::Function(coerce::coerce_function(value, path)?),
    };
    Ok(ComponentValue::Leaf(leaf))
}

/// Builds a tuple's children, accepting either a positional sequence or
/// (when every child carries a name) a keyed mapping.
fn build_tuple(
    children: &[TypeComponent],
    key_names: &[Option<String>],
    value: &dyn FromExternal,
    path: &str,
) -> Result<ComponentValue> {
    if let Some(items) = value.as_sequence() {
        if items.len() != children.len() {
            return Err(AbiError::wrong_length(children.len(), items.len(), path));
        }
        let built = children
            .iter()
            .zip(items)
            .enumerate()
            .map(|(i, (child_ty, item))| {
                let label = key_names.get(i).and_then(Option::as_deref).map(str::to_string).unwrap_or_else(|| i.to_string());
                build(child_ty, item, &format!("{path}.{label}"))
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(ComponentValue::Tuple(built));
    }

    if let Some(map) = value.as_mapping() {
        let mut built = Vec::with_capacity(children.len());
        for (i, child_ty) in children.iter().enumerate() {
            let name = key_names.get(i).and_then(Option::as_deref).ok_or_else(|| AbiError::missing_name(path))?;
            let item = map.get(name).ok_or_else(|| AbiError::missing_key(name, path))?;
            built.push(build(child_ty, item, &format!("{path}.{name}"))?);
        }
        return Ok(ComponentValue::Tuple(built));
    }

    Err(AbiError::wrong_shape("an array or an object", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar;
    use serde_json::json;

    #[test]
    fn tuple_accepts_positional_and_keyed_input() {
        let desc = [
            grammar::ComponentDesc { name: "a".to_string(), type_string: "uint256".to_string(), components: None },
            grammar::ComponentDesc { name: "b".to_string(), type_string: "bool".to_string(), components: None },
        ];
        let ty = grammar::parse("tuple", Some(&desc), "$").unwrap();

        let positional = json!([1, true]);
        assert!(build(&ty, &positional, "$").is_ok());

        let keyed = json!({"a": 1, "b": true});
        assert!(build(&ty, &keyed, "$").is_ok());
    }

    #[test]
    fn array_length_mismatch_rejected() {
        let ty = grammar::parse("uint256[2]", None, "$").unwrap();
        let value = json!([1, 2, 3]);
        let err = build(&ty, &value, "$").unwrap_err();
        assert_eq!(err.code(), "S-WRONG-LENGTH");
    }

    #[test]
    fn null_root_value_reports_missing_root() {
        let ty = grammar::parse("uint256", None, "$").unwrap();
        let err = build(&ty, &json!(null), "$").unwrap_err();
        assert_eq!(err.code(), "S-MISSING-ROOT");
    }

    #[test]
    fn uint_range_enforced() {
        let ty = grammar::parse("uint8", None, "$").unwrap();
        let ok = json!(255);
        assert!(build(&ty, &ok, "$").is_ok());
        let bad = json!(256);
        let err = build(&ty, &bad, "$").unwrap_err();
        assert_eq!(err.code(), "C-UNCOERCIBLE");
    }
}
