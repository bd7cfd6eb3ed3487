//! Renders a decoded [`ComponentValue`] tree back to [`serde_json::Value`]
//! under a caller-chosen [`SerializerConfig`].
//!
//! Dispatch is driven by the value's [`LeafValue`] variant rather than
//! the nominal [`TypeComponent`] kind, because event decoding can
//! legitimately produce a `Bytes` leaf for a parameter whose declared
//! type is e.g. `string` (a hashed indexed topic, see
//! [`crate::event::decode_event`]).

use bigdecimal::ToPrimitive;
use serde_json::{json, Value};

use crate::component::TypeComponent;
use crate::value::{ComponentValue, LeafValue};

/// How arrays and tuples are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputShape {
    /// Tuples render as JSON arrays (positional), matching the wire
    /// order. The default — lossless regardless of whether components
    /// are named.
    #[default]
    FlatArrays,
    /// Tuples whose components are all named render as JSON objects
    /// keyed by name; unnamed components fall back to `FlatArrays`.
    Objects,
    /// Arrays/tuples render as an ordered JSON array of
    /// `{"name", "type", "value"}` records, `type` being the child's
    /// canonical type-component signature. Self-describing regardless of
    /// whether components are named.
    SelfDescribingArrays,
}

/// How integers (`int<M>`/`uint<M>`) are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntFormat {
    /// A decimal string, exact for any width and safe for JSON
    /// consumers that parse numbers as IEEE-754 doubles.
    #[default]
    DecimalString,
    /// A native JSON number if the magnitude is exactly representable in
    /// an `f64` (`<= 2^53 - 1`), a decimal string otherwise.
    NumberIfSafe,
    /// A `0x`-prefixed hex string.
    Hex,
}

/// How fixed-point (`fixed<M>x<N>`/`ufixed<M>x<N>`) values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatFormat {
    /// The decimal's canonical string form, e.g. `"1.50"`.
    #[default]
    DecimalString,
    /// A native JSON number if the unscaled value is exactly
    /// representable in an `f64` (`<= 2^53 - 1`), a decimal string
    /// otherwise.
    NumberIfSafe,
}

/// `2^53 - 1`, the largest integer magnitude an `f64` (and therefore a
/// JSON-number-consuming client) represents exactly.
const MAX_SAFE_INTEGER: u64 = (1u64 << 53) - 1;

/// How `bytes`/`bytes<M>` values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteFormat {
    /// Hex with no `0x` prefix, e.g. `"deadbeef"` — spec §4.6's default.
    #[default]
    Hex,
    /// Hex with a `0x` prefix, e.g. `"0xdeadbeef"`.
    HexPrefixed,
    Base64,
}

/// Bundles the independent rendering choices above into one config
/// object threaded through [`serialize`].
///
/// `name_fallback` supplies the key/name used for a tuple child with no
/// declared name — in [`OutputShape::Objects`] it becomes the object
/// key, in [`OutputShape::SelfDescribingArrays`] the `"name"` field.
/// Defaults to the index rendered as a decimal string.
#[derive(Debug, Clone, Copy)]
pub struct SerializerConfig {
    pub shape: OutputShape,
    pub int_format: IntFormat,
    pub float_format: FloatFormat,
    pub byte_format: ByteFormat,
    pub name_fallback: fn(usize) -> String,
}

fn default_name_fallback(index: usize) -> String {
    index.to_string()
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            shape: OutputShape::default(),
            int_format: IntFormat::default(),
            float_format: FloatFormat::default(),
            byte_format: ByteFormat::default(),
            name_fallback: default_name_fallback,
        }
    }
}

fn render_bytes(bytes: &[u8], format: ByteFormat) -> Value {
    match format {
        ByteFormat::Hex => json!(alloy_primitives::hex::encode(bytes)),
        ByteFormat::HexPrefixed => json!(format!("0x{}", alloy_primitives::hex::encode(bytes))),
        ByteFormat::Base64 => {
            use base64::Engine;
            json!(base64::engine::general_purpose::STANDARD.encode(bytes))
        }
    }
}

/// `true` if `magnitude` fits exactly in an `f64`, i.e. is within
/// `[0, 2^53 - 1]`.
fn uint_is_safe(v: &alloy_primitives::U256) -> bool {
    *v <= alloy_primitives::U256::from(MAX_SAFE_INTEGER)
}

fn int_as_number_if_safe(v: &crate::numeric::SignedInt) -> Option<Value> {
    if !uint_is_safe(&v.magnitude()) {
        return None;
    }
    let magnitude = u64::try_from(v.magnitude()).expect("checked safe above");
    let signed = if v.is_negative() { -(magnitude as i64) } else { magnitude as i64 };
    Some(json!(signed))
}

fn render_leaf(leaf: &LeafValue, config: &SerializerConfig) -> Value {
    match leaf {
        LeafValue::Int(v) => match config.int_format {
            IntFormat::DecimalString => json!(v.to_string()),
            IntFormat::Hex => {
                let sign = if v.is_negative() { "-" } else { "" };
                json!(format!("{sign}0x{:x}", v.magnitude()))
            }
            IntFormat::NumberIfSafe => int_as_number_if_safe(v).unwrap_or_else(|| json!(v.to_string())),
        },
        LeafValue::Uint(v) => match config.int_format {
            IntFormat::DecimalString => json!(v.to_string()),
            IntFormat::Hex => json!(format!("0x{v:x}")),
            IntFormat::NumberIfSafe => {
                if uint_is_safe(v) {
                    json!(u64::try_from(*v).expect("checked safe above"))
                } else {
                    json!(v.to_string())
                }
            }
        },
        LeafValue::Address(a) => render_bytes(a.as_slice(), config.byte_format),
        LeafValue::Bool(b) => json!(*b),
        LeafValue::Float(v) => match config.float_format {
            FloatFormat::DecimalString => json!(v.to_string()),
            FloatFormat::NumberIfSafe => {
                let (unscaled, _) = v.as_bigint_and_exponent();
                let magnitude_safe = unscaled.abs().to_u64().map(|m| m <= MAX_SAFE_INTEGER).unwrap_or(false);
                if magnitude_safe {
                    v.to_f64().map(Value::from).unwrap_or_else(|| json!(v.to_string()))
                } else {
                    json!(v.to_string())
                }
            }
        },
        LeafValue::Bytes(b) => render_bytes(b, config.byte_format),
        LeafValue::Str(s) => json!(s),
        LeafValue::Function(f) => render_bytes(f, config.byte_format),
    }
}

/// A tuple child's key/name used by [`OutputShape::Objects`] and
/// [`OutputShape::SelfDescribingArrays`]: its declared name, or
/// `config.name_fallback(index)` when unnamed.
fn child_name(key_names: &[Option<String>], index: usize, config: &SerializerConfig) -> String {
    key_names.get(index).and_then(Option::as_ref).cloned().unwrap_or_else(|| (config.name_fallback)(index))
}

/// Renders `value` (which must structurally match `ty`) to JSON under
/// `config`.
pub fn serialize(ty: &TypeComponent, value: &ComponentValue, config: &SerializerConfig) -> Value {
    match value {
        ComponentValue::Leaf(leaf) => render_leaf(leaf, config),
        ComponentValue::Array(items) => {
            let child_ty = array_child(ty);
            match config.shape {
                OutputShape::SelfDescribingArrays => Value::Array(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, v)| self_describing_record(&(config.name_fallback)(i), child_ty, v, config))
                        .collect(),
                ),
                _ => Value::Array(items.iter().map(|v| serialize(child_ty, v, config)).collect()),
            }
        }
        ComponentValue::Tuple(items) => {
            let (children, key_names) = match ty {
                TypeComponent::Tuple { children, key_names } => (children.as_slice(), key_names.as_slice()),
                _ => (&[][..], &[][..]),
            };
            match config.shape {
                OutputShape::Objects if key_names.iter().all(Option::is_some) && !items.is_empty() => {
                    let mut map = serde_json::Map::with_capacity(items.len());
                    for (i, v) in items.iter().enumerate() {
                        let child_ty = children.get(i).unwrap_or(ty);
                        map.insert(child_name(key_names, i, config), serialize(child_ty, v, config));
                    }
                    Value::Object(map)
                }
                OutputShape::SelfDescribingArrays => Value::Array(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, v)| {
                            let child_ty = children.get(i).unwrap_or(ty);
                            self_describing_record(&child_name(key_names, i, config), child_ty, v, config)
                        })
                        .collect(),
                ),
                _ => Value::Array(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, v)| serialize(children.get(i).unwrap_or(ty), v, config))
                        .collect(),
                ),
            }
        }
    }
}

/// Builds one `{"name", "type", "value"}` record for
/// [`OutputShape::SelfDescribingArrays`].
fn self_describing_record(name: &str, ty: &TypeComponent, value: &ComponentValue, config: &SerializerConfig) -> Value {
    json!({
        "name": name,
        "type": ty.signature(),
        "value": serialize(ty, value, config),
    })
}

fn array_child(ty: &TypeComponent) -> &TypeComponent {
    match ty {
        TypeComponent::FixedArray { child, .. } | TypeComponent::DynamicArray { child } => child,
        other => other,
    }
}
