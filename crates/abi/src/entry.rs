//! The JSON ABI document model: [`Parameter`], [`Entry`] and the
//! top-level [`Abi`] container, with name-indexed lookups.

use serde::{Deserialize, Serialize};

use crate::component::TypeComponent;
use crate::error::{AbiError, Result};
use crate::grammar::{self, ComponentDesc};

/// A single input/output/indexed parameter. Parsed eagerly on
/// construction so that every `Parameter` in a live `Abi` always carries
/// a valid, resolved [`TypeComponent`] — the crate has no notion of an
/// unparsed parameter.
///
/// `internal_type` is Solidity's vendor extension (e.g. `"struct
/// Foo.Bar"`) carrying the original struct/enum name that the plain ABI
/// type string (`"tuple"`) erases; it is surfaced explicitly (rather
/// than folded into `extra`) because [`Parameter::solidity_type`] reads
/// it back out for pretty-printing. Any other unrecognized JSON key is
/// preserved verbatim in `extra`. Deserialization also distinguishes an
/// absent `components` key from an explicit empty array: a non-tuple
/// type has no `components` key at all, while `tuple()` has
/// `components: []`.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub type_string: String,
    pub internal_type: Option<String>,
    pub components: Option<Vec<Parameter>>,
    pub indexed: Option<bool>,
    pub extra: serde_json::Map<String, serde_json::Value>,
    resolved: TypeComponent,
}

#[derive(Debug, Deserialize, Serialize)]
struct RawParameter {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    type_string: String,
    #[serde(rename = "internalType", default, skip_serializing_if = "Option::is_none")]
    internal_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    components: Option<Vec<RawParameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    indexed: Option<bool>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl Parameter {
    /// Builds a `Parameter` from its parts, parsing `type_string` (with
    /// `components` if any) into a resolved type tree.
    pub fn new(
        name: impl Into<String>,
        type_string: impl Into<String>,
        components: Option<Vec<Parameter>>,
        indexed: Option<bool>,
        path: &str,
    ) -> Result<Self> {
        let name = name.into();
        let type_string = type_string.into();
        let descs = components.as_ref().map(|cs| cs.iter().map(Parameter::to_desc).collect::<Vec<_>>());
        let resolved = grammar::parse(&type_string, descs.as_deref(), path)?;
        Ok(Self { name, type_string, internal_type: None, components, indexed, extra: serde_json::Map::new(), resolved })
    }

    /// Attaches Solidity's `internalType` vendor extension (e.g.
    /// `"struct Foo.Bar"`), read back by [`Parameter::solidity_type`].
    pub fn with_internal_type(mut self, internal_type: impl Into<String>) -> Self {
        self.internal_type = Some(internal_type.into());
        self
    }

    /// Reparses this parameter with a new `type_string`, keeping its
    /// name, components and extra keys — the "mutate then revalidate"
    /// builder used when programmatically assembling an ABI.
    pub fn with_type(&self, type_string: impl Into<String>, path: &str) -> Result<Self> {
        let type_string = type_string.into();
        let descs = self.components.as_ref().map(|cs| cs.iter().map(Parameter::to_desc).collect::<Vec<_>>());
        let resolved = grammar::parse(&type_string, descs.as_deref(), path)?;
        Ok(Self {
            name: self.name.clone(),
            type_string,
            internal_type: self.internal_type.clone(),
            components: self.components.clone(),
            indexed: self.indexed,
            extra: self.extra.clone(),
            resolved,
        })
    }

    pub fn resolved(&self) -> &TypeComponent {
        &self.resolved
    }

    /// A Solidity-flavored pretty-print of this parameter's type: the
    /// `internalType` vendor string with its leading `struct `/`enum `
    /// keyword stripped when present (so `"struct Foo.Bar"` renders as
    /// `"Foo.Bar"`), falling back to the plain canonical ABI type string
    /// for parameters with no `internalType` (spec §1's "small
    /// convenience on top of the type tree").
    pub fn solidity_type(&self) -> String {
        match &self.internal_type {
            Some(internal) => internal
                .strip_prefix("struct ")
                .or_else(|| internal.strip_prefix("enum "))
                .unwrap_or(internal)
                .to_string(),
            None => self.resolved.signature(),
        }
    }

    fn to_desc(&self) -> ComponentDesc {
        ComponentDesc {
            name: self.name.clone(),
            type_string: self.type_string.clone(),
            components: self.components.as_ref().map(|cs| cs.iter().map(Parameter::to_desc).collect()),
        }
    }

    fn from_raw(raw: RawParameter, path: &str) -> Result<Self> {
        let components = raw
            .components
            .as_ref()
            .map(|cs| {
                cs.iter()
                    .enumerate()
                    .map(|(i, c)| Self::from_raw_ref(c, &format!("{path}.{}", if c.name.is_empty() { i.to_string() } else { c.name.clone() })))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;
        let descs = components.as_ref().map(|cs: &Vec<Parameter>| cs.iter().map(Parameter::to_desc).collect::<Vec<_>>());
        let resolved = grammar::parse(&raw.type_string, descs.as_deref(), path)?;
        Ok(Self {
            name: raw.name,
            type_string: raw.type_string,
            internal_type: raw.internal_type,
            components,
            indexed: raw.indexed,
            extra: raw.extra,
            resolved,
        })
    }

    fn from_raw_ref(raw: &RawParameter, path: &str) -> Result<Self> {
        Self::from_raw(
            RawParameter {
                name: raw.name.clone(),
                type_string: raw.type_string.clone(),
                internal_type: raw.internal_type.clone(),
                components: raw.components.clone(),
                indexed: raw.indexed,
                extra: raw.extra.clone(),
            },
            path,
        )
    }

    fn to_raw(&self) -> RawParameter {
        RawParameter {
            name: self.name.clone(),
            type_string: self.type_string.clone(),
            internal_type: self.internal_type.clone(),
            components: self.components.as_ref().map(|cs| cs.iter().map(Parameter::to_raw).collect()),
            indexed: self.indexed,
            extra: self.extra.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for Parameter {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawParameter::deserialize(deserializer)?;
        let name = raw.name.clone();
        Self::from_raw(raw, &format!("${name}")).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Parameter {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_raw().serialize(serializer)
    }
}

/// The kind of top-level ABI entry, per Solidity's `"type"` discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    Function,
    Constructor,
    Receive,
    Fallback,
    Event,
    Error,
}

impl EntryKind {
    /// `true` for the kinds whose call data is prefixed by a 4-byte
    /// selector (`function`/`error`); constructors, `receive` and
    /// `fallback` have no selector.
    pub fn has_selector(self) -> bool {
        matches!(self, Self::Function | Self::Error)
    }

    /// `true` for the kinds that can actually be invoked on-chain —
    /// `function`, `constructor`, `receive` and `fallback` — as opposed
    /// to `event`/`error`, which only describe log/revert data shapes.
    pub fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Constructor | Self::Receive | Self::Fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StateMutability {
    Pure,
    View,
    Nonpayable,
    Payable,
}

#[derive(Debug, Deserialize, Serialize)]
struct RawEntry {
    #[serde(rename = "type")]
    kind: EntryKind,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<Parameter>,
    #[serde(default)]
    outputs: Vec<Parameter>,
    #[serde(rename = "stateMutability", default, skip_serializing_if = "Option::is_none")]
    state_mutability: Option<StateMutability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anonymous: Option<bool>,
    /// Legacy pre-`stateMutability` marker, preserved for wire
    /// compatibility with older tooling that still emits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payable: Option<bool>,
    /// Legacy pre-`stateMutability` marker (the inverse of what is now
    /// `view`/`pure`), preserved for wire compatibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    constant: Option<bool>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// A single top-level ABI entry: a function, constructor, fallback
/// handler, event or custom error.
#[derive(Debug, Clone)]
pub struct Entry {
    pub kind: EntryKind,
    pub name: Option<String>,
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
    pub state_mutability: Option<StateMutability>,
    pub anonymous: Option<bool>,
    /// Legacy boolean preserved for wire compatibility; modern tooling
    /// should prefer `state_mutability == Some(StateMutability::Payable)`.
    pub payable: Option<bool>,
    /// Legacy boolean preserved for wire compatibility; modern tooling
    /// should prefer `state_mutability` being `Pure`/`View`.
    pub constant: Option<bool>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Entry {
    /// The tuple type formed by this entry's input parameters, used as
    /// the top-level type for call-data encode/decode.
    pub fn inputs_tuple(&self) -> TypeComponent {
        let children = self.inputs.iter().map(|p| p.resolved().clone()).collect();
        let key_names = self.inputs.iter().map(|p| if p.name.is_empty() { None } else { Some(p.name.clone()) }).collect();
        TypeComponent::Tuple { children, key_names }
    }

    /// The tuple type formed by this entry's output parameters.
    pub fn outputs_tuple(&self) -> TypeComponent {
        let children = self.outputs.iter().map(|p| p.resolved().clone()).collect();
        let key_names = self.outputs.iter().map(|p| if p.name.is_empty() { None } else { Some(p.name.clone()) }).collect();
        TypeComponent::Tuple { children, key_names }
    }

    /// The canonical `name(type1,type2,...)` signature string.
    pub fn signature(&self) -> Result<String> {
        let name = self.name.as_deref().unwrap_or_default();
        let types = self.inputs.iter().map(|p| p.resolved().signature()).collect::<Vec<_>>().join(",");
        Ok(format!("{name}({types})"))
    }

    /// The 4-byte function/error selector: the first 4 bytes of
    /// `keccak256(signature)`. Only meaningful when
    /// [`EntryKind::has_selector`] is `true`.
    pub fn selector(&self) -> Result<[u8; 4]> {
        crate::signature::selector(&self.signature()?)
    }

    /// The 32-byte event topic0 hash: the full `keccak256(signature)`.
    pub fn topic_hash(&self) -> Result<alloy_primitives::B256> {
        crate::signature::topic_hash(&self.signature()?)
    }

    /// Like [`Entry::selector`], but never propagates: on any upstream
    /// error (an unparseable signature) it logs and returns a 4-byte zero
    /// block, so callers building display/formatting code can stay total
    /// instead of threading a `Result` through for this one convenience.
    pub fn selector_bytes(&self) -> [u8; 4] {
        self.selector().unwrap_or_else(|err| {
            tracing::warn!(entry = ?self.name, code = err.code(), %err, "selector derivation failed, returning zero block");
            [0u8; 4]
        })
    }

    /// Like [`Entry::topic_hash`], but never propagates: on any upstream
    /// error it logs and returns a 32-byte zero block.
    pub fn signature_hash_bytes(&self) -> alloy_primitives::B256 {
        self.topic_hash().unwrap_or_else(|err| {
            tracing::warn!(entry = ?self.name, code = err.code(), %err, "signature hash derivation failed, returning zero block");
            alloy_primitives::B256::ZERO
        })
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawEntry::deserialize(deserializer)?;
        Ok(Self {
            kind: raw.kind,
            name: raw.name,
            inputs: raw.inputs,
            outputs: raw.outputs,
            state_mutability: raw.state_mutability,
            anonymous: raw.anonymous,
            payable: raw.payable,
            constant: raw.constant,
            extra: raw.extra,
        })
    }
}

impl Serialize for Entry {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let raw = RawEntry {
            kind: self.kind,
            name: self.name.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            state_mutability: self.state_mutability,
            anonymous: self.anonymous,
            payable: self.payable,
            constant: self.constant,
            extra: self.extra.clone(),
        };
        raw.serialize(serializer)
    }
}

/// A full JSON ABI document: an ordered list of entries, with
/// name-indexed lookups for functions, events and errors.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Abi {
    entries: Vec<Entry>,
}

impl Abi {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn functions(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Function)
    }

    pub fn events(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Event)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Error)
    }

    /// The ABI's single constructor, if it declares one (spec §3:
    /// "at most one").
    pub fn constructor(&self) -> Option<&Entry> {
        self.entries.iter().find(|e| e.kind == EntryKind::Constructor)
    }

    /// Finds a function by name, disambiguating overloads by its full
    /// canonical signature when more than one function shares the name.
    pub fn function(&self, name: &str) -> Option<&Entry> {
        self.functions().find(|e| e.name.as_deref() == Some(name))
    }

    pub fn event(&self, name: &str) -> Option<&Entry> {
        self.events().find(|e| e.name.as_deref() == Some(name))
    }

    pub fn error(&self, name: &str) -> Option<&Entry> {
        self.errors().find(|e| e.name.as_deref() == Some(name))
    }

    /// Finds the event whose topic0 hash matches `topic0`, used by
    /// [`crate::event::decode_event`] to resolve an unknown log.
    pub fn event_by_topic0(&self, topic0: alloy_primitives::B256) -> Result<Option<&Entry>> {
        for event in self.events() {
            if event.topic_hash()? == topic0 {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| AbiError::wrong_shape(&e.to_string(), "$"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_callable_matches_invariant() {
        assert!(EntryKind::Function.is_callable());
        assert!(EntryKind::Constructor.is_callable());
        assert!(EntryKind::Receive.is_callable());
        assert!(EntryKind::Fallback.is_callable());
        assert!(!EntryKind::Event.is_callable());
        assert!(!EntryKind::Error.is_callable());
    }

    #[test]
    fn solidity_type_strips_struct_keyword() {
        let p = Parameter::new("a", "tuple", Some(vec![]), None, "$.a")
            .unwrap()
            .with_internal_type("struct Foo.Bar");
        assert_eq!(p.solidity_type(), "Foo.Bar");
    }

    #[test]
    fn solidity_type_falls_back_to_canonical_signature() {
        let p = Parameter::new("a", "uint256", None, None, "$.a").unwrap();
        assert_eq!(p.solidity_type(), "uint256");
    }

    #[test]
    fn unknown_keys_and_legacy_booleans_round_trip() {
        let abi = Abi::from_json(
            r#"[{
                "type": "function",
                "name": "transfer",
                "inputs": [{"name": "to", "type": "address", "internalType": "address"}],
                "outputs": [],
                "stateMutability": "nonpayable",
                "payable": false,
                "constant": false,
                "someVendorKey": 42
            }]"#,
        )
        .unwrap();
        let entry = abi.function("transfer").unwrap();
        assert_eq!(entry.payable, Some(false));
        assert_eq!(entry.constant, Some(false));
        assert_eq!(entry.extra.get("someVendorKey"), Some(&serde_json::json!(42)));

        let rendered = serde_json::to_value(&abi).unwrap();
        assert_eq!(rendered[0]["someVendorKey"], serde_json::json!(42));
        assert_eq!(rendered[0]["payable"], serde_json::json!(false));
    }

    #[test]
    fn empty_components_array_is_preserved_not_dropped() {
        let abi = Abi::from_json(
            r#"[{
                "type": "function",
                "name": "f",
                "inputs": [{"name": "t", "type": "tuple", "components": []}],
                "outputs": []
            }]"#,
        )
        .unwrap();
        let param = &abi.function("f").unwrap().inputs[0];
        assert_eq!(param.components.as_ref().map(Vec::len), Some(0));
        assert_eq!(param.resolved().signature(), "()");
    }

    #[test]
    fn selector_bytes_is_total_for_a_good_entry() {
        let param = Parameter::new("a", "uint256", None, None, "$.a").unwrap();
        let entry = Entry {
            kind: EntryKind::Function,
            name: Some("foo".to_string()),
            inputs: vec![param],
            outputs: vec![],
            state_mutability: None,
            anonymous: None,
            payable: None,
            constant: None,
            extra: serde_json::Map::new(),
        };
        assert_eq!(entry.selector_bytes(), entry.selector().unwrap());
        assert_eq!(entry.signature_hash_bytes(), entry.topic_hash().unwrap());
    }

    #[test]
    fn constructor_lookup() {
        let abi = Abi::from_json(
            r#"[
                {"type": "constructor", "inputs": [{"name": "owner", "type": "address"}]},
                {"type": "function", "name": "f", "inputs": [], "outputs": []}
            ]"#,
        )
        .unwrap();
        assert!(abi.constructor().is_some());
        assert_eq!(abi.constructor().unwrap().kind, EntryKind::Constructor);
    }
}
