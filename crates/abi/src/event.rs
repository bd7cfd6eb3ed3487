//! Decodes an event log (`topics` + `data`) against an [`Entry`] of kind
//! [`EntryKind::Event`].
//!
//! Indexed parameters live in `topics`, non-indexed ones in `data`. Of
//! the indexed parameters, only the six scalar elementary classes
//! (`int`, `uint`, `address`, `bool`, `fixed`, `ufixed`) are stored
//! verbatim in their topic word; every other indexed type — `bytes`,
//! `bytes<M>`, `string`, arrays, tuples, `function` — is replaced in the
//! topic by the Keccak-256 hash of its ABI-encoded form, which cannot be
//! reversed. Those parameters decode to a raw 32-byte [`LeafValue::Bytes`]
//! rather than a value of their declared type.

use alloy_primitives::B256;

use crate::component::TypeComponent;
use crate::entry::{Entry, EntryKind};
use crate::error::{AbiError, Result};
use crate::value::{ComponentValue, LeafValue};

/// Decodes `topics` and `data` against `event`'s declared inputs,
/// returning the parameters in their original declaration order.
///
/// `topics[0]` must equal `event`'s topic hash unless the event is
/// `anonymous`, in which case it carries no signature topic at all.
pub fn decode_event(event: &Entry, topics: &[B256], data: &[u8]) -> Result<ComponentValue> {
    debug_assert_eq!(event.kind, EntryKind::Event);

    let anonymous = event.anonymous.unwrap_or(false);
    let mut remaining_topics = topics;
    if !anonymous {
        let (sig_topic, rest) = topics
            .split_first()
            .ok_or_else(|| AbiError::insufficient_topics(event.name.as_deref().unwrap_or(""), 1, 0))?;
        let expected = event.topic_hash()?;
        if *sig_topic != expected {
            return Err(AbiError::event_signature_mismatch(expected, *sig_topic));
        }
        remaining_topics = rest;
    }

    let indexed_params: Vec<&crate::entry::Parameter> =
        event.inputs.iter().filter(|p| p.indexed.unwrap_or(false)).collect();
    if remaining_topics.len() < indexed_params.len() {
        let name = indexed_params[remaining_topics.len()].name.clone();
        return Err(AbiError::insufficient_topics(&name, indexed_params.len(), remaining_topics.len()));
    }

    let indexed_values: Vec<ComponentValue> = indexed_params
        .iter()
        .zip(remaining_topics)
        .map(|(param, topic)| decode_topic(param.resolved(), topic))
        .collect();

    let non_indexed: Vec<&crate::entry::Parameter> =
        event.inputs.iter().filter(|p| !p.indexed.unwrap_or(false)).collect();
    let non_indexed_tuple = TypeComponent::Tuple {
        children: non_indexed.iter().map(|p| p.resolved().clone()).collect(),
        key_names: non_indexed.iter().map(|p| if p.name.is_empty() { None } else { Some(p.name.clone()) }).collect(),
    };
    let decoded_data = crate::decode::decode_value(&non_indexed_tuple, data)?;
    let non_indexed_values = decoded_data
        .as_children()
        .expect("non_indexed_tuple always decodes to ComponentValue::Tuple")
        .to_vec();

    let mut indexed_iter = indexed_values.into_iter();
    let mut non_indexed_iter = non_indexed_values.into_iter();
    let ordered = event
        .inputs
        .iter()
        .map(|p| if p.indexed.unwrap_or(false) { indexed_iter.next() } else { non_indexed_iter.next() })
        .collect::<Option<Vec<_>>>()
        .expect("every input was consumed from exactly one of the two iterators");

    Ok(ComponentValue::Tuple(ordered))
}

/// Decodes one indexed parameter's topic word.
fn decode_topic(ty: &TypeComponent, topic: &B256) -> ComponentValue {
    match ty.elementary_kind() {
        Some(kind) if kind.is_topic_scalar() => {
            let word: [u8; 32] = topic.0;
            crate::decode::decode_value(ty, &word).unwrap_or_else(|_| {
                ComponentValue::Leaf(LeafValue::Bytes(alloy_primitives::Bytes::copy_from_slice(&word)))
            })
        }
        _ => ComponentValue::Leaf(LeafValue::Bytes(alloy_primitives::Bytes::copy_from_slice(topic.as_slice()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Parameter;
    use alloy_primitives::{keccak256, U256};

    fn event_entry(name: &str, inputs: Vec<Parameter>, anonymous: bool) -> Entry {
        Entry {
            kind: EntryKind::Event,
            name: Some(name.to_string()),
            inputs,
            outputs: vec![],
            state_mutability: None,
            anonymous: Some(anonymous),
            payable: None,
            constant: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn topic_scalar_indexed_param_decodes_directly() {
        let from = Parameter::new("from", "address", None, Some(true), "$.from").unwrap();
        let to = Parameter::new("to", "address", None, Some(true), "$.to").unwrap();
        let value = Parameter::new("value", "uint256", None, Some(false), "$.value").unwrap();
        let event = event_entry("Transfer", vec![from, to, value], false);

        let sig_topic = event.topic_hash().unwrap();
        let from_topic = B256::left_padding_from(&[0x11; 20]);
        let to_topic = B256::left_padding_from(&[0x22; 20]);
        let topics = vec![sig_topic, from_topic, to_topic];
        let mut data = vec![0u8; 32];
        U256::from(1000u64).to_be_bytes::<32>().iter().enumerate().for_each(|(i, b)| data[i] = *b);

        let decoded = decode_event(&event, &topics, &data).unwrap();
        let children = decoded.as_children().unwrap();
        assert_eq!(children.len(), 3);
    }

    #[test]
    fn hashed_indexed_param_yields_raw_bytes_leaf() {
        let name = Parameter::new("name", "string", None, Some(true), "$.name").unwrap();
        let event = event_entry("Named", vec![name], false);
        let sig_topic = event.topic_hash().unwrap();
        let hashed = keccak256(b"hello");
        let topics = vec![sig_topic, hashed];
        let decoded = decode_event(&event, &topics, &[]).unwrap();
        let children = decoded.as_children().unwrap();
        match children[0].as_leaf().unwrap() {
            LeafValue::Bytes(b) => assert_eq!(b.as_ref(), hashed.as_slice()),
            other => panic!("expected raw bytes leaf, got {other:?}"),
        }
    }

    #[test]
    fn signature_mismatch_rejected() {
        let value = Parameter::new("value", "uint256", None, Some(false), "$.value").unwrap();
        let event = event_entry("Foo", vec![value], false);
        let wrong_topic = keccak256(b"not the right signature");
        let err = decode_event(&event, &[wrong_topic], &[0u8; 32]).unwrap_err();
        assert_eq!(err.code(), "EV-SIGNATURE-MISMATCH");
    }
}
