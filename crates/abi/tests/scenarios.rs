//! End-to-end scenarios exercising the full encode/decode/event/
//! signature pipeline together, rather than one module in isolation.

use abi_codec::entry::{Abi, Entry, EntryKind, Parameter, StateMutability};
use abi_codec::{decode, encode, event, serialize, value};
use alloy_primitives::{keccak256, B256, U256};
use serde_json::json;

fn transfer_abi() -> Abi {
    Abi::from_json(
        r#"[{
            "type": "function",
            "name": "transfer",
            "inputs": [
                {"name": "recipient", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool"}],
            "stateMutability": "nonpayable"
        }]"#,
    )
    .unwrap()
}

#[test]
fn simple_function_call_encode() {
    let abi = transfer_abi();
    let entry = abi.function("transfer").unwrap();
    assert_eq!(entry.state_mutability, Some(StateMutability::Nonpayable));

    let input = json!({
        "recipient": "0x03706Ff580119B130E7D26C5e816913123C24d89",
        "amount": "1000000000000000000",
    });
    let tuple_ty = entry.inputs_tuple();
    let built = value::build(&tuple_ty, &input, "$").unwrap();
    let call_data = encode::encode_call_data(entry, &built).unwrap();

    let expected = "a9059cbb\
        00000000000000000000000003706ff580119b130e7d26c5e816913123c24d89\
        0000000000000000000000000000000000000000000000000de0b6b3a7640000";
    assert_eq!(alloy_primitives::hex::encode(&call_data), expected);
    assert_eq!(alloy_primitives::hex::encode(entry.selector().unwrap()), "a9059cbb");

    let decoded = decode::decode_call_data(entry, &call_data).unwrap();
    let rendered = serialize::serialize(&tuple_ty, &decoded, &serialize::SerializerConfig::default());
    assert_eq!(rendered[1], json!("1000000000000000000"));
}

#[test]
fn bytes3_array_2_decode() {
    let entry = Entry {
        kind: EntryKind::Function,
        name: Some("packed".to_string()),
        inputs: vec![Parameter::new("items", "bytes3[2]", None, None, "$.items").unwrap()],
        outputs: vec![],
        state_mutability: None,
        anonymous: None,
        payable: None,
        constant: None,
        extra: serde_json::Map::new(),
    };

    let mut word1 = [0u8; 32];
    word1[..3].copy_from_slice(b"abc");
    let mut word2 = [0u8; 32];
    word2[..3].copy_from_slice(b"def");
    let mut body = Vec::new();
    body.extend_from_slice(&word1);
    body.extend_from_slice(&word2);

    let mut call_data = entry.selector().unwrap().to_vec();
    call_data.extend_from_slice(&body);

    let decoded = decode::decode_call_data(&entry, &call_data).unwrap();
    let children = decoded.as_children().unwrap();
    let array = children[0].as_children().unwrap();
    let first = array[0].as_leaf().unwrap();
    match first {
        abi_codec::LeafValue::Bytes(b) => assert_eq!(&b[..3], b"abc"),
        other => panic!("expected bytes leaf, got {other:?}"),
    }
}

#[test]
fn sam_mixed_dynamic_tuple_encode() {
    let entry = Entry {
        kind: EntryKind::Function,
        name: Some("sam".to_string()),
        inputs: vec![
            Parameter::new("a", "bytes", None, None, "$.a").unwrap(),
            Parameter::new("b", "bool", None, None, "$.b").unwrap(),
            Parameter::new("c", "uint[]", None, None, "$.c").unwrap(),
        ],
        outputs: vec![],
        state_mutability: None,
        anonymous: None,
        payable: None,
        constant: None,
        extra: serde_json::Map::new(),
    };

    let tuple_ty = entry.inputs_tuple();
    // "dave" as a hex-encoded bytes blob (4 bytes).
    let dave_input = json!(["0x64617665", true, [1, 2, 3]]);
    let built = value::build(&tuple_ty, &dave_input, "$").unwrap();
    let mut out = Vec::new();
    encode::encode_component(&tuple_ty, &built, "$", &mut out).unwrap();

    // offset(0x60) | bool(true) | offset(0xa0) | "dave" length+data | array length+3 elements
    assert_eq!(out.len(), 32 * (3 + 2 + 4));
    assert_eq!(U256::from_be_slice(&out[0..32]), U256::from(0x60u64));
    assert_eq!(out[63], 1);
    assert_eq!(U256::from_be_slice(&out[64..96]), U256::from(0xa0u64));
    assert_eq!(U256::from_be_slice(&out[96..128]), U256::from(4u64));
    assert_eq!(&out[128..132], b"dave");
    assert_eq!(U256::from_be_slice(&out[160..192]), U256::from(3u64));
}

#[test]
fn event_decode_with_indexed_dynamic_parameter() {
    let event_entry = Entry {
        kind: EntryKind::Event,
        name: Some("MyEvent".to_string()),
        inputs: vec![
            Parameter::new("i1", "uint256", None, Some(true), "$.i1").unwrap(),
            Parameter::new("i2", "address", None, Some(true), "$.i2").unwrap(),
            Parameter::new("u1", "uint256", None, Some(false), "$.u1").unwrap(),
            Parameter::new("u2", "bool", None, Some(false), "$.u2").unwrap(),
            Parameter::new("i3", "string", None, Some(true), "$.i3").unwrap(),
            Parameter::new("u3", "string", None, Some(false), "$.u3").unwrap(),
        ],
        outputs: vec![],
        state_mutability: None,
        anonymous: Some(false),
        payable: None,
        constant: None,
        extra: serde_json::Map::new(),
    };

    let topic0 = event_entry.topic_hash().unwrap();
    let i1_topic = B256::from(U256::from(11111u64));
    let i2_topic = B256::left_padding_from(&[0x42; 20]);
    let i3_topic = keccak256(b"indexed-string-value");
    let topics = vec![topic0, i1_topic, i2_topic, i3_topic];

    let u1 = abi_codec::ComponentValue::Leaf(abi_codec::LeafValue::Uint(U256::from(22222u64)));
    let u2 = abi_codec::ComponentValue::Leaf(abi_codec::LeafValue::Bool(true));
    let u3 = abi_codec::ComponentValue::Leaf(abi_codec::LeafValue::Str("Hello World".to_string()));
    let data_tuple_ty = abi_codec::TypeComponent::Tuple {
        children: vec![
            abi_codec::TypeComponent::Elementary(abi_codec::Elementary { kind: abi_codec::ElementaryKind::Uint, suffix: "256".into(), m: Some(256), n: None }),
            abi_codec::TypeComponent::Elementary(abi_codec::Elementary { kind: abi_codec::ElementaryKind::Bool, suffix: String::new(), m: None, n: None }),
            abi_codec::TypeComponent::Elementary(abi_codec::Elementary { kind: abi_codec::ElementaryKind::String, suffix: String::new(), m: None, n: None }),
        ],
        key_names: vec![None, None, None],
    };
    let mut data = Vec::new();
    encode::encode_component(&data_tuple_ty, &abi_codec::ComponentValue::Tuple(vec![u1, u2, u3]), "$", &mut data).unwrap();

    let decoded = event::decode_event(&event_entry, &topics, &data).unwrap();
    let rendered = serialize::serialize(&event_entry.inputs_tuple(), &decoded, &serialize::SerializerConfig::default());
    assert_eq!(rendered[2], json!("22222"));
    assert_eq!(rendered[3], json!(true));
    assert_eq!(rendered[5], json!("Hello World"));
    // i3 is hashed: the rendered hex bytes must equal the raw topic hash.
    assert_eq!(rendered[4], json!(format!("0x{}", alloy_primitives::hex::encode(i3_topic))));
}

#[test]
fn nested_dynamic_tuple_round_trip() {
    let inner_desc = [
        abi_codec::grammar::ComponentDesc { name: "x".into(), type_string: "uint256".into(), components: None },
        abi_codec::grammar::ComponentDesc { name: "y".into(), type_string: "string".into(), components: None },
        abi_codec::grammar::ComponentDesc { name: "z".into(), type_string: "uint256".into(), components: None },
    ];
    let outer_desc = [
        abi_codec::grammar::ComponentDesc { name: "s".into(), type_string: "string".into(), components: None },
        abi_codec::grammar::ComponentDesc { name: "inner".into(), type_string: "tuple".into(), components: Some(inner_desc.to_vec()) },
        abi_codec::grammar::ComponentDesc { name: "tail".into(), type_string: "uint256".into(), components: None },
    ];
    let ty = abi_codec::grammar::parse("tuple", Some(&outer_desc), "$").unwrap();

    let input = json!(["hello", [1, "world", 2], 99]);
    let built = value::build(&ty, &input, "$").unwrap();
    let mut bytes = Vec::new();
    encode::encode_component(&ty, &built, "$", &mut bytes).unwrap();

    let decoded = decode::decode_value(&ty, &bytes).unwrap();
    let mut re_encoded = Vec::new();
    encode::encode_component(&ty, &decoded, "$", &mut re_encoded).unwrap();
    assert_eq!(bytes, re_encoded);

    let rendered = serialize::serialize(&ty, &decoded, &serialize::SerializerConfig::default());
    assert_eq!(rendered[0], json!("hello"));
    assert_eq!(rendered[1][1], json!("world"));
    assert_eq!(rendered[2], json!("99"));
}

#[test]
fn selector_stability_under_mutation() {
    let param = Parameter::new("a", "uint256", None, None, "$.a").unwrap();
    let mut entry = Entry {
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
    assert_eq!(entry.signature().unwrap(), "foo(uint256)");
    let before = entry.selector().unwrap();

    entry.inputs[0] = entry.inputs[0].with_type("uint128", "$.a").unwrap();
    assert_eq!(entry.signature().unwrap(), "foo(uint128)");
    let after = entry.selector().unwrap();
    assert_ne!(before, after);
}
