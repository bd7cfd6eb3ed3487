//! EVM contract ABI type grammar, coercion, encoding and decoding.
//!
//! This crate turns a JSON ABI document into a tree of resolved
//! [`component::TypeComponent`]s, coerces permissive host values
//! ([`coerce::FromExternal`]) into a matching [`value::ComponentValue`]
//! tree, and encodes/decodes that tree to and from the ABI wire format —
//! function call data, constructor/error payloads, and event logs.
//!
//! ```
//! use abi_codec::{entry::Abi, encode, value};
//! use serde_json::json;
//!
//! let abi = Abi::from_json(r#"[{
//!     "type": "function",
//!     "name": "transfer",
//!     "inputs": [
//!         {"name": "to", "type": "address"},
//!         {"name": "amount", "type": "uint256"}
//!     ],
//!     "outputs": []
//! }]"#).unwrap();
//!
//! let entry = abi.function("transfer").unwrap();
//! let tuple_ty = entry.inputs_tuple();
//! let input = json!(["0x1111111111111111111111111111111111111111", 1000]);
//! let built = value::build(&tuple_ty, &input, "$").unwrap();
//! let call_data = encode::encode_call_data(entry, &built).unwrap();
//! assert_eq!(&call_data[..4], &entry.selector().unwrap());
//! ```

pub mod coerce;
pub mod component;
pub mod decode;
pub mod encode;
pub mod entry;
pub mod error;
pub mod event;
pub mod grammar;
pub mod numeric;
pub mod serialize;
pub mod signature;
pub mod value;

pub use component::{Elementary, ElementaryKind, TypeComponent};
pub use entry::{Abi, Entry, EntryKind, Parameter, StateMutability};
pub use error::{AbiError, Result};
pub use numeric::SignedInt;
pub use value::{ComponentValue, LeafValue};
