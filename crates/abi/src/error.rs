//! The codec's single error taxonomy.
//!
//! Every fallible operation in this crate returns [`Result<T>`], an alias
//! over [`AbiError`]. Each variant carries a stable, short identifier (its
//! `code()`) plus a human description and a breadcrumb — a dotted/bracketed
//! path into the value tree for the structural error kinds, or a byte
//! offset for the wire-level ones — per the error-handling design in the
//! specification this crate implements.

use alloy_primitives::FixedBytes;
use thiserror::Error;

/// The crate-wide result alias.
pub type Result<T> = std::result::Result<T, AbiError>;

/// A single error taxonomy covering grammar, coercion, structural,
/// encode, decode and event-decoding failures.
#[derive(Debug, Error)]
pub enum AbiError {
    /// Malformed or unsupported type string.
    #[error("[{code}] {message} (at {path})")]
    Grammar {
        code: &'static str,
        message: String,
        path: String,
    },
    /// A host value could not be coerced to the elementary class required.
    #[error("[{code}] {message} (at {path})")]
    Coercion {
        code: &'static str,
        message: String,
        path: String,
    },
    /// The shape of the input (sequence vs. map, length) did not match the
    /// type tree.
    #[error("[{code}] {message} (at {path})")]
    Structure {
        code: &'static str,
        message: String,
        path: String,
    },
    /// A value could not be serialized to the ABI wire layout.
    #[error("[{code}] {message} (at {path})")]
    Encode {
        code: &'static str,
        message: String,
        path: String,
    },
    /// The wire bytes could not be parsed against the expected type tree.
    #[error("[{code}] {message} (at offset {offset:#x})")]
    Decode {
        code: &'static str,
        message: String,
        offset: usize,
    },
    /// Event log decoding failed (signature mismatch, missing topics, or a
    /// propagated decode error).
    #[error("[{code}] {message}")]
    Event { code: &'static str, message: String },
}

impl AbiError {
    /// The stable alphanumeric identifier for this error, so tests and
    /// callers can match by code rather than by message text.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Grammar { code, .. }
            | Self::Coercion { code, .. }
            | Self::Structure { code, .. }
            | Self::Encode { code, .. }
            | Self::Decode { code, .. }
            | Self::Event { code, .. } => code,
        }
    }

    // ---- grammar ----

    pub(crate) fn unknown_type(name: &str, path: &str) -> Self {
        Self::Grammar {
            code: "G-UNKNOWN-TYPE",
            message: format!("unknown elementary type `{name}`"),
            path: path.to_string(),
        }
    }

    pub(crate) fn array_spec(message: impl Into<String>, path: &str) -> Self {
        Self::Grammar { code: "G-ARRAY-SPEC", message: message.into(), path: path.to_string() }
    }

    pub(crate) fn bad_suffix(message: impl Into<String>, path: &str) -> Self {
        Self::Grammar { code: "G-BAD-SUFFIX", message: message.into(), path: path.to_string() }
    }

    pub(crate) fn null_components(path: &str) -> Self {
        Self::Grammar {
            code: "G-NULL-COMPONENTS",
            message: "tuple type requires a `components` list".to_string(),
            path: path.to_string(),
        }
    }

    // ---- coercion ----

    pub(crate) fn coercion(class: &str, found: impl std::fmt::Debug, path: &str) -> Self {
        Self::Coercion {
            code: "C-UNCOERCIBLE",
            message: format!("cannot coerce {found:?} to {class}"),
            path: path.to_string(),
        }
    }

    // ---- structure ----

    pub(crate) fn wrong_length(expected: usize, got: usize, path: &str) -> Self {
        Self::Structure {
            code: "S-WRONG-LENGTH",
            message: format!("expected {expected} element(s), found {got}"),
            path: path.to_string(),
        }
    }

    pub(crate) fn wrong_shape(expected: &str, path: &str) -> Self {
        Self::Structure {
            code: "S-WRONG-SHAPE",
            message: format!("expected {expected}"),
            path: path.to_string(),
        }
    }

    pub(crate) fn missing_name(path: &str) -> Self {
        Self::Structure {
            code: "S-MISSING-NAME",
            message: "tuple child has no name and input is a map".to_string(),
            path: path.to_string(),
        }
    }

    pub(crate) fn missing_key(key: &str, path: &str) -> Self {
        Self::Structure {
            code: "S-MISSING-KEY",
            message: format!("missing key `{key}`"),
            path: path.to_string(),
        }
    }

    pub(crate) fn missing_root(path: &str) -> Self {
        Self::Structure {
            code: "S-MISSING-ROOT",
            message: "no input supplied for root parameter".to_string(),
            path: path.to_string(),
        }
    }

    // ---- encode ----

    pub(crate) fn numeric_range(path: &str, message: impl Into<String>) -> Self {
        Self::Encode { code: "E-RANGE", message: message.into(), path: path.to_string() }
    }

    pub(crate) fn bytes_too_short(path: &str, need: usize, got: usize) -> Self {
        Self::Encode {
            code: "E-BYTES-SHORT",
            message: format!("fixed bytes<{need}> requires at least {need} bytes, found {got}"),
            path: path.to_string(),
        }
    }

    pub(crate) fn bad_component(path: &str) -> Self {
        Self::Encode {
            code: "E-BAD-COMPONENT",
            message: "invalid type component".to_string(),
            path: path.to_string(),
        }
    }

    // ---- decode ----

    pub(crate) fn not_enough_bytes(offset: usize, need: usize, got: usize) -> Self {
        Self::Decode {
            code: "D-NOT-ENOUGH-BYTES",
            message: format!("need {need} byte(s), only {got} available"),
            offset,
        }
    }

    pub(crate) fn array_count_too_large(offset: usize) -> Self {
        Self::Decode {
            code: "D-ARRAY-COUNT-TOO-LARGE",
            message: "array length word exceeds 2^32".to_string(),
            offset,
        }
    }

    pub(crate) fn not_enough_signature_bytes(got: usize) -> Self {
        Self::Decode {
            code: "D-NOT-ENOUGH-SIG-BYTES",
            message: format!("call data must be at least 4 bytes, found {got}"),
            offset: 0,
        }
    }

    pub(crate) fn incorrect_selector(expected: [u8; 4], got: [u8; 4]) -> Self {
        Self::Decode {
            code: "D-INCORRECT-SELECTOR",
            message: format!(
                "selector mismatch: expected 0x{}, received 0x{}",
                alloy_primitives::hex::encode(expected),
                alloy_primitives::hex::encode(got)
            ),
            offset: 0,
        }
    }

    // ---- event ----

    pub(crate) fn event_signature_mismatch(expected: FixedBytes<32>, got: FixedBytes<32>) -> Self {
        Self::Event {
            code: "EV-SIGNATURE-MISMATCH",
            message: format!("expected topic0 0x{expected:x}, received 0x{got:x}"),
        }
    }

    pub(crate) fn insufficient_topics(name: &str, need: usize, got: usize) -> Self {
        Self::Event {
            code: "EV-INSUFFICIENT-TOPICS",
            message: format!(
                "event has {need} indexed parameter(s) (missing `{name}`) but only {got} topic(s) supplied"
            ),
        }
    }
}
