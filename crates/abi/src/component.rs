//! The type-component tree: the parsed, canonical form of an ABI type
//! string, produced by [`crate::grammar::parse`].

use std::fmt;

/// The elementary (leaf) ABI type classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementaryKind {
    Int,
    Uint,
    Address,
    Bool,
    Fixed,
    Ufixed,
    Bytes,
    Function,
    String,
}

impl ElementaryKind {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Address => "address",
            Self::Bool => "bool",
            Self::Fixed => "fixed",
            Self::Ufixed => "ufixed",
            Self::Bytes => "bytes",
            Self::Function => "function",
            Self::String => "string",
        }
    }

    /// `true` for the six scalar classes that occupy exactly one word and
    /// whose declared type is preserved verbatim as an event topic (spec
    /// §4.7 item 3); everything else is hashed when indexed.
    pub fn is_topic_scalar(self) -> bool {
        matches!(self, Self::Int | Self::Uint | Self::Address | Self::Bool | Self::Fixed | Self::Ufixed)
    }
}

/// A resolved elementary type: its class plus the parsed numeric
/// dimensions (`m`, and `n` for the fixed-point classes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Elementary {
    pub kind: ElementaryKind,
    /// The resolved suffix text used in the canonical signature, e.g.
    /// `"256"` for `uint256`, `"128x18"` for `fixed128x18`, or `""` for
    /// classes that carry no suffix.
    pub suffix: String,
    pub m: Option<u16>,
    pub n: Option<u16>,
}

impl Elementary {
    pub fn is_dynamic(&self) -> bool {
        match self.kind {
            ElementaryKind::Bytes => self.m.is_none(),
            ElementaryKind::String => true,
            _ => false,
        }
    }

    pub fn canonical(&self) -> String {
        format!("{}{}", self.kind.name(), self.suffix)
    }
}

impl fmt::Display for Elementary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// The tagged variant at the core of the engine: an elementary leaf, a
/// fixed- or dynamic-length array, or a tuple of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeComponent {
    Elementary(Elementary),
    FixedArray { len: usize, child: Box<TypeComponent> },
    DynamicArray { child: Box<TypeComponent> },
    Tuple { children: Vec<TypeComponent>, key_names: Vec<Option<String>> },
}

impl TypeComponent {
    /// A composite is dynamic iff it is a `DynamicArray`, or any child is
    /// dynamic, or it is a non-empty `FixedArray` of a dynamic child.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::Elementary(e) => e.is_dynamic(),
            Self::FixedArray { len, child } => *len > 0 && child.is_dynamic(),
            Self::DynamicArray { .. } => true,
            Self::Tuple { children, .. } => children.iter().any(TypeComponent::is_dynamic),
        }
    }

    /// The deterministic canonical signature string, used (after joining
    /// with a name and parentheses) as Keccak-256 input for selectors and
    /// topic hashes.
    pub fn signature(&self) -> String {
        match self {
            Self::Elementary(e) => e.canonical(),
            Self::FixedArray { len, child } => format!("{}[{len}]", child.signature()),
            Self::DynamicArray { child } => format!("{}[]", child.signature()),
            Self::Tuple { children, .. } => {
                let inner = children.iter().map(TypeComponent::signature).collect::<Vec<_>>().join(",");
                format!("({inner})")
            }
        }
    }

    /// The elementary kind at this node, if any (arrays/tuples return
    /// `None`). Used by event decoding to decide the topic-scalar rule.
    pub fn elementary_kind(&self) -> Option<ElementaryKind> {
        match self {
            Self::Elementary(e) => Some(e.kind),
            _ => None,
        }
    }
}

impl fmt::Display for TypeComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}
