//! Parses a canonical ABI type string (`"uint256"`, `"bytes"`,
//! `"fixed128x18"`, `"uint256[8][]"`, `"tuple"`, ...) into a
//! [`TypeComponent`] tree.

use crate::component::{Elementary, ElementaryKind, TypeComponent};
use crate::error::{AbiError, Result};

/// An owned, recursive view of a parameter used only to drive tuple
/// recursion, so that `grammar` does not depend on the `entry` module
/// (which depends on `grammar`).
#[derive(Debug, Clone)]
pub struct ComponentDesc {
    pub name: String,
    pub type_string: String,
    pub components: Option<Vec<ComponentDesc>>,
}

struct SuffixRule {
    kind: ElementaryKind,
    default_suffix: Option<&'static str>,
    validate: fn(&str, &str) -> Result<(String, Option<u16>, Option<u16>)>,
}

fn registry() -> &'static [SuffixRule] {
    const REGISTRY: &[SuffixRule] = &[
        SuffixRule { kind: ElementaryKind::Address, default_suffix: None, validate: validate_none },
        SuffixRule { kind: ElementaryKind::Bool, default_suffix: None, validate: validate_none },
        SuffixRule { kind: ElementaryKind::Function, default_suffix: None, validate: validate_none },
        SuffixRule { kind: ElementaryKind::String, default_suffix: None, validate: validate_none },
        SuffixRule { kind: ElementaryKind::Bytes, default_suffix: None, validate: validate_m_optional },
        SuffixRule { kind: ElementaryKind::Int, default_suffix: Some("256"), validate: validate_m_required },
        SuffixRule { kind: ElementaryKind::Uint, default_suffix: Some("256"), validate: validate_m_required },
        SuffixRule { kind: ElementaryKind::Fixed, default_suffix: Some("128x18"), validate: validate_mxn },
        SuffixRule { kind: ElementaryKind::Ufixed, default_suffix: Some("128x18"), validate: validate_mxn },
    ];
    REGISTRY
}

fn validate_none(suffix: &str, path: &str) -> Result<(String, Option<u16>, Option<u16>)> {
    if suffix.is_empty() {
        Ok((String::new(), None, None))
    } else {
        Err(AbiError::bad_suffix(format!("`{suffix}` does not take a suffix"), path))
    }
}

fn parse_decimal_u16(text: &str, path: &str) -> Result<u16> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AbiError::bad_suffix(format!("`{text}` is not a decimal integer"), path));
    }
    text.parse::<u16>().map_err(|_| AbiError::bad_suffix(format!("`{text}` is out of range"), path))
}

fn validate_m_optional(suffix: &str, path: &str) -> Result<(String, Option<u16>, Option<u16>)> {
    if suffix.is_empty() {
        return Ok((String::new(), None, None));
    }
    let m = parse_decimal_u16(suffix, path)?;
    if !(1..=32).contains(&m) {
        return Err(AbiError::bad_suffix(format!("bytes<{m}> must have 1 <= M <= 32"), path));
    }
    Ok((m.to_string(), Some(m), None))
}

fn validate_m_required(suffix: &str, path: &str) -> Result<(String, Option<u16>, Option<u16>)> {
    let m = parse_decimal_u16(suffix, path)?;
    if !(8..=256).contains(&m) || m % 8 != 0 {
        return Err(AbiError::bad_suffix(format!("M={m} must satisfy 8 <= M <= 256 and M % 8 == 0"), path));
    }
    Ok((m.to_string(), Some(m), None))
}

fn validate_mxn(suffix: &str, path: &str) -> Result<(String, Option<u16>, Option<u16>)> {
    let (m_text, n_text) = suffix
        .split_once('x')
        .ok_or_else(|| AbiError::bad_suffix(format!("`{suffix}` is missing `MxN`"), path))?;
    let m = parse_decimal_u16(m_text, path)?;
    let n = parse_decimal_u16(n_text, path)?;
    if !(8..=256).contains(&m) || m % 8 != 0 {
        return Err(AbiError::bad_suffix(format!("M={m} must satisfy 8 <= M <= 256 and M % 8 == 0"), path));
    }
    if !(1..=80).contains(&n) {
        return Err(AbiError::bad_suffix(format!("N={n} must satisfy 1 <= N <= 80"), path));
    }
    Ok((format!("{m}x{n}"), Some(m), Some(n)))
}

/// Splits `remainder` at the first `[`, returning `(suffix, array_tail)`.
fn split_suffix_and_tail(remainder: &str) -> (&str, &str) {
    match remainder.find('[') {
        Some(idx) => (&remainder[..idx], &remainder[idx..]),
        None => (remainder, ""),
    }
}

/// Wraps `base` with the array dimensions found in `tail`, consuming
/// bracket groups left to right (the last group in the string becomes the
/// outermost array, per `uint256[8][]` meaning "a dynamic array of
/// length-8 arrays of uint256").
fn parse_array_tail(mut tail: &str, mut base: TypeComponent, path: &str) -> Result<TypeComponent> {
    while !tail.is_empty() {
        if !tail.starts_with('[') {
            return Err(AbiError::array_spec(format!("expected `[` in `{tail}`"), path));
        }
        let close = tail
            .find(']')
            .ok_or_else(|| AbiError::array_spec(format!("unterminated `[` in `{tail}`"), path))?;
        let inner = &tail[1..close];
        base = if inner.is_empty() {
            TypeComponent::DynamicArray { child: Box::new(base) }
        } else {
            if !inner.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AbiError::array_spec(format!("`{inner}` is not a decimal array length"), path));
            }
            let len: usize = inner
                .parse()
                .map_err(|_| AbiError::array_spec(format!("`{inner}` is out of range"), path))?;
            TypeComponent::FixedArray { len, child: Box::new(base) }
        };
        tail = &tail[close + 1..];
    }
    Ok(base)
}

/// Parses `type_string` (with `components` supplied when it names a
/// tuple) into a [`TypeComponent`], recursing through array dimensions
/// and tuple children. `path` is the breadcrumb used in any error.
pub fn parse(type_string: &str, components: Option<&[ComponentDesc]>, path: &str) -> Result<TypeComponent> {
    let name_len = type_string.bytes().take_while(u8::is_ascii_lowercase).count();
    let (name, remainder) = type_string.split_at(name_len);
    let (suffix, array_tail) = split_suffix_and_tail(remainder);

    let base = if name == "tuple" {
        if !suffix.is_empty() {
            return Err(AbiError::bad_suffix("`tuple` does not take a suffix", path));
        }
        let components = components.ok_or_else(|| AbiError::null_components(path))?;
        let mut children = Vec::with_capacity(components.len());
        let mut key_names = Vec::with_capacity(components.len());
        for (i, c) in components.iter().enumerate() {
            let child_path = format!("{path}.{}", if c.name.is_empty() { i.to_string() } else { c.name.to_string() });
            children.push(parse(&c.type_string, c.components.as_deref(), &child_path)?);
            key_names.push(if c.name.is_empty() { None } else { Some(c.name.to_string()) });
        }
        TypeComponent::Tuple { children, key_names }
    } else {
        let rule = registry()
            .iter()
            .find(|r| r.kind.name() == name)
            .ok_or_else(|| AbiError::unknown_type(name, path))?;
        let effective_suffix = if suffix.is_empty() {
            rule.default_suffix.unwrap_or("")
        } else {
            suffix
        };
        let (resolved_suffix, m, n) = (rule.validate)(effective_suffix, path)?;
        TypeComponent::Elementary(Elementary { kind: rule.kind, suffix: resolved_suffix, m, n })
    };

    parse_array_tail(array_tail, base, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_simple(s: &str) -> Result<TypeComponent> {
        parse(s, None, "$")
    }

    #[test]
    fn canonical_suffix_resolution() {
        assert_eq!(parse_simple("uint").unwrap().signature(), "uint256");
        assert_eq!(parse_simple("int").unwrap().signature(), "int256");
        assert_eq!(parse_simple("fixed").unwrap().signature(), "fixed128x18");
        assert_eq!(parse_simple("ufixed").unwrap().signature(), "ufixed128x18");
        assert_eq!(parse_simple("uint256").unwrap().signature(), "uint256");
    }

    #[test]
    fn bytes_suffix_bounds() {
        assert!(parse_simple("bytes32").is_ok());
        assert!(parse_simple("bytes0").is_err());
        assert!(parse_simple("bytes33").is_err());
        assert!(parse_simple("bytes").unwrap().is_dynamic());
    }

    #[test]
    fn int_suffix_bounds() {
        assert!(parse_simple("uint8").is_ok());
        assert!(parse_simple("uint7").is_err());
        assert!(parse_simple("uint264").is_err());
    }

    #[test]
    fn fixed_mxn_bounds() {
        assert!(parse_simple("fixed128x18").is_ok());
        assert!(parse_simple("fixed128x0").is_err());
        assert!(parse_simple("fixed128x81").is_err());
        assert!(parse_simple("fixed127x18").is_err());
    }

    #[test]
    fn array_dimensions_nest_left_to_right() {
        let t = parse_simple("uint256[8][]").unwrap();
        match t {
            TypeComponent::DynamicArray { child } => match *child {
                TypeComponent::FixedArray { len, .. } => assert_eq!(len, 8),
                _ => panic!("expected fixed array"),
            },
            _ => panic!("expected dynamic array"),
        }
    }

    #[test]
    fn malformed_array_spec_rejected() {
        assert!(parse_simple("uint256[x]").is_err());
        assert!(parse_simple("uint256[").is_err());
    }

    #[test]
    fn unknown_type_rejected() {
        let err = parse_simple("uint257x").unwrap_err();
        assert_eq!(err.code(), "G-BAD-SUFFIX");
    }

    #[test]
    fn tuple_requires_components() {
        let err = parse("tuple", None, "$").unwrap_err();
        assert_eq!(err.code(), "G-NULL-COMPONENTS");
    }

    #[test]
    fn tuple_with_empty_components_is_preserved() {
        let t = parse("tuple", Some(&[]), "$").unwrap();
        assert_eq!(t.signature(), "()");
    }

    #[test]
    fn tuple_array_round_trip() {
        let children = [ComponentDesc { name: "a".to_string(), type_string: "uint256".to_string(), components: None }];
        let t = parse("tuple[2]", Some(&children), "$").unwrap();
        assert_eq!(t.signature(), "(uint256)[2]");
    }
}
