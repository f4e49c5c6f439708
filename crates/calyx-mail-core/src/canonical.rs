//! Canonical encoding for deterministic serialization.
//!
//! This module maps a [`Value`] tree to one byte sequence:
//! - Every string (values and map keys) is NFC-normalized first
//! - Map entries are sorted by code-point order of the normalized key,
//!   each nesting level independently
//! - Output is compact JSON text: no inter-token whitespace, raw UTF-8 in
//!   strings, only `"`, `\`, and control characters escaped
//! - Floats and raw byte blobs fail encoding with the offending path
//!
//! The canonical encoding is critical: structurally equal values produce
//! identical bytes regardless of map insertion order, and those bytes are
//! the only input to hashing and signing. No other serialization path may
//! be used for security-relevant bytes.
//!
//! Note that sorting determines byte order in the output. For the signed
//! envelope payload this places `ciphertext` before `header` before
//! `protocol_version`; what signing guarantees is membership of each field
//! in the signed set, never a field's byte position.

use unicode_normalization::UnicodeNormalization;

use crate::error::EncodeError;
use crate::value::Value;

/// Encode a value to canonical bytes.
///
/// Validation and normalization run over the whole tree before any output
/// is produced, so a failed encode yields no partial bytes.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let normalized = normalize(value, "$")?;
    let mut out = String::with_capacity(128);
    write_value(&normalized, &mut out);
    Ok(out.into_bytes())
}

/// NFC-normalize a string.
fn nfc(s: &str) -> String {
    s.nfc().collect()
}

/// Validate and normalize a value tree.
///
/// Rejects floats and byte blobs, NFC-normalizes every string, sorts each
/// map's entries by normalized key, and rejects keys that collide after
/// normalization.
fn normalize(value: &Value, path: &str) -> Result<Value, EncodeError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(_) | Value::Bytes(_) => Err(EncodeError::UnsupportedType {
            path: path.to_string(),
            kind: value.kind(),
        }),
        Value::Str(s) => Ok(Value::Str(nfc(s))),
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(normalize(item, &format!("{path}[{i}]"))?);
            }
            Ok(Value::List(out))
        }
        Value::Map(entries) => {
            let mut out: Vec<(String, Value)> = Vec::with_capacity(entries.len());
            for (key, val) in entries {
                let key = nfc(key);
                let val = normalize(val, &format!("{path}.{key}"))?;
                out.push((key, val));
            }

            // UTF-8 byte order and code-point order coincide, so a plain
            // byte sort is the required case-sensitive code-point sort.
            out.sort_by(|a, b| a.0.cmp(&b.0));

            for pair in out.windows(2) {
                if pair[0].0 == pair[1].0 {
                    return Err(EncodeError::DuplicateKey {
                        path: path.to_string(),
                        key: pair[0].0.clone(),
                    });
                }
            }

            Ok(Value::Map(out))
        }
    }
}

/// Write an already-normalized value as compact JSON text.
fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Int(n) => out.push_str(&n.to_string()),
        Value::Str(s) => write_string(s, out),
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Map(entries) => {
            out.push('{');
            for (i, (key, val)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_value(val, out);
            }
            out.push('}');
        }
        Value::Float(_) | Value::Bytes(_) => {
            unreachable!("rejected during normalization");
        }
    }
}

/// Write a string with the minimal JSON escape set.
///
/// Only `"`, `\`, and control characters below U+0020 are escaped; all
/// other characters pass through as raw UTF-8.
fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
