//! The restricted value model accepted by the canonical encoder.
//!
//! Values are built from strings, integers, booleans, null, lists, and
//! string-keyed maps. Maps are explicit vectors of key-value pairs, never a
//! host map type, so no iteration-order assumption can leak into the
//! encoding: the encoder sorts entries itself.
//!
//! [`Value::Float`] and [`Value::Bytes`] exist only so the encoder can
//! reject them with an error naming the offending path. Raw bytes must be
//! base64-encoded into strings by the caller before they enter a value
//! tree. Non-string map keys, sets, and tuples are unrepresentable.

/// A value that can be canonically encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i128),
    /// Representable but always rejected by the encoder.
    Float(f64),
    Str(String),
    /// Representable but always rejected by the encoder.
    Bytes(Vec<u8>),
    List(Vec<Value>),
    /// Entries in caller order; the encoder sorts by key.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Build a map from an iterator of key-value pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Get the map entries, if this is a map.
    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Get the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the variant, used in encoder error paths.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n as i128)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Int(n as i128)
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::Int(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_preserves_caller_order() {
        let v = Value::map([("b", Value::from(1i64)), ("a", Value::from(2i64))]);
        let entries = v.as_map().unwrap();
        assert_eq!(entries[0].0, "b");
        assert_eq!(entries[1].0, "a");
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from("x"), Value::Str("x".to_string()));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(-7i64), Value::Int(-7));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(
            Value::from(vec![1i64, 2]),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
    }
}
