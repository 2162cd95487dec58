//! Safe navigation over partially specified JSON trees.
//!
//! Every extraction routine in this crate reads through [`lookup`] instead of
//! chaining `get` calls by hand. A missing key, an explicit `null`, or a
//! non-object intermediate all stop the walk and report the depth of the first
//! missing link.
use serde_json::{Map, Value};

/// Outcome of walking a key path from a root value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    Found(&'a Value),
    /// `depth` indexes the first key that could not be followed.
    Missing { depth: usize },
}

/// Walk `keys` from `root`, stopping at the first absent link.
///
/// ```
/// use serde_json::json;
/// use sift_social::twitter::path::{lookup, Resolved};
///
/// let v = json!({"data": {"user": null}});
/// assert_eq!(lookup(&v, &["data", "user", "name"]), Resolved::Missing { depth: 1 });
/// assert_eq!(lookup(&v, &["data"]).as_object().map(|m| m.len()), Some(1));
/// ```
pub fn lookup<'a>(root: &'a Value, keys: &[&str]) -> Resolved<'a> {
    let mut current = root;
    for (depth, key) in keys.iter().enumerate() {
        match current.get(*key) {
            Some(Value::Null) | None => return Resolved::Missing { depth },
            Some(next) => current = next,
        }
    }
    if current.is_null() {
        return Resolved::Missing { depth: keys.len() };
    }
    Resolved::Found(current)
}

impl<'a> Resolved<'a> {
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Resolved::Found(v) => Some(v),
            Resolved::Missing { .. } => None,
        }
    }

    /// Continue the walk from a resolved value.
    pub fn then(self, keys: &[&str]) -> Resolved<'a> {
        match self {
            Resolved::Found(v) => lookup(v, keys),
            missing => missing,
        }
    }

    pub fn as_str(self) -> Option<&'a str> {
        self.value().and_then(Value::as_str)
    }

    pub fn as_object(self) -> Option<&'a Map<String, Value>> {
        self.value().and_then(Value::as_object)
    }

    pub fn as_array(self) -> Option<&'a [Value]> {
        self.value().and_then(Value::as_array).map(Vec::as_slice)
    }

    pub fn as_bool(self) -> Option<bool> {
        self.value().and_then(Value::as_bool)
    }

    /// Non-negative integer counter. Negative, fractional, and textual values are absent.
    pub fn as_count(self) -> Option<u64> {
        self.value().and_then(Value::as_u64)
    }

    /// Identifier text. Empty strings are absent; unsigned integers render as decimal.
    pub fn as_ident(self) -> Option<String> {
        match self.value()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => n.as_u64().map(|n| n.to_string()),
            _ => None,
        }
    }

    /// Presence test used for flags derived from data: empty strings, zero,
    /// `false`, and empty containers do not count.
    pub fn is_truthy(self) -> bool {
        match self.value() {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
            Some(Value::Null) => false,
        }
    }
}
