//! Plain JSON value tree.
//!
//! Numbers are kept as their raw source lexemes and never eagerly converted
//! to a machine numeric type, so no precision is lost between parsing and
//! re-serialization. Conversion happens on demand via [`Number::to_f64`].

use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};

use crate::factory::NumberShape;

/// Object representation: string keys mapped to values.
pub type Map = BTreeMap<String, Value>;
/// Array representation.
pub type Array = Vec<Value>;

/// A JSON number as its raw lexeme.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Number {
    text: String,
    integral: bool,
}

impl Number {
    pub(crate) fn from_lexeme(text: String, shape: NumberShape) -> Self {
        Self {
            text,
            integral: matches!(shape, NumberShape::Integer),
        }
    }

    /// The exact digit string from the source document.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// `true` when the lexeme carries no fraction and no exponent.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        self.integral
    }

    /// Converts the lexeme to an `f64`, losing precision where `f64` must.
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        self.text.parse().ok()
    }

    /// Converts an integral lexeme to an `i64` when it fits.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        if self.integral { self.text.parse().ok() } else { None }
    }
}

impl core::fmt::Display for Number {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Self {
            text: v.to_string(),
            integral: true,
        }
    }
}

/// A JSON value as defined by [RFC 8259].
///
/// # Examples
///
/// ```
/// use jsonchute::{Map, Value};
///
/// let mut map = Map::new();
/// map.insert("key".to_string(), Value::String("value".into()));
/// let v = Value::Object(map);
/// assert_eq!(v.to_string(), r#"{"key":"value"}"#);
/// ```
///
/// [RFC 8259]: https://datatracker.ietf.org/doc/html/rfc8259
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Array),
    Object(Map),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

// The derived drop glue recurses once per nesting level, so a tree at the
// depths the engine itself handles fine would blow the stack on drop.
// Children are drained into a worklist instead; every node is shallow by the
// time it is actually freed.
impl Drop for Value {
    fn drop(&mut self) {
        match self {
            Value::Array(items) if !items.is_empty() => {}
            Value::Object(map) if !map.is_empty() => {}
            _ => return,
        }
        let mut stack = Vec::new();
        drain_children(self, &mut stack);
        while let Some(mut value) = stack.pop() {
            drain_children(&mut value, &mut stack);
        }
    }
}

fn drain_children(value: &mut Value, stack: &mut Vec<Value>) {
    match value {
        Value::Array(items) => stack.append(items),
        Value::Object(map) => stack.extend(core::mem::take(map).into_values()),
        _ => {}
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Number(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Self::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Object(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean if the value is [`Bool`].
    ///
    /// [`Bool`]: Value::Bool
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number if the value is [`Number`].
    ///
    /// [`Number`]: Value::Number
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the string if the value is [`String`].
    ///
    /// [`String`]: Value::String
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if the value is [`Array`].
    ///
    /// [`Array`]: Value::Array
    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the entries if the value is [`Object`].
    ///
    /// [`Object`]: Value::Object
    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(m) => Some(m),
            _ => None,
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        crate::writer::write_value(self, &mut crate::writer::FmtSink::new(f))
    }
}

#[cfg(test)]
mod tests {
    use super::{Map, Value};

    #[test]
    fn deep_arrays_drop_without_recursion() {
        let mut value = Value::from(0);
        for _ in 0..100_000 {
            value = Value::Array(alloc::vec![value]);
        }
        drop(value);
    }

    #[test]
    fn deep_objects_drop_without_recursion() {
        let mut value = Value::from(0);
        for _ in 0..100_000 {
            let mut map = Map::new();
            map.insert("k".into(), value);
            value = Value::Object(map);
        }
        drop(value);
    }
}
