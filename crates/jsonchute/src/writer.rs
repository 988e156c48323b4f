//! Token-at-a-time JSON serialization.
//!
//! The writer walks a [`Value`] with an explicit work stack, invoking a
//! [`TextSink`] once per structural token (bracket, comma, colon, scalar or
//! quoted string). Nesting depth therefore never grows the call stack, and
//! output can be streamed chunk by chunk. Indentation policy is deliberately
//! out of scope; the output is the canonical compact form.

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};

use crate::value::Value;

/// A capability accepting chunks of already-formatted text.
pub trait TextSink {
    /// Failure surfaced by the underlying output.
    type Error;

    /// Accepts one chunk. Called once per structural token.
    fn write(&mut self, chunk: &str) -> Result<(), Self::Error>;
}

impl TextSink for String {
    type Error = core::convert::Infallible;

    fn write(&mut self, chunk: &str) -> Result<(), Self::Error> {
        self.push_str(chunk);
        Ok(())
    }
}

pub(crate) struct FmtSink<'a, 'b> {
    f: &'a mut core::fmt::Formatter<'b>,
}

impl<'a, 'b> FmtSink<'a, 'b> {
    pub(crate) fn new(f: &'a mut core::fmt::Formatter<'b>) -> Self {
        Self { f }
    }
}

impl TextSink for FmtSink<'_, '_> {
    type Error = core::fmt::Error;

    fn write(&mut self, chunk: &str) -> Result<(), Self::Error> {
        self.f.write_str(chunk)
    }
}

/// Appends `src` to `out` with JSON string escaping applied.
///
/// Quotes, backslashes, control characters and the Unicode line separators
/// U+2028/U+2029 (which pre-2019 JavaScript parsers mishandle) become escape
/// sequences; everything else is copied verbatim.
fn escape_into(src: &str, out: &mut String) {
    let mut plain = 0;
    for (i, c) in src.char_indices() {
        let escaped = match c {
            '"' => Some("\\\"".to_string()),
            '\\' => Some("\\\\".to_string()),
            '\u{2028}' | '\u{2029}' => Some(format!("\\u{:04X}", c as u32)),
            c if c.is_ascii_control() || (c.is_control() && (c as u32) <= 0xFFFF) => {
                Some(format!("\\u{:04X}", c as u32))
            }
            _ => None,
        };
        if let Some(esc) = escaped {
            out.push_str(&src[plain..i]);
            out.push_str(&esc);
            plain = i + c.len_utf8();
        }
    }
    out.push_str(&src[plain..]);
}

fn quoted(src: &str) -> String {
    let mut out = String::with_capacity(src.len() + 2);
    out.push('"');
    escape_into(src, &mut out);
    out.push('"');
    out
}

enum Task<'a> {
    Emit(&'a Value),
    Raw(&'static str),
    Quote(&'a str),
}

/// Serializes `value` into `sink`, one call per structural token.
///
/// # Errors
///
/// Propagates the first sink failure.
pub fn write_value<S: TextSink>(value: &Value, sink: &mut S) -> Result<(), S::Error> {
    let mut stack = Vec::new();
    stack.push(Task::Emit(value));
    while let Some(task) = stack.pop() {
        match task {
            Task::Raw(text) => sink.write(text)?,
            Task::Quote(text) => sink.write(&quoted(text))?,
            Task::Emit(value) => match value {
                Value::Null => sink.write("null")?,
                Value::Bool(b) => sink.write(if *b { "true" } else { "false" })?,
                Value::Number(n) => sink.write(n.as_str())?,
                Value::String(s) => sink.write(&quoted(s))?,
                Value::Array(items) => {
                    sink.write("[")?;
                    stack.push(Task::Raw("]"));
                    for (i, item) in items.iter().enumerate().rev() {
                        stack.push(Task::Emit(item));
                        if i > 0 {
                            stack.push(Task::Raw(","));
                        }
                    }
                }
                Value::Object(map) => {
                    sink.write("{")?;
                    stack.push(Task::Raw("}"));
                    for (i, (key, entry)) in map.iter().enumerate().rev() {
                        stack.push(Task::Emit(entry));
                        stack.push(Task::Raw(":"));
                        stack.push(Task::Quote(key));
                        if i > 0 {
                            stack.push(Task::Raw(","));
                        }
                    }
                }
            },
        }
    }
    Ok(())
}

enum OwnedTask {
    Emit(Value),
    Raw(&'static str),
    Quote(String),
}

/// An owning token stream over a [`Value`], yielding one formatted chunk per
/// structural token. Backs the suspension-driven writer configuration.
pub struct TokenStream {
    stack: Vec<OwnedTask>,
}

impl TokenStream {
    /// Consumes `value`, yielding its serialized form token by token.
    #[must_use]
    pub fn new(value: Value) -> Self {
        let mut stack = Vec::new();
        stack.push(OwnedTask::Emit(value));
        Self { stack }
    }
}

impl Iterator for TokenStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let task = self.stack.pop()?;
        Some(match task {
            OwnedTask::Raw(text) => text.to_string(),
            OwnedTask::Quote(text) => quoted(&text),
            OwnedTask::Emit(mut value) => match &mut value {
                Value::Null => "null".to_string(),
                Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
                Value::Number(n) => n.as_str().to_string(),
                Value::String(s) => quoted(s),
                Value::Array(items) => {
                    let items = core::mem::take(items);
                    self.stack.push(OwnedTask::Raw("]"));
                    for (i, item) in items.into_iter().enumerate().rev() {
                        self.stack.push(OwnedTask::Emit(item));
                        if i > 0 {
                            self.stack.push(OwnedTask::Raw(","));
                        }
                    }
                    "[".to_string()
                }
                Value::Object(map) => {
                    let map = core::mem::take(map);
                    self.stack.push(OwnedTask::Raw("}"));
                    for (i, (key, entry)) in map.into_iter().enumerate().rev() {
                        self.stack.push(OwnedTask::Emit(entry));
                        self.stack.push(OwnedTask::Raw(":"));
                        self.stack.push(OwnedTask::Quote(key));
                        if i > 0 {
                            self.stack.push(OwnedTask::Raw(","));
                        }
                    }
                    "{".to_string()
                }
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::{TokenStream, write_value};
    use crate::value::{Map, Value};

    fn sample() -> Value {
        let mut map = Map::new();
        map.insert("a".into(), Value::from(1));
        map.insert("b".into(), Value::Array(alloc::vec![Value::Null, Value::Bool(true)]));
        Value::Object(map)
    }

    #[test]
    fn compact_form() {
        let mut out = String::new();
        write_value(&sample(), &mut out).unwrap();
        assert_eq!(out, r#"{"a":1,"b":[null,true]}"#);
    }

    #[test]
    fn escapes_controls_and_quotes() {
        let mut out = String::new();
        write_value(&Value::from("a\"b\\c\nd"), &mut out).unwrap();
        assert_eq!(out, "\"a\\\"b\\\\c\\u000Ad\"");
    }

    #[test]
    fn token_stream_matches_write_value() {
        let value = sample();
        let mut direct = String::new();
        write_value(&value, &mut direct).unwrap();
        let streamed: String = TokenStream::new(value).collect();
        assert_eq!(streamed, direct);
    }

    #[test]
    fn one_chunk_per_token() {
        let tokens: alloc::vec::Vec<String> = TokenStream::new(sample()).collect();
        assert_eq!(
            tokens,
            ["{", "\"a\"", ":", "1", ",", "\"b\"", ":", "[", "null", ",", "true", "]", "}"]
        );
    }

    #[test]
    fn deep_nesting_serializes_iteratively() {
        let mut value = Value::from(0);
        for _ in 0..200 {
            value = Value::Array(alloc::vec![value]);
        }
        let mut out = String::new();
        write_value(&value, &mut out).unwrap();
        assert!(out.starts_with("[[[["));
        assert!(out.ends_with("]]]]"));
    }
}
