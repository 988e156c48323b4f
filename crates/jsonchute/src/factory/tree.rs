//! Fail-fast factory building a plain [`Value`] tree.

use alloc::string::String;

use thiserror::Error;

use crate::{
    error::{NumberPart, SyntaxError},
    factory::{
        ArrayFactory, FactoryBase, LiteralFactory, LiteralKind, NumberFactory, NumberShape,
        ObjectFactory, StringFactory,
    },
    location::Location,
    value::{Array, Map, Number, Value},
};

/// Failure surface of [`TreeFactory`].
#[derive(Error, Debug, PartialEq)]
pub enum TreeError {
    /// Malformed input, aborted at the first occurrence.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// An object key appeared twice; carries the first entry's value.
    #[error("duplicate object key \"{key}\" (previous value: {previous})")]
    DuplicateKey {
        /// The repeated key.
        key: String,
        /// The value the first occurrence produced.
        previous: Value,
    },
}

/// Builds a plain [`Value`] tree and aborts on the first malformed input.
///
/// Duplicate object keys are rejected; the error carries the previous
/// entry's value so callers can render a precise message.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeFactory;

impl FactoryBase for TreeFactory {
    type Value = Value;
    type Error = TreeError;

    fn bad_value_start(
        &mut self,
        found: Option<char>,
        _at: Location,
    ) -> Result<Value, TreeError> {
        Err(match found {
            Some(c) => SyntaxError::UnexpectedCharacter(c).into(),
            None => SyntaxError::UnexpectedEndOfInput.into(),
        })
    }

    fn trailing_data(&mut self, found: char, _at: Location) -> Result<(), TreeError> {
        Err(SyntaxError::TrailingData(found).into())
    }
}

impl LiteralFactory for TreeFactory {
    type LiteralState = ();

    fn begin_literal(&mut self, _kind: LiteralKind, _at: Location) {}

    fn end_literal(&mut self, (): (), kind: LiteralKind, _at: Location) -> Value {
        match kind {
            LiteralKind::Null => Value::Null,
            LiteralKind::True => Value::Bool(true),
            LiteralKind::False => Value::Bool(false),
        }
    }

    fn bad_literal(
        &mut self,
        (): (),
        kind: LiteralKind,
        expected: char,
        found: Option<char>,
        _at: Location,
    ) -> Result<Value, TreeError> {
        Err(SyntaxError::BadLiteral {
            keyword: kind.keyword(),
            expected,
            found,
        }
        .into())
    }
}

impl NumberFactory for TreeFactory {
    type NumberState = String;

    fn begin_number(&mut self, _at: Location) -> String {
        String::new()
    }

    fn number_text(&mut self, state: &mut String, text: &str) {
        state.push_str(text);
    }

    fn end_number(&mut self, state: String, shape: NumberShape, _at: Location) -> Value {
        Value::Number(Number::from_lexeme(state, shape))
    }

    fn missing_digits(
        &mut self,
        _state: String,
        part: NumberPart,
        found: Option<char>,
        _at: Location,
    ) -> Result<Value, TreeError> {
        Err(SyntaxError::MissingDigits { part, found }.into())
    }

    fn leading_zero(&mut self, _at: Location) -> Result<(), TreeError> {
        Err(SyntaxError::LeadingZero.into())
    }
}

impl StringFactory for TreeFactory {
    type StringState = String;

    fn begin_string(&mut self, _at: Location) -> String {
        String::new()
    }

    fn string_text(&mut self, state: &mut String, text: &str) {
        state.push_str(text);
    }

    fn string_char(&mut self, state: &mut String, ch: char) {
        state.push(ch);
    }

    fn end_string(&mut self, state: String, _at: Location) -> Value {
        Value::String(state)
    }

    fn unterminated_string(&mut self, _state: String, _at: Location) -> Result<Value, TreeError> {
        Err(SyntaxError::UnterminatedString.into())
    }

    fn bad_char(&mut self, found: char, _at: Location) -> Result<(), TreeError> {
        Err(SyntaxError::ControlCharacter(found).into())
    }

    fn bad_escape(&mut self, found: char, _at: Location) -> Result<(), TreeError> {
        Err(SyntaxError::BadEscape(found).into())
    }

    fn bad_unicode_escape(
        &mut self,
        valid: &str,
        found: char,
        _at: Location,
    ) -> Result<(), TreeError> {
        Err(SyntaxError::BadUnicodeEscape {
            valid: valid.into(),
            found,
        }
        .into())
    }

    fn bad_unicode_scalar(&mut self, code: u32, _at: Location) -> Result<(), TreeError> {
        Err(SyntaxError::InvalidUnicodeScalar(code).into())
    }
}

impl ArrayFactory for TreeFactory {
    type ArrayState = Array;

    fn begin_array(&mut self, _at: Location) -> Array {
        Array::new()
    }

    fn array_element(&mut self, mut state: Array, element: Value) -> Result<(Array, bool), TreeError> {
        state.push(element);
        Ok((state, true))
    }

    fn end_array(&mut self, state: Array, _at: Location) -> Value {
        Value::Array(state)
    }

    fn bad_array_delimiter(
        &mut self,
        found: Option<char>,
        _at: Location,
    ) -> Result<(), TreeError> {
        Err(SyntaxError::ExpectedArrayDelimiter { found }.into())
    }
}

impl ObjectFactory for TreeFactory {
    type ObjectState = Map;

    fn begin_object(&mut self, _at: Location) -> Map {
        Map::new()
    }

    fn object_entry(
        &mut self,
        mut state: Map,
        mut key: Value,
        value: Value,
    ) -> Result<(Map, bool), TreeError> {
        let Value::String(key) = &mut key else {
            // Keys come from our own string factory.
            unreachable!("object keys are strings");
        };
        let key = core::mem::take(key);
        if let Some(previous) = state.get(&key) {
            return Err(TreeError::DuplicateKey {
                previous: previous.clone(),
                key,
            });
        }
        state.insert(key, value);
        Ok((state, true))
    }

    fn end_object(&mut self, state: Map, _at: Location) -> Value {
        Value::Object(state)
    }

    fn bad_key_start(&mut self, found: Option<char>, _at: Location) -> Result<(), TreeError> {
        Err(SyntaxError::ExpectedKey { found }.into())
    }

    fn bad_entry_separator(
        &mut self,
        found: Option<char>,
        _at: Location,
    ) -> Result<(), TreeError> {
        Err(SyntaxError::ExpectedEntrySeparator { found }.into())
    }

    fn bad_object_delimiter(
        &mut self,
        found: Option<char>,
        _at: Location,
    ) -> Result<(), TreeError> {
        Err(SyntaxError::ExpectedObjectDelimiter { found }.into())
    }
}
