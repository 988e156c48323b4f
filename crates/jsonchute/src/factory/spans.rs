//! Factory attributing every node with its source span.

use alloc::{collections::BTreeMap, string::String, vec::Vec};

use crate::{
    error::{NumberPart, SyntaxError},
    factory::{
        ArrayFactory, FactoryBase, LiteralFactory, LiteralKind, NumberFactory, NumberShape,
        ObjectFactory, StringFactory, TreeError,
    },
    location::Location,
    value::{Number, Value},
};

/// Half-open region of source the construct occupied: `start` points at its
/// first character, `end` just past its last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Position of the construct's first character.
    pub start: Location,
    /// Position just past the construct's last character.
    pub end: Location,
}

/// A JSON value annotated with the span it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedValue {
    /// Where in the source this value sat.
    pub span: Span,
    /// The value itself; children carry their own spans.
    pub node: SpannedNode,
}

/// Node alternatives of a [`SpannedValue`] tree.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum SpannedNode {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<SpannedValue>),
    Object(BTreeMap<String, SpannedValue>),
}

// Like `Value`, annotated trees drop through a worklist so nesting depth
// never grows the call stack.
impl Drop for SpannedNode {
    fn drop(&mut self) {
        match self {
            SpannedNode::Array(items) if !items.is_empty() => {}
            SpannedNode::Object(map) if !map.is_empty() => {}
            _ => return,
        }
        let mut stack = Vec::new();
        drain_children(self, &mut stack);
        while let Some(mut value) = stack.pop() {
            drain_children(&mut value.node, &mut stack);
        }
    }
}

fn drain_children(node: &mut SpannedNode, stack: &mut Vec<SpannedValue>) {
    match node {
        SpannedNode::Array(items) => stack.append(items),
        SpannedNode::Object(map) => stack.extend(core::mem::take(map).into_values()),
        _ => {}
    }
}

impl SpannedValue {
    /// Drops the annotations, yielding the plain value tree. Iterative, so
    /// it handles any nesting depth the parse itself handled.
    #[must_use]
    pub fn strip(&self) -> Value {
        enum Step<'a> {
            Visit(&'a SpannedValue),
            CloseArray(usize),
            CloseObject(Vec<&'a String>),
        }

        let mut work = alloc::vec![Step::Visit(self)];
        let mut built: Vec<Value> = Vec::new();
        while let Some(step) = work.pop() {
            match step {
                Step::Visit(value) => match &value.node {
                    SpannedNode::Null => built.push(Value::Null),
                    SpannedNode::Bool(b) => built.push(Value::Bool(*b)),
                    SpannedNode::Number(n) => built.push(Value::Number(n.clone())),
                    SpannedNode::String(s) => built.push(Value::String(s.clone())),
                    SpannedNode::Array(items) => {
                        work.push(Step::CloseArray(items.len()));
                        work.extend(items.iter().rev().map(Step::Visit));
                    }
                    SpannedNode::Object(map) => {
                        work.push(Step::CloseObject(map.keys().collect()));
                        work.extend(map.values().rev().map(Step::Visit));
                    }
                },
                Step::CloseArray(len) => {
                    let items = built.split_off(built.len() - len);
                    built.push(Value::Array(items));
                }
                Step::CloseObject(keys) => {
                    let values = built.split_off(built.len() - keys.len());
                    built.push(Value::Object(
                        keys.into_iter().cloned().zip(values).collect(),
                    ));
                }
            }
        }
        let Some(root) = built.pop() else {
            unreachable!("every visited node pushes exactly one value")
        };
        root
    }
}

/// Builds a [`SpannedValue`] tree, capturing the buffer location at every
/// `begin` and `end`. Error policy matches [`TreeFactory`](super::TreeFactory):
/// fail fast, duplicate keys rejected.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpanFactory;

impl FactoryBase for SpanFactory {
    type Value = SpannedValue;
    type Error = TreeError;

    fn bad_value_start(
        &mut self,
        found: Option<char>,
        _at: Location,
    ) -> Result<SpannedValue, TreeError> {
        Err(match found {
            Some(c) => SyntaxError::UnexpectedCharacter(c).into(),
            None => SyntaxError::UnexpectedEndOfInput.into(),
        })
    }

    fn trailing_data(&mut self, found: char, _at: Location) -> Result<(), TreeError> {
        Err(SyntaxError::TrailingData(found).into())
    }
}

impl LiteralFactory for SpanFactory {
    type LiteralState = Location;

    fn begin_literal(&mut self, _kind: LiteralKind, at: Location) -> Location {
        at
    }

    fn end_literal(&mut self, start: Location, kind: LiteralKind, at: Location) -> SpannedValue {
        SpannedValue {
            span: Span { start, end: at },
            node: match kind {
                LiteralKind::Null => SpannedNode::Null,
                LiteralKind::True => SpannedNode::Bool(true),
                LiteralKind::False => SpannedNode::Bool(false),
            },
        }
    }

    fn bad_literal(
        &mut self,
        _start: Location,
        kind: LiteralKind,
        expected: char,
        found: Option<char>,
        _at: Location,
    ) -> Result<SpannedValue, TreeError> {
        Err(SyntaxError::BadLiteral {
            keyword: kind.keyword(),
            expected,
            found,
        }
        .into())
    }
}

impl NumberFactory for SpanFactory {
    type NumberState = (Location, String);

    fn begin_number(&mut self, at: Location) -> (Location, String) {
        (at, String::new())
    }

    fn number_text(&mut self, state: &mut (Location, String), text: &str) {
        state.1.push_str(text);
    }

    fn end_number(
        &mut self,
        (start, text): (Location, String),
        shape: NumberShape,
        at: Location,
    ) -> SpannedValue {
        SpannedValue {
            span: Span { start, end: at },
            node: SpannedNode::Number(Number::from_lexeme(text, shape)),
        }
    }

    fn missing_digits(
        &mut self,
        _state: (Location, String),
        part: NumberPart,
        found: Option<char>,
        _at: Location,
    ) -> Result<SpannedValue, TreeError> {
        Err(SyntaxError::MissingDigits { part, found }.into())
    }

    fn leading_zero(&mut self, _at: Location) -> Result<(), TreeError> {
        Err(SyntaxError::LeadingZero.into())
    }
}

impl StringFactory for SpanFactory {
    type StringState = (Location, String);

    fn begin_string(&mut self, at: Location) -> (Location, String) {
        (at, String::new())
    }

    fn string_text(&mut self, state: &mut (Location, String), text: &str) {
        state.1.push_str(text);
    }

    fn string_char(&mut self, state: &mut (Location, String), ch: char) {
        state.1.push(ch);
    }

    fn end_string(&mut self, (start, text): (Location, String), at: Location) -> SpannedValue {
        SpannedValue {
            span: Span { start, end: at },
            node: SpannedNode::String(text),
        }
    }

    fn unterminated_string(
        &mut self,
        _state: (Location, String),
        _at: Location,
    ) -> Result<SpannedValue, TreeError> {
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

impl ArrayFactory for SpanFactory {
    type ArrayState = (Location, Vec<SpannedValue>);

    fn begin_array(&mut self, at: Location) -> (Location, Vec<SpannedValue>) {
        (at, Vec::new())
    }

    fn array_element(
        &mut self,
        mut state: (Location, Vec<SpannedValue>),
        element: SpannedValue,
    ) -> Result<((Location, Vec<SpannedValue>), bool), TreeError> {
        state.1.push(element);
        Ok((state, true))
    }

    fn end_array(
        &mut self,
        (start, items): (Location, Vec<SpannedValue>),
        at: Location,
    ) -> SpannedValue {
        SpannedValue {
            span: Span { start, end: at },
            node: SpannedNode::Array(items),
        }
    }

    fn bad_array_delimiter(
        &mut self,
        found: Option<char>,
        _at: Location,
    ) -> Result<(), TreeError> {
        Err(SyntaxError::ExpectedArrayDelimiter { found }.into())
    }
}

impl ObjectFactory for SpanFactory {
    type ObjectState = (Location, BTreeMap<String, SpannedValue>);

    fn begin_object(&mut self, at: Location) -> (Location, BTreeMap<String, SpannedValue>) {
        (at, BTreeMap::new())
    }

    fn object_entry(
        &mut self,
        mut state: (Location, BTreeMap<String, SpannedValue>),
        key: SpannedValue,
        value: SpannedValue,
    ) -> Result<((Location, BTreeMap<String, SpannedValue>), bool), TreeError> {
        let mut key = key.node;
        let SpannedNode::String(key) = &mut key else {
            // Keys come from our own string factory.
            unreachable!("object keys are strings");
        };
        let key = core::mem::take(key);
        if let Some(previous) = state.1.get(&key) {
            return Err(TreeError::DuplicateKey {
                previous: previous.strip(),
                key,
            });
        }
        state.1.insert(key, value);
        Ok((state, true))
    }

    fn end_object(
        &mut self,
        (start, map): (Location, BTreeMap<String, SpannedValue>),
        at: Location,
    ) -> SpannedValue {
        SpannedValue {
            span: Span { start, end: at },
            node: SpannedNode::Object(map),
        }
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
