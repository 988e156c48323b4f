//! The value factory protocol.
//!
//! The engine recognizes grammar; factories build (or discard) output. Each
//! grammar construct has its own capability trait with `begin`/`update`/`end`
//! operations plus construct-specific error callbacks, so a deployment picks
//! an output representation by supplying one concrete implementation —
//! parser and buffer code never change.
//!
//! Error callbacks follow one convention: returning `Err` aborts the parse
//! with that error; returning `Ok` means "continue best-effort" with the
//! documented fallback. The engine itself never panics on malformed input.
//!
//! Shipped implementations:
//! - [`TreeFactory`] builds a plain [`Value`](crate::Value) tree, fail-fast.
//! - [`SpanFactory`] builds a [`SpannedValue`] tree annotating every node
//!   with its source span.
//! - [`Validator`] discards values and collects every diagnostic.

mod spans;
mod tree;
mod validate;

pub use spans::{Span, SpanFactory, SpannedNode, SpannedValue};
pub use tree::{TreeError, TreeFactory};
pub use validate::{Diagnostic, Validator};

use crate::{error::NumberPart, location::Location};

/// The three JSON keyword literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Null,
    True,
    False,
}

impl LiteralKind {
    /// The keyword's source text.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            LiteralKind::Null => "null",
            LiteralKind::True => "true",
            LiteralKind::False => "false",
        }
    }

    pub(crate) fn from_first_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(LiteralKind::Null),
            't' => Some(LiteralKind::True),
            'f' => Some(LiteralKind::False),
            _ => None,
        }
    }
}

/// Lexical hint passed at the end of a number: whether the lexeme carried a
/// fraction or exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberShape {
    Integer,
    Float,
}

/// Output and failure types shared by all construct factories, plus the
/// callbacks that belong to no single construct.
pub trait FactoryBase {
    /// The constructed output representation.
    type Value;
    /// The abort representation chosen by this factory.
    type Error: core::error::Error + 'static;

    /// A value was expected but `found` appeared instead (`None` at end of
    /// input). `Ok` supplies a substitute value the parse continues with; the
    /// offending character, if any, is consumed.
    fn bad_value_start(
        &mut self,
        found: Option<char>,
        at: Location,
    ) -> Result<Self::Value, Self::Error>;

    /// Non-whitespace input after the top-level value in document mode. `Ok`
    /// skips the character and keeps scanning.
    fn trailing_data(&mut self, found: char, at: Location) -> Result<(), Self::Error>;
}

/// Factory capability for `true`/`false`/`null`.
pub trait LiteralFactory: FactoryBase {
    /// In-flight accumulator for one literal.
    type LiteralState;

    /// Called at the keyword's first character.
    fn begin_literal(&mut self, kind: LiteralKind, at: Location) -> Self::LiteralState;

    /// Called after the keyword's last character; `at` is the position just
    /// past it.
    fn end_literal(
        &mut self,
        state: Self::LiteralState,
        kind: LiteralKind,
        at: Location,
    ) -> Self::Value;

    /// A keyword character mismatched (`found` is `None` at end of input);
    /// `at` is the offending offset. `Ok` substitutes a value; the offending
    /// character is not consumed.
    fn bad_literal(
        &mut self,
        state: Self::LiteralState,
        kind: LiteralKind,
        expected: char,
        found: Option<char>,
        at: Location,
    ) -> Result<Self::Value, Self::Error>;
}

/// Factory capability for numbers. The engine feeds the raw lexeme text; no
/// numeric conversion happens here.
pub trait NumberFactory: FactoryBase {
    /// In-flight accumulator for one number.
    type NumberState;

    /// Called at the first character of the lexeme (sign or digit).
    fn begin_number(&mut self, at: Location) -> Self::NumberState;

    /// Appends a run of lexeme characters (digits, sign, `.`, `e`). May be
    /// called many times for one number when input arrives in chunks.
    fn number_text(&mut self, state: &mut Self::NumberState, text: &str);

    /// Called just past the lexeme's last character.
    fn end_number(
        &mut self,
        state: Self::NumberState,
        shape: NumberShape,
        at: Location,
    ) -> Self::Value;

    /// A digit group had no digits: after a sign, a decimal point, or an
    /// exponent marker. `Ok` substitutes a value; `found` is not consumed.
    fn missing_digits(
        &mut self,
        state: Self::NumberState,
        part: NumberPart,
        found: Option<char>,
        at: Location,
    ) -> Result<Self::Value, Self::Error>;

    /// A leading zero was followed by another digit. `Ok` keeps accumulating
    /// the remaining digits anyway.
    fn leading_zero(&mut self, at: Location) -> Result<(), Self::Error>;
}

/// Factory capability for strings.
pub trait StringFactory: FactoryBase {
    /// In-flight accumulator for one string.
    type StringState;

    /// Called at the opening quote.
    fn begin_string(&mut self, at: Location) -> Self::StringState;

    /// Appends a literal run of source characters (no escapes).
    fn string_text(&mut self, state: &mut Self::StringState, text: &str);

    /// Appends one decoded escape character.
    fn string_char(&mut self, state: &mut Self::StringState, ch: char);

    /// Called just past the closing quote.
    fn end_string(&mut self, state: Self::StringState, at: Location) -> Self::Value;

    /// Input ended before the closing quote. `Ok` substitutes a value for
    /// the partial string.
    fn unterminated_string(
        &mut self,
        state: Self::StringState,
        at: Location,
    ) -> Result<Self::Value, Self::Error>;

    /// An unescaped control character appeared. `Ok` keeps it verbatim.
    fn bad_char(&mut self, found: char, at: Location) -> Result<(), Self::Error>;

    /// An unknown escape letter followed a backslash. `Ok` keeps the letter
    /// verbatim.
    fn bad_escape(&mut self, found: char, at: Location) -> Result<(), Self::Error>;

    /// A `\uXXXX` escape broke off: `valid` holds exactly the hex digits
    /// already consumed (0 to 3 of them) and `found` is the offending
    /// character, which is not consumed. `Ok` substitutes U+FFFD for the
    /// escape.
    fn bad_unicode_escape(
        &mut self,
        valid: &str,
        found: char,
        at: Location,
    ) -> Result<(), Self::Error>;

    /// A complete `\uXXXX` (or surrogate pair half) decoded to something that
    /// is not a Unicode scalar value. `Ok` substitutes U+FFFD.
    fn bad_unicode_scalar(&mut self, code: u32, at: Location) -> Result<(), Self::Error>;
}

/// Factory capability for arrays.
pub trait ArrayFactory: FactoryBase {
    /// In-flight accumulator for one array.
    type ArrayState;

    /// Called at the opening bracket.
    fn begin_array(&mut self, at: Location) -> Self::ArrayState;

    /// Folds one element into the accumulator. The returned flag asks the
    /// engine to keep folding; on `false`, later elements are still parsed
    /// but dropped.
    fn array_element(
        &mut self,
        state: Self::ArrayState,
        element: Self::Value,
    ) -> Result<(Self::ArrayState, bool), Self::Error>;

    /// Called just past the closing bracket.
    fn end_array(&mut self, state: Self::ArrayState, at: Location) -> Self::Value;

    /// Expected `,` or `]` but `found` appeared (`None` at end of input).
    /// `Ok` recovers: a character is treated as if a comma preceded it; end
    /// of input closes the array.
    fn bad_array_delimiter(&mut self, found: Option<char>, at: Location)
    -> Result<(), Self::Error>;
}

/// Factory capability for objects.
///
/// The engine hands over key/value pairs in source order and performs no
/// deduplication; duplicate-key policy lives in implementations.
pub trait ObjectFactory: FactoryBase {
    /// In-flight accumulator for one object.
    type ObjectState;

    /// Called at the opening brace.
    fn begin_object(&mut self, at: Location) -> Self::ObjectState;

    /// Folds one `key: value` entry into the accumulator. Keys are built by
    /// the string factory, so `key` is whatever this factory's strings
    /// produce. The flag behaves as in
    /// [`ArrayFactory::array_element`].
    fn object_entry(
        &mut self,
        state: Self::ObjectState,
        key: Self::Value,
        value: Self::Value,
    ) -> Result<(Self::ObjectState, bool), Self::Error>;

    /// Called just past the closing brace.
    fn end_object(&mut self, state: Self::ObjectState, at: Location) -> Self::Value;

    /// Expected `"` to begin a key. `Ok` recovers: a `}` (or end of input)
    /// closes the object; any other character is skipped and the search for
    /// a key continues.
    fn bad_key_start(&mut self, found: Option<char>, at: Location) -> Result<(), Self::Error>;

    /// Expected `:` after a key. `Ok` recovers by assuming the separator was
    /// present; `found` is not consumed.
    fn bad_entry_separator(
        &mut self,
        found: Option<char>,
        at: Location,
    ) -> Result<(), Self::Error>;

    /// Expected `,` or `}`. Recovery as in
    /// [`ArrayFactory::bad_array_delimiter`].
    fn bad_object_delimiter(
        &mut self,
        found: Option<char>,
        at: Location,
    ) -> Result<(), Self::Error>;
}

/// The full capability set the engine parses against.
pub trait ValueFactory:
    LiteralFactory + NumberFactory + StringFactory + ArrayFactory + ObjectFactory
{
}

impl<T> ValueFactory for T where
    T: LiteralFactory + NumberFactory + StringFactory + ArrayFactory + ObjectFactory
{
}
