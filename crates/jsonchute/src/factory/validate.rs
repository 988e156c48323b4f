//! Validating factory: builds nothing, collects every diagnostic.

use alloc::vec::Vec;
use core::convert::Infallible;

use crate::{
    error::{NumberPart, SyntaxError},
    factory::{
        ArrayFactory, FactoryBase, LiteralFactory, LiteralKind, NumberFactory, NumberShape,
        ObjectFactory, StringFactory,
    },
    location::Location,
};

/// One recorded malformed-input occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What was malformed.
    pub error: SyntaxError,
    /// 1-based line of the occurrence.
    pub line: usize,
    /// 1-based column of the occurrence.
    pub column: usize,
}

impl core::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} at {}:{}", self.error, self.line, self.column)
    }
}

/// A no-op factory used for conformance checks: every value is discarded,
/// every error callback records a [`Diagnostic`] and continues with the
/// documented fallback. Its error type is uninhabited, so a validating parse
/// can never abort.
#[derive(Debug, Default)]
pub struct Validator {
    diagnostics: Vec<Diagnostic>,
}

impl Validator {
    /// A fresh validator with no recorded diagnostics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics recorded so far, in source order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// `true` when no malformed input was seen.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Consumes the validator, yielding its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn record(&mut self, error: SyntaxError, at: Location) {
        self.diagnostics.push(Diagnostic {
            error,
            line: at.line,
            column: at.column,
        });
    }
}

impl FactoryBase for Validator {
    type Value = ();
    type Error = Infallible;

    fn bad_value_start(&mut self, found: Option<char>, at: Location) -> Result<(), Infallible> {
        self.record(
            match found {
                Some(c) => SyntaxError::UnexpectedCharacter(c),
                None => SyntaxError::UnexpectedEndOfInput,
            },
            at,
        );
        Ok(())
    }

    fn trailing_data(&mut self, found: char, at: Location) -> Result<(), Infallible> {
        self.record(SyntaxError::TrailingData(found), at);
        Ok(())
    }
}

impl LiteralFactory for Validator {
    type LiteralState = ();

    fn begin_literal(&mut self, _kind: LiteralKind, _at: Location) {}

    fn end_literal(&mut self, (): (), _kind: LiteralKind, _at: Location) {}

    fn bad_literal(
        &mut self,
        (): (),
        kind: LiteralKind,
        expected: char,
        found: Option<char>,
        at: Location,
    ) -> Result<(), Infallible> {
        self.record(
            SyntaxError::BadLiteral {
                keyword: kind.keyword(),
                expected,
                found,
            },
            at,
        );
        Ok(())
    }
}

impl NumberFactory for Validator {
    type NumberState = ();

    fn begin_number(&mut self, _at: Location) {}

    fn number_text(&mut self, (): &mut (), _text: &str) {}

    fn end_number(&mut self, (): (), _shape: NumberShape, _at: Location) {}

    fn missing_digits(
        &mut self,
        (): (),
        part: NumberPart,
        found: Option<char>,
        at: Location,
    ) -> Result<(), Infallible> {
        self.record(SyntaxError::MissingDigits { part, found }, at);
        Ok(())
    }

    fn leading_zero(&mut self, at: Location) -> Result<(), Infallible> {
        self.record(SyntaxError::LeadingZero, at);
        Ok(())
    }
}

impl StringFactory for Validator {
    type StringState = ();

    fn begin_string(&mut self, _at: Location) {}

    fn string_text(&mut self, (): &mut (), _text: &str) {}

    fn string_char(&mut self, (): &mut (), _ch: char) {}

    fn end_string(&mut self, (): (), _at: Location) {}

    fn unterminated_string(&mut self, (): (), at: Location) -> Result<(), Infallible> {
        self.record(SyntaxError::UnterminatedString, at);
        Ok(())
    }

    fn bad_char(&mut self, found: char, at: Location) -> Result<(), Infallible> {
        self.record(SyntaxError::ControlCharacter(found), at);
        Ok(())
    }

    fn bad_escape(&mut self, found: char, at: Location) -> Result<(), Infallible> {
        self.record(SyntaxError::BadEscape(found), at);
        Ok(())
    }

    fn bad_unicode_escape(
        &mut self,
        valid: &str,
        found: char,
        at: Location,
    ) -> Result<(), Infallible> {
        self.record(
            SyntaxError::BadUnicodeEscape {
                valid: valid.into(),
                found,
            },
            at,
        );
        Ok(())
    }

    fn bad_unicode_scalar(&mut self, code: u32, at: Location) -> Result<(), Infallible> {
        self.record(SyntaxError::InvalidUnicodeScalar(code), at);
        Ok(())
    }
}

impl ArrayFactory for Validator {
    type ArrayState = ();

    fn begin_array(&mut self, _at: Location) {}

    fn array_element(&mut self, (): (), (): ()) -> Result<((), bool), Infallible> {
        Ok(((), true))
    }

    fn end_array(&mut self, (): (), _at: Location) {}

    fn bad_array_delimiter(
        &mut self,
        found: Option<char>,
        at: Location,
    ) -> Result<(), Infallible> {
        self.record(SyntaxError::ExpectedArrayDelimiter { found }, at);
        Ok(())
    }
}

impl ObjectFactory for Validator {
    type ObjectState = ();

    fn begin_object(&mut self, _at: Location) {}

    fn object_entry(&mut self, (): (), (): (), (): ()) -> Result<((), bool), Infallible> {
        Ok(((), true))
    }

    fn end_object(&mut self, (): (), _at: Location) {}

    fn bad_key_start(&mut self, found: Option<char>, at: Location) -> Result<(), Infallible> {
        self.record(SyntaxError::ExpectedKey { found }, at);
        Ok(())
    }

    fn bad_entry_separator(
        &mut self,
        found: Option<char>,
        at: Location,
    ) -> Result<(), Infallible> {
        self.record(SyntaxError::ExpectedEntrySeparator { found }, at);
        Ok(())
    }

    fn bad_object_delimiter(
        &mut self,
        found: Option<char>,
        at: Location,
    ) -> Result<(), Infallible> {
        self.record(SyntaxError::ExpectedObjectDelimiter { found }, at);
        Ok(())
    }
}
