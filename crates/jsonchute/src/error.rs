//! Error types for the parsing engine.

use alloc::string::String;

use thiserror::Error;

/// Which digit group of a number lexeme was malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberPart {
    Integer,
    Fraction,
    Exponent,
}

impl core::fmt::Display for NumberPart {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            NumberPart::Integer => "integer part",
            NumberPart::Fraction => "fraction",
            NumberPart::Exponent => "exponent",
        })
    }
}

/// Every malformed-input class the engine can report.
///
/// The engine never surfaces these directly; it routes each through the
/// matching factory callback, which decides whether to abort with the error
/// or continue with a fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("invalid literal: expected '{expected}' of \"{keyword}\", found {found:?}")]
    BadLiteral {
        keyword: &'static str,
        expected: char,
        found: Option<char>,
    },
    #[error("missing digits in number {part}, found {found:?}")]
    MissingDigits {
        part: NumberPart,
        found: Option<char>,
    },
    #[error("leading zero in number")]
    LeadingZero,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("control character {0:?} in string")]
    ControlCharacter(char),
    #[error("invalid escape character '{0}'")]
    BadEscape(char),
    #[error("invalid unicode escape: \"\\u{valid}\" followed by '{found}'")]
    BadUnicodeEscape { valid: String, found: char },
    #[error("invalid unicode escape sequence \\u{0:04X}")]
    InvalidUnicodeScalar(u32),
    #[error("expected ',' or ']' in array, found {found:?}")]
    ExpectedArrayDelimiter { found: Option<char> },
    #[error("expected '\"' to begin an object key, found {found:?}")]
    ExpectedKey { found: Option<char> },
    #[error("expected ':' after object key, found {found:?}")]
    ExpectedEntrySeparator { found: Option<char> },
    #[error("expected ',' or '}}' in object, found {found:?}")]
    ExpectedObjectDelimiter { found: Option<char> },
    #[error("unexpected trailing character '{0}'")]
    TrailingData(char),
}

/// A terminal parse failure: the factory's error, stamped with the line and
/// column the engine had reached.
#[derive(Error, Debug, PartialEq)]
#[error("{source} at {line}:{column}")]
pub struct ParseError<E>
where
    E: core::error::Error + 'static,
{
    /// The factory-chosen failure value.
    pub source: E,
    /// 1-based line of the failure.
    pub line: usize,
    /// 1-based column of the failure.
    pub column: usize,
}
