//! Chunk-oriented JSON parsing built from four replaceable pieces: a
//! fixed-capacity look-ahead buffer, a continuation-based runtime, a value
//! factory protocol, and an incremental parser engine.
//!
//! Input arrives in chunks of any size (including one character at a time)
//! and the parse resumes exactly where it left off; output representation is
//! chosen by the [`factory`] implementation the engine is instantiated with.
//! Both parsing and serialization are stack-safe at any nesting depth.
//!
//! ```rust
//! use jsonchute::parse_document_str;
//!
//! let value = parse_document_str(r#"{"ok": [1, 2, 3]}"#).unwrap();
//! assert_eq!(value.to_string(), r#"{"ok":[1,2,3]}"#);
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod coro;
mod location;
mod value;
mod writer;

mod drive;
mod engine;
mod error;
mod factory;

#[cfg(test)]
mod tests;

pub use buffer::{ChunkSource, LookAheadBuffer, ReadOutcome, StrSource};
pub use coro::{Continuation, Flow, Op, run_to_completion};
pub use drive::{
    ParseOp, Pending, Resumed, WriteOp, parse_document, parse_document_str, parse_op,
    parse_spanned_str, parse_value_str, run_engine, validate_str, write_op,
};
pub use engine::{Engine, EngineOptions, Status};
pub use error::{NumberPart, ParseError, SyntaxError};
pub use location::Location;

pub use factory::{
    ArrayFactory, Diagnostic, FactoryBase, LiteralFactory, LiteralKind, NumberFactory,
    NumberShape, ObjectFactory, Span, SpanFactory, SpannedNode, SpannedValue, StringFactory,
    TreeError, TreeFactory, Validator, ValueFactory,
};
pub use value::{Array, Map, Number, Value};
pub use writer::{TextSink, TokenStream, write_value};
