//! Suspension-driven configurations and synchronous entry points.
//!
//! [`parse_op`] and [`write_op`] package the engine and the writer as
//! [`Op`] computations: progress happens in pure steps, and every input
//! request or output flush surfaces as a [`Pending`] suspension the driver
//! satisfies with a [`Resumed`] result. A driver can therefore thread I/O
//! however it likes (blocking, polled, scripted in tests) through one flat
//! [`run_to_completion`] loop.
//!
//! The `*_str` functions are the plain synchronous surface for callers with
//! the whole document in memory.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use crate::{
    buffer::{ChunkSource, StrSource},
    coro::Op,
    engine::{Engine, EngineOptions, Status},
    error::ParseError,
    factory::{
        Diagnostic, FactoryBase, SpanFactory, SpannedValue, TreeError, TreeFactory, Validator,
        ValueFactory,
    },
    value::Value,
    writer::TokenStream,
};

/// An effect a suspended parse or write is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    /// The parse needs more input.
    MoreInput {
        /// Minimum characters required to guarantee progress.
        min: usize,
        /// How many characters the engine can accept right now.
        room: usize,
    },
    /// The write produced one token of output to deliver.
    Flush(String),
    /// The parse failed; the rendered message is delivered before the
    /// operation finishes with the underlying error.
    Fail(String),
}

/// The driver's answer to a [`Pending`] effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resumed {
    /// A chunk of input text. Characters beyond the engine's free space are
    /// held and replayed, so chunks may be any size.
    Chunk(String),
    /// The input stream has ended.
    End,
    /// Acknowledges a [`Pending::Flush`] or [`Pending::Fail`].
    Done,
}

/// A suspendable parse yielding the factory's value or the parse error.
pub type ParseOp<F> =
    Op<Pending, Resumed, Result<<F as FactoryBase>::Value, ParseError<<F as FactoryBase>::Error>>>;

/// A suspendable write; every token surfaces as a [`Pending::Flush`].
pub type WriteOp = Op<Pending, Resumed, ()>;

/// Packages `engine` as a suspendable computation. Each exhausted buffer
/// becomes a [`Pending::MoreInput`] suspension; a failure is announced with
/// [`Pending::Fail`] before the operation finishes with `Err`.
pub fn parse_op<F>(engine: Engine<F>) -> ParseOp<F>
where
    F: ValueFactory + 'static,
    F::Value: 'static,
    F::LiteralState: 'static,
    F::NumberState: 'static,
    F::StringState: 'static,
    F::ArrayState: 'static,
    F::ObjectState: 'static,
{
    drive_parse(engine, String::new())
}

fn drive_parse<F>(mut engine: Engine<F>, mut carry: String) -> ParseOp<F>
where
    F: ValueFactory + 'static,
    F::Value: 'static,
    F::LiteralState: 'static,
    F::NumberState: 'static,
    F::StringState: 'static,
    F::ArrayState: 'static,
    F::ObjectState: 'static,
{
    loop {
        if !carry.is_empty() {
            let accepted = engine.push_chunk(&carry);
            let bytes: usize = carry.chars().take(accepted).map(char::len_utf8).sum();
            carry.drain(..bytes);
        }
        match engine.step() {
            Status::Done(value) => return Op::done(Ok(value)),
            Status::Failed(error) => {
                let message = error.to_string();
                return Op::suspend(Pending::Fail(message), move |_| Op::done(Err(error)));
            }
            Status::NeedInput { min, room } => {
                // Replay held-back input before asking the driver again.
                if !carry.is_empty() {
                    continue;
                }
                return Op::suspend(Pending::MoreInput { min, room }, move |resumed| {
                    match resumed {
                        Resumed::Chunk(text) => drive_parse(engine, text),
                        Resumed::End | Resumed::Done => {
                            engine.close();
                            drive_parse(engine, String::new())
                        }
                    }
                });
            }
        }
    }
}

/// Packages the serialization of `value` as a suspendable computation that
/// yields one [`Pending::Flush`] per structural token.
#[must_use]
pub fn write_op(value: Value) -> WriteOp {
    emit(TokenStream::new(value))
}

fn emit(mut tokens: TokenStream) -> WriteOp {
    match tokens.next() {
        Some(token) => Op::suspend(Pending::Flush(token), move |_| emit(tokens)),
        None => Op::done(()),
    }
}

/// Drives `engine` to completion, pulling input from `source` whenever the
/// buffer runs dry.
///
/// # Errors
///
/// Returns the parse error when a factory callback aborts.
pub fn run_engine<F: ValueFactory>(
    engine: &mut Engine<F>,
    source: &mut dyn ChunkSource,
) -> Result<F::Value, ParseError<F::Error>> {
    loop {
        match engine.step() {
            Status::Done(value) => return Ok(value),
            Status::Failed(error) => return Err(error),
            Status::NeedInput { .. } => {
                engine.fill_from(source);
            }
        }
    }
}

/// Parses one document from `source`, building output with `factory`.
///
/// # Errors
///
/// Returns the parse error when a factory callback aborts.
pub fn parse_document<F: ValueFactory>(
    source: &mut dyn ChunkSource,
    factory: F,
    options: EngineOptions,
) -> Result<F::Value, ParseError<F::Error>> {
    let mut engine = Engine::new(factory, options);
    run_engine(&mut engine, source)
}

/// Parses `text` as one JSON document (only whitespace may follow the value).
///
/// # Errors
///
/// Returns the first syntax or duplicate-key error.
pub fn parse_document_str(text: &str) -> Result<Value, ParseError<TreeError>> {
    parse_document(
        &mut StrSource::new(text),
        TreeFactory,
        EngineOptions::default(),
    )
}

/// Parses one JSON value from the front of `text`, stopping right after its
/// last character.
///
/// # Errors
///
/// Returns the first syntax or duplicate-key error.
pub fn parse_value_str(text: &str) -> Result<Value, ParseError<TreeError>> {
    parse_document(
        &mut StrSource::new(text),
        TreeFactory,
        EngineOptions {
            document: false,
            ..EngineOptions::default()
        },
    )
}

/// Parses `text` as one JSON document into a span-annotated tree.
///
/// # Errors
///
/// Returns the first syntax or duplicate-key error.
pub fn parse_spanned_str(text: &str) -> Result<SpannedValue, ParseError<TreeError>> {
    parse_document(
        &mut StrSource::new(text),
        SpanFactory,
        EngineOptions::default(),
    )
}

/// Checks `text` for conformance, returning every diagnostic in source
/// order. An empty result means the document is well-formed.
#[must_use]
pub fn validate_str(text: &str) -> Vec<Diagnostic> {
    let mut engine = Engine::new(Validator::new(), EngineOptions::default());
    match run_engine(&mut engine, &mut StrSource::new(text)) {
        Ok(()) => engine.into_factory().into_diagnostics(),
        Err(error) => match error.source {},
    }
}
