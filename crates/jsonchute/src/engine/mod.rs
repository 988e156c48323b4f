//! Incremental parser engine.
//!
//! The engine is a resumable recognizer for the JSON grammar. It consumes
//! characters from the [`LookAheadBuffer`] and delegates every semantic
//! action to a [`ValueFactory`]; it never constructs values itself. Calling
//! [`Engine::step`] makes all progress the buffered input allows, then
//! reports one of three outcomes: the parse finished, the parse failed (a
//! factory callback aborted), or more input is required.
//!
//! Two pieces of state make resumption cheap:
//! - `mode` holds the in-flight construct (including mid-string and
//!   mid-number positions), so a chunk boundary can fall anywhere, and
//! - `frames` is an explicit stack of open containers, so nesting depth
//!   never consumes call stack.
//!
//! Malformed input is routed through the factory's error callbacks; an `Ok`
//! return continues best-effort with the documented fallback, an `Err`
//! terminates the parse. The engine itself panics only on caller contract
//! violations.

mod escape;
mod literal;

use alloc::{string::String, vec::Vec};
use core::mem;

use escape::{EscapeDecoder, EscapeError, EscapeStep};
use literal::{LiteralMatcher, LiteralStep};

use crate::{
    buffer::{ChunkSource, LookAheadBuffer},
    error::{NumberPart, ParseError},
    factory::{LiteralKind, NumberShape, ValueFactory},
    location::Location,
};

/// Configuration for one [`Engine`].
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Look-ahead buffer capacity in characters.
    pub capacity: usize,
    /// In document mode the engine demands that only whitespace follows the
    /// top-level value; otherwise it stops exactly after the value's last
    /// character.
    pub document: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            capacity: 4096,
            document: true,
        }
    }
}

/// Outcome of one [`Engine::step`] call.
pub enum Status<F: ValueFactory> {
    /// The buffered input is exhausted and the stream is still open. `room`
    /// is how many characters the buffer can accept right now.
    NeedInput {
        /// Minimum characters needed to guarantee progress.
        min: usize,
        /// Free buffer space.
        room: usize,
    },
    /// The parse finished with the factory's constructed value.
    Done(F::Value),
    /// A factory callback aborted the parse.
    Failed(ParseError<F::Error>),
}

enum Frame<F: ValueFactory> {
    Array {
        state: Option<F::ArrayState>,
        any: bool,
        live: bool,
    },
    Object {
        state: Option<F::ObjectState>,
        key: Option<F::Value>,
        any: bool,
        live: bool,
    },
}

enum NumberPhase {
    IntFirst,
    AfterZero,
    IntDigits,
    FracFirst,
    FracDigits,
    ExpMark,
    ExpSign,
    ExpDigits,
}

enum StrPhase {
    Run,
    Escape,
    Unicode(EscapeDecoder),
}

enum Mode<F: ValueFactory> {
    Value,
    Literal {
        state: F::LiteralState,
        kind: LiteralKind,
        matcher: LiteralMatcher,
    },
    Number {
        state: F::NumberState,
        phase: NumberPhase,
        shape: NumberShape,
    },
    Str {
        state: F::StringState,
        phase: StrPhase,
        key: bool,
    },
    Key,
    Colon,
    ArrayDelim,
    ObjectDelim,
    Trailing {
        value: F::Value,
    },
    Finished,
    Failed,
}

enum Peek {
    Char(char),
    Eos,
    Starved,
}

fn is_json_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// The incremental parser engine. See the module docs.
pub struct Engine<F: ValueFactory> {
    factory: F,
    buffer: LookAheadBuffer,
    frames: Vec<Frame<F>>,
    mode: Mode<F>,
    document: bool,
    scratch: String,
}

impl<F: ValueFactory> Engine<F> {
    /// Creates an engine parsing one JSON value (or document) with the given
    /// factory.
    #[must_use]
    pub fn new(factory: F, options: EngineOptions) -> Self {
        Self {
            factory,
            buffer: LookAheadBuffer::with_capacity(options.capacity),
            frames: Vec::new(),
            mode: Mode::Value,
            document: options.document,
            scratch: String::new(),
        }
    }

    /// Offers a chunk of input, returning how many characters were accepted.
    /// Characters past the buffer's free space must be re-offered later.
    pub fn push_chunk(&mut self, text: &str) -> usize {
        self.buffer.push_chunk(text)
    }

    /// Signals end of input. Idempotent.
    pub fn close(&mut self) {
        self.buffer.close();
    }

    /// Performs one compacting fill from `source`, closing the stream when
    /// the source is exhausted. Returns how many characters arrived.
    pub fn fill_from(&mut self, source: &mut dyn ChunkSource) -> usize {
        self.buffer.fill_once(source)
    }

    /// The position of the next unconsumed character.
    #[must_use]
    pub fn location(&self) -> Location {
        self.buffer.location()
    }

    /// The factory driving this parse.
    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Consumes the engine, handing the factory back (for factories that
    /// accumulate, like [`Validator`](crate::Validator)).
    #[must_use]
    pub fn into_factory(self) -> F {
        self.factory
    }

    fn peek(&self) -> Peek {
        match self.buffer.look_ahead(0) {
            Some(c) => Peek::Char(c),
            None if self.buffer.is_closed() => Peek::Eos,
            None => Peek::Starved,
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.buffer.look_ahead(0) {
            if !is_json_ws(c) {
                break;
            }
            self.buffer.skip(1);
        }
    }

    fn starve(&self) -> Status<F> {
        Status::NeedInput {
            min: 1,
            room: self.buffer.free(),
        }
    }

    fn fail(&mut self, source: F::Error) -> Status<F> {
        self.mode = Mode::Failed;
        let at = self.buffer.location();
        Status::Failed(ParseError {
            source,
            line: at.line,
            column: at.column,
        })
    }

    /// Folds a completed value into the enclosing construct, or finishes the
    /// parse when it was the top-level value.
    fn finish_value(&mut self, value: F::Value) -> Result<Option<F::Value>, F::Error> {
        match self.frames.last_mut() {
            None => {
                if self.document {
                    self.mode = Mode::Trailing { value };
                    Ok(None)
                } else {
                    self.mode = Mode::Finished;
                    Ok(Some(value))
                }
            }
            Some(Frame::Array { state, any, live }) => {
                *any = true;
                if *live {
                    let Some(st) = state.take() else {
                        unreachable!("array state is present between updates")
                    };
                    let (st, more) = self.factory.array_element(st, value)?;
                    *state = Some(st);
                    *live = more;
                }
                self.mode = Mode::ArrayDelim;
                Ok(None)
            }
            Some(Frame::Object {
                state, key, any, live, ..
            }) => {
                *any = true;
                let Some(k) = key.take() else {
                    unreachable!("object value is parsed only after its key")
                };
                if *live {
                    let Some(st) = state.take() else {
                        unreachable!("object state is present between updates")
                    };
                    let (st, more) = self.factory.object_entry(st, k, value)?;
                    *state = Some(st);
                    *live = more;
                }
                self.mode = Mode::ObjectDelim;
                Ok(None)
            }
        }
    }

    fn complete(&mut self, value: F::Value) -> Option<Status<F>> {
        match self.finish_value(value) {
            Ok(Some(root)) => Some(Status::Done(root)),
            Ok(None) => None,
            Err(e) => Some(self.fail(e)),
        }
    }

    fn finish_string(&mut self, value: F::Value, key: bool) -> Option<Status<F>> {
        if key {
            let Some(Frame::Object { key: slot, .. }) = self.frames.last_mut() else {
                unreachable!("key strings occur only inside objects")
            };
            *slot = Some(value);
            self.mode = Mode::Colon;
            None
        } else {
            self.complete(value)
        }
    }

    /// Consumes the closing bracket's frame and finalizes the array. The
    /// bracket itself (if any) must already be consumed.
    fn close_array(&mut self) -> Option<Status<F>> {
        let Some(Frame::Array { state, .. }) = self.frames.pop() else {
            unreachable!("close_array outside an array frame")
        };
        let Some(st) = state else {
            unreachable!("array state is present between updates")
        };
        let value = self.factory.end_array(st, self.buffer.location());
        self.complete(value)
    }

    fn close_object(&mut self) -> Option<Status<F>> {
        let Some(Frame::Object { state, .. }) = self.frames.pop() else {
            unreachable!("close_object outside an object frame")
        };
        let Some(st) = state else {
            unreachable!("object state is present between updates")
        };
        let value = self.factory.end_object(st, self.buffer.location());
        self.complete(value)
    }

    fn number_char(&mut self, state: &mut F::NumberState, c: char) {
        let mut utf8 = [0u8; 4];
        self.factory.number_text(state, c.encode_utf8(&mut utf8));
    }

    /// Drives the parse as far as the buffered input allows.
    ///
    /// Calling `step` again after it returned [`Status::Done`] or
    /// [`Status::Failed`] is a contract violation.
    #[allow(clippy::too_many_lines)]
    pub fn step(&mut self) -> Status<F> {
        loop {
            // Take ownership of the in-flight construct; every arm below
            // either restores `self.mode` or replaces it.
            match mem::replace(&mut self.mode, Mode::Failed) {
                Mode::Value => {
                    self.skip_ws();
                    match self.peek() {
                        Peek::Starved => {
                            self.mode = Mode::Value;
                            return self.starve();
                        }
                        Peek::Eos => {
                            match self.factory.bad_value_start(None, self.buffer.location()) {
                                Ok(v) => {
                                    if let Some(status) = self.complete(v) {
                                        return status;
                                    }
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                        Peek::Char(c) => {
                            let at = self.buffer.location();
                            match c {
                                '[' => {
                                    self.buffer.skip(1);
                                    let state = self.factory.begin_array(at);
                                    self.frames.push(Frame::Array {
                                        state: Some(state),
                                        any: false,
                                        live: true,
                                    });
                                    self.mode = Mode::Value;
                                }
                                ']' if matches!(
                                    self.frames.last(),
                                    Some(Frame::Array { any: false, .. })
                                ) =>
                                {
                                    self.buffer.skip(1);
                                    if let Some(status) = self.close_array() {
                                        return status;
                                    }
                                }
                                '{' => {
                                    self.buffer.skip(1);
                                    let state = self.factory.begin_object(at);
                                    self.frames.push(Frame::Object {
                                        state: Some(state),
                                        key: None,
                                        any: false,
                                        live: true,
                                    });
                                    self.mode = Mode::Key;
                                }
                                '"' => {
                                    self.buffer.skip(1);
                                    let state = self.factory.begin_string(at);
                                    self.mode = Mode::Str {
                                        state,
                                        phase: StrPhase::Run,
                                        key: false,
                                    };
                                }
                                '-' => {
                                    self.buffer.skip(1);
                                    let mut state = self.factory.begin_number(at);
                                    self.factory.number_text(&mut state, "-");
                                    self.mode = Mode::Number {
                                        state,
                                        phase: NumberPhase::IntFirst,
                                        shape: NumberShape::Integer,
                                    };
                                }
                                '0'..='9' => {
                                    let state = self.factory.begin_number(at);
                                    self.mode = Mode::Number {
                                        state,
                                        phase: NumberPhase::IntFirst,
                                        shape: NumberShape::Integer,
                                    };
                                }
                                _ => {
                                    if let Some(kind) = LiteralKind::from_first_char(c) {
                                        let state = self.factory.begin_literal(kind, at);
                                        self.mode = Mode::Literal {
                                            state,
                                            kind,
                                            matcher: LiteralMatcher::new(kind),
                                        };
                                    } else {
                                        match self.factory.bad_value_start(Some(c), at) {
                                            Ok(v) => {
                                                self.buffer.skip(1);
                                                if let Some(status) = self.complete(v) {
                                                    return status;
                                                }
                                            }
                                            Err(e) => return self.fail(e),
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                Mode::Literal {
                    state,
                    kind,
                    mut matcher,
                } => match self.peek() {
                    Peek::Starved => {
                        self.mode = Mode::Literal {
                            state,
                            kind,
                            matcher,
                        };
                        return self.starve();
                    }
                    Peek::Eos => {
                        let expected = matcher.expected();
                        let at = self.buffer.location();
                        match self.factory.bad_literal(state, kind, expected, None, at) {
                            Ok(v) => {
                                if let Some(status) = self.complete(v) {
                                    return status;
                                }
                            }
                            Err(e) => return self.fail(e),
                        }
                    }
                    Peek::Char(c) => match matcher.step(c) {
                        LiteralStep::NeedMore => {
                            self.buffer.skip(1);
                            self.mode = Mode::Literal {
                                state,
                                kind,
                                matcher,
                            };
                        }
                        LiteralStep::Done => {
                            self.buffer.skip(1);
                            let value =
                                self.factory.end_literal(state, kind, self.buffer.location());
                            if let Some(status) = self.complete(value) {
                                return status;
                            }
                        }
                        LiteralStep::Mismatch { expected } => {
                            let at = self.buffer.location();
                            match self.factory.bad_literal(state, kind, expected, Some(c), at) {
                                Ok(v) => {
                                    if let Some(status) = self.complete(v) {
                                        return status;
                                    }
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                    },
                },

                Mode::Number {
                    mut state,
                    phase,
                    mut shape,
                } => match phase {
                    NumberPhase::IntFirst => match self.peek() {
                        Peek::Starved => {
                            self.mode = Mode::Number { state, phase, shape };
                            return self.starve();
                        }
                        Peek::Char('0') => {
                            self.buffer.skip(1);
                            self.factory.number_text(&mut state, "0");
                            self.mode = Mode::Number {
                                state,
                                phase: NumberPhase::AfterZero,
                                shape,
                            };
                        }
                        Peek::Char(c @ '1'..='9') => {
                            self.buffer.skip(1);
                            self.number_char(&mut state, c);
                            self.mode = Mode::Number {
                                state,
                                phase: NumberPhase::IntDigits,
                                shape,
                            };
                        }
                        Peek::Char(c) => {
                            let at = self.buffer.location();
                            match self
                                .factory
                                .missing_digits(state, NumberPart::Integer, Some(c), at)
                            {
                                Ok(v) => {
                                    if let Some(status) = self.complete(v) {
                                        return status;
                                    }
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                        Peek::Eos => {
                            let at = self.buffer.location();
                            match self
                                .factory
                                .missing_digits(state, NumberPart::Integer, None, at)
                            {
                                Ok(v) => {
                                    if let Some(status) = self.complete(v) {
                                        return status;
                                    }
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                    },
                    NumberPhase::AfterZero => match self.peek() {
                        Peek::Starved => {
                            self.mode = Mode::Number { state, phase, shape };
                            return self.starve();
                        }
                        Peek::Char('0'..='9') => {
                            match self.factory.leading_zero(self.buffer.location()) {
                                // Best effort: keep accumulating the digits.
                                Ok(()) => {
                                    self.mode = Mode::Number {
                                        state,
                                        phase: NumberPhase::IntDigits,
                                        shape,
                                    };
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                        Peek::Char('.') => {
                            self.buffer.skip(1);
                            self.factory.number_text(&mut state, ".");
                            shape = NumberShape::Float;
                            self.mode = Mode::Number {
                                state,
                                phase: NumberPhase::FracFirst,
                                shape,
                            };
                        }
                        Peek::Char(c @ ('e' | 'E')) => {
                            self.buffer.skip(1);
                            self.number_char(&mut state, c);
                            shape = NumberShape::Float;
                            self.mode = Mode::Number {
                                state,
                                phase: NumberPhase::ExpMark,
                                shape,
                            };
                        }
                        Peek::Char(_) | Peek::Eos => {
                            let value =
                                self.factory.end_number(state, shape, self.buffer.location());
                            if let Some(status) = self.complete(value) {
                                return status;
                            }
                        }
                    },
                    NumberPhase::IntDigits | NumberPhase::FracDigits | NumberPhase::ExpDigits => {
                        self.scratch.clear();
                        let _ = self
                            .buffer
                            .read_while(&mut self.scratch, |c| c.is_ascii_digit());
                        if !self.scratch.is_empty() {
                            self.factory.number_text(&mut state, &self.scratch);
                        }
                        match self.peek() {
                            Peek::Starved => {
                                self.mode = Mode::Number { state, phase, shape };
                                return self.starve();
                            }
                            Peek::Char('.') if matches!(phase, NumberPhase::IntDigits) => {
                                self.buffer.skip(1);
                                self.factory.number_text(&mut state, ".");
                                shape = NumberShape::Float;
                                self.mode = Mode::Number {
                                    state,
                                    phase: NumberPhase::FracFirst,
                                    shape,
                                };
                            }
                            Peek::Char(c @ ('e' | 'E'))
                                if matches!(
                                    phase,
                                    NumberPhase::IntDigits | NumberPhase::FracDigits
                                ) =>
                            {
                                self.buffer.skip(1);
                                self.number_char(&mut state, c);
                                shape = NumberShape::Float;
                                self.mode = Mode::Number {
                                    state,
                                    phase: NumberPhase::ExpMark,
                                    shape,
                                };
                            }
                            Peek::Char(_) | Peek::Eos => {
                                let value =
                                    self.factory.end_number(state, shape, self.buffer.location());
                                if let Some(status) = self.complete(value) {
                                    return status;
                                }
                            }
                        }
                    }
                    NumberPhase::FracFirst | NumberPhase::ExpSign => match self.peek() {
                        Peek::Starved => {
                            self.mode = Mode::Number { state, phase, shape };
                            return self.starve();
                        }
                        Peek::Char(c) if c.is_ascii_digit() => {
                            self.buffer.skip(1);
                            self.number_char(&mut state, c);
                            let next = if matches!(phase, NumberPhase::FracFirst) {
                                NumberPhase::FracDigits
                            } else {
                                NumberPhase::ExpDigits
                            };
                            self.mode = Mode::Number {
                                state,
                                phase: next,
                                shape,
                            };
                        }
                        Peek::Char(c) => {
                            let part = if matches!(phase, NumberPhase::FracFirst) {
                                NumberPart::Fraction
                            } else {
                                NumberPart::Exponent
                            };
                            let at = self.buffer.location();
                            match self.factory.missing_digits(state, part, Some(c), at) {
                                Ok(v) => {
                                    if let Some(status) = self.complete(v) {
                                        return status;
                                    }
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                        Peek::Eos => {
                            let part = if matches!(phase, NumberPhase::FracFirst) {
                                NumberPart::Fraction
                            } else {
                                NumberPart::Exponent
                            };
                            let at = self.buffer.location();
                            match self.factory.missing_digits(state, part, None, at) {
                                Ok(v) => {
                                    if let Some(status) = self.complete(v) {
                                        return status;
                                    }
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                    },
                    NumberPhase::ExpMark => match self.peek() {
                        Peek::Starved => {
                            self.mode = Mode::Number { state, phase, shape };
                            return self.starve();
                        }
                        Peek::Char(c @ ('+' | '-')) => {
                            self.buffer.skip(1);
                            self.number_char(&mut state, c);
                            self.mode = Mode::Number {
                                state,
                                phase: NumberPhase::ExpSign,
                                shape,
                            };
                        }
                        Peek::Char(c) if c.is_ascii_digit() => {
                            self.buffer.skip(1);
                            self.number_char(&mut state, c);
                            self.mode = Mode::Number {
                                state,
                                phase: NumberPhase::ExpDigits,
                                shape,
                            };
                        }
                        Peek::Char(c) => {
                            let at = self.buffer.location();
                            match self
                                .factory
                                .missing_digits(state, NumberPart::Exponent, Some(c), at)
                            {
                                Ok(v) => {
                                    if let Some(status) = self.complete(v) {
                                        return status;
                                    }
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                        Peek::Eos => {
                            let at = self.buffer.location();
                            match self
                                .factory
                                .missing_digits(state, NumberPart::Exponent, None, at)
                            {
                                Ok(v) => {
                                    if let Some(status) = self.complete(v) {
                                        return status;
                                    }
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                    },
                },

                Mode::Str {
                    mut state,
                    phase,
                    key,
                } => match phase {
                    StrPhase::Run => {
                        self.scratch.clear();
                        let _ = self.buffer.read_while(&mut self.scratch, |c| {
                            c != '"' && c != '\\' && c >= '\u{20}'
                        });
                        if !self.scratch.is_empty() {
                            self.factory.string_text(&mut state, &self.scratch);
                        }
                        match self.peek() {
                            Peek::Starved => {
                                self.mode = Mode::Str {
                                    state,
                                    phase: StrPhase::Run,
                                    key,
                                };
                                return self.starve();
                            }
                            Peek::Eos => {
                                let at = self.buffer.location();
                                match self.factory.unterminated_string(state, at) {
                                    Ok(v) => {
                                        if let Some(status) = self.finish_string(v, key) {
                                            return status;
                                        }
                                    }
                                    Err(e) => return self.fail(e),
                                }
                            }
                            Peek::Char('"') => {
                                self.buffer.skip(1);
                                let value =
                                    self.factory.end_string(state, self.buffer.location());
                                if let Some(status) = self.finish_string(value, key) {
                                    return status;
                                }
                            }
                            Peek::Char('\\') => {
                                self.buffer.skip(1);
                                self.mode = Mode::Str {
                                    state,
                                    phase: StrPhase::Escape,
                                    key,
                                };
                            }
                            Peek::Char(c) => {
                                // Unescaped control character.
                                match self.factory.bad_char(c, self.buffer.location()) {
                                    Ok(()) => {
                                        self.buffer.skip(1);
                                        self.factory.string_char(&mut state, c);
                                        self.mode = Mode::Str {
                                            state,
                                            phase: StrPhase::Run,
                                            key,
                                        };
                                    }
                                    Err(e) => return self.fail(e),
                                }
                            }
                        }
                    }
                    StrPhase::Escape => match self.peek() {
                        Peek::Starved => {
                            self.mode = Mode::Str {
                                state,
                                phase: StrPhase::Escape,
                                key,
                            };
                            return self.starve();
                        }
                        Peek::Eos => {
                            let at = self.buffer.location();
                            match self.factory.unterminated_string(state, at) {
                                Ok(v) => {
                                    if let Some(status) = self.finish_string(v, key) {
                                        return status;
                                    }
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                        Peek::Char(c) => {
                            let decoded = match c {
                                '"' => Some('"'),
                                '\\' => Some('\\'),
                                '/' => Some('/'),
                                'b' => Some('\u{8}'),
                                'f' => Some('\u{c}'),
                                'n' => Some('\n'),
                                'r' => Some('\r'),
                                't' => Some('\t'),
                                _ => None,
                            };
                            if let Some(ch) = decoded {
                                self.buffer.skip(1);
                                self.factory.string_char(&mut state, ch);
                                self.mode = Mode::Str {
                                    state,
                                    phase: StrPhase::Run,
                                    key,
                                };
                            } else if c == 'u' {
                                self.buffer.skip(1);
                                self.mode = Mode::Str {
                                    state,
                                    phase: StrPhase::Unicode(EscapeDecoder::new()),
                                    key,
                                };
                            } else {
                                match self.factory.bad_escape(c, self.buffer.location()) {
                                    Ok(()) => {
                                        // Keep the letter verbatim.
                                        self.buffer.skip(1);
                                        self.factory.string_char(&mut state, c);
                                        self.mode = Mode::Str {
                                            state,
                                            phase: StrPhase::Run,
                                            key,
                                        };
                                    }
                                    Err(e) => return self.fail(e),
                                }
                            }
                        }
                    },
                    StrPhase::Unicode(mut decoder) => match self.peek() {
                        Peek::Starved => {
                            self.mode = Mode::Str {
                                state,
                                phase: StrPhase::Unicode(decoder),
                                key,
                            };
                            return self.starve();
                        }
                        Peek::Eos => {
                            let at = self.buffer.location();
                            match self.factory.unterminated_string(state, at) {
                                Ok(v) => {
                                    if let Some(status) = self.finish_string(v, key) {
                                        return status;
                                    }
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                        Peek::Char(c) => {
                            let at = self.buffer.location();
                            match decoder.feed(c) {
                                Ok(EscapeStep::NeedMore) => {
                                    self.buffer.skip(1);
                                    self.mode = Mode::Str {
                                        state,
                                        phase: StrPhase::Unicode(decoder),
                                        key,
                                    };
                                }
                                Ok(EscapeStep::Char(ch)) => {
                                    self.buffer.skip(1);
                                    self.factory.string_char(&mut state, ch);
                                    self.mode = Mode::Str {
                                        state,
                                        phase: StrPhase::Run,
                                        key,
                                    };
                                }
                                Err(EscapeError::BadDigit { valid, found }) => {
                                    match self.factory.bad_unicode_escape(&valid, found, at) {
                                        Ok(()) => {
                                            // The offending character is left
                                            // for the normal run to handle.
                                            self.factory.string_char(&mut state, '\u{FFFD}');
                                            self.mode = Mode::Str {
                                                state,
                                                phase: StrPhase::Run,
                                                key,
                                            };
                                        }
                                        Err(e) => return self.fail(e),
                                    }
                                }
                                Err(EscapeError::BadScalar { code }) => {
                                    self.buffer.skip(1);
                                    match self.factory.bad_unicode_scalar(code, at) {
                                        Ok(()) => {
                                            self.factory.string_char(&mut state, '\u{FFFD}');
                                            self.mode = Mode::Str {
                                                state,
                                                phase: StrPhase::Run,
                                                key,
                                            };
                                        }
                                        Err(e) => return self.fail(e),
                                    }
                                }
                                Err(EscapeError::UnpairedSurrogate { high }) => {
                                    match self.factory.bad_unicode_scalar(u32::from(high), at) {
                                        Ok(()) => {
                                            self.factory.string_char(&mut state, '\u{FFFD}');
                                            self.mode = Mode::Str {
                                                state,
                                                phase: StrPhase::Run,
                                                key,
                                            };
                                        }
                                        Err(e) => return self.fail(e),
                                    }
                                }
                            }
                        }
                    },
                },

                Mode::Key => {
                    self.skip_ws();
                    match self.peek() {
                        Peek::Starved => {
                            self.mode = Mode::Key;
                            return self.starve();
                        }
                        Peek::Eos => {
                            match self.factory.bad_key_start(None, self.buffer.location()) {
                                Ok(()) => {
                                    if let Some(status) = self.close_object() {
                                        return status;
                                    }
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                        Peek::Char('"') => {
                            let at = self.buffer.location();
                            self.buffer.skip(1);
                            let state = self.factory.begin_string(at);
                            self.mode = Mode::Str {
                                state,
                                phase: StrPhase::Run,
                                key: true,
                            };
                        }
                        Peek::Char('}') => {
                            let fresh = matches!(
                                self.frames.last(),
                                Some(Frame::Object { any: false, .. })
                            );
                            if fresh {
                                self.buffer.skip(1);
                                if let Some(status) = self.close_object() {
                                    return status;
                                }
                            } else {
                                // Trailing comma.
                                let at = self.buffer.location();
                                match self.factory.bad_key_start(Some('}'), at) {
                                    Ok(()) => {
                                        self.buffer.skip(1);
                                        if let Some(status) = self.close_object() {
                                            return status;
                                        }
                                    }
                                    Err(e) => return self.fail(e),
                                }
                            }
                        }
                        Peek::Char(c) => {
                            let at = self.buffer.location();
                            match self.factory.bad_key_start(Some(c), at) {
                                Ok(()) => {
                                    // Skip it and keep looking for a key.
                                    self.buffer.skip(1);
                                    self.mode = Mode::Key;
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                    }
                }

                Mode::Colon => {
                    self.skip_ws();
                    match self.peek() {
                        Peek::Starved => {
                            self.mode = Mode::Colon;
                            return self.starve();
                        }
                        Peek::Char(':') => {
                            self.buffer.skip(1);
                            self.mode = Mode::Value;
                        }
                        Peek::Char(c) => {
                            let at = self.buffer.location();
                            match self.factory.bad_entry_separator(Some(c), at) {
                                Ok(()) => self.mode = Mode::Value,
                                Err(e) => return self.fail(e),
                            }
                        }
                        Peek::Eos => {
                            let at = self.buffer.location();
                            match self.factory.bad_entry_separator(None, at) {
                                Ok(()) => self.mode = Mode::Value,
                                Err(e) => return self.fail(e),
                            }
                        }
                    }
                }

                Mode::ArrayDelim => {
                    self.skip_ws();
                    match self.peek() {
                        Peek::Starved => {
                            self.mode = Mode::ArrayDelim;
                            return self.starve();
                        }
                        Peek::Char(',') => {
                            self.buffer.skip(1);
                            self.mode = Mode::Value;
                        }
                        Peek::Char(']') => {
                            self.buffer.skip(1);
                            if let Some(status) = self.close_array() {
                                return status;
                            }
                        }
                        Peek::Char(c) => {
                            let at = self.buffer.location();
                            match self.factory.bad_array_delimiter(Some(c), at) {
                                // Recover as if a comma preceded it.
                                Ok(()) => self.mode = Mode::Value,
                                Err(e) => return self.fail(e),
                            }
                        }
                        Peek::Eos => {
                            let at = self.buffer.location();
                            match self.factory.bad_array_delimiter(None, at) {
                                Ok(()) => {
                                    if let Some(status) = self.close_array() {
                                        return status;
                                    }
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                    }
                }

                Mode::ObjectDelim => {
                    self.skip_ws();
                    match self.peek() {
                        Peek::Starved => {
                            self.mode = Mode::ObjectDelim;
                            return self.starve();
                        }
                        Peek::Char(',') => {
                            self.buffer.skip(1);
                            self.mode = Mode::Key;
                        }
                        Peek::Char('}') => {
                            self.buffer.skip(1);
                            if let Some(status) = self.close_object() {
                                return status;
                            }
                        }
                        Peek::Char(c) => {
                            let at = self.buffer.location();
                            match self.factory.bad_object_delimiter(Some(c), at) {
                                Ok(()) => self.mode = Mode::Key,
                                Err(e) => return self.fail(e),
                            }
                        }
                        Peek::Eos => {
                            let at = self.buffer.location();
                            match self.factory.bad_object_delimiter(None, at) {
                                Ok(()) => {
                                    if let Some(status) = self.close_object() {
                                        return status;
                                    }
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                    }
                }

                Mode::Trailing { value } => {
                    self.skip_ws();
                    match self.peek() {
                        Peek::Starved => {
                            self.mode = Mode::Trailing { value };
                            return self.starve();
                        }
                        Peek::Eos => {
                            self.mode = Mode::Finished;
                            return Status::Done(value);
                        }
                        Peek::Char(c) => {
                            let at = self.buffer.location();
                            match self.factory.trailing_data(c, at) {
                                Ok(()) => {
                                    self.buffer.skip(1);
                                    self.mode = Mode::Trailing { value };
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                    }
                }

                Mode::Finished | Mode::Failed => {
                    debug_assert!(false, "step called after a terminal status");
                    return Status::NeedInput { min: 0, room: 0 };
                }
            }
        }
    }
}
