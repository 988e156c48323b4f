//! Source positions tracked by the look-ahead buffer.

/// A position in the input stream.
///
/// `offset` counts characters from the start of the stream (0-based); `line`
/// and `column` are 1-based, suitable for human-readable diagnostics. A
/// `\r\n` pair advances `line` once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// Characters consumed before this position.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl Location {
    pub(crate) fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Per-stream cursor that folds consumed characters into a [`Location`].
#[derive(Debug)]
pub(crate) struct LocationTracker {
    at: Location,
    // A bare `\r` already counted as a line break; an immediately following
    // `\n` must not count again.
    pending_lf: bool,
}

impl LocationTracker {
    pub(crate) fn new() -> Self {
        Self {
            at: Location::start(),
            pending_lf: false,
        }
    }

    /// The position of the next character to be consumed.
    pub(crate) fn location(&self) -> Location {
        self.at
    }

    pub(crate) fn advance(&mut self, ch: char) {
        self.at.offset += 1;
        match ch {
            '\n' if self.pending_lf => {
                self.pending_lf = false;
            }
            '\n' => {
                self.at.line += 1;
                self.at.column = 1;
            }
            '\r' => {
                self.at.line += 1;
                self.at.column = 1;
                self.pending_lf = true;
            }
            _ => {
                self.at.column += 1;
                self.pending_lf = false;
            }
        }
    }
}
