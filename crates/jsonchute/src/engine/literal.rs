//! Resumable matcher for the `true` / `false` / `null` keywords.

use crate::factory::LiteralKind;

/// What happened after feeding one more character into the literal matcher?
pub(crate) enum LiteralStep {
    /// Character matched, but the keyword is not finished yet.
    NeedMore,
    /// Character matched *and* it was the keyword's last.
    Done,
    /// Character did **not** match the expected one.
    Mismatch {
        /// The keyword character that should have appeared.
        expected: char,
    },
}

/// Matches one keyword character at a time, surviving chunk boundaries.
#[derive(Debug)]
pub(crate) struct LiteralMatcher {
    rest: &'static [u8],
}

impl LiteralMatcher {
    pub(crate) fn new(kind: LiteralKind) -> Self {
        Self {
            rest: kind.keyword().as_bytes(),
        }
    }

    /// The next character the keyword requires. Meaningful only while the
    /// match is unfinished.
    pub(crate) fn expected(&self) -> char {
        self.rest.first().map_or('\0', |b| *b as char)
    }

    pub(crate) fn step(&mut self, c: char) -> LiteralStep {
        let Some((&next, rest)) = self.rest.split_first() else {
            return LiteralStep::Mismatch { expected: '\0' };
        };
        if next as char == c {
            self.rest = rest;
            if rest.is_empty() {
                LiteralStep::Done
            } else {
                LiteralStep::NeedMore
            }
        } else {
            LiteralStep::Mismatch {
                expected: next as char,
            }
        }
    }
}
