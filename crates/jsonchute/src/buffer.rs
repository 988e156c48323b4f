//! Fixed-capacity circular look-ahead buffer with source-location tracking.
//!
//! The buffer owns a ring of `char` slots. Input arrives in chunks (either
//! pushed by a caller or pulled from a [`ChunkSource`]) and is consumed by a
//! parser through peeking ([`LookAheadBuffer::look_ahead`]) and cursor
//! advances ([`LookAheadBuffer::skip`], [`LookAheadBuffer::read_while`]).
//! Every consumed character updates an `(offset, line, column)` triple, with
//! `\r\n` counted as a single line break.
//!
//! When the free region wraps past the end of the ring, a fill first compacts
//! the unconsumed tail to the front so the underlying source always sees one
//! contiguous destination slice.

use alloc::{boxed::Box, string::String, vec};

use crate::location::{Location, LocationTracker};

/// A capability that fills a destination slice with input characters.
///
/// A fill writes at least one character, or returns `0` to signal end of
/// stream. Once `0` has been returned the source is never polled again.
pub trait ChunkSource {
    /// Fill `dest` from the front, returning how many characters were
    /// written.
    fn fill(&mut self, dest: &mut [char]) -> usize;
}

/// A [`ChunkSource`] over an in-memory string, delivering at most
/// `chunk_size` characters per fill.
#[derive(Debug)]
pub struct StrSource<'a> {
    rest: core::str::Chars<'a>,
    chunk_size: usize,
}

impl<'a> StrSource<'a> {
    /// A source that fills as much as the destination allows.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self::with_chunk_size(text, usize::MAX)
    }

    /// A source that trickles input in chunks of at most `chunk_size`
    /// characters. Useful for exercising chunk-boundary behavior.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    #[must_use]
    pub fn with_chunk_size(text: &'a str, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        Self {
            rest: text.chars(),
            chunk_size,
        }
    }
}

impl ChunkSource for StrSource<'_> {
    fn fill(&mut self, dest: &mut [char]) -> usize {
        let limit = self.chunk_size.min(dest.len());
        let mut written = 0;
        while written < limit {
            let Some(ch) = self.rest.next() else { break };
            dest[written] = ch;
            written += 1;
        }
        written
    }
}

/// Outcome of [`LookAheadBuffer::read_while`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` characters were copied (possibly zero, when the first buffered
    /// character fails the predicate or the buffer is empty but not closed).
    Copied(usize),
    /// Nothing was copied and the stream has ended.
    EndOfInput,
}

/// Fixed-capacity circular character buffer with look-ahead and location
/// tracking.
///
/// The buffer is the sole owner of its storage; callers receive copies of
/// consumed characters, never retained references.
#[derive(Debug)]
pub struct LookAheadBuffer {
    data: Box<[char]>,
    head: usize,
    len: usize,
    closed: bool,
    tracker: LocationTracker,
}

impl LookAheadBuffer {
    /// Creates a buffer holding at most `capacity` characters.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "buffer capacity must be positive");
        Self {
            data: vec!['\0'; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
            closed: false,
            tracker: LocationTracker::new(),
        }
    }

    /// Total slot count, fixed at construction.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Characters buffered but not yet consumed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when no unconsumed characters are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Free slots available for filling.
    #[must_use]
    pub fn free(&self) -> usize {
        self.capacity() - self.len
    }

    /// `true` once the input stream has signalled end of stream.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// `true` when the stream has ended and everything buffered was consumed.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.closed && self.len == 0
    }

    /// The position of the next character to be consumed.
    #[must_use]
    pub fn location(&self) -> Location {
        self.tracker.location()
    }

    /// Marks the end of the input stream. Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Copies characters from `text` into the free region, returning how many
    /// were accepted. Characters beyond the free region are not consumed from
    /// `text`; the caller re-offers them after draining the buffer.
    pub fn push_chunk(&mut self, text: &str) -> usize {
        debug_assert!(!self.closed, "push_chunk after close");
        let cap = self.capacity();
        let mut written = 0;
        for ch in text.chars() {
            if self.len == cap {
                break;
            }
            let slot = (self.head + self.len) % cap;
            self.data[slot] = ch;
            self.len += 1;
            written += 1;
        }
        written
    }

    /// Buffers characters toward a target of `n`, performing at most one
    /// underlying fill, and returns the number actually available.
    ///
    /// A single fill carries no guarantee of reaching `n`: a source that
    /// delivers short chunks can leave the buffer short while the stream is
    /// still open, and the caller requests again. Only once the buffer is
    /// closed is a short result final. Requesting more than the buffer's
    /// capacity is a contract violation.
    pub fn request_look_ahead(&mut self, n: usize, source: &mut dyn ChunkSource) -> usize {
        debug_assert!(n <= self.capacity(), "look-ahead beyond buffer capacity");
        if self.len >= n || self.closed {
            return self.len;
        }
        self.fill_once(source);
        self.len
    }

    /// Performs one compacting fill from `source`, closing the buffer if the
    /// source signals end of stream. Returns how many characters arrived.
    pub fn fill_once(&mut self, source: &mut dyn ChunkSource) -> usize {
        if self.closed || self.free() == 0 {
            return 0;
        }
        self.compact();
        let start = self.len;
        let filled = source.fill(&mut self.data[start..]);
        debug_assert!(filled <= self.capacity() - start, "source overfilled buffer");
        if filled == 0 {
            self.closed = true;
        } else {
            self.len += filled;
        }
        filled
    }

    /// Returns the character `offset` positions past the read cursor without
    /// consuming anything, or `None` when that position is not buffered.
    #[must_use]
    pub fn look_ahead(&self, offset: usize) -> Option<char> {
        if offset < self.len {
            Some(self.data[(self.head + offset) % self.capacity()])
        } else {
            None
        }
    }

    /// Advances the read cursor by `n` characters, updating the location
    /// tracker. Consuming more than is buffered is a contract violation.
    pub fn skip(&mut self, n: usize) {
        debug_assert!(n <= self.len, "skip past buffered input");
        let n = n.min(self.len);
        for _ in 0..n {
            let ch = self.data[self.head];
            self.tracker.advance(ch);
            self.head = (self.head + 1) % self.capacity();
            self.len -= 1;
        }
    }

    /// Copies up to `limit` buffered characters into `dst`, advancing the
    /// cursor. Returns how many were copied.
    pub fn read(&mut self, dst: &mut String, limit: usize) -> usize {
        let take = limit.min(self.len);
        for _ in 0..take {
            let ch = self.data[self.head];
            self.tracker.advance(ch);
            dst.push(ch);
            self.head = (self.head + 1) % self.capacity();
            self.len -= 1;
        }
        take
    }

    /// Copies buffered characters into `dst` while `predicate` holds,
    /// advancing the cursor. Stops at the first failing character, at the end
    /// of buffered data, or at end of stream.
    pub fn read_while<F>(&mut self, dst: &mut String, mut predicate: F) -> ReadOutcome
    where
        F: FnMut(char) -> bool,
    {
        let mut copied = 0;
        while self.len > 0 {
            let ch = self.data[self.head];
            if !predicate(ch) {
                break;
            }
            self.tracker.advance(ch);
            dst.push(ch);
            self.head = (self.head + 1) % self.capacity();
            self.len -= 1;
            copied += 1;
        }
        if copied == 0 && self.is_at_end() {
            ReadOutcome::EndOfInput
        } else {
            ReadOutcome::Copied(copied)
        }
    }

    // Move the unconsumed region to the front so the free region is one
    // contiguous slice.
    fn compact(&mut self) {
        if self.head == 0 {
            return;
        }
        self.data.rotate_left(self.head);
        self.head = 0;
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::{ChunkSource, LookAheadBuffer, ReadOutcome, StrSource};

    #[test]
    fn push_and_look_ahead() {
        let mut buf = LookAheadBuffer::with_capacity(8);
        assert_eq!(buf.push_chunk("abc"), 3);
        assert_eq!(buf.look_ahead(0), Some('a'));
        assert_eq!(buf.look_ahead(2), Some('c'));
        assert_eq!(buf.look_ahead(3), None);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn push_chunk_caps_at_free_space() {
        let mut buf = LookAheadBuffer::with_capacity(4);
        assert_eq!(buf.push_chunk("abcdef"), 4);
        assert_eq!(buf.free(), 0);
        assert_eq!(buf.push_chunk("x"), 0);
    }

    #[test]
    fn wrap_around_preserves_order() {
        let mut buf = LookAheadBuffer::with_capacity(4);
        buf.push_chunk("abcd");
        let mut out = String::new();
        buf.read(&mut out, 3);
        assert_eq!(out, "abc");
        // Free region now wraps; refill through it.
        assert_eq!(buf.push_chunk("efg"), 3);
        assert_eq!(buf.look_ahead(0), Some('d'));
        assert_eq!(buf.look_ahead(3), Some('g'));
        let mut rest = String::new();
        buf.read(&mut rest, 4);
        assert_eq!(rest, "defg");
    }

    #[test]
    fn compacting_fill_offers_contiguous_region() {
        let mut buf = LookAheadBuffer::with_capacity(4);
        buf.push_chunk("abcd");
        buf.skip(3);
        // One unconsumed char sits at slot 3; a fill must still be able to
        // deliver three contiguous characters.
        let mut src = StrSource::new("xyz");
        assert_eq!(buf.request_look_ahead(4, &mut src), 4);
        let mut out = String::new();
        buf.read(&mut out, 4);
        assert_eq!(out, "dxyz");
    }

    #[test]
    fn short_fill_leaves_request_unsatisfied() {
        let mut buf = LookAheadBuffer::with_capacity(8);
        let mut src = StrSource::new("ab");
        // One fill delivers fewer characters than requested while the
        // stream is still open; the caller is expected to ask again.
        assert_eq!(buf.request_look_ahead(5, &mut src), 2);
        assert!(!buf.is_closed());
        // Next request performs the fill that observes end of stream.
        assert_eq!(buf.request_look_ahead(5, &mut src), 2);
        assert!(buf.is_closed());
    }

    #[test]
    fn read_while_stops_at_predicate() {
        let mut buf = LookAheadBuffer::with_capacity(8);
        buf.push_chunk("123, 45");
        let mut out = String::new();
        let outcome = buf.read_while(&mut out, |c| c.is_ascii_digit());
        assert_eq!(outcome, ReadOutcome::Copied(3));
        assert_eq!(out, "123");
        assert_eq!(buf.look_ahead(0), Some(','));
    }

    #[test]
    fn read_while_distinguishes_end_of_input() {
        let mut buf = LookAheadBuffer::with_capacity(8);
        let mut out = String::new();
        assert_eq!(
            buf.read_while(&mut out, |c| c.is_ascii_digit()),
            ReadOutcome::Copied(0)
        );
        buf.close();
        assert_eq!(
            buf.read_while(&mut out, |c| c.is_ascii_digit()),
            ReadOutcome::EndOfInput
        );
    }

    #[test]
    fn location_tracks_crlf_as_one_break() {
        let mut buf = LookAheadBuffer::with_capacity(16);
        buf.push_chunk("a\r\nb\nc");
        buf.skip(6);
        let at = buf.location();
        assert_eq!((at.offset, at.line, at.column), (6, 3, 2));
    }

    #[test]
    fn str_source_respects_chunk_size() {
        let mut src = StrSource::with_chunk_size("abcdef", 2);
        let mut dest = ['\0'; 8];
        assert_eq!(src.fill(&mut dest), 2);
        assert_eq!(&dest[..2], &['a', 'b']);
        assert_eq!(src.fill(&mut dest), 2);
        assert_eq!(src.fill(&mut dest), 2);
        assert_eq!(src.fill(&mut dest), 0);
    }
}
