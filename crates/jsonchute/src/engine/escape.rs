//! Decoder for `\uXXXX` escape sequences, including UTF-16 surrogate pairs.
//!
//! The decoder accumulates ASCII hex digits into a code unit as they arrive.
//! A high surrogate switches it into pair mode, where it expects a literal
//! `\u` and four more digits; the two units then combine into one scalar.
//! Errors carry the digits already consumed so callers can report precisely
//! how far the escape got.

use alloc::string::String;

/// Progress after feeding one character.
pub(crate) enum EscapeStep {
    /// More characters are required.
    NeedMore,
    /// The escape decoded to this character.
    Char(char),
}

/// Why decoding stopped. The comments state whether the engine consumes the
/// offending character.
pub(crate) enum EscapeError {
    /// A non-hex character interrupted a digit group. Not consumed.
    BadDigit { valid: String, found: char },
    /// Four digits formed something that is not a Unicode scalar value (for
    /// example a lone low surrogate). The final digit is consumed.
    BadScalar { code: u32 },
    /// A high surrogate was not followed by `\u`. The character that broke
    /// the pair is not consumed.
    UnpairedSurrogate { high: u16 },
}

#[derive(Debug)]
enum Mode {
    Hex,
    PairBackslash,
    PairU,
}

#[derive(Debug)]
pub(crate) struct EscapeDecoder {
    mode: Mode,
    acc: u32,
    digits: String,
    high: Option<u16>,
}

impl EscapeDecoder {
    pub(crate) fn new() -> Self {
        Self {
            mode: Mode::Hex,
            acc: 0,
            digits: String::new(),
            high: None,
        }
    }

    fn hex_val(c: char) -> Option<u32> {
        match c {
            '0'..='9' => Some((c as u32) - ('0' as u32)),
            'a'..='f' => Some((c as u32) - ('a' as u32) + 10),
            'A'..='F' => Some((c as u32) - ('A' as u32) + 10),
            _ => None,
        }
    }

    pub(crate) fn feed(&mut self, c: char) -> Result<EscapeStep, EscapeError> {
        match self.mode {
            Mode::PairBackslash => {
                if c == '\\' {
                    self.mode = Mode::PairU;
                    Ok(EscapeStep::NeedMore)
                } else {
                    Err(EscapeError::UnpairedSurrogate {
                        high: self.high.unwrap_or(0),
                    })
                }
            }
            Mode::PairU => {
                if c == 'u' {
                    self.mode = Mode::Hex;
                    Ok(EscapeStep::NeedMore)
                } else {
                    Err(EscapeError::UnpairedSurrogate {
                        high: self.high.unwrap_or(0),
                    })
                }
            }
            Mode::Hex => {
                let Some(d) = Self::hex_val(c) else {
                    return Err(EscapeError::BadDigit {
                        valid: core::mem::take(&mut self.digits),
                        found: c,
                    });
                };
                self.acc = (self.acc << 4) | d;
                self.digits.push(c);
                if self.digits.len() < 4 {
                    return Ok(EscapeStep::NeedMore);
                }

                let code = self.acc;
                self.acc = 0;
                self.digits.clear();

                if let Some(high) = self.high.take() {
                    if (0xDC00..=0xDFFF).contains(&code) {
                        let scalar =
                            0x10000 + ((u32::from(high) - 0xD800) << 10) + (code - 0xDC00);
                        match char::from_u32(scalar) {
                            Some(ch) => Ok(EscapeStep::Char(ch)),
                            None => Err(EscapeError::BadScalar { code: scalar }),
                        }
                    } else {
                        // The pair never materialized; report the lone high
                        // surrogate.
                        Err(EscapeError::BadScalar {
                            code: u32::from(high),
                        })
                    }
                } else if (0xD800..=0xDBFF).contains(&code) {
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        self.high = Some(code as u16);
                    }
                    self.mode = Mode::PairBackslash;
                    Ok(EscapeStep::NeedMore)
                } else if (0xDC00..=0xDFFF).contains(&code) {
                    Err(EscapeError::BadScalar { code })
                } else {
                    match char::from_u32(code) {
                        Some(ch) => Ok(EscapeStep::Char(ch)),
                        None => Err(EscapeError::BadScalar { code }),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EscapeDecoder, EscapeError, EscapeStep};

    fn decode(decoder: &mut EscapeDecoder, input: &str) -> Option<char> {
        for c in input.chars() {
            match decoder.feed(c) {
                Ok(EscapeStep::NeedMore) => {}
                Ok(EscapeStep::Char(ch)) => return Some(ch),
                Err(_) => panic!("unexpected decode error at {c:?}"),
            }
        }
        None
    }

    #[test]
    fn basic_decoding() {
        let mut d = EscapeDecoder::new();
        assert_eq!(decode(&mut d, "0041"), Some('A'));
    }

    #[test]
    fn mixed_case_hex() {
        let mut d = EscapeDecoder::new();
        assert_eq!(decode(&mut d, "AbCd"), char::from_u32(0xABCD));
    }

    #[test]
    fn surrogate_pair_combines() {
        let mut d = EscapeDecoder::new();
        assert_eq!(decode(&mut d, "D83D\\uDE00"), Some('\u{1F600}'));
    }

    #[test]
    fn non_hex_reports_consumed_digits() {
        let mut d = EscapeDecoder::new();
        assert!(matches!(d.feed('0'), Ok(EscapeStep::NeedMore)));
        assert!(matches!(d.feed('a'), Ok(EscapeStep::NeedMore)));
        match d.feed('x') {
            Err(EscapeError::BadDigit { valid, found }) => {
                assert_eq!(valid, "0a");
                assert_eq!(found, 'x');
            }
            _ => panic!("expected BadDigit"),
        }
    }

    #[test]
    fn lone_low_surrogate_is_rejected() {
        let mut d = EscapeDecoder::new();
        for c in "DC0".chars() {
            assert!(d.feed(c).is_ok());
        }
        assert!(matches!(
            d.feed('0'),
            Err(EscapeError::BadScalar { code: 0xDC00 })
        ));
    }

    #[test]
    fn high_surrogate_without_pair_is_rejected() {
        let mut d = EscapeDecoder::new();
        for c in "D800".chars() {
            assert!(d.feed(c).is_ok());
        }
        match d.feed('x') {
            Err(EscapeError::UnpairedSurrogate { high }) => {
                assert_eq!(high, 0xD800);
            }
            _ => panic!("expected UnpairedSurrogate"),
        }
    }
}
