//! String tokens.
//!
//! A string without backslashes is returned as a borrowed slice of the input.
//! The first backslash switches to materialization: one pass measures the
//! decoded length and validates every escape, a second pass fills a buffer of
//! exactly that size.

use alloc::{borrow::Cow, vec::Vec};

use super::{Token, TokenKind, Tokenizer};
use crate::{
    encoding::{Encoding, combine_surrogates, is_high_surrogate, is_low_surrogate},
    error::{LexError, ParseError},
    unit::CodeUnit,
};

/// One step through the body of a string.
enum Piece {
    /// A run of units copied as-is.
    Verbatim(usize),
    /// An escape sequence of `len` units decoding to `scalar`.
    Escaped { scalar: u32, len: usize },
}

impl<'a, E: Encoding> Tokenizer<'a, E> {
    pub(super) fn lex_string(&mut self) -> Result<Token<'a, E::Unit>, ParseError> {
        let input = self.input;
        let start = self.index;
        let mut i = start + 1;
        loop {
            let Some(&unit) = input.get(i) else {
                return Err(self.unterminated(start));
            };
            if unit.is(b'"') {
                break;
            }
            if unit.is(b'\\') {
                return self.lex_escaped_string(start, i);
            }
            if unit.is_control() {
                return Err(self.control_character(start, i));
            }
            i += 1;
        }
        Ok(self.finish_string(start, i + 1, Cow::Borrowed(&input[start..=i])))
    }

    fn lex_escaped_string(
        &mut self,
        start: usize,
        first_escape: usize,
    ) -> Result<Token<'a, E::Unit>, ParseError> {
        let close = self.closing_quote(start, first_escape)?;

        let mut decoded_len = 2;
        let mut i = start + 1;
        while i < close {
            match self.piece(start, i, close)? {
                Piece::Verbatim(len) => {
                    decoded_len += len;
                    i += len;
                }
                Piece::Escaped { scalar, len } => {
                    decoded_len += E::scalar_len(scalar);
                    i += len;
                }
            }
        }

        log::trace!(
            "string at {}:{} has escapes, materializing {decoded_len} units",
            self.line,
            self.column
        );

        let quote = E::Unit::from_ascii(b'"');
        let mut text = Vec::with_capacity(decoded_len);
        text.push(quote);
        let mut i = start + 1;
        while i < close {
            match self.piece(start, i, close)? {
                Piece::Verbatim(len) => {
                    text.extend_from_slice(&self.input[i..i + len]);
                    i += len;
                }
                Piece::Escaped { scalar, len } => {
                    let mut units = [E::Unit::default(); 4];
                    let n = E::encode(scalar, &mut units);
                    text.extend_from_slice(&units[..n]);
                    i += len;
                }
            }
        }
        text.push(quote);
        debug_assert_eq!(text.len(), decoded_len);

        Ok(self.finish_string(start, close + 1, Cow::Owned(text)))
    }

    /// Consumes the raw string `start..end` and builds its token.
    fn finish_string(
        &mut self,
        start: usize,
        end: usize,
        text: Cow<'a, [E::Unit]>,
    ) -> Token<'a, E::Unit> {
        let (line, column) = (self.line, self.column);
        self.column += E::count_scalars(&self.input[start..end]);
        self.index = end;
        Token {
            kind: TokenKind::String,
            text,
            line,
            column,
        }
    }

    /// Index of the quote that closes the string opened at `start`, honoring
    /// backslash escapes from `from` on. Unescaped control characters are
    /// rejected here; escaped ones are left to [`Self::piece`].
    fn closing_quote(&self, start: usize, from: usize) -> Result<usize, ParseError> {
        let mut i = from;
        while let Some(&unit) = self.input.get(i) {
            if unit.is(b'"') {
                return Ok(i);
            }
            if unit.is_control() {
                return Err(self.control_character(start, i));
            }
            i += if unit.is(b'\\') { 2 } else { 1 };
        }
        Err(self.unterminated(start))
    }

    fn piece(&self, start: usize, at: usize, close: usize) -> Result<Piece, ParseError> {
        let body = &self.input[at..close];
        if !body[0].is(b'\\') {
            let len = body.iter().position(|u| u.is(b'\\')).unwrap_or(body.len());
            return Ok(Piece::Verbatim(len));
        }

        let invalid = || self.invalid_escape(start, close);
        let short = match body.get(1).and_then(|u| u.ascii()).ok_or_else(invalid)? {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => return self.unicode_escape(body).ok_or_else(invalid),
            _ => return Err(invalid()),
        };
        Ok(Piece::Escaped {
            scalar: u32::from(short),
            len: 2,
        })
    }

    /// Decodes `\uXXXX`, joining a following `\uXXXX` low surrogate into one
    /// scalar.
    fn unicode_escape(&self, body: &[E::Unit]) -> Option<Piece> {
        let value = hex4(body.get(2..6)?)?;
        if is_high_surrogate(value) {
            let low = body
                .get(6..8)
                .filter(|prefix| prefix[0].is(b'\\') && prefix[1].is(b'u'))
                .and_then(|_| hex4(body.get(8..12)?))
                .filter(|&low| is_low_surrogate(low));
            if let Some(low) = low {
                return Some(Piece::Escaped {
                    scalar: combine_surrogates(value, low),
                    len: 12,
                });
            }
        }
        if (is_high_surrogate(value) || is_low_surrogate(value)) && !E::KEEPS_LONE_SURROGATES {
            return None;
        }
        Some(Piece::Escaped {
            scalar: value,
            len: 6,
        })
    }

    fn unterminated(&self, start: usize) -> ParseError {
        self.error(LexError::UnterminatedString {
            token: E::preview(&self.input[start..]),
        })
    }

    fn control_character(&self, start: usize, at: usize) -> ParseError {
        self.error(LexError::ControlCharacterInString {
            token: E::preview(&self.input[start..=at]),
        })
    }

    fn invalid_escape(&self, start: usize, close: usize) -> ParseError {
        self.error(LexError::InvalidEscapeSequence {
            token: E::preview(&self.input[start..=close]),
        })
    }
}

fn hex4<U: CodeUnit>(units: &[U]) -> Option<u32> {
    units.iter().try_fold(0u32, |acc, unit| {
        let digit = char::from(unit.ascii()?).to_digit(16)?;
        Some((acc << 4) | digit)
    })
}
