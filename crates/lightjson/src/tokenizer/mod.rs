//! Tokenizer: a position-tracking lexer over an in-memory UTF-8 or UTF-16
//! buffer.
//!
//! The state is only `(index, line, column)`. Every call to
//! [`Tokenizer::next_token`] skips whitespace and `//` comments, classifies the
//! first significant character, and slices the token straight out of the
//! input. Strings are borrowed unless they contain escape sequences, in which
//! case the decoded text is materialized once (see `string.rs`).
//!
//! The `read_*` operations are fast paths for a consumer that already knows
//! the shape it expects: they parse directly into the target value and only
//! lex a full token to report what was found instead.
//!
//! Invariants
//! - `index` always sits on a scalar boundary of the input.
//! - `line` and `column` are 1-based and count scalars, not units; `\n` and
//!   `\r\n` each start exactly one new line.
//! - No error is recovered from. After an error, or after `EndOfDocument`,
//!   the iterator yields `None`.

mod string;
#[cfg(test)]
mod tests;
mod token;

use alloc::{borrow::Cow, string::String};

pub use token::{Position, Token, TokenKind};

use crate::{
    encoding::{Encoding, Utf8, Utf16},
    error::{DigitContext, ErrorSource, LexError, MAX_PREVIEW_CHARS, NumberError, ParseError},
    number::{self, ParseOutcome},
    options::TokenizerOptions,
    unit::CodeUnit,
    utf8::{classify_invalid_utf8, is_json_whitespace},
};

pub type Utf8Tokenizer<'a> = Tokenizer<'a, Utf8>;
pub type Utf16Tokenizer<'a> = Tokenizer<'a, Utf16>;

/// A JSON tokenizer over a complete input buffer.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a, E: Encoding> {
    input: &'a [E::Unit],
    index: usize,
    line: usize,
    column: usize,
    options: TokenizerOptions,
    finished: bool,
}

impl<'a, E: Encoding> Tokenizer<'a, E> {
    #[must_use]
    pub fn new(input: &'a [E::Unit]) -> Self {
        Self::with_options(input, TokenizerOptions::default())
    }

    #[must_use]
    pub fn with_options(input: &'a [E::Unit], options: TokenizerOptions) -> Self {
        Self {
            input,
            index: 0,
            line: 1,
            column: 1,
            options,
            finished: false,
        }
    }

    /// Position of the next unread character.
    #[must_use]
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    /// Offset of the next unread unit.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.index
    }

    /// The input that has not been consumed yet.
    #[must_use]
    pub fn remaining(&self) -> &'a [E::Unit] {
        let input = self.input;
        &input[self.index..]
    }

    /// Lexes the next token. At the end of the input this returns an
    /// `EndOfDocument` token, and keeps returning it.
    ///
    /// # Errors
    ///
    /// Any lexical error, positioned at the start of the offending token.
    pub fn next_token(&mut self) -> Result<Token<'a, E::Unit>, ParseError> {
        self.skip_insignificant()?;
        let Some(&unit) = self.input.get(self.index) else {
            return Ok(self.token(TokenKind::EndOfDocument, self.index));
        };
        match unit.ascii() {
            Some(b'"') => self.lex_string(),
            Some(b't') => self.lex_literal(TokenKind::True, "true"),
            Some(b'f') => self.lex_literal(TokenKind::False, "false"),
            Some(b'n') => self.lex_literal(TokenKind::Null, "null"),
            Some(b'-' | b'0'..=b'9') => self.lex_number(),
            Some(byte) => match TokenKind::structural(byte) {
                Some(kind) => {
                    let start = self.index;
                    self.advance_ascii(1);
                    Ok(self.token(kind, start))
                }
                None => Err(self.unexpected_character()),
            },
            None => Err(self.unexpected_character()),
        }
    }

    /// Classifies the next token without consuming it. Only the first
    /// character of the token is inspected (plus the digits of a number), so
    /// a malformed token is reported by the call that consumes it.
    ///
    /// # Errors
    ///
    /// An unexpected character or malformed UTF-8 at the next position.
    pub fn peek_kind(&mut self) -> Result<TokenKind, ParseError> {
        self.skip_insignificant()?;
        let Some(&unit) = self.input.get(self.index) else {
            return Ok(TokenKind::EndOfDocument);
        };
        let kind = match unit.ascii() {
            Some(b'"') => TokenKind::String,
            Some(b't') => TokenKind::True,
            Some(b'f') => TokenKind::False,
            Some(b'n') => TokenKind::Null,
            Some(b'-' | b'0'..=b'9') => {
                let mut end = self.index + 1;
                end += self.digit_run(end);
                if self.unit_is(end, b'.') {
                    TokenKind::FloatingPointNumber
                } else {
                    TokenKind::IntegerNumber
                }
            }
            Some(byte) => match TokenKind::structural(byte) {
                Some(kind) => kind,
                None => return Err(self.unexpected_character()),
            },
            None => return Err(self.unexpected_character()),
        };
        Ok(kind)
    }

    /// Reads a string token and decodes its content.
    ///
    /// # Errors
    ///
    /// A lexical error, a token of another kind, or content that is not
    /// well-formed in this encoding.
    pub fn read_string(&mut self) -> Result<String, ParseError> {
        let token = self.expect(TokenKind::String)?;
        let content = token.string_content();
        E::to_string(content).map_err(|source| ParseError::new(source, token.line, token.column))
    }

    /// Reads a property name and the `:` that must follow it.
    ///
    /// # Errors
    ///
    /// A lexical error, or a token other than a string followed by `:`.
    pub fn read_name_token(&mut self) -> Result<Token<'a, E::Unit>, ParseError> {
        let name = self.expect(TokenKind::String)?;
        self.read_structural(TokenKind::NameValueSeparator, b':')?;
        Ok(name)
    }

    /// # Errors
    ///
    /// The next token is not an integer in `i32` range.
    pub fn read_int32(&mut self) -> Result<i32, ParseError> {
        self.read_integer(number::parse_i32)
    }

    /// # Errors
    ///
    /// The next token is not an integer in `i64` range.
    pub fn read_int64(&mut self) -> Result<i64, ParseError> {
        self.read_integer(number::parse_i64)
    }

    /// # Errors
    ///
    /// The next token is not an integer in `u32` range.
    pub fn read_uint32(&mut self) -> Result<u32, ParseError> {
        self.read_integer(number::parse_u32)
    }

    /// # Errors
    ///
    /// The next token is not an integer in `u64` range.
    pub fn read_uint64(&mut self) -> Result<u64, ParseError> {
        self.read_integer(number::parse_u64)
    }

    /// # Errors
    ///
    /// The next token is neither `true` nor `false`.
    pub fn read_boolean(&mut self) -> Result<bool, ParseError> {
        self.skip_insignificant()?;
        match self.input.get(self.index).and_then(|u| u.ascii()) {
            Some(b't') => self.lex_literal(TokenKind::True, "true").map(|_| true),
            Some(b'f') => self.lex_literal(TokenKind::False, "false").map(|_| false),
            _ => Err(self.mismatch(TokenKind::True)),
        }
    }

    /// # Errors
    ///
    /// The next token is not `null`.
    pub fn read_null(&mut self) -> Result<(), ParseError> {
        self.skip_insignificant()?;
        if self.unit_is(self.index, b'n') {
            self.lex_literal(TokenKind::Null, "null").map(|_| ())
        } else {
            Err(self.mismatch(TokenKind::Null))
        }
    }

    /// # Errors
    ///
    /// The next token is not `{`.
    pub fn read_begin_of_object(&mut self) -> Result<(), ParseError> {
        self.read_structural(TokenKind::BeginObject, b'{')
    }

    /// # Errors
    ///
    /// The next token is not `}`.
    pub fn read_end_of_object(&mut self) -> Result<(), ParseError> {
        self.read_structural(TokenKind::EndObject, b'}')
    }

    /// # Errors
    ///
    /// The next token is not `[`.
    pub fn read_begin_of_array(&mut self) -> Result<(), ParseError> {
        self.read_structural(TokenKind::BeginArray, b'[')
    }

    /// # Errors
    ///
    /// The next token is not `]`.
    pub fn read_end_of_array(&mut self) -> Result<(), ParseError> {
        self.read_structural(TokenKind::EndArray, b']')
    }

    /// # Errors
    ///
    /// The next token is not `:`.
    pub fn read_name_value_separator(&mut self) -> Result<(), ParseError> {
        self.read_structural(TokenKind::NameValueSeparator, b':')
    }

    /// # Errors
    ///
    /// The next token is not `,`.
    pub fn read_entry_separator(&mut self) -> Result<(), ParseError> {
        self.read_structural(TokenKind::EntrySeparator, b',')
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token<'a, E::Unit>, ParseError> {
        let token = self.next_token()?;
        if token.kind == expected {
            Ok(token)
        } else {
            Err(ParseError::new(
                LexError::UnexpectedToken {
                    expected,
                    found: token.kind,
                },
                token.line,
                token.column,
            ))
        }
    }

    fn read_structural(&mut self, expected: TokenKind, byte: u8) -> Result<(), ParseError> {
        self.skip_insignificant()?;
        if self.unit_is(self.index, byte) {
            self.advance_ascii(1);
            Ok(())
        } else {
            Err(self.mismatch(expected))
        }
    }

    fn read_integer<T>(
        &mut self,
        parse: impl FnOnce(&[E::Unit]) -> ParseOutcome<T>,
    ) -> Result<T, ParseError> {
        self.skip_insignificant()?;
        let start = self.index;
        if !matches!(
            self.input.get(start).and_then(|u| u.ascii()),
            Some(b'-' | b'0'..=b'9')
        ) {
            return Err(self.mismatch(TokenKind::IntegerNumber));
        }
        match parse(&self.input[start..]) {
            ParseOutcome::Success { consumed, .. } if self.unit_is(start + consumed, b'.') => {
                Err(self.error(LexError::ExpectedDigit {
                    after: DigitContext::DecimalSymbol,
                }))
            }
            ParseOutcome::Success { value, consumed } => {
                self.advance_ascii(consumed);
                Ok(value)
            }
            ParseOutcome::Overflow => Err(self.error(NumberError::Overflow {
                text: self.preview_word(start),
            })),
            ParseOutcome::NonZeroDigitsAfterDecimalPoint => {
                Err(self.error(NumberError::NonIntegerFraction {
                    text: self.preview_word(start),
                }))
            }
            ParseOutcome::NoNumber => Err(self.error(LexError::ExpectedDigit {
                after: DigitContext::MinusSign,
            })),
        }
    }

    /// Lexes whatever is at the current position and reports it as the wrong
    /// kind of token. Lexical errors in that token take precedence.
    fn mismatch(&mut self, expected: TokenKind) -> ParseError {
        match self.next_token() {
            Ok(found) => ParseError::new(
                LexError::UnexpectedToken {
                    expected,
                    found: found.kind,
                },
                found.line,
                found.column,
            ),
            Err(err) => err,
        }
    }

    fn skip_insignificant(&mut self) -> Result<(), ParseError> {
        loop {
            let Some(&unit) = self.input.get(self.index) else {
                return Ok(());
            };
            match unit.ascii() {
                Some(b' ' | b'\t') => self.advance_ascii(1),
                Some(b'\n') => {
                    self.index += 1;
                    self.new_line();
                }
                Some(b'\r') => {
                    if self.unit_is(self.index + 1, b'\n') {
                        self.index += 2;
                        self.new_line();
                    } else {
                        self.advance_ascii(1);
                    }
                }
                Some(b'/') if self.options.allow_comments && self.unit_is(self.index + 1, b'/') => {
                    self.skip_comment();
                }
                Some(_) => return Ok(()),
                None => {
                    if !self.options.allow_unicode_whitespace {
                        return Ok(());
                    }
                    match E::decode(self.input, self.index) {
                        Ok(Some(scalar)) if is_json_whitespace(scalar.value) => {
                            self.index += scalar.len;
                            self.column += 1;
                        }
                        Ok(_) => return Ok(()),
                        Err(source) => return Err(self.error(source)),
                    }
                }
            }
        }
    }

    /// Skips `//` and everything up to, but not including, the next line
    /// break.
    fn skip_comment(&mut self) {
        let input = self.input;
        let start = self.index;
        let end = input[start..]
            .iter()
            .position(|u| u.is(b'\n') || u.is(b'\r'))
            .map_or(input.len(), |offset| start + offset);
        self.column += E::count_scalars(&input[start..end]);
        self.index = end;
    }

    fn lex_literal(
        &mut self,
        kind: TokenKind,
        literal: &'static str,
    ) -> Result<Token<'a, E::Unit>, ParseError> {
        let start = self.index;
        let matches = self
            .input
            .get(start..start + literal.len())
            .is_some_and(|window| window.iter().zip(literal.bytes()).all(|(u, b)| u.is(b)));
        if !matches {
            return Err(self.error(LexError::ExpectedLiteral {
                expected: literal,
                found: self.preview_word(start),
            }));
        }
        self.advance_ascii(literal.len());
        Ok(self.token(kind, start))
    }

    fn lex_number(&mut self) -> Result<Token<'a, E::Unit>, ParseError> {
        let start = self.index;
        let mut end = start;
        if self.unit_is(end, b'-') {
            end += 1;
            if self.digit_run(end) == 0 {
                return Err(self.error(LexError::ExpectedDigit {
                    after: DigitContext::MinusSign,
                }));
            }
        }
        end += self.digit_run(end);

        let mut kind = TokenKind::IntegerNumber;
        if self.unit_is(end, b'.') {
            let fraction = self.digit_run(end + 1);
            if fraction == 0 {
                return Err(self.error(LexError::ExpectedDigit {
                    after: DigitContext::DecimalSymbol,
                }));
            }
            end += 1 + fraction;
            kind = TokenKind::FloatingPointNumber;
        }

        self.advance_ascii(end - start);
        Ok(self.token(kind, start))
    }

    fn unexpected_character(&self) -> ParseError {
        match E::decode(self.input, self.index) {
            Ok(scalar) => {
                let len = scalar.map_or(0, |scalar| scalar.len);
                self.error(LexError::UnexpectedCharacter {
                    found: E::preview(&self.input[self.index..self.index + len]),
                })
            }
            Err(source) => self.error(source),
        }
    }

    /// A preview of the word starting at `start`, ending before the next
    /// whitespace, quote, or structural character.
    fn preview_word(&self, start: usize) -> String {
        let rest = &self.input[start..];
        let rest = &rest[..rest.len().min(MAX_PREVIEW_CHARS * 4)];
        let end = rest
            .iter()
            .position(|u| {
                matches!(
                    u.ascii(),
                    Some(b' ' | b'\t' | b'\r' | b'\n' | b'"' | b',' | b':' | b'[' | b']' | b'{' | b'}')
                )
            })
            .unwrap_or(rest.len());
        E::preview(&rest[..end])
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'a, E::Unit> {
        let input = self.input;
        let len = self.index - start;
        Token {
            kind,
            text: Cow::Borrowed(&input[start..self.index]),
            line: self.line,
            // Tokens built here are ASCII, so the start column is a
            // subtraction away.
            column: self.column - len,
        }
    }

    fn error(&self, source: impl Into<ErrorSource>) -> ParseError {
        ParseError::new(source, self.line, self.column)
    }

    #[inline]
    fn unit_is(&self, index: usize, byte: u8) -> bool {
        self.input.get(index).is_some_and(|u| u.is(byte))
    }

    #[inline]
    fn digit_run(&self, from: usize) -> usize {
        self.input
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|u| u.digit().is_some()).count())
    }

    #[inline]
    fn advance_ascii(&mut self, units: usize) {
        self.index += units;
        self.column += units;
    }

    #[inline]
    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }
}

impl<'a> Tokenizer<'a, Utf8> {
    /// Reads a string token as `str`, borrowing from the input when the
    /// string has no escape sequences.
    ///
    /// # Errors
    ///
    /// A lexical error, a token of another kind, or invalid UTF-8 content.
    pub fn read_str(&mut self) -> Result<Cow<'a, str>, ParseError> {
        let token = self.expect(TokenKind::String)?;
        let (line, column) = (token.line, token.column);
        let positioned = |source: ErrorSource| ParseError::new(source, line, column);
        match token.text {
            Cow::Borrowed(text) => {
                let content = &text[1..text.len() - 1];
                core::str::from_utf8(content)
                    .map(Cow::Borrowed)
                    .map_err(|err| positioned(classify_invalid_utf8(content, err.valid_up_to()).into()))
            }
            Cow::Owned(mut text) => {
                text.pop();
                text.remove(0);
                Utf8::into_string(text).map(Cow::Owned).map_err(positioned)
            }
        }
    }
}

impl<'a, E: Encoding> Iterator for Tokenizer<'a, E> {
    type Item = Result<Token<'a, E::Unit>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        self.finished = !matches!(&result, Ok(token) if token.kind != TokenKind::EndOfDocument);
        Some(result)
    }
}

impl<E: Encoding> core::iter::FusedIterator for Tokenizer<'_, E> {}
