use alloc::string::String;

use thiserror::Error;

use crate::tokenizer::TokenKind;

/// Upper bound on the number of characters of offending input copied into an
/// error message.
pub const MAX_PREVIEW_CHARS: usize = 40;

/// A terminal tokenizer failure, positioned at the 1-based line and column
/// where the offending token starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{source} at {line}:{column}")]
pub struct ParseError {
    pub(crate) source: ErrorSource,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub(crate) fn new(source: impl Into<ErrorSource>, line: usize, column: usize) -> Self {
        Self {
            source: source.into(),
            line,
            column,
        }
    }

    /// The classified cause of this error.
    #[must_use]
    pub fn kind(&self) -> &ErrorSource {
        &self.source
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorSource {
    #[error("syntax error: {0}")]
    Lex(#[from] LexError),
    #[error("number error: {0}")]
    Number(#[from] NumberError),
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character \"{found}\"")]
    UnexpectedCharacter { found: String },
    #[error("unterminated string {token}")]
    UnterminatedString { token: String },
    #[error("invalid escape sequence in string {token}")]
    InvalidEscapeSequence { token: String },
    #[error("unescaped control character in string {token}")]
    ControlCharacterInString { token: String },
    #[error("expected token \"{expected}\" but found \"{found}\"")]
    ExpectedLiteral {
        expected: &'static str,
        found: String,
    },
    #[error("expected digit after {after}")]
    ExpectedDigit { after: DigitContext },
    #[error("expected {expected} but found {found}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
    },
}

/// What a missing digit was supposed to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitContext {
    MinusSign,
    DecimalSymbol,
}

impl core::fmt::Display for DigitContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DigitContext::MinusSign => f.write_str("minus sign"),
            DigitContext::DecimalSymbol => f.write_str("decimal symbol"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumberError {
    #[error("number {text} does not fit the target integer type")]
    Overflow { text: String },
    #[error("number {text} has non-zero digits after the decimal point")]
    NonIntegerFraction { text: String },
}

/// Classification of a malformed UTF-8 sequence.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Error {
    #[error("start index is out of range or points at a continuation byte")]
    InvalidStartIndex,
    #[error("sequence is truncated")]
    InsufficientBytes,
    #[error("invalid lead byte")]
    InvalidLeadByte,
    #[error("malformed continuation bytes or scalar value")]
    MalformedSequence,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("unpaired surrogate at index {index} in \"{text}\"")]
    UnpairedSurrogate { text: String, index: usize },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityError {
    /// The value does not fit even the largest permitted buffer.
    #[error("{required} units required but the maximum buffer size is {maximum}")]
    MaximumBufferSizeExceeded { required: usize, maximum: usize },
    #[error("requested buffer size overflows usize")]
    SizeOverflow,
}

/// A terminal writer failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}
