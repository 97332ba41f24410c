use alloc::{borrow::Cow, string::String};
use core::fmt;

use crate::{
    encoding::Encoding,
    error::ErrorSource,
    unit::CodeUnit,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    String,
    IntegerNumber,
    FloatingPointNumber,
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    NameValueSeparator,
    EntrySeparator,
    True,
    False,
    Null,
    EndOfDocument,
}

impl TokenKind {
    /// The structural token for a single ASCII character.
    #[must_use]
    pub(crate) fn structural(byte: u8) -> Option<TokenKind> {
        Some(match byte {
            b'{' => TokenKind::BeginObject,
            b'}' => TokenKind::EndObject,
            b'[' => TokenKind::BeginArray,
            b']' => TokenKind::EndArray,
            b':' => TokenKind::NameValueSeparator,
            b',' => TokenKind::EntrySeparator,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::String => "string",
            TokenKind::IntegerNumber => "integer number",
            TokenKind::FloatingPointNumber => "floating point number",
            TokenKind::BeginObject => "\"{\"",
            TokenKind::EndObject => "\"}\"",
            TokenKind::BeginArray => "\"[\"",
            TokenKind::EndArray => "\"]\"",
            TokenKind::NameValueSeparator => "\":\"",
            TokenKind::EntrySeparator => "\",\"",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::EndOfDocument => "end of document",
        };
        f.write_str(name)
    }
}

/// A 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

/// A classified, positioned slice of tokenizer input.
///
/// `text` borrows from the input buffer. The only exception is a string
/// token containing escape sequences, whose decoded text is owned. String
/// tokens keep their surrounding quotes in both cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a, U: CodeUnit> {
    pub kind: TokenKind,
    pub text: Cow<'a, [U]>,
    pub line: usize,
    pub column: usize,
}

impl<'a, U: CodeUnit> Token<'a, U> {
    #[must_use]
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    /// Whether the text is a view into the input rather than a decoded copy.
    #[must_use]
    pub fn is_borrowed(&self) -> bool {
        matches!(self.text, Cow::Borrowed(_))
    }

    /// The text of a string token without its quotes; other tokens are
    /// returned unchanged.
    #[must_use]
    pub fn string_content(&self) -> &[U] {
        let text: &[U] = &self.text;
        if self.kind == TokenKind::String && text.len() >= 2 {
            &text[1..text.len() - 1]
        } else {
            text
        }
    }

    /// Decodes the token text (string tokens without quotes).
    ///
    /// # Errors
    ///
    /// Text that is not well-formed in encoding `E`.
    pub fn to_string<E: Encoding<Unit = U>>(&self) -> Result<String, ErrorSource> {
        E::to_string(self.string_content())
    }

    /// Detaches the token from the input buffer.
    #[must_use]
    pub fn into_owned(self) -> Token<'static, U> {
        Token {
            kind: self.kind,
            text: Cow::Owned(self.text.into_owned()),
            line: self.line,
            column: self.column,
        }
    }
}
