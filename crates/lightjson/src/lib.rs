//! A JSON tokenizer and low-level writer that work directly on UTF-8 byte
//! buffers or UTF-16 code unit buffers.
//!
//! Tokens are views into the input; only strings with escape sequences are
//! copied. The writer emits syntax, escaped strings and integers into
//! storage leased from a [`BufferProvider`], and hands the result back as a
//! [`JsonOutput`] that returns the storage when dropped.
//!
//! ```rust
//! use lightjson::{TokenKind, Utf8JsonWriter, Utf8Tokenizer};
//!
//! let mut writer = Utf8JsonWriter::new();
//! writer.write_begin_of_object().unwrap();
//! writer.write_property_name("age").unwrap();
//! writer.write_integer(42).unwrap();
//! writer.write_end_of_object().unwrap();
//! let output = writer.finish();
//! assert_eq!(output.as_str().unwrap(), r#"{"age":42}"#);
//!
//! let mut tokenizer = Utf8Tokenizer::new(&output);
//! tokenizer.read_begin_of_object().unwrap();
//! assert_eq!(tokenizer.read_name_token().unwrap().string_content(), b"age");
//! assert_eq!(tokenizer.read_int32().unwrap(), 42);
//! tokenizer.read_end_of_object().unwrap();
//! assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::EndOfDocument);
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod buffer;
mod constant;
mod encoding;
mod error;
pub mod number;
mod options;
pub mod tokenizer;
mod unit;
pub mod utf8;
pub mod writer;

#[cfg(feature = "std")]
pub use buffer::{BufferPool, PooledProvider, ThreadLocalProvider};
pub use buffer::{BufferProvider, Growth, GrowthStrategy, HeapProvider};
pub use constant::ConstantValue;
pub use encoding::{Encoding, Utf8, Utf16};
pub use error::{
    CapacityError, DigitContext, EncodingError, ErrorSource, LexError, MAX_PREVIEW_CHARS,
    NumberError, ParseError, Utf8Error, WriteError,
};
pub use number::ParseOutcome;
pub use options::{TokenizerOptions, WriterOptions};
pub use tokenizer::{Position, Token, TokenKind, Tokenizer, Utf8Tokenizer, Utf16Tokenizer};
pub use unit::CodeUnit;
pub use writer::{JsonInteger, JsonOutput, JsonWriter, Utf8JsonWriter, Utf16JsonWriter};
