use alloc::{boxed::Box, string::String, vec::Vec};

use crate::writer::escape::{Escape, escape_for, unicode_escape};

/// A JSON fragment encoded once into both UTF-8 and UTF-16, so writers of
/// either encoding can copy it without transcoding.
///
/// Typical constants are property names and fixed values owned by a
/// serialization contract and written over and over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantValue {
    text: Box<str>,
    utf16: Box<[u16]>,
}

impl ConstantValue {
    /// Wraps JSON text that is written verbatim, such as `true` or a
    /// pre-quoted name.
    #[must_use]
    pub fn raw(json: &str) -> Self {
        Self {
            text: json.into(),
            utf16: json.encode_utf16().collect::<Vec<_>>().into_boxed_slice(),
        }
    }

    /// Quotes and escapes `value` as a JSON string.
    #[must_use]
    pub fn string(value: &str) -> Self {
        let mut json = String::with_capacity(value.len() + 2);
        json.push('"');
        for c in value.chars() {
            let Ok(byte) = u8::try_from(c) else {
                json.push(c);
                continue;
            };
            match escape_for(byte) {
                Escape::None => json.push(c),
                Escape::Short(short) => {
                    json.push('\\');
                    json.push(char::from(short));
                }
                Escape::Unicode => json.extend(unicode_escape(byte).map(char::from)),
            }
        }
        json.push('"');
        Self::raw(&json)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn utf8(&self) -> &[u8] {
        self.text.as_bytes()
    }

    #[must_use]
    pub fn utf16(&self) -> &[u16] {
        &self.utf16
    }
}
