//! Byte-level UTF-8 scalar decoding.
//!
//! The decoder classifies a scalar by its lead byte only and never panics on
//! out-of-range offsets, so the tokenizer can use it to probe past the end of
//! its content (for example when looking for a second `/` to start a
//! comment). Full validation of continuation bytes happens later, when a
//! string token is converted into a Rust `String`; [`classify_invalid_utf8`]
//! explains those failures in the same vocabulary.

use crate::error::Utf8Error;

/// A decoded Unicode scalar and the number of bytes it occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scalar {
    pub value: u32,
    /// Encoded length in bytes (1-4).
    pub len: usize,
}

impl Scalar {
    /// Re-encodes the scalar as UTF-16, returning the number of code units
    /// written (1 or 2).
    pub fn encode_utf16(self, out: &mut [u16; 2]) -> usize {
        encode_utf16(self.value, out)
    }
}

/// Determines the byte length of the scalar starting at `start`.
///
/// # Errors
///
/// - [`Utf8Error::InvalidStartIndex`] if `start` is past the end of `bytes`
///   or points at a continuation byte (`10xxxxxx`).
/// - [`Utf8Error::InvalidLeadByte`] for lead bytes matching no UTF-8 pattern.
/// - [`Utf8Error::InsufficientBytes`] if the sequence is cut off.
#[inline]
pub fn decode_scalar_len(bytes: &[u8], start: usize) -> Result<usize, Utf8Error> {
    let Some(&lead) = bytes.get(start) else {
        return Err(Utf8Error::InvalidStartIndex);
    };

    // ASCII dominates JSON text.
    let len = if lead & 0b1000_0000 == 0 {
        return Ok(1);
    } else if lead & 0b1110_0000 == 0b1100_0000 {
        2
    } else if lead & 0b1111_0000 == 0b1110_0000 {
        3
    } else if lead & 0b1111_1000 == 0b1111_0000 {
        4
    } else if lead & 0b1100_0000 == 0b1000_0000 {
        return Err(Utf8Error::InvalidStartIndex);
    } else {
        return Err(Utf8Error::InvalidLeadByte);
    };

    if bytes.len() - start < len {
        return Err(Utf8Error::InsufficientBytes);
    }
    Ok(len)
}

/// Decodes the scalar value starting at `start`.
///
/// # Errors
///
/// Same classification as [`decode_scalar_len`].
#[inline]
pub fn decode_scalar(bytes: &[u8], start: usize) -> Result<Scalar, Utf8Error> {
    let len = decode_scalar_len(bytes, start)?;
    let seq = &bytes[start..start + len];
    let value = match *seq {
        [a] => u32::from(a),
        [a, b] => (u32::from(a & 0x1F) << 6) | u32::from(b & 0x3F),
        [a, b, c] => {
            (u32::from(a & 0x0F) << 12) | (u32::from(b & 0x3F) << 6) | u32::from(c & 0x3F)
        }
        [a, b, c, d] => {
            (u32::from(a & 0x07) << 18)
                | (u32::from(b & 0x3F) << 12)
                | (u32::from(c & 0x3F) << 6)
                | u32::from(d & 0x3F)
        }
        _ => return Err(Utf8Error::InsufficientBytes),
    };
    Ok(Scalar { value, len })
}

/// Explains why `bytes` stopped being valid UTF-8 at `offset` (as reported by
/// `core::str::from_utf8`).
#[must_use]
pub fn classify_invalid_utf8(bytes: &[u8], offset: usize) -> Utf8Error {
    match decode_scalar_len(bytes, offset) {
        Ok(_) => Utf8Error::MalformedSequence,
        Err(err) => err,
    }
}

/// Number of bytes needed to encode `scalar` as UTF-8.
#[inline]
#[must_use]
pub const fn encoded_len(scalar: u32) -> usize {
    if scalar < 0x80 {
        1
    } else if scalar < 0x800 {
        2
    } else if scalar < 0x1_0000 {
        3
    } else {
        4
    }
}

/// Writes `scalar` as UTF-8 into `out` and returns the number of bytes used.
///
/// Surrogate code points are encoded with the generic three-byte pattern;
/// callers decide whether they are acceptable.
#[inline]
#[expect(clippy::cast_possible_truncation)]
pub fn encode_scalar(scalar: u32, out: &mut [u8]) -> usize {
    match encoded_len(scalar) {
        1 => {
            out[0] = scalar as u8;
            1
        }
        2 => {
            out[0] = 0xC0 | (scalar >> 6) as u8;
            out[1] = 0x80 | (scalar & 0x3F) as u8;
            2
        }
        3 => {
            out[0] = 0xE0 | (scalar >> 12) as u8;
            out[1] = 0x80 | ((scalar >> 6) & 0x3F) as u8;
            out[2] = 0x80 | (scalar & 0x3F) as u8;
            3
        }
        _ => {
            out[0] = 0xF0 | (scalar >> 18) as u8;
            out[1] = 0x80 | ((scalar >> 12) & 0x3F) as u8;
            out[2] = 0x80 | ((scalar >> 6) & 0x3F) as u8;
            out[3] = 0x80 | (scalar & 0x3F) as u8;
            4
        }
    }
}

#[expect(clippy::cast_possible_truncation)]
pub(crate) fn encode_utf16(scalar: u32, out: &mut [u16; 2]) -> usize {
    if scalar < 0x1_0000 {
        out[0] = scalar as u16;
        1
    } else {
        let offset = scalar - 0x1_0000;
        out[0] = 0xD800 | (offset >> 10) as u16;
        out[1] = 0xDC00 | (offset & 0x3FF) as u16;
        2
    }
}

/// JSON whitespace, including the extended Unicode space separators.
#[inline]
#[must_use]
pub const fn is_json_whitespace(scalar: u32) -> bool {
    matches!(
        scalar,
        0x20 | 0x09
            | 0x0A
            | 0x0D
            | 0x85
            | 0xA0
            | 0x1680
            | 0x180E
            | 0x2000..=0x200D
            | 0x2028
            | 0x2029
            | 0x202F
            | 0x205F
            | 0x2060
            | 0x3000
            | 0xFEFF
    )
}

#[inline]
#[must_use]
pub const fn is_ascii_digit(scalar: u32) -> bool {
    matches!(scalar, 0x30..=0x39)
}
