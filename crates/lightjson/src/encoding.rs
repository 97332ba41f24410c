//! The two encodings the tokenizer and writer are generic over.
//!
//! JSON syntax is pure ASCII, so almost all of the codec is written once
//! against [`CodeUnit`]. The places where UTF-8 and UTF-16 genuinely differ
//! (decoding a scalar, re-encoding an escaped scalar, turning a token back
//! into a Rust `String`) are collected in the [`Encoding`] trait.

use alloc::{string::String, vec::Vec};
use core::fmt::Debug;

use bstr::ByteSlice;

use crate::{
    constant::ConstantValue,
    error::{EncodingError, ErrorSource, MAX_PREVIEW_CHARS},
    unit::CodeUnit,
    utf8::{self, Scalar},
};

/// A text encoding for JSON input and output buffers.
pub trait Encoding: Copy + Debug + Default + 'static {
    type Unit: CodeUnit;

    /// Whether a lone surrogate produced by a `\uXXXX` escape can be stored.
    const KEEPS_LONE_SURROGATES: bool;

    /// Decodes the scalar at `index`. `Scalar::len` counts units of this
    /// encoding. Returns `Ok(None)` at the end of `input`.
    ///
    /// # Errors
    ///
    /// Malformed UTF-8 lead bytes or truncated sequences.
    fn decode(input: &[Self::Unit], index: usize) -> Result<Option<Scalar>, ErrorSource>;

    /// Number of units needed to encode `scalar`.
    fn scalar_len(scalar: u32) -> usize;

    /// Encodes `scalar` into the front of `out`, returning the units written.
    fn encode(scalar: u32, out: &mut [Self::Unit]) -> usize;

    /// Counts the scalars (not units) in `units`.
    fn count_scalars(units: &[Self::Unit]) -> usize;

    /// # Errors
    ///
    /// Input that is not well-formed in this encoding.
    fn to_string(units: &[Self::Unit]) -> Result<String, ErrorSource>;

    /// Like [`Encoding::to_string`], reusing the allocation where possible.
    ///
    /// # Errors
    ///
    /// Input that is not well-formed in this encoding.
    fn into_string(units: Vec<Self::Unit>) -> Result<String, ErrorSource> {
        Self::to_string(&units)
    }

    /// A lossy rendering of at most [`MAX_PREVIEW_CHARS`] characters, used in
    /// error messages.
    fn preview(units: &[Self::Unit]) -> String;

    /// The pre-encoded form of a constant in this encoding.
    fn constant(value: &ConstantValue) -> &[Self::Unit];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf16;

impl Encoding for Utf8 {
    type Unit = u8;

    const KEEPS_LONE_SURROGATES: bool = false;

    #[inline]
    fn decode(input: &[u8], index: usize) -> Result<Option<Scalar>, ErrorSource> {
        if index >= input.len() {
            return Ok(None);
        }
        utf8::decode_scalar(input, index)
            .map(Some)
            .map_err(ErrorSource::from)
    }

    #[inline]
    fn scalar_len(scalar: u32) -> usize {
        utf8::encoded_len(scalar)
    }

    #[inline]
    fn encode(scalar: u32, out: &mut [u8]) -> usize {
        utf8::encode_scalar(scalar, out)
    }

    fn count_scalars(units: &[u8]) -> usize {
        units.iter().filter(|&&b| b & 0xC0 != 0x80).count()
    }

    fn to_string(units: &[u8]) -> Result<String, ErrorSource> {
        match core::str::from_utf8(units) {
            Ok(text) => Ok(String::from(text)),
            Err(err) => Err(utf8::classify_invalid_utf8(units, err.valid_up_to()).into()),
        }
    }

    fn into_string(units: Vec<u8>) -> Result<String, ErrorSource> {
        String::from_utf8(units).map_err(|err| {
            utf8::classify_invalid_utf8(err.as_bytes(), err.utf8_error().valid_up_to()).into()
        })
    }

    fn preview(units: &[u8]) -> String {
        units.chars().take(MAX_PREVIEW_CHARS).collect()
    }

    fn constant(value: &ConstantValue) -> &[u8] {
        value.utf8()
    }
}

impl Encoding for Utf16 {
    type Unit = u16;

    const KEEPS_LONE_SURROGATES: bool = true;

    #[inline]
    fn decode(input: &[u16], index: usize) -> Result<Option<Scalar>, ErrorSource> {
        let Some(&unit) = input.get(index) else {
            return Ok(None);
        };
        let value = u32::from(unit);
        if is_high_surrogate(value) {
            if let Some(&low) = input.get(index + 1) {
                let low = u32::from(low);
                if is_low_surrogate(low) {
                    return Ok(Some(Scalar {
                        value: combine_surrogates(value, low),
                        len: 2,
                    }));
                }
            }
        }
        // Lone surrogates decode as themselves and are rejected by whoever
        // inspects the scalar.
        Ok(Some(Scalar { value, len: 1 }))
    }

    #[inline]
    fn scalar_len(scalar: u32) -> usize {
        if scalar < 0x1_0000 { 1 } else { 2 }
    }

    #[inline]
    fn encode(scalar: u32, out: &mut [u16]) -> usize {
        let mut pair = [0u16; 2];
        let n = utf8::encode_utf16(scalar, &mut pair);
        out[..n].copy_from_slice(&pair[..n]);
        n
    }

    fn count_scalars(units: &[u16]) -> usize {
        units
            .iter()
            .filter(|&&u| !is_low_surrogate(u32::from(u)))
            .count()
    }

    fn to_string(units: &[u16]) -> Result<String, ErrorSource> {
        if let Some(index) = first_unpaired_surrogate(units) {
            return Err(EncodingError::UnpairedSurrogate {
                text: Self::preview(units),
                index,
            }
            .into());
        }
        Ok(char::decode_utf16(units.iter().copied())
            .filter_map(Result::ok)
            .collect())
    }

    fn preview(units: &[u16]) -> String {
        char::decode_utf16(units.iter().copied())
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .take(MAX_PREVIEW_CHARS)
            .collect()
    }

    fn constant(value: &ConstantValue) -> &[u16] {
        value.utf16()
    }
}

#[inline]
pub(crate) const fn is_high_surrogate(value: u32) -> bool {
    matches!(value, 0xD800..=0xDBFF)
}

#[inline]
pub(crate) const fn is_low_surrogate(value: u32) -> bool {
    matches!(value, 0xDC00..=0xDFFF)
}

#[inline]
pub(crate) const fn combine_surrogates(high: u32, low: u32) -> u32 {
    0x1_0000 + ((high - 0xD800) << 10) + (low - 0xDC00)
}

/// Index of the first UTF-16 unit that is not part of a valid pair.
pub(crate) fn first_unpaired_surrogate(units: &[u16]) -> Option<usize> {
    let mut i = 0;
    while i < units.len() {
        let unit = u32::from(units[i]);
        if is_high_surrogate(unit) {
            match units.get(i + 1) {
                Some(&low) if is_low_surrogate(u32::from(low)) => i += 2,
                _ => return Some(i),
            }
        } else if is_low_surrogate(unit) {
            return Some(i);
        } else {
            i += 1;
        }
    }
    None
}
