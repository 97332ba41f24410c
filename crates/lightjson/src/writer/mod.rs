//! Low-level JSON writer over provider-owned storage.
//!
//! The writer does not track nesting or validate the document it produces; it
//! emits exactly the syntax it is asked for. Every write first reserves its
//! worst-case ASCII size, either from the current position
//! ([`JsonWriter::ensure_capacity_from_current_index`]) or on top of the
//! previous reservation ([`JsonWriter::ensure_additional_capacity`]), and
//! then stores units by index without further checks. The provider is only
//! consulted when a reservation runs past the end of the buffer.

mod digits;
pub(crate) mod escape;

use alloc::{string::String, vec::Vec};
use core::{marker::PhantomData, mem, ops::Deref};

use self::{
    digits::{digit_count, write_digits},
    escape::{Escape, escape_for, unicode_escape},
};
use crate::{
    buffer::{BufferProvider, HeapProvider},
    constant::ConstantValue,
    encoding::{Encoding, Utf8, Utf16, first_unpaired_surrogate},
    error::{CapacityError, EncodingError, ErrorSource, Utf8Error, WriteError},
    options::WriterOptions,
    unit::CodeUnit,
    utf8::classify_invalid_utf8,
};

pub type Utf8JsonWriter<P = HeapProvider> = JsonWriter<Utf8, P>;
pub type Utf16JsonWriter<P = HeapProvider> = JsonWriter<Utf16, P>;

/// The decimal form of an integer, as the writer needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalParts {
    /// The minimum of a signed type, whose magnitude has no positive
    /// counterpart of the same width.
    Literal(&'static str),
    Digits { negative: bool, magnitude: u64 },
}

/// Integers the writer can emit.
pub trait JsonInteger: Copy {
    fn decimal_parts(self) -> DecimalParts;
}

impl JsonInteger for i32 {
    #[inline]
    fn decimal_parts(self) -> DecimalParts {
        if self == i32::MIN {
            return DecimalParts::Literal("-2147483648");
        }
        DecimalParts::Digits {
            negative: self < 0,
            magnitude: u64::from(self.unsigned_abs()),
        }
    }
}

impl JsonInteger for i64 {
    #[inline]
    fn decimal_parts(self) -> DecimalParts {
        if self == i64::MIN {
            return DecimalParts::Literal("-9223372036854775808");
        }
        DecimalParts::Digits {
            negative: self < 0,
            magnitude: self.unsigned_abs(),
        }
    }
}

impl JsonInteger for u32 {
    #[inline]
    fn decimal_parts(self) -> DecimalParts {
        DecimalParts::Digits {
            negative: false,
            magnitude: u64::from(self),
        }
    }
}

impl JsonInteger for u64 {
    #[inline]
    fn decimal_parts(self) -> DecimalParts {
        DecimalParts::Digits {
            negative: false,
            magnitude: self,
        }
    }
}

/// A single-pass JSON writer producing UTF-8 (`E = Utf8`) or UTF-16
/// (`E = Utf16`) output.
///
/// Dropping an unfinished writer returns its buffer to the provider.
#[derive(Debug)]
pub struct JsonWriter<E: Encoding, P: BufferProvider<E::Unit> = HeapProvider> {
    output: JsonOutput<E::Unit, P>,
    ensured_index: usize,
    _encoding: PhantomData<E>,
}

impl<E: Encoding> JsonWriter<E, HeapProvider> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(WriterOptions::default())
    }

    #[must_use]
    pub fn with_options(options: WriterOptions) -> Self {
        Self::with_provider(HeapProvider::new(options))
    }
}

impl<E: Encoding> Default for JsonWriter<E, HeapProvider> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Encoding, P: BufferProvider<E::Unit>> JsonWriter<E, P> {
    #[must_use]
    pub fn with_provider(mut provider: P) -> Self {
        let buffer = provider.initial_buffer();
        Self {
            output: JsonOutput {
                buffer,
                len: 0,
                provider,
            },
            ensured_index: 0,
            _encoding: PhantomData,
        }
    }

    /// Number of units written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.output.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.output.len == 0
    }

    /// The output written so far.
    #[must_use]
    pub fn written(&self) -> &[E::Unit] {
        self.output.as_slice()
    }

    /// Ends writing and hands the output, together with the responsibility
    /// to release it, to the caller.
    #[must_use]
    pub fn finish(self) -> JsonOutput<E::Unit, P> {
        self.output
    }

    /// Reserves room for `units` more units starting at the current write
    /// position.
    ///
    /// # Errors
    ///
    /// The buffer cannot grow that far.
    #[inline]
    pub fn ensure_capacity_from_current_index(&mut self, units: usize) -> Result<(), CapacityError> {
        let required = self
            .output
            .len
            .checked_add(units)
            .ok_or(CapacityError::SizeOverflow)?;
        self.reserve_through(required)
    }

    /// Extends the current reservation by `units`.
    ///
    /// # Errors
    ///
    /// The buffer cannot grow that far.
    #[inline]
    pub fn ensure_additional_capacity(&mut self, units: usize) -> Result<(), CapacityError> {
        let required = self
            .ensured_index
            .checked_add(units)
            .ok_or(CapacityError::SizeOverflow)?;
        self.reserve_through(required)
    }

    #[inline]
    fn reserve_through(&mut self, required: usize) -> Result<(), CapacityError> {
        let available = self.output.buffer.len();
        if required > available {
            self.grow(required - available)?;
        }
        self.ensured_index = required;
        Ok(())
    }

    #[cold]
    fn grow(&mut self, additional: usize) -> Result<(), CapacityError> {
        let output = &mut self.output;
        output
            .provider
            .grow_buffer(&mut output.buffer, output.len, additional)
    }

    #[inline(always)]
    fn put(&mut self, byte: u8) {
        self.put_unit(E::Unit::from_ascii(byte));
    }

    #[inline(always)]
    fn put_unit(&mut self, unit: E::Unit) {
        debug_assert!(self.output.len < self.ensured_index);
        self.output.buffer[self.output.len] = unit;
        self.output.len += 1;
    }

    fn put_units(&mut self, units: &[E::Unit]) {
        let start = self.output.len;
        self.output.buffer[start..start + units.len()].copy_from_slice(units);
        self.output.len += units.len();
    }

    #[inline]
    fn write_ascii(&mut self, byte: u8) -> Result<(), WriteError> {
        self.ensure_capacity_from_current_index(1)?;
        self.put(byte);
        Ok(())
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_begin_of_object(&mut self) -> Result<(), WriteError> {
        self.write_ascii(b'{')
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_end_of_object(&mut self) -> Result<(), WriteError> {
        self.write_ascii(b'}')
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_begin_of_array(&mut self) -> Result<(), WriteError> {
        self.write_ascii(b'[')
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_end_of_array(&mut self) -> Result<(), WriteError> {
        self.write_ascii(b']')
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_name_value_separator(&mut self) -> Result<(), WriteError> {
        self.write_ascii(b':')
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_entry_separator(&mut self) -> Result<(), WriteError> {
        self.write_ascii(b',')
    }

    fn write_literal(&mut self, literal: &str) -> Result<(), WriteError> {
        self.ensure_capacity_from_current_index(literal.len())?;
        for byte in literal.bytes() {
            self.put(byte);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_true(&mut self) -> Result<(), WriteError> {
        self.write_literal("true")
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_false(&mut self) -> Result<(), WriteError> {
        self.write_literal("false")
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_boolean(&mut self, value: bool) -> Result<(), WriteError> {
        if value {
            self.write_true()
        } else {
            self.write_false()
        }
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_null(&mut self) -> Result<(), WriteError> {
        self.write_literal("null")
    }

    /// Writes `value` as a quoted, escaped JSON string.
    ///
    /// `"`, `\` and control characters are escaped; everything else,
    /// including `/` and non-ASCII text, is written as-is in the target
    /// encoding.
    ///
    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_string(&mut self, value: &str) -> Result<(), WriteError> {
        // Every scalar needs at most as many units in the target encoding as
        // it has UTF-8 bytes, so only escapes need more room.
        self.ensure_capacity_from_current_index(value.len() + 2)?;
        self.put(b'"');
        for c in value.chars() {
            self.write_string_scalar(u32::from(c), c.len_utf8())?;
        }
        self.put(b'"');
        Ok(())
    }

    /// Writes UTF-16 text as a quoted, escaped JSON string, transcoding it
    /// for a UTF-8 target.
    ///
    /// # Errors
    ///
    /// [`EncodingError::UnpairedSurrogate`] if `value` contains a lone
    /// surrogate and the target is UTF-8; the buffer cannot grow.
    pub fn write_utf16_string(&mut self, value: &[u16]) -> Result<(), WriteError> {
        if !E::KEEPS_LONE_SURROGATES {
            if let Some(index) = first_unpaired_surrogate(value) {
                return Err(EncodingError::UnpairedSurrogate {
                    text: Utf16::preview(value),
                    index,
                }
                .into());
            }
        }

        self.ensure_capacity_from_current_index(value.len() + 2)?;
        self.put(b'"');
        let mut i = 0;
        while let Ok(Some(scalar)) = Utf16::decode(value, i) {
            self.write_string_scalar(scalar.value, scalar.len)?;
            i += scalar.len;
        }
        self.put(b'"');
        Ok(())
    }

    /// Writes one scalar of string content, for which `reserved` units have
    /// already been reserved.
    #[inline]
    fn write_string_scalar(&mut self, scalar: u32, reserved: usize) -> Result<(), WriteError> {
        if let Some(byte) = u8::try_from(scalar).ok().filter(u8::is_ascii) {
            match escape_for(byte) {
                Escape::None => self.put(byte),
                Escape::Short(short) => {
                    self.ensure_additional_capacity(1)?;
                    self.put(b'\\');
                    self.put(short);
                }
                Escape::Unicode => {
                    self.ensure_additional_capacity(5)?;
                    for unit in unicode_escape(byte) {
                        self.put(unit);
                    }
                }
            }
            return Ok(());
        }

        let needed = E::scalar_len(scalar);
        if needed > reserved {
            self.ensure_additional_capacity(needed - reserved)?;
        }
        let start = self.output.len;
        self.output.len += E::encode(scalar, &mut self.output.buffer[start..]);
        Ok(())
    }

    /// Writes `name` as a string followed by `:`.
    ///
    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_property_name(&mut self, name: &str) -> Result<(), WriteError> {
        self.write_string(name)?;
        self.write_name_value_separator()
    }

    /// Copies the pre-encoded form of `constant`.
    ///
    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_constant(&mut self, constant: &ConstantValue) -> Result<(), WriteError> {
        let units = E::constant(constant);
        self.ensure_capacity_from_current_index(units.len())?;
        self.put_units(units);
        Ok(())
    }

    /// Writes an integer in decimal, reserving exactly the units it needs.
    ///
    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_integer<T: JsonInteger>(&mut self, value: T) -> Result<(), WriteError> {
        match value.decimal_parts() {
            DecimalParts::Literal(literal) => self.write_literal(literal),
            DecimalParts::Digits {
                negative,
                magnitude,
            } => {
                let digits = digit_count(magnitude);
                self.ensure_capacity_from_current_index(digits + usize::from(negative))?;
                if negative {
                    self.put(b'-');
                }
                let start = self.output.len;
                write_digits(magnitude, &mut self.output.buffer[start..start + digits]);
                self.output.len += digits;
                Ok(())
            }
        }
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_int32(&mut self, value: i32) -> Result<(), WriteError> {
        self.write_integer(value)
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_int64(&mut self, value: i64) -> Result<(), WriteError> {
        self.write_integer(value)
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_uint32(&mut self, value: u32) -> Result<(), WriteError> {
        self.write_integer(value)
    }

    /// # Errors
    ///
    /// The buffer cannot grow.
    pub fn write_uint64(&mut self, value: u64) -> Result<(), WriteError> {
        self.write_integer(value)
    }
}

/// Finished writer output.
///
/// Owns the provider's buffer; dropping the output releases the buffer back
/// to the provider exactly once. [`JsonOutput::into_vec`] detaches the
/// buffer instead.
#[derive(Debug)]
pub struct JsonOutput<U: CodeUnit, P: BufferProvider<U>> {
    buffer: Vec<U>,
    len: usize,
    provider: P,
}

impl<U: CodeUnit, P: BufferProvider<U>> JsonOutput<U, P> {
    #[must_use]
    pub fn as_slice(&self) -> &[U] {
        &self.buffer[..self.len]
    }

    /// Takes the written units out of the provider's hands. Nothing is
    /// released on drop afterwards.
    #[must_use]
    pub fn into_vec(mut self) -> Vec<U> {
        let mut buffer = mem::take(&mut self.buffer);
        buffer.truncate(self.len);
        buffer
    }
}

impl<P: BufferProvider<u8>> JsonOutput<u8, P> {
    /// # Errors
    ///
    /// The output is not valid UTF-8, which the writer itself never
    /// produces.
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        let bytes = self.as_slice();
        core::str::from_utf8(bytes).map_err(|err| classify_invalid_utf8(bytes, err.valid_up_to()))
    }
}

impl<P: BufferProvider<u16>> JsonOutput<u16, P> {
    /// # Errors
    ///
    /// The output contains an unpaired surrogate.
    pub fn decode(&self) -> Result<String, ErrorSource> {
        Utf16::to_string(self.as_slice())
    }
}

impl<U: CodeUnit, P: BufferProvider<U>> Deref for JsonOutput<U, P> {
    type Target = [U];

    fn deref(&self) -> &[U] {
        self.as_slice()
    }
}

impl<U: CodeUnit, P: BufferProvider<U>> Drop for JsonOutput<U, P> {
    fn drop(&mut self) {
        let buffer = mem::take(&mut self.buffer);
        if !buffer.is_empty() {
            self.provider.release(buffer);
        }
    }
}
