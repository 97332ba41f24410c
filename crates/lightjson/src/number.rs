//! Overflow-exact decimal integer parsing over byte or UTF-16 windows.
//!
//! The parser reads an optional sign, collapses leading zeros, accumulates
//! digits, and accepts a trailing `.000…` fraction as long as every fractional
//! digit is zero. Overflow is detected at the digit where it occurs, without
//! ever performing an overflowing operation.

use crate::unit::CodeUnit;

/// The result of one integer parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome<T> {
    /// The window does not start with a (signed) digit sequence.
    NoNumber,
    Overflow,
    NonZeroDigitsAfterDecimalPoint,
    /// `consumed` counts every unit scanned, including sign and any trailing
    /// `.0…0`, so lexing can resume right after it.
    Success { value: T, consumed: usize },
}

impl<T> ParseOutcome<T> {
    fn map<U>(self, f: impl FnOnce(T) -> Option<U>) -> ParseOutcome<U> {
        match self {
            ParseOutcome::NoNumber => ParseOutcome::NoNumber,
            ParseOutcome::Overflow => ParseOutcome::Overflow,
            ParseOutcome::NonZeroDigitsAfterDecimalPoint => {
                ParseOutcome::NonZeroDigitsAfterDecimalPoint
            }
            ParseOutcome::Success { value, consumed } => match f(value) {
                Some(value) => ParseOutcome::Success { value, consumed },
                None => ParseOutcome::Overflow,
            },
        }
    }
}

/// Decimal digits of `u64` values that can be accumulated without any check.
const UNCHECKED_DIGITS_I64: usize = 18;
const UNCHECKED_DIGITS_U64: usize = 19;

/// Magnitude of `i64::MIN`.
const I64_MIN_MAGNITUDE: u64 = 9_223_372_036_854_775_808;

struct Magnitude {
    negative: bool,
    value: u64,
    consumed: usize,
}

/// Scans sign, digits, and an optional all-zero fraction. `limit` is the
/// largest magnitude accepted for each sign.
fn parse_magnitude<U: CodeUnit>(
    window: &[U],
    unchecked_digits: usize,
    limit: impl Fn(bool) -> u64,
) -> Result<Magnitude, ParseOutcome<()>> {
    let mut i = 0;
    let negative = match window.first() {
        None => return Err(ParseOutcome::NoNumber),
        Some(u) if u.is(b'-') => {
            i = 1;
            true
        }
        Some(u) if u.is(b'+') => {
            i = 1;
            false
        }
        Some(_) => false,
    };

    if window.get(i).and_then(|u| u.digit()).is_none() {
        return Err(ParseOutcome::NoNumber);
    }
    while window.get(i).is_some_and(|u| u.is(b'0')) {
        i += 1;
    }

    let mut value: u64 = 0;
    let mut significant = 0usize;
    while let Some(digit) = window.get(i).and_then(|u| u.digit()) {
        let digit = u64::from(digit);
        if significant < unchecked_digits {
            value = value * 10 + digit;
        } else if significant == unchecked_digits {
            let limit = limit(negative);
            let head = limit / 10;
            if value > head || (value == head && digit > limit % 10) {
                return Err(ParseOutcome::Overflow);
            }
            value = value * 10 + digit;
        } else {
            return Err(ParseOutcome::Overflow);
        }
        significant += 1;
        i += 1;
    }

    // `5.000` is the integer 5; the point only belongs to the number when a
    // digit follows it.
    if window.get(i).is_some_and(|u| u.is(b'.'))
        && window.get(i + 1).and_then(|u| u.digit()).is_some()
    {
        i += 1;
        while let Some(digit) = window.get(i).and_then(|u| u.digit()) {
            if digit != 0 {
                return Err(ParseOutcome::NonZeroDigitsAfterDecimalPoint);
            }
            i += 1;
        }
    }

    Ok(Magnitude {
        negative,
        value,
        consumed: i,
    })
}

fn fail<T>(outcome: ParseOutcome<()>) -> ParseOutcome<T> {
    outcome.map(|()| None)
}

/// Parses a signed 64-bit integer from the start of `window`.
pub fn parse_i64<U: CodeUnit>(window: &[U]) -> ParseOutcome<i64> {
    let limit = |negative| {
        if negative {
            I64_MIN_MAGNITUDE
        } else {
            i64::MAX.unsigned_abs()
        }
    };
    match parse_magnitude(window, UNCHECKED_DIGITS_I64, limit) {
        Ok(Magnitude {
            negative,
            value,
            consumed,
        }) => {
            // `value` is at most 2^63 here; the reinterpretation only wraps
            // for i64::MIN, which negation maps back onto itself.
            #[expect(clippy::cast_possible_wrap)]
            let signed = value as i64;
            ParseOutcome::Success {
                value: if negative {
                    signed.wrapping_neg()
                } else {
                    signed
                },
                consumed,
            }
        }
        Err(outcome) => fail(outcome),
    }
}

/// Parses an unsigned 64-bit integer. A minus sign is accepted only for zero.
pub fn parse_u64<U: CodeUnit>(window: &[U]) -> ParseOutcome<u64> {
    match parse_magnitude(window, UNCHECKED_DIGITS_U64, |_| u64::MAX) {
        Ok(Magnitude {
            negative: true,
            value,
            ..
        }) if value != 0 => ParseOutcome::Overflow,
        Ok(Magnitude {
            value, consumed, ..
        }) => ParseOutcome::Success { value, consumed },
        Err(outcome) => fail(outcome),
    }
}

/// Parses a signed 32-bit integer by narrowing the 64-bit path.
pub fn parse_i32<U: CodeUnit>(window: &[U]) -> ParseOutcome<i32> {
    parse_i64(window).map(|value| i32::try_from(value).ok())
}

/// Parses an unsigned 32-bit integer by narrowing the 64-bit path.
pub fn parse_u32<U: CodeUnit>(window: &[U]) -> ParseOutcome<u32> {
    parse_u64(window).map(|value| u32::try_from(value).ok())
}
