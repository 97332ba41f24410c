//! Decimal digits for integers.
//!
//! [`digit_count`] and [`write_digits`] must agree: the writer reserves
//! exactly `digit_count(n)` units and `write_digits` fills exactly that many,
//! four at a time from the right, so a miscount shows up either as a short
//! write (a stale unit left in front) or as an out-of-bounds slice.

use crate::unit::CodeUnit;

/// `10^1` through `10^19`; `u64::MAX` has 20 digits.
const POWERS_OF_TEN: [u64; 19] = {
    let mut powers = [0u64; 19];
    let mut power = 10u64;
    let mut i = 0;
    while i < powers.len() {
        powers[i] = power;
        power = power.wrapping_mul(10);
        i += 1;
    }
    powers
};

/// Number of decimal digits in `value`, at least 1.
#[inline]
pub(crate) fn digit_count(value: u64) -> usize {
    1 + POWERS_OF_TEN
        .iter()
        .take_while(|&&power| value >= power)
        .count()
}

/// Writes the decimal digits of `value` into `out`, which must be exactly
/// `digit_count(value)` units long.
#[inline]
#[expect(clippy::cast_possible_truncation)]
pub(crate) fn write_digits<U: CodeUnit>(value: u64, out: &mut [U]) {
    let mut value = value;
    let mut end = out.len();
    while value >= 10_000 {
        let chunk = (value % 10_000) as u32;
        value /= 10_000;
        for (slot, &digit) in out[end - 4..end].iter_mut().zip(&chunk_digits(chunk)) {
            *slot = U::from_ascii(digit);
        }
        end -= 4;
    }

    // The leading chunk has 1 to 4 digits; `end` says how many.
    let lead = chunk_digits(value as u32);
    for (slot, &digit) in out[..end].iter_mut().zip(&lead[4 - end..]) {
        *slot = U::from_ascii(digit);
    }
}

/// The four ASCII digits of `chunk` (< 10000), zero-padded.
///
/// `(x * 5243) >> 19` equals `x / 100` for every `x < 10000`, and
/// `(y * 103) >> 10` equals `y / 10` for every `y < 100`.
#[inline(always)]
#[expect(clippy::cast_possible_truncation)]
fn chunk_digits(chunk: u32) -> [u8; 4] {
    let high = (chunk * 5243) >> 19;
    let low = chunk - high * 100;
    let pair = |y: u32| {
        let tens = (y * 103) >> 10;
        [b'0' + tens as u8, b'0' + (y - tens * 10) as u8]
    };
    let [a, b] = pair(high);
    let [c, d] = pair(low);
    [a, b, c, d]
}
