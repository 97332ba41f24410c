use core::fmt::Debug;

use crate::utf8::is_ascii_digit;

/// A single storage unit of encoded JSON text: a UTF-8 byte or a UTF-16 code
/// unit.
///
/// All structural JSON characters are ASCII, so the tokenizer and writer only
/// ever need to compare units against ASCII bytes and to produce units from
/// ASCII bytes. Everything else is handled by [`Encoding`](crate::Encoding).
pub trait CodeUnit: Copy + Eq + Default + Debug + Into<u32> + 'static {
    /// Widens an ASCII byte into a unit.
    fn from_ascii(byte: u8) -> Self;

    /// Returns the unit as an ASCII byte, or `None` for anything above `0x7F`.
    #[inline(always)]
    fn ascii(self) -> Option<u8> {
        let value: u32 = self.into();
        u8::try_from(value).ok().filter(u8::is_ascii)
    }

    #[inline(always)]
    fn is(self, byte: u8) -> bool {
        let value: u32 = self.into();
        value == u32::from(byte)
    }

    /// U+0000 through U+001F, which must be escaped inside a JSON string.
    #[inline(always)]
    fn is_control(self) -> bool {
        let value: u32 = self.into();
        value < 0x20
    }

    /// The value of an ASCII decimal digit, if this unit is one.
    #[inline(always)]
    fn digit(self) -> Option<u8> {
        let value: u32 = self.into();
        if is_ascii_digit(value) {
            u8::try_from(value - u32::from(b'0')).ok()
        } else {
            None
        }
    }
}

impl CodeUnit for u8 {
    #[inline(always)]
    fn from_ascii(byte: u8) -> Self {
        byte
    }
}

impl CodeUnit for u16 {
    #[inline(always)]
    fn from_ascii(byte: u8) -> Self {
        u16::from(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_range_ends_below_space() {
        assert!((0u8..0x20).all(CodeUnit::is_control));
        assert!(!b' '.is_control());
        assert!(!0x7Fu8.is_control());
        assert!(0x1Fu16.is_control());
        assert!(!0x2028u16.is_control());
    }

    #[test]
    fn digits_in_both_widths() {
        assert_eq!(b'7'.digit(), Some(7));
        assert_eq!(u16::from(b'0').digit(), Some(0));
        assert_eq!(b'a'.digit(), None);
        assert_eq!(0x0660u16.digit(), None);
    }
}
