//! Which characters a JSON string may not contain verbatim.

/// How an ASCII character has to be written inside a JSON string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Escape {
    /// Written as-is.
    None,
    /// Written as `\` followed by this character.
    Short(u8),
    /// Written as `\u00XX`.
    Unicode,
}

const HEX: &[u8; 16] = b"0123456789ABCDEF";

#[inline(always)]
pub(crate) fn escape_for(byte: u8) -> Escape {
    match byte {
        b'"' => Escape::Short(b'"'),
        b'\\' => Escape::Short(b'\\'),
        0x08 => Escape::Short(b'b'),
        0x0C => Escape::Short(b'f'),
        b'\n' => Escape::Short(b'n'),
        b'\r' => Escape::Short(b'r'),
        b'\t' => Escape::Short(b't'),
        0x00..=0x1F => Escape::Unicode,
        _ => Escape::None,
    }
}

/// The six characters of `\u00XX` for a control character.
#[inline]
pub(crate) fn unicode_escape(byte: u8) -> [u8; 6] {
    [
        b'\\',
        b'u',
        b'0',
        b'0',
        HEX[usize::from(byte >> 4)],
        HEX[usize::from(byte & 0x0F)],
    ]
}
