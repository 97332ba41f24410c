use crate::buffer::Growth;

/// Configuration options for the tokenizer.
///
/// # Default
///
/// Both extensions are enabled: `//` comments are skipped and the extended
/// Unicode whitespace set is accepted between tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenizerOptions {
    /// Whether `//` starts a comment that runs to the end of the line.
    ///
    /// When `false`, a `/` outside of a string is an unexpected character.
    ///
    /// # Default
    ///
    /// `true`
    pub allow_comments: bool,

    /// Whether to allow any Unicode whitespace between JSON values.
    ///
    /// When `false`, only the four whitespace characters defined by RFC 8259
    /// are skipped: space (U+0020), line feed (U+000A),
    /// carriage return (U+000D), and horizontal tab (U+0009).
    ///
    /// # Default
    ///
    /// `true`
    pub allow_unicode_whitespace: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            allow_comments: true,
            allow_unicode_whitespace: true,
        }
    }
}

/// Configuration for writer buffers, shared by every
/// [`BufferProvider`](crate::BufferProvider).
///
/// Sizes are counted in code units: bytes for UTF-8 output, `u16`s for
/// UTF-16 output.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriterOptions {
    /// Size of the buffer a writer starts with.
    ///
    /// # Default
    ///
    /// `256`
    pub initial_capacity: usize,

    /// Hard upper bound for any single buffer. Output that does not fit fails
    /// with [`CapacityError::MaximumBufferSizeExceeded`](crate::CapacityError).
    ///
    /// # Default
    ///
    /// `1 << 30`
    pub maximum_capacity: usize,

    /// How a full buffer grows.
    ///
    /// # Default
    ///
    /// [`Growth::Doubling`]
    pub growth: Growth,
}

impl WriterOptions {
    pub const DEFAULT_INITIAL_CAPACITY: usize = 256;
    pub const DEFAULT_MAXIMUM_CAPACITY: usize = 1 << 30;

    /// The initial size, never above the maximum.
    #[must_use]
    pub fn effective_initial_capacity(&self) -> usize {
        self.initial_capacity.min(self.maximum_capacity)
    }
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            maximum_capacity: Self::DEFAULT_MAXIMUM_CAPACITY,
            growth: Growth::Doubling,
        }
    }
}
