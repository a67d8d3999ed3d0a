//! Byte spans into a markup source string.

use serde::Serialize;

/// A half-open byte range `start..end` into the markup source.
///
/// Tokens and text chunks store spans instead of borrowed slices so that a
/// pool of them can outlive any single input string and be reused across
/// frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `start..end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Resolve the span against the source it was produced from.
    ///
    /// # Panics
    ///
    /// Panics if the span is out of bounds for `source` or does not fall on
    /// character boundaries, which means it was taken from another string.
    #[must_use]
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }

    /// A sub-span relative to this one: `offset..offset + len` within `self`.
    #[must_use]
    pub const fn sub(&self, offset: usize, len: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.start + offset + len,
        }
    }
}
