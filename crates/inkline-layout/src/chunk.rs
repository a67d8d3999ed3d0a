//! Chunks: the positioned output of layout.
//!
//! A chunk is a run of text, an inline bitmap, or a zero-width marker that
//! changes the drawing state. A renderer walks the chunk list in order,
//! applies style markers to its state and paints text and bitmaps at
//! `(x_cursor, y_cursor)`. The list always ends with exactly one
//! [`ChunkContent::Eof`].

use inkline_common::Span;
use serde::Serialize;
use strum_macros::Display;

use crate::metrics::{BitmapMeta, Bounds};
use crate::style::{FontId, Rgba, StyleChange};

/// The type of a chunk, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum ChunkType {
    /// End of the chunk list.
    Eof,
    /// A run of text.
    Text,
    /// An inline bitmap.
    Bitmap,
    /// Font size change.
    Size,
    /// Color change.
    Color,
    /// Font face change.
    Font,
    /// Kerning change.
    Kerning,
    /// Custom style toggle.
    UserCustom,
}

/// What a chunk draws or changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ChunkContent {
    /// Terminal marker.
    Eof,
    /// Text to draw; a span of the markup source.
    Text(Span),
    /// Bitmap to draw.
    Bitmap(BitmapMeta),
    /// Font size from here on.
    Size(f32),
    /// Color from here on.
    Color(Rgba),
    /// Font face from here on.
    Font(FontId),
    /// Kerning from here on.
    Kerning(f32),
    /// Custom style switched on or off.
    UserCustom {
        /// `true` at `{custom:..}`, `false` at `{/custom}`.
        enabled: bool,
        /// Span of the style name in the markup source.
        style_name: Span,
    },
}

impl ChunkContent {
    /// The payload-free type of this content.
    #[must_use]
    pub const fn chunk_type(&self) -> ChunkType {
        match self {
            Self::Eof => ChunkType::Eof,
            Self::Text(_) => ChunkType::Text,
            Self::Bitmap(_) => ChunkType::Bitmap,
            Self::Size(_) => ChunkType::Size,
            Self::Color(_) => ChunkType::Color,
            Self::Font(_) => ChunkType::Font,
            Self::Kerning(_) => ChunkType::Kerning,
            Self::UserCustom { .. } => ChunkType::UserCustom,
        }
    }
}

impl From<StyleChange> for ChunkContent {
    fn from(change: StyleChange) -> Self {
        match change {
            StyleChange::Size(size) => Self::Size(size),
            StyleChange::Color(color) => Self::Color(color),
            StyleChange::Font(font) => Self::Font(font),
            StyleChange::Kerning(kerning) => Self::Kerning(kerning),
        }
    }
}

/// A positioned unit of layout output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Chunk {
    /// Left edge of the chunk's origin.
    pub x_cursor: f32,
    /// Baseline of the chunk's line.
    pub y_cursor: f32,
    /// Zero-based line number; never decreases along the list.
    pub line_index: u32,
    /// Horizontal advance; zero for markers.
    pub width: f32,
    /// Ink bounds relative to `(x_cursor, y_cursor)`; only meaningful for
    /// text and bitmaps.
    pub bounds: Bounds,
    /// Payload.
    pub content: ChunkContent,
}

impl Chunk {
    /// A zero-width chunk at `(x, 0)` on `line_index`.
    #[must_use]
    pub fn marker(x_cursor: f32, line_index: u32, content: ChunkContent) -> Self {
        Self {
            x_cursor,
            y_cursor: 0.0,
            line_index,
            width: 0.0,
            bounds: Bounds::default(),
            content,
        }
    }

    /// The payload-free type of this chunk.
    #[must_use]
    pub const fn chunk_type(&self) -> ChunkType {
        self.content.chunk_type()
    }

    /// Whether this is the terminal marker.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.content, ChunkContent::Eof)
    }

    /// The text of a text chunk within `source`.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> Option<&'s str> {
        match self.content {
            ChunkContent::Text(span) => Some(span.slice(source)),
            _ => None,
        }
    }

    /// Right edge of the chunk's advance.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x_cursor + self.width
    }
}
