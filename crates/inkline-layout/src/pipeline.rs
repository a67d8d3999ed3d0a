//! The full pipeline: tokenize, build chunks, align.

use inkline_common::Pool;
use inkline_markup::{Result, Token, tokenize};
use serde::Serialize;

use crate::align::{HorizontalAlign, align_chunks};
use crate::builder::{BuildOptions, build_chunks};
use crate::chunk::Chunk;
use crate::metrics::LayoutContext;
use crate::style::TextStyle;
use crate::wrap::WrapMode;

/// Per-call layout configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutOptions {
    /// Width of a line in pixels.
    pub line_width: f32,
    /// Horizontal alignment of every line.
    pub align: HorizontalAlign,
    /// Wrap strategy.
    pub wrap: WrapMode,
    /// Treat `\n` as nothing instead of a line break.
    pub ignore_newlines: bool,
    /// Style in effect before any tag.
    pub base_style: TextStyle,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            line_width: 400.0,
            align: HorizontalAlign::default(),
            wrap: WrapMode::default(),
            ignore_newlines: false,
            base_style: TextStyle::default(),
        }
    }
}

impl LayoutOptions {
    fn build_options(&self) -> BuildOptions {
        BuildOptions {
            line_width: self.line_width,
            wrap: self.wrap,
            ignore_newlines: self.ignore_newlines,
            base_style: self.base_style,
        }
    }
}

/// Summary of a successful layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutResult {
    /// Chunks written, including the terminal `Eof`.
    pub chunk_count: usize,
    /// Horizontal cursor after the last chunk, before alignment.
    pub cursor_x: f32,
    /// Bottom of the last line.
    pub cursor_y: f32,
}

/// Lay out `input` into `chunk_pool`, using `token_pool` as scratch.
///
/// Both pools are cleared first. On error their contents are unspecified.
///
/// # Errors
///
/// Any [`inkline_markup::MarkupError`] raised by the tokenizer or the chunk
/// builder.
pub fn layout(
    input: &str,
    options: &LayoutOptions,
    ctx: LayoutContext<'_>,
    token_pool: &mut Pool<Token>,
    chunk_pool: &mut Pool<Chunk>,
) -> Result<LayoutResult> {
    let _ = tokenize(input, token_pool)?;
    let built = build_chunks(
        input,
        token_pool.as_slice(),
        options.build_options(),
        ctx,
        chunk_pool,
    )?;
    align_chunks(chunk_pool.as_mut_slice(), options.line_width, options.align);

    Ok(LayoutResult {
        chunk_count: built.chunk_count,
        cursor_x: built.cursor_x,
        cursor_y: built.cursor_y,
    })
}

/// A layout engine owning its token and chunk pools.
///
/// Pools are allocated once in [`MarkupLayout::new`] and reused by every
/// [`MarkupLayout::layout`] call.
#[derive(Debug, Clone)]
pub struct MarkupLayout {
    tokens: Pool<Token>,
    chunks: Pool<Chunk>,
}

impl MarkupLayout {
    /// Allocate pools for at most `max_tokens` tokens and `max_chunks` chunks.
    #[must_use]
    pub fn new(max_tokens: usize, max_chunks: usize) -> Self {
        Self {
            tokens: Pool::with_capacity(max_tokens),
            chunks: Pool::with_capacity(max_chunks),
        }
    }

    /// Lay out `input`, replacing the previous result.
    ///
    /// # Errors
    ///
    /// See [`layout`].
    pub fn layout(
        &mut self,
        input: &str,
        options: &LayoutOptions,
        ctx: LayoutContext<'_>,
    ) -> Result<LayoutResult> {
        layout(input, options, ctx, &mut self.tokens, &mut self.chunks)
    }

    /// Chunks of the last successful layout.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        self.chunks.as_slice()
    }

    /// Tokens of the last successful layout.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        self.tokens.as_slice()
    }
}
