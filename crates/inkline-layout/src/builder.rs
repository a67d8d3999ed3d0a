//! Chunk builder: tokens in, positioned chunks out.
//!
//! Chunks are emitted left to right with `y_cursor` relative to their line's
//! baseline, because a later token on the same line may raise the line
//! height (a bigger font, a tall bitmap). When a line closes, its final
//! ascent and descent are known and every chunk emitted since the line began
//! is shifted down to the real baseline. The range of those chunks is
//! tracked explicitly as `line_start..pool.len()`.
//!
//! Vertical model, per line:
//!
//! ```text
//! line_top  ─────────────────────────────
//!              ascent  (max over the line)
//! baseline  ───────────────────────────── <- chunk y_cursor
//!              descent (max over the line)
//! next top  ─────────────────────────────
//! ```
//!
//! A text run contributes `line_height - descender` of ascent and
//! `descender` of descent; a bitmap contributes its height as ascent.

use inkline_common::warning::{WarnFlag, warn_once};
use inkline_common::{Pool, Span};
use inkline_markup::{MarkupError, Result, TagType, Token, TokenKind};

use crate::chunk::{Chunk, ChunkContent};
use crate::metrics::{BitmapMeta, Bounds, LayoutContext, Measurement};
use crate::style::{StyleCache, StyleChange, TextStyle, parse_color, parse_kerning, parse_size};
use crate::wrap::{WrapConstraint, WrapMode, Wrapper};

/// One flag per entry of [`StyleCache::open_scopes`].
static UNCLOSED_SCOPE_WARNED: [WarnFlag; 5] = [const { WarnFlag::new() }; 5];

/// Parameters of a chunk-building pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    /// Width of a line in pixels.
    pub line_width: f32,
    /// How text runs are split when they overflow.
    pub wrap: WrapMode,
    /// Treat `\n` as nothing instead of a line break.
    pub ignore_newlines: bool,
    /// Style in effect before any tag.
    pub base_style: TextStyle,
}

/// What a chunk-building pass produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOutput {
    /// Chunks written, including the terminal `Eof`.
    pub chunk_count: usize,
    /// Horizontal cursor after the last chunk.
    pub cursor_x: f32,
    /// Bottom of the last line.
    pub cursor_y: f32,
}

/// Single-pass chunk builder.
pub struct ChunkBuilder<'a, 'c> {
    source: &'a str,
    options: BuildOptions,
    ctx: LayoutContext<'c>,
    pool: &'c mut Pool<Chunk>,
    styles: StyleCache,
    cursor_x: f32,
    line_top: f32,
    line_index: u32,
    /// Pool index of the first chunk on the current line.
    line_start: usize,
    line_ascent: f32,
    line_descent: f32,
    /// Tag named by the last `TagPrefix`, waiting for its body.
    pending_tag: Option<TagType>,
}

impl<'a, 'c> ChunkBuilder<'a, 'c> {
    /// Create a builder writing into `pool`, which is cleared first.
    pub fn new(
        source: &'a str,
        options: BuildOptions,
        ctx: LayoutContext<'c>,
        pool: &'c mut Pool<Chunk>,
    ) -> Self {
        pool.clear();
        Self {
            source,
            options,
            ctx,
            pool,
            styles: StyleCache::new(options.base_style),
            cursor_x: 0.0,
            line_top: 0.0,
            line_index: 0,
            line_start: 0,
            line_ascent: 0.0,
            line_descent: 0.0,
            pending_tag: None,
        }
    }

    /// Consume `tokens` and finish the chunk list.
    ///
    /// # Errors
    ///
    /// Any syntax, value or resource error; see [`MarkupError`].
    pub fn run(mut self, tokens: &[Token]) -> Result<BuildOutput> {
        for token in tokens {
            self.process(token)?;
        }
        if self.pending_tag.is_some() {
            return Err(MarkupError::InvalidRichTextToken {
                span: Span::new(self.source.len(), self.source.len()),
            });
        }

        // STEP: Close the last line and terminate the list.
        self.close_line();
        self.warn_unclosed_scopes();
        let mut eof = Chunk::marker(self.cursor_x, self.line_index, ChunkContent::Eof);
        eof.y_cursor = self.line_top;
        self.pool.push(eof)?;

        Ok(BuildOutput {
            chunk_count: self.pool.len(),
            cursor_x: self.cursor_x,
            cursor_y: self.line_top,
        })
    }

    fn process(&mut self, token: &Token) -> Result<()> {
        // A prefix must be followed directly by its body.
        if self.pending_tag.is_some() && token.kind != TokenKind::TagBody {
            return Err(MarkupError::InvalidRichTextToken { span: token.span });
        }

        match token.kind {
            TokenKind::Text => self.add_text(token.span),
            TokenKind::Newline => {
                if !self.options.ignore_newlines {
                    self.break_line();
                }
                Ok(())
            }
            TokenKind::TagPrefix => {
                let tag = token
                    .tag
                    .ok_or(MarkupError::InvalidRichTextToken { span: token.span })?;
                self.pending_tag = Some(tag);
                Ok(())
            }
            TokenKind::TagBody => {
                let tag = self
                    .pending_tag
                    .take()
                    .ok_or(MarkupError::InvalidTagPrefix { span: token.span })?;
                self.open_tag(tag, token.span)
            }
            TokenKind::TagClose => {
                let tag = token
                    .tag
                    .ok_or(MarkupError::InvalidRichTextToken { span: token.span })?;
                self.close_tag(tag, token.span)
            }
        }
    }

    /// Source text under `span`. Tokens come from the caller, so the span
    /// may not lie on the source at all.
    fn text_of(&self, span: Span) -> Result<&'a str> {
        self.source
            .get(span.start..span.end)
            .ok_or(MarkupError::InvalidRichTextToken { span })
    }

    /// Lay out a run of text, wrapping it if the options ask for it.
    fn add_text(&mut self, span: Span) -> Result<()> {
        let text = self.text_of(span)?;
        let style = *self.styles.active();
        let metrics = self.ctx.metrics;
        let constraint = WrapConstraint::at(self.options.line_width, self.cursor_x);

        let Some(wrapper) = Wrapper::new(self.options.wrap, text, constraint, metrics, &style) else {
            let measurement = metrics.measure(text, &style);
            return self.place_text(span, measurement, &style);
        };

        for (i, piece) in wrapper.enumerate() {
            if i > 0 {
                self.break_line();
            }
            if piece.is_break() {
                continue;
            }
            let measurement = Measurement {
                width: piece.width,
                bounds: piece.bounds,
            };
            self.place_text(span.sub(piece.offset, piece.text.len()), measurement, &style)?;
        }
        Ok(())
    }

    /// Emit one text chunk at the cursor and advance past it.
    fn place_text(&mut self, span: Span, measurement: Measurement, style: &TextStyle) -> Result<()> {
        let line = self.ctx.metrics.line_metrics(style);
        self.line_ascent = self.line_ascent.max(line.line_height - line.descender);
        self.line_descent = self.line_descent.max(line.descender);

        self.pool.push(Chunk {
            x_cursor: self.cursor_x,
            y_cursor: 0.0,
            line_index: self.line_index,
            width: measurement.width,
            bounds: measurement.bounds,
            content: ChunkContent::Text(span),
        })?;
        self.cursor_x += measurement.width;
        Ok(())
    }

    /// Handle an opening tag's body.
    fn open_tag(&mut self, tag: TagType, body: Span) -> Result<()> {
        let text = self.text_of(body)?;
        let content = match tag {
            TagType::Size => self.apply(StyleChange::Size(parse_size(text, body)?))?,
            TagType::Color => self.apply(StyleChange::Color(parse_color(text, body)?))?,
            TagType::Kerning => self.apply(StyleChange::Kerning(parse_kerning(text, body)?))?,
            TagType::Font => {
                let font = self
                    .ctx
                    .metrics
                    .resolve_font(text)
                    .ok_or(MarkupError::FontNotFound { span: body })?;
                self.apply(StyleChange::Font(font))?
            }
            TagType::Bitmap => {
                let bitmap = self
                    .ctx
                    .bitmaps
                    .resolve(text)
                    .ok_or(MarkupError::BitmapNotFound { span: body })?;
                return self.place_bitmap(bitmap);
            }
            TagType::UserCustom => {
                self.styles.open_custom(body)?;
                ChunkContent::UserCustom {
                    enabled: true,
                    style_name: body,
                }
            }
        };
        self.push_marker(content)
    }

    /// Handle a closing tag.
    fn close_tag(&mut self, tag: TagType, name: Span) -> Result<()> {
        let content = match tag {
            TagType::Bitmap => return Ok(()),
            TagType::UserCustom => {
                let style_name = self
                    .styles
                    .close_custom()
                    .ok_or(MarkupError::InvalidCloseTag { span: name })?;
                ChunkContent::UserCustom {
                    enabled: false,
                    style_name,
                }
            }
            TagType::Size | TagType::Color | TagType::Font | TagType::Kerning => self
                .styles
                .close(tag)
                .ok_or(MarkupError::InvalidCloseTag { span: name })?
                .into(),
        };
        self.push_marker(content)
    }

    fn apply(&mut self, change: StyleChange) -> Result<ChunkContent> {
        self.styles.open(change)?;
        Ok(change.into())
    }

    fn push_marker(&mut self, content: ChunkContent) -> Result<()> {
        self.pool
            .push(Chunk::marker(self.cursor_x, self.line_index, content))?;
        Ok(())
    }

    /// Emit an inline bitmap sitting on the baseline.
    fn place_bitmap(&mut self, bitmap: BitmapMeta) -> Result<()> {
        let (width, height) = bitmap.display_size();
        let overflows = self.cursor_x + width > self.options.line_width;
        if self.options.wrap != WrapMode::None && self.cursor_x > 0.0 && overflows {
            self.break_line();
        }

        self.line_ascent = self.line_ascent.max(height);
        self.pool.push(Chunk {
            x_cursor: self.cursor_x,
            y_cursor: 0.0,
            line_index: self.line_index,
            width,
            bounds: Bounds::new(0.0, -height, width, 0.0),
            content: ChunkContent::Bitmap(bitmap),
        })?;
        self.cursor_x += width;
        Ok(())
    }

    /// Finish the current line and start the next one.
    fn break_line(&mut self) {
        self.close_line();
        self.cursor_x = 0.0;
        self.line_index += 1;
        self.line_start = self.pool.len();
    }

    /// Backfill the baseline of every chunk on the current line and move
    /// `line_top` to the bottom of the line.
    fn close_line(&mut self) {
        if self.line_ascent <= 0.0 && self.line_descent <= 0.0 {
            // Nothing measured on this line: size it by the active style.
            let line = self.ctx.metrics.line_metrics(self.styles.active());
            self.line_ascent = line.line_height - line.descender;
            self.line_descent = line.descender;
        }
        let baseline = self.line_top + self.line_ascent;

        for chunk in &mut self.pool.as_mut_slice()[self.line_start..] {
            chunk.y_cursor += baseline;
        }

        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[LINE] index={} chunks={} top={} ascent={} descent={} width={}",
            self.line_index,
            self.pool.len() - self.line_start,
            self.line_top,
            self.line_ascent,
            self.line_descent,
            self.cursor_x
        );

        self.line_top = baseline + self.line_descent;
        self.line_ascent = 0.0;
        self.line_descent = 0.0;
    }

    /// Report scopes left open. Only the first report per tag since the
    /// last `clear_warnings` builds a message; later frames just test a flag.
    fn warn_unclosed_scopes(&self) {
        let scopes = self.styles.open_scopes();
        for ((tag, depth), flag) in scopes.into_iter().zip(&UNCLOSED_SCOPE_WARNED) {
            if depth > 0 && flag.first() {
                warn_once(
                    "Layout",
                    &format!(
                        "{{{}:...}} opened {depth} time(s) more than it was closed",
                        tag.name()
                    ),
                );
            }
        }
    }
}

/// Build the chunk list for `tokens` into `pool`.
///
/// # Errors
///
/// See [`ChunkBuilder::run`].
pub fn build_chunks(
    source: &str,
    tokens: &[Token],
    options: BuildOptions,
    ctx: LayoutContext<'_>,
    pool: &mut Pool<Chunk>,
) -> Result<BuildOutput> {
    ChunkBuilder::new(source, options, ctx, pool).run(tokens)
}
