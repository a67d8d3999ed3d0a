//! Wrap strategies: splitting a text run into pieces that fit a line.
//!
//! Both strategies are lazy iterators over [`WrapPiece`]s. The first piece
//! is fitted into whatever room is left on the current line; every later
//! piece gets the full line width. Neither strategy allocates, and both
//! always consume the whole text.
//!
//! Word-wrap is a two-phase search per piece:
//!
//! 1. **Word boundaries.** Candidate ends are the end of the remaining text
//!    and the start of every run of spaces, tried from the longest prefix
//!    to the shortest. The first candidate whose measured width fits wins.
//! 2. **Character fallback.** If no word fits, candidate ends are character
//!    boundaries, again longest first. On a fresh line at least one
//!    character is always taken, so the search always makes progress.
//!
//! When the first piece has only part of a line left and nothing fits there,
//! an empty piece is yielded instead: the caller breaks the line and the
//! next piece is fitted against the full width.

use serde::Serialize;
use strum_macros::Display;

use crate::metrics::{Bounds, TextMetrics};
use crate::style::TextStyle;

/// How long text runs are split across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum WrapMode {
    /// Never break; runs may overflow the line.
    None,
    /// Break at spaces, falling back to characters for oversized words.
    #[default]
    Word,
    /// Break between any two characters.
    Character,
}

/// Room available for a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapConstraint {
    /// Width of a full line.
    pub line_width: f32,
    /// Room left on the current line for the first piece.
    pub first_line_width: f32,
    /// Whether the current line is still empty.
    pub first_line_fresh: bool,
}

impl WrapConstraint {
    /// A constraint for text starting `x` pixels into a line.
    #[must_use]
    pub fn at(line_width: f32, x: f32) -> Self {
        Self {
            line_width,
            first_line_width: line_width - x,
            first_line_fresh: x <= 0.0,
        }
    }
}

/// One line-fitting piece of a wrapped run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapPiece<'t> {
    /// The piece's text. Empty for a line-break-only piece.
    pub text: &'t str,
    /// Byte offset of `text` within the wrapped run.
    pub offset: usize,
    /// Measured advance.
    pub width: f32,
    /// Measured ink bounds.
    pub bounds: Bounds,
}

impl WrapPiece<'_> {
    /// Whether this piece only asks for a line break.
    #[must_use]
    pub const fn is_break(&self) -> bool {
        self.text.is_empty()
    }
}

/// Shared cursor state of both strategies.
struct Cursor<'t, 'm> {
    text: &'t str,
    offset: usize,
    constraint: WrapConstraint,
    first: bool,
    metrics: &'m dyn TextMetrics,
    style: &'m TextStyle,
}

impl<'t, 'm> Cursor<'t, 'm> {
    fn new(
        text: &'t str,
        constraint: WrapConstraint,
        metrics: &'m dyn TextMetrics,
        style: &'m TextStyle,
    ) -> Self {
        Self {
            text,
            offset: 0,
            constraint,
            first: true,
            metrics,
            style,
        }
    }

    fn remaining(&self) -> &'t str {
        &self.text[self.offset..]
    }

    /// Allowance for the next piece and whether it starts a fresh line.
    fn next_allowance(&mut self) -> (f32, bool) {
        if std::mem::take(&mut self.first) {
            (
                self.constraint.first_line_width,
                self.constraint.first_line_fresh,
            )
        } else {
            (self.constraint.line_width, true)
        }
    }

    fn fits(&self, prefix: &str, allowance: f32) -> Option<(f32, Bounds)> {
        let m = self.metrics.measure(prefix, self.style);
        (m.width <= allowance).then_some((m.width, m.bounds))
    }

    /// Emit `remaining[..end]` as a piece and move past it.
    fn take(&mut self, end: usize, width: f32, bounds: Bounds) -> WrapPiece<'t> {
        let piece = WrapPiece {
            text: &self.remaining()[..end],
            offset: self.offset,
            width,
            bounds,
        };
        self.offset += end;
        piece
    }

    /// A zero-width piece that consumes nothing.
    fn line_break(&self) -> WrapPiece<'t> {
        WrapPiece {
            text: "",
            offset: self.offset,
            width: 0.0,
            bounds: Bounds::default(),
        }
    }

    /// Take the longest of `ends` that fits, or `None`.
    fn take_longest_fitting(
        &mut self,
        ends: impl Iterator<Item = usize>,
        allowance: f32,
    ) -> Option<WrapPiece<'t>> {
        let remaining = self.remaining();
        for end in ends {
            if let Some((width, bounds)) = self.fits(&remaining[..end], allowance) {
                return Some(self.take(end, width, bounds));
            }
        }
        None
    }

    /// Take exactly one character, whatever its width.
    fn take_one_char(&mut self) -> Option<WrapPiece<'t>> {
        let remaining = self.remaining();
        let end = remaining.chars().next()?.len_utf8();
        let m = self.metrics.measure(&remaining[..end], self.style);
        Some(self.take(end, m.width, m.bounds))
    }
}

/// Candidate piece ends for word-wrap, longest first: the whole text, then
/// the start of each run of spaces (a run counts once).
fn word_ends(text: &str) -> impl Iterator<Item = usize> + '_ {
    let bytes = text.as_bytes();
    std::iter::once(text.len())
        .chain((1..bytes.len()).rev().filter(move |&i| bytes[i] == b' ' && bytes[i - 1] != b' '))
}

/// Character boundaries of `text` after the first character, longest first.
fn char_ends_longest_first(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.char_indices().rev().map(|(i, c)| i + c.len_utf8())
}

/// Character boundaries of `text` after the first character, shortest first.
fn char_ends_shortest_first(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.char_indices().map(|(i, c)| i + c.len_utf8())
}

/// Word-boundary wrapping with character fallback.
pub struct WordWrap<'t, 'm> {
    cursor: Cursor<'t, 'm>,
}

impl<'t, 'm> WordWrap<'t, 'm> {
    /// Wrap `text` under `constraint`, measuring with `style`.
    #[must_use]
    pub fn new(
        text: &'t str,
        constraint: WrapConstraint,
        metrics: &'m dyn TextMetrics,
        style: &'m TextStyle,
    ) -> Self {
        Self {
            cursor: Cursor::new(text, constraint, metrics, style),
        }
    }
}

impl<'t> Iterator for WordWrap<'t, '_> {
    type Item = WrapPiece<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = &mut self.cursor;
        if !cursor.first {
            // Later pieces never start with the spaces they broke at.
            let trimmed = cursor.remaining().len() - cursor.remaining().trim_start_matches(' ').len();
            cursor.offset += trimmed;
        }
        let remaining = cursor.remaining();
        if remaining.is_empty() {
            return None;
        }
        let (allowance, fresh) = cursor.next_allowance();

        // Phase 1: longest prefix ending at a word boundary.
        if let Some(piece) = cursor.take_longest_fitting(word_ends(remaining), allowance) {
            return Some(piece);
        }

        if !fresh {
            #[cfg(feature = "layout-trace")]
            eprintln!("[WRAP] word does not fit in {allowance}, breaking line first");
            return Some(cursor.line_break());
        }

        // Phase 2: the first word alone is too wide for a whole line.
        #[cfg(feature = "layout-trace")]
        eprintln!("[WRAP] oversized word, falling back to characters");
        cursor
            .take_longest_fitting(char_ends_longest_first(remaining), allowance)
            .or_else(|| cursor.take_one_char())
    }
}

/// Character-boundary wrapping.
pub struct CharWrap<'t, 'm> {
    cursor: Cursor<'t, 'm>,
}

impl<'t, 'm> CharWrap<'t, 'm> {
    /// Wrap `text` under `constraint`, measuring with `style`.
    #[must_use]
    pub fn new(
        text: &'t str,
        constraint: WrapConstraint,
        metrics: &'m dyn TextMetrics,
        style: &'m TextStyle,
    ) -> Self {
        Self {
            cursor: Cursor::new(text, constraint, metrics, style),
        }
    }
}

impl<'t> Iterator for CharWrap<'t, '_> {
    type Item = WrapPiece<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = &mut self.cursor;
        let remaining = cursor.remaining();
        if remaining.is_empty() {
            return None;
        }
        let (allowance, fresh) = cursor.next_allowance();

        // Grow from the first character until the next one would overflow.
        let mut best = None;
        for end in char_ends_shortest_first(remaining) {
            match cursor.fits(&remaining[..end], allowance) {
                Some(fit) => best = Some((end, fit)),
                None => break,
            }
        }

        match best {
            Some((end, (width, bounds))) => Some(cursor.take(end, width, bounds)),
            None if !fresh => Some(cursor.line_break()),
            None => cursor.take_one_char(),
        }
    }
}

/// Either wrap strategy, selected by [`WrapMode`].
pub enum Wrapper<'t, 'm> {
    /// Word-boundary wrapping.
    Word(WordWrap<'t, 'm>),
    /// Character-boundary wrapping.
    Character(CharWrap<'t, 'm>),
}

impl<'t, 'm> Wrapper<'t, 'm> {
    /// The strategy for `mode`, or `None` for [`WrapMode::None`].
    #[must_use]
    pub fn new(
        mode: WrapMode,
        text: &'t str,
        constraint: WrapConstraint,
        metrics: &'m dyn TextMetrics,
        style: &'m TextStyle,
    ) -> Option<Self> {
        match mode {
            WrapMode::None => None,
            WrapMode::Word => Some(Self::Word(WordWrap::new(text, constraint, metrics, style))),
            WrapMode::Character => Some(Self::Character(CharWrap::new(
                text, constraint, metrics, style,
            ))),
        }
    }
}

impl<'t> Iterator for Wrapper<'t, '_> {
    type Item = WrapPiece<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Word(wrap) => wrap.next(),
            Self::Character(wrap) => wrap.next(),
        }
    }
}
