//! Token types produced by the markup tokenizer.
//!
//! Tokens do not own text. Each one records the byte [`Span`] of the input it
//! came from, so a token pool can be reused for a different input on the
//! next frame.

use core::fmt;
use core::str::FromStr;

use inkline_common::Span;
use serde::Serialize;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// The kind of a markup token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum TokenKind {
    /// A run of prose between tags and line breaks. Escaped braces stay in
    /// the span verbatim.
    Text,
    /// A `\n` line break.
    Newline,
    /// The name of an opening tag, e.g. `s` in `{s:50}`.
    TagPrefix,
    /// The body of an opening tag, e.g. `50` in `{s:50}`.
    TagBody,
    /// The name of a closing tag, e.g. `s` in `{/s}`.
    TagClose,
}

/// Style axis named by a tag.
///
/// The string forms are the tag names used in markup; parsing one with
/// [`FromStr`] is the tokenizer's name table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
)]
pub enum TagType {
    /// `{s:<float>}` - font size in pixels.
    #[strum(serialize = "s")]
    Size,
    /// `{c:#rrggbb}` - text color.
    #[strum(serialize = "c")]
    Color,
    /// `{f:<name>}` - font face.
    #[strum(serialize = "f")]
    Font,
    /// `{k:<float>}` - extra spacing after every character.
    #[strum(serialize = "k")]
    Kerning,
    /// `{img:<id>}` - inline bitmap; has no closing tag.
    #[strum(serialize = "img")]
    Bitmap,
    /// `{custom:<name>}` - renderer-defined style.
    #[strum(serialize = "custom")]
    UserCustom,
}

impl TagType {
    /// Look up a tag name. Names are case-sensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }

    /// The markup name of this tag.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// A single lexical unit of markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    /// What the span holds.
    pub kind: TokenKind,
    /// Where in the input the token's text lives. For tags this is the name
    /// (prefix/close) or the body, without braces or separators.
    pub span: Span,
    /// Set on [`TokenKind::TagPrefix`] and [`TokenKind::TagClose`] only.
    pub tag: Option<TagType>,
}

impl Token {
    /// A text token.
    #[must_use]
    pub const fn text(span: Span) -> Self {
        Self {
            kind: TokenKind::Text,
            span,
            tag: None,
        }
    }

    /// A newline token.
    #[must_use]
    pub const fn newline(span: Span) -> Self {
        Self {
            kind: TokenKind::Newline,
            span,
            tag: None,
        }
    }

    /// An opening tag name.
    #[must_use]
    pub const fn tag_prefix(tag: TagType, span: Span) -> Self {
        Self {
            kind: TokenKind::TagPrefix,
            span,
            tag: Some(tag),
        }
    }

    /// An opening tag body.
    #[must_use]
    pub const fn tag_body(span: Span) -> Self {
        Self {
            kind: TokenKind::TagBody,
            span,
            tag: None,
        }
    }

    /// A closing tag name.
    #[must_use]
    pub const fn tag_close(tag: TagType, span: Span) -> Self {
        Self {
            kind: TokenKind::TagClose,
            span,
            tag: Some(tag),
        }
    }

    /// The token's text within `source`.
    #[must_use]
    pub fn as_str<'s>(&self, source: &'s str) -> &'s str {
        self.span.slice(source)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, "<{}:{} {}..{}>", self.kind, tag, self.span.start, self.span.end),
            None => write!(f, "<{} {}..{}>", self.kind, self.span.start, self.span.end),
        }
    }
}
