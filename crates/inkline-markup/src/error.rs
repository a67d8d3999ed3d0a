//! Errors raised while tokenizing or laying out markup.
//!
//! Every error aborts the current call; no partial output is meant to be
//! used after a failure.

use inkline_common::{PoolFull, Span};
use thiserror::Error;

use crate::token::TagType;

/// Result alias used throughout inkline.
pub type Result<T, E = MarkupError> = core::result::Result<T, E>;

/// Coarse grouping of [`MarkupError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ErrorCategory {
    /// Malformed markup.
    Syntax,
    /// A scratch pool was too small for the input.
    Resource,
    /// A well-formed tag whose body could not be interpreted.
    Value,
}

/// Everything that can go wrong between markup and a finished chunk list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarkupError {
    /// A token or chunk pool ran out of room.
    #[error("out of memory: pool capacity {capacity} exceeded")]
    OutOfMemory {
        /// Capacity of the exhausted pool.
        capacity: usize,
    },

    /// A character that is not allowed in the current tokenizer state.
    #[error("unexpected character {character:?} at byte {offset}")]
    UnexpectedCharacter {
        /// The offending character.
        character: char,
        /// Byte offset into the input.
        offset: usize,
    },

    /// The input ended inside a tag or after a lone `}`.
    #[error("unexpected end of input inside a tag starting at byte {offset}")]
    UnexpectedEndOfInput {
        /// Byte offset where the unfinished construct began.
        offset: usize,
    },

    /// A tag name that is not in the tag table, or a body with no tag.
    #[error("invalid tag prefix at bytes {}..{}", span.start, span.end)]
    InvalidTagPrefix {
        /// Span of the tag name (or of the orphaned token).
        span: Span,
    },

    /// A closing tag whose name is unknown or that closes nothing.
    #[error("invalid closing tag at bytes {}..{}", span.start, span.end)]
    InvalidCloseTag {
        /// Span of the closing tag name.
        span: Span,
    },

    /// A token whose kind and tag type do not agree.
    #[error("malformed rich text token at bytes {}..{}", span.start, span.end)]
    InvalidRichTextToken {
        /// Span of the malformed token.
        span: Span,
    },

    /// A size body that is not a positive finite number.
    #[error("invalid font size at bytes {}..{}", span.start, span.end)]
    InvalidFontSize {
        /// Span of the tag body.
        span: Span,
    },

    /// A color body that is not `#rrggbb`.
    #[error("invalid color at bytes {}..{}", span.start, span.end)]
    InvalidColor {
        /// Span of the tag body.
        span: Span,
    },

    /// A kerning body that is not a finite number.
    #[error("invalid kerning at bytes {}..{}", span.start, span.end)]
    InvalidKerning {
        /// Span of the tag body.
        span: Span,
    },

    /// The bitmap resolver does not know the requested id.
    #[error("bitmap not found at bytes {}..{}", span.start, span.end)]
    BitmapNotFound {
        /// Span of the bitmap id.
        span: Span,
    },

    /// The metrics provider does not know the requested font face.
    #[error("font not found at bytes {}..{}", span.start, span.end)]
    FontNotFound {
        /// Span of the font face name.
        span: Span,
    },

    /// More nested scopes of one tag type than the style stack can hold.
    #[error("{tag} scopes nested deeper than {depth}")]
    StyleStackOverflow {
        /// The tag type being nested.
        tag: TagType,
        /// The fixed stack depth.
        depth: usize,
    },
}

impl MarkupError {
    /// Which family of failure this is.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::OutOfMemory { .. } | Self::StyleStackOverflow { .. } => ErrorCategory::Resource,
            Self::UnexpectedCharacter { .. }
            | Self::UnexpectedEndOfInput { .. }
            | Self::InvalidTagPrefix { .. }
            | Self::InvalidCloseTag { .. }
            | Self::InvalidRichTextToken { .. } => ErrorCategory::Syntax,
            Self::InvalidFontSize { .. }
            | Self::InvalidColor { .. }
            | Self::InvalidKerning { .. }
            | Self::BitmapNotFound { .. }
            | Self::FontNotFound { .. } => ErrorCategory::Value,
        }
    }
}

impl From<PoolFull> for MarkupError {
    fn from(full: PoolFull) -> Self {
        Self::OutOfMemory {
            capacity: full.capacity,
        }
    }
}
