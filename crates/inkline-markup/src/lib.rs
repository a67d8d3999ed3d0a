//! Tokenizer for the inkline rich-text markup.
//!
//! # Grammar
//!
//! Plain prose with inline tags:
//!
//! - `{s:50}big{/s}` - font size
//! - `{c:#ff0000}red{/c}` - color
//! - `{f:mono}code{/f}` - font face
//! - `{k:2}wide{/k}` - letter spacing (kerning)
//! - `{img:apple}` - inline bitmap (self-closing)
//! - `{custom:wave}text{/custom}` - user-defined style
//! - `{{` and `}}` - literal braces
//! - `\n` - line break
//!
//! The tokenizer writes into a caller-supplied [`Pool`](inkline_common::Pool)
//! and never allocates.

/// Error type shared by the tokenizer and the layout engine.
pub mod error;
/// Token and tag types.
pub mod token;
/// Tokenizer state machine.
pub mod tokenizer;

pub use error::{ErrorCategory, MarkupError, Result};
pub use token::{TagType, Token, TokenKind};
pub use tokenizer::{Tokenizer, tokenize};
