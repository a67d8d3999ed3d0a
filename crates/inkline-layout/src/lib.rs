//! Chunk layout for inkline rich-text markup.
//!
//! Turns tokenized markup into a flat list of positioned [`Chunk`]s: text
//! runs, inline bitmaps and zero-width style markers, wrapped to a line
//! width and horizontally aligned.
//!
//! # Pipeline
//!
//! ```text
//! markup ──tokenize──> tokens ──build_chunks──> chunks ──align_chunks──> chunks
//! ```
//!
//! [`layout`] runs all three stages into caller-supplied pools;
//! [`MarkupLayout`] owns its pools and reuses them across calls.
//!
//! # Collaborators
//!
//! Measurement and bitmap lookup are delegated to a [`TextMetrics`] and a
//! [`BitmapResolver`], bundled per call in a [`LayoutContext`].
//! [`ApproximateFontMetrics`] provides fixed-ratio metrics when no font data
//! is available.
//!
//! # Example
//!
//! ```
//! use inkline_layout::{ApproximateFontMetrics, LayoutContext, LayoutOptions, MarkupLayout, NoBitmaps};
//!
//! let mut engine = MarkupLayout::new(64, 64);
//! let ctx = LayoutContext::new(&ApproximateFontMetrics, &NoBitmaps);
//! let result = engine
//!     .layout("plain {c:#ff0000}red{/c}", &LayoutOptions::default(), ctx)
//!     .unwrap();
//! assert_eq!(result.chunk_count, engine.chunks().len());
//! assert!(engine.chunks().last().unwrap().is_eof());
//! ```

/// Horizontal alignment pass.
pub mod align;
/// Token-to-chunk builder.
pub mod builder;
/// Chunk types.
pub mod chunk;
/// Collaborator traits and approximate metrics.
pub mod metrics;
/// Tokenize, build and align in one call.
pub mod pipeline;
/// Custom-style replay for renderers.
pub mod replay;
/// Text style and the style cache.
pub mod style;
/// Wrap strategies.
pub mod wrap;

pub use align::{HorizontalAlign, align_chunks};
pub use builder::{BuildOptions, BuildOutput, ChunkBuilder, build_chunks};
pub use chunk::{Chunk, ChunkContent, ChunkType};
pub use metrics::{
    ApproximateFontMetrics, BitmapMeta, BitmapResolver, Bounds, LayoutContext, LineMetrics,
    Measurement, NoBitmaps, TextMetrics,
};
pub use pipeline::{LayoutOptions, LayoutResult, MarkupLayout, layout};
pub use replay::{CustomStyleDispatcher, dispatch_custom_styles};
pub use style::{FontId, MAX_STYLE_DEPTH, Rgba, StyleCache, StyleChange, StyleStack, TextStyle};
pub use wrap::{CharWrap, WordWrap, WrapConstraint, WrapMode, WrapPiece, Wrapper};
