//! Collaborator interfaces consumed by the layout engine.
//!
//! Layout never touches fonts or textures itself. It asks a [`TextMetrics`]
//! provider how big a string is in the active style and a [`BitmapResolver`]
//! what an `{img:...}` id refers to. Both are passed per call, bundled in a
//! [`LayoutContext`].

use std::collections::HashMap;

use serde::Serialize;

use crate::style::{FontId, TextStyle};

/// An ink bounding box: `(min_x, min_y)` to `(max_x, max_y)`.
///
/// Coordinates are local to a chunk's origin, which sits on the baseline, so
/// glyph ink above the baseline has a negative `min_y`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Bounds {
    /// Left edge.
    pub min_x: f32,
    /// Top edge.
    pub min_y: f32,
    /// Right edge.
    pub max_x: f32,
    /// Bottom edge.
    pub max_y: f32,
}

impl Bounds {
    /// Create bounds from its four edges.
    #[must_use]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Horizontal extent.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Vertical extent.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Result of measuring a string.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    /// Horizontal advance of the whole string.
    pub width: f32,
    /// Ink bounds of the string.
    pub bounds: Bounds,
}

/// Vertical metrics of a style.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineMetrics {
    /// Distance from the baseline to the top of the tallest glyph.
    pub ascender: f32,
    /// Distance from the baseline down to the lowest glyph (positive).
    pub descender: f32,
    /// Baseline-to-baseline distance.
    pub line_height: f32,
}

/// Text measurement provider.
///
/// Implementors report metrics for the style passed in. The layout engine
/// calls these methods for every candidate substring while wrapping, so
/// they should be cheap and must not allocate per call.
pub trait TextMetrics {
    /// Measure the advance width and ink bounds of `text`.
    fn measure(&self, text: &str, style: &TextStyle) -> Measurement;

    /// Vertical metrics for `style`.
    fn line_metrics(&self, style: &TextStyle) -> LineMetrics;

    /// Map a font face name from a `{f:...}` tag to a handle.
    fn resolve_font(&self, name: &str) -> Option<FontId>;
}

/// Metadata for an inline bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BitmapMeta {
    /// Opaque texture handle for the renderer.
    pub texture: u64,
    /// Horizontal offset into the texture, in texels.
    pub offset_x: f32,
    /// Vertical offset into the texture, in texels.
    pub offset_y: f32,
    /// Width in texels.
    pub width: f32,
    /// Height in texels.
    pub height: f32,
    /// Display scale applied to `width` and `height`.
    pub scale: f32,
}

impl BitmapMeta {
    /// A whole-texture bitmap of the given size at scale 1.
    #[must_use]
    pub const fn new(texture: u64, width: f32, height: f32) -> Self {
        Self {
            texture,
            offset_x: 0.0,
            offset_y: 0.0,
            width,
            height,
            scale: 1.0,
        }
    }

    /// Size on screen as `(width, height)`.
    #[must_use]
    pub fn display_size(&self) -> (f32, f32) {
        (self.width * self.scale, self.height * self.scale)
    }
}

/// Resolves `{img:<id>}` ids to bitmap metadata.
pub trait BitmapResolver {
    /// Look up a bitmap by id.
    fn resolve(&self, id: &str) -> Option<BitmapMeta>;
}

impl<S: std::hash::BuildHasher> BitmapResolver for HashMap<String, BitmapMeta, S> {
    fn resolve(&self, id: &str) -> Option<BitmapMeta> {
        self.get(id).copied()
    }
}

/// A resolver that knows no bitmaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBitmaps;

impl BitmapResolver for NoBitmaps {
    fn resolve(&self, _id: &str) -> Option<BitmapMeta> {
        None
    }
}

/// The collaborators a layout call needs.
#[derive(Clone, Copy)]
pub struct LayoutContext<'c> {
    /// Text measurement.
    pub metrics: &'c dyn TextMetrics,
    /// Inline bitmap lookup.
    pub bitmaps: &'c dyn BitmapResolver,
}

impl<'c> LayoutContext<'c> {
    /// Bundle a metrics provider and a bitmap resolver.
    #[must_use]
    pub fn new(metrics: &'c dyn TextMetrics, bitmaps: &'c dyn BitmapResolver) -> Self {
        Self { metrics, bitmaps }
    }
}

/// Approximate font metrics using fixed ratios.
///
/// Without font data, the average advance of a Latin glyph in a proportional
/// font is taken as 0.6× the font size, with the ascender at 0.8×, the
/// descender at 0.2× and the line height at 1.2×. Kerning is added after
/// every character.
///
/// Used in tests and as a fallback when no fonts are loaded. Knows the faces
/// `default`, `sans`, `serif` and `mono`, which differ only in their id.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFontMetrics;

impl ApproximateFontMetrics {
    /// Face names accepted by [`TextMetrics::resolve_font`], in id order.
    pub const FACES: [&'static str; 4] = ["default", "sans", "serif", "mono"];

    const CHAR_WIDTH_RATIO: f32 = 0.6;
    const ASCENDER_RATIO: f32 = 0.8;
    const DESCENDER_RATIO: f32 = 0.2;
    const LINE_HEIGHT_RATIO: f32 = 1.2;
}

impl TextMetrics for ApproximateFontMetrics {
    fn measure(&self, text: &str, style: &TextStyle) -> Measurement {
        let advance = style.size.mul_add(Self::CHAR_WIDTH_RATIO, style.kerning);
        let width = text.chars().count() as f32 * advance;
        Measurement {
            width,
            bounds: Bounds::new(
                0.0,
                -style.size * Self::ASCENDER_RATIO,
                width,
                style.size * Self::DESCENDER_RATIO,
            ),
        }
    }

    fn line_metrics(&self, style: &TextStyle) -> LineMetrics {
        LineMetrics {
            ascender: style.size * Self::ASCENDER_RATIO,
            descender: style.size * Self::DESCENDER_RATIO,
            line_height: style.size * Self::LINE_HEIGHT_RATIO,
        }
    }

    fn resolve_font(&self, name: &str) -> Option<FontId> {
        Self::FACES
            .iter()
            .position(|face| *face == name)
            .and_then(|index| u32::try_from(index).ok())
            .map(FontId)
    }
}
