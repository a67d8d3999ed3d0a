//! Text metrics backed by fontdue, for laying out with real fonts.

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use fontdue::{Font, FontSettings};
use inkline_layout::{Bounds, FontId, LineMetrics, Measurement, TextMetrics, TextStyle};

/// Named faces loaded from font files.
///
/// Widths are the sum of per-character advance widths from
/// `Font::metrics()`, which measures without rasterizing. Vertical metrics
/// come from the face's horizontal line metrics.
pub struct FontdueMetrics {
    faces: Vec<(String, Font)>,
}

impl FontdueMetrics {
    /// Load each `(name, path)` pair. The first face is the default one,
    /// used for [`FontId(0)`](FontId) and for any id out of range.
    pub fn load(fonts: &[(String, PathBuf)]) -> anyhow::Result<Self> {
        let mut faces = Vec::with_capacity(fonts.len());
        for (name, path) in fonts {
            let data = std::fs::read(path)
                .with_context(|| format!("failed to read font {}", path.display()))?;
            let font = Font::from_bytes(data, FontSettings::default())
                .map_err(|e| anyhow!("failed to parse font {}: {e}", path.display()))?;
            faces.push((name.clone(), font));
        }
        if faces.is_empty() {
            anyhow::bail!("at least one font is required");
        }
        Ok(Self { faces })
    }

    fn face(&self, id: FontId) -> &Font {
        let index = usize::try_from(id.0).unwrap_or(0);
        let (_, font) = self.faces.get(index).unwrap_or(&self.faces[0]);
        font
    }
}

impl TextMetrics for FontdueMetrics {
    fn measure(&self, text: &str, style: &TextStyle) -> Measurement {
        let font = self.face(style.font);
        let mut width = 0.0;
        let mut top = 0.0_f32;
        let mut bottom = 0.0_f32;
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let glyph = font.metrics(ch, style.size);
            width += glyph.advance_width + style.kerning;
            // fontdue measures ymin upwards from the baseline.
            top = top.max(glyph.ymin as f32 + glyph.height as f32);
            bottom = bottom.max(-(glyph.ymin as f32));
        }
        Measurement {
            width,
            bounds: Bounds::new(0.0, -top, width, bottom),
        }
    }

    fn line_metrics(&self, style: &TextStyle) -> LineMetrics {
        match self.face(style.font).horizontal_line_metrics(style.size) {
            Some(line) => LineMetrics {
                ascender: line.ascent,
                descender: -line.descent,
                line_height: line.new_line_size,
            },
            // Bitmap-only faces carry no line metrics.
            None => LineMetrics {
                ascender: style.size * 0.8,
                descender: style.size * 0.2,
                line_height: style.size * 1.2,
            },
        }
    }

    fn resolve_font(&self, name: &str) -> Option<FontId> {
        self.faces
            .iter()
            .position(|(face, _)| face == name)
            .and_then(|index| u32::try_from(index).ok())
            .map(FontId)
    }
}
