//! Horizontal alignment, applied to a finished chunk list.

use serde::Serialize;
use strum_macros::Display;

use crate::chunk::Chunk;

/// Horizontal alignment of each line within the line width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum HorizontalAlign {
    /// Flush with the left edge.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush with the right edge.
    Right,
}

impl HorizontalAlign {
    /// Offset that aligns a line drawing `draw_width` pixels.
    #[must_use]
    pub fn offset(self, line_width: f32, draw_width: f32) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Center => (line_width - draw_width) / 2.0,
            Self::Right => line_width - draw_width,
        }
    }
}

/// Shift every line of `chunks` horizontally according to `align`.
///
/// A line is a maximal run of chunks sharing a `line_index`. Its draw width
/// is the right edge of its last chunk. The terminal `Eof` chunk neither
/// moves nor counts. Chunk count and `y_cursor` are never touched.
pub fn align_chunks(chunks: &mut [Chunk], line_width: f32, align: HorizontalAlign) {
    if align == HorizontalAlign::Left {
        return;
    }

    let mut start = 0;
    while start < chunks.len() {
        if chunks[start].is_eof() {
            break;
        }
        let line = chunks[start].line_index;
        let end = chunks[start..]
            .iter()
            .position(|chunk| chunk.line_index != line || chunk.is_eof())
            .map_or(chunks.len(), |len| start + len);

        let draw_width = chunks[end - 1].right();
        let offset = align.offset(line_width, draw_width);
        for chunk in &mut chunks[start..end] {
            chunk.x_cursor += offset;
        }
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkContent;
    use crate::metrics::Bounds;
    use inkline_common::Span;

    fn text(x: f32, width: f32, line: u32) -> Chunk {
        Chunk {
            x_cursor: x,
            y_cursor: 0.0,
            line_index: line,
            width,
            bounds: Bounds::new(0.0, 0.0, width, 0.0),
            content: ChunkContent::Text(Span::new(0, 0)),
        }
    }

    fn lines() -> Vec<Chunk> {
        vec![
            text(0.0, 30.0, 0),
            text(30.0, 20.0, 0),
            text(0.0, 60.0, 1),
            Chunk::marker(60.0, 1, ChunkContent::Eof),
        ]
    }

    #[test]
    fn test_left_is_identity() {
        let mut chunks = lines();
        align_chunks(&mut chunks, 100.0, HorizontalAlign::Left);
        assert_eq!(chunks, lines());
    }

    #[test]
    fn test_right() {
        let mut chunks = lines();
        align_chunks(&mut chunks, 100.0, HorizontalAlign::Right);
        let xs: Vec<_> = chunks.iter().map(|c| c.x_cursor).collect();
        assert_eq!(xs, vec![50.0, 80.0, 40.0, 60.0]);
    }

    #[test]
    fn test_center() {
        let mut chunks = lines();
        align_chunks(&mut chunks, 100.0, HorizontalAlign::Center);
        let xs: Vec<_> = chunks.iter().map(|c| c.x_cursor).collect();
        assert_eq!(xs, vec![25.0, 55.0, 20.0, 60.0]);
    }

    #[test]
    fn test_overflowing_line_moves_left() {
        let mut chunks = vec![text(0.0, 120.0, 0)];
        align_chunks(&mut chunks, 100.0, HorizontalAlign::Right);
        assert_eq!(chunks[0].x_cursor, -20.0);
    }
}
