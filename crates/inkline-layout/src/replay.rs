//! Renderer-side replay of custom styles.
//!
//! Layout only records where `{custom:name}` scopes open and close. A
//! renderer that wants to draw those runs itself walks the chunk list with
//! [`dispatch_custom_styles`] and receives every text chunk inside a custom
//! scope through a [`CustomStyleDispatcher`].

use inkline_common::Span;

use crate::chunk::{Chunk, ChunkContent};
use crate::style::StyleStack;

/// Receives text drawn under a custom style.
pub trait CustomStyleDispatcher {
    /// Called for each text chunk inside the innermost custom scope
    /// `style_name`, at the chunk's position.
    fn dispatch(&mut self, style_name: &str, text: &str, x: f32, y: f32);
}

impl<F: FnMut(&str, &str, f32, f32)> CustomStyleDispatcher for F {
    fn dispatch(&mut self, style_name: &str, text: &str, x: f32, y: f32) {
        self(style_name, text, x, y);
    }
}

/// Walk `chunks` (laid out from `source`) and hand every text chunk under a
/// custom style to `dispatcher`. Returns how many chunks were dispatched.
///
/// Scopes nested deeper than [`crate::style::MAX_STYLE_DEPTH`] cannot come
/// out of layout; any extra opens are ignored here.
pub fn dispatch_custom_styles(
    chunks: &[Chunk],
    source: &str,
    dispatcher: &mut dyn CustomStyleDispatcher,
) -> usize {
    let mut scopes: StyleStack<Span> = StyleStack::new(Span::default());
    let mut dispatched = 0;

    for chunk in chunks {
        match chunk.content {
            ChunkContent::UserCustom {
                enabled: true,
                style_name,
            } => {
                let _ = scopes.push(style_name);
            }
            ChunkContent::UserCustom { enabled: false, .. } => {
                let _ = scopes.pop();
            }
            ChunkContent::Text(span) => {
                if let Some(name) = scopes.top() {
                    dispatcher.dispatch(
                        name.slice(source),
                        span.slice(source),
                        chunk.x_cursor,
                        chunk.y_cursor,
                    );
                    dispatched += 1;
                }
            }
            ChunkContent::Eof => break,
            _ => {}
        }
    }
    dispatched
}
