//! The style cache: active text style plus what each open tag replaced.
//!
//! Every style axis (size, color, font, kerning) and the custom-style flag
//! has its own fixed-depth stack. Opening a tag pushes the value it
//! overrides; closing one pops it back. Axes are independent, so
//! `{s:..}{c:..}..{/s}..{/c}` restores correctly, and same-axis nesting
//! restores at every level up to [`MAX_STYLE_DEPTH`].

use inkline_common::Span;
use inkline_markup::{MarkupError, Result, TagType};
use serde::Serialize;

/// How many scopes of one tag type may be open at once.
pub const MAX_STYLE_DEPTH: usize = 32;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel, 255 = opaque.
    pub a: u8,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    /// An opaque color.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb`. Anything else, including the 3- and 8-digit forms,
    /// is rejected.
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.strip_prefix('#')?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::opaque(r, g, b))
    }
}

/// Handle for a font face, issued by the metrics provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct FontId(pub u32);

/// The full active text style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    /// Font size in pixels.
    pub size: f32,
    /// Fill color.
    pub color: Rgba,
    /// Font face.
    pub font: FontId,
    /// Extra advance after every character, in pixels.
    pub kerning: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 16.0,
            color: Rgba::WHITE,
            font: FontId::default(),
            kerning: 0.0,
        }
    }
}

/// A fixed-depth stack of saved values. Never allocates.
#[derive(Debug, Clone)]
pub struct StyleStack<T: Copy> {
    saved: [T; MAX_STYLE_DEPTH],
    depth: usize,
}

impl<T: Copy> StyleStack<T> {
    /// An empty stack; `fill` only initializes unused slots.
    pub const fn new(fill: T) -> Self {
        Self {
            saved: [fill; MAX_STYLE_DEPTH],
            depth: 0,
        }
    }

    /// Push a value. Returns `false` if the stack is full.
    #[must_use]
    pub fn push(&mut self, value: T) -> bool {
        if self.depth == MAX_STYLE_DEPTH {
            return false;
        }
        self.saved[self.depth] = value;
        self.depth += 1;
        true
    }

    /// Pop the most recent value.
    pub fn pop(&mut self) -> Option<T> {
        self.depth = self.depth.checked_sub(1)?;
        Some(self.saved[self.depth])
    }

    /// The most recent value without removing it.
    #[must_use]
    pub fn top(&self) -> Option<T> {
        self.depth.checked_sub(1).map(|i| self.saved[i])
    }

    /// Number of values on the stack.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }
}

/// A change to one style axis, as carried by a style chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleChange {
    /// New font size.
    Size(f32),
    /// New color.
    Color(Rgba),
    /// New font face.
    Font(FontId),
    /// New kerning.
    Kerning(f32),
}

impl StyleChange {
    /// The tag that produces this change.
    #[must_use]
    pub const fn tag(&self) -> TagType {
        match self {
            Self::Size(_) => TagType::Size,
            Self::Color(_) => TagType::Color,
            Self::Font(_) => TagType::Font,
            Self::Kerning(_) => TagType::Kerning,
        }
    }
}

/// Active style plus the saved values of every open scope.
#[derive(Debug, Clone)]
pub struct StyleCache {
    active: TextStyle,
    sizes: StyleStack<f32>,
    colors: StyleStack<Rgba>,
    fonts: StyleStack<FontId>,
    kernings: StyleStack<f32>,
    customs: StyleStack<Span>,
}

impl StyleCache {
    /// Start from `base` with no scopes open.
    #[must_use]
    pub const fn new(base: TextStyle) -> Self {
        Self {
            active: base,
            sizes: StyleStack::new(0.0),
            colors: StyleStack::new(Rgba::BLACK),
            fonts: StyleStack::new(FontId(0)),
            kernings: StyleStack::new(0.0),
            customs: StyleStack::new(Span::new(0, 0)),
        }
    }

    /// The style text is currently measured and drawn with.
    #[must_use]
    pub const fn active(&self) -> &TextStyle {
        &self.active
    }

    /// Open a scope: save the current value of the axis and apply `change`.
    ///
    /// # Errors
    ///
    /// [`MarkupError::StyleStackOverflow`] if the axis is already nested
    /// [`MAX_STYLE_DEPTH`] deep.
    pub fn open(&mut self, change: StyleChange) -> Result<()> {
        let pushed = match change {
            StyleChange::Size(size) => {
                let pushed = self.sizes.push(self.active.size);
                self.active.size = size;
                pushed
            }
            StyleChange::Color(color) => {
                let pushed = self.colors.push(self.active.color);
                self.active.color = color;
                pushed
            }
            StyleChange::Font(font) => {
                let pushed = self.fonts.push(self.active.font);
                self.active.font = font;
                pushed
            }
            StyleChange::Kerning(kerning) => {
                let pushed = self.kernings.push(self.active.kerning);
                self.active.kerning = kerning;
                pushed
            }
        };
        if pushed {
            Ok(())
        } else {
            Err(overflow(change.tag()))
        }
    }

    /// Close the innermost scope of `tag`, restoring and returning the value
    /// it had replaced. `None` if no scope of that axis is open or `tag` is
    /// not a style axis.
    pub fn close(&mut self, tag: TagType) -> Option<StyleChange> {
        match tag {
            TagType::Size => self.sizes.pop().map(|size| {
                self.active.size = size;
                StyleChange::Size(size)
            }),
            TagType::Color => self.colors.pop().map(|color| {
                self.active.color = color;
                StyleChange::Color(color)
            }),
            TagType::Font => self.fonts.pop().map(|font| {
                self.active.font = font;
                StyleChange::Font(font)
            }),
            TagType::Kerning => self.kernings.pop().map(|kerning| {
                self.active.kerning = kerning;
                StyleChange::Kerning(kerning)
            }),
            TagType::Bitmap | TagType::UserCustom => None,
        }
    }

    /// Enter a custom style named by `name`.
    ///
    /// # Errors
    ///
    /// [`MarkupError::StyleStackOverflow`] when nested too deep.
    pub fn open_custom(&mut self, name: Span) -> Result<()> {
        if self.customs.push(name) {
            Ok(())
        } else {
            Err(overflow(TagType::UserCustom))
        }
    }

    /// Leave the innermost custom style, returning its name.
    pub fn close_custom(&mut self) -> Option<Span> {
        self.customs.pop()
    }

    /// Tags with scopes still open, paired with how many.
    #[must_use]
    pub fn open_scopes(&self) -> [(TagType, usize); 5] {
        [
            (TagType::Size, self.sizes.depth()),
            (TagType::Color, self.colors.depth()),
            (TagType::Font, self.fonts.depth()),
            (TagType::Kerning, self.kernings.depth()),
            (TagType::UserCustom, self.customs.depth()),
        ]
    }
}

const fn overflow(tag: TagType) -> MarkupError {
    MarkupError::StyleStackOverflow {
        tag,
        depth: MAX_STYLE_DEPTH,
    }
}

/// Parse a `{s:...}` body: a finite number greater than zero.
///
/// # Errors
///
/// [`MarkupError::InvalidFontSize`] carrying `span`.
pub fn parse_size(body: &str, span: Span) -> Result<f32> {
    body.trim()
        .parse::<f32>()
        .ok()
        .filter(|size| size.is_finite() && *size > 0.0)
        .ok_or(MarkupError::InvalidFontSize { span })
}

/// Parse a `{k:...}` body: any finite number.
///
/// # Errors
///
/// [`MarkupError::InvalidKerning`] carrying `span`.
pub fn parse_kerning(body: &str, span: Span) -> Result<f32> {
    body.trim()
        .parse::<f32>()
        .ok()
        .filter(|kerning| kerning.is_finite())
        .ok_or(MarkupError::InvalidKerning { span })
}

/// Parse a `{c:...}` body: `#rrggbb`.
///
/// # Errors
///
/// [`MarkupError::InvalidColor`] carrying `span`.
pub fn parse_color(body: &str, span: Span) -> Result<Rgba> {
    Rgba::from_hex(body).ok_or(MarkupError::InvalidColor { span })
}
