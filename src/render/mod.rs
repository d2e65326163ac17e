//! Rasterizing replay snapshots into frames.

pub mod code;
pub mod context;
pub mod font;

pub use code::{CodeRenderer, RenderStyle};
pub use context::RenderContext;
pub use font::{EMBEDDED_FONT, FONT_ENV_VAR, KNOWN_MONOSPACE_FONTS, discover_font, load_font};

use crate::foundation::core::Canvas;
use crate::foundation::error::RetypeResult;
use crate::highlight::Token;

/// One captured frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels, row-major, `width * height * 4` bytes.
    pub data: Vec<u8>,
    /// Whether color channels are premultiplied by alpha.
    pub premultiplied: bool,
}

/// On-screen rectangle of the caret bar, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaretRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct View<'a> {
    pub text: &'a str,
    /// Colored ranges tiling `text`.
    pub tokens: &'a [Token],
    /// Byte offset of the character the caret rests on.
    pub caret: usize,
    /// Vertical scroll in pixels.
    pub scroll_y: f32,
}

#[derive(Clone, Debug)]
pub struct RenderedFrame {
    pub frame: FrameRGBA,
    pub caret: CaretRect,
}

/// Draws buffer views on a fixed canvas.
pub trait Renderer {
    fn canvas(&self) -> Canvas;

    /// Height of one text line in pixels.
    fn line_height(&self) -> f32;

    /// Distance from the top of the canvas to the first line, before scrolling.
    fn top_padding(&self) -> f32 {
        0.0
    }

    fn render(&mut self, view: &View<'_>) -> RetypeResult<RenderedFrame>;

    /// Document-space top of the line holding the caret.
    fn caret_top(&self, text: &str, caret: usize) -> f32 {
        self.top_padding() + caret_line(text, caret) as f32 * self.line_height()
    }
}

/// 0-based line of byte offset `caret`.
pub fn caret_line(text: &str, caret: usize) -> usize {
    let end = caret.min(text.len());
    text.as_bytes()[..end].iter().filter(|b| **b == b'\n').count()
}

#[cfg(test)]
#[path = "../../tests/unit/render/mod.rs"]
mod tests;
