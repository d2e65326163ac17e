use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::core::Canvas;
use crate::foundation::error::RetypeResult;
use crate::highlight::Highlighter;
use crate::render::code::{CodeRenderer, RenderStyle};
use crate::render::font::load_font;

/// Process-wide rendering state: font bytes, syntax definitions and theme.
///
/// Built once at startup and passed by reference to every clip.
pub struct RenderContext {
    font_path: Option<PathBuf>,
    font_bytes: Arc<Vec<u8>>,
    highlighter: Highlighter,
    style: RenderStyle,
}

impl RenderContext {
    /// Load the font (explicit path, discovered or embedded) and the theme named `theme`.
    pub fn load(font: Option<&Path>, theme: &str) -> RetypeResult<Self> {
        let (path, bytes) = load_font(font)?;
        let highlighter = Highlighter::new(theme)?;
        tracing::debug!(font = ?path, theme, "loaded render context");
        Ok(Self {
            font_path: path,
            ..Self::from_parts(bytes, highlighter)
        })
    }

    pub fn from_parts(font_bytes: Vec<u8>, highlighter: Highlighter) -> Self {
        let style = RenderStyle::themed(&highlighter);
        Self {
            font_path: None,
            font_bytes: Arc::new(font_bytes),
            highlighter,
            style,
        }
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    /// File the font was read from; `None` for the embedded font.
    pub fn font_path(&self) -> Option<&Path> {
        self.font_path.as_deref()
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// A renderer for `canvas` sharing this context's font and style.
    pub fn renderer(&self, canvas: Canvas) -> RetypeResult<CodeRenderer> {
        CodeRenderer::new(canvas, &self.font_bytes, self.style.clone())
    }
}
