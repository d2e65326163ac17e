use std::borrow::Cow;
use std::ops::Range;

use parley::layout::PositionedLayoutItem;
use parley::style::{FontStack, StyleProperty};

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{RetypeError, RetypeResult};
use crate::highlight::{Highlighter, Token};
use crate::render::{CaretRect, FrameRGBA, RenderedFrame, Renderer, View};

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TextBrush {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl From<Rgba8> for TextBrush {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Metrics and colors of the code view.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderStyle {
    pub font_size: f32,
    /// Line height as a multiple of `font_size`.
    pub line_spacing: f32,
    /// Margin around the code view.
    pub padding: f32,
    /// Width reserved for line numbers; 0 hides the gutter.
    pub gutter_width: f32,
    pub caret_width: f32,
    pub tab_width: usize,
    pub background: Rgba8,
    /// Color of text no token covers.
    pub foreground: Rgba8,
    pub gutter: Rgba8,
    pub caret: Rgba8,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            font_size: 20.0,
            line_spacing: 1.2,
            padding: 10.0,
            gutter_width: 50.0,
            caret_width: 2.0,
            tab_width: 4,
            background: Rgba8::opaque(0x2b, 0x30, 0x3b),
            foreground: Rgba8::opaque(0xc0, 0xc5, 0xce),
            gutter: Rgba8::opaque(0x82, 0x82, 0x82),
            caret: Rgba8::opaque(0xff, 0xff, 0xff),
        }
    }
}

impl RenderStyle {
    /// Default metrics with the colors of `highlighter`'s theme.
    pub fn themed(highlighter: &Highlighter) -> Self {
        Self {
            background: highlighter.background(),
            foreground: highlighter.foreground(),
            gutter: highlighter.gutter_foreground(),
            caret: highlighter.caret(),
            ..Self::default()
        }
    }

    pub fn line_height(&self) -> f32 {
        self.font_size * self.line_spacing
    }

    pub fn validate(&self) -> RetypeResult<()> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(RetypeError::config("font size must be finite and > 0"));
        }
        if !self.line_spacing.is_finite() || self.line_spacing < 1.0 {
            return Err(RetypeError::config("line spacing must be >= 1"));
        }
        for (name, v) in [
            ("padding", self.padding),
            ("gutter width", self.gutter_width),
            ("caret width", self.caret_width),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(RetypeError::config(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if self.tab_width == 0 {
            return Err(RetypeError::config("tab width must be > 0"));
        }
        Ok(())
    }
}

/// CPU code-view renderer: line-number gutter, colored code and a caret bar, laid out with Parley
/// and rasterized with `vello_cpu`.
///
/// Lines wider than the canvas wrap onto extra rows of [`CodeRenderer::wrap_columns`] columns,
/// measured with the advance of the font's `M`.
pub struct CodeRenderer {
    canvas: Canvas,
    style: RenderStyle,
    font: vello_cpu::peniko::FontData,
    family: String,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    wrap_columns: usize,
}

impl CodeRenderer {
    pub fn new(canvas: Canvas, font_bytes: &[u8], style: RenderStyle) -> RetypeResult<Self> {
        canvas.validate()?;
        style.validate()?;
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| RetypeError::config("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| RetypeError::config("canvas height exceeds u16"))?;

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| RetypeError::config("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| RetypeError::config("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
            0,
        );

        let mut renderer = Self {
            canvas,
            style,
            font,
            family,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
            wrap_columns: usize::MAX,
        };
        renderer.wrap_columns = renderer.columns_per_row();
        Ok(renderer)
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn family_name(&self) -> &str {
        &self.family
    }

    /// Columns that fit between the gutter and the right padding.
    pub fn wrap_columns(&self) -> usize {
        self.wrap_columns
    }

    fn columns_per_row(&mut self) -> usize {
        let advance = self.measure("M");
        if !advance.is_finite() || advance <= 0.0 {
            return usize::MAX;
        }
        let code_x = self.style.padding + self.style.gutter_width;
        let available = self.canvas.width as f32 - self.style.padding - code_x;
        ((available / advance).floor() as usize).max(1)
    }

    fn layout(
        &mut self,
        text: &str,
        spans: &[(Range<usize>, Rgba8)],
    ) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(StyleProperty::FontStack(FontStack::Source(Cow::Owned(
            self.family.clone(),
        ))));
        builder.push_default(StyleProperty::FontSize(self.style.font_size));
        builder.push_default(StyleProperty::Brush(TextBrush::from(self.style.foreground)));
        for (range, color) in spans {
            builder.push(StyleProperty::Brush(TextBrush::from(*color)), range.clone());
        }

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    fn draw_layout(&mut self, layout: &parley::Layout<TextBrush>, x: f32, y: f32) {
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: x + g.x,
                    y: y + g.y,
                });
                self.ctx
                    .glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba8) {
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            f64::from(x),
            f64::from(y),
            f64::from(x + w),
            f64::from(y + h),
        ));
    }

    /// Advance width of `text` in pixels.
    fn measure(&mut self, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let layout = self.layout(text, &[]);
        layout
            .lines()
            .flat_map(|line| line.items())
            .filter_map(|item| match item {
                PositionedLayoutItem::GlyphRun(run) => {
                    Some(run.glyphs().map(|g| g.advance).sum::<f32>())
                }
                _ => None,
            })
            .sum()
    }
}

impl Renderer for CodeRenderer {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn line_height(&self) -> f32 {
        self.style.line_height()
    }

    fn top_padding(&self) -> f32 {
        self.style.padding
    }

    fn caret_top(&self, text: &str, caret: usize) -> f32 {
        self.style.padding + self.caret_row(text, caret).0 as f32 * self.style.line_height()
    }

    fn render(&mut self, view: &View<'_>) -> RetypeResult<RenderedFrame> {
        let (w, h) = (self.canvas.width as f32, self.canvas.height as f32);
        let lh = self.style.line_height();
        let code_x = self.style.padding + self.style.gutter_width;

        self.ctx.reset();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.fill_rect(0.0, 0.0, w, h, self.style.background);

        let pad = (lh - self.style.font_size) / 2.0;
        let tab_width = self.style.tab_width;
        let mut row = 0usize;

        for (i, line) in split_lines(view.text).into_iter().enumerate() {
            let columns = display_columns(&view.text[line.clone()], tab_width);
            let rows = row_count(columns, self.wrap_columns);
            let top = self.style.padding + row as f32 * lh - view.scroll_y;
            row += rows;
            if top + rows as f32 * lh < 0.0 {
                continue;
            }
            if top > h {
                break;
            }

            if self.style.gutter_width > 0.0 {
                let number = (i + 1).to_string();
                let color = self.style.gutter;
                let layout = self.layout(&number, &[(0..number.len(), color)]);
                self.draw_layout(&layout, self.style.padding, top + pad);
            }

            let (display, spans) = colored_line(view.text, line, view.tokens, tab_width);
            for (k, range) in wrap_display(&display, self.wrap_columns).into_iter().enumerate() {
                let row_top = top + k as f32 * lh;
                if range.is_empty() || row_top + lh < 0.0 || row_top > h {
                    continue;
                }
                let layout = self.layout(&display[range.clone()], &clip_spans(&spans, &range));
                self.draw_layout(&layout, code_x, row_top + pad);
            }
        }

        let caret = self.caret_rect(view, code_x);
        self.fill_rect(caret.x, caret.y, caret.width, caret.height, self.style.caret);

        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);

        Ok(RenderedFrame {
            frame: FrameRGBA {
                width: self.canvas.width,
                height: self.canvas.height,
                data: self.pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            },
            caret,
        })
    }
}

impl CodeRenderer {
    /// Caret bar at the trailing edge of the character at `view.caret`. A caret resting on a line
    /// break (or past the end) sits at the start of that line.
    fn caret_rect(&mut self, view: &View<'_>, code_x: f32) -> CaretRect {
        let (row, prefix) = self.caret_row(view.text, view.caret);
        CaretRect {
            x: code_x + self.measure(&prefix),
            y: self.style.padding + row as f32 * self.style.line_height() - view.scroll_y,
            width: self.style.caret_width,
            height: self.style.line_height(),
        }
    }

    /// Visual row of the caret, counting wrapped rows, and the tab-expanded text of that row up
    /// to the caret's trailing edge.
    fn caret_row(&self, text: &str, caret: usize) -> (usize, String) {
        let (tab_width, columns) = (self.style.tab_width, self.wrap_columns);
        let caret = floor_char_boundary(text, caret.min(text.len()));
        let line_start = text[..caret].rfind('\n').map_or(0, |i| i + 1);
        let rows_above: usize = text[..line_start]
            .split_terminator('\n')
            .map(|l| row_count(display_columns(l, tab_width), columns))
            .sum();

        let trailing = match text[caret..].chars().next() {
            Some(c) if c != '\n' => caret + c.len_utf8(),
            _ => caret,
        };
        let expanded = expand_tabs(&text[line_start..trailing], tab_width);
        let row_in_line = expanded.chars().count().saturating_sub(1) / columns;
        let prefix = expanded.chars().skip(row_in_line * columns).collect();
        (rows_above + row_in_line, prefix)
    }
}

/// Byte ranges of each line, without the line break. A trailing break opens an empty last line.
fn split_lines(text: &str) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            out.push(start..i);
            start = i + 1;
        }
    }
    out.push(start..text.len());
    out
}

/// Tab-expanded text of `line` with the token colors mapped onto it. Text no token covers keeps
/// the default brush.
fn colored_line(
    text: &str,
    line: Range<usize>,
    tokens: &[Token],
    tab_width: usize,
) -> (String, Vec<(Range<usize>, Rgba8)>) {
    let mut display = String::with_capacity(line.len());
    let mut spans = Vec::new();
    let mut column = 0usize;
    let mut pos = line.start;

    for token in tokens {
        let start = token.range.start.max(pos);
        let end = token.range.end.min(line.end);
        let (Some(gap), Some(piece)) = (text.get(pos..start), text.get(start..end)) else {
            continue;
        };
        if piece.is_empty() {
            continue;
        }
        push_expanded(&mut display, gap, &mut column, tab_width);
        let from = display.len();
        push_expanded(&mut display, piece, &mut column, tab_width);
        spans.push((from..display.len(), token.color));
        pos = end;
    }

    if let Some(rest) = text.get(pos..line.end) {
        push_expanded(&mut display, rest, &mut column, tab_width);
    }
    (display, spans)
}

/// Rows a line of `columns` display columns occupies when wrapped at `width`.
fn row_count(columns: usize, width: usize) -> usize {
    columns.div_ceil(width).max(1)
}

/// Byte ranges of `display` cut every `columns` characters. An empty line is one empty row.
fn wrap_display(display: &str, columns: usize) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut start = 0;
    for (n, (i, _)) in display.char_indices().enumerate() {
        if n > 0 && n % columns == 0 {
            rows.push(start..i);
            start = i;
        }
    }
    rows.push(start..display.len());
    rows
}

/// The parts of `spans` inside `row`, relative to its start.
fn clip_spans(spans: &[(Range<usize>, Rgba8)], row: &Range<usize>) -> Vec<(Range<usize>, Rgba8)> {
    spans
        .iter()
        .filter_map(|(range, color)| {
            let start = range.start.max(row.start);
            let end = range.end.min(row.end);
            (start < end).then(|| (start - row.start..end - row.start, *color))
        })
        .collect()
}

fn display_columns(s: &str, tab_width: usize) -> usize {
    s.chars().fold(0, |column, c| {
        if c == '\t' {
            column + tab_width - column % tab_width
        } else {
            column + 1
        }
    })
}

fn expand_tabs(s: &str, tab_width: usize) -> String {
    let mut out = String::with_capacity(s.len());
    let mut column = 0;
    push_expanded(&mut out, s, &mut column, tab_width);
    out
}

fn push_expanded(out: &mut String, s: &str, column: &mut usize, tab_width: usize) {
    for c in s.chars() {
        if c == '\t' {
            let n = tab_width - *column % tab_width;
            out.extend(std::iter::repeat_n(' ', n));
            *column += n;
        } else {
            out.push(c);
            *column += 1;
        }
    }
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[cfg(test)]
#[path = "../../tests/unit/render/code.rs"]
mod tests;
