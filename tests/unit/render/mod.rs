use super::*;

struct Fixed;

impl Renderer for Fixed {
    fn canvas(&self) -> Canvas {
        Canvas {
            width: 10,
            height: 10,
        }
    }

    fn line_height(&self) -> f32 {
        20.0
    }

    fn top_padding(&self) -> f32 {
        5.0
    }

    fn render(&mut self, _view: &View<'_>) -> RetypeResult<RenderedFrame> {
        unreachable!()
    }
}

#[test]
fn caret_line_counts_breaks_before_offset() {
    let text = "a\nbc\n\nd";
    assert_eq!(caret_line(text, 0), 0);
    assert_eq!(caret_line(text, 1), 0);
    assert_eq!(caret_line(text, 2), 1);
    assert_eq!(caret_line(text, 5), 2);
    assert_eq!(caret_line(text, 6), 3);
    assert_eq!(caret_line(text, 100), 3);
    assert_eq!(caret_line("", 0), 0);
}

#[test]
fn caret_top_uses_padding_and_line_height() {
    let r = Fixed;
    assert_eq!(r.caret_top("x", 0), 5.0);
    assert_eq!(r.caret_top("x\ny\nz", 4), 45.0);
}
