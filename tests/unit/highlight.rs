use super::*;

fn assert_tiles(tokens: &[Token], text: &str) {
    let mut pos = 0;
    for t in tokens {
        assert_eq!(t.range.start, pos, "gap or overlap at {pos}");
        assert!(t.range.end > t.range.start, "empty token at {pos}");
        pos = t.range.end;
    }
    assert_eq!(pos, text.len());
}

#[test]
fn language_comes_from_extension() {
    assert_eq!(language_for_path("src/main.rs"), "rs");
    assert_eq!(language_for_path("pkg/Render.GO"), "go");
    assert_eq!(language_for_path("Makefile"), "makefile");
    assert_eq!(language_for_path("LICENSE"), PLAIN_LANGUAGE);
    assert_eq!(language_for_path("archive.tar.gz"), "gz");
}

#[test]
fn rust_tokens_tile_buffer_and_use_several_colors() {
    let h = Highlighter::new(DEFAULT_THEME).unwrap();
    let text = "fn main() {\n    let x = \"hi\"; // note\n}\n";
    let tokens = h.tokenize(Some("rs"), text);
    assert_tiles(&tokens, text);
    assert!(tokens.len() > 3);

    let kw = tokens.iter().find(|t| t.range.start == 0).unwrap();
    assert_ne!(kw.color, h.foreground());
}

#[test]
fn partial_buffers_still_tile() {
    let h = Highlighter::new(DEFAULT_THEME).unwrap();
    for text in ["fn ma", "\"unterminated", "é\nß\n", "\n\n"] {
        assert_tiles(&h.tokenize(Some("rs"), text), text);
    }
}

#[test]
fn unknown_language_falls_back_to_plain() {
    let h = Highlighter::new(DEFAULT_THEME).unwrap();
    let text = "whatever\ntext";
    let tokens = h.tokenize(Some("no-such-language"), text);
    assert_eq!(
        tokens,
        vec![Token {
            range: 0..text.len(),
            color: h.foreground()
        }]
    );
    assert_eq!(h.tokenize(None, text).len(), 1);
    assert!(h.tokenize(Some("rs"), "").is_empty());
    assert!(!h.supports(PLAIN_LANGUAGE));
    assert!(h.supports("go"));
}

#[test]
fn unknown_theme_is_a_config_error() {
    let err = Highlighter::new("definitely-not-a-theme").err().unwrap();
    assert!(matches!(err, RetypeError::Config(msg) if msg.contains("base16-ocean.dark")));
    assert!(Highlighter::theme_names().contains(&DEFAULT_THEME.to_string()));
}

#[test]
fn theme_colors_are_opaque() {
    let h = Highlighter::new("InspiredGitHub").unwrap();
    assert_eq!(h.background().a, 255);
    assert_eq!(h.theme_name(), "InspiredGitHub");
}
