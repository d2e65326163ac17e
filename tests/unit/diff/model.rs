use super::*;

fn fixture() -> Vec<DiffOp> {
    vec![
        DiffOp::equal("fn "),
        DiffOp::delete("old"),
        DiffOp::insert("new"),
        DiffOp::equal("()"),
    ]
}

#[test]
fn before_and_after_are_reconstructed() {
    let ops = fixture();
    assert_eq!(before_text(&ops), "fn old()");
    assert_eq!(after_text(&ops), "fn new()");
}

#[test]
fn animated_chars_counts_changes_only() {
    assert_eq!(animated_chars(&fixture()), 6);
    assert_eq!(DiffOp::insert("é\n").char_len(), 2);
}

#[test]
fn kind_serializes_snake_case() {
    let json = serde_json::to_string(&DiffOp::insert("x")).unwrap();
    assert_eq!(json, r#"{"kind":"insert","text":"x"}"#);
}
