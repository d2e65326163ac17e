use super::*;
use crate::diff::{after_text, before_text};

fn kinds(ops: &[DiffOp]) -> Vec<DiffKind> {
    ops.iter().map(|op| op.kind).collect()
}

#[test]
fn diff_reconstructs_both_sides() {
    let before = "fn main() {\n    println!(\"hi\");\n}\n";
    let after = "fn main() {\n    let x = 1;\n    println!(\"{x}\");\n}\n";
    let ops = DiffProducer::new().diff(before, after);
    assert_eq!(before_text(&ops), before);
    assert_eq!(after_text(&ops), after);
}

#[test]
fn identical_inputs_are_one_equal_span() {
    let ops = DiffProducer::new().diff("same\n", "same\n");
    assert_eq!(ops, vec![DiffOp::equal("same\n")]);
}

#[test]
fn empty_before_is_a_single_insert() {
    let ops = DiffProducer::new().diff("", "new file\n");
    assert_eq!(ops, vec![DiffOp::insert("new file\n")]);
}

#[test]
fn merge_orders_delete_before_insert_and_joins_equalities() {
    let raw = vec![
        DiffOp::equal("a"),
        DiffOp::equal("b"),
        DiffOp::insert("x"),
        DiffOp::delete("y"),
        DiffOp::insert(""),
        DiffOp::insert("z"),
        DiffOp::equal("c"),
    ];
    let ops = cleanup(raw, false);
    assert_eq!(
        ops,
        vec![
            DiffOp::equal("ab"),
            DiffOp::delete("y"),
            DiffOp::insert("xz"),
            DiffOp::equal("c"),
        ]
    );
}

#[test]
fn semantic_shift_moves_edit_to_word_boundary() {
    // "The c<at c>ame." reads better as "The <cat >came."
    let raw = vec![
        DiffOp::equal("The c"),
        DiffOp::insert("at c"),
        DiffOp::equal("ame."),
    ];
    let ops = cleanup(raw, true);
    assert_eq!(
        ops,
        vec![
            DiffOp::equal("The "),
            DiffOp::insert("cat "),
            DiffOp::equal("came."),
        ]
    );
}

#[test]
fn semantic_shift_prefers_line_breaks() {
    let raw = vec![
        DiffOp::equal("a\nb"),
        DiffOp::insert("\nb"),
        DiffOp::equal("\nc\n"),
    ];
    let ops = cleanup(raw, true);
    assert_eq!(kinds(&ops), vec![DiffKind::Equal, DiffKind::Insert, DiffKind::Equal]);
    assert_eq!(ops[1].text, "b\n");
    assert_eq!(before_text(&ops), "a\nb\nc\n");
    assert_eq!(after_text(&ops), "a\nb\nb\nc\n");
}

#[test]
fn cleanup_is_idempotent() {
    let before = "let total = a + b;\nreturn total;\n";
    let after = "let sum = a + b + c;\nreturn sum;\n";
    let ops = DiffProducer::new().diff(before, after);
    let again = cleanup(ops.clone(), true);
    assert_eq!(ops, again);
}

#[test]
fn boundary_scores_rank_natural_cuts() {
    let chars = |s: &str| s.chars().collect::<Vec<_>>();
    assert_eq!(boundary_score(&chars(""), &chars("x")), 6);
    assert_eq!(boundary_score(&chars("a\n\n"), &chars("b")), 5);
    assert_eq!(boundary_score(&chars("a\n"), &chars("b")), 4);
    assert_eq!(boundary_score(&chars("a."), &chars(" b")), 3);
    assert_eq!(boundary_score(&chars("a "), &chars("b")), 2);
    assert_eq!(boundary_score(&chars("a("), &chars("b")), 1);
    assert_eq!(boundary_score(&chars("ab"), &chars("cd")), 0);
}
