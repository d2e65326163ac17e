use std::time::Duration;

use similar::{Algorithm, DiffTag, TextDiff};

use crate::diff::{DiffKind, DiffOp};

/// Computes cleaned character-level diff sequences between two texts.
#[derive(Debug, Clone)]
pub struct DiffProducer {
    algorithm: Algorithm,
    timeout: Option<Duration>,
    semantic: bool,
}

impl Default for DiffProducer {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Myers,
            timeout: Some(Duration::from_secs(2)),
            semantic: true,
        }
    }
}

impl DiffProducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Give up on a minimal diff after `timeout`; `None` waits for the exact result.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable shifting edits onto word and line boundaries.
    pub fn with_semantic_shift(mut self, enabled: bool) -> Self {
        self.semantic = enabled;
        self
    }

    /// Diff `before` against `after` and return the cleaned sequence.
    pub fn diff(&self, before: &str, after: &str) -> Vec<DiffOp> {
        let mut config = TextDiff::configure();
        config.algorithm(self.algorithm);
        if let Some(timeout) = self.timeout {
            config.timeout(timeout);
        }
        let diff = config.diff_chars(before, after);

        let old = diff.old_slices();
        let new = diff.new_slices();
        let mut raw = Vec::new();
        for op in diff.ops() {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            match tag {
                DiffTag::Equal => raw.push(DiffOp::equal(old[old_range].concat())),
                DiffTag::Delete => raw.push(DiffOp::delete(old[old_range].concat())),
                DiffTag::Insert => raw.push(DiffOp::insert(new[new_range].concat())),
                DiffTag::Replace => {
                    raw.push(DiffOp::delete(old[old_range].concat()));
                    raw.push(DiffOp::insert(new[new_range].concat()));
                }
            }
        }

        let ops = cleanup(raw, self.semantic);
        tracing::trace!(ops = ops.len(), "diff produced");
        ops
    }
}

/// Normalize a raw sequence.
///
/// Empty spans are dropped, each run of changes between two equalities becomes at most one
/// Delete followed by at most one Insert, and adjacent equalities are merged. With `semantic`,
/// single edits surrounded by equalities slide to the most natural boundary, repeated until
/// nothing moves, so cleaning a cleaned sequence returns it unchanged.
pub fn cleanup(ops: Vec<DiffOp>, semantic: bool) -> Vec<DiffOp> {
    const MAX_SHIFT_PASSES: usize = 8;

    let mut ops = merge(ops);
    if semantic {
        for _ in 0..MAX_SHIFT_PASSES {
            if !shift_to_boundaries(&mut ops) {
                break;
            }
            ops = merge(ops);
        }
    }
    ops
}

fn merge(ops: Vec<DiffOp>) -> Vec<DiffOp> {
    let mut out: Vec<DiffOp> = Vec::with_capacity(ops.len());
    let mut deleted = String::new();
    let mut inserted = String::new();

    fn flush(out: &mut Vec<DiffOp>, deleted: &mut String, inserted: &mut String) {
        if !deleted.is_empty() {
            out.push(DiffOp::delete(std::mem::take(deleted)));
        }
        if !inserted.is_empty() {
            out.push(DiffOp::insert(std::mem::take(inserted)));
        }
    }

    for op in ops {
        if op.text.is_empty() {
            continue;
        }
        match op.kind {
            DiffKind::Delete => deleted.push_str(&op.text),
            DiffKind::Insert => inserted.push_str(&op.text),
            DiffKind::Equal => {
                flush(&mut out, &mut deleted, &mut inserted);
                match out.last_mut() {
                    Some(last) if last.kind == DiffKind::Equal => last.text.push_str(&op.text),
                    _ => out.push(op),
                }
            }
        }
    }
    flush(&mut out, &mut deleted, &mut inserted);
    out
}

/// Slide lone edits between two equalities onto the best-scoring boundary.
///
/// Returns whether anything moved.
fn shift_to_boundaries(ops: &mut Vec<DiffOp>) -> bool {
    let mut changed = false;
    let mut i = 1;
    while i + 1 < ops.len() {
        if ops[i - 1].kind != DiffKind::Equal
            || ops[i + 1].kind != DiffKind::Equal
            || ops[i].kind == DiffKind::Equal
        {
            i += 1;
            continue;
        }

        let mut left: Vec<char> = ops[i - 1].text.chars().collect();
        let mut edit: Vec<char> = ops[i].text.chars().collect();
        let mut right: Vec<char> = ops[i + 1].text.chars().collect();

        // Slide fully left first.
        let common = common_suffix(&left, &edit);
        if common > 0 {
            let moved: Vec<char> = edit[edit.len() - common..].to_vec();
            left.truncate(left.len() - common);
            let mut shifted = moved.clone();
            shifted.extend_from_slice(&edit[..edit.len() - common]);
            edit = shifted;
            let mut new_right = moved;
            new_right.extend_from_slice(&right);
            right = new_right;
        }

        let mut best = (left.clone(), edit.clone(), right.clone());
        let mut best_score = boundary_score(&left, &edit) + boundary_score(&edit, &right);
        while !edit.is_empty() && !right.is_empty() && edit[0] == right[0] {
            left.push(edit[0]);
            edit.remove(0);
            edit.push(right.remove(0));
            let score = boundary_score(&left, &edit) + boundary_score(&edit, &right);
            // `>=` prefers the rightmost of equally good positions.
            if score >= best_score {
                best_score = score;
                best = (left.clone(), edit.clone(), right.clone());
            }
        }

        let (best_left, best_edit, best_right) = best;
        let best_left: String = best_left.into_iter().collect();
        if best_left != ops[i - 1].text {
            ops[i - 1].text = best_left;
            ops[i].text = best_edit.into_iter().collect();
            ops[i + 1].text = best_right.into_iter().collect();
            changed = true;
        }
        i += 1;
    }
    if changed {
        ops.retain(|op| !op.text.is_empty());
    }
    changed
}

fn common_suffix(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Score the boundary between `one` and `two`; higher is a more natural place to cut.
///
/// 6 = edge of the text, 5 = blank line, 4 = line break, 3 = end of a sentence-like run,
/// 2 = whitespace, 1 = punctuation, 0 = inside a word.
fn boundary_score(one: &[char], two: &[char]) -> u32 {
    let (Some(&c1), Some(&c2)) = (one.last(), two.first()) else {
        return 6;
    };

    let non_alnum1 = !c1.is_alphanumeric();
    let non_alnum2 = !c2.is_alphanumeric();
    let ws1 = non_alnum1 && c1.is_whitespace();
    let ws2 = non_alnum2 && c2.is_whitespace();
    let line_break1 = ws1 && c1.is_control();
    let line_break2 = ws2 && c2.is_control();
    let blank1 = line_break1 && (ends_with(one, "\n\n") || ends_with(one, "\n\r\n"));
    let blank2 = line_break2
        && (starts_with(two, "\n\n")
            || starts_with(two, "\r\n\r\n")
            || starts_with(two, "\n\r\n")
            || starts_with(two, "\r\n\n"));

    if blank1 || blank2 {
        5
    } else if line_break1 || line_break2 {
        4
    } else if non_alnum1 && !ws1 && ws2 {
        3
    } else if ws1 || ws2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

fn ends_with(text: &[char], pat: &str) -> bool {
    let pat: Vec<char> = pat.chars().collect();
    text.ends_with(&pat)
}

fn starts_with(text: &[char], pat: &str) -> bool {
    let pat: Vec<char> = pat.chars().collect();
    text.starts_with(&pat)
}

#[cfg(test)]
#[path = "../../tests/unit/diff/producer.rs"]
mod tests;
