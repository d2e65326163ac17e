//! Diff operation sequences: the input of the replay engine.
//!
//! A sequence is an ordered list of [`DiffOp`] spans. Concatenating the Equal and Insert spans
//! yields the "after" text; concatenating the Equal and Delete spans yields the "before" text.

/// Character-level diff producer backed by `similar`.
pub mod producer;

pub use producer::{DiffProducer, cleanup};

/// Kind of a diff span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    /// Text shared by both sides.
    Equal,
    /// Text present only on the "after" side.
    Insert,
    /// Text present only on the "before" side.
    Delete,
}

/// One tagged span of a diff operation sequence.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiffOp {
    /// What happened to `text`.
    pub kind: DiffKind,
    /// The span's text.
    pub text: String,
}

impl DiffOp {
    pub fn new(kind: DiffKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn equal(text: impl Into<String>) -> Self {
        Self::new(DiffKind::Equal, text)
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self::new(DiffKind::Insert, text)
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Self::new(DiffKind::Delete, text)
    }

    /// Whether this span is animated during replay (Insert or Delete).
    pub fn is_change(&self) -> bool {
        self.kind != DiffKind::Equal
    }

    /// Length of `text` in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Rebuild the "before" text of a sequence.
pub fn before_text(ops: &[DiffOp]) -> String {
    ops.iter()
        .filter(|op| op.kind != DiffKind::Insert)
        .map(|op| op.text.as_str())
        .collect()
}

/// Rebuild the "after" text of a sequence.
pub fn after_text(ops: &[DiffOp]) -> String {
    ops.iter()
        .filter(|op| op.kind != DiffKind::Delete)
        .map(|op| op.text.as_str())
        .collect()
}

/// Total number of characters in Insert and Delete spans.
pub fn animated_chars(ops: &[DiffOp]) -> usize {
    ops.iter()
        .filter(|op| op.is_change())
        .map(DiffOp::char_len)
        .sum()
}

#[cfg(test)]
#[path = "../../tests/unit/diff/model.rs"]
mod tests;
