use crate::diff::{DiffKind, DiffOp};
use crate::foundation::error::{RetypeError, RetypeResult};

/// Characters consumed by one whitespace step while typing.
pub const DEFAULT_WHITESPACE_STRIDE: usize = 2;
/// Deleted spans with more lines than this are erased a line at a time.
pub const DEFAULT_BULK_DELETE_LINES: usize = 3;

/// Presentation heuristics applied when stepping through changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReplayPolicy {
    /// Type whitespace runs several characters per step and erase them in one step.
    pub fast_skip_whitespace: bool,
    /// Maximum whitespace characters revealed by one typing step.
    pub whitespace_stride: usize,
    /// Line count above which deleted spans are erased line by line.
    pub bulk_delete_lines: usize,
}

impl Default for ReplayPolicy {
    fn default() -> Self {
        Self {
            fast_skip_whitespace: true,
            whitespace_stride: DEFAULT_WHITESPACE_STRIDE,
            bulk_delete_lines: DEFAULT_BULK_DELETE_LINES,
        }
    }
}

impl ReplayPolicy {
    pub fn validate(&self) -> RetypeResult<()> {
        if self.whitespace_stride == 0 {
            return Err(RetypeError::config("whitespace stride must be >= 1"));
        }
        Ok(())
    }

    /// Policy that types and erases exactly one character per step.
    pub fn char_by_char() -> Self {
        Self {
            fast_skip_whitespace: false,
            whitespace_stride: 1,
            bulk_delete_lines: usize::MAX,
        }
    }
}

/// Position of the replay: the animated op and how many of its characters were applied.
///
/// For an Insert, `char_index` characters are typed; for a Delete, `char_index` characters are
/// erased from the end of the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReplayCursor {
    pub op_index: usize,
    pub char_index: usize,
}

/// What the editor shows at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSnapshot {
    /// Full visible buffer.
    pub text: String,
    /// Byte offset of the character the caret rests on. The caret is drawn at that character's
    /// trailing edge; it is never placed on a line break unless the buffer starts with one.
    pub caret: usize,
}

/// What a single [`ReplayEngine::advance`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Typed one visible character.
    Typed,
    /// Typed one or more whitespace characters.
    Whitespace,
    /// Erased a character or a whitespace run.
    Erased,
    /// Erased a whole line of a bulk delete.
    ErasedLine,
    /// Nothing left to do.
    Finished,
}

/// Result of one advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// The replay reached its terminal state; later calls are no-ops.
    pub done: bool,
    /// Kind of the step taken.
    pub step: StepKind,
    /// Characters applied by the step.
    pub chars: usize,
}

#[derive(Debug, Clone)]
struct Span {
    kind: DiffKind,
    text: String,
    /// Byte offset of every char boundary, including the end.
    bounds: Vec<usize>,
    lines: usize,
}

impl Span {
    fn new(op: DiffOp) -> Self {
        let mut bounds: Vec<usize> = op.text.char_indices().map(|(i, _)| i).collect();
        bounds.push(op.text.len());
        let lines = op.text.lines().count();
        Self {
            kind: op.kind,
            text: op.text,
            bounds,
            lines,
        }
    }

    fn char_len(&self) -> usize {
        self.bounds.len() - 1
    }

    fn char_at(&self, idx: usize) -> Option<char> {
        self.text.get(self.bounds[idx]..)?.chars().next()
    }

    /// The first `chars` characters.
    fn head(&self, chars: usize) -> &str {
        &self.text[..self.bounds[chars.min(self.char_len())]]
    }
}

/// Replays a diff sequence one typing step at a time.
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    spans: Vec<Span>,
    cursor: ReplayCursor,
    policy: ReplayPolicy,
    language: Option<String>,
    done: bool,
}

impl ReplayEngine {
    /// Create an engine positioned before the first change.
    ///
    /// Empty spans are dropped; a sequence with no text at all is rejected.
    pub fn new(ops: Vec<DiffOp>, policy: ReplayPolicy) -> RetypeResult<Self> {
        policy.validate()?;
        let spans: Vec<Span> = ops
            .into_iter()
            .filter(|op| !op.text.is_empty())
            .map(Span::new)
            .collect();
        if spans.is_empty() {
            return Err(RetypeError::invariant("cannot replay an empty diff sequence"));
        }
        Ok(Self {
            spans,
            cursor: ReplayCursor::default(),
            policy,
            language: None,
            done: false,
        })
    }

    /// Attach the language tag used to highlight snapshots.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn cursor(&self) -> ReplayCursor {
        self.cursor
    }

    pub fn policy(&self) -> &ReplayPolicy {
        &self.policy
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of spans after dropping empty ones.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Fraction of spans passed so far, in `[0, 1]`.
    pub fn progress_fraction(&self) -> f64 {
        if self.done {
            return 1.0;
        }
        self.cursor.op_index as f64 / self.spans.len() as f64
    }

    /// Move the cursor to an arbitrary position.
    ///
    /// Fails when `cursor` is outside the sequence. Seeking clears the done flag unless the
    /// target is the terminal position.
    pub fn seek(&mut self, cursor: ReplayCursor) -> RetypeResult<()> {
        let span = self.spans.get(cursor.op_index).ok_or_else(|| {
            RetypeError::invariant(format!(
                "cursor op index {} out of range (len {})",
                cursor.op_index,
                self.spans.len()
            ))
        })?;
        if cursor.char_index > span.char_len() {
            return Err(RetypeError::invariant(format!(
                "cursor char index {} exceeds span length {}",
                cursor.char_index,
                span.char_len()
            )));
        }
        self.cursor = cursor;
        self.done = cursor == self.terminal_cursor();
        Ok(())
    }

    /// Apply one typing step.
    pub fn advance(&mut self) -> Progress {
        if self.done {
            return Progress {
                done: true,
                step: StepKind::Finished,
                chars: 0,
            };
        }

        // Equal spans are never animated.
        let Some(op_index) = self.next_change(self.cursor.op_index) else {
            self.finish();
            return Progress {
                done: true,
                step: StepKind::Finished,
                chars: 0,
            };
        };
        if op_index != self.cursor.op_index {
            self.cursor = ReplayCursor {
                op_index,
                char_index: 0,
            };
        }

        let (chars, step) = self.step_width();
        self.cursor.char_index += chars;

        if self.cursor.char_index >= self.spans[op_index].char_len() {
            match self.next_change(op_index + 1) {
                Some(next) => {
                    self.cursor = ReplayCursor {
                        op_index: next,
                        char_index: 0,
                    };
                }
                None => {
                    self.finish();
                    return Progress {
                        done: true,
                        step,
                        chars,
                    };
                }
            }
        }

        Progress {
            done: false,
            step,
            chars,
        }
    }

    /// Rebuild the visible buffer and caret for the current cursor.
    pub fn snapshot(&self) -> RenderSnapshot {
        let current = self.cursor.op_index;
        let mut text = String::new();

        for span in &self.spans[..current] {
            if span.kind != DiffKind::Delete {
                text.push_str(&span.text);
            }
        }

        let span = &self.spans[current];
        match span.kind {
            DiffKind::Insert => text.push_str(span.head(self.cursor.char_index)),
            DiffKind::Delete => {
                let remaining = span.char_len().saturating_sub(self.cursor.char_index);
                text.push_str(span.head(remaining));
            }
            DiffKind::Equal => text.push_str(&span.text),
        }
        let insertion = text.len();

        for span in &self.spans[current + 1..] {
            if span.kind != DiffKind::Insert {
                text.push_str(&span.text);
            }
        }

        let caret = caret_for(&text, insertion);
        RenderSnapshot { text, caret }
    }

    fn next_change(&self, from: usize) -> Option<usize> {
        (from..self.spans.len()).find(|&i| self.spans[i].kind != DiffKind::Equal)
    }

    fn terminal_cursor(&self) -> ReplayCursor {
        let op_index = self.spans.len() - 1;
        ReplayCursor {
            op_index,
            char_index: self.spans[op_index].char_len(),
        }
    }

    fn finish(&mut self) {
        self.cursor = self.terminal_cursor();
        self.done = true;
    }

    /// Characters consumed by the next step at the cursor, and the kind of that step.
    fn step_width(&self) -> (usize, StepKind) {
        let span = &self.spans[self.cursor.op_index];
        let applied = self.cursor.char_index;
        match span.kind {
            DiffKind::Insert => {
                let is_ws = |i: usize| span.char_at(i).is_some_and(char::is_whitespace);
                if self.policy.fast_skip_whitespace && is_ws(applied) {
                    let run = (applied..span.char_len())
                        .take(self.policy.whitespace_stride)
                        .take_while(|&i| is_ws(i))
                        .count();
                    (run.max(1), StepKind::Whitespace)
                } else {
                    (1, StepKind::Typed)
                }
            }
            DiffKind::Delete => {
                let remaining = span.char_len() - applied;
                if span.lines > self.policy.bulk_delete_lines {
                    // Erase back to the start of the line holding the last remaining character.
                    let keep = (0..remaining.saturating_sub(1))
                        .rev()
                        .find(|&i| span.char_at(i) == Some('\n'))
                        .map_or(0, |i| i + 1);
                    return (remaining - keep, StepKind::ErasedLine);
                }
                let is_ws = |i: usize| span.char_at(i).is_some_and(char::is_whitespace);
                if self.policy.fast_skip_whitespace && is_ws(remaining - 1) {
                    let run = (0..remaining).rev().take_while(|&i| is_ws(i)).count();
                    (run.max(1), StepKind::Erased)
                } else {
                    (1, StepKind::Erased)
                }
            }
            // Only reachable if called on an Equal span, which `advance` never does.
            DiffKind::Equal => (span.char_len().max(1), StepKind::Typed),
        }
    }
}

/// Place the caret on the character before `insertion`, stepping off a line break.
fn caret_for(text: &str, insertion: usize) -> usize {
    let prev = |at: usize| {
        text[..at]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    };
    let mut caret = prev(insertion);
    if caret > 0 && text[caret..].starts_with('\n') {
        caret = prev(caret);
    }
    caret
}

#[cfg(test)]
#[path = "../../tests/unit/replay/engine.rs"]
mod tests;
