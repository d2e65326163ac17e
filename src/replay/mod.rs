//! Keystroke replay of a diff: the cursor state machine and its pacing.

/// Cursor state machine and snapshot reconstruction.
pub mod engine;
/// Human-like delays between replay steps.
pub mod pacing;

pub use engine::{Progress, RenderSnapshot, ReplayCursor, ReplayEngine, ReplayPolicy, StepKind};
pub use pacing::{Pacer, PacingConfig, next_delay};
