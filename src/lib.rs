#![forbid(unsafe_code)]
//! Replay git history as typed-out, syntax-highlighted code clips.
//!
//! For every file a commit changes, the previous and current contents are diffed character by
//! character ([`diff`]), replayed one keystroke at a time ([`replay`]), captured by a fixed-rate
//! loop ([`playback`]) that renders each frame ([`render`]) and encoded to MP4 ([`encode`]).

pub mod animate;
pub mod cancel;
pub mod diff;
pub mod encode;
mod foundation;
pub mod git;
pub mod highlight;
pub mod playback;
pub mod render;
pub mod replay;

pub use animate::{Animator, RunConfig, RunSummary, clip_path, file_ops};
pub use diff::{DiffKind, DiffOp, DiffProducer};
pub use encode::{EncodeConfig, FfmpegEncoder, FrameSink, InMemorySink, Mp4Sink, is_ffmpeg_on_path};
pub use foundation::core::{Canvas, Fps, FrameIndex, Rgba8};
pub use foundation::error::{RetypeError, RetypeResult};
pub use git::{Commit, CommitRange, CommitSource, FileChange, FileStatus};
pub use highlight::{Highlighter, Token};
pub use playback::{Clock, Playback, PlaybackConfig, PlaybackStats, RealtimeClock, SimulatedClock};
pub use render::{CodeRenderer, FrameRGBA, RenderContext, RenderStyle, Renderer};
pub use replay::{
    Pacer, PacingConfig, Progress, RenderSnapshot, ReplayCursor, ReplayEngine, ReplayPolicy,
    StepKind,
};
