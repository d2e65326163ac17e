use std::path::{Path, PathBuf};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{RetypeError, RetypeResult};
use crate::render::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame of a clip.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Playback rate of the finished clip.
    pub fps: Fps,
}

/// Consumer of captured frames, one clip at a time.
///
/// `push_frame` is called with densely increasing indices starting at 0.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> RetypeResult<()>;
    /// Push one frame in capture order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> RetypeResult<()>;
    /// Called once after the last frame. Sinks that encode do their work here.
    fn end(&mut self) -> RetypeResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> RetypeResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> RetypeResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> RetypeResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Wraps another sink and mirrors every frame to a single PNG, replaced in place, so an image
/// viewer can follow the clip while it is captured.
pub struct PreviewSink<S> {
    inner: S,
    path: PathBuf,
}

impl<S: FrameSink> PreviewSink<S> {
    pub fn new(inner: S, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FrameSink> FrameSink for PreviewSink<S> {
    fn begin(&mut self, cfg: SinkConfig) -> RetypeResult<()> {
        crate::encode::ffmpeg::ensure_parent_dir(&self.path)?;
        self.inner.begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> RetypeResult<()> {
        self.inner.push_frame(idx, frame)?;

        // Stage next to the target, then rename over it.
        let staging = self.path.with_extension("png.part");
        crate::encode::frames::write_png(&staging, frame)?;
        std::fs::rename(&staging, &self.path).map_err(|e| {
            RetypeError::encode(format!(
                "failed to update preview '{}': {e}",
                self.path.display()
            ))
        })
    }

    fn end(&mut self) -> RetypeResult<()> {
        self.inner.end()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
