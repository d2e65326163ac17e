//! Fixed-rate capture loop turning replay steps into frames.

pub mod clock;

pub use clock::{Clock, RealtimeClock, SimulatedClock};

use std::time::Duration;

use rand::Rng;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{RetypeError, RetypeResult};
use crate::highlight::Highlighter;
use crate::render::{FrameRGBA, Renderer, View};
use crate::replay::{Pacer, ReplayEngine};

pub const DEFAULT_FPS: u32 = 10;
/// Capture ceiling per clip.
pub const DEFAULT_MAX_FRAMES: u64 = 1000;
/// Copies of the final frame appended to every clip.
pub const DEFAULT_HOLD_FRAMES: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaybackConfig {
    pub fps: Fps,
    /// Captured frames after which the loop stops even if the replay is unfinished.
    pub max_frames: u64,
    pub hold_frames: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: Fps {
                num: DEFAULT_FPS,
                den: 1,
            },
            max_frames: DEFAULT_MAX_FRAMES,
            hold_frames: DEFAULT_HOLD_FRAMES,
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> RetypeResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if self.max_frames == 0 {
            return Err(RetypeError::config("max frames must be > 0"));
        }
        Ok(())
    }

    /// Frames captured after the replay finishes, half a second's worth.
    pub fn grace_frames(&self) -> u64 {
        self.fps.half_second_frames()
    }
}

/// Summary of one clip's capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackStats {
    /// Frames rendered by the loop, grace frames included.
    pub captured: u64,
    /// Copies of the last frame appended after the loop.
    pub held: u64,
    /// Replay steps applied.
    pub advances: u64,
    /// Times the buffer was re-tokenized.
    pub relexes: u64,
    /// Whether the replay reached its terminal state before the ceiling.
    pub completed: bool,
}

impl PlaybackStats {
    pub fn total_frames(&self) -> u64 {
        self.captured + self.held
    }
}

/// New vertical scroll keeping the caret line visible.
///
/// When the caret comes within two lines of the bottom edge the view jumps so that threshold sits
/// half a viewport higher. A caret above the view recenters it.
pub fn auto_scroll(scroll: f32, caret_top: f32, line_height: f32, viewport: f32) -> f32 {
    let margin = 2.0 * line_height;
    if caret_top - scroll + margin > viewport {
        return caret_top + margin - viewport + viewport / 2.0;
    }
    if caret_top < scroll {
        return (caret_top - viewport / 2.0).max(0.0);
    }
    scroll
}

/// Capture loop for one file's replay.
pub struct Playback<'a, Rd: ?Sized, C> {
    config: PlaybackConfig,
    renderer: &'a mut Rd,
    highlighter: &'a Highlighter,
    clock: C,
}

impl<'a, Rd: Renderer + ?Sized, C: Clock> Playback<'a, Rd, C> {
    pub fn new(
        config: PlaybackConfig,
        renderer: &'a mut Rd,
        highlighter: &'a Highlighter,
        clock: C,
    ) -> RetypeResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            renderer,
            highlighter,
            clock,
        })
    }

    /// Drive `engine` to completion (or the frame ceiling), pushing every frame into `sink`.
    ///
    /// Each tick subtracts the elapsed time from the countdown and applies replay steps while it
    /// is not positive, adding the pacer's delay after each one. Every tick captures one frame.
    #[tracing::instrument(level = "debug", skip_all, fields(language = engine.language()))]
    pub fn run<R: Rng, S: FrameSink + ?Sized>(
        &mut self,
        engine: &mut ReplayEngine,
        pacer: &mut Pacer<R>,
        sink: &mut S,
    ) -> RetypeResult<PlaybackStats> {
        let canvas = self.renderer.canvas();
        let viewport = canvas.height as f32;
        let line_height = self.renderer.line_height();
        let grace = self.config.grace_frames();

        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.config.fps,
        })?;

        let mut stats = PlaybackStats::default();
        let mut snapshot = engine.snapshot();
        let mut tokens = self.highlighter.tokenize(engine.language(), &snapshot.text);
        stats.relexes += 1;

        let mut countdown = pacer.initial_delay().as_secs_f64();
        let mut scroll = 0.0f32;
        let mut extra = 0u64;

        let last: FrameRGBA = loop {
            countdown -= self.clock.tick().as_secs_f64();

            let mut stepped = false;
            while countdown <= 0.0 && !engine.is_done() {
                let progress = engine.advance();
                stats.advances += 1;
                stepped = true;
                countdown += pacer.delay_after(progress.step).as_secs_f64();
            }

            if stepped {
                let next = engine.snapshot();
                if next.text != snapshot.text {
                    tokens = self.highlighter.tokenize(engine.language(), &next.text);
                    stats.relexes += 1;
                }
                snapshot = next;
            }

            let caret_top = self.renderer.caret_top(&snapshot.text, snapshot.caret);
            scroll = auto_scroll(scroll, caret_top, line_height, viewport);

            let rendered = self.renderer.render(&View {
                text: &snapshot.text,
                tokens: &tokens,
                caret: snapshot.caret,
                scroll_y: scroll,
            })?;
            sink.push_frame(FrameIndex(stats.captured), &rendered.frame)?;
            stats.captured += 1;

            if engine.is_done() {
                if extra >= grace {
                    stats.completed = true;
                    break rendered.frame;
                }
                extra += 1;
            }
            if stats.captured >= self.config.max_frames {
                stats.completed = engine.is_done();
                if !stats.completed {
                    tracing::warn!(
                        max_frames = self.config.max_frames,
                        progress = engine.progress_fraction(),
                        "frame ceiling reached before the replay finished"
                    );
                }
                break rendered.frame;
            }
        };

        for _ in 0..self.config.hold_frames {
            sink.push_frame(FrameIndex(stats.captured + stats.held), &last)?;
            stats.held += 1;
        }

        sink.end()?;
        tracing::debug!(
            captured = stats.captured,
            held = stats.held,
            advances = stats.advances,
            relexes = stats.relexes,
            duration = ?self.duration_of(stats.total_frames()),
            "clip captured"
        );
        Ok(stats)
    }

    fn duration_of(&self, frames: u64) -> Duration {
        self.config.fps.frame_duration().mul_f64(frames as f64)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/mod.rs"]
mod tests;
