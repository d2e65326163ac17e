//! Run driver: walks commits and changed files and produces one clip per file.

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::cancel::ScratchRegistry;
use crate::diff::{DiffOp, DiffProducer};
use crate::encode::{EncodeConfig, FfmpegEncoder, FrameSink, Mp4Sink, PreviewSink};
use crate::foundation::core::Canvas;
use crate::foundation::error::{RetypeError, RetypeResult};
use crate::git::{Commit, CommitRange, CommitSource, FileChange};
use crate::highlight::language_for_path;
use crate::playback::{
    Clock, Playback, PlaybackConfig, PlaybackStats, RealtimeClock, SimulatedClock,
};
use crate::render::{CodeRenderer, RenderContext};
use crate::replay::{Pacer, PacingConfig, ReplayEngine, ReplayPolicy};

/// File name of the live preview written with `--show`.
pub const PREVIEW_FILE: &str = "preview.png";

/// Everything one `render` invocation needs besides the shared [`RenderContext`].
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub repo: PathBuf,
    pub out_dir: PathBuf,
    pub range: CommitRange,
    pub canvas: Canvas,
    pub playback: PlaybackConfig,
    pub pacing: PacingConfig,
    pub policy: ReplayPolicy,
    pub encode: EncodeConfig,
    /// Pace capture with the wall clock; otherwise frames are produced as fast as possible.
    pub realtime: bool,
    /// Seed for pacing; `None` draws one from the OS.
    pub seed: Option<u64>,
    pub keep_frames: bool,
    /// Mirror every captured frame to `<out_dir>/preview.png`.
    pub preview: bool,
}

impl RunConfig {
    pub fn validate(&self) -> RetypeResult<()> {
        self.canvas.validate()?;
        self.playback.validate()?;
        self.pacing.validate()?;
        self.policy.validate()?;
        self.encode.validate()?;
        if self.out_dir.is_file() {
            return Err(RetypeError::config(format!(
                "output path '{}' is a file",
                self.out_dir.display()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub commits: usize,
    pub clips: usize,
    /// Files with nothing to animate.
    pub skipped: usize,
    /// Clips or commits abandoned after a scoped error.
    pub failed: usize,
}

/// `<out>/<n>_<short id>/<path with '/' replaced by '_'>.mp4`, `n` counting commits from 1.
pub fn clip_path(out_dir: &Path, ordinal: usize, commit: &Commit, file_path: &str) -> PathBuf {
    out_dir
        .join(format!("{ordinal}_{}", commit.short_id()))
        .join(format!("{}.mp4", file_path.replace('/', "_")))
}

/// Cleaned diff of `path` in commit `rev`, as replayed by `render`.
pub fn file_ops(
    source: &CommitSource,
    rev: &str,
    path: &str,
    producer: &DiffProducer,
) -> RetypeResult<Vec<DiffOp>> {
    let commit = source.commit(rev)?;
    let change = source
        .changed_files(&commit)?
        .into_iter()
        .find(|f| f.path == path || f.old_path.as_deref() == Some(path))
        .ok_or_else(|| {
            RetypeError::repository(format!(
                "'{path}' is not a changed text file in {}",
                commit.short_id()
            ))
        })?;
    Ok(producer.diff(&change.before, &change.after))
}

pub struct Animator<'a> {
    config: RunConfig,
    ctx: &'a RenderContext,
    producer: DiffProducer,
    registry: ScratchRegistry,
}

impl<'a> Animator<'a> {
    pub fn new(config: RunConfig, ctx: &'a RenderContext) -> RetypeResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ctx,
            producer: DiffProducer::new(),
            registry: ScratchRegistry::new(),
        })
    }

    /// Registry naming the scratch directory of the clip in progress.
    pub fn with_registry(mut self, registry: ScratchRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_producer(mut self, producer: DiffProducer) -> Self {
        self.producer = producer;
        self
    }

    /// Render every changed file of every commit in range.
    ///
    /// Repository errors while listing a commit's files abandon that commit; render and encode
    /// errors abandon that clip. Everything else aborts the run.
    pub fn run(&self) -> RetypeResult<RunSummary> {
        let source = CommitSource::open(&self.config.repo)?;
        let commits = source.commits(&self.config.range)?;
        let mut summary = RunSummary::default();
        if commits.is_empty() {
            tracing::warn!("no commits in range");
            return Ok(summary);
        }

        let mut renderer = self.ctx.renderer(self.config.canvas)?;
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        for (i, commit) in commits.iter().enumerate() {
            let ordinal = i + 1;
            summary.commits += 1;
            tracing::info!(
                commit = commit.short_id(),
                summary = %commit.summary,
                "processing commit ({ordinal}/{})",
                commits.len()
            );

            let files = match source.changed_files(commit) {
                Ok(files) => files,
                Err(err) if err.is_scoped() => {
                    tracing::error!(commit = commit.short_id(), %err, "skipping commit");
                    summary.failed += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };

            for (j, file) in files.iter().enumerate() {
                tracing::info!(path = %file.path, "file ({}/{})", j + 1, files.len());
                match self.animate_file(&mut renderer, &mut rng, ordinal, commit, file) {
                    Ok(Some(_)) => summary.clips += 1,
                    Ok(None) => summary.skipped += 1,
                    Err(err) if err.is_scoped() => {
                        tracing::error!(path = %file.path, %err, "failed to animate diff");
                        summary.failed += 1;
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        tracing::info!(
            commits = summary.commits,
            clips = summary.clips,
            skipped = summary.skipped,
            failed = summary.failed,
            "all commits processed"
        );
        Ok(summary)
    }

    /// Replay one file change into its clip. Returns `None` when there is nothing to type.
    pub fn animate_file(
        &self,
        renderer: &mut CodeRenderer,
        rng: &mut StdRng,
        ordinal: usize,
        commit: &Commit,
        file: &FileChange,
    ) -> RetypeResult<Option<PlaybackStats>> {
        if file.before == file.after {
            tracing::debug!(path = %file.path, "content unchanged");
            return Ok(None);
        }
        let ops = self.producer.diff(&file.before, &file.after);
        if !ops.iter().any(DiffOp::is_change) {
            return Ok(None);
        }

        let mut engine = ReplayEngine::new(ops, self.config.policy)?
            .with_language(language_for_path(&file.path));
        let mut pacer = Pacer::new(self.config.pacing, &mut *rng)?;

        let out = clip_path(&self.config.out_dir, ordinal, commit, &file.path);
        let sink = Mp4Sink::new(FfmpegEncoder::new(self.config.encode.clone())?, &out)
            .with_keep_frames(self.config.keep_frames)
            .with_registry(self.registry.clone());

        let frame = self.config.playback.fps.frame_duration();
        let clock: Box<dyn Clock> = if self.config.realtime {
            Box::new(RealtimeClock::new(frame))
        } else {
            Box::new(SimulatedClock::new(frame))
        };
        let mut playback =
            Playback::new(self.config.playback, renderer, self.ctx.highlighter(), clock)?;

        let mut sink: Box<dyn FrameSink> = if self.config.preview {
            Box::new(PreviewSink::new(sink, self.config.out_dir.join(PREVIEW_FILE)))
        } else {
            Box::new(sink)
        };
        let stats = playback.run(&mut engine, &mut pacer, sink.as_mut())?;

        tracing::info!(
            clip = %out.display(),
            frames = stats.total_frames(),
            completed = stats.completed,
            "wrote clip"
        );
        Ok(Some(stats))
    }
}

#[cfg(test)]
#[path = "../tests/unit/animate.rs"]
mod tests;
