use std::{
    path::Path,
    process::{Command, Stdio},
};

use crate::encode::frames::{FRAME_PATTERN, PngSequence};
use crate::foundation::core::Fps;
use crate::foundation::error::{RetypeError, RetypeResult};

const X264_PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
    "placebo",
];

/// x264 settings for the per-file clips.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EncodeConfig {
    pub preset: String,
    pub crf: u8,
    pub overwrite: bool,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            preset: "veryslow".to_string(),
            crf: 18,
            overwrite: true,
        }
    }
}

impl EncodeConfig {
    pub fn validate(&self) -> RetypeResult<()> {
        if !X264_PRESETS.contains(&self.preset.as_str()) {
            return Err(RetypeError::config(format!(
                "unknown x264 preset '{}'",
                self.preset
            )));
        }
        if self.crf > 51 {
            return Err(RetypeError::config("crf must be within 0..=51"));
        }
        Ok(())
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> RetypeResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Encodes a numbered PNG sequence into an H.264 MP4 with the system `ffmpeg` binary.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig) -> RetypeResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &EncodeConfig {
        &self.cfg
    }

    /// Build the ffmpeg invocation for `frames_dir` without running it.
    pub fn command(&self, frames_dir: &Path, fps: Fps, out_path: &Path) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.arg(if self.cfg.overwrite { "-y" } else { "-n" });
        cmd.args(["-loglevel", "error", "-framerate"])
            .arg(fps.ffmpeg_rate())
            .arg("-i")
            .arg(frames_dir.join(FRAME_PATTERN))
            .args(["-an", "-c:v", "libx264", "-preset"])
            .arg(&self.cfg.preset)
            .arg("-crf")
            .arg(self.cfg.crf.to_string())
            .args(["-pix_fmt", "yuv420p", "-movflags", "+faststart"])
            .arg(out_path);
        cmd
    }

    /// Encode every frame of `frames` into `out_path`.
    ///
    /// An empty sequence is rejected before ffmpeg is looked up or spawned.
    pub fn encode(&self, frames: &PngSequence, fps: Fps, out_path: &Path) -> RetypeResult<()> {
        if frames.is_empty() {
            return Err(RetypeError::encode(format!(
                "no frames captured for '{}'",
                out_path.display()
            )));
        }

        ensure_parent_dir(out_path)?;
        if !self.cfg.overwrite && out_path.exists() {
            return Err(RetypeError::encode(format!(
                "output file '{}' already exists",
                out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(RetypeError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let output = self
            .command(frames.dir(), fps, out_path)
            .output()
            .map_err(|e| {
                RetypeError::encode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RetypeError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::debug!(
            frames = frames.len(),
            out = %out_path.display(),
            "encoded clip"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
