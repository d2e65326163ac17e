use std::path::{Path, PathBuf};

use crate::cancel::ScratchRegistry;
use crate::encode::ffmpeg::FfmpegEncoder;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{RetypeError, RetypeResult};
use crate::render::FrameRGBA;

/// ffmpeg input pattern matching [`frame_file_name`].
pub const FRAME_PATTERN: &str = "frame_%05d.png";

pub fn frame_file_name(idx: FrameIndex) -> String {
    format!("frame_{:05}.png", idx.0)
}

/// Densely numbered PNG frames in a scratch directory that is removed on drop.
#[derive(Debug)]
pub struct PngSequence {
    dir: tempfile::TempDir,
    width: u32,
    height: u32,
    count: u64,
}

impl PngSequence {
    /// Create an empty sequence under `parent`, or under the system temp dir.
    pub fn create(parent: Option<&Path>, width: u32, height: u32) -> RetypeResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("retype-frames-");
        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        Ok(Self {
            dir,
            width,
            height,
            count: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Write `frame` as the next file of the sequence.
    pub fn push(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> RetypeResult<()> {
        if idx.0 != self.count {
            return Err(RetypeError::invariant(format!(
                "frame {} pushed out of order, expected {}",
                idx.0, self.count
            )));
        }
        if frame.width != self.width || frame.height != self.height {
            return Err(RetypeError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        write_png(&self.dir.path().join(frame_file_name(idx)), frame)?;
        self.count += 1;
        Ok(())
    }

    /// Stop the directory from being removed on drop and return its path.
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }
}

/// Write one frame as an opaque RGBA PNG.
pub(crate) fn write_png(path: &Path, frame: &FrameRGBA) -> RetypeResult<()> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(RetypeError::encode(
            "frame.data size mismatch with width*height*4",
        ));
    }

    let mut opaque = vec![0u8; expected];
    flatten_to_opaque_rgba8(&mut opaque, &frame.data, frame.premultiplied, [0, 0, 0, 255])?;

    image::save_buffer_with_format(
        path,
        &opaque,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| RetypeError::encode(format!("failed to write '{}': {e}", path.display())))
}

/// Capture sink producing one MP4 per clip: frames go to a [`PngSequence`] and are encoded
/// with ffmpeg in [`FrameSink::end`].
pub struct Mp4Sink {
    encoder: FfmpegEncoder,
    out_path: PathBuf,
    scratch_parent: Option<PathBuf>,
    keep_frames: bool,
    registry: Option<ScratchRegistry>,
    active: Option<(PngSequence, Fps)>,
}

impl Mp4Sink {
    pub fn new(encoder: FfmpegEncoder, out_path: impl Into<PathBuf>) -> Self {
        Self {
            encoder,
            out_path: out_path.into(),
            scratch_parent: None,
            keep_frames: false,
            registry: None,
            active: None,
        }
    }

    /// Place the scratch frame directory under `parent` instead of the system temp dir.
    pub fn with_scratch_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(parent.into());
        self
    }

    /// Keep the PNG frames after encoding.
    pub fn with_keep_frames(mut self, keep: bool) -> Self {
        self.keep_frames = keep;
        self
    }

    /// Announce the scratch directory to an interrupt handler while frames are captured.
    pub fn with_registry(mut self, registry: ScratchRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }

    fn release(&mut self) {
        if let Some(registry) = &self.registry {
            registry.clear();
        }
    }
}

impl FrameSink for Mp4Sink {
    fn begin(&mut self, cfg: SinkConfig) -> RetypeResult<()> {
        let seq = PngSequence::create(self.scratch_parent.as_deref(), cfg.width, cfg.height)?;
        if let Some(registry) = &self.registry {
            registry.set(seq.dir());
        }
        self.active = Some((seq, cfg.fps));
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> RetypeResult<()> {
        let Some((seq, _)) = self.active.as_mut() else {
            return Err(RetypeError::invariant("push_frame called before begin"));
        };
        seq.push(idx, frame)
    }

    fn end(&mut self) -> RetypeResult<()> {
        let Some((seq, fps)) = self.active.take() else {
            return Err(RetypeError::invariant("end called before begin"));
        };
        let result = self.encoder.encode(&seq, fps, &self.out_path);
        self.release();

        if self.keep_frames {
            let dir = seq.keep();
            tracing::info!(frames = %dir.display(), "kept frame directory");
        }
        result
    }
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> RetypeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(RetypeError::invariant(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let [bg_r, bg_g, bg_b, _] = bg_rgba.map(u16::from);

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255 - a;
        let over = |c: u8, bg: u16| -> u8 {
            let c = if src_is_premul {
                u16::from(c)
            } else {
                mul_div255(u16::from(c), a)
            };
            (c + mul_div255(bg, inv)).min(255) as u8
        };

        d[0] = over(s[0], bg_r);
        d[1] = over(s[1], bg_g);
        d[2] = over(s[2], bg_b);
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/encode/frames.rs"]
mod tests;
