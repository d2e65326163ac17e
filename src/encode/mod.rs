//! Frame capture and clip encoding.

pub mod ffmpeg;
pub mod frames;
pub mod sink;

pub use ffmpeg::{EncodeConfig, FfmpegEncoder, ensure_parent_dir, is_ffmpeg_on_path};
pub use frames::{FRAME_PATTERN, Mp4Sink, PngSequence, frame_file_name};
pub use sink::{FrameSink, InMemorySink, PreviewSink, SinkConfig};
