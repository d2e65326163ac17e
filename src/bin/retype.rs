use std::{io::Write as _, path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use retype::cancel::{self, ScratchRegistry};
use retype::highlight::DEFAULT_THEME;

#[derive(Parser, Debug)]
#[command(name = "retype", version, about = "Replay git history as typed-out code videos")]
struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one MP4 per changed file per commit (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print the cleaned diff sequence of one file in one commit as JSON.
    Ops(OpsArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Repository to replay.
    repo: PathBuf,

    /// Output directory.
    #[arg(short, long, default_value = "output")]
    out: PathBuf,

    /// First commit to render (inclusive). Defaults to the root commit.
    #[arg(short = 'a', long)]
    start: Option<String>,

    /// Last commit to render (inclusive). Defaults to HEAD.
    #[arg(short, long)]
    end: Option<String>,

    /// Maximum number of commits to render (0 = all).
    #[arg(short, long, default_value_t = 0)]
    max_commits: usize,

    /// Monospace font file. Defaults to $RETYPE_FONT, then a well-known system font, then the
    /// embedded DejaVu Sans Mono.
    #[arg(short, long)]
    font: Option<PathBuf>,

    /// Bundled theme name or path to a .tmTheme file.
    #[arg(short, long, default_value = DEFAULT_THEME)]
    theme: String,

    /// Minimum delay between keystrokes, in seconds.
    #[arg(short = 'i', long, default_value = "0.01", value_parser = parse_secs)]
    min_delay: Duration,

    /// Maximum delay between keystrokes, in seconds.
    #[arg(short = 's', long, default_value = "1", value_parser = parse_secs)]
    max_delay: Duration,

    /// Frame width in pixels (even).
    #[arg(short = 'x', long, default_value_t = 600)]
    width: u32,

    /// Frame height in pixels (even).
    #[arg(short = 'y', long, default_value_t = 800)]
    height: u32,

    /// Output frame rate.
    #[arg(long, default_value_t = retype::playback::DEFAULT_FPS)]
    fps: u32,

    /// Stop capturing a clip after this many frames.
    #[arg(long, default_value_t = retype::playback::DEFAULT_MAX_FRAMES)]
    max_frames: u64,

    /// Copies of the final frame appended to every clip.
    #[arg(long, default_value_t = retype::playback::DEFAULT_HOLD_FRAMES)]
    hold_frames: u64,

    /// x264 preset.
    #[arg(long, default_value = "veryslow")]
    preset: String,

    /// Mirror the clip being captured to <out>/preview.png.
    #[arg(short = 'w', long)]
    show: bool,

    /// Capture as fast as possible instead of in real time.
    #[arg(long)]
    offline: bool,

    /// Seed for keystroke pacing.
    #[arg(long)]
    seed: Option<u64>,

    /// Keep the PNG frames of every clip.
    #[arg(long)]
    keep_frames: bool,

    /// Type and erase one character per step.
    #[arg(long)]
    char_by_char: bool,
}

#[derive(Args, Debug)]
struct OpsArgs {
    /// Repository to read.
    repo: PathBuf,

    /// Commit holding the change.
    #[arg(long, default_value = "HEAD")]
    commit: String,

    /// Path of the changed file, relative to the repository root.
    #[arg(long)]
    file: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Ops(args) => cmd_ops(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_secs(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("invalid seconds '{s}': {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid seconds '{s}': {e}"))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    if !retype::is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg is required for MP4 encoding, but was not found on PATH");
    }

    let config = retype::RunConfig {
        repo: args.repo,
        out_dir: args.out,
        range: retype::CommitRange {
            start: args.start,
            end: args.end,
            max_commits: (args.max_commits > 0).then_some(args.max_commits),
        },
        canvas: retype::Canvas {
            width: args.width,
            height: args.height,
        },
        playback: retype::PlaybackConfig {
            fps: retype::Fps::whole(args.fps)?,
            max_frames: args.max_frames,
            hold_frames: args.hold_frames,
        },
        pacing: retype::PacingConfig {
            min_delay: args.min_delay,
            max_delay: args.max_delay,
            ..retype::PacingConfig::default()
        },
        policy: if args.char_by_char {
            retype::ReplayPolicy::char_by_char()
        } else {
            retype::ReplayPolicy::default()
        },
        encode: retype::EncodeConfig::default().with_preset(args.preset),
        realtime: !args.offline,
        seed: args.seed,
        keep_frames: args.keep_frames,
        preview: args.show,
    };

    let ctx = retype::RenderContext::load(args.font.as_deref(), &args.theme)
        .context("load font and theme")?;
    match ctx.font_path() {
        Some(font) => {
            tracing::info!(font = %font.display(), theme = %args.theme, "render context ready")
        }
        None => tracing::info!(font = "embedded", theme = %args.theme, "render context ready"),
    }

    let registry = ScratchRegistry::new();
    cancel::install(registry.clone())?;

    let summary = retype::Animator::new(config, &ctx)?
        .with_registry(registry)
        .run()?;

    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} clips failed",
            summary.failed,
            summary.clips + summary.failed
        );
    }
    Ok(())
}

fn cmd_ops(args: OpsArgs) -> anyhow::Result<()> {
    let source = retype::CommitSource::open(&args.repo)
        .with_context(|| format!("open repository '{}'", args.repo.display()))?;
    let ops = retype::file_ops(&source, &args.commit, &args.file, &retype::DiffProducer::new())?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &ops).context("write diff JSON")?;
    writeln!(stdout)?;
    Ok(())
}
