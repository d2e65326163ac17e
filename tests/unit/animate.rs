use std::process::Command;

use super::*;
use crate::diff::{DiffKind, after_text, before_text};
use crate::git::is_git_on_path;

fn commit() -> Commit {
    Commit {
        id: "3f2a9c1b7d4e5f60718293a4b5c6d7e8f9012345".to_string(),
        summary: "tweak".to_string(),
    }
}

fn run_config(repo: &Path, out: &Path) -> RunConfig {
    RunConfig {
        repo: repo.to_path_buf(),
        out_dir: out.to_path_buf(),
        range: CommitRange::default(),
        canvas: Canvas {
            width: 64,
            height: 48,
        },
        playback: PlaybackConfig::default(),
        pacing: PacingConfig::instant(),
        policy: ReplayPolicy::default(),
        encode: EncodeConfig::default(),
        realtime: false,
        seed: Some(7),
        keep_frames: false,
        preview: false,
    }
}

#[test]
fn clip_paths_flatten_directories() {
    let p = clip_path(Path::new("out"), 3, &commit(), "src/render/code.rs");
    assert_eq!(
        p,
        Path::new("out")
            .join("3_3f2a9c1b7d4e")
            .join("src_render_code.rs.mp4")
    );
}

#[test]
fn run_config_validation() {
    let dir = tempfile::tempdir().unwrap();
    let ok = run_config(dir.path(), &dir.path().join("out"));
    assert!(ok.validate().is_ok());

    let odd = RunConfig {
        canvas: Canvas {
            width: 63,
            height: 48,
        },
        ..ok.clone()
    };
    assert!(matches!(odd.validate(), Err(RetypeError::Config(_))));

    let file = dir.path().join("file");
    std::fs::write(&file, b"").unwrap();
    let bad_out = RunConfig {
        out_dir: file,
        ..ok.clone()
    };
    assert!(bad_out.validate().is_err());

    let bad_preset = RunConfig {
        encode: EncodeConfig::default().with_preset("nope"),
        ..ok
    };
    assert!(bad_preset.validate().is_err());
}

#[test]
fn ops_for_a_committed_file() {
    if !is_git_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let git = |args: &[&str]| {
        let out = Command::new("git")
            .arg("-C")
            .arg(dir.path())
            .args(["-c", "user.name=t", "-c", "user.email=t@example.com"])
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .output()
            .unwrap();
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    };
    git(&["init", "-q"]);
    std::fs::write(dir.path().join("main.go"), "func old() {}\n").unwrap();
    git(&["add", "-A"]);
    git(&["commit", "-q", "-m", "one"]);
    std::fs::write(dir.path().join("main.go"), "func new() {}\n").unwrap();
    git(&["commit", "-q", "-am", "two"]);

    let source = CommitSource::open(dir.path()).unwrap();
    let producer = DiffProducer::new();
    let ops = file_ops(&source, "HEAD", "main.go", &producer).unwrap();
    assert_eq!(before_text(&ops), "func old() {}\n");
    assert_eq!(after_text(&ops), "func new() {}\n");
    assert!(ops.iter().any(|op| op.kind == DiffKind::Insert));

    let root = file_ops(&source, "HEAD~1", "main.go", &producer).unwrap();
    assert_eq!(root, vec![DiffOp::insert("func old() {}\n")]);

    let err = file_ops(&source, "HEAD", "missing.go", &producer).unwrap_err();
    assert!(matches!(err, RetypeError::Repository(_)));
}

#[test]
fn unchanged_files_produce_no_clip() {
    let highlighter = crate::highlight::Highlighter::new(crate::highlight::DEFAULT_THEME).unwrap();
    let ctx = RenderContext::from_parts(crate::render::EMBEDDED_FONT.to_vec(), highlighter);
    let dir = tempfile::tempdir().unwrap();
    let animator = Animator::new(run_config(dir.path(), dir.path()), &ctx)
        .unwrap()
        .with_producer(DiffProducer::new().with_semantic_shift(false));
    let mut renderer = ctx
        .renderer(Canvas {
            width: 64,
            height: 48,
        })
        .unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let same = FileChange {
        path: "a.rs".to_string(),
        status: crate::git::FileStatus::Renamed,
        old_path: Some("b.rs".to_string()),
        before: "fn a() {}\n".to_string(),
        after: "fn a() {}\n".to_string(),
    };
    let out = animator
        .animate_file(&mut renderer, &mut rng, 1, &commit(), &same)
        .unwrap();
    assert!(out.is_none());
}
