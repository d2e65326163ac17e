use super::*;

#[test]
fn parses_name_status_lines() {
    let output = "M\tsrc/main.rs\nA\tsrc/new.rs\nD\tsrc/old.rs\nR087\tsrc/a.rs\tsrc/b.rs\n\
                  C100\tlib.rs\tlib2.rs\nT\tlink\nU\tconflict.rs\n\n";
    let entries = parse_name_status(output);

    let statuses: Vec<FileStatus> = entries.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            FileStatus::Modified,
            FileStatus::Added,
            FileStatus::Deleted,
            FileStatus::Renamed,
            FileStatus::Copied,
            FileStatus::TypeChanged,
        ]
    );
    assert_eq!(entries[3].path, "src/b.rs");
    assert_eq!(entries[3].old_path.as_deref(), Some("src/a.rs"));
    assert_eq!(entries[4].old_path.as_deref(), Some("lib.rs"));
    assert_eq!(entries[0].old_path, None);
}

#[test]
fn malformed_entries_are_ignored() {
    assert!(parse_name_status("R100\tonly-one-path\n").is_empty());
    assert!(parse_name_status("M\n").is_empty());
    assert!(parse_name_status("").is_empty());
}

#[test]
fn quoted_paths_are_unescaped() {
    assert_eq!(unquote("plain.rs"), "plain.rs");
    assert_eq!(unquote("\"tab\\there.rs\""), "tab\there.rs");
    assert_eq!(unquote("\"quote\\\"d.rs\""), "quote\"d.rs");
    assert_eq!(unquote("\"caf\\303\\251.rs\""), "café.rs");
}

#[test]
fn short_id_is_twelve_chars() {
    let c = Commit {
        id: "0123456789abcdef0123".to_string(),
        summary: String::new(),
    };
    assert_eq!(c.short_id(), "0123456789ab");
    let short = Commit {
        id: "abc".to_string(),
        summary: String::new(),
    };
    assert_eq!(short.short_id(), "abc");
}

#[test]
fn missing_path_is_a_repository_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CommitSource::open(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, RetypeError::Repository(_)));
}

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Option<Self> {
        if !is_git_on_path() {
            eprintln!("skipping: git not on PATH");
            return None;
        }
        let f = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        f.git(&["init", "-q"]);
        Some(f)
    }

    fn git(&self, args: &[&str]) -> String {
        let out = Command::new("git")
            .arg("-C")
            .arg(self.dir.path())
            .args([
                "-c",
                "user.name=retype",
                "-c",
                "user.email=retype@example.com",
                "-c",
                "commit.gpgsign=false",
            ])
            .args(args)
            .output()
            .unwrap();
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
        String::from_utf8(out.stdout).unwrap()
    }

    fn write(&self, path: &str, content: &[u8]) {
        let p = self.dir.path().join(path);
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        std::fs::write(p, content).unwrap();
    }

    fn commit(&self, msg: &str) {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", msg]);
    }
}

#[test]
fn walks_history_oldest_first_with_contents() {
    let Some(f) = Fixture::new() else {
        return;
    };
    f.write("src/lib.rs", b"fn old() {}\n");
    f.write("logo.bin", b"\x00\x01\x02");
    f.commit("initial");
    f.write("src/lib.rs", b"fn new() {}\n");
    f.write("README.md", b"# hi\n");
    f.commit("second");
    std::fs::remove_file(f.dir.path().join("README.md")).unwrap();
    f.commit("third");

    let source = CommitSource::open(f.dir.path()).unwrap();
    let commits = source.commits(&CommitRange::default()).unwrap();
    let summaries: Vec<&str> = commits.iter().map(|c| c.summary.as_str()).collect();
    assert_eq!(summaries, vec!["initial", "second", "third"]);

    // Root commit: everything added, binary skipped.
    assert_eq!(source.first_parent(&commits[0]).unwrap(), None);
    let root = source.changed_files(&commits[0]).unwrap();
    assert_eq!(root.len(), 1);
    assert_eq!(root[0].path, "src/lib.rs");
    assert_eq!(root[0].status, FileStatus::Added);
    assert_eq!(root[0].before, "");
    assert_eq!(root[0].after, "fn old() {}\n");

    let mut second = source.changed_files(&commits[1]).unwrap();
    second.sort_by(|a, b| a.path.cmp(&b.path));
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].path, "README.md");
    assert_eq!(second[0].status, FileStatus::Added);
    assert_eq!(second[1].before, "fn old() {}\n");
    assert_eq!(second[1].after, "fn new() {}\n");
    assert_eq!(second[1].status, FileStatus::Modified);

    let third = source.changed_files(&commits[2]).unwrap();
    assert_eq!(third[0].status, FileStatus::Deleted);
    assert_eq!(third[0].before, "# hi\n");
    assert_eq!(third[0].after, "");
}

#[test]
fn renames_keep_old_content_as_before() {
    let Some(f) = Fixture::new() else {
        return;
    };
    let body = "line one\nline two\nline three\nline four\n";
    f.write("a.txt", body.as_bytes());
    f.commit("add");
    f.git(&["mv", "a.txt", "b.txt"]);
    f.write("b.txt", format!("{body}line five\n").as_bytes());
    f.commit("move");

    let source = CommitSource::open(f.dir.path()).unwrap();
    let commits = source.commits(&CommitRange::default()).unwrap();
    let files = source.changed_files(&commits[1]).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].status, FileStatus::Renamed);
    assert_eq!(files[0].old_path.as_deref(), Some("a.txt"));
    assert_eq!(files[0].path, "b.txt");
    assert_eq!(files[0].before, body);
}

#[test]
fn range_bounds_and_cap_apply() {
    let Some(f) = Fixture::new() else {
        return;
    };
    for i in 0..4 {
        f.write("n.txt", format!("{i}\n").as_bytes());
        f.commit(&format!("c{i}"));
    }
    let source = CommitSource::open(f.dir.path()).unwrap();
    let all = source.commits(&CommitRange::default()).unwrap();
    assert_eq!(all.len(), 4);

    let range = CommitRange {
        start: Some(all[1].id.clone()),
        end: Some("HEAD~1".to_string()),
        max_commits: None,
    };
    let picked: Vec<String> = source
        .commits(&range)
        .unwrap()
        .into_iter()
        .map(|c| c.summary)
        .collect();
    assert_eq!(picked, vec!["c1", "c2"]);

    let capped = source
        .commits(&CommitRange {
            max_commits: Some(1),
            ..CommitRange::default()
        })
        .unwrap();
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].summary, "c0");

    assert!(matches!(
        source.resolve("does-not-exist"),
        Err(RetypeError::Repository(_))
    ));
    let reversed = CommitRange {
        start: Some(all[3].id.clone()),
        end: Some(all[1].id.clone()),
        max_commits: None,
    };
    assert!(source.commits(&reversed).is_err());
}

#[test]
fn plain_directory_is_not_a_repository() {
    if !is_git_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    // tempdirs may live inside a repository on some machines; only assert the error kind.
    if let Err(err) = CommitSource::open(dir.path()) {
        assert!(matches!(err, RetypeError::Repository(_)));
    }
}

#[test]
fn single_commit_lookup() {
    let Some(f) = Fixture::new() else {
        return;
    };
    f.write("x.txt", b"x\n");
    f.commit("only commit");
    let source = CommitSource::open(f.dir.path()).unwrap();
    let head = source.commit("HEAD").unwrap();
    assert_eq!(head.summary, "only commit");
    assert_eq!(head.id.len(), 40);
    assert_eq!(head.id, source.resolve("HEAD").unwrap());
}
