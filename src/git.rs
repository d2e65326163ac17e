//! Commit walking through the `git` CLI.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::error::{RetypeError, RetypeResult};

/// Length of the abbreviated commit id used in output directory names.
pub const SHORT_ID_LEN: usize = 12;

/// How a file changed in a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
    TypeChanged,
}

/// One parsed `--name-status` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameStatus {
    pub status: FileStatus,
    pub path: String,
    /// Source path of a rename or copy.
    pub old_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Commit {
    pub id: String,
    pub summary: String,
}

impl Commit {
    pub fn short_id(&self) -> &str {
        self.id.get(..SHORT_ID_LEN).unwrap_or(&self.id)
    }
}

/// A changed text file with its full content on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub status: FileStatus,
    pub old_path: Option<String>,
    /// Content in the first parent; empty for added files.
    pub before: String,
    /// Content in the commit; empty for deleted files.
    pub after: String,
}

/// Which commits to replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitRange {
    /// First commit, inclusive. Defaults to the root of the first-parent history.
    pub start: Option<String>,
    /// Last commit, inclusive. Defaults to `HEAD`.
    pub end: Option<String>,
    pub max_commits: Option<usize>,
}

pub fn is_git_on_path() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// A local repository read through `git -C <root> ...`.
#[derive(Debug, Clone)]
pub struct CommitSource {
    root: PathBuf,
}

impl CommitSource {
    /// Open the repository containing `path`.
    pub fn open(path: &Path) -> RetypeResult<Self> {
        if !path.exists() {
            return Err(RetypeError::repository(format!(
                "'{}' does not exist",
                path.display()
            )));
        }
        let out = run_git(path, &["rev-parse", "--show-toplevel"]).map_err(|_| {
            RetypeError::repository(format!("'{}' is not a git repository", path.display()))
        })?;
        let root = String::from_utf8_lossy(&out).trim().to_string();
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full id of the commit `rev` names.
    pub fn resolve(&self, rev: &str) -> RetypeResult<String> {
        let query = format!("{rev}^{{commit}}");
        let out = self
            .git(&["rev-parse", "--verify", "--quiet", &query])
            .map_err(|_| RetypeError::repository(format!("unknown revision '{rev}'")))?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }

    /// The commit `rev` names.
    pub fn commit(&self, rev: &str) -> RetypeResult<Commit> {
        let id = self.resolve(rev)?;
        let out = self.git(&["log", "-1", "--format=%s", &id])?;
        Ok(Commit {
            id,
            summary: String::from_utf8_lossy(&out).trim_end().to_string(),
        })
    }

    /// Commits of `range` along the first-parent history, oldest first.
    pub fn commits(&self, range: &CommitRange) -> RetypeResult<Vec<Commit>> {
        let end = self.resolve(range.end.as_deref().unwrap_or("HEAD"))?;
        let out = self.git(&[
            "log",
            "--first-parent",
            "--reverse",
            "--format=%H%x1f%s",
            &end,
        ])?;
        let mut commits: Vec<Commit> = String::from_utf8_lossy(&out)
            .lines()
            .filter_map(|line| {
                let (id, summary) = line.split_once('\x1f')?;
                Some(Commit {
                    id: id.to_string(),
                    summary: summary.to_string(),
                })
            })
            .collect();

        if let Some(start) = &range.start {
            let start_id = self.resolve(start)?;
            let pos = commits.iter().position(|c| c.id == start_id).ok_or_else(|| {
                RetypeError::repository(format!(
                    "start '{start}' is not in the first-parent history of '{}'",
                    range.end.as_deref().unwrap_or("HEAD")
                ))
            })?;
            commits.drain(..pos);
        }
        if let Some(max) = range.max_commits {
            commits.truncate(max);
        }
        Ok(commits)
    }

    /// First parent of `commit`, or `None` for a root commit.
    pub fn first_parent(&self, commit: &Commit) -> RetypeResult<Option<String>> {
        let out = self.git(&["rev-list", "--parents", "-n", "1", &commit.id])?;
        let text = String::from_utf8_lossy(&out);
        Ok(text.split_whitespace().nth(1).map(str::to_string))
    }

    /// Text files changed by `commit` relative to its first parent. Binary files are skipped.
    pub fn changed_files(&self, commit: &Commit) -> RetypeResult<Vec<FileChange>> {
        let parent = self.first_parent(commit)?;
        let out = match &parent {
            Some(parent) => self.git(&["diff", "--name-status", "-M", parent, &commit.id])?,
            None => self.git(&[
                "diff-tree",
                "-r",
                "--root",
                "--no-commit-id",
                "--name-status",
                "-M",
                &commit.id,
            ])?,
        };

        let mut files = Vec::new();
        for entry in parse_name_status(&String::from_utf8_lossy(&out)) {
            let before = match (&parent, entry.status) {
                (None, _) | (_, FileStatus::Added) => Vec::new(),
                (Some(parent), _) => {
                    let source = entry.old_path.as_deref().unwrap_or(&entry.path);
                    self.show(parent, source)?
                }
            };
            let after = match entry.status {
                FileStatus::Deleted => Vec::new(),
                _ => self.show(&commit.id, &entry.path)?,
            };

            if is_binary(&before) || is_binary(&after) {
                tracing::warn!(path = %entry.path, commit = commit.short_id(), "skipping binary file");
                continue;
            }

            files.push(FileChange {
                path: entry.path,
                status: entry.status,
                old_path: entry.old_path,
                before: into_text(before),
                after: into_text(after),
            });
        }
        Ok(files)
    }

    /// Raw content of `path` at `rev`.
    pub fn show(&self, rev: &str, path: &str) -> RetypeResult<Vec<u8>> {
        self.git(&["show", &format!("{rev}:{path}")])
    }

    fn git(&self, args: &[&str]) -> RetypeResult<Vec<u8>> {
        run_git(&self.root, args)
    }
}

fn run_git(dir: &Path, args: &[&str]) -> RetypeResult<Vec<u8>> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "core.quotePath=false"])
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| RetypeError::repository(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        return Err(RetypeError::repository(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or_default(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(output.stdout)
}

/// Parse `git diff --name-status` output. Unknown and unmerged entries are ignored.
pub fn parse_name_status(output: &str) -> Vec<NameStatus> {
    let mut entries = Vec::new();
    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        let status = match parts[0].chars().next() {
            Some('M') => FileStatus::Modified,
            Some('A') => FileStatus::Added,
            Some('D') => FileStatus::Deleted,
            Some('R') => FileStatus::Renamed,
            Some('C') => FileStatus::Copied,
            Some('T') => FileStatus::TypeChanged,
            _ => continue,
        };

        let entry = match (status, &parts[1..]) {
            (FileStatus::Renamed | FileStatus::Copied, [old, new]) => NameStatus {
                status,
                path: unquote(new),
                old_path: Some(unquote(old)),
            },
            (_, [path]) => NameStatus {
                status,
                path: unquote(path),
                old_path: None,
            },
            _ => continue,
        };
        entries.push(entry);
    }
    entries
}

/// Undo git's C-style quoting of unusual path names.
fn unquote(path: &str) -> String {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
    else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut rest = inner.as_bytes();
    while let Some((&b, tail)) = rest.split_first() {
        rest = tail;
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match rest {
            [d0 @ b'0'..=b'3', d1 @ b'0'..=b'7', d2 @ b'0'..=b'7', tail @ ..] => {
                bytes.push((d0 - b'0') * 64 + (d1 - b'0') * 8 + (d2 - b'0'));
                rest = tail;
            }
            [c, tail @ ..] => {
                bytes.push(match c {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    b'a' => 0x07,
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'v' => 0x0b,
                    other => *other,
                });
                rest = tail;
            }
            [] => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn is_binary(bytes: &[u8]) -> bool {
    bytes.contains(&0)
}

fn into_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
#[path = "../tests/unit/git.rs"]
mod tests;
