//! Git history enrichment for dead-file records (§4.7, §9, §10).
//!
//! Per file, reports the last-modifying and first (creating) commit, author, and date. Capped
//! by the caller at the first 200 dead files sorted by size -- git history lookups are
//! comparatively expensive and the specification explicitly bounds them.

use git2::{Oid, Repository};
use std::path::{Path, PathBuf};
use time::{format_description, OffsetDateTime};

use crate::model::DeadFile;

/// Error type for git operations, following the same hand-rolled shape as the rest of this
/// crate's error handling (no `thiserror`).
#[derive(Debug)]
pub enum GitError {
    NotARepository(String),
    RefNotFound(String),
    OperationFailed(String),
    IoError(std::io::Error),
}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::NotARepository(path) => write!(f, "not a git repository: {path}"),
            GitError::RefNotFound(reference) => write!(f, "reference not found: {reference}"),
            GitError::OperationFailed(msg) => write!(f, "git operation failed: {msg}"),
            GitError::IoError(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for GitError {}

impl From<git2::Error> for GitError {
    fn from(e: git2::Error) -> Self {
        GitError::OperationFailed(e.message().to_string())
    }
}

impl From<std::io::Error> for GitError {
    fn from(e: std::io::Error) -> Self {
        GitError::IoError(e)
    }
}

/// Per-file git history summary consumed by the dead classifier.
#[derive(Debug, Clone)]
pub struct FileHistory {
    pub last_modified_author: String,
    pub last_modified_date: String,
    pub created_date: String,
    pub days_since_modified: i64,
}

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Discover a git repository from the given path, searching upward for `.git`.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path)
            .map_err(|_| GitError::NotARepository(path.display().to_string()))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| GitError::NotARepository("bare repository".to_string()))?;
        Ok(Self { path: workdir.to_path_buf(), repo })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last and first commit touching `file_path`, relative to the repo root.
    pub fn file_history(&self, file_path: &Path) -> Result<FileHistory, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(git2::Sort::TIME)?;

        let format = format_description::parse("[year]-[month]-[day]").unwrap_or_default();
        let mut last: Option<(String, i64)> = None;
        let mut first: Option<i64> = None;

        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            if !self.commit_touches_file(&commit, file_path)? {
                continue;
            }
            let time = commit.time().seconds();
            if last.is_none() {
                let author = commit.author().name().unwrap_or("Unknown").to_string();
                last = Some((author, time));
            }
            first = Some(time);
        }

        let (author, last_ts) =
            last.ok_or_else(|| GitError::OperationFailed("file not tracked".to_string()))?;
        let first_ts = first.unwrap_or(last_ts);

        let now = OffsetDateTime::now_utc();
        let last_dt = OffsetDateTime::from_unix_timestamp(last_ts).unwrap_or(OffsetDateTime::UNIX_EPOCH);
        let first_dt = OffsetDateTime::from_unix_timestamp(first_ts).unwrap_or(OffsetDateTime::UNIX_EPOCH);
        let days_since_modified = (now - last_dt).whole_days();

        Ok(FileHistory {
            last_modified_author: author,
            last_modified_date: last_dt.format(&format).unwrap_or_default(),
            created_date: first_dt.format(&format).unwrap_or_default(),
            days_since_modified,
        })
    }

    fn commit_touches_file(&self, commit: &git2::Commit, file_path: &Path) -> Result<bool, GitError> {
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 { Some(commit.parent(0)?.tree()?) } else { None };
        let mut opts = git2::DiffOptions::new();
        opts.pathspec(file_path);
        let diff = self.repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
        Ok(diff.deltas().count() > 0)
    }
}

/// Look up history for `file_path` (relative to `root`), tolerating a missing/non-git root per
/// §7's "git unavailable or file not tracked" policy.
pub fn lookup(root: &Path, file_path: &Path) -> Result<FileHistory, GitError> {
    let repo = GitRepo::discover(root)?;
    repo.file_history(file_path)
}

/// Fill in the git-history fields of a [`DeadFile`] in place, recording the failure reason
/// instead of propagating it -- history is an enrichment, never a cause of scan failure.
///
/// The caller is responsible for applying the first-200-by-size cap (§4.7, §9) before calling
/// this; every invocation here does a full revwalk and is not cheap.
pub fn enrich(repo: &GitRepo, dead_file: &mut DeadFile) {
    match repo.file_history(&dead_file.path) {
        Ok(history) => {
            dead_file.last_modified_author = Some(history.last_modified_author);
            dead_file.last_modified_date = Some(history.last_modified_date);
            dead_file.created_date = Some(history.created_date);
            dead_file.days_since_modified = Some(history.days_since_modified);
            dead_file.git_available = true;
            dead_file.git_unavailable_reason = None;
        }
        Err(e) => {
            dead_file.git_available = false;
            dead_file.git_unavailable_reason = Some(e.to_string());
        }
    }
}

#[allow(dead_code)]
fn resolve_head(repo: &Repository) -> Result<Oid, GitError> {
    Ok(repo.head()?.peel_to_commit()?.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().to_path_buf();

        Command::new("git").args(["init"]).current_dir(&path).output().unwrap();
        Command::new("git")
            .args(["config", "user.email", "test@test.com"])
            .current_dir(&path)
            .output()
            .unwrap();
        Command::new("git")
            .args(["config", "user.name", "Test User"])
            .current_dir(&path)
            .output()
            .unwrap();

        std::fs::write(path.join("main.ts"), "export function main() {}").unwrap();
        Command::new("git").args(["add", "."]).current_dir(&path).output().unwrap();
        Command::new("git")
            .args(["commit", "-m", "Initial commit"])
            .current_dir(&path)
            .output()
            .unwrap();

        (temp_dir, path)
    }

    #[test]
    fn discover_non_git_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = GitRepo::discover(temp_dir.path());
        assert!(matches!(result, Err(GitError::NotARepository(_))));
    }

    #[test]
    fn file_history_reports_author_and_dates() {
        let (_temp_dir, path) = create_test_repo();
        let repo = GitRepo::discover(&path).unwrap();
        let history = repo.file_history(Path::new("main.ts")).unwrap();
        assert_eq!(history.last_modified_author, "Test User");
        assert_eq!(history.last_modified_date, history.created_date);
    }

    #[test]
    fn untracked_file_is_unavailable() {
        let (_temp_dir, path) = create_test_repo();
        let repo = GitRepo::discover(&path).unwrap();
        let result = repo.file_history(Path::new("never-committed.ts"));
        assert!(result.is_err());
    }
}
