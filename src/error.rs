//! Crate-level error type.
//!
//! Mirrors the hand-rolled `GitError` in `git_history.rs`: plain variants, manual `Display`,
//! no `thiserror`. Per-file anomalies do not live here — see [`crate::model::Diagnostic`]; this
//! type covers the handful of conditions that are either genuinely fatal (`InvalidRoot`) or
//! summarize a stage-level failure mode that the rest of the pipeline still tolerates.

use std::fmt;
use std::path::PathBuf;

/// Errors surfaced by the scan pipeline.
///
/// Only [`ScanError::InvalidRoot`] aborts a scan outright; the other variants are constructed
/// for diagnostics and never propagated past the stage that produced them (see §7 of the
/// specification: "best-effort completion with logged anomalies").
#[derive(Debug)]
pub enum ScanError {
    /// The project root does not exist or is not a directory.
    InvalidRoot(PathBuf),
    /// A file could not be read from disk.
    ReadFailed { path: PathBuf, source: std::io::Error },
    /// A parser could not make sense of a file's content (used for diagnostics, not as a
    /// hard failure -- parsers fall back to an empty `ParseResult`).
    ParseFailed { path: PathBuf, reason: String },
    /// A configuration file (package.json, tsconfig.json, ...) was malformed.
    ConfigMalformed { path: PathBuf, reason: String },
    /// Git history could not be read for a file (repository missing, file untracked, ...).
    GitUnavailable { path: PathBuf, reason: String },
    /// A parse-pool worker panicked or otherwise failed to return results for its chunk.
    WorkerCrashed { reason: String },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::InvalidRoot(path) => {
                write!(f, "project root does not exist or is not a directory: {}", path.display())
            }
            ScanError::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            ScanError::ParseFailed { path, reason } => {
                write!(f, "failed to parse {}: {}", path.display(), reason)
            }
            ScanError::ConfigMalformed { path, reason } => {
                write!(f, "malformed config {}: {}", path.display(), reason)
            }
            ScanError::GitUnavailable { path, reason } => {
                write!(f, "git history unavailable for {}: {}", path.display(), reason)
            }
            ScanError::WorkerCrashed { reason } => write!(f, "parse worker crashed: {reason}"),
        }
    }
}

impl std::error::Error for ScanError {}

impl ScanError {
    pub fn read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::ReadFailed { path: path.into(), source }
    }

    pub fn git_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ScanError::GitUnavailable { path: path.into(), reason: reason.into() }
    }
}

impl From<git2::Error> for ScanError {
    fn from(err: git2::Error) -> Self {
        ScanError::GitUnavailable { path: PathBuf::new(), reason: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path() {
        let err = ScanError::InvalidRoot(PathBuf::from("/nope"));
        assert!(err.to_string().contains("/nope"));
    }

    #[test]
    fn from_git_error_carries_reason() {
        let git_err = git2::Error::from_str("not a repository");
        let err: ScanError = git_err.into();
        assert!(err.to_string().contains("not a repository"));
    }
}
