//! Progress reporting.
//!
//! The rich terminal UI (spinners, colored status) is out of scope for this crate -- see
//! `SPEC_FULL.md` §1/§10. Progress is instead a plain struct handed to a caller-supplied
//! closure at each stage boundary and periodically within parsing; the CLI binary is the only
//! consumer that prints it, via the `[deadwood]` tagged `eprintln!` convention used throughout.

/// One stage-boundary or periodic progress notification.
#[derive(Debug, Clone)]
pub struct Progress {
    pub phase: Phase,
    pub message: String,
    pub current: Option<usize>,
    pub total: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Discovery,
    Parsing,
    ConfigProbing,
    EntryDetection,
    Resolving,
    ReachabilityWalk,
    Classification,
    GitHistory,
    Done,
}

impl Progress {
    pub fn new(phase: Phase, message: impl Into<String>) -> Self {
        Progress { phase, message: message.into(), current: None, total: None }
    }

    pub fn with_counts(phase: Phase, message: impl Into<String>, current: usize, total: usize) -> Self {
        Progress { phase, message: message.into(), current: Some(current), total: Some(total) }
    }
}

/// Callback type accepted by [`crate::scan::scan_root`].
pub type ProgressSink<'a> = dyn FnMut(Progress) + 'a;

/// Print a `[deadwood][info]`-tagged message -- used by the CLI binary, never by the engine
/// itself (the engine only talks to callers through [`Progress`]).
pub fn info(message: &str) {
    println!("[deadwood][info] {message}");
}

pub fn warning(message: &str) {
    eprintln!("[deadwood][warn] {message}");
}

pub fn error(message: &str) {
    eprintln!("[deadwood][error] {message}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_with_counts_sets_fields() {
        let p = Progress::with_counts(Phase::Parsing, "parsing files", 10, 100);
        assert_eq!(p.current, Some(10));
        assert_eq!(p.total, Some(100));
        assert_eq!(p.phase, Phase::Parsing);
    }
}
