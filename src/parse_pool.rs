//! Parse worker pool (§5).
//!
//! Fans out parsing across `min(available_parallelism, 8)` workers by default, using `rayon`'s
//! data-parallel fork-join model rather than hand-rolled threads -- each chunk of files is parsed
//! independently and folded back on the main thread, so there is no shared mutable state and no
//! locking. Streams results back in batches of `BATCH_SIZE` to bound the cost of progress
//! reporting, and a file whose read or parse fails is recorded as a [`Diagnostic`] rather than
//! aborting the chunk (§7: "best-effort completion with logged anomalies").

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use rayon::prelude::*;

use crate::model::{Diagnostic, File, ParseResult};
use crate::parsers;
use crate::progress::{Phase, Progress};

pub const BATCH_SIZE: usize = 200;
/// Category size at which the chunked-pipeline variant engages (§5).
const CHUNKED_PIPELINE_THRESHOLD: usize = 10_000;
const CHUNK_SIZE: usize = 5_000;

pub struct ParsePoolConfig {
    pub workers: usize,
}

impl Default for ParsePoolConfig {
    fn default() -> Self {
        ParsePoolConfig { workers: default_worker_count() }
    }
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1).min(8)
}

/// Parse every file, returning the per-path results plus any read/parse diagnostics.
///
/// `root` is the project root the discovered (relative) [`File::path`]s are joined against to
/// read file content from disk.
pub fn parse_all(
    root: &std::path::Path,
    files: &[File],
    config: &ParsePoolConfig,
    mut on_progress: impl FnMut(Progress),
) -> (HashMap<PathBuf, ParseResult>, Vec<Diagnostic>) {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers.max(1))
        .build()
        .unwrap_or_else(|_| rayon::ThreadPoolBuilder::new().build().expect("default rayon pool"));

    let total = files.len();
    let mut results: HashMap<PathBuf, ParseResult> = HashMap::with_capacity(total);
    let mut diagnostics = Vec::new();
    let mut completed = 0usize;

    if total > CHUNKED_PIPELINE_THRESHOLD {
        for chunk in files.chunks(CHUNK_SIZE) {
            let (chunk_results, chunk_diagnostics) = pool.install(|| parse_chunk(root, chunk));
            for batch in chunk_results.chunks(BATCH_SIZE) {
                completed += batch.len();
                on_progress(Progress::with_counts(Phase::Parsing, "parsing files", completed, total));
            }
            results.extend(chunk_results);
            diagnostics.extend(chunk_diagnostics);
        }
    } else {
        let (chunk_results, chunk_diagnostics) = pool.install(|| parse_chunk(root, files));
        for batch in chunk_results.chunks(BATCH_SIZE) {
            completed += batch.len();
            on_progress(Progress::with_counts(Phase::Parsing, "parsing files", completed, total));
        }
        results.extend(chunk_results);
        diagnostics.extend(chunk_diagnostics);
    }

    (results, diagnostics)
}

fn parse_chunk(
    root: &std::path::Path,
    files: &[File],
) -> (Vec<(PathBuf, ParseResult)>, Vec<Diagnostic>) {
    files
        .par_iter()
        .map(|file| parse_one(root, file))
        .fold(
            || (Vec::new(), Vec::new()),
            |(mut results, mut diags), (path, result, diag)| {
                results.push((path, result));
                if let Some(diag) = diag {
                    diags.push(diag);
                }
                (results, diags)
            },
        )
        .reduce(
            || (Vec::new(), Vec::new()),
            |(mut r1, mut d1), (r2, d2)| {
                r1.extend(r2);
                d1.extend(d2);
                (r1, d1)
            },
        )
}

fn parse_one(root: &std::path::Path, file: &File) -> (PathBuf, ParseResult, Option<Diagnostic>) {
    let full_path = root.join(&file.path);
    match fs::read_to_string(&full_path) {
        Ok(content) => {
            let file_name = file.path.to_string_lossy();
            let result = parsers::parse(file.language, &content, &file_name);
            (file.path.clone(), result, None)
        }
        Err(e) => {
            let diagnostic = Diagnostic { path: file.path.clone(), message: format!("read failed: {e}") };
            (file.path.clone(), ParseResult::empty(), Some(diagnostic))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Language;

    #[test]
    fn parses_every_readable_file() {
        let tmp = tempfile::tempdir().expect("tmp dir");
        std::fs::write(tmp.path().join("a.rs"), "pub fn a() {}\n").unwrap();
        std::fs::write(tmp.path().join("b.rs"), "pub fn b() {}\n").unwrap();

        let files = vec![
            File { path: PathBuf::from("a.rs"), size: 10, lines: 1, language: Language::Rust, mtime: None },
            File { path: PathBuf::from("b.rs"), size: 10, lines: 1, language: Language::Rust, mtime: None },
        ];

        let (results, diagnostics) = parse_all(tmp.path(), &files, &ParsePoolConfig { workers: 2 }, |_| {});
        assert_eq!(results.len(), 2);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn missing_file_becomes_diagnostic_not_panic() {
        let tmp = tempfile::tempdir().expect("tmp dir");
        let files = vec![File {
            path: PathBuf::from("missing.rs"),
            size: 0,
            lines: 0,
            language: Language::Rust,
            mtime: None,
        }];

        let (results, diagnostics) = parse_all(tmp.path(), &files, &ParsePoolConfig::default(), |_| {});
        assert_eq!(results.len(), 1);
        assert_eq!(diagnostics.len(), 1);
    }
}
