//! Top-level scan orchestrator (§6).
//!
//! Wires every pipeline stage together in the order §3 describes: discovery, parsing, config
//! probing, entry-point detection, import-graph construction, reachability walking, and dead
//! classification. This is the single entry point the CLI (and any future embedder) calls.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify;
use crate::config::DeadwoodConfig;
use crate::discovery::{self, DiscoveryOptions};
use crate::entrypoints::{self, EntrypointConfig};
use crate::error::ScanError;
use crate::graph;
use crate::model::{Diagnostic, File, ScanResult, ScanSummary};
use crate::parse_pool::{self, ParsePoolConfig};
use crate::probes;
use crate::progress::{Phase, Progress};
use crate::reachability;

/// Run a full scan of `root` using `config`, reporting progress through `on_progress`.
pub fn scan_root(
    root: &Path,
    config: &DeadwoodConfig,
    mut on_progress: impl FnMut(Progress),
) -> Result<ScanResult, ScanError> {
    let start = Instant::now();

    if !root.is_dir() {
        return Err(ScanError::InvalidRoot(root.to_path_buf()));
    }

    on_progress(Progress::new(Phase::Discovery, "discovering files"));
    let discovery_opts = DiscoveryOptions { extra_excludes: config.exclude.clone(), ..Default::default() };
    let all_files = discovery::gather_files(root, &discovery_opts)
        .map_err(|e| ScanError::read_failed(root.to_path_buf(), e))?;

    let (files, excluded_generated) = split_generated(all_files, config);
    let total_files = files.len();

    on_progress(Progress::new(Phase::Parsing, "parsing files"));
    let pool_config = ParsePoolConfig { workers: config.workers.unwrap_or_else(default_workers) };
    let (parsed, mut diagnostics) = parse_pool::parse_all(root, &files, &pool_config, &mut on_progress);

    on_progress(Progress::new(Phase::ConfigProbing, "probing build/bundler/CI config"));
    let probe_output = probes::run_probes(root);

    on_progress(Progress::new(Phase::EntryDetection, "detecting entry points"));
    let mut dynamic_package_fields = EntrypointConfig::default().dynamic_package_fields;
    for field in &config.dynamic_package_fields {
        if !dynamic_package_fields.contains(field) {
            dynamic_package_fields.push(field.clone());
        }
    }
    let entry_cfg = EntrypointConfig {
        dynamic_patterns: config.dynamic_patterns.clone(),
        dynamic_package_fields,
        extra_di_decorators: config.di_decorators.clone(),
    };
    let file_paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
    let entry_points = entrypoints::detect_entry_points(&file_paths, &parsed, &probe_output, &entry_cfg);

    on_progress(Progress::new(Phase::Resolving, "resolving imports"));
    let import_graph = graph::build(files, parsed, &probe_output);

    on_progress(Progress::new(Phase::ReachabilityWalk, "walking reachability graph"));
    let walk_result = reachability::walk(&import_graph, &entry_points, &probe_output);

    on_progress(Progress::new(Phase::Classification, "classifying dead files"));
    let classify_result = classify::classify(
        &import_graph,
        &entry_points,
        &walk_result.reachable,
        &walk_result.usage,
        root,
        &config.cost_model,
    );

    on_progress(Progress::new(Phase::GitHistory, "enriching git history"));

    let skipped_dynamic: Vec<PathBuf> =
        entry_points.iter().filter(|e| e.is_dynamic).map(|e| e.path.clone()).collect();

    let mut languages: HashMap<String, usize> = HashMap::new();
    for path in import_graph.paths() {
        if let Some(node) = import_graph.get(path) {
            *languages.entry(node.file.language.as_str().to_string()).or_default() += 1;
        }
    }

    let total_dead_bytes: u64 = classify_result.dead_files.iter().map(|d| d.size).sum();
    let dead_rate = if total_files == 0 {
        "0.00%".to_string()
    } else {
        format!("{:.2}%", (classify_result.dead_files.len() as f64 / total_files as f64) * 100.0)
    };

    let summary = ScanSummary {
        total_files,
        entry_points: entry_points.len(),
        reachable_files: walk_result.reachable.len(),
        dead_files: classify_result.dead_files.len(),
        partial_files: classify_result.partial_files.len(),
        dead_rate,
        total_dead_bytes,
        languages,
    };

    diagnostics.extend(discovery_diagnostics(&excluded_generated));

    on_progress(Progress::new(Phase::Done, "scan complete"));

    Ok(ScanResult {
        dead_files: classify_result.dead_files,
        partial_files: classify_result.partial_files,
        entry_points,
        summary,
        skipped_dynamic,
        excluded_generated,
        diagnostics,
        elapsed_seconds: start.elapsed().as_secs_f64(),
    })
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1).min(8)
}

static DEFAULT_GENERATED_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["\\.generated\\.", "_pb2\\.py$", "\\.pb\\.go$"]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

/// Split discovered files into (kept, excluded-as-generated) per `config.exclude_generated` and
/// `config.generated_patterns` (§6 Input, §4.7's "excludedGenerated" auditing list).
fn split_generated(files: Vec<File>, config: &DeadwoodConfig) -> (Vec<File>, Vec<PathBuf>) {
    if !config.exclude_generated {
        return (files, Vec::new());
    }

    let custom_patterns: Vec<Regex> =
        config.generated_patterns.iter().filter_map(|p| Regex::new(p).ok()).collect();

    let mut kept = Vec::with_capacity(files.len());
    let mut excluded = Vec::new();
    for file in files {
        let path_str = file.path.to_string_lossy();
        let is_generated = DEFAULT_GENERATED_PATTERNS.iter().any(|re| re.is_match(&path_str))
            || custom_patterns.iter().any(|re| re.is_match(&path_str));
        if is_generated {
            excluded.push(file.path);
        } else {
            kept.push(file);
        }
    }
    (kept, excluded)
}

fn discovery_diagnostics(excluded_generated: &[PathBuf]) -> Vec<Diagnostic> {
    excluded_generated
        .iter()
        .map(|path| Diagnostic { path: path.clone(), message: "excluded: matched a generated-file pattern".to_string() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_root_is_fatal() {
        let config = DeadwoodConfig::default();
        let result = scan_root(Path::new("/definitely/not/a/real/path"), &config, |_| {});
        assert!(matches!(result, Err(ScanError::InvalidRoot(_))));
    }

    #[test]
    fn scans_tiny_project_tree() {
        let tmp = tempfile::tempdir().expect("tmp dir");
        std::fs::write(
            tmp.path().join("main.ts"),
            "import { helper } from './lib';\nhelper();\n",
        )
        .unwrap();
        std::fs::write(tmp.path().join("lib.ts"), "export function helper() {}\n").unwrap();
        std::fs::write(tmp.path().join("orphan.ts"), "export function unused() {}\n").unwrap();

        let config = DeadwoodConfig::default();
        let result = scan_root(tmp.path(), &config, |_| {}).expect("scan succeeds");
        assert!(result.summary.total_files >= 3);
        assert!(result.dead_files.iter().any(|d| d.path == PathBuf::from("orphan.ts")));
    }
}
