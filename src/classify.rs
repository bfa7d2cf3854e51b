//! Dead-file classifier (§4.7).
//!
//! Partitions the graph produced by [`crate::reachability::walk`] into fully-dead and
//! partially-dead records, enriches fully-dead entries with git history and cost-impact
//! estimates, and produces the `verifyFirst` grep command surfaced to the user before deletion.
//! Grounded on `analyzer/dead_parrots/mod.rs`'s `ShadowExport`/`ShadowExportFile` output shapes
//! and its dead-export sort order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::CostModelConfig;
use crate::git_history::GitRepo;
use crate::graph::ImportGraph;
use crate::model::{sentinel, DeadFile, EntryPoint, ExportUsageMap, Language, PartialFile};

const PRESERVE_MARKERS: &[&str] = &["DO NOT DELETE", "DO NOT REMOVE", "KEEP THIS FILE", "@preserve"];
const PRESERVE_SCAN_BYTES: usize = 2000;
const GIT_HISTORY_CAP: usize = 200;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub struct ClassifyResult {
    pub dead_files: Vec<DeadFile>,
    pub partial_files: Vec<PartialFile>,
}

pub fn classify(
    graph: &ImportGraph,
    entry_points: &[EntryPoint],
    reachable_set: &HashSet<PathBuf>,
    usage: &ExportUsageMap,
    root: &Path,
    cost_model: &CostModelConfig,
) -> ClassifyResult {
    let entry_paths: std::collections::HashSet<_> = entry_points.iter().map(|e| e.path.clone()).collect();

    let mut dead_files: Vec<DeadFile> = Vec::new();
    let mut partial_files: Vec<PartialFile> = Vec::new();

    for (path, node) in &graph.nodes {
        // Manifests, lockfiles and other non-source files participate in the graph only as
        // import targets (or not at all); they are never themselves subject to dead/partial
        // reporting, since "dead code" is meaningless for a file that carries no code.
        if node.file.language == Language::Other {
            continue;
        }

        // Reachability is decided by the walker's visited set, not by `usage`: files pulled in
        // only through language amplification (Go/Java/C# same-unit siblings, Rust `mod`
        // targets, Python lazy-loader siblings) or a glob import are enqueued without ever
        // gaining a usage-map entry (§4.6 amplification records no consumer), so `usage` alone
        // would misclassify them as fully dead.
        let reachable = reachable_set.contains(path) || entry_paths.contains(path);
        if !reachable {
            if is_preserved(&node.parsed.content) {
                continue;
            }
            dead_files.push(build_dead_file(path, node));
        } else if let Some(partial) = build_partial_file(path, node, usage) {
            partial_files.push(partial);
        }
    }

    dead_files.sort_by(|a, b| b.size.cmp(&a.size));
    partial_files.sort_by(|a, b| b.dead_exports.len().cmp(&a.dead_exports.len()));

    enrich_git_history(&mut dead_files, root);
    enrich_cost_impact(&mut dead_files, cost_model);
    for dead in &mut dead_files {
        dead.verify_first_command = verify_first_command(&dead.path);
    }

    ClassifyResult { dead_files, partial_files }
}

fn is_preserved(content: &Option<String>) -> bool {
    let Some(content) = content else { return false };
    let head = &content[..content.len().min(PRESERVE_SCAN_BYTES)];
    PRESERVE_MARKERS.iter().any(|marker| head.contains(marker))
}

fn build_dead_file(path: &Path, node: &crate::graph::FileNode) -> DeadFile {
    let exports = node.parsed.exports.iter().map(|e| e.name.clone()).collect();
    DeadFile {
        path: path.to_path_buf(),
        language: node.file.language,
        size: node.file.size,
        lines: node.file.lines,
        exports,
        last_modified_author: None,
        last_modified_date: None,
        created_date: None,
        days_since_modified: None,
        git_available: false,
        git_unavailable_reason: None,
        estimated_monthly_bandwidth_cost_usd: None,
        estimated_monthly_co2_kg: None,
        verify_first_command: String::new(),
    }
}

/// §4.7(b): a file is partially dead when it has exports, at least one is dead and at least one
/// is live, it isn't globally consumed via `__ALL__`/`*`, and it isn't purely side-effect-imported.
fn build_partial_file(
    path: &Path,
    node: &crate::graph::FileNode,
    usage: &ExportUsageMap,
) -> Option<PartialFile> {
    let own_exports: Vec<&crate::model::Export> =
        node.parsed.exports.iter().filter(|e| !e.is_reexport()).collect();
    if own_exports.is_empty() {
        return None;
    }

    let path_buf = path.to_path_buf();
    if usage.has_sentinel(&path_buf, sentinel::ALL) || usage.has_sentinel(&path_buf, sentinel::STAR) {
        return None;
    }
    if usage.has_sentinel(&path_buf, sentinel::SIDE_EFFECT) && !usage.has_any(&path_buf) {
        return None;
    }

    let mut live = Vec::new();
    let mut dead = Vec::new();
    for export in &own_exports {
        let consumed = usage
            .consumers_of(&path_buf, &export.name)
            .map(|records| !records.is_empty())
            .unwrap_or(false);
        if consumed {
            live.push(export.name.clone());
        } else {
            dead.push(export.name.clone());
        }
    }

    if dead.is_empty() || live.is_empty() {
        return None;
    }

    Some(PartialFile {
        path: path_buf,
        language: node.file.language,
        size: node.file.size,
        lines: node.file.lines,
        live_exports: live,
        dead_exports: dead,
    })
}

/// History is capped at the first 200 dead files sorted by size (§4.7, §9) — `dead_files` is
/// already sorted that way by the caller.
fn enrich_git_history(dead_files: &mut [DeadFile], root: &Path) {
    let repo = match GitRepo::discover(root) {
        Ok(repo) => repo,
        Err(e) => {
            for dead in dead_files.iter_mut() {
                dead.git_available = false;
                dead.git_unavailable_reason = Some(e.to_string());
            }
            return;
        }
    };

    for dead in dead_files.iter_mut().take(GIT_HISTORY_CAP) {
        crate::git_history::enrich(&repo, dead);
    }
}

fn enrich_cost_impact(dead_files: &mut [DeadFile], cost_model: &CostModelConfig) {
    if cost_model.monthly_page_views <= 0.0 {
        return;
    }
    for dead in dead_files.iter_mut() {
        let gb_per_month = (dead.size as f64 * cost_model.monthly_page_views) / BYTES_PER_GB;
        dead.estimated_monthly_bandwidth_cost_usd = Some(gb_per_month * cost_model.usd_per_gb);
        dead.estimated_monthly_co2_kg = Some(gb_per_month * cost_model.co2_kg_per_gb);
    }
}

fn verify_first_command(path: &Path) -> String {
    let display = path.to_string_lossy().replace('\\', "/");
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(&display);
    format!("rg --type-add 'src:*.{{ts,tsx,js,jsx,py,go,rs,java,kt,cs}}' -t src \"{stem}\" --glob '!{display}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CostModelConfig;
    use crate::graph::FileNode;
    use crate::model::{Export, ExportKind, File, Language, ParseResult};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn file_node(path: &str, exports: Vec<Export>, content: Option<&str>) -> (PathBuf, FileNode) {
        let path_buf = PathBuf::from(path);
        let mut parsed = ParseResult::empty();
        parsed.exports = exports;
        parsed.content = content.map(|s| s.to_string());
        let file = File { path: path_buf.clone(), size: 100, lines: 10, language: Language::JavaScript, mtime: None };
        (path_buf, FileNode { file, parsed })
    }

    #[test]
    fn unreachable_file_is_fully_dead() {
        let mut nodes = HashMap::new();
        let (path, node) = file_node("src/orphan.ts", vec![Export::new("run", ExportKind::Function, 1)], None);
        nodes.insert(path.clone(), node);
        let graph = ImportGraph { nodes };
        let usage = ExportUsageMap::new();
        let reachable = HashSet::new();
        let result =
            classify(&graph, &[], &reachable, &usage, Path::new("/tmp/nonexistent-repo"), &CostModelConfig::default());
        assert_eq!(result.dead_files.len(), 1);
        assert_eq!(result.dead_files[0].path, path);
    }

    #[test]
    fn preserved_marker_skips_file() {
        let mut nodes = HashMap::new();
        let (path, node) = file_node(
            "src/orphan.ts",
            vec![Export::new("run", ExportKind::Function, 1)],
            Some("// DO NOT DELETE: kept for legacy API\nexport function run() {}"),
        );
        nodes.insert(path, node);
        let graph = ImportGraph { nodes };
        let usage = ExportUsageMap::new();
        let reachable = HashSet::new();
        let result =
            classify(&graph, &[], &reachable, &usage, Path::new("/tmp/nonexistent-repo"), &CostModelConfig::default());
        assert!(result.dead_files.is_empty());
    }

    #[test]
    fn mixed_usage_is_partially_dead() {
        let mut nodes = HashMap::new();
        let (path, node) = file_node(
            "src/util.ts",
            vec![Export::new("used", ExportKind::Function, 1), Export::new("unused", ExportKind::Function, 2)],
            None,
        );
        nodes.insert(path.clone(), node);
        let graph = ImportGraph { nodes };
        let mut usage = ExportUsageMap::new();
        usage.record(path.clone(), "used", PathBuf::from("src/main.ts"), crate::model::ImportKind::Esm);
        let reachable: HashSet<PathBuf> = [path.clone()].into_iter().collect();
        let result =
            classify(&graph, &[], &reachable, &usage, Path::new("/tmp/nonexistent-repo"), &CostModelConfig::default());
        assert_eq!(result.partial_files.len(), 1);
        assert_eq!(result.partial_files[0].dead_exports, vec!["unused".to_string()]);
    }

    #[test]
    fn all_sentinel_suppresses_partial_report() {
        let mut nodes = HashMap::new();
        let (path, node) = file_node(
            "src/util.ts",
            vec![Export::new("used", ExportKind::Function, 1), Export::new("unused", ExportKind::Function, 2)],
            None,
        );
        nodes.insert(path.clone(), node);
        let graph = ImportGraph { nodes };
        let mut usage = ExportUsageMap::new();
        usage.record(path.clone(), sentinel::ALL, PathBuf::from("src/main.ts"), crate::model::ImportKind::CommonJs);
        let reachable: HashSet<PathBuf> = [path.clone()].into_iter().collect();
        let result =
            classify(&graph, &[], &reachable, &usage, Path::new("/tmp/nonexistent-repo"), &CostModelConfig::default());
        assert!(result.partial_files.is_empty());
        assert!(result.dead_files.is_empty());
    }
}
