//! Reachability walker (§4.6).
//!
//! Breadth-first traversal from the entry-point set, amplified by each language's same-unit
//! visibility rules, followed by the bounded re-export usage fixed-point propagation. Grounded on
//! `analyzer/cycles.rs`'s cycle-safe BFS/visited-set pattern (Tarjan's SCC walk uses the same
//! "queue + visited HashSet, process once" shape) and `analyzer/rust/mod.rs`/`analyzer/py/mod.rs`
//! for the Rust `mod`-declaration and Python `__getattr__` lazy-loader amplification rules.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use globset::{Glob, GlobSetBuilder};
use regex::Regex;

use crate::graph::{resolve_reexport_source, ImportGraph};
use crate::model::{sentinel, EntryPoint, ExportUsageMap, ImportKind, Language};
use crate::probes::ProbeOutput;
use crate::resolver::{FileIndex, ResolverContext};

pub struct WalkResult {
    pub reachable: HashSet<PathBuf>,
    pub usage: ExportUsageMap,
}

pub fn walk(graph: &ImportGraph, entry_points: &[EntryPoint], probes: &ProbeOutput) -> WalkResult {
    let paths: Vec<PathBuf> = graph.paths().cloned().collect();
    let index = FileIndex::build(&paths);

    let mut reachable: HashSet<PathBuf> = HashSet::new();
    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    let mut usage = ExportUsageMap::new();

    for entry in entry_points {
        if reachable.insert(entry.path.clone()) {
            queue.push_back(entry.path.clone());
        }
    }

    while let Some(current) = queue.pop_front() {
        let Some(node) = graph.get(&current) else { continue };
        let language = node.file.language;

        for import in &node.parsed.imports {
            if import.is_glob && import.resolved.is_empty() {
                for matched in glob_matches(&current, &import.module, &paths) {
                    if reachable.insert(matched.clone()) {
                        queue.push_back(matched);
                    }
                }
                continue;
            }

            for target in &import.resolved {
                if reachable.insert(target.clone()) {
                    queue.push_back(target.clone());
                }
                record_import_usage(&mut usage, target, import, &current);
            }

            // Python `from X import Y`: also try X.Y as a submodule resolution.
            if language == Language::Python && matches!(import.kind, ImportKind::From) {
                for symbol in &import.symbols {
                    let combined = format!("{}.{}", import.module.trim_start_matches('.'), symbol.name);
                    let sub_targets = crate::resolver::resolve(
                        &crate::resolver::ResolverContext { index: &index, probes, go_module_path: probes.go_module_path.as_deref() },
                        &current,
                        &combined,
                        ImportKind::Static,
                        language,
                    );
                    for target in sub_targets {
                        if reachable.insert(target.clone()) {
                            queue.push_back(target.clone());
                        }
                        usage.entry_for(target).entry(sentinel::ALL.to_string()).or_default();
                    }
                }
            }
        }

        for export in &node.parsed.exports {
            if !export.is_reexport() {
                continue;
            }
            let Some(source) = &export.source_module else { continue };
            let targets = resolve_reexport_source(&index, probes, &current, source, language);
            for target in targets {
                if reachable.insert(target.clone()) {
                    queue.push_back(target.clone());
                }
                let key = if export.kind == crate::model::ExportKind::ReexportAll {
                    sentinel::ALL.to_string()
                } else {
                    export.name.clone()
                };
                usage.entry_for(target).entry(key).or_default();
            }
        }

        amplify(graph, &index, probes, &current, language, &mut reachable, &mut queue);
    }

    propagate_reexport_usage(graph, &mut usage);

    WalkResult { reachable, usage }
}

fn record_import_usage(usage: &mut ExportUsageMap, target: &Path, import: &crate::model::Import, importer: &Path) {
    if import.symbols.is_empty() {
        let key = match import.kind {
            ImportKind::CommonJs | ImportKind::DynamicImport | ImportKind::RequireContext => sentinel::ALL,
            _ => sentinel::SIDE_EFFECT,
        };
        usage.record(target.to_path_buf(), key, importer.to_path_buf(), import.kind);
        return;
    }
    for symbol in &import.symbols {
        let name = if symbol.is_default { "default".to_string() } else { symbol.name.clone() };
        usage.record(target.to_path_buf(), name, importer.to_path_buf(), import.kind);
    }
    if target.file_name().and_then(|n| n.to_str()) == Some("__init__.py") {
        usage.record(target.to_path_buf(), sentinel::ALL, importer.to_path_buf(), import.kind);
    }
}

fn glob_matches(from_file: &Path, pattern: &str, all_paths: &[PathBuf]) -> Vec<PathBuf> {
    let base_dir = from_file.parent().unwrap_or_else(|| Path::new(""));
    let resolved_pattern = if pattern.starts_with('.') {
        base_dir.join(pattern).to_string_lossy().replace('\\', "/")
    } else {
        pattern.to_string()
    };
    let mut builder = GlobSetBuilder::new();
    let Ok(glob) = Glob::new(&resolved_pattern) else { return Vec::new() };
    builder.add(glob);
    let Ok(set) = builder.build() else { return Vec::new() };
    all_paths
        .iter()
        .filter(|p| set.is_match(p.to_string_lossy().replace('\\', "/")))
        .cloned()
        .collect()
}

/// §4.6 step 3: language-specific amplification. Additive edges beyond the explicit import/
/// re-export graph, reflecting that these language units share visibility within their own
/// compilation boundary regardless of whether one file literally imports another.
fn amplify(
    graph: &ImportGraph,
    index: &FileIndex,
    probes: &ProbeOutput,
    current: &Path,
    language: Language,
    reachable: &mut HashSet<PathBuf>,
    queue: &mut VecDeque<PathBuf>,
) {
    let mut enqueue_all = |paths: Vec<PathBuf>| {
        for path in paths {
            if reachable.insert(path.clone()) {
                queue.push_back(path);
            }
        }
    };

    match language {
        Language::Go => {
            let dir = current.parent();
            let siblings: Vec<PathBuf> = graph
                .nodes
                .iter()
                .filter(|(path, node)| {
                    path.parent() == dir
                        && path.as_path() != current
                        && !node.parsed.metadata.is_test_file
                        && !is_dead_named(path)
                })
                .map(|(path, _)| path.clone())
                .collect();
            enqueue_all(siblings);
        }
        Language::Java | Language::Kotlin => {
            let Some(node) = graph.get(&current.to_path_buf()) else { return };
            let Some(package) = node.parsed.metadata.java_package_name.clone() else { return };
            let siblings: Vec<PathBuf> = graph
                .nodes
                .iter()
                .filter(|(path, n)| {
                    path.as_path() != current
                        && n.parsed.metadata.java_package_name.as_deref() == Some(package.as_str())
                        && !is_dead_named(path)
                })
                .map(|(path, _)| path.clone())
                .collect();
            enqueue_all(siblings);
        }
        Language::CSharp => {
            let Some(node) = graph.get(&current.to_path_buf()) else { return };
            let Some(namespace) = node.parsed.metadata.csharp_namespace.clone() else { return };
            let members: Vec<PathBuf> = graph
                .nodes
                .iter()
                .filter(|(_, n)| n.parsed.metadata.csharp_namespace.as_deref() == Some(namespace.as_str()))
                .map(|(path, _)| path.clone())
                .collect();
            if members.len() >= 2 && members.len() <= 200 {
                enqueue_all(members.into_iter().filter(|p| p.as_path() != current).collect());
            }
        }
        Language::Rust => {
            let Some(node) = graph.get(&current.to_path_buf()) else { return };
            let dir = current.parent().unwrap_or_else(|| Path::new(""));
            let current_stem = current.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            let current_file_name = current.file_name().and_then(|s| s.to_str()).unwrap_or("");
            // Rust 2018: a file that isn't itself a module root (`lib.rs`/`main.rs`/`mod.rs`)
            // may own a sibling directory named after its own stem for its declared submodules.
            let owns_sibling_dir = !node.parsed.metadata.rust_is_lib_or_main && current_file_name != "mod.rs";

            let mut targets = Vec::new();
            for decl in &node.parsed.metadata.rust_mod_declarations {
                let mod_name = decl.name.trim_start_matches("r#");
                if let Some(path_override) = &decl.path_override {
                    let candidate = dir.join(path_override);
                    if graph.get(&candidate).is_some() {
                        targets.push(candidate);
                        continue;
                    }
                }
                let as_file = dir.join(format!("{mod_name}.rs"));
                if graph.get(&as_file).is_some() {
                    targets.push(as_file);
                    continue;
                }
                let as_dir_mod = dir.join(mod_name).join("mod.rs");
                if graph.get(&as_dir_mod).is_some() {
                    targets.push(as_dir_mod);
                    continue;
                }
                if owns_sibling_dir {
                    let sibling_as_file = dir.join(current_stem).join(format!("{mod_name}.rs"));
                    if graph.get(&sibling_as_file).is_some() {
                        targets.push(sibling_as_file);
                        continue;
                    }
                    let sibling_as_dir_mod = dir.join(current_stem).join(mod_name).join("mod.rs");
                    if graph.get(&sibling_as_dir_mod).is_some() {
                        targets.push(sibling_as_dir_mod);
                    }
                }
            }
            enqueue_all(targets);

            if let Some(content) = &node.parsed.content {
                enqueue_all(rust_proc_macro_targets(content, dir, graph));
            }
        }
        Language::Python => {
            let Some(node) = graph.get(&current.to_path_buf()) else { return };
            if node.parsed.metadata.has_getattr_lazy_loader {
                let dir = current.parent();
                let siblings: Vec<PathBuf> = graph
                    .nodes
                    .keys()
                    .filter(|path| {
                        path.parent() == dir
                            && path.as_path() != current
                            && (path.extension().and_then(|e| e.to_str()) == Some("py")
                                || path.file_name().and_then(|n| n.to_str()) == Some("__init__.py"))
                    })
                    .cloned()
                    .collect();
                enqueue_all(siblings);

                if let Some(content) = &node.parsed.content {
                    enqueue_all(python_dotted_targets(content, dotted_module_string_regex(), current, index, probes));
                }
            }

            if let Some(content) = &node.parsed.content {
                enqueue_all(python_dotted_targets(content, import_module_call_regex(), current, index, probes));
            }
        }
        Language::JavaScript => {
            let Some(node) = graph.get(&current.to_path_buf()) else { return };
            let Some(content) = &node.parsed.content else { return };
            if !auto_loader_call_regex().is_match(content) {
                return;
            }
            let dir = current.parent();
            let siblings: Vec<PathBuf> = graph
                .nodes
                .keys()
                .filter(|path| path.parent() == dir && path.as_path() != current)
                .cloned()
                .collect();
            enqueue_all(siblings);
        }
        _ => {}
    }
}

/// §4.6 Rust proc-macro cues that pull in whole directories or single files without a `use`/`mod`
/// edge the parser can see: `automod::dir!`, the `declare_group_from_fs!`/`declare_lint_group!`/
/// `include_dir!`/`auto_mod!` family, `include!`, `include_str!`/`include_bytes!`, and inline
/// nested `mod outer { mod inner; }` blocks.
fn rust_proc_macro_targets(content: &str, dir: &Path, graph: &ImportGraph) -> Vec<PathBuf> {
    let mut targets = Vec::new();

    if let Some(caps) = automod_dir_regex().captures(content) {
        if let Some(sub) = caps.get(1) {
            push_all_rs_in_dir(&dir.join(sub.as_str()), graph, &mut targets);
        }
    }

    for caps in fs_group_macro_regex().captures_iter(content) {
        match caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty()) {
            Some(sub) => push_all_rs_in_dir(&dir.join(sub), graph, &mut targets),
            None => push_all_rs_in_dir(dir, graph, &mut targets),
        }
    }

    for caps in include_macro_regex().captures_iter(content) {
        let Some(path_match) = caps.get(1) else { continue };
        let candidate = dir.join(path_match.as_str());
        if graph.get(&candidate).is_some() {
            targets.push(candidate);
        }
    }

    for caps in include_data_regex().captures_iter(content) {
        let Some(path_match) = caps.get(1) else { continue };
        let candidate = dir.join(path_match.as_str());
        if graph.get(&candidate).is_some() {
            targets.push(candidate);
        }
    }

    for caps in outer_inline_mod_regex().captures_iter(content) {
        let (Some(name_match), Some(whole)) = (caps.get(1), caps.get(0)) else { continue };
        let open_idx = whole.end() - 1;
        let Some(body) = extract_balanced_block(content, open_idx) else { continue };
        let outer_name = name_match.as_str();
        for inner_caps in inner_mod_decl_regex().captures_iter(body) {
            let Some(inner_match) = inner_caps.get(1) else { continue };
            let inner_name = inner_match.as_str();
            let as_file = dir.join(outer_name).join(format!("{inner_name}.rs"));
            if graph.get(&as_file).is_some() {
                targets.push(as_file);
                continue;
            }
            let as_dir_mod = dir.join(outer_name).join(inner_name).join("mod.rs");
            if graph.get(&as_dir_mod).is_some() {
                targets.push(as_dir_mod);
            }
        }
    }

    targets
}

fn push_all_rs_in_dir(dir: &Path, graph: &ImportGraph, targets: &mut Vec<PathBuf>) {
    for path in graph.paths() {
        if path.parent() == Some(dir) && path.extension().and_then(|e| e.to_str()) == Some("rs") {
            targets.push(path.clone());
        }
    }
}

/// Scans from the opening `{` at `open_idx` to its matching close brace, returning the body text
/// (exclusive of both braces).
fn extract_balanced_block(content: &str, open_idx: usize) -> Option<&str> {
    let bytes = content.as_bytes();
    let mut depth = 0i32;
    let mut i = open_idx;
    let start = open_idx + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..i]);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn automod_dir_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"automod::dir!\s*\(\s*"([^"]+)"\s*\)"#).expect("valid regex"))
}

fn fs_group_macro_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:declare_group_from_fs|declare_lint_group|include_dir|auto_mod)!\s*\(\s*"([^"]*)""#)
            .expect("valid regex")
    })
}

fn include_macro_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?m)(?:^|[^_a-zA-Z])include!\s*\(\s*"([^"]+)"\s*\)"#).expect("valid regex"))
}

fn include_data_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:include_str|include_bytes)!\s*\(\s*"([^"]+)"\s*\)"#).expect("valid regex")
    })
}

fn outer_inline_mod_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?mod\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\{"#)
            .expect("valid regex")
    })
}

fn inner_mod_decl_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?mod\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*;"#).expect("valid regex")
    })
}

/// §4.6 Python cues: dotted module strings inside a `__getattr__` lazy loader, and
/// `importlib.import_module("...")` arguments anywhere in the file.
fn dotted_module_string_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"["']([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)+)["']"#).expect("valid regex")
    })
}

fn import_module_call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"importlib\.import_module\(\s*["']([^"']+)["']"#).expect("valid regex"))
}

fn python_dotted_targets(
    content: &str,
    regex: &Regex,
    current: &Path,
    index: &FileIndex,
    probes: &ProbeOutput,
) -> Vec<PathBuf> {
    let ctx = ResolverContext { index, probes, go_module_path: probes.go_module_path.as_deref() };
    let mut targets = Vec::new();
    for caps in regex.captures_iter(content) {
        let Some(m) = caps.get(1) else { continue };
        targets.extend(crate::resolver::resolve(&ctx, current, m.as_str(), ImportKind::Static, Language::Python));
    }
    targets
}

/// §4.6: JS/TS directory-scanning auto-loaders (`requireDirectory(__dirname)`,
/// `readdirSync(__dirname)`) enqueue every sibling file without going through an import the
/// parser can tag as a glob.
fn auto_loader_call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\b(?:requireDirectory|readdirSync)\s*\(\s*__dirname\b"#).expect("valid regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FileNode, ImportGraph};
    use crate::model::{EntryPoint, EntryPointSource, File, Language, ParseResult, RustModDecl};
    use std::collections::HashMap;

    fn rust_node(path: &str, content: &str, mods: Vec<RustModDecl>, is_lib_or_main: bool) -> (PathBuf, FileNode) {
        let path_buf = PathBuf::from(path);
        let mut parsed = ParseResult::empty();
        parsed.content = Some(content.to_string());
        parsed.metadata.rust_mod_declarations = mods;
        parsed.metadata.rust_is_lib_or_main = is_lib_or_main;
        let file = File { path: path_buf.clone(), size: content.len() as u64, lines: 1, language: Language::Rust, mtime: None };
        (path_buf, FileNode { file, parsed })
    }

    fn py_node(path: &str, content: &str, has_getattr: bool) -> (PathBuf, FileNode) {
        let path_buf = PathBuf::from(path);
        let mut parsed = ParseResult::empty();
        parsed.content = Some(content.to_string());
        parsed.metadata.has_getattr_lazy_loader = has_getattr;
        let file = File { path: path_buf.clone(), size: content.len() as u64, lines: 1, language: Language::Python, mtime: None };
        (path_buf, FileNode { file, parsed })
    }

    fn js_node(path: &str, content: &str) -> (PathBuf, FileNode) {
        let path_buf = PathBuf::from(path);
        let mut parsed = ParseResult::empty();
        parsed.content = Some(content.to_string());
        let file = File { path: path_buf.clone(), size: content.len() as u64, lines: 1, language: Language::JavaScript, mtime: None };
        (path_buf, FileNode { file, parsed })
    }

    fn entry(path: &str) -> EntryPoint {
        EntryPoint {
            path: PathBuf::from(path),
            reason: "test".to_string(),
            source: EntryPointSource::Convention,
            is_dynamic: false,
            confidence: 1.0,
        }
    }

    #[test]
    fn classify_sees_amplified_files_as_reachable() {
        let mut nodes = HashMap::new();
        let (main_path, main_node) = rust_node("src/lib.rs", "mod helper;\n", vec![RustModDecl { name: "helper".to_string(), path_override: None }], true);
        let (helper_path, helper_node) = rust_node("src/helper.rs", "pub fn run() {}\n", vec![], false);
        nodes.insert(main_path.clone(), main_node);
        nodes.insert(helper_path.clone(), helper_node);
        let graph = ImportGraph { nodes };

        let result = walk(&graph, &[entry("src/lib.rs")], &ProbeOutput::default());
        assert!(result.reachable.contains(&helper_path));
        assert!(!result.usage.has_any(&helper_path));
    }

    #[test]
    fn rust_sibling_directory_convention_resolves_mod() {
        let mut nodes = HashMap::new();
        let (main_path, main_node) = rust_node(
            "src/feature.rs",
            "mod sub;\n",
            vec![RustModDecl { name: "sub".to_string(), path_override: None }],
            false,
        );
        let (sub_path, sub_node) = rust_node("src/feature/sub.rs", "pub fn run() {}\n", vec![], false);
        nodes.insert(main_path.clone(), main_node);
        nodes.insert(sub_path.clone(), sub_node);
        let graph = ImportGraph { nodes };

        let result = walk(&graph, &[entry("src/feature.rs")], &ProbeOutput::default());
        assert!(result.reachable.contains(&sub_path));
    }

    #[test]
    fn automod_dir_pulls_in_whole_directory() {
        let mut nodes = HashMap::new();
        let (main_path, main_node) = rust_node("src/lib.rs", "automod::dir!(\"commands\");\n", vec![], true);
        let (cmd_path, cmd_node) = rust_node("src/commands/ping.rs", "pub fn run() {}\n", vec![], false);
        nodes.insert(main_path.clone(), main_node);
        nodes.insert(cmd_path.clone(), cmd_node);
        let graph = ImportGraph { nodes };

        let result = walk(&graph, &[entry("src/lib.rs")], &ProbeOutput::default());
        assert!(result.reachable.contains(&cmd_path));
    }

    #[test]
    fn include_macro_resolves_relative_path() {
        let mut nodes = HashMap::new();
        let (main_path, main_node) = rust_node("src/lib.rs", "include!(\"generated.rs\");\n", vec![], true);
        let (inc_path, inc_node) = rust_node("src/generated.rs", "pub fn run() {}\n", vec![], false);
        nodes.insert(main_path.clone(), main_node);
        nodes.insert(inc_path.clone(), inc_node);
        let graph = ImportGraph { nodes };

        let result = walk(&graph, &[entry("src/lib.rs")], &ProbeOutput::default());
        assert!(result.reachable.contains(&inc_path));
    }

    #[test]
    fn inline_nested_mod_block_resolves_inner_declaration() {
        let mut nodes = HashMap::new();
        let (main_path, main_node) = rust_node("src/lib.rs", "mod outer {\n    mod inner;\n}\n", vec![], true);
        let (inner_path, inner_node) = rust_node("src/outer/inner.rs", "pub fn run() {}\n", vec![], false);
        nodes.insert(main_path.clone(), main_node);
        nodes.insert(inner_path.clone(), inner_node);
        let graph = ImportGraph { nodes };

        let result = walk(&graph, &[entry("src/lib.rs")], &ProbeOutput::default());
        assert!(result.reachable.contains(&inner_path));
    }

    #[test]
    fn getattr_loader_resolves_dotted_string_targets() {
        let mut nodes = HashMap::new();
        let (loader_path, loader_node) =
            py_node("pkg/__init__.py", "_MODULES = {\"widget\": \"pkg.widgets.widget\"}\n\ndef __getattr__(name):\n    pass\n", true);
        let (widget_path, widget_node) = py_node("pkg/widgets/widget.py", "def run():\n    pass\n", false);
        nodes.insert(loader_path.clone(), loader_node);
        nodes.insert(widget_path.clone(), widget_node);
        let graph = ImportGraph { nodes };

        let result = walk(&graph, &[entry("pkg/__init__.py")], &ProbeOutput::default());
        assert!(result.reachable.contains(&widget_path));
    }

    #[test]
    fn importlib_import_module_resolves_regardless_of_getattr_loader() {
        let mut nodes = HashMap::new();
        let (main_path, main_node) =
            py_node("pkg/loader.py", "import importlib\nmod = importlib.import_module(\"pkg.plugins.plugin\")\n", false);
        let (plugin_path, plugin_node) = py_node("pkg/plugins/plugin.py", "def run():\n    pass\n", false);
        nodes.insert(main_path.clone(), main_node);
        nodes.insert(plugin_path.clone(), plugin_node);
        let graph = ImportGraph { nodes };

        let result = walk(&graph, &[entry("pkg/loader.py")], &ProbeOutput::default());
        assert!(result.reachable.contains(&plugin_path));
    }

    #[test]
    fn js_directory_scanning_auto_loader_enqueues_siblings() {
        let mut nodes = HashMap::new();
        let (main_path, main_node) =
            js_node("src/plugins/index.js", "const fs = require('fs');\nfs.readdirSync(__dirname).forEach(() => {});\n");
        let (plugin_path, plugin_node) = js_node("src/plugins/foo.js", "module.exports = () => {};\n");
        nodes.insert(main_path.clone(), main_node);
        nodes.insert(plugin_path.clone(), plugin_node);
        let graph = ImportGraph { nodes };

        let result = walk(&graph, &[entry("src/plugins/index.js")], &ProbeOutput::default());
        assert!(result.reachable.contains(&plugin_path));
    }
}

fn is_dead_named(path: &Path) -> bool {
    let normalized = path.to_string_lossy().replace('\\', "/");
    normalized.contains("/dead-")
        || normalized.contains("/dead_")
        || normalized.contains("/deprecated-")
        || normalized.contains("/deprecated_")
        || normalized.contains("/legacy-")
        || normalized.contains("/legacy_")
        || normalized.contains("/old-")
        || normalized.contains("/old_")
        || normalized.contains("/unused-")
        || normalized.contains("/unused_")
}

/// §4.6: barrel-file transparency. Up to 5 passes re-attribute usage recorded against a
/// re-exporting file to the file it re-exports from, so `export { X } from './source'` doesn't
/// mask `source.ts`'s own export as dead just because consumers import through the barrel.
fn propagate_reexport_usage(graph: &ImportGraph, usage: &mut ExportUsageMap) {
    for _ in 0..5 {
        let mut changed = false;
        let snapshot: Vec<(PathBuf, std::collections::HashMap<String, Vec<crate::model::UsageRecord>>)> = graph
            .nodes
            .keys()
            .filter_map(|path| usage.symbols_for(path).map(|m| (path.clone(), m.clone())))
            .collect();

        for (barrel_path, symbols) in &snapshot {
            let Some(node) = graph.get(barrel_path) else { continue };
            let own_export_names: HashSet<&str> = node
                .parsed
                .exports
                .iter()
                .filter(|e| !e.is_reexport())
                .map(|e| e.name.as_str())
                .collect();

            for export in node.parsed.exports.iter().filter(|e| e.is_reexport()) {
                let Some(source_module) = &export.source_module else { continue };
                let targets = resolve_reexport_source(
                    &FileIndex::build(&graph.paths().cloned().collect::<Vec<_>>()),
                    &ProbeOutput::default(),
                    barrel_path,
                    source_module,
                    node.file.language,
                );
                for target in targets {
                    for (symbol_name, records) in symbols {
                        let applies = if export.kind == crate::model::ExportKind::ReexportAll {
                            !own_export_names.contains(symbol_name.as_str())
                        } else {
                            symbol_name == &export.name || symbol_name == sentinel::ALL
                        };
                        if !applies {
                            continue;
                        }
                        let before = usage.consumers_of(&target, symbol_name).map(|v| v.len()).unwrap_or(0);
                        for record in records {
                            usage.record(target.clone(), symbol_name.clone(), record.importer.clone(), record.import_kind);
                        }
                        let after = usage.consumers_of(&target, symbol_name).map(|v| v.len()).unwrap_or(0);
                        if after != before {
                            changed = true;
                        }
                    }
                }
            }
        }

        if !changed {
            break;
        }
    }
}
