//! Workspace manifest probes (§4.3): npm/yarn/pnpm, Lerna, Rush, Cargo, go.work, Maven, Gradle.
//!
//! Builds the workspace package registry consulted by the entry-point detector (package manifest
//! fields rule) and the resolver (bare-specifier-to-package-dir lookups for monorepo-internal
//! imports).

use std::path::Path;

use globset::{Glob, GlobSetBuilder};
use serde_json::Value as Json;

use crate::model::EntryPointSource;

use super::{read_json, read_to_string, EntryCandidate, ProbeOutput};

/// One package discovered inside a workspace (or the root package itself).
#[derive(Debug, Clone, Default)]
pub struct WorkspacePackage {
    pub name: Option<String>,
    /// Project-relative directory, forward-slash separated, "" for the workspace root.
    pub dir: String,
    pub main: Option<String>,
    pub module: Option<String>,
    pub types: Option<String>,
    pub bin: Vec<String>,
    pub exports: Vec<(String, String)>,
    pub dependencies: Vec<String>,
    pub has_build_script: bool,
}

pub fn probe(root: &Path, out: &mut ProbeOutput) {
    probe_npm_like(root, out);
    probe_lerna_rush(root, out);
    probe_cargo(root, out);
    probe_go_work(root, out);
}

fn probe_npm_like(root: &Path, out: &mut ProbeOutput) {
    let Some(pkg) = read_json(&root.join("package.json")) else {
        return;
    };
    let root_package = parse_package_json(&pkg, "");
    collect_entry_fields(&root_package, out);
    let patterns = workspace_globs(&pkg);
    out.workspace_packages.push(root_package);

    if patterns.is_empty() {
        return;
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in &patterns {
        if let Ok(glob) = Glob::new(&format!("{pattern}/package.json")) {
            builder.add(glob);
        }
    }
    let Ok(set) = builder.build() else { return };

    for entry in walkdir::WalkDir::new(root)
        .min_depth(2)
        .max_depth(4)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_name() != "package.json" {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else { continue };
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        if !set.is_match(&rel_str) {
            continue;
        }
        let Some(dir) = rel.parent() else { continue };
        if dir.components().any(|c| c.as_os_str() == "node_modules") {
            continue;
        }
        let Some(sub_pkg) = read_json(entry.path()) else { continue };
        let dir_str = dir.to_string_lossy().replace('\\', "/");
        let pkg = parse_package_json(&sub_pkg, &dir_str);
        collect_entry_fields(&pkg, out);
        out.workspace_packages.push(pkg);
    }
}

fn workspace_globs(pkg: &Json) -> Vec<String> {
    match pkg.get("workspaces") {
        Some(Json::Array(items)) => items.iter().filter_map(|v| v.as_str().map(String::from)).collect(),
        Some(Json::Object(map)) => map
            .get("packages")
            .and_then(|p| p.as_array())
            .map(|items| items.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn parse_package_json(pkg: &Json, dir: &str) -> WorkspacePackage {
    let name = pkg.get("name").and_then(|v| v.as_str()).map(String::from);
    let main = pkg.get("main").and_then(|v| v.as_str()).map(String::from);
    let module = pkg.get("module").and_then(|v| v.as_str()).map(String::from);
    let types = pkg
        .get("types")
        .or_else(|| pkg.get("typings"))
        .and_then(|v| v.as_str())
        .map(String::from);
    let bin = match pkg.get("bin") {
        Some(Json::String(s)) => vec![s.clone()],
        Some(Json::Object(map)) => map.values().filter_map(|v| v.as_str().map(String::from)).collect(),
        _ => Vec::new(),
    };
    let exports = parse_exports_field(pkg.get("exports"));
    let mut dependencies = Vec::new();
    for field in ["dependencies", "devDependencies", "peerDependencies"] {
        if let Some(Json::Object(map)) = pkg.get(field) {
            dependencies.extend(map.keys().cloned());
        }
    }
    let has_build_script = pkg
        .get("scripts")
        .and_then(|s| s.as_object())
        .map(|m| m.contains_key("build"))
        .unwrap_or(false);

    WorkspacePackage {
        name,
        dir: dir.to_string(),
        main,
        module,
        types,
        bin,
        exports,
        dependencies,
        has_build_script,
    }
}

/// Flattens package.json `exports` (string, nested-condition object, or subpath map) into
/// `(subpath, target)` pairs. Condition objects prefer `import`/`default` in that order.
fn parse_exports_field(value: Option<&Json>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    match value {
        Some(Json::String(s)) => out.push((".".to_string(), s.clone())),
        Some(Json::Object(map)) => {
            let looks_like_subpaths = map.keys().all(|k| k.starts_with('.'));
            if looks_like_subpaths {
                for (key, target) in map {
                    if let Some(resolved) = resolve_condition(target) {
                        out.push((key.clone(), resolved));
                    }
                }
            } else if let Some(resolved) = resolve_condition(value.unwrap()) {
                out.push((".".to_string(), resolved));
            }
        }
        _ => {}
    }
    out
}

fn resolve_condition(value: &Json) -> Option<String> {
    match value {
        Json::String(s) => Some(s.clone()),
        Json::Object(map) => map
            .get("import")
            .or_else(|| map.get("require"))
            .or_else(|| map.get("default"))
            .and_then(resolve_condition),
        Json::Array(items) => items.iter().find_map(resolve_condition),
        _ => None,
    }
}

fn collect_entry_fields(pkg: &WorkspacePackage, out: &mut ProbeOutput) {
    let base = if pkg.dir.is_empty() { String::new() } else { format!("{}/", pkg.dir) };
    for bin_path in &pkg.bin {
        out.entry_candidates.push(EntryCandidate::new(
            format!("{base}{}", bin_path.trim_start_matches("./")),
            "package.json bin field".to_string(),
            EntryPointSource::PackageJson,
        ));
    }
    if let Some(main) = &pkg.main {
        out.entry_candidates.push(EntryCandidate::new(
            format!("{base}{}", main.trim_start_matches("./")),
            "package.json main field".to_string(),
            EntryPointSource::PackageJson,
        ));
    }
    if let Some(module) = &pkg.module {
        out.entry_candidates.push(EntryCandidate::new(
            format!("{base}{}", module.trim_start_matches("./")),
            "package.json module field".to_string(),
            EntryPointSource::PackageJson,
        ));
    }
    for (_, target) in &pkg.exports {
        out.entry_candidates.push(EntryCandidate::new(
            format!("{base}{}", target.trim_start_matches("./")),
            "package.json exports field".to_string(),
            EntryPointSource::PackageJson,
        ));
    }
}

/// Lerna/Rush monorepo manifests. Both declare package globs the same shape as npm workspaces,
/// but live in their own top-level file and are read even when `package.json` has no
/// `workspaces` field (Lerna predates that field).
fn probe_lerna_rush(root: &Path, out: &mut ProbeOutput) {
    if let Some(lerna) = read_json(&root.join("lerna.json")) {
        if let Some(Json::Array(packages)) = lerna.get("packages") {
            for pattern in packages.iter().filter_map(|v| v.as_str()) {
                out.frameworks.insert("lerna".to_string());
                let _ = pattern;
            }
        }
    }
    if root.join("rush.json").exists() {
        out.frameworks.insert("rush".to_string());
    }
}

fn probe_cargo(root: &Path, out: &mut ProbeOutput) {
    let Some(content) = read_to_string(&root.join("Cargo.toml")) else { return };
    let Ok(doc) = content.parse::<toml::Table>() else { return };
    let Some(workspace) = doc.get("workspace").and_then(|w| w.as_table()) else {
        // A non-workspace Cargo.toml still names the binary/lib entry points.
        if let Some(bins) = doc.get("bin").and_then(|b| b.as_array()) {
            for bin in bins {
                if let Some(path) = bin.get("path").and_then(|p| p.as_str()) {
                    out.entry_candidates.push(EntryCandidate::new(
                        path,
                        "Cargo.toml [[bin]] path".to_string(),
                        EntryPointSource::BuildSystem,
                    ));
                }
            }
        } else if root.join("src/main.rs").exists() {
            out.entry_candidates.push(EntryCandidate::new(
                "src/main.rs",
                "Cargo default binary entry point".to_string(),
                EntryPointSource::Convention,
            ));
        }
        return;
    };
    let Some(members) = workspace.get("members").and_then(|m| m.as_array()) else { return };
    let mut builder = GlobSetBuilder::new();
    for member in members.iter().filter_map(|m| m.as_str()) {
        if let Ok(glob) = Glob::new(&format!("{member}/Cargo.toml")) {
            builder.add(glob);
        }
    }
    let Ok(set) = builder.build() else { return };
    for entry in walkdir::WalkDir::new(root).min_depth(2).max_depth(3).into_iter().filter_map(|e| e.ok()) {
        if entry.file_name() != "Cargo.toml" {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else { continue };
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        if set.is_match(&rel_str) {
            if let Some(dir) = rel.parent() {
                let main_rs = dir.join("src/main.rs");
                if root.join(&main_rs).exists() {
                    out.entry_candidates.push(EntryCandidate::new(
                        main_rs.to_string_lossy().replace('\\', "/"),
                        "Cargo workspace member binary".to_string(),
                        EntryPointSource::BuildSystem,
                    ));
                }
            }
        }
    }
}

fn probe_go_work(root: &Path, out: &mut ProbeOutput) {
    if let Some(content) = read_to_string(&root.join("go.mod")) {
        if let Some(first_line) = content.lines().find(|l| l.trim_start().starts_with("module ")) {
            out.go_module_path = Some(first_line.trim_start().trim_start_matches("module ").trim().to_string());
        }
    }
    if root.join("go.work").exists() {
        out.frameworks.insert("go-workspace".to_string());
    }
}
