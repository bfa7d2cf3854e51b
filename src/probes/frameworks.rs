//! Framework convention probes (§4.3): Next.js, Cypress/Jest, Nx, Angular.
//!
//! These frameworks define file-based routing or test discovery conventions where a file's mere
//! location marks it reachable -- no import ever points at `pages/about.tsx`, the framework's
//! router does.

use std::path::Path;

use serde_json::Value as Json;

use crate::model::EntryPointSource;

use super::{read_json, read_to_string, EntryCandidate, ProbeOutput};

pub fn probe(root: &Path, out: &mut ProbeOutput) {
    probe_nextjs(root, out);
    probe_test_runners(root, out);
    probe_nx(root, out);
    probe_angular(root, out);
}

/// Next.js' `pages/` and `app/` directories are route conventions: every file under them
/// (outside `_app`/`_document`/`layout` boilerplate exclusions the entry-point detector already
/// special-cases) is a page or API route the framework mounts automatically.
fn probe_nextjs(root: &Path, out: &mut ProbeOutput) {
    let has_next_config = ["next.config.js", "next.config.mjs", "next.config.ts"]
        .iter()
        .any(|n| root.join(n).exists());
    if !has_next_config {
        return;
    }
    out.frameworks.insert("nextjs".to_string());
    for dir in ["pages", "src/pages", "app", "src/app"] {
        let full = root.join(dir);
        if !full.is_dir() {
            continue;
        }
        for entry in walkdir::WalkDir::new(&full).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let ext_ok = matches!(
                entry.path().extension().and_then(|e| e.to_str()),
                Some("js") | Some("jsx") | Some("ts") | Some("tsx")
            );
            if !ext_ok {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(root) else { continue };
            out.entry_candidates.push(EntryCandidate::new(
                rel.to_string_lossy().replace('\\', "/"),
                "Next.js file-based route".to_string(),
                EntryPointSource::Convention,
            ));
        }
    }
}

fn probe_test_runners(root: &Path, out: &mut ProbeOutput) {
    for name in ["cypress.config.js", "cypress.config.ts", "cypress.json"] {
        if root.join(name).exists() {
            out.frameworks.insert("cypress".to_string());
        }
    }
    for name in ["jest.config.js", "jest.config.ts", "jest.config.mjs"] {
        if root.join(name).exists() {
            out.frameworks.insert("jest".to_string());
        }
    }
    if let Some(pkg) = read_json(&root.join("package.json")) {
        if pkg.get("jest").is_some() {
            out.frameworks.insert("jest".to_string());
        }
    }
}

fn probe_nx(root: &Path, out: &mut ProbeOutput) {
    let has_nx = root.join("nx.json").exists() || root.join("workspace.json").exists();
    if !has_nx {
        return;
    }
    out.frameworks.insert("nx".to_string());
    let Some(workspace) = read_json(&root.join("workspace.json")).or_else(|| read_json(&root.join("angular.json")))
    else {
        return;
    };
    if let Some(Json::Object(projects)) = workspace.get("projects") {
        for project in projects.values() {
            if let Some(root_path) = project.get("root").and_then(|v| v.as_str()) {
                collect_project_entry(root, root_path, "Nx project root", out);
            }
        }
    }
}

fn probe_angular(root: &Path, out: &mut ProbeOutput) {
    let Some(workspace) = read_json(&root.join("angular.json")) else { return };
    out.frameworks.insert("angular".to_string());
    let Some(Json::Object(projects)) = workspace.get("projects") else { return };
    for project in projects.values() {
        let Some(Json::Object(architect)) = project.get("architect") else { continue };
        let Some(build) = architect.get("build") else { continue };
        if let Some(main) = build.pointer("/options/main").and_then(|v| v.as_str()) {
            out.entry_candidates.push(EntryCandidate::new(
                main.to_string(),
                "Angular build target main".to_string(),
                EntryPointSource::BuildSystem,
            ));
        }
    }
}

fn collect_project_entry(root: &Path, project_root: &str, reason: &str, out: &mut ProbeOutput) {
    let Some(content) = read_to_string(&root.join(project_root).join("package.json")) else { return };
    let Ok(pkg) = serde_json::from_str::<Json>(&content) else { return };
    if let Some(main) = pkg.get("main").and_then(|v| v.as_str()) {
        out.entry_candidates.push(EntryCandidate::new(
            format!("{project_root}/{}", main.trim_start_matches("./")),
            reason.to_string(),
            EntryPointSource::BuildSystem,
        ));
    }
}
