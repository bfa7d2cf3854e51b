//! CI and container config probes (§4.3): GitHub Actions, GitLab CI, Jenkins, Dockerfiles/compose,
//! and the Serverless Framework.
//!
//! CI manifests name scripts and entry files that run only in a pipeline context -- a lint script
//! invoked exclusively from `.github/workflows/*.yml` looks dead from a pure import-graph view but
//! is very much alive. This probe extracts the handful of shapes that reliably reference a
//! project-relative path.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as Json;

use crate::model::EntryPointSource;

use super::{read_json, read_to_string, EntryCandidate, ProbeOutput};

static RUN_SCRIPT_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:python3?|node|ruby|bash|sh)\s+([./][\w./-]+\.\w+)"#).unwrap()
});
static DOCKER_COPY_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*(?:ENTRYPOINT|CMD)\s+.*?["']([\w./-]+\.\w+)["']"#).unwrap());

pub fn probe(root: &Path, out: &mut ProbeOutput) {
    probe_github_actions(root, out);
    probe_gitlab_ci(root, out);
    probe_jenkins(root, out);
    probe_docker(root, out);
    probe_serverless(root, out);
}

fn probe_github_actions(root: &Path, out: &mut ProbeOutput) {
    let workflows_dir = root.join(".github/workflows");
    if !workflows_dir.is_dir() {
        return;
    }
    out.frameworks.insert("github-actions".to_string());
    let Ok(entries) = std::fs::read_dir(&workflows_dir) else { return };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !matches!(path.extension().and_then(|e| e.to_str()), Some("yml") | Some("yaml")) {
            continue;
        }
        let Some(content) = read_to_string(&path) else { continue };
        extract_run_paths(&content, "GitHub Actions workflow", out);
    }
}

fn probe_gitlab_ci(root: &Path, out: &mut ProbeOutput) {
    let path = root.join(".gitlab-ci.yml");
    let Some(content) = read_to_string(&path) else { return };
    out.frameworks.insert("gitlab-ci".to_string());
    extract_run_paths(&content, "GitLab CI pipeline", out);
}

fn probe_jenkins(root: &Path, out: &mut ProbeOutput) {
    let path = root.join("Jenkinsfile");
    let Some(content) = read_to_string(&path) else { return };
    out.frameworks.insert("jenkins".to_string());
    extract_run_paths(&content, "Jenkinsfile", out);
}

fn extract_run_paths(content: &str, reason: &str, out: &mut ProbeOutput) {
    for cap in RUN_SCRIPT_PATH.captures_iter(content) {
        out.entry_candidates.push(EntryCandidate::new(
            cap[1].trim_start_matches("./").to_string(),
            reason.to_string(),
            EntryPointSource::CiConfig,
        ));
    }
}

fn probe_docker(root: &Path, out: &mut ProbeOutput) {
    for name in ["Dockerfile", "Dockerfile.prod", "Dockerfile.dev"] {
        let Some(content) = read_to_string(&root.join(name)) else { continue };
        out.frameworks.insert("docker".to_string());
        for cap in DOCKER_COPY_ENTRY.captures_iter(&content) {
            out.entry_candidates.push(EntryCandidate::new(
                cap[1].trim_start_matches("./").to_string(),
                format!("{name} ENTRYPOINT/CMD"),
                EntryPointSource::CiConfig,
            ));
        }
    }
    if root.join("docker-compose.yml").exists() || root.join("docker-compose.yaml").exists() {
        out.frameworks.insert("docker-compose".to_string());
    }
}

/// The Serverless Framework's `functions.<name>.handler` field names a `file.export` pair --
/// AWS Lambda invokes it directly, so the file is alive even with zero in-repo importers.
fn probe_serverless(root: &Path, out: &mut ProbeOutput) {
    for name in ["serverless.yml", "serverless.yaml"] {
        let path = root.join(name);
        let Some(content) = read_to_string(&path) else { continue };
        out.frameworks.insert("serverless".to_string());
        for line in content.lines() {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix("handler:") {
                let handler = rest.trim().trim_matches(|c| c == '"' || c == '\'');
                if let Some((file_part, _export)) = handler.rsplit_once('.') {
                    out.entry_candidates.push(
                        EntryCandidate::new(
                            file_part.to_string(),
                            "serverless.yml function handler".to_string(),
                            EntryPointSource::CiConfig,
                        )
                        .confidence(0.9),
                    );
                }
            }
        }
    }
    if let Some(Json::Object(manifest)) = read_json(&root.join("serverless.json")) {
        if let Some(Json::Object(functions)) = manifest.get("functions") {
            for func in functions.values() {
                if let Some(handler) = func.get("handler").and_then(|v| v.as_str()) {
                    if let Some((file_part, _)) = handler.rsplit_once('.') {
                        out.entry_candidates.push(EntryCandidate::new(
                            file_part.to_string(),
                            "serverless.json function handler".to_string(),
                            EntryPointSource::CiConfig,
                        ));
                    }
                }
            }
        }
    }
}
