//! Bundler config probes (§4.3): Webpack, Vite, Rollup, esbuild, Parcel, and Module Federation.
//!
//! Bundler configs are JS/TS modules, not declarative data, so this probe doesn't execute them --
//! it greps for the handful of string-literal shapes that reliably indicate an entry point
//! (`entry: "..."`, `input: "..."`) or a Module Federation `exposes` map, which is the one shape
//! that both names an internal file and marks it externally reachable regardless of in-repo
//! usage.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::EntryPointSource;

use super::{read_to_string, EntryCandidate, ProbeOutput};

const WEBPACK_CONFIGS: &[&str] = &["webpack.config.js", "webpack.config.ts", "webpack.config.mjs", "webpack.config.cjs"];
const VITE_CONFIGS: &[&str] = &["vite.config.js", "vite.config.ts", "vite.config.mjs"];
const ROLLUP_CONFIGS: &[&str] = &["rollup.config.js", "rollup.config.mjs", "rollup.config.ts"];
const ESBUILD_HINTS: &[&str] = &["esbuild.config.js", "esbuild.js"];
const PARCEL_HINTS: &[&str] = &[".parcelrc"];

static ENTRY_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:entry|input)\s*:\s*(?:\[\s*)?["']([^"']+)["']"#).unwrap());
static EXPOSES_ENTRY: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["'][^"']+["']\s*:\s*["']([^"']+)["']"#).unwrap());

pub fn probe(root: &Path, out: &mut ProbeOutput) {
    for name in WEBPACK_CONFIGS {
        scan_entry_fields(root, name, "webpack", out);
    }
    for name in VITE_CONFIGS {
        scan_entry_fields(root, name, "vite", out);
    }
    for name in ROLLUP_CONFIGS {
        scan_entry_fields(root, name, "rollup", out);
    }
    for name in ESBUILD_HINTS {
        scan_entry_fields(root, name, "esbuild", out);
    }
    for name in PARCEL_HINTS {
        if root.join(name).exists() {
            out.frameworks.insert("parcel".to_string());
        }
    }
    probe_module_federation(root, out);
}

fn scan_entry_fields(root: &Path, file_name: &str, framework: &str, out: &mut ProbeOutput) {
    let path = root.join(file_name);
    let Some(content) = read_to_string(&path) else { return };
    out.frameworks.insert(framework.to_string());
    for cap in ENTRY_STRING.captures_iter(&content) {
        let value = cap[1].to_string();
        if value.starts_with("http") || value.contains("node_modules") {
            continue;
        }
        out.entry_candidates.push(EntryCandidate::new(
            normalize(&value),
            format!("{framework} config entry"),
            EntryPointSource::BundlerConfig,
        ));
    }
}

/// Module Federation's `exposes` map names files that become remote-consumable regardless of
/// whether any sibling module in this repo imports them -- the host application (often another
/// repo entirely) is the real consumer.
fn probe_module_federation(root: &Path, out: &mut ProbeOutput) {
    for name in WEBPACK_CONFIGS.iter().chain(VITE_CONFIGS.iter()) {
        let Some(content) = read_to_string(&root.join(name)) else { continue };
        let Some(block_start) = content.find("exposes") else { continue };
        let Some(brace_start) = content[block_start..].find('{') else { continue };
        let start = block_start + brace_start;
        let Some(block) = balanced_block(&content, start) else { continue };
        out.frameworks.insert("module-federation".to_string());
        for cap in EXPOSES_ENTRY.captures_iter(block) {
            out.entry_candidates.push(
                EntryCandidate::new(
                    normalize(&cap[1]),
                    "Module Federation exposed module".to_string(),
                    EntryPointSource::BundlerConfig,
                )
                .confidence(0.95),
            );
        }
    }
}

fn balanced_block(content: &str, open_idx: usize) -> Option<&str> {
    let bytes = content.as_bytes();
    let mut depth = 0i32;
    for (offset, &b) in bytes[open_idx..].iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return content.get(open_idx..=open_idx + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn normalize(value: &str) -> String {
    value.trim_start_matches("./").to_string()
}
