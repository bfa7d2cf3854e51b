//! tsconfig.json / jsconfig.json path-alias extraction (§4.3).
//!
//! tsconfig is JSON-with-comments and commonly has a trailing comma or two, so comments are
//! stripped before handing the result to `serde_json` rather than requiring strict JSON.
//! `extends` chains are followed (cycle-guarded) and `baseUrl`/`paths` entries are merged
//! child-over-parent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::EntryPointSource;

use super::{read_to_string, EntryCandidate, ProbeOutput};

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?m)//[^\n]*$"#).unwrap());
static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Strips `//` and `/* */` comments and trailing commas so tsconfig's JSONC dialect parses as
/// plain JSON. Not a full tokenizer -- a `//` inside a string literal is not distinguished from
/// a real comment, which matches the teacher's tolerance-over-correctness stance for config
/// probes that never gate a fatal error.
fn strip_jsonc(input: &str) -> String {
    let no_block = BLOCK_COMMENT.replace_all(input, "");
    let no_line = LINE_COMMENT.replace_all(&no_block, "");
    TRAILING_COMMA.replace_all(&no_line, "$1").into_owned()
}

#[derive(Debug, Clone)]
pub struct AliasEntry {
    /// Alias pattern as written, e.g. `"@app/*"` or `"@utils"`.
    pub alias: String,
    /// Resolved target pattern, project-relative, e.g. `"src/app/*"`.
    pub target: String,
}

#[derive(Debug, Default)]
pub struct AliasTable {
    pub entries: Vec<AliasEntry>,
    pub base_url: Option<String>,
}

pub fn probe(root: &Path, out: &mut ProbeOutput) {
    for name in ["tsconfig.json", "jsconfig.json"] {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let mut entries = Vec::new();
        let mut base_url = None;
        let mut seen = std::collections::HashSet::new();
        load_chain(root, &path, &mut entries, &mut base_url, &mut seen);
        out.alias_table.entries.extend(entries);
        if out.alias_table.base_url.is_none() {
            out.alias_table.base_url = base_url;
        }
        collect_declared_files(root, &path, out);
    }
}

/// §4.4 rule 10: every path named in `files`/`include` is an explicit source-file declaration,
/// not a pattern match -- it's as strong a signal as a package manifest reference.
fn collect_declared_files(root: &Path, path: &Path, out: &mut ProbeOutput) {
    let Some(raw) = read_to_string(path) else { return };
    let cleaned = strip_jsonc(&raw);
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&cleaned) else { return };
    let config_dir = path.parent().unwrap_or(root);

    for field in ["files", "include"] {
        let Some(items) = value.get(field).and_then(|v| v.as_array()) else { continue };
        for item in items.iter().filter_map(|v| v.as_str()) {
            out.entry_candidates.push(EntryCandidate::new(
                rel_to_root(root, config_dir, item),
                format!("tsconfig {field} entry"),
                EntryPointSource::BuildSystem,
            ));
        }
    }
}

fn load_chain(
    root: &Path,
    path: &Path,
    entries: &mut Vec<AliasEntry>,
    base_url: &mut Option<String>,
    seen: &mut std::collections::HashSet<PathBuf>,
) {
    let Ok(canonical) = path.canonicalize() else { return };
    if !seen.insert(canonical) {
        return;
    }
    let Some(raw) = read_to_string(path) else { return };
    let cleaned = strip_jsonc(&raw);
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&cleaned) else { return };

    let compiler_options = value.get("compilerOptions");
    let config_dir = path.parent().unwrap_or(root);

    if let Some(extends) = value.get("extends").and_then(|v| v.as_str()) {
        let parent_path = resolve_extends(config_dir, extends);
        if let Some(parent_path) = parent_path {
            load_chain(root, &parent_path, entries, base_url, seen);
        }
    }

    if let Some(opts) = compiler_options {
        if let Some(bu) = opts.get("baseUrl").and_then(|v| v.as_str()) {
            *base_url = Some(rel_to_root(root, config_dir, bu));
        }
        if let Some(paths) = opts.get("paths").and_then(|v| v.as_object()) {
            let mut child_entries = HashMap::new();
            for (alias, targets) in paths {
                if let Some(first) = targets.as_array().and_then(|a| a.first()).and_then(|t| t.as_str()) {
                    let resolved = rel_to_root(root, config_dir, first);
                    child_entries.insert(alias.clone(), resolved);
                }
            }
            for (alias, target) in child_entries {
                entries.retain(|e| e.alias != alias);
                entries.push(AliasEntry { alias, target });
            }
        }
    }
}

fn resolve_extends(config_dir: &Path, extends: &str) -> Option<PathBuf> {
    let candidate = if extends.starts_with('.') {
        config_dir.join(extends)
    } else {
        config_dir.join("node_modules").join(extends)
    };
    if candidate.extension().is_some() {
        candidate.exists().then_some(candidate)
    } else {
        let with_ext = candidate.with_extension("json");
        if with_ext.exists() {
            Some(with_ext)
        } else {
            candidate.exists().then_some(candidate)
        }
    }
}

fn rel_to_root(root: &Path, config_dir: &Path, value: &str) -> String {
    let joined = config_dir.join(value);
    match joined.strip_prefix(root) {
        Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
        Err(_) => value.to_string(),
    }
}
