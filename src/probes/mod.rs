//! Config probes (§4.3).
//!
//! Each probe is an independent reader keyed to a specific file (glob or exact name). Probes
//! never execute configuration -- they extract declared strings via regex/JSON/YAML-ish parsing
//! and tolerate malformed input by returning an empty result (§7: `ConfigMalformed` never halts
//! the scan). [`run_probes`] fans out to every sub-probe and merges their output into a single
//! [`ProbeOutput`] consumed by the entry-point detector and the resolver.

mod buildsystems;
mod bundlers;
mod ci;
mod frameworks;
mod tsconfig;
mod workspace;

use std::collections::HashSet;
use std::path::Path;

use crate::model::EntryPointSource;

pub use tsconfig::{AliasEntry, AliasTable};
pub use workspace::WorkspacePackage;

/// One candidate entry point surfaced by a config probe, prior to being folded into the
/// unified [`crate::model::EntryPoint`] set by the entry-point detector.
#[derive(Debug, Clone)]
pub struct EntryCandidate {
    /// Project-relative path, forward-slash separated.
    pub path: String,
    pub reason: String,
    pub source: EntryPointSource,
    pub is_dynamic: bool,
    pub confidence: f32,
}

impl EntryCandidate {
    pub fn new(path: impl Into<String>, reason: impl Into<String>, source: EntryPointSource) -> Self {
        EntryCandidate {
            path: path.into(),
            reason: reason.into(),
            source,
            is_dynamic: false,
            confidence: 0.8,
        }
    }

    pub fn dynamic(mut self) -> Self {
        self.is_dynamic = true;
        self
    }

    pub fn confidence(mut self, c: f32) -> Self {
        self.confidence = c;
        self
    }
}

/// Aggregated output of every config probe -- the single thing downstream stages consult.
#[derive(Debug, Default)]
pub struct ProbeOutput {
    pub entry_candidates: Vec<EntryCandidate>,
    pub workspace_packages: Vec<WorkspacePackage>,
    pub alias_table: AliasTable,
    pub go_module_path: Option<String>,
    pub java_source_roots: Vec<String>,
    pub frameworks: HashSet<String>,
}

/// Run every config probe against the project root and merge their results.
pub fn run_probes(root: &Path) -> ProbeOutput {
    let mut out = ProbeOutput::default();

    bundlers::probe(root, &mut out);
    ci::probe(root, &mut out);
    frameworks::probe(root, &mut out);
    workspace::probe(root, &mut out);
    tsconfig::probe(root, &mut out);
    buildsystems::probe(root, &mut out);

    out
}

/// Best-effort read: missing/unreadable files return `None` rather than propagating an error,
/// per §7's "config parse failure never elevates to fatal" policy.
pub(crate) fn read_to_string(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

pub(crate) fn read_json(path: &Path) -> Option<serde_json::Value> {
    let content = read_to_string(path)?;
    serde_json::from_str(&content).ok()
}
