//! Import graph construction (§3, §4.5).
//!
//! Resolves every import and re-export source module of every parsed file against the shared
//! [`crate::resolver::FileIndex`], producing the adjacency structure the reachability walker
//! traverses. Grounded on the adjacency model implicit in `analyzer/dead_parrots/mod.rs` and
//! `analyzer/cycles.rs` -- both build a `HashMap<PathBuf, _>` of per-file edges before walking it,
//! the same shape used here.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::model::{File, Language, ParseResult};
use crate::resolver::{self, FileIndex, ResolverContext};

/// One node in the import graph: a parsed file plus its resolved import/re-export targets.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub file: File,
    pub parsed: ParseResult,
}

#[derive(Debug)]
pub struct ImportGraph {
    pub nodes: HashMap<PathBuf, FileNode>,
}

impl ImportGraph {
    pub fn get(&self, path: &PathBuf) -> Option<&FileNode> {
        self.nodes.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.nodes.keys()
    }
}

/// Build the graph: resolve every `Import`'s `resolved` field and every re-export `Export`'s
/// implicit source resolution (looked up by the reachability walker on demand, since re-exports
/// only need the source string, not a pre-resolved field on the model).
pub fn build(
    files: Vec<File>,
    mut parsed: HashMap<PathBuf, ParseResult>,
    probes: &crate::probes::ProbeOutput,
) -> ImportGraph {
    let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
    let index = FileIndex::build(&paths);
    let ctx = ResolverContext { index: &index, probes, go_module_path: probes.go_module_path.as_deref() };

    for (path, result) in parsed.iter_mut() {
        let language = Language::from_extension(path.extension().and_then(|e| e.to_str()).unwrap_or(""));
        for import in result.imports.iter_mut() {
            import.resolved = resolver::resolve(&ctx, path, &import.module, import.kind, language);
        }
    }

    let mut nodes = HashMap::with_capacity(files.len());
    for file in files {
        let result = parsed.remove(&file.path).unwrap_or_default();
        nodes.insert(file.path.clone(), FileNode { file, parsed: result });
    }

    ImportGraph { nodes }
}

/// Resolve a re-export's `source_module` string against the same index used during `build`.
/// Exposed separately because re-export resolution only runs from the reachability walker, which
/// already knows the importing file's language at that point.
pub fn resolve_reexport_source(
    index: &FileIndex,
    probes: &crate::probes::ProbeOutput,
    from_file: &std::path::Path,
    source_module: &str,
    language: Language,
) -> Vec<PathBuf> {
    let ctx = ResolverContext { index, probes, go_module_path: probes.go_module_path.as_deref() };
    resolver::resolve(&ctx, from_file, source_module, crate::model::ImportKind::Esm, language)
}
