//! Rust resolution (§4.5): `a::b::c` path-segment lookup. Module amplification (`mod` decls,
//! proc-macro cues) lives in the reachability walker, not here -- this resolver only handles
//! `use` path targets that name a concrete module.

use std::path::{Path, PathBuf};

use super::ResolverContext;

pub fn resolve(ctx: &ResolverContext, from_file: &Path, import_str: &str) -> Vec<PathBuf> {
    let segments: Vec<&str> = import_str.split("::").filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Vec::new();
    }

    let base_dir = crate_root_relative_dir(from_file);
    let mut segments = segments.as_slice();
    if matches!(segments.first(), Some(&"crate") | Some(&"self") | Some(&"super")) {
        segments = &segments[1..];
    }
    if segments.is_empty() {
        return Vec::new();
    }

    let rel_path: PathBuf = segments.iter().collect();
    for candidate_base in [base_dir.clone(), PathBuf::from("src")] {
        let as_file = candidate_base.join(&rel_path).with_extension("rs");
        if ctx.index.contains(&as_file) {
            return vec![as_file];
        }
        let as_mod = candidate_base.join(&rel_path).join("mod.rs");
        if ctx.index.contains(&as_mod) {
            return vec![as_mod];
        }
    }
    Vec::new()
}

fn crate_root_relative_dir(from_file: &Path) -> PathBuf {
    let normalized = from_file.to_string_lossy().replace('\\', "/");
    if let Some(idx) = normalized.find("src/") {
        PathBuf::from(&normalized[..idx + 3])
    } else {
        PathBuf::from("src")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::ProbeOutput;
    use crate::resolver::FileIndex;

    #[test]
    fn resolves_crate_relative_path() {
        let files = vec![PathBuf::from("src/model.rs")];
        let index = FileIndex::build(&files);
        let probes = ProbeOutput::default();
        let ctx = ResolverContext { index: &index, probes: &probes, go_module_path: None };
        let hits = resolve(&ctx, Path::new("src/main.rs"), "crate::model");
        assert_eq!(hits, vec![PathBuf::from("src/model.rs")]);
    }

    #[test]
    fn resolves_nested_mod_rs() {
        let files = vec![PathBuf::from("src/resolver/mod.rs")];
        let index = FileIndex::build(&files);
        let probes = ProbeOutput::default();
        let ctx = ResolverContext { index: &index, probes: &probes, go_module_path: None };
        let hits = resolve(&ctx, Path::new("src/main.rs"), "crate::resolver");
        assert_eq!(hits, vec![PathBuf::from("src/resolver/mod.rs")]);
    }
}
