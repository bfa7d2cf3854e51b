//! Go resolution (§4.5): module-path-relative directory lookup, then path-segment fallback.

use std::path::PathBuf;

use super::ResolverContext;

pub fn resolve(ctx: &ResolverContext, import_str: &str) -> Vec<PathBuf> {
    if let Some(module_path) = ctx.go_module_path {
        if let Some(rest) = import_str.strip_prefix(module_path) {
            let rest = rest.trim_start_matches('/');
            let dir = PathBuf::from(rest);
            let hits = non_test_files(ctx, &dir);
            if !hits.is_empty() {
                return hits;
            }
        }
    }

    // Trailing path segments as a directory name, trying progressively shorter suffixes.
    let segments: Vec<&str> = import_str.split('/').collect();
    for start in 0..segments.len() {
        let suffix = segments[start..].join("/");
        let dir = PathBuf::from(&suffix);
        let hits = non_test_files(ctx, &dir);
        if !hits.is_empty() {
            return hits;
        }
    }

    // Last-segment match: the trailing path component as a bare directory name anywhere in
    // the project.
    if let Some(last) = import_str.rsplit('/').next() {
        let hits = ctx.index.files_with_dir_suffix(&PathBuf::from(last));
        if !hits.is_empty() {
            return hits.into_iter().filter(|f| is_go_source(f)).collect();
        }
    }

    Vec::new()
}

fn non_test_files(ctx: &ResolverContext, dir: &std::path::Path) -> Vec<PathBuf> {
    ctx.index
        .files_in_dir(dir)
        .into_iter()
        .filter(|f| is_go_source(f) && !is_test_file(f))
        .collect()
}

fn is_go_source(path: &std::path::Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("go")
}

fn is_test_file(path: &std::path::Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with("_test.go"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::ProbeOutput;
    use crate::resolver::FileIndex;

    #[test]
    fn resolves_module_relative_package() {
        let files = vec![PathBuf::from("internal/util/helper.go"), PathBuf::from("internal/util/helper_test.go")];
        let index = FileIndex::build(&files);
        let probes = ProbeOutput::default();
        let ctx = ResolverContext { index: &index, probes: &probes, go_module_path: Some("example.com/proj") };
        let hits = resolve(&ctx, "example.com/proj/internal/util");
        assert_eq!(hits, vec![PathBuf::from("internal/util/helper.go")]);
    }
}
