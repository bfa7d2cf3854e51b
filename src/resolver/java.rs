//! Java/Kotlin resolution (§4.5): FQN index, wildcard package resolution, static-import handling,
//! known-framework-package exclusion, and a class-name-only suffix fallback.

use std::path::PathBuf;

use super::ResolverContext;

/// Framework/stdlib package prefixes that are never resolved in-project (§4.5).
const FRAMEWORK_PREFIXES: &[&str] = &[
    "java.", "javax.", "jakarta.", "kotlin.", "kotlinx.",
    "org.springframework.", "com.google.", "org.junit.", "org.slf4j.",
    "org.apache.", "com.fasterxml.", "org.hibernate.", "io.micronaut.",
    "io.quarkus.", "lombok.", "org.mockito.", "okhttp3.", "retrofit2.",
];

pub fn resolve(ctx: &ResolverContext, import_str: &str) -> Vec<PathBuf> {
    let import_str = import_str.strip_prefix("static ").unwrap_or(import_str);

    if import_str.ends_with(".*") {
        let package = &import_str[..import_str.len() - 2];
        return resolve_wildcard(ctx, package);
    }

    if let Some(hits) = resolve_fqn(ctx, import_str) {
        return hits;
    }

    // Static import: `a.b.C.m` -> drop the trailing member, re-resolve as a class.
    if let Some((class_part, _member)) = import_str.rsplit_once('.') {
        if let Some(hits) = resolve_fqn(ctx, class_part) {
            return hits;
        }
    }

    if FRAMEWORK_PREFIXES.iter().any(|p| import_str.starts_with(p)) {
        return Vec::new();
    }

    // Last-resort class-name-only suffix match.
    if let Some(class_name) = import_str.rsplit('.').next() {
        let suffixes = [format!("{class_name}.java"), format!("{class_name}.kt")];
        for suffix in suffixes {
            let hits = ctx.index.suffix_matches(&suffix);
            if !hits.is_empty() {
                return hits.to_vec();
            }
        }
    }

    Vec::new()
}

fn resolve_fqn(ctx: &ResolverContext, fqn: &str) -> Option<Vec<PathBuf>> {
    let path = fqn.replace('.', "/");
    for ext in [".java", ".kt"] {
        let candidate = format!("{path}{ext}");
        let hits = ctx.index.suffix_matches(&candidate);
        if !hits.is_empty() {
            return Some(hits.to_vec());
        }
    }
    None
}

fn resolve_wildcard(ctx: &ResolverContext, package: &str) -> Vec<PathBuf> {
    let dir = std::path::PathBuf::from(package.replace('.', "/"));
    ctx.index.files_with_dir_suffix(&dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::ProbeOutput;
    use crate::resolver::FileIndex;

    #[test]
    fn resolves_fqn_to_java_file() {
        let files = vec![PathBuf::from("src/main/java/com/example/Widget.java")];
        let index = FileIndex::build(&files);
        let probes = ProbeOutput::default();
        let ctx = ResolverContext { index: &index, probes: &probes, go_module_path: None };
        let hits = resolve(&ctx, "com.example.Widget");
        assert_eq!(hits, vec![PathBuf::from("src/main/java/com/example/Widget.java")]);
    }

    #[test]
    fn framework_package_resolves_to_nothing() {
        let files: Vec<PathBuf> = vec![];
        let index = FileIndex::build(&files);
        let probes = ProbeOutput::default();
        let ctx = ResolverContext { index: &index, probes: &probes, go_module_path: None };
        assert!(resolve(&ctx, "java.util.List").is_empty());
    }

    #[test]
    fn resolves_wildcard_to_package_directory_files() {
        let files = vec![
            PathBuf::from("src/main/java/com/example/A.java"),
            PathBuf::from("src/main/java/com/example/B.java"),
        ];
        let index = FileIndex::build(&files);
        let probes = ProbeOutput::default();
        let ctx = ResolverContext { index: &index, probes: &probes, go_module_path: None };
        let hits = resolve(&ctx, "com.example.*");
        assert_eq!(hits.len(), 2);
    }
}
