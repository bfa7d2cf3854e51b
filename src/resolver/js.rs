//! JavaScript/TypeScript resolution (§4.5, JS/TS rules 1-5).

use std::path::{Path, PathBuf};

use super::ResolverContext;

const CANDIDATE_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".mts", ".cts", ".vue", ".svelte",
    ".ios.ts", ".ios.tsx", ".ios.js", ".android.ts", ".android.tsx", ".android.js",
    ".web.ts", ".web.tsx", ".web.js", ".native.ts", ".native.tsx", ".native.js",
    ".macos.ts", ".macos.tsx", ".windows.ts", ".windows.tsx",
];

pub fn resolve(ctx: &ResolverContext, from_file: &Path, import_str: &str) -> Vec<PathBuf> {
    if import_str.starts_with('.') {
        return resolve_relative(ctx, from_file, import_str);
    }
    if let Some(rest) = import_str.strip_prefix('/') {
        return ctx.index.resolve_with_extensions(Path::new(rest), CANDIDATE_EXTENSIONS);
    }

    if let Some(hits) = resolve_alias(ctx, from_file, import_str) {
        if !hits.is_empty() {
            return hits;
        }
    }

    if let Some(hits) = resolve_workspace_package(ctx, import_str) {
        if !hits.is_empty() {
            return hits;
        }
    }

    if let Some(base_url) = ctx.probes.alias_table.base_url.as_deref() {
        let candidate = Path::new(base_url).join(import_str);
        let hits = ctx.index.resolve_with_extensions(&candidate, CANDIDATE_EXTENSIONS);
        if !hits.is_empty() {
            return hits;
        }
    }

    Vec::new()
}

fn resolve_relative(ctx: &ResolverContext, from_file: &Path, import_str: &str) -> Vec<PathBuf> {
    let base_dir = from_file.parent().unwrap_or_else(|| Path::new(""));
    let joined = normalize(&base_dir.join(import_str));
    ctx.index.resolve_with_extensions(&joined, CANDIDATE_EXTENSIONS)
}

/// §4.5 rule 2: aliases applicable to `fromFile` are the global table merged with the
/// most-specific package's own aliases, tried longest-prefix-first, with both the trailing-slash
/// and bare variants of each alias attempted.
fn resolve_alias(ctx: &ResolverContext, from_file: &Path, import_str: &str) -> Option<Vec<PathBuf>> {
    let from_str = from_file.to_string_lossy();
    let mut candidates: Vec<&crate::probes::AliasEntry> = ctx
        .probes
        .alias_table
        .entries
        .iter()
        .filter(|e| applies_to(e, &from_str))
        .collect();
    candidates.sort_by(|a, b| b.alias.len().cmp(&a.alias.len()));

    for entry in candidates {
        let (alias_prefix, has_star) = match entry.alias.strip_suffix('*') {
            Some(prefix) => (prefix, true),
            None => (entry.alias.as_str(), false),
        };
        let Some(rest) = import_str.strip_prefix(alias_prefix) else { continue };
        let target = if has_star {
            let target_prefix = entry.target.strip_suffix('*').unwrap_or(&entry.target);
            format!("{target_prefix}{rest}")
        } else {
            entry.target.clone()
        };
        let hits = ctx.index.resolve_with_extensions(Path::new(&target), CANDIDATE_EXTENSIONS);
        if !hits.is_empty() {
            return Some(hits);
        }
    }
    None
}

fn applies_to(_entry: &crate::probes::AliasEntry, _from_file: &str) -> bool {
    // Per-package alias scoping isn't modeled by AliasTable yet (global-only table); every
    // alias is treated as applicable everywhere until package-scoped tsconfigs are tracked.
    true
}

/// §4.5 rule 3: workspace-package match, trying the package's `exports` map before falling
/// back to `{pkgDir}/{subPath}` and `{pkgDir}/src/{subPath}`.
fn resolve_workspace_package(ctx: &ResolverContext, import_str: &str) -> Option<Vec<PathBuf>> {
    let package = ctx
        .probes
        .workspace_packages
        .iter()
        .filter(|p| p.name.is_some())
        .find(|p| {
            let name = p.name.as_deref().unwrap();
            import_str == name || import_str.starts_with(&format!("{name}/"))
        })?;
    let name = package.name.as_deref().unwrap();
    let sub_path = import_str.strip_prefix(name).unwrap_or("").trim_start_matches('/');

    if sub_path.is_empty() {
        for (key, target) in &package.exports {
            if key == "." {
                let path = format!("{}/{}", package.dir, target.trim_start_matches("./"));
                let hits = ctx.index.resolve_with_extensions(Path::new(&path), CANDIDATE_EXTENSIONS);
                if !hits.is_empty() {
                    return Some(hits);
                }
            }
        }
        for field in [&package.main, &package.module] {
            if let Some(value) = field {
                let path = format!("{}/{}", package.dir, value.trim_start_matches("./"));
                let hits = ctx.index.resolve_with_extensions(Path::new(&path), CANDIDATE_EXTENSIONS);
                if !hits.is_empty() {
                    return Some(hits);
                }
            }
        }
    } else {
        for (key, target) in &package.exports {
            let key_prefix = key.trim_end_matches('*');
            if let Some(rest) = sub_path.strip_prefix(key_prefix.trim_start_matches("./")) {
                let target_prefix = target.trim_end_matches('*');
                let path = format!("{}/{}{}", package.dir, target_prefix.trim_start_matches("./"), rest);
                let hits = ctx.index.resolve_with_extensions(Path::new(&path), CANDIDATE_EXTENSIONS);
                if !hits.is_empty() {
                    return Some(hits);
                }
            }
        }
        let direct = format!("{}/{}", package.dir, sub_path);
        let hits = ctx.index.resolve_with_extensions(Path::new(&direct), CANDIDATE_EXTENSIONS);
        if !hits.is_empty() {
            return Some(hits);
        }
        let src = format!("{}/src/{}", package.dir, sub_path);
        let hits = ctx.index.resolve_with_extensions(Path::new(&src), CANDIDATE_EXTENSIONS);
        if !hits.is_empty() {
            return Some(hits);
        }
    }
    None
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = Vec::new();
    for comp in path.components() {
        match comp {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::ProbeOutput;
    use crate::resolver::FileIndex;

    #[test]
    fn resolves_relative_import_with_extension_candidates() {
        let files = vec![PathBuf::from("src/a.ts"), PathBuf::from("src/b.ts")];
        let index = FileIndex::build(&files);
        let probes = ProbeOutput::default();
        let ctx = ResolverContext { index: &index, probes: &probes, go_module_path: None };
        let hits = resolve(&ctx, Path::new("src/a.ts"), "./b");
        assert_eq!(hits, vec![PathBuf::from("src/b.ts")]);
    }

    #[test]
    fn resolves_directory_index() {
        let files = vec![PathBuf::from("src/a.ts"), PathBuf::from("src/widgets/index.ts")];
        let index = FileIndex::build(&files);
        let probes = ProbeOutput::default();
        let ctx = ResolverContext { index: &index, probes: &probes, go_module_path: None };
        let hits = resolve(&ctx, Path::new("src/a.ts"), "./widgets");
        assert_eq!(hits, vec![PathBuf::from("src/widgets/index.ts")]);
    }
}
