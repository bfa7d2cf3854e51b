//! Python resolution (§4.5): absolute dotted-module and relative-dot resolution.

use std::path::{Path, PathBuf};

use crate::model::ImportKind;

use super::ResolverContext;

const SOURCE_PREFIXES: &[&str] = &["", "src/", "app/"];

pub fn resolve(ctx: &ResolverContext, from_file: &Path, import_str: &str, kind: ImportKind) -> Vec<PathBuf> {
    let dots = import_str.chars().take_while(|c| *c == '.').count();
    if dots > 0 {
        return resolve_relative(ctx, from_file, import_str, dots);
    }
    resolve_absolute(ctx, import_str, kind)
}

fn resolve_relative(ctx: &ResolverContext, from_file: &Path, import_str: &str, dots: usize) -> Vec<PathBuf> {
    let mut base = from_file.parent().unwrap_or_else(|| Path::new(""));
    // One leading dot means "this package" (from_file's own directory); each extra dot climbs
    // one directory further up.
    for _ in 1..dots {
        base = base.parent().unwrap_or(base);
    }
    let rest = &import_str[dots..];
    if rest.is_empty() {
        let init = base.join("__init__.py");
        return if ctx.index.contains(&init) { vec![init] } else { Vec::new() };
    }
    let rel_path = rest.replace('.', "/");
    resolve_module_path(ctx, &base.join(&rel_path))
}

fn resolve_absolute(ctx: &ResolverContext, import_str: &str, kind: ImportKind) -> Vec<PathBuf> {
    let rel_path = import_str.replace('.', "/");
    for prefix in SOURCE_PREFIXES {
        let candidate = Path::new(prefix).join(&rel_path);
        let hits = resolve_module_path(ctx, &candidate);
        if !hits.is_empty() {
            return hits;
        }
    }

    // `from a.b import c`: also try `a/b.py` (c is a symbol in module b, not submodule c.py).
    if matches!(kind, ImportKind::From) {
        if let Some((parent, _last)) = rel_path.rsplit_once('/') {
            for prefix in SOURCE_PREFIXES {
                let candidate = Path::new(prefix).join(parent).with_extension("py");
                if ctx.index.contains(&candidate) {
                    return vec![candidate];
                }
            }
        }
    }
    Vec::new()
}

fn resolve_module_path(ctx: &ResolverContext, base: &Path) -> Vec<PathBuf> {
    let as_file = base.with_extension("py");
    if ctx.index.contains(&as_file) {
        return vec![as_file];
    }
    let as_package = base.join("__init__.py");
    if ctx.index.contains(&as_package) {
        return vec![as_package];
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::ProbeOutput;
    use crate::resolver::FileIndex;

    #[test]
    fn resolves_absolute_dotted_module() {
        let files = vec![PathBuf::from("pkg/sub/mod.py")];
        let index = FileIndex::build(&files);
        let probes = ProbeOutput::default();
        let ctx = ResolverContext { index: &index, probes: &probes, go_module_path: None };
        let hits = resolve(&ctx, Path::new("main.py"), "pkg.sub.mod", ImportKind::Static);
        assert_eq!(hits, vec![PathBuf::from("pkg/sub/mod.py")]);
    }

    #[test]
    fn resolves_relative_single_dot() {
        let files = vec![PathBuf::from("pkg/a.py"), PathBuf::from("pkg/b.py")];
        let index = FileIndex::build(&files);
        let probes = ProbeOutput::default();
        let ctx = ResolverContext { index: &index, probes: &probes, go_module_path: None };
        let hits = resolve(&ctx, Path::new("pkg/a.py"), ".b", ImportKind::From);
        assert_eq!(hits, vec![PathBuf::from("pkg/b.py")]);
    }

    #[test]
    fn resolves_package_init() {
        let files = vec![PathBuf::from("pkg/sub/__init__.py")];
        let index = FileIndex::build(&files);
        let probes = ProbeOutput::default();
        let ctx = ResolverContext { index: &index, probes: &probes, go_module_path: None };
        let hits = resolve(&ctx, Path::new("main.py"), "pkg.sub", ImportKind::Static);
        assert_eq!(hits, vec![PathBuf::from("pkg/sub/__init__.py")]);
    }
}
