//! C# resolution (§4.5): `using A.B` -> `A/B.cs`, with common project-layout prefix variants.

use std::path::PathBuf;

use super::ResolverContext;

const PREFIXES: &[&str] = &["", "src/"];

pub fn resolve(ctx: &ResolverContext, import_str: &str) -> Vec<PathBuf> {
    let rel_path = import_str.replace('.', "/");
    for prefix in PREFIXES {
        let candidate = PathBuf::from(format!("{prefix}{rel_path}.cs"));
        if ctx.index.contains(&candidate) {
            return vec![candidate];
        }
    }

    // Namespace-as-directory: every `.cs` file directly under `A/B/`.
    let dir = PathBuf::from(&rel_path);
    let hits = ctx.index.files_with_dir_suffix(&dir);
    if !hits.is_empty() {
        return hits;
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::ProbeOutput;
    use crate::resolver::FileIndex;

    #[test]
    fn resolves_namespace_to_file() {
        let files = vec![PathBuf::from("MyApp/Services/Widget.cs")];
        let index = FileIndex::build(&files);
        let probes = ProbeOutput::default();
        let ctx = ResolverContext { index: &index, probes: &probes, go_module_path: None };
        let hits = resolve(&ctx, "MyApp.Services.Widget");
        assert_eq!(hits, vec![PathBuf::from("MyApp/Services/Widget.cs")]);
    }
}
