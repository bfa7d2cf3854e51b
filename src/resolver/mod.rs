//! Import resolver (§4.5): `(fromFile, importString) -> Vec<PathBuf>`.
//!
//! Every language's resolution rule ultimately bottoms out in a lookup against the same
//! in-memory [`FileIndex`] (built once from discovery's file list) rather than touching the
//! filesystem per candidate -- the teacher's own `analyzer/resolvers.rs` checks `Path::exists`
//! directly, which doesn't compose with a pure, independently-testable resolver, so the index is
//! designed from scratch here (see `DESIGN.md`).

mod csharp;
mod go;
mod java;
mod js;
mod python;
mod rust_lang;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::model::{ImportKind, Language};
use crate::probes::ProbeOutput;

/// O(1) lookups over the discovered file set: full path, suffix-by-component, and
/// extension-less stem, each keyed by forward-slash-normalised project-relative paths.
#[derive(Debug, Default)]
pub struct FileIndex {
    all: HashSet<PathBuf>,
    /// Maps a path with its extension stripped to every real file sharing that stem (handles
    /// `./foo` resolving to `foo.ts` or `foo/index.ts`).
    by_stem: HashMap<PathBuf, Vec<PathBuf>>,
    /// Maps a trailing slash-separated suffix (e.g. `"utils/math"`) to every file whose path
    /// ends with it -- used by the Java/Kotlin class-name fallback and Go last-segment match.
    by_suffix: HashMap<String, Vec<PathBuf>>,
}

impl FileIndex {
    pub fn build(files: &[PathBuf]) -> Self {
        let mut index = FileIndex::default();
        for file in files {
            index.all.insert(file.clone());
            let stem = strip_extension(file);
            index.by_stem.entry(stem).or_default().push(file.clone());

            let normalized = file.to_string_lossy().replace('\\', "/");
            let segments: Vec<&str> = normalized.split('/').collect();
            for start in 0..segments.len() {
                let suffix = segments[start..].join("/");
                index.by_suffix.entry(suffix).or_default().push(file.clone());
            }
        }
        index
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.all.contains(path)
    }

    /// Try `path` with each of `extensions` appended (first match wins), then `path/index.*`.
    pub fn resolve_with_extensions(&self, path: &Path, extensions: &[&str]) -> Vec<PathBuf> {
        if self.all.contains(path) {
            return vec![path.to_path_buf()];
        }
        for ext in extensions {
            let candidate = append_ext(path, ext);
            if self.all.contains(&candidate) {
                return vec![candidate];
            }
        }
        for ext in extensions {
            let candidate = path.join(format!("index{ext}"));
            if self.all.contains(&candidate) {
                return vec![candidate];
            }
        }
        Vec::new()
    }

    pub fn stem_matches(&self, stem: &Path) -> &[PathBuf] {
        self.by_stem.get(stem).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn suffix_matches(&self, suffix: &str) -> &[PathBuf] {
        self.by_suffix.get(suffix).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Every non-test file in `dir`, used by Go/Java/Kotlin same-package amplification.
    pub fn files_in_dir(&self, dir: &Path) -> Vec<PathBuf> {
        self.all
            .iter()
            .filter(|f| f.parent() == Some(dir))
            .cloned()
            .collect()
    }

    /// Every file whose parent directory ends with `suffix` (slash-separated, matched on full
    /// path components so `"com/example"` doesn't also match `"org/com/example"`'s
    /// non-`com/example`-rooted sibling). Used to resolve a Java/Kotlin package name without
    /// knowing which source root (`src/main/java`, `src/main/kotlin`, ...) it lives under.
    pub fn files_with_dir_suffix(&self, suffix: &Path) -> Vec<PathBuf> {
        let suffix_str = suffix.to_string_lossy().replace('\\', "/");
        self.all
            .iter()
            .filter(|f| {
                f.parent()
                    .map(|p| {
                        let parent_str = p.to_string_lossy().replace('\\', "/");
                        parent_str == suffix_str || parent_str.ends_with(&format!("/{suffix_str}"))
                    })
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }
}

fn strip_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(_) => path.with_extension(""),
        None => path.to_path_buf(),
    }
}

fn append_ext(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.to_string_lossy().into_owned();
    s.push_str(ext);
    PathBuf::from(s)
}

/// Shared resolver context, built once per scan and handed to every per-language resolve call.
pub struct ResolverContext<'a> {
    pub index: &'a FileIndex,
    pub probes: &'a ProbeOutput,
    pub go_module_path: Option<&'a str>,
}

/// Resolve a single import to zero or more concrete project files. Dispatches on the language of
/// the importing file, per §4.5.
pub fn resolve(
    ctx: &ResolverContext,
    from_file: &Path,
    import_str: &str,
    kind: ImportKind,
    language: Language,
) -> Vec<PathBuf> {
    match language {
        Language::JavaScript => js::resolve(ctx, from_file, import_str),
        Language::Python => python::resolve(ctx, from_file, import_str, kind),
        Language::Java | Language::Kotlin => java::resolve(ctx, import_str),
        Language::Go => go::resolve(ctx, import_str),
        Language::Rust => rust_lang::resolve(ctx, from_file, import_str),
        Language::CSharp => csharp::resolve(ctx, import_str),
        Language::Css | Language::Asset | Language::Other => Vec::new(),
    }
}
