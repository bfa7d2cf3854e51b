//! Core data model shared by every pipeline stage.
//!
//! Every parser must fill every field of [`ParseResult`] (empty vectors / `None` rather than
//! omitting a field) so downstream stages can stay uniform across language families -- see
//! the "builder pattern for ParseResult" design note.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

/// Language family a file is categorised into during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    JavaScript,
    Python,
    Java,
    Kotlin,
    CSharp,
    Go,
    Rust,
    Css,
    Asset,
    Other,
}

impl Language {
    /// Categorise by file extension, per §4.1.
    pub fn from_extension(ext: &str) -> Language {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "mts" | "cts" | "vue" | "svelte" => {
                Language::JavaScript
            }
            "py" | "pyi" => Language::Python,
            "java" => Language::Java,
            "kt" | "kts" => Language::Kotlin,
            "cs" => Language::CSharp,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "css" | "scss" | "sass" | "less" => Language::Css,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "woff" | "woff2" | "ttf"
            | "eot" => Language::Asset,
            _ => Language::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::CSharp => "csharp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Css => "css",
            Language::Asset => "asset",
            Language::Other => "other",
        }
    }
}

/// A discovered file, prior to parsing.
#[derive(Debug, Clone)]
pub struct File {
    pub path: PathBuf,
    pub size: u64,
    pub lines: usize,
    pub language: Language,
    pub mtime: Option<SystemTime>,
}

/// How an import was spelled in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportKind {
    Esm,
    CommonJs,
    DynamicImport,
    RequireContext,
    GlobSync,
    ImportMetaGlob,
    /// Python `from X import Y`.
    From,
    /// Python `import X`.
    Static,
    /// Catch-all for languages without a finer distinction (Go/Java/C#/Rust `use`/`import`).
    Normal,
    Glob,
}

/// A single named/aliased specifier bound by an import statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSymbol {
    pub name: String,
    pub alias: Option<String>,
    pub is_default: bool,
}

/// One import statement, normalised across languages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Import {
    /// The module string exactly as written in source.
    pub module: String,
    pub kind: ImportKind,
    pub symbols: Vec<ImportSymbol>,
    pub line: usize,
    pub is_glob: bool,
    pub is_type_only: bool,
    /// Resolved file paths, filled in by the resolver stage (empty until then).
    pub resolved: Vec<PathBuf>,
}

impl Import {
    pub fn new(module: impl Into<String>, kind: ImportKind, line: usize) -> Self {
        Import {
            module: module.into(),
            kind,
            symbols: Vec::new(),
            line,
            is_glob: false,
            is_type_only: false,
            resolved: Vec::new(),
        }
    }

    pub fn side_effect(module: impl Into<String>, line: usize) -> Self {
        Import::new(module, ImportKind::Esm, line)
    }
}

/// What kind of declaration an export refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportKind {
    Function,
    Class,
    Variable,
    Type,
    Enum,
    Reexport,
    ReexportAll,
    Default,
}

/// One exported symbol, normalised across languages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
    /// The exported name, or `"*"`/`"default"` for the corresponding sentinel exports.
    pub name: String,
    pub kind: ExportKind,
    /// Set for re-exports (`export { x } from './y'`).
    pub source_module: Option<String>,
    pub line: usize,
}

impl Export {
    pub fn new(name: impl Into<String>, kind: ExportKind, line: usize) -> Self {
        Export { name: name.into(), kind, source_module: None, line }
    }

    pub fn reexport(name: impl Into<String>, source_module: impl Into<String>, line: usize) -> Self {
        Export {
            name: name.into(),
            kind: ExportKind::Reexport,
            source_module: Some(source_module.into()),
            line,
        }
    }

    pub fn reexport_all(source_module: impl Into<String>, line: usize) -> Self {
        Export {
            name: "*".to_string(),
            kind: ExportKind::ReexportAll,
            source_module: Some(source_module.into()),
            line,
        }
    }

    pub fn is_reexport(&self) -> bool {
        matches!(self.kind, ExportKind::Reexport | ExportKind::ReexportAll)
    }
}

/// A top-level function or class/struct declaration, used by the entry-point detector for
/// DI-decorator/annotation scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub is_class_like: bool,
    pub decorators: Vec<Decorator>,
    pub line: usize,
}

/// A decorator/annotation/attribute, with its call arguments captured as raw strings (the
/// specification calls for DI-decorator matching like `@Injectable({ providedIn: 'root' })`
/// which needs the argument text, not just the decorator name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decorator {
    pub name: String,
    pub arguments: Vec<String>,
}

/// Language-specific metadata a parser attaches to its `ParseResult`. Every parser fills in the
/// fields relevant to its language family and leaves the rest at their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseMetadata {
    pub has_main_block: bool,
    pub is_celery: bool,
    pub is_django: bool,
    pub is_fastapi_router: bool,
    pub is_spring_component: bool,
    pub is_main_package: bool,
    pub has_main_function: bool,
    pub has_init_function: bool,
    pub is_test_file: bool,
    pub go_package_name: Option<String>,
    pub java_package_name: Option<String>,
    pub csharp_namespace: Option<String>,
    /// `mod X;` declarations, with an optional `#[path = "..."]` override.
    pub rust_mod_declarations: Vec<RustModDecl>,
    pub rust_is_lib_or_main: bool,
    pub has_getattr_lazy_loader: bool,
    pub jsx_runtime: bool,
    /// `__all__` override, when present (Python).
    pub dunder_all: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RustModDecl {
    pub name: String,
    pub path_override: Option<String>,
}

/// Uniform per-file parse output. Parser failures yield `ParseResult::empty` rather than a hard
/// error -- see §4.2.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub imports: Vec<Import>,
    pub exports: Vec<Export>,
    pub declarations: Vec<Declaration>,
    pub metadata: ParseMetadata,
    /// Raw source; zeroed after the DI/C# analysis phase per the memory-discipline rule in §5.
    /// Later phases that need source re-read from disk instead of relying on this field.
    pub content: Option<String>,
}

impl ParseResult {
    pub fn empty() -> Self {
        ParseResult::default()
    }

    /// Drop retained content to bound peak memory (§5 memory discipline).
    pub fn release_content(&mut self) {
        self.content = None;
    }
}

/// Source of an entry-point determination, for human-readable reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryPointSource {
    Convention,
    PackageJson,
    Html,
    BundlerConfig,
    CiConfig,
    BuildSystem,
    DiAnnotation,
}

/// One file that seeds the reachability walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPoint {
    pub path: PathBuf,
    pub reason: String,
    pub source: EntryPointSource,
    pub is_dynamic: bool,
    pub confidence: f32,
}

/// Sentinel names used in [`ExportUsageMap`] values when a specific export name isn't known.
pub mod sentinel {
    pub const ALL: &str = "__ALL__";
    pub const SIDE_EFFECT: &str = "__SIDE_EFFECT__";
    pub const STAR: &str = "*";
}

/// One recorded consumer of an export (or sentinel) on a given target file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub importer: PathBuf,
    pub import_kind: ImportKind,
}

/// Per-file map from symbol name (or a sentinel from [`sentinel`]) to its recorded consumers.
/// Built incrementally during the reachability walk -- the key data structure for per-export
/// dead detection (§3, §4.6).
#[derive(Debug, Clone, Default)]
pub struct ExportUsageMap {
    inner: HashMap<PathBuf, HashMap<String, Vec<UsageRecord>>>,
}

impl ExportUsageMap {
    pub fn new() -> Self {
        ExportUsageMap { inner: HashMap::new() }
    }

    pub fn record(&mut self, target: PathBuf, symbol: impl Into<String>, importer: PathBuf, kind: ImportKind) {
        self.inner
            .entry(target)
            .or_default()
            .entry(symbol.into())
            .or_default()
            .push(UsageRecord { importer, import_kind: kind });
    }

    pub fn has_any(&self, target: &PathBuf) -> bool {
        self.inner.get(target).map(|m| !m.is_empty()).unwrap_or(false)
    }

    pub fn has_sentinel(&self, target: &PathBuf, sentinel: &str) -> bool {
        self.inner
            .get(target)
            .map(|m| m.contains_key(sentinel))
            .unwrap_or(false)
    }

    pub fn consumers_of(&self, target: &PathBuf, symbol: &str) -> Option<&Vec<UsageRecord>> {
        self.inner.get(target).and_then(|m| m.get(symbol))
    }

    pub fn symbols_for(&self, target: &PathBuf) -> Option<&HashMap<String, Vec<UsageRecord>>> {
        self.inner.get(target)
    }

    pub fn entry_for(&mut self, target: PathBuf) -> &mut HashMap<String, Vec<UsageRecord>> {
        self.inner.entry(target).or_default()
    }
}

/// Non-fatal per-file anomaly accumulated alongside scan results (§7, §10: "Diagnostic").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub message: String,
}

/// One fully-dead file record, enriched with git history and cost-impact estimate (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadFile {
    pub path: PathBuf,
    pub language: Language,
    pub size: u64,
    pub lines: usize,
    pub exports: Vec<String>,
    pub last_modified_author: Option<String>,
    pub last_modified_date: Option<String>,
    pub created_date: Option<String>,
    pub days_since_modified: Option<i64>,
    pub git_available: bool,
    pub git_unavailable_reason: Option<String>,
    pub estimated_monthly_bandwidth_cost_usd: Option<f64>,
    pub estimated_monthly_co2_kg: Option<f64>,
    pub verify_first_command: String,
}

/// One partially-dead file record: reachable, but with at least one export nobody consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialFile {
    pub path: PathBuf,
    pub language: Language,
    pub size: u64,
    pub lines: usize,
    pub live_exports: Vec<String>,
    pub dead_exports: Vec<String>,
}

/// Scan-wide counters surfaced alongside the dead/partial file lists (§6: "summary").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_files: usize,
    pub entry_points: usize,
    pub reachable_files: usize,
    pub dead_files: usize,
    pub partial_files: usize,
    /// Percentage of `total_files` that are fully dead, formatted as e.g. `"3.2%"`.
    pub dead_rate: String,
    pub total_dead_bytes: u64,
    pub languages: HashMap<String, usize>,
}

/// Full output of one scan (§6). The specification's Output record distinguishes brief
/// `deadFiles`/`partialFiles` from richer `fullyDeadFiles`/`partiallyDeadFiles`; this crate has a
/// single Rust-side consumer (the CLI and its tests) rather than a JSON wire API serving both a
/// summary view and a detail view, so [`DeadFile`]/[`PartialFile`] are always the enriched form
/// and there is no separate brief variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub dead_files: Vec<DeadFile>,
    pub partial_files: Vec<PartialFile>,
    pub entry_points: Vec<EntryPoint>,
    pub summary: ScanSummary,
    /// Files matched by a dynamic pattern and therefore excluded from dead-file reporting even
    /// though nothing in the graph literally imports them.
    pub skipped_dynamic: Vec<PathBuf>,
    /// Files matched by a `generated_patterns` rule and excluded from discovery entirely.
    pub excluded_generated: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
    pub elapsed_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_from_extension_covers_families() {
        assert_eq!(Language::from_extension("tsx"), Language::JavaScript);
        assert_eq!(Language::from_extension("vue"), Language::JavaScript);
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("unknown_ext"), Language::Other);
    }

    #[test]
    fn export_usage_map_records_and_queries() {
        let mut map = ExportUsageMap::new();
        let target = PathBuf::from("src/util.ts");
        let importer = PathBuf::from("src/main.ts");
        map.record(target.clone(), "run", importer.clone(), ImportKind::Esm);
        assert!(map.has_any(&target));
        assert!(!map.has_sentinel(&target, sentinel::ALL));
        assert_eq!(map.consumers_of(&target, "run").unwrap().len(), 1);
        assert!(map.consumers_of(&target, "unused").is_none());
    }

    #[test]
    fn export_reexport_detection() {
        let reexport = Export::reexport("a", "./a", 1);
        assert!(reexport.is_reexport());
        let direct = Export::new("a", ExportKind::Function, 1);
        assert!(!direct.is_reexport());
    }
}
