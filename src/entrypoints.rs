//! Entry point detector (§4.4).
//!
//! Combines config-probe output (§4.3) with a pattern catalogue, DI-decorator scanning, and
//! path-anti-pattern suppression into the single "always-live" file set that seeds the
//! reachability walk. Grounded on `analyzer/entrypoints.rs`'s module shape (a combinator over
//! aggregated signals, trimmed of its JSON/text printers) and `analyzer/root_scan.rs`'s
//! nested-package liveness logic for rule 2.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{EntryPoint, EntryPointSource, ParseResult};
use crate::probes::ProbeOutput;

/// §4.4 rule 1: these path fragments never become entry points, regardless of any other match.
static DEAD_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[/_-](dead|deprecated|legacy|old|unused)[-_]").unwrap());

/// §4.4 rule 3: entry-point filename/path conventions, grouped by the family of rule that
/// motivates them. Not an attempt at the spec's "several hundred patterns" -- the representative
/// core that covers every language and framework this crate parses.
static ENTRY_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    let rules: &[(&str, &str)] = &[
        // common root/src filenames
        (r"(?i)(^|/)(index|main|server|app|init|router|handler|worker)\.(ts|tsx|js|jsx|mjs|cjs|mts|cts|py)$", "common entry filename"),
        // CLI conventions
        (r"(?i)(^|/)(bin|cli|commands|scripts)/", "CLI convention directory"),
        // file-based routing
        (r"(?i)(^|/)(pages|routes)/", "file-based routing directory"),
        (r"(?i)(^|/)app/.*(page|layout|loading|error|not-found|route|template|default)\.(ts|tsx|js|jsx)$", "Next.js App Router special file"),
        (r"(?i)\+(page|layout|server|error)(@[\w-]+)?\.(ts|js|svelte)$", "SvelteKit routing file"),
        // tests
        (r"(?i)\.(test|spec)\.[jt]sx?$", "JS/TS test file"),
        (r"(?i)__tests__/", "test directory"),
        (r"(?i)\.cy\.[jt]sx?$", "Cypress test file"),
        (r"(?i)\.test-d\.[jt]s$", "type-test file"),
        // framework conventions
        (r"(?i)(^|/)middleware\.[jt]s$", "middleware convention"),
        (r"(?i)(^|/)gatsby-[\w-]+\.js$", "Gatsby convention file"),
        (r"(?i)(^|/)(composables|store|stores|middleware)/", "Nuxt/Vue auto-import directory"),
        (r"(?i)(^|/)app/(services|models|routes|controllers|adapters|components|helpers)/", "Ember convention directory"),
        // platform targets
        (r"(?i)(^|/)netlify/functions/", "Netlify function"),
        (r"(?i)(^|/)(api|vercel)/api/", "Vercel API route"),
        (r"(?i)(^|/)functions/", "Cloudflare Workers / serverless function"),
        // generated code
        (r"(?i)\.pb\.(go|js|ts)$", "protobuf generated file"),
        (r"(?i)_pb2(_grpc)?\.py$", "protobuf/gRPC generated file"),
        (r"(?i)\.g\.dart$|_grpc_pb\.(js|ts)$", "generated gRPC stub"),
        // Python
        (r"(?i)(^|/)manage\.py$", "Django manage.py"),
        (r"(?i)(^|/)(wsgi|asgi)\.py$", "WSGI/ASGI entry module"),
        (r"(?i)(^|/)(views|models|urls|admin)\.py$", "Django app module"),
        (r"(?i)(^|/)(views|models|urls|admin)/", "Django app package"),
        (r"(?i)(^|/)test_\w+\.py$|_test\.py$", "Python test file"),
        (r"(?i)conftest\.py$", "pytest fixture module"),
        // Java/Kotlin
        (r"(?i)\w+Application\.(java|kt)$", "Spring Boot application class"),
        (r"(?i)\w+Test(s)?\.(java|kt)$", "Java/Kotlin test class"),
        (r"(?i)(^|/)package-info\.java$", "Java package-info annotation host"),
        // C#
        (r"(?i)(^|/)(Program|Startup)\.cs$", "C# application entry file"),
        (r"(?i)\w+Controller\.cs$", "ASP.NET controller"),
        // Go
        (r"(?i)(^|/)main\.go$", "Go main package entry"),
        // Rust
        (r"(?i)(^|/)(main|lib|mod)\.rs$", "Rust crate root"),
        (r"(?i)(^|/)(benches|examples|tests)/[^/]+\.rs$", "Rust benches/examples/tests entry"),
        // examples and demos
        (r"(?i)(^|/)(examples|demos|samples|playgrounds)/", "example/demo directory"),
        // plugin conventions
        (r"(?i)\.(plugin|node|credentials)\.[jt]s$", "plugin convention file"),
    ];
    rules
        .iter()
        .map(|(pat, reason)| (Regex::new(pat).unwrap(), *reason))
        .collect()
});

/// §4.4 rule 4 default decorator list.
const DI_DECORATORS: &[&str] = &[
    "Controller",
    "Module",
    "Injectable",
    "Service",
    "Resolver",
    "Get",
    "Post",
    "Put",
    "Delete",
    "Patch",
    "Entity",
    "Component",
    "Repository",
    "RestController",
    "Configuration",
    "SpringBootApplication",
    "ApplicationScoped",
    "RequestScoped",
    "SessionScoped",
    "Options",
    "ApiController",
    "Path",
    "WebServlet",
    "QuarkusMain",
    "Test",
    "ParameterizedTest",
    "SpringBootTest",
    "TargetClass",
    "Substitute",
];

/// §4.4 rule 5 default DI-container-access patterns, each with exactly one capture group holding
/// the referenced token/class name.
const DI_CONTAINER_PATTERNS: &[&str] = &[
    r#"(?i)\bcontainer\.(?:get|resolve)\(\s*['"]([\w./-]+)['"]"#,
    r#"(?i)\bcontainer\.(?:get|resolve)<[\w.]+>\(\s*['"]([\w./-]+)['"]"#,
    r#"@inject\(\s*['"]([\w./-]+)['"]\s*\)"#,
];

pub struct EntrypointConfig {
    pub dynamic_patterns: Vec<String>,
    pub dynamic_package_fields: Vec<String>,
    pub extra_di_decorators: Vec<String>,
}

impl Default for EntrypointConfig {
    fn default() -> Self {
        EntrypointConfig {
            dynamic_patterns: Vec::new(),
            dynamic_package_fields: vec![
                "nodes".into(),
                "plugins".into(),
                "credentials".into(),
                "extensions".into(),
                "adapters".into(),
                "connectors".into(),
            ],
            extra_di_decorators: Vec::new(),
        }
    }
}

/// Detect every entry point in the project per rules 1-19 of §4.4.
///
/// `files` is the project-relative path set from discovery (forward-slash normalised);
/// `parsed` maps the same paths to their parse results for DI-decorator scanning.
pub fn detect_entry_points(
    files: &[PathBuf],
    parsed: &HashMap<PathBuf, ParseResult>,
    probes: &ProbeOutput,
    config: &EntrypointConfig,
) -> Vec<EntryPoint> {
    let file_set: HashSet<&PathBuf> = files.iter().collect();
    let mut found: HashMap<PathBuf, EntryPoint> = HashMap::new();

    let mut push = |path: PathBuf, reason: String, source: EntryPointSource, is_dynamic: bool, confidence: f32| {
        if is_dead_path(&path) {
            return;
        }
        found
            .entry(path.clone())
            .and_modify(|e| {
                if confidence > e.confidence {
                    e.confidence = confidence;
                    e.reason = reason.clone();
                    e.source = source;
                }
            })
            .or_insert(EntryPoint { path, reason, source, is_dynamic, confidence });
    };

    // Rule 3: pattern catalogue.
    for path in files {
        let normalized = path.to_string_lossy().replace('\\', "/");
        for (pattern, reason) in ENTRY_PATTERNS.iter() {
            if pattern.is_match(&normalized) {
                push(path.clone(), reason.to_string(), EntryPointSource::Convention, false, 0.6);
                break;
            }
        }
    }

    // Rule 4, 18: DI decorators / Java annotations, read off parsed declarations.
    let di_list: HashSet<&str> = DI_DECORATORS
        .iter()
        .copied()
        .chain(config.extra_di_decorators.iter().map(|s| s.as_str()))
        .collect();
    for (path, result) in parsed {
        let has_di = result
            .declarations
            .iter()
            .any(|d| d.decorators.iter().any(|dec| di_list.contains(dec.name.as_str())));
        if has_di || result.metadata.is_spring_component || result.metadata.is_celery || result.metadata.is_fastapi_router || result.metadata.is_django {
            push(
                path.clone(),
                "DI decorator / framework annotation".to_string(),
                EntryPointSource::DiAnnotation,
                false,
                0.85,
            );
        }
    }

    // Rule 5: DI-container access (`Container.get('Token')`, `@inject('token')`). Needs the raw
    // source, which is still present at this stage -- it is only released after this phase runs.
    let container_patterns: Vec<Regex> = DI_CONTAINER_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .chain(config.di_container_patterns.iter().filter_map(|p| Regex::new(p).ok()))
        .collect();
    if !container_patterns.is_empty() {
        for result in parsed.values() {
            let Some(content) = &result.content else { continue };
            for pattern in &container_patterns {
                for captures in pattern.captures_iter(content) {
                    let Some(token) = captures.get(1) else { continue };
                    if let Some(resolved) = resolve_container_token(token.as_str(), files, &file_set) {
                        push(
                            resolved,
                            "DI container token reference".to_string(),
                            EntryPointSource::DiAnnotation,
                            true,
                            0.5,
                        );
                    }
                }
            }
        }
    }

    // Rules 6, 9, 10, 19 plus ad-hoc probe findings (bundler/CI/workspace/tsconfig): resolve
    // each probe candidate against the discovered file set, trying common extensions when the
    // literal path has none recorded.
    for candidate in &probes.entry_candidates {
        if let Some(resolved) = resolve_candidate(&candidate.path, &file_set) {
            push(
                resolved,
                candidate.reason.clone(),
                candidate.source,
                candidate.is_dynamic,
                candidate.confidence,
            );
        }
    }

    // Rule 2: nested workspace package main/module/types, gated on the package being "alive"
    // (depended on, has internal deps, is a framework app, or has a build script).
    for package in &probes.workspace_packages {
        if package.dir.is_empty() {
            continue;
        }
        let is_depended_on = probes
            .workspace_packages
            .iter()
            .any(|other| other.dir != package.dir && package.name.as_deref().is_some_and(|n| other.dependencies.iter().any(|d| d == n)));
        let has_internal_deps = package
            .dependencies
            .iter()
            .any(|dep| probes.workspace_packages.iter().any(|p| p.name.as_deref() == Some(dep.as_str())));
        let is_alive = is_depended_on || has_internal_deps || package.has_build_script;
        if !is_alive {
            continue;
        }
        for field_value in [&package.main, &package.module, &package.types] {
            if let Some(value) = field_value {
                let candidate_path = format!("{}/{}", package.dir, value.trim_start_matches("./"));
                if let Some(resolved) = resolve_candidate(&candidate_path, &file_set) {
                    push(resolved, "alive workspace package entry".to_string(), EntryPointSource::PackageJson, false, 0.75);
                }
            }
        }
    }

    // Rule 13: user-supplied dynamic glob patterns.
    if !config.dynamic_patterns.is_empty() {
        if let Ok(set) = build_globset(&config.dynamic_patterns) {
            for path in files {
                let normalized = path.to_string_lossy().replace('\\', "/");
                if set.is_match(&normalized) {
                    push(path.clone(), "dynamic load pattern".to_string(), EntryPointSource::Convention, true, 0.7);
                }
            }
        }
    }

    let mut result: Vec<EntryPoint> = found.into_values().collect();
    result.sort_by(|a, b| a.path.cmp(&b.path));
    result
}

fn is_dead_path(path: &Path) -> bool {
    let normalized = path.to_string_lossy().replace('\\', "/");
    DEAD_NAME_PATTERN.is_match(&format!("/{normalized}"))
}

const CANDIDATE_EXTENSIONS: &[&str] = &["", ".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".mts", ".cts", "/index.ts", "/index.js"];

fn resolve_candidate(raw: &str, file_set: &HashSet<&PathBuf>) -> Option<PathBuf> {
    let normalized = raw.trim_start_matches("./").replace('\\', "/");
    let direct = PathBuf::from(&normalized);
    if file_set.contains(&direct) {
        return Some(direct);
    }
    for ext in CANDIDATE_EXTENSIONS {
        let candidate = PathBuf::from(format!("{normalized}{ext}"));
        if file_set.contains(&candidate) {
            return Some(candidate);
        }
    }
    // build-directory-to-source mapping (§4.4 rule 6): dist/lib/build/out -> src
    for build_dir in ["dist/commonjs/", "dist/esm/", "dist/", "lib/", "build/", "out/"] {
        if let Some(rest) = normalized.strip_prefix(build_dir) {
            let src_candidate = format!("src/{rest}");
            if let Some(resolved) = resolve_candidate(&src_candidate, file_set) {
                return Some(resolved);
            }
        }
    }
    None
}

/// Resolve a DI-container token to a project file: tries it as a literal relative path first
/// (covers `Container.get('./plugins/foo')`-style tokens), then falls back to a normalised
/// filename-stem match (covers `Container.get('UserService')` naming the class, not the path).
fn resolve_container_token(token: &str, files: &[PathBuf], file_set: &HashSet<&PathBuf>) -> Option<PathBuf> {
    if let Some(resolved) = resolve_candidate(token, file_set) {
        return Some(resolved);
    }
    let normalized_token = normalize_token(token);
    files
        .iter()
        .find(|path| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| normalize_token(stem) == normalized_token)
        })
        .cloned()
}

fn normalize_token(s: &str) -> String {
    s.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_ascii_lowercase()
}

fn build_globset(patterns: &[String]) -> Result<globset::GlobSet, globset::Error> {
    let mut builder = globset::GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(globset::Glob::new(pattern)?);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Declaration;

    fn files(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn matches_common_entry_filenames() {
        let fs = files(&["src/index.ts", "src/util.ts"]);
        let parsed = HashMap::new();
        let probes = ProbeOutput::default();
        let entries = detect_entry_points(&fs, &parsed, &probes, &EntrypointConfig::default());
        assert!(entries.iter().any(|e| e.path == PathBuf::from("src/index.ts")));
        assert!(!entries.iter().any(|e| e.path == PathBuf::from("src/util.ts")));
    }

    #[test]
    fn dead_named_files_never_become_entries() {
        let fs = files(&["src/legacy-index.ts"]);
        let parsed = HashMap::new();
        let probes = ProbeOutput::default();
        let entries = detect_entry_points(&fs, &parsed, &probes, &EntrypointConfig::default());
        assert!(entries.is_empty());
    }

    #[test]
    fn di_container_token_reference_promotes_file_to_entry() {
        let fs = files(&["src/user-service.ts", "src/main.ts"]);
        let mut parsed = HashMap::new();
        let mut main = ParseResult::empty();
        main.content = Some("const svc = Container.get('UserService');".to_string());
        parsed.insert(PathBuf::from("src/main.ts"), main);
        parsed.insert(PathBuf::from("src/user-service.ts"), ParseResult::empty());
        let probes = ProbeOutput::default();
        let entries = detect_entry_points(&fs, &parsed, &probes, &EntrypointConfig::default());
        assert!(entries.iter().any(|e| e.path == PathBuf::from("src/user-service.ts")));
    }

    #[test]
    fn di_decorator_promotes_file_to_entry() {
        let fs = files(&["src/widget.service.ts"]);
        let mut parsed = HashMap::new();
        let mut result = ParseResult::empty();
        result.declarations.push(Declaration {
            name: "WidgetService".to_string(),
            is_class_like: true,
            decorators: vec![crate::model::Decorator { name: "Injectable".to_string(), arguments: vec![] }],
            line: 1,
        });
        parsed.insert(PathBuf::from("src/widget.service.ts"), result);
        let probes = ProbeOutput::default();
        let entries = detect_entry_points(&fs, &parsed, &probes, &EntrypointConfig::default());
        assert!(entries.iter().any(|e| e.source == EntryPointSource::DiAnnotation));
    }
}
