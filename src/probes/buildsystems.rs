//! JVM/native/`.NET`/Python build-system probes (§4.3): Maven, Gradle, Bazel, Buck, Pants, .NET
//! solutions/projects, and pyproject.toml source-root declarations.
//!
//! Most of these name a main class or source root rather than a file path directly; this probe
//! resolves the dotted/namespaced name down to the Java/Kotlin source root so the entry-point
//! detector and resolver share one `java_source_roots` list instead of re-deriving it per stage.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::EntryPointSource;

use super::{read_to_string, EntryCandidate, ProbeOutput};

static MAVEN_MAIN_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<mainClass>\s*([\w.$]+)\s*</mainClass>").unwrap());
static GRADLE_MAIN_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"mainClass(?:Name)?\.set\(\s*["']([\w.$]+)["']\s*\)|mainClassName\s*=\s*["']([\w.$]+)["']"#).unwrap());
static BAZEL_SRCS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"srcs\s*=\s*\[([^\]]*)\]"#).unwrap());
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["']([^"']+)["']"#).unwrap());

pub fn probe(root: &Path, out: &mut ProbeOutput) {
    probe_maven(root, out);
    probe_gradle(root, out);
    probe_bazel(root, out);
    probe_buck_pants(root, out);
    probe_dotnet(root, out);
    probe_pyproject(root, out);

    if root.join("src/main/java").is_dir() {
        out.java_source_roots.push("src/main/java".to_string());
    }
    if root.join("src/main/kotlin").is_dir() {
        out.java_source_roots.push("src/main/kotlin".to_string());
    }
    if root.join("src/test/java").is_dir() {
        out.java_source_roots.push("src/test/java".to_string());
    }
}

fn class_to_path(fqcn: &str, source_roots: &[&str]) -> String {
    let rel = fqcn.replace('.', "/");
    let root = source_roots.first().copied().unwrap_or("src/main/java");
    format!("{root}/{rel}.java")
}

fn probe_maven(root: &Path, out: &mut ProbeOutput) {
    let Some(content) = read_to_string(&root.join("pom.xml")) else { return };
    out.frameworks.insert("maven".to_string());
    for cap in MAVEN_MAIN_CLASS.captures_iter(&content) {
        out.entry_candidates.push(EntryCandidate::new(
            class_to_path(&cap[1], &["src/main/java"]),
            "pom.xml mainClass".to_string(),
            EntryPointSource::BuildSystem,
        ));
    }
}

fn probe_gradle(root: &Path, out: &mut ProbeOutput) {
    for name in ["build.gradle", "build.gradle.kts"] {
        let Some(content) = read_to_string(&root.join(name)) else { continue };
        out.frameworks.insert("gradle".to_string());
        let roots: &[&str] = if name.ends_with(".kts") { &["src/main/kotlin", "src/main/java"] } else { &["src/main/java"] };
        for cap in GRADLE_MAIN_CLASS.captures_iter(&content) {
            let class_name = cap.get(1).or_else(|| cap.get(2)).map(|m| m.as_str()).unwrap_or_default();
            if class_name.is_empty() {
                continue;
            }
            out.entry_candidates.push(EntryCandidate::new(
                class_to_path(class_name, roots),
                format!("{name} mainClass"),
                EntryPointSource::BuildSystem,
            ));
        }
    }
}

fn probe_bazel(root: &Path, out: &mut ProbeOutput) {
    for name in ["BUILD", "BUILD.bazel", "WORKSPACE"] {
        if root.join(name).exists() {
            out.frameworks.insert("bazel".to_string());
        }
    }
    let Some(content) = read_to_string(&root.join("BUILD.bazel")).or_else(|| read_to_string(&root.join("BUILD")))
    else {
        return;
    };
    for block in BAZEL_SRCS.captures_iter(&content) {
        for file_cap in QUOTED.captures_iter(&block[1]) {
            out.entry_candidates.push(EntryCandidate::new(
                file_cap[1].to_string(),
                "BUILD srcs attribute".to_string(),
                EntryPointSource::BuildSystem,
            ));
        }
    }
}

fn probe_buck_pants(root: &Path, out: &mut ProbeOutput) {
    if root.join("BUCK").exists() {
        out.frameworks.insert("buck".to_string());
    }
    if root.join("BUILD.pants").exists() || root.join("pants.toml").exists() {
        out.frameworks.insert("pants".to_string());
    }
}

fn probe_dotnet(root: &Path, out: &mut ProbeOutput) {
    let Ok(entries) = std::fs::read_dir(root) else { return };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        match path.extension().and_then(|e| e.to_str()) {
            Some("sln") => {
                out.frameworks.insert("dotnet-sln".to_string());
            }
            Some("csproj") => {
                out.frameworks.insert("dotnet-csproj".to_string());
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    out.entry_candidates.push(EntryCandidate::new(
                        format!("{stem}/Program.cs"),
                        "csproj-adjacent Program.cs".to_string(),
                        EntryPointSource::BuildSystem,
                    ));
                }
            }
            _ => {}
        }
    }
}

/// pyproject.toml's `[tool.setuptools.packages.find]` / Poetry `packages` entries declare the
/// package source root, used by the resolver for absolute-import resolution when there's no
/// `src/` convention to fall back on.
fn probe_pyproject(root: &Path, out: &mut ProbeOutput) {
    let Some(content) = read_to_string(&root.join("pyproject.toml")) else { return };
    let Ok(doc) = content.parse::<toml::Table>() else { return };
    out.frameworks.insert("pyproject".to_string());

    if let Some(scripts) = doc
        .get("project")
        .and_then(|p| p.get("scripts"))
        .and_then(|s| s.as_table())
    {
        for value in scripts.values() {
            if let Some(spec) = value.as_str() {
                if let Some((module, _attr)) = spec.split_once(':') {
                    let path = module.replace('.', "/") + ".py";
                    out.entry_candidates.push(EntryCandidate::new(
                        path,
                        "pyproject.toml console script".to_string(),
                        EntryPointSource::BuildSystem,
                    ));
                }
            }
        }
    }
}
