//! File discovery (§4.1).
//!
//! Recursively enumerates the project tree subject to a default exclusion list plus
//! user-supplied glob patterns. `.gitignore` is intentionally *not* consulted -- only the
//! explicit exclusion list applies, per the specification. `.gitmodules` is read if present and
//! every declared submodule path is appended to the exclusion list.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{File, Language};

/// Directory names skipped unconditionally, regardless of user config -- version-control
/// metadata, package-install directories, build outputs, caches, and IDE metadata.
const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    ".venv",
    "venv",
    "__pycache__",
    ".tox",
    "vendor",
    "dist",
    "build",
    "out",
    ".next",
    ".nuxt",
    ".cache",
    "coverage",
    ".idea",
    ".vscode",
    "bin/Debug",
    "bin/Release",
    "obj",
    ".gradle",
    ".mvn",
];

/// Glob patterns excluded by default -- generated protobuf, test-fixture/baseline directories,
/// binary/media files, log files.
fn default_exclude_globs() -> Vec<&'static str> {
    vec![
        "**/*.pb.go",
        "**/*.pb.cs",
        "**/*_pb2.py",
        "**/*.min.js",
        "**/*.map",
        "**/*.log",
        "**/*.lock",
        "**/testdata/**",
        "**/__snapshots__/**",
        "**/fixtures/baseline*/**",
    ]
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Extra glob patterns appended to the defaults (from config `exclude` / CLI `--exclude`).
    pub extra_excludes: Vec<String>,
    pub max_depth: Option<usize>,
    pub show_hidden: bool,
}

fn build_exclude_set(opts: &DiscoveryOptions) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in default_exclude_globs() {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    for pattern in &opts.extra_excludes {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|_| GlobSetBuilder::new().build().expect("empty globset"))
}

/// Parse `.gitmodules`, returning every declared submodule `path = ...` entry.
fn read_gitmodules_paths(root: &Path) -> Vec<PathBuf> {
    let path = root.join(".gitmodules");
    let Ok(content) = fs::read_to_string(&path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            trimmed
                .strip_prefix("path")
                .map(|rest| rest.trim_start_matches([' ', '=']).trim().to_string())
        })
        .filter(|p| !p.is_empty())
        .map(|p| root.join(p))
        .collect()
}

fn is_allowed_hidden(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower == ".env" || lower.starts_with(".env.") || lower == ".example"
}

/// Walk `root`, returning every discovered [`File`] in sorted order.
pub fn gather_files(root: &Path, opts: &DiscoveryOptions) -> std::io::Result<Vec<File>> {
    let exclude_set = build_exclude_set(opts);
    let submodule_paths: Vec<PathBuf> = read_gitmodules_paths(root)
        .into_iter()
        .filter_map(|p| p.canonicalize().ok())
        .collect();

    let mut files = Vec::new();
    let mut visited = HashSet::new();
    walk(root, root, &exclude_set, &submodule_paths, opts, 0, &mut visited, &mut files)?;
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

#[allow(clippy::too_many_arguments)]
fn walk(
    root: &Path,
    dir: &Path,
    exclude_set: &GlobSet,
    submodule_paths: &[PathBuf],
    opts: &DiscoveryOptions,
    depth: usize,
    visited: &mut HashSet<PathBuf>,
    files: &mut Vec<File>,
) -> std::io::Result<()> {
    let dir_canon = match dir.canonicalize() {
        Ok(p) => p,
        Err(_) => return Ok(()),
    };
    if !visited.insert(dir_canon.clone()) {
        return Ok(());
    }
    if submodule_paths.iter().any(|s| s == &dir_canon) {
        return Ok(());
    }

    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(Result::ok).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name();
        let name_str = name.to_string_lossy();

        if DEFAULT_EXCLUDED_DIRS.contains(&name_str.as_ref()) {
            continue;
        }
        let is_hidden = name_str.starts_with('.');
        if is_hidden && !opts.show_hidden && !is_allowed_hidden(&name_str) && name_str != ".gitmodules" {
            continue;
        }

        let rel = path.strip_prefix(root).unwrap_or(&path);
        if exclude_set.is_match(rel) {
            continue;
        }

        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if file_type.is_symlink() {
            let Ok(target) = fs::canonicalize(&path) else { continue };
            if visited.contains(&target) {
                continue;
            }
            let Ok(meta) = fs::metadata(&path) else { continue };
            if meta.is_dir() {
                if opts.max_depth.is_none_or(|max| depth < max) {
                    walk(root, &target, exclude_set, submodule_paths, opts, depth + 1, visited, files)?;
                }
            } else if meta.is_file() {
                push_file(root, &target, &meta, files);
            }
            continue;
        }

        if path.is_file() {
            if let Ok(meta) = entry.metadata() {
                push_file(root, &path, &meta, files);
            }
            continue;
        }
        if path.is_dir() && opts.max_depth.is_none_or(|max| depth < max) {
            walk(root, &path, exclude_set, submodule_paths, opts, depth + 1, visited, files)?;
        }
    }

    Ok(())
}

fn push_file(root: &Path, path: &Path, meta: &fs::Metadata, files: &mut Vec<File>) {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let language = Language::from_extension(ext);
    let lines = count_lines(path).unwrap_or(0);
    files.push(File {
        path: path.strip_prefix(root).unwrap_or(path).to_path_buf(),
        size: meta.len(),
        lines,
        language,
        mtime: meta.modified().ok(),
    });
}

fn count_lines(path: &Path) -> Option<usize> {
    let content = fs::read_to_string(path).ok()?;
    Some(content.lines().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_files_skips_default_excluded_dirs() {
        let tmp = tempfile::tempdir().expect("tmp dir");
        let root = tmp.path();
        std::fs::create_dir_all(root.join("node_modules")).unwrap();
        std::fs::write(root.join("node_modules/pkg.js"), "module.exports = {}").unwrap();
        std::fs::write(root.join("main.ts"), "export const x = 1;\n").unwrap();

        let files = gather_files(root, &DiscoveryOptions::default()).expect("gather");
        let names: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert!(names.contains(&PathBuf::from("main.ts")));
        assert!(!names.iter().any(|p| p.to_string_lossy().contains("node_modules")));
    }

    #[test]
    fn gather_files_respects_extra_excludes() {
        let tmp = tempfile::tempdir().expect("tmp dir");
        let root = tmp.path();
        std::fs::write(root.join("keep.ts"), "export const a = 1;\n").unwrap();
        std::fs::create_dir_all(root.join("legacy")).unwrap();
        std::fs::write(root.join("legacy/old.ts"), "export const b = 1;\n").unwrap();

        let opts = DiscoveryOptions { extra_excludes: vec!["legacy/**".to_string()], ..Default::default() };
        let files = gather_files(root, &opts).expect("gather");
        let names: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert!(names.contains(&PathBuf::from("keep.ts")));
        assert!(!names.iter().any(|p| p.to_string_lossy().contains("legacy")));
    }

    #[test]
    fn gitmodules_paths_are_excluded() {
        let tmp = tempfile::tempdir().expect("tmp dir");
        let root = tmp.path();
        std::fs::write(
            root.join(".gitmodules"),
            "[submodule \"vendor/lib\"]\n\tpath = vendor/lib\n\turl = https://example.com/lib.git\n",
        )
        .unwrap();
        std::fs::create_dir_all(root.join("vendor/lib")).unwrap();
        std::fs::write(root.join("vendor/lib/thing.go"), "package lib\n").unwrap();
        std::fs::write(root.join("main.go"), "package main\n").unwrap();

        let files = gather_files(root, &DiscoveryOptions::default()).expect("gather");
        let names: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert!(names.contains(&PathBuf::from("main.go")));
        assert!(!names.iter().any(|p| p.to_string_lossy().contains("vendor")));
    }

    #[test]
    fn language_tagging_by_extension() {
        let tmp = tempfile::tempdir().expect("tmp dir");
        let root = tmp.path();
        std::fs::write(root.join("a.py"), "x = 1\n").unwrap();
        std::fs::write(root.join("b.rs"), "fn main() {}\n").unwrap();

        let files = gather_files(root, &DiscoveryOptions::default()).expect("gather");
        let py = files.iter().find(|f| f.path == PathBuf::from("a.py")).unwrap();
        let rs = files.iter().find(|f| f.path == PathBuf::from("b.rs")).unwrap();
        assert_eq!(py.language, Language::Python);
        assert_eq!(rs.language, Language::Rust);
    }
}
