//! Go source parsing (§4.2).
//!
//! Lightweight line-oriented heuristics, no full parser -- good enough for dependency tracking
//! and dead-export detection. Exported-ness follows Go's own convention: a leading uppercase
//! letter in an identifier makes it part of the package's public API.

use std::collections::HashSet;

use crate::model::{Export, ExportKind, Import, ImportKind, ParseMetadata, ParseResult};

pub fn parse(content: &str, file_name: &str) -> ParseResult {
    let imports = parse_imports(content);
    let exports = parse_exports(content);
    let package_name = parse_package_name(content);
    let has_main_function = content.contains("\nfunc main(") || content.starts_with("func main(");
    let has_init_function = content.contains("\nfunc init(") || content.starts_with("func init(");
    let is_test_file = file_name.ends_with("_test.go");

    let metadata = ParseMetadata {
        go_package_name: package_name.clone(),
        is_main_package: package_name.as_deref() == Some("main"),
        has_main_function,
        has_init_function,
        is_test_file,
        ..Default::default()
    };

    ParseResult { imports, exports, declarations: Vec::new(), metadata, content: Some(content.to_string()) }
}

fn parse_package_name(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("package "))
        .and_then(|l| l.strip_prefix("package "))
        .map(|s| s.trim().to_string())
}

fn parse_imports(content: &str) -> Vec<Import> {
    let mut imports: Vec<Import> = Vec::new();
    let mut in_block = false;

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        let line_num = idx + 1;

        if trimmed.starts_with("import (") || trimmed == "import(" {
            in_block = true;
            continue;
        }

        if in_block {
            if trimmed.starts_with(')') {
                in_block = false;
                continue;
            }
            if let Some(path) = extract_import_path(trimmed) {
                push_import(&mut imports, path, line_num);
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("import ") {
            if let Some(path) = extract_import_path(rest.trim()) {
                push_import(&mut imports, path, line_num);
            }
        }
    }

    imports
}

fn extract_import_path(segment: &str) -> Option<String> {
    let quote_start = segment.find(['"', '`'])?;
    let quote = segment.as_bytes()[quote_start];
    let tail = &segment[quote_start + 1..];
    let path_end = tail.find(quote as char)?;
    let path = tail[..path_end].trim();
    if path.is_empty() { None } else { Some(path.to_string()) }
}

fn push_import(imports: &mut Vec<Import>, path: String, line: usize) {
    if imports.iter().any(|i| i.module == path) {
        return;
    }
    imports.push(Import::new(path, ImportKind::Normal, line));
}

fn parse_exports(content: &str) -> Vec<Export> {
    let mut exports = Vec::new();
    let mut const_block = false;
    let mut var_block = false;
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        let line_num = idx + 1;

        if let Some(name) = parse_func_name(trimmed) {
            if is_exported(&name) && seen.insert(format!("fn:{name}")) {
                exports.push(Export::new(name, ExportKind::Function, line_num));
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("type ") {
            if let Some(name) = rest.split_whitespace().next() {
                if is_exported(name) && seen.insert(format!("type:{name}")) {
                    exports.push(Export::new(name.to_string(), ExportKind::Type, line_num));
                }
            }
            continue;
        }

        if trimmed.starts_with("const (") {
            const_block = true;
            continue;
        }
        if trimmed.starts_with("var (") {
            var_block = true;
            continue;
        }
        if const_block && trimmed.starts_with(')') {
            const_block = false;
            continue;
        }
        if var_block && trimmed.starts_with(')') {
            var_block = false;
            continue;
        }

        if const_block || var_block {
            for name in parse_const_var_names(trimmed) {
                if is_exported(&name) && seen.insert(format!("var:{name}")) {
                    exports.push(Export::new(name, ExportKind::Variable, line_num));
                }
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("const ") {
            for name in parse_const_var_names(rest.trim()) {
                if is_exported(&name) && seen.insert(format!("var:{name}")) {
                    exports.push(Export::new(name, ExportKind::Variable, line_num));
                }
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("var ") {
            for name in parse_const_var_names(rest.trim()) {
                if is_exported(&name) && seen.insert(format!("var:{name}")) {
                    exports.push(Export::new(name, ExportKind::Variable, line_num));
                }
            }
        }
    }

    exports
}

fn parse_func_name(line: &str) -> Option<String> {
    let after = line.strip_prefix("func ")?.trim_start();
    let without_receiver = if after.starts_with('(') {
        after.split_once(')')?.1.trim_start()
    } else {
        after
    };
    without_receiver
        .split(|c: char| c.is_whitespace() || c == '(')
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_const_var_names(segment: &str) -> Vec<String> {
    let lhs = segment.split('=').next().unwrap_or(segment);
    lhs.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_imports_exports_and_package() {
        let src = r#"
package main

import (
    "fmt"
    util "example.com/util"
)

const Version = "1.0"

type Server struct{}
func (s *Server) Serve() {}
func helper() {}
func Public() {}

func main() {
    Server{}
    Public()
    fmt.Println(util.Foo())
}
"#;
        let result = parse(src, "main.go");
        let modules: Vec<_> = result.imports.iter().map(|i| i.module.clone()).collect();
        assert!(modules.contains(&"fmt".to_string()));
        assert!(modules.contains(&"example.com/util".to_string()));

        let names: Vec<_> = result.exports.iter().map(|e| e.name.clone()).collect();
        assert!(names.contains(&"Version".to_string()));
        assert!(names.contains(&"Server".to_string()));
        assert!(names.contains(&"Serve".to_string()));
        assert!(names.contains(&"Public".to_string()));
        assert!(!names.contains(&"helper".to_string()));

        assert_eq!(result.metadata.go_package_name.as_deref(), Some("main"));
        assert!(result.metadata.is_main_package);
        assert!(result.metadata.has_main_function);
    }

    #[test]
    fn detects_init_function_and_test_file() {
        let result = parse("package util\n\nfunc init() {}\n", "util_test.go");
        assert!(result.metadata.has_init_function);
        assert!(result.metadata.is_test_file);
        assert!(!parse("package util\n", "util.go").metadata.is_test_file);
    }

    #[test]
    fn single_line_import_is_recognised() {
        let result = parse("package util\n\nimport \"strings\"\n", "util.go");
        assert!(result.imports.iter().any(|i| i.module == "strings"));
        assert!(!result.metadata.is_main_package);
    }
}
