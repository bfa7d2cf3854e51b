//! Rust source parsing (§4.2).
//!
//! Regex-driven over raw source, matching the teacher's own Rust analyzer rather than pulling in
//! `syn` -- dead-file detection only needs `use`/`mod` declarations and `pub` item names, not a
//! full parse tree.

use regex::Regex;
use std::sync::OnceLock;

use crate::model::{Export, ExportKind, Import, ImportKind, ParseMetadata, ParseResult, RustModDecl};

fn use_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?m)^\s*(?:pub\s*(?:\([^)]*\))?\s+)?use\s+([^;]+);"#).expect("valid regex"))
}

/// `mod X;` declarations, with an optional preceding `#[path = "..."]` attribute captured in
/// the same match (group 1 = path override, group 2 = module name) -- the attribute sits on its
/// own line directly above the `mod` item, never inside the `mod X;` text itself.
fn mod_decl_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?m)^\s*(?:#\[path\s*=\s*"([^"]+)"\]\s*\r?\n\s*)?(?:pub(?:\([^)]*\))?\s+)?mod\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*;"#,
        )
        .expect("valid regex")
    })
}

fn pub_item_regex(kind: &str) -> Regex {
    let modifiers =
        if kind == "fn" { r"(?:(?:async|const|unsafe)\s+)*" } else { r"(?:(?:async|unsafe)\s+)*" };
    Regex::new(&format!(r"(?m)^\s*pub\s*(?:\([^)]*\)\s*)?{modifiers}{kind}\s+([A-Za-z0-9_]+)"))
        .expect("valid regex")
}

fn pub_decl_regexes() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        vec![
            pub_item_regex("fn"),
            pub_item_regex("struct"),
            pub_item_regex("enum"),
            pub_item_regex("trait"),
            pub_item_regex("type"),
            pub_item_regex("union"),
        ]
    })
}

/// Parse a single `.rs` source file.
pub fn parse(content: &str, file_name: &str) -> ParseResult {
    let mut imports = Vec::new();
    let mut exports = Vec::new();

    for caps in use_regex().captures_iter(content) {
        let Some(path_match) = caps.get(1) else { continue };
        let line = content[..path_match.start()].bytes().filter(|b| *b == b'\n').count() + 1;
        let raw = path_match.as_str().trim();
        let is_pub = caps.get(0).map(|m| m.as_str().trim_start().starts_with("pub")).unwrap_or(false);

        for (use_path, brace_names) in expand_use_braces(raw) {
            let mut import = Import::new(use_path, ImportKind::Normal, line);
            import.is_glob = import.module.ends_with("::*");
            if is_pub && !brace_names.is_empty() {
                for (original, exported) in &brace_names {
                    exports.push(Export::reexport(exported.clone(), import.module.clone(), line));
                    let _ = original;
                }
            }
            imports.push(import);
        }
    }

    for regex in pub_decl_regexes() {
        for caps in regex.captures_iter(content) {
            let Some(name_match) = caps.get(1) else { continue };
            let line = content[..name_match.start()].bytes().filter(|b| *b == b'\n').count() + 1;
            exports.push(Export::new(name_match.as_str().to_string(), ExportKind::Function, line));
        }
    }

    let mut rust_mod_declarations = Vec::new();
    for caps in mod_decl_regex().captures_iter(content) {
        let Some(name_match) = caps.get(2) else { continue };
        let path_override = caps.get(1).map(|m| m.as_str().to_string());
        rust_mod_declarations.push(RustModDecl { name: name_match.as_str().to_string(), path_override });
    }

    let is_lib_or_main = file_name == "lib.rs" || file_name == "main.rs";
    let has_main_function = content.lines().any(|l| {
        let t = l.trim_start();
        t.starts_with("fn main(") || t.starts_with("pub fn main(") || t.starts_with("async fn main(")
    });

    let metadata = ParseMetadata {
        rust_mod_declarations,
        rust_is_lib_or_main: is_lib_or_main,
        has_main_function,
        ..Default::default()
    };

    ParseResult { imports, exports, declarations: Vec::new(), metadata, content: Some(content.to_string()) }
}

/// Expand `use foo::{Bar, Baz as Qux};` into one `(module, [(original, exported)])` pair per
/// brace member, or a single pair for a non-brace `use foo::bar;`.
fn expand_use_braces(raw: &str) -> Vec<(String, Vec<(String, String)>)> {
    let raw = raw.replace(char::is_whitespace, "");
    let Some(brace_start) = raw.find('{') else {
        return vec![(raw, Vec::new())];
    };
    let Some(brace_end) = raw.rfind('}') else {
        return vec![(raw, Vec::new())];
    };
    let prefix = &raw[..brace_start];
    let prefix = prefix.strip_suffix("::").unwrap_or(prefix);
    let body = &raw[brace_start + 1..brace_end];

    let mut names = Vec::new();
    for part in body.split(',') {
        let part = part.trim();
        if part.is_empty() || part == "self" {
            continue;
        }
        let (original, exported) = match part.split_once("as") {
            Some((lhs, rhs)) => (lhs.to_string(), rhs.to_string()),
            None => (part.to_string(), part.to_string()),
        };
        names.push((original, exported));
    }

    vec![(prefix.to_string(), names)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_use_statement_and_brace_list() {
        let result = parse("use std::collections::{HashMap, HashSet as Set};\n", "lib.rs");
        assert!(result.imports.iter().any(|i| i.module == "std::collections"));
    }

    #[test]
    fn pub_use_brace_list_creates_reexports() {
        let result = parse("pub use crate::model::{File, Import as ImportEntry};\n", "lib.rs");
        assert!(result.exports.iter().any(|e| e.name == "File" && e.is_reexport()));
        assert!(result.exports.iter().any(|e| e.name == "ImportEntry" && e.is_reexport()));
    }

    #[test]
    fn parses_mod_declarations_and_path_override() {
        let result = parse("mod foo;\n#[path = \"bar_impl.rs\"]\nmod bar;\n", "lib.rs");
        assert_eq!(result.metadata.rust_mod_declarations.len(), 2);
        let bar = result.metadata.rust_mod_declarations.iter().find(|m| m.name == "bar").unwrap();
        assert_eq!(bar.path_override.as_deref(), Some("bar_impl.rs"));
    }

    #[test]
    fn detects_pub_fn_and_struct_exports() {
        let result = parse("pub fn run() {}\npub struct Config;\nfn private_helper() {}\n", "lib.rs");
        let names: Vec<_> = result.exports.iter().map(|e| e.name.clone()).collect();
        assert!(names.contains(&"run".to_string()));
        assert!(names.contains(&"Config".to_string()));
        assert!(!names.contains(&"private_helper".to_string()));
    }

    #[test]
    fn detects_main_entry() {
        let result = parse("fn main() {}\n", "main.rs");
        assert!(result.metadata.has_main_function);
        assert!(result.metadata.rust_is_lib_or_main);
    }
}
