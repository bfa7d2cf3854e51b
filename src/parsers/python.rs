//! Python source parsing (§4.2).
//!
//! Line-oriented, not AST-based -- the teacher's own Python analyzer takes the same approach
//! (a single pass over `content.lines()` with a small amount of indent/docstring/`TYPE_CHECKING`
//! state), and a regex/line scan is adequate for import and top-level-declaration extraction
//! without pulling in a full Python grammar.

use regex::Regex;
use std::sync::OnceLock;

use crate::model::{
    Declaration, Decorator, Export, ExportKind, Import, ImportKind, ImportSymbol, ParseMetadata,
    ParseResult,
};

fn all_list_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)__all__\s*=\s*\[(.*?)\]").expect("valid regex"))
}

/// Django base classes whose presence in a class's parenthesised bases marks the containing
/// file framework-relevant (§4.2: "Django base-class matches").
const DJANGO_BASE_CLASSES: &[&str] =
    &["models.Model", "View", "ViewSet", "ModelAdmin", "Form", "Model"];

/// Decorator name fragments that mark a function as a Celery task (§4.2: "isCelery").
const CELERY_DECORATORS: &[&str] = &["task", "shared_task", "celery.task", "celery.shared_task"];

/// FastAPI router decorator fragments (`@router.get(...)`, `@app.post(...)`, ...).
const FASTAPI_ROUTE_METHODS: &[&str] =
    &[".get(", ".post(", ".put(", ".delete(", ".patch(", ".options(", ".head("];

/// Parse a `.py`/`.pyi` source file.
pub fn parse(content: &str, file_name: &str) -> ParseResult {
    let is_init = file_name == "__init__.py";

    let mut imports = Vec::new();
    let mut exports = Vec::new();
    let mut declarations = Vec::new();
    let mut type_check_stack: Vec<usize> = Vec::new();
    let mut in_docstring = false;
    let mut has_getattr_lazy_loader = false;
    let mut has_main_block = false;
    let mut is_celery = false;
    let mut is_django = false;
    let mut is_fastapi_router = false;
    let mut pending_decorators: Vec<Decorator> = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_num = idx + 1;
        let leading = line.trim_start();

        if in_docstring {
            if leading.contains("\"\"\"") || leading.contains("'''") {
                in_docstring = false;
            }
            continue;
        }
        if leading.starts_with("\"\"\"") || leading.starts_with("'''") {
            let occurrences =
                leading.matches("\"\"\"").count() + leading.matches("'''").count();
            if occurrences < 2 {
                in_docstring = true;
            }
            continue;
        }

        let without_comment = line.split('#').next().unwrap_or("").trim_end();
        let indent = without_comment.chars().take_while(|c| c.is_whitespace()).count();
        if !without_comment.trim().is_empty() {
            while let Some(level) = type_check_stack.last() {
                if indent < *level {
                    type_check_stack.pop();
                } else {
                    break;
                }
            }
        }

        let trimmed = without_comment.trim_start();

        if let Some(body) = trimmed.strip_prefix("if ").and_then(|rest| rest.strip_suffix(':')) {
            if body.contains("TYPE_CHECKING") {
                type_check_stack.push(indent + 1);
            }
            if body.contains("__name__") && body.contains("__main__") {
                has_main_block = true;
            }
            continue;
        }
        let in_type_checking = !type_check_stack.is_empty();

        if let Some(rest) = trimmed.strip_prefix('@') {
            let (name, args) = match rest.split_once('(') {
                Some((lhs, rhs)) => {
                    let arg_str = rhs.strip_suffix(')').unwrap_or(rhs);
                    (lhs.trim(), vec![arg_str.trim().to_string()])
                }
                None => (rest.trim(), Vec::new()),
            };
            if CELERY_DECORATORS.iter().any(|c| name == *c || name.ends_with(c)) {
                is_celery = true;
            }
            if FASTAPI_ROUTE_METHODS.iter().any(|m| trimmed.contains(m)) {
                is_fastapi_router = true;
            }
            pending_decorators.push(Decorator { name: name.to_string(), arguments: args });
            continue;
        }

        if trimmed.contains("def __getattr__") {
            has_getattr_lazy_loader = true;
        }

        if let Some(rest) = trimmed.strip_prefix("import ") {
            for part in rest.split(',') {
                let mut name = part.trim();
                if let Some((lhs, _)) = name.split_once(" as ") {
                    name = lhs.trim();
                }
                if name.is_empty() {
                    continue;
                }
                let mut import = Import::new(name.to_string(), ImportKind::Static, line_num);
                import.is_type_only = in_type_checking;
                imports.push(import);
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("from ") {
            if let Some((module, names_raw)) = rest.split_once(" import ") {
                let module = module.trim();
                let names_clean = names_raw.trim().trim_matches('(').trim_matches(')');
                let names_clean = names_clean.split('#').next().unwrap_or("").trim();
                if module.is_empty() {
                    continue;
                }

                let mut import = Import::new(module.to_string(), ImportKind::From, line_num);
                import.is_type_only = in_type_checking;
                import.is_glob = names_clean == "*";

                if names_clean != "*" {
                    for sym in names_clean.split(',') {
                        let sym = sym.trim();
                        if sym.is_empty() {
                            continue;
                        }
                        let (name, alias) = match sym.split_once(" as ") {
                            Some((lhs, rhs)) => (lhs.trim(), Some(rhs.trim().to_string())),
                            None => (sym, None),
                        };
                        import.symbols.push(ImportSymbol {
                            name: name.to_string(),
                            alias,
                            is_default: false,
                        });
                    }

                    // `__init__.py` re-export convention: `from .mod import Foo as Bar` at module
                    // scope is treated as a re-export rather than a fresh local definition, to
                    // avoid dead-export false positives on package roots (§9).
                    if is_init && indent == 0 {
                        for symbol in &import.symbols {
                            let exported = symbol.alias.as_deref().unwrap_or(&symbol.name);
                            if exported.is_empty() || exported.starts_with('_') {
                                continue;
                            }
                            exports.push(Export::reexport(exported, module.to_string(), line_num));
                        }
                    }
                } else {
                    // `from .mod import *` with an unknown `__all__` conservatively marks the
                    // whole module as consumed via the ALL sentinel at the resolver/reachability
                    // stage rather than here -- this parser just records the glob import.
                }

                imports.push(import);
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("class ") {
            if indent == 0 {
                let header = rest.split(':').next().unwrap_or("").trim();
                let (name, bases) = match header.split_once('(') {
                    Some((n, b)) => (n.trim(), b.trim_end_matches(')')),
                    None => (header, ""),
                };
                if bases.split(',').any(|b| DJANGO_BASE_CLASSES.contains(&b.trim())) {
                    is_django = true;
                }
                if !name.is_empty() && !name.starts_with('_') {
                    exports.push(Export::new(name.to_string(), ExportKind::Class, line_num));
                }
                if !name.is_empty() {
                    declarations.push(Declaration {
                        name: name.to_string(),
                        is_class_like: true,
                        decorators: std::mem::take(&mut pending_decorators),
                        line: line_num,
                    });
                }
            }
            pending_decorators.clear();
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("def ").or_else(|| trimmed.strip_prefix("async def ")) {
            if indent == 0 {
                let name = rest.split('(').next().unwrap_or("").trim();
                if !name.is_empty() && !name.starts_with('_') {
                    exports.push(Export::new(name.to_string(), ExportKind::Function, line_num));
                }
                if !name.is_empty() {
                    declarations.push(Declaration {
                        name: name.to_string(),
                        is_class_like: false,
                        decorators: std::mem::take(&mut pending_decorators),
                        line: line_num,
                    });
                }
            }
            pending_decorators.clear();
            continue;
        }

        if !trimmed.is_empty() {
            pending_decorators.clear();
        }

        if indent == 0 {
            if let Some((name, _)) = trimmed.split_once('=') {
                let name = name.trim();
                let is_simple_identifier =
                    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
                // Module-level constant assignment; record as a variable export unless it's
                // the `__all__` list itself (handled separately below).
                if is_simple_identifier && !name.starts_with('_') && name != "__all__" {
                    exports.push(Export::new(name.to_string(), ExportKind::Variable, line_num));
                }
            }
        }
    }

    let dunder_all = parse_all_list(content);
    let metadata = ParseMetadata {
        has_getattr_lazy_loader,
        has_main_block,
        is_celery,
        is_django,
        is_fastapi_router,
        dunder_all: if dunder_all.is_empty() { None } else { Some(dunder_all) },
        ..Default::default()
    };

    ParseResult { imports, exports, declarations, metadata, content: Some(content.to_string()) }
}

/// Parse a Python `__all__` list, handling inline comments and both quote styles.
fn parse_all_list(content: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in all_list_regex().captures_iter(content) {
        let body = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        for line in body.lines() {
            let cleaned = line.split('#').next().unwrap_or("").trim();
            if cleaned.is_empty() {
                continue;
            }
            for item in cleaned.split(',') {
                let name = item.trim().trim_matches(|c| c == '\'' || c == '"').trim();
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }
    }
    names
}

/// Number of leading dots in a relative import module string, per §4.5 Python resolution rules.
pub fn relative_dot_count(module: &str) -> usize {
    module.chars().take_while(|&c| c == '.').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_from_imports() {
        let result = parse(
            "import os\nimport sys, json\nfrom .utils import helper, other as alias\n",
            "main.py",
        );
        assert!(result.imports.iter().any(|i| i.module == "os"));
        assert!(result.imports.iter().any(|i| i.module == "sys"));
        assert!(result.imports.iter().any(|i| i.module == "json"));
        let from_import = result.imports.iter().find(|i| i.module == ".utils").unwrap();
        assert!(from_import.symbols.iter().any(|s| s.name == "helper"));
        assert!(from_import.symbols.iter().any(|s| s.name == "other" && s.alias.as_deref() == Some("alias")));
    }

    #[test]
    fn skips_imports_inside_docstrings() {
        let result = parse("\"\"\"\nimport fake_module\n\"\"\"\nimport real_module\n", "main.py");
        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.imports[0].module, "real_module");
    }

    #[test]
    fn marks_type_checking_imports() {
        let result = parse(
            "from typing import TYPE_CHECKING\nif TYPE_CHECKING:\n    import expensive_module\n",
            "main.py",
        );
        let expensive = result.imports.iter().find(|i| i.module == "expensive_module").unwrap();
        assert!(expensive.is_type_only);
    }

    #[test]
    fn parses_all_list_and_classes() {
        let result = parse(
            "__all__ = [\n    \"Foo\",  # the main class\n    \"bar\",\n]\n\nclass Foo:\n    pass\n\ndef bar():\n    pass\n",
            "main.py",
        );
        assert_eq!(result.metadata.dunder_all, Some(vec!["Foo".to_string(), "bar".to_string()]));
        assert!(result.exports.iter().any(|e| e.name == "Foo" && e.kind == ExportKind::Class));
        assert!(result.exports.iter().any(|e| e.name == "bar" && e.kind == ExportKind::Function));
    }

    #[test]
    fn init_py_reexports_named_imports() {
        let result = parse("from .models import User as UserModel\n", "__init__.py");
        assert!(result.exports.iter().any(|e| e.name == "UserModel" && e.is_reexport()));
    }

    #[test]
    fn detects_main_block_and_celery_task() {
        let result = parse(
            "from celery import shared_task\n\n@shared_task\ndef process():\n    pass\n\nif __name__ == \"__main__\":\n    process()\n",
            "worker.py",
        );
        assert!(result.metadata.has_main_block);
        assert!(result.metadata.is_celery);
        let decl = result.declarations.iter().find(|d| d.name == "process").unwrap();
        assert!(decl.decorators.iter().any(|d| d.name == "shared_task"));
    }

    #[test]
    fn detects_django_model_and_fastapi_router() {
        let result = parse(
            "class Widget(models.Model):\n    pass\n\n@router.get(\"/widgets\")\ndef list_widgets():\n    pass\n",
            "views.py",
        );
        assert!(result.metadata.is_django);
        assert!(result.metadata.is_fastapi_router);
    }

    #[test]
    fn counts_relative_import_dots() {
        assert_eq!(relative_dot_count("..pkg.mod"), 2);
        assert_eq!(relative_dot_count("mod"), 0);
    }
}
