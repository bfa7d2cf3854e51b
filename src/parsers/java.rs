//! Java source parsing via tree-sitter (§4.2).
//!
//! Covers both Java and Kotlin through the same module: Kotlin's parser produces a
//! structurally similar CST (`package_header`, `import_header`, class/object/fun declarations)
//! so the extraction logic is shared, with the handful of Kotlin-specific node kinds handled in
//! [`parse_kotlin`].

use tree_sitter::{Node, Parser};

use crate::model::{
    Declaration, Decorator, Export, ExportKind, Import, ImportKind, ParseMetadata, ParseResult,
};

/// Spring/CDI/Quarkus stereotype annotations that mark a class as framework-managed (§4.2).
const SPRING_STEREOTYPES: &[&str] = &[
    "Component",
    "Service",
    "Repository",
    "Controller",
    "RestController",
    "Configuration",
    "SpringBootApplication",
    "ApplicationScoped",
    "RequestScoped",
    "SessionScoped",
    "Named",
];

pub fn parse(content: &str, file_name: &str) -> ParseResult {
    let mut parser = Parser::new();
    if parser.set_language(&tree_sitter_java::LANGUAGE.into()).is_err() {
        return ParseResult::empty();
    }
    let Some(tree) = parser.parse(content, None) else {
        return ParseResult::empty();
    };

    let mut ctx = JavaCtx { source: content, imports: Vec::new(), exports: Vec::new(), declarations: Vec::new(), package_name: None };
    let root = tree.root_node();
    ctx.visit(root, 0);

    let has_main_method = ctx.declarations.iter().any(|d| {
        d.name == "main" && !d.is_class_like
    });
    let is_spring_component = ctx
        .declarations
        .iter()
        .filter(|d| d.is_class_like)
        .any(|d| d.decorators.iter().any(|dec| SPRING_STEREOTYPES.contains(&dec.name.as_str())));
    let is_test_file = file_name.ends_with("Test.java")
        || file_name.ends_with("Tests.java")
        || ctx.declarations.iter().any(|d| {
            d.decorators.iter().any(|dec| {
                matches!(dec.name.as_str(), "Test" | "ParameterizedTest" | "SpringBootTest")
            })
        });

    let metadata = ParseMetadata {
        java_package_name: ctx.package_name.clone(),
        has_main_function: has_main_method,
        is_spring_component,
        is_test_file,
        ..Default::default()
    };

    ParseResult {
        imports: ctx.imports,
        exports: ctx.exports,
        declarations: ctx.declarations,
        metadata,
        content: Some(content.to_string()),
    }
}

struct JavaCtx<'a> {
    source: &'a str,
    imports: Vec<Import>,
    exports: Vec<Export>,
    declarations: Vec<Declaration>,
    package_name: Option<String>,
}

impl<'a> JavaCtx<'a> {
    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn line(&self, node: Node) -> usize {
        node.start_position().row + 1
    }

    fn visit(&mut self, node: Node, depth: usize) {
        match node.kind() {
            "package_declaration" => {
                self.package_name = node
                    .named_child(0)
                    .map(|c| self.text(c).to_string());
            }
            "import_declaration" => self.extract_import(node),
            "class_declaration" | "interface_declaration" | "enum_declaration" | "record_declaration" => {
                self.extract_type(node, depth);
                return;
            }
            "method_declaration" | "constructor_declaration" => {
                self.extract_method(node, depth);
                return;
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, depth);
        }
    }

    fn decorators_of(&self, node: Node) -> Vec<Decorator> {
        let mut decorators = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "modifiers" {
                let mut inner = child.walk();
                for ann in child.children(&mut inner) {
                    if matches!(ann.kind(), "marker_annotation" | "annotation") {
                        if let Some(name_node) = ann.child_by_field_name("name") {
                            let name = self.text(name_node).to_string();
                            let args = ann
                                .child_by_field_name("arguments")
                                .map(|a| vec![self.text(a).to_string()])
                                .unwrap_or_default();
                            decorators.push(Decorator { name, arguments: args });
                        }
                    }
                }
            }
        }
        decorators
    }

    fn is_public(&self, node: Node) -> bool {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "modifiers" && self.text(child).contains("public") {
                return true;
            }
        }
        false
    }

    fn extract_import(&mut self, node: Node) {
        let line = self.line(node);
        let text = self.text(node);
        let is_static = text.trim_start().starts_with("import static");

        let mut path = None;
        let mut is_wildcard = false;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "scoped_identifier" | "identifier" => path = Some(self.text(child).to_string()),
                "asterisk" => is_wildcard = true,
                _ => {}
            }
        }
        let Some(module) = path else { return };
        let mut import = Import::new(module, ImportKind::Normal, line);
        import.is_glob = is_wildcard;
        if is_static {
            // `import static a.b.C.m` -- drop the last segment during resolution, not here;
            // keep the full dotted path so the resolver can apply §4.5's static-import rule.
        }
        self.imports.push(import);
    }

    fn extract_type(&mut self, node: Node, depth: usize) {
        let Some(name_node) = node.child_by_field_name("name") else { return };
        let name = self.text(name_node).to_string();
        let line = self.line(node);
        let decorators = self.decorators_of(node);
        let kind = match node.kind() {
            "interface_declaration" => ExportKind::Type,
            "enum_declaration" => ExportKind::Enum,
            _ => ExportKind::Class,
        };

        if depth == 0 && self.is_public(node) {
            self.exports.push(Export::new(name.clone(), kind, line));
        }
        self.declarations.push(Declaration { name, is_class_like: true, decorators, line });

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for child in body.children(&mut cursor) {
                self.visit(child, depth + 1);
            }
        }
    }

    fn extract_method(&mut self, node: Node, depth: usize) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        if name.is_empty() {
            return;
        }
        let line = self.line(node);
        let decorators = self.decorators_of(node);
        self.declarations.push(Declaration { name, is_class_like: false, decorators, line });

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for child in body.children(&mut cursor) {
                self.visit(child, depth + 1);
            }
        }
    }
}

/// Kotlin shares the Java extraction path's shape but has a distinct grammar (`package_header`,
/// `import_header`, `class_declaration` with `object`/`companion object` variants). Parsed
/// separately rather than forcing Kotlin source through the Java grammar.
pub fn parse_kotlin(content: &str, file_name: &str) -> ParseResult {
    let mut parser = Parser::new();
    if parser.set_language(&tree_sitter_kotlin_codanna::LANGUAGE.into()).is_err() {
        return ParseResult::empty();
    }
    let Some(tree) = parser.parse(content, None) else {
        return ParseResult::empty();
    };

    let mut ctx = JavaCtx { source: content, imports: Vec::new(), exports: Vec::new(), declarations: Vec::new(), package_name: None };
    let root = tree.root_node();
    visit_kotlin(&mut ctx, root, 0);

    let has_main_function = ctx.declarations.iter().any(|d| d.name == "main" && !d.is_class_like);
    let is_spring_component = ctx
        .declarations
        .iter()
        .filter(|d| d.is_class_like)
        .any(|d| d.decorators.iter().any(|dec| SPRING_STEREOTYPES.contains(&dec.name.as_str())));
    let is_test_file = file_name.ends_with("Test.kt") || file_name.ends_with("Tests.kt");

    let metadata = ParseMetadata {
        java_package_name: ctx.package_name.clone(),
        has_main_function,
        is_spring_component,
        is_test_file,
        ..Default::default()
    };

    ParseResult {
        imports: ctx.imports,
        exports: ctx.exports,
        declarations: ctx.declarations,
        metadata,
        content: Some(content.to_string()),
    }
}

fn visit_kotlin(ctx: &mut JavaCtx, node: Node, depth: usize) {
    match node.kind() {
        "package_header" => {
            ctx.package_name = node.named_child(0).map(|c| ctx.text(c).to_string());
        }
        "import_header" => {
            let line = ctx.line(node);
            if let Some(ident) = node.named_child(0) {
                let raw = ctx.text(ident).to_string();
                let is_wildcard = ctx.text(node).trim_end().ends_with(".*");
                let mut import = Import::new(raw, ImportKind::Normal, line);
                import.is_glob = is_wildcard;
                ctx.imports.push(import);
            }
            return;
        }
        "class_declaration" | "object_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = ctx.text(name_node).to_string();
                let line = ctx.line(node);
                let is_private = ctx.text(node).trim_start().starts_with("private");
                if depth == 0 && !is_private {
                    ctx.exports.push(Export::new(name.clone(), ExportKind::Class, line));
                }
                ctx.declarations.push(Declaration { name, is_class_like: true, decorators: Vec::new(), line });
            }
        }
        "function_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = ctx.text(name_node).to_string();
                let line = ctx.line(node);
                ctx.declarations.push(Declaration { name, is_class_like: false, decorators: Vec::new(), line });
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_kotlin(ctx, child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_package_imports_and_public_class() {
        let src = "package com.example;\n\nimport java.util.List;\nimport com.example.other.*;\n\npublic class Widget {\n    public void run() {}\n}\n";
        let result = parse(src, "Widget.java");
        assert_eq!(result.metadata.java_package_name.as_deref(), Some("com.example"));
        assert!(result.imports.iter().any(|i| i.module == "java.util.List"));
        assert!(result.imports.iter().any(|i| i.module == "com.example.other" && i.is_glob));
        assert!(result.exports.iter().any(|e| e.name == "Widget" && e.kind == ExportKind::Class));
    }

    #[test]
    fn private_top_level_class_is_not_exported() {
        let result = parse("class Helper {}\n", "Helper.java");
        assert!(result.exports.is_empty());
    }

    #[test]
    fn detects_spring_component_and_main_method() {
        let src = "@RestController\npublic class ApiController {\n    public static void main(String[] args) {}\n}\n";
        let result = parse(src, "ApiController.java");
        assert!(result.metadata.is_spring_component);
        assert!(result.metadata.has_main_function);
    }

    #[test]
    fn detects_test_annotation() {
        let src = "public class WidgetSpec {\n    @Test\n    public void checksSomething() {}\n}\n";
        let result = parse(src, "WidgetSpec.java");
        assert!(result.metadata.is_test_file);
    }
}
