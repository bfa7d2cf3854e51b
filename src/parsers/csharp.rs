//! C# source parsing via tree-sitter (§4.2).
//!
//! Namespaces (block-scoped and C# 10 file-scoped), `using` directives (plain/`static`/`global`/
//! aliased), type declarations, and attributes are extracted directly from the CST. Top-level
//! statement files (C# 9+, the `Program.cs` minimal-API style) are detected by the absence of
//! any top-level type declaration alongside statement-shaped nodes at the compilation unit root.

use tree_sitter::{Node, Parser};

use crate::model::{
    Declaration, Decorator, Export, ExportKind, Import, ImportKind, ParseMetadata, ParseResult,
};

pub fn parse(content: &str, file_name: &str) -> ParseResult {
    let mut parser = Parser::new();
    if parser.set_language(&tree_sitter_c_sharp::LANGUAGE.into()).is_err() {
        return ParseResult::empty();
    }
    let Some(tree) = parser.parse(content, None) else {
        return ParseResult::empty();
    };

    let mut ctx = CsCtx {
        source: content,
        imports: Vec::new(),
        exports: Vec::new(),
        declarations: Vec::new(),
        namespace: None,
        has_top_level_type: false,
        has_statement_at_root: false,
    };
    let root = tree.root_node();
    ctx.visit(root, 0);

    let has_main_method = ctx.declarations.iter().any(|d| d.name == "Main" && !d.is_class_like);
    let is_top_level_statements = !ctx.has_top_level_type && ctx.has_statement_at_root;
    let is_test_file = file_name.ends_with("Tests.cs") || file_name.ends_with("Test.cs");
    let is_controller = file_name.ends_with("Controller.cs")
        || ctx.declarations.iter().any(|d| {
            d.is_class_like && d.decorators.iter().any(|dec| dec.name == "ApiController")
        });

    let metadata = ParseMetadata {
        csharp_namespace: ctx.namespace.clone(),
        has_main_function: has_main_method || is_top_level_statements,
        is_test_file,
        is_spring_component: is_controller,
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

struct CsCtx<'a> {
    source: &'a str,
    imports: Vec<Import>,
    exports: Vec<Export>,
    declarations: Vec<Declaration>,
    namespace: Option<String>,
    has_top_level_type: bool,
    has_statement_at_root: bool,
}

impl<'a> CsCtx<'a> {
    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn line(&self, node: Node) -> usize {
        node.start_position().row + 1
    }

    fn visit(&mut self, node: Node, depth: usize) {
        match node.kind() {
            "file_scoped_namespace_declaration" | "namespace_declaration" => {
                if let Some(name_node) = node.child_by_field_name("name") {
                    self.namespace = Some(self.text(name_node).to_string());
                }
            }
            "using_directive" => {
                self.extract_using(node);
                return;
            }
            "class_declaration" | "struct_declaration" | "interface_declaration" | "record_declaration" => {
                self.extract_type(node, depth);
                return;
            }
            "method_declaration" => {
                self.extract_method(node, depth);
                return;
            }
            _ if depth <= 1 && node.is_named() && node.kind_id() != 0 => {
                if node.kind().ends_with("_declaration") {
                    // handled above, or a non-type top-level declaration (delegate/enum)
                } else if depth == 1
                    && !matches!(
                        node.kind(),
                        "using_directive"
                            | "namespace_declaration"
                            | "file_scoped_namespace_declaration"
                            | "compilation_unit"
                    )
                    && node.kind().ends_with("_statement")
                {
                    self.has_statement_at_root = true;
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, depth + 1);
        }
    }

    fn extract_using(&mut self, node: Node) {
        let line = self.line(node);
        let text = self.text(node);
        let is_static = text.contains("static ");
        let is_global = text.trim_start().starts_with("global ");

        let name_node = node.child_by_field_name("name").or_else(|| {
            let mut cursor = node.walk();
            node.children(&mut cursor).find(|c| matches!(c.kind(), "qualified_name" | "identifier_name" | "identifier"))
        });
        let Some(name_node) = name_node else { return };
        let module = self.text(name_node).to_string();

        let _ = is_global;
        let mut import = Import::new(module, ImportKind::Normal, line);
        import.is_type_only = is_static;
        self.imports.push(import);
    }

    fn attributes_of(&self, node: Node) -> Vec<Decorator> {
        let mut decorators = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "attribute_list" {
                let mut inner = child.walk();
                for attr in child.children(&mut inner) {
                    if attr.kind() == "attribute" {
                        let name = attr
                            .child_by_field_name("name")
                            .map(|n| self.text(n).to_string())
                            .unwrap_or_else(|| self.text(attr).to_string());
                        let args = attr
                            .child_by_field_name("argument_list")
                            .map(|a| vec![self.text(a).to_string()])
                            .unwrap_or_default();
                        decorators.push(Decorator { name, arguments: args });
                    }
                }
            }
        }
        decorators
    }

    fn is_public(&self, node: Node) -> bool {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "modifier" && self.text(child) == "public" {
                return true;
            }
        }
        false
    }

    fn extract_type(&mut self, node: Node, depth: usize) {
        let Some(name_node) = node.child_by_field_name("name") else { return };
        let name = self.text(name_node).to_string();
        let line = self.line(node);
        let decorators = self.attributes_of(node);
        let kind = match node.kind() {
            "interface_declaration" => ExportKind::Type,
            _ => ExportKind::Class,
        };

        if depth <= 1 {
            self.has_top_level_type = true;
        }
        if depth <= 1 && self.is_public(node) {
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
        let decorators = self.attributes_of(node);
        self.declarations.push(Declaration { name, is_class_like: false, decorators, line });

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for child in body.children(&mut cursor) {
                self.visit(child, depth + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_namespace_using_and_public_class() {
        let src = "using System;\nusing static System.Math;\n\nnamespace MyApp.Services;\n\npublic class WidgetService {\n    public void Run() {}\n}\n";
        let result = parse(src, "WidgetService.cs");
        assert_eq!(result.metadata.csharp_namespace.as_deref(), Some("MyApp.Services"));
        assert!(result.imports.iter().any(|i| i.module == "System"));
        assert!(result.imports.iter().any(|i| i.module == "System.Math" && i.is_type_only));
        assert!(result.exports.iter().any(|e| e.name == "WidgetService"));
    }

    #[test]
    fn detects_main_method_and_api_controller() {
        let src = "[ApiController]\npublic class WidgetController {\n    public static void Main(string[] args) {}\n}\n";
        let result = parse(src, "WidgetController.cs");
        assert!(result.metadata.has_main_function);
        assert!(result.metadata.is_spring_component);
    }
}
