// src/parser.rs
//
// Method-declaration extraction. The rest of the crate only sees the
// `SourceParser` trait; the C# grammar is the one shipped implementation.

use crate::error::{Error, Result};
use tracing::debug;
use tree_sitter::{Node, Parser};

/// A method declaration as reported by a parser, before it is tied to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMethod {
    pub name: String,
    pub parameter_types: Vec<String>,
    pub start_line: usize,
    pub end_line: usize,
}

/// Turns the text of one file version into its method declarations,
/// in declaration order.
pub trait SourceParser: Sync {
    fn parse_methods(&self, path: &str, text: &str) -> Result<Vec<ParsedMethod>>;
}

/// tree-sitter based C# parser. Error tolerant: a file with syntax errors
/// still yields whatever method declarations the grammar recovered.
#[derive(Debug, Default, Clone, Copy)]
pub struct CSharpParser;

impl SourceParser for CSharpParser {
    fn parse_methods(&self, path: &str, text: &str) -> Result<Vec<ParsedMethod>> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .map_err(|e| Error::Parse {
                path: path.to_string(),
                reason: format!("failed to load C# grammar: {}", e),
            })?;

        let tree = parser.parse(text, None).ok_or_else(|| Error::Parse {
            path: path.to_string(),
            reason: "parser produced no syntax tree".to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            debug!("{} contains syntax errors, using recovered tree", path);
        }

        let mut methods = Vec::new();
        collect_methods(&root, text.as_bytes(), &mut methods);
        Ok(methods)
    }
}

/// Pre-order walk, so methods come out in source order.
fn collect_methods(node: &Node, source: &[u8], out: &mut Vec<ParsedMethod>) {
    for child in node.children(&mut node.walk()) {
        if child.kind() == "method_declaration" {
            if let Some(method) = parse_method_node(&child, source) {
                out.push(method);
            }
        }
        collect_methods(&child, source, out);
    }
}

fn parse_method_node(node: &Node, source: &[u8]) -> Option<ParsedMethod> {
    let name = node
        .child_by_field_name("name")?
        .utf8_text(source)
        .ok()?
        .to_string();

    let parameter_types = node
        .child_by_field_name("parameters")
        .map(|params| extract_parameter_types(&params, source))
        .unwrap_or_default();

    Some(ParsedMethod {
        name,
        parameter_types,
        start_line: node.start_position().row,
        end_line: node.end_position().row,
    })
}

/// Parameter types in declaration order. A `params` array is not wrapped in
/// a `parameter` node; its type sits directly under the list as a `type` field.
fn extract_parameter_types(params: &Node, source: &[u8]) -> Vec<String> {
    let mut types = Vec::new();
    let mut cursor = params.walk();
    if !cursor.goto_first_child() {
        return types;
    }
    loop {
        let child = cursor.node();
        if child.kind() == "parameter" {
            types.push(parameter_type(&child, source));
        } else if cursor.field_name() == Some("type") {
            types.push(node_text(&child, source));
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
    types
}

fn parameter_type(param: &Node, source: &[u8]) -> String {
    let text = match param.child_by_field_name("type") {
        Some(ty) => return node_text(&ty, source),
        None => {
            // Grammar versions without a `type` field: everything before the name.
            let end = param
                .child_by_field_name("name")
                .map(|n| n.start_byte())
                .unwrap_or_else(|| param.end_byte());
            String::from_utf8_lossy(&source[param.start_byte()..end]).into_owned()
        }
    };
    normalize_whitespace(&text)
}

fn node_text(node: &Node, source: &[u8]) -> String {
    normalize_whitespace(&String::from_utf8_lossy(&source[node.start_byte()..node.end_byte()]))
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
