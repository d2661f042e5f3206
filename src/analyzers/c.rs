//! C source parsing.
//!
//! Wraps a tree-sitter parser and lowers the concrete syntax tree into the
//! closed [`CNode`] representation the extractor consumes. Constructs the
//! extractor does not count become [`CNode::Opaque`] here rather than being
//! dropped, so the lowering stays total.

use crate::core::ast::{CNode, MemberAccess};
use anyhow::{bail, Context, Result};
use tree_sitter::{Node, Parser};

pub struct CAnalyzer {
    parser: Parser,
}

impl CAnalyzer {
    pub fn new() -> Result<CAnalyzer> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c::LANGUAGE.into())
            .context("Failed to set C language")?;
        Ok(CAnalyzer { parser })
    }

    /// Parse one translation unit. Malformed input is rejected here; the
    /// extractor assumes a well-formed tree.
    pub fn parse(&mut self, source: &str) -> Result<CNode> {
        let tree = self
            .parser
            .parse(source, None)
            .context("Failed to parse C code")?;
        let root = tree.root_node();
        if root.has_error() {
            bail!("C source contains syntax errors");
        }
        Ok(convert(root, source.as_bytes()))
    }
}

fn text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

fn first_named(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let result = node
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    result
}

fn convert_children(node: Node, source: &[u8]) -> Vec<CNode> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .map(|child| convert(child, source))
        .collect()
}

fn convert_field(node: Node, field: &str, source: &[u8]) -> Option<CNode> {
    node.child_by_field_name(field)
        .map(|child| convert(child, source))
}

fn convert(node: Node, source: &[u8]) -> CNode {
    match node.kind() {
        "translation_unit" => CNode::TranslationUnit(convert_children(node, source)),

        "function_definition" => convert_function(node, source),

        "compound_statement" => CNode::Compound(convert_children(node, source)),

        "declaration" => convert_declaration(node, source),

        "expression_statement" => match first_named(node) {
            Some(inner) => convert(inner, source),
            None => CNode::Empty,
        },

        "parenthesized_expression" => match first_named(node) {
            Some(inner) => convert(inner, source),
            None => CNode::Empty,
        },

        "if_statement" => {
            let cond = convert_field(node, "condition", source).unwrap_or(CNode::Empty);
            let then_branch =
                convert_field(node, "consequence", source).unwrap_or(CNode::Compound(vec![]));
            let else_branch = node.child_by_field_name("alternative").map(|alt| {
                let stmt = if alt.kind() == "else_clause" {
                    first_named(alt)
                } else {
                    Some(alt)
                };
                Box::new(match stmt {
                    Some(stmt) => convert(stmt, source),
                    None => CNode::Compound(vec![]),
                })
            });
            CNode::If {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch,
            }
        }

        "for_statement" => CNode::For {
            init: convert_field(node, "initializer", source).map(Box::new),
            cond: convert_field(node, "condition", source).map(Box::new),
            step: convert_field(node, "update", source).map(Box::new),
            body: Box::new(convert_field(node, "body", source).unwrap_or(CNode::Compound(vec![]))),
        },

        "while_statement" => CNode::While {
            cond: Box::new(convert_field(node, "condition", source).unwrap_or(CNode::Empty)),
            body: Box::new(convert_field(node, "body", source).unwrap_or(CNode::Compound(vec![]))),
        },

        "do_statement" => CNode::DoWhile {
            body: Box::new(convert_field(node, "body", source).unwrap_or(CNode::Compound(vec![]))),
            cond: Box::new(convert_field(node, "condition", source).unwrap_or(CNode::Empty)),
        },

        "binary_expression" => CNode::Binary {
            op: node
                .child_by_field_name("operator")
                .map(|op| text(op, source))
                .unwrap_or_default(),
            left: Box::new(convert_field(node, "left", source).unwrap_or(CNode::Empty)),
            right: Box::new(convert_field(node, "right", source).unwrap_or(CNode::Empty)),
        },

        "unary_expression" | "pointer_expression" => CNode::Unary {
            op: node
                .child_by_field_name("operator")
                .map(|op| text(op, source))
                .unwrap_or_default(),
            operand: Box::new(convert_field(node, "argument", source).unwrap_or(CNode::Empty)),
        },

        "update_expression" => convert_update(node, source),

        "assignment_expression" => CNode::Assign {
            op: node
                .child_by_field_name("operator")
                .map(|op| text(op, source))
                .unwrap_or_default(),
            target: Box::new(convert_field(node, "left", source).unwrap_or(CNode::Empty)),
            value: Box::new(convert_field(node, "right", source).unwrap_or(CNode::Empty)),
        },

        "cast_expression" => CNode::Cast {
            ty: Box::new(CNode::Opaque(
                node.child_by_field_name("type")
                    .map(|ty| text(ty, source))
                    .unwrap_or_default(),
            )),
            expr: Box::new(convert_field(node, "value", source).unwrap_or(CNode::Empty)),
        },

        "sizeof_expression" => {
            let operand = convert_field(node, "value", source).unwrap_or_else(|| {
                CNode::Opaque(
                    node.child_by_field_name("type")
                        .map(|ty| text(ty, source))
                        .unwrap_or_default(),
                )
            });
            CNode::Unary {
                op: "sizeof".to_string(),
                operand: Box::new(operand),
            }
        }

        "call_expression" => {
            let callee = convert_field(node, "function", source).unwrap_or(CNode::Empty);
            let args = node
                .child_by_field_name("arguments")
                .map(|list| convert_children(list, source))
                .unwrap_or_default();
            CNode::Call {
                callee: Box::new(callee),
                args,
            }
        }

        "subscript_expression" => CNode::Index {
            array: Box::new(convert_field(node, "argument", source).unwrap_or(CNode::Empty)),
            index: Box::new(convert_field(node, "index", source).unwrap_or(CNode::Empty)),
        },

        "field_expression" => {
            let access = match node
                .child_by_field_name("operator")
                .map(|op| text(op, source))
                .as_deref()
            {
                Some("->") => MemberAccess::Arrow,
                _ => MemberAccess::Dot,
            };
            CNode::Member {
                access,
                object: Box::new(convert_field(node, "argument", source).unwrap_or(CNode::Empty)),
                field: Box::new(convert_field(node, "field", source).unwrap_or(CNode::Empty)),
            }
        }

        "comma_expression" => CNode::Binary {
            op: ",".to_string(),
            left: Box::new(convert_field(node, "left", source).unwrap_or(CNode::Empty)),
            right: Box::new(convert_field(node, "right", source).unwrap_or(CNode::Empty)),
        },

        "identifier" | "field_identifier" => CNode::Identifier(text(node, source)),

        "number_literal" | "string_literal" | "char_literal" | "concatenated_string" | "true"
        | "false" | "null" => CNode::Literal(text(node, source)),

        "return_statement" => CNode::Return(first_named(node).map(|value| {
            Box::new(convert(value, source))
        })),

        "break_statement" => CNode::Break,
        "continue_statement" => CNode::Continue,

        other => CNode::Opaque(other.to_string()),
    }
}

fn convert_function(node: Node, source: &[u8]) -> CNode {
    let func_decl = node
        .child_by_field_name("declarator")
        .and_then(find_function_declarator);
    let Some(func_decl) = func_decl else {
        return CNode::Opaque("function_definition".to_string());
    };
    let name = func_decl
        .child_by_field_name("declarator")
        .map(|decl| find_identifier_text(decl, source))
        .unwrap_or_default();
    let params = func_decl
        .child_by_field_name("parameters")
        .map(|list| convert_parameters(list, source))
        .unwrap_or_default();
    let body = convert_field(node, "body", source).unwrap_or(CNode::Compound(vec![]));
    CNode::FunctionDef {
        name,
        params,
        body: Box::new(body),
    }
}

/// Descend through pointer/parenthesized declarators (`int *f(...)`) to the
/// function declarator itself.
fn find_function_declarator(node: Node) -> Option<Node> {
    let mut current = node;
    loop {
        match current.kind() {
            "function_declarator" => return Some(current),
            "pointer_declarator" => current = current.child_by_field_name("declarator")?,
            "parenthesized_declarator" => current = first_named(current)?,
            _ => return None,
        }
    }
}

fn find_identifier_text(node: Node, source: &[u8]) -> String {
    let mut current = node;
    loop {
        if matches!(current.kind(), "identifier" | "field_identifier") {
            return text(current, source);
        }
        match current
            .child_by_field_name("declarator")
            .or_else(|| first_named(current))
        {
            Some(child) => current = child,
            None => return text(current, source),
        }
    }
}

fn convert_parameters(list: Node, source: &[u8]) -> Vec<CNode> {
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|child| child.kind() == "parameter_declaration")
        .map(|param| convert_parameter(param, source))
        .collect()
}

fn convert_parameter(param: Node, source: &[u8]) -> CNode {
    let ty_text = param
        .child_by_field_name("type")
        .map(|ty| text(ty, source))
        .unwrap_or_default();
    match param.child_by_field_name("declarator") {
        // Unnamed parameters (`f(void)`, `f(int)`, `f(int *)`) declare no
        // name and contribute nothing.
        None => CNode::Opaque("abstract parameter".to_string()),
        Some(decl) if decl.kind().starts_with("abstract") => {
            CNode::Opaque("abstract parameter".to_string())
        }
        Some(decl) => CNode::Decl {
            ty: Box::new(declarator_chain(decl, CNode::TypeName(ty_text), source)),
        },
    }
}

fn convert_declaration(node: Node, source: &[u8]) -> CNode {
    let ty_text = node
        .child_by_field_name("type")
        .map(|ty| text(ty, source))
        .unwrap_or_default();
    let mut cursor = node.walk();
    let mut decls: Vec<CNode> = node
        .children_by_field_name("declarator", &mut cursor)
        .map(|decl| CNode::Decl {
            ty: Box::new(declarator_chain(
                decl,
                CNode::TypeName(ty_text.clone()),
                source,
            )),
        })
        .collect();
    if decls.is_empty() {
        CNode::Opaque("declaration".to_string())
    } else if decls.len() == 1 {
        decls.remove(0)
    } else {
        CNode::DeclList(decls)
    }
}

/// Rebuild a declarator as nested pointer/array wrappers around the base
/// type. Initializers are dropped; only the declared shape is counted.
fn declarator_chain(node: Node, base: CNode, source: &[u8]) -> CNode {
    match node.kind() {
        "identifier" | "field_identifier" => base,
        "pointer_declarator" => {
            let chained = match node.child_by_field_name("declarator") {
                Some(inner) => declarator_chain(inner, base, source),
                None => base,
            };
            CNode::PtrDecl(Box::new(chained))
        }
        "array_declarator" => {
            let size = node
                .child_by_field_name("size")
                .map(|size| Box::new(convert(size, source)));
            let chained = match node.child_by_field_name("declarator") {
                Some(inner) => declarator_chain(inner, base, source),
                None => base,
            };
            CNode::ArrayDecl {
                inner: Box::new(chained),
                size,
            }
        }
        "init_declarator" | "function_declarator" | "parenthesized_declarator" => {
            match node.child_by_field_name("declarator").or_else(|| first_named(node)) {
                Some(inner) => declarator_chain(inner, base, source),
                None => base,
            }
        }
        _ => base,
    }
}

fn convert_update(node: Node, source: &[u8]) -> CNode {
    let (Some(op), Some(arg)) = (
        node.child_by_field_name("operator"),
        node.child_by_field_name("argument"),
    ) else {
        return CNode::Opaque("update_expression".to_string());
    };
    let prefix = op.start_byte() < arg.start_byte();
    let spelled = match (text(op, source).as_str(), prefix) {
        ("++", true) => "++",
        ("++", false) => "p++",
        ("--", true) => "--",
        _ => "p--",
    };
    CNode::Unary {
        op: spelled.to_string(),
        operand: Box::new(convert(arg, source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> CNode {
        CAnalyzer::new()
            .expect("analyzer")
            .parse(source)
            .expect("parse")
    }

    #[test]
    fn rejects_malformed_source() {
        let mut analyzer = CAnalyzer::new().expect("analyzer");
        assert!(analyzer.parse("int f( {").is_err());
    }

    #[test]
    fn update_expressions_keep_their_fixity() {
        let unit = parse("void f(int a) { a++; --a; }");
        let CNode::TranslationUnit(items) = &unit else {
            panic!("expected translation unit");
        };
        let CNode::FunctionDef { body, .. } = &items[0] else {
            panic!("expected function definition");
        };
        let CNode::Compound(stmts) = body.as_ref() else {
            panic!("expected compound body");
        };
        assert_eq!(
            stmts[0],
            CNode::Unary {
                op: "p++".to_string(),
                operand: Box::new(CNode::Identifier("a".to_string())),
            }
        );
        assert_eq!(
            stmts[1],
            CNode::Unary {
                op: "--".to_string(),
                operand: Box::new(CNode::Identifier("a".to_string())),
            }
        );
    }

    #[test]
    fn pointer_return_types_still_find_the_name() {
        let unit = parse("char *dup(char *s) { return s; }");
        let CNode::TranslationUnit(items) = &unit else {
            panic!("expected translation unit");
        };
        let CNode::FunctionDef { name, params, .. } = &items[0] else {
            panic!("expected function definition");
        };
        assert_eq!(name, "dup");
        assert_eq!(params.len(), 1);
    }
}
