//! AST-to-vector feature extraction.
//!
//! A structural visitor walks one parsed translation unit and accumulates a
//! [`FeatureVector`] per function definition, bottom-up: each node merges its
//! children's vectors and adds at most one token increment of its own.
//! Constructs outside the counted subset merge as empty — the traversal
//! always terminates with a defined vector.

use crate::core::ast::CNode;
use crate::core::vector::{FeatureVector, SyntaxTokenKind, VisitValue};
use log::debug;
use serde::Serialize;
use std::path::PathBuf;

/// One extracted function: a name/origin paired with its feature vector.
/// `cluster` stays unset until a clustering run assigns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionRecord {
    pub name: String,
    pub vector: FeatureVector,
    pub file: Option<PathBuf>,
    pub label: Option<String>,
    pub cluster: Option<usize>,
}

impl FunctionRecord {
    pub fn new(name: impl Into<String>, vector: FeatureVector) -> FunctionRecord {
        FunctionRecord {
            name: name.into(),
            vector,
            file: None,
            label: None,
            cluster: None,
        }
    }

    /// The label shown in reports: the explicit label if one was assigned,
    /// otherwise `name (file)`.
    pub fn display_label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        match &self.file {
            Some(file) => format!("{} ({})", self.name, file.display()),
            None => self.name.clone(),
        }
    }

    /// Assign compact `D0..Dn` labels in sequence order.
    pub fn assign_labels(records: &mut [FunctionRecord]) {
        for (idx, record) in records.iter_mut().enumerate() {
            record.label = Some(format!("D{idx}"));
        }
    }

    /// Split records into parallel label and vector sequences for the
    /// clustering engine.
    pub fn split(records: &[FunctionRecord]) -> (Vec<String>, Vec<FeatureVector>) {
        records
            .iter()
            .map(|record| (record.display_label(), record.vector))
            .unzip()
    }
}

/// Structural visitor producing one [`FunctionRecord`] per function
/// definition.
pub struct FeatureExtractor {
    visit_count: u64,
}

impl FeatureExtractor {
    pub fn new() -> FeatureExtractor {
        FeatureExtractor { visit_count: 0 }
    }

    /// Extract every function definition of a translation unit, in source
    /// order. Non-function items (prototypes, typedefs, globals) are
    /// skipped.
    pub fn extract(&mut self, ast: &CNode) -> Vec<FunctionRecord> {
        let items = match ast {
            CNode::TranslationUnit(items) => items.as_slice(),
            other => std::slice::from_ref(other),
        };
        items
            .iter()
            .filter_map(|item| self.extract_function(item))
            .collect()
    }

    /// Extract a single function definition; `None` for any other node.
    pub fn extract_function(&mut self, node: &CNode) -> Option<FunctionRecord> {
        let CNode::FunctionDef { name, params, body } = node else {
            return None;
        };
        let params_vector = FeatureVector::merge(params.iter().map(|param| self.visit(param)));
        let body_vector = self.visit(body).into_vector();
        let vector = FeatureVector::merge([params_vector.into(), body_vector.into()]);
        debug!("extracted '{}': {:?}", name, vector.cells());
        Some(FunctionRecord::new(name.clone(), vector))
    }

    fn visit(&mut self, node: &CNode) -> VisitValue {
        self.visit_count += 1;
        debug!("visiting {} [{}]", node.kind_name(), self.visit_count);

        match node {
            CNode::TranslationUnit(_) | CNode::FunctionDef { .. } => VisitValue::Empty,

            CNode::Compound(items) | CNode::DeclList(items) => {
                FeatureVector::merge(items.iter().map(|item| self.visit(item))).into()
            }

            CNode::Decl { ty } => self.visit(ty),

            CNode::TypeName(_) => {
                let mut vector = FeatureVector::zero();
                vector.bump(SyntaxTokenKind::TypeDecl);
                vector.into()
            }

            CNode::PtrDecl(inner) => {
                let mut vector = FeatureVector::zero();
                vector.bump(SyntaxTokenKind::PtrDecl);
                FeatureVector::merge([vector.into(), self.visit(inner)]).into()
            }

            CNode::ArrayDecl { inner, size } => {
                let mut vector = FeatureVector::zero();
                vector.bump(SyntaxTokenKind::ArrDecl);
                let size_value = self.visit_optional(size.as_deref());
                FeatureVector::merge([vector.into(), self.visit(inner), size_value]).into()
            }

            CNode::Cast { ty, expr } => {
                let mut vector = FeatureVector::zero();
                vector.bump(SyntaxTokenKind::Cast);
                FeatureVector::merge([vector.into(), self.visit(ty), self.visit(expr)]).into()
            }

            CNode::Binary { op, left, right } => {
                let mut vector = FeatureVector::zero();
                vector.bump_symbol(op);
                FeatureVector::merge([vector.into(), self.visit(left), self.visit(right)]).into()
            }

            CNode::Unary { op, operand } => {
                let mut vector = FeatureVector::zero();
                vector.bump_symbol(op);
                FeatureVector::merge([vector.into(), self.visit(operand)]).into()
            }

            CNode::Assign { op, target, value } => {
                let mut vector = FeatureVector::zero();
                vector.bump_symbol(op);
                FeatureVector::merge([vector.into(), self.visit(target), self.visit(value)]).into()
            }

            CNode::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let mut vector = FeatureVector::zero();
                vector.bump(SyntaxTokenKind::If);
                // ELSE counts structural presence of the branch, not its
                // content.
                if else_branch.is_some() {
                    vector.bump(SyntaxTokenKind::Else);
                }
                let else_value = self.visit_optional(else_branch.as_deref());
                FeatureVector::merge([
                    vector.into(),
                    self.visit(cond),
                    self.visit(then_branch),
                    else_value,
                ])
                .into()
            }

            CNode::For {
                init,
                cond,
                step,
                body,
            } => {
                let init_value = self.visit_optional(init.as_deref());
                let cond_value = self.visit_optional(cond.as_deref());
                let step_value = self.visit_optional(step.as_deref());
                let mut vector = FeatureVector::merge([
                    init_value,
                    cond_value,
                    step_value,
                    self.visit(body),
                ]);
                vector.bump(SyntaxTokenKind::For);
                vector.into()
            }

            CNode::While { cond, body } => {
                let mut vector = FeatureVector::merge([self.visit(cond), self.visit(body)]);
                vector.bump(SyntaxTokenKind::While);
                vector.into()
            }

            CNode::DoWhile { body, cond } => {
                let mut vector = FeatureVector::merge([self.visit(body), self.visit(cond)]);
                vector.bump(SyntaxTokenKind::DoWhile);
                vector.into()
            }

            // The callee is a reference, not counted structure; arguments
            // are merged before the call increment is added.
            CNode::Call { args, .. } => {
                let mut vector = FeatureVector::merge(args.iter().map(|arg| self.visit(arg)));
                vector.bump(SyntaxTokenKind::FuncCall);
                vector.into()
            }

            CNode::Index { array, index } => {
                FeatureVector::merge([self.visit(array), self.visit(index)]).into()
            }

            // The object side is reference context; only the field side is
            // traversed, and an identifier field degrades to zero.
            CNode::Member { access, field, .. } => {
                let mut vector = FeatureVector::zero();
                vector.bump_symbol(access.symbol());
                FeatureVector::merge([vector.into(), self.visit(field)]).into()
            }

            CNode::Identifier(name) => VisitValue::Name(name.clone()),

            CNode::Return(value) => match value {
                Some(value) => self.visit(value),
                None => VisitValue::Empty,
            },

            CNode::Literal(_)
            | CNode::Break
            | CNode::Continue
            | CNode::Empty
            | CNode::Opaque(_) => VisitValue::Empty,
        }
    }

    fn visit_optional(&mut self, node: Option<&CNode>) -> VisitValue {
        match node {
            Some(node) => self.visit(node),
            None => VisitValue::Empty,
        }
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        FeatureExtractor::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::MemberAccess;

    fn extract_one(node: CNode) -> FeatureVector {
        FeatureExtractor::new()
            .extract_function(&node)
            .map(|record| record.vector)
            .unwrap_or_else(FeatureVector::zero)
    }

    #[test]
    fn empty_function_yields_zero_vector() {
        let func = CNode::FunctionDef {
            name: "noop".to_string(),
            params: vec![],
            body: Box::new(CNode::Compound(vec![])),
        };
        assert!(extract_one(func).is_zero());
    }

    #[test]
    fn if_without_else_counts_no_else_token() {
        let func = CNode::FunctionDef {
            name: "branch".to_string(),
            params: vec![],
            body: Box::new(CNode::Compound(vec![CNode::If {
                cond: Box::new(CNode::Identifier("a".to_string())),
                then_branch: Box::new(CNode::Compound(vec![])),
                else_branch: None,
            }])),
        };
        let vector = extract_one(func);
        assert_eq!(vector.get(SyntaxTokenKind::If), 1);
        assert_eq!(vector.get(SyntaxTokenKind::Else), 0);
    }

    #[test]
    fn else_presence_counts_even_when_empty() {
        let func = CNode::FunctionDef {
            name: "branch".to_string(),
            params: vec![],
            body: Box::new(CNode::Compound(vec![CNode::If {
                cond: Box::new(CNode::Identifier("a".to_string())),
                then_branch: Box::new(CNode::Compound(vec![])),
                else_branch: Some(Box::new(CNode::Compound(vec![]))),
            }])),
        };
        let vector = extract_one(func);
        assert_eq!(vector.get(SyntaxTokenKind::If), 1);
        assert_eq!(vector.get(SyntaxTokenKind::Else), 1);
    }

    #[test]
    fn identifier_results_degrade_to_zero_in_merges() {
        let func = CNode::FunctionDef {
            name: "ref".to_string(),
            params: vec![],
            body: Box::new(CNode::Compound(vec![CNode::Member {
                access: MemberAccess::Arrow,
                object: Box::new(CNode::Identifier("p".to_string())),
                field: Box::new(CNode::Identifier("x".to_string())),
            }])),
        };
        let vector = extract_one(func);
        assert_eq!(vector.get(SyntaxTokenKind::MemberArrow), 1);
        assert_eq!(vector.cells().iter().sum::<u32>(), 1);
    }

    #[test]
    fn declaration_chain_counts_each_level() {
        // int *names[8]; -> array of pointers
        let func = CNode::FunctionDef {
            name: "decls".to_string(),
            params: vec![],
            body: Box::new(CNode::Compound(vec![CNode::Decl {
                ty: Box::new(CNode::ArrayDecl {
                    inner: Box::new(CNode::PtrDecl(Box::new(CNode::TypeName(
                        "int".to_string(),
                    )))),
                    size: Some(Box::new(CNode::Literal("8".to_string()))),
                }),
            }])),
        };
        let vector = extract_one(func);
        assert_eq!(vector.get(SyntaxTokenKind::ArrDecl), 1);
        assert_eq!(vector.get(SyntaxTokenKind::PtrDecl), 1);
        assert_eq!(vector.get(SyntaxTokenKind::TypeDecl), 1);
    }

    #[test]
    fn parameters_merge_into_the_function_vector() {
        let func = CNode::FunctionDef {
            name: "params".to_string(),
            params: vec![
                CNode::Decl {
                    ty: Box::new(CNode::TypeName("int".to_string())),
                },
                CNode::Decl {
                    ty: Box::new(CNode::PtrDecl(Box::new(CNode::TypeName(
                        "char".to_string(),
                    )))),
                },
            ],
            body: Box::new(CNode::Compound(vec![])),
        };
        let vector = extract_one(func);
        assert_eq!(vector.get(SyntaxTokenKind::TypeDecl), 2);
        assert_eq!(vector.get(SyntaxTokenKind::PtrDecl), 1);
    }

    #[test]
    fn non_function_items_are_skipped() {
        let unit = CNode::TranslationUnit(vec![
            CNode::Opaque("typedef".to_string()),
            CNode::FunctionDef {
                name: "only".to_string(),
                params: vec![],
                body: Box::new(CNode::Compound(vec![])),
            },
        ]);
        let records = FeatureExtractor::new().extract(&unit);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "only");
    }
}
