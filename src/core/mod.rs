pub mod ast;
pub mod vector;

pub use ast::{CNode, MemberAccess};
pub use vector::{FeatureVector, SyntaxTokenKind, VisitValue, TOKEN_KIND_COUNT};
