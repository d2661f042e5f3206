//! Fixed-dimension syntactic feature vectors and their merge algebra.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Number of counted token kinds; every feature vector has exactly this
/// many cells.
pub const TOKEN_KIND_COUNT: usize = 32;

/// The closed set of syntactic categories counted per function.
///
/// Discriminants are the cell indices of [`FeatureVector`], so the order
/// here is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntaxTokenKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    PostInc,
    PreInc,
    PostDec,
    PreDec,
    Assign,
    Eq,
    Ne,
    And,
    Or,
    Not,
    Lt,
    Le,
    Gt,
    Ge,
    AddrOf,
    MemberDot,
    MemberArrow,
    For,
    While,
    DoWhile,
    If,
    Else,
    FuncCall,
    PtrDecl,
    TypeDecl,
    ArrDecl,
    Cast,
}

impl SyntaxTokenKind {
    pub const ALL: [SyntaxTokenKind; TOKEN_KIND_COUNT] = [
        SyntaxTokenKind::Add,
        SyntaxTokenKind::Sub,
        SyntaxTokenKind::Mul,
        SyntaxTokenKind::Div,
        SyntaxTokenKind::Mod,
        SyntaxTokenKind::PostInc,
        SyntaxTokenKind::PreInc,
        SyntaxTokenKind::PostDec,
        SyntaxTokenKind::PreDec,
        SyntaxTokenKind::Assign,
        SyntaxTokenKind::Eq,
        SyntaxTokenKind::Ne,
        SyntaxTokenKind::And,
        SyntaxTokenKind::Or,
        SyntaxTokenKind::Not,
        SyntaxTokenKind::Lt,
        SyntaxTokenKind::Le,
        SyntaxTokenKind::Gt,
        SyntaxTokenKind::Ge,
        SyntaxTokenKind::AddrOf,
        SyntaxTokenKind::MemberDot,
        SyntaxTokenKind::MemberArrow,
        SyntaxTokenKind::For,
        SyntaxTokenKind::While,
        SyntaxTokenKind::DoWhile,
        SyntaxTokenKind::If,
        SyntaxTokenKind::Else,
        SyntaxTokenKind::FuncCall,
        SyntaxTokenKind::PtrDecl,
        SyntaxTokenKind::TypeDecl,
        SyntaxTokenKind::ArrDecl,
        SyntaxTokenKind::Cast,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up the token kind for an operator spelling. Unlisted spellings
    /// (`~`, `<<`, `+=`, ...) are not counted and return `None`.
    pub fn from_symbol(symbol: &str) -> Option<SyntaxTokenKind> {
        SYMBOL_TABLE.get(symbol).copied()
    }
}

impl fmt::Display for SyntaxTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyntaxTokenKind::Add => "add",
            SyntaxTokenKind::Sub => "sub",
            SyntaxTokenKind::Mul => "mul",
            SyntaxTokenKind::Div => "div",
            SyntaxTokenKind::Mod => "mod",
            SyntaxTokenKind::PostInc => "post-inc",
            SyntaxTokenKind::PreInc => "pre-inc",
            SyntaxTokenKind::PostDec => "post-dec",
            SyntaxTokenKind::PreDec => "pre-dec",
            SyntaxTokenKind::Assign => "assign",
            SyntaxTokenKind::Eq => "eq",
            SyntaxTokenKind::Ne => "ne",
            SyntaxTokenKind::And => "and",
            SyntaxTokenKind::Or => "or",
            SyntaxTokenKind::Not => "not",
            SyntaxTokenKind::Lt => "lt",
            SyntaxTokenKind::Le => "le",
            SyntaxTokenKind::Gt => "gt",
            SyntaxTokenKind::Ge => "ge",
            SyntaxTokenKind::AddrOf => "addr-of",
            SyntaxTokenKind::MemberDot => "member-dot",
            SyntaxTokenKind::MemberArrow => "member-arrow",
            SyntaxTokenKind::For => "for",
            SyntaxTokenKind::While => "while",
            SyntaxTokenKind::DoWhile => "do-while",
            SyntaxTokenKind::If => "if",
            SyntaxTokenKind::Else => "else",
            SyntaxTokenKind::FuncCall => "func-call",
            SyntaxTokenKind::PtrDecl => "ptr-decl",
            SyntaxTokenKind::TypeDecl => "type-decl",
            SyntaxTokenKind::ArrDecl => "arr-decl",
            SyntaxTokenKind::Cast => "cast",
        };
        f.write_str(name)
    }
}

/// Operator spelling to token kind. Postfix increment/decrement are spelled
/// `p++`/`p--` by the parser to keep them apart from the prefix forms.
/// `sizeof` deliberately counts as a function call, and the single-symbol
/// entries are shared between unary and binary uses (`-`, `*`, `&`).
static SYMBOL_TABLE: Lazy<HashMap<&'static str, SyntaxTokenKind>> = Lazy::new(|| {
    HashMap::from([
        ("+", SyntaxTokenKind::Add),
        ("-", SyntaxTokenKind::Sub),
        ("*", SyntaxTokenKind::Mul),
        ("/", SyntaxTokenKind::Div),
        ("%", SyntaxTokenKind::Mod),
        ("p++", SyntaxTokenKind::PostInc),
        ("++", SyntaxTokenKind::PreInc),
        ("p--", SyntaxTokenKind::PostDec),
        ("--", SyntaxTokenKind::PreDec),
        ("=", SyntaxTokenKind::Assign),
        ("==", SyntaxTokenKind::Eq),
        ("!=", SyntaxTokenKind::Ne),
        ("&&", SyntaxTokenKind::And),
        ("||", SyntaxTokenKind::Or),
        ("!", SyntaxTokenKind::Not),
        (".", SyntaxTokenKind::MemberDot),
        ("->", SyntaxTokenKind::MemberArrow),
        ("<", SyntaxTokenKind::Lt),
        ("<=", SyntaxTokenKind::Le),
        (">", SyntaxTokenKind::Gt),
        (">=", SyntaxTokenKind::Ge),
        ("sizeof", SyntaxTokenKind::FuncCall),
        ("&", SyntaxTokenKind::AddrOf),
    ])
});

/// Per-function token counts, one cell per [`SyntaxTokenKind`] in
/// enumeration order. The all-zero vector is the identity of [`merge`].
///
/// [`merge`]: FeatureVector::merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    cells: [u32; TOKEN_KIND_COUNT],
}

impl FeatureVector {
    pub fn zero() -> FeatureVector {
        FeatureVector {
            cells: [0; TOKEN_KIND_COUNT],
        }
    }

    /// Increment one token kind by one.
    pub fn bump(&mut self, kind: SyntaxTokenKind) {
        self.cells[kind.index()] += 1;
    }

    /// Increment the token kind an operator spelling maps to. Unmapped
    /// spellings increment nothing; this is policy, not an error.
    pub fn bump_symbol(&mut self, symbol: &str) {
        if let Some(kind) = SyntaxTokenKind::from_symbol(symbol) {
            self.bump(kind);
        }
    }

    pub fn get(&self, kind: SyntaxTokenKind) -> u32 {
        self.cells[kind.index()]
    }

    pub fn cells(&self) -> &[u32; TOKEN_KIND_COUNT] {
        &self.cells
    }

    pub fn is_zero(&self) -> bool {
        self.cells.iter().all(|&c| c == 0)
    }

    /// The non-zero cells, in enumeration order.
    pub fn non_zero(&self) -> impl Iterator<Item = (SyntaxTokenKind, u32)> + '_ {
        SyntaxTokenKind::ALL
            .iter()
            .zip(self.cells.iter())
            .filter(|(_, &count)| count > 0)
            .map(|(&kind, &count)| (kind, count))
    }

    /// Elementwise sum of every vector-valued part. Non-vector visit values
    /// contribute nothing; an empty input yields the zero vector. Integer
    /// addition makes this commutative and associative, so sibling
    /// visitation order never changes a result.
    pub fn merge<I>(parts: I) -> FeatureVector
    where
        I: IntoIterator<Item = VisitValue>,
    {
        let mut merged = FeatureVector::zero();
        for part in parts {
            if let VisitValue::Vector(vector) = part {
                for (cell, add) in merged.cells.iter_mut().zip(vector.cells.iter()) {
                    *cell += add;
                }
            }
        }
        merged
    }

    /// One sample row for the clustering providers.
    pub fn to_row(&self) -> Vec<f64> {
        self.cells.iter().map(|&c| f64::from(c)).collect()
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        FeatureVector::zero()
    }
}

impl From<[u32; TOKEN_KIND_COUNT]> for FeatureVector {
    fn from(cells: [u32; TOKEN_KIND_COUNT]) -> Self {
        FeatureVector { cells }
    }
}

/// What visiting one AST node produces. Reference-style nodes (identifiers)
/// hand back the bare name for their parent instead of a vector; any such
/// value reaching a merge counts as empty, never as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitValue {
    Vector(FeatureVector),
    Name(String),
    Empty,
}

impl VisitValue {
    /// Collapse to a vector, degrading non-vector values to zero.
    pub fn into_vector(self) -> FeatureVector {
        match self {
            VisitValue::Vector(vector) => vector,
            _ => FeatureVector::zero(),
        }
    }
}

impl From<FeatureVector> for VisitValue {
    fn from(vector: FeatureVector) -> Self {
        VisitValue::Vector(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_kinds_cover_every_cell() {
        for (idx, kind) in SyntaxTokenKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), idx);
        }
        assert_eq!(SyntaxTokenKind::ALL.len(), TOKEN_KIND_COUNT);
    }

    #[test]
    fn symbol_table_distinguishes_fixity() {
        assert_eq!(
            SyntaxTokenKind::from_symbol("p++"),
            Some(SyntaxTokenKind::PostInc)
        );
        assert_eq!(
            SyntaxTokenKind::from_symbol("++"),
            Some(SyntaxTokenKind::PreInc)
        );
        assert_eq!(
            SyntaxTokenKind::from_symbol("sizeof"),
            Some(SyntaxTokenKind::FuncCall)
        );
        assert_eq!(SyntaxTokenKind::from_symbol("<<"), None);
    }

    #[test]
    fn unmapped_symbol_bumps_nothing() {
        let mut vector = FeatureVector::zero();
        vector.bump_symbol("+=");
        vector.bump_symbol("~");
        assert!(vector.is_zero());
    }

    #[test]
    fn merge_of_nothing_is_zero() {
        assert_eq!(FeatureVector::merge([]), FeatureVector::zero());
    }

    #[test]
    fn merge_of_one_vector_is_identity() {
        let mut vector = FeatureVector::zero();
        vector.bump(SyntaxTokenKind::If);
        vector.bump(SyntaxTokenKind::Assign);
        assert_eq!(FeatureVector::merge([vector.into()]), vector);
    }

    #[test]
    fn merge_filters_non_vector_values() {
        let mut vector = FeatureVector::zero();
        vector.bump(SyntaxTokenKind::For);
        let merged = FeatureVector::merge([
            VisitValue::Name("i".to_string()),
            vector.into(),
            VisitValue::Empty,
        ]);
        assert_eq!(merged, vector);
    }

    #[test]
    fn non_zero_reports_only_set_cells() {
        let mut vector = FeatureVector::zero();
        vector.bump(SyntaxTokenKind::While);
        vector.bump(SyntaxTokenKind::While);
        vector.bump(SyntaxTokenKind::Cast);
        let cells: Vec<_> = vector.non_zero().collect();
        assert_eq!(
            cells,
            vec![(SyntaxTokenKind::While, 2), (SyntaxTokenKind::Cast, 1)]
        );
    }
}
