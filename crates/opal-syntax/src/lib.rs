//! Syntax tree types consumed by the binder.
//!
//! Parsing is out of scope for this workspace; these nodes are the input
//! surface of the semantic analyzer. Nodes are arena-allocated (`bumpalo`)
//! and borrow from the arena with the `'ast` lifetime.

pub mod ast;

pub use ast::{
    AssignExpr, AssignOp, AsExpr, BinaryExpr, BinaryOp, CondExpr, DefaultExpr, Expr, IdentExpr,
    IncDecExpr, IncDecOp, InterpolatedExpr, IsExpr, LiteralExpr, LiteralValue, MemberExpr,
    ParenExpr, TupleExpr, TypeExpr, UnaryExpr, UnaryOp, UsingDirective, UsingKind,
};

/// The AST arena. Re-exported so drivers and tests allocate through one name.
pub use bumpalo::Bump;
