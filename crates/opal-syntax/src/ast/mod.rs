//! AST nodes for expressions, type references and using directives.

mod directives;
mod expr;
mod ops;
mod types;

pub use directives::{UsingDirective, UsingKind};
pub use expr::{
    AsExpr, AssignExpr, BinaryExpr, CondExpr, DefaultExpr, Expr, IdentExpr, IncDecExpr,
    InterpolatedExpr, IsExpr, LiteralExpr, LiteralValue, MemberExpr, ParenExpr, TupleExpr,
    UnaryExpr,
};
pub use ops::{AssignOp, BinaryOp, IncDecOp, UnaryOp};
pub use types::TypeExpr;
