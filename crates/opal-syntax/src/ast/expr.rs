//! Expression AST nodes.
//!
//! Interior nodes are arena references (`&'ast`), so `Expr` itself stays two
//! words and chains of operators share the arena.

use opal_core::Span;

use crate::ast::types::TypeExpr;
use crate::ast::{AssignOp, BinaryOp, IncDecOp, UnaryOp};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value.
    Literal(LiteralExpr<'ast>),
    /// Identifier reference (local, constant, or event).
    Ident(IdentExpr<'ast>),
    /// Member access `receiver.name` (needed for event accesses).
    Member(&'ast MemberExpr<'ast>),
    /// Binary operation, including `??`.
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation.
    Unary(&'ast UnaryExpr<'ast>),
    /// Increment/decrement, prefix or postfix.
    IncDec(&'ast IncDecExpr<'ast>),
    /// Assignment, plain or compound.
    Assign(&'ast AssignExpr<'ast>),
    /// Conditional `cond ? a : b`.
    Cond(&'ast CondExpr<'ast>),
    /// `operand is Target` (type test, with constant-pattern fallback).
    Is(&'ast IsExpr<'ast>),
    /// `operand as Target`.
    As(&'ast AsExpr<'ast>),
    /// Tuple literal `(a, b, ...)`, for tuple equality.
    Tuple(&'ast TupleExpr<'ast>),
    /// Interpolated string (participates in deferred concatenation).
    Interpolated(&'ast InterpolatedExpr<'ast>),
    /// `default` / `default(T)`.
    Default(&'ast DefaultExpr<'ast>),
    /// Parenthesized expression.
    Paren(&'ast ParenExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::Member(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::IncDec(e) => e.span,
            Self::Assign(e) => e.span,
            Self::Cond(e) => e.span,
            Self::Is(e) => e.span,
            Self::As(e) => e.span,
            Self::Tuple(e) => e.span,
            Self::Interpolated(e) => e.span,
            Self::Default(e) => e.span,
            Self::Paren(e) => e.span,
        }
    }

    /// Unwrap parentheses.
    pub fn skip_parens(self) -> Expr<'ast> {
        let mut expr = self;
        while let Expr::Paren(inner) = expr {
            expr = inner.expr;
        }
        expr
    }

    /// Whether this expression (modulo parentheses) is the `null` literal.
    pub fn is_null_literal(self) -> bool {
        matches!(
            self.skip_parens(),
            Expr::Literal(LiteralExpr {
                value: LiteralValue::Null,
                ..
            })
        )
    }

    /// Whether this expression (modulo parentheses) is a target-typed
    /// `default` literal.
    pub fn is_default_literal(self) -> bool {
        matches!(self.skip_parens(), Expr::Default(d) if d.ty.is_none())
    }
}

/// A literal value in source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue<'ast> {
    Null,
    Bool(bool),
    Char(char),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    /// Decimal literal carried as raw mantissa/scale.
    Decimal { mantissa: i128, scale: u8 },
    String(&'ast str),
}

/// Literal expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub value: LiteralValue<'ast>,
    pub span: Span,
}

/// Identifier expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentExpr<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

/// Member access `receiver.name`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    pub receiver: Expr<'ast>,
    pub name: &'ast str,
    pub span: Span,
}

/// Binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub op: BinaryOp,
    pub left: Expr<'ast>,
    pub right: Expr<'ast>,
    pub span: Span,
}

/// Unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: Expr<'ast>,
    pub span: Span,
}

/// Increment or decrement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncDecExpr<'ast> {
    pub op: IncDecOp,
    pub operand: Expr<'ast>,
    /// Whether the expression's value is consumed (selects the usage mode of
    /// instance compound operators).
    pub result_used: bool,
    pub span: Span,
}

/// Assignment, plain or compound (including `??=`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    pub op: AssignOp,
    pub target: Expr<'ast>,
    pub value: Expr<'ast>,
    pub span: Span,
}

/// Conditional `cond ? when_true : when_false`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CondExpr<'ast> {
    pub cond: Expr<'ast>,
    pub when_true: Expr<'ast>,
    pub when_false: Expr<'ast>,
    pub span: Span,
}

/// `operand is Target`. The target is kept as a type expression; when it
/// fails to bind as a type the binder retries it as a constant pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsExpr<'ast> {
    pub operand: Expr<'ast>,
    pub target: TypeExpr<'ast>,
    pub span: Span,
}

/// `operand as Target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsExpr<'ast> {
    pub operand: Expr<'ast>,
    pub target: TypeExpr<'ast>,
    pub span: Span,
}

/// Tuple literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleExpr<'ast> {
    pub elements: &'ast [Expr<'ast>],
    pub span: Span,
}

/// Interpolated string. Parts are not modeled further here; the binder only
/// needs to recognize the node to defer concatenation rewriting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolatedExpr<'ast> {
    pub text: &'ast str,
    pub span: Span,
}

/// `default` (target-typed when `ty` is `None`) or `default(T)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultExpr<'ast> {
    pub ty: Option<TypeExpr<'ast>>,
    pub span: Span,
}

/// Parenthesized expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    pub expr: Expr<'ast>,
    pub span: Span,
}
