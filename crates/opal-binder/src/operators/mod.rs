//! Expression binding for operators.
//!
//! [`bind_expr`] is the entry point: it walks the syntax tree, resolves every
//! operator through the overload engine, applies operand conversions, folds
//! constants and produces a [`BoundExpr`]. Binding never fails; diagnostics go
//! to the bag and erroneous subtrees become recovery nodes that suppress
//! cascading operator diagnostics.

use opal_core::{ConstantValue, Decimal, Diagnostic, DiagnosticBag, PrimitiveKind, Span, Ty};
use opal_syntax::{AssignOp, BinaryOp, Expr, LiteralValue};

use crate::bound::{BoundExpr, BoundExprKind};
use crate::context::{BinderContext, LocalKind};

mod binary;
mod coalesce;
mod compound;
mod conditional;
mod increment;
mod is_as;
mod logical;
mod unary;

pub(crate) use binary::operand_display;

/// Bind an expression.
pub fn bind_expr(ctx: &BinderContext<'_>, bag: &mut DiagnosticBag, expr: Expr<'_>) -> BoundExpr {
    match expr.skip_parens() {
        Expr::Literal(lit) => bind_literal(bag, lit.value, lit.span),
        Expr::Ident(ident) => bind_ident(ctx, bag, ident.name, ident.span),
        Expr::Member(member) => bind_member(ctx, bag, member),
        Expr::Binary(node) => match node.op {
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
                logical::bind_logical(ctx, bag, node.op, node.left, node.right, node.span)
            }
            BinaryOp::Coalesce => {
                coalesce::bind_coalesce(ctx, bag, node.left, node.right, node.span)
            }
            _ => bind_binary_chain(ctx, bag, node),
        },
        Expr::Unary(node) => unary::bind_unary(ctx, bag, node.op, node.operand, node.span),
        Expr::IncDec(node) => increment::bind_inc_dec(ctx, bag, node),
        Expr::Assign(node) => match node.op {
            AssignOp::Assign => compound::bind_assignment(ctx, bag, node),
            AssignOp::Compound(BinaryOp::Coalesce) => {
                coalesce::bind_coalescing_assignment(ctx, bag, node.target, node.value, node.span)
            }
            AssignOp::Compound(op) => compound::bind_compound(ctx, bag, op, node),
        },
        Expr::Cond(node) => conditional::bind_conditional(ctx, bag, node),
        Expr::Is(node) => is_as::bind_is(ctx, bag, node),
        Expr::As(node) => is_as::bind_as(ctx, bag, node),
        Expr::Tuple(node) => {
            let elements: Vec<BoundExpr> = node
                .elements
                .iter()
                .map(|e| bind_expr(ctx, bag, *e))
                .collect();
            let has_errors = elements.iter().any(|e| e.has_errors);
            BoundExpr {
                kind: BoundExprKind::Tuple { elements },
                ty: None,
                constant: None,
                has_errors,
                span: node.span,
            }
        }
        Expr::Interpolated(node) => BoundExpr::typed(
            BoundExprKind::InterpolatedString,
            Ty::primitive(PrimitiveKind::String),
            node.span,
        ),
        Expr::Default(node) => match node.ty {
            Some(target) => match crate::names::bind_type(ctx, bag, target) {
                Some(ty) => BoundExpr::typed(BoundExprKind::DefaultValue, ty, node.span),
                None => BoundExpr::error(node.span),
            },
            None => BoundExpr::default_literal(node.span),
        },
        Expr::Paren(_) => unreachable!("skip_parens removed parentheses"),
    }
}

/// Bind a left-deep chain of simple binary operators iteratively.
///
/// Operator chains associate left, so `a + b + c + ...` nests entirely in
/// the left child; long concatenations would otherwise recurse once per
/// operator and overflow the stack. The chain is unrolled onto an explicit
/// stack and bound bottom-up.
fn bind_binary_chain(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    node: &opal_syntax::BinaryExpr<'_>,
) -> BoundExpr {
    let mut chain = vec![node];
    let mut leftmost = node.left;
    while let Expr::Binary(inner) = leftmost.skip_parens() {
        if inner.op.is_conditional_logical() || inner.op == BinaryOp::Coalesce {
            break;
        }
        chain.push(inner);
        leftmost = inner.left;
    }

    let mut left = bind_expr(ctx, bag, leftmost);
    while let Some(link) = chain.pop() {
        let right = bind_expr(ctx, bag, link.right);
        left = binary::bind_binary_operator(ctx, bag, link.op, left, right, link.span);
    }
    left
}

fn bind_literal(bag: &mut DiagnosticBag, value: LiteralValue<'_>, span: Span) -> BoundExpr {
    let (constant, kind) = match value {
        LiteralValue::Null => return BoundExpr::null_literal(span),
        LiteralValue::Bool(v) => (ConstantValue::Bool(v), PrimitiveKind::Bool),
        LiteralValue::Char(v) => (ConstantValue::Char(v), PrimitiveKind::Char),
        LiteralValue::Int32(v) => (ConstantValue::Int32(v), PrimitiveKind::Int32),
        LiteralValue::Int64(v) => (ConstantValue::Int64(v), PrimitiveKind::Int64),
        LiteralValue::Uint32(v) => (ConstantValue::Uint32(v), PrimitiveKind::Uint32),
        LiteralValue::Uint64(v) => (ConstantValue::Uint64(v), PrimitiveKind::Uint64),
        LiteralValue::Float32(v) => (ConstantValue::float32(v), PrimitiveKind::Float32),
        LiteralValue::Float64(v) => (ConstantValue::float64(v), PrimitiveKind::Float64),
        LiteralValue::Decimal { mantissa, scale } => match Decimal::new(mantissa, scale) {
            Some(d) => (ConstantValue::Decimal(d), PrimitiveKind::Decimal),
            None => {
                bag.push(Diagnostic::DecimalOverflow { span });
                return BoundExpr::error(span);
            }
        },
        LiteralValue::String(v) => (ConstantValue::String(v.to_string()), PrimitiveKind::String),
    };
    BoundExpr::constant_literal(constant, Ty::primitive(kind), span)
}

fn bind_ident(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    name: &str,
    span: Span,
) -> BoundExpr {
    let Some(local) = ctx.local(name) else {
        bag.push(Diagnostic::TypeNotFound {
            name: name.to_string(),
            span,
        });
        return BoundExpr::error(span);
    };
    match &local.kind {
        LocalKind::Variable { assignable } => BoundExpr::typed(
            BoundExprKind::Local {
                name: name.to_string(),
                assignable: *assignable,
            },
            local.ty,
            span,
        ),
        LocalKind::Constant(value) => BoundExpr {
            kind: BoundExprKind::Local {
                name: name.to_string(),
                assignable: false,
            },
            ty: Some(local.ty),
            constant: Some(value.clone()),
            has_errors: false,
            span,
        },
        LocalKind::Event { owner } => BoundExpr::typed(
            BoundExprKind::EventAccess {
                owner: *owner,
                event: name.to_string(),
            },
            local.ty,
            span,
        ),
    }
}

/// Member accesses exist in this subsystem only to reach events
/// (`obj.Changed += handler`); everything else is out of scope here.
fn bind_member(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    member: &opal_syntax::MemberExpr<'_>,
) -> BoundExpr {
    let receiver = bind_expr(ctx, bag, member.receiver);
    if receiver.has_errors {
        return BoundExpr::error(member.span);
    }
    let event = receiver.ty.and_then(|ty| {
        let def = ctx.table.type_def(ty.strip_nullable().hash)?;
        def.events
            .iter()
            .find(|e| e.name == member.name)
            .map(|e| (def.hash, Ty::simple(e.delegate_type)))
    });
    match event {
        Some((owner, delegate)) => BoundExpr::typed(
            BoundExprKind::EventAccess {
                owner,
                event: member.name.to_string(),
            },
            delegate,
            member.span,
        ),
        None => {
            bag.push(Diagnostic::TypeNotFound {
                name: member.name.to_string(),
                span: member.span,
            });
            BoundExpr::error(member.span)
        }
    }
}
