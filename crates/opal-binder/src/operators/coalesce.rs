//! `??` and `??=` binding.
//!
//! The left operand must be able to be null: a nullable value type, a
//! reference type, or the untyped `null`/`default` literal. The result type
//! ladder prefers unwrapping a nullable left operand, then the left type
//! itself, then the right type.

use opal_core::{Diagnostic, DiagnosticBag, Span, Ty};
use opal_syntax::{BinaryOp, Expr};

use crate::bound::{BoundExpr, BoundExprKind};
use crate::context::BinderContext;
use crate::conversion::ConversionSource;
use crate::operators::{bind_expr, operand_display};

pub(super) fn bind_coalesce(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    left: Expr<'_>,
    right: Expr<'_>,
    span: Span,
) -> BoundExpr {
    let left = bind_expr(ctx, bag, left);
    let right = bind_expr(ctx, bag, right);
    if left.has_errors || right.has_errors {
        return BoundExpr::error(span);
    }

    if !can_be_null(ctx, &left) {
        push_bad(ctx, bag, &left, &right, span);
        return BoundExpr::error(span);
    }

    let Some(result_ty) = coalesce_result_type(ctx, &left, &right) else {
        push_bad(ctx, bag, &left, &right, span);
        return BoundExpr::error(span);
    };

    let right_conv = ctx
        .oracle
        .classify(ConversionSource::Expr(&right), result_ty, ctx.is_checked());
    let right = right.converted(right_conv, result_ty);
    BoundExpr::typed(
        BoundExprKind::NullCoalescing {
            left: Box::new(left),
            right: Box::new(right),
        },
        result_ty,
        span,
    )
}

pub(super) fn bind_coalescing_assignment(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    target: Expr<'_>,
    value: Expr<'_>,
    span: Span,
) -> BoundExpr {
    let target = bind_expr(ctx, bag, target);
    let value = bind_expr(ctx, bag, value);
    if target.has_errors || value.has_errors {
        return BoundExpr::error(span);
    }
    if !target.is_assignable_location() {
        bag.push(Diagnostic::NotAssignable { span });
        return BoundExpr::error(span);
    }
    let target_ty = target.ty.expect("assignable locations are typed");
    if !target_ty.is_nullable() && !ctx.table.is_reference_type(target_ty) && !target_ty.is_dynamic()
    {
        push_bad(ctx, bag, &target, &value, span);
        return BoundExpr::error(span);
    }

    // `a ??= b` where `a : A?` and `b : A0` assigns the lifted value but the
    // expression itself is the unwrapped `A0`.
    let stripped = target_ty.strip_nullable();
    if target_ty.is_nullable() {
        let to_stripped =
            ctx.oracle
                .classify(ConversionSource::Expr(&value), stripped, ctx.is_checked());
        if to_stripped.exists() && to_stripped.is_implicit {
            let value = value.converted(to_stripped, stripped);
            return BoundExpr::typed(
                BoundExprKind::NullCoalescingAssignment {
                    target: Box::new(target),
                    value: Box::new(value),
                },
                stripped,
                span,
            );
        }
    }

    let to_target =
        ctx.oracle
            .classify(ConversionSource::Expr(&value), target_ty, ctx.is_checked());
    if !to_target.exists() || !to_target.is_implicit {
        bag.push(Diagnostic::NoImplicitConversion {
            from: operand_display(ctx.table, &value),
            to: ctx.table.display(target_ty),
            span,
        });
        return BoundExpr::error(span);
    }
    let value = value.converted(to_target, target_ty);
    BoundExpr::typed(
        BoundExprKind::NullCoalescingAssignment {
            target: Box::new(target),
            value: Box::new(value),
        },
        target_ty,
        span,
    )
}

fn can_be_null(ctx: &BinderContext<'_>, operand: &BoundExpr) -> bool {
    match operand.ty {
        None => true,
        Some(ty) => ty.is_nullable() || ty.is_dynamic() || ctx.table.is_reference_type(ty),
    }
}

/// The result type ladder. `None` means no type works and the operator is
/// reported as inapplicable.
fn coalesce_result_type(
    ctx: &BinderContext<'_>,
    left: &BoundExpr,
    right: &BoundExpr,
) -> Option<Ty> {
    let checked = ctx.is_checked();
    let Some(left_ty) = left.ty else {
        // `null ?? b` takes the right operand's type outright.
        return right.ty;
    };

    if left_ty.is_nullable() {
        let stripped = left_ty.strip_nullable();
        let conv = ctx
            .oracle
            .classify(ConversionSource::Expr(right), stripped, checked);
        if conv.exists() && conv.is_implicit {
            return Some(stripped);
        }
    }

    let conv = ctx
        .oracle
        .classify(ConversionSource::Expr(right), left_ty, checked);
    if conv.exists() && conv.is_implicit {
        return Some(left_ty);
    }

    if let Some(right_ty) = right.ty {
        let source = if left_ty.is_nullable() {
            ConversionSource::Type(left_ty.strip_nullable())
        } else {
            ConversionSource::Type(left_ty)
        };
        let conv = ctx.oracle.classify(source, right_ty, checked);
        if conv.exists() && conv.is_implicit {
            return Some(right_ty);
        }
    }
    None
}

fn push_bad(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    left: &BoundExpr,
    right: &BoundExpr,
    span: Span,
) {
    bag.push(Diagnostic::BadBinaryOperator {
        op: BinaryOp::Coalesce.symbol().to_string(),
        left: operand_display(ctx.table, left),
        right: operand_display(ctx.table, right),
        span,
    });
}
