//! Unary prefix operator binding.

use opal_core::{Diagnostic, DiagnosticBag, Span, Ty};
use opal_syntax::{Expr, UnaryOp};

use crate::bound::{BoundExpr, BoundExprKind};
use crate::context::BinderContext;
use crate::fold::fold_unary;
use crate::operators::{bind_expr, operand_display};
use crate::overload::{
    OverloadResultKind, UnaryOperatorKind as K, UnarySignature, resolve_unary,
};

pub(super) fn bind_unary(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    op: UnaryOp,
    operand: Expr<'_>,
    span: Span,
) -> BoundExpr {
    let operand = bind_expr(ctx, bag, operand);
    if operand.has_errors {
        return BoundExpr::error(span);
    }
    // Untyped operands (null, default, tuples) have no unary operators.
    if operand.ty.is_none() {
        bag.push(Diagnostic::BadUnaryOperator {
            op: op.symbol().to_string(),
            operand: operand_display(ctx.table, &operand),
            span,
        });
        return BoundExpr::error(span);
    }
    if operand.is_dynamic() {
        return BoundExpr::typed(
            BoundExprKind::DynamicUnaryOperator {
                op,
                operand: Box::new(operand),
            },
            Ty::simple(opal_core::well_known::DYNAMIC),
            span,
        );
    }

    let result = resolve_unary(ctx, op, ctx.is_checked(), &operand);
    match result.kind {
        OverloadResultKind::Viable => {
            let candidate = result.best.expect("viable result has a best candidate");
            let signature = candidate.signature;
            if let Some(method) = &signature.method {
                if let Some(message) = &method.obsolete {
                    bag.push(Diagnostic::ObsoleteSymbol {
                        name: method.name.to_string(),
                        message: Some(message.clone()),
                        span,
                    });
                }
            }
            let operand = operand.converted(candidate.conversion, signature.operand);
            let constant = operand
                .constant
                .as_ref()
                .and_then(|c| fold_unary(fold_kind(ctx, &signature), c, span, bag));
            let method = signature.method.as_ref().map(|m| m.method);
            BoundExpr {
                kind: BoundExprKind::UnaryOperator {
                    kind: signature.kind,
                    operand: Box::new(operand),
                    method,
                },
                ty: Some(signature.result),
                constant,
                has_errors: false,
                span,
            }
        }
        OverloadResultKind::Ambiguous => {
            bag.push(Diagnostic::AmbiguousUnaryOperator {
                op: op.symbol().to_string(),
                operand: operand_display(ctx.table, &operand),
                span,
            });
            BoundExpr::error(span)
        }
        OverloadResultKind::OverloadResolutionFailure | OverloadResultKind::Empty => {
            bag.push(Diagnostic::BadUnaryOperator {
                op: op.symbol().to_string(),
                operand: operand_display(ctx.table, &operand),
                span,
            });
            BoundExpr::error(span)
        }
    }
}

/// `~` over an enum folds through the underlying numeric category.
fn fold_kind(ctx: &BinderContext<'_>, signature: &UnarySignature) -> K {
    if signature.kind.category() != K::ENUM {
        return signature.kind;
    }
    match ctx
        .table
        .enum_underlying(signature.operand.strip_nullable())
        .and_then(K::category_of)
    {
        Some(underlying) => signature.kind.difference(K::TYPE_MASK) | underlying,
        None => signature.kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::StandardConversions;
    use opal_core::{ConstantValue, well_known};
    use opal_registry::SymbolTable;
    use opal_syntax::{LiteralExpr, LiteralValue};

    fn span() -> Span {
        Span::point(1, 1)
    }

    fn lit(value: LiteralValue<'static>) -> Expr<'static> {
        Expr::Literal(LiteralExpr { value, span: span() })
    }

    #[test]
    fn negation_folds() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let bound = bind_unary(&ctx, &mut bag, UnaryOp::Neg, lit(LiteralValue::Int32(5)), span());
        assert_eq!(bound.constant, Some(ConstantValue::Int32(-5)));
        assert_eq!(bound.ty, Some(Ty::simple(well_known::INT32)));
    }

    #[test]
    fn negating_ulong_reports_bad_operator() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let bound = bind_unary(
            &ctx,
            &mut bag,
            UnaryOp::Neg,
            lit(LiteralValue::Uint64(1)),
            span(),
        );
        assert!(bound.has_errors);
        // The float/decimal tie is reported as a plain failure, not an
        // ambiguity.
        assert_eq!(bag.codes(), vec!["ERR_BadUnaryOp"]);
    }

    #[test]
    fn not_on_null_is_rejected() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let bound = bind_unary(&ctx, &mut bag, UnaryOp::Not, lit(LiteralValue::Null), span());
        assert!(bound.has_errors);
        assert_eq!(bag.codes(), vec!["ERR_BadUnaryOp"]);
    }
}
