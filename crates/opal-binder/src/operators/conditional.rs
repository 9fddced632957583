//! `cond ? a : b` binding.

use opal_core::{ConstantValue, Diagnostic, DiagnosticBag, PrimitiveKind, Ty};
use opal_syntax::CondExpr;

use crate::bound::{BoundExpr, BoundExprKind};
use crate::context::BinderContext;
use crate::conversion::ConversionSource;
use crate::operators::{bind_expr, operand_display};

pub(super) fn bind_conditional(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    node: &CondExpr<'_>,
) -> BoundExpr {
    let span = node.span;
    let cond = bind_expr(ctx, bag, node.cond);
    let when_true = bind_expr(ctx, bag, node.when_true);
    let when_false = bind_expr(ctx, bag, node.when_false);
    if cond.has_errors || when_true.has_errors || when_false.has_errors {
        return BoundExpr::error(span);
    }

    let bool_ty = Ty::primitive(PrimitiveKind::Bool);
    let cond_conv = ctx
        .oracle
        .classify(ConversionSource::Expr(&cond), bool_ty, false);
    if !cond_conv.exists() || !cond_conv.is_implicit {
        bag.push(Diagnostic::NoImplicitConversion {
            from: operand_display(ctx.table, &cond),
            to: ctx.table.display(bool_ty),
            span: cond.span,
        });
        return BoundExpr::error(span);
    }
    let cond = cond.converted(cond_conv, bool_ty);

    let Some(result_ty) = common_type(ctx, &when_true, &when_false) else {
        bag.push(Diagnostic::NoImplicitConversion {
            from: operand_display(ctx.table, &when_true),
            to: operand_display(ctx.table, &when_false),
            span,
        });
        return BoundExpr::error(span);
    };

    let checked = ctx.is_checked();
    let true_conv = ctx
        .oracle
        .classify(ConversionSource::Expr(&when_true), result_ty, checked);
    let false_conv = ctx
        .oracle
        .classify(ConversionSource::Expr(&when_false), result_ty, checked);
    let when_true = when_true.converted(true_conv, result_ty);
    let when_false = when_false.converted(false_conv, result_ty);

    // A constant condition selects one branch at compile time.
    let constant = match &cond.constant {
        Some(ConstantValue::Bool(true)) => when_true.constant.clone(),
        Some(ConstantValue::Bool(false)) => when_false.constant.clone(),
        _ => None,
    };

    BoundExpr {
        kind: BoundExprKind::Conditional {
            cond: Box::new(cond),
            when_true: Box::new(when_true),
            when_false: Box::new(when_false),
        },
        ty: Some(result_ty),
        constant,
        has_errors: false,
        span,
    }
}

/// Best common type of the two branches: equal types win outright, then
/// one-way implicit convertibility breaks the tie.
fn common_type(ctx: &BinderContext<'_>, a: &BoundExpr, b: &BoundExpr) -> Option<Ty> {
    match (a.ty, b.ty) {
        (Some(ta), Some(tb)) if ta == tb => Some(ta),
        (Some(ta), Some(tb)) => {
            let a_to_b = ctx.oracle.classify(ConversionSource::Expr(a), tb, false);
            let b_to_a = ctx.oracle.classify(ConversionSource::Expr(b), ta, false);
            let a_to_b = a_to_b.exists() && a_to_b.is_implicit;
            let b_to_a = b_to_a.exists() && b_to_a.is_implicit;
            match (a_to_b, b_to_a) {
                (true, false) => Some(tb),
                (false, true) => Some(ta),
                // Equal types were handled above; mutual convertibility with
                // distinct types is as undecidable as none at all.
                _ => None,
            }
        }
        // An untyped branch (null, default) adopts the other branch's type
        // when the conversion holds.
        (Some(ta), None) => {
            let conv = ctx.oracle.classify(ConversionSource::Expr(b), ta, false);
            (conv.exists() && conv.is_implicit).then_some(ta)
        }
        (None, Some(tb)) => {
            let conv = ctx.oracle.classify(ConversionSource::Expr(a), tb, false);
            (conv.exists() && conv.is_implicit).then_some(tb)
        }
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::StandardConversions;
    use opal_core::{Span, well_known};
    use opal_registry::SymbolTable;
    use opal_syntax::{Expr, IdentExpr, LiteralExpr, LiteralValue};

    fn span() -> Span {
        Span::point(1, 1)
    }

    fn lit(value: LiteralValue<'static>) -> Expr<'static> {
        Expr::Literal(LiteralExpr { value, span: span() })
    }

    fn cond_expr(
        cond: Expr<'static>,
        when_true: Expr<'static>,
        when_false: Expr<'static>,
    ) -> CondExpr<'static> {
        CondExpr {
            cond,
            when_true,
            when_false,
            span: span(),
        }
    }

    #[test]
    fn constant_condition_folds_to_chosen_branch() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let node = cond_expr(
            lit(LiteralValue::Bool(true)),
            lit(LiteralValue::Int32(1)),
            lit(LiteralValue::Int32(2)),
        );
        let bound = bind_conditional(&ctx, &mut bag, &node);
        assert_eq!(bound.constant, Some(ConstantValue::Int32(1)));
        assert_eq!(bound.ty, Some(Ty::simple(well_known::INT32)));
        assert!(bag.is_empty());
    }

    #[test]
    fn wider_branch_type_wins() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("i", Ty::primitive(PrimitiveKind::Int32));
        ctx.declare_variable("l", Ty::primitive(PrimitiveKind::Int64));
        let mut bag = DiagnosticBag::new();
        let node = cond_expr(
            lit(LiteralValue::Bool(false)),
            Expr::Ident(IdentExpr { name: "i", span: span() }),
            Expr::Ident(IdentExpr { name: "l", span: span() }),
        );
        let bound = bind_conditional(&ctx, &mut bag, &node);
        assert_eq!(bound.ty, Some(Ty::simple(well_known::INT64)));
        assert!(bag.is_empty());
    }

    #[test]
    fn non_bool_condition_is_rejected() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let node = cond_expr(
            lit(LiteralValue::Int32(1)),
            lit(LiteralValue::Int32(1)),
            lit(LiteralValue::Int32(2)),
        );
        let bound = bind_conditional(&ctx, &mut bag, &node);
        assert!(bound.has_errors);
        assert_eq!(bag.codes(), vec!["ERR_NoImplicitConv"]);
    }

    #[test]
    fn unrelated_branch_types_are_rejected() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let node = cond_expr(
            lit(LiteralValue::Bool(true)),
            lit(LiteralValue::Int32(1)),
            lit(LiteralValue::String("two")),
        );
        let bound = bind_conditional(&ctx, &mut bag, &node);
        assert!(bound.has_errors);
        assert_eq!(bag.codes(), vec!["ERR_NoImplicitConv"]);
    }

    #[test]
    fn null_branch_adopts_reference_type() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let node = cond_expr(
            lit(LiteralValue::Bool(true)),
            lit(LiteralValue::String("s")),
            lit(LiteralValue::Null),
        );
        let bound = bind_conditional(&ctx, &mut bag, &node);
        assert_eq!(bound.ty, Some(Ty::simple(well_known::STRING)));
        assert!(bag.is_empty(), "{:?}", bag.codes());
    }
}
