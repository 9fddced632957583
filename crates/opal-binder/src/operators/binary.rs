//! Binary operator binding.

use opal_core::{
    ConstantValue, Diagnostic, DiagnosticBag, Feature, PrimitiveKind, Span, Ty,
    check_feature_availability,
};
use opal_registry::SymbolTable;
use opal_syntax::BinaryOp;

use crate::bound::{BoundExpr, BoundExprKind};
use crate::context::BinderContext;
use crate::fold::fold_binary;
use crate::overload::{
    BinaryCandidate, BinaryOperatorKind as K, BinarySignature, CandidateSourceKind,
    OverloadResultKind, resolve_binary,
};

/// Bind one binary operator over already-bound operands.
pub(super) fn bind_binary_operator(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    op: BinaryOp,
    left: BoundExpr,
    right: BoundExpr,
    span: Span,
) -> BoundExpr {
    // An erroneous operand already produced a diagnostic; resolving an
    // operator over it would only cascade.
    if left.has_errors || right.has_errors {
        return BoundExpr::error(span);
    }

    if let Some(diag) = (op == BinaryOp::Ushr)
        .then(|| check_feature_availability(Feature::UnsignedRightShift, ctx.version, span))
        .flatten()
    {
        bag.push(diag);
        return BoundExpr::error(span);
    }

    if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
        // null == null folds; no operator resolution is involved.
        if left.is_null_literal() && right.is_null_literal() {
            return BoundExpr::constant_literal(
                ConstantValue::Bool(op == BinaryOp::Eq),
                Ty::primitive(PrimitiveKind::Bool),
                span,
            );
        }
        if is_tuple(&left) || is_tuple(&right) {
            return bind_tuple_equality(ctx, bag, op, left, right, span);
        }
    }

    if op == BinaryOp::Add && (is_interpolated(&left) || is_interpolated(&right)) {
        return bind_interpolated_concat(ctx, bag, left, right, span);
    }

    if left.is_dynamic() || right.is_dynamic() {
        return bind_dynamic_binary(ctx, bag, op, left, right, span);
    }

    let result = resolve_binary(ctx, op, ctx.is_checked(), &left, &right);
    match result.kind {
        OverloadResultKind::Viable => {
            let candidate = result.best.expect("viable result has a best candidate");
            apply_binary_candidate(ctx, bag, candidate, left, right, span)
        }
        OverloadResultKind::Ambiguous => {
            bag.push(Diagnostic::AmbiguousBinaryOperator {
                op: op.symbol().to_string(),
                left: operand_display(ctx.table, &left),
                right: operand_display(ctx.table, &right),
                span,
            });
            BoundExpr::error(span)
        }
        OverloadResultKind::OverloadResolutionFailure | OverloadResultKind::Empty => {
            // The rewrite only applies when no user-defined equality was in
            // play; a failed user-defined set still reports normally.
            if result.original_user_defined.is_empty() {
                if let Some(check) = null_check_rewrite(op, &left, &right, span) {
                    return check;
                }
            }
            bag.push(Diagnostic::BadBinaryOperator {
                op: op.symbol().to_string(),
                left: operand_display(ctx.table, &left),
                right: operand_display(ctx.table, &right),
                span,
            });
            BoundExpr::error(span)
        }
    }
}

fn apply_binary_candidate(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    candidate: BinaryCandidate,
    left: BoundExpr,
    right: BoundExpr,
    span: Span,
) -> BoundExpr {
    let signature = candidate.signature;
    check_candidate_features(ctx, bag, candidate.source, &signature, span);
    if let Some(method) = &signature.method {
        if let Some(message) = &method.obsolete {
            bag.push(Diagnostic::ObsoleteSymbol {
                name: method.name.to_string(),
                message: Some(message.clone()),
                span,
            });
        }
    }

    let left = left.converted(candidate.left_conversion, signature.left);
    let right = right.converted(candidate.right_conversion, signature.right);

    let constant = match (&left.constant, &right.constant) {
        (Some(l), Some(r)) => {
            fold_binary(fold_kind(ctx.table, &signature), l, r, span, bag)
        }
        _ => None,
    };

    let method = signature.method.as_ref().map(|m| m.method);
    BoundExpr {
        kind: BoundExprKind::BinaryOperator {
            kind: signature.kind,
            left: Box::new(left),
            right: Box::new(right),
            method,
        },
        ty: Some(signature.result),
        constant,
        has_errors: false,
        span,
    }
}

/// Feature gates that apply at the moment a candidate is selected.
pub(super) fn check_candidate_features(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    source: CandidateSourceKind,
    signature: &BinarySignature,
    span: Span,
) {
    if let CandidateSourceKind::Extension { .. } = source {
        if let Some(diag) =
            check_feature_availability(Feature::ExtensionOperators, ctx.version, span)
        {
            bag.push(diag);
        }
    }
    if signature.method.as_ref().is_some_and(|m| m.is_checked_name()) {
        if let Some(diag) = check_feature_availability(Feature::CheckedOperators, ctx.version, span)
        {
            bag.push(diag);
        }
    }
}

/// Enum operator kinds fold through the enum's underlying numeric category.
fn fold_kind(table: &SymbolTable, signature: &BinarySignature) -> K {
    let category = signature.kind.category();
    let enum_side = if category == K::ENUM || category == K::ENUM_AND_UNDERLYING {
        signature.left
    } else if category == K::UNDERLYING_AND_ENUM {
        signature.right
    } else {
        return signature.kind;
    };
    match table
        .enum_underlying(enum_side.strip_nullable())
        .and_then(K::category_of)
    {
        Some(underlying) => signature.kind.difference(K::TYPE_MASK) | underlying,
        None => signature.kind,
    }
}

fn is_tuple(expr: &BoundExpr) -> bool {
    matches!(expr.kind, BoundExprKind::Tuple { .. })
}

fn is_interpolated(expr: &BoundExpr) -> bool {
    matches!(
        expr.kind,
        BoundExprKind::InterpolatedString | BoundExprKind::DeferredInterpolatedConcat { .. }
    )
}

/// `(a, b) == (c, d)` binds element-wise and yields bool.
fn bind_tuple_equality(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    op: BinaryOp,
    left: BoundExpr,
    right: BoundExpr,
    span: Span,
) -> BoundExpr {
    let (BoundExprKind::Tuple { elements: lhs }, BoundExprKind::Tuple { elements: rhs }) =
        (&left.kind, &right.kind)
    else {
        // A tuple literal compared against a non-tuple has no conversions.
        bag.push(Diagnostic::BadBinaryOperator {
            op: op.symbol().to_string(),
            left: operand_display(ctx.table, &left),
            right: operand_display(ctx.table, &right),
            span,
        });
        return BoundExpr::error(span);
    };
    if lhs.len() != rhs.len() {
        bag.push(Diagnostic::BadBinaryOperator {
            op: op.symbol().to_string(),
            left: operand_display(ctx.table, &left),
            right: operand_display(ctx.table, &right),
            span,
        });
        return BoundExpr::error(span);
    }
    let comparisons: Vec<BoundExpr> = lhs
        .iter()
        .zip(rhs.iter())
        .map(|(l, r)| bind_binary_operator(ctx, bag, op, l.clone(), r.clone(), span))
        .collect();
    let has_errors = comparisons.iter().any(|c| c.has_errors);
    BoundExpr {
        kind: BoundExprKind::TupleEquality {
            negated: op == BinaryOp::Ne,
            comparisons,
        },
        ty: Some(Ty::primitive(PrimitiveKind::Bool)),
        constant: None,
        has_errors,
        span,
    }
}

/// `$"..." + s` stays a deferred concat node so a later rewrite can build
/// one interpolation over the whole chain instead of concatenating parts.
fn bind_interpolated_concat(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    left: BoundExpr,
    right: BoundExpr,
    span: Span,
) -> BoundExpr {
    let string = Ty::primitive(PrimitiveKind::String);
    for operand in [&left, &right] {
        if is_interpolated(operand) || operand.is_null_literal() {
            continue;
        }
        let conversion = ctx.oracle.classify(
            crate::conversion::ConversionSource::Expr(operand),
            string,
            false,
        );
        if !conversion.exists() || !conversion.is_implicit {
            bag.push(Diagnostic::BadBinaryOperator {
                op: "+".to_string(),
                left: operand_display(ctx.table, &left),
                right: operand_display(ctx.table, &right),
                span,
            });
            return BoundExpr::error(span);
        }
    }
    BoundExpr::typed(
        BoundExprKind::DeferredInterpolatedConcat {
            left: Box::new(left),
            right: Box::new(right),
        },
        string,
        span,
    )
}

/// Runtime-dispatched operators: both operands must be dispatchable and the
/// short-circuit/unsigned-shift forms never dispatch dynamically.
fn bind_dynamic_binary(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    op: BinaryOp,
    left: BoundExpr,
    right: BoundExpr,
    span: Span,
) -> BoundExpr {
    if op == BinaryOp::Ushr {
        bag.push(Diagnostic::DynamicShortCircuitOperator {
            op: op.symbol().to_string(),
            span,
        });
        return BoundExpr::error(span);
    }
    let mut bad = false;
    for operand in [&left, &right] {
        if let Some(ty) = operand.ty {
            if ty.is_void() || ty.is_pointer() {
                bag.push(Diagnostic::BadDynamicOperand {
                    operand: operand_display(ctx.table, operand),
                    span: operand.span,
                });
                bad = true;
            }
        }
    }
    if bad {
        return BoundExpr::error(span);
    }
    BoundExpr::typed(
        BoundExprKind::DynamicBinaryOperator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        Ty::simple(opal_core::well_known::DYNAMIC),
        span,
    )
}

/// `x == null` over `T?` with no user-defined equality becomes a HasValue
/// check rather than an error.
fn null_check_rewrite(
    op: BinaryOp,
    left: &BoundExpr,
    right: &BoundExpr,
    span: Span,
) -> Option<BoundExpr> {
    if !matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
        return None;
    }
    let (operand, other) = if left.is_null_literal() {
        (right, left)
    } else {
        (left, right)
    };
    if !other.is_null_literal() || !operand.ty.map(Ty::is_nullable).unwrap_or(false) {
        return None;
    }
    Some(BoundExpr::typed(
        BoundExprKind::NullCheck {
            operand: Box::new(operand.clone()),
            negated: op == BinaryOp::Ne,
        },
        Ty::primitive(PrimitiveKind::Bool),
        span,
    ))
}

/// Render an operand type for diagnostics.
pub(crate) fn operand_display(table: &SymbolTable, operand: &BoundExpr) -> String {
    match operand.ty {
        Some(ty) => table.display(ty),
        None if operand.is_null_literal() => "<null>".to_string(),
        None if operand.is_default_literal() => "default".to_string(),
        None => "<tuple>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::StandardConversions;
    use opal_core::well_known;

    fn span() -> Span {
        Span::point(1, 1)
    }

    fn int(v: i32) -> BoundExpr {
        BoundExpr::constant_literal(ConstantValue::Int32(v), Ty::simple(well_known::INT32), span())
    }

    #[test]
    fn error_operand_short_circuits_without_diagnostics() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let bound =
            bind_binary_operator(&ctx, &mut bag, BinaryOp::Add, BoundExpr::error(span()), int(1), span());
        assert!(bound.has_errors);
        assert!(bag.is_empty());
    }

    #[test]
    fn null_equals_null_folds_true() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let bound = bind_binary_operator(
            &ctx,
            &mut bag,
            BinaryOp::Eq,
            BoundExpr::null_literal(span()),
            BoundExpr::null_literal(span()),
            span(),
        );
        assert_eq!(bound.constant, Some(ConstantValue::Bool(true)));
        assert!(bag.is_empty());
    }

    #[test]
    fn bad_operator_reports_operand_types() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let string = BoundExpr::typed(
            BoundExprKind::Literal,
            Ty::simple(well_known::STRING),
            span(),
        );
        let bound = bind_binary_operator(&ctx, &mut bag, BinaryOp::Sub, int(1), string, span());
        assert!(bound.has_errors);
        assert_eq!(bag.codes(), vec!["ERR_BadBinaryOps"]);
    }

    #[test]
    fn dynamic_operand_defers_to_runtime() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let dynamic = BoundExpr::typed(
            BoundExprKind::Literal,
            Ty::simple(well_known::DYNAMIC),
            span(),
        );
        let bound = bind_binary_operator(&ctx, &mut bag, BinaryOp::Add, dynamic, int(1), span());
        assert!(matches!(
            bound.kind,
            BoundExprKind::DynamicBinaryOperator { .. }
        ));
        assert!(bound.ty.map(Ty::is_dynamic).unwrap_or(false));
        assert!(bag.is_empty());
    }

    #[test]
    fn unsigned_shift_never_binds_dynamically() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let dynamic = BoundExpr::typed(
            BoundExprKind::Literal,
            Ty::simple(well_known::DYNAMIC),
            span(),
        );
        let bound = bind_binary_operator(&ctx, &mut bag, BinaryOp::Ushr, dynamic, int(1), span());
        assert!(bound.has_errors);
        assert_eq!(bag.codes(), vec!["ERR_BadDynamicShortCircuit"]);
    }

    #[test]
    fn nullable_null_comparison_becomes_has_value_check() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        // A struct with no equality operator: S? == null.
        let hash = opal_core::TypeHash::from_name("Geo.Point");
        let operand = BoundExpr::typed(BoundExprKind::Literal, Ty::nullable(hash), span());
        let bound = bind_binary_operator(
            &ctx,
            &mut bag,
            BinaryOp::Ne,
            operand,
            BoundExpr::null_literal(span()),
            span(),
        );
        assert!(matches!(
            bound.kind,
            BoundExprKind::NullCheck { negated: true, .. }
        ));
        assert!(bag.is_empty());
    }
}
