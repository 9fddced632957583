//! Assignment and compound-assignment binding.
//!
//! `x op= y` walks a fixed ladder: error short-circuit, event assignment,
//! dynamic deferral, assignability, instance in-place operators, then the
//! ordinary binary resolution with a final conversion back to the target
//! type.

use opal_core::{
    Diagnostic, DiagnosticBag, Feature, Span, Ty, check_feature_availability, well_known,
};
use opal_registry::{OperatorDef, OperatorForm};
use opal_syntax::{AssignExpr, BinaryOp};

use crate::bound::{BoundExpr, BoundExprKind};
use crate::context::BinderContext;
use crate::conversion::ConversionSource;
use crate::operators::{bind_expr, operand_display};
use crate::overload::{OverloadResultKind, binary_operator_names, resolve_binary};

/// Bind a plain `=` assignment.
pub(super) fn bind_assignment(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    node: &AssignExpr<'_>,
) -> BoundExpr {
    let target = bind_expr(ctx, bag, node.target);
    let value = bind_expr(ctx, bag, node.value);
    if target.has_errors || value.has_errors {
        return BoundExpr::error(node.span);
    }
    if let Some((_, event)) = target.as_event() {
        bag.push(Diagnostic::BadEventUsage {
            event: event.to_string(),
            span: node.span,
        });
        return BoundExpr::error(node.span);
    }
    if !target.is_assignable_location() {
        bag.push(Diagnostic::NotAssignable { span: node.span });
        return BoundExpr::error(node.span);
    }
    let target_ty = target.ty.expect("assignable locations are typed");
    let Some(value) = convert_to(ctx, bag, value, target_ty, node.span) else {
        return BoundExpr::error(node.span);
    };
    BoundExpr::typed(
        BoundExprKind::Assignment {
            target: Box::new(target),
            value: Box::new(value),
        },
        target_ty,
        node.span,
    )
}

/// Bind `x op= y` for a non-coalescing operator.
pub(super) fn bind_compound(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    op: BinaryOp,
    node: &AssignExpr<'_>,
) -> BoundExpr {
    let span = node.span;
    let target = bind_expr(ctx, bag, node.target);
    let value = bind_expr(ctx, bag, node.value);
    if target.has_errors || value.has_errors {
        return BoundExpr::error(span);
    }

    if target.as_event().is_some() {
        return bind_event_assignment(ctx, bag, op, target, value, span);
    }

    if target.is_dynamic() || value.is_dynamic() {
        // Short-circuit and unsigned-shift compounds never dispatch
        // dynamically.
        if op.is_conditional_logical() || op == BinaryOp::Ushr {
            bag.push(Diagnostic::DynamicShortCircuitOperator {
                op: format!("{}=", op.symbol()),
                span,
            });
            return BoundExpr::error(span);
        }
        if !target.is_assignable_location() {
            bag.push(Diagnostic::NotAssignable { span });
            return BoundExpr::error(span);
        }
        let ty = target.ty.expect("assignable locations are typed");
        return BoundExpr::typed(
            BoundExprKind::DynamicCompoundAssignment {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            ty,
            span,
        );
    }

    if !target.is_assignable_location() {
        bag.push(Diagnostic::NotAssignable { span });
        return BoundExpr::error(span);
    }
    let target_ty = target.ty.expect("assignable locations are typed");
    if target_ty.is_void_pointer() {
        bag.push(Diagnostic::InvalidUseOfVoid { span });
        return BoundExpr::error(span);
    }

    if let Some(bound) = try_instance_compound(ctx, bag, op, &target, &value, span) {
        return bound;
    }

    resolve_static_compound(ctx, bag, op, target, target_ty, value, span)
}

/// `event += handler` / `event -= handler`.
fn bind_event_assignment(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    op: BinaryOp,
    target: BoundExpr,
    value: BoundExpr,
    span: Span,
) -> BoundExpr {
    let (owner, event_name) = target.as_event().expect("checked by caller");
    let event_name = event_name.to_string();
    if !matches!(op, BinaryOp::Add | BinaryOp::Sub) {
        bag.push(Diagnostic::BadEventUsage {
            event: event_name,
            span,
        });
        return BoundExpr::error(span);
    }
    let is_add = op == BinaryOp::Add;
    let accessor_ok = ctx
        .table
        .type_def(owner)
        .and_then(|def| def.events.iter().find(|e| e.name == event_name))
        .map(|e| if is_add { e.has_add } else { e.has_remove })
        .unwrap_or(false);
    if !accessor_ok {
        bag.push(Diagnostic::EventAccessorMissing {
            event: event_name,
            accessor: if is_add { "add" } else { "remove" }.to_string(),
            span,
        });
        return BoundExpr::error(span);
    }
    let delegate_ty = target.ty.expect("event accesses carry the delegate type");
    let Some(value) = convert_to(ctx, bag, value, delegate_ty, span) else {
        return BoundExpr::error(span);
    };
    BoundExpr::typed(
        BoundExprKind::EventAssignment {
            event: event_name,
            is_add,
            target: Box::new(target),
            value: Box::new(value),
        },
        Ty::simple(well_known::VOID),
        span,
    )
}

/// In-place instance operators (`op_AdditionAssignment` etc.) take priority
/// over the static composition for user-defined target types.
fn try_instance_compound(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    op: BinaryOp,
    target: &BoundExpr,
    value: &BoundExpr,
    span: Span,
) -> Option<BoundExpr> {
    let target_ty = target.ty?;
    // Predefined types always go through the built-in table.
    if target_ty.strip_nullable().primitive_kind().is_some() {
        return None;
    }
    let (method, param, conversion) =
        find_instance_compound(ctx, op, target_ty, value)?;
    if let Some(diag) = check_feature_availability(Feature::InstanceOperators, ctx.version, span) {
        bag.push(diag);
    }
    if let Some(message) = &method.obsolete {
        bag.push(Diagnostic::ObsoleteSymbol {
            name: method.name.to_string(),
            message: Some(message.clone()),
            span,
        });
    }
    let value = value.clone().converted(conversion, param);
    Some(BoundExpr::typed(
        BoundExprKind::InstanceCompoundAssignment {
            method: method.method,
            target: Box::new(target.clone()),
            value: Box::new(value),
        },
        target_ty,
        span,
    ))
}

fn find_instance_compound(
    ctx: &BinderContext<'_>,
    op: BinaryOp,
    target_ty: Ty,
    value: &BoundExpr,
) -> Option<(OperatorDef, Ty, crate::conversion::Conversion)> {
    let names: Vec<&'static str> = binary_operator_names(op, ctx.is_checked())
        .into_iter()
        .filter_map(opal_registry::operator_names::compound_assignment_name)
        .collect();
    for base in ctx.table.base_chain(target_ty.strip_nullable().hash) {
        for &name in &names {
            for def in ctx.table.operators_named(base, name) {
                if def.form != OperatorForm::Instance || def.params.len() != 1 {
                    continue;
                }
                let param = def.params[0];
                let conversion = ctx.oracle.classify(
                    ConversionSource::Expr(value),
                    param,
                    ctx.is_checked(),
                );
                if conversion.exists() && conversion.is_implicit {
                    return Some((def.clone(), param, conversion));
                }
            }
        }
    }
    None
}

/// The ordinary composition: resolve `target op value` as a binary operator,
/// then convert the result back to the target type.
fn resolve_static_compound(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    op: BinaryOp,
    target: BoundExpr,
    target_ty: Ty,
    value: BoundExpr,
    span: Span,
) -> BoundExpr {
    let result = resolve_binary(ctx, op, ctx.is_checked(), &target, &value);
    match result.kind {
        OverloadResultKind::Viable => {}
        OverloadResultKind::Ambiguous => {
            bag.push(Diagnostic::AmbiguousBinaryOperator {
                op: op.symbol().to_string(),
                left: operand_display(ctx.table, &target),
                right: operand_display(ctx.table, &value),
                span,
            });
            return BoundExpr::error(span);
        }
        _ => {
            bag.push(Diagnostic::BadBinaryOperator {
                op: op.symbol().to_string(),
                left: operand_display(ctx.table, &target),
                right: operand_display(ctx.table, &value),
                span,
            });
            return BoundExpr::error(span);
        }
    }
    let candidate = result.best.expect("viable result has a best candidate");
    let signature = candidate.signature;
    super::binary::check_candidate_features(ctx, bag, candidate.source, &signature, span);

    // The final conversion may be explicit (int += long narrows), but only
    // when the right operand alone would convert implicitly — otherwise the
    // user must write the cast.
    let value_to_target = ctx.oracle.classify(
        ConversionSource::Expr(&value),
        target_ty,
        ctx.is_checked(),
    );
    let final_conversion = ctx.oracle.classify(
        ConversionSource::Type(signature.result),
        target_ty,
        ctx.is_checked(),
    );
    let final_conversion = if final_conversion.exists() && final_conversion.is_implicit {
        final_conversion
    } else if final_conversion.exists() {
        let narrowing_ok =
            op.is_shift() || (value_to_target.exists() && value_to_target.is_implicit);
        if !narrowing_ok {
            bag.push(Diagnostic::NoImplicitConversion {
                from: operand_display(ctx.table, &value),
                to: ctx.table.display(target_ty),
                span,
            });
            return BoundExpr::error(span);
        }
        final_conversion
    } else {
        bag.push(Diagnostic::NoImplicitConversion {
            from: ctx.table.display(signature.result),
            to: ctx.table.display(target_ty),
            span,
        });
        return BoundExpr::error(span);
    };

    let target = target.converted(candidate.left_conversion, signature.left);
    let value = value.converted(candidate.right_conversion, signature.right);
    let method = signature.method.as_ref().map(|m| m.method);
    BoundExpr::typed(
        BoundExprKind::CompoundAssignment {
            kind: signature.kind,
            target: Box::new(target),
            value: Box::new(value),
            method,
            final_conversion,
        },
        target_ty,
        span,
    )
}

/// Convert `value` to `target` requiring an implicit conversion, reporting
/// the conversion diagnostic that fits what exists.
pub(super) fn convert_to(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    value: BoundExpr,
    target: Ty,
    span: Span,
) -> Option<BoundExpr> {
    let conversion = ctx
        .oracle
        .classify(ConversionSource::Expr(&value), target, ctx.is_checked());
    if conversion.exists() && conversion.is_implicit {
        return Some(value.converted(conversion, target));
    }
    let from = operand_display(ctx.table, &value);
    let to = ctx.table.display(target);
    if conversion.exists() {
        bag.push(Diagnostic::NoImplicitConversion { from, to, span });
    } else {
        bag.push(Diagnostic::NoConversion { from, to, span });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::StandardConversions;
    use opal_core::ConstantValue;
    use opal_registry::SymbolTable;
    use opal_syntax::{AssignOp, Expr, IdentExpr, LiteralExpr, LiteralValue};

    fn span() -> Span {
        Span::point(1, 1)
    }

    fn lit(value: LiteralValue<'static>) -> Expr<'static> {
        Expr::Literal(LiteralExpr { value, span: span() })
    }

    fn ident(name: &'static str) -> Expr<'static> {
        Expr::Ident(IdentExpr { name, span: span() })
    }

    fn assign(
        op: AssignOp,
        target: Expr<'static>,
        value: Expr<'static>,
    ) -> AssignExpr<'static> {
        AssignExpr {
            op,
            target,
            value,
            span: span(),
        }
    }

    #[test]
    fn compound_add_narrows_back_to_target() {
        // byte b; b += 1 — the addition is int, the result narrows to byte.
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("b", Ty::primitive(opal_core::PrimitiveKind::Uint8));
        let mut bag = DiagnosticBag::new();
        let node = assign(
            AssignOp::Compound(BinaryOp::Add),
            ident("b"),
            lit(LiteralValue::Int32(1)),
        );
        let bound = bind_compound(&ctx, &mut bag, BinaryOp::Add, &node);
        assert!(bag.is_empty(), "{:?}", bag.codes());
        let BoundExprKind::CompoundAssignment {
            final_conversion, ..
        } = &bound.kind
        else {
            panic!("expected compound assignment, got {:?}", bound.kind);
        };
        assert!(!final_conversion.is_implicit);
        assert_eq!(
            bound.ty,
            Some(Ty::primitive(opal_core::PrimitiveKind::Uint8))
        );
    }

    #[test]
    fn compound_add_rejects_wide_right_operand() {
        // int i; i += 2L — long does not implicitly convert to int.
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("i", Ty::primitive(opal_core::PrimitiveKind::Int32));
        let mut bag = DiagnosticBag::new();
        let node = assign(
            AssignOp::Compound(BinaryOp::Add),
            ident("i"),
            lit(LiteralValue::Int64(1 << 40)),
        );
        let bound = bind_compound(&ctx, &mut bag, BinaryOp::Add, &node);
        assert!(bound.has_errors);
        assert_eq!(bag.codes(), vec!["ERR_NoImplicitConv"]);
    }

    #[test]
    fn shift_compound_always_narrows() {
        // byte b; b <<= 3 binds (the shift result is int, narrowed back).
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("b", Ty::primitive(opal_core::PrimitiveKind::Uint8));
        let mut bag = DiagnosticBag::new();
        let node = assign(
            AssignOp::Compound(BinaryOp::Shl),
            ident("b"),
            lit(LiteralValue::Int32(3)),
        );
        let bound = bind_compound(&ctx, &mut bag, BinaryOp::Shl, &node);
        assert!(bag.is_empty(), "{:?}", bag.codes());
        assert!(matches!(
            bound.kind,
            BoundExprKind::CompoundAssignment { .. }
        ));
    }

    #[test]
    fn assignment_to_constant_is_rejected() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_constant(
            "c",
            Ty::primitive(opal_core::PrimitiveKind::Int32),
            ConstantValue::Int32(1),
        );
        let mut bag = DiagnosticBag::new();
        let node = assign(AssignOp::Assign, ident("c"), lit(LiteralValue::Int32(2)));
        let bound = bind_assignment(&ctx, &mut bag, &node);
        assert!(bound.has_errors);
        assert_eq!(bag.codes(), vec!["ERR_AssgLvalueExpected"]);
    }
}
