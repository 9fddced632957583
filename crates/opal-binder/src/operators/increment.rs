//! Increment and decrement binding.
//!
//! The usage ladder: dynamic deferral, instance compound operators
//! (`op_IncrementAssignment`), then built-in numeric forms and static
//! user-defined `op_Increment`/`op_Decrement` with a final conversion back
//! to the operand type.

use opal_core::{
    Diagnostic, DiagnosticBag, Feature, PrimitiveKind, Span, Ty, check_feature_availability,
};
use opal_registry::{OperatorDef, OperatorForm, operator_names as names};
use opal_syntax::IncDecExpr;

use crate::bound::{BoundExpr, BoundExprKind};
use crate::context::BinderContext;
use crate::conversion::{Conversion, ConversionSource};
use crate::operators::{bind_expr, operand_display};

pub(super) fn bind_inc_dec(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    node: &IncDecExpr<'_>,
) -> BoundExpr {
    let span = node.span;
    let operand = bind_expr(ctx, bag, node.operand);
    if operand.has_errors {
        return BoundExpr::error(span);
    }
    if !operand.is_assignable_location() {
        bag.push(Diagnostic::NotAssignable { span });
        return BoundExpr::error(span);
    }
    let operand_ty = operand.ty.expect("assignable locations are typed");

    if operand.is_dynamic() {
        return BoundExpr::typed(
            BoundExprKind::DynamicIncrement {
                op: node.op,
                operand: Box::new(operand),
            },
            operand_ty,
            span,
        );
    }

    if let Some(bound) = try_instance_increment(ctx, bag, node, &operand, operand_ty) {
        return bound;
    }

    if builtin_incrementable(ctx, operand_ty) {
        return BoundExpr::typed(
            BoundExprKind::Increment {
                op: node.op,
                operand: Box::new(operand),
                method: None,
                final_conversion: Conversion::IDENTITY,
            },
            operand_ty,
            span,
        );
    }

    if let Some(bound) = try_static_increment(ctx, bag, node, operand.clone(), operand_ty, span) {
        return bound;
    }

    bag.push(Diagnostic::BadUnaryOperator {
        op: node.op.symbol().to_string(),
        operand: operand_display(ctx.table, &operand),
        span,
    });
    BoundExpr::error(span)
}

/// Built-in `++`/`--` covers the numeric primitives, `char`, enums and their
/// nullable forms.
fn builtin_incrementable(ctx: &BinderContext<'_>, ty: Ty) -> bool {
    let stripped = ty.strip_nullable();
    if ctx.table.enum_underlying(stripped).is_some() {
        return true;
    }
    match stripped.primitive_kind() {
        Some(
            PrimitiveKind::Void
            | PrimitiveKind::Bool
            | PrimitiveKind::String
            | PrimitiveKind::Object
            | PrimitiveKind::Dynamic,
        )
        | None => false,
        Some(_) => true,
    }
}

/// `op_IncrementAssignment` mutates in place; it applies when the value of
/// the expression is not needed (statement form or prefix).
fn try_instance_increment(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    node: &IncDecExpr<'_>,
    operand: &BoundExpr,
    operand_ty: Ty,
) -> Option<BoundExpr> {
    if operand_ty.strip_nullable().primitive_kind().is_some() {
        return None;
    }
    // A postfix whose value is consumed needs the pre-mutation copy, which
    // an in-place operator cannot produce.
    if node.op.is_postfix() && node.result_used {
        return None;
    }
    let method = find_operator(
        ctx,
        operand_ty,
        instance_names(ctx, node.op.is_increment()),
        OperatorForm::Instance,
        0,
    )?;
    if let Some(diag) =
        check_feature_availability(Feature::InstanceOperators, ctx.version, node.span)
    {
        bag.push(diag);
    }
    push_obsolete(bag, &method, node.span);
    Some(BoundExpr::typed(
        BoundExprKind::InstanceIncrement {
            op: node.op,
            method: method.method,
            operand: Box::new(operand.clone()),
            result_used: node.result_used,
        },
        operand_ty,
        node.span,
    ))
}

fn try_static_increment(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    node: &IncDecExpr<'_>,
    operand: BoundExpr,
    operand_ty: Ty,
    span: Span,
) -> Option<BoundExpr> {
    let method = find_operator(
        ctx,
        operand_ty,
        static_names(ctx, node.op.is_increment()),
        OperatorForm::Static,
        1,
    )?;
    let param = method.params[0];
    let conversion = ctx
        .oracle
        .classify(ConversionSource::Expr(&operand), param, ctx.is_checked());
    if !conversion.exists() || !conversion.is_implicit {
        return None;
    }
    // The operator's result is stored back into the operand.
    let final_conversion = ctx.oracle.classify(
        ConversionSource::Type(method.return_type),
        operand_ty,
        ctx.is_checked(),
    );
    if !final_conversion.exists() || !final_conversion.is_implicit {
        bag.push(Diagnostic::NoImplicitConversion {
            from: ctx.table.display(method.return_type),
            to: ctx.table.display(operand_ty),
            span,
        });
        return Some(BoundExpr::error(span));
    }
    if method.is_checked_name() {
        if let Some(diag) =
            check_feature_availability(Feature::CheckedOperators, ctx.version, span)
        {
            bag.push(diag);
        }
    }
    push_obsolete(bag, &method, span);
    Some(BoundExpr::typed(
        BoundExprKind::Increment {
            op: node.op,
            operand: Box::new(operand.converted(conversion, param)),
            method: Some(method.method),
            final_conversion,
        },
        operand_ty,
        span,
    ))
}

fn instance_names(ctx: &BinderContext<'_>, increment: bool) -> Vec<&'static str> {
    let mut out = Vec::with_capacity(2);
    if ctx.is_checked() {
        out.push(if increment {
            names::CHECKED_INCREMENT_ASSIGNMENT
        } else {
            names::CHECKED_DECREMENT_ASSIGNMENT
        });
    }
    out.push(if increment {
        names::INCREMENT_ASSIGNMENT
    } else {
        names::DECREMENT_ASSIGNMENT
    });
    out
}

fn static_names(ctx: &BinderContext<'_>, increment: bool) -> Vec<&'static str> {
    let mut out = Vec::with_capacity(2);
    if ctx.is_checked() {
        out.push(if increment {
            names::CHECKED_INCREMENT
        } else {
            names::CHECKED_DECREMENT
        });
    }
    out.push(if increment {
        names::INCREMENT
    } else {
        names::DECREMENT
    });
    out
}

fn find_operator(
    ctx: &BinderContext<'_>,
    ty: Ty,
    candidates: Vec<&'static str>,
    form: OperatorForm,
    arity: usize,
) -> Option<OperatorDef> {
    for base in ctx.table.base_chain(ty.strip_nullable().hash) {
        for &name in &candidates {
            for def in ctx.table.operators_named(base, name) {
                if def.form == form && def.params.len() == arity {
                    return Some(def.clone());
                }
            }
        }
    }
    None
}

fn push_obsolete(bag: &mut DiagnosticBag, method: &OperatorDef, span: Span) {
    if let Some(message) = &method.obsolete {
        bag.push(Diagnostic::ObsoleteSymbol {
            name: method.name.to_string(),
            message: Some(message.clone()),
            span,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::StandardConversions;
    use opal_core::TypeHash;
    use opal_registry::{SymbolOrigin, SymbolTable, TypeDef, TypeKind};
    use opal_syntax::{Expr, IdentExpr, IncDecOp};

    fn span() -> Span {
        Span::point(1, 1)
    }

    fn inc_dec(op: IncDecOp, result_used: bool) -> IncDecExpr<'static> {
        IncDecExpr {
            op,
            operand: Expr::Ident(IdentExpr {
                name: "x",
                span: span(),
            }),
            result_used,
            span: span(),
        }
    }

    #[test]
    fn int_increment_is_builtin() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("x", Ty::primitive(PrimitiveKind::Int32));
        let mut bag = DiagnosticBag::new();
        let bound = bind_inc_dec(&ctx, &mut bag, &inc_dec(IncDecOp::PostIncrement, true));
        assert!(matches!(
            bound.kind,
            BoundExprKind::Increment { method: None, .. }
        ));
        assert!(bag.is_empty());
    }

    #[test]
    fn consumed_postfix_skips_instance_operator() {
        let mut table = SymbolTable::with_primitives();
        let hash = TypeHash::from_name("Counter");
        let ty = Ty::simple(hash);
        table
            .register_type(TypeDef {
                hash,
                name: "Counter".to_string(),
                kind: TypeKind::Struct,
                arity: 0,
                operators: vec![
                    OperatorDef {
                        method: TypeHash::from_operator(hash, names::INCREMENT_ASSIGNMENT, &[]),
                        name: names::INCREMENT_ASSIGNMENT,
                        params: Vec::new(),
                        return_type: Ty::primitive(PrimitiveKind::Void),
                        form: OperatorForm::Instance,
                        declaring: hash,
                        obsolete: None,
                    },
                    OperatorDef {
                        method: TypeHash::from_operator(hash, names::INCREMENT, &[ty.hash]),
                        name: names::INCREMENT,
                        params: vec![ty],
                        return_type: ty,
                        form: OperatorForm::Static,
                        declaring: hash,
                        obsolete: None,
                    },
                ],
                events: Vec::new(),
                implements: Vec::new(),
                is_ref_struct: false,
                origin: SymbolOrigin::CurrentModule,
                obsolete: None,
            })
            .expect("register");
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("x", ty);
        let mut bag = DiagnosticBag::new();

        // Unused prefix: the in-place operator applies.
        let bound = bind_inc_dec(&ctx, &mut bag, &inc_dec(IncDecOp::PreIncrement, false));
        assert!(matches!(
            bound.kind,
            BoundExprKind::InstanceIncrement { .. }
        ));

        // Consumed postfix needs the pre-mutation value: static form.
        let bound = bind_inc_dec(&ctx, &mut bag, &inc_dec(IncDecOp::PostIncrement, true));
        assert!(matches!(
            bound.kind,
            BoundExprKind::Increment {
                method: Some(_),
                ..
            }
        ));
        assert!(bag.is_empty(), "{:?}", bag.codes());
    }

    #[test]
    fn bool_increment_is_rejected() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("x", Ty::primitive(PrimitiveKind::Bool));
        let mut bag = DiagnosticBag::new();
        let bound = bind_inc_dec(&ctx, &mut bag, &inc_dec(IncDecOp::PreIncrement, false));
        assert!(bound.has_errors);
        assert_eq!(bag.codes(), vec!["ERR_BadUnaryOp"]);
    }
}
