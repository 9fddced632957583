//! `is` and `as` binding.
//!
//! The right side of `is` is parsed as a type; when it fails to bind as one,
//! the binder retries it as a constant pattern before reporting. Provably
//! constant outcomes fold to `true`/`false` with a warning, but never when
//! either side is an open type: a type parameter can be instantiated to make
//! the test succeed.

use opal_core::{ConstantValue, Diagnostic, DiagnosticBag, PrimitiveKind, Ty};
use opal_syntax::{AsExpr, IsExpr, TypeExpr};

use crate::bound::{BoundExpr, BoundExprKind};
use crate::context::{BinderContext, LocalKind};
use crate::conversion::ConversionSource;
use crate::operators::bind_expr;

pub(super) fn bind_is(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    node: &IsExpr<'_>,
) -> BoundExpr {
    let span = node.span;
    let operand = bind_expr(ctx, bag, node.operand);
    if operand.has_errors {
        return BoundExpr::error(span);
    }

    // Speculative type bind: diagnostics are only committed when the target
    // really is a type.
    let mut attempt = bag.fork();
    let Some(target) = crate::names::bind_type(ctx, &mut attempt, node.target) else {
        return bind_constant_pattern(ctx, bag, node, operand);
    };
    bag.absorb(attempt);

    let bool_ty = Ty::primitive(PrimitiveKind::Bool);
    let conversion = ctx
        .oracle
        .classify(ConversionSource::Expr(&operand), target, false);

    let mut constant = None;
    let open = is_open(ctx, target) || operand.ty.map(|ty| is_open(ctx, ty)).unwrap_or(false);
    if !open {
        if operand.ty == Some(target) && ctx.table.is_value_type(target) {
            // An identity test over a closed value type cannot fail.
            bag.push(Diagnostic::IsAlwaysTrue {
                ty: ctx.table.display(target),
                span,
            });
            constant = Some(ConstantValue::Bool(true));
        } else if !conversion.exists()
            && operand.ty.map(|ty| ctx.table.is_value_type(ty)).unwrap_or(true)
        {
            bag.push(Diagnostic::IsAlwaysFalse {
                ty: ctx.table.display(target),
                span,
            });
            constant = Some(ConstantValue::Bool(false));
        }
    }

    BoundExpr {
        kind: BoundExprKind::IsOperator {
            operand: Box::new(operand),
            target,
            conversion: conversion.kind,
        },
        ty: Some(bool_ty),
        constant,
        has_errors: false,
        span,
    }
}

/// The fallback when the `is` target is not a type: a simple name naming a
/// local constant is an equality pattern; anything else is an error.
fn bind_constant_pattern(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    node: &IsExpr<'_>,
    operand: BoundExpr,
) -> BoundExpr {
    let span = node.span;
    if let TypeExpr::Named { name, span: name_span } = node.target {
        if let Some(local) = ctx.local(name) {
            if let LocalKind::Constant(value) = &local.kind {
                let pattern = BoundExpr::constant_literal(value.clone(), local.ty, name_span);
                return BoundExpr::typed(
                    BoundExprKind::IsConstantPattern {
                        operand: Box::new(operand),
                        pattern: Box::new(pattern),
                    },
                    Ty::primitive(PrimitiveKind::Bool),
                    span,
                );
            }
        }
    }
    bag.push(Diagnostic::ConstantOrTypeExpected { span });
    BoundExpr::error(span)
}

pub(super) fn bind_as(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    node: &AsExpr<'_>,
) -> BoundExpr {
    let span = node.span;
    let operand = bind_expr(ctx, bag, node.operand);
    if operand.has_errors {
        return BoundExpr::error(span);
    }
    let Some(target) = crate::names::bind_type(ctx, bag, node.target) else {
        return BoundExpr::error(span);
    };

    if !target.is_nullable() && !target.is_dynamic() && !ctx.table.is_reference_type(target) {
        bag.push(Diagnostic::AsMustHaveReferenceType {
            ty: ctx.table.display(target),
            span,
        });
        return BoundExpr::error(span);
    }

    // `null as T` is just a typed null.
    if operand.is_null_literal() {
        return BoundExpr::constant_literal(ConstantValue::Null, target, span);
    }

    let conversion = ctx
        .oracle
        .classify(ConversionSource::Expr(&operand), target, false);
    let mut constant = None;
    if !conversion.exists() {
        let open = is_open(ctx, target) || operand.ty.map(|ty| is_open(ctx, ty)).unwrap_or(false);
        if !open {
            bag.push(Diagnostic::AsAlwaysNull {
                ty: ctx.table.display(target),
                span,
            });
            constant = Some(ConstantValue::Null);
        }
    }

    BoundExpr {
        kind: BoundExprKind::AsOperator {
            operand: Box::new(operand),
            target,
            conversion: conversion.kind,
        },
        ty: Some(target),
        constant,
        has_errors: false,
        span,
    }
}

/// Whether the type involves unresolved generics (a type parameter or an
/// unbound generic type).
fn is_open(ctx: &BinderContext<'_>, ty: Ty) -> bool {
    ctx.table
        .type_def(ty.hash)
        .map(|def| def.is_open())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::StandardConversions;
    use opal_core::{Span, TypeHash, well_known};
    use opal_registry::{SymbolOrigin, SymbolTable, TypeDef, TypeKind, TypeParamConstraint};
    use opal_syntax::{Expr, IdentExpr, LiteralExpr, LiteralValue};

    fn span() -> Span {
        Span::point(1, 1)
    }

    fn lit(value: LiteralValue<'static>) -> Expr<'static> {
        Expr::Literal(LiteralExpr { value, span: span() })
    }

    fn named(name: &'static str) -> TypeExpr<'static> {
        TypeExpr::Named { name, span: span() }
    }

    #[test]
    fn value_type_identity_is_always_true() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let node = IsExpr {
            operand: lit(LiteralValue::Int32(1)),
            target: named("int"),
            span: span(),
        };
        let bound = bind_is(&ctx, &mut bag, &node);
        assert_eq!(bound.constant, Some(ConstantValue::Bool(true)));
        assert_eq!(bag.codes(), vec!["WRN_IsAlwaysTrue"]);
    }

    #[test]
    fn unrelated_value_type_is_always_false() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let node = IsExpr {
            operand: lit(LiteralValue::Int32(1)),
            target: named("string"),
            span: span(),
        };
        let bound = bind_is(&ctx, &mut bag, &node);
        assert_eq!(bound.constant, Some(ConstantValue::Bool(false)));
        assert_eq!(bag.codes(), vec!["WRN_IsAlwaysFalse"]);
    }

    #[test]
    fn open_type_parameter_never_folds() {
        let mut table = SymbolTable::with_primitives();
        table
            .register_type(TypeDef {
                hash: TypeHash::from_name("T"),
                name: "T".to_string(),
                kind: TypeKind::TypeParameter {
                    constraint: TypeParamConstraint::None,
                },
                arity: 0,
                operators: Vec::new(),
                events: Vec::new(),
                implements: Vec::new(),
                is_ref_struct: false,
                origin: SymbolOrigin::CurrentModule,
                obsolete: None,
            })
            .expect("register");
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("i", Ty::primitive(PrimitiveKind::Int32));
        let mut bag = DiagnosticBag::new();
        let node = IsExpr {
            operand: Expr::Ident(IdentExpr { name: "i", span: span() }),
            target: named("T"),
            span: span(),
        };
        let bound = bind_is(&ctx, &mut bag, &node);
        assert_eq!(bound.constant, None);
        assert!(bag.is_empty(), "{:?}", bag.codes());
    }

    #[test]
    fn constant_pattern_fallback() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_constant(
            "Limit",
            Ty::primitive(PrimitiveKind::Int32),
            ConstantValue::Int32(10),
        );
        let mut bag = DiagnosticBag::new();
        let node = IsExpr {
            operand: lit(LiteralValue::Int32(10)),
            target: named("Limit"),
            span: span(),
        };
        let bound = bind_is(&ctx, &mut bag, &node);
        assert!(matches!(bound.kind, BoundExprKind::IsConstantPattern { .. }));
        assert!(bag.is_empty(), "{:?}", bag.codes());
    }

    #[test]
    fn is_with_unknown_name_reports_constant_or_type() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let node = IsExpr {
            operand: lit(LiteralValue::Int32(1)),
            target: named("NoSuchThing"),
            span: span(),
        };
        let bound = bind_is(&ctx, &mut bag, &node);
        assert!(bound.has_errors);
        assert_eq!(bag.codes(), vec!["ERR_ConstantOrTypeExpected"]);
    }

    #[test]
    fn as_requires_nullable_or_reference_target() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let node = AsExpr {
            operand: lit(LiteralValue::Int32(1)),
            target: named("int"),
            span: span(),
        };
        let bound = bind_as(&ctx, &mut bag, &node);
        assert!(bound.has_errors);
        assert_eq!(bag.codes(), vec!["ERR_AsMustHaveReferenceType"]);
    }

    #[test]
    fn null_as_string_is_typed_null() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let node = AsExpr {
            operand: lit(LiteralValue::Null),
            target: named("string"),
            span: span(),
        };
        let bound = bind_as(&ctx, &mut bag, &node);
        assert_eq!(bound.ty, Some(Ty::simple(well_known::STRING)));
        assert_eq!(bound.constant, Some(ConstantValue::Null));
        assert!(bag.is_empty());
    }

    #[test]
    fn impossible_as_warns_always_null() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("s", Ty::simple(well_known::STRING));
        let mut bag = DiagnosticBag::new();
        let inner = named("int");
        let node = AsExpr {
            operand: Expr::Ident(IdentExpr { name: "s", span: span() }),
            // int? is a valid `as` target; bare int is not.
            target: TypeExpr::Nullable {
                inner: &inner,
                span: span(),
            },
            span: span(),
        };
        let bound = bind_as(&ctx, &mut bag, &node);
        assert_eq!(bound.constant, Some(ConstantValue::Null));
        assert_eq!(bag.codes(), vec!["WRN_AlwaysNull"]);
    }
}
