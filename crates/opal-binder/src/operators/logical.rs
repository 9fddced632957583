//! Short-circuit `&&` / `||` binding.
//!
//! Bool operands take the fast path. Everything else goes through the
//! corresponding bitwise operator's user-defined resolution, constrained to
//! the conditional-logical pattern: the chosen operator's parameter and
//! return types must all be its declaring type, and that type must declare
//! `operator true` and `operator false`.

use opal_core::{Diagnostic, DiagnosticBag, PrimitiveKind, Span, Ty};
use opal_registry::operator_names as names;
use opal_syntax::{BinaryOp, Expr};

use crate::bound::{BoundExpr, BoundExprKind};
use crate::context::BinderContext;
use crate::conversion::ConversionSource;
use crate::fold::fold_binary;
use crate::operators::{bind_expr, operand_display};
use crate::overload::{BinaryOperatorKind as K, OverloadResultKind, resolve_binary};

pub(super) fn bind_logical(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    op: BinaryOp,
    left: Expr<'_>,
    right: Expr<'_>,
    span: Span,
) -> BoundExpr {
    let left = bind_expr(ctx, bag, left);
    let right = bind_expr(ctx, bag, right);
    if left.has_errors || right.has_errors {
        return BoundExpr::error(span);
    }

    // Short-circuit operators never dispatch dynamically: the runtime
    // binder cannot preserve the evaluation guarantee.
    if left.is_dynamic() || right.is_dynamic() {
        bag.push(Diagnostic::DynamicShortCircuitOperator {
            op: op.symbol().to_string(),
            span,
        });
        return BoundExpr::error(span);
    }

    let bool_ty = Ty::primitive(PrimitiveKind::Bool);
    let left_to_bool = ctx
        .oracle
        .classify(ConversionSource::Expr(&left), bool_ty, false);
    let right_to_bool = ctx
        .oracle
        .classify(ConversionSource::Expr(&right), bool_ty, false);
    if left_to_bool.exists()
        && left_to_bool.is_implicit
        && right_to_bool.exists()
        && right_to_bool.is_implicit
    {
        let left = left.converted(left_to_bool, bool_ty);
        let right = right.converted(right_to_bool, bool_ty);
        let constant = match (&left.constant, &right.constant) {
            (Some(l), Some(r)) => {
                let kind = K::operator_of(op) | K::BOOL;
                fold_binary(kind, l, r, span, bag)
            }
            _ => None,
        };
        return BoundExpr {
            kind: BoundExprKind::LogicalOperator {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty: Some(bool_ty),
            constant,
            has_errors: false,
            span,
        };
    }

    bind_user_defined_logical(ctx, bag, op, left, right, span)
}

fn bind_user_defined_logical(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    op: BinaryOp,
    left: BoundExpr,
    right: BoundExpr,
    span: Span,
) -> BoundExpr {
    let result = resolve_binary(ctx, op, ctx.is_checked(), &left, &right);
    match result.kind {
        OverloadResultKind::Viable => {}
        OverloadResultKind::Ambiguous => {
            bag.push(Diagnostic::AmbiguousBinaryOperator {
                op: op.symbol().to_string(),
                left: operand_display(ctx.table, &left),
                right: operand_display(ctx.table, &right),
                span,
            });
            return BoundExpr::error(span);
        }
        _ => {
            bag.push(Diagnostic::BadBinaryOperator {
                op: op.symbol().to_string(),
                left: operand_display(ctx.table, &left),
                right: operand_display(ctx.table, &right),
                span,
            });
            return BoundExpr::error(span);
        }
    }
    let candidate = result.best.expect("viable result has a best candidate");
    let signature = candidate.signature;
    let Some(method) = &signature.method else {
        // The only built-in signature for `&`/`|` applicable here would be
        // bool, which took the fast path.
        bag.push(Diagnostic::BadBinaryOperator {
            op: op.symbol().to_string(),
            left: operand_display(ctx.table, &left),
            right: operand_display(ctx.table, &right),
            span,
        });
        return BoundExpr::error(span);
    };

    // The conditional-logical pattern: T op(T, T) -> T. The three types need
    // only agree with each other, not with the declaring type, so the
    // synthesized lifted form T? op(T?, T?) -> T? qualifies too.
    let declaring = Ty::simple(method.declaring);
    if signature.left != signature.right || signature.right != signature.result {
        bag.push(Diagnostic::BadBoolOperator {
            method: method.name.to_string(),
            ty: ctx.table.display(declaring),
            span,
        });
        return BoundExpr::error(span);
    }
    if !has_truth_operator(ctx, method.declaring, names::TRUE)
        || !has_truth_operator(ctx, method.declaring, names::FALSE)
    {
        bag.push(Diagnostic::MustHaveOpTrueFalse {
            ty: ctx.table.display(declaring),
            span,
        });
        return BoundExpr::error(span);
    }

    let left = left.converted(candidate.left_conversion, signature.left);
    let right = right.converted(candidate.right_conversion, signature.right);
    BoundExpr::typed(
        BoundExprKind::UserDefinedConditionalLogical {
            op,
            method: method.method,
            left: Box::new(left),
            right: Box::new(right),
        },
        signature.result,
        span,
    )
}

/// Whether a `true`/`false` operator for the type is in scope: declared on
/// the type itself, or on it by an extension block in the lexical chain.
fn has_truth_operator(
    ctx: &BinderContext<'_>,
    declaring: opal_core::TypeHash,
    name: &'static str,
) -> bool {
    if !ctx.table.operators_named(declaring, name).is_empty() {
        return true;
    }
    ctx.extension_scopes.iter().any(|scope| {
        scope.extensions.iter().any(|ext| {
            ext.extended == declaring && ext.operators.iter().any(|op| op.name == name)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::StandardConversions;
    use opal_core::{ConstantValue, TypeHash};
    use opal_registry::{
        OperatorDef, OperatorForm, SymbolOrigin, SymbolTable, TypeDef, TypeKind,
    };
    use opal_syntax::{LiteralExpr, LiteralValue};

    fn span() -> Span {
        Span::point(1, 1)
    }

    fn lit(value: LiteralValue<'static>) -> Expr<'static> {
        Expr::Literal(LiteralExpr { value, span: span() })
    }

    fn register_truthy(table: &mut SymbolTable, with_truth_operators: bool) -> TypeHash {
        let hash = TypeHash::from_name("Fuzzy");
        let ty = Ty::simple(hash);
        let mut operators = vec![OperatorDef {
            method: TypeHash::from_operator(hash, names::BITWISE_AND, &[ty.hash, ty.hash]),
            name: names::BITWISE_AND,
            params: vec![ty, ty],
            return_type: ty,
            form: OperatorForm::Static,
            declaring: hash,
            obsolete: None,
        }];
        if with_truth_operators {
            for name in [names::TRUE, names::FALSE] {
                operators.push(OperatorDef {
                    method: TypeHash::from_operator(hash, name, &[ty.hash]),
                    name,
                    params: vec![ty],
                    return_type: Ty::primitive(PrimitiveKind::Bool),
                    form: OperatorForm::Static,
                    declaring: hash,
                    obsolete: None,
                });
            }
        }
        table
            .register_type(TypeDef {
                hash,
                name: "Fuzzy".to_string(),
                kind: TypeKind::Struct,
                arity: 0,
                operators,
                events: Vec::new(),
                implements: Vec::new(),
                is_ref_struct: false,
                origin: SymbolOrigin::CurrentModule,
                obsolete: None,
            })
            .expect("register");
        hash
    }

    #[test]
    fn bool_operands_fold() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let bound = bind_logical(
            &ctx,
            &mut bag,
            BinaryOp::LogicalAnd,
            lit(LiteralValue::Bool(true)),
            lit(LiteralValue::Bool(false)),
            span(),
        );
        assert_eq!(bound.constant, Some(ConstantValue::Bool(false)));
        assert!(matches!(bound.kind, BoundExprKind::LogicalOperator { .. }));
    }

    #[test]
    fn user_defined_pattern_requires_truth_operators() {
        let mut table = SymbolTable::with_primitives();
        let hash = register_truthy(&mut table, false);
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("a", Ty::simple(hash));
        let mut bag = DiagnosticBag::new();
        let a = Expr::Ident(opal_syntax::IdentExpr {
            name: "a",
            span: span(),
        });
        let bound = bind_logical(&ctx, &mut bag, BinaryOp::LogicalAnd, a, a, span());
        assert!(bound.has_errors);
        assert_eq!(bag.codes(), vec!["ERR_MustHaveOpTF"]);
    }

    #[test]
    fn user_defined_short_circuit_binds() {
        let mut table = SymbolTable::with_primitives();
        let hash = register_truthy(&mut table, true);
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("a", Ty::simple(hash));
        let mut bag = DiagnosticBag::new();
        let a = Expr::Ident(opal_syntax::IdentExpr {
            name: "a",
            span: span(),
        });
        let bound = bind_logical(&ctx, &mut bag, BinaryOp::LogicalAnd, a, a, span());
        assert!(matches!(
            bound.kind,
            BoundExprKind::UserDefinedConditionalLogical { .. }
        ));
        assert!(bag.is_empty(), "{:?}", bag.codes());
    }

    #[test]
    fn lifted_user_defined_short_circuit_binds() {
        // Fuzzy? && Fuzzy? goes through the synthesized lifted form
        // Fuzzy? op(Fuzzy?, Fuzzy?) -> Fuzzy?, whose types agree with each
        // other without equalling the declaring type.
        let mut table = SymbolTable::with_primitives();
        let hash = register_truthy(&mut table, true);
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("a", Ty::nullable(hash));
        let mut bag = DiagnosticBag::new();
        let a = Expr::Ident(opal_syntax::IdentExpr {
            name: "a",
            span: span(),
        });
        let bound = bind_logical(&ctx, &mut bag, BinaryOp::LogicalAnd, a, a, span());
        assert!(matches!(
            bound.kind,
            BoundExprKind::UserDefinedConditionalLogical { .. }
        ));
        assert_eq!(bound.ty, Some(Ty::nullable(hash)));
        assert!(bag.is_empty(), "{:?}", bag.codes());
    }

    #[test]
    fn extension_declared_truth_operators_are_found() {
        let mut table = SymbolTable::with_primitives();
        let hash = register_truthy(&mut table, false);
        let ty = Ty::simple(hash);
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.extension_scopes.push(opal_registry::ExtensionScope {
            extensions: vec![opal_registry::ExtensionDef {
                extended: hash,
                operators: [names::TRUE, names::FALSE]
                    .into_iter()
                    .map(|name| OperatorDef {
                        method: TypeHash::from_operator(hash, name, &[ty.hash]),
                        name,
                        params: vec![ty],
                        return_type: Ty::primitive(PrimitiveKind::Bool),
                        form: OperatorForm::Static,
                        declaring: hash,
                        obsolete: None,
                    })
                    .collect(),
            }],
        });
        ctx.declare_variable("a", ty);
        let mut bag = DiagnosticBag::new();
        let a = Expr::Ident(opal_syntax::IdentExpr {
            name: "a",
            span: span(),
        });
        let bound = bind_logical(&ctx, &mut bag, BinaryOp::LogicalAnd, a, a, span());
        assert!(matches!(
            bound.kind,
            BoundExprKind::UserDefinedConditionalLogical { .. }
        ));
        assert!(bag.is_empty(), "{:?}", bag.codes());
    }

    #[test]
    fn dynamic_short_circuit_is_rejected() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("d", Ty::simple(opal_core::well_known::DYNAMIC));
        let mut bag = DiagnosticBag::new();
        let d = Expr::Ident(opal_syntax::IdentExpr {
            name: "d",
            span: span(),
        });
        let bound = bind_logical(
            &ctx,
            &mut bag,
            BinaryOp::LogicalOr,
            d,
            lit(LiteralValue::Bool(true)),
            span(),
        );
        assert!(bound.has_errors);
        assert_eq!(bag.codes(), vec!["ERR_BadDynamicShortCircuit"]);
    }
}
