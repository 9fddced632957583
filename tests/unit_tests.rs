//! End-to-end binding tests through the `opal` facade.
//!
//! Each test drives [`bind_expr`] (or the name-binding entry points) over a
//! hand-built syntax tree and checks the bound tree, the folded constant and
//! the diagnostic codes.

use opal::prelude::*;

fn span() -> Span {
    Span::point(1, 1)
}

fn lit(value: LiteralValue<'static>) -> Expr<'static> {
    Expr::Literal(LiteralExpr { value, span: span() })
}

fn int(v: i32) -> Expr<'static> {
    lit(LiteralValue::Int32(v))
}

fn ident(name: &'static str) -> Expr<'static> {
    Expr::Ident(IdentExpr { name, span: span() })
}

fn binary<'a>(arena: &'a Bump, op: BinaryOp, left: Expr<'a>, right: Expr<'a>) -> Expr<'a> {
    Expr::Binary(arena.alloc(BinaryExpr {
        op,
        left,
        right,
        span: span(),
    }))
}

fn user_type(name: &str, kind: TypeKind) -> TypeDef {
    TypeDef {
        hash: TypeHash::from_name(name),
        name: name.to_string(),
        kind,
        arity: 0,
        operators: Vec::new(),
        events: Vec::new(),
        implements: Vec::new(),
        is_ref_struct: false,
        origin: SymbolOrigin::CurrentModule,
        obsolete: None,
    }
}

// =============================================================================
// Arithmetic and folding
// =============================================================================

#[test]
fn integer_arithmetic_folds() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle);
    let mut bag = DiagnosticBag::new();
    let expr = binary(&arena, BinaryOp::Mul, int(6), int(7));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert_eq!(bound.constant, Some(ConstantValue::Int32(42)));
    assert_eq!(bound.ty, Some(Ty::primitive(PrimitiveKind::Int32)));
    assert!(bag.is_empty());
}

#[test]
fn binding_is_deterministic() {
    // The same tree binds to the same result, diagnostics included.
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle);
    let expr = binary(
        &arena,
        BinaryOp::Add,
        binary(&arena, BinaryOp::Shl, int(1), int(4)),
        lit(LiteralValue::Int64(5)),
    );
    let mut first_bag = DiagnosticBag::new();
    let first = bind_expr(&ctx, &mut first_bag, expr);
    let mut second_bag = DiagnosticBag::new();
    let second = bind_expr(&ctx, &mut second_bag, expr);
    assert_eq!(first, second);
    assert_eq!(first_bag.codes(), second_bag.codes());
    assert_eq!(first.constant, Some(ConstantValue::Int64(21)));
}

#[test]
fn checked_overflow_is_reported_and_poisons_the_constant() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle).with_flags(BinderFlags::CHECKED_REGION);
    let mut bag = DiagnosticBag::new();
    let expr = binary(&arena, BinaryOp::Add, int(i32::MAX), int(1));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert_eq!(bound.constant, Some(ConstantValue::Bad));
    assert_eq!(bag.codes(), vec!["ERR_CheckedOverflow"]);
}

#[test]
fn unchecked_overflow_wraps() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle);
    let mut bag = DiagnosticBag::new();
    let expr = binary(&arena, BinaryOp::Add, int(i32::MAX), int(1));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert_eq!(bound.constant, Some(ConstantValue::Int32(i32::MIN)));
    assert!(bag.is_empty());
}

#[test]
fn division_by_zero_is_an_error_even_unchecked() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle);
    let mut bag = DiagnosticBag::new();
    let expr = binary(&arena, BinaryOp::Div, int(6), int(0));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert_eq!(bound.constant, Some(ConstantValue::Bad));
    assert_eq!(bag.codes(), vec!["ERR_IntDivByZero"]);
}

#[test]
fn shift_count_is_masked_to_operand_width() {
    // 1 << 33 over int shifts by 33 & 0x1f == 1.
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle);
    let mut bag = DiagnosticBag::new();
    let expr = binary(&arena, BinaryOp::Shl, int(1), int(33));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert_eq!(bound.constant, Some(ConstantValue::Int32(2)));
    assert!(bag.is_empty());
}

#[test]
fn string_concat_treats_null_as_empty() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle);
    let mut bag = DiagnosticBag::new();
    let expr = binary(
        &arena,
        BinaryOp::Add,
        lit(LiteralValue::String("a")),
        lit(LiteralValue::Null),
    );
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert_eq!(bound.constant, Some(ConstantValue::String("a".to_string())));
    assert_eq!(bound.ty, Some(Ty::primitive(PrimitiveKind::String)));
    assert!(bag.is_empty(), "{:?}", bag.codes());
}

// =============================================================================
// Error recovery and operand shapes
// =============================================================================

#[test]
fn erroneous_operand_suppresses_operator_diagnostics() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle);
    let mut bag = DiagnosticBag::new();
    let expr = binary(&arena, BinaryOp::Mul, ident("missing"), int(2));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert!(bound.has_errors);
    // Only the name error; no cascading bad-operator report.
    assert_eq!(bag.codes(), vec!["ERR_SingleTypeNameNotFound"]);
}

#[test]
fn null_compared_to_null_folds_without_resolution() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle);
    let mut bag = DiagnosticBag::new();
    let eq = binary(
        &arena,
        BinaryOp::Eq,
        lit(LiteralValue::Null),
        lit(LiteralValue::Null),
    );
    let ne = binary(
        &arena,
        BinaryOp::Ne,
        lit(LiteralValue::Null),
        lit(LiteralValue::Null),
    );
    assert_eq!(
        bind_expr(&ctx, &mut bag, eq).constant,
        Some(ConstantValue::Bool(true))
    );
    assert_eq!(
        bind_expr(&ctx, &mut bag, ne).constant,
        Some(ConstantValue::Bool(false))
    );
    assert!(bag.is_empty());
}

#[test]
fn negating_an_unsigned_long_is_a_plain_failure() {
    // No int/long candidate applies to ulong and the lifted forms do not
    // rescue it; the report is a bad operator, not an ambiguity.
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle);
    let mut bag = DiagnosticBag::new();
    let expr = Expr::Unary(arena.alloc(UnaryExpr {
        op: UnaryOp::Neg,
        operand: lit(LiteralValue::Uint64(1)),
        span: span(),
    }));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert!(bound.has_errors);
    assert_eq!(bag.codes(), vec!["ERR_BadUnaryOp"]);
}

// =============================================================================
// Dynamic operands
// =============================================================================

#[test]
fn dynamic_operand_defers_binary_operators() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let mut ctx = BinderContext::new(&table, &oracle);
    ctx.declare_variable("d", Ty::simple(well_known::DYNAMIC));
    let mut bag = DiagnosticBag::new();
    let expr = binary(&arena, BinaryOp::Add, ident("d"), int(1));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert!(matches!(bound.kind, BoundExprKind::DynamicBinaryOperator { .. }));
    assert_eq!(bound.ty, Some(Ty::simple(well_known::DYNAMIC)));
    assert!(bag.is_empty());
}

#[test]
fn dynamic_operand_rejects_short_circuit_operators() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let mut ctx = BinderContext::new(&table, &oracle);
    ctx.declare_variable("d", Ty::simple(well_known::DYNAMIC));
    let mut bag = DiagnosticBag::new();
    let expr = binary(
        &arena,
        BinaryOp::LogicalAnd,
        ident("d"),
        lit(LiteralValue::Bool(true)),
    );
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert!(bound.has_errors);
    assert_eq!(bag.codes(), vec!["ERR_BadDynamicShortCircuit"]);
}

#[test]
fn dynamic_operand_rejects_unsigned_right_shift() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let mut ctx = BinderContext::new(&table, &oracle);
    ctx.declare_variable("d", Ty::simple(well_known::DYNAMIC));
    let mut bag = DiagnosticBag::new();
    let expr = binary(&arena, BinaryOp::Ushr, ident("d"), int(1));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert!(bound.has_errors);
    assert_eq!(bag.codes(), vec!["ERR_BadDynamicShortCircuit"]);
}

// =============================================================================
// Enums
// =============================================================================

#[test]
fn enum_bitwise_and_stays_in_the_enum() {
    let arena = Bump::new();
    let mut table = SymbolTable::with_primitives();
    let color = table
        .register_type(user_type(
            "App.Color",
            TypeKind::Enum {
                underlying: PrimitiveKind::Int32,
            },
        ))
        .expect("register");
    let oracle = StandardConversions::new(&table);
    let mut ctx = BinderContext::new(&table, &oracle);
    ctx.declare_variable("a", Ty::simple(color));
    ctx.declare_variable("b", Ty::simple(color));
    let mut bag = DiagnosticBag::new();
    let expr = binary(&arena, BinaryOp::BitAnd, ident("a"), ident("b"));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert!(matches!(
        bound.kind,
        BoundExprKind::BinaryOperator { method: None, .. }
    ));
    assert_eq!(bound.ty, Some(Ty::simple(color)));
    assert!(bag.is_empty(), "{:?}", bag.codes());
}

// =============================================================================
// Compound assignment
// =============================================================================

#[test]
fn compound_assignment_narrows_back_to_the_target() {
    // b += 1 over byte: the operator works in int, the result converts back
    // explicitly.
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let mut ctx = BinderContext::new(&table, &oracle);
    ctx.declare_variable("b", Ty::primitive(PrimitiveKind::Uint8));
    let mut bag = DiagnosticBag::new();
    let expr = Expr::Assign(arena.alloc(AssignExpr {
        op: AssignOp::Compound(BinaryOp::Add),
        target: ident("b"),
        value: int(1),
        span: span(),
    }));
    let bound = bind_expr(&ctx, &mut bag, expr);
    match &bound.kind {
        BoundExprKind::CompoundAssignment {
            final_conversion, ..
        } => assert!(!final_conversion.is_implicit),
        other => panic!("expected compound assignment, got {other:?}"),
    }
    assert_eq!(bound.ty, Some(Ty::primitive(PrimitiveKind::Uint8)));
    assert!(bag.is_empty(), "{:?}", bag.codes());
}

#[test]
fn compound_assignment_requires_a_storage_location() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle);
    let mut bag = DiagnosticBag::new();
    let expr = Expr::Assign(arena.alloc(AssignExpr {
        op: AssignOp::Compound(BinaryOp::Add),
        target: int(1),
        value: int(2),
        span: span(),
    }));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert!(bound.has_errors);
    assert_eq!(bag.codes(), vec!["ERR_AssgLvalueExpected"]);
}

// =============================================================================
// Conditional, coalescing, type tests
// =============================================================================

#[test]
fn constant_condition_selects_a_branch_constant() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle);
    let mut bag = DiagnosticBag::new();
    let expr = Expr::Cond(arena.alloc(CondExpr {
        cond: lit(LiteralValue::Bool(true)),
        when_true: int(1),
        when_false: int(2),
        span: span(),
    }));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert_eq!(bound.constant, Some(ConstantValue::Int32(1)));
    assert!(bag.is_empty());
}

#[test]
fn coalescing_a_nullable_unwraps_it() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let mut ctx = BinderContext::new(&table, &oracle);
    ctx.declare_variable("x", Ty::nullable(well_known::INT32));
    let mut bag = DiagnosticBag::new();
    let expr = binary(&arena, BinaryOp::Coalesce, ident("x"), int(0));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert!(matches!(bound.kind, BoundExprKind::NullCoalescing { .. }));
    assert_eq!(bound.ty, Some(Ty::simple(well_known::INT32)));
    assert!(bag.is_empty(), "{:?}", bag.codes());
}

#[test]
fn type_test_over_a_type_parameter_never_folds() {
    // An unconstrained parameter may be instantiated to satisfy or fail the
    // test, so no always-true/always-false warning fires.
    let arena = Bump::new();
    let mut table = SymbolTable::with_primitives();
    let param = table
        .register_type(user_type(
            "T",
            TypeKind::TypeParameter {
                constraint: TypeParamConstraint::None,
            },
        ))
        .expect("register");
    let oracle = StandardConversions::new(&table);
    let mut ctx = BinderContext::new(&table, &oracle);
    ctx.declare_variable("t", Ty::simple(param));
    let mut bag = DiagnosticBag::new();
    let expr = Expr::Is(arena.alloc(IsExpr {
        operand: ident("t"),
        target: TypeExpr::Named {
            name: "string",
            span: span(),
        },
        span: span(),
    }));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert!(matches!(bound.kind, BoundExprKind::IsOperator { .. }));
    assert_eq!(bound.constant, None);
    assert!(bag.is_empty(), "{:?}", bag.codes());
}

// =============================================================================
// Language versioning
// =============================================================================

#[test]
fn unsigned_right_shift_is_version_gated() {
    let arena = Bump::new();
    let table = SymbolTable::with_primitives();
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle).with_version(LanguageVersion::V1);
    let mut bag = DiagnosticBag::new();
    let expr = binary(&arena, BinaryOp::Ushr, int(16), int(2));
    let bound = bind_expr(&ctx, &mut bag, expr);
    assert!(bound.has_errors);
    assert_eq!(bag.codes(), vec!["ERR_FeatureNotAvailable"]);

    let latest = BinderContext::new(&table, &oracle);
    let mut bag = DiagnosticBag::new();
    let bound = bind_expr(&latest, &mut bag, expr);
    assert_eq!(bound.constant, Some(ConstantValue::Int32(4)));
    assert!(bag.is_empty());
}

// =============================================================================
// Imports
// =============================================================================

#[test]
fn duplicate_using_warns_once_and_lookup_is_unchanged() {
    let mut table = SymbolTable::with_primitives();
    table
        .register_type(user_type("Geo.Point", TypeKind::Struct))
        .expect("register");
    let oracle = StandardConversions::new(&table);

    let using_geo = || UsingDirective {
        kind: UsingKind::Namespace,
        target: Some(TypeExpr::Named {
            name: "Geo",
            span: span(),
        }),
        span: span(),
    };
    let mut bag = DiagnosticBag::new();
    let imports = Imports::build(&[using_geo(), using_geo()], &mut bag);
    assert_eq!(bag.codes(), vec!["WRN_DuplicateUsing"]);

    let ctx = BinderContext::new(&table, &oracle).with_imports(&imports);
    let mut bag = DiagnosticBag::new();
    let ty = bind_type(
        &ctx,
        &mut bag,
        TypeExpr::Named {
            name: "Point",
            span: span(),
        },
    );
    assert_eq!(ty, Some(Ty::simple(TypeHash::from_name("Geo.Point"))));
    assert!(bag.is_empty(), "{:?}", bag.codes());
}

#[test]
fn qualified_names_bind_through_namespaces() {
    let mut table = SymbolTable::with_primitives();
    table
        .register_type(user_type("Geo.Shapes.Circle", TypeKind::Class { base: None }))
        .expect("register");
    let oracle = StandardConversions::new(&table);
    let ctx = BinderContext::new(&table, &oracle);
    let mut bag = DiagnosticBag::new();
    let geo = TypeExpr::Named {
        name: "Geo",
        span: span(),
    };
    let shapes = TypeExpr::Qualified {
        qualifier: &geo,
        name: "Shapes",
        span: span(),
    };
    let ty = bind_type(
        &ctx,
        &mut bag,
        TypeExpr::Qualified {
            qualifier: &shapes,
            name: "Circle",
            span: span(),
        },
    );
    assert_eq!(
        ty,
        Some(Ty::simple(TypeHash::from_name("Geo.Shapes.Circle")))
    );
    assert!(bag.is_empty(), "{:?}", bag.codes());
}
