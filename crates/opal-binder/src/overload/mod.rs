//! Operator overload resolution.
//!
//! [`resolve_binary`] and [`resolve_unary`] build candidates from three
//! sources in fixed priority order, short-circuiting at the first source
//! with an applicable candidate: built-ins, user-defined static operators,
//! then extension scopes probed innermost-first (instance form before static
//! form inside each scope, no cross-scope merging).

use opal_core::PrimitiveKind;
use opal_registry::{OperatorForm, operator_names as names};
use opal_syntax::{BinaryOp, UnaryOp};

pub mod betterness;
pub mod candidates;
pub mod result;
pub mod signatures;

pub use candidates::{BinaryCandidate, CandidateSourceKind, UnaryCandidate};
pub use result::{OverloadResult, OverloadResultBuilder, OverloadResultKind};
pub use signatures::{
    BinaryOperatorKind, BinarySignature, OperandShape, UnaryOperatorKind, UnarySignature,
    builtin_binary_signatures, builtin_unary_signatures, operand_shape,
};

use crate::bound::BoundExpr;
use crate::context::BinderContext;
use crate::conversion::{Conversion, ConversionSource};
use betterness::{BestOutcome, find_best};

/// The metadata names probed for a binary operator, checked variants first
/// in checked contexts.
pub fn binary_operator_names(op: BinaryOp, checked: bool) -> Vec<&'static str> {
    let (plain, checked_name) = match op {
        BinaryOp::Add => (names::ADDITION, Some(names::CHECKED_ADDITION)),
        BinaryOp::Sub => (names::SUBTRACTION, Some(names::CHECKED_SUBTRACTION)),
        BinaryOp::Mul => (names::MULTIPLY, Some(names::CHECKED_MULTIPLY)),
        BinaryOp::Div => (names::DIVISION, Some(names::CHECKED_DIVISION)),
        BinaryOp::Rem => (names::MODULUS, None),
        BinaryOp::Shl => (names::LEFT_SHIFT, None),
        BinaryOp::Shr => (names::RIGHT_SHIFT, None),
        BinaryOp::Ushr => (names::UNSIGNED_RIGHT_SHIFT, None),
        BinaryOp::BitAnd | BinaryOp::LogicalAnd => (names::BITWISE_AND, None),
        BinaryOp::BitOr | BinaryOp::LogicalOr => (names::BITWISE_OR, None),
        BinaryOp::BitXor => (names::EXCLUSIVE_OR, None),
        BinaryOp::Eq => (names::EQUALITY, None),
        BinaryOp::Ne => (names::INEQUALITY, None),
        BinaryOp::Lt => (names::LESS_THAN, None),
        BinaryOp::Le => (names::LESS_THAN_OR_EQUAL, None),
        BinaryOp::Gt => (names::GREATER_THAN, None),
        BinaryOp::Ge => (names::GREATER_THAN_OR_EQUAL, None),
        BinaryOp::Coalesce => return Vec::new(),
    };
    let mut out = Vec::with_capacity(2);
    if checked {
        if let Some(name) = checked_name {
            out.push(name);
        }
    }
    out.push(plain);
    out
}

/// The metadata names probed for a unary operator.
pub fn unary_operator_names(op: UnaryOp, checked: bool) -> Vec<&'static str> {
    let (plain, checked_name) = match op {
        UnaryOp::Plus => (names::UNARY_PLUS, None),
        UnaryOp::Neg => (names::UNARY_NEGATION, Some(names::CHECKED_UNARY_NEGATION)),
        UnaryOp::Not => (names::LOGICAL_NOT, None),
        UnaryOp::Complement => (names::ONES_COMPLEMENT, None),
    };
    let mut out = Vec::with_capacity(2);
    if checked {
        if let Some(name) = checked_name {
            out.push(name);
        }
    }
    out.push(plain);
    out
}

fn applicable_binary(
    ctx: &BinderContext<'_>,
    sigs: Vec<BinarySignature>,
    source: CandidateSourceKind,
    checked: bool,
    left: &BoundExpr,
    right: &BoundExpr,
) -> Vec<BinaryCandidate> {
    sigs.into_iter()
        .filter_map(|signature| {
            let left_conversion =
                ctx.oracle
                    .classify(ConversionSource::Expr(left), signature.left, checked);
            if !left_conversion.exists() || !left_conversion.is_implicit {
                return None;
            }
            let right_conversion =
                ctx.oracle
                    .classify(ConversionSource::Expr(right), signature.right, checked);
            if !right_conversion.exists() || !right_conversion.is_implicit {
                return None;
            }
            Some(BinaryCandidate {
                signature,
                source,
                left_conversion,
                right_conversion,
            })
        })
        .collect()
}

fn applicable_unary(
    ctx: &BinderContext<'_>,
    sigs: Vec<UnarySignature>,
    source: CandidateSourceKind,
    checked: bool,
    operand: &BoundExpr,
) -> Vec<UnaryCandidate> {
    sigs.into_iter()
        .filter_map(|signature| {
            let conversion =
                ctx.oracle
                    .classify(ConversionSource::Expr(operand), signature.operand, checked);
            if !conversion.exists() || !conversion.is_implicit {
                return None;
            }
            Some(UnaryCandidate {
                signature,
                source,
                conversion,
            })
        })
        .collect()
}

fn rank_binary(
    ctx: &BinderContext<'_>,
    builder: OverloadResultBuilder,
    mut applicable: Vec<BinaryCandidate>,
) -> OverloadResult<BinaryCandidate> {
    let per_candidate: Vec<Vec<(Conversion, opal_core::Ty)>> = applicable
        .iter()
        .map(|c| {
            vec![
                (c.left_conversion, c.signature.left),
                (c.right_conversion, c.signature.right),
            ]
        })
        .collect();
    match find_best(ctx.oracle, &per_candidate) {
        BestOutcome::Unique(index) => OverloadResult::viable(applicable.swap_remove(index)),
        BestOutcome::Ambiguous(tied) => {
            let tied: Vec<BinaryCandidate> = tied
                .into_iter()
                .map(|index| applicable[index].clone())
                .collect();
            builder.finish_ambiguous(tied)
        }
    }
}

/// Resolve a binary operator over two bound operands.
pub fn resolve_binary(
    ctx: &BinderContext<'_>,
    op: BinaryOp,
    checked: bool,
    left: &BoundExpr,
    right: &BoundExpr,
) -> OverloadResult<BinaryCandidate> {
    let operator = BinaryOperatorKind::operator_of(op);
    let operator_names = binary_operator_names(op, checked);
    let left_shape = operand_shape(ctx.table, left.ty, left.is_null_literal());
    let right_shape = operand_shape(ctx.table, right.ty, right.is_null_literal());
    let mut builder = OverloadResultBuilder::new();

    // 1. Built-in signature table.
    let builtins = builtin_binary_signatures(op, checked, left_shape, right_shape);
    if !builtins.is_empty() {
        let applicable = applicable_binary(
            ctx,
            builtins,
            CandidateSourceKind::BuiltIn,
            checked,
            left,
            right,
        );
        if !applicable.is_empty() {
            return rank_binary(ctx, builder, applicable);
        }
        builder.note_candidates();
    }

    // 2. User-defined static operators.
    let user_defined = candidates::user_defined_binary(
        ctx.table,
        operator,
        &operator_names,
        left.ty,
        right.ty,
    );
    if !user_defined.is_empty() {
        builder.note_user_defined(user_defined.iter().filter_map(|s| s.method.clone()));
        let mut applicable = applicable_binary(
            ctx,
            user_defined,
            CandidateSourceKind::UserDefined,
            checked,
            left,
            right,
        );
        if checked {
            candidates::prefer_checked_binary(&mut applicable);
        }
        if !applicable.is_empty() {
            return rank_binary(ctx, builder, applicable);
        }
    }

    // 3. Extension scopes, innermost first; instance form first per scope.
    for (scope_index, scope) in ctx.extension_scopes.iter().enumerate() {
        for form in [OperatorForm::Instance, OperatorForm::Static] {
            let sigs = candidates::extension_binary(scope, operator, &operator_names, form);
            if sigs.is_empty() {
                continue;
            }
            builder.note_user_defined(sigs.iter().filter_map(|s| s.method.clone()));
            let mut applicable = applicable_binary(
                ctx,
                sigs,
                CandidateSourceKind::Extension { scope: scope_index },
                checked,
                left,
                right,
            );
            if checked {
                candidates::prefer_checked_binary(&mut applicable);
            }
            if !applicable.is_empty() {
                return rank_binary(ctx, builder, applicable);
            }
        }
    }

    builder.finish()
}

/// Resolve a unary operator over a bound operand.
pub fn resolve_unary(
    ctx: &BinderContext<'_>,
    op: UnaryOp,
    checked: bool,
    operand: &BoundExpr,
) -> OverloadResult<UnaryCandidate> {
    let operator = UnaryOperatorKind::operator_of(op);
    let operator_names = unary_operator_names(op, checked);
    let shape = operand_shape(ctx.table, operand.ty, operand.is_null_literal());
    let mut builder = OverloadResultBuilder::new();

    let builtins = builtin_unary_signatures(op, checked, shape);
    if !builtins.is_empty() {
        let applicable = applicable_unary(
            ctx,
            builtins,
            CandidateSourceKind::BuiltIn,
            checked,
            operand,
        );
        if !applicable.is_empty() {
            return rank_unary(ctx, builder, applicable, op, operand);
        }
        builder.note_candidates();
    }

    let user_defined =
        candidates::user_defined_unary(ctx.table, operator, &operator_names, operand.ty);
    if !user_defined.is_empty() {
        builder.note_user_defined(user_defined.iter().filter_map(|s| s.method.clone()));
        let mut applicable = applicable_unary(
            ctx,
            user_defined,
            CandidateSourceKind::UserDefined,
            checked,
            operand,
        );
        if checked {
            candidates::prefer_checked_unary(&mut applicable);
        }
        if !applicable.is_empty() {
            return rank_unary(ctx, builder, applicable, op, operand);
        }
    }

    for (scope_index, scope) in ctx.extension_scopes.iter().enumerate() {
        for form in [OperatorForm::Instance, OperatorForm::Static] {
            let sigs = candidates::extension_unary(scope, operator, &operator_names, form);
            if sigs.is_empty() {
                continue;
            }
            builder.note_user_defined(sigs.iter().filter_map(|s| s.method.clone()));
            let mut applicable = applicable_unary(
                ctx,
                sigs,
                CandidateSourceKind::Extension { scope: scope_index },
                checked,
                operand,
            );
            if checked {
                candidates::prefer_checked_unary(&mut applicable);
            }
            if !applicable.is_empty() {
                return rank_unary(ctx, builder, applicable, op, operand);
            }
        }
    }

    builder.finish()
}

fn rank_unary(
    ctx: &BinderContext<'_>,
    builder: OverloadResultBuilder,
    mut applicable: Vec<UnaryCandidate>,
    op: UnaryOp,
    operand: &BoundExpr,
) -> OverloadResult<UnaryCandidate> {
    let per_candidate: Vec<Vec<(Conversion, opal_core::Ty)>> = applicable
        .iter()
        .map(|c| vec![(c.conversion, c.signature.operand)])
        .collect();
    match find_best(ctx.oracle, &per_candidate) {
        BestOutcome::Unique(index) => OverloadResult::viable(applicable.swap_remove(index)),
        BestOutcome::Ambiguous(tied) => {
            let tied: Vec<UnaryCandidate> = tied
                .into_iter()
                .map(|index| applicable[index].clone())
                .collect();
            if downgrade_minus_ambiguity(op, operand, &tied) {
                return builder.finish_downgraded();
            }
            builder.finish_ambiguous(tied)
        }
    }
}

/// Unary minus over `ulong`/`nuint` has no signed covering type; when the
/// only tie is between float/double and decimal forms the ambiguity is
/// reported as a plain resolution failure, which reads better than an
/// ambiguity between conversions the user never wrote.
fn downgrade_minus_ambiguity(op: UnaryOp, operand: &BoundExpr, tied: &[UnaryCandidate]) -> bool {
    if op != UnaryOp::Neg {
        return false;
    }
    let operand_kind = operand
        .ty
        .and_then(|t| t.strip_nullable().primitive_kind());
    if !matches!(
        operand_kind,
        Some(PrimitiveKind::Uint64) | Some(PrimitiveKind::NUint)
    ) {
        return false;
    }
    tied.iter().all(|c| {
        matches!(
            c.signature.operand.strip_nullable().primitive_kind(),
            Some(PrimitiveKind::Float32)
                | Some(PrimitiveKind::Float64)
                | Some(PrimitiveKind::Decimal)
        )
    })
}
