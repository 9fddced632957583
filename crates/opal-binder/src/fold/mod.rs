//! Compile-time constant folding.
//!
//! The folder evaluates a resolved built-in operator over constant operands.
//! It dispatches on the bit-packed operator kind: the operand category picks
//! the arithmetic domain and the `CHECKED` bit picks trapping vs wrapping
//! integer semantics. Enum operands are folded by the operator binder through
//! their underlying numeric category, so no enum category appears here.
//!
//! Failure semantics:
//!
//! - a `Bad` operand makes the result `Bad` with no further diagnostics
//! - checked integer overflow reports `CheckedOverflow` and yields `Bad`
//! - integer division/remainder by zero reports `IntegerDivisionByZero` and
//!   yields `Bad` in both checked and unchecked mode
//! - decimal arithmetic is always checked; overflow reports `DecimalOverflow`
//! - float arithmetic never fails (division by zero folds to infinity)
//!
//! `None` means "not foldable here" (user-defined, dynamic or lifted kinds);
//! the caller leaves the expression non-constant.

use opal_core::{ConstantValue, DiagnosticBag, Span};

use crate::overload::{BinaryOperatorKind, UnaryOperatorKind};

mod binary;
mod unary;

/// Fold a built-in binary operator over two constants.
pub fn fold_binary(
    kind: BinaryOperatorKind,
    left: &ConstantValue,
    right: &ConstantValue,
    span: Span,
    bag: &mut DiagnosticBag,
) -> Option<ConstantValue> {
    if left.is_bad() || right.is_bad() {
        return Some(ConstantValue::Bad);
    }
    // Lifted operators are never constant expressions.
    if kind.is_lifted() {
        return None;
    }
    binary::fold(kind, left, right, span, bag)
}

/// Fold a built-in unary operator over a constant.
pub fn fold_unary(
    kind: UnaryOperatorKind,
    operand: &ConstantValue,
    span: Span,
    bag: &mut DiagnosticBag,
) -> Option<ConstantValue> {
    if operand.is_bad() {
        return Some(ConstantValue::Bad);
    }
    if kind.is_lifted() {
        return None;
    }
    unary::fold(kind, operand, span, bag)
}

/// Widen a numeric constant to `f64` for the float categories (integral
/// constants reach a float fold through implicit constant conversions).
fn as_f64(value: &ConstantValue) -> Option<f64> {
    match value {
        ConstantValue::Float32(v) => Some(v.into_inner() as f64),
        ConstantValue::Float64(v) => Some(v.into_inner()),
        ConstantValue::Uint64(v) | ConstantValue::NUint(v) => Some(*v as f64),
        other => other.as_i64().map(|v| v as f64),
    }
}

/// Widen a constant to [`opal_core::Decimal`] for the decimal category.
fn as_decimal(value: &ConstantValue) -> Option<opal_core::Decimal> {
    match value {
        ConstantValue::Decimal(v) => Some(*v),
        ConstantValue::Uint64(v) | ConstantValue::NUint(v) => {
            Some(opal_core::Decimal::from_u64(*v))
        }
        other => other.as_i64().map(opal_core::Decimal::from_i64),
    }
}
