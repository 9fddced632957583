//! Unary constant folding, by operand category.

use opal_core::{ConstantValue, Diagnostic, DiagnosticBag, Span};

use crate::overload::UnaryOperatorKind as K;

use super::{as_decimal, as_f64};

/// Signed negation and complement in one concrete width.
macro_rules! fold_signed {
    ($t:ty, $variant:ident, $value:expr, $kind:expr, $span:expr, $bag:expr) => {{
        let a = $value as $t;
        let op = $kind.operator();
        Some(if op == K::UNARY_PLUS {
            ConstantValue::$variant(a)
        } else if op == K::UNARY_MINUS {
            if $kind.is_checked() {
                match a.checked_neg() {
                    Some(v) => ConstantValue::$variant(v),
                    None => {
                        $bag.push(Diagnostic::CheckedOverflow { span: $span });
                        ConstantValue::Bad
                    }
                }
            } else {
                ConstantValue::$variant(a.wrapping_neg())
            }
        } else if op == K::BITWISE_COMPLEMENT {
            ConstantValue::$variant(!a)
        } else {
            return None;
        })
    }};
}

/// Unsigned identity and complement in one concrete width.
macro_rules! fold_unsigned {
    ($t:ty, $variant:ident, $value:expr, $kind:expr) => {{
        let a = $value as $t;
        let op = $kind.operator();
        Some(if op == K::UNARY_PLUS {
            ConstantValue::$variant(a)
        } else if op == K::BITWISE_COMPLEMENT {
            ConstantValue::$variant(!a)
        } else {
            return None;
        })
    }};
}

pub(super) fn fold(
    kind: K,
    operand: &ConstantValue,
    span: Span,
    bag: &mut DiagnosticBag,
) -> Option<ConstantValue> {
    let category = kind.category();
    if category == K::INT {
        fold_signed!(i32, Int32, operand.as_i64()?, kind, span, bag)
    } else if category == K::UINT {
        fold_unsigned!(u32, Uint32, operand.as_u64()?, kind)
    } else if category == K::LONG {
        fold_signed!(i64, Int64, operand.as_i64()?, kind, span, bag)
    } else if category == K::ULONG {
        fold_unsigned!(u64, Uint64, operand.as_u64()?, kind)
    } else if category == K::NINT {
        fold_signed!(i64, NInt, operand.as_i64()?, kind, span, bag)
    } else if category == K::NUINT {
        fold_unsigned!(u64, NUint, operand.as_u64()?, kind)
    } else if category == K::FLOAT {
        let a = as_f64(operand)? as f32;
        let op = kind.operator();
        if op == K::UNARY_PLUS {
            Some(ConstantValue::float32(a))
        } else if op == K::UNARY_MINUS {
            Some(ConstantValue::float32(-a))
        } else {
            None
        }
    } else if category == K::DOUBLE {
        let a = as_f64(operand)?;
        let op = kind.operator();
        if op == K::UNARY_PLUS {
            Some(ConstantValue::float64(a))
        } else if op == K::UNARY_MINUS {
            Some(ConstantValue::float64(-a))
        } else {
            None
        }
    } else if category == K::DECIMAL {
        let a = as_decimal(operand)?;
        let op = kind.operator();
        if op == K::UNARY_PLUS {
            Some(ConstantValue::Decimal(a))
        } else if op == K::UNARY_MINUS {
            Some(match a.checked_neg() {
                Some(v) => ConstantValue::Decimal(v),
                None => {
                    bag.push(Diagnostic::DecimalOverflow { span });
                    ConstantValue::Bad
                }
            })
        } else {
            None
        }
    } else if category == K::BOOL {
        let a = operand.as_bool()?;
        if kind.operator() == K::LOGICAL_NEGATION {
            Some(ConstantValue::Bool(!a))
        } else {
            None
        }
    } else {
        None
    }
}
