//! Binary constant folding, by operand category.

use opal_core::{ConstantValue, Diagnostic, DiagnosticBag, Span};

use crate::overload::BinaryOperatorKind as K;

use super::{as_decimal, as_f64};

/// Integer arithmetic in one concrete width: trapping in checked mode,
/// wrapping otherwise. Division and remainder by zero are always errors.
macro_rules! fold_int {
    ($t:ty, $variant:ident, $lhs:expr, $rhs:expr, $kind:expr, $span:expr, $bag:expr) => {{
        let a = $lhs as $t;
        let b = $rhs as $t;
        let op = $kind.operator();
        let checked = $kind.is_checked();
        let arith = |checked_result: Option<$t>, wrapped: $t, bag: &mut DiagnosticBag| {
            if checked {
                match checked_result {
                    Some(v) => ConstantValue::$variant(v),
                    None => {
                        bag.push(Diagnostic::CheckedOverflow { span: $span });
                        ConstantValue::Bad
                    }
                }
            } else {
                ConstantValue::$variant(wrapped)
            }
        };
        Some(if op == K::ADDITION {
            arith(a.checked_add(b), a.wrapping_add(b), $bag)
        } else if op == K::SUBTRACTION {
            arith(a.checked_sub(b), a.wrapping_sub(b), $bag)
        } else if op == K::MULTIPLICATION {
            arith(a.checked_mul(b), a.wrapping_mul(b), $bag)
        } else if op == K::DIVISION || op == K::REMAINDER {
            if b == 0 {
                $bag.push(Diagnostic::IntegerDivisionByZero { span: $span });
                ConstantValue::Bad
            } else if op == K::DIVISION {
                arith(a.checked_div(b), a.wrapping_div(b), $bag)
            } else {
                arith(a.checked_rem(b), a.wrapping_rem(b), $bag)
            }
        } else if op == K::AND {
            ConstantValue::$variant(a & b)
        } else if op == K::OR {
            ConstantValue::$variant(a | b)
        } else if op == K::XOR {
            ConstantValue::$variant(a ^ b)
        } else if op == K::EQUAL {
            ConstantValue::Bool(a == b)
        } else if op == K::NOT_EQUAL {
            ConstantValue::Bool(a != b)
        } else if op == K::LESS_THAN {
            ConstantValue::Bool(a < b)
        } else if op == K::LESS_THAN_OR_EQUAL {
            ConstantValue::Bool(a <= b)
        } else if op == K::GREATER_THAN {
            ConstantValue::Bool(a > b)
        } else if op == K::GREATER_THAN_OR_EQUAL {
            ConstantValue::Bool(a >= b)
        } else {
            return None;
        })
    }};
}

pub(super) fn fold(
    kind: K,
    left: &ConstantValue,
    right: &ConstantValue,
    span: Span,
    bag: &mut DiagnosticBag,
) -> Option<ConstantValue> {
    let category = kind.category();
    let operator = kind.operator();

    if operator == K::LEFT_SHIFT
        || operator == K::RIGHT_SHIFT
        || operator == K::UNSIGNED_RIGHT_SHIFT
    {
        return fold_shift(category, operator, left, right);
    }

    if category == K::INT {
        fold_int!(i32, Int32, left.as_i64()?, right.as_i64()?, kind, span, bag)
    } else if category == K::UINT {
        fold_int!(u32, Uint32, left.as_u64()?, right.as_u64()?, kind, span, bag)
    } else if category == K::LONG {
        fold_int!(i64, Int64, left.as_i64()?, right.as_i64()?, kind, span, bag)
    } else if category == K::ULONG {
        fold_int!(u64, Uint64, left.as_u64()?, right.as_u64()?, kind, span, bag)
    } else if category == K::NINT {
        fold_int!(i64, NInt, left.as_i64()?, right.as_i64()?, kind, span, bag)
    } else if category == K::NUINT {
        fold_int!(u64, NUint, left.as_u64()?, right.as_u64()?, kind, span, bag)
    } else if category == K::FLOAT {
        fold_float(operator, as_f64(left)? as f32, as_f64(right)? as f32)
    } else if category == K::DOUBLE {
        fold_double(operator, as_f64(left)?, as_f64(right)?)
    } else if category == K::DECIMAL {
        fold_decimal(operator, left, right, span, bag)
    } else if category == K::BOOL {
        fold_bool(operator, left.as_bool()?, right.as_bool()?)
    } else if category == K::STRING {
        fold_string(operator, left, right)
    } else {
        None
    }
}

fn fold_shift(
    category: K,
    operator: K,
    left: &ConstantValue,
    right: &ConstantValue,
) -> Option<ConstantValue> {
    // The count operand is always int; it is masked to the operand width.
    let count = right.as_i64()? as u32;
    Some(match category {
        _ if category == K::INT => {
            let a = left.as_i64()? as i32;
            let s = count & 0x1f;
            if operator == K::LEFT_SHIFT {
                ConstantValue::Int32(a << s)
            } else if operator == K::RIGHT_SHIFT {
                ConstantValue::Int32(a >> s)
            } else {
                ConstantValue::Int32(((a as u32) >> s) as i32)
            }
        }
        _ if category == K::UINT => {
            let a = left.as_u64()? as u32;
            let s = count & 0x1f;
            if operator == K::LEFT_SHIFT {
                ConstantValue::Uint32(a << s)
            } else {
                ConstantValue::Uint32(a >> s)
            }
        }
        _ if category == K::LONG => {
            let a = left.as_i64()?;
            let s = count & 0x3f;
            if operator == K::LEFT_SHIFT {
                ConstantValue::Int64(a << s)
            } else if operator == K::RIGHT_SHIFT {
                ConstantValue::Int64(a >> s)
            } else {
                ConstantValue::Int64(((a as u64) >> s) as i64)
            }
        }
        _ if category == K::ULONG => {
            let a = left.as_u64()?;
            let s = count & 0x3f;
            if operator == K::LEFT_SHIFT {
                ConstantValue::Uint64(a << s)
            } else {
                ConstantValue::Uint64(a >> s)
            }
        }
        // Native-int shifts are platform-width-dependent and never fold.
        _ => return None,
    })
}

fn fold_float(operator: K, a: f32, b: f32) -> Option<ConstantValue> {
    Some(if operator == K::ADDITION {
        ConstantValue::float32(a + b)
    } else if operator == K::SUBTRACTION {
        ConstantValue::float32(a - b)
    } else if operator == K::MULTIPLICATION {
        ConstantValue::float32(a * b)
    } else if operator == K::DIVISION {
        ConstantValue::float32(a / b)
    } else if operator == K::REMAINDER {
        ConstantValue::float32(a % b)
    } else {
        return float_comparison(operator, a as f64, b as f64);
    })
}

fn fold_double(operator: K, a: f64, b: f64) -> Option<ConstantValue> {
    Some(if operator == K::ADDITION {
        ConstantValue::float64(a + b)
    } else if operator == K::SUBTRACTION {
        ConstantValue::float64(a - b)
    } else if operator == K::MULTIPLICATION {
        ConstantValue::float64(a * b)
    } else if operator == K::DIVISION {
        ConstantValue::float64(a / b)
    } else if operator == K::REMAINDER {
        ConstantValue::float64(a % b)
    } else {
        return float_comparison(operator, a, b);
    })
}

fn float_comparison(operator: K, a: f64, b: f64) -> Option<ConstantValue> {
    Some(ConstantValue::Bool(if operator == K::EQUAL {
        a == b
    } else if operator == K::NOT_EQUAL {
        a != b
    } else if operator == K::LESS_THAN {
        a < b
    } else if operator == K::LESS_THAN_OR_EQUAL {
        a <= b
    } else if operator == K::GREATER_THAN {
        a > b
    } else if operator == K::GREATER_THAN_OR_EQUAL {
        a >= b
    } else {
        return None;
    }))
}

fn fold_decimal(
    operator: K,
    left: &ConstantValue,
    right: &ConstantValue,
    span: Span,
    bag: &mut DiagnosticBag,
) -> Option<ConstantValue> {
    let a = as_decimal(left)?;
    let b = as_decimal(right)?;
    if operator == K::DIVISION || operator == K::REMAINDER {
        if b.is_zero() {
            bag.push(Diagnostic::IntegerDivisionByZero { span });
            return Some(ConstantValue::Bad);
        }
    }
    let arithmetic = if operator == K::ADDITION {
        Some(a.checked_add(b))
    } else if operator == K::SUBTRACTION {
        Some(a.checked_sub(b))
    } else if operator == K::MULTIPLICATION {
        Some(a.checked_mul(b))
    } else if operator == K::DIVISION {
        Some(a.checked_div(b))
    } else if operator == K::REMAINDER {
        Some(a.checked_rem(b))
    } else {
        None
    };
    if let Some(result) = arithmetic {
        return Some(match result {
            Some(v) => ConstantValue::Decimal(v),
            None => {
                bag.push(Diagnostic::DecimalOverflow { span });
                ConstantValue::Bad
            }
        });
    }
    Some(ConstantValue::Bool(if operator == K::EQUAL {
        a == b
    } else if operator == K::NOT_EQUAL {
        a != b
    } else if operator == K::LESS_THAN {
        a < b
    } else if operator == K::LESS_THAN_OR_EQUAL {
        a <= b
    } else if operator == K::GREATER_THAN {
        a > b
    } else if operator == K::GREATER_THAN_OR_EQUAL {
        a >= b
    } else {
        return None;
    }))
}

fn fold_bool(operator: K, a: bool, b: bool) -> Option<ConstantValue> {
    Some(ConstantValue::Bool(if operator == K::AND {
        a & b
    } else if operator == K::OR {
        a | b
    } else if operator == K::XOR {
        a ^ b
    } else if operator == K::EQUAL {
        a == b
    } else if operator == K::NOT_EQUAL {
        a != b
    } else {
        return None;
    }))
}

fn fold_string(operator: K, left: &ConstantValue, right: &ConstantValue) -> Option<ConstantValue> {
    // A null operand concatenates as empty and compares unequal to any
    // string (and equal to null).
    let (a, b) = match (left, right) {
        (ConstantValue::Null, ConstantValue::Null) => (None, None),
        (ConstantValue::Null, other) => (None, Some(other.as_str()?)),
        (other, ConstantValue::Null) => (Some(other.as_str()?), None),
        (l, r) => (Some(l.as_str()?), Some(r.as_str()?)),
    };
    Some(if operator == K::ADDITION {
        let mut out = String::with_capacity(
            a.map(str::len).unwrap_or(0) + b.map(str::len).unwrap_or(0),
        );
        out.push_str(a.unwrap_or(""));
        out.push_str(b.unwrap_or(""));
        ConstantValue::String(out)
    } else if operator == K::EQUAL {
        ConstantValue::Bool(a == b)
    } else if operator == K::NOT_EQUAL {
        ConstantValue::Bool(a != b)
    } else {
        return None;
    })
}
