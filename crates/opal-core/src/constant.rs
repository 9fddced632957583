//! Compile-time constant values.
//!
//! [`ConstantValue`] is the result of constant folding. It carries the folded
//! value tagged with its type, plus two special states:
//!
//! - `Null`: the untyped `null` literal (also the value of folded
//!   null-comparison operands)
//! - `Bad`: a folding failure (checked overflow, division by zero, decimal
//!   overflow). `Bad` is sticky: once an operand is `Bad`, every containing
//!   fold is `Bad` without further diagnostics.
//!
//! Floats are stored as `OrderedFloat` so the enum is `Eq + Hash` and can be
//! used as a map key (switch-case sets, constant dedup).

use std::fmt;

use ordered_float::OrderedFloat;

use crate::primitive_kind::PrimitiveKind;

/// Maximum decimal scale (number of fractional digits), matching the
/// 128-bit scaled decimal format.
const MAX_DECIMAL_SCALE: u8 = 28;

/// Mantissa bound: |mantissa| must fit in 96 bits.
const DECIMAL_MANTISSA_BOUND: i128 = 1i128 << 96;

/// A 128-bit scaled decimal: `mantissa * 10^-scale`.
///
/// Arithmetic is always overflow-checked; operations return `None` when the
/// result cannot be represented, which the folder surfaces as
/// [`ConstantValue::Bad`] plus an overflow diagnostic.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: i128,
    scale: u8,
}

impl Decimal {
    /// Zero.
    pub const ZERO: Decimal = Decimal {
        mantissa: 0,
        scale: 0,
    };

    /// One.
    pub const ONE: Decimal = Decimal {
        mantissa: 1,
        scale: 0,
    };

    /// Create a decimal from a raw mantissa and scale.
    ///
    /// Returns `None` if the scale exceeds 28 or the mantissa exceeds 96 bits.
    pub fn new(mantissa: i128, scale: u8) -> Option<Decimal> {
        if scale > MAX_DECIMAL_SCALE || mantissa.abs() >= DECIMAL_MANTISSA_BOUND {
            return None;
        }
        Some(Decimal { mantissa, scale })
    }

    /// Create a decimal from a signed integer.
    pub fn from_i64(value: i64) -> Decimal {
        Decimal {
            mantissa: value as i128,
            scale: 0,
        }
    }

    /// Create a decimal from an unsigned integer.
    pub fn from_u64(value: u64) -> Decimal {
        Decimal {
            mantissa: value as i128,
            scale: 0,
        }
    }

    /// The raw mantissa.
    pub fn mantissa(self) -> i128 {
        self.mantissa
    }

    /// The scale (fractional digit count).
    pub fn scale(self) -> u8 {
        self.scale
    }

    /// Whether the value is zero.
    pub fn is_zero(self) -> bool {
        self.mantissa == 0
    }

    /// Bring two decimals to a common scale. Returns `None` on overflow.
    fn align(a: Decimal, b: Decimal) -> Option<(i128, i128, u8)> {
        if a.scale == b.scale {
            return Some((a.mantissa, b.mantissa, a.scale));
        }
        let (lo, hi) = if a.scale < b.scale { (a, b) } else { (b, a) };
        let mut scaled = lo.mantissa;
        for _ in lo.scale..hi.scale {
            scaled = scaled.checked_mul(10)?;
        }
        if scaled.abs() >= DECIMAL_MANTISSA_BOUND {
            return None;
        }
        if a.scale < b.scale {
            Some((scaled, b.mantissa, hi.scale))
        } else {
            Some((a.mantissa, scaled, hi.scale))
        }
    }

    /// Reduce scale/mantissa until both fit, rounding half away from zero.
    /// Returns `None` if the integral part alone overflows.
    fn normalize(mut mantissa: i128, mut scale: u8) -> Option<Decimal> {
        while scale > MAX_DECIMAL_SCALE || mantissa.abs() >= DECIMAL_MANTISSA_BOUND {
            if scale == 0 {
                return None;
            }
            let rem = mantissa % 10;
            mantissa /= 10;
            if rem.abs() >= 5 {
                mantissa += rem.signum();
            }
            scale -= 1;
        }
        Some(Decimal { mantissa, scale })
    }

    /// Checked addition.
    pub fn checked_add(self, other: Decimal) -> Option<Decimal> {
        let (a, b, scale) = Decimal::align(self, other)?;
        Decimal::normalize(a.checked_add(b)?, scale)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, other: Decimal) -> Option<Decimal> {
        let (a, b, scale) = Decimal::align(self, other)?;
        Decimal::normalize(a.checked_sub(b)?, scale)
    }

    /// Checked multiplication.
    pub fn checked_mul(self, other: Decimal) -> Option<Decimal> {
        let product = self.mantissa.checked_mul(other.mantissa)?;
        Decimal::normalize(product, self.scale.checked_add(other.scale)?)
    }

    /// Checked division. Returns `None` for division by zero or overflow.
    pub fn checked_div(self, other: Decimal) -> Option<Decimal> {
        if other.mantissa == 0 {
            return None;
        }
        let negative = (self.mantissa < 0) != (other.mantissa < 0);
        let mut num = self.mantissa.unsigned_abs();
        let den = other.mantissa.unsigned_abs();

        let mut quotient = num / den;
        num %= den;
        // Extend with fractional digits while precision remains.
        let mut scale = self.scale as i32 - other.scale as i32;
        while num != 0 && scale < MAX_DECIMAL_SCALE as i32 {
            num = num.checked_mul(10)?;
            quotient = quotient.checked_mul(10)?.checked_add(num / den)?;
            num %= den;
            scale += 1;
        }
        // A negative effective scale means the quotient must be scaled up.
        while scale < 0 {
            quotient = quotient.checked_mul(10)?;
            scale += 1;
        }
        let mut mantissa = i128::try_from(quotient).ok()?;
        if negative {
            mantissa = -mantissa;
        }
        Decimal::normalize(mantissa, scale as u8)
    }

    /// Checked remainder. Returns `None` for division by zero or overflow.
    pub fn checked_rem(self, other: Decimal) -> Option<Decimal> {
        if other.mantissa == 0 {
            return None;
        }
        let (a, b, scale) = Decimal::align(self, other)?;
        Decimal::normalize(a.checked_rem(b)?, scale)
    }

    /// Checked negation.
    pub fn checked_neg(self) -> Option<Decimal> {
        Some(Decimal {
            mantissa: self.mantissa.checked_neg()?,
            scale: self.scale,
        })
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match Decimal::align(*self, *other) {
            Some((a, b, _)) => a.cmp(&b),
            // Alignment can only overflow when magnitudes differ wildly, so
            // compare by sign and integral magnitude.
            None => {
                let a = self.mantissa / 10i128.pow(self.scale as u32);
                let b = other.mantissa / 10i128.pow(other.scale as u32);
                a.cmp(&b)
            }
        }
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}m")
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{sign}{int_part}.{frac_part}")
        } else {
            write!(f, "{sign}0.{digits:0>scale$}")
        }
    }
}

/// A compile-time constant value, tagged with its type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstantValue {
    /// Folding failed (checked overflow, division by zero). Sticky.
    Bad,
    /// The untyped `null` literal.
    Null,
    Bool(bool),
    Char(char),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    /// Native-sized signed integer, held in its widest representation.
    NInt(i64),
    /// Native-sized unsigned integer, held in its widest representation.
    NUint(u64),
    Float32(OrderedFloat<f32>),
    Float64(OrderedFloat<f64>),
    Decimal(Decimal),
    String(String),
}

impl ConstantValue {
    /// Whether this is the `Bad` (folding failure) state.
    ///
    /// Callers must check this separately from the wrapping expression's
    /// error flag: a `Bad` constant on an otherwise well-typed expression is
    /// a compile-time arithmetic failure, not a type error.
    pub fn is_bad(&self) -> bool {
        matches!(self, ConstantValue::Bad)
    }

    /// Whether this is the `null` literal value.
    pub fn is_null(&self) -> bool {
        matches!(self, ConstantValue::Null)
    }

    /// The primitive kind of the carried value, when it has one.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            ConstantValue::Bad | ConstantValue::Null => None,
            ConstantValue::Bool(_) => Some(PrimitiveKind::Bool),
            ConstantValue::Char(_) => Some(PrimitiveKind::Char),
            ConstantValue::Int8(_) => Some(PrimitiveKind::Int8),
            ConstantValue::Int16(_) => Some(PrimitiveKind::Int16),
            ConstantValue::Int32(_) => Some(PrimitiveKind::Int32),
            ConstantValue::Int64(_) => Some(PrimitiveKind::Int64),
            ConstantValue::Uint8(_) => Some(PrimitiveKind::Uint8),
            ConstantValue::Uint16(_) => Some(PrimitiveKind::Uint16),
            ConstantValue::Uint32(_) => Some(PrimitiveKind::Uint32),
            ConstantValue::Uint64(_) => Some(PrimitiveKind::Uint64),
            ConstantValue::NInt(_) => Some(PrimitiveKind::NInt),
            ConstantValue::NUint(_) => Some(PrimitiveKind::NUint),
            ConstantValue::Float32(_) => Some(PrimitiveKind::Float32),
            ConstantValue::Float64(_) => Some(PrimitiveKind::Float64),
            ConstantValue::Decimal(_) => Some(PrimitiveKind::Decimal),
            ConstantValue::String(_) => Some(PrimitiveKind::String),
        }
    }

    /// Widen a signed integral constant (including `char`, which widens as
    /// unsigned) to `i64`. `None` for non-integral values.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConstantValue::Char(v) => Some(*v as i64),
            ConstantValue::Int8(v) => Some(*v as i64),
            ConstantValue::Int16(v) => Some(*v as i64),
            ConstantValue::Int32(v) => Some(*v as i64),
            ConstantValue::Int64(v) | ConstantValue::NInt(v) => Some(*v),
            ConstantValue::Uint8(v) => Some(*v as i64),
            ConstantValue::Uint16(v) => Some(*v as i64),
            ConstantValue::Uint32(v) => Some(*v as i64),
            ConstantValue::Uint64(v) | ConstantValue::NUint(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Widen an unsigned integral constant to `u64`. `None` for negative or
    /// non-integral values.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ConstantValue::Char(v) => Some(*v as u64),
            ConstantValue::Uint8(v) => Some(*v as u64),
            ConstantValue::Uint16(v) => Some(*v as u64),
            ConstantValue::Uint32(v) => Some(*v as u64),
            ConstantValue::Uint64(v) | ConstantValue::NUint(v) => Some(*v),
            ConstantValue::Int8(v) => u64::try_from(*v).ok(),
            ConstantValue::Int16(v) => u64::try_from(*v).ok(),
            ConstantValue::Int32(v) => u64::try_from(*v).ok(),
            ConstantValue::Int64(v) | ConstantValue::NInt(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean constant.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstantValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The string payload, if this is a string constant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Convenience constructor for float constants.
    pub fn float32(value: f32) -> ConstantValue {
        ConstantValue::Float32(OrderedFloat(value))
    }

    /// Convenience constructor for double constants.
    pub fn float64(value: f64) -> ConstantValue {
        ConstantValue::Float64(OrderedFloat(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_add_aligns_scales() {
        // 1.5 + 0.25 = 1.75
        let a = Decimal::new(15, 1).unwrap();
        let b = Decimal::new(25, 2).unwrap();
        let sum = a.checked_add(b).unwrap();
        assert_eq!(sum.to_string(), "1.75");
    }

    #[test]
    fn decimal_mul_and_div() {
        let a = Decimal::new(125, 2).unwrap(); // 1.25
        let b = Decimal::from_i64(4);
        assert_eq!(a.checked_mul(b).unwrap().to_string(), "5.00");
        assert_eq!(Decimal::from_i64(1).checked_div(b).unwrap().to_string(), "0.25");
    }

    #[test]
    fn decimal_div_by_zero_is_none() {
        assert!(Decimal::ONE.checked_div(Decimal::ZERO).is_none());
        assert!(Decimal::ONE.checked_rem(Decimal::ZERO).is_none());
    }

    #[test]
    fn decimal_overflow_is_none() {
        let big = Decimal::new(DECIMAL_MANTISSA_BOUND - 1, 0).unwrap();
        assert!(big.checked_mul(big).is_none());
        assert!(big.checked_add(big).is_none());
    }

    #[test]
    fn decimal_ordering() {
        let a = Decimal::new(15, 1).unwrap(); // 1.5
        let b = Decimal::from_i64(2);
        assert!(a < b);
        assert!(b > a);
        assert_eq!(a.cmp(&a), std::cmp::Ordering::Equal);
    }

    #[test]
    fn constant_kinds() {
        assert!(ConstantValue::Bad.is_bad());
        assert!(ConstantValue::Null.is_null());
        assert_eq!(
            ConstantValue::Int32(3).primitive_kind(),
            Some(PrimitiveKind::Int32)
        );
        assert_eq!(ConstantValue::Uint64(7).as_i64(), Some(7));
        assert_eq!(ConstantValue::Int32(-1).as_u64(), None);
    }
}
