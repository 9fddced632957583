//! Conversion classification.
//!
//! The binder never decides on its own whether one type converts to another;
//! it asks a [`ConversionOracle`] and interprets the returned
//! [`ConversionKind`]. [`StandardConversions`] is the standard implementation
//! over the symbol table, covering:
//!
//! 1. Identity
//! 2. Implicit/explicit numeric conversions (fixed promotion table)
//! 3. Implicit constant narrowing (a constant `int` that fits in `byte`)
//! 4. Enumeration conversions
//! 5. Nullable lifting and unwrapping
//! 6. Reference conversions (derived to base, class to interface, array
//!    covariance)
//! 7. Boxing and unboxing
//! 8. `null` / `default` literal conversions
//! 9. Dynamic conversions
//! 10. User-defined implicit conversion operators

use opal_core::{ConstantValue, PrimitiveKind, Ty, TypeModifier, well_known};
use opal_registry::{SymbolTable, TypeKind, operator_names};

use crate::bound::BoundExpr;

/// The classification of one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionKind {
    /// No conversion exists.
    NoConversion,
    /// Exact type match.
    Identity,
    /// Widening numeric conversion.
    ImplicitNumeric,
    /// Narrowing numeric conversion, requires a cast.
    ExplicitNumeric,
    /// A constant expression whose value fits the narrower target.
    ImplicitConstant,
    /// The literal `0` to an enum type.
    ImplicitEnumeration,
    /// Enum to/from numeric, requires a cast.
    ExplicitEnumeration,
    /// `T` to `T?`, or `S` to `T?` when `S` converts implicitly to `T`.
    ImplicitNullable,
    /// `T?` to `T` or other narrowing through nullable.
    ExplicitNullable,
    /// Derived reference to base, class to interface, array covariance.
    ImplicitReference,
    /// Base reference to derived, requires a runtime check.
    ExplicitReference,
    /// Value type to `object` or an implemented interface.
    Boxing,
    /// `object`/interface back to a value type.
    Unboxing,
    /// The untyped `null` literal to a reference or nullable type.
    NullLiteral,
    /// The target-typed `default` literal.
    DefaultLiteral,
    /// To or from `dynamic`.
    ImplicitDynamic,
    /// Via a user-declared `op_Implicit`.
    ImplicitUserDefined,
    /// Via a user-declared `op_Explicit`.
    ExplicitUserDefined,
}

/// A classified conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub kind: ConversionKind,
    /// Whether the conversion can be applied without a cast.
    pub is_implicit: bool,
}

impl Conversion {
    /// The non-conversion.
    pub const NONE: Conversion = Conversion {
        kind: ConversionKind::NoConversion,
        is_implicit: false,
    };

    /// The identity conversion.
    pub const IDENTITY: Conversion = Conversion {
        kind: ConversionKind::Identity,
        is_implicit: true,
    };

    pub const fn implicit(kind: ConversionKind) -> Conversion {
        Conversion {
            kind,
            is_implicit: true,
        }
    }

    pub const fn explicit(kind: ConversionKind) -> Conversion {
        Conversion {
            kind,
            is_implicit: false,
        }
    }

    /// Whether any conversion exists at all.
    pub fn exists(self) -> bool {
        self.kind != ConversionKind::NoConversion
    }

    pub fn is_identity(self) -> bool {
        self.kind == ConversionKind::Identity
    }
}

/// What is being converted: a bare type, or an expression.
///
/// Expressions convert in ways bare types cannot (constant narrowing, the
/// `null` and `default` literals), so applicability checks pass the operand
/// expression when they have one.
#[derive(Debug, Clone, Copy)]
pub enum ConversionSource<'a> {
    Type(Ty),
    Expr(&'a BoundExpr),
}

impl<'a> ConversionSource<'a> {
    /// The static type of the source, if it has one.
    pub fn ty(&self) -> Option<Ty> {
        match self {
            ConversionSource::Type(ty) => Some(*ty),
            ConversionSource::Expr(expr) => expr.ty,
        }
    }

    /// The constant value of the source, if it is a constant expression.
    pub fn constant(&self) -> Option<&'a ConstantValue> {
        match self {
            ConversionSource::Type(_) => None,
            ConversionSource::Expr(expr) => expr.constant.as_ref(),
        }
    }

    fn is_null_literal(&self) -> bool {
        matches!(self.constant(), Some(ConstantValue::Null)) && self.ty().is_none()
    }

    fn is_default_literal(&self) -> bool {
        match self {
            ConversionSource::Expr(expr) => expr.is_default_literal(),
            ConversionSource::Type(_) => false,
        }
    }
}

/// The conversion classification contract consumed by the binder.
pub trait ConversionOracle {
    /// Classify the conversion from `source` to `target`.
    ///
    /// `checked` selects the arithmetic context; it only affects which
    /// user-defined conversion operators are preferred.
    fn classify(&self, source: ConversionSource<'_>, target: Ty, checked: bool) -> Conversion;
}

/// The standard conversion rules over a symbol table.
pub struct StandardConversions<'a> {
    table: &'a SymbolTable,
}

impl<'a> StandardConversions<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        StandardConversions { table }
    }

    fn classify_typed(&self, source: ConversionSource<'_>, from: Ty, to: Ty) -> Conversion {
        if from == to {
            return Conversion::IDENTITY;
        }
        if from.is_error() || to.is_error() {
            return Conversion::NONE;
        }
        if from.is_dynamic() || to.is_dynamic() {
            // `dynamic` converts both ways; static checking is deferred.
            return Conversion::implicit(ConversionKind::ImplicitDynamic);
        }
        if let Some(conv) = self.numeric_conversion(source, from, to) {
            return conv;
        }
        if let Some(conv) = self.enum_conversion(source, from, to) {
            return conv;
        }
        if let Some(conv) = self.nullable_conversion(source, from, to) {
            return conv;
        }
        if let Some(conv) = self.reference_conversion(from, to) {
            return conv;
        }
        if let Some(conv) = self.boxing_conversion(from, to) {
            return conv;
        }
        if let Some(conv) = self.user_defined_conversion(from, to) {
            return conv;
        }
        Conversion::NONE
    }

    fn numeric_conversion(
        &self,
        source: ConversionSource<'_>,
        from: Ty,
        to: Ty,
    ) -> Option<Conversion> {
        let from_kind = from.primitive_kind().filter(|_| !from.is_nullable())?;
        let to_kind = to.primitive_kind().filter(|_| !to.is_nullable())?;
        if !is_numeric_or_char(from_kind) || !is_numeric_or_char(to_kind) {
            return None;
        }
        if implicit_numeric_exists(from_kind, to_kind) {
            return Some(Conversion::implicit(ConversionKind::ImplicitNumeric));
        }
        if let Some(constant) = source.constant() {
            if constant_fits(constant, to_kind) {
                return Some(Conversion::implicit(ConversionKind::ImplicitConstant));
            }
        }
        Some(Conversion::explicit(ConversionKind::ExplicitNumeric))
    }

    fn enum_conversion(
        &self,
        source: ConversionSource<'_>,
        from: Ty,
        to: Ty,
    ) -> Option<Conversion> {
        let from_enum = self.table.enum_underlying(from).is_some();
        let to_enum = self.table.enum_underlying(to).is_some();
        if !from_enum && !to_enum {
            return None;
        }
        // The literal zero converts implicitly to any enum.
        if to_enum && !from_enum {
            if matches!(source.constant(), Some(c) if c.as_i64() == Some(0)) {
                return Some(Conversion::implicit(ConversionKind::ImplicitEnumeration));
            }
        }
        let from_ok = from_enum || from.primitive_kind().map(is_numeric_or_char).unwrap_or(false);
        let to_ok = to_enum || to.primitive_kind().map(is_numeric_or_char).unwrap_or(false);
        if from_ok && to_ok {
            return Some(Conversion::explicit(ConversionKind::ExplicitEnumeration));
        }
        None
    }

    fn nullable_conversion(
        &self,
        source: ConversionSource<'_>,
        from: Ty,
        to: Ty,
    ) -> Option<Conversion> {
        match (from.modifier, to.modifier) {
            // S -> T? exists when S -> T exists; it keeps S -> T's direction.
            (TypeModifier::None, TypeModifier::Nullable) => {
                let inner = self.classify_typed(source, from, to.strip_nullable());
                if inner.exists() {
                    Some(Conversion {
                        kind: if inner.is_implicit {
                            ConversionKind::ImplicitNullable
                        } else {
                            ConversionKind::ExplicitNullable
                        },
                        is_implicit: inner.is_implicit,
                    })
                } else {
                    None
                }
            }
            // S? -> T and S? -> T? unwrap, always explicit toward non-nullable.
            (TypeModifier::Nullable, TypeModifier::None) => {
                let inner =
                    self.classify_typed(ConversionSource::Type(from.strip_nullable()), from.strip_nullable(), to);
                if inner.exists() {
                    Some(Conversion::explicit(ConversionKind::ExplicitNullable))
                } else {
                    None
                }
            }
            (TypeModifier::Nullable, TypeModifier::Nullable) => {
                let inner = self.classify_typed(
                    ConversionSource::Type(from.strip_nullable()),
                    from.strip_nullable(),
                    to.strip_nullable(),
                );
                if inner.exists() {
                    Some(Conversion {
                        kind: if inner.is_implicit {
                            ConversionKind::ImplicitNullable
                        } else {
                            ConversionKind::ExplicitNullable
                        },
                        is_implicit: inner.is_implicit,
                    })
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn reference_conversion(&self, from: Ty, to: Ty) -> Option<Conversion> {
        if !self.table.is_reference_type(from) || !self.table.is_reference_type(to) {
            return None;
        }
        if self.implicit_reference_exists(from, to) {
            return Some(Conversion::implicit(ConversionKind::ImplicitReference));
        }
        if self.implicit_reference_exists(to, from) {
            return Some(Conversion::explicit(ConversionKind::ExplicitReference));
        }
        // Unrelated interfaces can always be cross-cast at runtime.
        let from_interface = matches!(
            self.table.type_def(from.hash).map(|d| &d.kind),
            Some(TypeKind::Interface)
        );
        let to_interface = matches!(
            self.table.type_def(to.hash).map(|d| &d.kind),
            Some(TypeKind::Interface)
        );
        if from_interface || to_interface {
            return Some(Conversion::explicit(ConversionKind::ExplicitReference));
        }
        None
    }

    fn implicit_reference_exists(&self, from: Ty, to: Ty) -> bool {
        if to.hash == well_known::OBJECT {
            return true;
        }
        if self.table.base_chain(from.hash).contains(&to.hash) {
            return true;
        }
        if self.implements(from.hash, to.hash) {
            return true;
        }
        // Array covariance: S[] -> T[] when S -> T is an implicit reference
        // conversion.
        if let (Some(TypeKind::Array { element: s }), Some(TypeKind::Array { element: t })) = (
            self.table.type_def(from.hash).map(|d| d.kind.clone()),
            self.table.type_def(to.hash).map(|d| d.kind.clone()),
        ) {
            let s_ty = Ty::simple(s);
            let t_ty = Ty::simple(t);
            if self.table.is_reference_type(s_ty) && self.table.is_reference_type(t_ty) {
                return self.implicit_reference_exists(s_ty, t_ty);
            }
        }
        false
    }

    fn implements(&self, ty: opal_core::TypeHash, interface: opal_core::TypeHash) -> bool {
        for hash in self.table.base_chain(ty) {
            if let Some(def) = self.table.type_def(hash) {
                if def.implements.contains(&interface) {
                    return true;
                }
            }
        }
        false
    }

    fn boxing_conversion(&self, from: Ty, to: Ty) -> Option<Conversion> {
        let from_value = self.table.is_value_type(from) && !from.is_pointer();
        let to_value = self.table.is_value_type(to) && !to.is_pointer();
        if from_value && self.table.is_reference_type(to) {
            if self.table.is_ref_struct(from) {
                return None;
            }
            if to.hash == well_known::OBJECT
                || self.implements(from.hash, to.hash)
            {
                return Some(Conversion::implicit(ConversionKind::Boxing));
            }
            return None;
        }
        if self.table.is_reference_type(from) && to_value {
            if from.hash == well_known::OBJECT || self.implements(to.hash, from.hash) {
                return Some(Conversion::explicit(ConversionKind::Unboxing));
            }
        }
        None
    }

    fn user_defined_conversion(&self, from: Ty, to: Ty) -> Option<Conversion> {
        for owner in [from.hash, to.hash] {
            for op in self
                .table
                .operators_named(owner, operator_names::IMPLICIT_CONVERSION)
            {
                let Some(param) = op.params.first().copied() else {
                    continue;
                };
                if param == from && op.return_type == to {
                    return Some(Conversion::implicit(ConversionKind::ImplicitUserDefined));
                }
            }
            for op in self
                .table
                .operators_named(owner, operator_names::EXPLICIT_CONVERSION)
            {
                let Some(param) = op.params.first().copied() else {
                    continue;
                };
                if param == from && op.return_type == to {
                    return Some(Conversion::explicit(ConversionKind::ExplicitUserDefined));
                }
            }
        }
        None
    }
}

impl<'a> ConversionOracle for StandardConversions<'a> {
    fn classify(&self, source: ConversionSource<'_>, target: Ty, _checked: bool) -> Conversion {
        if source.is_null_literal() {
            return if target.is_nullable()
                || self.table.is_reference_type(target)
                || target.is_pointer()
            {
                Conversion::implicit(ConversionKind::NullLiteral)
            } else {
                Conversion::NONE
            };
        }
        if source.is_default_literal() {
            return Conversion::implicit(ConversionKind::DefaultLiteral);
        }
        let Some(from) = source.ty() else {
            return Conversion::NONE;
        };
        self.classify_typed(source, from, target)
    }
}

/// Whether the kind participates in numeric conversions (`char` widens like
/// `ushort` but nothing widens to `char`).
fn is_numeric_or_char(kind: PrimitiveKind) -> bool {
    kind.is_numeric() || kind == PrimitiveKind::Char
}

/// The fixed implicit numeric conversion table.
pub fn implicit_numeric_exists(from: PrimitiveKind, to: PrimitiveKind) -> bool {
    use PrimitiveKind::*;
    if from == to {
        return false;
    }
    match from {
        Int8 => matches!(to, Int16 | Int32 | Int64 | NInt | Float32 | Float64 | Decimal),
        Uint8 => matches!(
            to,
            Int16 | Uint16 | Int32 | Uint32 | Int64 | Uint64 | NInt | NUint | Float32 | Float64
                | Decimal
        ),
        Int16 => matches!(to, Int32 | Int64 | NInt | Float32 | Float64 | Decimal),
        Uint16 | Char => matches!(
            to,
            Int32 | Uint32 | Int64 | Uint64 | NInt | NUint | Float32 | Float64 | Decimal
        ),
        Int32 => matches!(to, Int64 | NInt | Float32 | Float64 | Decimal),
        Uint32 => matches!(to, Int64 | Uint64 | NUint | Float32 | Float64 | Decimal),
        Int64 => matches!(to, Float32 | Float64 | Decimal),
        Uint64 => matches!(to, Float32 | Float64 | Decimal),
        NInt => matches!(to, Int64 | Float32 | Float64 | Decimal),
        NUint => matches!(to, Uint64 | Float32 | Float64 | Decimal),
        Float32 => matches!(to, Float64),
        _ => false,
    }
}

/// Whether a constant value fits the narrower integral target.
fn constant_fits(constant: &ConstantValue, to: PrimitiveKind) -> bool {
    use PrimitiveKind::*;
    // Only int/uint/long constants participate in implicit constant narrowing.
    let value = match constant {
        ConstantValue::Int32(v) => *v as i128,
        ConstantValue::Int64(v) => {
            // long constants narrow only to ulong, and only when non-negative.
            return to == Uint64 && *v >= 0;
        }
        ConstantValue::Uint32(v) => *v as i128,
        _ => return false,
    };
    let (min, max): (i128, i128) = match to {
        Int8 => (i8::MIN as i128, i8::MAX as i128),
        Uint8 => (0, u8::MAX as i128),
        Int16 => (i16::MIN as i128, i16::MAX as i128),
        Uint16 => (0, u16::MAX as i128),
        Uint32 => (0, u32::MAX as i128),
        Uint64 | NUint => (0, u64::MAX as i128),
        NInt => (i64::MIN as i128, i64::MAX as i128),
        _ => return false,
    };
    value >= min && value <= max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::BoundExpr;
    use opal_core::Span;

    fn oracle_table() -> SymbolTable {
        SymbolTable::with_primitives()
    }

    fn classify(table: &SymbolTable, from: Ty, to: Ty) -> Conversion {
        StandardConversions::new(table).classify(ConversionSource::Type(from), to, false)
    }

    #[test]
    fn identity_and_widening() {
        let table = oracle_table();
        let int32 = Ty::simple(well_known::INT32);
        let int64 = Ty::simple(well_known::INT64);
        assert!(classify(&table, int32, int32).is_identity());
        assert_eq!(
            classify(&table, int32, int64).kind,
            ConversionKind::ImplicitNumeric
        );
        assert_eq!(
            classify(&table, int64, int32).kind,
            ConversionKind::ExplicitNumeric
        );
    }

    #[test]
    fn constant_narrowing() {
        let table = oracle_table();
        let oracle = StandardConversions::new(&table);
        let small = BoundExpr::constant_literal(
            ConstantValue::Int32(7),
            Ty::simple(well_known::INT32),
            Span::point(1, 1),
        );
        let conv = oracle.classify(
            ConversionSource::Expr(&small),
            Ty::simple(well_known::UINT8),
            false,
        );
        assert_eq!(conv.kind, ConversionKind::ImplicitConstant);

        let big = BoundExpr::constant_literal(
            ConstantValue::Int32(300),
            Ty::simple(well_known::INT32),
            Span::point(1, 1),
        );
        let conv = oracle.classify(
            ConversionSource::Expr(&big),
            Ty::simple(well_known::UINT8),
            false,
        );
        assert_eq!(conv.kind, ConversionKind::ExplicitNumeric);
        assert!(!conv.is_implicit);
    }

    #[test]
    fn null_literal_targets() {
        let table = oracle_table();
        let oracle = StandardConversions::new(&table);
        let null = BoundExpr::null_literal(Span::point(1, 1));
        let to_string = oracle.classify(
            ConversionSource::Expr(&null),
            Ty::simple(well_known::STRING),
            false,
        );
        assert_eq!(to_string.kind, ConversionKind::NullLiteral);
        let to_nullable = oracle.classify(
            ConversionSource::Expr(&null),
            Ty::nullable(well_known::INT32),
            false,
        );
        assert_eq!(to_nullable.kind, ConversionKind::NullLiteral);
        let to_int = oracle.classify(
            ConversionSource::Expr(&null),
            Ty::simple(well_known::INT32),
            false,
        );
        assert!(!to_int.exists());
    }

    #[test]
    fn nullable_lifting() {
        let table = oracle_table();
        let int32 = Ty::simple(well_known::INT32);
        let lifted = Ty::nullable(well_known::INT32);
        let lift = classify(&table, int32, lifted);
        assert_eq!(lift.kind, ConversionKind::ImplicitNullable);
        let unwrap = classify(&table, lifted, int32);
        assert_eq!(unwrap.kind, ConversionKind::ExplicitNullable);
        assert!(!unwrap.is_implicit);
    }

    #[test]
    fn boxing_to_object() {
        let table = oracle_table();
        let conv = classify(
            &table,
            Ty::simple(well_known::INT32),
            Ty::simple(well_known::OBJECT),
        );
        assert_eq!(conv.kind, ConversionKind::Boxing);
        let back = classify(
            &table,
            Ty::simple(well_known::OBJECT),
            Ty::simple(well_known::INT32),
        );
        assert_eq!(back.kind, ConversionKind::Unboxing);
        assert!(!back.is_implicit);
    }

    #[test]
    fn dynamic_converts_both_ways() {
        let table = oracle_table();
        let dynamic = Ty::simple(well_known::DYNAMIC);
        let int32 = Ty::simple(well_known::INT32);
        assert_eq!(
            classify(&table, int32, dynamic).kind,
            ConversionKind::ImplicitDynamic
        );
        assert_eq!(
            classify(&table, dynamic, int32).kind,
            ConversionKind::ImplicitDynamic
        );
    }
}
