//! Operator kinds and built-in operator signature tables.
//!
//! A bound operator kind is a bit-packed value: the operand-type category in
//! the low byte, the operator in the second byte, and `LIFTED`/`CHECKED`
//! modifier bits above. The constant folder dispatches on the category and
//! operator; the modifier bits select wrapping vs trapping arithmetic and
//! nullable lifting.

use opal_core::{PrimitiveKind, Ty, TypeHash};
use opal_registry::OperatorDef;
use opal_syntax::{BinaryOp, UnaryOp};

bitflags::bitflags! {
    /// Bit-packed binary operator kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BinaryOperatorKind: u32 {
        // --- operand-type category (low byte, exactly one) ---
        const INT        = 1;
        const UINT       = 2;
        const LONG       = 3;
        const ULONG      = 4;
        const NINT       = 5;
        const NUINT      = 6;
        const FLOAT      = 7;
        const DOUBLE     = 8;
        const DECIMAL    = 9;
        const BOOL       = 10;
        const STRING     = 11;
        const OBJECT     = 12;
        const ENUM       = 13;
        /// `E op U` where `U` is the enum's underlying type.
        const ENUM_AND_UNDERLYING = 14;
        /// `U op E`.
        const UNDERLYING_AND_ENUM = 15;
        const USER_DEFINED = 16;
        const DYNAMIC    = 17;
        const TYPE_MASK  = 0xff;

        // --- operator (second byte, exactly one) ---
        const ADDITION        = 1 << 8;
        const SUBTRACTION     = 2 << 8;
        const MULTIPLICATION  = 3 << 8;
        const DIVISION        = 4 << 8;
        const REMAINDER       = 5 << 8;
        const LEFT_SHIFT      = 6 << 8;
        const RIGHT_SHIFT     = 7 << 8;
        const UNSIGNED_RIGHT_SHIFT = 8 << 8;
        const AND             = 9 << 8;
        const OR              = 10 << 8;
        const XOR             = 11 << 8;
        const EQUAL           = 12 << 8;
        const NOT_EQUAL       = 13 << 8;
        const LESS_THAN       = 14 << 8;
        const LESS_THAN_OR_EQUAL = 15 << 8;
        const GREATER_THAN    = 16 << 8;
        const GREATER_THAN_OR_EQUAL = 17 << 8;
        const OP_MASK         = 0xff00;

        // --- modifiers ---
        const LIFTED  = 1 << 16;
        const CHECKED = 1 << 17;
        /// Short-circuit form of `AND`/`OR`.
        const LOGICAL = 1 << 18;
    }
}

impl BinaryOperatorKind {
    /// The operator bits for a syntax operator (`??` has no operator kind).
    pub fn operator_of(op: BinaryOp) -> BinaryOperatorKind {
        match op {
            BinaryOp::Add => BinaryOperatorKind::ADDITION,
            BinaryOp::Sub => BinaryOperatorKind::SUBTRACTION,
            BinaryOp::Mul => BinaryOperatorKind::MULTIPLICATION,
            BinaryOp::Div => BinaryOperatorKind::DIVISION,
            BinaryOp::Rem => BinaryOperatorKind::REMAINDER,
            BinaryOp::Shl => BinaryOperatorKind::LEFT_SHIFT,
            BinaryOp::Shr => BinaryOperatorKind::RIGHT_SHIFT,
            BinaryOp::Ushr => BinaryOperatorKind::UNSIGNED_RIGHT_SHIFT,
            BinaryOp::BitAnd => BinaryOperatorKind::AND,
            BinaryOp::BitOr => BinaryOperatorKind::OR,
            BinaryOp::BitXor => BinaryOperatorKind::XOR,
            BinaryOp::Eq => BinaryOperatorKind::EQUAL,
            BinaryOp::Ne => BinaryOperatorKind::NOT_EQUAL,
            BinaryOp::Lt => BinaryOperatorKind::LESS_THAN,
            BinaryOp::Le => BinaryOperatorKind::LESS_THAN_OR_EQUAL,
            BinaryOp::Gt => BinaryOperatorKind::GREATER_THAN,
            BinaryOp::Ge => BinaryOperatorKind::GREATER_THAN_OR_EQUAL,
            BinaryOp::LogicalAnd => {
                BinaryOperatorKind::AND | BinaryOperatorKind::LOGICAL
            }
            BinaryOp::LogicalOr => BinaryOperatorKind::OR | BinaryOperatorKind::LOGICAL,
            BinaryOp::Coalesce => BinaryOperatorKind::empty(),
        }
    }

    /// The operand-type category bits.
    pub fn category(self) -> BinaryOperatorKind {
        self & BinaryOperatorKind::TYPE_MASK
    }

    /// The operator bits.
    pub fn operator(self) -> BinaryOperatorKind {
        self & BinaryOperatorKind::OP_MASK
    }

    pub fn is_lifted(self) -> bool {
        self.contains(BinaryOperatorKind::LIFTED)
    }

    pub fn is_checked(self) -> bool {
        self.contains(BinaryOperatorKind::CHECKED)
    }

    /// The category for a primitive kind.
    pub fn category_of(kind: PrimitiveKind) -> Option<BinaryOperatorKind> {
        Some(match kind {
            PrimitiveKind::Int32 => BinaryOperatorKind::INT,
            PrimitiveKind::Uint32 => BinaryOperatorKind::UINT,
            PrimitiveKind::Int64 => BinaryOperatorKind::LONG,
            PrimitiveKind::Uint64 => BinaryOperatorKind::ULONG,
            PrimitiveKind::NInt => BinaryOperatorKind::NINT,
            PrimitiveKind::NUint => BinaryOperatorKind::NUINT,
            PrimitiveKind::Float32 => BinaryOperatorKind::FLOAT,
            PrimitiveKind::Float64 => BinaryOperatorKind::DOUBLE,
            PrimitiveKind::Decimal => BinaryOperatorKind::DECIMAL,
            PrimitiveKind::Bool => BinaryOperatorKind::BOOL,
            PrimitiveKind::String => BinaryOperatorKind::STRING,
            PrimitiveKind::Object => BinaryOperatorKind::OBJECT,
            _ => return None,
        })
    }
}

bitflags::bitflags! {
    /// Bit-packed unary operator kind, same layout as the binary kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct UnaryOperatorKind: u32 {
        const INT        = 1;
        const UINT       = 2;
        const LONG       = 3;
        const ULONG      = 4;
        const NINT       = 5;
        const NUINT      = 6;
        const FLOAT      = 7;
        const DOUBLE     = 8;
        const DECIMAL    = 9;
        const BOOL       = 10;
        const ENUM       = 11;
        const USER_DEFINED = 12;
        const DYNAMIC    = 13;
        const TYPE_MASK  = 0xff;

        const UNARY_PLUS      = 1 << 8;
        const UNARY_MINUS     = 2 << 8;
        const LOGICAL_NEGATION = 3 << 8;
        const BITWISE_COMPLEMENT = 4 << 8;
        const OP_MASK         = 0xff00;

        const LIFTED  = 1 << 16;
        const CHECKED = 1 << 17;
    }
}

impl UnaryOperatorKind {
    pub fn operator_of(op: UnaryOp) -> UnaryOperatorKind {
        match op {
            UnaryOp::Plus => UnaryOperatorKind::UNARY_PLUS,
            UnaryOp::Neg => UnaryOperatorKind::UNARY_MINUS,
            UnaryOp::Not => UnaryOperatorKind::LOGICAL_NEGATION,
            UnaryOp::Complement => UnaryOperatorKind::BITWISE_COMPLEMENT,
        }
    }

    pub fn category(self) -> UnaryOperatorKind {
        self & UnaryOperatorKind::TYPE_MASK
    }

    pub fn operator(self) -> UnaryOperatorKind {
        self & UnaryOperatorKind::OP_MASK
    }

    pub fn is_lifted(self) -> bool {
        self.contains(UnaryOperatorKind::LIFTED)
    }

    pub fn is_checked(self) -> bool {
        self.contains(UnaryOperatorKind::CHECKED)
    }

    pub fn category_of(kind: PrimitiveKind) -> Option<UnaryOperatorKind> {
        Some(match kind {
            PrimitiveKind::Int32 => UnaryOperatorKind::INT,
            PrimitiveKind::Uint32 => UnaryOperatorKind::UINT,
            PrimitiveKind::Int64 => UnaryOperatorKind::LONG,
            PrimitiveKind::Uint64 => UnaryOperatorKind::ULONG,
            PrimitiveKind::NInt => UnaryOperatorKind::NINT,
            PrimitiveKind::NUint => UnaryOperatorKind::NUINT,
            PrimitiveKind::Float32 => UnaryOperatorKind::FLOAT,
            PrimitiveKind::Float64 => UnaryOperatorKind::DOUBLE,
            PrimitiveKind::Decimal => UnaryOperatorKind::DECIMAL,
            PrimitiveKind::Bool => UnaryOperatorKind::BOOL,
            _ => return None,
        })
    }
}

/// One binary operator candidate signature.
///
/// Exactly one of built-in/user-defined: `method` is `Some` iff the signature
/// comes from a user declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct BinarySignature {
    pub kind: BinaryOperatorKind,
    pub left: Ty,
    pub right: Ty,
    pub result: Ty,
    pub method: Option<OperatorDef>,
}

/// One unary operator candidate signature.
#[derive(Debug, Clone, PartialEq)]
pub struct UnarySignature {
    pub kind: UnaryOperatorKind,
    pub operand: Ty,
    pub result: Ty,
    pub method: Option<OperatorDef>,
}

impl BinarySignature {
    fn builtin(kind: BinaryOperatorKind, left: Ty, right: Ty, result: Ty) -> BinarySignature {
        BinarySignature {
            kind,
            left,
            right,
            result,
            method: None,
        }
    }

    /// The lifted twin of a value-type signature. Comparison results stay
    /// plain `bool`.
    pub fn lifted(&self) -> BinarySignature {
        let result = if self.result.is_primitive(PrimitiveKind::Bool) {
            self.result
        } else {
            Ty::nullable(self.result.hash)
        };
        BinarySignature {
            kind: self.kind | BinaryOperatorKind::LIFTED,
            left: Ty::nullable(self.left.hash),
            right: Ty::nullable(self.right.hash),
            result,
            method: self.method.clone(),
        }
    }
}

impl UnarySignature {
    fn builtin(kind: UnaryOperatorKind, operand: Ty, result: Ty) -> UnarySignature {
        UnarySignature {
            kind,
            operand,
            result,
            method: None,
        }
    }

    pub fn lifted(&self) -> UnarySignature {
        UnarySignature {
            kind: self.kind | UnaryOperatorKind::LIFTED,
            operand: Ty::nullable(self.operand.hash),
            result: Ty::nullable(self.result.hash),
            method: self.method.clone(),
        }
    }
}

const ARITHMETIC_KINDS: [PrimitiveKind; 9] = [
    PrimitiveKind::Int32,
    PrimitiveKind::Uint32,
    PrimitiveKind::Int64,
    PrimitiveKind::Uint64,
    PrimitiveKind::NInt,
    PrimitiveKind::NUint,
    PrimitiveKind::Float32,
    PrimitiveKind::Float64,
    PrimitiveKind::Decimal,
];

const INTEGRAL_KINDS: [PrimitiveKind; 6] = [
    PrimitiveKind::Int32,
    PrimitiveKind::Uint32,
    PrimitiveKind::Int64,
    PrimitiveKind::Uint64,
    PrimitiveKind::NInt,
    PrimitiveKind::NUint,
];

/// Description of the operands a provider builds signatures against.
#[derive(Debug, Clone, Copy)]
pub struct OperandShape {
    /// Static type, `None` for untyped operands.
    pub ty: Option<Ty>,
    /// The operand's enum base type (strip-nullable), when it is an enum.
    pub enum_type: Option<(TypeHash, PrimitiveKind)>,
    pub is_reference: bool,
    pub is_nullable: bool,
    pub is_null_literal: bool,
}

/// The fixed built-in signature table for one binary operator, specialized
/// to the operand shapes (enum and reference forms are synthesized from the
/// operand types; lifted forms are added when an operand is nullable).
pub fn builtin_binary_signatures(
    op: BinaryOp,
    checked: bool,
    left: OperandShape,
    right: OperandShape,
) -> Vec<BinarySignature> {
    let operator = BinaryOperatorKind::operator_of(op);
    let checked_bit = if checked && matches!(
        op,
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
    ) {
        BinaryOperatorKind::CHECKED
    } else {
        BinaryOperatorKind::empty()
    };
    let mut sigs = Vec::new();
    let bool_ty = Ty::primitive(PrimitiveKind::Bool);

    let numeric = |kinds: &[PrimitiveKind], result_is_bool: bool, sigs: &mut Vec<BinarySignature>| {
        for &kind in kinds {
            let Some(category) = BinaryOperatorKind::category_of(kind) else {
                continue;
            };
            let ty = Ty::primitive(kind);
            let result = if result_is_bool { bool_ty } else { ty };
            sigs.push(BinarySignature::builtin(
                operator | category | checked_bit,
                ty,
                ty,
                result,
            ));
        }
    };

    match op {
        BinaryOp::Add => {
            numeric(&ARITHMETIC_KINDS, false, &mut sigs);
            let string = Ty::primitive(PrimitiveKind::String);
            let object = Ty::primitive(PrimitiveKind::Object);
            sigs.push(BinarySignature::builtin(
                operator | BinaryOperatorKind::STRING,
                string,
                string,
                string,
            ));
            sigs.push(BinarySignature::builtin(
                operator | BinaryOperatorKind::STRING,
                string,
                object,
                string,
            ));
            sigs.push(BinarySignature::builtin(
                operator | BinaryOperatorKind::STRING,
                object,
                string,
                string,
            ));
            push_enum_addition(operator, left, right, &mut sigs);
        }
        BinaryOp::Sub => {
            numeric(&ARITHMETIC_KINDS, false, &mut sigs);
            push_enum_subtraction(operator, left, right, &mut sigs);
        }
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            numeric(&ARITHMETIC_KINDS, false, &mut sigs);
        }
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::Ushr => {
            let int = Ty::primitive(PrimitiveKind::Int32);
            for kind in INTEGRAL_KINDS {
                let Some(category) = BinaryOperatorKind::category_of(kind) else {
                    continue;
                };
                let ty = Ty::primitive(kind);
                sigs.push(BinarySignature::builtin(operator | category, ty, int, ty));
            }
        }
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
            numeric(&INTEGRAL_KINDS, false, &mut sigs);
            sigs.push(BinarySignature::builtin(
                operator | BinaryOperatorKind::BOOL,
                bool_ty,
                bool_ty,
                bool_ty,
            ));
            push_enum_bitwise(operator, left, right, &mut sigs);
        }
        BinaryOp::Eq | BinaryOp::Ne => {
            numeric(&ARITHMETIC_KINDS, true, &mut sigs);
            sigs.push(BinarySignature::builtin(
                operator | BinaryOperatorKind::BOOL,
                bool_ty,
                bool_ty,
                bool_ty,
            ));
            let string = Ty::primitive(PrimitiveKind::String);
            sigs.push(BinarySignature::builtin(
                operator | BinaryOperatorKind::STRING,
                string,
                string,
                bool_ty,
            ));
            // Reference equality only applies between reference operands.
            if (left.is_reference || left.is_null_literal)
                && (right.is_reference || right.is_null_literal)
            {
                let object = Ty::primitive(PrimitiveKind::Object);
                sigs.push(BinarySignature::builtin(
                    operator | BinaryOperatorKind::OBJECT,
                    object,
                    object,
                    bool_ty,
                ));
            }
            push_enum_comparison(operator, left, right, &mut sigs);
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            numeric(&ARITHMETIC_KINDS, true, &mut sigs);
            push_enum_comparison(operator, left, right, &mut sigs);
        }
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
            sigs.push(BinarySignature::builtin(
                operator | BinaryOperatorKind::BOOL,
                bool_ty,
                bool_ty,
                bool_ty,
            ));
        }
        BinaryOp::Coalesce => {}
    }

    if left.is_nullable || right.is_nullable || left.is_null_literal || right.is_null_literal {
        let lifted: Vec<BinarySignature> = sigs
            .iter()
            .filter(|sig| liftable_binary(sig))
            .map(BinarySignature::lifted)
            .collect();
        sigs.extend(lifted);
    }
    sigs
}

fn liftable_binary(sig: &BinarySignature) -> bool {
    // String/object forms involve reference types and never lift.
    let category = sig.kind.category();
    category != BinaryOperatorKind::STRING
        && category != BinaryOperatorKind::OBJECT
        && !sig.left.is_nullable()
}

fn enum_shapes(left: OperandShape, right: OperandShape) -> Vec<(TypeHash, PrimitiveKind)> {
    let mut out = Vec::new();
    for shape in [left, right] {
        if let Some(e) = shape.enum_type {
            if !out.contains(&e) {
                out.push(e);
            }
        }
    }
    out
}

fn push_enum_addition(
    operator: BinaryOperatorKind,
    left: OperandShape,
    right: OperandShape,
    sigs: &mut Vec<BinarySignature>,
) {
    for (hash, underlying) in enum_shapes(left, right) {
        let e = Ty::simple(hash);
        let u = Ty::primitive(underlying);
        sigs.push(BinarySignature::builtin(
            operator | BinaryOperatorKind::ENUM_AND_UNDERLYING,
            e,
            u,
            e,
        ));
        sigs.push(BinarySignature::builtin(
            operator | BinaryOperatorKind::UNDERLYING_AND_ENUM,
            u,
            e,
            e,
        ));
    }
}

fn push_enum_subtraction(
    operator: BinaryOperatorKind,
    left: OperandShape,
    right: OperandShape,
    sigs: &mut Vec<BinarySignature>,
) {
    for (hash, underlying) in enum_shapes(left, right) {
        let e = Ty::simple(hash);
        let u = Ty::primitive(underlying);
        sigs.push(BinarySignature::builtin(
            operator | BinaryOperatorKind::ENUM,
            e,
            e,
            u,
        ));
        sigs.push(BinarySignature::builtin(
            operator | BinaryOperatorKind::ENUM_AND_UNDERLYING,
            e,
            u,
            e,
        ));
    }
}

fn push_enum_bitwise(
    operator: BinaryOperatorKind,
    left: OperandShape,
    right: OperandShape,
    sigs: &mut Vec<BinarySignature>,
) {
    for (hash, _) in enum_shapes(left, right) {
        let e = Ty::simple(hash);
        sigs.push(BinarySignature::builtin(
            operator | BinaryOperatorKind::ENUM,
            e,
            e,
            e,
        ));
    }
}

fn push_enum_comparison(
    operator: BinaryOperatorKind,
    left: OperandShape,
    right: OperandShape,
    sigs: &mut Vec<BinarySignature>,
) {
    let bool_ty = Ty::primitive(PrimitiveKind::Bool);
    for (hash, _) in enum_shapes(left, right) {
        let e = Ty::simple(hash);
        sigs.push(BinarySignature::builtin(
            operator | BinaryOperatorKind::ENUM,
            e,
            e,
            bool_ty,
        ));
    }
}

/// The fixed built-in signature table for one unary operator.
pub fn builtin_unary_signatures(
    op: UnaryOp,
    checked: bool,
    operand: OperandShape,
) -> Vec<UnarySignature> {
    let operator = UnaryOperatorKind::operator_of(op);
    let checked_bit = if checked && op == UnaryOp::Neg {
        UnaryOperatorKind::CHECKED
    } else {
        UnaryOperatorKind::empty()
    };
    let mut sigs = Vec::new();

    let numeric = |kinds: &[PrimitiveKind], sigs: &mut Vec<UnarySignature>| {
        for &kind in kinds {
            let Some(category) = UnaryOperatorKind::category_of(kind) else {
                continue;
            };
            let ty = Ty::primitive(kind);
            sigs.push(UnarySignature::builtin(
                operator | category | checked_bit,
                ty,
                ty,
            ));
        }
    };

    match op {
        UnaryOp::Plus => numeric(&ARITHMETIC_KINDS, &mut sigs),
        UnaryOp::Neg => {
            // No unary minus over ulong or nuint: there is no signed cover.
            numeric(
                &[
                    PrimitiveKind::Int32,
                    PrimitiveKind::Int64,
                    PrimitiveKind::NInt,
                    PrimitiveKind::Float32,
                    PrimitiveKind::Float64,
                    PrimitiveKind::Decimal,
                ],
                &mut sigs,
            );
        }
        UnaryOp::Not => {
            let bool_ty = Ty::primitive(PrimitiveKind::Bool);
            sigs.push(UnarySignature::builtin(
                operator | UnaryOperatorKind::BOOL,
                bool_ty,
                bool_ty,
            ));
        }
        UnaryOp::Complement => {
            numeric(&INTEGRAL_KINDS, &mut sigs);
            if let Some((hash, _)) = operand.enum_type {
                let e = Ty::simple(hash);
                sigs.push(UnarySignature::builtin(
                    operator | UnaryOperatorKind::ENUM,
                    e,
                    e,
                ));
            }
        }
    }

    if operand.is_nullable {
        let lifted: Vec<UnarySignature> = sigs.iter().map(UnarySignature::lifted).collect();
        sigs.extend(lifted);
    }
    sigs
}

/// Derive an [`OperandShape`] from an operand's static type.
pub fn operand_shape(
    table: &opal_registry::SymbolTable,
    ty: Option<Ty>,
    is_null_literal: bool,
) -> OperandShape {
    let enum_type = ty.and_then(|t| {
        let stripped = t.strip_nullable();
        table
            .enum_underlying(stripped)
            .map(|underlying| (stripped.hash, underlying))
    });
    OperandShape {
        ty,
        enum_type,
        is_reference: ty.map(|t| table.is_reference_type(t)).unwrap_or(false),
        is_nullable: ty.map(Ty::is_nullable).unwrap_or(false),
        is_null_literal,
    }
}
