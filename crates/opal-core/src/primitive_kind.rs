//! Primitive type kinds for the built-in numeric, boolean and text types.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::type_hash::{TypeHash, well_known};

/// Primitive type kinds.
///
/// These are the built-in types the predefined operator tables are defined
/// over. The discriminant is stable (`num_enum`) so the tables can index by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum PrimitiveKind {
    Void,
    Bool,
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    NInt,
    NUint,
    Float32,
    Float64,
    Decimal,
    String,
    Object,
    Dynamic,
}

impl PrimitiveKind {
    /// Get the well-known `TypeHash` for this primitive type.
    pub const fn type_hash(self) -> TypeHash {
        match self {
            PrimitiveKind::Void => well_known::VOID,
            PrimitiveKind::Bool => well_known::BOOL,
            PrimitiveKind::Char => well_known::CHAR,
            PrimitiveKind::Int8 => well_known::INT8,
            PrimitiveKind::Int16 => well_known::INT16,
            PrimitiveKind::Int32 => well_known::INT32,
            PrimitiveKind::Int64 => well_known::INT64,
            PrimitiveKind::Uint8 => well_known::UINT8,
            PrimitiveKind::Uint16 => well_known::UINT16,
            PrimitiveKind::Uint32 => well_known::UINT32,
            PrimitiveKind::Uint64 => well_known::UINT64,
            PrimitiveKind::NInt => well_known::NINT,
            PrimitiveKind::NUint => well_known::NUINT,
            PrimitiveKind::Float32 => well_known::FLOAT32,
            PrimitiveKind::Float64 => well_known::FLOAT64,
            PrimitiveKind::Decimal => well_known::DECIMAL,
            PrimitiveKind::String => well_known::STRING,
            PrimitiveKind::Object => well_known::OBJECT,
            PrimitiveKind::Dynamic => well_known::DYNAMIC,
        }
    }

    /// Reverse lookup from a well-known hash.
    pub fn from_type_hash(hash: TypeHash) -> Option<Self> {
        const ALL: [PrimitiveKind; 19] = [
            PrimitiveKind::Void,
            PrimitiveKind::Bool,
            PrimitiveKind::Char,
            PrimitiveKind::Int8,
            PrimitiveKind::Int16,
            PrimitiveKind::Int32,
            PrimitiveKind::Int64,
            PrimitiveKind::Uint8,
            PrimitiveKind::Uint16,
            PrimitiveKind::Uint32,
            PrimitiveKind::Uint64,
            PrimitiveKind::NInt,
            PrimitiveKind::NUint,
            PrimitiveKind::Float32,
            PrimitiveKind::Float64,
            PrimitiveKind::Decimal,
            PrimitiveKind::String,
            PrimitiveKind::Object,
            PrimitiveKind::Dynamic,
        ];
        ALL.into_iter().find(|k| k.type_hash() == hash)
    }

    /// Get the source-level name of this primitive type.
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int8 => "sbyte",
            PrimitiveKind::Int16 => "short",
            PrimitiveKind::Int32 => "int",
            PrimitiveKind::Int64 => "long",
            PrimitiveKind::Uint8 => "byte",
            PrimitiveKind::Uint16 => "ushort",
            PrimitiveKind::Uint32 => "uint",
            PrimitiveKind::Uint64 => "ulong",
            PrimitiveKind::NInt => "nint",
            PrimitiveKind::NUint => "nuint",
            PrimitiveKind::Float32 => "float",
            PrimitiveKind::Float64 => "double",
            PrimitiveKind::Decimal => "decimal",
            PrimitiveKind::String => "string",
            PrimitiveKind::Object => "object",
            PrimitiveKind::Dynamic => "dynamic",
        }
    }

    /// Whether this is one of the numeric types (integral, floating or decimal).
    pub const fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating() || matches!(self, PrimitiveKind::Decimal)
    }

    /// Whether this is an integral type (including native-sized and `char`).
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Char
                | PrimitiveKind::Int8
                | PrimitiveKind::Int16
                | PrimitiveKind::Int32
                | PrimitiveKind::Int64
                | PrimitiveKind::Uint8
                | PrimitiveKind::Uint16
                | PrimitiveKind::Uint32
                | PrimitiveKind::Uint64
                | PrimitiveKind::NInt
                | PrimitiveKind::NUint
        )
    }

    /// Whether this is a signed integral type.
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Int8
                | PrimitiveKind::Int16
                | PrimitiveKind::Int32
                | PrimitiveKind::Int64
                | PrimitiveKind::NInt
        )
    }

    /// Whether this is an unsigned integral type (`char` counts: it has no sign).
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Char
                | PrimitiveKind::Uint8
                | PrimitiveKind::Uint16
                | PrimitiveKind::Uint32
                | PrimitiveKind::Uint64
                | PrimitiveKind::NUint
        )
    }

    /// Whether this is `float` or `double`.
    pub const fn is_floating(self) -> bool {
        matches!(self, PrimitiveKind::Float32 | PrimitiveKind::Float64)
    }

    /// Bit width of the type, for integral and floating types.
    ///
    /// Native-sized integers report their widest possible representation (64).
    pub const fn bit_width(self) -> u32 {
        match self {
            PrimitiveKind::Bool | PrimitiveKind::Int8 | PrimitiveKind::Uint8 => 8,
            PrimitiveKind::Char | PrimitiveKind::Int16 | PrimitiveKind::Uint16 => 16,
            PrimitiveKind::Int32 | PrimitiveKind::Uint32 | PrimitiveKind::Float32 => 32,
            PrimitiveKind::Int64
            | PrimitiveKind::Uint64
            | PrimitiveKind::NInt
            | PrimitiveKind::NUint
            | PrimitiveKind::Float64 => 64,
            PrimitiveKind::Decimal => 128,
            _ => 0,
        }
    }

    /// Position in the implicit numeric promotion order, used by the
    /// better-conversion-target comparison. Lower ranks widen implicitly into
    /// higher ranks; `None` for non-numeric types.
    ///
    /// Decimal deliberately has no rank relative to float/double: there is no
    /// implicit conversion either way, which is what drives the unary-minus
    /// ambiguity downgrade.
    pub const fn promotion_rank(self) -> Option<u8> {
        match self {
            PrimitiveKind::Int8 => Some(0),
            PrimitiveKind::Uint8 => Some(1),
            PrimitiveKind::Int16 => Some(2),
            PrimitiveKind::Uint16 | PrimitiveKind::Char => Some(3),
            PrimitiveKind::Int32 => Some(4),
            PrimitiveKind::Uint32 => Some(5),
            PrimitiveKind::NInt => Some(6),
            PrimitiveKind::NUint => Some(7),
            PrimitiveKind::Int64 => Some(8),
            PrimitiveKind::Uint64 => Some(9),
            PrimitiveKind::Float32 => Some(10),
            PrimitiveKind::Float64 => Some(11),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
