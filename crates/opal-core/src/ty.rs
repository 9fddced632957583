//! Complete type references.
//!
//! [`Ty`] pairs a base [`TypeHash`] with the constructed-form modifier applied
//! to it (nullable, pointer). It is `Copy` so type references can be passed
//! around without allocation; structural information about the base type lives
//! in the symbol table.

use std::fmt::{self, Display, Formatter};

use crate::primitive_kind::PrimitiveKind;
use crate::type_hash::{TypeHash, well_known};

/// The constructed-form modifier of a type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeModifier {
    /// The base type itself.
    #[default]
    None,
    /// Nullable form `T?` (value-type lifting).
    Nullable,
    /// Pointer form `T*`.
    Pointer,
}

/// A complete type reference: base type plus modifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ty {
    /// The base type.
    pub hash: TypeHash,
    /// The constructed-form modifier.
    pub modifier: TypeModifier,
}

impl Ty {
    /// The error type, used for recovery nodes.
    pub const ERROR: Ty = Ty::simple(well_known::ERROR);

    /// A plain reference to a base type.
    #[inline]
    pub const fn simple(hash: TypeHash) -> Self {
        Ty {
            hash,
            modifier: TypeModifier::None,
        }
    }

    /// The nullable form `T?`.
    #[inline]
    pub const fn nullable(hash: TypeHash) -> Self {
        Ty {
            hash,
            modifier: TypeModifier::Nullable,
        }
    }

    /// The pointer form `T*`.
    #[inline]
    pub const fn pointer(hash: TypeHash) -> Self {
        Ty {
            hash,
            modifier: TypeModifier::Pointer,
        }
    }

    /// A reference to a built-in primitive.
    #[inline]
    pub const fn primitive(kind: PrimitiveKind) -> Self {
        Ty::simple(kind.type_hash())
    }

    /// Whether this is the nullable form of some type.
    #[inline]
    pub const fn is_nullable(self) -> bool {
        matches!(self.modifier, TypeModifier::Nullable)
    }

    /// Whether this is a pointer type.
    #[inline]
    pub const fn is_pointer(self) -> bool {
        matches!(self.modifier, TypeModifier::Pointer)
    }

    /// Strip a nullable modifier, yielding the underlying type.
    /// Non-nullable types are returned unchanged.
    #[inline]
    pub const fn strip_nullable(self) -> Ty {
        match self.modifier {
            TypeModifier::Nullable => Ty::simple(self.hash),
            _ => self,
        }
    }

    /// The unique hash of the full constructed form.
    #[inline]
    pub const fn constructed_hash(self) -> TypeHash {
        match self.modifier {
            TypeModifier::None => self.hash,
            TypeModifier::Nullable => self.hash.nullable_of(),
            TypeModifier::Pointer => self.hash.pointer_to(),
        }
    }

    /// The primitive kind of the base type, if it is a built-in primitive.
    #[inline]
    pub fn primitive_kind(self) -> Option<PrimitiveKind> {
        PrimitiveKind::from_type_hash(self.hash)
    }

    /// Whether this is exactly the given (unmodified) primitive.
    #[inline]
    pub fn is_primitive(self, kind: PrimitiveKind) -> bool {
        self.modifier == TypeModifier::None && self.hash == kind.type_hash()
    }

    /// Whether this is `dynamic`.
    #[inline]
    pub fn is_dynamic(self) -> bool {
        self.modifier == TypeModifier::None && self.hash == well_known::DYNAMIC
    }

    /// Whether this is the error type.
    #[inline]
    pub fn is_error(self) -> bool {
        self.hash == well_known::ERROR
    }

    /// Whether this is `void`.
    #[inline]
    pub fn is_void(self) -> bool {
        self.modifier == TypeModifier::None && self.hash == well_known::VOID
    }

    /// Whether this is `void*`.
    #[inline]
    pub fn is_void_pointer(self) -> bool {
        self.modifier == TypeModifier::Pointer && self.hash == well_known::VOID
    }
}

impl fmt::Debug for Ty {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.primitive_kind() {
            Some(kind) => write!(f, "Ty({kind}{})", modifier_suffix(self.modifier)),
            None => write!(f, "Ty({}{})", self.hash, modifier_suffix(self.modifier)),
        }
    }
}

impl Display for Ty {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.primitive_kind() {
            Some(kind) => write!(f, "{kind}{}", modifier_suffix(self.modifier)),
            None => write!(f, "{}{}", self.hash, modifier_suffix(self.modifier)),
        }
    }
}

const fn modifier_suffix(modifier: TypeModifier) -> &'static str {
    match modifier {
        TypeModifier::None => "",
        TypeModifier::Nullable => "?",
        TypeModifier::Pointer => "*",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_strips_back() {
        let int32 = Ty::primitive(PrimitiveKind::Int32);
        let lifted = Ty::nullable(int32.hash);
        assert!(lifted.is_nullable());
        assert_eq!(lifted.strip_nullable(), int32);
        assert_ne!(lifted.constructed_hash(), int32.constructed_hash());
    }

    #[test]
    fn void_pointer_detection() {
        let vp = Ty::pointer(well_known::VOID);
        assert!(vp.is_pointer());
        assert!(vp.is_void_pointer());
        assert!(!Ty::pointer(well_known::INT32).is_void_pointer());
    }
}
