//! Deterministic hash-based type identity system.
//!
//! This module provides [`TypeHash`], a 64-bit hash that uniquely identifies
//! types, operator methods, and accessors. Unlike sequential IDs, hashes are
//! computed deterministically from names and signatures, enabling:
//!
//! - Forward references (hash computed before registration)
//! - No registration order dependencies
//! - Single map lookups (no secondary name→id maps)
//!
//! # Hash Computation
//!
//! Uses XXHash64 with domain-specific mixing constants to prevent collisions
//! between different entity types (types vs operators vs derived forms).
//! The built-in types use reserved sentinel values (see [`well_known`]) so
//! they can be named in `const` contexts.

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
///
/// These constants ensure that different entity kinds produce distinct hashes
/// even if they share the same name.
pub mod hash_constants {
    /// Separator constant for signature components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for operator method hashes.
    pub const OPERATOR: u64 = 0x3e9f5d2a8c7b1403;

    /// Domain marker for nullable constructed forms.
    pub const NULLABLE: u64 = 0x9a7f3d5e2b8c4601;

    /// Domain marker for pointer constructed forms.
    pub const POINTER: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for array constructed forms.
    pub const ARRAY: u64 = 0x7d3c8b4a92e15f6d;

    /// Parameter position mixing constants.
    /// Each parameter position gets a unique constant so parameter order matters.
    pub const PARAM_MARKERS: [u64; 8] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
    ];
}

/// A deterministic 64-bit hash identifying a type or operator method.
///
/// Computed from the qualified name (for types) or owner+name+signature
/// (for operator methods). The same input always produces the same hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a qualified type name.
    ///
    /// The same name always produces the same hash.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create an operator method hash from owner type, operator metadata name
    /// (e.g. `op_Addition`), and parameter type hashes.
    ///
    /// Parameter order matters, so `(int, MyType)` and `(MyType, int)`
    /// overloads get distinct hashes.
    #[inline]
    pub fn from_operator(owner: TypeHash, operator_name: &str, param_hashes: &[TypeHash]) -> Self {
        let mut hash = hash_constants::OPERATOR ^ owner.0 ^ xxh64(operator_name.as_bytes(), 0);
        for (i, param) in param_hashes.iter().enumerate() {
            let marker = hash_constants::PARAM_MARKERS
                .get(i)
                .copied()
                .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
            hash = hash
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(marker ^ param.0);
        }
        TypeHash(hash)
    }

    /// Hash of the constructed nullable form `T?` of this type.
    #[inline]
    pub const fn nullable_of(self) -> Self {
        TypeHash(
            (hash_constants::NULLABLE ^ self.0)
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(1),
        )
    }

    /// Hash of the constructed pointer form `T*` of this type.
    #[inline]
    pub const fn pointer_to(self) -> Self {
        TypeHash(
            (hash_constants::POINTER ^ self.0)
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(2),
        )
    }

    /// Hash of the constructed array form `T[]` of this type.
    #[inline]
    pub const fn array_of(self) -> Self {
        TypeHash(
            (hash_constants::ARRAY ^ self.0)
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(3),
        )
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Well-known constant hashes for the built-in types.
///
/// These are reserved sentinel values, not computed from names, so that they
/// can appear in `const` operator signature tables. The symbol table maps the
/// source-level names onto these hashes when it seeds the primitives.
pub mod well_known {
    use super::TypeHash;

    /// `void`.
    pub const VOID: TypeHash = TypeHash(0xb17e_0000_0000_0001);
    /// `bool`.
    pub const BOOL: TypeHash = TypeHash(0xb17e_0000_0000_0002);
    /// `char`.
    pub const CHAR: TypeHash = TypeHash(0xb17e_0000_0000_0003);
    /// `sbyte` (8-bit signed).
    pub const INT8: TypeHash = TypeHash(0xb17e_0000_0000_0004);
    /// `short` (16-bit signed).
    pub const INT16: TypeHash = TypeHash(0xb17e_0000_0000_0005);
    /// `int` (32-bit signed).
    pub const INT32: TypeHash = TypeHash(0xb17e_0000_0000_0006);
    /// `long` (64-bit signed).
    pub const INT64: TypeHash = TypeHash(0xb17e_0000_0000_0007);
    /// `byte` (8-bit unsigned).
    pub const UINT8: TypeHash = TypeHash(0xb17e_0000_0000_0008);
    /// `ushort` (16-bit unsigned).
    pub const UINT16: TypeHash = TypeHash(0xb17e_0000_0000_0009);
    /// `uint` (32-bit unsigned).
    pub const UINT32: TypeHash = TypeHash(0xb17e_0000_0000_000a);
    /// `ulong` (64-bit unsigned).
    pub const UINT64: TypeHash = TypeHash(0xb17e_0000_0000_000b);
    /// `nint` (native-sized signed).
    pub const NINT: TypeHash = TypeHash(0xb17e_0000_0000_000c);
    /// `nuint` (native-sized unsigned).
    pub const NUINT: TypeHash = TypeHash(0xb17e_0000_0000_000d);
    /// `float` (32-bit IEEE).
    pub const FLOAT32: TypeHash = TypeHash(0xb17e_0000_0000_000e);
    /// `double` (64-bit IEEE).
    pub const FLOAT64: TypeHash = TypeHash(0xb17e_0000_0000_000f);
    /// `decimal` (128-bit scaled).
    pub const DECIMAL: TypeHash = TypeHash(0xb17e_0000_0000_0010);
    /// `string`.
    pub const STRING: TypeHash = TypeHash(0xb17e_0000_0000_0011);
    /// `object`, the root reference type.
    pub const OBJECT: TypeHash = TypeHash(0xb17e_0000_0000_0012);
    /// `dynamic`. Statically it behaves like `object` tagged for runtime binding.
    pub const DYNAMIC: TypeHash = TypeHash(0xb17e_0000_0000_0013);
    /// The error type produced during recovery. Converts to and from nothing.
    pub const ERROR: TypeHash = TypeHash(0xb17e_ffff_ffff_ffff);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_hash_determinism() {
        let hash1 = TypeHash::from_name("int");
        let hash2 = TypeHash::from_name("int");
        assert_eq!(hash1, hash2);

        let hash3 = TypeHash::from_name("Geo.Point");
        let hash4 = TypeHash::from_name("Geo.Point");
        assert_eq!(hash3, hash4);
    }

    #[test]
    fn type_hash_uniqueness() {
        let int_hash = TypeHash::from_name("int");
        let float_hash = TypeHash::from_name("float");
        let point_hash = TypeHash::from_name("Point");

        assert_ne!(int_hash, float_hash);
        assert_ne!(int_hash, point_hash);
        assert_ne!(float_hash, point_hash);
    }

    #[test]
    fn operator_hash_signature_distinction() {
        let owner = TypeHash::from_name("Point");
        let a = TypeHash::from_operator(owner, "op_Addition", &[owner, well_known::INT32]);
        let b = TypeHash::from_operator(owner, "op_Addition", &[well_known::INT32, owner]);
        let c = TypeHash::from_operator(owner, "op_Subtraction", &[owner, well_known::INT32]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn derived_forms_are_distinct() {
        let int32 = well_known::INT32;
        assert_ne!(int32.nullable_of(), int32);
        assert_ne!(int32.pointer_to(), int32);
        assert_ne!(int32.array_of(), int32);
        assert_ne!(int32.nullable_of(), int32.pointer_to());
        // Deterministic.
        assert_eq!(int32.nullable_of(), well_known::INT32.nullable_of());
    }
}
