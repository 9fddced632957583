//! Core types shared by all opal crates.
//!
//! This crate provides the foundational vocabulary of the semantic analyzer:
//!
//! - [`Span`]: source location tracking for diagnostics
//! - [`TypeHash`]: deterministic 64-bit type/member identity
//! - [`Ty`]: a complete type reference (base type plus modifier)
//! - [`PrimitiveKind`]: the built-in primitive types and their numeric metadata
//! - [`ConstantValue`]: compile-time constant values, including the `Bad`
//!   folding-failure state
//! - [`Diagnostic`] / [`DiagnosticBag`]: structured, append-only diagnostics
//! - [`LanguageVersion`] / [`Feature`]: language-version feature gating

pub mod constant;
pub mod diagnostics;
pub mod features;
pub mod primitive_kind;
pub mod span;
pub mod ty;
pub mod type_hash;

pub use constant::{ConstantValue, Decimal};
pub use diagnostics::{Diagnostic, DiagnosticBag, Severity};
pub use features::{Feature, LanguageVersion, check_feature_availability};
pub use primitive_kind::PrimitiveKind;
pub use span::Span;
pub use ty::{Ty, TypeModifier};
pub use type_hash::{TypeHash, well_known};
