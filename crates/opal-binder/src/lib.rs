//! The opal binder: operator binding, overload resolution, constant folding,
//! name/type resolution and the imports table.
//!
//! The binder turns expression and type syntax into a bound tree. It never
//! fails: every entry point returns a bound node (possibly error-typed) and
//! accumulates diagnostics into a [`DiagnosticBag`](opal_core::DiagnosticBag).
//!
//! Layering, leaf to root:
//!
//! - [`fold`] — pure constant folding over [`ConstantValue`](opal_core::ConstantValue)
//! - [`conversion`] — the conversion oracle contract and its standard impl
//! - [`overload`] — candidate collection and betterness ranking
//! - [`operators`] — per-operator-shape binding ([`operators::bind_expr`] is
//!   the front door)
//! - [`names`] — type/namespace/alias binding and the imports table

pub mod bound;
pub mod context;
pub mod conversion;
pub mod fold;
pub mod names;
pub mod operators;
pub mod overload;

pub use bound::{BoundExpr, BoundExprKind};
pub use context::{BinderContext, BinderFlags, LocalKind, LocalSymbol};
pub use conversion::{Conversion, ConversionKind, ConversionOracle, ConversionSource, StandardConversions};
pub use operators::bind_expr;
pub use overload::{
    BinaryOperatorKind, BinarySignature, OverloadResult, OverloadResultKind, UnaryOperatorKind,
    UnarySignature,
};
