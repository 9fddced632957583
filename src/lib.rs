//! Opal semantic analysis, gathered under one roof.
//!
//! The heavy lifting lives in the member crates:
//!
//! - [`opal_core`] — spans, type identity, constants, diagnostics, versioning
//! - [`opal_syntax`] — the arena-allocated expression and type AST
//! - [`opal_registry`] — the symbol table the binder queries
//! - [`opal_binder`] — operator binding, overload resolution, constant
//!   folding, name/type resolution and imports
//!
//! This crate re-exports them and offers a [`prelude`] for drivers and tests.

pub use opal_binder as binder;
pub use opal_core as core;
pub use opal_registry as registry;
pub use opal_syntax as syntax;

pub mod prelude {
    pub use opal_binder::bound::{BoundExpr, BoundExprKind};
    pub use opal_binder::context::{BinderContext, BinderFlags, LocalKind};
    pub use opal_binder::conversion::{
        Conversion, ConversionKind, ConversionOracle, ConversionSource, StandardConversions,
    };
    pub use opal_binder::names::imports::Imports;
    pub use opal_binder::names::{bind_namespace_or_type, bind_type};
    pub use opal_binder::operators::bind_expr;
    pub use opal_binder::overload::{
        BinaryOperatorKind, OverloadResult, OverloadResultKind, UnaryOperatorKind,
    };
    pub use opal_core::{
        ConstantValue, Diagnostic, DiagnosticBag, Feature, LanguageVersion, PrimitiveKind,
        Severity, Span, Ty, TypeHash, well_known,
    };
    pub use opal_registry::{
        EventDef, ExtensionDef, ExtensionScope, OperatorDef, OperatorForm, SymbolOrigin,
        SymbolTable, TypeDef, TypeKind, TypeParamConstraint,
    };
    pub use opal_syntax::{
        AsExpr, AssignExpr, AssignOp, BinaryExpr, BinaryOp, Bump, CondExpr, DefaultExpr, Expr,
        IdentExpr, IncDecExpr, IncDecOp, InterpolatedExpr, IsExpr, LiteralExpr, LiteralValue,
        MemberExpr, ParenExpr, TupleExpr, TypeExpr, UnaryExpr, UnaryOp, UsingDirective, UsingKind,
    };
}
