//! Structured diagnostics for the semantic analyzer.
//!
//! Diagnostics carry a stable code, named arguments and a span; rendering is
//! out of scope (the `Display` impls exist for debugging only). Binding never
//! fails: binders push into an append-only [`DiagnosticBag`] and return a
//! recovery node instead.
//!
//! The bag also supports the speculative suppress-and-recover pattern: a
//! binder forks a child bag for a tentative attempt, then either absorbs it
//! (attempt accepted) or drops it (attempt discarded).

use thiserror::Error;

use crate::span::Span;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic: code-bearing variant with named arguments and a span.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    // === Operator errors ===
    /// No applicable operator for the operand types.
    #[error("at {span}: operator '{op}' cannot be applied to operands of type '{left}' and '{right}'")]
    BadBinaryOperator {
        op: String,
        left: String,
        right: String,
        span: Span,
    },

    /// More than one equally good operator candidate.
    #[error("at {span}: operator '{op}' is ambiguous on operands of type '{left}' and '{right}'")]
    AmbiguousBinaryOperator {
        op: String,
        left: String,
        right: String,
        span: Span,
    },

    /// No applicable unary operator for the operand type.
    #[error("at {span}: operator '{op}' cannot be applied to operand of type '{operand}'")]
    BadUnaryOperator {
        op: String,
        operand: String,
        span: Span,
    },

    /// More than one equally good unary operator candidate.
    #[error("at {span}: operator '{op}' is ambiguous on an operand of type '{operand}'")]
    AmbiguousUnaryOperator {
        op: String,
        operand: String,
        span: Span,
    },

    /// Short-circuit and unsigned-shift operators never bind dynamically.
    #[error("at {span}: operator '{op}' cannot be applied to an operand of type 'dynamic'")]
    DynamicShortCircuitOperator { op: String, span: Span },

    /// A dynamic operation received an operand no runtime binder can dispatch on.
    #[error("at {span}: operand of type '{operand}' cannot be used in a dynamic operation")]
    BadDynamicOperand { operand: String, span: Span },

    /// The chosen user-defined `&`/`|` does not satisfy the conditional
    /// logical operator pattern (parameter and return types must be identical).
    #[error("at {span}: '{method}' cannot be used as a short-circuit operator; its parameter and return types must all be '{ty}'")]
    BadBoolOperator {
        method: String,
        ty: String,
        span: Span,
    },

    /// The declaring type lacks matching `operator true`/`operator false`.
    #[error("at {span}: type '{ty}' must declare operator true and operator false to be used as a short-circuit operand")]
    MustHaveOpTrueFalse { ty: String, span: Span },

    // === Compound assignment / value-kind errors ===
    /// No implicit conversion between two types.
    #[error("at {span}: cannot implicitly convert type '{from}' to '{to}'")]
    NoImplicitConversion {
        from: String,
        to: String,
        span: Span,
    },

    /// No conversion at all between two types.
    #[error("at {span}: cannot convert type '{from}' to '{to}'")]
    NoConversion {
        from: String,
        to: String,
        span: Span,
    },

    /// The left side of an assignment is not an assignable location.
    #[error("at {span}: the left-hand side of an assignment must be an assignable variable or property")]
    NotAssignable { span: Span },

    /// `void`-typed expressions cannot be operated on.
    #[error("at {span}: invalid use of 'void'")]
    InvalidUseOfVoid { span: Span },

    /// An event is missing the accessor a `+=`/`-=` needs.
    #[error("at {span}: event '{event}' is missing an accessible '{accessor}' accessor")]
    EventAccessorMissing {
        event: String,
        accessor: String,
        span: Span,
    },

    /// An event can only appear on the left of `+=` or `-=`.
    #[error("at {span}: event '{event}' can only appear on the left-hand side of += or -=")]
    BadEventUsage { event: String, span: Span },

    // === Constant folding errors ===
    /// Integer division or remainder by a constant zero.
    #[error("at {span}: division by constant zero")]
    IntegerDivisionByZero { span: Span },

    /// Checked integer arithmetic overflowed at compile time.
    #[error("at {span}: the operation overflows at compile time in checked mode")]
    CheckedOverflow { span: Span },

    /// Decimal arithmetic overflowed (decimal is always checked).
    #[error("at {span}: decimal constant operation overflows")]
    DecimalOverflow { span: Span },

    // === is / as ===
    /// `as` requires a reference type or nullable value type target.
    #[error("at {span}: the 'as' operator must be used with a reference type or nullable type ('{ty}' is a non-nullable value type)")]
    AsMustHaveReferenceType { ty: String, span: Span },

    /// `is` check is provably true at compile time.
    #[error("at {span}: the given expression is always of the provided ('{ty}') type")]
    IsAlwaysTrue { ty: String, span: Span },

    /// `is` check is provably false at compile time.
    #[error("at {span}: the given expression is never of the provided ('{ty}') type")]
    IsAlwaysFalse { ty: String, span: Span },

    /// `as` conversion is provably null at compile time.
    #[error("at {span}: the given expression is never of the provided ('{ty}') type, so 'as' always yields null")]
    AsAlwaysNull { ty: String, span: Span },

    /// The right side of `is` is neither a type nor a constant expression.
    #[error("at {span}: a constant value or type is expected")]
    ConstantOrTypeExpected { span: Span },

    // === Name binding ===
    /// A simple name did not resolve to any type or namespace.
    #[error("at {span}: the type or namespace name '{name}' could not be found")]
    TypeNotFound { name: String, span: Span },

    /// The resolved symbol exists but is not a type or namespace.
    #[error("at {span}: '{name}' is not a type or namespace")]
    NotATypeOrNamespace { name: String, span: Span },

    /// Two viable symbols with no applicable preference.
    #[error("at {span}: '{name}' is an ambiguous reference between '{first}' and '{second}'")]
    AmbiguousReference {
        name: String,
        first: String,
        second: String,
        span: Span,
    },

    /// A source declaration hides an imported metadata symbol of the same
    /// name and arity; the source definition is used.
    #[error("at {span}: '{name}' conflicts with an imported definition; using the definition from '{module}'")]
    SymbolHidesImport {
        name: String,
        module: String,
        span: Span,
    },

    /// A generic name was used with the wrong number of type arguments.
    #[error("at {span}: '{name}' requires {expected} type argument(s), got {got}")]
    WrongArity {
        name: String,
        expected: usize,
        got: usize,
        span: Span,
    },

    /// A referenced symbol is marked obsolete (use-site diagnostic).
    #[error("at {span}: '{name}' is obsolete{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    ObsoleteSymbol {
        name: String,
        message: Option<String>,
        span: Span,
    },

    /// A construct requires a newer language version.
    #[error("at {span}: feature '{feature}' requires language version {required} (current: {current})")]
    FeatureNotAvailable {
        feature: String,
        required: String,
        current: String,
        span: Span,
    },

    // === Imports ===
    /// The same namespace imported twice in one scope.
    #[error("at {span}: the using directive for '{name}' appeared previously in this scope")]
    DuplicateUsing { name: String, span: Span },

    /// Two aliases (using or extern) with the same name in one scope.
    #[error("at {span}: the alias '{name}' is already defined in this scope")]
    DuplicateAlias { name: String, span: Span },

    /// A using-alias target failed validation.
    #[error("at {span}: the alias target '{name}' is not a valid namespace or type")]
    BadAliasTarget { name: String, span: Span },
}

impl Diagnostic {
    /// Stable code name for this diagnostic kind.
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::BadBinaryOperator { .. } => "ERR_BadBinaryOps",
            Diagnostic::AmbiguousBinaryOperator { .. } => "ERR_AmbigBinaryOps",
            Diagnostic::BadUnaryOperator { .. } => "ERR_BadUnaryOp",
            Diagnostic::AmbiguousUnaryOperator { .. } => "ERR_AmbigUnaryOp",
            Diagnostic::DynamicShortCircuitOperator { .. } => "ERR_BadDynamicShortCircuit",
            Diagnostic::BadDynamicOperand { .. } => "ERR_BadDynamicOperand",
            Diagnostic::BadBoolOperator { .. } => "ERR_BadBoolOp",
            Diagnostic::MustHaveOpTrueFalse { .. } => "ERR_MustHaveOpTF",
            Diagnostic::NoImplicitConversion { .. } => "ERR_NoImplicitConv",
            Diagnostic::NoConversion { .. } => "ERR_NoExplicitConv",
            Diagnostic::NotAssignable { .. } => "ERR_AssgLvalueExpected",
            Diagnostic::InvalidUseOfVoid { .. } => "ERR_VoidError",
            Diagnostic::EventAccessorMissing { .. } => "ERR_EventNeedsBothAccessors",
            Diagnostic::BadEventUsage { .. } => "ERR_BadEventUsage",
            Diagnostic::IntegerDivisionByZero { .. } => "ERR_IntDivByZero",
            Diagnostic::CheckedOverflow { .. } => "ERR_CheckedOverflow",
            Diagnostic::DecimalOverflow { .. } => "ERR_DecimalOverflow",
            Diagnostic::AsMustHaveReferenceType { .. } => "ERR_AsMustHaveReferenceType",
            Diagnostic::IsAlwaysTrue { .. } => "WRN_IsAlwaysTrue",
            Diagnostic::IsAlwaysFalse { .. } => "WRN_IsAlwaysFalse",
            Diagnostic::AsAlwaysNull { .. } => "WRN_AlwaysNull",
            Diagnostic::ConstantOrTypeExpected { .. } => "ERR_ConstantOrTypeExpected",
            Diagnostic::TypeNotFound { .. } => "ERR_SingleTypeNameNotFound",
            Diagnostic::NotATypeOrNamespace { .. } => "ERR_BadSKknown",
            Diagnostic::AmbiguousReference { .. } => "ERR_AmbigContext",
            Diagnostic::SymbolHidesImport { .. } => "WRN_SameFullNameThisAggAgg",
            Diagnostic::WrongArity { .. } => "ERR_BadArity",
            Diagnostic::ObsoleteSymbol { .. } => "WRN_DeprecatedSymbol",
            Diagnostic::FeatureNotAvailable { .. } => "ERR_FeatureNotAvailable",
            Diagnostic::DuplicateUsing { .. } => "WRN_DuplicateUsing",
            Diagnostic::DuplicateAlias { .. } => "ERR_DuplicateAlias",
            Diagnostic::BadAliasTarget { .. } => "ERR_BadAliasTarget",
        }
    }

    /// Severity of this diagnostic kind.
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::IsAlwaysTrue { .. }
            | Diagnostic::IsAlwaysFalse { .. }
            | Diagnostic::AsAlwaysNull { .. }
            | Diagnostic::SymbolHidesImport { .. }
            | Diagnostic::ObsoleteSymbol { .. }
            | Diagnostic::DuplicateUsing { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Where the diagnostic was reported.
    pub fn span(&self) -> Span {
        match self {
            Diagnostic::BadBinaryOperator { span, .. }
            | Diagnostic::AmbiguousBinaryOperator { span, .. }
            | Diagnostic::BadUnaryOperator { span, .. }
            | Diagnostic::AmbiguousUnaryOperator { span, .. }
            | Diagnostic::DynamicShortCircuitOperator { span, .. }
            | Diagnostic::BadDynamicOperand { span, .. }
            | Diagnostic::BadBoolOperator { span, .. }
            | Diagnostic::MustHaveOpTrueFalse { span, .. }
            | Diagnostic::NoImplicitConversion { span, .. }
            | Diagnostic::NoConversion { span, .. }
            | Diagnostic::NotAssignable { span }
            | Diagnostic::InvalidUseOfVoid { span }
            | Diagnostic::EventAccessorMissing { span, .. }
            | Diagnostic::BadEventUsage { span, .. }
            | Diagnostic::IntegerDivisionByZero { span }
            | Diagnostic::CheckedOverflow { span }
            | Diagnostic::DecimalOverflow { span }
            | Diagnostic::AsMustHaveReferenceType { span, .. }
            | Diagnostic::IsAlwaysTrue { span, .. }
            | Diagnostic::IsAlwaysFalse { span, .. }
            | Diagnostic::AsAlwaysNull { span, .. }
            | Diagnostic::ConstantOrTypeExpected { span }
            | Diagnostic::TypeNotFound { span, .. }
            | Diagnostic::NotATypeOrNamespace { span, .. }
            | Diagnostic::AmbiguousReference { span, .. }
            | Diagnostic::SymbolHidesImport { span, .. }
            | Diagnostic::WrongArity { span, .. }
            | Diagnostic::ObsoleteSymbol { span, .. }
            | Diagnostic::FeatureNotAvailable { span, .. }
            | Diagnostic::DuplicateUsing { span, .. }
            | Diagnostic::DuplicateAlias { span, .. }
            | Diagnostic::BadAliasTarget { span, .. } => *span,
        }
    }
}

/// An append-only bag of diagnostics.
///
/// The binder only ever pushes; nothing in this subsystem reads diagnostics
/// back except through [`DiagnosticBag::fork`]/[`DiagnosticBag::absorb`],
/// which implement speculative binding.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Start a speculative attempt: diagnostics go to the fork, and the
    /// caller decides whether to [`absorb`](Self::absorb) or drop them.
    pub fn fork(&self) -> DiagnosticBag {
        DiagnosticBag::new()
    }

    /// Commit a speculative attempt's diagnostics into this bag.
    pub fn absorb(&mut self, fork: DiagnosticBag) {
        self.diagnostics.extend(fork.diagnostics);
    }

    /// Number of diagnostics accumulated.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Whether any accumulated diagnostic is an error (not a warning).
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity() == Severity::Error)
    }

    /// Iterate the accumulated diagnostics in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// The codes of the accumulated diagnostics, in emission order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.diagnostics.iter().map(|d| d.code()).collect()
    }

    /// Consume the bag, yielding the diagnostics.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
