//! Type reference AST nodes.

use opal_core::Span;

/// A type reference as written in source.
///
/// Each shape has its own binding rule in the name binder; the enum mirrors
/// the syntactic forms rather than the semantic type model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeExpr<'ast> {
    /// A simple or contextual-keyword name: `int`, `List`, `var`, `nint`.
    Named {
        name: &'ast str,
        span: Span,
    },
    /// A generic name: `List<T>` with bound type arguments.
    Generic {
        name: &'ast str,
        args: &'ast [TypeExpr<'ast>],
        span: Span,
    },
    /// A qualified name: `left.right` where `left` is a namespace, type or
    /// alias qualifier.
    Qualified {
        qualifier: &'ast TypeExpr<'ast>,
        name: &'ast str,
        span: Span,
    },
    /// Nullable form `T?`.
    Nullable {
        inner: &'ast TypeExpr<'ast>,
        span: Span,
    },
    /// Pointer form `T*`.
    Pointer {
        inner: &'ast TypeExpr<'ast>,
        span: Span,
    },
    /// Array form `T[]`.
    Array {
        element: &'ast TypeExpr<'ast>,
        span: Span,
    },
}

impl<'ast> TypeExpr<'ast> {
    /// Get the span of this type reference.
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named { span, .. }
            | TypeExpr::Generic { span, .. }
            | TypeExpr::Qualified { span, .. }
            | TypeExpr::Nullable { span, .. }
            | TypeExpr::Pointer { span, .. }
            | TypeExpr::Array { span, .. } => *span,
        }
    }

    /// The rightmost simple name, used in diagnostics.
    pub fn simple_name(&self) -> &'ast str {
        match self {
            TypeExpr::Named { name, .. }
            | TypeExpr::Generic { name, .. }
            | TypeExpr::Qualified { name, .. } => name,
            TypeExpr::Nullable { inner, .. }
            | TypeExpr::Pointer { inner, .. }
            | TypeExpr::Array { element: inner, .. } => inner.simple_name(),
        }
    }
}
