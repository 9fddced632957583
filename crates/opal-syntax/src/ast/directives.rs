//! Using-directive AST nodes, the input to the imports table.

use opal_core::Span;

use crate::ast::types::TypeExpr;

/// The kind of a using directive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UsingKind<'ast> {
    /// `using Namespace.Or.Type;`
    Namespace,
    /// `using static Type;`
    Static,
    /// `using Alias = Target;`
    Alias { name: &'ast str },
    /// `extern alias Name;` (no target type expression; resolved externally).
    ExternAlias { name: &'ast str },
}

/// A single using directive in a scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsingDirective<'ast> {
    pub kind: UsingKind<'ast>,
    /// The imported namespace/type, or the alias target. `None` for extern
    /// aliases.
    pub target: Option<TypeExpr<'ast>>,
    pub span: Span,
}
