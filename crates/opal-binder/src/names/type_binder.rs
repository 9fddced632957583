//! Type-expression binding.
//!
//! Each syntactic shape has its own rule. Simple names go through the scope's
//! lookup (table first, then imports) with [`result_symbol`] arbitration;
//! qualified names resolve the qualifier to a namespace or type and then a
//! member of it. Contextual keywords (`var`, `unmanaged`, `notnull`, `nint`,
//! `nuint`, `dynamic`) are disambiguated by a speculative lookup with
//! diagnostics suppressed: the keyword meaning wins only when the lookup
//! finds nothing usable as a type.

use opal_core::{
    Diagnostic, DiagnosticBag, Feature, PrimitiveKind, Span, Ty, TypeHash, check_feature_availability,
    well_known,
};
use opal_registry::{LookupResultKind, Symbol};
use opal_syntax::TypeExpr;

use crate::context::BinderContext;
use crate::names::result_symbol::{result_symbol, symbol_display};

/// Bind a type expression to a type, reporting and returning `None` on
/// failure. Aliases are unwrapped transparently.
pub fn bind_type(ctx: &BinderContext<'_>, bag: &mut DiagnosticBag, syntax: TypeExpr<'_>) -> Option<Ty> {
    match syntax {
        TypeExpr::Named { name, span } => bind_named_type(ctx, bag, name, 0, span),
        TypeExpr::Generic { name, args, span } => {
            // Type arguments bind for their own diagnostics; the type model
            // identifies a constructed generic by its definition.
            for arg in args {
                let _ = bind_type(ctx, bag, *arg);
            }
            bind_named_type(ctx, bag, name, args.len(), span)
        }
        TypeExpr::Qualified { .. } => {
            let span = syntax.span();
            match bind_namespace_or_type(ctx, bag, syntax)? {
                Symbol::Type(hash) => finish_type(ctx, bag, hash, span),
                Symbol::Namespace(name) => {
                    bag.push(Diagnostic::NotATypeOrNamespace { name, span });
                    None
                }
            }
        }
        TypeExpr::Nullable { inner, .. } => {
            let inner = bind_type(ctx, bag, *inner)?;
            Some(Ty::nullable(inner.hash))
        }
        TypeExpr::Pointer { inner, .. } => {
            let inner = bind_type(ctx, bag, *inner)?;
            Some(Ty::pointer(inner.hash))
        }
        TypeExpr::Array { element, span } => {
            let element = bind_type(ctx, bag, *element)?;
            let hash = element.hash.array_of();
            if ctx.table.type_def(hash).is_none() {
                bag.push(Diagnostic::TypeNotFound {
                    name: format!("{}[]", ctx.table.display(element)),
                    span,
                });
                return None;
            }
            Some(Ty::simple(hash))
        }
    }
}

/// Bind a type expression to a namespace or type symbol.
pub fn bind_namespace_or_type(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    syntax: TypeExpr<'_>,
) -> Option<Symbol> {
    match syntax {
        TypeExpr::Named { name, span } => lookup_name(ctx, bag, name, 0, span),
        TypeExpr::Generic { name, args, span } => {
            for arg in args {
                let _ = bind_type(ctx, bag, *arg);
            }
            lookup_name(ctx, bag, name, args.len(), span)
        }
        TypeExpr::Qualified { qualifier, name, span } => {
            let qualifier = bind_namespace_or_type(ctx, bag, *qualifier)?;
            let member = match &qualifier {
                Symbol::Namespace(ns) => ctx.table.namespace_member(ns, name, 0),
                // Nested types are registered under dotted qualified names.
                Symbol::Type(hash) => ctx
                    .table
                    .type_def(*hash)
                    .and_then(|def| ctx.table.type_by_qualified_name(&format!("{}.{name}", def.name)))
                    .map(|def| Symbol::Type(def.hash)),
            };
            match member {
                Some(symbol) => Some(symbol),
                None => {
                    bag.push(Diagnostic::TypeNotFound {
                        name: format!("{}.{name}", symbol_display(ctx.table, &qualifier)),
                        span,
                    });
                    None
                }
            }
        }
        _ => bind_type(ctx, bag, syntax).map(|ty| Symbol::Type(ty.hash)),
    }
}

const CONTEXTUAL_KEYWORDS: &[&str] = &["var", "unmanaged", "notnull", "nint", "nuint", "dynamic"];

fn bind_named_type(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    name: &str,
    arity: usize,
    span: Span,
) -> Option<Ty> {
    if arity == 0 && CONTEXTUAL_KEYWORDS.contains(&name) && lookup_prefers_keyword(ctx, name) {
        return bind_contextual_keyword(ctx, bag, name, span);
    }
    match lookup_name(ctx, bag, name, arity, span)? {
        Symbol::Type(hash) => finish_type(ctx, bag, hash, span),
        Symbol::Namespace(name) => {
            bag.push(Diagnostic::NotATypeOrNamespace { name, span });
            None
        }
    }
}

/// Speculative lookup for contextual-keyword disambiguation. The keyword
/// meaning wins iff the lookup finds nothing, fails, or finds only a
/// namespace; a found type always wins.
fn lookup_prefers_keyword(ctx: &BinderContext<'_>, name: &str) -> bool {
    let mut suppressed = DiagnosticBag::new();
    match lookup_name(ctx, &mut suppressed, name, 0, Span::default()) {
        Some(Symbol::Type(_)) => false,
        Some(Symbol::Namespace(_)) | None => true,
    }
}

fn bind_contextual_keyword(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    name: &str,
    span: Span,
) -> Option<Ty> {
    match name {
        "dynamic" => Some(Ty::simple(well_known::DYNAMIC)),
        "nint" | "nuint" => {
            if let Some(diag) = check_feature_availability(Feature::NativeInts, ctx.version, span) {
                bag.push(diag);
            }
            let kind = if name == "nint" {
                PrimitiveKind::NInt
            } else {
                PrimitiveKind::NUint
            };
            Some(Ty::primitive(kind))
        }
        // `var`, `unmanaged` and `notnull` are inference/constraint keywords
        // with no meaning in a type position.
        _ => {
            bag.push(Diagnostic::TypeNotFound {
                name: name.to_string(),
                span,
            });
            None
        }
    }
}

/// Simple-name resolution: the symbol table first, then the scope's imports,
/// merged through [`result_symbol`] arbitration.
fn lookup_name(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    name: &str,
    arity: usize,
    span: Span,
) -> Option<Symbol> {
    let direct = ctx.table.lookup(name, arity);
    let imported = match ctx.imports {
        Some(imports) => imports.lookup_symbol(ctx.table, name, arity),
        None => Vec::new(),
    };
    let found_nothing = direct.kind == LookupResultKind::Empty && imported.is_empty();
    let resolved = result_symbol(ctx, bag, name, direct, imported, span);
    if resolved.is_none() && found_nothing {
        if let Some(expected) = probe_other_arity(ctx, name, arity) {
            bag.push(Diagnostic::WrongArity {
                name: name.to_string(),
                expected,
                got: arity,
                span,
            });
            return None;
        }
        bag.push(Diagnostic::TypeNotFound {
            name: name.to_string(),
            span,
        });
    }
    resolved
}

/// When a name exists only at a different generic arity, report the arity it
/// wanted instead of "not found". Arities beyond the probe range fall back
/// to the generic message.
fn probe_other_arity(ctx: &BinderContext<'_>, name: &str, got: usize) -> Option<usize> {
    const MAX_PROBE: usize = 8;
    (0..=MAX_PROBE)
        .filter(|&arity| arity != got)
        .find(|&arity| ctx.table.lookup(name, arity).is_viable())
}

fn finish_type(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    hash: TypeHash,
    span: Span,
) -> Option<Ty> {
    if hash == well_known::NINT || hash == well_known::NUINT {
        if let Some(diag) = check_feature_availability(Feature::NativeInts, ctx.version, span) {
            bag.push(diag);
        }
    }
    if let Some(def) = ctx.table.type_def(hash) {
        if let Some(message) = &def.obsolete {
            bag.push(Diagnostic::ObsoleteSymbol {
                name: def.name.clone(),
                message: Some(message.clone()),
                span,
            });
        }
    }
    Some(Ty::simple(hash))
}
