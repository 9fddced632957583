//! Arbitration of name-lookup results against imported symbols.
//!
//! A direct (scope/table) lookup and the imports table can both produce
//! candidates for the same simple name. The preference order is origin rank:
//! current module, then same assembly, then referenced assemblies, then the
//! core library. A source declaration that hides an imported metadata symbol
//! gets a "using the definition from X" warning instead of a hard ambiguity,
//! unless both sides are source (reported at declaration time) or the
//! metadata side is corlib under the ignore-corlib-duplicates flag.

use opal_core::{Diagnostic, DiagnosticBag, Span};
use opal_registry::lookup::arbitrate;
use opal_registry::{LookupResult, LookupResultKind, Symbol, SymbolOrigin, SymbolTable};

use crate::context::{BinderContext, BinderFlags};

/// Collapse a direct lookup result plus imported candidates into the single
/// symbol the name denotes, reporting ambiguities and hiding conflicts.
pub(super) fn result_symbol(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    name: &str,
    direct: LookupResult,
    imported: Vec<(Symbol, SymbolOrigin)>,
    span: Span,
) -> Option<Symbol> {
    match direct.kind {
        LookupResultKind::Viable => {
            let (winner, winner_origin) = direct.symbols.into_iter().next()?;
            note_hidden_import(ctx, bag, name, &winner, winner_origin, &imported, span);
            Some(winner)
        }
        LookupResultKind::NotATypeOrNamespace => {
            bag.push(Diagnostic::NotATypeOrNamespace {
                name: name.to_string(),
                span,
            });
            None
        }
        LookupResultKind::Ambiguous => {
            report_ambiguity(ctx.table, bag, name, &direct.symbols, span);
            None
        }
        LookupResultKind::Empty => {
            let result = arbitrate(imported);
            match result.kind {
                LookupResultKind::Viable => result.symbols.into_iter().next().map(|(sym, _)| sym),
                LookupResultKind::Ambiguous => {
                    report_ambiguity(ctx.table, bag, name, &result.symbols, span);
                    None
                }
                _ => None,
            }
        }
    }
}

fn note_hidden_import(
    ctx: &BinderContext<'_>,
    bag: &mut DiagnosticBag,
    name: &str,
    winner: &Symbol,
    winner_origin: SymbolOrigin,
    imported: &[(Symbol, SymbolOrigin)],
    span: Span,
) {
    if !winner_origin.is_source() {
        return;
    }
    for (loser, loser_origin) in imported {
        if loser == winner || loser_origin.is_source() {
            continue;
        }
        if *loser_origin == SymbolOrigin::CoreLibrary
            && ctx.flags.contains(BinderFlags::IGNORE_CORLIB_DUPLICATES)
        {
            continue;
        }
        bag.push(Diagnostic::SymbolHidesImport {
            name: name.to_string(),
            module: symbol_display(ctx.table, winner),
            span,
        });
        return;
    }
}

fn report_ambiguity(
    table: &SymbolTable,
    bag: &mut DiagnosticBag,
    name: &str,
    contenders: &[(Symbol, SymbolOrigin)],
    span: Span,
) {
    let mut names = contenders
        .iter()
        .map(|(sym, _)| symbol_display(table, sym));
    bag.push(Diagnostic::AmbiguousReference {
        name: name.to_string(),
        first: names.next().unwrap_or_default(),
        second: names.next().unwrap_or_default(),
        span,
    });
}

pub(super) fn symbol_display(table: &SymbolTable, symbol: &Symbol) -> String {
    match symbol {
        Symbol::Type(hash) => table
            .type_def(*hash)
            .map(|def| def.name.clone())
            .unwrap_or_else(|| format!("{hash:?}")),
        Symbol::Namespace(name) => name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::StandardConversions;
    use opal_core::TypeHash;
    use opal_registry::{SymbolOrigin, SymbolTable, TypeDef, TypeKind};

    fn class(name: &str, origin: SymbolOrigin) -> TypeDef {
        TypeDef {
            hash: TypeHash::from_name(name),
            name: name.to_string(),
            kind: TypeKind::Class { base: None },
            arity: 0,
            operators: Vec::new(),
            events: Vec::new(),
            implements: Vec::new(),
            is_ref_struct: false,
            origin,
            obsolete: None,
        }
    }

    #[test]
    fn source_winner_warns_about_hidden_metadata() {
        let mut table = SymbolTable::with_primitives();
        let source = table
            .register_type(class("App.Widget", SymbolOrigin::CurrentModule))
            .expect("fresh");
        let metadata = TypeHash::from_name("Lib.Widget");
        table
            .register_type(class("Lib.Widget", SymbolOrigin::ReferencedAssembly))
            .expect("fresh");
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let resolved = result_symbol(
            &ctx,
            &mut bag,
            "Widget",
            LookupResult::viable(Symbol::Type(source), SymbolOrigin::CurrentModule),
            vec![(Symbol::Type(metadata), SymbolOrigin::ReferencedAssembly)],
            Span::point(1, 1),
        );
        assert_eq!(resolved, Some(Symbol::Type(source)));
        assert_eq!(bag.codes(), vec!["WRN_SameFullNameThisAggAgg"]);
    }

    #[test]
    fn corlib_duplicate_is_silenced_under_flag() {
        let mut table = SymbolTable::with_primitives();
        let source = table
            .register_type(class("App.Widget", SymbolOrigin::CurrentModule))
            .expect("fresh");
        let corlib = TypeHash::from_name("System.Widget");
        table
            .register_type(class("System.Widget", SymbolOrigin::CoreLibrary))
            .expect("fresh");
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle)
            .with_flags(BinderFlags::IGNORE_CORLIB_DUPLICATES);
        let mut bag = DiagnosticBag::new();
        let resolved = result_symbol(
            &ctx,
            &mut bag,
            "Widget",
            LookupResult::viable(Symbol::Type(source), SymbolOrigin::CurrentModule),
            vec![(Symbol::Type(corlib), SymbolOrigin::CoreLibrary)],
            Span::point(1, 1),
        );
        assert_eq!(resolved, Some(Symbol::Type(source)));
        assert!(bag.is_empty());
    }

    #[test]
    fn equal_rank_imports_are_ambiguous() {
        let mut table = SymbolTable::with_primitives();
        let a = table
            .register_type(class("A.Thing", SymbolOrigin::ReferencedAssembly))
            .expect("fresh");
        let b = table
            .register_type(class("B.Thing", SymbolOrigin::ReferencedAssembly))
            .expect("fresh");
        let oracle = StandardConversions::new(&table);
        let ctx = BinderContext::new(&table, &oracle);
        let mut bag = DiagnosticBag::new();
        let resolved = result_symbol(
            &ctx,
            &mut bag,
            "Thing",
            LookupResult::empty(),
            vec![
                (Symbol::Type(a), SymbolOrigin::ReferencedAssembly),
                (Symbol::Type(b), SymbolOrigin::ReferencedAssembly),
            ],
            Span::point(1, 1),
        );
        assert_eq!(resolved, None);
        assert_eq!(bag.codes(), vec!["ERR_AmbigContext"]);
    }
}
