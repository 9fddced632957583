//! The per-scope imports table.
//!
//! Built once per lexical scope from the scope's directives, extern aliases
//! first so alias targets may reference them. Duplicate aliases are a hard
//! error; a duplicate plain `using` is a warning and both directives stay in
//! the table. Alias-target validation is deferred and runs exactly once even
//! under concurrent first access: the initiating thread flips an atomic
//! tri-state from `NotStarted` to `InProgress`, validates, publishes the
//! diagnostics and flips to `Complete`; every other thread waits on a
//! condition variable.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};

use rustc_hash::FxHashMap;

use opal_core::{Diagnostic, DiagnosticBag, Span};
use opal_registry::{Symbol, SymbolOrigin, SymbolTable};
use opal_syntax::{TypeExpr, UsingDirective, UsingKind};

const NOT_STARTED: u8 = 0;
const IN_PROGRESS: u8 = 1;
const COMPLETE: u8 = 2;

/// One `using Namespace;` entry.
#[derive(Debug)]
pub struct UsingEntry {
    /// The imported namespace's qualified name.
    pub path: String,
    pub span: Span,
    used: AtomicBool,
}

impl UsingEntry {
    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::Relaxed)
    }
}

/// One `using static Type;` entry.
#[derive(Debug)]
pub struct StaticEntry {
    /// The imported type's qualified name.
    pub path: String,
    pub span: Span,
    used: AtomicBool,
}

impl StaticEntry {
    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct AliasEntry {
    /// Target path; extern aliases carry their own name as the target
    /// namespace, resolved externally.
    target: String,
    span: Span,
}

/// The imports of one lexical scope.
#[derive(Debug)]
pub struct Imports {
    usings: Vec<UsingEntry>,
    statics: Vec<StaticEntry>,
    /// Using-aliases and extern aliases occupy the same namespace.
    aliases: FxHashMap<String, AliasEntry>,
    state: AtomicU8,
    validation: Mutex<Option<Vec<Diagnostic>>>,
    completed: Condvar,
}

impl Imports {
    /// A scope with no directives.
    pub fn empty() -> Imports {
        Imports {
            usings: Vec::new(),
            statics: Vec::new(),
            aliases: FxHashMap::default(),
            state: AtomicU8::new(NOT_STARTED),
            validation: Mutex::new(None),
            completed: Condvar::new(),
        }
    }

    /// Build the table from a scope's directives. Duplicate detection runs
    /// here; alias-target validation is deferred to
    /// [`ensure_validated`](Self::ensure_validated).
    pub fn build(directives: &[UsingDirective<'_>], bag: &mut DiagnosticBag) -> Imports {
        let mut imports = Imports::empty();

        // Extern aliases first: alias targets may name them.
        for directive in directives {
            if let UsingKind::ExternAlias { name } = directive.kind {
                imports.insert_alias(name, name.to_string(), directive.span, bag);
            }
        }

        for directive in directives {
            match directive.kind {
                UsingKind::ExternAlias { .. } => {}
                UsingKind::Namespace => {
                    let Some(path) = flatten_target(directive.target) else {
                        push_bad_target(bag, directive);
                        continue;
                    };
                    if imports.usings.iter().any(|u| u.path == path) {
                        bag.push(Diagnostic::DuplicateUsing {
                            name: path.clone(),
                            span: directive.span,
                        });
                    }
                    // The duplicate stays in the sequence; only the warning
                    // marks it.
                    imports.usings.push(UsingEntry {
                        path,
                        span: directive.span,
                        used: AtomicBool::new(false),
                    });
                }
                UsingKind::Static => {
                    let Some(path) = flatten_target(directive.target) else {
                        push_bad_target(bag, directive);
                        continue;
                    };
                    imports.statics.push(StaticEntry {
                        path,
                        span: directive.span,
                        used: AtomicBool::new(false),
                    });
                }
                UsingKind::Alias { name } => {
                    let Some(target) = flatten_target(directive.target) else {
                        push_bad_target(bag, directive);
                        continue;
                    };
                    imports.insert_alias(name, target, directive.span, bag);
                }
            }
        }
        imports
    }

    fn insert_alias(&mut self, name: &str, target: String, span: Span, bag: &mut DiagnosticBag) {
        if self.aliases.contains_key(name) {
            bag.push(Diagnostic::DuplicateAlias {
                name: name.to_string(),
                span,
            });
            return;
        }
        self.aliases.insert(name.to_string(), AliasEntry { target, span });
    }

    /// The `using` entries, in directive order (duplicates included).
    pub fn usings(&self) -> &[UsingEntry] {
        &self.usings
    }

    /// The `using static` entries, in directive order.
    pub fn statics(&self) -> &[StaticEntry] {
        &self.statics
    }

    /// Validate alias targets, exactly once across all threads, and return
    /// the validation diagnostics.
    ///
    /// `cancelled` is observed only before a validation phase starts; a
    /// validation already in progress always runs to completion.
    pub fn ensure_validated(&self, table: &SymbolTable, cancelled: &AtomicBool) -> Vec<Diagnostic> {
        if self.state.load(Ordering::Acquire) == NOT_STARTED && cancelled.load(Ordering::Relaxed) {
            return Vec::new();
        }
        match self.state.compare_exchange(
            NOT_STARTED,
            IN_PROGRESS,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                let diagnostics = self.validate(table);
                let mut slot = lock_ignoring_poison(&self.validation);
                *slot = Some(diagnostics.clone());
                self.state.store(COMPLETE, Ordering::Release);
                drop(slot);
                self.completed.notify_all();
                diagnostics
            }
            Err(_) => self.wait_for_completion(),
        }
    }

    fn validate(&self, table: &SymbolTable) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for entry in self.aliases.values() {
            if resolve_path(table, &entry.target).is_none() {
                diagnostics.push(Diagnostic::BadAliasTarget {
                    name: entry.target.clone(),
                    span: entry.span,
                });
            }
        }
        diagnostics
    }

    fn wait_for_completion(&self) -> Vec<Diagnostic> {
        let mut slot = lock_ignoring_poison(&self.validation);
        while self.state.load(Ordering::Acquire) != COMPLETE {
            slot = match self.completed.wait(slot) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
        slot.clone().unwrap_or_default()
    }

    /// Whether validation has completed (by any thread).
    pub fn is_validated(&self) -> bool {
        self.state.load(Ordering::Acquire) == COMPLETE
    }

    /// Find every symbol the imports make visible under `name`.
    ///
    /// Aliases (using and extern merged) are probed first; when one matches,
    /// nothing else is consulted. Otherwise every imported namespace and
    /// static type contributes members. Contributing directives are marked
    /// used.
    pub fn lookup_symbol(
        &self,
        table: &SymbolTable,
        name: &str,
        arity: usize,
    ) -> Vec<(Symbol, SymbolOrigin)> {
        if arity == 0 {
            if let Some(entry) = self.aliases.get(name) {
                if let Some(symbol) = resolve_path(table, &entry.target) {
                    let origin = symbol_origin(table, &symbol);
                    return vec![(symbol, origin)];
                }
                return Vec::new();
            }
        }

        let mut matches = Vec::new();
        for entry in &self.usings {
            if let Some(symbol) = table.namespace_member(&entry.path, name, arity) {
                entry.used.store(true, Ordering::Relaxed);
                let origin = symbol_origin(table, &symbol);
                if !matches.iter().any(|(existing, _)| *existing == symbol) {
                    matches.push((symbol, origin));
                }
            }
        }
        // Using-static imports contribute nested types only; other members
        // are not in the type model.
        for entry in &self.statics {
            let qualified = format!("{}.{name}", entry.path);
            if let Some(def) = table.type_by_qualified_name(&qualified) {
                if def.arity == arity {
                    entry.used.store(true, Ordering::Relaxed);
                    let symbol = Symbol::Type(def.hash);
                    if !matches.iter().any(|(existing, _)| *existing == symbol) {
                        matches.push((symbol, def.origin));
                    }
                }
            }
        }
        matches
    }

    /// The alias target symbol for `name`, if `name` is an alias, with the
    /// obsolete state surfaced at the unwrap point by the caller.
    pub fn alias_target(&self, table: &SymbolTable, name: &str) -> Option<Symbol> {
        self.aliases
            .get(name)
            .and_then(|entry| resolve_path(table, &entry.target))
    }
}

fn lock_ignoring_poison<'a, T>(mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Flatten a directive target into a dotted path. Only simple and qualified
/// names are valid targets.
fn flatten_target(target: Option<TypeExpr<'_>>) -> Option<String> {
    fn flatten(expr: &TypeExpr<'_>) -> Option<String> {
        match expr {
            TypeExpr::Named { name, .. } => Some((*name).to_string()),
            TypeExpr::Qualified { qualifier, name, .. } => {
                Some(format!("{}.{name}", flatten(qualifier)?))
            }
            _ => None,
        }
    }
    flatten(&target?)
}

fn push_bad_target(bag: &mut DiagnosticBag, directive: &UsingDirective<'_>) {
    let name = directive
        .target
        .map(|t| t.simple_name().to_string())
        .unwrap_or_default();
    bag.push(Diagnostic::BadAliasTarget {
        name,
        span: directive.span,
    });
}

/// Resolve a dotted path to a namespace or type.
fn resolve_path(table: &SymbolTable, path: &str) -> Option<Symbol> {
    if table.is_namespace(path) {
        return Some(Symbol::Namespace(path.to_string()));
    }
    if let Some(def) = table.type_by_qualified_name(path) {
        return Some(Symbol::Type(def.hash));
    }
    // A bare simple name may still denote a type in the global namespace.
    table.lookup(path, 0).single().cloned()
}

fn symbol_origin(table: &SymbolTable, symbol: &Symbol) -> SymbolOrigin {
    match symbol {
        Symbol::Type(hash) => table
            .type_def(*hash)
            .map(|def| def.origin)
            .unwrap_or_default(),
        Symbol::Namespace(_) => SymbolOrigin::CurrentModule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use opal_core::TypeHash;
    use opal_registry::{TypeDef, TypeKind};

    fn span() -> Span {
        Span::point(1, 1)
    }

    fn named(name: &'static str) -> TypeExpr<'static> {
        TypeExpr::Named { name, span: span() }
    }

    fn using(target: TypeExpr<'static>) -> UsingDirective<'static> {
        UsingDirective {
            kind: UsingKind::Namespace,
            target: Some(target),
            span: span(),
        }
    }

    fn table_with_geo() -> SymbolTable {
        let mut table = SymbolTable::with_primitives();
        table
            .register_type(TypeDef {
                hash: TypeHash::from_name("Geo.Point"),
                name: "Geo.Point".to_string(),
                kind: TypeKind::Struct,
                arity: 0,
                operators: Vec::new(),
                events: Vec::new(),
                implements: Vec::new(),
                is_ref_struct: false,
                origin: SymbolOrigin::CurrentModule,
                obsolete: None,
            })
            .expect("register");
        table
    }

    #[test]
    fn duplicate_using_warns_but_keeps_both() {
        let mut bag = DiagnosticBag::new();
        let imports = Imports::build(&[using(named("Geo")), using(named("Geo"))], &mut bag);
        assert_eq!(bag.codes(), vec!["WRN_DuplicateUsing"]);
        assert_eq!(imports.usings().len(), 2);

        // Lookup behaves exactly as with a single using.
        let table = table_with_geo();
        let matches = imports.lookup_symbol(&table, "Point", 0);
        assert_eq!(
            matches,
            vec![(
                Symbol::Type(TypeHash::from_name("Geo.Point")),
                SymbolOrigin::CurrentModule
            )]
        );
    }

    #[test]
    fn duplicate_alias_is_an_error() {
        let mut bag = DiagnosticBag::new();
        let directives = [
            UsingDirective {
                kind: UsingKind::Alias { name: "P" },
                target: Some(named("Geo")),
                span: span(),
            },
            UsingDirective {
                kind: UsingKind::Alias { name: "P" },
                target: Some(named("Geo")),
                span: span(),
            },
        ];
        let _ = Imports::build(&directives, &mut bag);
        assert_eq!(bag.codes(), vec!["ERR_DuplicateAlias"]);
    }

    #[test]
    fn extern_alias_collides_with_using_alias() {
        let mut bag = DiagnosticBag::new();
        let directives = [
            UsingDirective {
                kind: UsingKind::Alias { name: "Lib" },
                target: Some(named("Geo")),
                span: span(),
            },
            UsingDirective {
                kind: UsingKind::ExternAlias { name: "Lib" },
                target: None,
                span: span(),
            },
        ];
        // Extern aliases are installed first, so the using-alias is the
        // duplicate regardless of directive order.
        let _ = Imports::build(&directives, &mut bag);
        assert_eq!(bag.codes(), vec!["ERR_DuplicateAlias"]);
    }

    #[test]
    fn lookup_marks_directives_used() {
        let mut bag = DiagnosticBag::new();
        let imports = Imports::build(&[using(named("Geo"))], &mut bag);
        let table = table_with_geo();
        assert!(!imports.usings()[0].is_used());
        let _ = imports.lookup_symbol(&table, "Point", 0);
        assert!(imports.usings()[0].is_used());
    }

    #[test]
    fn validation_runs_exactly_once_across_threads() {
        let mut bag = DiagnosticBag::new();
        let directives = [UsingDirective {
            kind: UsingKind::Alias { name: "Bad" },
            target: Some(named("NoSuchNamespace")),
            span: span(),
        }];
        let imports = Arc::new(Imports::build(&directives, &mut bag));
        let table = Arc::new(table_with_geo());
        let cancelled = Arc::new(AtomicBool::new(false));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let imports = Arc::clone(&imports);
                let table = Arc::clone(&table);
                let cancelled = Arc::clone(&cancelled);
                std::thread::spawn(move || imports.ensure_validated(&table, &cancelled))
            })
            .collect();
        for handle in handles {
            let diags = handle.join().expect("thread");
            // Every caller observes the same single diagnostic.
            assert_eq!(diags.len(), 1);
            assert_eq!(diags[0].code(), "ERR_BadAliasTarget");
        }
        assert!(imports.is_validated());
    }

    #[test]
    fn cancellation_before_start_skips_validation() {
        let mut bag = DiagnosticBag::new();
        let imports = Imports::build(&[], &mut bag);
        let table = SymbolTable::with_primitives();
        let cancelled = AtomicBool::new(true);
        let diags = imports.ensure_validated(&table, &cancelled);
        assert!(diags.is_empty());
        assert!(!imports.is_validated());
    }
}
