//! The binding context.
//!
//! A [`BinderContext`] carries everything a binding call needs: the shared
//! symbol table, the conversion oracle, binder flags (checked region etc.),
//! the language version, the lexical extension-scope chain, the scope's
//! imports and the locals in scope. Contexts are cheap to construct per
//! binding request; the table and oracle are shared across threads.

use rustc_hash::FxHashMap;

use opal_core::{ConstantValue, LanguageVersion, Ty, TypeHash};
use opal_registry::{ExtensionScope, SymbolTable};

use crate::conversion::ConversionOracle;
use crate::names::imports::Imports;

bitflags::bitflags! {
    /// Flags describing the syntactic context of a binding call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BinderFlags: u8 {
        /// Inside a `checked { ... }` region or checked compilation.
        const CHECKED_REGION = 1 << 0;
        /// Binding an attribute argument (constants only).
        const ATTRIBUTE_ARGUMENT = 1 << 1;
        /// Declaration context: generic constraint checks run separately.
        const SUPPRESS_CONSTRAINT_CHECKS = 1 << 2;
        /// Compatibility: do not report corlib duplicates of source symbols.
        const IGNORE_CORLIB_DUPLICATES = 1 << 3;
    }
}

/// What a local name denotes.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalKind {
    /// An ordinary variable.
    Variable { assignable: bool },
    /// A local constant.
    Constant(ConstantValue),
    /// An event on the enclosing type, reachable by simple name.
    Event { owner: TypeHash },
}

/// A local symbol visible to expression binding.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSymbol {
    pub ty: Ty,
    pub kind: LocalKind,
}

/// The lexically-scoped binding context.
pub struct BinderContext<'a> {
    pub table: &'a SymbolTable,
    pub oracle: &'a dyn ConversionOracle,
    pub flags: BinderFlags,
    pub version: LanguageVersion,
    /// Extension scopes, innermost first.
    pub extension_scopes: Vec<ExtensionScope>,
    /// The scope's imports, when binding inside a compilation unit.
    pub imports: Option<&'a Imports>,
    locals: FxHashMap<String, LocalSymbol>,
}

impl<'a> BinderContext<'a> {
    pub fn new(table: &'a SymbolTable, oracle: &'a dyn ConversionOracle) -> Self {
        BinderContext {
            table,
            oracle,
            flags: BinderFlags::empty(),
            version: LanguageVersion::Latest,
            extension_scopes: Vec::new(),
            imports: None,
            locals: FxHashMap::default(),
        }
    }

    pub fn with_flags(mut self, flags: BinderFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_version(mut self, version: LanguageVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_imports(mut self, imports: &'a Imports) -> Self {
        self.imports = Some(imports);
        self
    }

    /// Whether arithmetic binds in checked mode.
    pub fn is_checked(&self) -> bool {
        self.flags.contains(BinderFlags::CHECKED_REGION)
    }

    /// Bring a local into scope, shadowing any previous one with the name.
    pub fn declare_local(&mut self, name: impl Into<String>, symbol: LocalSymbol) {
        self.locals.insert(name.into(), symbol);
    }

    /// Convenience for declaring an assignable variable.
    pub fn declare_variable(&mut self, name: impl Into<String>, ty: Ty) {
        self.declare_local(
            name,
            LocalSymbol {
                ty,
                kind: LocalKind::Variable { assignable: true },
            },
        );
    }

    /// Convenience for declaring a local constant.
    pub fn declare_constant(&mut self, name: impl Into<String>, ty: Ty, value: ConstantValue) {
        self.declare_local(
            name,
            LocalSymbol {
                ty,
                kind: LocalKind::Constant(value),
            },
        );
    }

    /// Look up a local by name.
    pub fn local(&self, name: &str) -> Option<&LocalSymbol> {
        self.locals.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::StandardConversions;
    use opal_core::well_known;

    #[test]
    fn locals_shadow() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let mut ctx = BinderContext::new(&table, &oracle);
        ctx.declare_variable("x", Ty::simple(well_known::INT32));
        ctx.declare_variable("x", Ty::simple(well_known::STRING));
        assert_eq!(
            ctx.local("x").map(|l| l.ty),
            Some(Ty::simple(well_known::STRING))
        );
        assert!(ctx.local("y").is_none());
    }

    #[test]
    fn checked_flag() {
        let table = SymbolTable::with_primitives();
        let oracle = StandardConversions::new(&table);
        let ctx =
            BinderContext::new(&table, &oracle).with_flags(BinderFlags::CHECKED_REGION);
        assert!(ctx.is_checked());
    }
}
