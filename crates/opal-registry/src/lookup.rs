//! Simple-name lookup over the symbol table.

use opal_core::TypeHash;

use crate::defs::SymbolOrigin;

/// A symbol found by name lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    /// A type, by identity.
    Type(TypeHash),
    /// A namespace, by qualified name.
    Namespace(String),
}

impl Symbol {
    /// The type hash, if this is a type symbol.
    pub fn as_type(&self) -> Option<TypeHash> {
        match self {
            Symbol::Type(hash) => Some(*hash),
            Symbol::Namespace(_) => None,
        }
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self, Symbol::Namespace(_))
    }
}

/// How a lookup concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupResultKind {
    /// Nothing with that name.
    Empty,
    /// Exactly one symbol survives arbitration.
    Viable,
    /// The name exists but is not a type or namespace (a method, field, etc.).
    NotATypeOrNamespace,
    /// Multiple symbols at the same origin rank.
    Ambiguous,
}

/// The outcome of a simple-name lookup, with every symbol that matched.
///
/// `symbols` holds all matches even in the ambiguous case, so the caller can
/// report the contenders. In the viable case the single winner is first.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    pub kind: LookupResultKind,
    pub symbols: Vec<(Symbol, SymbolOrigin)>,
}

impl LookupResult {
    pub fn empty() -> Self {
        LookupResult {
            kind: LookupResultKind::Empty,
            symbols: Vec::new(),
        }
    }

    pub fn viable(symbol: Symbol, origin: SymbolOrigin) -> Self {
        LookupResult {
            kind: LookupResultKind::Viable,
            symbols: vec![(symbol, origin)],
        }
    }

    pub fn not_a_type_or_namespace() -> Self {
        LookupResult {
            kind: LookupResultKind::NotATypeOrNamespace,
            symbols: Vec::new(),
        }
    }

    pub fn ambiguous(symbols: Vec<(Symbol, SymbolOrigin)>) -> Self {
        LookupResult {
            kind: LookupResultKind::Ambiguous,
            symbols,
        }
    }

    /// The single winning symbol, when viable.
    pub fn single(&self) -> Option<&Symbol> {
        match self.kind {
            LookupResultKind::Viable => self.symbols.first().map(|(sym, _)| sym),
            _ => None,
        }
    }

    pub fn is_viable(&self) -> bool {
        self.kind == LookupResultKind::Viable
    }
}

/// Collapse a set of same-name matches into a result by origin rank.
///
/// The lowest rank wins outright; two or more matches at the lowest rank are
/// ambiguous. The caller has already filtered by arity and accessibility.
pub fn arbitrate(matches: Vec<(Symbol, SymbolOrigin)>) -> LookupResult {
    if matches.is_empty() {
        return LookupResult::empty();
    }
    let best_rank = matches
        .iter()
        .map(|(_, origin)| origin.rank())
        .min()
        .unwrap_or(u8::MAX);
    let mut at_best: Vec<(Symbol, SymbolOrigin)> = matches
        .into_iter()
        .filter(|(_, origin)| origin.rank() == best_rank)
        .collect();
    if at_best.len() == 1 {
        match at_best.pop() {
            Some((symbol, origin)) => LookupResult::viable(symbol, origin),
            None => LookupResult::empty(),
        }
    } else {
        LookupResult::ambiguous(at_best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opal_core::well_known;

    #[test]
    fn source_beats_corlib() {
        let result = arbitrate(vec![
            (Symbol::Type(well_known::INT32), SymbolOrigin::CoreLibrary),
            (
                Symbol::Type(TypeHash::from_name("My.Int32")),
                SymbolOrigin::CurrentModule,
            ),
        ]);
        assert!(result.is_viable());
        assert_eq!(
            result.single(),
            Some(&Symbol::Type(TypeHash::from_name("My.Int32")))
        );
    }

    #[test]
    fn equal_rank_is_ambiguous() {
        let result = arbitrate(vec![
            (
                Symbol::Type(TypeHash::from_name("A.Thing")),
                SymbolOrigin::ReferencedAssembly,
            ),
            (
                Symbol::Type(TypeHash::from_name("B.Thing")),
                SymbolOrigin::ReferencedAssembly,
            ),
        ]);
        assert_eq!(result.kind, LookupResultKind::Ambiguous);
        assert_eq!(result.symbols.len(), 2);
    }

    #[test]
    fn no_matches_is_empty() {
        assert_eq!(arbitrate(Vec::new()).kind, LookupResultKind::Empty);
    }
}
