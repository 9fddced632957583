//! The symbol table.
//!
//! Storage is keyed by [`TypeHash`] with secondary indices for simple-name
//! lookup and namespace membership. Registration happens up front; the binder
//! only reads, so `&SymbolTable` is freely shared.

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use opal_core::{PrimitiveKind, Ty, TypeHash, TypeModifier};

use crate::defs::{EventDef, OperatorDef, SymbolOrigin, TypeDef, TypeKind};
use crate::lookup::{arbitrate, LookupResult, Symbol};

/// Errors from symbol registration. Binding itself never produces these;
/// they surface while a driver populates the table.
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("type '{name}' is already registered")]
    DuplicateType { name: String },

    #[error("type '{name}' is not registered")]
    UnknownType { name: String },

    #[error("no type with hash {hash:?} is registered")]
    UnknownHash { hash: TypeHash },
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    /// Primary storage, by identity.
    types: FxHashMap<TypeHash, TypeDef>,
    /// Qualified name to identity.
    qualified_names: FxHashMap<String, TypeHash>,
    /// Simple name to every type carrying it.
    simple_names: FxHashMap<String, Vec<TypeHash>>,
    /// Every known namespace, by qualified name.
    namespaces: FxHashSet<String>,
    /// Types directly contained in each namespace.
    namespace_members: FxHashMap<String, Vec<TypeHash>>,
    /// Names that exist but denote neither a type nor a namespace.
    non_type_names: FxHashSet<String>,
}

impl SymbolTable {
    /// An empty table with no types at all.
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// A table seeded with every built-in primitive.
    pub fn with_primitives() -> Self {
        let mut table = SymbolTable::new();
        for raw in 0..=u8::from(PrimitiveKind::Dynamic) {
            let Ok(kind) = PrimitiveKind::try_from(raw) else {
                continue;
            };
            let def = TypeDef {
                hash: kind.type_hash(),
                name: kind.name().to_string(),
                kind: TypeKind::Primitive(kind),
                arity: 0,
                operators: Vec::new(),
                events: Vec::new(),
                implements: Vec::new(),
                is_ref_struct: false,
                origin: SymbolOrigin::CoreLibrary,
                obsolete: None,
            };
            // Seeding cannot collide; the sentinel hashes are distinct.
            let _ = table.register_type(def);
        }
        table
    }

    // ---- registration -------------------------------------------------

    /// Register a type. The hash and qualified name must both be fresh.
    pub fn register_type(&mut self, def: TypeDef) -> Result<TypeHash, RegistryError> {
        if self.types.contains_key(&def.hash) || self.qualified_names.contains_key(&def.name) {
            return Err(RegistryError::DuplicateType {
                name: def.name.clone(),
            });
        }
        let hash = def.hash;
        self.qualified_names.insert(def.name.clone(), hash);
        self.simple_names
            .entry(def.simple_name().to_string())
            .or_default()
            .push(hash);
        let namespace = def.namespace().to_string();
        if !namespace.is_empty() {
            self.register_namespace(&namespace);
            self.namespace_members
                .entry(namespace)
                .or_default()
                .push(hash);
        }
        self.types.insert(hash, def);
        Ok(hash)
    }

    /// Register a namespace and all of its ancestors.
    pub fn register_namespace(&mut self, name: &str) {
        let mut end = name.len();
        loop {
            self.namespaces.insert(name[..end].to_string());
            match name[..end].rfind('.') {
                Some(idx) => end = idx,
                None => break,
            }
        }
    }

    /// Register an array type over an element, returning its identity.
    /// Idempotent: re-registering the same element yields the same hash.
    pub fn register_array(&mut self, element: TypeHash) -> Result<TypeHash, RegistryError> {
        let hash = element.array_of();
        if self.types.contains_key(&hash) {
            return Ok(hash);
        }
        let element_name = self
            .types
            .get(&element)
            .map(|def| def.name.clone())
            .ok_or(RegistryError::UnknownHash { hash: element })?;
        let def = TypeDef {
            hash,
            name: format!("{element_name}[]"),
            kind: TypeKind::Array { element },
            arity: 0,
            operators: Vec::new(),
            events: Vec::new(),
            implements: Vec::new(),
            is_ref_struct: false,
            origin: SymbolOrigin::CoreLibrary,
            obsolete: None,
        };
        self.types.insert(hash, def);
        Ok(hash)
    }

    /// Attach a user-defined operator to an already-registered type.
    pub fn register_operator(
        &mut self,
        owner: TypeHash,
        op: OperatorDef,
    ) -> Result<(), RegistryError> {
        let def = self
            .types
            .get_mut(&owner)
            .ok_or(RegistryError::UnknownHash { hash: owner })?;
        def.operators.push(op);
        Ok(())
    }

    /// Attach an event to an already-registered type.
    pub fn register_event(&mut self, owner: TypeHash, event: EventDef) -> Result<(), RegistryError> {
        let def = self
            .types
            .get_mut(&owner)
            .ok_or(RegistryError::UnknownHash { hash: owner })?;
        def.events.push(event);
        Ok(())
    }

    /// Record a name that denotes a non-type member (method, field, local
    /// constant). Lookup reports these as "not a type or namespace" rather
    /// than "not found".
    pub fn register_non_type_name(&mut self, name: &str) {
        self.non_type_names.insert(name.to_string());
    }

    // ---- queries ------------------------------------------------------

    pub fn type_def(&self, hash: TypeHash) -> Option<&TypeDef> {
        self.types.get(&hash)
    }

    /// Resolve a fully-qualified name.
    pub fn type_by_qualified_name(&self, name: &str) -> Option<&TypeDef> {
        self.qualified_names
            .get(name)
            .and_then(|hash| self.types.get(hash))
    }

    pub fn is_namespace(&self, name: &str) -> bool {
        self.namespaces.contains(name)
    }

    /// Types directly contained in a namespace.
    pub fn namespace_members(&self, namespace: &str) -> &[TypeHash] {
        self.namespace_members
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Simple-name lookup with arity filtering and origin arbitration.
    pub fn lookup(&self, name: &str, arity: usize) -> LookupResult {
        let mut matches: Vec<(Symbol, SymbolOrigin)> = Vec::new();
        if let Some(candidates) = self.simple_names.get(name) {
            for &hash in candidates {
                if let Some(def) = self.types.get(&hash) {
                    if def.arity == arity {
                        matches.push((Symbol::Type(hash), def.origin));
                    }
                }
            }
        }
        if arity == 0 && self.namespaces.contains(name) {
            matches.push((
                Symbol::Namespace(name.to_string()),
                SymbolOrigin::CurrentModule,
            ));
        }
        if matches.is_empty() && self.non_type_names.contains(name) {
            return LookupResult::not_a_type_or_namespace();
        }
        arbitrate(matches)
    }

    /// Resolve a member of a namespace by simple name and arity.
    pub fn namespace_member(&self, namespace: &str, name: &str, arity: usize) -> Option<Symbol> {
        let qualified = format!("{namespace}.{name}");
        if arity == 0 && self.namespaces.contains(&qualified) {
            return Some(Symbol::Namespace(qualified));
        }
        for &hash in self.namespace_members(namespace) {
            if let Some(def) = self.types.get(&hash) {
                if def.simple_name() == name && def.arity == arity {
                    return Some(Symbol::Type(hash));
                }
            }
        }
        None
    }

    /// Operators with a given metadata name declared directly on a type.
    pub fn operators_named(&self, owner: TypeHash, name: &str) -> Vec<&OperatorDef> {
        self.types
            .get(&owner)
            .map(|def| def.operators.iter().filter(|op| op.name == name).collect())
            .unwrap_or_default()
    }

    /// The type and its base classes, derived-most first.
    pub fn base_chain(&self, start: TypeHash) -> Vec<TypeHash> {
        let mut chain = Vec::new();
        let mut current = Some(start);
        while let Some(hash) = current {
            if chain.contains(&hash) {
                break; // malformed cycle; stop rather than loop
            }
            chain.push(hash);
            current = match self.types.get(&hash).map(|def| &def.kind) {
                Some(TypeKind::Class { base }) => *base,
                _ => None,
            };
        }
        chain
    }

    /// The underlying integral kind of an enum type, if `ty` is an enum.
    pub fn enum_underlying(&self, ty: Ty) -> Option<PrimitiveKind> {
        if ty.modifier != TypeModifier::None {
            return None;
        }
        match self.types.get(&ty.hash).map(|def| &def.kind) {
            Some(TypeKind::Enum { underlying }) => Some(*underlying),
            _ => None,
        }
    }

    /// Whether the full type (with modifier) is known to be a reference type.
    pub fn is_reference_type(&self, ty: Ty) -> bool {
        match ty.modifier {
            TypeModifier::Pointer => false,
            TypeModifier::Nullable => false,
            TypeModifier::None => self
                .types
                .get(&ty.hash)
                .map(TypeDef::is_reference_type)
                .unwrap_or(false),
        }
    }

    /// Whether the full type (with modifier) is known to be a value type.
    pub fn is_value_type(&self, ty: Ty) -> bool {
        match ty.modifier {
            TypeModifier::Pointer => true,
            TypeModifier::Nullable => true,
            TypeModifier::None => self
                .types
                .get(&ty.hash)
                .map(TypeDef::is_value_type)
                .unwrap_or(false),
        }
    }

    /// Whether the type is a ref struct.
    pub fn is_ref_struct(&self, ty: Ty) -> bool {
        ty.modifier == TypeModifier::None
            && self
                .types
                .get(&ty.hash)
                .map(|def| def.is_ref_struct)
                .unwrap_or(false)
    }

    /// A readable rendering of a type for diagnostics.
    pub fn display(&self, ty: Ty) -> String {
        let base = self
            .types
            .get(&ty.hash)
            .map(|def| def.name.clone())
            .unwrap_or_else(|| {
                if ty.hash == opal_core::well_known::ERROR {
                    "<error>".to_string()
                } else {
                    format!("<unknown:{:#x}>", ty.hash.0)
                }
            });
        match ty.modifier {
            TypeModifier::None => base,
            TypeModifier::Nullable => format!("{base}?"),
            TypeModifier::Pointer => format!("{base}*"),
        }
    }
}
