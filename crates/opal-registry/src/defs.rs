//! Symbol definitions stored in the table.

use opal_core::{PrimitiveKind, Ty, TypeHash};

/// Where a symbol came from, for ambiguity arbitration.
///
/// When name lookup finds multiple viable symbols, the binder prefers the
/// origin with the lowest rank; equal ranks are a real ambiguity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SymbolOrigin {
    /// Declared in the module currently being compiled.
    #[default]
    CurrentModule,
    /// Declared in another module of the same assembly.
    SameAssembly,
    /// Imported from a referenced assembly.
    ReferencedAssembly,
    /// Imported from the core library.
    CoreLibrary,
}

impl SymbolOrigin {
    /// Preference rank; lower wins.
    pub const fn rank(self) -> u8 {
        match self {
            SymbolOrigin::CurrentModule => 0,
            SymbolOrigin::SameAssembly => 1,
            SymbolOrigin::ReferencedAssembly => 2,
            SymbolOrigin::CoreLibrary => 3,
        }
    }

    /// Whether the symbol comes from source (this assembly) rather than
    /// imported metadata.
    pub const fn is_source(self) -> bool {
        matches!(
            self,
            SymbolOrigin::CurrentModule | SymbolOrigin::SameAssembly
        )
    }
}

/// Constraints on a type parameter relevant to conversion classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeParamConstraint {
    /// Unconstrained.
    #[default]
    None,
    /// `where T : class`.
    ReferenceType,
    /// `where T : struct`.
    ValueType,
}

/// The structural kind of a registered type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// A built-in primitive.
    Primitive(PrimitiveKind),
    /// A class with an optional base class (absent only for the root).
    Class { base: Option<TypeHash> },
    /// A user-defined value type.
    Struct,
    /// An enum over an integral underlying type.
    Enum { underlying: PrimitiveKind },
    /// An interface.
    Interface,
    /// A delegate type.
    Delegate,
    /// A generic type parameter.
    TypeParameter { constraint: TypeParamConstraint },
    /// A single-dimensional array.
    Array { element: TypeHash },
}

/// Whether a user-defined operator is a static declaration or an
/// instance-receiver declaration (extension-block instance form or an
/// in-place compound operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorForm {
    Static,
    Instance,
}

/// One user-defined operator declaration.
///
/// `params` excludes the receiver for instance forms, so a binary instance
/// operator has one entry and an instance increment operator has none.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorDef {
    /// Identity of the backing method.
    pub method: TypeHash,
    /// Well-known metadata name (see [`crate::operator_names`]).
    pub name: &'static str,
    /// Parameter types, in order.
    pub params: Vec<Ty>,
    /// Declared return type.
    pub return_type: Ty,
    /// Static or instance form.
    pub form: OperatorForm,
    /// The type that declares the operator.
    pub declaring: TypeHash,
    /// Obsolete message, if the operator is marked obsolete.
    pub obsolete: Option<String>,
}

impl OperatorDef {
    /// Whether the metadata name is a checked variant.
    pub fn is_checked_name(&self) -> bool {
        self.name.starts_with("op_Checked")
    }
}

/// An event member, for `+=`/`-=` event-assignment binding.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDef {
    pub name: String,
    /// The delegate type of the event.
    pub delegate_type: TypeHash,
    /// Whether an accessible `add` accessor exists.
    pub has_add: bool,
    /// Whether an accessible `remove` accessor exists.
    pub has_remove: bool,
}

/// A registered type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub hash: TypeHash,
    /// Qualified name, e.g. `Geo.Point`.
    pub name: String,
    pub kind: TypeKind,
    /// Generic arity (0 for non-generic types).
    pub arity: usize,
    /// User-defined operators declared directly on this type.
    pub operators: Vec<OperatorDef>,
    /// Events declared directly on this type.
    pub events: Vec<EventDef>,
    /// Implemented interfaces.
    pub implements: Vec<TypeHash>,
    /// Whether this is a ref struct (never boxes, never converts to object).
    pub is_ref_struct: bool,
    pub origin: SymbolOrigin,
    /// Obsolete message, if the type is marked obsolete.
    pub obsolete: Option<String>,
}

impl TypeDef {
    /// The simple (unqualified) name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// The containing namespace, or `""` for the global namespace.
    pub fn namespace(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }

    /// Whether the type is a value type (struct, enum, primitive non-reference).
    pub fn is_value_type(&self) -> bool {
        match &self.kind {
            TypeKind::Struct | TypeKind::Enum { .. } => true,
            TypeKind::Primitive(kind) => !matches!(
                kind,
                PrimitiveKind::String | PrimitiveKind::Object | PrimitiveKind::Dynamic
            ),
            TypeKind::TypeParameter { constraint } => {
                matches!(constraint, TypeParamConstraint::ValueType)
            }
            _ => false,
        }
    }

    /// Whether the type is known to be a reference type.
    pub fn is_reference_type(&self) -> bool {
        match &self.kind {
            TypeKind::Class { .. }
            | TypeKind::Interface
            | TypeKind::Delegate
            | TypeKind::Array { .. } => true,
            TypeKind::Primitive(kind) => matches!(
                kind,
                PrimitiveKind::String | PrimitiveKind::Object | PrimitiveKind::Dynamic
            ),
            TypeKind::TypeParameter { constraint } => {
                matches!(constraint, TypeParamConstraint::ReferenceType)
            }
            _ => false,
        }
    }

    /// Whether the type is an open type (type parameter, or generic).
    pub fn is_open(&self) -> bool {
        matches!(self.kind, TypeKind::TypeParameter { .. }) || self.arity > 0
    }
}

/// An extension block: operators attached to a type from outside it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionDef {
    /// The extended (receiver) type.
    pub extended: TypeHash,
    /// Operators declared in the block.
    pub operators: Vec<OperatorDef>,
}

/// One lexical scope's worth of extension blocks.
///
/// The binder walks a chain of these innermost-first and stops at the first
/// scope that produces an applicable candidate (lexical shadowing; scopes are
/// never merged).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionScope {
    pub extensions: Vec<ExtensionDef>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use opal_core::well_known;

    #[test]
    fn origin_rank_ordering() {
        assert!(SymbolOrigin::CurrentModule.rank() < SymbolOrigin::SameAssembly.rank());
        assert!(SymbolOrigin::SameAssembly.rank() < SymbolOrigin::ReferencedAssembly.rank());
        assert!(SymbolOrigin::ReferencedAssembly.rank() < SymbolOrigin::CoreLibrary.rank());
        assert!(SymbolOrigin::SameAssembly.is_source());
        assert!(!SymbolOrigin::CoreLibrary.is_source());
    }

    #[test]
    fn qualified_name_parts() {
        let def = TypeDef {
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
        };
        assert_eq!(def.simple_name(), "Point");
        assert_eq!(def.namespace(), "Geo");
        assert!(def.is_value_type());
    }

    #[test]
    fn checked_name_detection() {
        let op = OperatorDef {
            method: TypeHash::from_operator(well_known::INT32, "op_CheckedAddition", &[]),
            name: "op_CheckedAddition",
            params: Vec::new(),
            return_type: Ty::simple(well_known::INT32),
            form: OperatorForm::Static,
            declaring: well_known::INT32,
            obsolete: None,
        };
        assert!(op.is_checked_name());
    }
}
