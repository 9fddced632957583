//! Symbol table for the opal semantic analyzer.
//!
//! The binder treats symbol construction as external: a driver (or a test)
//! registers types, operators, events and extension blocks here, and the
//! binder only *queries* the resulting [`SymbolTable`]. The table is
//! immutable during binding and shared across binding threads.

pub mod defs;
pub mod lookup;
pub mod operator_names;
pub mod table;

pub use defs::{
    EventDef, ExtensionDef, ExtensionScope, OperatorDef, OperatorForm, SymbolOrigin,
    TypeDef, TypeKind, TypeParamConstraint,
};
pub use lookup::{LookupResult, LookupResultKind, Symbol};
pub use table::{RegistryError, SymbolTable};
