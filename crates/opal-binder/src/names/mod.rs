//! Name and type binding: type-expression resolution, simple-name lookup
//! arbitration and the per-scope imports table.

pub mod imports;
mod result_symbol;
mod type_binder;

pub use type_binder::{bind_namespace_or_type, bind_type};
