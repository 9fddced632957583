//! Candidate collection from the three sources.
//!
//! Candidates come from, in fixed priority order: the built-in signature
//! tables, user-defined static operators on the operand types' base chains,
//! and extension-declared operators probed scope-by-scope. Providers are a
//! tagged dispatch, not trait objects.

use opal_core::{Ty, TypeHash};
use opal_registry::{ExtensionScope, OperatorDef, OperatorForm, SymbolTable};

use crate::conversion::Conversion;
use crate::overload::signatures::{
    BinaryOperatorKind, BinarySignature, UnaryOperatorKind, UnarySignature,
};

/// Which source produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSourceKind {
    BuiltIn,
    UserDefined,
    /// Extension scope index in the lexical chain, innermost first.
    Extension { scope: usize },
}

/// An applicable binary candidate, with its operand conversions.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryCandidate {
    pub signature: BinarySignature,
    pub source: CandidateSourceKind,
    pub left_conversion: Conversion,
    pub right_conversion: Conversion,
}

/// An applicable unary candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryCandidate {
    pub signature: UnarySignature,
    pub source: CandidateSourceKind,
    pub conversion: Conversion,
}

/// The base types to probe for user-defined operators: each operand's
/// stripped base type, deduplicated.
fn operand_owners(left: Option<Ty>, right: Option<Ty>) -> Vec<TypeHash> {
    let mut owners = Vec::new();
    for ty in [left, right].into_iter().flatten() {
        let hash = ty.strip_nullable().hash;
        if !owners.contains(&hash) {
            owners.push(hash);
        }
    }
    owners
}

fn checked_bit_binary(name: &str) -> BinaryOperatorKind {
    if name.starts_with("op_Checked") {
        BinaryOperatorKind::CHECKED
    } else {
        BinaryOperatorKind::empty()
    }
}

fn checked_bit_unary(name: &str) -> UnaryOperatorKind {
    if name.starts_with("op_Checked") {
        UnaryOperatorKind::CHECKED
    } else {
        UnaryOperatorKind::empty()
    }
}

/// User-defined static binary operators, walked up both operands' base
/// chains by metadata name.
pub fn user_defined_binary(
    table: &SymbolTable,
    operator: BinaryOperatorKind,
    names: &[&'static str],
    left: Option<Ty>,
    right: Option<Ty>,
) -> Vec<BinarySignature> {
    let mut sigs = Vec::new();
    for owner in operand_owners(left, right) {
        for base in table.base_chain(owner) {
            for &name in names {
                for op in table.operators_named(base, name) {
                    if op.form != OperatorForm::Static || op.params.len() != 2 {
                        continue;
                    }
                    push_binary_from_def(operator, op, &mut sigs);
                }
            }
        }
    }
    add_lifted_binary(left, right, &mut sigs);
    sigs
}

fn push_binary_from_def(
    operator: BinaryOperatorKind,
    op: &OperatorDef,
    sigs: &mut Vec<BinarySignature>,
) {
    let (Some(&p0), Some(&p1)) = (op.params.first(), op.params.get(1)) else {
        return;
    };
    sigs.push(BinarySignature {
        kind: operator | BinaryOperatorKind::USER_DEFINED | checked_bit_binary(op.name),
        left: p0,
        right: p1,
        result: op.return_type,
        method: Some(op.clone()),
    });
}

/// Synthesize lifted twins for user-defined value-type signatures when an
/// operand is nullable.
fn add_lifted_binary(left: Option<Ty>, right: Option<Ty>, sigs: &mut Vec<BinarySignature>) {
    let any_nullable = left.map(Ty::is_nullable).unwrap_or(false)
        || right.map(Ty::is_nullable).unwrap_or(false);
    if !any_nullable {
        return;
    }
    let lifted: Vec<BinarySignature> = sigs
        .iter()
        .filter(|sig| !sig.left.is_nullable() && !sig.right.is_nullable())
        .map(BinarySignature::lifted)
        .collect();
    sigs.extend(lifted);
}

/// User-defined static unary operators on the operand's base chain.
pub fn user_defined_unary(
    table: &SymbolTable,
    operator: UnaryOperatorKind,
    names: &[&'static str],
    operand: Option<Ty>,
) -> Vec<UnarySignature> {
    let mut sigs = Vec::new();
    let Some(ty) = operand else {
        return sigs;
    };
    for base in table.base_chain(ty.strip_nullable().hash) {
        for &name in names {
            for op in table.operators_named(base, name) {
                if op.form != OperatorForm::Static || op.params.len() != 1 {
                    continue;
                }
                push_unary_from_def(operator, op, &mut sigs);
            }
        }
    }
    if ty.is_nullable() {
        let lifted: Vec<UnarySignature> = sigs
            .iter()
            .filter(|sig| !sig.operand.is_nullable())
            .map(UnarySignature::lifted)
            .collect();
        sigs.extend(lifted);
    }
    sigs
}

fn push_unary_from_def(
    operator: UnaryOperatorKind,
    op: &OperatorDef,
    sigs: &mut Vec<UnarySignature>,
) {
    let Some(&p0) = op.params.first() else {
        return;
    };
    sigs.push(UnarySignature {
        kind: operator | UnaryOperatorKind::USER_DEFINED | checked_bit_unary(op.name),
        operand: p0,
        result: op.return_type,
        method: Some(op.clone()),
    });
}

/// Extension-declared binary operators from one scope, split by form.
/// The instance form binds the receiver as the left operand.
pub fn extension_binary(
    scope: &ExtensionScope,
    operator: BinaryOperatorKind,
    names: &[&'static str],
    form: OperatorForm,
) -> Vec<BinarySignature> {
    let mut sigs = Vec::new();
    for ext in &scope.extensions {
        for op in &ext.operators {
            if op.form != form || !names.contains(&op.name) {
                continue;
            }
            match form {
                OperatorForm::Static => {
                    if op.params.len() == 2 {
                        push_binary_from_def(operator, op, &mut sigs);
                    }
                }
                OperatorForm::Instance => {
                    let Some(&param) = op.params.first() else {
                        continue;
                    };
                    if op.params.len() != 1 {
                        continue;
                    }
                    sigs.push(BinarySignature {
                        kind: operator
                            | BinaryOperatorKind::USER_DEFINED
                            | checked_bit_binary(op.name),
                        left: Ty::simple(ext.extended),
                        right: param,
                        result: op.return_type,
                        method: Some(op.clone()),
                    });
                }
            }
        }
    }
    sigs
}

/// Extension-declared unary operators from one scope, split by form.
pub fn extension_unary(
    scope: &ExtensionScope,
    operator: UnaryOperatorKind,
    names: &[&'static str],
    form: OperatorForm,
) -> Vec<UnarySignature> {
    let mut sigs = Vec::new();
    for ext in &scope.extensions {
        for op in &ext.operators {
            if op.form != form || !names.contains(&op.name) {
                continue;
            }
            match form {
                OperatorForm::Static => {
                    if op.params.len() == 1 {
                        push_unary_from_def(operator, op, &mut sigs);
                    }
                }
                OperatorForm::Instance => {
                    if !op.params.is_empty() {
                        continue;
                    }
                    sigs.push(UnarySignature {
                        kind: operator
                            | UnaryOperatorKind::USER_DEFINED
                            | checked_bit_unary(op.name),
                        operand: Ty::simple(ext.extended),
                        result: op.return_type,
                        method: Some(op.clone()),
                    });
                }
            }
        }
    }
    sigs
}

/// In a checked context a checked-named candidate shadows its unchecked twin
/// when both are applicable with the same signature shape.
pub fn prefer_checked_binary(candidates: &mut Vec<BinaryCandidate>) {
    let checked: Vec<(Ty, Ty, Option<TypeHash>)> = candidates
        .iter()
        .filter(|c| c.signature.kind.is_checked() && c.signature.method.is_some())
        .map(|c| {
            (
                c.signature.left,
                c.signature.right,
                c.signature.method.as_ref().map(|m| m.declaring),
            )
        })
        .collect();
    candidates.retain(|c| {
        if c.signature.kind.is_checked() || c.signature.method.is_none() {
            return true;
        }
        !checked.contains(&(
            c.signature.left,
            c.signature.right,
            c.signature.method.as_ref().map(|m| m.declaring),
        ))
    });
}

/// See [`prefer_checked_binary`].
pub fn prefer_checked_unary(candidates: &mut Vec<UnaryCandidate>) {
    let checked: Vec<(Ty, Option<TypeHash>)> = candidates
        .iter()
        .filter(|c| c.signature.kind.is_checked() && c.signature.method.is_some())
        .map(|c| {
            (
                c.signature.operand,
                c.signature.method.as_ref().map(|m| m.declaring),
            )
        })
        .collect();
    candidates.retain(|c| {
        if c.signature.kind.is_checked() || c.signature.method.is_none() {
            return true;
        }
        !checked.contains(&(
            c.signature.operand,
            c.signature.method.as_ref().map(|m| m.declaring),
        ))
    });
}
