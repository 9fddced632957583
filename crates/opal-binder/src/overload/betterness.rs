//! Betterness comparison between applicable candidates.
//!
//! Candidate A beats candidate B when A's conversions are not worse for
//! every operand and strictly better for at least one, under the "better
//! conversion target" partial order: identity beats implicit numeric
//! widening, which beats boxing, which beats user-defined conversions.
//! Within numeric widening the narrower target wins (the one that itself
//! widens to the other).

use std::cmp::Ordering;

use opal_core::Ty;

use crate::conversion::{
    Conversion, ConversionKind, ConversionOracle, ConversionSource, implicit_numeric_exists,
};

/// The outcome of ranking an applicable set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestOutcome {
    /// Index of the unique best candidate.
    Unique(usize),
    /// Indices of the tied, non-dominated candidates.
    Ambiguous(Vec<usize>),
}

/// Rank candidates by their per-operand conversions.
///
/// `per_candidate[i]` holds each operand's `(conversion, parameter type)`
/// for candidate `i`. All candidates are already applicable. The oracle
/// breaks same-class ties between non-numeric targets.
pub fn find_best(
    oracle: &dyn ConversionOracle,
    per_candidate: &[Vec<(Conversion, Ty)>],
) -> BestOutcome {
    debug_assert!(!per_candidate.is_empty());
    if per_candidate.len() == 1 {
        return BestOutcome::Unique(0);
    }

    for (i, a) in per_candidate.iter().enumerate() {
        let beats_all = per_candidate
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .all(|(_, b)| candidate_cmp(oracle, a, b) == Ordering::Greater);
        if beats_all {
            return BestOutcome::Unique(i);
        }
    }

    // No dominator; the ambiguous set is every candidate no other beats.
    let tied: Vec<usize> = (0..per_candidate.len())
        .filter(|&i| {
            per_candidate
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .all(|(_, b)| candidate_cmp(oracle, b, &per_candidate[i]) != Ordering::Greater)
        })
        .collect();
    BestOutcome::Ambiguous(tied)
}

/// `Greater` when `a` is strictly better than `b`.
fn candidate_cmp(
    oracle: &dyn ConversionOracle,
    a: &[(Conversion, Ty)],
    b: &[(Conversion, Ty)],
) -> Ordering {
    let mut a_better = false;
    let mut b_better = false;
    for ((conv_a, ty_a), (conv_b, ty_b)) in a.iter().zip(b.iter()) {
        match better_conversion_target(oracle, *conv_a, *ty_a, *conv_b, *ty_b) {
            Ordering::Greater => a_better = true,
            Ordering::Less => b_better = true,
            Ordering::Equal => {}
        }
    }
    match (a_better, b_better) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Compare two conversions of the same operand by target.
pub fn better_conversion_target(
    oracle: &dyn ConversionOracle,
    conv_a: Conversion,
    target_a: Ty,
    conv_b: Conversion,
    target_b: Ty,
) -> Ordering {
    if target_a == target_b {
        return Ordering::Equal;
    }
    let class_a = conversion_class(conv_a.kind);
    let class_b = conversion_class(conv_b.kind);
    if class_a != class_b {
        // Lower class is better.
        return class_b.cmp(&class_a);
    }
    // Same class, numeric targets: the target that widens to the other wins.
    if let (Some(kind_a), Some(kind_b)) = (
        target_a.strip_nullable().primitive_kind(),
        target_b.strip_nullable().primitive_kind(),
    ) {
        let a_to_b = implicit_numeric_exists(kind_a, kind_b);
        let b_to_a = implicit_numeric_exists(kind_b, kind_a);
        if a_to_b && !b_to_a {
            return Ordering::Greater;
        }
        if b_to_a && !a_to_b {
            return Ordering::Less;
        }
        // No widening either way: a signed integral target beats an
        // unsigned one, so small unsigned operands land on int.
        match (signed_integral(kind_a), signed_integral(kind_b)) {
            (Some(true), Some(false)) => return Ordering::Greater,
            (Some(false), Some(true)) => return Ordering::Less,
            _ => {}
        }
    }
    // The general rule for the remaining ties (reference and boxing targets
    // included): the target that itself converts implicitly to the other is
    // the narrower, better one. Picks `string` over `object` for
    // `"a" + null`.
    let a_to_b = oracle.classify(ConversionSource::Type(target_a), target_b, false);
    let b_to_a = oracle.classify(ConversionSource::Type(target_b), target_a, false);
    match (
        a_to_b.exists() && a_to_b.is_implicit,
        b_to_a.exists() && b_to_a.is_implicit,
    ) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// `Some(true)` for signed integral kinds, `Some(false)` for unsigned ones.
fn signed_integral(kind: opal_core::PrimitiveKind) -> Option<bool> {
    use opal_core::PrimitiveKind::*;
    match kind {
        Int8 | Int16 | Int32 | Int64 | NInt => Some(true),
        Uint8 | Uint16 | Uint32 | Uint64 | NUint => Some(false),
        _ => None,
    }
}

/// Coarse preference class of a conversion kind; lower is better.
fn conversion_class(kind: ConversionKind) -> u8 {
    match kind {
        ConversionKind::Identity => 0,
        ConversionKind::ImplicitNumeric
        | ConversionKind::ImplicitConstant
        | ConversionKind::ImplicitEnumeration
        | ConversionKind::NullLiteral
        | ConversionKind::DefaultLiteral => 1,
        ConversionKind::ImplicitNullable | ConversionKind::ImplicitReference => 2,
        ConversionKind::Boxing => 3,
        ConversionKind::ImplicitUserDefined => 4,
        ConversionKind::ImplicitDynamic => 5,
        _ => 6,
    }
}
