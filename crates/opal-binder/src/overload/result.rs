//! Overload resolution results.

use opal_registry::OperatorDef;

/// How a resolution concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverloadResultKind {
    /// A unique best candidate.
    Viable,
    /// Two or more applicable candidates with no best.
    Ambiguous,
    /// Candidates existed but none was applicable (or the ambiguity was
    /// downgraded).
    OverloadResolutionFailure,
    /// No candidates existed at any source.
    Empty,
}

/// The outcome of one resolution call.
///
/// Invariants: `best` is `Some` iff `kind` is `Viable`;
/// `original_user_defined` is non-empty only when a user-defined or
/// extension candidate set existed but failed or was ambiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct OverloadResult<C> {
    pub kind: OverloadResultKind,
    pub best: Option<C>,
    /// The tied candidates, when ambiguous.
    pub ambiguous: Vec<C>,
    /// User-defined declarations for diagnostic formatting.
    pub original_user_defined: Vec<OperatorDef>,
}

impl<C> OverloadResult<C> {
    /// The result of not running resolution at all.
    pub fn empty() -> Self {
        OverloadResult {
            kind: OverloadResultKind::Empty,
            best: None,
            ambiguous: Vec::new(),
            original_user_defined: Vec::new(),
        }
    }

    pub fn viable(best: C) -> Self {
        OverloadResult {
            kind: OverloadResultKind::Viable,
            best: Some(best),
            ambiguous: Vec::new(),
            original_user_defined: Vec::new(),
        }
    }

    pub fn is_viable(&self) -> bool {
        self.kind == OverloadResultKind::Viable
    }
}

/// Owned accumulator for one resolution call.
///
/// Collects what the sources produced so a terminal failure can report the
/// user-defined declarations involved. Passed by value and consumed by the
/// terminal state; nothing here is shared or pooled.
#[derive(Debug, Default)]
pub struct OverloadResultBuilder {
    any_candidates: bool,
    user_defined: Vec<OperatorDef>,
}

impl OverloadResultBuilder {
    pub fn new() -> Self {
        OverloadResultBuilder::default()
    }

    /// Record that a source produced candidates (none of which applied).
    pub fn note_candidates(&mut self) {
        self.any_candidates = true;
    }

    /// Record user-defined declarations a source produced.
    pub fn note_user_defined(&mut self, ops: impl IntoIterator<Item = OperatorDef>) {
        self.any_candidates = true;
        self.user_defined.extend(ops);
    }

    /// Terminal state when no source resolved.
    pub fn finish<C>(self) -> OverloadResult<C> {
        if self.any_candidates {
            OverloadResult {
                kind: OverloadResultKind::OverloadResolutionFailure,
                best: None,
                ambiguous: Vec::new(),
                original_user_defined: self.user_defined,
            }
        } else {
            OverloadResult::empty()
        }
    }

    /// Terminal state for an ambiguity.
    pub fn finish_ambiguous<C>(self, tied: Vec<C>) -> OverloadResult<C> {
        OverloadResult {
            kind: OverloadResultKind::Ambiguous,
            best: None,
            ambiguous: tied,
            original_user_defined: self.user_defined,
        }
    }

    /// Terminal state for a downgraded ambiguity.
    pub fn finish_downgraded<C>(self) -> OverloadResult<C> {
        OverloadResult {
            kind: OverloadResultKind::OverloadResolutionFailure,
            best: None,
            ambiguous: Vec::new(),
            original_user_defined: self.user_defined,
        }
    }
}
