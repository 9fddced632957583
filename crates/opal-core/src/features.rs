//! Language-version feature gating.
//!
//! Before the binder accepts a syntax construct tied to a versioned feature,
//! it calls [`check_feature_availability`]; a `Some(diagnostic)` result means
//! the construct is rejected (but binding still recovers).

use std::fmt;

use crate::diagnostics::Diagnostic;
use crate::span::Span;

/// Language versions, ordered oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LanguageVersion {
    V1,
    V2,
    #[default]
    Latest,
}

impl fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageVersion::V1 => write!(f, "1"),
            LanguageVersion::V2 => write!(f, "2"),
            LanguageVersion::Latest => write!(f, "latest"),
        }
    }
}

/// Version-gated language features the binder must check for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Operators declared inside extension blocks.
    ExtensionOperators,
    /// The `>>>` operator.
    UnsignedRightShift,
    /// `nint` / `nuint`.
    NativeInts,
    /// `checked`-named user-defined operators.
    CheckedOperators,
    /// Instance compound operators (`+=`-shaped methods on the type itself).
    InstanceOperators,
}

impl Feature {
    /// The first language version that supports the feature.
    pub fn required_version(self) -> LanguageVersion {
        match self {
            Feature::NativeInts => LanguageVersion::V2,
            Feature::UnsignedRightShift | Feature::CheckedOperators => LanguageVersion::V2,
            Feature::ExtensionOperators | Feature::InstanceOperators => LanguageVersion::Latest,
        }
    }

    /// Display name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Feature::ExtensionOperators => "extension operators",
            Feature::UnsignedRightShift => "unsigned right shift",
            Feature::NativeInts => "native-sized integers",
            Feature::CheckedOperators => "checked operators",
            Feature::InstanceOperators => "instance operators",
        }
    }
}

/// Check whether `feature` is available under `current`, producing the
/// diagnostic to report when it is not.
pub fn check_feature_availability(
    feature: Feature,
    current: LanguageVersion,
    span: Span,
) -> Option<Diagnostic> {
    let required = feature.required_version();
    if current >= required {
        None
    } else {
        Some(Diagnostic::FeatureNotAvailable {
            feature: feature.name().to_string(),
            required: required.to_string(),
            current: current.to_string(),
            span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_has_everything() {
        for feature in [
            Feature::ExtensionOperators,
            Feature::UnsignedRightShift,
            Feature::NativeInts,
            Feature::CheckedOperators,
            Feature::InstanceOperators,
        ] {
            assert!(
                check_feature_availability(feature, LanguageVersion::Latest, Span::default())
                    .is_none()
            );
        }
    }

    #[test]
    fn v1_rejects_gated_features() {
        let diag =
            check_feature_availability(Feature::NativeInts, LanguageVersion::V1, Span::default());
        assert!(matches!(diag, Some(Diagnostic::FeatureNotAvailable { .. })));
    }
}
