//! Per-path merge outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a contested path could not be merged automatically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergeFailure {
    /// The base product has no file at this path and the configured policy
    /// does not fall back to an owner's copy.
    MissingBaseline,
    /// A patch had hunks whose context could not be located.
    HunksRejected {
        /// Index of the owner whose patch was rejected, in owner order.
        variant: usize,
        /// Number of hunks that failed to apply.
        rejected: usize,
        /// Total hunks in the rejected patch.
        total: usize,
    },
}

impl fmt::Display for MergeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBaseline => write!(f, "no baseline file in the base product"),
            Self::HunksRejected {
                variant,
                rejected,
                total,
            } => write!(
                f,
                "{rejected} of {total} hunks from owner #{variant} could not be applied"
            ),
        }
    }
}

/// The result of merging one contested path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Every owner's edits applied cleanly; holds the merged text.
    Merged(String),
    /// Manual merging is required.
    Unmergeable(MergeFailure),
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged(_))
    }

    /// The merged text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Merged(text) => Some(text),
            Self::Unmergeable(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&MergeFailure> {
        match self {
            Self::Merged(_) => None,
            Self::Unmergeable(failure) => Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let ok = MergeOutcome::Merged("a\n".into());
        assert!(ok.is_merged());
        assert_eq!(ok.text(), Some("a\n"));
        assert!(ok.failure().is_none());

        let bad = MergeOutcome::Unmergeable(MergeFailure::MissingBaseline);
        assert!(!bad.is_merged());
        assert_eq!(bad.failure(), Some(&MergeFailure::MissingBaseline));
    }

    #[test]
    fn failure_display() {
        let failure = MergeFailure::HunksRejected {
            variant: 1,
            rejected: 2,
            total: 3,
        };
        assert_eq!(
            failure.to_string(),
            "2 of 3 hunks from owner #1 could not be applied"
        );
    }

    #[test]
    fn failure_serializes_with_kind_tag() {
        let json = serde_json::to_string(&MergeFailure::MissingBaseline).unwrap();
        assert_eq!(json, r#"{"kind":"missing_baseline"}"#);
    }
}
