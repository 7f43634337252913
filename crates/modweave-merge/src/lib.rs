//! Automatic merge engine for modweave.
//!
//! Every owner's copy of a contested file is diffed against the baseline,
//! turned into a patch, and the patches are applied smallest first onto a
//! running copy of the baseline. A single rejected hunk makes the whole path
//! unmergeable; partial merges are never produced.
//!
//! # Key Types
//!
//! - [`MergePlan`] -- Normalized anchor plus owner patches in application order
//! - [`MergeOptions`] / [`MissingBaselinePolicy`] -- Comment marker and fallback policy
//! - [`MergeJob`] / [`MergedPath`] -- Units of work and results for [`merge_batch`]

pub mod batch;
pub mod engine;
pub mod error;
pub mod normalize;

pub use batch::{merge_batch, MergeJob, MergedPath};
pub use engine::{merge, MergeOptions, MergePlan, MissingBaselinePolicy, PlannedPatch};
pub use error::{MergeError, MergeResult};
pub use normalize::{normalize_lines, strip_sentinels, with_sentinels, DEFAULT_COMMENT_MARKER, SENTINEL};
