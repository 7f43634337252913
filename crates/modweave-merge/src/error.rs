//! Error types for the merge engine.
//!
//! Per-path failures are not errors; they are reported as
//! [`modweave_types::MergeOutcome::Unmergeable`].

/// Errors that can occur while running merges.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The worker pool could not be created.
    #[error("failed to build merge thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
