//! High-level SDK for modweave.
//!
//! Ties the registry, conflict detector, merge engine, and output assembler
//! into one pipeline driven by a per-product configuration file. This is
//! the entry point for the CLI and for anything embedding modweave.

pub mod config;
pub mod error;
pub mod reconciler;

pub use config::{MergerConfig, ProductConfig, DEFAULT_CONFIG_FILE};
pub use error::{SdkError, SdkResult};
pub use reconciler::{ReconcileOptions, Reconciler, Reconciliation};

// Re-export key types
pub use modweave_merge::{MergedPath, MissingBaselinePolicy};
pub use modweave_pack::{AssembledOutput, MergeReport, UnmergeableEntry};
pub use modweave_registry::{LoadedMods, SkippedMod};
pub use modweave_types::{ConflictSet, MergeFailure, MergeOutcome, ModRecord};
