//! Output assembly for modweave.
//!
//! Turns merge results into an installable patch mod: a `.mod` descriptor
//! that loads after every conflicting mod, a staging tree holding the merged
//! files, a zip archive of that tree, and a side directory with every input
//! of each path that needs manual merging.
//!
//! # Key Types
//!
//! - [`OutputAssembler`] -- Writes descriptor, staging tree, archive, and manual-merge inputs
//! - [`OutputDescriptor`] -- The synthetic `.mod` file of the patch
//! - [`StagingDir`] -- Case-preserving writes under an output root
//! - [`MergeReport`] / [`UnmergeableEntry`] -- Serializable summary of a run

pub mod assembler;
pub mod descriptor;
pub mod error;
pub mod naming;
pub mod report;
pub mod staging;

pub use assembler::{AssembledOutput, OutputAssembler, UNMERGED_SUFFIX, VANILLA_DIR};
pub use descriptor::OutputDescriptor;
pub use error::{PackError, PackResult};
pub use naming::{flat_name, quote_dependency};
pub use report::{MergeReport, UnmergeableEntry};
pub use staging::{pack_zip, StagingDir};
