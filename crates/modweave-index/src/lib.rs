//! Conflict index for modweave.
//!
//! Finds every file path provided by two or more mods inside the watched
//! directories, and locates the unmodified copy of each contested file in the
//! base product's install tree.
//!
//! # Key Types
//!
//! - [`ConflictDetector`] -- Streaming, load-order-sensitive owner collection
//! - [`BaselineMap`] -- Contested path to base-product file
//! - [`BaselineResolver`] -- Case-insensitive lookups under the base root

pub mod baseline;
pub mod detect;
pub mod error;

pub use baseline::{resolve_baselines, BaselineMap, BaselineResolver};
pub use detect::{detect, ConflictDetector};
pub use error::{IndexError, IndexResult};
