//! Mod registry for modweave.
//!
//! Reads the launcher's list of enabled mods, parses each `.mod` descriptor,
//! indexes the files every mod provides (zip archives and unpacked
//! directories alike), and orders the result so each mod comes after the
//! mods it declares as dependencies.
//!
//! # Key Types
//!
//! - [`ModRegistry`] -- Loads and orders every enabled mod under a mod path
//! - [`LoadedMods`] / [`SkippedMod`] -- Loaded records plus rejected descriptors
//! - [`ModDescriptor`] -- Fields parsed from one `.mod` file
//! - [`ModReader`] -- One open handle onto a mod's files for reading content

pub mod archive;
pub mod descriptor;
pub mod error;
pub mod order;
pub mod registry;

pub use archive::{index_source, list_entries, resolve_case_insensitive, ModReader};
pub use descriptor::{parse_manifest, DescriptorLocation, ModDescriptor};
pub use error::{RegistryError, RegistryResult};
pub use order::dependency_order;
pub use registry::{LoadedMods, ModRegistry, SkippedMod};
