//! `.mod` descriptor and launcher manifest parsing.
//!
//! Descriptors are loose `key = "value"` files. Only the keys the merger
//! needs are extracted; everything else is ignored.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RegistryError, RegistryResult};

static RE_MANIFEST_MOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(mod/[^"]*)""#).expect("valid regex"));
static RE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bname\s*=\s*"([^"]*)""#).expect("valid regex"));
static RE_ARCHIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\barchive\s*=\s*"([^"]*\.zip)""#).expect("valid regex"));
static RE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bpath\s*=\s*"([^"]*)""#).expect("valid regex"));
static RE_REPLACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\breplace_path\s*=\s*"([^"]*)""#).expect("valid regex"));
static RE_USER_DIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\buser_dir\s*=\s*"([^"]*)""#).expect("valid regex"));
static RE_DEPENDENCIES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bdependencies\s*=\s*\{([^}]*)\}"#).expect("valid regex"));
static RE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("valid regex"));

/// Descriptor references (`mod/<file>.mod`) in a launcher settings file, in
/// declaration order.
pub fn parse_manifest(text: &str) -> Vec<String> {
    RE_MANIFEST_MOD
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}

/// Where a descriptor says the mod's data lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DescriptorLocation {
    Archive(String),
    Directory(String),
}

/// The fields of one `.mod` descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModDescriptor {
    pub name: Option<String>,
    pub archive: Option<String>,
    pub path: Option<String>,
    pub dependencies: Vec<String>,
    pub replace_paths: Vec<String>,
    pub user_dir: Option<String>,
}

impl ModDescriptor {
    /// Parse descriptor text. Never fails; missing keys stay empty.
    pub fn parse(text: &str) -> Self {
        let first = |re: &Regex| re.captures(text).map(|c| c[1].trim().to_string());

        let replace_paths: Vec<String> = RE_REPLACE
            .captures_iter(text)
            .map(|c| c[1].trim().to_string())
            .collect();

        // A `path` that merely repeats a replace_path is not a data location.
        let path = RE_PATH
            .captures_iter(text)
            .map(|c| c[1].trim().to_string())
            .find(|p| !replace_paths.contains(p));

        let dependencies = RE_DEPENDENCIES
            .captures(text)
            .map(|c| {
                let body = c[1].replace("\\\"", "");
                RE_QUOTED
                    .captures_iter(&body)
                    .map(|q| q[1].trim().to_string())
                    .filter(|d| !d.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: first(&RE_NAME).filter(|n| !n.is_empty()),
            archive: first(&RE_ARCHIVE),
            path,
            dependencies,
            replace_paths,
            user_dir: first(&RE_USER_DIR),
        }
    }

    /// The mod name and data location, or why the descriptor is unusable.
    pub fn validate(&self, descriptor: &Path) -> RegistryResult<(String, DescriptorLocation)> {
        let invalid = |reason: &str| RegistryError::InvalidDescriptor {
            path: descriptor.to_path_buf(),
            reason: reason.to_string(),
        };

        let name = self.name.clone().ok_or_else(|| invalid("missing name"))?;
        let location = match (&self.archive, &self.path) {
            (Some(archive), None) => DescriptorLocation::Archive(archive.clone()),
            (None, Some(path)) => DescriptorLocation::Directory(path.clone()),
            (Some(_), Some(_)) => return Err(invalid("both archive and path are set")),
            (None, None) => return Err(invalid("neither archive nor path is set")),
        };
        Ok((name, location))
    }
}
