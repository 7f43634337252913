//! Per-product configuration (`merger.toml`).
//!
//! One table per product identifier:
//!
//! ```toml
//! [eu4]
//! modpath = "/home/u/.local/share/Paradox Interactive/Europa Universalis IV"
//! datapath = "/games/Europa Universalis IV"
//! valid_paths = ["common", "events", "history/provinces"]
//! valid_extensions = ["txt"]
//! missing_baseline = "first_owner"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use modweave_merge::{MergeOptions, MissingBaselinePolicy, DEFAULT_COMMENT_MARKER};
use serde::Deserialize;

use crate::error::{SdkError, SdkResult};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "merger.toml";

/// Settings for one product.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductConfig {
    /// Directory holding the launcher manifest and the `mod/` folder.
    pub modpath: PathBuf,
    /// Root of the unmodified base product.
    pub datapath: PathBuf,
    /// Directories in which files are checked for conflicts.
    pub valid_paths: Vec<String>,
    /// Extensions that take part in conflict detection; empty means all.
    #[serde(default)]
    pub valid_extensions: Vec<String>,
    #[serde(default)]
    pub missing_baseline: MissingBaselinePolicy,
    #[serde(default = "default_comment_marker")]
    pub comment_marker: String,
}

fn default_comment_marker() -> String {
    DEFAULT_COMMENT_MARKER.to_owned()
}

impl ProductConfig {
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            comment_marker: self.comment_marker.clone(),
            missing_baseline: self.missing_baseline,
        }
    }
}

/// Every product table in a config file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergerConfig {
    products: BTreeMap<String, ProductConfig>,
}

impl MergerConfig {
    /// Load a config file. Unlike most settings files a missing one is an
    /// error: there are no usable defaults for install locations.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SdkError::Config {
            path: Some(path.to_owned()),
            message: format!("could not read file: {e}"),
        })?;
        Self::parse(&contents).map_err(|e| match e {
            SdkError::Config { message, .. } => SdkError::Config {
                path: Some(path.to_owned()),
                message,
            },
            other => other,
        })
    }

    pub fn parse(toml_str: &str) -> SdkResult<Self> {
        let products: BTreeMap<String, ProductConfig> = toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start].chars().filter(|&c| c == '\n').count() + 1;
                message = format!("line {line}: {message}");
            }
            SdkError::Config {
                path: None,
                message,
            }
        })?;
        if products.is_empty() {
            return Err(SdkError::Config {
                path: None,
                message: "no product tables defined".to_owned(),
            });
        }
        Ok(Self { products })
    }

    /// The table for `product_id`.
    pub fn product(&self, product_id: &str) -> SdkResult<&ProductConfig> {
        self.products
            .get(product_id)
            .ok_or_else(|| SdkError::UnknownProduct {
                product: product_id.to_owned(),
                available: self.product_ids().map(str::to_owned).collect(),
            })
    }

    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[eu4]
modpath = "/home/u/eu4"
datapath = "/games/eu4"
valid_paths = ["common", "events", "history/provinces"]

[hoi4]
modpath = "/home/u/hoi4"
datapath = "/games/hoi4"
valid_paths = ["common"]
valid_extensions = ["txt", "yml"]
missing_baseline = "first_owner"
comment_marker = "//"
"#;

    #[test]
    fn parses_products_with_defaults() {
        let config = MergerConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.product_ids().collect::<Vec<_>>(), vec!["eu4", "hoi4"]);

        let eu4 = config.product("eu4").unwrap();
        assert_eq!(eu4.modpath, PathBuf::from("/home/u/eu4"));
        assert_eq!(eu4.valid_paths, vec!["common", "events", "history/provinces"]);
        assert!(eu4.valid_extensions.is_empty());
        assert_eq!(eu4.merge_options(), MergeOptions::default());
    }

    #[test]
    fn optional_keys_override_defaults() {
        let config = MergerConfig::parse(SAMPLE).unwrap();
        let hoi4 = config.product("hoi4").unwrap();
        assert_eq!(hoi4.valid_extensions, vec!["txt", "yml"]);
        let options = hoi4.merge_options();
        assert_eq!(options.missing_baseline, MissingBaselinePolicy::FirstOwner);
        assert_eq!(options.comment_marker, "//");
    }

    #[test]
    fn unknown_product_lists_available() {
        let config = MergerConfig::parse(SAMPLE).unwrap();
        let err = config.product("ck3").unwrap_err();
        assert!(matches!(err, SdkError::UnknownProduct { .. }));
        assert_eq!(
            err.to_string(),
            "no product \"ck3\" in the configuration (available: eu4, hoi4)"
        );
    }

    #[test]
    fn missing_required_key_is_fatal() {
        let err = MergerConfig::parse("[eu4]\nmodpath = \"/m\"\nvalid_paths = []\n").unwrap_err();
        match err {
            SdkError::Config { message, .. } => assert!(message.contains("datapath")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn syntax_error_reports_line() {
        let err = MergerConfig::parse("[eu4]\nmodpath = \n").unwrap_err();
        match err {
            SdkError::Config { message, .. } => assert!(message.starts_with("line "), "{message}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_file_is_fatal() {
        assert!(matches!(
            MergerConfig::parse(""),
            Err(SdkError::Config { .. })
        ));
    }

    #[test]
    fn load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        let err = MergerConfig::load(&path).unwrap_err();
        assert!(err.to_string().starts_with(&path.display().to_string()));

        std::fs::write(&path, SAMPLE).unwrap();
        assert!(MergerConfig::load(&path).unwrap().product("eu4").is_ok());
    }
}
