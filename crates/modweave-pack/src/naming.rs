//! File-system names derived from user-facing names.

use crate::error::{PackError, PackResult};

/// The patch name lower-cased, reduced to `[a-z0-9 ]`, with spaces turned
/// into underscores. Used for the descriptor, staging folder, and archive.
pub fn flat_name(patch_name: &str) -> PackResult<String> {
    let flat: String = patch_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    if flat.trim_matches('_').is_empty() {
        return Err(PackError::InvalidPatchName(patch_name.to_string()));
    }
    Ok(flat)
}

/// A dependency entry as written inside a descriptor's `dependencies`
/// block. Names containing whitespace get an extra escaped pair of quotes.
pub fn quote_dependency(name: &str) -> String {
    if name.chars().any(char::is_whitespace) {
        format!("\"\\\"{name}\\\"\"")
    } else {
        format!("\"{name}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_patch_names() {
        assert_eq!(flat_name("My Patch").unwrap(), "my_patch");
        assert_eq!(flat_name("Big-Merge v2!").unwrap(), "bigmerge_v2");
        assert_eq!(flat_name("already_flat").unwrap(), "alreadyflat");
    }

    #[test]
    fn rejects_names_with_nothing_left() {
        assert!(matches!(
            flat_name("!!!"),
            Err(PackError::InvalidPatchName(_))
        ));
        assert!(flat_name("   ").is_err());
    }

    #[test]
    fn quotes_dependencies() {
        assert_eq!(quote_dependency("Simple"), "\"Simple\"");
        assert_eq!(quote_dependency("Two Words"), r#""\"Two Words\"""#);
    }
}
