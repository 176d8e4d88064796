//! Path safety for generated sources.
//!
//! Targets are `(package, simple name)` pairs. Every package segment and the
//! name must be plain identifiers, so a resolved path can never leave the
//! output root.

use crate::error::SinkError;
use crate::model::qualify;
use crate::validation::is_java_identifier;
use std::path::{Path, PathBuf};

/// Extension of every generated compilation unit.
pub const SOURCE_EXTENSION: &str = "java";

/// Checks that a target only names identifiers.
pub fn check_target(package: &str, name: &str) -> Result<(), SinkError> {
    let invalid = |reason: String| SinkError::InvalidTarget {
        target: qualify(package, name),
        reason,
    };

    if !is_java_identifier(name) {
        return Err(invalid(format!("'{name}' is not a valid type name")));
    }
    if !package.is_empty() {
        if let Some(segment) = package.split('.').find(|s| !is_java_identifier(s)) {
            return Err(invalid(format!("package segment '{segment}' is not an identifier")));
        }
    }
    Ok(())
}

/// `<root>/<package as directories>/<name>.java`
pub fn resolve_source_path(root: &Path, package: &str, name: &str) -> Result<PathBuf, SinkError> {
    check_target(package, name)?;

    let mut path = root.to_path_buf();
    if !package.is_empty() {
        path.extend(package.split('.'));
    }
    path.push(format!("{name}.{SOURCE_EXTENSION}"));
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn package_maps_to_directories() {
        let path = resolve_source_path(Path::new("out"), "com.acme.billing", "OrdersImpl").unwrap();
        assert_eq!(path, Path::new("out/com/acme/billing/OrdersImpl.java"));
    }

    #[test]
    fn default_package_sits_at_root() {
        let path = resolve_source_path(Path::new("out"), "", "Boom").unwrap();
        assert_eq!(path, Path::new("out/Boom.java"));
    }

    #[test]
    fn traversal_is_rejected() {
        assert_matches!(
            resolve_source_path(Path::new("out"), "..", "Boom"),
            Err(SinkError::InvalidTarget { .. })
        );
        assert_matches!(
            resolve_source_path(Path::new("out"), "billing", "../Boom"),
            Err(SinkError::InvalidTarget { .. })
        );
        assert_matches!(
            check_target("billing..core", "Boom"),
            Err(SinkError::InvalidTarget { reason, .. }) if reason.contains("''")
        );
    }
}
