//! Driver identifiers and connection parameter maps.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Flat driver connection parameters, passed to the driver manager verbatim.
pub type ParamMap = BTreeMap<String, String>;

/// What the driver manager should load: an absolute path to a driver library, or a short
/// name it resolves through its manifest search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DriverIdentifier(String);

impl DriverIdentifier {
    /// A short driver or package name.
    pub fn name(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// A filesystem path to a loadable driver library.
    pub fn path(path: impl AsRef<Path>) -> Self {
        Self(path.as_ref().to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this identifier points at a file rather than a manifest name.
    pub fn is_path(&self) -> bool {
        Path::new(&self.0).is_absolute()
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }
}

impl fmt::Display for DriverIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DriverIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub(crate) fn insert_opt<V: ToString>(params: &mut ParamMap, key: &str, value: Option<V>) {
    if let Some(value) = value {
        params.insert(key.to_string(), value.to_string());
    }
}

/// Booleans are always emitted, as `"true"` / `"false"`.
pub(crate) fn insert_bool(params: &mut ParamMap, key: &str, value: bool) {
    params.insert(key.to_string(), value.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_not_path() {
        let id = DriverIdentifier::name("adbc_driver_snowflake");
        assert!(!id.is_path());
        assert_eq!(id.to_string(), "adbc_driver_snowflake");
    }

    #[test]
    fn test_absolute_path_is_path() {
        let dir = std::env::temp_dir();
        let id = DriverIdentifier::path(dir.join("libadbc_driver_postgresql.so"));
        assert!(id.is_path());
        assert!(id.as_str().ends_with("libadbc_driver_postgresql.so"));
    }

    #[test]
    fn test_insert_helpers() {
        let mut params = ParamMap::new();
        insert_opt(&mut params, "a", Some(5432));
        insert_opt::<String>(&mut params, "b", None);
        insert_bool(&mut params, "c", false);
        assert_eq!(params.get("a").map(String::as_str), Some("5432"));
        assert!(!params.contains_key("b"));
        assert_eq!(params.get("c").map(String::as_str), Some("false"));
    }
}
