//! Error types for adbc-poolhouse.
//!
//! This module defines all error types using `thiserror`. Errors fall into two groups:
//! problems the caller fixes by installing or configuring something (missing driver,
//! bad configuration, unsupported config type) and errors raised by the backend or the
//! pool at run time, which are passed through without rewording.

use crate::db::native::NativeError;
use crate::db::queue_pool::PoolError;
use thiserror::Error;

/// Documentation for drivers distributed through the foundry manifest registry.
pub const FOUNDRY_DOCS_URL: &str = "https://docs.adbc-drivers.org/";

#[derive(Error, Debug)]
pub enum PoolhouseError {
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error(
        "Unsupported config type: {type_name}. Use one of the warehouse configs exported by adbc_poolhouse::models."
    )]
    UnsupportedConfigType { type_name: String },

    /// The message already carries the remediation text.
    #[error("{message}")]
    DriverNotInstalled {
        driver: String,
        message: String,
        install_command: String,
    },

    #[error("Cursor is closed")]
    CursorClosed,

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Native(#[from] NativeError),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl PoolhouseError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unsupported config type error.
    pub fn unsupported_config_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedConfigType {
            type_name: type_name.into(),
        }
    }

    /// Create the error for a bundled driver whose host package is not installed.
    pub fn bundled_driver_missing(display_name: &str, extra: &str) -> Self {
        let install_command = format!("pip install adbc-poolhouse[{extra}]");
        Self::DriverNotInstalled {
            driver: display_name.to_string(),
            message: format!(
                "{display_name} ADBC driver not found. Run: `{install_command}`"
            ),
            install_command,
        }
    }

    /// Create the error for a foundry driver the driver manager could not find.
    pub fn foundry_driver_missing(driver: &str, install_name: &str) -> Self {
        let install_command = format!("dbc install {install_name}");
        Self::DriverNotInstalled {
            driver: driver.to_string(),
            message: format!(
                "ADBC driver '{driver}' not found. Install it with: {install_command}\nSee: {FOUNDRY_DOCS_URL}"
            ),
            install_command,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the remediation hint for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::DriverNotInstalled {
                install_command, ..
            } => Some(install_command),
            Self::UnsupportedConfigType { .. } => {
                Some("Pass one of the warehouse config types shipped with this crate")
            }
            Self::Pool(PoolError::Timeout { .. }) => {
                Some("Return connections promptly or raise pool_size / max_overflow / timeout")
            }
            _ => None,
        }
    }

    /// Check whether the caller must install or configure something before retrying.
    ///
    /// Everything else was raised by the backend or the pool at run time.
    pub fn requires_setup(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::UnsupportedConfigType { .. }
                | Self::DriverNotInstalled { .. }
        )
    }
}

/// Result type alias for pool assembly and connection operations.
pub type PoolhouseResult<T> = Result<T, PoolhouseError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::native::AdbcStatus;

    #[test]
    fn test_bundled_driver_missing_message() {
        let err = PoolhouseError::bundled_driver_missing("DuckDB", "duckdb");
        assert!(
            err.to_string()
                .contains("pip install adbc-poolhouse[duckdb]")
        );
        assert_eq!(err.suggestion(), Some("pip install adbc-poolhouse[duckdb]"));
    }

    #[test]
    fn test_foundry_driver_missing_message() {
        let err = PoolhouseError::foundry_driver_missing("databricks", "databricks");
        let msg = err.to_string();
        assert!(msg.contains("dbc install databricks"));
        assert!(msg.contains(FOUNDRY_DOCS_URL));
        assert!(msg.starts_with("ADBC driver 'databricks' not found."));
    }

    #[test]
    fn test_requires_setup() {
        assert!(PoolhouseError::configuration("bad").requires_setup());
        assert!(PoolhouseError::unsupported_config_type("Foo").requires_setup());
        assert!(PoolhouseError::foundry_driver_missing("trino", "trino").requires_setup());
        assert!(!PoolhouseError::CursorClosed.requires_setup());
        let native = NativeError::new(AdbcStatus::Unauthenticated, "bad password");
        assert!(!PoolhouseError::from(native).requires_setup());
        assert!(!PoolhouseError::from(PoolError::Closed).requires_setup());
    }

    #[test]
    fn test_native_error_is_transparent() {
        let native = NativeError::new(AdbcStatus::Io, "connection reset by peer");
        let err = PoolhouseError::from(native);
        assert_eq!(err.to_string(), "connection reset by peer");
    }
}
