//! Warehouse configuration models.
//!
//! This module re-exports the config records for every supported backend, the
//! [`WarehouseConfig`] contract they share, and the driver-facing value types.

mod macros;

pub mod bigquery;
pub mod databricks;
pub mod driver;
pub mod duckdb;
pub mod flightsql;
pub mod mssql;
pub mod postgresql;
pub mod redshift;
pub mod secret;
pub mod snowflake;
pub mod teradata;
pub mod trino;
pub mod warehouse;

// Re-export commonly used types
pub use bigquery::BigQueryConfig;
pub use databricks::DatabricksConfig;
pub use driver::{DriverIdentifier, ParamMap};
pub use duckdb::{DUCKDB_ENTRYPOINT, DuckDbConfig, MEMORY_DATABASE};
pub use flightsql::FlightSqlConfig;
pub use mssql::MssqlConfig;
pub use postgresql::PostgreSqlConfig;
pub use redshift::RedshiftConfig;
pub use secret::{SecretString, mask_uri, redact_params};
pub use snowflake::SnowflakeConfig;
pub use teradata::TeradataConfig;
pub use trino::TrinoConfig;
pub use warehouse::{Backend, DriverParams, WarehouseConfig, parse_config, validate_pool_tuning};
