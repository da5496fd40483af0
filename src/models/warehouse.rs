//! The warehouse configuration contract.
//!
//! Every backend record implements [`WarehouseConfig`]; the pool assembler only ever sees
//! this trait, never the backend-specific fields.

use super::driver::ParamMap;
use crate::error::{PoolhouseError, PoolhouseResult};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::ffi::OsString;
use std::fmt;

/// Supported warehouse backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    BigQuery,
    Databricks,
    DuckDb,
    FlightSql,
    Mssql,
    PostgreSql,
    Redshift,
    Snowflake,
    Teradata,
    Trino,
}

impl Backend {
    pub const ALL: [Backend; 10] = [
        Self::BigQuery,
        Self::Databricks,
        Self::DuckDb,
        Self::FlightSql,
        Self::Mssql,
        Self::PostgreSql,
        Self::Redshift,
        Self::Snowflake,
        Self::Teradata,
        Self::Trino,
    ];

    /// Get the display name for this backend.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::BigQuery => "BigQuery",
            Self::Databricks => "Databricks",
            Self::DuckDb => "DuckDB",
            Self::FlightSql => "Arrow Flight SQL",
            Self::Mssql => "SQL Server",
            Self::PostgreSql => "PostgreSQL",
            Self::Redshift => "Redshift",
            Self::Snowflake => "Snowflake",
            Self::Teradata => "Teradata",
            Self::Trino => "Trino",
        }
    }

    /// Get the lowercase key used for CLI subcommands and serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BigQuery => "bigquery",
            Self::Databricks => "databricks",
            Self::DuckDb => "duckdb",
            Self::FlightSql => "flightsql",
            Self::Mssql => "mssql",
            Self::PostgreSql => "postgresql",
            Self::Redshift => "redshift",
            Self::Snowflake => "snowflake",
            Self::Teradata => "teradata",
            Self::Trino => "trino",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Contract shared by every warehouse configuration record.
pub trait WarehouseConfig: Any + Send + Sync + fmt::Debug {
    fn backend(&self) -> Backend;

    /// Connections kept open in the pool.
    fn pool_size(&self) -> u32;

    /// Extra connections allowed above `pool_size` under load.
    fn max_overflow(&self) -> u32;

    /// Seconds a checkout waits for a free connection.
    fn timeout_secs(&self) -> u64;

    /// Seconds after which an idle connection is replaced at checkout.
    fn recycle_secs(&self) -> u64;

    /// Driver init symbol, when the driver does not export the ADBC default.
    fn entrypoint(&self) -> Option<&str> {
        None
    }

    /// Check tuning values and backend field combinations.
    fn validate(&self) -> PoolhouseResult<()> {
        validate_pool_tuning(self.pool_size(), self.timeout_secs(), self.recycle_secs())
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_any(&self) -> &dyn Any;
}

/// Backend-specific translation of a config record into driver parameters.
///
/// Implementations are pure: the same record always yields the same map.
pub trait DriverParams {
    fn driver_params(&self) -> ParamMap;
}

/// Validate pool tuning numbers. `max_overflow` is unsigned and needs no check.
pub fn validate_pool_tuning(
    pool_size: u32,
    timeout_secs: u64,
    recycle_secs: u64,
) -> PoolhouseResult<()> {
    if pool_size == 0 {
        return Err(PoolhouseError::configuration(
            "pool_size must be > 0, got 0",
        ));
    }
    if timeout_secs == 0 {
        return Err(PoolhouseError::configuration("timeout must be > 0, got 0"));
    }
    if recycle_secs == 0 {
        return Err(PoolhouseError::configuration("recycle must be > 0, got 0"));
    }
    Ok(())
}

/// Parse a config record from command-line style arguments plus its environment
/// variables, then validate it.
pub fn parse_config<C, I, T>(args: I) -> PoolhouseResult<C>
where
    C: clap::Parser + WarehouseConfig,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let config = C::try_parse_from(args)
        .map_err(|e| PoolhouseError::configuration(e.to_string().trim_end().to_string()))?;
    config.validate()?;
    Ok(config)
}
