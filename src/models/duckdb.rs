//! DuckDB configuration.
//!
//! The DuckDB driver ships inside the `duckdb` package's compiled extension rather than
//! as a standalone driver, and exports a non-default init symbol.

use super::driver::ParamMap;
use super::macros::impl_warehouse_config;
use super::warehouse::{Backend, DriverParams};
use crate::config::{DEFAULT_MAX_OVERFLOW, DEFAULT_RECYCLE_SECS, DEFAULT_TIMEOUT_SECS};
use crate::error::{PoolhouseError, PoolhouseResult};
use clap::{ArgAction, Parser};

pub const MEMORY_DATABASE: &str = ":memory:";
pub const DUCKDB_ENTRYPOINT: &str = "duckdb_adbc_init";
/// In-memory databases are private to each connection, so one connection is the default.
pub const DEFAULT_DUCKDB_POOL_SIZE: u32 = 1;

/// DuckDB warehouse configuration. Env prefix: `DUCKDB_`.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "duckdb", about = "DuckDB (driver bundled with the duckdb package)")]
pub struct DuckDbConfig {
    /// Database file path, or ':memory:'
    #[arg(long, env = "DUCKDB_DATABASE", default_value = MEMORY_DATABASE)]
    pub database: String,

    /// Open the database read-only
    #[arg(long, env = "DUCKDB_READ_ONLY", default_value_t = false, action = ArgAction::Set)]
    pub read_only: bool,

    #[arg(long, env = "DUCKDB_POOL_SIZE", default_value_t = DEFAULT_DUCKDB_POOL_SIZE)]
    pub pool_size: u32,

    #[arg(long, env = "DUCKDB_MAX_OVERFLOW", default_value_t = DEFAULT_MAX_OVERFLOW)]
    pub max_overflow: u32,

    #[arg(long, env = "DUCKDB_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    #[arg(long, env = "DUCKDB_RECYCLE", default_value_t = DEFAULT_RECYCLE_SECS)]
    pub recycle: u64,
}

impl DuckDbConfig {
    /// Config for a database file; pool tuning at the library defaults.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            database: path.into(),
            ..Self::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.database == MEMORY_DATABASE
    }

    fn check_fields(&self) -> PoolhouseResult<()> {
        if self.database.trim().is_empty() {
            return Err(PoolhouseError::configuration(format!(
                "database must be a non-empty string, got {:?}",
                self.database
            )));
        }
        if self.is_memory() && self.pool_size > 1 {
            return Err(PoolhouseError::configuration(
                "pool_size > 1 with database=\":memory:\" gives every pool connection its own \
                 empty in-memory database, so shared state is impossible. Use pool_size=1 for \
                 in-memory DuckDB, or point database at a file.",
            ));
        }
        Ok(())
    }
}

impl Default for DuckDbConfig {
    fn default() -> Self {
        Self {
            database: MEMORY_DATABASE.to_string(),
            read_only: false,
            pool_size: DEFAULT_DUCKDB_POOL_SIZE,
            max_overflow: DEFAULT_MAX_OVERFLOW,
            timeout: DEFAULT_TIMEOUT_SECS,
            recycle: DEFAULT_RECYCLE_SECS,
        }
    }
}

impl_warehouse_config!(DuckDbConfig {
    backend: Backend::DuckDb,
    command: "duckdb",
    entrypoint: DUCKDB_ENTRYPOINT,
    check: DuckDbConfig::check_fields,
});

impl DriverParams for DuckDbConfig {
    /// DuckDB takes `path` rather than `database`, and `access_mode` rather than a flag.
    fn driver_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("path".to_string(), self.database.clone());
        if self.read_only {
            params.insert("access_mode".to_string(), "READ_ONLY".to_string());
        }
        params
    }
}
