//! Configuration handling for adbc-poolhouse.
//!
//! Pool defaults, per-call pool overrides, and the command-line interface of the
//! diagnostic binary.

use crate::error::{PoolhouseError, PoolhouseResult};
use crate::models::{
    BigQueryConfig, DatabricksConfig, DuckDbConfig, FlightSqlConfig, MssqlConfig,
    PostgreSqlConfig, RedshiftConfig, SnowflakeConfig, TeradataConfig, TrinoConfig,
    WarehouseConfig, validate_pool_tuning,
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Pool configuration defaults
pub const DEFAULT_POOL_SIZE: u32 = 5;
pub const DEFAULT_MAX_OVERFLOW: u32 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RECYCLE_SECS: u64 = 3600;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Optional overrides of a config's pool tuning. A present value wins over the config's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolOptions {
    /// Connections kept open in the pool
    pub pool_size: Option<u32>,
    /// Extra connections allowed above pool_size
    pub max_overflow: Option<u32>,
    /// Seconds a checkout waits for a connection
    pub timeout_secs: Option<u64>,
    /// Seconds before an idle connection is replaced
    pub recycle_secs: Option<u64>,
}

impl PoolOptions {
    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    pub fn with_max_overflow(mut self, max_overflow: u32) -> Self {
        self.max_overflow = Some(max_overflow);
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn with_recycle_secs(mut self, recycle_secs: u64) -> Self {
        self.recycle_secs = Some(recycle_secs);
        self
    }

    /// Get pool_size, falling back to the config's value.
    pub fn pool_size_or(&self, config: &dyn WarehouseConfig) -> u32 {
        self.pool_size.unwrap_or_else(|| config.pool_size())
    }

    /// Get max_overflow, falling back to the config's value.
    pub fn max_overflow_or(&self, config: &dyn WarehouseConfig) -> u32 {
        self.max_overflow.unwrap_or_else(|| config.max_overflow())
    }

    /// Get timeout_secs, falling back to the config's value.
    pub fn timeout_secs_or(&self, config: &dyn WarehouseConfig) -> u64 {
        self.timeout_secs.unwrap_or_else(|| config.timeout_secs())
    }

    /// Get recycle_secs, falling back to the config's value.
    pub fn recycle_secs_or(&self, config: &dyn WarehouseConfig) -> u64 {
        self.recycle_secs.unwrap_or_else(|| config.recycle_secs())
    }

    /// Validate the overrides that are present.
    pub fn validate(&self) -> PoolhouseResult<()> {
        if self.pool_size == Some(0) {
            return Err(PoolhouseError::configuration(
                "pool_size override must be > 0, got 0",
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(PoolhouseError::configuration(
                "timeout override must be > 0, got 0",
            ));
        }
        if self.recycle_secs == Some(0) {
            return Err(PoolhouseError::configuration(
                "recycle override must be > 0, got 0",
            ));
        }
        Ok(())
    }

    /// Merge these overrides with `config` into the settings the pool is built with.
    pub fn resolve(&self, config: &dyn WarehouseConfig) -> PoolhouseResult<PoolSettings> {
        self.validate()?;
        let settings = PoolSettings {
            pool_size: self.pool_size_or(config),
            max_overflow: self.max_overflow_or(config),
            timeout_secs: self.timeout_secs_or(config),
            recycle_secs: self.recycle_secs_or(config),
        };
        validate_pool_tuning(
            settings.pool_size,
            settings.timeout_secs,
            settings.recycle_secs,
        )?;
        Ok(settings)
    }
}

/// Effective pool tuning after overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolSettings {
    pub pool_size: u32,
    pub max_overflow: u32,
    pub timeout_secs: u64,
    pub recycle_secs: u64,
}

impl PoolSettings {
    /// Get the checkout timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the recycle age as a Duration.
    pub fn recycle(&self) -> Duration {
        Duration::from_secs(self.recycle_secs)
    }
}

/// Configuration for the adbc-poolhouse diagnostic CLI.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "adbc-poolhouse",
    about = "Inspect how warehouse configs resolve to ADBC drivers and pools",
    version,
    author
)]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_LOG_LEVEL,
        env = "POOLHOUSE_LOG_LEVEL"
    )]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, global = true, env = "POOLHOUSE_JSON_LOGS")]
    pub json_logs: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the driver identifier the driver manager would load
    Resolve {
        #[command(subcommand)]
        warehouse: WarehouseArgs,
    },

    /// Print the translated driver parameters, secrets redacted
    Params {
        /// Print as a JSON object
        #[arg(long)]
        json: bool,

        #[command(subcommand)]
        warehouse: WarehouseArgs,
    },

    /// Validate the config and print the effective pool settings
    Check {
        #[command(subcommand)]
        warehouse: WarehouseArgs,
    },
}

/// One warehouse config, parsed from its flags and environment variables.
#[derive(Debug, Clone, Subcommand)]
pub enum WarehouseArgs {
    Bigquery(BigQueryConfig),
    Databricks(DatabricksConfig),
    Duckdb(DuckDbConfig),
    #[command(name = "flightsql")]
    FlightSql(FlightSqlConfig),
    Mssql(MssqlConfig),
    #[command(name = "postgresql")]
    PostgreSql(PostgreSqlConfig),
    Redshift(RedshiftConfig),
    Snowflake(SnowflakeConfig),
    Teradata(TeradataConfig),
    Trino(TrinoConfig),
}

impl WarehouseArgs {
    pub fn as_config(&self) -> &dyn WarehouseConfig {
        match self {
            Self::Bigquery(c) => c,
            Self::Databricks(c) => c,
            Self::Duckdb(c) => c,
            Self::FlightSql(c) => c,
            Self::Mssql(c) => c,
            Self::PostgreSql(c) => c,
            Self::Redshift(c) => c,
            Self::Snowflake(c) => c,
            Self::Teradata(c) => c,
            Self::Trino(c) => c,
        }
    }
}

impl Command {
    pub fn warehouse(&self) -> &WarehouseArgs {
        match self {
            Self::Resolve { warehouse } | Self::Params { warehouse, .. } | Self::Check { warehouse } => {
                warehouse
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Backend;

    #[test]
    fn test_overrides_win_over_config() {
        let config = TrinoConfig::default();
        let settings = PoolOptions::default()
            .with_pool_size(10)
            .with_timeout_secs(5)
            .resolve(&config)
            .unwrap();
        assert_eq!(settings.pool_size, 10);
        assert_eq!(settings.timeout(), Duration::from_secs(5));
        assert_eq!(settings.max_overflow, DEFAULT_MAX_OVERFLOW);
        assert_eq!(settings.recycle(), Duration::from_secs(DEFAULT_RECYCLE_SECS));
    }

    #[test]
    fn test_config_values_used_without_overrides() {
        let config = DuckDbConfig::default();
        let settings = PoolOptions::default().resolve(&config).unwrap();
        assert_eq!(settings.pool_size, 1);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_zero_overrides_rejected() {
        let config = TrinoConfig::default();
        for options in [
            PoolOptions::default().with_pool_size(0),
            PoolOptions::default().with_timeout_secs(0),
            PoolOptions::default().with_recycle_secs(0),
        ] {
            let err = options.resolve(&config).unwrap_err();
            assert!(matches!(err, PoolhouseError::Configuration { .. }));
        }
    }

    #[test]
    fn test_zero_max_overflow_allowed() {
        let config = TrinoConfig::default();
        let settings = PoolOptions::default()
            .with_max_overflow(0)
            .resolve(&config)
            .unwrap();
        assert_eq!(settings.max_overflow, 0);
    }

    #[test]
    fn test_pool_options_serde() {
        let options: PoolOptions = serde_json::from_str(r#"{"pool_size": 8}"#).unwrap();
        assert_eq!(options.pool_size, Some(8));
        assert_eq!(options.recycle_secs, None);
    }

    #[test]
    fn test_parse_resolve_subcommand() {
        let config = Config::try_parse_from([
            "adbc-poolhouse",
            "resolve",
            "trino",
            "--uri",
            "trino://localhost:8080/hive",
        ])
        .unwrap();
        let warehouse = config.command.warehouse();
        assert_eq!(warehouse.as_config().backend(), Backend::Trino);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_parse_params_json_with_global_flag() {
        let config = Config::try_parse_from([
            "adbc-poolhouse",
            "params",
            "--json",
            "duckdb",
            "--database",
            "/tmp/warehouse.db",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(config.log_level, "debug");
        match &config.command {
            Command::Params { json, warehouse } => {
                assert!(*json);
                assert_eq!(warehouse.as_config().backend(), Backend::DuckDb);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_subcommand_names() {
        for (name, backend) in [
            ("bigquery", Backend::BigQuery),
            ("flightsql", Backend::FlightSql),
            ("postgresql", Backend::PostgreSql),
            ("mssql", Backend::Mssql),
        ] {
            let config = Config::try_parse_from(["adbc-poolhouse", "check", name]).unwrap();
            assert_eq!(config.command.warehouse().as_config().backend(), backend);
        }
    }
}
