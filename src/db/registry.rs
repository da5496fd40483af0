//! Backend registry.
//!
//! One exhaustive match ties every [`Backend`] to its config type, its driver
//! distribution channel and its parameter translator. Adding a backend without filling in
//! all three does not compile.

use crate::error::{PoolhouseError, PoolhouseResult};
use crate::models::{
    Backend, BigQueryConfig, DatabricksConfig, DriverParams, DuckDbConfig, FlightSqlConfig,
    MssqlConfig, ParamMap, PostgreSqlConfig, RedshiftConfig, SnowflakeConfig, TeradataConfig,
    TrinoConfig, WarehouseConfig,
};
use std::any::Any;

/// How a backend's native driver is distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverSource {
    /// Published as a package on the general index. Found through local discovery, or
    /// left to the driver manager's manifest search under the package name.
    PackageIndex {
        package: &'static str,
        extra: &'static str,
    },
    /// Only distributed through the foundry manifest registry.
    Foundry {
        driver_name: &'static str,
        install_name: &'static str,
    },
    /// Compiled into another package's extension module; no manifest exists.
    BundledExtension {
        module: &'static str,
        extra: &'static str,
    },
}

/// Registry entry for one backend.
#[derive(Clone, Copy)]
pub struct BackendEntry {
    pub backend: Backend,
    pub source: DriverSource,
    accepts: fn(&dyn Any) -> bool,
    translate: fn(&dyn WarehouseConfig) -> Option<ParamMap>,
}

impl std::fmt::Debug for BackendEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendEntry")
            .field("backend", &self.backend)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl BackendEntry {
    /// True when `config` is the record type registered for this backend.
    pub fn accepts(&self, config: &dyn WarehouseConfig) -> bool {
        (self.accepts)(config.as_any())
    }
}

fn is_type<T: Any>(value: &dyn Any) -> bool {
    value.is::<T>()
}

fn translate_as<T>(config: &dyn WarehouseConfig) -> Option<ParamMap>
where
    T: WarehouseConfig + DriverParams,
{
    config
        .as_any()
        .downcast_ref::<T>()
        .map(DriverParams::driver_params)
}

macro_rules! entry {
    ($backend:expr, $config:ty, $source:expr) => {
        BackendEntry {
            backend: $backend,
            source: $source,
            accepts: is_type::<$config>,
            translate: translate_as::<$config>,
        }
    };
}

/// Get the registry entry for `backend`.
pub fn entry(backend: Backend) -> BackendEntry {
    use DriverSource::*;
    match backend {
        Backend::BigQuery => entry!(
            backend,
            BigQueryConfig,
            PackageIndex {
                package: "adbc_driver_bigquery",
                extra: "bigquery",
            }
        ),
        Backend::FlightSql => entry!(
            backend,
            FlightSqlConfig,
            PackageIndex {
                package: "adbc_driver_flightsql",
                extra: "flightsql",
            }
        ),
        Backend::PostgreSql => entry!(
            backend,
            PostgreSqlConfig,
            PackageIndex {
                package: "adbc_driver_postgresql",
                extra: "postgresql",
            }
        ),
        Backend::Snowflake => entry!(
            backend,
            SnowflakeConfig,
            PackageIndex {
                package: "adbc_driver_snowflake",
                extra: "snowflake",
            }
        ),
        Backend::DuckDb => entry!(
            backend,
            DuckDbConfig,
            BundledExtension {
                module: "_duckdb",
                extra: "duckdb",
            }
        ),
        Backend::Databricks => entry!(
            backend,
            DatabricksConfig,
            Foundry {
                driver_name: "databricks",
                install_name: "databricks",
            }
        ),
        Backend::Mssql => entry!(
            backend,
            MssqlConfig,
            Foundry {
                driver_name: "mssql",
                install_name: "mssql",
            }
        ),
        Backend::Redshift => entry!(
            backend,
            RedshiftConfig,
            Foundry {
                driver_name: "redshift",
                install_name: "redshift",
            }
        ),
        Backend::Teradata => entry!(
            backend,
            TeradataConfig,
            Foundry {
                driver_name: "teradata",
                install_name: "teradata",
            }
        ),
        Backend::Trino => entry!(
            backend,
            TrinoConfig,
            Foundry {
                driver_name: "trino",
                install_name: "trino",
            }
        ),
    }
}

/// Look up the entry for `config`, checking that its concrete type is the registered one.
pub fn entry_for(config: &dyn WarehouseConfig) -> PoolhouseResult<BackendEntry> {
    let entry = entry(config.backend());
    if entry.accepts(config) {
        Ok(entry)
    } else {
        Err(PoolhouseError::unsupported_config_type(config.type_name()))
    }
}

/// Install name for a foundry driver, if `driver` names one.
pub fn foundry_install_name(driver: &str) -> Option<&'static str> {
    Backend::ALL
        .iter()
        .find_map(|backend| match entry(*backend).source {
            DriverSource::Foundry {
                driver_name,
                install_name,
            } if driver_name == driver => Some(install_name),
            _ => None,
        })
}

/// Translate a config record into its driver parameters.
pub fn translate_config(config: &dyn WarehouseConfig) -> PoolhouseResult<ParamMap> {
    let entry = entry_for(config)?;
    (entry.translate)(config)
        .ok_or_else(|| PoolhouseError::unsupported_config_type(config.type_name()))
}
