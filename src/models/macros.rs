//! Declarative macro for the warehouse config boilerplate.
//!
//! Every backend record carries the same four pool tuning fields under its own env prefix.
//! The macro implements [`WarehouseConfig`](crate::models::WarehouseConfig) over those
//! fields and adds `from_env`, so each backend file only states what is specific to it.

/// Implement `WarehouseConfig` for a record with `pool_size`, `max_overflow`, `timeout`
/// and `recycle` fields.
///
/// # Example
///
/// ```ignore
/// impl_warehouse_config!(DuckDbConfig {
///     backend: Backend::DuckDb,
///     command: "duckdb",
///     entrypoint: DUCKDB_ENTRYPOINT,
///     check: DuckDbConfig::check_fields,
/// });
/// ```
macro_rules! impl_warehouse_config {
    ($config:ident {
        backend: $backend:expr,
        command: $command:literal
        $(, entrypoint: $entrypoint:expr)?
        $(, check: $check:path)?
        $(,)?
    }) => {
        impl $crate::models::WarehouseConfig for $config {
            fn backend(&self) -> $crate::models::Backend {
                $backend
            }

            fn pool_size(&self) -> u32 {
                self.pool_size
            }

            fn max_overflow(&self) -> u32 {
                self.max_overflow
            }

            fn timeout_secs(&self) -> u64 {
                self.timeout
            }

            fn recycle_secs(&self) -> u64 {
                self.recycle
            }

            $(
                fn entrypoint(&self) -> Option<&str> {
                    Some($entrypoint)
                }
            )?

            fn validate(&self) -> $crate::error::PoolhouseResult<()> {
                $crate::models::validate_pool_tuning(self.pool_size, self.timeout, self.recycle)?;
                $( $check(self)?; )?
                Ok(())
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        impl $config {
            /// Build this config from its environment variables alone.
            pub fn from_env() -> $crate::error::PoolhouseResult<Self> {
                $crate::models::parse_config::<Self, _, _>([$command])
            }
        }
    };
}

pub(crate) use impl_warehouse_config;
