//! Trino configuration.

use super::driver::{ParamMap, insert_bool, insert_opt};
use super::macros::impl_warehouse_config;
use super::secret::SecretString;
use super::warehouse::{Backend, DriverParams};
use crate::config::{
    DEFAULT_MAX_OVERFLOW, DEFAULT_POOL_SIZE, DEFAULT_RECYCLE_SECS, DEFAULT_TIMEOUT_SECS,
};
use clap::{ArgAction, Parser};

/// Trino warehouse configuration. Env prefix: `TRINO_`.
///
/// Either a full `uri` or the decomposed host fields; `uri` wins when both are set.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "trino", about = "Trino")]
pub struct TrinoConfig {
    #[arg(long, env = "TRINO_URI", hide_env_values = true)]
    pub uri: Option<String>,

    #[arg(long, env = "TRINO_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "TRINO_PORT")]
    pub port: Option<u16>,

    #[arg(long, env = "TRINO_USER")]
    pub user: Option<String>,

    #[arg(long, env = "TRINO_PASSWORD", hide_env_values = true)]
    pub password: Option<SecretString>,

    #[arg(long, env = "TRINO_CATALOG")]
    pub catalog: Option<String>,

    #[arg(long, env = "TRINO_SCHEMA")]
    pub schema: Option<String>,

    #[arg(long, env = "TRINO_SSL", default_value_t = true, action = ArgAction::Set)]
    pub ssl: bool,

    #[arg(long, env = "TRINO_SSL_VERIFY", default_value_t = true, action = ArgAction::Set)]
    pub ssl_verify: bool,

    /// Client name reported to the coordinator
    #[arg(long, env = "TRINO_SOURCE")]
    pub source: Option<String>,

    #[arg(long, env = "TRINO_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: u32,

    #[arg(long, env = "TRINO_MAX_OVERFLOW", default_value_t = DEFAULT_MAX_OVERFLOW)]
    pub max_overflow: u32,

    #[arg(long, env = "TRINO_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    #[arg(long, env = "TRINO_RECYCLE", default_value_t = DEFAULT_RECYCLE_SECS)]
    pub recycle: u64,
}

impl Default for TrinoConfig {
    fn default() -> Self {
        Self {
            uri: None,
            host: None,
            port: None,
            user: None,
            password: None,
            catalog: None,
            schema: None,
            ssl: true,
            ssl_verify: true,
            source: None,
            pool_size: DEFAULT_POOL_SIZE,
            max_overflow: DEFAULT_MAX_OVERFLOW,
            timeout: DEFAULT_TIMEOUT_SECS,
            recycle: DEFAULT_RECYCLE_SECS,
        }
    }
}

impl_warehouse_config!(TrinoConfig {
    backend: Backend::Trino,
    command: "trino",
});

impl DriverParams for TrinoConfig {
    fn driver_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        if let Some(uri) = &self.uri {
            params.insert("uri".to_string(), uri.clone());
            return params;
        }
        insert_opt(&mut params, "host", self.host.as_deref());
        insert_opt(&mut params, "port", self.port);
        insert_opt(&mut params, "username", self.user.as_deref());
        insert_opt(
            &mut params,
            "password",
            self.password.as_ref().map(SecretString::expose_secret),
        );
        insert_opt(&mut params, "catalog", self.catalog.as_deref());
        insert_opt(&mut params, "schema", self.schema.as_deref());
        insert_bool(&mut params, "ssl", self.ssl);
        insert_bool(&mut params, "ssl_verify", self.ssl_verify);
        insert_opt(&mut params, "source", self.source.as_deref());
        params
    }
}
