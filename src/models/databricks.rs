//! Databricks configuration.
//!
//! The foundry driver connects from a single URI; the decomposed fields document the
//! pieces users usually assemble it from.

use super::driver::{ParamMap, insert_opt};
use super::macros::impl_warehouse_config;
use super::secret::SecretString;
use super::warehouse::{Backend, DriverParams};
use crate::config::{
    DEFAULT_MAX_OVERFLOW, DEFAULT_POOL_SIZE, DEFAULT_RECYCLE_SECS, DEFAULT_TIMEOUT_SECS,
};
use clap::Parser;

/// Databricks warehouse configuration. Env prefix: `DATABRICKS_`.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "databricks", about = "Databricks SQL")]
pub struct DatabricksConfig {
    /// 'databricks://token:<pat>@<host>:443/<http_path>'; secret since it may embed a token
    #[arg(long, env = "DATABRICKS_URI", hide_env_values = true)]
    pub uri: Option<SecretString>,

    #[arg(long, env = "DATABRICKS_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "DATABRICKS_HTTP_PATH")]
    pub http_path: Option<String>,

    #[arg(long, env = "DATABRICKS_TOKEN", hide_env_values = true)]
    pub token: Option<SecretString>,

    #[arg(long, env = "DATABRICKS_AUTH_TYPE")]
    pub auth_type: Option<String>,

    #[arg(long, env = "DATABRICKS_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, env = "DATABRICKS_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<SecretString>,

    #[arg(long, env = "DATABRICKS_CATALOG")]
    pub catalog: Option<String>,

    #[arg(long, env = "DATABRICKS_SCHEMA")]
    pub schema: Option<String>,

    #[arg(long, env = "DATABRICKS_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: u32,

    #[arg(long, env = "DATABRICKS_MAX_OVERFLOW", default_value_t = DEFAULT_MAX_OVERFLOW)]
    pub max_overflow: u32,

    #[arg(long, env = "DATABRICKS_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    #[arg(long, env = "DATABRICKS_RECYCLE", default_value_t = DEFAULT_RECYCLE_SECS)]
    pub recycle: u64,
}

impl Default for DatabricksConfig {
    fn default() -> Self {
        Self {
            uri: None,
            host: None,
            http_path: None,
            token: None,
            auth_type: None,
            client_id: None,
            client_secret: None,
            catalog: None,
            schema: None,
            pool_size: DEFAULT_POOL_SIZE,
            max_overflow: DEFAULT_MAX_OVERFLOW,
            timeout: DEFAULT_TIMEOUT_SECS,
            recycle: DEFAULT_RECYCLE_SECS,
        }
    }
}

impl_warehouse_config!(DatabricksConfig {
    backend: Backend::Databricks,
    command: "databricks",
});

impl DriverParams for DatabricksConfig {
    fn driver_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        insert_opt(
            &mut params,
            "uri",
            self.uri.as_ref().map(SecretString::expose_secret),
        );
        params
    }
}
