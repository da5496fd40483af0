//! BigQuery configuration.

use super::driver::{ParamMap, insert_opt};
use super::macros::impl_warehouse_config;
use super::secret::SecretString;
use super::warehouse::{Backend, DriverParams};
use crate::config::{
    DEFAULT_MAX_OVERFLOW, DEFAULT_POOL_SIZE, DEFAULT_RECYCLE_SECS, DEFAULT_TIMEOUT_SECS,
};
use clap::Parser;

/// BigQuery warehouse configuration. Env prefix: `BIGQUERY_`.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "bigquery", about = "Google BigQuery")]
pub struct BigQueryConfig {
    /// e.g. 'adbc.bigquery.sql.auth_type.json_credential_file'
    #[arg(long, env = "BIGQUERY_AUTH_TYPE")]
    pub auth_type: Option<String>,

    /// Credential file path or inline JSON, depending on auth_type
    #[arg(long, env = "BIGQUERY_AUTH_CREDENTIALS", hide_env_values = true)]
    pub auth_credentials: Option<SecretString>,

    #[arg(long, env = "BIGQUERY_AUTH_CLIENT_ID")]
    pub auth_client_id: Option<String>,

    #[arg(long, env = "BIGQUERY_AUTH_CLIENT_SECRET", hide_env_values = true)]
    pub auth_client_secret: Option<SecretString>,

    #[arg(long, env = "BIGQUERY_AUTH_REFRESH_TOKEN", hide_env_values = true)]
    pub auth_refresh_token: Option<SecretString>,

    #[arg(long, env = "BIGQUERY_PROJECT_ID")]
    pub project_id: Option<String>,

    #[arg(long, env = "BIGQUERY_DATASET_ID")]
    pub dataset_id: Option<String>,

    #[arg(long, env = "BIGQUERY_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: u32,

    #[arg(long, env = "BIGQUERY_MAX_OVERFLOW", default_value_t = DEFAULT_MAX_OVERFLOW)]
    pub max_overflow: u32,

    #[arg(long, env = "BIGQUERY_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    #[arg(long, env = "BIGQUERY_RECYCLE", default_value_t = DEFAULT_RECYCLE_SECS)]
    pub recycle: u64,
}

impl Default for BigQueryConfig {
    fn default() -> Self {
        Self {
            auth_type: None,
            auth_credentials: None,
            auth_client_id: None,
            auth_client_secret: None,
            auth_refresh_token: None,
            project_id: None,
            dataset_id: None,
            pool_size: DEFAULT_POOL_SIZE,
            max_overflow: DEFAULT_MAX_OVERFLOW,
            timeout: DEFAULT_TIMEOUT_SECS,
            recycle: DEFAULT_RECYCLE_SECS,
        }
    }
}

impl_warehouse_config!(BigQueryConfig {
    backend: Backend::BigQuery,
    command: "bigquery",
});

impl DriverParams for BigQueryConfig {
    fn driver_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        insert_opt(&mut params, "adbc.bigquery.sql.auth_type", self.auth_type.as_deref());
        insert_opt(
            &mut params,
            "adbc.bigquery.sql.auth_credentials",
            self.auth_credentials.as_ref().map(SecretString::expose_secret),
        );
        insert_opt(
            &mut params,
            "adbc.bigquery.sql.auth.client_id",
            self.auth_client_id.as_deref(),
        );
        insert_opt(
            &mut params,
            "adbc.bigquery.sql.auth.client_secret",
            self.auth_client_secret.as_ref().map(SecretString::expose_secret),
        );
        insert_opt(
            &mut params,
            "adbc.bigquery.sql.auth.refresh_token",
            self.auth_refresh_token.as_ref().map(SecretString::expose_secret),
        );
        insert_opt(&mut params, "adbc.bigquery.sql.project_id", self.project_id.as_deref());
        insert_opt(&mut params, "adbc.bigquery.sql.dataset_id", self.dataset_id.as_deref());
        params
    }
}
