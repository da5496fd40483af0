//! Amazon Redshift configuration.

use super::driver::{ParamMap, insert_opt};
use super::macros::impl_warehouse_config;
use super::secret::SecretString;
use super::warehouse::{Backend, DriverParams};
use crate::config::{
    DEFAULT_MAX_OVERFLOW, DEFAULT_POOL_SIZE, DEFAULT_RECYCLE_SECS, DEFAULT_TIMEOUT_SECS,
};
use clap::Parser;

/// Redshift warehouse configuration. Env prefix: `REDSHIFT_`.
///
/// Only `uri` reaches the driver; IAM and cluster fields describe how the URI was built.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "redshift", about = "Amazon Redshift")]
pub struct RedshiftConfig {
    #[arg(long, env = "REDSHIFT_URI")]
    pub uri: Option<String>,

    /// 'provisioned' or 'serverless'
    #[arg(long, env = "REDSHIFT_CLUSTER_TYPE")]
    pub cluster_type: Option<String>,

    #[arg(long, env = "REDSHIFT_CLUSTER_IDENTIFIER")]
    pub cluster_identifier: Option<String>,

    #[arg(long, env = "REDSHIFT_WORKGROUP_NAME")]
    pub workgroup_name: Option<String>,

    #[arg(long, env = "REDSHIFT_AWS_REGION")]
    pub aws_region: Option<String>,

    #[arg(long, env = "REDSHIFT_AWS_ACCESS_KEY_ID")]
    pub aws_access_key_id: Option<String>,

    #[arg(long, env = "REDSHIFT_AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub aws_secret_access_key: Option<SecretString>,

    #[arg(long, env = "REDSHIFT_SSLMODE")]
    pub sslmode: Option<String>,

    #[arg(long, env = "REDSHIFT_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: u32,

    #[arg(long, env = "REDSHIFT_MAX_OVERFLOW", default_value_t = DEFAULT_MAX_OVERFLOW)]
    pub max_overflow: u32,

    #[arg(long, env = "REDSHIFT_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    #[arg(long, env = "REDSHIFT_RECYCLE", default_value_t = DEFAULT_RECYCLE_SECS)]
    pub recycle: u64,
}

impl Default for RedshiftConfig {
    fn default() -> Self {
        Self {
            uri: None,
            cluster_type: None,
            cluster_identifier: None,
            workgroup_name: None,
            aws_region: None,
            aws_access_key_id: None,
            aws_secret_access_key: None,
            sslmode: None,
            pool_size: DEFAULT_POOL_SIZE,
            max_overflow: DEFAULT_MAX_OVERFLOW,
            timeout: DEFAULT_TIMEOUT_SECS,
            recycle: DEFAULT_RECYCLE_SECS,
        }
    }
}

impl_warehouse_config!(RedshiftConfig {
    backend: Backend::Redshift,
    command: "redshift",
});

impl DriverParams for RedshiftConfig {
    fn driver_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        insert_opt(&mut params, "uri", self.uri.as_deref());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_only() {
        let config = RedshiftConfig {
            uri: Some("redshift://analyst@cluster.region.redshift.amazonaws.com:5439/dev".into()),
            aws_region: Some("eu-west-1".into()),
            ..RedshiftConfig::default()
        };
        let params = config.driver_params();
        assert_eq!(params.len(), 1);
        assert!(params["uri"].starts_with("redshift://"));
    }
}
