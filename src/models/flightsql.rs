//! Arrow Flight SQL configuration.

use super::driver::{ParamMap, insert_bool, insert_opt};
use super::macros::impl_warehouse_config;
use super::secret::SecretString;
use super::warehouse::{Backend, DriverParams};
use crate::config::{
    DEFAULT_MAX_OVERFLOW, DEFAULT_POOL_SIZE, DEFAULT_RECYCLE_SECS, DEFAULT_TIMEOUT_SECS,
};
use clap::{ArgAction, Parser};

/// Flight SQL warehouse configuration. Env prefix: `FLIGHTSQL_`.
///
/// RPC timeouts are fractional seconds.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "flightsql", about = "Arrow Flight SQL")]
pub struct FlightSqlConfig {
    /// e.g. 'grpc+tls://host:443'
    #[arg(long, env = "FLIGHTSQL_URI")]
    pub uri: Option<String>,

    #[arg(long, env = "FLIGHTSQL_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "FLIGHTSQL_PASSWORD", hide_env_values = true)]
    pub password: Option<SecretString>,

    /// Raw authorization header; takes precedence over username/password
    #[arg(long, env = "FLIGHTSQL_AUTHORIZATION_HEADER", hide_env_values = true)]
    pub authorization_header: Option<SecretString>,

    #[arg(long, env = "FLIGHTSQL_MTLS_CERT_CHAIN")]
    pub mtls_cert_chain: Option<String>,

    #[arg(long, env = "FLIGHTSQL_MTLS_PRIVATE_KEY", hide_env_values = true)]
    pub mtls_private_key: Option<SecretString>,

    #[arg(long, env = "FLIGHTSQL_TLS_ROOT_CERTS")]
    pub tls_root_certs: Option<String>,

    #[arg(long, env = "FLIGHTSQL_TLS_SKIP_VERIFY", default_value_t = false, action = ArgAction::Set)]
    pub tls_skip_verify: bool,

    #[arg(long, env = "FLIGHTSQL_TLS_OVERRIDE_HOSTNAME")]
    pub tls_override_hostname: Option<String>,

    #[arg(long, env = "FLIGHTSQL_CONNECT_TIMEOUT")]
    pub connect_timeout: Option<f64>,

    #[arg(long, env = "FLIGHTSQL_QUERY_TIMEOUT")]
    pub query_timeout: Option<f64>,

    #[arg(long, env = "FLIGHTSQL_FETCH_TIMEOUT")]
    pub fetch_timeout: Option<f64>,

    #[arg(long, env = "FLIGHTSQL_UPDATE_TIMEOUT")]
    pub update_timeout: Option<f64>,

    #[arg(long, env = "FLIGHTSQL_AUTHORITY")]
    pub authority: Option<String>,

    /// Maximum gRPC message size in bytes
    #[arg(long, env = "FLIGHTSQL_MAX_MSG_SIZE")]
    pub max_msg_size: Option<u64>,

    #[arg(long, env = "FLIGHTSQL_WITH_COOKIE_MIDDLEWARE", default_value_t = false, action = ArgAction::Set)]
    pub with_cookie_middleware: bool,

    #[arg(long, env = "FLIGHTSQL_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: u32,

    #[arg(long, env = "FLIGHTSQL_MAX_OVERFLOW", default_value_t = DEFAULT_MAX_OVERFLOW)]
    pub max_overflow: u32,

    #[arg(long, env = "FLIGHTSQL_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    #[arg(long, env = "FLIGHTSQL_RECYCLE", default_value_t = DEFAULT_RECYCLE_SECS)]
    pub recycle: u64,
}

impl Default for FlightSqlConfig {
    fn default() -> Self {
        Self {
            uri: None,
            username: None,
            password: None,
            authorization_header: None,
            mtls_cert_chain: None,
            mtls_private_key: None,
            tls_root_certs: None,
            tls_skip_verify: false,
            tls_override_hostname: None,
            connect_timeout: None,
            query_timeout: None,
            fetch_timeout: None,
            update_timeout: None,
            authority: None,
            max_msg_size: None,
            with_cookie_middleware: false,
            pool_size: DEFAULT_POOL_SIZE,
            max_overflow: DEFAULT_MAX_OVERFLOW,
            timeout: DEFAULT_TIMEOUT_SECS,
            recycle: DEFAULT_RECYCLE_SECS,
        }
    }
}

impl_warehouse_config!(FlightSqlConfig {
    backend: Backend::FlightSql,
    command: "flightsql",
});

impl DriverParams for FlightSqlConfig {
    fn driver_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        insert_opt(&mut params, "uri", self.uri.as_deref());
        insert_opt(&mut params, "username", self.username.as_deref());
        insert_opt(
            &mut params,
            "password",
            self.password.as_ref().map(SecretString::expose_secret),
        );
        insert_opt(
            &mut params,
            "adbc.flight.sql.authorization_header",
            self.authorization_header
                .as_ref()
                .map(SecretString::expose_secret),
        );
        insert_opt(
            &mut params,
            "adbc.flight.sql.client_option.mtls_cert_chain",
            self.mtls_cert_chain.as_deref(),
        );
        insert_opt(
            &mut params,
            "adbc.flight.sql.client_option.mtls_private_key",
            self.mtls_private_key.as_ref().map(SecretString::expose_secret),
        );
        insert_opt(
            &mut params,
            "adbc.flight.sql.client_option.tls_root_certs",
            self.tls_root_certs.as_deref(),
        );
        insert_bool(
            &mut params,
            "adbc.flight.sql.client_option.tls_skip_verify",
            self.tls_skip_verify,
        );
        insert_opt(
            &mut params,
            "adbc.flight.sql.client_option.tls_override_hostname",
            self.tls_override_hostname.as_deref(),
        );
        insert_opt(
            &mut params,
            "adbc.flight.sql.rpc.timeout_seconds.connect",
            self.connect_timeout,
        );
        insert_opt(
            &mut params,
            "adbc.flight.sql.rpc.timeout_seconds.query",
            self.query_timeout,
        );
        insert_opt(
            &mut params,
            "adbc.flight.sql.rpc.timeout_seconds.fetch",
            self.fetch_timeout,
        );
        insert_opt(
            &mut params,
            "adbc.flight.sql.rpc.timeout_seconds.update",
            self.update_timeout,
        );
        insert_opt(
            &mut params,
            "adbc.flight.sql.client_option.authority",
            self.authority.as_deref(),
        );
        insert_opt(
            &mut params,
            "adbc.flight.sql.client_option.with_max_msg_size",
            self.max_msg_size,
        );
        insert_bool(
            &mut params,
            "adbc.flight.sql.rpc.with_cookie_middleware",
            self.with_cookie_middleware,
        );
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_always_present() {
        let params = FlightSqlConfig::default().driver_params();
        assert_eq!(params.len(), 2);
        assert_eq!(params["adbc.flight.sql.client_option.tls_skip_verify"], "false");
        assert_eq!(params["adbc.flight.sql.rpc.with_cookie_middleware"], "false");
    }

    #[test]
    fn test_timeouts_and_auth() {
        let config = FlightSqlConfig {
            uri: Some("grpc+tls://flight.local:443".into()),
            authorization_header: Some("Bearer abc".into()),
            connect_timeout: Some(2.5),
            max_msg_size: Some(16_777_216),
            with_cookie_middleware: true,
            ..FlightSqlConfig::default()
        };
        let params = config.driver_params();
        assert_eq!(params["uri"], "grpc+tls://flight.local:443");
        assert_eq!(params["adbc.flight.sql.authorization_header"], "Bearer abc");
        assert_eq!(params["adbc.flight.sql.rpc.timeout_seconds.connect"], "2.5");
        assert_eq!(
            params["adbc.flight.sql.client_option.with_max_msg_size"],
            "16777216"
        );
        assert_eq!(params["adbc.flight.sql.rpc.with_cookie_middleware"], "true");
    }
}
