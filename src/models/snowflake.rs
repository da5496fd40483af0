//! Snowflake configuration and its `adbc.snowflake.sql.*` parameters.

use super::driver::{ParamMap, insert_bool, insert_opt};
use super::macros::impl_warehouse_config;
use super::secret::SecretString;
use super::warehouse::{Backend, DriverParams};
use crate::config::{
    DEFAULT_MAX_OVERFLOW, DEFAULT_POOL_SIZE, DEFAULT_RECYCLE_SECS, DEFAULT_TIMEOUT_SECS,
};
use crate::error::{PoolhouseError, PoolhouseResult};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

const PREFIX: &str = "adbc.snowflake.sql";

/// Snowflake warehouse configuration. Env prefix: `SNOWFLAKE_`.
///
/// Authentication is chosen with `auth_type` (`auth_snowflake`, `auth_jwt`, `auth_oauth`,
/// `auth_ext_browser`, `auth_okta`, `auth_mfa`, `auth_pat`, `auth_wif`). Key-pair auth reads
/// the key either from `private_key_path` or inline from `private_key_pem`, never both.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "snowflake", about = "Snowflake")]
pub struct SnowflakeConfig {
    /// Account identifier, e.g. 'myorg-myaccount'
    #[arg(long, env = "SNOWFLAKE_ACCOUNT")]
    pub account: String,

    #[arg(long, env = "SNOWFLAKE_USER")]
    pub user: Option<String>,

    #[arg(long, env = "SNOWFLAKE_PASSWORD", hide_env_values = true)]
    pub password: Option<SecretString>,

    #[arg(long, env = "SNOWFLAKE_AUTH_TYPE")]
    pub auth_type: Option<String>,

    /// Path to a PKCS1/PKCS8 private key file
    #[arg(long, env = "SNOWFLAKE_PRIVATE_KEY_PATH")]
    pub private_key_path: Option<PathBuf>,

    /// Inline PEM-encoded private key
    #[arg(long, env = "SNOWFLAKE_PRIVATE_KEY_PEM", hide_env_values = true)]
    pub private_key_pem: Option<SecretString>,

    #[arg(long, env = "SNOWFLAKE_PRIVATE_KEY_PASSPHRASE", hide_env_values = true)]
    pub private_key_passphrase: Option<SecretString>,

    /// JWT expiry, e.g. '300ms' or '1m30s'
    #[arg(long, env = "SNOWFLAKE_JWT_EXPIRE_TIMEOUT")]
    pub jwt_expire_timeout: Option<String>,

    #[arg(long, env = "SNOWFLAKE_OAUTH_TOKEN", hide_env_values = true)]
    pub oauth_token: Option<SecretString>,

    #[arg(long, env = "SNOWFLAKE_OKTA_URL")]
    pub okta_url: Option<String>,

    #[arg(long, env = "SNOWFLAKE_IDENTITY_PROVIDER")]
    pub identity_provider: Option<String>,

    #[arg(long, env = "SNOWFLAKE_DATABASE")]
    pub database: Option<String>,

    #[arg(long, env = "SNOWFLAKE_SCHEMA")]
    pub schema: Option<String>,

    #[arg(long, env = "SNOWFLAKE_WAREHOUSE")]
    pub warehouse: Option<String>,

    #[arg(long, env = "SNOWFLAKE_ROLE")]
    pub role: Option<String>,

    /// Region, when not embedded in the account identifier
    #[arg(long, env = "SNOWFLAKE_REGION")]
    pub region: Option<String>,

    #[arg(long, env = "SNOWFLAKE_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "SNOWFLAKE_PORT")]
    pub port: Option<u16>,

    /// 'http' or 'https'
    #[arg(long, env = "SNOWFLAKE_PROTOCOL")]
    pub protocol: Option<String>,

    #[arg(long, env = "SNOWFLAKE_LOGIN_TIMEOUT")]
    pub login_timeout: Option<String>,

    #[arg(long, env = "SNOWFLAKE_REQUEST_TIMEOUT")]
    pub request_timeout: Option<String>,

    #[arg(long, env = "SNOWFLAKE_CLIENT_TIMEOUT")]
    pub client_timeout: Option<String>,

    #[arg(long, env = "SNOWFLAKE_TLS_SKIP_VERIFY", default_value_t = false, action = ArgAction::Set)]
    pub tls_skip_verify: bool,

    #[arg(long, env = "SNOWFLAKE_OCSP_FAIL_OPEN_MODE", default_value_t = true, action = ArgAction::Set)]
    pub ocsp_fail_open_mode: bool,

    #[arg(long, env = "SNOWFLAKE_KEEP_SESSION_ALIVE", default_value_t = false, action = ArgAction::Set)]
    pub keep_session_alive: bool,

    #[arg(long, env = "SNOWFLAKE_APP_NAME")]
    pub app_name: Option<String>,

    #[arg(long, env = "SNOWFLAKE_DISABLE_TELEMETRY", default_value_t = false, action = ArgAction::Set)]
    pub disable_telemetry: bool,

    #[arg(long, env = "SNOWFLAKE_CACHE_MFA_TOKEN", default_value_t = false, action = ArgAction::Set)]
    pub cache_mfa_token: bool,

    #[arg(long, env = "SNOWFLAKE_STORE_TEMP_CREDS", default_value_t = false, action = ArgAction::Set)]
    pub store_temp_creds: bool,

    #[arg(long, env = "SNOWFLAKE_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: u32,

    #[arg(long, env = "SNOWFLAKE_MAX_OVERFLOW", default_value_t = DEFAULT_MAX_OVERFLOW)]
    pub max_overflow: u32,

    #[arg(long, env = "SNOWFLAKE_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    #[arg(long, env = "SNOWFLAKE_RECYCLE", default_value_t = DEFAULT_RECYCLE_SECS)]
    pub recycle: u64,
}

impl SnowflakeConfig {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            user: None,
            password: None,
            auth_type: None,
            private_key_path: None,
            private_key_pem: None,
            private_key_passphrase: None,
            jwt_expire_timeout: None,
            oauth_token: None,
            okta_url: None,
            identity_provider: None,
            database: None,
            schema: None,
            warehouse: None,
            role: None,
            region: None,
            host: None,
            port: None,
            protocol: None,
            login_timeout: None,
            request_timeout: None,
            client_timeout: None,
            tls_skip_verify: false,
            ocsp_fail_open_mode: true,
            keep_session_alive: false,
            app_name: None,
            disable_telemetry: false,
            cache_mfa_token: false,
            store_temp_creds: false,
            pool_size: DEFAULT_POOL_SIZE,
            max_overflow: DEFAULT_MAX_OVERFLOW,
            timeout: DEFAULT_TIMEOUT_SECS,
            recycle: DEFAULT_RECYCLE_SECS,
        }
    }

    fn check_fields(&self) -> PoolhouseResult<()> {
        if self.account.trim().is_empty() {
            return Err(PoolhouseError::configuration("account must not be empty"));
        }
        if self.private_key_path.is_some() && self.private_key_pem.is_some() {
            return Err(PoolhouseError::configuration(
                "Provide only one of private_key_path (path to a PKCS1/PKCS8 private key file) \
                 or private_key_pem (inline PEM-encoded key content), not both.",
            ));
        }
        Ok(())
    }
}

impl_warehouse_config!(SnowflakeConfig {
    backend: Backend::Snowflake,
    command: "snowflake",
    check: SnowflakeConfig::check_fields,
});

impl DriverParams for SnowflakeConfig {
    /// `username` and `password` are plain keys; everything else is prefixed.
    fn driver_params(&self) -> ParamMap {
        let key = |suffix: &str| format!("{PREFIX}.{suffix}");
        let mut params = ParamMap::new();

        params.insert(key("account"), self.account.clone());
        insert_opt(&mut params, "username", self.user.as_deref());
        insert_opt(
            &mut params,
            "password",
            self.password.as_ref().map(SecretString::expose_secret),
        );
        insert_opt(&mut params, &key("auth_type"), self.auth_type.as_deref());

        // key-pair and token auth
        insert_opt(
            &mut params,
            &key("client_option.jwt_private_key"),
            self.private_key_path.as_ref().map(|p| p.display()),
        );
        insert_opt(
            &mut params,
            &key("client_option.jwt_private_key_pkcs8_value"),
            self.private_key_pem.as_ref().map(SecretString::expose_secret),
        );
        insert_opt(
            &mut params,
            &key("client_option.jwt_private_key_pkcs8_password"),
            self.private_key_passphrase
                .as_ref()
                .map(SecretString::expose_secret),
        );
        insert_opt(
            &mut params,
            &key("client_option.jwt_expire_timeout"),
            self.jwt_expire_timeout.as_deref(),
        );
        insert_opt(
            &mut params,
            &key("client_option.auth_token"),
            self.oauth_token.as_ref().map(SecretString::expose_secret),
        );
        insert_opt(&mut params, &key("client_option.okta_url"), self.okta_url.as_deref());
        insert_opt(
            &mut params,
            &key("client_option.identity_provider"),
            self.identity_provider.as_deref(),
        );

        // session context
        insert_opt(&mut params, &key("db"), self.database.as_deref());
        insert_opt(&mut params, &key("schema"), self.schema.as_deref());
        insert_opt(&mut params, &key("warehouse"), self.warehouse.as_deref());
        insert_opt(&mut params, &key("role"), self.role.as_deref());
        insert_opt(&mut params, &key("region"), self.region.as_deref());

        // endpoint
        insert_opt(&mut params, &key("uri.host"), self.host.as_deref());
        insert_opt(&mut params, &key("uri.port"), self.port);
        insert_opt(&mut params, &key("uri.protocol"), self.protocol.as_deref());

        insert_opt(
            &mut params,
            &key("client_option.login_timeout"),
            self.login_timeout.as_deref(),
        );
        insert_opt(
            &mut params,
            &key("client_option.request_timeout"),
            self.request_timeout.as_deref(),
        );
        insert_opt(
            &mut params,
            &key("client_option.client_timeout"),
            self.client_timeout.as_deref(),
        );

        insert_bool(&mut params, &key("client_option.tls_skip_verify"), self.tls_skip_verify);
        insert_bool(
            &mut params,
            &key("client_option.ocsp_fail_open_mode"),
            self.ocsp_fail_open_mode,
        );
        insert_bool(
            &mut params,
            &key("client_option.keep_session_alive"),
            self.keep_session_alive,
        );
        insert_bool(
            &mut params,
            &key("client_option.disable_telemetry"),
            self.disable_telemetry,
        );
        insert_bool(&mut params, &key("client_option.cache_mfa_token"), self.cache_mfa_token);
        insert_bool(&mut params, &key("client_option.store_temp_creds"), self.store_temp_creds);
        insert_opt(&mut params, &key("client_option.app_name"), self.app_name.as_deref());

        params
    }
}
