//! Integration tests for driver resolution and parameter translation.

mod common;

use adbc_poolhouse::db::{SearchPathDiscovery, resolve_driver, translate_config};
use adbc_poolhouse::error::PoolhouseError;
use adbc_poolhouse::models::{
    Backend, BigQueryConfig, DatabricksConfig, DuckDbConfig, FlightSqlConfig, MssqlConfig,
    PostgreSqlConfig, RedshiftConfig, SnowflakeConfig, TeradataConfig, TrinoConfig,
    WarehouseConfig,
};
use common::StaticDiscovery;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn foundry_configs() -> Vec<Box<dyn WarehouseConfig>> {
    vec![
        Box::new(DatabricksConfig::default()),
        Box::new(MssqlConfig::default()),
        Box::new(RedshiftConfig::default()),
        Box::new(TeradataConfig::default()),
        Box::new(TrinoConfig::default()),
    ]
}

#[test]
fn test_foundry_backends_never_probe() {
    let discovery = StaticDiscovery::default();
    for config in foundry_configs() {
        let driver = resolve_driver(config.as_ref(), &discovery).unwrap();
        assert!(!driver.is_path());
        assert_eq!(driver.as_str(), config.backend().as_str());
    }
    assert_eq!(discovery.probes(), 0);
}

#[test]
fn test_package_hit_and_miss_on_disk() {
    let root = TempDir::new().unwrap();
    fs::create_dir(root.path().join("adbc_driver_snowflake")).unwrap();
    let discovery = SearchPathDiscovery::new([root.path().to_path_buf()]);

    let snowflake = resolve_driver(&SnowflakeConfig::new("acme-eu1"), &discovery).unwrap();
    assert!(snowflake.is_path());
    assert!(
        snowflake
            .to_path_buf()
            .starts_with(root.path().join("adbc_driver_snowflake"))
    );

    let bigquery = resolve_driver(&BigQueryConfig::default(), &discovery).unwrap();
    assert_eq!(bigquery.as_str(), "adbc_driver_bigquery");

    let flightsql = resolve_driver(&FlightSqlConfig::default(), &discovery).unwrap();
    assert_eq!(flightsql.as_str(), "adbc_driver_flightsql");
}

#[test]
fn test_package_hit_returns_accessor_path_verbatim() {
    let discovery = StaticDiscovery {
        package: Some(PathBuf::from("/opt/drivers/libadbc_driver_postgresql.so")),
        ..StaticDiscovery::default()
    };
    let driver = resolve_driver(&PostgreSqlConfig::default(), &discovery).unwrap();
    assert_eq!(driver.as_str(), "/opt/drivers/libadbc_driver_postgresql.so");
    assert_eq!(discovery.probes(), 1);
}

#[test]
fn test_duckdb_extension_on_disk() {
    let root = TempDir::new().unwrap();
    let ext = root.path().join("_duckdb.cpython-312-darwin.so");
    fs::write(&ext, b"").unwrap();
    let discovery = SearchPathDiscovery::new([root.path().to_path_buf()]);

    let driver = resolve_driver(&DuckDbConfig::default(), &discovery).unwrap();
    assert_eq!(driver.to_path_buf(), ext);
}

#[test]
fn test_duckdb_miss_is_a_single_probe() {
    let discovery = StaticDiscovery::default();
    let err = resolve_driver(&DuckDbConfig::default(), &discovery).unwrap_err();
    match &err {
        PoolhouseError::DriverNotInstalled { message, .. } => {
            assert!(message.contains("DuckDB ADBC driver not found"));
            assert!(message.contains("pip install adbc-poolhouse[duckdb]"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(discovery.probes(), 1);
}

#[test]
fn test_resolution_and_translation_are_deterministic() {
    let discovery = StaticDiscovery::default();
    let config = TrinoConfig {
        host: Some("trino.local".to_string()),
        port: Some(8443),
        user: Some("analyst".to_string()),
        catalog: Some("hive".to_string()),
        ..TrinoConfig::default()
    };
    let before = config.clone();

    let first = (
        resolve_driver(&config, &discovery).unwrap(),
        translate_config(&config).unwrap(),
    );
    let second = (
        resolve_driver(&config, &discovery).unwrap(),
        translate_config(&config).unwrap(),
    );
    assert_eq!(first, second);
    assert_eq!(config, before);
}

#[test]
fn test_every_backend_translates() {
    let configs: Vec<Box<dyn WarehouseConfig>> = vec![
        Box::new(BigQueryConfig::default()),
        Box::new(DuckDbConfig::default()),
        Box::new(FlightSqlConfig::default()),
        Box::new(PostgreSqlConfig::with_uri("postgresql://localhost/app")),
        Box::new(SnowflakeConfig::new("acme-eu1")),
    ];
    let mut seen: Vec<Backend> = Vec::new();
    for config in configs.iter().chain(foundry_configs().iter()) {
        translate_config(config.as_ref()).unwrap();
        seen.push(config.backend());
    }
    seen.sort_by_key(|backend| backend.as_str());
    seen.dedup();
    assert_eq!(seen.len(), Backend::ALL.len());
}

#[derive(Debug)]
struct HomegrownConfig;

impl WarehouseConfig for HomegrownConfig {
    fn backend(&self) -> Backend {
        Backend::PostgreSql
    }

    fn pool_size(&self) -> u32 {
        1
    }

    fn max_overflow(&self) -> u32 {
        0
    }

    fn timeout_secs(&self) -> u64 {
        1
    }

    fn recycle_secs(&self) -> u64 {
        60
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[test]
fn test_unregistered_config_type_is_rejected() {
    let err = translate_config(&HomegrownConfig).unwrap_err();
    match &err {
        PoolhouseError::UnsupportedConfigType { type_name } => {
            assert!(type_name.contains("HomegrownConfig"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.requires_setup());

    let discovery = StaticDiscovery::default();
    assert!(matches!(
        resolve_driver(&HomegrownConfig, &discovery),
        Err(PoolhouseError::UnsupportedConfigType { .. })
    ));
    assert_eq!(discovery.probes(), 0);
}
