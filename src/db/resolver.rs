//! Driver resolution.
//!
//! Decides what the driver manager should load for a config:
//!
//! - package-index backends: the installed package's library path, or the bare package
//!   name so the driver manager falls back to its manifest search
//! - foundry backends: the short driver name, without probing anything locally
//! - the bundled DuckDB driver: the extension module path, or a hard error

use crate::db::discovery::DriverDiscovery;
use crate::db::registry::{self, DriverSource};
use crate::error::{PoolhouseError, PoolhouseResult};
use crate::models::{Backend, DriverIdentifier, WarehouseConfig};
use tracing::debug;

/// Resolve the driver identifier for `config`.
pub fn resolve_driver(
    config: &dyn WarehouseConfig,
    discovery: &dyn DriverDiscovery,
) -> PoolhouseResult<DriverIdentifier> {
    let entry = registry::entry_for(config)?;
    let driver = match entry.source {
        DriverSource::PackageIndex { package, .. } => resolve_package(package, discovery),
        DriverSource::Foundry { driver_name, .. } => DriverIdentifier::name(driver_name),
        DriverSource::BundledExtension { module, extra } => {
            resolve_bundled(entry.backend, module, extra, discovery)?
        }
    };
    debug!(backend = %entry.backend, driver = %driver, "Resolved driver");
    Ok(driver)
}

fn resolve_package(package: &str, discovery: &dyn DriverDiscovery) -> DriverIdentifier {
    match discovery.find_package(package) {
        Some(installed) => DriverIdentifier::path(installed.driver_path()),
        None => {
            debug!(package, "Driver package not found locally, deferring to manifest search");
            DriverIdentifier::name(package)
        }
    }
}

fn resolve_bundled(
    backend: Backend,
    module: &str,
    extra: &str,
    discovery: &dyn DriverDiscovery,
) -> PoolhouseResult<DriverIdentifier> {
    discovery
        .find_extension(module)
        .map(DriverIdentifier::path)
        .ok_or_else(|| PoolhouseError::bundled_driver_missing(backend.display_name(), extra))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::discovery::DriverPackage;
    use crate::models::{DuckDbConfig, PostgreSqlConfig, TrinoConfig};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedPackage(PathBuf);

    impl DriverPackage for FixedPackage {
        fn driver_path(&self) -> PathBuf {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct CountingDiscovery {
        package: Option<PathBuf>,
        extension: Option<PathBuf>,
        probes: AtomicUsize,
    }

    impl DriverDiscovery for CountingDiscovery {
        fn find_package(&self, _package: &str) -> Option<Box<dyn DriverPackage>> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.package
                .clone()
                .map(|p| Box::new(FixedPackage(p)) as Box<dyn DriverPackage>)
        }

        fn find_extension(&self, _module: &str) -> Option<PathBuf> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.extension.clone()
        }
    }

    #[test]
    fn test_package_hit_returns_accessor_path() {
        let discovery = CountingDiscovery {
            package: Some(PathBuf::from("/site/adbc_driver_postgresql/libadbc.so")),
            ..Default::default()
        };
        let driver = resolve_driver(&PostgreSqlConfig::default(), &discovery).unwrap();
        assert_eq!(driver.as_str(), "/site/adbc_driver_postgresql/libadbc.so");
    }

    #[test]
    fn test_package_miss_returns_package_name() {
        let discovery = CountingDiscovery::default();
        let driver = resolve_driver(&PostgreSqlConfig::default(), &discovery).unwrap();
        assert_eq!(driver.as_str(), "adbc_driver_postgresql");
    }

    #[test]
    fn test_foundry_never_probes() {
        let discovery = CountingDiscovery::default();
        let driver = resolve_driver(&TrinoConfig::default(), &discovery).unwrap();
        assert_eq!(driver.as_str(), "trino");
        assert_eq!(discovery.probes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_bundled_miss_is_terminal() {
        let discovery = CountingDiscovery::default();
        let err = resolve_driver(&DuckDbConfig::default(), &discovery).unwrap_err();
        assert!(err.to_string().contains("pip install adbc-poolhouse[duckdb]"));
        assert_eq!(discovery.probes.load(Ordering::SeqCst), 1);
    }
}
