//! adbc-poolhouse - diagnostic entry point.
//!
//! Shows how a warehouse config would be turned into a pool without opening anything:
//! which driver gets loaded, which parameters it receives, and the effective pool settings.

use adbc_poolhouse::config::{Command, Config, PoolOptions};
use adbc_poolhouse::db::discovery::SearchPathDiscovery;
use adbc_poolhouse::db::registry::{self, DriverSource};
use adbc_poolhouse::db::resolver::resolve_driver;
use adbc_poolhouse::error::{PoolhouseError, PoolhouseResult};
use adbc_poolhouse::models::{WarehouseConfig, redact_params};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging. Logs go to stderr so stdout stays
/// machine-readable.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn resolve(config: &dyn WarehouseConfig) -> PoolhouseResult<()> {
    config.validate()?;
    let discovery = SearchPathDiscovery::from_env();
    let driver = resolve_driver(config, &discovery)?;
    println!("{driver}");
    Ok(())
}

fn params(config: &dyn WarehouseConfig, json: bool) -> PoolhouseResult<()> {
    config.validate()?;
    let params = redact_params(&registry::translate_config(config)?);
    if json {
        let rendered = serde_json::to_string_pretty(&params)
            .map_err(|e| PoolhouseError::internal(format!("Failed to render params: {e}")))?;
        println!("{rendered}");
    } else {
        for (key, value) in &params {
            println!("{key}={value}");
        }
    }
    Ok(())
}

fn check(config: &dyn WarehouseConfig) -> PoolhouseResult<()> {
    config.validate()?;
    let settings = PoolOptions::default().resolve(config)?;
    let entry = registry::entry_for(config)?;
    let source = match entry.source {
        DriverSource::PackageIndex { package, .. } => format!("package {package}"),
        DriverSource::Foundry { driver_name, .. } => format!("foundry driver {driver_name}"),
        DriverSource::BundledExtension { module, .. } => format!("bundled extension {module}"),
    };

    println!("backend:      {}", config.backend());
    println!("driver:       {source}");
    if let Some(entrypoint) = config.entrypoint() {
        println!("entrypoint:   {entrypoint}");
    }
    println!("pool_size:    {}", settings.pool_size);
    println!("max_overflow: {}", settings.max_overflow);
    println!("timeout:      {}s", settings.timeout_secs);
    println!("recycle:      {}s", settings.recycle_secs);
    Ok(())
}

fn main() -> ExitCode {
    // Parse configuration from command line and environment
    let config = Config::parse();

    init_tracing(&config);

    let warehouse = config.command.warehouse().as_config();
    debug!(backend = %warehouse.backend(), "Parsed warehouse config");

    let result = match &config.command {
        Command::Resolve { .. } => resolve(warehouse),
        Command::Params { json, .. } => params(warehouse, *json),
        Command::Check { .. } => check(warehouse),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            if let Some(hint) = e.suggestion() {
                eprintln!("Hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}
