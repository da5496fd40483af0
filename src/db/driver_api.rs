//! Driver-manager facade.
//!
//! Every native connection is opened through [`open_connection`], which is also the one
//! place a "driver not found" failure is turned into install instructions.

use crate::db::native::{DriverManager, NativeConnection, NativeError};
use crate::db::registry;
use crate::error::{PoolhouseError, PoolhouseResult};
use crate::models::{DriverIdentifier, ParamMap};
use tracing::debug;

/// Open a native connection with `driver`.
///
/// A NOT_FOUND failure for a foundry driver becomes
/// [`PoolhouseError::DriverNotInstalled`]; every other native error is returned as is.
pub fn open_connection(
    manager: &dyn DriverManager,
    driver: &DriverIdentifier,
    params: &ParamMap,
    entrypoint: Option<&str>,
) -> PoolhouseResult<Box<dyn NativeConnection>> {
    debug!(
        driver = %driver,
        keys = ?params.keys().collect::<Vec<_>>(),
        entrypoint = entrypoint.unwrap_or("<default>"),
        "Opening native connection"
    );
    manager
        .connect(driver, params, entrypoint)
        .map_err(|err| classify_connect_error(driver, err))
}

fn classify_connect_error(driver: &DriverIdentifier, err: NativeError) -> PoolhouseError {
    match registry::foundry_install_name(driver.as_str()) {
        Some(install_name) if err.is_not_found() => {
            debug!(driver = %driver, error = %err, "Foundry driver manifest not found");
            PoolhouseError::foundry_driver_missing(driver.as_str(), install_name)
        }
        _ => PoolhouseError::Native(err),
    }
}
