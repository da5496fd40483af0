//! Driver and pool layer.
//!
//! This module turns a warehouse config into a live pool:
//! - Native driver-manager seam
//! - Local driver discovery and driver resolution
//! - Backend registry and parameter translation dispatch
//! - Driver-manager facade with install-hint errors
//! - Bounded queue pool and the warehouse pool assembler

pub mod connection;
pub mod discovery;
pub mod driver_api;
pub mod native;
pub mod pool;
pub mod queue_pool;
pub mod registry;
pub mod resolver;

pub use connection::{Connection, Cursor};
pub use discovery::{DriverDiscovery, DriverPackage, InstalledPackage, SearchPathDiscovery};
pub use driver_api::open_connection;
pub use native::{AdbcStatus, DriverManager, NativeConnection, NativeError, NativeStream};
pub use pool::{
    PoolAssembler, WarehouseConnection, WarehousePool, close_pool, create_pool, managed_pool,
    release_open_cursors,
};
pub use queue_pool::{
    ConnectionRecord, PoolError, PoolStats, PoolStatus, PooledConnection, QueuePool,
    QueuePoolConfig, ResetReason,
};
pub use registry::{BackendEntry, DriverSource, translate_config};
pub use resolver::resolve_driver;
