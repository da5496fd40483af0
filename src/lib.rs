//! adbc-poolhouse library
//!
//! Turns a typed warehouse configuration into a bounded pool of ADBC connections: the
//! driver is resolved, the config is translated into driver parameters, one source
//! connection is opened and every pooled connection is cloned from it.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::{Config, PoolOptions, PoolSettings};
pub use db::{
    DriverManager, PoolAssembler, WarehouseConnection, WarehousePool, close_pool, create_pool,
    managed_pool,
};
pub use error::{PoolhouseError, PoolhouseResult};
pub use models::{Backend, WarehouseConfig};
