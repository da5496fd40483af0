//! Pool assembly.
//!
//! A warehouse pool is built around one source connection opened through the driver
//! manager. Every pooled connection is a clone of the source, so the driver is loaded and
//! authenticated once per pool. Disposal runs in the opposite order: the pool first, then
//! the source.

use crate::config::{PoolOptions, PoolSettings};
use crate::db::connection::Connection;
use crate::db::discovery::{DriverDiscovery, SearchPathDiscovery};
use crate::db::driver_api::open_connection;
use crate::db::native::{DriverManager, NativeConnection};
use crate::db::queue_pool::{
    ConnectionRecord, PoolError, PoolStats, PoolStatus, PooledConnection, QueuePool,
    QueuePoolConfig, ResetReason,
};
use crate::db::registry::translate_config;
use crate::db::resolver::resolve_driver;
use crate::error::{PoolhouseError, PoolhouseResult};
use crate::models::{Backend, DriverIdentifier, WarehouseConfig};
use futures_util::FutureExt;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, resume_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// A connection checked out of a [`WarehousePool`].
pub type WarehouseConnection = PooledConnection<Connection>;

/// The connection every pooled connection is cloned from.
struct SourceConnection {
    native: Mutex<Option<Box<dyn NativeConnection>>>,
}

impl SourceConnection {
    fn new(native: Box<dyn NativeConnection>) -> Self {
        Self {
            native: Mutex::new(Some(native)),
        }
    }

    fn clone_connection(&self) -> PoolhouseResult<Connection> {
        let guard = self.native.lock();
        let source = guard.as_ref().ok_or(PoolError::Closed)?;
        let conn = Connection::new(source.clone_connection()?);
        debug!(connection_id = %conn.id(), "Cloned source connection");
        Ok(conn)
    }

    fn close(&self) -> PoolhouseResult<()> {
        match self.native.lock().take() {
            Some(mut native) => Ok(native.close()?),
            None => Ok(()),
        }
    }
}

/// Reset listener registered on every warehouse pool.
///
/// Closes the cursors a holder left open so their native streams are released before the
/// connection is reused. Individual close failures are logged and skipped.
pub fn release_open_cursors(
    conn: Option<&mut Connection>,
    record: &ConnectionRecord,
    reason: ResetReason,
) {
    let Some(conn) = conn else {
        return;
    };
    let released = conn.release_cursors();
    if released > 0 {
        debug!(
            connection_id = %record.id(),
            ?reason,
            released,
            "Closed cursors left open at reset"
        );
    }
}

struct PoolInner {
    backend: Backend,
    driver: DriverIdentifier,
    settings: PoolSettings,
    pool: QueuePool<Connection>,
    source: Arc<SourceConnection>,
    closed: AtomicBool,
}

impl PoolInner {
    fn close(&self) -> PoolhouseResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.pool.dispose();
        info!(backend = %self.backend, "Pool disposed");
        self.source.close()?;
        info!(backend = %self.backend, driver = %self.driver, "Source connection closed");
        Ok(())
    }
}

impl Drop for PoolInner {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(backend = %self.backend, error = %e, "Failed to close pool on drop");
        }
    }
}

/// A bounded pool of warehouse connections. Cloning shares the same pool.
#[derive(Clone)]
pub struct WarehousePool {
    inner: Arc<PoolInner>,
}

impl WarehousePool {
    /// Check out a connection, waiting up to the pool timeout.
    pub async fn get(&self) -> PoolhouseResult<WarehouseConnection> {
        self.inner.pool.checkout().await
    }

    /// Configured number of persistent connections.
    pub fn size(&self) -> usize {
        self.inner.pool.size()
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.inner.settings
    }

    pub fn status(&self) -> PoolStatus {
        self.inner.pool.status()
    }

    pub fn stats(&self) -> PoolStats {
        self.inner.pool.stats()
    }

    pub fn backend(&self) -> Backend {
        self.inner.backend
    }

    pub fn driver(&self) -> &DriverIdentifier {
        &self.inner.driver
    }

    /// Register an additional reset listener. It runs after the cursor cleanup.
    pub fn on_reset<L>(&self, listener: L)
    where
        L: Fn(Option<&mut Connection>, &ConnectionRecord, ResetReason) + Send + Sync + 'static,
    {
        self.inner.pool.add_reset_listener(listener);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Dispose the pool, then close the source connection.
    ///
    /// Later calls on any handle to the same pool do nothing.
    pub fn close(&self) -> PoolhouseResult<()> {
        self.inner.close()
    }
}

impl fmt::Debug for WarehousePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehousePool")
            .field("backend", &self.inner.backend)
            .field("driver", &self.inner.driver)
            .field("settings", &self.inner.settings)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Builds warehouse pools against a driver manager.
#[derive(Clone)]
pub struct PoolAssembler {
    manager: Arc<dyn DriverManager>,
    discovery: Arc<dyn DriverDiscovery>,
}

impl PoolAssembler {
    /// Assembler that discovers drivers under the environment's search roots.
    pub fn new(manager: Arc<dyn DriverManager>) -> Self {
        Self {
            manager,
            discovery: Arc::new(SearchPathDiscovery::from_env()),
        }
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn DriverDiscovery>) -> Self {
        self.discovery = discovery;
        self
    }

    /// Build a pool for `config`.
    ///
    /// Validates the config, resolves the driver, translates the parameters, opens the
    /// source connection and wraps its clones in a bounded pool. Any failure is returned
    /// unchanged and nothing is left open.
    pub async fn create_pool(
        &self,
        config: &dyn WarehouseConfig,
        options: &PoolOptions,
    ) -> PoolhouseResult<WarehousePool> {
        config.validate()?;
        let settings = options.resolve(config)?;
        let backend = config.backend();
        let driver = resolve_driver(config, self.discovery.as_ref())?;
        let params = translate_config(config)?;
        let entrypoint = config.entrypoint().map(str::to_string);

        info!(
            backend = %backend,
            driver = %driver,
            pool_size = settings.pool_size,
            max_overflow = settings.max_overflow,
            "Opening source connection"
        );

        let native = {
            let manager = Arc::clone(&self.manager);
            let driver = driver.clone();
            tokio::task::spawn_blocking(move || {
                open_connection(manager.as_ref(), &driver, &params, entrypoint.as_deref())
            })
            .await
            .map_err(|e| PoolhouseError::internal(format!("Source connection task failed: {e}")))??
        };

        let source = Arc::new(SourceConnection::new(native));
        let factory_source = Arc::clone(&source);
        let pool = QueuePool::new(
            QueuePoolConfig {
                pool_size: settings.pool_size as usize,
                max_overflow: settings.max_overflow as usize,
                timeout: settings.timeout(),
                recycle: settings.recycle(),
            },
            move || factory_source.clone_connection(),
        );
        pool.add_reset_listener(release_open_cursors);

        info!(backend = %backend, driver = %driver, "Pool ready");
        Ok(WarehousePool {
            inner: Arc::new(PoolInner {
                backend,
                driver,
                settings,
                pool,
                source,
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Create a pool, hand it to `f`, and close it on every exit path.
    ///
    /// A panic inside `f` is resumed after the pool has been closed. When `f` fails, its
    /// error wins over a close failure.
    pub async fn managed_pool<F, Fut, T>(
        &self,
        config: &dyn WarehouseConfig,
        options: &PoolOptions,
        f: F,
    ) -> PoolhouseResult<T>
    where
        F: FnOnce(WarehousePool) -> Fut,
        Fut: Future<Output = PoolhouseResult<T>>,
    {
        let pool = self.create_pool(config, options).await?;
        let outcome = AssertUnwindSafe(f(pool.clone())).catch_unwind().await;
        let closed = pool.close();

        match outcome {
            Err(panic) => {
                if let Err(e) = closed {
                    warn!(error = %e, "Failed to close pool after panic");
                }
                resume_unwind(panic)
            }
            Ok(Err(e)) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "Failed to close pool after error");
                }
                Err(e)
            }
            Ok(Ok(value)) => {
                closed?;
                Ok(value)
            }
        }
    }
}

/// Build a pool for `config` with drivers discovered under the environment's search roots.
pub async fn create_pool(
    manager: Arc<dyn DriverManager>,
    config: &dyn WarehouseConfig,
    options: &PoolOptions,
) -> PoolhouseResult<WarehousePool> {
    PoolAssembler::new(manager)
        .create_pool(config, options)
        .await
}

/// Dispose `pool`, then close its source connection.
pub fn close_pool(pool: WarehousePool) -> PoolhouseResult<()> {
    pool.close()
}

/// Scoped pool: see [`PoolAssembler::managed_pool`].
pub async fn managed_pool<F, Fut, T>(
    manager: Arc<dyn DriverManager>,
    config: &dyn WarehouseConfig,
    options: &PoolOptions,
    f: F,
) -> PoolhouseResult<T>
where
    F: FnOnce(WarehousePool) -> Fut,
    Fut: Future<Output = PoolhouseResult<T>>,
{
    PoolAssembler::new(manager)
        .managed_pool(config, options, f)
        .await
}
