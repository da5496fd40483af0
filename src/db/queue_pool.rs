//! Bounded FIFO connection pool.
//!
//! Admission is a semaphore with `pool_size + max_overflow` permits; a checkout waits at
//! most `timeout` for a permit. Up to `pool_size` returned connections are kept idle;
//! anything beyond that is closed on return. Idle connections older than `recycle` are
//! replaced at checkout.
//!
//! Reset listeners run synchronously on every return path before the connection can be
//! handed out again.

use crate::error::PoolhouseResult;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};
use uuid::Uuid;

/// Errors raised by the pool itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error(
        "Pool limit of size {pool_size} overflow {max_overflow} reached, connection timed out after {timeout_secs}s"
    )]
    Timeout {
        pool_size: usize,
        max_overflow: usize,
        timeout_secs: u64,
    },

    #[error("Pool is closed")]
    Closed,
}

/// Resources the pool can close when it discards them.
pub trait Poolable: Send + 'static {
    fn close(&mut self) -> PoolhouseResult<()>;
}

impl Poolable for crate::db::connection::Connection {
    fn close(&mut self) -> PoolhouseResult<()> {
        crate::db::connection::Connection::close(self)
    }
}

/// Why a reset listener is being called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetReason {
    /// Returned to the pool normally.
    Checkin,
    /// Found past its recycle age at checkout; about to be closed.
    Recycled,
    /// Invalidated by its holder; about to be closed.
    Invalidated,
    /// Dropped while panicking, or a replacement could not be created.
    Error,
}

/// Bookkeeping that travels with one pooled connection.
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    id: Uuid,
    created_at: Instant,
    checkouts: u64,
}

impl ConnectionRecord {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Instant::now(),
            checkouts: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// How many times this connection has been checked out.
    pub fn checkouts(&self) -> u64 {
        self.checkouts
    }
}

/// Called with the connection (absent if it never came to exist), its record and the
/// reason. Must not block.
pub type ResetListener<C> = Arc<dyn Fn(Option<&mut C>, &ConnectionRecord, ResetReason) + Send + Sync>;

/// Creates a new connection for the pool.
pub type ConnectionFactory<C> = Box<dyn Fn() -> PoolhouseResult<C> + Send + Sync>;

/// Pool sizing and timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueuePoolConfig {
    pub pool_size: usize,
    pub max_overflow: usize,
    pub timeout: Duration,
    pub recycle: Duration,
}

impl QueuePoolConfig {
    pub fn max_connections(&self) -> usize {
        self.pool_size + self.max_overflow
    }
}

/// Point-in-time view of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub pool_size: usize,
    pub idle: usize,
    pub checked_out: usize,
    /// Open connections minus `pool_size`; negative while the pool is below capacity.
    pub overflow: i64,
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pool size: {}  Connections in pool: {} Current Overflow: {} Current Checked out connections: {}",
            self.pool_size, self.idle, self.overflow, self.checked_out
        )
    }
}

/// Lifetime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub connections_created: u64,
    pub connections_closed: u64,
    pub checkouts: u64,
    pub timeouts: u64,
    pub resets: u64,
}

#[derive(Default)]
struct AtomicPoolStats {
    connections_created: AtomicU64,
    connections_closed: AtomicU64,
    checkouts: AtomicU64,
    timeouts: AtomicU64,
    resets: AtomicU64,
}

impl AtomicPoolStats {
    fn snapshot(&self) -> PoolStats {
        PoolStats {
            connections_created: self.connections_created.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            checkouts: self.checkouts.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
        }
    }
}

struct Idle<C> {
    conn: C,
    record: ConnectionRecord,
}

struct Shared<C> {
    config: QueuePoolConfig,
    factory: ConnectionFactory<C>,
    idle: Mutex<VecDeque<Idle<C>>>,
    permits: Arc<Semaphore>,
    listeners: RwLock<Vec<ResetListener<C>>>,
    disposed: AtomicBool,
    open: AtomicUsize,
    checked_out: AtomicUsize,
    stats: AtomicPoolStats,
}

impl<C: Poolable> Shared<C> {
    /// Runs every listener; returns `false` if any of them panicked.
    fn fire_reset(
        &self,
        mut conn: Option<&mut C>,
        record: &ConnectionRecord,
        reason: ResetReason,
    ) -> bool {
        self.stats.resets.fetch_add(1, Ordering::Relaxed);
        // listeners may register further listeners
        let listeners = self.listeners.read().clone();
        let mut clean = true;
        for listener in &listeners {
            let call = panic::catch_unwind(AssertUnwindSafe(|| {
                listener(conn.as_deref_mut(), record, reason)
            }));
            if call.is_err() {
                warn!(connection_id = %record.id, ?reason, "Reset listener panicked");
                clean = false;
            }
        }
        clean
    }

    fn discard(&self, mut conn: C, record: &ConnectionRecord) {
        if let Err(e) = conn.close() {
            warn!(connection_id = %record.id, error = %e, "Failed to close pooled connection");
        }
        self.open.fetch_sub(1, Ordering::Relaxed);
        self.stats.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    fn create(&self) -> PoolhouseResult<(C, ConnectionRecord)> {
        let record = ConnectionRecord::new();
        match (self.factory)() {
            Ok(conn) => {
                self.open.fetch_add(1, Ordering::Relaxed);
                self.stats.connections_created.fetch_add(1, Ordering::Relaxed);
                debug!(connection_id = %record.id, "Created pooled connection");
                Ok((conn, record))
            }
            Err(e) => {
                let _ = self.fire_reset(None, &record, ResetReason::Error);
                Err(e)
            }
        }
    }

    /// Return path shared by checkin, invalidation and drop.
    fn checkin(&self, mut conn: C, record: ConnectionRecord, reason: ResetReason) {
        self.checked_out.fetch_sub(1, Ordering::Relaxed);
        let clean = self.fire_reset(Some(&mut conn), &record, reason);

        if clean && reason == ResetReason::Checkin {
            // dispose flips the flag under this lock, so nothing lands after its drain
            let mut idle = self.idle.lock();
            if !self.disposed.load(Ordering::Acquire) && idle.len() < self.config.pool_size {
                idle.push_back(Idle { conn, record });
                return;
            }
        }
        debug!(connection_id = %record.id, ?reason, "Discarding connection");
        self.discard(conn, &record);
    }
}

/// Bounded pool of `C`.
pub struct QueuePool<C: Poolable> {
    shared: Arc<Shared<C>>,
}

impl<C: Poolable> Clone for QueuePool<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: Poolable> QueuePool<C> {
    pub fn new<F>(config: QueuePoolConfig, factory: F) -> Self
    where
        F: Fn() -> PoolhouseResult<C> + Send + Sync + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                config,
                factory: Box::new(factory),
                idle: Mutex::new(VecDeque::with_capacity(config.pool_size)),
                permits: Arc::new(Semaphore::new(config.max_connections())),
                listeners: RwLock::new(Vec::new()),
                disposed: AtomicBool::new(false),
                open: AtomicUsize::new(0),
                checked_out: AtomicUsize::new(0),
                stats: AtomicPoolStats::default(),
            }),
        }
    }

    /// Register a listener for the reset event.
    pub fn add_reset_listener<L>(&self, listener: L)
    where
        L: Fn(Option<&mut C>, &ConnectionRecord, ResetReason) + Send + Sync + 'static,
    {
        self.shared.listeners.write().push(Arc::new(listener));
    }

    /// Check a connection out, waiting up to the configured timeout.
    pub async fn checkout(&self) -> PoolhouseResult<PooledConnection<C>> {
        let shared = &self.shared;
        if shared.disposed.load(Ordering::Acquire) {
            return Err(PoolError::Closed.into());
        }

        let permit = match tokio::time::timeout(
            shared.config.timeout,
            Arc::clone(&shared.permits).acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            // the semaphore is closed on dispose
            Ok(Err(_)) => return Err(PoolError::Closed.into()),
            Err(_) => {
                shared.stats.timeouts.fetch_add(1, Ordering::Relaxed);
                return Err(PoolError::Timeout {
                    pool_size: shared.config.pool_size,
                    max_overflow: shared.config.max_overflow,
                    timeout_secs: shared.config.timeout.as_secs(),
                }
                .into());
            }
        };

        let (conn, mut record) = loop {
            let next = shared.idle.lock().pop_front();
            match next {
                Some(Idle { mut conn, record }) if record.age() >= shared.config.recycle => {
                    debug!(connection_id = %record.id, "Recycling stale connection");
                    let _ = shared.fire_reset(Some(&mut conn), &record, ResetReason::Recycled);
                    shared.discard(conn, &record);
                }
                Some(Idle { conn, record }) => break (conn, record),
                None => break shared.create()?,
            }
        };

        record.checkouts += 1;
        shared.checked_out.fetch_add(1, Ordering::Relaxed);
        shared.stats.checkouts.fetch_add(1, Ordering::Relaxed);
        Ok(PooledConnection {
            inner: Some((conn, record)),
            shared: Arc::clone(shared),
            _permit: permit,
        })
    }

    /// Close idle connections and refuse further checkouts.
    ///
    /// Connections still checked out are closed when they come back.
    pub fn dispose(&self) {
        let shared = &self.shared;
        let idle: Vec<Idle<C>> = {
            let mut idle = shared.idle.lock();
            if shared.disposed.swap(true, Ordering::AcqRel) {
                return;
            }
            idle.drain(..).collect()
        };
        shared.permits.close();
        debug!(count = idle.len(), "Disposing idle connections");
        for Idle { conn, record } in idle {
            shared.discard(conn, &record);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::Acquire)
    }

    /// Configured number of persistent connections.
    pub fn size(&self) -> usize {
        self.shared.config.pool_size
    }

    pub fn config(&self) -> &QueuePoolConfig {
        &self.shared.config
    }

    pub fn status(&self) -> PoolStatus {
        let shared = &self.shared;
        PoolStatus {
            pool_size: shared.config.pool_size,
            idle: shared.idle.lock().len(),
            checked_out: shared.checked_out.load(Ordering::Relaxed),
            overflow: shared.open.load(Ordering::Relaxed) as i64 - shared.config.pool_size as i64,
        }
    }

    pub fn stats(&self) -> PoolStats {
        self.shared.stats.snapshot()
    }
}

/// A checked-out connection. Returned to the pool on drop.
pub struct PooledConnection<C: Poolable> {
    inner: Option<(C, ConnectionRecord)>,
    shared: Arc<Shared<C>>,
    // released after the connection is back in the idle queue
    _permit: OwnedSemaphorePermit,
}

impl<C: Poolable> PooledConnection<C> {
    pub fn record(&self) -> &ConnectionRecord {
        match &self.inner {
            Some((_, record)) => record,
            None => unreachable!("pooled connection used after return"),
        }
    }

    /// Close this connection instead of returning it to the pool.
    pub fn invalidate(mut self) {
        if let Some((conn, record)) = self.inner.take() {
            self.shared.checkin(conn, record, ResetReason::Invalidated);
        }
    }
}

impl<C: Poolable> Deref for PooledConnection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        match &self.inner {
            Some((conn, _)) => conn,
            None => unreachable!("pooled connection used after return"),
        }
    }
}

impl<C: Poolable> DerefMut for PooledConnection<C> {
    fn deref_mut(&mut self) -> &mut C {
        match &mut self.inner {
            Some((conn, _)) => conn,
            None => unreachable!("pooled connection used after return"),
        }
    }
}

impl<C: Poolable> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        if let Some((conn, record)) = self.inner.take() {
            // state is unknown after a panic mid-use
            let reason = if std::thread::panicking() {
                ResetReason::Error
            } else {
                ResetReason::Checkin
            };
            self.shared.checkin(conn, record, reason);
        }
    }
}

impl<C: Poolable + fmt::Debug> fmt::Debug for PooledConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("inner", &self.inner.as_ref().map(|(c, _)| c))
            .finish_non_exhaustive()
    }
}
