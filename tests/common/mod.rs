//! In-memory native driver shared by the integration tests.
//!
//! Connections cloned from one another share a refcounted database handle, which is
//! released when the last connection holding it goes away.

#![allow(dead_code)]

use adbc_poolhouse::db::{
    AdbcStatus, DriverDiscovery, DriverManager, DriverPackage, NativeConnection, NativeError,
    NativeStream,
};
use adbc_poolhouse::models::{DriverIdentifier, ParamMap};
use arrow_array::{ArrayRef, Int64Array, RecordBatch};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Counters and switches shared by the manager and everything it opened.
#[derive(Default)]
pub struct FakeState {
    pub connects: AtomicUsize,
    pub clones: AtomicUsize,
    pub open_connections: AtomicUsize,
    pub open_streams: AtomicUsize,
    pub databases_released: AtomicUsize,
    pub fail_clones: AtomicBool,
    pub fail_stream_close: AtomicBool,
    /// Connection closes in the order they happened, labelled by role.
    pub closes: Mutex<Vec<&'static str>>,
}

pub struct ConnectCall {
    pub driver: DriverIdentifier,
    pub params: ParamMap,
    pub entrypoint: Option<String>,
}

#[derive(Default)]
pub struct FakeDriverManager {
    pub state: Arc<FakeState>,
    pub connect_error: Mutex<Option<NativeError>>,
    pub calls: Mutex<Vec<ConnectCall>>,
}

impl FakeDriverManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(err: NativeError) -> Arc<Self> {
        let manager = Self::default();
        *manager.connect_error.lock() = Some(err);
        Arc::new(manager)
    }

    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn clones(&self) -> usize {
        self.state.clones.load(Ordering::SeqCst)
    }

    pub fn open_connections(&self) -> usize {
        self.state.open_connections.load(Ordering::SeqCst)
    }

    pub fn open_streams(&self) -> usize {
        self.state.open_streams.load(Ordering::SeqCst)
    }

    pub fn databases_released(&self) -> usize {
        self.state.databases_released.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> Vec<&'static str> {
        self.state.closes.lock().clone()
    }
}

impl DriverManager for FakeDriverManager {
    fn connect(
        &self,
        driver: &DriverIdentifier,
        params: &ParamMap,
        entrypoint: Option<&str>,
    ) -> Result<Box<dyn NativeConnection>, NativeError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(ConnectCall {
            driver: driver.clone(),
            params: params.clone(),
            entrypoint: entrypoint.map(str::to_string),
        });
        if let Some(err) = self.connect_error.lock().clone() {
            return Err(err);
        }
        let database = Arc::new(FakeDatabase {
            state: Arc::clone(&self.state),
        });
        Ok(Box::new(FakeConnection::open(database, "source")))
    }
}

struct FakeDatabase {
    state: Arc<FakeState>,
}

impl Drop for FakeDatabase {
    fn drop(&mut self) {
        self.state.databases_released.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakeConnection {
    database: Option<Arc<FakeDatabase>>,
    role: &'static str,
}

impl FakeConnection {
    fn open(database: Arc<FakeDatabase>, role: &'static str) -> Self {
        database.state.open_connections.fetch_add(1, Ordering::SeqCst);
        Self {
            database: Some(database),
            role,
        }
    }

    fn database(&self) -> Result<&Arc<FakeDatabase>, NativeError> {
        self.database
            .as_ref()
            .ok_or_else(|| NativeError::new(AdbcStatus::InvalidState, "connection is closed"))
    }
}

impl NativeConnection for FakeConnection {
    fn clone_connection(&self) -> Result<Box<dyn NativeConnection>, NativeError> {
        let database = self.database()?;
        if database.state.fail_clones.load(Ordering::SeqCst) {
            return Err(NativeError::new(AdbcStatus::Io, "connection refused"));
        }
        database.state.clones.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection::open(Arc::clone(database), "clone")))
    }

    fn execute(&mut self, sql: &str) -> Result<Box<dyn NativeStream>, NativeError> {
        let database = self.database()?;
        if sql.trim().eq_ignore_ascii_case("fail") {
            return Err(NativeError::new(AdbcStatus::InvalidArgument, "syntax error")
                .with_sqlstate("42601"));
        }
        let batch = RecordBatch::try_from_iter([(
            "value",
            Arc::new(Int64Array::from(vec![1_i64, 2, 3])) as ArrayRef,
        )])
        .map_err(|e| NativeError::new(AdbcStatus::Internal, e.to_string()))?;
        database.state.open_streams.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            batches: VecDeque::from([batch]),
            state: Arc::clone(&database.state),
            closed: false,
        }))
    }

    fn close(&mut self) -> Result<(), NativeError> {
        if let Some(database) = self.database.take() {
            database.state.open_connections.fetch_sub(1, Ordering::SeqCst);
            database.state.closes.lock().push(self.role);
        }
        Ok(())
    }
}

struct FakeStream {
    batches: VecDeque<RecordBatch>,
    state: Arc<FakeState>,
    closed: bool,
}

impl NativeStream for FakeStream {
    fn next_batch(&mut self) -> Result<Option<RecordBatch>, NativeError> {
        Ok(self.batches.pop_front())
    }

    fn close(&mut self) -> Result<(), NativeError> {
        if !self.closed {
            self.closed = true;
            self.state.open_streams.fetch_sub(1, Ordering::SeqCst);
        }
        if self.state.fail_stream_close.load(Ordering::SeqCst) {
            return Err(NativeError::new(AdbcStatus::Io, "stream close failed"));
        }
        Ok(())
    }
}

/// Discovery double answering from fixed paths and counting probes.
#[derive(Default)]
pub struct StaticDiscovery {
    pub package: Option<PathBuf>,
    pub extension: Option<PathBuf>,
    pub probes: AtomicUsize,
}

impl StaticDiscovery {
    pub fn with_extension(path: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            extension: Some(path.into()),
            ..Self::default()
        })
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

struct FixedPackage(PathBuf);

impl DriverPackage for FixedPackage {
    fn driver_path(&self) -> PathBuf {
        self.0.clone()
    }
}

impl DriverDiscovery for StaticDiscovery {
    fn find_package(&self, _package: &str) -> Option<Box<dyn DriverPackage>> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.package
            .clone()
            .map(|path| Box::new(FixedPackage(path)) as Box<dyn DriverPackage>)
    }

    fn find_extension(&self, _module: &str) -> Option<PathBuf> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.extension.clone()
    }
}
