//! Pooled connection wrapper and cursors.
//!
//! A [`Connection`] keeps a registry of the cursors opened on it so that cursors a caller
//! forgot to close can be closed when the connection goes back to the pool.

use crate::db::native::{NativeConnection, NativeStream};
use crate::error::{PoolhouseError, PoolhouseResult};
use arrow_array::RecordBatch;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};
use uuid::Uuid;

struct CursorState {
    stream: Option<Box<dyn NativeStream>>,
}

impl CursorState {
    fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    fn close(&mut self) -> PoolhouseResult<()> {
        match self.stream.take() {
            Some(mut stream) => stream.close().map_err(PoolhouseError::from),
            None => Ok(()),
        }
    }
}

/// Result stream of one executed statement.
///
/// Dropping a cursor closes it. A cursor still held when its connection is returned to
/// the pool is closed by the pool, and fetching from it afterwards fails.
pub struct Cursor {
    state: Arc<Mutex<CursorState>>,
}

impl Cursor {
    /// Fetch the next record batch, or `None` once the stream is drained.
    pub fn fetch_next(&mut self) -> PoolhouseResult<Option<RecordBatch>> {
        let mut state = self.state.lock();
        let stream = state.stream.as_mut().ok_or(PoolhouseError::CursorClosed)?;
        Ok(stream.next_batch()?)
    }

    /// Drain the stream.
    pub fn fetch_all(&mut self) -> PoolhouseResult<Vec<RecordBatch>> {
        let mut batches = Vec::new();
        while let Some(batch) = self.fetch_next()? {
            batches.push(batch);
        }
        Ok(batches)
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().is_closed()
    }

    pub fn close(&mut self) -> PoolhouseResult<()> {
        self.state.lock().close()
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        if let Err(e) = self.state.lock().close() {
            trace!(error = %e, "Cursor close on drop failed");
        }
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A native connection plus the cursors opened on it.
pub struct Connection {
    id: Uuid,
    native: Box<dyn NativeConnection>,
    cursors: Vec<Arc<Mutex<CursorState>>>,
}

impl Connection {
    pub fn new(native: Box<dyn NativeConnection>) -> Self {
        Self {
            id: Uuid::new_v4(),
            native,
            cursors: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Execute `sql` and return a cursor over its results.
    pub fn execute(&mut self, sql: &str) -> PoolhouseResult<Cursor> {
        let stream = self.native.execute(sql)?;
        self.prune_closed();
        let state = Arc::new(Mutex::new(CursorState {
            stream: Some(stream),
        }));
        self.cursors.push(Arc::clone(&state));
        Ok(Cursor { state })
    }

    /// Number of cursors this connection still tracks (closed ones are pruned first).
    pub fn tracked_cursors(&mut self) -> usize {
        self.prune_closed();
        self.cursors.len()
    }

    /// Close every cursor that is still open.
    ///
    /// A cursor that fails to close is logged and skipped so the rest still get closed.
    /// Returns how many cursors were closed.
    pub fn release_cursors(&mut self) -> usize {
        let mut closed = 0;
        for cursor in &self.cursors {
            let mut state = cursor.lock();
            if state.is_closed() {
                continue;
            }
            match state.close() {
                Ok(()) => closed += 1,
                Err(e) => debug!(connection_id = %self.id, error = %e, "Ignoring cursor close failure"),
            }
        }
        self.cursors.clear();
        closed
    }

    /// Open a new connection sharing this one's database handle.
    pub fn try_clone(&self) -> PoolhouseResult<Connection> {
        Ok(Connection::new(self.native.clone_connection()?))
    }

    /// Close all cursors, then the native connection.
    pub fn close(&mut self) -> PoolhouseResult<()> {
        self.release_cursors();
        self.native.close()?;
        Ok(())
    }

    fn prune_closed(&mut self) {
        self.cursors.retain(|cursor| !cursor.lock().is_closed());
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("cursors", &self.cursors.len())
            .finish_non_exhaustive()
    }
}
