//! Fixed-size pool of SQLite connections
//!
//! Every checkout holds a semaphore permit together with the connection, so
//! at most `size` operations touch the database at once. Dropping the
//! [`PooledConnection`] returns the connection and the permit on every exit
//! path, including errors, panics inside blocking tasks and cancelled
//! futures.

use rusqlite::Connection;
use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::error::StorageError;

pub struct ConnectionPool {
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    size: usize,
}

impl ConnectionPool {
    pub fn new(connections: Vec<Connection>) -> Arc<Self> {
        let size = connections.len();
        debug!(size, "Created connection pool");
        Arc::new(Self {
            idle: Mutex::new(connections),
            permits: Arc::new(Semaphore::new(size)),
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Wait for a free connection.
    pub async fn acquire(self: &Arc<Self>) -> Result<PooledConnection, StorageError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| StorageError::PoolClosed)?;

        let conn = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .ok_or(StorageError::PoolClosed)?;

        Ok(PooledConnection {
            conn: Some(conn),
            pool: Arc::clone(self),
            _permit: permit,
        })
    }

    /// Stop handing out connections. Checked-out connections are still
    /// returned, but waiters and later callers get `PoolClosed`.
    pub fn close(&self) {
        self.permits.close();
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn release(&self, conn: Connection) {
        if self.permits.is_closed() {
            return;
        }
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(conn);
    }
}

pub struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<ConnectionPool>,
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only `drop` takes the connection out.
        match &self.conn {
            Some(conn) => conn,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}
