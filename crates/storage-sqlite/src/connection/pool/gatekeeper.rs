// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, RwLockWriteGuard};
use tokio::task::spawn_blocking;
use tokio::time::sleep;

use crate::{Error, Result};

use super::{get_pooled_connection, ConnectionPool, PooledConnection};

/// Manages database connections for asynchronous tasks.
///
/// Only a single writer is allowed to access the `SQLite` database at any
/// given time, avoiding both synchronous locking when obtaining a
/// connection and timeouts from concurrent writers on a shared file.
#[allow(missing_debug_implementations)]
pub struct Gatekeeper {
    connection_pool: Arc<RwLock<ConnectionPool>>,
    acquire_read_timeout: Duration,
    acquire_write_timeout: Duration,
    request_counter_state: Arc<RequestCounterState>,
    abort_current_task_flag: Arc<AtomicBool>,
    decommissioned: AtomicBool,
}

#[derive(Debug, Default)]
struct RequestCounterState {
    read_count: AtomicUsize,
    write_count: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestCounterMode {
    Read,
    Write,
}

struct RequestCounterScope {
    shared_state: Arc<RequestCounterState>,
    mode: RequestCounterMode,
}

impl RequestCounterScope {
    #[must_use]
    fn new(shared_state: Arc<RequestCounterState>, mode: RequestCounterMode) -> Self {
        match mode {
            RequestCounterMode::Read => {
                let before = shared_state.read_count.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(pending = before + 1, "starting read request");
            }
            RequestCounterMode::Write => {
                let before = shared_state.write_count.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(pending = before + 1, "starting write request");
            }
        }
        Self { shared_state, mode }
    }
}

impl Drop for RequestCounterScope {
    fn drop(&mut self) {
        match self.mode {
            RequestCounterMode::Read => {
                let before = self.shared_state.read_count.fetch_sub(1, Ordering::Relaxed);
                debug_assert!(before > 0);
                tracing::debug!(pending = before - 1, "finished read request");
            }
            RequestCounterMode::Write => {
                let before = self.shared_state.write_count.fetch_sub(1, Ordering::Relaxed);
                debug_assert!(before > 0);
                tracing::debug!(pending = before - 1, "finished write request");
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTasks {
    pub read: usize,
    pub write: usize,
}

/// The single writer slot, held for as long as this guard lives. Deref to
/// the pooled connection to run queries through it; drop it to release the
/// slot back to the next waiter.
#[allow(missing_debug_implementations)]
pub struct WriteConnectionGuard<'a> {
    _pool_guard: RwLockWriteGuard<'a, ConnectionPool>,
    connection: PooledConnection,
    _request_counter_scope: RequestCounterScope,
}

impl std::ops::Deref for WriteConnectionGuard<'_> {
    type Target = PooledConnection;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}

impl std::ops::DerefMut for WriteConnectionGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.connection
    }
}

impl Gatekeeper {
    #[must_use]
    pub fn new(connection_pool: ConnectionPool, config: Config) -> Self {
        let Config {
            acquire_read_timeout_millis,
            acquire_write_timeout_millis,
        } = config;
        Self {
            connection_pool: Arc::new(RwLock::new(connection_pool)),
            acquire_read_timeout: Duration::from_millis(acquire_read_timeout_millis.get()),
            acquire_write_timeout: Duration::from_millis(acquire_write_timeout_millis.get()),
            request_counter_state: Arc::default(),
            abort_current_task_flag: Arc::default(),
            decommissioned: AtomicBool::new(false),
        }
    }

    pub fn decommission(&self) {
        self.decommissioned.store(true, Ordering::Release);
    }

    fn check_not_decommissioned(&self) -> Result<()> {
        if self.decommissioned.load(Ordering::Acquire) {
            return Err(Error::TaskTimeout {
                reason: "connection pool has been decommissioned".to_owned(),
            });
        }
        Ok(())
    }

    pub async fn spawn_blocking_read_task_with_timeout<H, R>(
        &self,
        connection_handler: H,
        acquire_read_timeout: Duration,
    ) -> Result<R>
    where
        H: FnOnce(PooledConnection, Arc<AtomicBool>) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.check_not_decommissioned()?;
        let _request_counter_scope =
            RequestCounterScope::new(Arc::clone(&self.request_counter_state), RequestCounterMode::Read);
        let timeout = sleep(acquire_read_timeout);
        tokio::pin!(timeout);
        let abort_current_task_flag = Arc::clone(&self.abort_current_task_flag);
        tokio::select! {
            () = &mut timeout => Err(Error::TaskTimeout { reason: "database is locked".to_owned() }),
            guard = self.connection_pool.read() => {
                self.check_not_decommissioned()?;
                let connection = get_pooled_connection(&guard)?;
                self.check_not_decommissioned()?;
                abort_current_task_flag.store(false, Ordering::Release);
                spawn_blocking(move || connection_handler(connection, abort_current_task_flag))
                    .await
                    .map_err(Error::TaskScheduling)
            }
        }
    }

    pub async fn spawn_blocking_read_task<H, R>(&self, connection_handler: H) -> Result<R>
    where
        H: FnOnce(PooledConnection, Arc<AtomicBool>) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.spawn_blocking_read_task_with_timeout(connection_handler, self.acquire_read_timeout)
            .await
    }

    pub async fn spawn_blocking_write_task_with_timeout<H, R>(
        &self,
        connection_handler: H,
        acquire_write_timeout: Duration,
    ) -> Result<R>
    where
        H: FnOnce(PooledConnection, Arc<AtomicBool>) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.check_not_decommissioned()?;
        let _request_counter_scope =
            RequestCounterScope::new(Arc::clone(&self.request_counter_state), RequestCounterMode::Write);
        let timeout = sleep(acquire_write_timeout);
        tokio::pin!(timeout);
        let abort_current_task_flag = Arc::clone(&self.abort_current_task_flag);
        tokio::select! {
            () = &mut timeout => Err(Error::TaskTimeout { reason: "database is locked".to_owned() }),
            guard = self.connection_pool.write() => {
                self.check_not_decommissioned()?;
                let connection = get_pooled_connection(&guard)?;
                self.check_not_decommissioned()?;
                abort_current_task_flag.store(false, Ordering::Release);
                spawn_blocking(move || connection_handler(connection, abort_current_task_flag))
                    .await
                    .map_err(Error::TaskScheduling)
            }
        }
    }

    pub async fn spawn_blocking_write_task<H, R>(&self, connection_handler: H) -> Result<R>
    where
        H: FnOnce(PooledConnection, Arc<AtomicBool>) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.spawn_blocking_write_task_with_timeout(connection_handler, self.acquire_write_timeout)
            .await
    }

    /// Holds the single-writer slot open across an `async fn` body rather
    /// than handing it to one `spawn_blocking` closure. Needed wherever a
    /// use case interleaves repository calls with other `.await` points
    /// (network harvesting, sidecar writes) instead of running start to
    /// finish on a blocking thread.
    pub async fn acquire_write_connection(&self) -> Result<WriteConnectionGuard<'_>> {
        self.check_not_decommissioned()?;
        let _request_counter_scope =
            RequestCounterScope::new(Arc::clone(&self.request_counter_state), RequestCounterMode::Write);
        let timeout = sleep(self.acquire_write_timeout);
        tokio::pin!(timeout);
        tokio::select! {
            () = &mut timeout => Err(Error::TaskTimeout { reason: "database is locked".to_owned() }),
            pool_guard = self.connection_pool.write() => {
                self.check_not_decommissioned()?;
                let connection = get_pooled_connection(&pool_guard)?;
                Ok(WriteConnectionGuard { _pool_guard: pool_guard, connection, _request_counter_scope })
            }
        }
    }

    #[must_use]
    pub fn pending_tasks(&self) -> PendingTasks {
        PendingTasks {
            read: self.request_counter_state.read_count.load(Ordering::Relaxed),
            write: self.request_counter_state.write_count.load(Ordering::Relaxed),
        }
    }

    pub fn abort_current_task(&self) {
        self.abort_current_task_flag.store(true, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub acquire_read_timeout_millis: NonZeroU64,
    pub acquire_write_timeout_millis: NonZeroU64,
}
