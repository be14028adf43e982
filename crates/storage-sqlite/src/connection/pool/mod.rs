// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::num::NonZeroU32;

use diesel::{r2d2, Connection as _};

use crate::Result;

use super::Storage;

pub type ConnectionManager = r2d2::ConnectionManager<diesel::SqliteConnection>;
pub type ConnectionPool = r2d2::Pool<ConnectionManager>;
pub type PooledConnection = r2d2::PooledConnection<ConnectionManager>;

pub mod gatekeeper;

pub fn create_connection_pool(storage: &Storage, max_size: NonZeroU32) -> Result<ConnectionPool> {
    let storage = storage.as_ref();
    // Fail fast instead of letting r2d2 retry silently on an inaccessible path.
    drop(diesel::SqliteConnection::establish(storage)?);
    let manager = ConnectionManager::new(storage);
    let pool = ConnectionPool::builder().max_size(max_size.get()).build(manager)?;
    Ok(pool)
}

pub fn get_pooled_connection(pool: &ConnectionPool) -> Result<PooledConnection> {
    pool.get().map_err(Into::into)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub max_size: NonZeroU32,
    pub gatekeeper: self::gatekeeper::Config,
}
