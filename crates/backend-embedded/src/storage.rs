// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Database provisioning: turns a resolved [`MasterConfig`] into a running
//! [`Gatekeeper`], creating the connection pool, applying pragmas and
//! pending migrations once up front.

use tanaste_core_api::config::MasterConfig;
use tanaste_storage_sqlite::connection::pool::gatekeeper::{Config as GatekeeperConfig, Gatekeeper};
use tanaste_storage_sqlite::connection::pool::{create_connection_pool, get_pooled_connection, Config as PoolConfig};
use tanaste_storage_sqlite::connection::Storage;

use crate::Result;

#[derive(Debug, Clone, Copy)]
pub struct DatabaseConfig {
    pub pool: PoolConfig,
}

pub fn provision_database(master: &MasterConfig, config: &DatabaseConfig) -> Result<Gatekeeper> {
    let storage = Storage::File { path: master.database_path.clone() };

    tracing::info!(path = %master.database_path.display(), "provisioning SQLite database");
    let connection_pool = create_connection_pool(&storage, config.pool.max_size)?;

    tanaste_usecases_sqlite::database::initialize_and_migrate(&mut get_pooled_connection(&connection_pool)?)?;

    let gatekeeper = Gatekeeper::new(connection_pool, config.pool.gatekeeper);
    Ok(gatekeeper)
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig {
                max_size: std::num::NonZeroU32::new(4).expect("4 is non-zero"),
                gatekeeper: GatekeeperConfig {
                    acquire_read_timeout_millis: std::num::NonZeroU64::new(5_000).expect("5000 is non-zero"),
                    acquire_write_timeout_millis: std::num::NonZeroU64::new(5_000).expect("5000 is non-zero"),
                },
            },
        }
    }
}
