// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Schema provisioning: pragma tuning plus pending migrations, run once
//! against a freshly pooled connection before the `Gatekeeper` hands it out
//! to any use case.

use tanaste_repo_sqlite::DbConnection;

use crate::Result;

pub fn initialize_and_migrate(connection: &mut DbConnection) -> Result<()> {
    tanaste_repo_sqlite::initialize_database(connection).map_err(tanaste_storage_sqlite::Error::from)?;
    tanaste_repo_sqlite::run_migrations(connection)
        .map_err(|err| tanaste_storage_sqlite::Error::Other(anyhow::Error::from(err)))?;
    Ok(())
}
