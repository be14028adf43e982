// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::explicit_deref_methods)]
#![warn(clippy::must_use_candidate)]
#![warn(rustdoc::broken_intra_doc_links)]
#![allow(clippy::module_name_repetitions)]
#![recursion_limit = "256"]

//! Concrete `SQLite`/Diesel implementations of the `tanaste-repo` port
//! traits, plus schema migrations.

use diesel::migration::{MigrationVersion, Result as MigrationResult};
use diesel::{QueryResult, RunQueryDsl as _};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness as _};

pub type DbBackend = diesel::sqlite::Sqlite;
pub type DbConnection = diesel::sqlite::SqliteConnection;

pub(crate) mod schema;
pub(crate) mod util;

mod repo;

pub mod prelude {
    pub(crate) use diesel::prelude::*;
    pub(crate) use diesel::result::Error as DieselError;
    pub(crate) use std::ops::{Deref, DerefMut};
    pub(crate) use tanaste_repo::prelude::*;

    pub use crate::{DbBackend, DbConnection};

    #[allow(missing_debug_implementations)]
    pub struct Connection<'db>(&'db mut DbConnection);

    impl<'db> Connection<'db> {
        pub fn new(inner: &'db mut DbConnection) -> Self {
            Self(inner)
        }
    }

    impl<'db> From<&'db mut DbConnection> for Connection<'db> {
        fn from(inner: &'db mut DbConnection) -> Self {
            Self::new(inner)
        }
    }

    impl AsRef<DbConnection> for Connection<'_> {
        fn as_ref(&self) -> &DbConnection {
            self.0
        }
    }

    impl AsMut<DbConnection> for Connection<'_> {
        fn as_mut(&mut self) -> &mut DbConnection {
            self.0
        }
    }

    impl Deref for Connection<'_> {
        type Target = DbConnection;

        fn deref(&self) -> &Self::Target {
            self.as_ref()
        }
    }

    impl DerefMut for Connection<'_> {
        fn deref_mut(&mut self) -> &mut Self::Target {
            self.as_mut()
        }
    }

    pub(crate) fn repo_error(err: DieselError) -> RepoError {
        match err {
            DieselError::NotFound => RepoError::NotFound,
            err => anyhow::Error::from(err).into(),
        }
    }

    /// Bridges `diesel::Connection::transaction`'s `E: From<DieselError>`
    /// bound (which a caller's own error type can't satisfy without an
    /// orphan-rule violation) down to `From<RepoError>`, which every
    /// caller's error type already provides.
    struct TxError<E>(E);

    impl<E> From<DieselError> for TxError<E>
    where
        E: From<RepoError>,
    {
        fn from(err: DieselError) -> Self {
            Self(E::from(repo_error(err)))
        }
    }

    impl<'db> Connection<'db> {
        /// Runs `f` inside a `BEGIN`/`COMMIT` pair, rolling back every
        /// write it made if it returns `Err`. `f` must be synchronous: it
        /// is handed to `diesel::Connection::transaction` as-is, so it
        /// cannot `.await` — callers that need to interleave async I/O
        /// (network harvesting, filesystem moves) around a write batch
        /// must finish that I/O before opening the transaction.
        pub fn transaction<T, E>(&mut self, f: impl FnOnce(&mut Connection<'_>) -> Result<T, E>) -> Result<T, E>
        where
            E: From<RepoError>,
        {
            use diesel::Connection as _;

            self.0
                .transaction::<T, TxError<E>, _>(|connection| {
                    let mut scoped = Connection::new(connection);
                    f(&mut scoped).map_err(TxError)
                })
                .map_err(|TxError(err)| err)
        }
    }
}

use prelude::Connection;

/// Tunes the engine for a single-writer embedded workload: write-ahead
/// logging, foreign-key enforcement, and deferred constraint checking.
pub fn initialize_database(connection: &mut DbConnection) -> QueryResult<()> {
    diesel::sql_query(
        r"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA wal_autocheckpoint = 1000;
PRAGMA wal_checkpoint(TRUNCATE);
PRAGMA foreign_keys = 1;
PRAGMA defer_foreign_keys = 1;
PRAGMA recursive_triggers = 1;
PRAGMA encoding = 'UTF-8';
",
    )
    .execute(connection)?;
    Ok(())
}

const EMBEDDED_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn run_migrations(connection: &mut DbConnection) -> MigrationResult<Vec<MigrationVersion<'_>>> {
    connection.run_pending_migrations(EMBEDDED_MIGRATIONS)
}

#[cfg(test)]
pub(crate) mod test_support {
    use diesel::Connection as _;

    use super::DbConnection;

    pub fn establish_connection() -> DbConnection {
        let mut connection = DbConnection::establish(":memory:").expect("in-memory database connection");
        super::run_migrations(&mut connection).expect("pending migrations apply cleanly");
        connection
    }
}
