// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigData;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use miette::{Diagnostic, IntoDiagnostic};
use std::error::Error;
use std::fmt;
use std::time::Duration;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

// To get boxed errors (as returned by the migration runner) into miette, we need a wrapper type for them.
#[derive(Debug, Diagnostic)]
pub struct MigrationError(pub Box<dyn Error + Send + Sync>);

impl fmt::Display for MigrationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

impl Error for MigrationError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		self.0.source()
	}
}

/// How long a connection waits on another connection's write lock before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-connection SQLite settings. Event tasks write concurrently, so writers wait for the lock instead of
/// failing right away, and WAL keeps readers from blocking the writer.
#[derive(Debug)]
struct SqliteConnectionOptions {
	busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteConnectionOptions {
	fn on_acquire(&self, connection: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
		let pragmas = format!(
			"PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL;",
			self.busy_timeout.as_millis()
		);
		connection
			.batch_execute(&pragmas)
			.map_err(diesel::r2d2::Error::QueryError)
	}
}

pub fn connect_db(config: &ConfigData) -> miette::Result<DbPool> {
	open_pool(&config.database.path)
}

/// Opens a connection pool on the SQLite database file at the given path.
pub fn open_pool(database_path: &str) -> miette::Result<DbPool> {
	let manager: ConnectionManager<SqliteConnection> = ConnectionManager::new(database_path);
	Pool::builder()
		.test_on_check_out(true)
		.connection_customizer(Box::new(SqliteConnectionOptions {
			busy_timeout: BUSY_TIMEOUT,
		}))
		.build(manager)
		.into_diagnostic()
}

pub fn run_embedded_migrations(db_connection_pool: &DbPool) -> Result<(), MigrationError> {
	let mut db_connection = match db_connection_pool.get() {
		Ok(connection) => connection,
		Err(error) => return Err(MigrationError(Box::new(error))),
	};
	match db_connection.run_pending_migrations(MIGRATIONS) {
		Ok(_) => Ok(()),
		Err(error) => Err(MigrationError(error)),
	}
}

/// An in-memory database with all migrations applied.
///
/// The pool holds a single connection, since every SQLite in-memory connection is its own database.
#[cfg(test)]
pub fn test_pool() -> DbPool {
	let manager: ConnectionManager<SqliteConnection> = ConnectionManager::new(":memory:");
	let pool = Pool::builder()
		.max_size(1)
		.build(manager)
		.expect("in-memory database pool");
	run_embedded_migrations(&pool).expect("migrations apply to an empty database");
	pool
}
