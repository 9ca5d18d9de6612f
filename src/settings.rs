// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::database::DbPool;
use crate::model::ConfigEntry;
use crate::schema::config_entries;
use crate::tickets::TicketCounter;
use async_trait::async_trait;
use diesel::prelude::*;
use miette::{IntoDiagnostic, bail};

/// Key of the count of every ticket that was closed (not cancelled)
pub const TOTAL_TICKETS_KEY: &str = "total_tickets";

/// Values the bot keeps across restarts that aren't part of its configuration file
#[derive(Clone)]
pub struct ConfigStore {
	db_connection_pool: DbPool,
}

impl ConfigStore {
	pub fn new(db_connection_pool: DbPool) -> Self {
		Self { db_connection_pool }
	}

	pub fn get(&self, key: &str) -> miette::Result<Option<String>> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		config_entries::table
			.find(key)
			.select(config_entries::value)
			.first(&mut db_connection)
			.optional()
			.into_diagnostic()
	}

	pub fn set(&self, key: &str, value: &str) -> miette::Result<()> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let entry = ConfigEntry {
			key: key.to_string(),
			value: value.to_string(),
		};
		diesel::replace_into(config_entries::table)
			.values(entry)
			.execute(&mut db_connection)
			.into_diagnostic()?;
		Ok(())
	}

	pub fn total_tickets(&self) -> miette::Result<i64> {
		let Some(value) = self.get(TOTAL_TICKETS_KEY)? else {
			return Ok(0);
		};
		match value.parse() {
			Ok(total) => Ok(total),
			Err(_) => bail!("Stored ticket total \"{}\" isn't a number", value),
		}
	}

	/// Adds one to the stored ticket total.
	///
	/// The read and write happen in one transaction, so concurrent closes never lose a count.
	fn increment_total(&self) -> miette::Result<i64> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let total = db_connection
			.immediate_transaction(|db_connection| {
				let stored: Option<String> = config_entries::table
					.find(TOTAL_TICKETS_KEY)
					.select(config_entries::value)
					.first(db_connection)
					.optional()?;
				let total = stored.and_then(|value| value.parse::<i64>().ok()).unwrap_or(0) + 1;
				diesel::replace_into(config_entries::table)
					.values(ConfigEntry {
						key: TOTAL_TICKETS_KEY.to_string(),
						value: total.to_string(),
					})
					.execute(db_connection)?;
				Ok::<i64, diesel::result::Error>(total)
			})
			.into_diagnostic()?;
		Ok(total)
	}
}

#[async_trait]
impl TicketCounter for ConfigStore {
	async fn increment_total_tickets(&self) -> miette::Result<i64> {
		let total = self.increment_total()?;
		tracing::debug!(total, "Ticket total increased");
		Ok(total)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::database::test_pool;

	#[test]
	fn values_are_replaced() {
		let store = ConfigStore::new(test_pool());
		assert_eq!(store.get("greeting").unwrap(), None);
		store.set("greeting", "hello").unwrap();
		store.set("greeting", "hi").unwrap();
		assert_eq!(store.get("greeting").unwrap().as_deref(), Some("hi"));
	}

	#[tokio::test]
	async fn ticket_total_counts_up() {
		let store = ConfigStore::new(test_pool());
		assert_eq!(store.total_tickets().unwrap(), 0);
		assert_eq!(store.increment_total_tickets().await.unwrap(), 1);
		assert_eq!(store.increment_total_tickets().await.unwrap(), 2);
		assert_eq!(store.total_tickets().unwrap(), 2);
	}

	#[test]
	fn garbage_total_is_reported() {
		let store = ConfigStore::new(test_pool());
		store.set(TOTAL_TICKETS_KEY, "lots").unwrap();
		assert!(store.total_tickets().is_err());
	}
}
