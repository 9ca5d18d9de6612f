// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::database::DbPool;
use crate::model::{UserPoints, database_id_from_discord_id};
use crate::schema::user_points;
use crate::tickets::PointsLedger;
use async_trait::async_trait;
use diesel::prelude::*;
use miette::IntoDiagnostic;
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

/// Points balances kept in the bot's database
#[derive(Clone)]
pub struct DatabasePointsLedger {
	db_connection_pool: DbPool,
}

impl DatabasePointsLedger {
	pub fn new(db_connection_pool: DbPool) -> Self {
		Self { db_connection_pool }
	}

	/// Gets the highest balances, highest first.
	pub fn leaderboard(&self, limit: i64) -> miette::Result<Vec<UserPoints>> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		user_points::table
			.filter(user_points::points.gt(0))
			.order((user_points::points.desc(), user_points::user_id.asc()))
			.limit(limit)
			.load(&mut db_connection)
			.into_diagnostic()
	}

	fn add(&self, user_id: Id<UserMarker>, amount: i64) -> miette::Result<i64> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let db_user_id = database_id_from_discord_id(user_id.get());
		let new_entry = UserPoints {
			user_id: db_user_id,
			points: amount,
		};
		db_connection
			.immediate_transaction(|db_connection| {
				diesel::insert_into(user_points::table)
					.values(new_entry)
					.on_conflict(user_points::user_id)
					.do_update()
					.set(user_points::points.eq(user_points::points + amount))
					.execute(db_connection)?;
				user_points::table
					.find(db_user_id)
					.select(user_points::points)
					.first(db_connection)
			})
			.into_diagnostic()
	}
}

#[async_trait]
impl PointsLedger for DatabasePointsLedger {
	async fn credit(&self, user_id: Id<UserMarker>, amount: i64) -> miette::Result<i64> {
		let new_balance = self.add(user_id, amount)?;
		tracing::debug!(%user_id, amount, new_balance, "Points credited");
		Ok(new_balance)
	}

	async fn balance(&self, user_id: Id<UserMarker>) -> miette::Result<i64> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let db_user_id = database_id_from_discord_id(user_id.get());
		let points: Option<i64> = user_points::table
			.find(db_user_id)
			.select(user_points::points)
			.first(&mut db_connection)
			.optional()
			.into_diagnostic()?;
		Ok(points.unwrap_or(0))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::database::{open_pool, run_embedded_migrations, test_pool};
	use std::sync::Arc;

	#[tokio::test]
	async fn credits_accumulate() {
		let ledger = DatabasePointsLedger::new(test_pool());
		let user = Id::new(42);
		assert_eq!(ledger.balance(user).await.unwrap(), 0);
		assert_eq!(ledger.credit(user, 10).await.unwrap(), 10);
		assert_eq!(ledger.credit(user, 5).await.unwrap(), 15);
		assert_eq!(ledger.balance(user).await.unwrap(), 15);
	}

	#[tokio::test]
	async fn leaderboard_orders_by_balance() {
		let ledger = DatabasePointsLedger::new(test_pool());
		ledger.credit(Id::new(1), 5).await.unwrap();
		ledger.credit(Id::new(2), 30).await.unwrap();
		ledger.credit(Id::new(3), 12).await.unwrap();

		let leaders: Vec<u64> = ledger
			.leaderboard(2)
			.unwrap()
			.iter()
			.map(|entry| entry.get_user_id().get())
			.collect();
		assert_eq!(leaders, vec![2, 3]);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn concurrent_credits_on_a_database_file_all_land() {
		let directory = tempfile::tempdir().unwrap();
		let database_path = directory.path().join("points.sqlite3");
		let pool = open_pool(database_path.to_str().unwrap()).unwrap();
		run_embedded_migrations(&pool).unwrap();
		let ledger = Arc::new(DatabasePointsLedger::new(pool));
		let user = Id::new(42);

		let tasks: Vec<_> = (0..8)
			.map(|_| {
				let ledger = Arc::clone(&ledger);
				tokio::spawn(async move {
					for _ in 0..5 {
						ledger.credit(user, 2).await.unwrap();
					}
				})
			})
			.collect();
		for task in tasks {
			task.await.unwrap();
		}

		assert_eq!(ledger.balance(user).await.unwrap(), 80);
	}
}
