// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::error::StoreError;
use super::ticket::{IntakeForm, Ticket, TicketHistory};
use crate::database::DbPool;
use crate::model::{
	TicketCategory, TicketHelper, TicketHistoryRow, TicketRow, database_id_from_discord_id,
	discord_id_from_database_id,
};
use crate::schema::{active_tickets, ticket_categories, ticket_helpers, ticket_history};
use diesel::prelude::*;
use diesel::result::Error as DbError;
use std::collections::HashMap;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};

/// Durable storage for active tickets, their history, and the ticket categories.
///
/// Every method is atomic on its own. Callers coordinate anything larger than a single call.
#[derive(Clone, Debug)]
pub struct TicketStore {
	db_connection_pool: DbPool,
}

impl TicketStore {
	pub fn new(db_connection_pool: DbPool) -> Self {
		Self { db_connection_pool }
	}

	pub fn create(&self, ticket: &Ticket) -> Result<(), StoreError> {
		let mut db_connection = self.db_connection_pool.get()?;
		let row = ticket_row(ticket);
		let helpers = helper_rows(ticket);
		db_connection.immediate_transaction(|db_connection| {
			diesel::insert_into(active_tickets::table)
				.values(row)
				.execute(db_connection)?;
			if !helpers.is_empty() {
				diesel::insert_into(ticket_helpers::table)
					.values(&helpers)
					.execute(db_connection)?;
			}
			Ok::<(), DbError>(())
		})?;
		Ok(())
	}

	pub fn get(&self, channel_id: Id<ChannelMarker>) -> Result<Option<Ticket>, StoreError> {
		let mut db_connection = self.db_connection_pool.get()?;
		let db_channel_id = database_id_from_discord_id(channel_id.get());
		let row: Option<TicketRow> = active_tickets::table
			.find(db_channel_id)
			.first(&mut db_connection)
			.optional()?;
		let Some(row) = row else {
			return Ok(None);
		};
		let mut tickets = load_tickets(&mut db_connection, vec![row])?;
		Ok(tickets.pop())
	}

	/// Replaces the ticket's mutable state (helpers, closed flag, board message) with that of the passed-in ticket.
	pub fn save(&self, ticket: &Ticket) -> Result<(), StoreError> {
		let mut db_connection = self.db_connection_pool.get()?;
		let db_channel_id = database_id_from_discord_id(ticket.channel_id.get());
		let board_message_id = ticket
			.board_message_id
			.map(|message_id| database_id_from_discord_id(message_id.get()));
		let helpers = helper_rows(ticket);
		db_connection.immediate_transaction(|db_connection| {
			let updated = diesel::update(active_tickets::table)
				.filter(active_tickets::channel_id.eq(db_channel_id))
				.set((
					active_tickets::is_closed.eq(ticket.is_closed),
					active_tickets::board_message_id.eq(board_message_id),
				))
				.execute(db_connection)?;
			if updated == 0 {
				return Err(DbError::NotFound);
			}
			diesel::delete(ticket_helpers::table)
				.filter(ticket_helpers::channel_id.eq(db_channel_id))
				.execute(db_connection)?;
			if !helpers.is_empty() {
				diesel::insert_into(ticket_helpers::table)
					.values(&helpers)
					.execute(db_connection)?;
			}
			Ok(())
		})?;
		Ok(())
	}

	pub fn delete(&self, channel_id: Id<ChannelMarker>) -> Result<(), StoreError> {
		let mut db_connection = self.db_connection_pool.get()?;
		let db_channel_id = database_id_from_discord_id(channel_id.get());
		db_connection.immediate_transaction(|db_connection| {
			diesel::delete(ticket_helpers::table)
				.filter(ticket_helpers::channel_id.eq(db_channel_id))
				.execute(db_connection)?;
			diesel::delete(active_tickets::table)
				.filter(active_tickets::channel_id.eq(db_channel_id))
				.execute(db_connection)?;
			Ok::<(), DbError>(())
		})?;
		Ok(())
	}

	/// Gets every ticket that hasn't been closed, oldest first.
	pub fn list_active(&self) -> Result<Vec<Ticket>, StoreError> {
		let mut db_connection = self.db_connection_pool.get()?;
		let rows: Vec<TicketRow> = active_tickets::table
			.filter(active_tickets::is_closed.eq(false))
			.order(active_tickets::opened_at.asc())
			.load(&mut db_connection)?;
		Ok(load_tickets(&mut db_connection, rows)?)
	}

	pub fn active_ticket_for_requestor(&self, user_id: Id<UserMarker>) -> Result<Option<Ticket>, StoreError> {
		let mut db_connection = self.db_connection_pool.get()?;
		let db_user_id = database_id_from_discord_id(user_id.get());
		let row: Option<TicketRow> = active_tickets::table
			.filter(active_tickets::requestor_id.eq(db_user_id))
			.filter(active_tickets::is_closed.eq(false))
			.first(&mut db_connection)
			.optional()?;
		let Some(row) = row else {
			return Ok(None);
		};
		let mut tickets = load_tickets(&mut db_connection, vec![row])?;
		Ok(tickets.pop())
	}

	pub fn active_tickets_with_helper(&self, user_id: Id<UserMarker>) -> Result<Vec<Ticket>, StoreError> {
		let mut db_connection = self.db_connection_pool.get()?;
		let db_user_id = database_id_from_discord_id(user_id.get());
		let channel_ids: Vec<i64> = ticket_helpers::table
			.filter(ticket_helpers::user_id.eq(db_user_id))
			.select(ticket_helpers::channel_id)
			.load(&mut db_connection)?;
		if channel_ids.is_empty() {
			return Ok(Vec::new());
		}
		let rows: Vec<TicketRow> = active_tickets::table
			.filter(active_tickets::channel_id.eq_any(channel_ids))
			.filter(active_tickets::is_closed.eq(false))
			.load(&mut db_connection)?;
		Ok(load_tickets(&mut db_connection, rows)?)
	}

	/// Drops a single helper from a ticket without touching the rest of it. Returns whether the helper was present.
	pub fn remove_helper(&self, channel_id: Id<ChannelMarker>, user_id: Id<UserMarker>) -> Result<bool, StoreError> {
		let mut db_connection = self.db_connection_pool.get()?;
		let db_channel_id = database_id_from_discord_id(channel_id.get());
		let db_user_id = database_id_from_discord_id(user_id.get());
		let removed = diesel::delete(ticket_helpers::table)
			.filter(ticket_helpers::channel_id.eq(db_channel_id))
			.filter(ticket_helpers::user_id.eq(db_user_id))
			.execute(&mut db_connection)?;
		Ok(removed > 0)
	}

	pub fn append_history(&self, record: &TicketHistory) -> Result<(), StoreError> {
		let helpers: Vec<u64> = record.helpers.iter().map(|helper| helper.get()).collect();
		let helpers = match serde_json::to_string(&helpers) {
			Ok(helpers) => helpers,
			Err(error) => return Err(StoreError::Corrupt(error.to_string())),
		};
		let row = TicketHistoryRow {
			id: record.id.clone(),
			channel_id: database_id_from_discord_id(record.channel_id.get()),
			guild_id: database_id_from_discord_id(record.guild_id.get()),
			category: record.category.clone(),
			requestor_id: database_id_from_discord_id(record.requestor_id.get()),
			helpers,
			points_awarded: record.points_awarded,
			closed_by: database_id_from_discord_id(record.closed_by.get()),
			cancelled: record.cancelled,
			opened_at: record.opened_at.naive_utc(),
			closed_at: record.closed_at.naive_utc(),
		};

		let mut db_connection = self.db_connection_pool.get()?;
		diesel::insert_into(ticket_history::table)
			.values(row)
			.execute(&mut db_connection)?;
		Ok(())
	}

	pub fn history_for_channel(&self, channel_id: Id<ChannelMarker>) -> Result<Vec<TicketHistory>, StoreError> {
		let mut db_connection = self.db_connection_pool.get()?;
		let db_channel_id = database_id_from_discord_id(channel_id.get());
		let rows: Vec<TicketHistoryRow> = ticket_history::table
			.filter(ticket_history::channel_id.eq(db_channel_id))
			.order(ticket_history::closed_at.asc())
			.load(&mut db_connection)?;
		rows.into_iter().map(history_from_row).collect()
	}

	pub fn category(&self, name: &str) -> Result<Option<TicketCategory>, StoreError> {
		let mut db_connection = self.db_connection_pool.get()?;
		let category = ticket_categories::table
			.find(name)
			.first(&mut db_connection)
			.optional()?;
		Ok(category)
	}

	pub fn categories(&self) -> Result<Vec<TicketCategory>, StoreError> {
		let mut db_connection = self.db_connection_pool.get()?;
		let categories = ticket_categories::table
			.order(ticket_categories::name.asc())
			.load(&mut db_connection)?;
		Ok(categories)
	}

	/// Makes the stored categories match the passed-in list exactly.
	pub fn sync_categories(&self, categories: &[TicketCategory]) -> Result<(), StoreError> {
		let mut db_connection = self.db_connection_pool.get()?;
		let names: Vec<&str> = categories.iter().map(|category| category.name.as_str()).collect();
		db_connection.immediate_transaction(|db_connection| {
			diesel::delete(ticket_categories::table)
				.filter(ticket_categories::name.ne_all(names))
				.execute(db_connection)?;
			for category in categories {
				diesel::replace_into(ticket_categories::table)
					.values(category)
					.execute(db_connection)?;
			}
			Ok::<(), DbError>(())
		})?;
		Ok(())
	}
}

fn ticket_row(ticket: &Ticket) -> TicketRow {
	TicketRow {
		channel_id: database_id_from_discord_id(ticket.channel_id.get()),
		guild_id: database_id_from_discord_id(ticket.guild_id.get()),
		category: ticket.category.clone(),
		requestor_id: database_id_from_discord_id(ticket.requestor_id.get()),
		is_closed: ticket.is_closed,
		room_token: ticket.room_token,
		display_name: ticket.intake.display_name.clone(),
		concerns: ticket.intake.concerns.clone(),
		details: ticket.intake.details.clone(),
		board_message_id: ticket
			.board_message_id
			.map(|message_id| database_id_from_discord_id(message_id.get())),
		opened_at: ticket.opened_at.naive_utc(),
	}
}

fn helper_rows(ticket: &Ticket) -> Vec<TicketHelper> {
	let channel_id = database_id_from_discord_id(ticket.channel_id.get());
	ticket
		.helpers
		.iter()
		.enumerate()
		.map(|(position, helper)| TicketHelper {
			channel_id,
			user_id: database_id_from_discord_id(helper.get()),
			position: position as i32,
		})
		.collect()
}

/// Attaches each ticket's helpers, in join order, to the ticket rows.
fn load_tickets(db_connection: &mut SqliteConnection, rows: Vec<TicketRow>) -> QueryResult<Vec<Ticket>> {
	let channel_ids: Vec<i64> = rows.iter().map(|row| row.channel_id).collect();
	let helper_rows: Vec<TicketHelper> = ticket_helpers::table
		.filter(ticket_helpers::channel_id.eq_any(channel_ids))
		.order(ticket_helpers::position.asc())
		.load(db_connection)?;
	let mut helpers_by_channel: HashMap<i64, Vec<Id<UserMarker>>> = HashMap::new();
	for helper in helper_rows {
		helpers_by_channel
			.entry(helper.channel_id)
			.or_default()
			.push(helper.get_user_id());
	}

	let tickets = rows
		.into_iter()
		.map(|row| {
			let helpers = helpers_by_channel.remove(&row.channel_id).unwrap_or_default();
			Ticket {
				channel_id: row.get_channel_id(),
				guild_id: row.get_guild_id(),
				requestor_id: row.get_requestor_id(),
				board_message_id: row.get_board_message_id(),
				category: row.category,
				helpers,
				is_closed: row.is_closed,
				room_token: row.room_token,
				intake: IntakeForm {
					display_name: row.display_name,
					concerns: row.concerns,
					details: row.details,
				},
				opened_at: row.opened_at.and_utc(),
			}
		})
		.collect();
	Ok(tickets)
}

fn history_from_row(row: TicketHistoryRow) -> Result<TicketHistory, StoreError> {
	let helpers: Vec<u64> = match serde_json::from_str(&row.helpers) {
		Ok(helpers) => helpers,
		Err(error) => return Err(StoreError::Corrupt(error.to_string())),
	};
	let helpers = helpers
		.into_iter()
		.filter(|helper| *helper != 0)
		.map(Id::new)
		.collect();
	Ok(TicketHistory {
		id: row.id,
		channel_id: Id::new(discord_id_from_database_id(row.channel_id)),
		guild_id: Id::new(discord_id_from_database_id(row.guild_id)),
		category: row.category,
		requestor_id: Id::new(discord_id_from_database_id(row.requestor_id)),
		helpers,
		points_awarded: row.points_awarded,
		closed_by: Id::new(discord_id_from_database_id(row.closed_by)),
		cancelled: row.cancelled,
		opened_at: row.opened_at.and_utc(),
		closed_at: row.closed_at.and_utc(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::database::test_pool;
	use chrono::Utc;

	fn express() -> TicketCategory {
		TicketCategory {
			name: String::from("Daily 4-Man Express"),
			points_per_helper: 10,
			max_slots: 4,
			description: None,
			detail_prompt: None,
		}
	}

	fn ticket(channel: u64, requestor: u64) -> Ticket {
		Ticket {
			channel_id: Id::new(channel),
			guild_id: Id::new(1),
			category: express().name,
			requestor_id: Id::new(requestor),
			helpers: Vec::new(),
			is_closed: false,
			room_token: 4321,
			intake: IntakeForm {
				display_name: String::from("Requestor"),
				concerns: String::from("Need a hand"),
				details: Some(String::from("Stage 3")),
			},
			board_message_id: None,
			opened_at: Utc::now(),
		}
	}

	#[test]
	fn create_get_save_delete() {
		let store = TicketStore::new(test_pool());
		let mut new_ticket = ticket(100, 1);
		store.create(&new_ticket).unwrap();

		let stored = store.get(Id::new(100)).unwrap().unwrap();
		assert_eq!(stored.intake, new_ticket.intake);
		assert_eq!(stored.room_token, 4321);
		assert!(stored.helpers.is_empty());

		new_ticket.helpers = vec![Id::new(7), Id::new(3), Id::new(5)];
		new_ticket.board_message_id = Some(Id::new(900));
		store.save(&new_ticket).unwrap();
		let stored = store.get(Id::new(100)).unwrap().unwrap();
		assert_eq!(stored.helpers, vec![Id::new(7), Id::new(3), Id::new(5)]);
		assert_eq!(stored.board_message_id, Some(Id::new(900)));

		store.delete(Id::new(100)).unwrap();
		assert!(store.get(Id::new(100)).unwrap().is_none());
		assert!(store.active_tickets_with_helper(Id::new(7)).unwrap().is_empty());
	}

	#[test]
	fn saving_a_missing_ticket_fails() {
		let store = TicketStore::new(test_pool());
		assert!(store.save(&ticket(100, 1)).is_err());
	}

	#[test]
	fn second_open_ticket_for_requestor_conflicts() {
		let store = TicketStore::new(test_pool());
		store.create(&ticket(100, 1)).unwrap();
		assert!(matches!(store.create(&ticket(101, 1)), Err(StoreError::Conflict)));

		let mut closed = store.get(Id::new(100)).unwrap().unwrap();
		closed.is_closed = true;
		store.save(&closed).unwrap();
		store.create(&ticket(101, 1)).unwrap();
	}

	#[test]
	fn active_queries_skip_closed_tickets() {
		let store = TicketStore::new(test_pool());
		let mut first = ticket(100, 1);
		first.helpers = vec![Id::new(9)];
		store.create(&first).unwrap();
		let mut second = ticket(101, 2);
		second.helpers = vec![Id::new(9)];
		second.is_closed = true;
		store.create(&second).unwrap();

		let active = store.list_active().unwrap();
		assert_eq!(active.len(), 1);
		assert_eq!(active[0].channel_id, Id::new(100));

		let helping = store.active_tickets_with_helper(Id::new(9)).unwrap();
		assert_eq!(helping.len(), 1);
		assert_eq!(helping[0].channel_id, Id::new(100));

		assert!(store.active_ticket_for_requestor(Id::new(1)).unwrap().is_some());
		assert!(store.active_ticket_for_requestor(Id::new(2)).unwrap().is_none());
	}

	#[test]
	fn remove_single_helper() {
		let store = TicketStore::new(test_pool());
		let mut new_ticket = ticket(100, 1);
		new_ticket.helpers = vec![Id::new(7), Id::new(8)];
		store.create(&new_ticket).unwrap();

		assert!(store.remove_helper(Id::new(100), Id::new(7)).unwrap());
		assert!(!store.remove_helper(Id::new(100), Id::new(7)).unwrap());
		assert_eq!(store.get(Id::new(100)).unwrap().unwrap().helpers, vec![Id::new(8)]);
	}

	#[test]
	fn history_is_appended() {
		let store = TicketStore::new(test_pool());
		let record = TicketHistory {
			id: cuid2::create_id(),
			channel_id: Id::new(100),
			guild_id: Id::new(1),
			category: express().name,
			requestor_id: Id::new(1),
			helpers: vec![Id::new(7), Id::new(8)],
			points_awarded: 20,
			closed_by: Id::new(1),
			cancelled: false,
			opened_at: Utc::now(),
			closed_at: Utc::now(),
		};
		store.append_history(&record).unwrap();

		let history = store.history_for_channel(Id::new(100)).unwrap();
		assert_eq!(history.len(), 1);
		assert_eq!(history[0].helpers, record.helpers);
		assert_eq!(history[0].points_awarded, 20);
		assert!(store.append_history(&record).is_err());
	}

	#[test]
	fn categories_follow_configuration() {
		let store = TicketStore::new(test_pool());
		let carry = TicketCategory {
			name: String::from("Quick Carry"),
			points_per_helper: 5,
			max_slots: 1,
			description: Some(String::from("One helper")),
			detail_prompt: None,
		};
		store.sync_categories(&[express(), carry.clone()]).unwrap();
		assert_eq!(store.categories().unwrap().len(), 2);

		let mut cheaper = express();
		cheaper.points_per_helper = 8;
		store.sync_categories(&[cheaper.clone()]).unwrap();
		assert_eq!(store.categories().unwrap(), vec![cheaper]);
		assert!(store.category("Quick Carry").unwrap().is_none());
	}
}
