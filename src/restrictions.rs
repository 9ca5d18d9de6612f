// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::database::DbPool;
use crate::model::{TicketRestrictedUser, database_id_from_discord_id};
use crate::schema::ticket_restricted_users;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DbError};
use miette::IntoDiagnostic;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, UserMarker};

/// Users staff have barred from opening tickets
#[derive(Clone)]
pub struct RestrictionStore {
	db_connection_pool: DbPool,
}

impl RestrictionStore {
	pub fn new(db_connection_pool: DbPool) -> Self {
		Self { db_connection_pool }
	}

	/// Restricts the user, returning false if they were already restricted.
	pub fn restrict(&self, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>) -> miette::Result<bool> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let new_restriction = TicketRestrictedUser {
			guild_id: database_id_from_discord_id(guild_id.get()),
			user_id: database_id_from_discord_id(user_id.get()),
		};
		let insert_result = diesel::insert_into(ticket_restricted_users::table)
			.values(new_restriction)
			.execute(&mut db_connection);
		match insert_result {
			Ok(_) => Ok(true),
			Err(DbError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Ok(false),
			Err(error) => Err(error).into_diagnostic(),
		}
	}

	/// Lifts the user's restriction, returning false if they weren't restricted.
	pub fn unrestrict(&self, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>) -> miette::Result<bool> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let db_guild_id = database_id_from_discord_id(guild_id.get());
		let db_user_id = database_id_from_discord_id(user_id.get());
		let deleted = diesel::delete(ticket_restricted_users::table)
			.filter(
				ticket_restricted_users::guild_id
					.eq(db_guild_id)
					.and(ticket_restricted_users::user_id.eq(db_user_id)),
			)
			.execute(&mut db_connection)
			.into_diagnostic()?;
		Ok(deleted > 0)
	}

	pub fn is_restricted(&self, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>) -> miette::Result<bool> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let db_guild_id = database_id_from_discord_id(guild_id.get());
		let db_user_id = database_id_from_discord_id(user_id.get());
		let restriction: Option<TicketRestrictedUser> = ticket_restricted_users::table
			.find((db_guild_id, db_user_id))
			.first(&mut db_connection)
			.optional()
			.into_diagnostic()?;
		Ok(restriction.is_some())
	}

	pub fn restricted_users(&self, guild_id: Id<GuildMarker>) -> miette::Result<Vec<Id<UserMarker>>> {
		let mut db_connection = self.db_connection_pool.get().into_diagnostic()?;
		let db_guild_id = database_id_from_discord_id(guild_id.get());
		let restricted_users: Vec<TicketRestrictedUser> = ticket_restricted_users::table
			.filter(ticket_restricted_users::guild_id.eq(db_guild_id))
			.load(&mut db_connection)
			.into_diagnostic()?;
		Ok(restricted_users.iter().map(|user| user.get_user_id()).collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::database::test_pool;

	#[test]
	fn restrictions_are_per_guild() {
		let store = RestrictionStore::new(test_pool());
		let guild = Id::new(1);
		let user = Id::new(10);

		assert!(store.restrict(guild, user).unwrap());
		assert!(!store.restrict(guild, user).unwrap());
		assert!(store.is_restricted(guild, user).unwrap());
		assert!(!store.is_restricted(Id::new(2), user).unwrap());
		assert_eq!(store.restricted_users(guild).unwrap(), vec![user]);

		assert!(store.unrestrict(guild, user).unwrap());
		assert!(!store.unrestrict(guild, user).unwrap());
		assert!(store.restricted_users(guild).unwrap().is_empty());
	}
}
