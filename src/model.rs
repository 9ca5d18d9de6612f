// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::schema::{
	active_tickets, config_entries, ticket_categories, ticket_helpers, ticket_history, ticket_restricted_users,
	user_points,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker};

/// A key-value setting stored by the bot at runtime
#[derive(Insertable, Queryable)]
#[diesel(table_name = config_entries)]
pub struct ConfigEntry {
	pub key: String,
	pub value: String,
}

/// A user's points balance
#[derive(Debug, Insertable, Queryable)]
#[diesel(table_name = user_points)]
pub struct UserPoints {
	/// The ID of the user holding the points.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_user_id].
	pub user_id: i64,
	/// The user's current balance
	pub points: i64,
}

impl UserPoints {
	/// Gets the user holding the points.
	///
	/// For the raw database representation, use [Self::user_id].
	pub fn get_user_id(&self) -> Id<UserMarker> {
		Id::new(discord_id_from_database_id(self.user_id))
	}
}

/// The definition of a category of help ticket
#[derive(Clone, Debug, Eq, Insertable, PartialEq, Queryable)]
#[diesel(table_name = ticket_categories)]
pub struct TicketCategory {
	/// The category's name, which also identifies it
	pub name: String,
	/// Points credited to each eligible helper when a ticket in this category is closed
	pub points_per_helper: i64,
	/// The maximum number of helpers that may be assigned to a ticket in this category at once
	pub max_slots: i32,
	/// Text shown next to the category when a user picks one
	pub description: Option<String>,
	/// If set, the label of an extra intake field asking for category-specific details
	pub detail_prompt: Option<String>,
}

impl TicketCategory {
	/// The slot count as a length, treating a misconfigured negative count as no slots.
	pub fn slot_count(&self) -> usize {
		usize::try_from(self.max_slots).unwrap_or(0)
	}
}

/// The database representation of an active ticket
#[derive(Insertable, Queryable)]
#[diesel(table_name = active_tickets)]
pub struct TicketRow {
	/// The ID of the ticket's channel, which also identifies the ticket.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_channel_id].
	pub channel_id: i64,
	/// The ID of the guild in which the ticket was opened.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_guild_id].
	pub guild_id: i64,
	/// The name of the ticket's category
	pub category: String,
	/// The ID of the user who opened the ticket.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_requestor_id].
	pub requestor_id: i64,
	/// Whether the ticket has been closed or cancelled
	pub is_closed: bool,
	/// The room code shown to ticket participants
	pub room_token: i32,
	/// The name the requestor entered on the intake form
	pub display_name: String,
	/// The concerns the requestor entered on the intake form
	pub concerns: String,
	/// The answer to the category's detail prompt, if it has one
	pub details: Option<String>,
	/// The ID of the message on the ticket board advertising this ticket.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_board_message_id].
	pub board_message_id: Option<i64>,
	/// When the ticket was opened (UTC)
	pub opened_at: NaiveDateTime,
}

impl TicketRow {
	/// Gets the ticket's channel.
	///
	/// For the raw database representation, use [Self::channel_id].
	pub fn get_channel_id(&self) -> Id<ChannelMarker> {
		Id::new(discord_id_from_database_id(self.channel_id))
	}

	/// Gets the guild in which the ticket was opened.
	///
	/// For the raw database representation, use [Self::guild_id].
	pub fn get_guild_id(&self) -> Id<GuildMarker> {
		Id::new(discord_id_from_database_id(self.guild_id))
	}

	/// Gets the user who opened the ticket.
	///
	/// For the raw database representation, use [Self::requestor_id].
	pub fn get_requestor_id(&self) -> Id<UserMarker> {
		Id::new(discord_id_from_database_id(self.requestor_id))
	}

	/// Gets the ticket board message advertising the ticket, if one was posted.
	///
	/// For the raw database representation, use [Self::board_message_id].
	pub fn get_board_message_id(&self) -> Option<Id<MessageMarker>> {
		self.board_message_id
			.map(|database_id| Id::new(discord_id_from_database_id(database_id)))
	}
}

/// A helper assigned to an active ticket
#[derive(Insertable, Queryable)]
#[diesel(table_name = ticket_helpers)]
pub struct TicketHelper {
	/// The channel ID of the ticket the helper is assigned to
	pub channel_id: i64,
	/// The ID of the helping user.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_user_id].
	pub user_id: i64,
	/// The order in which the helper joined the ticket
	pub position: i32,
}

impl TicketHelper {
	/// Gets the helping user.
	///
	/// For the raw database representation, use [Self::user_id].
	pub fn get_user_id(&self) -> Id<UserMarker> {
		Id::new(discord_id_from_database_id(self.user_id))
	}
}

/// The archived record of a closed or cancelled ticket
#[derive(Insertable, Queryable)]
#[diesel(table_name = ticket_history)]
pub struct TicketHistoryRow {
	pub id: String,
	pub channel_id: i64,
	pub guild_id: i64,
	pub category: String,
	pub requestor_id: i64,
	/// JSON array of the helper IDs assigned when the ticket ended
	pub helpers: String,
	pub points_awarded: i64,
	pub closed_by: i64,
	pub cancelled: bool,
	pub opened_at: NaiveDateTime,
	pub closed_at: NaiveDateTime,
}

/// A user who may not open tickets in a guild
#[derive(Insertable, Queryable)]
#[diesel(table_name = ticket_restricted_users)]
pub struct TicketRestrictedUser {
	pub guild_id: i64,
	pub user_id: i64,
}

impl TicketRestrictedUser {
	/// Gets the restricted user.
	///
	/// For the raw database representation, use [Self::user_id].
	pub fn get_user_id(&self) -> Id<UserMarker> {
		Id::new(discord_id_from_database_id(self.user_id))
	}
}

/// Converts an ID used with Discord (unsigned) to an ID for database use (signed)
pub fn database_id_from_discord_id(discord_id: u64) -> i64 {
	discord_id as i64
}

/// Converts an ID retrieved from the database (signed) to an ID for use with Discord (unsigned)
pub fn discord_id_from_database_id(database_id: i64) -> u64 {
	database_id as u64
}
