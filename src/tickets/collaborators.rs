// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::ticket::Ticket;
use async_trait::async_trait;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, UserMarker};

/// What the ticket controller needs from a new ticket channel
#[derive(Clone, Debug)]
pub struct ChannelRequest {
	pub guild_id: Id<GuildMarker>,
	pub name: String,
	/// The requestor, who gets access to the channel from the start
	pub requestor_id: Id<UserMarker>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChannelAccess {
	/// May view and send messages in the channel
	Granted,
	Revoked,
}

/// Designations the ticket controller checks for
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RoleTag {
	Staff,
	Helper,
	/// Helpers who are never awarded points
	Exempt,
	/// Users barred from opening tickets
	Restricted,
}

/// Provisioning and access control for ticket channels
#[async_trait]
pub trait TicketChannels: Send + Sync {
	async fn create_channel(&self, request: &ChannelRequest) -> miette::Result<Id<ChannelMarker>>;

	/// Whether the channel still exists. Channels can be deleted out from under a ticket.
	async fn channel_exists(&self, channel_id: Id<ChannelMarker>) -> miette::Result<bool>;

	async fn set_access(
		&self,
		channel_id: Id<ChannelMarker>,
		user_id: Id<UserMarker>,
		access: ChannelAccess,
	) -> miette::Result<()>;

	async fn delete_channel(&self, channel_id: Id<ChannelMarker>) -> miette::Result<()>;
}

#[async_trait]
pub trait Authorization: Send + Sync {
	/// Whether the user holds the designation. Lookup failures count as not holding it.
	async fn has_role(&self, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>, role: RoleTag) -> bool;
}

#[async_trait]
pub trait PointsLedger: Send + Sync {
	/// Adds points to the user's balance, returning the new balance.
	async fn credit(&self, user_id: Id<UserMarker>, amount: i64) -> miette::Result<i64>;

	async fn balance(&self, user_id: Id<UserMarker>) -> miette::Result<i64>;
}

#[async_trait]
pub trait TranscriptRenderer: Send + Sync {
	/// Archives the ticket channel's conversation.
	async fn render(&self, ticket: &Ticket, cancelled: bool) -> miette::Result<()>;
}

#[async_trait]
pub trait TicketCounter: Send + Sync {
	/// Counts one more completed ticket, returning the new total.
	async fn increment_total_tickets(&self) -> miette::Result<i64>;
}
