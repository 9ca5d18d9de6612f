// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::collaborators::{
	Authorization, ChannelAccess, ChannelRequest, PointsLedger, RoleTag, TicketChannels, TicketCounter,
	TranscriptRenderer,
};
use super::cooldown::{CooldownKind, CooldownTracker};
use super::error::{StoreError, TicketError};
use super::locks::TicketLocks;
use super::store::TicketStore;
use super::ticket::{NewTicket, Ticket, TicketHistory, channel_name, generate_room_token};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker};

/// The services the controller calls out to
#[derive(Clone)]
pub struct Collaborators {
	pub channels: Arc<dyn TicketChannels>,
	pub authorization: Arc<dyn Authorization>,
	pub points: Arc<dyn PointsLedger>,
	pub transcripts: Arc<dyn TranscriptRenderer>,
	pub counter: Arc<dyn TicketCounter>,
}

#[derive(Clone, Copy, Debug)]
pub struct CooldownSettings {
	pub join: Duration,
	pub leave: Duration,
}

/// A point credit made to a helper when a ticket was closed
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HelperCredit {
	pub user_id: Id<UserMarker>,
	pub amount: i64,
	pub new_balance: i64,
}

/// The result of a ticket reaching its end
#[derive(Clone, Debug)]
pub struct ClosedTicket {
	pub ticket: Ticket,
	pub history: TicketHistory,
	/// Helpers who were credited, in join order. Exempt helpers and failed credits are absent.
	pub credits: Vec<HelperCredit>,
}

/// Runs tickets through their lifecycle: opened, helpers joining and leaving, then closed or cancelled.
///
/// The controller is the only writer of ticket records. Changes to a ticket's helpers happen while holding that
/// ticket's lock and are checked against a freshly read record, so concurrent joins can't overfill a ticket.
pub struct TicketController {
	store: TicketStore,
	locks: TicketLocks,
	cooldowns: CooldownTracker,
	cooldown_settings: CooldownSettings,
	collaborators: Collaborators,
}

impl TicketController {
	pub fn new(store: TicketStore, collaborators: Collaborators, cooldown_settings: CooldownSettings) -> Self {
		Self {
			store,
			locks: TicketLocks::new(),
			cooldowns: CooldownTracker::new(),
			cooldown_settings,
			collaborators,
		}
	}

	pub fn store(&self) -> &TicketStore {
		&self.store
	}

	pub fn get(&self, channel_id: Id<ChannelMarker>) -> Result<Option<Ticket>, TicketError> {
		Ok(self.store.get(channel_id)?)
	}

	pub fn list_active(&self) -> Result<Vec<Ticket>, TicketError> {
		Ok(self.store.list_active()?)
	}

	pub async fn create(&self, new_ticket: NewTicket) -> Result<Ticket, TicketError> {
		let authorization = &self.collaborators.authorization;
		if authorization
			.has_role(new_ticket.guild_id, new_ticket.requestor_id, RoleTag::Restricted)
			.await
		{
			return Err(TicketError::Restricted);
		}
		if let Some(existing) = self.store.active_ticket_for_requestor(new_ticket.requestor_id)? {
			return Err(TicketError::AlreadyHasActiveTicket(existing.channel_id));
		}
		if self.store.category(&new_ticket.category)?.is_none() {
			return Err(TicketError::UnknownCategory(new_ticket.category));
		}

		let request = ChannelRequest {
			guild_id: new_ticket.guild_id,
			name: channel_name(&new_ticket.category, &new_ticket.intake.display_name),
			requestor_id: new_ticket.requestor_id,
		};
		let channel_id = match self.collaborators.channels.create_channel(&request).await {
			Ok(channel_id) => channel_id,
			Err(error) => {
				tracing::error!(source = ?error, user_id = %new_ticket.requestor_id, "Failed to create ticket channel");
				return Err(TicketError::ChannelCreationFailed(error.to_string()));
			}
		};

		let ticket = Ticket {
			channel_id,
			guild_id: new_ticket.guild_id,
			category: new_ticket.category,
			requestor_id: new_ticket.requestor_id,
			helpers: Vec::new(),
			is_closed: false,
			room_token: generate_room_token(),
			intake: new_ticket.intake,
			board_message_id: None,
			opened_at: Utc::now(),
		};
		if let Err(error) = self.store.create(&ticket) {
			if let Err(delete_error) = self.collaborators.channels.delete_channel(channel_id).await {
				tracing::warn!(source = ?delete_error, %channel_id, "Failed to clean up channel of unsaved ticket");
			}
			return match error {
				StoreError::Conflict => {
					let existing = self.store.active_ticket_for_requestor(ticket.requestor_id)?;
					match existing {
						Some(existing) => Err(TicketError::AlreadyHasActiveTicket(existing.channel_id)),
						None => Err(TicketError::Persistence(StoreError::Conflict)),
					}
				}
				error => Err(error.into()),
			};
		}

		tracing::info!(%channel_id, user_id = %ticket.requestor_id, category = %ticket.category, "Ticket opened");
		Ok(ticket)
	}

	pub async fn join(&self, channel_id: Id<ChannelMarker>, actor: Id<UserMarker>) -> Result<Ticket, TicketError> {
		// Held through the save so the same user joining two tickets at once can't pass the other-ticket check twice.
		let _helper_guard = self.locks.acquire_helper(actor).await;
		self.check_cooldown(actor)?;

		let _ticket_guard = self.locks.acquire(channel_id).await;
		let Some(mut ticket) = self.store.get(channel_id)? else {
			return Err(TicketError::TicketNotFound);
		};
		if ticket.is_closed {
			return Err(TicketError::TicketClosed);
		}
		if ticket.requestor_id == actor {
			return Err(TicketError::RequestorCannotHelp);
		}
		if ticket.has_helper(actor) {
			return Err(TicketError::AlreadyHelper);
		}
		if let Some(own_ticket) = self.store.active_ticket_for_requestor(actor)? {
			if own_ticket.channel_id != channel_id {
				return Err(TicketError::RequestorElsewhere(own_ticket.channel_id));
			}
		}
		for other_ticket in self.store.active_tickets_with_helper(actor)? {
			if other_ticket.channel_id == channel_id {
				continue;
			}
			if self.channel_exists(other_ticket.channel_id).await {
				return Err(TicketError::HelperElsewhere(other_ticket.channel_id));
			}
			tracing::warn!(
				channel_id = %other_ticket.channel_id,
				user_id = %actor,
				"Dropping helper from ticket whose channel no longer exists"
			);
			self.store.remove_helper(other_ticket.channel_id, actor)?;
		}

		let Some(category) = self.store.category(&ticket.category)? else {
			return Err(TicketError::UnknownCategory(ticket.category));
		};
		let max_slots = category.slot_count();
		if ticket.helpers.len() >= max_slots {
			return Err(TicketError::TicketFull(max_slots));
		}
		let authorization = &self.collaborators.authorization;
		let eligible = authorization.has_role(ticket.guild_id, actor, RoleTag::Helper).await
			|| authorization.has_role(ticket.guild_id, actor, RoleTag::Staff).await;
		if !eligible {
			return Err(TicketError::NotEligible);
		}

		ticket.helpers.push(actor);
		self.store.save(&ticket)?;
		self.set_access(channel_id, actor, ChannelAccess::Granted).await;
		self.cooldowns
			.set(actor, CooldownKind::Join, self.cooldown_settings.join);

		tracing::info!(%channel_id, user_id = %actor, helpers = ticket.helpers.len(), "Helper joined ticket");
		Ok(ticket)
	}

	pub async fn leave(&self, channel_id: Id<ChannelMarker>, actor: Id<UserMarker>) -> Result<Ticket, TicketError> {
		let _helper_guard = self.locks.acquire_helper(actor).await;
		self.check_cooldown(actor)?;

		let _ticket_guard = self.locks.acquire(channel_id).await;
		let Some(mut ticket) = self.store.get(channel_id)? else {
			return Err(TicketError::TicketNotFound);
		};
		if ticket.is_closed {
			return Err(TicketError::TicketClosed);
		}
		if !ticket.has_helper(actor) {
			return Err(TicketError::NotHelper);
		}

		ticket.helpers.retain(|helper| *helper != actor);
		self.store.save(&ticket)?;
		self.set_access(channel_id, actor, ChannelAccess::Revoked).await;
		self.cooldowns
			.set(actor, CooldownKind::Leave, self.cooldown_settings.leave);

		tracing::info!(%channel_id, user_id = %actor, helpers = ticket.helpers.len(), "Helper left ticket");
		Ok(ticket)
	}

	/// Closes the ticket, crediting its helpers.
	///
	/// Once the ticket is claimed for closing, every remaining step runs even if some fail; failures are logged.
	pub async fn close(&self, channel_id: Id<ChannelMarker>, actor: Id<UserMarker>) -> Result<ClosedTicket, TicketError> {
		let ticket = self.claim_for_closing(channel_id, actor).await?;
		Ok(self.finish(ticket, actor, false).await)
	}

	/// Ends the ticket without awarding anybody.
	pub async fn cancel(&self, channel_id: Id<ChannelMarker>, actor: Id<UserMarker>) -> Result<ClosedTicket, TicketError> {
		let ticket = self.claim_for_closing(channel_id, actor).await?;
		Ok(self.finish(ticket, actor, true).await)
	}

	/// Whether the user may close or cancel the ticket
	pub async fn may_close(&self, ticket: &Ticket, user_id: Id<UserMarker>) -> bool {
		ticket.requestor_id == user_id
			|| self
				.collaborators
				.authorization
				.has_role(ticket.guild_id, user_id, RoleTag::Staff)
				.await
	}

	pub async fn is_staff(&self, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>) -> bool {
		self.collaborators
			.authorization
			.has_role(guild_id, user_id, RoleTag::Staff)
			.await
	}

	/// Records the ticket board message advertising the ticket.
	pub async fn attach_board_message(
		&self,
		channel_id: Id<ChannelMarker>,
		message_id: Id<MessageMarker>,
	) -> Result<(), TicketError> {
		let _ticket_guard = self.locks.acquire(channel_id).await;
		let Some(mut ticket) = self.store.get(channel_id)? else {
			return Err(TicketError::TicketNotFound);
		};
		ticket.board_message_id = Some(message_id);
		self.store.save(&ticket)?;
		Ok(())
	}

	/// Removes the user from the helpers of every active ticket, bypassing the ticket locks.
	///
	/// Returns the tickets the user was removed from.
	pub async fn force_free(&self, user_id: Id<UserMarker>) -> Result<Vec<Id<ChannelMarker>>, TicketError> {
		let mut freed_from = Vec::new();
		for ticket in self.store.active_tickets_with_helper(user_id)? {
			if self.store.remove_helper(ticket.channel_id, user_id)? {
				self.set_access(ticket.channel_id, user_id, ChannelAccess::Revoked).await;
				freed_from.push(ticket.channel_id);
			}
		}
		tracing::info!(%user_id, tickets = freed_from.len(), "Helper forcibly freed");
		Ok(freed_from)
	}

	pub fn clear_cooldown(&self, user_id: Id<UserMarker>, kind: CooldownKind) {
		self.cooldowns.clear(user_id, kind);
	}

	pub fn clear_cooldowns(&self, user_id: Id<UserMarker>) {
		self.cooldowns.clear_all(user_id);
	}

	fn check_cooldown(&self, user_id: Id<UserMarker>) -> Result<(), TicketError> {
		let remaining = self
			.cooldowns
			.check_any(user_id, &[CooldownKind::Join, CooldownKind::Leave]);
		if remaining > 0 {
			return Err(TicketError::OnCooldown(remaining));
		}
		Ok(())
	}

	/// Re-checks and marks the ticket closed so that only one close or cancel can go through.
	async fn claim_for_closing(&self, channel_id: Id<ChannelMarker>, actor: Id<UserMarker>) -> Result<Ticket, TicketError> {
		let _ticket_guard = self.locks.acquire(channel_id).await;
		let Some(mut ticket) = self.store.get(channel_id)? else {
			return Err(TicketError::TicketNotFound);
		};
		if ticket.is_closed {
			return Err(TicketError::AlreadyClosed);
		}
		if !self.may_close(&ticket, actor).await {
			return Err(TicketError::NotPermitted);
		}
		ticket.is_closed = true;
		self.store.save(&ticket)?;
		Ok(ticket)
	}

	async fn finish(&self, ticket: Ticket, actor: Id<UserMarker>, cancelled: bool) -> ClosedTicket {
		let channel_id = ticket.channel_id;
		let authorization = &self.collaborators.authorization;

		if !authorization
			.has_role(ticket.guild_id, ticket.requestor_id, RoleTag::Staff)
			.await
		{
			self.set_access(channel_id, ticket.requestor_id, ChannelAccess::Revoked)
				.await;
		}
		for helper in ticket.helpers.iter() {
			self.set_access(channel_id, *helper, ChannelAccess::Revoked).await;
		}

		let mut credits = Vec::new();
		if !cancelled {
			let points_per_helper = match self.store.category(&ticket.category) {
				Ok(Some(category)) => category.points_per_helper,
				Ok(None) => {
					tracing::warn!(%channel_id, category = %ticket.category, "Closed ticket's category no longer exists; awarding no points");
					0
				}
				Err(error) => {
					tracing::error!(source = ?error, %channel_id, "Failed to look up ticket category; awarding no points");
					0
				}
			};
			for helper in ticket.helpers.iter().copied() {
				if points_per_helper == 0 {
					break;
				}
				if authorization.has_role(ticket.guild_id, helper, RoleTag::Exempt).await {
					tracing::debug!(%channel_id, user_id = %helper, "Skipping points for exempt helper");
					continue;
				}
				match self.collaborators.points.credit(helper, points_per_helper).await {
					Ok(new_balance) => credits.push(HelperCredit {
						user_id: helper,
						amount: points_per_helper,
						new_balance,
					}),
					Err(error) => {
						tracing::error!(source = ?error, %channel_id, user_id = %helper, "Failed to credit helper")
					}
				}
			}

			if let Err(error) = self.collaborators.counter.increment_total_tickets().await {
				tracing::error!(source = ?error, %channel_id, "Failed to count completed ticket");
			}
		}

		if let Err(error) = self.collaborators.transcripts.render(&ticket, cancelled).await {
			tracing::error!(source = ?error, %channel_id, "Failed to generate ticket transcript");
		}

		let history = TicketHistory {
			id: cuid2::create_id(),
			channel_id,
			guild_id: ticket.guild_id,
			category: ticket.category.clone(),
			requestor_id: ticket.requestor_id,
			helpers: ticket.helpers.clone(),
			points_awarded: credits.iter().map(|credit| credit.amount).sum(),
			closed_by: actor,
			cancelled,
			opened_at: ticket.opened_at,
			closed_at: Utc::now(),
		};
		if let Err(error) = self.store.append_history(&history) {
			tracing::error!(source = ?error, %channel_id, "Failed to write ticket history");
		}
		if let Err(error) = self.store.delete(channel_id) {
			tracing::error!(source = ?error, %channel_id, "Failed to remove closed ticket");
		}

		tracing::info!(
			%channel_id,
			closed_by = %actor,
			cancelled,
			points_awarded = history.points_awarded,
			"Ticket ended"
		);
		ClosedTicket {
			ticket,
			history,
			credits,
		}
	}

	/// Lookup failures count as the channel existing, so a flaky lookup never drops a real helper.
	async fn channel_exists(&self, channel_id: Id<ChannelMarker>) -> bool {
		match self.collaborators.channels.channel_exists(channel_id).await {
			Ok(exists) => exists,
			Err(error) => {
				tracing::warn!(source = ?error, %channel_id, "Couldn't check whether ticket channel exists");
				true
			}
		}
	}

	async fn set_access(&self, channel_id: Id<ChannelMarker>, user_id: Id<UserMarker>, access: ChannelAccess) {
		if let Err(error) = self
			.collaborators
			.channels
			.set_access(channel_id, user_id, access)
			.await
		{
			tracing::warn!(source = ?error, %channel_id, %user_id, ?access, "Failed to update ticket channel access");
		}
	}
}
