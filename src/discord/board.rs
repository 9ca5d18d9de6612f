// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ticket board: one message per open ticket in the board channel, where helpers can join

use super::context::BotContext;
use super::utils::tickets::{board_components, ticket_channel_components, ticket_embed};
use crate::tickets::Ticket;
use miette::IntoDiagnostic;
use std::time::Duration;
use tokio::time::sleep;
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

/// The helper limit of the ticket's category, falling back to its current helper count if the category is gone
pub fn max_slots_for(context: &BotContext, ticket: &Ticket) -> usize {
	match context.controller.store().category(&ticket.category) {
		Ok(Some(category)) => category.slot_count(),
		Ok(None) => ticket.helpers.len(),
		Err(error) => {
			tracing::warn!(source = ?error, channel_id = %ticket.channel_id, "Failed to get ticket category");
			ticket.helpers.len()
		}
	}
}

/// Posts the opening message in a new ticket's channel.
pub async fn post_ticket_channel_message(context: &BotContext, ticket: &Ticket) -> miette::Result<()> {
	let max_slots = max_slots_for(context, ticket);
	let embed = ticket_embed(ticket, max_slots, true).into_diagnostic()?;
	let components = ticket_channel_components(ticket);
	let content = format!(
		"{} your ticket is open. Helpers will join you here.",
		ticket.requestor_id.mention()
	);
	let mut allowed_mentions = AllowedMentions::default();
	allowed_mentions.users.push(ticket.requestor_id);
	context
		.http_client
		.create_message(ticket.channel_id)
		.content(&content)
		.embeds(&[embed])
		.components(&components)
		.allowed_mentions(Some(&allowed_mentions))
		.await
		.into_diagnostic()?;
	Ok(())
}

/// Advertises a new ticket on the board and records the board message on the ticket.
pub async fn post_board_message(context: &BotContext, ticket: &Ticket) -> miette::Result<()> {
	let Some(board_channel) = context.config.channels.board else {
		return Ok(());
	};
	let max_slots = max_slots_for(context, ticket);
	let embed = ticket_embed(ticket, max_slots, false).into_diagnostic()?;
	let components = board_components(ticket, max_slots);
	let message = context
		.http_client
		.create_message(board_channel)
		.embeds(&[embed])
		.components(&components)
		.allowed_mentions(Some(&AllowedMentions::default()))
		.await
		.into_diagnostic()?
		.model()
		.await
		.into_diagnostic()?;
	context
		.controller
		.attach_board_message(ticket.channel_id, message.id)
		.await
		.into_diagnostic()?;
	Ok(())
}

/// Re-renders the ticket's board message after its helpers changed.
pub async fn refresh_board_message(context: &BotContext, ticket: &Ticket) -> miette::Result<()> {
	let (Some(board_channel), Some(message_id)) = (context.config.channels.board, ticket.board_message_id) else {
		return Ok(());
	};
	let max_slots = max_slots_for(context, ticket);
	let embed = ticket_embed(ticket, max_slots, false).into_diagnostic()?;
	let components = board_components(ticket, max_slots);
	context
		.http_client
		.update_message(board_channel, message_id)
		.embeds(Some(&[embed]))
		.components(Some(&components))
		.await
		.into_diagnostic()?;
	Ok(())
}

/// Takes a ticket that ended off the board.
pub async fn remove_board_message(context: &BotContext, ticket: &Ticket) -> miette::Result<()> {
	let (Some(board_channel), Some(message_id)) = (context.config.channels.board, ticket.board_message_id) else {
		return Ok(());
	};
	context
		.http_client
		.delete_message(board_channel, message_id)
		.await
		.into_diagnostic()?;
	Ok(())
}

/// Deletes an ended ticket's channel once participants have had a moment to read the closing message.
pub fn schedule_channel_deletion(context: &BotContext, channel_id: Id<ChannelMarker>) {
	let http_client = context.http_client.clone();
	let delay: Duration = context.config.tickets.channel_delete_delay;
	tokio::spawn(async move {
		sleep(delay).await;
		if let Err(error) = http_client.delete_channel(channel_id).await {
			tracing::warn!(source = ?error, %channel_id, "Failed to delete ended ticket's channel");
		}
	});
}
