// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::board::{refresh_board_message, remove_board_message, schedule_channel_deletion};
use crate::discord::context::BotContext;
use crate::discord::state::confirm::{
	PendingConfirmation, PendingConfirmations, confirmation_components, confirmation_prompt,
};
use crate::discord::utils::interaction::guild_and_user;
use crate::discord::utils::responses::{respond_ephemeral, ticket_error_message};
use crate::discord::utils::tickets::closing_message;
use crate::tickets::{ClosedTicket, Ticket, TicketAction, TicketError, parse_action_path};
use miette::{IntoDiagnostic, bail};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::{AllowedMentions, MessageFlags};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};
use twilight_util::builder::InteractionResponseDataBuilder;

const CONFIRMATION_EXPIRED: &str = "This confirmation expired. The ticket is still open.";

/// Handles a button on a ticket board or ticket channel message.
pub async fn route_ticket_action_interaction(
	context: &Arc<BotContext>,
	interaction: &InteractionCreate,
	custom_id_path: &[String],
) -> miette::Result<()> {
	let Some((channel_id, action)) = parse_action_path(custom_id_path) else {
		bail!("Invalid custom ID for ticket action (parts: {:?})", custom_id_path);
	};
	run_ticket_action(context, interaction, channel_id, action).await
}

/// Performs a ticket action for the interacting user. Actions that end a ticket ask for confirmation first.
pub async fn run_ticket_action(
	context: &Arc<BotContext>,
	interaction: &InteractionCreate,
	channel_id: Id<ChannelMarker>,
	action: TicketAction,
) -> miette::Result<()> {
	let (_, user_id) = guild_and_user(interaction)?;
	if action.needs_confirmation() {
		return prompt_confirmation(context, interaction, channel_id, action, user_id).await;
	}

	let result = match action {
		TicketAction::Join => context.controller.join(channel_id, user_id).await,
		TicketAction::Leave => context.controller.leave(channel_id, user_id).await,
		TicketAction::Close | TicketAction::Cancel => bail!("{:?} reached the ticket without confirmation", action),
	};
	let ticket = match result {
		Ok(ticket) => ticket,
		Err(error) => {
			let message = ticket_error_message(&error, Some(channel_id), user_id);
			return respond_ephemeral(context, interaction, message).await;
		}
	};

	let (reply, notice) = match action {
		TicketAction::Join => (
			format!(
				"You joined the ticket in {}. The room code is **{}**.",
				channel_id.mention(),
				ticket.room_token
			),
			format!("{} joined as a helper.", user_id.mention()),
		),
		_ => (
			String::from("You left the ticket."),
			format!("{} is no longer helping.", user_id.mention()),
		),
	};
	respond_ephemeral(context, interaction, reply).await?;
	announce_helper_change(context, &ticket, &notice).await;
	Ok(())
}

async fn announce_helper_change(context: &BotContext, ticket: &Ticket, notice: &str) {
	let notice_result = context
		.http_client
		.create_message(ticket.channel_id)
		.content(notice)
		.allowed_mentions(Some(&AllowedMentions::default()))
		.await;
	if let Err(error) = notice_result {
		tracing::warn!(source = ?error, channel_id = %ticket.channel_id, "Failed to announce helper change");
	}
	if let Err(error) = refresh_board_message(context, ticket).await {
		tracing::warn!(source = ?error, channel_id = %ticket.channel_id, "Failed to update board message");
	}
}

async fn prompt_confirmation(
	context: &Arc<BotContext>,
	interaction: &InteractionCreate,
	channel_id: Id<ChannelMarker>,
	action: TicketAction,
	user_id: Id<UserMarker>,
) -> miette::Result<()> {
	let ticket = match context.controller.get(channel_id) {
		Ok(Some(ticket)) => ticket,
		Ok(None) => return respond_ephemeral(context, interaction, TicketError::TicketNotFound.to_string()).await,
		Err(error) => {
			let message = ticket_error_message(&error, Some(channel_id), user_id);
			return respond_ephemeral(context, interaction, message).await;
		}
	};
	if ticket.is_closed {
		return respond_ephemeral(context, interaction, TicketError::AlreadyClosed.to_string()).await;
	}
	if !context.controller.may_close(&ticket, user_id).await {
		return respond_ephemeral(context, interaction, TicketError::NotPermitted.to_string()).await;
	}

	let confirm_id = cuid2::create_id();
	{
		let mut state = context.bot_state.write().await;
		let pending_confirmations = state
			.entry::<PendingConfirmations>()
			.or_insert_with(PendingConfirmations::default);
		pending_confirmations.confirmations.insert(
			confirm_id.clone(),
			PendingConfirmation {
				channel_id,
				action,
				user_id,
				interaction_token: interaction.token.clone(),
			},
		);
	}
	tokio::spawn(expire_confirmation(
		Arc::clone(context),
		confirm_id.clone(),
		context.config.tickets.confirm_timeout,
	));

	let response = InteractionResponseDataBuilder::new()
		.content(confirmation_prompt(action))
		.components(confirmation_components(&confirm_id, action))
		.flags(MessageFlags::EPHEMERAL)
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(response),
	};
	context
		.interaction_client()
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;
	Ok(())
}

async fn expire_confirmation(context: Arc<BotContext>, confirm_id: String, wait: Duration) {
	sleep(wait).await;
	let expired = {
		let mut state = context.bot_state.write().await;
		let Some(pending_confirmations) = state.get_mut::<PendingConfirmations>() else {
			return;
		};
		pending_confirmations.confirmations.remove(&confirm_id)
	};
	let Some(expired) = expired else {
		return;
	};

	let update_result = context
		.interaction_client()
		.update_response(&expired.interaction_token)
		.content(Some(CONFIRMATION_EXPIRED))
		.components(None)
		.await;
	if let Err(error) = update_result {
		tracing::warn!(source = ?error, channel_id = %expired.channel_id, "Failed to mark confirmation as expired");
	}
}

/// Handles the answer to a close or cancel confirmation.
pub async fn route_confirmation_interaction(
	context: &Arc<BotContext>,
	interaction: &InteractionCreate,
	custom_id_path: &[String],
) -> miette::Result<()> {
	let (Some(confirm_id), Some(answer)) = (custom_id_path.get(1), custom_id_path.get(2)) else {
		bail!("Invalid custom ID for confirmation (parts: {:?})", custom_id_path);
	};
	let confirmed = match answer.as_str() {
		"yes" => true,
		"no" => false,
		_ => bail!("Invalid confirmation answer: {} (custom ID parts: {:?})", answer, custom_id_path),
	};
	let (_, user_id) = guild_and_user(interaction)?;

	let pending = {
		let mut state = context.bot_state.write().await;
		let pending_confirmations = state
			.entry::<PendingConfirmations>()
			.or_insert_with(PendingConfirmations::default);
		match pending_confirmations.confirmations.get(confirm_id) {
			Some(pending) if pending.user_id != user_id => None,
			Some(_) => pending_confirmations.confirmations.remove(confirm_id),
			None => None,
		}
	};
	let interaction_client = context.interaction_client();
	let Some(pending) = pending else {
		let response = InteractionResponseDataBuilder::new()
			.content(CONFIRMATION_EXPIRED)
			.components(Vec::new())
			.build();
		let response = InteractionResponse {
			kind: InteractionResponseType::UpdateMessage,
			data: Some(response),
		};
		interaction_client
			.create_response(interaction.id, &interaction.token, &response)
			.await
			.into_diagnostic()?;
		return Ok(());
	};

	if !confirmed {
		let response = InteractionResponseDataBuilder::new()
			.content("Okay, the ticket stays open.")
			.components(Vec::new())
			.build();
		let response = InteractionResponse {
			kind: InteractionResponseType::UpdateMessage,
			data: Some(response),
		};
		interaction_client
			.create_response(interaction.id, &interaction.token, &response)
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	// Closing renders the transcript, which can take longer than Discord waits for a response.
	let response = InteractionResponse {
		kind: InteractionResponseType::DeferredUpdateMessage,
		data: None,
	};
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	let result = match pending.action {
		TicketAction::Cancel => context.controller.cancel(pending.channel_id, user_id).await,
		_ => context.controller.close(pending.channel_id, user_id).await,
	};
	let reply = match result {
		Ok(closed) => {
			let reply = if closed.history.cancelled {
				"Ticket cancelled."
			} else {
				"Ticket closed."
			};
			wrap_up_ended_ticket(context, &closed).await;
			reply.to_string()
		}
		Err(error) => ticket_error_message(&error, Some(pending.channel_id), user_id),
	};
	interaction_client
		.update_response(&interaction.token)
		.content(Some(&reply))
		.components(None)
		.await
		.into_diagnostic()?;
	Ok(())
}

/// Tells the ticket's channel how it ended, takes it off the board, and schedules the channel for deletion.
async fn wrap_up_ended_ticket(context: &BotContext, closed: &ClosedTicket) {
	let ticket = &closed.ticket;
	let message = closing_message(ticket, closed.history.cancelled, &closed.credits);
	let message_result = context
		.http_client
		.create_message(ticket.channel_id)
		.content(&message)
		.allowed_mentions(Some(&AllowedMentions::default()))
		.await;
	if let Err(error) = message_result {
		tracing::warn!(source = ?error, channel_id = %ticket.channel_id, "Failed to post closing message");
	}
	if let Err(error) = remove_board_message(context, ticket).await {
		tracing::warn!(source = ?error, channel_id = %ticket.channel_id, "Failed to remove board message");
	}
	schedule_channel_deletion(context, ticket.channel_id);
}
