// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::context::BotContext;
use crate::tickets::TicketError;
use miette::IntoDiagnostic;
use twilight_model::channel::message::{AllowedMentions, MessageFlags};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};
use twilight_util::builder::InteractionResponseDataBuilder;

pub const NOT_IN_TICKET_CHANNEL: &str = "This command can only be used in a ticket channel.";
pub const STAFF_ONLY: &str = "Only staff can do that.";

/// Gets the message for the user when a ticket operation didn't go through. Failures on our end are logged.
pub fn ticket_error_message(error: &TicketError, channel_id: Option<Id<ChannelMarker>>, user_id: Id<UserMarker>) -> String {
	if !error.is_rejection() {
		tracing::error!(source = ?error, ?channel_id, %user_id, "Ticket operation failed");
	}
	error.to_string()
}

/// Replies to the interaction with a message only the user who triggered it can see.
pub async fn respond_ephemeral(
	context: &BotContext,
	interaction: &InteractionCreate,
	content: impl Into<String>,
) -> miette::Result<()> {
	let response = InteractionResponseDataBuilder::new()
		.content(content)
		.flags(MessageFlags::EPHEMERAL)
		.allowed_mentions(AllowedMentions::default())
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

/// Replaces the message the interaction's component is on with new text and no components.
pub async fn respond_update(
	context: &BotContext,
	interaction: &InteractionCreate,
	content: impl Into<String>,
) -> miette::Result<()> {
	let response = InteractionResponseDataBuilder::new()
		.content(content)
		.components(Vec::new())
		.allowed_mentions(AllowedMentions::default())
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::UpdateMessage,
		data: Some(response),
	};
	context
		.interaction_client()
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;
	Ok(())
}
