// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::context::BotContext;
use crate::discord::interactions::run_ticket_action;
use crate::discord::utils::responses::{NOT_IN_TICKET_CHANNEL, respond_ephemeral};
use crate::tickets::TicketAction;
use miette::IntoDiagnostic;
use std::sync::Arc;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::command::CommandBuilder;

pub fn close_command_definition() -> Command {
	CommandBuilder::new("close", "Close this ticket and award its helpers", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.build()
}

pub fn cancel_command_definition() -> Command {
	CommandBuilder::new(
		"cancel",
		"Cancel this ticket without awarding anyone",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.build()
}

pub async fn handle_close_command(context: &Arc<BotContext>, interaction: &InteractionCreate) -> miette::Result<()> {
	end_ticket(context, interaction, TicketAction::Close).await
}

pub async fn handle_cancel_command(context: &Arc<BotContext>, interaction: &InteractionCreate) -> miette::Result<()> {
	end_ticket(context, interaction, TicketAction::Cancel).await
}

async fn end_ticket(context: &Arc<BotContext>, interaction: &InteractionCreate, action: TicketAction) -> miette::Result<()> {
	let ticket = match interaction.channel.as_ref() {
		Some(channel) => context.controller.get(channel.id).into_diagnostic()?,
		None => None,
	};
	let Some(ticket) = ticket else {
		return respond_ephemeral(context, interaction, NOT_IN_TICKET_CHANNEL).await;
	};
	run_ticket_action(context, interaction, ticket.channel_id, action).await
}
