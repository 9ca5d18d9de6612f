// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::staff_check;
use crate::discord::context::BotContext;
use crate::discord::state::create_ticket::new_ticket_button;
use crate::discord::utils::responses::respond_ephemeral;
use miette::{IntoDiagnostic, bail};
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_util::builder::command::CommandBuilder;

const PANEL_TEXT: &str = "Need a hand? Press the button below to open a help ticket. A helper will join you in a private channel.";

pub fn command_definition() -> Command {
	CommandBuilder::new(
		"ticket_panel",
		"Post the panel members use to open tickets in this channel",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.default_member_permissions(Permissions::MANAGE_CHANNELS)
	.build()
}

pub async fn handle_command(context: &BotContext, interaction: &InteractionCreate) -> miette::Result<()> {
	if !staff_check(context, interaction).await? {
		return Ok(());
	}
	let Some(channel) = interaction.channel.as_ref() else {
		bail!("Ticket panel command used without a channel");
	};

	context
		.http_client
		.create_message(channel.id)
		.content(PANEL_TEXT)
		.components(&[new_ticket_button()])
		.await
		.into_diagnostic()?;

	respond_ephemeral(context, interaction, "Ticket panel posted.").await
}
