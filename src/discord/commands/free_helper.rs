// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::staff_check;
use crate::discord::board::refresh_board_message;
use crate::discord::context::BotContext;
use crate::discord::utils::interaction::required_user_option;
use crate::discord::utils::responses::respond_ephemeral;
use miette::IntoDiagnostic;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_util::builder::command::{CommandBuilder, UserBuilder};

pub fn command_definition() -> Command {
	let user = UserBuilder::new("user", "The helper to remove from their tickets")
		.required(true)
		.build();
	CommandBuilder::new(
		"free_helper",
		"Remove a helper from every ticket they're helping with",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.default_member_permissions(Permissions::MODERATE_MEMBERS)
	.option(user)
	.build()
}

pub async fn handle_command(
	context: &BotContext,
	interaction: &InteractionCreate,
	command_data: &CommandData,
) -> miette::Result<()> {
	if !staff_check(context, interaction).await? {
		return Ok(());
	}
	let user_id = required_user_option(command_data, "user")?;

	let freed_from = context.controller.force_free(user_id).await.into_diagnostic()?;
	for channel_id in freed_from.iter() {
		match context.controller.get(*channel_id) {
			Ok(Some(ticket)) => {
				if let Err(error) = refresh_board_message(context, &ticket).await {
					tracing::warn!(source = ?error, %channel_id, "Failed to refresh board message after freeing helper");
				}
			}
			Ok(None) => (),
			Err(error) => tracing::warn!(source = ?error, %channel_id, "Failed to reload ticket after freeing helper"),
		}
	}

	let message = if freed_from.is_empty() {
		format!("{} wasn't helping with any tickets.", user_id.mention())
	} else {
		let channels: Vec<String> = freed_from
			.iter()
			.map(|channel_id| format!("{}", channel_id.mention()))
			.collect();
		format!("{} was removed from {}.", user_id.mention(), channels.join(", "))
	};
	respond_ephemeral(context, interaction, message).await
}
