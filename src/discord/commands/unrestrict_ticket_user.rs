// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::context::BotContext;
use crate::discord::utils::interaction::{guild_and_user, required_user_option};
use miette::IntoDiagnostic;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::channel::message::{AllowedMentions, MessageFlags};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_util::builder::InteractionResponseDataBuilder;
use twilight_util::builder::command::{CommandBuilder, UserBuilder};

pub fn command_definition() -> Command {
	let unrestrict_user = UserBuilder::new("unrestrict_user", "The user to allow to open tickets again")
		.required(true)
		.build();
	CommandBuilder::new(
		"unrestrict_ticket_user",
		"Allow a restricted user to open tickets on this server again",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.default_member_permissions(Permissions::MODERATE_MEMBERS)
	.option(unrestrict_user)
	.build()
}

pub async fn handle_command(
	context: &BotContext,
	interaction: &InteractionCreate,
	command_data: &CommandData,
) -> miette::Result<()> {
	let (guild_id, _) = guild_and_user(interaction)?;
	let unrestrict_user = required_user_option(command_data, "unrestrict_user")?;

	let was_restricted = context.restrictions.unrestrict(guild_id, unrestrict_user)?;
	let response = if was_restricted {
		tracing::info!(%guild_id, user_id = %unrestrict_user, "User may open tickets again");
		InteractionResponseDataBuilder::new()
			.content(format!("{} may open tickets again.", unrestrict_user.mention()))
			.allowed_mentions(AllowedMentions::default())
			.build()
	} else {
		InteractionResponseDataBuilder::new()
			.content(format!(
				"{} wasn't restricted from opening tickets.",
				unrestrict_user.mention()
			))
			.flags(MessageFlags::EPHEMERAL)
			.allowed_mentions(AllowedMentions::default())
			.build()
	};
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
