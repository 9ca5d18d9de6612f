// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::context::BotContext;
use crate::discord::utils::interaction::guild_and_user;
use miette::IntoDiagnostic;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::channel::message::{AllowedMentions, MessageFlags};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_util::builder::InteractionResponseDataBuilder;
use twilight_util::builder::command::CommandBuilder;

pub fn command_definition() -> Command {
	CommandBuilder::new(
		"list_restricted_users",
		"Lists users restricted from opening tickets on this server",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.default_member_permissions(Permissions::MODERATE_MEMBERS)
	.build()
}

pub async fn handle_command(context: &BotContext, interaction: &InteractionCreate) -> miette::Result<()> {
	let (guild_id, _) = guild_and_user(interaction)?;

	let restricted_users = context.restrictions.restricted_users(guild_id)?;
	let restricted_user_text: Vec<String> = restricted_users
		.into_iter()
		.map(|user_id| format!("- {}", user_id.mention()))
		.collect();

	let response = if restricted_user_text.is_empty() {
		InteractionResponseDataBuilder::new()
			.content("No users are restricted from opening tickets.")
			.flags(MessageFlags::EPHEMERAL)
			.build()
	} else {
		let message = format!(
			"The following users are restricted from opening tickets:\n{}",
			restricted_user_text.join("\n")
		);
		InteractionResponseDataBuilder::new()
			.content(message)
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
