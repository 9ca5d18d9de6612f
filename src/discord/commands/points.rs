// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::context::BotContext;
use crate::discord::utils::interaction::{guild_and_user, user_option};
use crate::discord::utils::responses::respond_ephemeral;
use crate::tickets::PointsLedger;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::command::{CommandBuilder, UserBuilder};

pub fn command_definition() -> Command {
	let user = UserBuilder::new("user", "Whose points to show (yours if not given)").build();
	CommandBuilder::new("points", "Show a helper's points", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.option(user)
		.build()
}

pub async fn handle_command(
	context: &BotContext,
	interaction: &InteractionCreate,
	command_data: &CommandData,
) -> miette::Result<()> {
	let (_, own_user_id) = guild_and_user(interaction)?;
	let user_id = user_option(command_data, "user")?.unwrap_or(own_user_id);
	let balance = context.points.balance(user_id).await?;

	let message = if user_id == own_user_id {
		format!("You have {} points.", balance)
	} else {
		format!("{} has {} points.", user_id.mention(), balance)
	};
	respond_ephemeral(context, interaction, message).await
}
