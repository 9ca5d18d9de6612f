// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::context::BotContext;
use super::utils::interaction::guild_and_user;
use super::utils::responses::{STAFF_ONLY, respond_ephemeral};
use miette::bail;
use std::sync::Arc;
use twilight_model::application::command::Command;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::gateway::payload::incoming::InteractionCreate;

mod active_tickets;
mod close;
mod free_helper;
mod leaderboard;
mod list_restricted_users;
mod points;
mod reset_cooldown;
mod restrict_ticket_user;
mod ticket_panel;
mod unrestrict_ticket_user;

pub fn command_definitions() -> Vec<Command> {
	vec![
		active_tickets::command_definition(),
		close::cancel_command_definition(),
		close::close_command_definition(),
		free_helper::command_definition(),
		leaderboard::command_definition(),
		list_restricted_users::command_definition(),
		points::command_definition(),
		reset_cooldown::command_definition(),
		restrict_ticket_user::command_definition(),
		ticket_panel::command_definition(),
		unrestrict_ticket_user::command_definition(),
	]
}

pub async fn route_command(
	context: &Arc<BotContext>,
	interaction: &InteractionCreate,
	command_data: &CommandData,
) -> miette::Result<()> {
	match command_data.name.as_str() {
		"active_tickets" => active_tickets::handle_command(context, interaction).await,
		"cancel" => close::handle_cancel_command(context, interaction).await,
		"close" => close::handle_close_command(context, interaction).await,
		"free_helper" => free_helper::handle_command(context, interaction, command_data).await,
		"leaderboard" => leaderboard::handle_command(context, interaction).await,
		"list_restricted_users" => list_restricted_users::handle_command(context, interaction).await,
		"points" => points::handle_command(context, interaction, command_data).await,
		"reset_cooldown" => reset_cooldown::handle_command(context, interaction, command_data).await,
		"restrict_ticket_user" => restrict_ticket_user::handle_command(context, interaction, command_data).await,
		"ticket_panel" => ticket_panel::handle_command(context, interaction).await,
		"unrestrict_ticket_user" => unrestrict_ticket_user::handle_command(context, interaction, command_data).await,
		_ => bail!("Unknown command encountered: {}\n{:?}", command_data.name, command_data),
	}
}

/// Checks that the user holds the staff role, telling them off if they don't.
async fn staff_check(context: &BotContext, interaction: &InteractionCreate) -> miette::Result<bool> {
	let (guild_id, user_id) = guild_and_user(interaction)?;
	if context.controller.is_staff(guild_id, user_id).await {
		return Ok(true);
	}
	respond_ephemeral(context, interaction, STAFF_ONLY).await?;
	Ok(false)
}
