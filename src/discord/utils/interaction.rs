// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::bail;
use twilight_model::application::interaction::application_command::{CommandData, CommandOptionValue};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, UserMarker};

/// Gets the guild and user an interaction came from. Every ticket interaction happens in a guild.
pub fn guild_and_user(interaction: &InteractionCreate) -> miette::Result<(Id<GuildMarker>, Id<UserMarker>)> {
	let Some(guild_id) = interaction.guild_id else {
		bail!("Interaction received outside of a guild");
	};
	let Some(user_id) = interaction.author_id() else {
		bail!("Interaction has no user");
	};
	Ok((guild_id, user_id))
}

/// Gets the value of a user option on a command, if it was provided.
pub fn user_option(command_data: &CommandData, name: &str) -> miette::Result<Option<Id<UserMarker>>> {
	let Some(option) = command_data.options.iter().find(|option| option.name == name) else {
		return Ok(None);
	};
	let CommandOptionValue::User(user_id) = option.value else {
		bail!("Command option {} wasn't a user", name);
	};
	Ok(Some(user_id))
}

/// Gets the value of a required user option on a command.
pub fn required_user_option(command_data: &CommandData, name: &str) -> miette::Result<Id<UserMarker>> {
	match user_option(command_data, name)? {
		Some(user_id) => Ok(user_id),
		None => bail!("{} command received without required option {}", command_data.name, name),
	}
}
