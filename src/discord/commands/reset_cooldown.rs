// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::staff_check;
use crate::discord::context::BotContext;
use crate::discord::utils::interaction::required_user_option;
use crate::discord::utils::responses::respond_ephemeral;
use crate::tickets::CooldownKind;
use miette::bail;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandOptionValue};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_util::builder::command::{CommandBuilder, StringBuilder, UserBuilder};

pub fn command_definition() -> Command {
	let user = UserBuilder::new("user", "The user whose cooldowns to clear")
		.required(true)
		.build();
	let kind = StringBuilder::new("kind", "Which cooldown to clear (both if not given)")
		.choices([("Join", "join"), ("Leave", "leave")])
		.build();
	CommandBuilder::new(
		"reset_cooldown",
		"Let a user join or leave tickets again right away",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.default_member_permissions(Permissions::MODERATE_MEMBERS)
	.option(user)
	.option(kind)
	.build()
}

fn cooldown_kind_option(command_data: &CommandData) -> miette::Result<Option<CooldownKind>> {
	let Some(option) = command_data.options.iter().find(|option| option.name == "kind") else {
		return Ok(None);
	};
	let CommandOptionValue::String(kind) = &option.value else {
		bail!("Reset cooldown argument kind wasn't a string");
	};
	match kind.as_str() {
		"join" => Ok(Some(CooldownKind::Join)),
		"leave" => Ok(Some(CooldownKind::Leave)),
		_ => bail!("Unknown cooldown kind: {}", kind),
	}
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

	let message = match cooldown_kind_option(command_data)? {
		Some(kind) => {
			context.controller.clear_cooldown(user_id, kind);
			let kind_name = match kind {
				CooldownKind::Join => "join",
				CooldownKind::Leave => "leave",
			};
			format!("Cleared the {} cooldown for {}.", kind_name, user_id.mention())
		}
		None => {
			context.controller.clear_cooldowns(user_id);
			format!("Cleared all ticket cooldowns for {}.", user_id.mention())
		}
	};
	tracing::info!(%user_id, "Ticket cooldowns reset");
	respond_ephemeral(context, interaction, message).await
}
