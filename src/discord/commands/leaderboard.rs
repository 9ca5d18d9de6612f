// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::context::BotContext;
use crate::discord::utils::responses::respond_ephemeral;
use crate::model::UserPoints;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::command::CommandBuilder;

const LEADERBOARD_SIZE: i64 = 10;

pub fn command_definition() -> Command {
	CommandBuilder::new("leaderboard", "Show the helpers with the most points", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.build()
}

fn leaderboard_text(entries: &[UserPoints]) -> String {
	if entries.is_empty() {
		return String::from("Nobody has earned any points yet.");
	}
	let lines: Vec<String> = entries
		.iter()
		.enumerate()
		.map(|(index, entry)| format!("{}. {} - {} points", index + 1, entry.get_user_id().mention(), entry.points))
		.collect();
	format!("**Top helpers**\n{}", lines.join("\n"))
}

pub async fn handle_command(context: &BotContext, interaction: &InteractionCreate) -> miette::Result<()> {
	let entries = context.points.leaderboard(LEADERBOARD_SIZE)?;
	respond_ephemeral(context, interaction, leaderboard_text(&entries)).await
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn entries_are_ranked_in_order() {
		let entries = vec![
			UserPoints {
				user_id: 20,
				points: 30,
			},
			UserPoints {
				user_id: 10,
				points: 5,
			},
		];
		assert_eq!(
			leaderboard_text(&entries),
			"**Top helpers**\n1. <@20> - 30 points\n2. <@10> - 5 points"
		);
		assert_eq!(leaderboard_text(&[]), "Nobody has earned any points yet.");
	}
}
