// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::model::TicketCategory;
use kdl::{KdlDocument, KdlNode, KdlValue};
use miette::{IntoDiagnostic, bail, miette};
use std::time::Duration;
use tokio::fs::read_to_string;
use tracing::Level;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, RoleMarker};

pub async fn parse_config(config_path: &str) -> miette::Result<ConfigData> {
	let config_file_contents = read_to_string(config_path).await.into_diagnostic()?;
	parse_config_document(&config_file_contents)
}

pub fn parse_config_document(contents: &str) -> miette::Result<ConfigData> {
	let document: KdlDocument = contents.parse()?;

	let discord = required_children(&document, "discord")?;
	let discord = DiscordConfig {
		bot_token: required_string(discord, "bot_token")?,
	};

	let database = required_children(&document, "database")?;
	let database = DatabaseConfig {
		path: required_string(database, "path")?,
	};

	let log_level = match optional_string(&document, "log_level")? {
		Some(level) => match level.parse() {
			Ok(level) => level,
			Err(_) => bail!("log_level must be one of trace, debug, info, warn, error (got {})", level),
		},
		None => Level::INFO,
	};

	let roles = required_children(&document, "roles")?;
	let roles = RoleConfig {
		staff: Id::new(required_id(roles, "staff")?),
		helper: Id::new(required_id(roles, "helper")?),
		volunteer: optional_id(roles, "volunteer")?.map(Id::new),
		restricted: optional_id(roles, "restricted")?.map(Id::new),
	};

	let channels = match document.get("channels").and_then(|node| node.children()) {
		Some(channels) => ChannelConfig {
			ticket_category: optional_id(channels, "ticket_category")?.map(Id::new),
			board: optional_id(channels, "board")?.map(Id::new),
			transcripts: optional_id(channels, "transcripts")?.map(Id::new),
		},
		None => ChannelConfig::default(),
	};

	let tickets = match document.get("tickets").and_then(|node| node.children()) {
		Some(tickets) => {
			let defaults = TicketTimingConfig::default();
			TicketTimingConfig {
				join_cooldown: optional_seconds(tickets, "join_cooldown_seconds")?.unwrap_or(defaults.join_cooldown),
				leave_cooldown: optional_seconds(tickets, "leave_cooldown_seconds")?
					.unwrap_or(defaults.leave_cooldown),
				confirm_timeout: optional_seconds(tickets, "confirm_timeout_seconds")?
					.unwrap_or(defaults.confirm_timeout),
				channel_delete_delay: optional_seconds(tickets, "channel_delete_delay_seconds")?
					.unwrap_or(defaults.channel_delete_delay),
			}
		}
		None => TicketTimingConfig::default(),
	};

	let mut categories = Vec::new();
	for node in document.nodes().iter().filter(|node| node.name().value() == "category") {
		categories.push(parse_category(node)?);
	}
	if categories.is_empty() {
		bail!("At least one ticket category must be configured");
	}

	Ok(ConfigData {
		discord,
		database,
		log_level,
		roles,
		channels,
		tickets,
		categories,
	})
}

fn parse_category(node: &KdlNode) -> miette::Result<TicketCategory> {
	let Some(name) = node.get(0usize).and_then(KdlValue::as_string) else {
		bail!("A category is missing its name");
	};
	let Some(points_per_helper) = node.get("points_per_helper").and_then(KdlValue::as_integer) else {
		bail!("Category {} is missing points_per_helper", name);
	};
	let Some(max_slots) = node.get("max_slots").and_then(KdlValue::as_integer) else {
		bail!("Category {} is missing max_slots", name);
	};
	let points_per_helper = i64::try_from(points_per_helper).into_diagnostic()?;
	let max_slots = i32::try_from(max_slots).into_diagnostic()?;
	if max_slots < 1 {
		bail!("Category {} must allow at least one helper", name);
	}

	let (description, detail_prompt) = match node.children() {
		Some(children) => (
			optional_string(children, "description")?,
			optional_string(children, "detail_prompt")?,
		),
		None => (None, None),
	};

	Ok(TicketCategory {
		name: name.to_string(),
		points_per_helper,
		max_slots,
		description,
		detail_prompt,
	})
}

fn required_children<'a>(document: &'a KdlDocument, name: &str) -> miette::Result<&'a KdlDocument> {
	document
		.get(name)
		.and_then(|node| node.children())
		.ok_or_else(|| miette!("Missing configuration block: {}", name))
}

fn optional_string(document: &KdlDocument, name: &str) -> miette::Result<Option<String>> {
	let Some(value) = document.get(name).and_then(|node| node.get(0usize)) else {
		return Ok(None);
	};
	match value.as_string() {
		Some(value) => Ok(Some(value.to_string())),
		None => bail!("Configuration value {} must be a string", name),
	}
}

fn required_string(document: &KdlDocument, name: &str) -> miette::Result<String> {
	optional_string(document, name)?.ok_or_else(|| miette!("Missing configuration value: {}", name))
}

fn optional_integer(document: &KdlDocument, name: &str) -> miette::Result<Option<i128>> {
	let Some(value) = document.get(name).and_then(|node| node.get(0usize)) else {
		return Ok(None);
	};
	match value.as_integer() {
		Some(value) => Ok(Some(value)),
		None => bail!("Configuration value {} must be an integer", name),
	}
}

fn optional_id(document: &KdlDocument, name: &str) -> miette::Result<Option<u64>> {
	match optional_integer(document, name)? {
		Some(id) => match u64::try_from(id) {
			Ok(id) if id != 0 => Ok(Some(id)),
			_ => bail!("Configuration value {} is not a valid Discord ID", name),
		},
		None => Ok(None),
	}
}

fn required_id(document: &KdlDocument, name: &str) -> miette::Result<u64> {
	optional_id(document, name)?.ok_or_else(|| miette!("Missing configuration value: {}", name))
}

fn optional_seconds(document: &KdlDocument, name: &str) -> miette::Result<Option<Duration>> {
	match optional_integer(document, name)? {
		Some(seconds) => {
			let seconds = u64::try_from(seconds).into_diagnostic()?;
			Ok(Some(Duration::from_secs(seconds)))
		}
		None => Ok(None),
	}
}

#[derive(Debug)]
pub struct ConfigData {
	pub discord: DiscordConfig,
	pub database: DatabaseConfig,
	pub log_level: Level,
	pub roles: RoleConfig,
	pub channels: ChannelConfig,
	pub tickets: TicketTimingConfig,
	pub categories: Vec<TicketCategory>,
}

#[derive(Debug)]
pub struct DiscordConfig {
	pub bot_token: String,
}

#[derive(Debug)]
pub struct DatabaseConfig {
	/// Path to the SQLite database file
	pub path: String,
}

/// The roles the bot uses to decide who may do what
#[derive(Clone, Debug)]
pub struct RoleConfig {
	/// Staff may close any ticket, use admin commands, and always help
	pub staff: Id<RoleMarker>,
	/// Members with this role may join tickets as helpers
	pub helper: Id<RoleMarker>,
	/// Helpers with this role help without being awarded points
	pub volunteer: Option<Id<RoleMarker>>,
	/// Members with this role may not open tickets
	pub restricted: Option<Id<RoleMarker>>,
}

#[derive(Clone, Debug, Default)]
pub struct ChannelConfig {
	/// The channel category under which ticket channels are created
	pub ticket_category: Option<Id<ChannelMarker>>,
	/// The channel where open tickets are advertised to helpers
	pub board: Option<Id<ChannelMarker>>,
	/// The channel to which ticket transcripts are posted
	pub transcripts: Option<Id<ChannelMarker>>,
}

#[derive(Clone, Copy, Debug)]
pub struct TicketTimingConfig {
	pub join_cooldown: Duration,
	pub leave_cooldown: Duration,
	/// How long close and cancel confirmation prompts stay answerable
	pub confirm_timeout: Duration,
	/// How long a ticket channel stays around after the ticket ends
	pub channel_delete_delay: Duration,
}

impl Default for TicketTimingConfig {
	fn default() -> Self {
		Self {
			join_cooldown: Duration::from_secs(60),
			leave_cooldown: Duration::from_secs(60),
			confirm_timeout: Duration::from_secs(30),
			channel_delete_delay: Duration::from_secs(10),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const FULL_CONFIG: &str = r#"
discord {
	bot_token "token"
}
database {
	path "helpdesk.sqlite3"
}
log_level "debug"
roles {
	staff 100
	helper 200
	volunteer 300
}
channels {
	ticket_category 400
	transcripts 500
}
tickets {
	join_cooldown_seconds 120
	confirm_timeout_seconds 45
}
category "Daily 4-Man Express" points_per_helper=10 max_slots=4 {
	description "Four helpers for the daily run"
	detail_prompt "Which stages?"
}
category "Quick Carry" points_per_helper=5 max_slots=1
"#;

	#[test]
	fn parses_full_config() {
		let config = parse_config_document(FULL_CONFIG).unwrap();
		assert_eq!(config.discord.bot_token, "token");
		assert_eq!(config.database.path, "helpdesk.sqlite3");
		assert_eq!(config.log_level, Level::DEBUG);
		assert_eq!(config.roles.staff, Id::new(100));
		assert_eq!(config.roles.volunteer, Some(Id::new(300)));
		assert_eq!(config.roles.restricted, None);
		assert_eq!(config.channels.ticket_category, Some(Id::new(400)));
		assert_eq!(config.channels.board, None);
		assert_eq!(config.tickets.join_cooldown, Duration::from_secs(120));
		assert_eq!(config.tickets.leave_cooldown, Duration::from_secs(60));
		assert_eq!(config.tickets.confirm_timeout, Duration::from_secs(45));

		assert_eq!(config.categories.len(), 2);
		let express = &config.categories[0];
		assert_eq!(express.name, "Daily 4-Man Express");
		assert_eq!(express.points_per_helper, 10);
		assert_eq!(express.max_slots, 4);
		assert_eq!(express.detail_prompt.as_deref(), Some("Which stages?"));
		assert_eq!(config.categories[1].description, None);
	}

	#[test]
	fn missing_role_block_is_rejected() {
		let config = r#"
discord {
	bot_token "token"
}
database {
	path "helpdesk.sqlite3"
}
category "Quick Carry" points_per_helper=5 max_slots=1
"#;
		let error = parse_config_document(config).unwrap_err();
		assert!(error.to_string().contains("roles"));
	}

	#[test]
	fn category_without_slots_is_rejected() {
		let config = FULL_CONFIG.replace("max_slots=1", "max_slots=0");
		assert!(parse_config_document(&config).is_err());
	}
}
