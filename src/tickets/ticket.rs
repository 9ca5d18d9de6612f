// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use rand::Rng;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker};

/// Discord's limit on channel name length
const MAX_CHANNEL_NAME_LENGTH: usize = 100;

/// What the requestor filled in when opening the ticket. Used only for display.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IntakeForm {
	pub display_name: String,
	pub concerns: String,
	pub details: Option<String>,
}

/// Everything needed to open a ticket
#[derive(Clone, Debug)]
pub struct NewTicket {
	pub guild_id: Id<GuildMarker>,
	pub requestor_id: Id<UserMarker>,
	pub category: String,
	pub intake: IntakeForm,
}

/// An active help request and its dedicated channel
#[derive(Clone, Debug, PartialEq)]
pub struct Ticket {
	pub channel_id: Id<ChannelMarker>,
	pub guild_id: Id<GuildMarker>,
	pub category: String,
	pub requestor_id: Id<UserMarker>,
	/// Assigned helpers in the order they joined
	pub helpers: Vec<Id<UserMarker>>,
	pub is_closed: bool,
	/// Room code for participants to coordinate with outside of Discord
	pub room_token: i32,
	pub intake: IntakeForm,
	/// The ticket board message advertising the ticket, once it's been posted
	pub board_message_id: Option<Id<MessageMarker>>,
	pub opened_at: DateTime<Utc>,
}

impl Ticket {
	pub fn has_helper(&self, user_id: Id<UserMarker>) -> bool {
		self.helpers.contains(&user_id)
	}
}

/// The archived record of a ticket that was closed or cancelled
#[derive(Clone, Debug, PartialEq)]
pub struct TicketHistory {
	pub id: String,
	pub channel_id: Id<ChannelMarker>,
	pub guild_id: Id<GuildMarker>,
	pub category: String,
	pub requestor_id: Id<UserMarker>,
	pub helpers: Vec<Id<UserMarker>>,
	pub points_awarded: i64,
	pub closed_by: Id<UserMarker>,
	pub cancelled: bool,
	pub opened_at: DateTime<Utc>,
	pub closed_at: DateTime<Utc>,
}

/// Generates a fresh four-digit room token.
pub fn generate_room_token() -> i32 {
	rand::rng().random_range(1000..10000)
}

/// Builds a Discord-safe channel name for a ticket from its category and the requestor's name.
pub fn channel_name(category: &str, display_name: &str) -> String {
	let mut name = String::new();
	for part in [category, display_name] {
		let slug = slugify(part);
		if slug.is_empty() {
			continue;
		}
		if !name.is_empty() {
			name.push('-');
		}
		name.push_str(&slug);
	}
	if name.is_empty() {
		name.push_str("ticket");
	}
	name.chars().take(MAX_CHANNEL_NAME_LENGTH).collect()
}

fn slugify(text: &str) -> String {
	let mut slug = String::new();
	for c in text.chars().flat_map(char::to_lowercase) {
		if c.is_alphanumeric() {
			slug.push(c);
		} else if !slug.is_empty() && !slug.ends_with('-') {
			slug.push('-');
		}
	}
	while slug.ends_with('-') {
		slug.pop();
	}
	slug
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn channel_name_is_slugged() {
		assert_eq!(
			channel_name("Daily 4-Man Express", "Some Player!"),
			"daily-4-man-express-some-player"
		);
	}

	#[test]
	fn channel_name_skips_empty_parts() {
		assert_eq!(channel_name("Quick Carry", "!!!"), "quick-carry");
		assert_eq!(channel_name("", ""), "ticket");
	}

	#[test]
	fn channel_name_is_truncated() {
		let long_name = "a".repeat(150);
		assert_eq!(channel_name("carry", &long_name).len(), MAX_CHANNEL_NAME_LENGTH);
	}

	#[test]
	fn room_tokens_have_four_digits() {
		for _ in 0..100 {
			let token = generate_room_token();
			assert!((1000..10000).contains(&token));
		}
	}
}
