// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

/// The first part of the custom ID of every ticket action component
pub const TICKET_ACTION_PREFIX: &str = "ticket";

/// The operations participants can trigger on an open ticket.
///
/// Components carry the action's stable ID rather than anything Discord-specific, so the same mapping serves
/// buttons and slash commands alike.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TicketAction {
	Join,
	Leave,
	Close,
	Cancel,
}

impl TicketAction {
	pub fn from_id(id: &str) -> Option<Self> {
		match id {
			"join" => Some(Self::Join),
			"leave" => Some(Self::Leave),
			"close" => Some(Self::Close),
			"cancel" => Some(Self::Cancel),
			_ => None,
		}
	}

	pub fn as_id(&self) -> &'static str {
		match self {
			Self::Join => "join",
			Self::Leave => "leave",
			Self::Close => "close",
			Self::Cancel => "cancel",
		}
	}

	pub fn all_actions() -> Vec<Self> {
		vec![Self::Join, Self::Leave, Self::Close, Self::Cancel]
	}

	/// Closing and cancelling end the ticket, so they're confirmed before they happen.
	pub fn needs_confirmation(&self) -> bool {
		matches!(self, Self::Close | Self::Cancel)
	}

	pub fn label(&self) -> &'static str {
		match self {
			Self::Join => "Join",
			Self::Leave => "Leave",
			Self::Close => "Close",
			Self::Cancel => "Cancel Ticket",
		}
	}

	/// Builds the component custom ID that triggers this action on the ticket.
	pub fn custom_id(&self, channel_id: Id<ChannelMarker>) -> String {
		format!("{}/{}/{}", TICKET_ACTION_PREFIX, channel_id.get(), self.as_id())
	}
}

/// Gets the ticket and action from the parts of a ticket action custom ID.
pub fn parse_action_path(custom_id_path: &[String]) -> Option<(Id<ChannelMarker>, TicketAction)> {
	let [prefix, channel_id, action] = custom_id_path else {
		return None;
	};
	if prefix != TICKET_ACTION_PREFIX {
		return None;
	}
	let channel_id: u64 = channel_id.parse().ok()?;
	let channel_id = Id::new_checked(channel_id)?;
	let action = TicketAction::from_id(action)?;
	Some((channel_id, action))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn path(custom_id: &str) -> Vec<String> {
		custom_id.split('/').map(|s| s.to_string()).collect()
	}

	#[test]
	fn ids_map_back_to_actions() {
		for action in TicketAction::all_actions() {
			assert_eq!(TicketAction::from_id(action.as_id()), Some(action));
		}
		assert_eq!(TicketAction::from_id("reopen"), None);
	}

	#[test]
	fn custom_ids_parse() {
		let custom_id = TicketAction::Join.custom_id(Id::new(1234));
		assert_eq!(custom_id, "ticket/1234/join");
		assert_eq!(
			parse_action_path(&path(&custom_id)),
			Some((Id::new(1234), TicketAction::Join))
		);
	}

	#[test]
	fn malformed_custom_ids_are_rejected() {
		assert_eq!(parse_action_path(&path("ticket/1234")), None);
		assert_eq!(parse_action_path(&path("ticket/0/join")), None);
		assert_eq!(parse_action_path(&path("ticket/abc/join")), None);
		assert_eq!(parse_action_path(&path("setup/1234/join")), None);
		assert_eq!(parse_action_path(&path("ticket/1234/reopen")), None);
		assert_eq!(parse_action_path(&path("ticket/1234/join/extra")), None);
	}
}
