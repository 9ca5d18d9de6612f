// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::tickets::{HelperCredit, Ticket, TicketAction};
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::component::{ActionRow, Button, ButtonStyle, Component};
use twilight_model::channel::message::embed::Embed;
use twilight_model::util::datetime::Timestamp;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder};
use twilight_validate::embed::EmbedValidationError;

const OPEN_COLOR: u32 = 0x2ecc71;
const FULL_COLOR: u32 = 0xf1c40f;
const CLOSED_COLOR: u32 = 0x95a5a6;

/// The maximum length of the intake fields in the ticket modal
pub const MAX_INTAKE_FIELD_LENGTH: u16 = 1000;

fn helper_list(ticket: &Ticket) -> String {
	if ticket.helpers.is_empty() {
		return String::from("None yet");
	}
	let helpers: Vec<String> = ticket
		.helpers
		.iter()
		.map(|helper| format!("{}", helper.mention()))
		.collect();
	helpers.join(", ")
}

fn opened_at_timestamp(ticket: &Ticket) -> Option<Timestamp> {
	Timestamp::from_micros(ticket.opened_at.timestamp_micros()).ok()
}

/// The embed describing a ticket, shown both in the ticket's channel and on the ticket board.
///
/// The room token is only for participants, so it's left off the board.
pub fn ticket_embed(ticket: &Ticket, max_slots: usize, show_room: bool) -> Result<Embed, EmbedValidationError> {
	let color = if ticket.is_closed {
		CLOSED_COLOR
	} else if ticket.helpers.len() >= max_slots {
		FULL_COLOR
	} else {
		OPEN_COLOR
	};
	let mut embed = EmbedBuilder::new()
		.title(format!("{} ticket", ticket.category))
		.description(ticket.intake.concerns.clone())
		.color(color)
		.field(EmbedFieldBuilder::new("Requestor", format!("{}", ticket.requestor_id.mention())).inline())
		.field(EmbedFieldBuilder::new("Name", ticket.intake.display_name.clone()).inline());
	if show_room {
		embed = embed.field(EmbedFieldBuilder::new("Room", ticket.room_token.to_string()).inline());
	}
	if let Some(details) = &ticket.intake.details {
		embed = embed.field(EmbedFieldBuilder::new("Details", details.clone()));
	}
	embed = embed
		.field(EmbedFieldBuilder::new(
			format!("Helpers ({}/{})", ticket.helpers.len(), max_slots),
			helper_list(ticket),
		))
		.footer(EmbedFooterBuilder::new(format!("Ticket {}", ticket.channel_id)));
	if let Some(timestamp) = opened_at_timestamp(ticket) {
		embed = embed.timestamp(timestamp);
	}
	Ok(embed.validate()?.build())
}

fn action_button(ticket: &Ticket, action: TicketAction, style: ButtonStyle, disabled: bool) -> Component {
	Component::Button(Button {
		custom_id: Some(action.custom_id(ticket.channel_id)),
		disabled,
		emoji: None,
		label: Some(String::from(action.label())),
		style,
		url: None,
		sku_id: None,
	})
}

/// The buttons on the ticket board message
pub fn board_components(ticket: &Ticket, max_slots: usize) -> Vec<Component> {
	let disabled = ticket.is_closed || ticket.helpers.len() >= max_slots;
	let join_button = action_button(ticket, TicketAction::Join, ButtonStyle::Success, disabled);
	vec![Component::ActionRow(ActionRow {
		components: vec![join_button],
	})]
}

/// The buttons on the message opening the ticket's channel
pub fn ticket_channel_components(ticket: &Ticket) -> Vec<Component> {
	let disabled = ticket.is_closed;
	let buttons = vec![
		action_button(ticket, TicketAction::Leave, ButtonStyle::Secondary, disabled),
		action_button(ticket, TicketAction::Close, ButtonStyle::Primary, disabled),
		action_button(ticket, TicketAction::Cancel, ButtonStyle::Danger, disabled),
	];
	vec![Component::ActionRow(ActionRow { components: buttons })]
}

/// Summarizes the end of a ticket for its channel.
pub fn closing_message(ticket: &Ticket, cancelled: bool, credits: &[HelperCredit]) -> String {
	if cancelled {
		return String::from("This ticket was cancelled. No points were awarded.");
	}
	if credits.is_empty() {
		return String::from("This ticket was closed. No points were awarded.");
	}
	let mut lines = vec![String::from("This ticket was closed. Thanks for helping!")];
	for credit in credits {
		lines.push(format!(
			"- {} earned {} points (now {})",
			credit.user_id.mention(),
			credit.amount,
			credit.new_balance
		));
	}
	let uncredited = ticket.helpers.len() - credits.len().min(ticket.helpers.len());
	if uncredited > 0 {
		lines.push(format!("{} helper(s) received no points.", uncredited));
	}
	lines.join("\n")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tickets::{IntakeForm, parse_action_path};
	use chrono::Utc;
	use twilight_model::id::Id;

	fn ticket(helpers: &[u64]) -> Ticket {
		Ticket {
			channel_id: Id::new(500),
			guild_id: Id::new(1),
			category: String::from("Quick Carry"),
			requestor_id: Id::new(10),
			helpers: helpers.iter().copied().map(Id::new).collect(),
			is_closed: false,
			room_token: 1234,
			intake: IntakeForm {
				display_name: String::from("Traveler"),
				concerns: String::from("Boss fight"),
				details: None,
			},
			board_message_id: None,
			opened_at: Utc::now(),
		}
	}

	fn button_ids(components: &[Component]) -> Vec<(String, bool)> {
		let mut ids = Vec::new();
		for component in components {
			let Component::ActionRow(row) = component else {
				continue;
			};
			for inner in row.components.iter() {
				if let Component::Button(button) = inner {
					ids.push((button.custom_id.clone().unwrap_or_default(), button.disabled));
				}
			}
		}
		ids
	}

	#[test]
	fn board_button_disables_when_full() {
		let open = button_ids(&board_components(&ticket(&[20]), 2));
		assert_eq!(open, vec![(String::from("ticket/500/join"), false)]);
		let full = button_ids(&board_components(&ticket(&[20, 21]), 2));
		assert!(full[0].1);
	}

	#[test]
	fn channel_buttons_route_back_to_ticket() {
		for (custom_id, _) in button_ids(&ticket_channel_components(&ticket(&[]))) {
			let path: Vec<String> = custom_id.split('/').map(|s| s.to_string()).collect();
			let (channel_id, action) = parse_action_path(&path).unwrap();
			assert_eq!(channel_id, Id::new(500));
			assert_ne!(action, TicketAction::Join);
		}
	}

	#[test]
	fn embed_lists_helpers() {
		let embed = ticket_embed(&ticket(&[20]), 4, false).unwrap();
		assert!(embed.fields.iter().all(|field| field.name != "Room"));
		let helpers = embed
			.fields
			.iter()
			.find(|field| field.name == "Helpers (1/4)")
			.unwrap();
		assert_eq!(helpers.value, "<@20>");
	}

	#[test]
	fn closing_message_lists_credits() {
		let credits = vec![HelperCredit {
			user_id: Id::new(20),
			amount: 10,
			new_balance: 30,
		}];
		let message = closing_message(&ticket(&[20, 21]), false, &credits);
		assert!(message.contains("<@20> earned 10 points (now 30)"));
		assert!(message.contains("1 helper(s) received no points."));
		assert_eq!(
			closing_message(&ticket(&[20]), true, &[]),
			"This ticket was cancelled. No points were awarded."
		);
	}
}
