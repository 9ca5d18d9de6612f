// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::staff_check;
use crate::discord::context::BotContext;
use crate::discord::utils::responses::respond_ephemeral;
use crate::discord::utils::timestamp::relative_time;
use crate::tickets::Ticket;
use miette::IntoDiagnostic;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_util::builder::command::CommandBuilder;

/// Discord's limit on message content length
const MAX_MESSAGE_LENGTH: usize = 2000;

pub fn command_definition() -> Command {
	CommandBuilder::new("active_tickets", "List every open ticket", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.default_member_permissions(Permissions::MODERATE_MEMBERS)
		.build()
}

fn ticket_line(ticket: &Ticket) -> String {
	format!(
		"- {} ({}) for {}, {} helper(s), opened {}",
		ticket.channel_id.mention(),
		ticket.category,
		ticket.requestor_id.mention(),
		ticket.helpers.len(),
		relative_time(&ticket.opened_at)
	)
}

/// Lists tickets, dropping the ones that won't fit in a single message.
fn ticket_listing(tickets: &[Ticket]) -> String {
	if tickets.is_empty() {
		return String::from("There are no open tickets.");
	}
	let mut listing = format!("Open tickets ({}):", tickets.len());
	for (index, ticket) in tickets.iter().enumerate() {
		let line = ticket_line(ticket);
		let remaining = tickets.len() - index;
		let overflow_note = format!("\n...and {} more", remaining);
		if listing.len() + line.len() + 1 + overflow_note.len() > MAX_MESSAGE_LENGTH {
			listing.push_str(&overflow_note);
			break;
		}
		listing.push('\n');
		listing.push_str(&line);
	}
	listing
}

pub async fn handle_command(context: &BotContext, interaction: &InteractionCreate) -> miette::Result<()> {
	if !staff_check(context, interaction).await? {
		return Ok(());
	}
	let tickets = context.controller.list_active().into_diagnostic()?;
	respond_ephemeral(context, interaction, ticket_listing(&tickets)).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tickets::IntakeForm;
	use chrono::Utc;
	use twilight_model::id::Id;

	fn ticket(channel_id: u64) -> Ticket {
		Ticket {
			channel_id: Id::new(channel_id),
			guild_id: Id::new(1),
			requestor_id: Id::new(channel_id + 1),
			category: String::from("Quick Carry"),
			intake: IntakeForm {
				display_name: String::from("Traveler"),
				concerns: String::from("Boss fight"),
				details: None,
			},
			room_token: 12345,
			helpers: Vec::new(),
			is_closed: false,
			board_message_id: None,
			opened_at: Utc::now(),
		}
	}

	#[test]
	fn empty_listing() {
		assert_eq!(ticket_listing(&[]), "There are no open tickets.");
	}

	#[test]
	fn long_listing_fits_in_a_message() {
		let tickets: Vec<Ticket> = (0..100).map(|n| ticket(1000 + n * 10)).collect();
		let listing = ticket_listing(&tickets);
		assert!(listing.len() <= MAX_MESSAGE_LENGTH);
		assert!(listing.starts_with("Open tickets (100):"));
		assert!(listing.contains("more"));
	}
}
