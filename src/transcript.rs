// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::tickets::Ticket;
use chrono::{DateTime, Utc};
use std::fmt::Write;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// A single message as it appears in a transcript
#[derive(Clone, Debug)]
pub struct TranscriptLine {
	pub sent_at: DateTime<Utc>,
	pub author: String,
	pub content: String,
	/// URLs of files attached to the message
	pub attachments: Vec<String>,
}

/// Renders a plain-text transcript of a ticket's conversation. Lines must be in the order they were sent.
pub fn render_transcript(ticket: &Ticket, cancelled: bool, lines: &[TranscriptLine]) -> String {
	let mut transcript = String::new();
	let outcome = if cancelled { "Cancelled" } else { "Closed" };
	let helpers: Vec<String> = ticket.helpers.iter().map(|helper| helper.to_string()).collect();

	// Writing to a String can't fail.
	let _ = writeln!(transcript, "Ticket transcript: {}", ticket.category);
	let _ = writeln!(transcript, "Channel: {}", ticket.channel_id);
	let _ = writeln!(
		transcript,
		"Requestor: {} ({})",
		ticket.intake.display_name, ticket.requestor_id
	);
	if helpers.is_empty() {
		let _ = writeln!(transcript, "Helpers: none");
	} else {
		let _ = writeln!(transcript, "Helpers: {}", helpers.join(", "));
	}
	let _ = writeln!(transcript, "Room: {}", ticket.room_token);
	let _ = writeln!(transcript, "Opened: {}", ticket.opened_at.format(TIMESTAMP_FORMAT));
	let _ = writeln!(transcript, "Outcome: {}", outcome);
	let _ = writeln!(transcript, "Concerns: {}", ticket.intake.concerns);
	if let Some(details) = &ticket.intake.details {
		let _ = writeln!(transcript, "Details: {}", details);
	}
	transcript.push('\n');

	if lines.is_empty() {
		transcript.push_str("(no messages)\n");
	}
	for line in lines {
		let _ = write!(
			transcript,
			"[{}] {}: {}",
			line.sent_at.format(TIMESTAMP_FORMAT),
			line.author,
			line.content
		);
		for attachment in line.attachments.iter() {
			let _ = write!(transcript, " [attachment: {}]", attachment);
		}
		transcript.push('\n');
	}

	transcript
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tickets::IntakeForm;
	use chrono::TimeZone;
	use twilight_model::id::Id;

	fn ticket() -> Ticket {
		Ticket {
			channel_id: Id::new(500),
			guild_id: Id::new(1),
			category: String::from("Quick Carry"),
			requestor_id: Id::new(10),
			helpers: vec![Id::new(20), Id::new(21)],
			is_closed: true,
			room_token: 1234,
			intake: IntakeForm {
				display_name: String::from("Traveler"),
				concerns: String::from("Boss fight"),
				details: Some(String::from("Floor 12")),
			},
			board_message_id: None,
			opened_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
		}
	}

	#[test]
	fn transcript_has_header_and_messages() {
		let lines = vec![
			TranscriptLine {
				sent_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 1, 0).unwrap(),
				author: String::from("Traveler"),
				content: String::from("hello"),
				attachments: Vec::new(),
			},
			TranscriptLine {
				sent_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 2, 30).unwrap(),
				author: String::from("Helper"),
				content: String::from("see screenshot"),
				attachments: vec![String::from("https://cdn.example/shot.png")],
			},
		];
		let transcript = render_transcript(&ticket(), false, &lines);
		assert!(transcript.starts_with("Ticket transcript: Quick Carry\n"));
		assert!(transcript.contains("Helpers: 20, 21\n"));
		assert!(transcript.contains("Outcome: Closed\n"));
		assert!(transcript.contains("Details: Floor 12\n"));
		assert!(transcript.contains("[2025-03-01 12:01:00 UTC] Traveler: hello\n"));
		assert!(
			transcript.contains(
				"[2025-03-01 12:02:30 UTC] Helper: see screenshot [attachment: https://cdn.example/shot.png]\n"
			)
		);
	}

	#[test]
	fn empty_cancelled_ticket() {
		let mut ticket = ticket();
		ticket.helpers.clear();
		let transcript = render_transcript(&ticket, true, &[]);
		assert!(transcript.contains("Helpers: none\n"));
		assert!(transcript.contains("Outcome: Cancelled\n"));
		assert!(transcript.ends_with("(no messages)\n"));
	}
}
