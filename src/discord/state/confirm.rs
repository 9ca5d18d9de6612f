// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::tickets::TicketAction;
use std::collections::HashMap;
use twilight_model::channel::message::component::{ActionRow, Button, ButtonStyle, Component};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};

pub const CONFIRM_PREFIX: &str = "confirm";

/// Close and cancel prompts waiting for an answer, by confirmation ID
#[derive(Debug, Default)]
pub struct PendingConfirmations {
	pub confirmations: HashMap<String, PendingConfirmation>,
}

#[derive(Debug)]
pub struct PendingConfirmation {
	pub channel_id: Id<ChannelMarker>,
	pub action: TicketAction,
	/// Only the user who was asked may answer.
	pub user_id: Id<UserMarker>,
	/// Token for editing the prompt once it expires
	pub interaction_token: String,
}

/// The yes/no buttons under a confirmation prompt
pub fn confirmation_components(confirm_id: &str, action: TicketAction) -> Vec<Component> {
	let confirm_button = Button {
		custom_id: Some(format!("{}/{}/yes", CONFIRM_PREFIX, confirm_id)),
		disabled: false,
		emoji: None,
		label: Some(format!("Yes, {}", action.label().to_lowercase())),
		style: ButtonStyle::Danger,
		url: None,
		sku_id: None,
	};
	let dismiss_button = Button {
		custom_id: Some(format!("{}/{}/no", CONFIRM_PREFIX, confirm_id)),
		disabled: false,
		emoji: None,
		label: Some(String::from("Never mind")),
		style: ButtonStyle::Secondary,
		url: None,
		sku_id: None,
	};
	vec![Component::ActionRow(ActionRow {
		components: vec![Component::Button(confirm_button), Component::Button(dismiss_button)],
	})]
}

/// The question shown when confirming an action that ends a ticket
pub fn confirmation_prompt(action: TicketAction) -> &'static str {
	match action {
		TicketAction::Cancel => "Cancel this ticket? Nobody will be awarded points, and the channel will be deleted.",
		_ => "Close this ticket? Helpers will be awarded their points, and the channel will be deleted.",
	}
}
