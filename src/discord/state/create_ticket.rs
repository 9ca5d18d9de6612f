// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use twilight_model::channel::message::component::{ActionRow, Button, ButtonStyle, Component};
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

/// Ticket creation flows that are in progress, by creation ID
#[derive(Debug, Default)]
pub struct CreateTicketStates {
	pub states: HashMap<String, CreateTicketState>,
}

#[derive(Debug)]
pub struct CreateTicketState {
	/// The user opening the ticket. Nobody else may continue their flow.
	pub requestor_id: Id<UserMarker>,
	pub category: Option<String>,
}

impl CreateTicketState {
	pub fn new(requestor_id: Id<UserMarker>) -> Self {
		Self {
			requestor_id,
			category: None,
		}
	}
}

/// The button on the ticket panel that starts ticket creation
pub fn new_ticket_button() -> Component {
	let create_button_id = String::from("create_ticket//start");
	let create_button = Button {
		custom_id: Some(create_button_id),
		disabled: false,
		emoji: None,
		label: Some(String::from("Create Ticket")),
		style: ButtonStyle::Primary,
		url: None,
		sku_id: None,
	};
	Component::ActionRow(ActionRow {
		components: vec![Component::Button(create_button)],
	})
}
