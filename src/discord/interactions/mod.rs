// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::context::BotContext;
use crate::discord::state::confirm::CONFIRM_PREFIX;
use crate::tickets::TICKET_ACTION_PREFIX;
use miette::bail;
use std::sync::Arc;
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::application::interaction::modal::ModalInteractionData;
use twilight_model::gateway::payload::incoming::InteractionCreate;

mod create_ticket;
mod ticket_actions;

pub use ticket_actions::run_ticket_action;

fn custom_id_path(custom_id: &str) -> Vec<String> {
	custom_id.split('/').map(|s| s.to_string()).collect()
}

pub async fn route_interaction(
	context: &Arc<BotContext>,
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
) -> miette::Result<()> {
	let custom_id_path = custom_id_path(&interaction_data.custom_id);

	match custom_id_path.first().map(|s| s.as_str()) {
		Some("create_ticket") => {
			create_ticket::route_create_ticket_interaction(context, interaction, interaction_data, &custom_id_path).await
		}
		Some(prefix) if prefix == TICKET_ACTION_PREFIX => {
			ticket_actions::route_ticket_action_interaction(context, interaction, &custom_id_path).await
		}
		Some(prefix) if prefix == CONFIRM_PREFIX => {
			ticket_actions::route_confirmation_interaction(context, interaction, &custom_id_path).await
		}
		_ => bail!("Unknown component interaction: {}", interaction_data.custom_id),
	}
}

pub async fn route_modal_submit(
	context: &Arc<BotContext>,
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
) -> miette::Result<()> {
	let custom_id_path = custom_id_path(&modal_data.custom_id);

	match custom_id_path.first().map(|s| s.as_str()) {
		Some("create_ticket") => {
			create_ticket::route_create_ticket_modal(context, interaction, modal_data, &custom_id_path).await
		}
		_ => bail!("Unknown modal submission: {}", modal_data.custom_id),
	}
}
