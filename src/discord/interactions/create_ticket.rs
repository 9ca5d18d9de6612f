// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::board::{post_board_message, post_ticket_channel_message};
use crate::discord::context::BotContext;
use crate::discord::state::create_ticket::{CreateTicketState, CreateTicketStates};
use crate::discord::utils::interaction::guild_and_user;
use crate::discord::utils::responses::{respond_ephemeral, respond_update, ticket_error_message};
use crate::discord::utils::tickets::MAX_INTAKE_FIELD_LENGTH;
use crate::model::TicketCategory;
use crate::tickets::{IntakeForm, NewTicket, TicketError};
use miette::{IntoDiagnostic, bail, ensure};
use std::sync::Arc;
use tokio::time::{Duration, sleep};
use twilight_mention::fmt::Mention;
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::application::interaction::modal::ModalInteractionData;
use twilight_model::channel::message::MessageFlags;
use twilight_model::channel::message::component::{
	ActionRow, Button, ButtonStyle, Component, SelectMenu, SelectMenuOption, SelectMenuType, TextInput, TextInputStyle,
};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_util::builder::InteractionResponseDataBuilder;

const TICKET_CREATION_EXPIRED: &str = "Ticket creation expired. Press the button again to start over.";
const CREATE_TICKET_WAIT_TIME: Duration = Duration::from_secs(900);

/// Discord's limit on modal titles and text input labels
const MAX_MODAL_LABEL_LENGTH: usize = 45;
const MAX_DISPLAY_NAME_LENGTH: u16 = 100;

pub async fn route_create_ticket_interaction(
	context: &Arc<BotContext>,
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	custom_id_path: &[String],
) -> miette::Result<()> {
	let Some(id) = custom_id_path.get(1) else {
		bail!("Invalid custom ID for ticket creation (parts: {:?})", custom_id_path);
	};
	let Some(action) = custom_id_path.get(2) else {
		bail!("Invalid custom ID for ticket creation (parts: {:?})", custom_id_path);
	};

	match action.as_str() {
		"confirm_category" => confirm_category(context, interaction, id).await,
		"set_category" => set_category(context, interaction, interaction_data, id).await,
		"start" => {
			ensure!(id.is_empty(), "Unexpected ID when starting ticket creation");
			start_ticket_creation(context, interaction).await
		}
		_ => bail!(
			"Invalid action for ticket creation: {} (custom ID parts: {:?})",
			action,
			custom_id_path
		),
	}
}

pub async fn route_create_ticket_modal(
	context: &Arc<BotContext>,
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
	custom_id_path: &[String],
) -> miette::Result<()> {
	let Some(id) = custom_id_path.get(1) else {
		bail!("Invalid custom ID for ticket creation (parts: {:?})", custom_id_path);
	};
	let Some(action) = custom_id_path.get(2) else {
		bail!("Invalid custom ID for ticket creation (parts: {:?})", custom_id_path);
	};

	if action == "intake" {
		submit_intake(context, interaction, modal_data, id).await
	} else {
		bail!(
			"Invalid action for ticket creation: {} (custom ID parts: {:?})",
			action,
			custom_id_path
		);
	}
}

async fn start_ticket_creation(context: &Arc<BotContext>, interaction: &InteractionCreate) -> miette::Result<()> {
	let (guild_id, user_id) = guild_and_user(interaction)?;

	if context.restrictions.is_restricted(guild_id, user_id)? {
		return respond_ephemeral(context, interaction, TicketError::Restricted.to_string()).await;
	}
	let existing_ticket = context
		.controller
		.store()
		.active_ticket_for_requestor(user_id)
		.into_diagnostic()?;
	if let Some(existing_ticket) = existing_ticket {
		let message = TicketError::AlreadyHasActiveTicket(existing_ticket.channel_id).to_string();
		return respond_ephemeral(context, interaction, message).await;
	}

	let categories = context.controller.store().categories().into_diagnostic()?;
	if categories.is_empty() {
		return respond_ephemeral(context, interaction, "Tickets can't be opened at this time.").await;
	}

	let create_ticket_instance_id = cuid2::create_id();
	{
		let mut state = context.bot_state.write().await;
		let create_ticket_states = state
			.entry::<CreateTicketStates>()
			.or_insert_with(CreateTicketStates::default);
		create_ticket_states
			.states
			.insert(create_ticket_instance_id.clone(), CreateTicketState::new(user_id));
	}
	tokio::spawn(expire_create(Arc::clone(context), create_ticket_instance_id.clone()));

	let category_components = category_select_components(&create_ticket_instance_id, &categories, true, None);
	let response = InteractionResponseDataBuilder::new()
		.content("What do you need help with?")
		.components(category_components)
		.flags(MessageFlags::EPHEMERAL)
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(response),
	};
	context
		.interaction_client()
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

async fn expire_create(context: Arc<BotContext>, create_id: String) {
	sleep(CREATE_TICKET_WAIT_TIME).await;
	let mut state = context.bot_state.write().await;
	if let Some(create_ticket_states) = state.get_mut::<CreateTicketStates>() {
		create_ticket_states.states.remove(&create_id);
	};
}

fn category_select_components(
	create_id: &str,
	categories: &[TicketCategory],
	create_button_disabled: bool,
	selected_category: Option<&str>,
) -> Vec<Component> {
	let category_select_options: Vec<SelectMenuOption> = categories
		.iter()
		.map(|category| SelectMenuOption {
			default: Some(category.name.as_str()) == selected_category,
			description: category.description.clone(),
			emoji: None,
			label: category.name.clone(),
			value: category.name.clone(),
		})
		.collect();
	let category_select_menu = SelectMenu {
		channel_types: None,
		custom_id: format!("create_ticket/{}/set_category", create_id),
		default_values: None,
		disabled: false,
		kind: SelectMenuType::Text,
		max_values: None,
		min_values: None,
		options: Some(category_select_options),
		placeholder: Some(String::from("Ticket category")),
	};
	let category_select = Component::SelectMenu(category_select_menu);
	let create_button = Button {
		custom_id: Some(format!("create_ticket/{}/confirm_category", create_id)),
		disabled: create_button_disabled,
		emoji: None,
		label: Some(String::from("Continue")),
		style: ButtonStyle::Primary,
		url: None,
		sku_id: None,
	};
	let create_button = Component::Button(create_button);

	let category_select_row = Component::ActionRow(ActionRow {
		components: vec![category_select],
	});
	let create_button_row = Component::ActionRow(ActionRow {
		components: vec![create_button],
	});

	vec![category_select_row, create_button_row]
}

async fn set_category(
	context: &Arc<BotContext>,
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	create_id: &str,
) -> miette::Result<()> {
	let (_, user_id) = guild_and_user(interaction)?;
	let Some(category_name) = interaction_data.values.first() else {
		bail!("Category selection received without a category");
	};

	let categories = context.controller.store().categories().into_diagnostic()?;
	if !categories.iter().any(|category| &category.name == category_name) {
		return respond_update(context, interaction, TicketError::UnknownCategory(category_name.clone()).to_string()).await;
	}

	{
		let mut state = context.bot_state.write().await;
		let create_ticket_state = state
			.get_mut::<CreateTicketStates>()
			.and_then(|create_ticket_states| create_ticket_states.states.get_mut(create_id))
			.filter(|create_ticket_state| create_ticket_state.requestor_id == user_id);
		let Some(create_ticket_state) = create_ticket_state else {
			drop(state);
			return respond_update(context, interaction, TICKET_CREATION_EXPIRED).await;
		};
		create_ticket_state.category = Some(category_name.clone());
	}

	let updated_components = category_select_components(create_id, &categories, false, Some(category_name));
	let response = InteractionResponseDataBuilder::new()
		.components(updated_components)
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::UpdateMessage,
		data: Some(response),
	};
	context
		.interaction_client()
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

fn truncate_label(label: &str) -> String {
	label.chars().take(MAX_MODAL_LABEL_LENGTH).collect()
}

fn intake_components(category: &TicketCategory) -> Vec<Component> {
	let mut inputs = vec![
		TextInput {
			custom_id: String::from("display_name"),
			label: String::from("Your in-game name"),
			max_length: Some(MAX_DISPLAY_NAME_LENGTH),
			min_length: Some(1),
			placeholder: None,
			required: Some(true),
			style: TextInputStyle::Short,
			value: None,
		},
		TextInput {
			custom_id: String::from("concerns"),
			label: String::from("What do you need help with?"),
			max_length: Some(MAX_INTAKE_FIELD_LENGTH),
			min_length: Some(1),
			placeholder: None,
			required: Some(true),
			style: TextInputStyle::Paragraph,
			value: None,
		},
	];
	if let Some(detail_prompt) = &category.detail_prompt {
		inputs.push(TextInput {
			custom_id: String::from("details"),
			label: truncate_label(detail_prompt),
			max_length: Some(MAX_INTAKE_FIELD_LENGTH),
			min_length: None,
			placeholder: None,
			required: Some(false),
			style: TextInputStyle::Short,
			value: None,
		});
	}
	inputs
		.into_iter()
		.map(|input| {
			Component::ActionRow(ActionRow {
				components: vec![Component::TextInput(input)],
			})
		})
		.collect()
}

async fn confirm_category(context: &Arc<BotContext>, interaction: &InteractionCreate, create_id: &str) -> miette::Result<()> {
	let (_, user_id) = guild_and_user(interaction)?;
	let selected_category = {
		let state = context.bot_state.read().await;
		state
			.get::<CreateTicketStates>()
			.and_then(|create_ticket_states| create_ticket_states.states.get(create_id))
			.filter(|create_ticket_state| create_ticket_state.requestor_id == user_id)
			.map(|create_ticket_state| create_ticket_state.category.clone())
	};
	let Some(selected_category) = selected_category else {
		return respond_update(context, interaction, TICKET_CREATION_EXPIRED).await;
	};
	let Some(category_name) = selected_category else {
		bail!("Confirming ticket category before one was selected");
	};
	let Some(category) = context.controller.store().category(&category_name).into_diagnostic()? else {
		return respond_update(context, interaction, TicketError::UnknownCategory(category_name).to_string()).await;
	};

	let modal_id = format!("create_ticket/{}/intake", create_id);
	let response = InteractionResponseDataBuilder::new()
		.custom_id(modal_id)
		.title(truncate_label(&format!("Open Ticket - {}", category.name)))
		.components(intake_components(&category))
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::Modal,
		data: Some(response),
	};
	context
		.interaction_client()
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

/// Reads the intake form out of the submitted modal. Empty optional answers count as not given.
fn intake_from_modal(modal_data: &ModalInteractionData) -> Option<IntakeForm> {
	let mut display_name: Option<String> = None;
	let mut concerns: Option<String> = None;
	let mut details: Option<String> = None;
	for row in modal_data.components.iter() {
		for component in row.components.iter() {
			let value = component
				.value
				.as_deref()
				.map(str::trim)
				.filter(|value| !value.is_empty())
				.map(String::from);
			match component.custom_id.as_str() {
				"display_name" => display_name = value,
				"concerns" => concerns = value,
				"details" => details = value,
				_ => (),
			}
		}
	}
	Some(IntakeForm {
		display_name: display_name?,
		concerns: concerns?,
		details,
	})
}

async fn submit_intake(
	context: &Arc<BotContext>,
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
	create_id: &str,
) -> miette::Result<()> {
	let (guild_id, user_id) = guild_and_user(interaction)?;
	let Some(intake) = intake_from_modal(modal_data) else {
		return respond_update(context, interaction, "Ticket not opened: missing required answers.").await;
	};

	let create_ticket_state = {
		let mut state = context.bot_state.write().await;
		let Some(create_ticket_states) = state.get_mut::<CreateTicketStates>() else {
			bail!("Submitting a ticket with no ticket creation state data");
		};
		create_ticket_states.states.remove(create_id)
	};
	let Some(CreateTicketState {
		category: Some(category),
		..
	}) = create_ticket_state
	else {
		return respond_update(context, interaction, TICKET_CREATION_EXPIRED).await;
	};

	// Creating the channel can take longer than Discord waits for a response.
	let interaction_client = context.interaction_client();
	let response = InteractionResponse {
		kind: InteractionResponseType::DeferredUpdateMessage,
		data: None,
	};
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	let new_ticket = NewTicket {
		guild_id,
		requestor_id: user_id,
		category,
		intake,
	};
	let reply = match context.controller.create(new_ticket).await {
		Ok(ticket) => {
			if let Err(error) = post_ticket_channel_message(context, &ticket).await {
				tracing::warn!(source = ?error, channel_id = %ticket.channel_id, "Failed to post ticket channel message");
			}
			if let Err(error) = post_board_message(context, &ticket).await {
				tracing::warn!(source = ?error, channel_id = %ticket.channel_id, "Failed to post ticket to board");
			}
			format!("Your ticket is open in {}.", ticket.channel_id.mention())
		}
		Err(error) => ticket_error_message(&error, None, user_id),
	};
	interaction_client
		.update_response(&interaction.token)
		.content(Some(&reply))
		.components(None)
		.await
		.into_diagnostic()?;

	Ok(())
}
