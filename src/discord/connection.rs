// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::commands::{command_definitions, route_command};
use super::context::BotContext;
use super::interactions::{route_interaction, route_modal_submit};
use super::platform::{DiscordAuthorization, DiscordChannels, DiscordTranscripts};
use crate::config::ConfigData;
use crate::database::DbPool;
use crate::points::DatabasePointsLedger;
use crate::restrictions::RestrictionStore;
use crate::settings::ConfigStore;
use crate::tickets::{Collaborators, CooldownSettings, TicketController, TicketStore};
use miette::IntoDiagnostic;
use std::sync::Arc;
use tokio::sync::RwLock;
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt};
use twilight_http::client::Client;
use twilight_model::application::interaction::InteractionData;
use twilight_model::gateway::event::Event;
use type_map::concurrent::TypeMap;

pub fn set_up_client(config: &ConfigData) -> Arc<Client> {
	Arc::new(Client::new(config.discord.bot_token.clone()))
}

/// Wires the ticket controller up to Discord and the database.
async fn build_context(
	db_connection_pool: DbPool,
	config: Arc<ConfigData>,
	http_client: Arc<Client>,
) -> miette::Result<BotContext> {
	let application_id = {
		let application_response = http_client.current_user_application().await.into_diagnostic()?;
		application_response.model().await.into_diagnostic()?.id
	};
	let bot_user_id = {
		let user_response = http_client.current_user().await.into_diagnostic()?;
		user_response.model().await.into_diagnostic()?.id
	};

	let points = DatabasePointsLedger::new(db_connection_pool.clone());
	let restrictions = RestrictionStore::new(db_connection_pool.clone());
	let settings = ConfigStore::new(db_connection_pool.clone());

	let collaborators = Collaborators {
		channels: Arc::new(DiscordChannels::new(
			Arc::clone(&http_client),
			Arc::clone(&config),
			bot_user_id,
		)),
		authorization: Arc::new(DiscordAuthorization::new(
			Arc::clone(&http_client),
			Arc::clone(&config),
			restrictions.clone(),
		)),
		points: Arc::new(points.clone()),
		transcripts: Arc::new(DiscordTranscripts::new(
			Arc::clone(&http_client),
			config.channels.transcripts,
		)),
		counter: Arc::new(settings.clone()),
	};
	let cooldown_settings = CooldownSettings {
		join: config.tickets.join_cooldown,
		leave: config.tickets.leave_cooldown,
	};
	let controller = TicketController::new(
		TicketStore::new(db_connection_pool),
		collaborators,
		cooldown_settings,
	);

	Ok(BotContext {
		http_client,
		application_id,
		config,
		controller: Arc::new(controller),
		points,
		restrictions,
		settings,
		bot_state: Arc::new(RwLock::new(TypeMap::new())),
	})
}

pub async fn run_bot(db_connection_pool: DbPool, config: Arc<ConfigData>, http_client: Arc<Client>) -> miette::Result<()> {
	let intents = Intents::GUILDS;

	let mut shard = Shard::new(ShardId::ONE, config.discord.bot_token.clone(), intents);

	let context = Arc::new(build_context(db_connection_pool, config, http_client).await?);

	{
		let commands = command_definitions();
		context
			.interaction_client()
			.set_global_commands(&commands)
			.await
			.into_diagnostic()?;
	}

	match context.settings.total_tickets() {
		Ok(total) => tracing::info!(total, "Loaded completed ticket count"),
		Err(error) => tracing::warn!(source = ?error, "Failed to read completed ticket count"),
	}

	while let Some(event) = shard.next_event(EventTypeFlags::all()).await {
		let event = match event {
			Ok(event) => event,
			Err(error) => {
				tracing::warn!(source = ?error, "error receiving event");
				continue;
			}
		};

		tokio::spawn(handle_event(event, Arc::clone(&context)));
	}

	Ok(())
}

async fn handle_event(event: Event, context: Arc<BotContext>) {
	let event_result = handle_event_route(event, &context).await;
	if let Err(error) = event_result {
		tracing::error!(source = ?error, "An error occurred handling a gateway event");
	}
}

async fn handle_event_route(event: Event, context: &Arc<BotContext>) -> miette::Result<()> {
	tracing::debug!("Incoming gateway message: {:?}", event);
	match event {
		Event::InteractionCreate(interaction) => match &interaction.data {
			Some(InteractionData::ApplicationCommand(command_data)) => {
				route_command(context, &interaction, command_data).await?;
			}
			Some(InteractionData::MessageComponent(interaction_data)) => {
				route_interaction(context, &interaction, interaction_data).await?;
			}
			Some(InteractionData::ModalSubmit(modal_data)) => route_modal_submit(context, &interaction, modal_data).await?,
			_ => (),
		},
		Event::Ready(_) => {
			tracing::info!("Discord gateway is ready");
		}
		_ => (),
	}
	Ok(())
}
