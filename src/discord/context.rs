// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigData;
use crate::points::DatabasePointsLedger;
use crate::restrictions::RestrictionStore;
use crate::settings::ConfigStore;
use crate::tickets::TicketController;
use std::sync::Arc;
use tokio::sync::RwLock;
use twilight_http::client::{Client, InteractionClient};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use type_map::concurrent::TypeMap;

/// Everything an event handler might need, shared by every event task
pub struct BotContext {
	pub http_client: Arc<Client>,
	pub application_id: Id<ApplicationMarker>,
	pub config: Arc<ConfigData>,
	pub controller: Arc<TicketController>,
	pub points: DatabasePointsLedger,
	pub restrictions: RestrictionStore,
	pub settings: ConfigStore,
	/// In-flight interaction flows, keyed by flow type
	pub bot_state: Arc<RwLock<TypeMap>>,
}

impl BotContext {
	pub fn interaction_client(&self) -> InteractionClient<'_> {
		self.http_client.interaction(self.application_id)
	}
}
