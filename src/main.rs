// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use helpdesk_bot::config::parse_config;
use helpdesk_bot::database::{connect_db, run_embedded_migrations};
use helpdesk_bot::discord::{run_bot, set_up_client};
use helpdesk_bot::tickets::TicketStore;
use miette::IntoDiagnostic;
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "config.kdl";

#[tokio::main]
async fn main() -> miette::Result<()> {
	let config_path = std::env::args()
		.nth(1)
		.unwrap_or_else(|| String::from(DEFAULT_CONFIG_PATH));
	let config = Arc::new(parse_config(&config_path).await?);

	tracing_subscriber::fmt().with_max_level(config.log_level).init();

	let db_connection_pool = connect_db(&config)?;
	run_embedded_migrations(&db_connection_pool)?;

	let ticket_store = TicketStore::new(db_connection_pool.clone());
	ticket_store.sync_categories(&config.categories).into_diagnostic()?;
	tracing::info!(categories = config.categories.len(), "Ticket categories loaded");

	let http_client = set_up_client(&config);
	run_bot(db_connection_pool, config, http_client).await
}
