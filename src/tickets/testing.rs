// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory stand-ins for the ticket controller's collaborators

use super::collaborators::{
	Authorization, ChannelAccess, ChannelRequest, PointsLedger, RoleTag, TicketChannels, TicketCounter,
	TranscriptRenderer,
};
use super::controller::{Collaborators, CooldownSettings, TicketController};
use super::store::TicketStore;
use super::ticket::{IntakeForm, Ticket};
use crate::database::test_pool;
use crate::model::TicketCategory;
use async_trait::async_trait;
use miette::bail;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, UserMarker};

pub fn intake() -> IntakeForm {
	IntakeForm {
		display_name: String::from("Traveler"),
		concerns: String::from("Can't clear the last floor"),
		details: None,
	}
}

pub fn test_categories() -> Vec<TicketCategory> {
	vec![
		TicketCategory {
			name: String::from("Daily 4-Man Express"),
			points_per_helper: 10,
			max_slots: 4,
			description: None,
			detail_prompt: None,
		},
		TicketCategory {
			name: String::from("Quick Carry"),
			points_per_helper: 5,
			max_slots: 1,
			description: Some(String::from("One helper")),
			detail_prompt: Some(String::from("Stage")),
		},
	]
}

pub struct Harness {
	pub controller: Arc<TicketController>,
	pub channels: Arc<FakeChannels>,
	pub authorization: Arc<FakeAuthorization>,
	pub points: Arc<FakePoints>,
	pub transcripts: Arc<FakeTranscripts>,
	pub counter: Arc<FakeCounter>,
}

impl Harness {
	pub fn new() -> Self {
		let store = TicketStore::new(test_pool());
		store.sync_categories(&test_categories()).unwrap();

		let channels = Arc::new(FakeChannels::default());
		let authorization = Arc::new(FakeAuthorization::default());
		let points = Arc::new(FakePoints::default());
		let transcripts = Arc::new(FakeTranscripts::default());
		let counter = Arc::new(FakeCounter::default());
		let collaborators = Collaborators {
			channels: Arc::clone(&channels) as Arc<dyn TicketChannels>,
			authorization: Arc::clone(&authorization) as Arc<dyn Authorization>,
			points: Arc::clone(&points) as Arc<dyn PointsLedger>,
			transcripts: Arc::clone(&transcripts) as Arc<dyn TranscriptRenderer>,
			counter: Arc::clone(&counter) as Arc<dyn TicketCounter>,
		};
		let cooldown_settings = CooldownSettings {
			join: Duration::from_secs(60),
			leave: Duration::from_secs(60),
		};
		let controller = Arc::new(TicketController::new(store, collaborators, cooldown_settings));

		Self {
			controller,
			channels,
			authorization,
			points,
			transcripts,
			counter,
		}
	}
}

#[derive(Default)]
pub struct FakeChannels {
	next_id: AtomicU64,
	existing: Mutex<HashSet<Id<ChannelMarker>>>,
	access: Mutex<HashMap<(Id<ChannelMarker>, Id<UserMarker>), ChannelAccess>>,
	created: AtomicUsize,
	fail_creation: AtomicBool,
	fail_lookups: AtomicBool,
	fail_access: AtomicBool,
	slow: AtomicBool,
	before_creation: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl FakeChannels {
	pub fn exists(&self, channel_id: Id<ChannelMarker>) -> bool {
		self.existing.lock().unwrap().contains(&channel_id)
	}

	pub fn created_count(&self) -> usize {
		self.created.load(Ordering::SeqCst)
	}

	pub fn access(&self, channel_id: Id<ChannelMarker>, user_id: u64) -> Option<ChannelAccess> {
		self.access
			.lock()
			.unwrap()
			.get(&(channel_id, Id::new(user_id)))
			.copied()
	}

	/// Removes the channel without telling the controller, like a moderator deleting it by hand.
	pub fn delete_externally(&self, channel_id: Id<ChannelMarker>) {
		self.existing.lock().unwrap().remove(&channel_id);
	}

	pub fn fail_creation(&self) {
		self.fail_creation.store(true, Ordering::SeqCst);
	}

	pub fn fail_lookups(&self) {
		self.fail_lookups.store(true, Ordering::SeqCst);
	}

	pub fn fail_access_changes(&self) {
		self.fail_access.store(true, Ordering::SeqCst);
	}

	/// Runs the callback inside the next channel creation, after the controller's up-front checks.
	pub fn before_next_creation(&self, callback: impl FnOnce() + Send + 'static) {
		*self.before_creation.lock().unwrap() = Some(Box::new(callback));
	}

	/// Makes every channel call yield to the scheduler a few times, widening race windows.
	pub fn slow_down(&self) {
		self.slow.store(true, Ordering::SeqCst);
	}

	async fn maybe_yield(&self) {
		if self.slow.load(Ordering::SeqCst) {
			for _ in 0..5 {
				tokio::task::yield_now().await;
			}
		}
	}
}

#[async_trait]
impl TicketChannels for FakeChannels {
	async fn create_channel(&self, _request: &ChannelRequest) -> miette::Result<Id<ChannelMarker>> {
		self.maybe_yield().await;
		if self.fail_creation.load(Ordering::SeqCst) {
			bail!("missing permissions");
		}
		let before_creation = self.before_creation.lock().unwrap().take();
		if let Some(callback) = before_creation {
			callback();
		}
		let channel_id = Id::new(5000 + self.next_id.fetch_add(1, Ordering::SeqCst));
		self.existing.lock().unwrap().insert(channel_id);
		self.created.fetch_add(1, Ordering::SeqCst);
		Ok(channel_id)
	}

	async fn channel_exists(&self, channel_id: Id<ChannelMarker>) -> miette::Result<bool> {
		self.maybe_yield().await;
		if self.fail_lookups.load(Ordering::SeqCst) {
			bail!("lookup timed out");
		}
		Ok(self.exists(channel_id))
	}

	async fn set_access(
		&self,
		channel_id: Id<ChannelMarker>,
		user_id: Id<UserMarker>,
		access: ChannelAccess,
	) -> miette::Result<()> {
		self.maybe_yield().await;
		if self.fail_access.load(Ordering::SeqCst) {
			bail!("missing permissions");
		}
		self.access.lock().unwrap().insert((channel_id, user_id), access);
		Ok(())
	}

	async fn delete_channel(&self, channel_id: Id<ChannelMarker>) -> miette::Result<()> {
		self.maybe_yield().await;
		self.existing.lock().unwrap().remove(&channel_id);
		Ok(())
	}
}

#[derive(Default)]
pub struct FakeAuthorization {
	roles: Mutex<HashSet<(Id<UserMarker>, RoleTag)>>,
}

impl FakeAuthorization {
	pub fn grant(&self, user_id: u64, role: RoleTag) {
		self.roles.lock().unwrap().insert((Id::new(user_id), role));
	}
}

#[async_trait]
impl Authorization for FakeAuthorization {
	async fn has_role(&self, _guild_id: Id<GuildMarker>, user_id: Id<UserMarker>, role: RoleTag) -> bool {
		self.roles.lock().unwrap().contains(&(user_id, role))
	}
}

#[derive(Default)]
pub struct FakePoints {
	balances: Mutex<HashMap<Id<UserMarker>, i64>>,
	failing: Mutex<HashSet<Id<UserMarker>>>,
	calls: AtomicUsize,
}

impl FakePoints {
	pub fn balance_of(&self, user_id: u64) -> i64 {
		self.balances
			.lock()
			.unwrap()
			.get(&Id::new(user_id))
			.copied()
			.unwrap_or(0)
	}

	pub fn credit_calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn fail_for(&self, user_id: u64) {
		self.failing.lock().unwrap().insert(Id::new(user_id));
	}
}

#[async_trait]
impl PointsLedger for FakePoints {
	async fn credit(&self, user_id: Id<UserMarker>, amount: i64) -> miette::Result<i64> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if self.failing.lock().unwrap().contains(&user_id) {
			bail!("points ledger unavailable");
		}
		let mut balances = self.balances.lock().unwrap();
		let balance = balances.entry(user_id).or_insert(0);
		*balance += amount;
		Ok(*balance)
	}

	async fn balance(&self, user_id: Id<UserMarker>) -> miette::Result<i64> {
		Ok(self.balance_of(user_id.get()))
	}
}

#[derive(Default)]
pub struct FakeTranscripts {
	rendered: Mutex<Vec<(Id<ChannelMarker>, bool)>>,
	fail: AtomicBool,
}

impl FakeTranscripts {
	pub fn rendered(&self) -> Vec<(Id<ChannelMarker>, bool)> {
		self.rendered.lock().unwrap().clone()
	}

	pub fn fail(&self) {
		self.fail.store(true, Ordering::SeqCst);
	}
}

#[async_trait]
impl TranscriptRenderer for FakeTranscripts {
	async fn render(&self, ticket: &Ticket, cancelled: bool) -> miette::Result<()> {
		self.rendered.lock().unwrap().push((ticket.channel_id, cancelled));
		if self.fail.load(Ordering::SeqCst) {
			bail!("transcript channel missing");
		}
		Ok(())
	}
}

#[derive(Default)]
pub struct FakeCounter {
	total: AtomicI64,
}

impl FakeCounter {
	pub fn total(&self) -> i64 {
		self.total.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl TicketCounter for FakeCounter {
	async fn increment_total_tickets(&self) -> miette::Result<i64> {
		Ok(self.total.fetch_add(1, Ordering::SeqCst) + 1)
	}
}
