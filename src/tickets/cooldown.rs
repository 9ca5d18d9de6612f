// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CooldownKind {
	Join,
	Leave,
}

/// Tracks when users may next join or leave a ticket.
///
/// Entries live only in memory; restarting the bot resets every cooldown.
#[derive(Debug, Default)]
pub struct CooldownTracker {
	expiries: DashMap<(Id<UserMarker>, CooldownKind), Instant>,
}

impl CooldownTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Gets the number of seconds (rounded up) until the user may act again, or 0 if they may act now.
	pub fn check(&self, user_id: Id<UserMarker>, kind: CooldownKind) -> u64 {
		let key = (user_id, kind);
		let Some(expiry) = self.expiries.get(&key).map(|entry| *entry) else {
			return 0;
		};
		let now = Instant::now();
		if expiry > now {
			let remaining = expiry - now;
			let extra_second = u64::from(remaining.subsec_nanos() > 0);
			return remaining.as_secs() + extra_second;
		}
		self.expiries.remove_if(&key, |_, expiry| *expiry <= now);
		0
	}

	/// The longest remaining cooldown across several kinds
	pub fn check_any(&self, user_id: Id<UserMarker>, kinds: &[CooldownKind]) -> u64 {
		kinds.iter().map(|kind| self.check(user_id, *kind)).max().unwrap_or(0)
	}

	pub fn set(&self, user_id: Id<UserMarker>, kind: CooldownKind, duration: Duration) {
		self.expiries.insert((user_id, kind), Instant::now() + duration);
	}

	pub fn clear(&self, user_id: Id<UserMarker>, kind: CooldownKind) {
		self.expiries.remove(&(user_id, kind));
	}

	pub fn clear_all(&self, user_id: Id<UserMarker>) {
		self.clear(user_id, CooldownKind::Join);
		self.clear(user_id, CooldownKind::Leave);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn cooldown_counts_down_and_expires() {
		let tracker = CooldownTracker::new();
		let user = Id::new(1);
		assert_eq!(tracker.check(user, CooldownKind::Join), 0);

		tracker.set(user, CooldownKind::Join, Duration::from_secs(60));
		assert_eq!(tracker.check(user, CooldownKind::Join), 60);

		tokio::time::advance(Duration::from_millis(30_500)).await;
		assert_eq!(tracker.check(user, CooldownKind::Join), 30);

		tokio::time::advance(Duration::from_millis(29_500)).await;
		assert_eq!(tracker.check(user, CooldownKind::Join), 0);
		assert!(tracker.expiries.is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn kinds_are_tracked_separately() {
		let tracker = CooldownTracker::new();
		let user = Id::new(1);
		tracker.set(user, CooldownKind::Join, Duration::from_secs(10));
		tracker.set(user, CooldownKind::Leave, Duration::from_secs(40));

		assert_eq!(tracker.check(user, CooldownKind::Join), 10);
		assert_eq!(tracker.check(user, CooldownKind::Leave), 40);
		assert_eq!(tracker.check_any(user, &[CooldownKind::Join, CooldownKind::Leave]), 40);
		assert_eq!(tracker.check(Id::new(2), CooldownKind::Join), 0);

		tracker.clear(user, CooldownKind::Leave);
		assert_eq!(tracker.check(user, CooldownKind::Leave), 0);
		assert_eq!(tracker.check(user, CooldownKind::Join), 10);

		tracker.clear_all(user);
		assert_eq!(tracker.check(user, CooldownKind::Join), 0);
	}
}
