// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};

/// One lock per ticket, so changes to a ticket's helper list are serialized without blocking other tickets.
///
/// Helpers also get a lock each, covering their membership across all tickets. When both are needed, the helper
/// lock is taken first.
///
/// Locks are created the first time a ticket or helper is touched and are never removed.
#[derive(Debug, Default)]
pub struct TicketLocks {
	locks: DashMap<Id<ChannelMarker>, Arc<Mutex<()>>>,
	helper_locks: DashMap<Id<UserMarker>, Arc<Mutex<()>>>,
}

impl TicketLocks {
	pub fn new() -> Self {
		Self::default()
	}

	/// Waits for exclusive access to the ticket. Access is held until the returned guard is dropped.
	pub async fn acquire(&self, channel_id: Id<ChannelMarker>) -> OwnedMutexGuard<()> {
		let lock = Arc::clone(self.locks.entry(channel_id).or_default().value());
		lock.lock_owned().await
	}

	/// Waits for exclusive access to the user's helper memberships.
	pub async fn acquire_helper(&self, user_id: Id<UserMarker>) -> OwnedMutexGuard<()> {
		let lock = Arc::clone(self.helper_locks.entry(user_id).or_default().value());
		lock.lock_owned().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;
	use tokio::time::timeout;

	#[tokio::test]
	async fn same_ticket_is_exclusive() {
		let locks = TicketLocks::new();
		let channel = Id::new(10);
		let guard = locks.acquire(channel).await;
		assert!(timeout(Duration::from_millis(50), locks.acquire(channel)).await.is_err());
		drop(guard);
		assert!(timeout(Duration::from_millis(50), locks.acquire(channel)).await.is_ok());
	}

	#[tokio::test]
	async fn different_tickets_do_not_block() {
		let locks = TicketLocks::new();
		let _first = locks.acquire(Id::new(10)).await;
		assert!(timeout(Duration::from_millis(50), locks.acquire(Id::new(11))).await.is_ok());
	}

	#[tokio::test]
	async fn helper_locks_are_separate_from_ticket_locks() {
		let locks = TicketLocks::new();
		let _helper = locks.acquire_helper(Id::new(10)).await;
		assert!(timeout(Duration::from_millis(50), locks.acquire(Id::new(10))).await.is_ok());
		assert!(timeout(Duration::from_millis(50), locks.acquire_helper(Id::new(10))).await.is_err());
	}
}
