// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod collaborators;
pub mod controller;
pub mod cooldown;
pub mod dispatch;
pub mod error;
pub mod locks;
pub mod store;
pub mod ticket;

#[cfg(test)]
pub mod testing;

pub use collaborators::{
	Authorization, ChannelAccess, ChannelRequest, PointsLedger, RoleTag, TicketChannels, TicketCounter,
	TranscriptRenderer,
};
pub use controller::{ClosedTicket, Collaborators, CooldownSettings, HelperCredit, TicketController};
pub use cooldown::{CooldownKind, CooldownTracker};
pub use dispatch::{TICKET_ACTION_PREFIX, TicketAction, parse_action_path};
pub use error::{StoreError, TicketError};
pub use locks::TicketLocks;
pub use store::TicketStore;
pub use ticket::{IntakeForm, NewTicket, Ticket, TicketHistory};
