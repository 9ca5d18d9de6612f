// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use diesel::r2d2::PoolError;
use diesel::result::Error as DbError;
use miette::Diagnostic;
use std::fmt;
use twilight_mention::fmt::Mention;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

/// Failure of the ticket storage backend
#[derive(Debug, Diagnostic)]
pub enum StoreError {
	/// No database connection could be obtained
	Connection(PoolError),
	Query(DbError),
	/// A uniqueness constraint rejected the write
	Conflict,
	/// A stored record couldn't be read back
	Corrupt(String),
}

impl From<PoolError> for StoreError {
	fn from(error: PoolError) -> Self {
		Self::Connection(error)
	}
}

impl From<DbError> for StoreError {
	fn from(error: DbError) -> Self {
		match error {
			DbError::DatabaseError(diesel::result::DatabaseErrorKind::UniqueViolation, _) => Self::Conflict,
			error => Self::Query(error),
		}
	}
}

impl std::error::Error for StoreError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Connection(error) => Some(error),
			Self::Query(error) => Some(error),
			Self::Conflict | Self::Corrupt(_) => None,
		}
	}
}

impl fmt::Display for StoreError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Connection(error) => write!(f, "persistence unavailable: {}", error),
			Self::Query(error) => write!(f, "persistence unavailable: {}", error),
			Self::Conflict => write!(f, "persistence unavailable: conflicting record"),
			Self::Corrupt(detail) => write!(f, "persistence unavailable: corrupt record ({})", detail),
		}
	}
}

/// The reasons a ticket operation can be rejected or fail
#[derive(Debug, Diagnostic)]
pub enum TicketError {
	AlreadyHasActiveTicket(Id<ChannelMarker>),
	Restricted,
	UnknownCategory(String),
	ChannelCreationFailed(String),
	TicketNotFound,
	TicketClosed,
	AlreadyClosed,
	RequestorCannotHelp,
	AlreadyHelper,
	RequestorElsewhere(Id<ChannelMarker>),
	HelperElsewhere(Id<ChannelMarker>),
	TicketFull(usize),
	NotEligible,
	NotHelper,
	NotPermitted,
	OnCooldown(u64),
	Persistence(StoreError),
}

impl TicketError {
	/// Whether this is a rejected action the user can do something about, as opposed to a failure on our end
	pub fn is_rejection(&self) -> bool {
		!matches!(self, Self::ChannelCreationFailed(_) | Self::Persistence(_))
	}
}

impl From<StoreError> for TicketError {
	fn from(error: StoreError) -> Self {
		Self::Persistence(error)
	}
}

impl std::error::Error for TicketError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Persistence(error) => Some(error),
			_ => None,
		}
	}
}

impl fmt::Display for TicketError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::AlreadyHasActiveTicket(channel_id) => write!(
				f,
				"You already have an open ticket in {}. Close it before opening another.",
				channel_id.mention()
			),
			Self::Restricted => write!(f, "You may not open tickets on this server."),
			Self::UnknownCategory(category) => write!(f, "The ticket category \"{}\" no longer exists.", category),
			Self::ChannelCreationFailed(detail) => write!(
				f,
				"Sorry, the channel for your ticket couldn't be created. ({})",
				detail
			),
			Self::TicketNotFound => write!(f, "That ticket doesn't exist anymore."),
			Self::TicketClosed => write!(f, "That ticket has already been closed."),
			Self::AlreadyClosed => write!(f, "This ticket is already being closed."),
			Self::RequestorCannotHelp => write!(f, "You can't help on your own ticket."),
			Self::AlreadyHelper => write!(f, "You're already a helper on this ticket."),
			Self::RequestorElsewhere(channel_id) => write!(
				f,
				"You have your own open ticket in {}; you can't help on another one until it's closed.",
				channel_id.mention()
			),
			Self::HelperElsewhere(channel_id) => write!(
				f,
				"You are already a helper in ticket {}. Leave it before joining another.",
				channel_id.mention()
			),
			Self::TicketFull(max_slots) => write!(f, "This ticket is full ({0}/{0} helpers).", max_slots),
			Self::NotEligible => write!(f, "You don't have the role needed to help on tickets."),
			Self::NotHelper => write!(f, "You're not a helper on this ticket."),
			Self::NotPermitted => write!(f, "Only the ticket's requestor or staff can do that."),
			Self::OnCooldown(remaining_seconds) => write!(
				f,
				"You're doing that too quickly. Try again in {} second{}.",
				remaining_seconds,
				if *remaining_seconds == 1 { "" } else { "s" }
			),
			Self::Persistence(error) => write!(f, "Sorry, something went wrong saving the ticket. ({})", error),
		}
	}
}
