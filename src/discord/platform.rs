// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::utils::permissions::{member_overwrite, new_ticket_overwrites};
use super::utils::timestamp::datetime_from_timestamp;
use crate::config::{ConfigData, RoleConfig};
use crate::restrictions::RestrictionStore;
use crate::tickets::{
	Authorization, ChannelAccess, ChannelRequest, RoleTag, Ticket, TicketChannels, TranscriptRenderer,
};
use crate::transcript::{TranscriptLine, render_transcript};
use async_trait::async_trait;
use miette::IntoDiagnostic;
use std::sync::Arc;
use twilight_http::client::Client;
use twilight_http::error::{Error, ErrorType};
use twilight_http::response::StatusCode;
use twilight_mention::fmt::Mention;
use twilight_model::channel::ChannelType;
use twilight_model::channel::message::{AllowedMentions, Message};
use twilight_model::channel::permission_overwrite::{
	PermissionOverwrite as ChannelPermissionOverwrite, PermissionOverwriteType as ChannelPermissionOverwriteType,
};
use twilight_model::guild::Permissions;
use twilight_model::http::attachment::Attachment;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, RoleMarker, UserMarker};

/// Discord returns at most this many messages per request.
const MESSAGES_PER_PAGE: u16 = 100;
/// Transcripts stop after this many pages of history.
const MAX_TRANSCRIPT_PAGES: usize = 20;

fn is_not_found(error: &Error) -> bool {
	matches!(
		error.kind(),
		ErrorType::Response {
			status: StatusCode::NOT_FOUND,
			..
		}
	)
}

/// Ticket channels as text channels in the configured channel category
pub struct DiscordChannels {
	http_client: Arc<Client>,
	config: Arc<ConfigData>,
	bot_user_id: Id<UserMarker>,
}

impl DiscordChannels {
	pub fn new(http_client: Arc<Client>, config: Arc<ConfigData>, bot_user_id: Id<UserMarker>) -> Self {
		Self {
			http_client,
			config,
			bot_user_id,
		}
	}
}

#[async_trait]
impl TicketChannels for DiscordChannels {
	async fn create_channel(&self, request: &ChannelRequest) -> miette::Result<Id<ChannelMarker>> {
		let overwrites = new_ticket_overwrites(
			request.guild_id,
			request.requestor_id,
			self.config.roles.staff,
			self.bot_user_id,
		);
		// Channel creation takes the channel model's overwrite type rather than the HTTP one.
		let overwrites: Vec<ChannelPermissionOverwrite> = overwrites
			.into_iter()
			.map(|overwrite| ChannelPermissionOverwrite {
				allow: overwrite.allow.unwrap_or_else(Permissions::empty),
				deny: overwrite.deny.unwrap_or_else(Permissions::empty),
				id: overwrite.id,
				kind: ChannelPermissionOverwriteType::from(overwrite.kind as u8),
			})
			.collect();
		let mut create_channel = self
			.http_client
			.create_guild_channel(request.guild_id, &request.name)
			.kind(ChannelType::GuildText)
			.permission_overwrites(&overwrites);
		if let Some(category_id) = self.config.channels.ticket_category {
			create_channel = create_channel.parent_id(category_id);
		}
		let channel = create_channel
			.await
			.into_diagnostic()?
			.model()
			.await
			.into_diagnostic()?;
		Ok(channel.id)
	}

	async fn channel_exists(&self, channel_id: Id<ChannelMarker>) -> miette::Result<bool> {
		match self.http_client.channel(channel_id).await {
			Ok(_) => Ok(true),
			Err(error) if is_not_found(&error) => Ok(false),
			Err(error) => Err(error).into_diagnostic(),
		}
	}

	async fn set_access(
		&self,
		channel_id: Id<ChannelMarker>,
		user_id: Id<UserMarker>,
		access: ChannelAccess,
	) -> miette::Result<()> {
		let overwrite = member_overwrite(user_id, access);
		self.http_client
			.update_channel_permission(channel_id, &overwrite)
			.await
			.into_diagnostic()?;
		Ok(())
	}

	async fn delete_channel(&self, channel_id: Id<ChannelMarker>) -> miette::Result<()> {
		match self.http_client.delete_channel(channel_id).await {
			Ok(_) => Ok(()),
			Err(error) if is_not_found(&error) => Ok(()),
			Err(error) => Err(error).into_diagnostic(),
		}
	}
}

/// Whether a member with the given roles holds the designation, going by the configured role IDs
fn roles_grant(roles: &RoleConfig, member_roles: &[Id<RoleMarker>], tag: RoleTag) -> bool {
	let role_id = match tag {
		RoleTag::Staff => Some(roles.staff),
		RoleTag::Helper => Some(roles.helper),
		RoleTag::Exempt => roles.volunteer,
		RoleTag::Restricted => roles.restricted,
	};
	match role_id {
		Some(role_id) => member_roles.contains(&role_id),
		None => false,
	}
}

/// Role checks against guild member data, plus the restricted users list
pub struct DiscordAuthorization {
	http_client: Arc<Client>,
	config: Arc<ConfigData>,
	restrictions: RestrictionStore,
}

impl DiscordAuthorization {
	pub fn new(http_client: Arc<Client>, config: Arc<ConfigData>, restrictions: RestrictionStore) -> Self {
		Self {
			http_client,
			config,
			restrictions,
		}
	}

	async fn member_roles(&self, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>) -> miette::Result<Vec<Id<RoleMarker>>> {
		let member = self
			.http_client
			.guild_member(guild_id, user_id)
			.await
			.into_diagnostic()?
			.model()
			.await
			.into_diagnostic()?;
		Ok(member.roles)
	}
}

#[async_trait]
impl Authorization for DiscordAuthorization {
	async fn has_role(&self, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>, role: RoleTag) -> bool {
		if role == RoleTag::Restricted {
			match self.restrictions.is_restricted(guild_id, user_id) {
				Ok(true) => return true,
				Ok(false) => (),
				Err(error) => tracing::warn!(source = ?error, %user_id, "Failed to check ticket restriction"),
			}
			if self.config.roles.restricted.is_none() {
				return false;
			}
		}

		match self.member_roles(guild_id, user_id).await {
			Ok(member_roles) => roles_grant(&self.config.roles, &member_roles, role),
			Err(error) => {
				tracing::warn!(source = ?error, %user_id, ?role, "Failed to get member roles");
				false
			}
		}
	}
}

/// Posts ticket transcripts as text files to the configured transcripts channel
pub struct DiscordTranscripts {
	http_client: Arc<Client>,
	transcripts_channel: Option<Id<ChannelMarker>>,
}

impl DiscordTranscripts {
	pub fn new(http_client: Arc<Client>, transcripts_channel: Option<Id<ChannelMarker>>) -> Self {
		Self {
			http_client,
			transcripts_channel,
		}
	}

	/// Gets the channel's messages, oldest first.
	async fn channel_history(&self, channel_id: Id<ChannelMarker>) -> miette::Result<Vec<Message>> {
		let mut messages: Vec<Message> = Vec::new();
		let mut before: Option<Id<MessageMarker>> = None;
		for _ in 0..MAX_TRANSCRIPT_PAGES {
			let request = self
				.http_client
				.channel_messages(channel_id)
				.limit(MESSAGES_PER_PAGE);
			let response = match before {
				Some(message_id) => request.before(message_id).await,
				None => request.await,
			};
			let page = response.into_diagnostic()?.models().await.into_diagnostic()?;
			let page_len = page.len();
			before = page.last().map(|message| message.id);
			messages.extend(page);
			if page_len < usize::from(MESSAGES_PER_PAGE) {
				break;
			}
		}
		messages.reverse();
		Ok(messages)
	}
}

fn transcript_line(message: &Message) -> TranscriptLine {
	let author = message
		.author
		.global_name
		.clone()
		.unwrap_or_else(|| message.author.name.clone());
	TranscriptLine {
		sent_at: datetime_from_timestamp(&message.timestamp).unwrap_or_default(),
		author,
		content: message.content.clone(),
		attachments: message
			.attachments
			.iter()
			.map(|attachment| attachment.url.clone())
			.collect(),
	}
}

#[async_trait]
impl TranscriptRenderer for DiscordTranscripts {
	async fn render(&self, ticket: &Ticket, cancelled: bool) -> miette::Result<()> {
		let Some(transcripts_channel) = self.transcripts_channel else {
			tracing::debug!(channel_id = %ticket.channel_id, "No transcripts channel configured; skipping transcript");
			return Ok(());
		};

		let messages = self.channel_history(ticket.channel_id).await?;
		let lines: Vec<TranscriptLine> = messages.iter().map(transcript_line).collect();
		let transcript = render_transcript(ticket, cancelled, &lines);

		let outcome = if cancelled { "cancelled" } else { "closed" };
		let summary = format!(
			"Transcript of {}'s **{}** ticket ({}, {} messages)",
			ticket.requestor_id.mention(),
			ticket.category,
			outcome,
			lines.len()
		);
		let attachment = Attachment::from_bytes(
			format!("transcript-{}.txt", ticket.channel_id),
			transcript.into_bytes(),
			1,
		);
		self.http_client
			.create_message(transcripts_channel)
			.content(&summary)
			.attachments(&[attachment])
			.allowed_mentions(Some(&AllowedMentions::default()))
			.await
			.into_diagnostic()?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn roles() -> RoleConfig {
		RoleConfig {
			staff: Id::new(1),
			helper: Id::new(2),
			volunteer: Some(Id::new(3)),
			restricted: None,
		}
	}

	#[test]
	fn configured_roles_are_matched() {
		let member_roles = vec![Id::new(2), Id::new(3), Id::new(99)];
		assert!(roles_grant(&roles(), &member_roles, RoleTag::Helper));
		assert!(roles_grant(&roles(), &member_roles, RoleTag::Exempt));
		assert!(!roles_grant(&roles(), &member_roles, RoleTag::Staff));
		assert!(!roles_grant(&roles(), &member_roles, RoleTag::Restricted));
	}
}
