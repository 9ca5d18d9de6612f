// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::tickets::ChannelAccess;
use twilight_model::guild::Permissions;
use twilight_model::http::permission_overwrite::{PermissionOverwrite, PermissionOverwriteType};
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, RoleMarker, UserMarker};

/// What ticket participants need to take part in the ticket channel
pub fn participant_permissions() -> Permissions {
	Permissions::VIEW_CHANNEL
		| Permissions::READ_MESSAGE_HISTORY
		| Permissions::SEND_MESSAGES
		| Permissions::ATTACH_FILES
		| Permissions::EMBED_LINKS
}

/// Builds the channel overwrite granting or revoking a single user's access to a ticket channel.
pub fn member_overwrite(user_id: Id<UserMarker>, access: ChannelAccess) -> PermissionOverwrite {
	let (allow, deny) = match access {
		ChannelAccess::Granted => (participant_permissions(), Permissions::empty()),
		ChannelAccess::Revoked => (Permissions::empty(), participant_permissions()),
	};
	PermissionOverwrite {
		allow: Some(allow),
		deny: Some(deny),
		id: user_id.cast(),
		kind: PermissionOverwriteType::Member,
	}
}

/// The overwrites a ticket channel starts with: hidden from everyone except the requestor, staff, and the bot itself.
pub fn new_ticket_overwrites(
	guild_id: Id<GuildMarker>,
	requestor_id: Id<UserMarker>,
	staff_role_id: Id<RoleMarker>,
	bot_user_id: Id<UserMarker>,
) -> Vec<PermissionOverwrite> {
	// The @everyone role shares the guild's ID.
	let everyone_overwrite = PermissionOverwrite {
		allow: None,
		deny: Some(Permissions::VIEW_CHANNEL),
		id: guild_id.cast(),
		kind: PermissionOverwriteType::Role,
	};
	let staff_overwrite = PermissionOverwrite {
		allow: Some(participant_permissions()),
		deny: None,
		id: staff_role_id.cast(),
		kind: PermissionOverwriteType::Role,
	};
	let bot_overwrite = PermissionOverwrite {
		allow: Some(participant_permissions() | Permissions::MANAGE_CHANNELS | Permissions::MANAGE_ROLES),
		deny: None,
		id: bot_user_id.cast(),
		kind: PermissionOverwriteType::Member,
	};
	vec![
		everyone_overwrite,
		staff_overwrite,
		bot_overwrite,
		member_overwrite(requestor_id, ChannelAccess::Granted),
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn revoking_denies_what_granting_allows() {
		let granted = member_overwrite(Id::new(5), ChannelAccess::Granted);
		let revoked = member_overwrite(Id::new(5), ChannelAccess::Revoked);
		assert_eq!(granted.allow, revoked.deny);
		assert!(revoked.allow.is_some_and(|allow| allow.is_empty()));
		assert_eq!(granted.id.get(), 5);
	}

	#[test]
	fn new_channels_are_hidden_from_everyone() {
		let overwrites = new_ticket_overwrites(Id::new(1), Id::new(10), Id::new(2), Id::new(3));
		let everyone = overwrites
			.iter()
			.find(|overwrite| overwrite.id.get() == 1)
			.unwrap();
		assert_eq!(everyone.deny, Some(Permissions::VIEW_CHANNEL));
		assert!(overwrites.iter().any(|overwrite| overwrite.id.get() == 10
			&& overwrite.kind == PermissionOverwriteType::Member
			&& overwrite.allow == Some(participant_permissions())));
	}
}
