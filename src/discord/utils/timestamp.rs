// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, TimeZone, Utc};
use twilight_model::util::datetime::Timestamp;

/// Gets the [DateTime] object for a timestamp from Discord. If any failures occur in the conversion, returns `None`.
pub fn datetime_from_timestamp(timestamp: &Timestamp) -> Option<DateTime<Utc>> {
	let micros = timestamp.as_micros();
	Utc.timestamp_micros(micros).single()
}

/// Formats a time for display in Discord, shown relative to the viewer's current time.
pub fn relative_time(datetime: &DateTime<Utc>) -> String {
	format!("<t:{}:R>", datetime.timestamp())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn discord_timestamps_convert() {
		let timestamp = Timestamp::from_secs(1_700_000_000).unwrap();
		let datetime = datetime_from_timestamp(&timestamp).unwrap();
		assert_eq!(datetime.timestamp(), 1_700_000_000);
		assert_eq!(relative_time(&datetime), "<t:1700000000:R>");
	}
}
