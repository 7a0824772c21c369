// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer, merged across sources.

use serde::Deserialize;

use crate::sections::{AuthzConfigLayer, DatabaseConfigLayer, LoggingConfigLayer};

/// One source's view of the configuration. Absent sections and fields leave
/// lower-precedence values in place.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub authz: Option<AuthzConfigLayer>,
}

impl ServerConfigLayer {
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		merge_section(&mut self.authz, other.authz, AuthzConfigLayer::merge);
	}
}

fn merge_section<T>(slot: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	match (slot.as_mut(), other) {
		(Some(current), Some(other)) => merge(current, other),
		(None, Some(other)) => *slot = Some(other),
		(_, None) => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn later_layer_overrides_fields_it_sets() {
		let mut base = ServerConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: Some("sqlite:./base.db".to_string()),
				query_page_size: Some(100),
			}),
			..Default::default()
		};
		base.merge(ServerConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: Some("sqlite:./override.db".to_string()),
				query_page_size: None,
			}),
			..Default::default()
		});

		let database = base.database.unwrap();
		assert_eq!(database.url.as_deref(), Some("sqlite:./override.db"));
		assert_eq!(database.query_page_size, Some(100));
	}

	#[test]
	fn missing_section_keeps_existing() {
		let mut base = ServerConfigLayer {
			authz: Some(AuthzConfigLayer {
				log_denials: Some(true),
			}),
			..Default::default()
		};
		base.merge(ServerConfigLayer::default());
		assert_eq!(base.authz.unwrap().log_denials, Some(true));
	}

	#[test]
	fn section_fills_empty_slot() {
		let mut base = ServerConfigLayer::default();
		base.merge(ServerConfigLayer {
			logging: Some(LoggingConfigLayer {
				level: Some("debug".to_string()),
			}),
			..Default::default()
		});
		assert_eq!(base.logging.unwrap().level.as_deref(), Some("debug"));
	}
}
