// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database configuration.

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./atlas.db";
pub const DEFAULT_QUERY_PAGE_SIZE: u32 = 500;

/// Database configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
	pub url: String,
	/// Rows fetched per page when streaming filtered project queries.
	pub query_page_size: u32,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			url: DEFAULT_DATABASE_URL.to_string(),
			query_page_size: DEFAULT_QUERY_PAGE_SIZE,
		}
	}
}

/// Database configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub query_page_size: Option<u32>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.query_page_size.is_some() {
			self.query_page_size = other.query_page_size;
		}
	}

	pub fn finalize(self) -> Result<DatabaseConfig, ConfigError> {
		let query_page_size = self.query_page_size.unwrap_or(DEFAULT_QUERY_PAGE_SIZE);
		if query_page_size == 0 {
			return Err(ConfigError::InvalidValue {
				key: "database.query_page_size".to_string(),
				message: "must be greater than zero".to_string(),
			});
		}

		Ok(DatabaseConfig {
			url: self.url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
			query_page_size,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = DatabaseConfigLayer::default().finalize().unwrap();
		assert_eq!(config, DatabaseConfig::default());
	}

	#[test]
	fn test_custom_url() {
		let layer = DatabaseConfigLayer {
			url: Some("sqlite:/var/lib/atlas/data.db".to_string()),
			query_page_size: Some(50),
		};
		let config = layer.finalize().unwrap();
		assert_eq!(config.url, "sqlite:/var/lib/atlas/data.db");
		assert_eq!(config.query_page_size, 50);
	}

	#[test]
	fn test_zero_page_size_rejected() {
		let layer = DatabaseConfigLayer {
			url: None,
			query_page_size: Some(0),
		};
		assert!(matches!(
			layer.finalize(),
			Err(ConfigError::InvalidValue { key, .. }) if key == "database.query_page_size"
		));
	}
}
