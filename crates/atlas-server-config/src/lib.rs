// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for the Atlas authorization server.
//!
//! Values come from built-in defaults, an optional TOML file, and
//! `ATLAS_SERVER_*` environment variables, in increasing precedence.
//!
//! ```ignore
//! use atlas_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("database at {}", config.database.url);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub authz: AuthzConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`ATLAS_SERVER_*`)
/// 2. Config file (`/etc/atlas/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration from environment only.
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(EnvSource)];
	load_from_sources(sources)
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();
	let authz = layer.authz.unwrap_or_default().finalize();

	validate_config(&database)?;

	info!(
		database = %database.url,
		query_page_size = database.query_page_size,
		log_level = %logging.level,
		log_denials = authz.log_denials,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		database,
		logging,
		authz,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(database: &DatabaseConfig) -> Result<(), ConfigError> {
	if !database.url.starts_with("sqlite:") {
		return Err(ConfigError::Validation(format!(
			"database url '{}' is not a sqlite: url",
			database.url
		)));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_empty_layer_finalizes_to_defaults() {
		let config = finalize(ServerConfigLayer::default()).unwrap();
		assert_eq!(config, ServerConfig::default());
	}

	#[test]
	fn test_non_sqlite_url_rejected() {
		let layer = ServerConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: Some("postgres://localhost/atlas".to_string()),
				query_page_size: None,
			}),
			..Default::default()
		};
		let err = finalize(layer).unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	proptest! {
		#[test]
		fn higher_precedence_page_size_wins(low in 1u32..10_000, high in 1u32..10_000) {
			let mut merged = ServerConfigLayer {
				database: Some(DatabaseConfigLayer { url: None, query_page_size: Some(low) }),
				..Default::default()
			};
			merged.merge(ServerConfigLayer {
				database: Some(DatabaseConfigLayer { url: None, query_page_size: Some(high) }),
				..Default::default()
			});
			let config = finalize(merged).unwrap();
			prop_assert_eq!(config.database.query_page_size, high);
		}
	}
}
