// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `atlas-authz`: query the project authorization engine against the
//! configured database.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use atlas_server_config::{load_config, load_config_with_file, ServerConfig};
use atlas_server_db::SqliteBackend;

mod args;
mod commands;

use args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => load_config_with_file(path)?,
		None => load_config()?,
	};

	init_tracing(&config, args.json_logs);

	tracing::info!(database = %config.database.url, "opening database");
	let backend = SqliteBackend::connect(&config).await?;
	let authz = backend.authorizer(&config);

	commands::run(args.command, &backend, &authz).await
}

fn init_tracing(config: &ServerConfig, json: bool) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| config.logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);

	if json {
		registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init();
	}
}
