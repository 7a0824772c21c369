// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Command-line arguments.

use std::path::PathBuf;

use atlas_authz_core::{UserId, WorkspacePermission};
use atlas_server_authz::Capability;
use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
	name = "atlas-authz",
	about = "Inspect project authorization decisions",
	version
)]
pub struct Args {
	/// Config file (defaults to /etc/atlas/server.toml)
	#[arg(long, global = true, env = "ATLAS_SERVER_CONFIG")]
	pub config: Option<PathBuf>,

	/// Emit logs as JSON on stderr
	#[arg(long, global = true)]
	pub json_logs: bool,

	#[command(subcommand)]
	pub command: Command,
}

/// Who the decision is made for.
#[derive(ClapArgs, Debug, Clone)]
pub struct ActorArgs {
	/// Stored user to act as; omit for an anonymous visitor
	#[arg(long, value_parser = parse_user_id)]
	pub user: Option<UserId>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Decide one capability on one project
	Check {
		#[command(flatten)]
		actor: ActorArgs,
		/// Project id
		#[arg(long)]
		project: String,
		#[arg(long, value_parser = parse_capability)]
		capability: Capability,
	},

	/// Report the strongest effective role on a project
	Role {
		#[command(flatten)]
		actor: ActorArgs,
		/// Project id
		#[arg(long)]
		project: String,
	},

	/// List every project the actor can read
	List {
		#[command(flatten)]
		actor: ActorArgs,
		/// Do not apply the superuser bypass
		#[arg(long)]
		no_admin: bool,
		/// Hide projects readable only because they are public
		#[arg(long)]
		no_public: bool,
	},

	/// Run a guard: resolve a project and require a capability on it
	Require {
		#[command(flatten)]
		actor: ActorArgs,
		#[arg(long, value_parser = parse_capability, default_value = "read")]
		capability: Capability,
		#[command(subcommand)]
		target: RequireTarget,
	},

	/// Ask a workspace whether it grants a permission
	WorkspacePermission {
		#[command(flatten)]
		actor: ActorArgs,
		#[arg(long)]
		workspace: String,
		#[arg(long, value_parser = parse_permission)]
		permission: WorkspacePermission,
	},
}

#[derive(Subcommand, Debug)]
pub enum RequireTarget {
	/// By workspace and project name
	Name { workspace: String, project: String },
	/// By project id
	Id {
		id: String,
		/// Also resolve projects scheduled for removal
		#[arg(long)]
		include_removed: bool,
	},
	/// By in-flight upload id
	Upload { id: String },
}

fn parse_user_id(s: &str) -> Result<UserId, String> {
	UserId::parse(s).ok_or_else(|| format!("'{s}' is not a valid user id"))
}

fn parse_capability(s: &str) -> Result<Capability, String> {
	s.parse()
}

fn parse_permission(s: &str) -> Result<WorkspacePermission, String> {
	s.parse()
}
