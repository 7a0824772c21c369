// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Capabilities and the table that defines them.
//!
//! Every capability is one row of [`Capability::rule`]: a role requirement on
//! the actor's explicit grant, the workspace permission that can stand in for
//! it, and whether public projects satisfy it. All rows are evaluated by the
//! same code path in [`crate::Authorizer::check`], wrapped by
//! [`with_superuser_override`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use atlas_authz_core::{Actor, Project, ProjectRole, WorkspacePermission};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A named permission level checked on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
	Read,
	Edit,
	Upload,
	/// Rename and change settings.
	Update,
	Delete,
	/// Full control.
	All,
}

/// How an explicit grant is compared against a capability's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
	/// Any role ranked at or above the given one.
	AtLeast(ProjectRole),
	/// Exactly the given role; higher-ranked roles do not qualify.
	Exactly(ProjectRole),
}

impl RoleRequirement {
	pub fn is_satisfied_by(&self, role: Option<ProjectRole>) -> bool {
		match (self, role) {
			(_, None) => false,
			(RoleRequirement::AtLeast(min), Some(role)) => role >= *min,
			(RoleRequirement::Exactly(required), Some(role)) => role == *required,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityRule {
	pub role: RoleRequirement,
	pub delegated: WorkspacePermission,
	pub public_read: bool,
}

impl Capability {
	pub fn all() -> &'static [Capability] {
		&[
			Capability::Read,
			Capability::Edit,
			Capability::Upload,
			Capability::Update,
			Capability::Delete,
			Capability::All,
		]
	}

	pub fn rule(self) -> CapabilityRule {
		use RoleRequirement::{AtLeast, Exactly};

		match self {
			Capability::Read => CapabilityRule {
				role: AtLeast(ProjectRole::Reader),
				delegated: WorkspacePermission::Read,
				public_read: true,
			},
			Capability::Edit => CapabilityRule {
				role: AtLeast(ProjectRole::Editor),
				delegated: WorkspacePermission::Edit,
				public_read: false,
			},
			Capability::Upload => CapabilityRule {
				role: AtLeast(ProjectRole::Writer),
				delegated: WorkspacePermission::Write,
				public_read: false,
			},
			Capability::Update | Capability::Delete | Capability::All => CapabilityRule {
				role: Exactly(ProjectRole::Owner),
				delegated: WorkspacePermission::Admin,
				public_read: false,
			},
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Capability::Read => "read",
			Capability::Edit => "edit",
			Capability::Upload => "upload",
			Capability::Update => "update",
			Capability::Delete => "delete",
			Capability::All => "all",
		}
	}
}

impl fmt::Display for Capability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Capability {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Capability::all()
			.iter()
			.copied()
			.find(|c| c.as_str() == s)
			.ok_or_else(|| format!("unknown capability: {s}"))
	}
}

/// Runs `check` unless the actor is a superuser, in which case access is
/// granted without consulting the gate or any grant.
///
/// Retired projects are denied before the bypass: retirement is absolute for
/// every actor.
pub async fn with_superuser_override<F, Fut>(
	project: &Project,
	actor: &Actor,
	check: F,
) -> Result<bool, StoreError>
where
	F: FnOnce() -> Fut,
	Fut: Future<Output = Result<bool, StoreError>>,
{
	if project.is_retired() {
		return Ok(false);
	}
	if actor.is_superuser() {
		return Ok(true);
	}
	check().await
}
