// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identifier newtypes, project roles, and workspace permission names.
//!
//! All ID types serialize transparently as UUID strings. Identifiers arriving
//! from the outside world are untrusted strings; use the `parse` constructors
//! (or [`is_valid_uuid`]) before any lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Parse an untrusted identifier, returning `None` if it is not a UUID.
			pub fn parse(s: &str) -> Option<Self> {
				Uuid::parse_str(s).ok().map(Self)
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(ProjectId, "Stable unique identifier for a project.");
define_id_type!(WorkspaceId, "Unique identifier for a workspace.");
define_id_type!(UploadId, "Unique identifier for an upload transaction.");

/// Returns true if `s` can be parsed as a UUID.
pub fn is_valid_uuid(s: &str) -> bool {
	Uuid::parse_str(s).is_ok()
}

// =============================================================================
// Project Roles
// =============================================================================

/// Roles an actor can be granted directly on a project.
///
/// Variants are declared from weakest to strongest, so the derived ordering is
/// the rank ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
	/// Can read project content.
	Reader,
	/// Can edit existing content.
	Editor,
	/// Can upload new versions.
	Writer,
	/// Full control: settings, rename, delete.
	Owner,
}

impl ProjectRole {
	/// Returns all roles from weakest to strongest.
	pub fn all() -> &'static [ProjectRole] {
		&[
			ProjectRole::Reader,
			ProjectRole::Editor,
			ProjectRole::Writer,
			ProjectRole::Owner,
		]
	}

	/// Numeric rank, 1 for `Reader` up to 4 for `Owner`.
	pub fn rank(&self) -> u8 {
		match self {
			ProjectRole::Reader => 1,
			ProjectRole::Editor => 2,
			ProjectRole::Writer => 3,
			ProjectRole::Owner => 4,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			ProjectRole::Reader => "reader",
			ProjectRole::Editor => "editor",
			ProjectRole::Writer => "writer",
			ProjectRole::Owner => "owner",
		}
	}

	/// Returns true if this role has at least the permissions of the given role.
	pub fn has_permission_of(&self, other: &ProjectRole) -> bool {
		self.rank() >= other.rank()
	}
}

impl fmt::Display for ProjectRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown project role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for ProjectRole {
	type Err = ParseRoleError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"reader" => Ok(ProjectRole::Reader),
			"editor" => Ok(ProjectRole::Editor),
			"writer" => Ok(ProjectRole::Writer),
			"owner" => Ok(ProjectRole::Owner),
			other => Err(ParseRoleError(other.to_string())),
		}
	}
}

// =============================================================================
// Workspace Permissions
// =============================================================================

/// Permission names a workspace can be asked about when it delegates access
/// to the projects it contains.
///
/// Declared from weakest to strongest. The bundled workspace models treat a
/// stronger permission as including every weaker one (see
/// [`WorkspacePermission::includes`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspacePermission {
	Read,
	Edit,
	Write,
	Admin,
}

impl WorkspacePermission {
	pub fn all() -> &'static [WorkspacePermission] {
		&[
			WorkspacePermission::Read,
			WorkspacePermission::Edit,
			WorkspacePermission::Write,
			WorkspacePermission::Admin,
		]
	}

	pub fn rank(&self) -> u8 {
		match self {
			WorkspacePermission::Read => 1,
			WorkspacePermission::Edit => 2,
			WorkspacePermission::Write => 3,
			WorkspacePermission::Admin => 4,
		}
	}

	/// Whether holding `self` also answers a request for `requested`.
	pub fn includes(&self, requested: WorkspacePermission) -> bool {
		self.rank() >= requested.rank()
	}

	/// The wire name handed to the workspace permission model.
	pub fn as_str(&self) -> &'static str {
		match self {
			WorkspacePermission::Read => "read",
			WorkspacePermission::Edit => "edit",
			WorkspacePermission::Write => "write",
			WorkspacePermission::Admin => "admin",
		}
	}
}

impl fmt::Display for WorkspacePermission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for WorkspacePermission {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"read" => Ok(WorkspacePermission::Read),
			"edit" => Ok(WorkspacePermission::Edit),
			"write" => Ok(WorkspacePermission::Write),
			"admin" => Ok(WorkspacePermission::Admin),
			other => Err(format!("unknown workspace permission: {other}")),
		}
	}
}
