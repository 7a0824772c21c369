// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Project, workspace, and upload records as read from persistence.
//!
//! The engine never mutates these; they are snapshots handed over by the
//! storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ProjectId, UploadId, UserId, WorkspaceId};

/// Where and how a project's files are stored.
///
/// Only the presence of this value matters for authorization: a project
/// without storage parameters has been permanently retired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageParams {
	pub kind: String,
	pub location: String,
}

impl StorageParams {
	pub fn local(location: impl Into<String>) -> Self {
		Self {
			kind: "local".to_string(),
			location: location.into(),
		}
	}
}

/// A versioned project living inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
	pub id: ProjectId,
	pub name: String,
	pub workspace_id: WorkspaceId,
	pub public: bool,
	/// Set when the project is scheduled for removal.
	pub removed_at: Option<DateTime<Utc>>,
	/// `None` once the project has been permanently retired.
	pub storage_params: Option<StorageParams>,
}

impl Project {
	/// Creates a private, provisioned project with a fresh id.
	pub fn new(workspace_id: WorkspaceId, name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			id: ProjectId::generate(),
			storage_params: Some(StorageParams::local(name.clone())),
			name,
			workspace_id,
			public: false,
			removed_at: None,
		}
	}

	/// Builder: set public visibility.
	pub fn with_public(mut self, public: bool) -> Self {
		self.public = public;
		self
	}

	/// Builder: mark as scheduled for removal.
	pub fn with_removed_at(mut self, removed_at: DateTime<Utc>) -> Self {
		self.removed_at = Some(removed_at);
		self
	}

	/// Builder: drop storage parameters (permanent retirement).
	pub fn retired(mut self) -> Self {
		self.storage_params = None;
		self
	}

	pub fn is_provisioned(&self) -> bool {
		self.storage_params.is_some()
	}

	pub fn is_retired(&self) -> bool {
		!self.is_provisioned()
	}

	pub fn is_removed(&self) -> bool {
		self.removed_at.is_some()
	}
}

/// A tenant grouping projects. Its permission model is opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
	pub id: WorkspaceId,
	pub name: String,
	pub is_active: bool,
}

impl Workspace {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			id: WorkspaceId::generate(),
			name: name.into(),
			is_active: true,
		}
	}

	/// Builder: set the active flag.
	pub fn with_active(mut self, is_active: bool) -> Self {
		self.is_active = is_active;
		self
	}
}

/// An in-flight upload transaction started by one user against one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
	pub id: UploadId,
	pub project_id: ProjectId,
	pub user_id: UserId,
}
