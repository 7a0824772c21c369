// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collaborator contracts the engine consumes.
//!
//! Any persistence backend can satisfy these. Every method is fallible; the
//! engine propagates failures unchanged and never retries.

use async_trait::async_trait;
use futures::stream::BoxStream;

use atlas_authz_core::{
	Actor, Project, ProjectId, ProjectRole, Upload, UploadId, UserId, Workspace, WorkspaceId,
	WorkspacePermission,
};

use crate::error::StoreError;
use crate::filter::ProjectFilter;

/// Lazy sequence of projects. Each call to
/// [`ProjectStore::query_filtered`] starts a fresh pass.
pub type ProjectStream = BoxStream<'static, Result<Project, StoreError>>;

#[async_trait]
pub trait ProjectStore: Send + Sync {
	/// Finds the provisioned, not-removed project with this name in the
	/// workspace.
	async fn find_by_name_in_workspace(
		&self,
		workspace_id: WorkspaceId,
		name: &str,
	) -> Result<Option<Project>, StoreError>;

	/// Finds a project by id regardless of its lifecycle state.
	async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, StoreError>;

	/// Streams every project matching `filter`. Nothing is fetched until the
	/// stream is polled.
	fn query_filtered(&self, filter: &ProjectFilter) -> ProjectStream;
}

/// Explicit, project-scoped role assignments.
#[async_trait]
pub trait GrantStore: Send + Sync {
	/// The role granted to `user_id` on `project_id`, if any.
	async fn role_for(
		&self,
		project_id: ProjectId,
		user_id: UserId,
	) -> Result<Option<ProjectRole>, StoreError>;

	/// Every project on which `user_id` holds an explicit grant.
	async fn project_ids_for_user(&self, user_id: UserId) -> Result<Vec<ProjectId>, StoreError>;
}

/// Workspace lookups plus the workspace's own (opaque) permission model.
#[async_trait]
pub trait WorkspaceHandler: Send + Sync {
	async fn get_by_name(&self, name: &str) -> Result<Option<Workspace>, StoreError>;

	async fn get_by_id(&self, id: WorkspaceId) -> Result<Option<Workspace>, StoreError>;

	/// Workspaces the actor belongs to in any capacity.
	async fn list_user_workspaces(
		&self,
		actor: &Actor,
		active_only: bool,
	) -> Result<Vec<Workspace>, StoreError>;

	async fn user_has_permission(
		&self,
		workspace: &Workspace,
		actor: &Actor,
		permission: WorkspacePermission,
	) -> Result<bool, StoreError>;
}

/// In-flight upload transactions.
#[async_trait]
pub trait UploadStore: Send + Sync {
	async fn find_upload(&self, id: UploadId) -> Result<Option<Upload>, StoreError>;
}

/// Materializes actors from stored accounts. Used by tooling that acts on
/// behalf of a user id rather than an authenticated request.
#[async_trait]
pub trait ActorStore: Send + Sync {
	async fn actor_by_id(&self, id: UserId) -> Result<Option<Actor>, StoreError>;
}
