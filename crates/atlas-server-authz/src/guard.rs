// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Guards: resolve a resource, then require a capability on it.
//!
//! Guards turn lookups and checks into a single tagged outcome. Anything that
//! would reveal whether a resource exists to someone who cannot see it is
//! reported as [`AuthzError::NotFound`].

use atlas_authz_core::{
	Actor, Project, ProjectId, Upload, UploadId, Workspace, WorkspacePermission,
};
use tracing::{debug, info, instrument};

use crate::authorizer::Authorizer;
use crate::capability::Capability;
use crate::error::{AuthzError, Result, StoreError};
use crate::gate::Removal;

/// A workspace is usable if it is active, or if the actor is a superuser.
pub fn is_active_workspace(workspace: &Workspace, actor: &Actor) -> bool {
	workspace.is_active || actor.is_superuser()
}

impl Authorizer {
	/// Resolves `project_name` inside the workspace named `workspace_name` and
	/// requires `capability` on it.
	#[instrument(
		level = "debug",
		skip_all,
		fields(workspace = %workspace_name, project = %project_name, capability = %capability)
	)]
	pub async fn require_project(
		&self,
		actor: &Actor,
		workspace_name: &str,
		project_name: &str,
		capability: Capability,
	) -> Result<Project> {
		let workspace = self
			.workspaces
			.get_by_name(workspace_name)
			.await?
			.ok_or(AuthzError::NotFound)?;
		if !is_active_workspace(&workspace, actor) {
			debug!(workspace_id = %workspace.id, "workspace inactive");
			return Err(AuthzError::NotFound);
		}

		let project = self
			.projects
			.find_by_name_in_workspace(workspace.id, project_name)
			.await?
			.filter(|p| p.is_provisioned() && !p.is_removed())
			.ok_or(AuthzError::NotFound)?;

		self
			.authorize(capability, project, actor, Removal::Enforce)
			.await
	}

	/// Resolves a project by its stable identifier and requires `capability`
	/// on it.
	///
	/// A malformed identifier is `NotFound`, not a bad request. With
	/// `include_removed`, projects scheduled for removal are fetched and the
	/// capability is evaluated as if the removal marker were absent; the
	/// plain [`Authorizer::check`] still denies them.
	#[instrument(
		level = "debug",
		skip_all,
		fields(project_id = %id, capability = %capability, include_removed = include_removed)
	)]
	pub async fn require_project_by_id(
		&self,
		actor: &Actor,
		id: &str,
		capability: Capability,
		include_removed: bool,
	) -> Result<Project> {
		let Some(project_id) = ProjectId::parse(id) else {
			debug!("malformed project id");
			return Err(AuthzError::NotFound);
		};

		let project = self
			.projects
			.find_by_id(project_id)
			.await?
			.filter(|p| p.is_provisioned() && (include_removed || !p.is_removed()))
			.ok_or(AuthzError::NotFound)?;

		let workspace = self
			.workspaces
			.get_by_id(project.workspace_id)
			.await?
			.ok_or(AuthzError::NotFound)?;
		if !is_active_workspace(&workspace, actor) {
			debug!(workspace_id = %workspace.id, "workspace inactive");
			return Err(AuthzError::NotFound);
		}

		let removal = if include_removed {
			Removal::Waive
		} else {
			Removal::Enforce
		};
		self.authorize(capability, project, actor, removal).await
	}

	/// Resolves an in-flight upload owned by `actor`, with its project.
	///
	/// Uploads to removed or retired projects are `NotFound`; uploads started
	/// by someone else are `Forbidden`.
	#[instrument(level = "debug", skip_all, fields(upload_id = %upload_id))]
	pub async fn require_upload(&self, actor: &Actor, upload_id: &str) -> Result<(Upload, Project)> {
		let Some(id) = UploadId::parse(upload_id) else {
			return Err(AuthzError::NotFound);
		};

		let upload = self
			.uploads
			.find_upload(id)
			.await?
			.ok_or(AuthzError::NotFound)?;
		let project = self
			.projects
			.find_by_id(upload.project_id)
			.await?
			.filter(|p| p.is_provisioned() && !p.is_removed())
			.ok_or(AuthzError::NotFound)?;

		if actor.user_id != Some(upload.user_id) {
			self.log_denial("upload", &project, actor);
			return Err(AuthzError::Forbidden);
		}

		Ok((upload, project))
	}

	/// Whether the workspace named `workspace_name` grants `permission` to the
	/// actor. Unknown workspaces and anonymous or deactivated actors get
	/// `false`.
	pub async fn check_workspace_permission(
		&self,
		actor: &Actor,
		workspace_name: &str,
		permission: WorkspacePermission,
	) -> std::result::Result<bool, StoreError> {
		if !actor.is_active() {
			return Ok(false);
		}
		let Some(workspace) = self.workspaces.get_by_name(workspace_name).await? else {
			return Ok(false);
		};
		self
			.workspaces
			.user_has_permission(&workspace, actor, permission)
			.await
	}

	async fn authorize(
		&self,
		capability: Capability,
		project: Project,
		actor: &Actor,
		removal: Removal,
	) -> Result<Project> {
		if self
			.check_with_removal(capability, &project, actor, removal)
			.await?
		{
			return Ok(project);
		}
		self.log_denial(capability.as_str(), &project, actor);
		Err(AuthzError::Forbidden)
	}

	fn log_denial(&self, action: &str, project: &Project, actor: &Actor) {
		if self.config.log_denials {
			info!(
				action,
				project_id = %project.id,
				user_id = ?actor.user_id,
				"access denied"
			);
		} else {
			debug!(action, project_id = %project.id, "access denied");
		}
	}
}
