// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The [`Authorizer`]: capability checks and the read filter built from the
//! same rules.

use std::collections::BTreeSet;
use std::sync::Arc;

use atlas_authz_core::{Actor, Project, ProjectId, WorkspacePermission};
use atlas_server_config::AuthzConfig;
use tracing::{debug, instrument};

use crate::capability::{with_superuser_override, Capability, CapabilityRule};
use crate::error::StoreError;
use crate::filter::{ProjectFilter, ReadFilterOptions};
use crate::gate::{gate, is_publicly_readable, Removal};
use crate::store::{GrantStore, ProjectStore, UploadStore, WorkspaceHandler};

/// Stateless decision engine over shared collaborators.
///
/// Cheap to clone; every clone shares the same stores.
#[derive(Clone)]
pub struct Authorizer {
	pub(crate) projects: Arc<dyn ProjectStore>,
	pub(crate) grants: Arc<dyn GrantStore>,
	pub(crate) workspaces: Arc<dyn WorkspaceHandler>,
	pub(crate) uploads: Arc<dyn UploadStore>,
	pub(crate) config: AuthzConfig,
}

impl Authorizer {
	pub fn new(
		projects: Arc<dyn ProjectStore>,
		grants: Arc<dyn GrantStore>,
		workspaces: Arc<dyn WorkspaceHandler>,
		uploads: Arc<dyn UploadStore>,
	) -> Self {
		Self {
			projects,
			grants,
			workspaces,
			uploads,
			config: AuthzConfig::default(),
		}
	}

	/// Builder: apply authorization settings.
	pub fn with_config(mut self, config: AuthzConfig) -> Self {
		self.config = config;
		self
	}

	pub fn config(&self) -> &AuthzConfig {
		&self.config
	}

	/// Decides whether `actor` holds `capability` on `project`.
	///
	/// Returns `Ok(false)` for every denial; `Err` only when a collaborator
	/// lookup failed.
	pub async fn check(
		&self,
		capability: Capability,
		project: &Project,
		actor: &Actor,
	) -> Result<bool, StoreError> {
		self
			.check_with_removal(capability, project, actor, Removal::Enforce)
			.await
	}

	pub async fn can_read(&self, project: &Project, actor: &Actor) -> Result<bool, StoreError> {
		self.check(Capability::Read, project, actor).await
	}

	pub async fn can_edit(&self, project: &Project, actor: &Actor) -> Result<bool, StoreError> {
		self.check(Capability::Edit, project, actor).await
	}

	pub async fn can_upload(&self, project: &Project, actor: &Actor) -> Result<bool, StoreError> {
		self.check(Capability::Upload, project, actor).await
	}

	pub async fn can_update(&self, project: &Project, actor: &Actor) -> Result<bool, StoreError> {
		self.check(Capability::Update, project, actor).await
	}

	pub async fn can_delete(&self, project: &Project, actor: &Actor) -> Result<bool, StoreError> {
		self.check(Capability::Delete, project, actor).await
	}

	/// Full control ([`Capability::All`]).
	pub async fn can_manage(&self, project: &Project, actor: &Actor) -> Result<bool, StoreError> {
		self.check(Capability::All, project, actor).await
	}

	#[instrument(
		level = "debug",
		skip_all,
		fields(
			capability = %capability,
			project_id = %project.id,
			user_id = ?actor.user_id,
		)
	)]
	pub(crate) async fn check_with_removal(
		&self,
		capability: Capability,
		project: &Project,
		actor: &Actor,
		removal: Removal,
	) -> Result<bool, StoreError> {
		let rule = capability.rule();
		let allowed = with_superuser_override(project, actor, || {
			self.evaluate_rule(rule, project, actor, removal)
		})
		.await?;

		debug!(allowed, "capability decision");
		Ok(allowed)
	}

	async fn evaluate_rule(
		&self,
		rule: CapabilityRule,
		project: &Project,
		actor: &Actor,
		removal: Removal,
	) -> Result<bool, StoreError> {
		if rule.public_read && is_publicly_readable(project) {
			return Ok(true);
		}

		if !gate(project, actor, removal) {
			return Ok(false);
		}

		let role = match actor.user_id {
			Some(user_id) => self.grants.role_for(project.id, user_id).await?,
			None => None,
		};
		if rule.role.is_satisfied_by(role) {
			return Ok(true);
		}

		self.workspace_delegated(project, actor, rule.delegated).await
	}

	/// Asks the project's workspace whether it grants `permission` to the
	/// actor. Inactive workspaces delegate nothing.
	pub async fn workspace_delegated(
		&self,
		project: &Project,
		actor: &Actor,
		permission: WorkspacePermission,
	) -> Result<bool, StoreError> {
		if !actor.is_active() {
			return Ok(false);
		}

		let Some(workspace) = self.workspaces.get_by_id(project.workspace_id).await? else {
			return Ok(false);
		};
		if !workspace.is_active {
			return Ok(false);
		}

		self
			.workspaces
			.user_has_permission(&workspace, actor, permission)
			.await
	}

	/// Builds the collection filter equivalent to [`Capability::Read`] for
	/// `actor`.
	///
	/// With default options, `filter.matches(p) == can_read(p, actor)` for
	/// every project `p`. `as_admin = false` hides the superuser bypass and
	/// `public = false` hides projects readable only because they are public.
	#[instrument(
		level = "debug",
		skip_all,
		fields(user_id = ?actor.user_id, as_admin = options.as_admin, public = options.public)
	)]
	pub async fn build_read_filter(
		&self,
		actor: &Actor,
		options: ReadFilterOptions,
	) -> Result<ProjectFilter, StoreError> {
		if options.as_admin && actor.is_superuser() {
			return Ok(ProjectFilter::Provisioned);
		}

		let user_id = match actor.user_id {
			Some(user_id) if actor.is_active() => user_id,
			_ => {
				return Ok(ProjectFilter::And(vec![
					ProjectFilter::Provisioned,
					ProjectFilter::NotRemoved,
					ProjectFilter::Public,
				]));
			}
		};

		let mut readable_workspaces = BTreeSet::new();
		for workspace in self.workspaces.list_user_workspaces(actor, true).await? {
			if !workspace.is_active {
				continue;
			}
			if self
				.workspaces
				.user_has_permission(&workspace, actor, WorkspacePermission::Read)
				.await?
			{
				readable_workspaces.insert(workspace.id);
			}
		}

		let granted: BTreeSet<ProjectId> = self
			.grants
			.project_ids_for_user(user_id)
			.await?
			.into_iter()
			.collect();

		debug!(
			workspaces = readable_workspaces.len(),
			grants = granted.len(),
			"read filter scope resolved"
		);

		let mut reachable = Vec::with_capacity(3);
		if options.public {
			reachable.push(ProjectFilter::Public);
		}
		reachable.push(ProjectFilter::WorkspaceIn(readable_workspaces));
		reachable.push(ProjectFilter::IdIn(granted));

		Ok(ProjectFilter::And(vec![
			ProjectFilter::Provisioned,
			ProjectFilter::NotRemoved,
			ProjectFilter::Or(reachable),
		]))
	}
}
