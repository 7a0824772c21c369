// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Effective role reporting.

use atlas_authz_core::{Actor, Project, ProjectRole};

use crate::authorizer::Authorizer;
use crate::capability::Capability;
use crate::error::StoreError;

/// Capabilities probed from strongest to weakest, with the role reported when
/// the probe passes.
pub const ROLE_LADDER: [(Capability, ProjectRole); 4] = [
	(Capability::All, ProjectRole::Owner),
	(Capability::Upload, ProjectRole::Writer),
	(Capability::Edit, ProjectRole::Editor),
	(Capability::Read, ProjectRole::Reader),
];

impl Authorizer {
	/// The strongest role `actor` effectively holds on `project`, whether it
	/// comes from an explicit grant, workspace delegation, public visibility,
	/// or the superuser bypass.
	///
	/// For display only; enforcement always calls [`Authorizer::check`] with
	/// the specific capability.
	pub async fn resolve_highest_role(
		&self,
		project: &Project,
		actor: &Actor,
	) -> Result<Option<ProjectRole>, StoreError> {
		for (capability, role) in ROLE_LADDER {
			if self.check(capability, project, actor).await? {
				return Ok(Some(role));
			}
		}
		Ok(None)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::MemoryBackend;
	use atlas_authz_core::{UserId, Workspace, WorkspacePermission};
	use std::sync::Arc;

	async fn resolve(
		setup: impl FnOnce(&MemoryBackend, &Project, &Workspace, UserId),
		actor_of: impl FnOnce(UserId) -> Actor,
		public: bool,
	) -> Option<ProjectRole> {
		let backend = Arc::new(MemoryBackend::new());
		let workspace = Workspace::new("acme");
		let project = Project::new(workspace.id, "survey").with_public(public);
		backend.insert_workspace(workspace.clone());
		backend.insert_project(project.clone());
		let user_id = UserId::generate();
		setup(&backend, &project, &workspace, user_id);
		backend
			.authorizer()
			.resolve_highest_role(&project, &actor_of(user_id))
			.await
			.unwrap()
	}

	fn user(id: UserId) -> Actor {
		Actor::user(id, "alice")
	}

	#[tokio::test]
	async fn explicit_grants_resolve_to_themselves() {
		for role in ProjectRole::all() {
			let resolved = resolve(
				|b, p, _, u| b.grant(p.id, u, *role),
				user,
				false,
			)
			.await;
			assert_eq!(resolved, Some(*role));
		}
	}

	#[tokio::test]
	async fn workspace_admin_resolves_to_owner() {
		let resolved = resolve(
			|b, _, w, u| b.allow(w.id, u, WorkspacePermission::Admin),
			user,
			false,
		)
		.await;
		assert_eq!(resolved, Some(ProjectRole::Owner));
	}

	#[tokio::test]
	async fn public_project_resolves_to_reader_for_anonymous() {
		let resolved = resolve(|_, _, _, _| {}, |_| Actor::anonymous(), true).await;
		assert_eq!(resolved, Some(ProjectRole::Reader));
	}

	#[tokio::test]
	async fn superuser_resolves_to_owner() {
		let resolved = resolve(|_, _, _, _| {}, |u| Actor::admin(u, "root"), false).await;
		assert_eq!(resolved, Some(ProjectRole::Owner));
	}

	#[tokio::test]
	async fn stranger_resolves_to_none() {
		let resolved = resolve(|_, _, _, _| {}, user, false).await;
		assert_eq!(resolved, None);
	}
}
