// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory implementation of every collaborator trait, for tests.
//!
//! Workspace permissions are stored as explicit `(workspace, user, permission)`
//! entries; a user belongs to a workspace when they hold at least one, and a
//! held permission answers for every weaker one.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};

use atlas_authz_core::{
	Actor, Project, ProjectId, ProjectRole, Upload, UploadId, UserId, Workspace, WorkspaceId,
	WorkspacePermission,
};

use crate::authorizer::Authorizer;
use crate::error::StoreError;
use crate::filter::ProjectFilter;
use crate::store::{ActorStore, GrantStore, ProjectStore, ProjectStream, UploadStore, WorkspaceHandler};

#[derive(Debug, Default)]
struct State {
	workspaces: HashMap<WorkspaceId, Workspace>,
	projects: HashMap<ProjectId, Project>,
	grants: HashMap<(ProjectId, UserId), ProjectRole>,
	permissions: HashSet<(WorkspaceId, UserId, WorkspacePermission)>,
	uploads: HashMap<UploadId, Upload>,
	actors: HashMap<UserId, Actor>,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
	state: Arc<RwLock<State>>,
	unavailable: Arc<AtomicBool>,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// An [`Authorizer`] using this backend for every collaborator.
	pub fn authorizer(self: &Arc<Self>) -> Authorizer {
		Authorizer::new(self.clone(), self.clone(), self.clone(), self.clone())
	}

	/// While set, every lookup fails with [`StoreError::Unavailable`].
	pub fn set_unavailable(&self, unavailable: bool) {
		self.unavailable.store(unavailable, Ordering::SeqCst);
	}

	/// Inserts or replaces a workspace.
	pub fn insert_workspace(&self, workspace: Workspace) {
		self.write().workspaces.insert(workspace.id, workspace);
	}

	/// Inserts or replaces a project.
	pub fn insert_project(&self, project: Project) {
		self.write().projects.insert(project.id, project);
	}

	/// Sets the single explicit grant for a (project, user) pair.
	pub fn grant(&self, project_id: ProjectId, user_id: UserId, role: ProjectRole) {
		self.write().grants.insert((project_id, user_id), role);
	}

	pub fn revoke(&self, project_id: ProjectId, user_id: UserId) {
		self.write().grants.remove(&(project_id, user_id));
	}

	/// Lets the workspace answer `true` for `permission` and everything it
	/// includes.
	pub fn allow(&self, workspace_id: WorkspaceId, user_id: UserId, permission: WorkspacePermission) {
		self
			.write()
			.permissions
			.insert((workspace_id, user_id, permission));
	}

	pub fn insert_upload(&self, upload: Upload) {
		self.write().uploads.insert(upload.id, upload);
	}

	pub fn insert_actor(&self, actor: Actor) {
		if let Some(user_id) = actor.user_id {
			self.write().actors.insert(user_id, actor);
		}
	}

	fn write(&self) -> RwLockWriteGuard<'_, State> {
		self.state.write().unwrap_or_else(|e| e.into_inner())
	}

	fn available(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
		read_available(&self.state, &self.unavailable)
	}
}

fn read_available<'a>(
	state: &'a RwLock<State>,
	unavailable: &AtomicBool,
) -> Result<RwLockReadGuard<'a, State>, StoreError> {
	if unavailable.load(Ordering::SeqCst) {
		return Err(StoreError::Unavailable("memory backend offline".to_string()));
	}
	// Poisoning only happens if a test panicked mid-write; recover the data.
	Ok(state.read().unwrap_or_else(|e| e.into_inner()))
}

#[async_trait]
impl ProjectStore for MemoryBackend {
	async fn find_by_name_in_workspace(
		&self,
		workspace_id: WorkspaceId,
		name: &str,
	) -> Result<Option<Project>, StoreError> {
		let state = self.available()?;
		Ok(state
			.projects
			.values()
			.find(|p| {
				p.workspace_id == workspace_id
					&& p.name == name
					&& p.is_provisioned()
					&& !p.is_removed()
			})
			.cloned())
	}

	async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
		Ok(self.available()?.projects.get(&id).cloned())
	}

	fn query_filtered(&self, filter: &ProjectFilter) -> ProjectStream {
		let state = Arc::clone(&self.state);
		let unavailable = Arc::clone(&self.unavailable);
		let filter = filter.clone();

		stream::once(async move {
			let guard = read_available(&state, &unavailable)?;
			let mut projects: Vec<Project> = guard
				.projects
				.values()
				.filter(|p| filter.matches(p))
				.cloned()
				.collect();
			projects.sort_by_key(|p| p.id);
			Ok::<_, StoreError>(stream::iter(projects.into_iter().map(Ok::<Project, StoreError>)))
		})
		.try_flatten()
		.boxed()
	}
}

#[async_trait]
impl GrantStore for MemoryBackend {
	async fn role_for(
		&self,
		project_id: ProjectId,
		user_id: UserId,
	) -> Result<Option<ProjectRole>, StoreError> {
		Ok(self.available()?.grants.get(&(project_id, user_id)).copied())
	}

	async fn project_ids_for_user(&self, user_id: UserId) -> Result<Vec<ProjectId>, StoreError> {
		Ok(self
			.available()?
			.grants
			.keys()
			.filter(|(_, u)| *u == user_id)
			.map(|(p, _)| *p)
			.collect())
	}
}

#[async_trait]
impl WorkspaceHandler for MemoryBackend {
	async fn get_by_name(&self, name: &str) -> Result<Option<Workspace>, StoreError> {
		Ok(self
			.available()?
			.workspaces
			.values()
			.find(|w| w.name == name)
			.cloned())
	}

	async fn get_by_id(&self, id: WorkspaceId) -> Result<Option<Workspace>, StoreError> {
		Ok(self.available()?.workspaces.get(&id).cloned())
	}

	async fn list_user_workspaces(
		&self,
		actor: &Actor,
		active_only: bool,
	) -> Result<Vec<Workspace>, StoreError> {
		let state = self.available()?;
		let Some(user_id) = actor.user_id else {
			return Ok(Vec::new());
		};
		let member_of: HashSet<WorkspaceId> = state
			.permissions
			.iter()
			.filter(|(_, u, _)| *u == user_id)
			.map(|(w, _, _)| *w)
			.collect();
		Ok(state
			.workspaces
			.values()
			.filter(|w| member_of.contains(&w.id) && (!active_only || w.is_active))
			.cloned()
			.collect())
	}

	async fn user_has_permission(
		&self,
		workspace: &Workspace,
		actor: &Actor,
		permission: WorkspacePermission,
	) -> Result<bool, StoreError> {
		let state = self.available()?;
		let Some(user_id) = actor.user_id else {
			return Ok(false);
		};
		Ok(state
			.permissions
			.iter()
			.any(|(w, u, held)| *w == workspace.id && *u == user_id && held.includes(permission)))
	}
}

#[async_trait]
impl UploadStore for MemoryBackend {
	async fn find_upload(&self, id: UploadId) -> Result<Option<Upload>, StoreError> {
		Ok(self.available()?.uploads.get(&id).cloned())
	}
}

#[async_trait]
impl ActorStore for MemoryBackend {
	async fn actor_by_id(&self, id: UserId) -> Result<Option<Actor>, StoreError> {
		Ok(self.available()?.actors.get(&id).cloned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn revoked_grant_is_gone() {
		let backend = MemoryBackend::new();
		let project = ProjectId::generate();
		let user = UserId::generate();
		backend.grant(project, user, ProjectRole::Editor);
		backend.revoke(project, user);
		assert_eq!(backend.role_for(project, user).await.unwrap(), None);
		assert!(backend.project_ids_for_user(user).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn actors_are_looked_up_by_id() {
		let backend = MemoryBackend::new();
		let actor = Actor::user(UserId::generate(), "alice");
		backend.insert_actor(actor.clone());
		backend.insert_actor(Actor::anonymous());

		let user_id = actor.user_id.unwrap();
		assert_eq!(backend.actor_by_id(user_id).await.unwrap(), Some(actor));
		assert_eq!(backend.actor_by_id(UserId::generate()).await.unwrap(), None);
	}

	#[tokio::test]
	async fn filtered_stream_reads_state_when_polled() {
		let backend = MemoryBackend::new();
		let workspace = Workspace::new("acme");
		let stream = backend.query_filtered(&ProjectFilter::Provisioned);
		backend.insert_project(Project::new(workspace.id, "late"));

		let projects: Vec<Project> = stream.try_collect().await.unwrap();
		assert_eq!(projects.len(), 1);

		let stream = backend.query_filtered(&ProjectFilter::Provisioned);
		backend.set_unavailable(true);
		let polled: Result<Vec<Project>, StoreError> = stream.try_collect().await;
		assert!(matches!(polled, Err(StoreError::Unavailable(_))));

		let stream = backend.query_filtered(&ProjectFilter::Provisioned);
		backend.set_unavailable(false);
		let projects: Vec<Project> = stream.try_collect().await.unwrap();
		assert_eq!(projects.len(), 1);
	}

	#[tokio::test]
	async fn offline_backend_fails_every_lookup() {
		let backend = MemoryBackend::new();
		backend.set_unavailable(true);
		assert!(matches!(
			backend.find_by_id(ProjectId::generate()).await,
			Err(StoreError::Unavailable(_))
		));
		assert!(backend.get_by_name("acme").await.is_err());
	}
}
