// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Subcommand execution. Every command prints one JSON document (or one per
//! line for listings) on stdout.

use anyhow::{anyhow, bail, Context};
use futures::TryStreamExt;
use serde::Serialize;
use serde_json::json;

use atlas_authz_core::{Actor, Project, ProjectId};
use atlas_server_authz::{ActorStore, Authorizer, AuthzError, ProjectStore, ReadFilterOptions};
use atlas_server_db::SqliteBackend;

use crate::args::{ActorArgs, Command, RequireTarget};

pub async fn run(command: Command, backend: &SqliteBackend, authz: &Authorizer) -> anyhow::Result<()> {
	match command {
		Command::Check {
			actor,
			project,
			capability,
		} => {
			let actor = resolve_actor(backend, &actor).await?;
			let project = load_project(backend, &project).await?;
			let allowed = authz.check(capability, &project, &actor).await?;
			emit(&json!({
				"project_id": project.id,
				"capability": capability,
				"allowed": allowed,
			}))
		}

		Command::Role { actor, project } => {
			let actor = resolve_actor(backend, &actor).await?;
			let project = load_project(backend, &project).await?;
			let role = authz.resolve_highest_role(&project, &actor).await?;
			emit(&json!({ "project_id": project.id, "role": role }))
		}

		Command::List {
			actor,
			no_admin,
			no_public,
		} => {
			let actor = resolve_actor(backend, &actor).await?;
			let options = ReadFilterOptions {
				as_admin: !no_admin,
				public: !no_public,
			};
			let mut projects = authz.list_projects(&actor, options).await?;
			let mut count = 0usize;
			while let Some(project) = projects.try_next().await? {
				emit(&project)?;
				count += 1;
			}
			tracing::debug!(count, "listed projects");
			Ok(())
		}

		Command::Require {
			actor,
			capability,
			target,
		} => {
			let actor = resolve_actor(backend, &actor).await?;
			let outcome = match target {
				RequireTarget::Name { workspace, project } => authz
					.require_project(&actor, &workspace, &project, capability)
					.await
					.map(|p| json!({ "project": p })),
				RequireTarget::Id {
					id,
					include_removed,
				} => authz
					.require_project_by_id(&actor, &id, capability, include_removed)
					.await
					.map(|p| json!({ "project": p })),
				RequireTarget::Upload { id } => authz
					.require_upload(&actor, &id)
					.await
					.map(|(upload, project)| json!({ "upload": upload, "project": project })),
			};
			emit_guard(outcome)
		}

		Command::WorkspacePermission {
			actor,
			workspace,
			permission,
		} => {
			let actor = resolve_actor(backend, &actor).await?;
			let allowed = authz
				.check_workspace_permission(&actor, &workspace, permission)
				.await?;
			emit(&json!({
				"workspace": workspace,
				"permission": permission.as_str(),
				"allowed": allowed,
			}))
		}
	}
}

async fn resolve_actor(backend: &SqliteBackend, args: &ActorArgs) -> anyhow::Result<Actor> {
	let Some(user_id) = args.user else {
		return Ok(Actor::anonymous());
	};
	backend
		.users
		.actor_by_id(user_id)
		.await?
		.ok_or_else(|| anyhow!("no user with id {user_id}"))
}

async fn load_project(backend: &SqliteBackend, id: &str) -> anyhow::Result<Project> {
	let project_id = ProjectId::parse(id).with_context(|| format!("'{id}' is not a project id"))?;
	match backend.projects.find_by_id(project_id).await? {
		Some(project) => Ok(project),
		None => bail!("no project with id {project_id}"),
	}
}

/// Guard decisions are results, not failures; only collaborator errors abort.
fn emit_guard(outcome: Result<serde_json::Value, AuthzError>) -> anyhow::Result<()> {
	match outcome {
		Ok(value) => emit(&json!({ "status": 200, "granted": value })),
		Err(AuthzError::Collaborator(e)) => Err(e.into()),
		Err(denial) => emit(&json!({
			"status": denial.status_code().as_u16(),
			"error": denial.to_string(),
		})),
	}
}

fn emit<T: Serialize>(value: &T) -> anyhow::Result<()> {
	println!("{}", serde_json::to_string(value)?);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use atlas_authz_core::UserId;
	use atlas_server_config::ServerConfig;
	use atlas_server_db::testing::create_test_pool;

	async fn backend() -> SqliteBackend {
		SqliteBackend::new(create_test_pool().await, &ServerConfig::default())
	}

	#[tokio::test]
	async fn missing_user_flag_means_anonymous() {
		let backend = backend().await;
		let actor = resolve_actor(&backend, &ActorArgs { user: None }).await.unwrap();
		assert!(actor.is_anonymous());
	}

	#[tokio::test]
	async fn unknown_user_is_an_error() {
		let backend = backend().await;
		let args = ActorArgs {
			user: Some(UserId::generate()),
		};
		let err = resolve_actor(&backend, &args).await.unwrap_err();
		assert!(err.to_string().contains("no user"));
	}

	#[tokio::test]
	async fn stored_user_is_resolved() {
		let backend = backend().await;
		let user = Actor::user(UserId::generate(), "alice");
		backend.users.create_user(&user).await.unwrap();
		let args = ActorArgs { user: user.user_id };
		assert_eq!(resolve_actor(&backend, &args).await.unwrap(), user);
	}

	#[tokio::test]
	async fn malformed_project_id_is_reported() {
		let backend = backend().await;
		let err = load_project(&backend, "../etc").await.unwrap_err();
		assert!(err.to_string().contains("not a project id"));
	}

	#[test]
	fn collaborator_failures_abort_guards() {
		let failure = AuthzError::Collaborator(atlas_server_authz::StoreError::Unavailable(
			"down".to_string(),
		));
		assert!(emit_guard(Err(failure)).is_err());
		assert!(emit_guard(Err(AuthzError::Forbidden)).is_ok());
	}
}
