// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Workspaces and their permission table.
//!
//! A user is a member of a workspace when they hold at least one permission
//! row there.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};

use atlas_authz_core::{Actor, UserId, Workspace, WorkspaceId, WorkspacePermission};
use atlas_server_authz::{StoreError, WorkspaceHandler};

use crate::error::DbError;
use crate::row::parse_id;

#[derive(Clone)]
pub struct WorkspaceRepository {
	pool: SqlitePool,
}

impl WorkspaceRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, workspace), fields(workspace_id = %workspace.id, name = %workspace.name))]
	pub async fn create_workspace(&self, workspace: &Workspace) -> Result<(), DbError> {
		sqlx::query("INSERT INTO workspaces (id, name, is_active, created_at) VALUES (?, ?, ?, ?)")
			.bind(workspace.id.to_string())
			.bind(&workspace.name)
			.bind(workspace.is_active as i32)
			.bind(Utc::now().to_rfc3339())
			.execute(&self.pool)
			.await
			.map_err(|e| match e {
				sqlx::Error::Database(db) if db.is_unique_violation() => {
					DbError::Conflict(format!("workspace name '{}' taken", workspace.name))
				}
				other => DbError::Sqlx(other),
			})?;

		tracing::debug!("workspace created");
		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_workspace_by_name(&self, name: &str) -> Result<Option<Workspace>, DbError> {
		let row = sqlx::query("SELECT id, name, is_active FROM workspaces WHERE name = ?")
			.bind(name)
			.fetch_optional(&self.pool)
			.await?;
		row.map(|r| row_to_workspace(&r)).transpose()
	}

	#[tracing::instrument(skip(self), fields(workspace_id = %id))]
	pub async fn get_workspace_by_id(&self, id: WorkspaceId) -> Result<Option<Workspace>, DbError> {
		let row = sqlx::query("SELECT id, name, is_active FROM workspaces WHERE id = ?")
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;
		row.map(|r| row_to_workspace(&r)).transpose()
	}

	#[tracing::instrument(skip(self), fields(workspace_id = %id))]
	pub async fn set_active(&self, id: WorkspaceId, is_active: bool) -> Result<(), DbError> {
		let result = sqlx::query("UPDATE workspaces SET is_active = ? WHERE id = ?")
			.bind(is_active as i32)
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("workspace {id}")));
		}
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(workspace_id = %workspace_id, user_id = %user_id, permission = %permission))]
	pub async fn grant_permission(
		&self,
		workspace_id: WorkspaceId,
		user_id: UserId,
		permission: WorkspacePermission,
	) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT OR IGNORE INTO workspace_permissions (workspace_id, user_id, permission)
			VALUES (?, ?, ?)
			"#,
		)
		.bind(workspace_id.to_string())
		.bind(user_id.to_string())
		.bind(permission.as_str())
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(workspace_id = %workspace_id, user_id = %user_id, permission = %permission))]
	pub async fn revoke_permission(
		&self,
		workspace_id: WorkspaceId,
		user_id: UserId,
		permission: WorkspacePermission,
	) -> Result<bool, DbError> {
		let result = sqlx::query(
			"DELETE FROM workspace_permissions WHERE workspace_id = ? AND user_id = ? AND permission = ?",
		)
		.bind(workspace_id.to_string())
		.bind(user_id.to_string())
		.bind(permission.as_str())
		.execute(&self.pool)
		.await?;
		Ok(result.rows_affected() > 0)
	}

	#[tracing::instrument(skip(self), fields(workspace_id = %workspace_id, user_id = %user_id))]
	pub async fn has_permission(
		&self,
		workspace_id: WorkspaceId,
		user_id: UserId,
		permission: WorkspacePermission,
	) -> Result<bool, DbError> {
		let held: Vec<String> = sqlx::query_scalar(
			r#"
			SELECT permission FROM workspace_permissions
			WHERE workspace_id = ? AND user_id = ?
			"#,
		)
		.bind(workspace_id.to_string())
		.bind(user_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		let mut granted = false;
		for name in held {
			let held: WorkspacePermission = name
				.parse()
				.map_err(|e: String| DbError::Internal(format!("invalid workspace permission: {e}")))?;
			granted |= held.includes(permission);
		}
		Ok(granted)
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn list_workspaces_for_user(
		&self,
		user_id: UserId,
		active_only: bool,
	) -> Result<Vec<Workspace>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT DISTINCT w.id, w.name, w.is_active
			FROM workspaces w
			JOIN workspace_permissions p ON p.workspace_id = w.id
			WHERE p.user_id = ? AND (? = 0 OR w.is_active = 1)
			ORDER BY w.name
			"#,
		)
		.bind(user_id.to_string())
		.bind(active_only as i32)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_workspace).collect()
	}
}

fn row_to_workspace(row: &sqlx::sqlite::SqliteRow) -> Result<Workspace, DbError> {
	let id: String = row.get("id");
	let is_active: i32 = row.get("is_active");
	Ok(Workspace {
		id: parse_id(&id, "workspace")?,
		name: row.get("name"),
		is_active: is_active != 0,
	})
}

#[async_trait]
impl WorkspaceHandler for WorkspaceRepository {
	async fn get_by_name(&self, name: &str) -> Result<Option<Workspace>, StoreError> {
		Ok(self.get_workspace_by_name(name).await?)
	}

	async fn get_by_id(&self, id: WorkspaceId) -> Result<Option<Workspace>, StoreError> {
		Ok(self.get_workspace_by_id(id).await?)
	}

	async fn list_user_workspaces(
		&self,
		actor: &Actor,
		active_only: bool,
	) -> Result<Vec<Workspace>, StoreError> {
		match actor.user_id {
			Some(user_id) => Ok(self.list_workspaces_for_user(user_id, active_only).await?),
			None => Ok(Vec::new()),
		}
	}

	async fn user_has_permission(
		&self,
		workspace: &Workspace,
		actor: &Actor,
		permission: WorkspacePermission,
	) -> Result<bool, StoreError> {
		match actor.user_id {
			Some(user_id) => Ok(self.has_permission(workspace.id, user_id, permission).await?),
			None => Ok(false),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_test_pool;

	#[tokio::test]
	async fn workspace_lookup_by_name_and_id() {
		let repo = WorkspaceRepository::new(create_test_pool().await);
		let workspace = Workspace::new("acme");
		repo.create_workspace(&workspace).await.unwrap();

		assert_eq!(repo.get_by_name("acme").await.unwrap(), Some(workspace.clone()));
		assert_eq!(repo.get_by_id(workspace.id).await.unwrap(), Some(workspace));
		assert_eq!(repo.get_by_name("other").await.unwrap(), None);
	}

	#[tokio::test]
	async fn duplicate_name_conflicts() {
		let repo = WorkspaceRepository::new(create_test_pool().await);
		repo.create_workspace(&Workspace::new("acme")).await.unwrap();
		let result = repo.create_workspace(&Workspace::new("acme")).await;
		assert!(matches!(result, Err(DbError::Conflict(_))));
	}

	#[tokio::test]
	async fn held_permission_answers_for_weaker_ones() {
		let repo = WorkspaceRepository::new(create_test_pool().await);
		let workspace = Workspace::new("acme");
		repo.create_workspace(&workspace).await.unwrap();
		let actor = Actor::user(UserId::generate(), "alice");
		let user_id = actor.user_id.unwrap();

		repo.grant_permission(workspace.id, user_id, WorkspacePermission::Write)
			.await
			.unwrap();

		for permission in [
			WorkspacePermission::Read,
			WorkspacePermission::Edit,
			WorkspacePermission::Write,
		] {
			assert!(repo
				.user_has_permission(&workspace, &actor, permission)
				.await
				.unwrap());
		}
		assert!(!repo
			.user_has_permission(&workspace, &actor, WorkspacePermission::Admin)
			.await
			.unwrap());
		assert!(!repo
			.user_has_permission(&workspace, &Actor::anonymous(), WorkspacePermission::Write)
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn membership_listing_honors_active_only() {
		let repo = WorkspaceRepository::new(create_test_pool().await);
		let active = Workspace::new("active");
		let dormant = Workspace::new("dormant").with_active(false);
		let foreign = Workspace::new("foreign");
		for w in [&active, &dormant, &foreign] {
			repo.create_workspace(w).await.unwrap();
		}
		let actor = Actor::user(UserId::generate(), "alice");
		let user_id = actor.user_id.unwrap();
		repo.grant_permission(active.id, user_id, WorkspacePermission::Read)
			.await
			.unwrap();
		repo.grant_permission(active.id, user_id, WorkspacePermission::Edit)
			.await
			.unwrap();
		repo.grant_permission(dormant.id, user_id, WorkspacePermission::Read)
			.await
			.unwrap();

		let all = repo.list_user_workspaces(&actor, false).await.unwrap();
		assert_eq!(all, vec![active.clone(), dormant]);
		let live = repo.list_user_workspaces(&actor, true).await.unwrap();
		assert_eq!(live, vec![active]);
		assert!(repo
			.list_user_workspaces(&Actor::anonymous(), false)
			.await
			.unwrap()
			.is_empty());
	}

	#[tokio::test]
	async fn revoke_and_deactivate() {
		let repo = WorkspaceRepository::new(create_test_pool().await);
		let workspace = Workspace::new("acme");
		repo.create_workspace(&workspace).await.unwrap();
		let user_id = UserId::generate();
		repo.grant_permission(workspace.id, user_id, WorkspacePermission::Admin)
			.await
			.unwrap();

		assert!(repo
			.revoke_permission(workspace.id, user_id, WorkspacePermission::Admin)
			.await
			.unwrap());
		repo.set_active(workspace.id, false).await.unwrap();
		let loaded = repo.get_workspace_by_id(workspace.id).await.unwrap().unwrap();
		assert!(!loaded.is_active);
		assert!(matches!(
			repo.set_active(WorkspaceId::generate(), true).await,
			Err(DbError::NotFound(_))
		));
	}
}
