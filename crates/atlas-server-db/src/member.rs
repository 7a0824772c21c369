// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Explicit project role grants.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};

use atlas_authz_core::{ProjectId, ProjectRole, UserId};
use atlas_server_authz::{GrantStore, StoreError};

use crate::error::DbError;
use crate::row::parse_id;

/// Repository for `project_members`. A user holds at most one role per
/// project; granting again replaces it.
#[derive(Clone)]
pub struct ProjectMemberRepository {
	pool: SqlitePool,
}

impl ProjectMemberRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id, user_id = %user_id, role = %role))]
	pub async fn grant_role(
		&self,
		project_id: ProjectId,
		user_id: UserId,
		role: ProjectRole,
	) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO project_members (project_id, user_id, role, created_at)
			VALUES (?, ?, ?, ?)
			ON CONFLICT (project_id, user_id) DO UPDATE SET role = excluded.role
			"#,
		)
		.bind(project_id.to_string())
		.bind(user_id.to_string())
		.bind(role.as_str())
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!("project role granted");
		Ok(())
	}

	/// Returns whether a grant existed.
	#[tracing::instrument(skip(self), fields(project_id = %project_id, user_id = %user_id))]
	pub async fn revoke_role(&self, project_id: ProjectId, user_id: UserId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM project_members WHERE project_id = ? AND user_id = ?")
			.bind(project_id.to_string())
			.bind(user_id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id, user_id = %user_id))]
	pub async fn get_role(
		&self,
		project_id: ProjectId,
		user_id: UserId,
	) -> Result<Option<ProjectRole>, DbError> {
		let row = sqlx::query("SELECT role FROM project_members WHERE project_id = ? AND user_id = ?")
			.bind(project_id.to_string())
			.bind(user_id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row
			.map(|r| {
				let role: String = r.get("role");
				role
					.parse::<ProjectRole>()
					.map_err(|e| DbError::Internal(e.to_string()))
			})
			.transpose()
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn list_project_ids_for_user(&self, user_id: UserId) -> Result<Vec<ProjectId>, DbError> {
		let rows = sqlx::query("SELECT project_id FROM project_members WHERE user_id = ?")
			.bind(user_id.to_string())
			.fetch_all(&self.pool)
			.await?;

		rows
			.iter()
			.map(|r| {
				let id: String = r.get("project_id");
				parse_id(&id, "project")
			})
			.collect()
	}
}

#[async_trait]
impl GrantStore for ProjectMemberRepository {
	async fn role_for(
		&self,
		project_id: ProjectId,
		user_id: UserId,
	) -> Result<Option<ProjectRole>, StoreError> {
		Ok(self.get_role(project_id, user_id).await?)
	}

	async fn project_ids_for_user(&self, user_id: UserId) -> Result<Vec<ProjectId>, StoreError> {
		Ok(self.list_project_ids_for_user(user_id).await?)
	}
}
