// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};

use atlas_authz_core::{Upload, UploadId};
use atlas_server_authz::{StoreError, UploadStore};

use crate::error::DbError;
use crate::row::parse_id;

/// Repository for in-flight upload transactions.
#[derive(Clone)]
pub struct UploadRepository {
	pool: SqlitePool,
}

impl UploadRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, upload), fields(upload_id = %upload.id, project_id = %upload.project_id))]
	pub async fn create_upload(&self, upload: &Upload) -> Result<(), DbError> {
		sqlx::query("INSERT INTO uploads (id, project_id, user_id, created_at) VALUES (?, ?, ?, ?)")
			.bind(upload.id.to_string())
			.bind(upload.project_id.to_string())
			.bind(upload.user_id.to_string())
			.bind(Utc::now().to_rfc3339())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(upload_id = %id))]
	pub async fn get_upload(&self, id: UploadId) -> Result<Option<Upload>, DbError> {
		let row = sqlx::query("SELECT id, project_id, user_id FROM uploads WHERE id = ?")
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row
			.map(|r| {
				let id: String = r.get("id");
				let project_id: String = r.get("project_id");
				let user_id: String = r.get("user_id");
				Ok(Upload {
					id: parse_id(&id, "upload")?,
					project_id: parse_id(&project_id, "project")?,
					user_id: parse_id(&user_id, "user")?,
				})
			})
			.transpose()
	}

	/// Finish or abandon an upload.
	#[tracing::instrument(skip(self), fields(upload_id = %id))]
	pub async fn delete_upload(&self, id: UploadId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM uploads WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}
}

#[async_trait]
impl UploadStore for UploadRepository {
	async fn find_upload(&self, id: UploadId) -> Result<Option<Upload>, StoreError> {
		Ok(self.get_upload(id).await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::project::ProjectRepository;
	use crate::testing::create_test_pool;
	use crate::workspace::WorkspaceRepository;
	use atlas_authz_core::{Project, UserId, Workspace};

	#[tokio::test]
	async fn upload_lifecycle() {
		let pool = create_test_pool().await;
		let workspace = Workspace::new("acme");
		let project = Project::new(workspace.id, "survey");
		WorkspaceRepository::new(pool.clone())
			.create_workspace(&workspace)
			.await
			.unwrap();
		ProjectRepository::new(pool.clone())
			.create_project(&project)
			.await
			.unwrap();

		let repo = UploadRepository::new(pool);
		let upload = Upload {
			id: UploadId::generate(),
			project_id: project.id,
			user_id: UserId::generate(),
		};
		repo.create_upload(&upload).await.unwrap();

		assert_eq!(repo.find_upload(upload.id).await.unwrap(), Some(upload.clone()));
		assert!(repo.delete_upload(upload.id).await.unwrap());
		assert_eq!(repo.find_upload(upload.id).await.unwrap(), None);
	}
}
