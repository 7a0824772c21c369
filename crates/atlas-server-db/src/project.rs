// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Project repository.
//!
//! Filtered listings are streamed in keyset-paginated pages ordered by id, so
//! memory use is bounded by the configured page size regardless of how many
//! projects match.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use sqlx::{sqlite::SqlitePool, Row};

use atlas_authz_core::{Project, ProjectId, StorageParams, WorkspaceId};
use atlas_server_authz::{ProjectFilter, ProjectStore, ProjectStream, StoreError};
use atlas_server_config::DEFAULT_QUERY_PAGE_SIZE;

use crate::error::DbError;
use crate::filter::SqlPredicate;
use crate::row::{parse_id, parse_timestamp};

const PROJECT_COLUMNS: &str =
	"id, workspace_id, name, public, removed_at, storage_kind, storage_location";

#[derive(Clone)]
pub struct ProjectRepository {
	pool: SqlitePool,
	page_size: u32,
}

impl ProjectRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self {
			pool,
			page_size: DEFAULT_QUERY_PAGE_SIZE,
		}
	}

	/// Builder: rows fetched per page by [`ProjectStore::query_filtered`].
	pub fn with_page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size.max(1);
		self
	}

	#[tracing::instrument(skip(self, project), fields(project_id = %project.id, name = %project.name))]
	pub async fn create_project(&self, project: &Project) -> Result<(), DbError> {
		let (storage_kind, storage_location) = match &project.storage_params {
			Some(params) => (Some(params.kind.as_str()), Some(params.location.as_str())),
			None => (None, None),
		};

		sqlx::query(
			r#"
			INSERT INTO projects (id, workspace_id, name, public, removed_at, storage_kind, storage_location, created_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(project.id.to_string())
		.bind(project.workspace_id.to_string())
		.bind(&project.name)
		.bind(project.public as i32)
		.bind(project.removed_at.map(|d| d.to_rfc3339()))
		.bind(storage_kind)
		.bind(storage_location)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(project_id = %project.id, "project created");
		Ok(())
	}

	/// Get a project by id in any lifecycle state.
	#[tracing::instrument(skip(self), fields(project_id = %id))]
	pub async fn get_project_by_id(&self, id: ProjectId) -> Result<Option<Project>, DbError> {
		let row = sqlx::query(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| row_to_project(&r)).transpose()
	}

	/// Get the provisioned, not-removed project with this name.
	#[tracing::instrument(skip(self), fields(workspace_id = %workspace_id))]
	pub async fn get_live_project_by_name(
		&self,
		workspace_id: WorkspaceId,
		name: &str,
	) -> Result<Option<Project>, DbError> {
		let row = sqlx::query(&format!(
			r#"
			SELECT {PROJECT_COLUMNS}
			FROM projects
			WHERE workspace_id = ? AND name = ?
				AND storage_kind IS NOT NULL AND removed_at IS NULL
			"#
		))
		.bind(workspace_id.to_string())
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_project(&r)).transpose()
	}

	#[tracing::instrument(skip(self), fields(project_id = %id))]
	pub async fn set_public(&self, id: ProjectId, public: bool) -> Result<(), DbError> {
		let result = sqlx::query("UPDATE projects SET public = ? WHERE id = ?")
			.bind(public as i32)
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		expect_one(result.rows_affected(), id)
	}

	/// Schedule the project for removal.
	#[tracing::instrument(skip(self), fields(project_id = %id))]
	pub async fn mark_removed(&self, id: ProjectId, at: DateTime<Utc>) -> Result<(), DbError> {
		let result = sqlx::query("UPDATE projects SET removed_at = ? WHERE id = ?")
			.bind(at.to_rfc3339())
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		expect_one(result.rows_affected(), id)
	}

	/// Drop the storage parameters. Irreversible as far as authorization is
	/// concerned.
	#[tracing::instrument(skip(self), fields(project_id = %id))]
	pub async fn retire(&self, id: ProjectId) -> Result<(), DbError> {
		let result = sqlx::query(
			"UPDATE projects SET storage_kind = NULL, storage_location = NULL WHERE id = ?",
		)
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;
		expect_one(result.rows_affected(), id)?;
		tracing::info!(project_id = %id, "project retired");
		Ok(())
	}

	/// One page of projects matching `predicate`, with ids strictly after
	/// `after`.
	pub async fn fetch_page(
		&self,
		predicate: &SqlPredicate,
		after: Option<ProjectId>,
		limit: u32,
	) -> Result<Vec<Project>, DbError> {
		fetch_page(&self.pool, predicate, after, limit).await
	}
}

async fn fetch_page(
	pool: &SqlitePool,
	predicate: &SqlPredicate,
	after: Option<ProjectId>,
	limit: u32,
) -> Result<Vec<Project>, DbError> {
	let sql = format!(
		"SELECT {PROJECT_COLUMNS} FROM projects WHERE {} AND id > ? ORDER BY id LIMIT ?",
		predicate.clause
	);
	let mut query = sqlx::query(&sql);
	for value in &predicate.binds {
		query = query.bind(value);
	}
	let rows = query
		.bind(after.map(|id| id.to_string()).unwrap_or_default())
		.bind(i64::from(limit))
		.fetch_all(pool)
		.await?;

	rows.iter().map(row_to_project).collect()
}

fn expect_one(rows_affected: u64, id: ProjectId) -> Result<(), DbError> {
	if rows_affected == 0 {
		return Err(DbError::NotFound(format!("project {id}")));
	}
	Ok(())
}

fn row_to_project(row: &sqlx::sqlite::SqliteRow) -> Result<Project, DbError> {
	let id: String = row.get("id");
	let workspace_id: String = row.get("workspace_id");
	let public: i32 = row.get("public");
	let removed_at: Option<String> = row.get("removed_at");
	let storage_kind: Option<String> = row.get("storage_kind");
	let storage_location: Option<String> = row.get("storage_location");

	Ok(Project {
		id: parse_id(&id, "project")?,
		workspace_id: parse_id(&workspace_id, "workspace")?,
		name: row.get("name"),
		public: public != 0,
		removed_at: removed_at
			.map(|d| parse_timestamp(&d, "removed_at"))
			.transpose()?,
		storage_params: storage_kind.map(|kind| StorageParams {
			kind,
			location: storage_location.unwrap_or_default(),
		}),
	})
}

struct Cursor {
	pool: SqlitePool,
	predicate: SqlPredicate,
	after: Option<ProjectId>,
	page_size: u32,
	exhausted: bool,
}

#[async_trait]
impl ProjectStore for ProjectRepository {
	async fn find_by_name_in_workspace(
		&self,
		workspace_id: WorkspaceId,
		name: &str,
	) -> Result<Option<Project>, StoreError> {
		Ok(self.get_live_project_by_name(workspace_id, name).await?)
	}

	async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
		Ok(self.get_project_by_id(id).await?)
	}

	fn query_filtered(&self, filter: &ProjectFilter) -> ProjectStream {
		let cursor = Cursor {
			pool: self.pool.clone(),
			predicate: SqlPredicate::compile(filter),
			after: None,
			page_size: self.page_size,
			exhausted: false,
		};

		stream::try_unfold(cursor, |mut cursor| async move {
			if cursor.exhausted {
				return Ok::<_, StoreError>(None);
			}
			let page = fetch_page(
				&cursor.pool,
				&cursor.predicate,
				cursor.after,
				cursor.page_size,
			)
			.await
			.map_err(StoreError::from)?;

			if page.is_empty() {
				return Ok(None);
			}
			cursor.exhausted = page.len() < cursor.page_size as usize;
			cursor.after = page.last().map(|p| p.id);
			tracing::trace!(rows = page.len(), "fetched project page");
			Ok(Some((page, cursor)))
		})
		.map_ok(|page| stream::iter(page.into_iter().map(Ok::<Project, StoreError>)))
		.try_flatten()
		.boxed()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_test_pool;
	use crate::workspace::WorkspaceRepository;
	use atlas_authz_core::Workspace;
	use proptest::prelude::*;
	use std::collections::BTreeSet;

	async fn setup() -> (ProjectRepository, Workspace) {
		let pool = create_test_pool().await;
		let workspace = Workspace::new("acme");
		WorkspaceRepository::new(pool.clone())
			.create_workspace(&workspace)
			.await
			.unwrap();
		(ProjectRepository::new(pool), workspace)
	}

	#[tokio::test]
	async fn project_round_trips() {
		let (repo, workspace) = setup().await;
		let project = Project::new(workspace.id, "survey")
			.with_public(true)
			.with_removed_at(Utc::now());
		repo.create_project(&project).await.unwrap();

		let loaded = repo.get_project_by_id(project.id).await.unwrap().unwrap();
		assert_eq!(loaded.id, project.id);
		assert_eq!(loaded.storage_params, project.storage_params);
		assert!(loaded.public);
		assert!(loaded.is_removed());
	}

	#[tokio::test]
	async fn name_lookup_skips_removed_and_retired() {
		let (repo, workspace) = setup().await;
		let live = Project::new(workspace.id, "live");
		let removed = Project::new(workspace.id, "removed").with_removed_at(Utc::now());
		let retired = Project::new(workspace.id, "retired").retired();
		for p in [&live, &removed, &retired] {
			repo.create_project(p).await.unwrap();
		}

		assert!(repo
			.get_live_project_by_name(workspace.id, "live")
			.await
			.unwrap()
			.is_some());
		assert!(repo
			.get_live_project_by_name(workspace.id, "removed")
			.await
			.unwrap()
			.is_none());
		assert!(repo
			.get_live_project_by_name(workspace.id, "retired")
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn retire_and_remove_update_lifecycle() {
		let (repo, workspace) = setup().await;
		let project = Project::new(workspace.id, "survey");
		repo.create_project(&project).await.unwrap();

		repo.mark_removed(project.id, Utc::now()).await.unwrap();
		repo.retire(project.id).await.unwrap();
		let loaded = repo.get_project_by_id(project.id).await.unwrap().unwrap();
		assert!(loaded.is_removed());
		assert!(loaded.is_retired());

		let missing = repo.retire(ProjectId::generate()).await;
		assert!(matches!(missing, Err(DbError::NotFound(_))));
	}

	#[tokio::test]
	async fn stream_pages_through_every_match() {
		let (repo, workspace) = setup().await;
		let repo = repo.with_page_size(3);
		let mut expected = BTreeSet::new();
		for i in 0..10 {
			let project = Project::new(workspace.id, format!("p{i}")).with_public(i % 2 == 0);
			repo.create_project(&project).await.unwrap();
			if project.public {
				expected.insert(project.id);
			}
		}

		let ids: Vec<ProjectId> = repo
			.query_filtered(&ProjectFilter::Public)
			.map_ok(|p| p.id)
			.try_collect()
			.await
			.unwrap();
		assert_eq!(ids.len(), expected.len());
		assert_eq!(ids.into_iter().collect::<BTreeSet<_>>(), expected);
	}

	#[tokio::test]
	async fn stream_is_lazy_and_restartable() {
		let (repo, workspace) = setup().await;
		let stream = repo.query_filtered(&ProjectFilter::Provisioned);
		repo.create_project(&Project::new(workspace.id, "late"))
			.await
			.unwrap();

		let first: Vec<Project> = stream.try_collect().await.unwrap();
		assert_eq!(first.len(), 1);
		let second: Vec<Project> = repo
			.query_filtered(&ProjectFilter::Provisioned)
			.try_collect()
			.await
			.unwrap();
		assert_eq!(second.len(), 1);
	}

	fn leaf() -> impl Strategy<Value = usize> {
		0usize..5
	}

	proptest! {
		#![proptest_config(ProptestConfig::with_cases(32))]

		#[test]
		fn sql_predicate_agrees_with_in_memory_matching(
			flags in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 1..8),
			picks in prop::collection::vec(leaf(), 1..4),
			use_or in any::<bool>(),
		) {
			let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
			runtime.block_on(async {
				let (repo, workspace) = setup().await;
				let mut projects = Vec::new();
				for (i, (public, removed, retired)) in flags.iter().enumerate() {
					let mut project = Project::new(workspace.id, format!("p{i}")).with_public(*public);
					if *removed {
						project = project.with_removed_at(Utc::now());
					}
					if *retired {
						project = project.retired();
					}
					repo.create_project(&project).await.unwrap();
					projects.push(project);
				}

				let leaves: Vec<ProjectFilter> = picks
					.iter()
					.map(|pick| match pick {
						0 => ProjectFilter::Provisioned,
						1 => ProjectFilter::NotRemoved,
						2 => ProjectFilter::Public,
						3 => ProjectFilter::WorkspaceIn([workspace.id].into_iter().collect()),
						_ => ProjectFilter::IdIn([projects[0].id].into_iter().collect()),
					})
					.collect();
				let filter = if use_or {
					ProjectFilter::Or(leaves)
				} else {
					ProjectFilter::And(leaves)
				};

				let from_sql: BTreeSet<ProjectId> = repo
					.query_filtered(&filter)
					.map_ok(|p| p.id)
					.try_collect()
					.await
					.unwrap();
				let in_memory: BTreeSet<ProjectId> = projects
					.iter()
					.filter(|p| filter.matches(p))
					.map(|p| p.id)
					.collect();
				prop_assert_eq!(from_sql, in_memory);
				Ok(())
			})?;
		}
	}
}
