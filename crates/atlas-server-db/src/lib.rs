// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for the authorization engine.
//!
//! Each repository implements one collaborator trait from
//! `atlas-server-authz`; [`SqliteBackend`] wires them into an
//! [`Authorizer`].

pub mod error;
pub mod filter;
pub mod member;
pub mod pool;
pub mod project;
mod row;
pub mod testing;
pub mod upload;
pub mod user;
pub mod workspace;

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;

use atlas_server_authz::Authorizer;
use atlas_server_config::ServerConfig;

pub use error::{DbError, Result};
pub use filter::SqlPredicate;
pub use member::ProjectMemberRepository;
pub use pool::{create_pool, run_migrations};
pub use project::ProjectRepository;
pub use upload::UploadRepository;
pub use user::UserRepository;
pub use workspace::WorkspaceRepository;

/// All repositories over one pool.
#[derive(Clone)]
pub struct SqliteBackend {
	pub projects: ProjectRepository,
	pub members: ProjectMemberRepository,
	pub workspaces: WorkspaceRepository,
	pub uploads: UploadRepository,
	pub users: UserRepository,
}

impl SqliteBackend {
	pub fn new(pool: SqlitePool, config: &ServerConfig) -> Self {
		Self {
			projects: ProjectRepository::new(pool.clone())
				.with_page_size(config.database.query_page_size),
			members: ProjectMemberRepository::new(pool.clone()),
			workspaces: WorkspaceRepository::new(pool.clone()),
			uploads: UploadRepository::new(pool.clone()),
			users: UserRepository::new(pool),
		}
	}

	/// Opens the configured database, applies the schema, and returns the
	/// backend.
	pub async fn connect(config: &ServerConfig) -> Result<Self> {
		let pool = create_pool(&config.database.url).await?;
		run_migrations(&pool).await?;
		Ok(Self::new(pool, config))
	}

	pub fn authorizer(&self, config: &ServerConfig) -> Authorizer {
		Authorizer::new(
			Arc::new(self.projects.clone()),
			Arc::new(self.members.clone()),
			Arc::new(self.workspaces.clone()),
			Arc::new(self.uploads.clone()),
		)
		.with_config(config.authz.clone())
	}
}
