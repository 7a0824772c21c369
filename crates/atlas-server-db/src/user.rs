// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User accounts, materialized as [`Actor`]s.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};

use atlas_authz_core::{Actor, UserId};
use atlas_server_authz::{ActorStore, StoreError};

use crate::error::DbError;
use crate::row::parse_id;

#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Stores an authenticated actor as a user account.
	#[tracing::instrument(skip(self, actor), fields(user_id = ?actor.user_id))]
	pub async fn create_user(&self, actor: &Actor) -> Result<(), DbError> {
		let (Some(user_id), Some(username)) = (actor.user_id, actor.username.as_deref()) else {
			return Err(DbError::Internal(
				"anonymous actor cannot be stored".to_string(),
			));
		};

		sqlx::query(
			r#"
			INSERT INTO users (id, username, is_active, is_admin, created_at)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(user_id.to_string())
		.bind(username)
		.bind(actor.active as i32)
		.bind(actor.is_admin as i32)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!("user created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn set_active(&self, id: UserId, active: bool) -> Result<(), DbError> {
		let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
			.bind(active as i32)
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("user {id}")));
		}
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: UserId) -> Result<Option<Actor>, DbError> {
		let row = sqlx::query("SELECT id, username, is_active, is_admin FROM users WHERE id = ?")
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;
		row.map(|r| row_to_actor(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_user_by_username(&self, username: &str) -> Result<Option<Actor>, DbError> {
		let row = sqlx::query("SELECT id, username, is_active, is_admin FROM users WHERE username = ?")
			.bind(username)
			.fetch_optional(&self.pool)
			.await?;
		row.map(|r| row_to_actor(&r)).transpose()
	}
}

fn row_to_actor(row: &sqlx::sqlite::SqliteRow) -> Result<Actor, DbError> {
	let id: String = row.get("id");
	let username: String = row.get("username");
	let is_active: i32 = row.get("is_active");
	let is_admin: i32 = row.get("is_admin");

	Ok(Actor {
		user_id: Some(parse_id(&id, "user")?),
		username: Some(username),
		active: is_active != 0,
		is_admin: is_admin != 0,
	})
}

#[async_trait]
impl ActorStore for UserRepository {
	async fn actor_by_id(&self, id: UserId) -> Result<Option<Actor>, StoreError> {
		Ok(self.get_user_by_id(id).await?)
	}
}
