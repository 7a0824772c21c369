// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use atlas_server_authz::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for StoreError {
	fn from(err: DbError) -> Self {
		match err {
			DbError::Sqlx(
				e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)),
			) => StoreError::Unavailable(e.to_string()),
			DbError::Internal(message) => StoreError::Corrupt(message),
			other => StoreError::Backend(Box::new(other)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pool_exhaustion_is_unavailable() {
		let err: StoreError = DbError::Sqlx(sqlx::Error::PoolTimedOut).into();
		assert!(matches!(err, StoreError::Unavailable(_)));
	}

	#[test]
	fn bad_rows_are_corrupt() {
		let err: StoreError = DbError::Internal("Invalid project ID".to_string()).into();
		assert!(matches!(err, StoreError::Corrupt(m) if m.contains("project")));
	}

	#[test]
	fn other_failures_keep_their_source() {
		let err: StoreError = DbError::Conflict("duplicate name".to_string()).into();
		assert!(matches!(err, StoreError::Backend(_)));
		assert!(err.to_string().contains("duplicate name"));
	}
}
