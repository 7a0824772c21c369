// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error taxonomy for authorization.
//!
//! `NotFound` and `Forbidden` are decisions. `Collaborator` wraps a failure of
//! a storage or workspace lookup and is a server fault, never a denial.

use http::StatusCode;

/// Failure reported by a collaborator (project store, grant store, workspace
/// handler, upload store).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("store unavailable: {0}")]
	Unavailable(String),

	#[error("corrupt record: {0}")]
	Corrupt(String),

	#[error("backend error: {0}")]
	Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Outcome of a guard that did not yield the requested resource.
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
	/// Absent, retired, removed, in an inactive workspace, or addressed by a
	/// malformed identifier. Deliberately carries no detail.
	#[error("Not found")]
	NotFound,

	/// The resource exists but the actor lacks the capability.
	#[error("Forbidden")]
	Forbidden,

	#[error("Collaborator failure: {0}")]
	Collaborator(#[from] StoreError),
}

impl AuthzError {
	/// Map error to HTTP status code.
	pub fn status_code(&self) -> StatusCode {
		match self {
			AuthzError::NotFound => StatusCode::NOT_FOUND,
			AuthzError::Forbidden => StatusCode::FORBIDDEN,
			AuthzError::Collaborator(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// True for `NotFound` and `Forbidden`, the terminal access decisions.
	pub fn is_denial(&self) -> bool {
		matches!(self, AuthzError::NotFound | AuthzError::Forbidden)
	}
}

pub type Result<T> = std::result::Result<T, AuthzError>;
