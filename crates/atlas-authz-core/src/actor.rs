// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The actor on whose behalf an authorization decision is made.
//!
//! Actors arrive already authenticated (or anonymous). The engine only reads
//! the flags below; it never verifies identity itself.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A request principal: an authenticated user or the anonymous visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
	/// Present iff the actor is authenticated.
	pub user_id: Option<UserId>,
	pub username: Option<String>,
	/// Deactivated accounts stay authenticated but lose every grant.
	pub active: bool,
	/// Instance administrator; see [`Actor::is_superuser`].
	pub is_admin: bool,
}

impl Actor {
	/// The unauthenticated visitor.
	pub fn anonymous() -> Self {
		Self {
			user_id: None,
			username: None,
			active: false,
			is_admin: false,
		}
	}

	/// An active, non-admin authenticated user.
	pub fn user(user_id: UserId, username: impl Into<String>) -> Self {
		Self {
			user_id: Some(user_id),
			username: Some(username.into()),
			active: true,
			is_admin: false,
		}
	}

	/// An active authenticated administrator.
	pub fn admin(user_id: UserId, username: impl Into<String>) -> Self {
		Self {
			is_admin: true,
			..Self::user(user_id, username)
		}
	}

	/// Builder: set the active flag.
	pub fn with_active(mut self, active: bool) -> Self {
		self.active = active;
		self
	}

	pub fn is_authenticated(&self) -> bool {
		self.user_id.is_some()
	}

	pub fn is_anonymous(&self) -> bool {
		!self.is_authenticated()
	}

	/// Authenticated and not deactivated.
	pub fn is_active(&self) -> bool {
		self.is_authenticated() && self.active
	}

	/// Authenticated administrator. Superusers bypass capability checks.
	pub fn is_superuser(&self) -> bool {
		self.is_authenticated() && self.is_admin
	}
}
