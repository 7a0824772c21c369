// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The universal precondition every capability check evaluates first.

use atlas_authz_core::{Actor, Project};

/// Whether the removal marker on a project is enforced by the gate.
///
/// Only the `include_removed` guard mode waives it; public checks always
/// enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Removal {
	Enforce,
	Waive,
}

impl Removal {
	pub(crate) fn blocks(self, project: &Project) -> bool {
		self == Removal::Enforce && project.is_removed()
	}
}

/// Returns true when `actor` may be considered for any capability on `project`:
/// the project is provisioned and not removed, and the actor is authenticated
/// and active.
pub fn base_gate(project: &Project, actor: &Actor) -> bool {
	gate(project, actor, Removal::Enforce)
}

pub(crate) fn gate(project: &Project, actor: &Actor, removal: Removal) -> bool {
	if project.is_retired() {
		return false;
	}
	if !actor.is_authenticated() || !actor.is_active() {
		return false;
	}
	!removal.blocks(project)
}

/// Public projects are readable by anyone, authenticated or not, as long as
/// they are provisioned and not removed.
pub(crate) fn is_publicly_readable(project: &Project) -> bool {
	project.public && project.is_provisioned() && !project.is_removed()
}

#[cfg(test)]
mod tests {
	use super::*;
	use atlas_authz_core::{UserId, WorkspaceId};
	use chrono::Utc;

	fn project() -> Project {
		Project::new(WorkspaceId::generate(), "survey")
	}

	fn user() -> Actor {
		Actor::user(UserId::generate(), "alice")
	}

	#[test]
	fn live_project_and_active_user_pass() {
		assert!(base_gate(&project(), &user()));
	}

	#[test]
	fn retired_project_fails() {
		assert!(!base_gate(&project().retired(), &user()));
	}

	#[test]
	fn removed_project_fails() {
		assert!(!base_gate(&project().with_removed_at(Utc::now()), &user()));
	}

	#[test]
	fn anonymous_actor_fails() {
		assert!(!base_gate(&project(), &Actor::anonymous()));
	}

	#[test]
	fn deactivated_actor_fails() {
		assert!(!base_gate(&project(), &user().with_active(false)));
	}

	#[test]
	fn admin_gets_no_special_treatment_from_the_gate() {
		let admin = Actor::admin(UserId::generate(), "root");
		assert!(!base_gate(&project().retired(), &admin));
		assert!(!base_gate(&project().with_removed_at(Utc::now()), &admin));
	}

	#[test]
	fn waiving_removal_keeps_retirement_absolute() {
		let removed = project().with_removed_at(Utc::now());
		assert!(gate(&removed, &user(), Removal::Waive));
		assert!(!gate(&removed.clone().retired(), &user(), Removal::Waive));
	}

	#[test]
	fn public_read_requires_live_project() {
		let public = project().with_public(true);
		assert!(is_publicly_readable(&public));
		assert!(!is_publicly_readable(&public.clone().retired()));
		assert!(!is_publicly_readable(&public.with_removed_at(Utc::now())));
	}
}
