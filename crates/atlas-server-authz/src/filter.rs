// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Declarative project filters.
//!
//! A [`ProjectFilter`] is the collection-level counterpart of
//! [`crate::Capability::Read`]. The engine builds it once per request (see
//! [`crate::Authorizer::build_read_filter`]); storage backends evaluate it,
//! either through [`ProjectFilter::matches`] or by compiling it to their own
//! query language.

use std::collections::BTreeSet;

use atlas_authz_core::{Project, ProjectId, WorkspaceId};
use serde::Serialize;

/// Boolean expression over a single project record.
///
/// `And(vec![])` matches everything and `Or(vec![])` matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectFilter {
	/// Storage parameters are present.
	Provisioned,
	/// No removal is scheduled.
	NotRemoved,
	Public,
	WorkspaceIn(BTreeSet<WorkspaceId>),
	IdIn(BTreeSet<ProjectId>),
	And(Vec<ProjectFilter>),
	Or(Vec<ProjectFilter>),
}

impl ProjectFilter {
	/// Provisioned and not removed.
	pub fn live() -> Self {
		ProjectFilter::And(vec![ProjectFilter::Provisioned, ProjectFilter::NotRemoved])
	}

	pub fn matches(&self, project: &Project) -> bool {
		match self {
			ProjectFilter::Provisioned => project.is_provisioned(),
			ProjectFilter::NotRemoved => !project.is_removed(),
			ProjectFilter::Public => project.public,
			ProjectFilter::WorkspaceIn(ids) => ids.contains(&project.workspace_id),
			ProjectFilter::IdIn(ids) => ids.contains(&project.id),
			ProjectFilter::And(filters) => filters.iter().all(|f| f.matches(project)),
			ProjectFilter::Or(filters) => filters.iter().any(|f| f.matches(project)),
		}
	}
}

/// Caller-selected listing modes for [`crate::Authorizer::build_read_filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadFilterOptions {
	/// Let superusers see every provisioned project, removed ones included.
	pub as_admin: bool,
	/// Include public projects the actor has no other access to. Ignored for
	/// anonymous and deactivated actors, who only ever see public projects.
	pub public: bool,
}

impl Default for ReadFilterOptions {
	fn default() -> Self {
		Self {
			as_admin: true,
			public: true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;

	fn project() -> Project {
		Project::new(WorkspaceId::generate(), "survey")
	}

	#[test]
	fn empty_and_matches_everything() {
		assert!(ProjectFilter::And(vec![]).matches(&project()));
	}

	#[test]
	fn empty_or_matches_nothing() {
		assert!(!ProjectFilter::Or(vec![]).matches(&project()));
	}

	#[test]
	fn live_excludes_removed_and_retired() {
		let live = ProjectFilter::live();
		assert!(live.matches(&project()));
		assert!(!live.matches(&project().retired()));
		assert!(!live.matches(&project().with_removed_at(Utc::now())));
	}

	#[test]
	fn membership_filters() {
		let p = project();
		let by_ws = ProjectFilter::WorkspaceIn(BTreeSet::from([p.workspace_id]));
		let by_id = ProjectFilter::IdIn(BTreeSet::from([p.id]));
		assert!(by_ws.matches(&p));
		assert!(by_id.matches(&p));
		assert!(!by_id.matches(&project()));
		assert!(!ProjectFilter::WorkspaceIn(BTreeSet::new()).matches(&p));
	}

	#[test]
	fn default_options_match_listing_defaults() {
		let options = ReadFilterOptions::default();
		assert!(options.as_admin);
		assert!(options.public);
	}
}
