// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Translation of [`ProjectFilter`] into a SQL `WHERE` fragment over the
//! `projects` table.
//!
//! Id sets are bound once as a JSON array and expanded with `json_each`, so
//! the number of bind variables does not grow with the number of grants.

use atlas_server_authz::ProjectFilter;

/// A `WHERE` fragment with positional `?` placeholders and their values, in
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlPredicate {
	pub clause: String,
	pub binds: Vec<String>,
}

impl SqlPredicate {
	pub fn compile(filter: &ProjectFilter) -> Self {
		let mut binds = Vec::new();
		let clause = compile_into(filter, &mut binds);
		Self { clause, binds }
	}
}

fn compile_into(filter: &ProjectFilter, binds: &mut Vec<String>) -> String {
	match filter {
		ProjectFilter::Provisioned => "storage_kind IS NOT NULL".to_string(),
		ProjectFilter::NotRemoved => "removed_at IS NULL".to_string(),
		ProjectFilter::Public => "public = 1".to_string(),
		ProjectFilter::WorkspaceIn(ids) => {
			in_list("workspace_id", ids.iter().map(ToString::to_string), binds)
		}
		ProjectFilter::IdIn(ids) => in_list("id", ids.iter().map(ToString::to_string), binds),
		ProjectFilter::And(parts) => join(parts, " AND ", "1", binds),
		ProjectFilter::Or(parts) => join(parts, " OR ", "0", binds),
	}
}

fn in_list(
	column: &str,
	values: impl ExactSizeIterator<Item = String>,
	binds: &mut Vec<String>,
) -> String {
	if values.len() == 0 {
		return "0".to_string();
	}
	let array = serde_json::Value::Array(values.map(serde_json::Value::String).collect());
	binds.push(array.to_string());
	format!("{column} IN (SELECT value FROM json_each(?))")
}

fn join(parts: &[ProjectFilter], separator: &str, empty: &str, binds: &mut Vec<String>) -> String {
	if parts.is_empty() {
		return empty.to_string();
	}
	let clauses: Vec<String> = parts.iter().map(|p| compile_into(p, binds)).collect();
	format!("({})", clauses.join(separator))
}

#[cfg(test)]
mod tests {
	use super::*;
	use atlas_authz_core::{ProjectId, WorkspaceId};
	use std::collections::BTreeSet;

	#[test]
	fn leaves_compile_to_columns() {
		assert_eq!(
			SqlPredicate::compile(&ProjectFilter::Provisioned).clause,
			"storage_kind IS NOT NULL"
		);
		assert_eq!(
			SqlPredicate::compile(&ProjectFilter::NotRemoved).clause,
			"removed_at IS NULL"
		);
		assert_eq!(SqlPredicate::compile(&ProjectFilter::Public).clause, "public = 1");
	}

	#[test]
	fn empty_sets_and_groups_are_constants() {
		assert_eq!(
			SqlPredicate::compile(&ProjectFilter::IdIn(BTreeSet::new())).clause,
			"0"
		);
		assert_eq!(SqlPredicate::compile(&ProjectFilter::And(vec![])).clause, "1");
		assert_eq!(SqlPredicate::compile(&ProjectFilter::Or(vec![])).clause, "0");
	}

	#[test]
	fn binds_follow_placeholder_order() {
		let ws = WorkspaceId::generate();
		let a = ProjectId::generate();
		let b = ProjectId::generate();
		let filter = ProjectFilter::And(vec![
			ProjectFilter::Provisioned,
			ProjectFilter::Or(vec![
				ProjectFilter::WorkspaceIn([ws].into_iter().collect()),
				ProjectFilter::IdIn([a, b].into_iter().collect()),
			]),
		]);

		let predicate = SqlPredicate::compile(&filter);
		assert_eq!(
			predicate.clause,
			"(storage_kind IS NOT NULL AND (workspace_id IN (SELECT value FROM json_each(?)) \
			 OR id IN (SELECT value FROM json_each(?))))"
		);
		let mut ids = [a, b];
		ids.sort();
		assert_eq!(
			predicate.binds,
			vec![
				format!("[\"{ws}\"]"),
				format!("[\"{}\",\"{}\"]", ids[0], ids[1]),
			]
		);
	}

	#[test]
	fn large_id_sets_use_one_bind() {
		let ids: BTreeSet<ProjectId> = (0..40_000).map(|_| ProjectId::generate()).collect();
		let predicate = SqlPredicate::compile(&ProjectFilter::IdIn(ids));
		assert_eq!(predicate.binds.len(), 1);
	}
}
