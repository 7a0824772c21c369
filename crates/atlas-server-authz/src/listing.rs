// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Listing projects visible to an actor.

use atlas_authz_core::Actor;

use crate::authorizer::Authorizer;
use crate::error::StoreError;
use crate::filter::ReadFilterOptions;
use crate::store::ProjectStream;

impl Authorizer {
	/// Streams every project `actor` can read, as decided by
	/// [`Authorizer::build_read_filter`]. The store evaluates the filter; the
	/// engine never holds the collection.
	pub async fn list_projects(
		&self,
		actor: &Actor,
		options: ReadFilterOptions,
	) -> Result<ProjectStream, StoreError> {
		let filter = self.build_read_filter(actor, options).await?;
		Ok(self.projects.query_filtered(&filter))
	}
}
