// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Column decoding shared by the repositories.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbError;

/// Decodes a UUID stored as TEXT into one of the id newtypes.
pub(crate) fn parse_id<T: From<Uuid>>(value: &str, what: &str) -> Result<T, DbError> {
	Uuid::parse_str(value)
		.map(T::from)
		.map_err(|e| DbError::Internal(format!("Invalid {what} ID: {e}")))
}

pub(crate) fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use atlas_authz_core::ProjectId;

	#[test]
	fn bad_id_names_the_entity() {
		let err = parse_id::<ProjectId>("nope", "project").unwrap_err();
		assert!(err.to_string().contains("Invalid project ID"));
	}

	#[test]
	fn timestamps_round_trip_through_rfc3339() {
		let now = Utc::now();
		assert_eq!(parse_timestamp(&now.to_rfc3339(), "removed_at").unwrap(), now);
	}
}
