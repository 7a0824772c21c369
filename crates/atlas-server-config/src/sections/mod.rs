// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod authz;
mod database;
mod logging;

pub use authz::{AuthzConfig, AuthzConfigLayer};
pub use database::{DatabaseConfig, DatabaseConfigLayer, DEFAULT_DATABASE_URL, DEFAULT_QUERY_PAGE_SIZE};
pub use logging::{LoggingConfig, LoggingConfigLayer};
