// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Atlas project authorization.
//!
//! This crate holds the data model the authorization engine reasons about and
//! nothing else: no storage, no policy. Everything here is plain data that can
//! be logged, serialized, and shared across threads.
//!
//! - **ID newtypes**: [`UserId`], [`ProjectId`], [`WorkspaceId`], [`UploadId`]
//! - **Roles**: [`ProjectRole`], ordered `Reader < Editor < Writer < Owner`
//! - **Workspace permissions**: [`WorkspacePermission`] names used for delegation
//! - **Entities**: [`Actor`], [`Project`], [`Workspace`], [`Upload`]

pub mod actor;
pub mod project;
pub mod types;

pub use actor::Actor;
pub use project::{Project, StorageParams, Upload, Workspace};
pub use types::{
	is_valid_uuid, ParseRoleError, ProjectId, ProjectRole, UploadId, UserId, WorkspaceId,
	WorkspacePermission,
};
