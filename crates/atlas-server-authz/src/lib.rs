// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization engine for Atlas projects.
//!
//! Decides whether an [`Actor`] may exercise a [`Capability`] on a [`Project`],
//! and expresses the same read decision as a declarative [`ProjectFilter`]
//! that a storage backend evaluates over the whole collection.
//!
//! # Evaluation order
//!
//! ```text
//! check(capability, project, actor)
//!   │
//!   ├── retired project ──────────────────────────────▶ deny
//!   ├── superuser ────────────────────────────────────▶ allow
//!   ├── public read (Read only) ──────────────────────▶ allow
//!   ├── base gate (authenticated, active, not removed) ─ deny on failure
//!   ├── explicit grant satisfies the capability's role ▶ allow
//!   └── workspace delegates the capability's permission ▶ allow / deny
//! ```
//!
//! Collaborator failures are never decisions: they surface as
//! [`StoreError`] / [`AuthzError::Collaborator`] and must not be reported as
//! `Forbidden`.

pub mod authorizer;
pub mod capability;
pub mod error;
pub mod filter;
pub mod gate;
pub mod guard;
pub mod listing;
pub mod resolver;
pub mod store;
pub mod testing;

pub use atlas_authz_core::{
	Actor, Project, ProjectId, ProjectRole, Upload, UserId, Workspace, WorkspaceId,
	WorkspacePermission,
};
pub use authorizer::Authorizer;
pub use capability::{Capability, CapabilityRule, RoleRequirement};
pub use error::{AuthzError, Result, StoreError};
pub use filter::{ProjectFilter, ReadFilterOptions};
pub use gate::base_gate;
pub use guard::is_active_workspace;
pub use resolver::ROLE_LADDER;
pub use store::{ActorStore, GrantStore, ProjectStore, ProjectStream, UploadStore, WorkspaceHandler};
