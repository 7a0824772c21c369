// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization engine configuration.

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthzConfig {
	/// Log guard denials at `info` instead of `debug`.
	pub log_denials: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthzConfigLayer {
	#[serde(default)]
	pub log_denials: Option<bool>,
}

impl AuthzConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.log_denials.is_some() {
			self.log_denials = other.log_denials;
		}
	}

	pub fn finalize(self) -> AuthzConfig {
		AuthzConfig {
			log_denials: self.log_denials.unwrap_or(false),
		}
	}
}
