// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import configuration.

use crate::materials::MaterialStrategy;

/// Options for one import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportConfig {
    /// Material binding strategy.
    pub materials: MaterialStrategy,
    /// Decode city objects on the rayon pool.
    pub parallel: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            materials: MaterialStrategy::default(),
            parallel: true,
        }
    }
}

impl ImportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Absent or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            materials: std::env::var("CITYJSON_MATERIALS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            parallel: std::env::var("CITYJSON_PARALLEL")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }

    pub fn with_materials(mut self, materials: MaterialStrategy) -> Self {
        self.materials = materials;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
