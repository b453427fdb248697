// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

mod bench;
mod description;

pub use bench::{BenchLimits, BenchScript, BusConfig, Step, TargetConfig};
pub use description::{AccessDescriptor, FieldDescriptor, RegFileDescriptor, RegisterDescriptor};

use anyhow::Result;

pub(crate) const SUPPORTED_SCHEMA_VERSION: &str = "1.0";

/// Default schema version for YAML configs
pub(crate) fn default_schema_version() -> String {
    SUPPORTED_SCHEMA_VERSION.to_string()
}

pub(crate) fn check_schema_version(version: &str) -> Result<()> {
    if version != SUPPORTED_SCHEMA_VERSION {
        anyhow::bail!(
            "Unsupported schema_version '{}'. Supported versions: '{}'",
            version,
            SUPPORTED_SCHEMA_VERSION
        );
    }
    Ok(())
}
