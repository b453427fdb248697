// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::check_schema_version;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_clock_period_ns() -> u64 {
    10
}

fn default_address_width() -> u32 {
    32
}

fn default_data_width() -> u32 {
    32
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    #[serde(default = "default_address_width")]
    pub address_width: u32,
    #[serde(default = "default_data_width")]
    pub data_width: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            address_width: default_address_width(),
            data_width: default_data_width(),
        }
    }
}

/// Behavior of the simulated register-file slave.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Cycles the target holds `pready` low before completing an access.
    #[serde(default)]
    pub wait_states: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BenchLimits {
    pub max_cycles: u64,
    /// Cycles the driver waits for `pready` before failing a transaction.
    #[serde(default)]
    pub ready_timeout_cycles: Option<u64>,
}

/// One action of a bench script.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Queue a bus write of `value` into the field.
    Write { field: String, value: u64 },
    /// Queue a bus read of the field.
    Read { field: String },
    /// Drive the field's `_hw_next` input.
    HwNext { field: String, value: u64 },
    /// Drive the field's `_hw_we` input.
    HwWe { field: String, value: bool },
    /// Clock until every queued transaction has completed.
    Idle,
    /// Clock a fixed number of cycles.
    Wait { cycles: u64 },
    /// Compare the last observed read of the field.
    Expect { field: String, value: u64 },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BenchScript {
    pub schema_version: String,
    /// Register file description, relative to the script's directory.
    pub description: String,
    #[serde(default = "default_clock_period_ns")]
    pub clock_period_ns: u64,
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub target: TargetConfig,
    pub limits: BenchLimits,
    pub steps: Vec<Step>,
}

impl BenchScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open bench script at {:?}", path.as_ref()))?;
        let script: Self =
            serde_yaml::from_reader(f).context("Failed to parse Bench Script YAML")?;
        script.validate()?;
        Ok(script)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let script: Self = serde_yaml::from_str(yaml).context("Failed to parse Bench Script YAML")?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        check_schema_version(&self.schema_version)?;

        if self.description.trim().is_empty() {
            anyhow::bail!("Input 'description' path cannot be empty");
        }

        if self.limits.max_cycles == 0 {
            anyhow::bail!("Limit 'max_cycles' must be greater than zero");
        }

        if self.limits.ready_timeout_cycles == Some(0) {
            anyhow::bail!("Limit 'ready_timeout_cycles' must be greater than zero when set");
        }

        if self.clock_period_ns == 0 {
            anyhow::bail!("'clock_period_ns' must be greater than zero");
        }

        let data_width = self.bus.data_width;
        if !(8..=64).contains(&data_width) || data_width % 8 != 0 {
            anyhow::bail!(
                "Bus 'data_width' must be a byte multiple between 8 and 64, got {}",
                data_width
            );
        }

        if self.bus.address_width == 0 || self.bus.address_width > 64 {
            anyhow::bail!(
                "Bus 'address_width' must be between 1 and 64, got {}",
                self.bus.address_width
            );
        }

        if self.steps.is_empty() {
            anyhow::bail!("Bench script declares no steps");
        }

        Ok(())
    }

    /// Description path resolved against the directory holding the script.
    pub fn description_path(&self, script_path: &Path) -> PathBuf {
        let description = Path::new(&self.description);
        if description.is_absolute() {
            return description.to_path_buf();
        }
        script_path
            .parent()
            .map(|dir| dir.join(description))
            .unwrap_or_else(|| description.to_path_buf())
    }
}
