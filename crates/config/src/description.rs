// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{check_schema_version, default_schema_version};
use anyhow::{Context, Result};
use regen_ir::{Field, FieldKind, Permissions, RegFile, Register, DEFAULT_REGISTER_WIDTH};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

fn default_register_width() -> u32 {
    DEFAULT_REGISTER_WIDTH
}

fn default_field_width() -> u32 {
    1
}

fn default_kind() -> FieldKind {
    FieldKind::Config
}

/// Explicit permission set, only accepted on `custom` fields.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct AccessDescriptor {
    #[serde(default)]
    pub sw_rd: bool,
    #[serde(default)]
    pub sw_wr: bool,
    #[serde(default)]
    pub hw_rd: bool,
    #[serde(default)]
    pub hw_wr: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: FieldKind,
    #[serde(default = "default_field_width")]
    pub width: u32,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub reset: u64,
    #[serde(default)]
    pub write_enable: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub access: Option<AccessDescriptor>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RegisterDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_register_width")]
    pub width: u32,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

/// YAML form of a register file: fields inside registers inside the file, in order.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RegFileDescriptor {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub registers: Vec<RegisterDescriptor>,
}

impl FieldDescriptor {
    /// Builds the model field, applying the kind's preset permissions.
    pub fn to_field(&self) -> Result<Field> {
        let field = match (self.kind, self.access) {
            (FieldKind::Custom, Some(access)) => Field::new(
                &self.name,
                Permissions::from_bools(access.sw_rd, access.sw_wr, access.hw_rd, access.hw_wr),
                self.width,
            ),
            (FieldKind::Custom, None) => {
                anyhow::bail!("Field '{}' is custom but has no 'access' block", self.name)
            }
            (_, Some(_)) => anyhow::bail!(
                "Field '{}' has kind {:?}, which fixes its permissions; use kind 'custom' to set 'access'",
                self.name,
                self.kind
            ),
            (FieldKind::Config, None) => Field::config(&self.name, self.width),
            (FieldKind::Status, None) => Field::status(&self.name, self.width),
            (FieldKind::PulseOnWrite, None) => Field::pulse_on_write(&self.name, self.width),
            (FieldKind::PulseOnRead, None) => Field::pulse_on_read(&self.name, self.width),
            (FieldKind::Interrupt, None) => {
                if self.width != 1 {
                    anyhow::bail!(
                        "Interrupt field '{}' must be 1 bit wide, got {}",
                        self.name,
                        self.width
                    );
                }
                Field::interrupt(&self.name)
            }
        };
        let field = field
            .describe(&self.description)
            .reset(self.reset)
            .write_enable(self.write_enable);
        Ok(match self.offset {
            Some(offset) => field.at(offset),
            None => field,
        })
    }
}

impl RegisterDescriptor {
    pub fn to_register(&self) -> Result<Register> {
        let mut register = Register::new(&self.name, &self.description, self.width)
            .with_context(|| format!("Invalid register '{}'", self.name))?;
        for desc in &self.fields {
            let field = desc.to_field()?;
            register.add_field(field).with_context(|| {
                format!("Cannot add field '{}' to register '{}'", desc.name, self.name)
            })?;
        }
        Ok(register)
    }
}

impl RegFileDescriptor {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read register file description at {:?}", path.as_ref())
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let desc: Self =
            serde_yaml::from_str(yaml).context("Failed to parse Register File Description YAML")?;
        desc.validate()?;
        Ok(desc)
    }

    pub fn validate(&self) -> Result<()> {
        check_schema_version(&self.schema_version)?;
        if self.name.trim().is_empty() {
            anyhow::bail!("Register file 'name' cannot be empty");
        }
        if self.registers.is_empty() {
            anyhow::bail!("Register file '{}' declares no registers", self.name);
        }
        Ok(())
    }

    /// Builds the model, running every placement and addressing check.
    pub fn to_regfile(&self) -> Result<RegFile> {
        let registers = self
            .registers
            .iter()
            .map(RegisterDescriptor::to_register)
            .collect::<Result<Vec<_>>>()?;
        let rgf = RegFile::new(&self.name, &self.description, registers)
            .with_context(|| format!("Invalid register file '{}'", self.name))?;
        debug!(
            "Loaded register file '{}' with {} registers, address width {}",
            rgf.name(),
            rgf.registers().len(),
            rgf.address_width()
        );
        Ok(rgf)
    }
}
