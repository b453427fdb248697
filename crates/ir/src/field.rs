// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::error::{ModelError, Result};
use crate::permissions::Permissions;
use crate::register::Register;
use crate::{validate_identifier, width_mask};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Behavioral variant of a field.
///
/// All variants share the same storage; they differ in the side signals the generated
/// hardware exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Software-writable configuration, read by hardware.
    Config,
    /// Hardware-written status, read by software.
    Status,
    /// Configuration that also pulses an output for one cycle when software writes it.
    PulseOnWrite,
    /// Status that also pulses an output for one cycle when software reads it.
    PulseOnRead,
    /// One-bit status with a rising-edge interrupt output.
    Interrupt,
    /// Any legal permission set chosen by the author.
    Custom,
}

impl FieldKind {
    /// Permissions implied by the variant, `None` for [`FieldKind::Custom`].
    pub fn preset(self) -> Option<Permissions> {
        match self {
            FieldKind::Config | FieldKind::PulseOnWrite => Some(Permissions::CONFIG),
            FieldKind::Status | FieldKind::PulseOnRead | FieldKind::Interrupt => {
                Some(Permissions::STATUS)
            }
            FieldKind::Custom => None,
        }
    }
}

/// A named bit-range inside a register, as authored.
///
/// The offset is optional: fields without one are packed by [`Register::add_field`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    description: String,
    width: u32,
    offset: Option<u32>,
    reset_value: u64,
    permissions: Permissions,
    write_enable: bool,
    kind: FieldKind,
}

impl Field {
    /// Creates a field with an explicit permission set.
    pub fn new(name: impl Into<String>, permissions: Permissions, width: u32) -> Self {
        Self::with_kind(name, FieldKind::Custom, permissions, width)
    }

    /// Software-writable configuration field.
    pub fn config(name: impl Into<String>, width: u32) -> Self {
        Self::with_kind(name, FieldKind::Config, Permissions::CONFIG, width)
    }

    /// Hardware-written status field.
    pub fn status(name: impl Into<String>, width: u32) -> Self {
        Self::with_kind(name, FieldKind::Status, Permissions::STATUS, width)
    }

    /// Configuration field with a write pulse output.
    pub fn pulse_on_write(name: impl Into<String>, width: u32) -> Self {
        Self::with_kind(name, FieldKind::PulseOnWrite, Permissions::CONFIG, width)
    }

    /// Status field with a read pulse output.
    pub fn pulse_on_read(name: impl Into<String>, width: u32) -> Self {
        Self::with_kind(name, FieldKind::PulseOnRead, Permissions::STATUS, width)
    }

    /// One-bit interrupt field.
    pub fn interrupt(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Interrupt, Permissions::STATUS, 1)
    }

    fn with_kind(
        name: impl Into<String>,
        kind: FieldKind,
        permissions: Permissions,
        width: u32,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            width,
            offset: None,
            reset_value: 0,
            permissions,
            write_enable: false,
            kind,
        }
    }

    /// Sets the human-readable description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Requests a fixed bit offset instead of automatic packing.
    pub fn at(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the reset value.
    pub fn reset(mut self, value: u64) -> Self {
        self.reset_value = value;
        self
    }

    /// Gates hardware writes with an external `_hw_we` input.
    pub fn write_enable(mut self, enabled: bool) -> Self {
        self.write_enable = enabled;
        self
    }

    /// Field name, local to its register.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Offset requested by the author, if any.
    pub fn requested_offset(&self) -> Option<u32> {
        self.offset
    }

    /// Value after reset.
    pub fn reset_value(&self) -> u64 {
        self.reset_value
    }

    /// Access permissions.
    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    /// Whether hardware writes are gated by `_hw_we`.
    pub fn has_write_enable(&self) -> bool {
        self.write_enable
    }

    /// Behavioral variant.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Checks the rules that depend on the field alone.
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.name)?;
        if self.width == 0 {
            return Err(ModelError::ZeroWidth {
                field: self.name.clone(),
            });
        }
        if self.reset_value > width_mask(self.width) {
            return Err(ModelError::ResetOverflow {
                field: self.name.clone(),
                reset: self.reset_value,
                width: self.width,
            });
        }
        if !self.permissions.is_valid() {
            return Err(ModelError::ConflictingWriters {
                field: self.name.clone(),
            });
        }
        if self.write_enable && !self.permissions.hw_wr() {
            return Err(ModelError::WriteEnableWithoutHwWrite {
                field: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Adds this field to `register`, returning the offset it was placed at.
    pub fn add_to(self, register: &mut Register) -> Result<u32> {
        register.add_field(self)
    }
}

/// A field that has been placed inside a register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedField {
    field: Field,
    offset: u32,
}

impl PlacedField {
    pub(crate) fn new(field: Field, offset: u32) -> Self {
        Self { field, offset }
    }

    /// The authored field.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.field.name
    }

    /// Width in bits.
    pub fn width(&self) -> u32 {
        self.field.width
    }

    /// Least significant bit of the field inside its register.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Most significant bit of the field inside its register.
    pub fn msb(&self) -> u32 {
        self.offset + self.field.width - 1
    }

    /// Occupied bit range.
    pub fn bits(&self) -> Range<u32> {
        self.offset..self.offset + self.field.width
    }

    /// Mask of the field inside a register word.
    pub fn mask(&self) -> u64 {
        width_mask(self.field.width) << self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_permissions() {
        assert_eq!(Field::config("a", 4).permissions(), Permissions::CONFIG);
        assert_eq!(Field::status("a", 4).permissions(), Permissions::STATUS);
        assert_eq!(Field::pulse_on_write("a", 1).permissions(), Permissions::CONFIG);
        assert_eq!(Field::pulse_on_read("a", 4).permissions(), Permissions::STATUS);

        let intr = Field::interrupt("fifo_ovfl");
        assert_eq!(intr.width(), 1);
        assert_eq!(intr.kind(), FieldKind::Interrupt);
        assert_eq!(intr.permissions(), Permissions::STATUS);
    }

    #[test]
    fn test_reset_overflow() {
        assert!(Field::config("a", 4).reset(15).validate().is_ok());
        let err = Field::config("a", 4).reset(16).validate().unwrap_err();
        assert_eq!(
            err,
            ModelError::ResetOverflow {
                field: "a".to_string(),
                reset: 16,
                width: 4
            }
        );
    }

    #[test]
    fn test_write_enable_requires_hw_write() {
        assert!(Field::status("s", 2).write_enable(true).validate().is_ok());
        assert!(matches!(
            Field::config("c", 2).write_enable(true).validate(),
            Err(ModelError::WriteEnableWithoutHwWrite { .. })
        ));
    }

    #[test]
    fn test_conflicting_writers() {
        let perms = Permissions::SW_WR | Permissions::HW_WR;
        assert!(matches!(
            Field::new("x", perms, 1).validate(),
            Err(ModelError::ConflictingWriters { .. })
        ));
    }

    #[test]
    fn test_zero_width() {
        assert!(matches!(
            Field::config("z", 0).validate(),
            Err(ModelError::ZeroWidth { .. })
        ));
    }

    #[test]
    fn test_placed_geometry() {
        let placed = PlacedField::new(Field::config("f", 3), 4);
        assert_eq!(placed.msb(), 6);
        assert_eq!(placed.bits(), 4..7);
        assert_eq!(placed.mask(), 0b111_0000);
    }
}
