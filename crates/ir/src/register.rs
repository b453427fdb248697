// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::error::{ModelError, Result};
use crate::field::{Field, PlacedField};
use crate::validate_identifier;
use tracing::debug;

/// Register width used when a description does not name one.
pub const DEFAULT_REGISTER_WIDTH: u32 = 32;

/// A fixed-width word holding non-overlapping fields.
///
/// The occupancy bitmap is the single source of truth for which bits are taken; every field
/// goes through [`Register::add_field`], including the ones passed to [`Register::with_fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    name: String,
    description: String,
    width: u32,
    address: u64,
    fields: Vec<PlacedField>,
    occupied: Vec<bool>,
}

impl Register {
    /// Creates an empty register.
    pub fn new(name: impl Into<String>, description: impl Into<String>, width: u32) -> Result<Self> {
        let name = name.into();
        validate_identifier(&name)?;
        if !(8..=64).contains(&width) || width % 8 != 0 {
            return Err(ModelError::InvalidRegisterWidth {
                register: name,
                width,
            });
        }
        Ok(Self {
            name,
            description: description.into(),
            width,
            address: 0,
            fields: Vec::new(),
            occupied: vec![false; width as usize],
        })
    }

    /// Creates a register and adds `fields` in order.
    pub fn with_fields(
        name: impl Into<String>,
        description: impl Into<String>,
        width: u32,
        fields: impl IntoIterator<Item = Field>,
    ) -> Result<Self> {
        let mut register = Self::new(name, description, width)?;
        for field in fields {
            register.add_field(field)?;
        }
        Ok(register)
    }

    /// Adds a field, packing it at the first free byte boundary when it has no offset.
    ///
    /// Returns the offset the field was placed at.
    pub fn add_field(&mut self, field: Field) -> Result<u32> {
        field.validate()?;

        if self.fields.iter().any(|f| f.name() == field.name()) {
            return Err(ModelError::DuplicateField {
                register: self.name.clone(),
                field: field.name().to_string(),
            });
        }

        let width = field.width();
        let offset = match field.requested_offset() {
            Some(offset) => {
                if offset as u64 + width as u64 > self.width as u64 {
                    return Err(ModelError::FieldOutOfRange {
                        register: self.name.clone(),
                        field: field.name().to_string(),
                        offset,
                        width,
                        register_width: self.width,
                    });
                }
                let taken: Vec<u32> = (offset..offset + width)
                    .filter(|&bit| self.occupied[bit as usize])
                    .collect();
                if !taken.is_empty() {
                    return Err(ModelError::BitCollision {
                        register: self.name.clone(),
                        field: field.name().to_string(),
                        bits: taken,
                    });
                }
                offset
            }
            None => self.find_slot(width).ok_or_else(|| ModelError::NoFreeSlot {
                register: self.name.clone(),
                field: field.name().to_string(),
                width,
            })?,
        };

        for bit in offset..offset + width {
            self.occupied[bit as usize] = true;
        }
        debug!(
            "Placed field '{}' in register '{}' at bits [{}:{}]",
            field.name(),
            self.name,
            offset + width - 1,
            offset
        );
        self.fields.push(PlacedField::new(field, offset));
        Ok(offset)
    }

    /// First byte-aligned offset whose whole range is free and inside the register.
    fn find_slot(&self, width: u32) -> Option<u32> {
        (0..self.width)
            .step_by(8)
            .filter(|&offset| offset.checked_add(width).is_some_and(|end| end <= self.width))
            .find(|&offset| (offset..offset + width).all(|bit| !self.occupied[bit as usize]))
    }

    pub(crate) fn set_address(&mut self, address: u64) {
        self.address = address;
    }

    /// Register name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Byte address inside the owning register file.
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Fields in the order they were added.
    pub fn fields(&self) -> &[PlacedField] {
        &self.fields
    }

    /// Looks up a field by its local name.
    pub fn field(&self, name: &str) -> Option<&PlacedField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Whether `bit` is taken by a field.
    pub fn is_occupied(&self, bit: u32) -> bool {
        self.occupied.get(bit as usize).copied().unwrap_or(false)
    }

    /// Register value after reset, composed from the fields' reset values.
    pub fn reset_value(&self) -> u64 {
        self.fields
            .iter()
            .fold(0, |acc, f| acc | (f.field().reset_value() << f.offset()))
    }
}
