// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::codec::{field_value_to_register_value, register_value_to_field_value};
use crate::table::{FieldTable, LookupError};
use regen_ir::FieldLocation;
use serde::Serialize;
use std::fmt;

/// One bus access to a single field.
///
/// Equality only looks at where the access went, its direction and the field value, so an
/// expected transaction compares equal to an observed one regardless of timing.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub field_name: String,
    pub register_address: u64,
    pub byte_strobe: u64,
    pub is_write: bool,
    pub register_width: u32,
    pub field_width: u32,
    pub field_offset: u32,
    pub register_data: Option<u64>,
    pub field_data: Option<u64>,
    pub timestamp_ns: Option<u64>,
}

impl Transaction {
    /// Transaction skeleton for a located field, with no data yet.
    pub fn from_location(location: &FieldLocation, is_write: bool) -> Self {
        Self {
            field_name: location.name.clone(),
            register_address: location.address,
            byte_strobe: location.strobe_bits(),
            is_write,
            register_width: FieldTable::register_width(location),
            field_width: location.width,
            field_offset: location.offset,
            register_data: None,
            field_data: None,
            timestamp_ns: None,
        }
    }

    /// Write of `value` into the named field, with the register word already encoded.
    pub fn write(table: &FieldTable, field_name: &str, value: u64) -> Result<Self, LookupError> {
        let location = table.locate_field_by_name(field_name)?;
        let mut tx = Self::from_location(location, true);
        tx.set_field_data(value);
        Ok(tx)
    }

    /// Read of the named field.
    pub fn read(table: &FieldTable, field_name: &str) -> Result<Self, LookupError> {
        let location = table.locate_field_by_name(field_name)?;
        Ok(Self::from_location(location, false))
    }

    /// Sets the field value and the register word that carries it.
    pub fn set_field_data(&mut self, value: u64) {
        let register = field_value_to_register_value(
            self.register_width,
            value,
            self.field_offset,
            self.field_width,
        );
        self.register_data = Some(register);
        self.field_data = Some(register_value_to_field_value(
            register,
            self.field_offset,
            self.field_width,
        ));
    }

    /// Sets the register word and the field value decoded from it.
    pub fn set_register_data(&mut self, register: u64) {
        self.register_data = Some(register);
        self.field_data = Some(register_value_to_field_value(
            register,
            self.field_offset,
            self.field_width,
        ));
    }

    pub fn direction(&self) -> &'static str {
        if self.is_write {
            "write"
        } else {
            "read"
        }
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.register_address == other.register_address
            && self.is_write == other.is_write
            && self.field_data == other.field_data
    }
}

impl Eq for Transaction {}

fn hex_or_dash(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:#x}", v))
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "APB {} of '{}'", self.direction(), self.field_name)?;
        writeln!(f, "  address:       {:#x}", self.register_address)?;
        writeln!(f, "  strobe:        {:#b}", self.byte_strobe)?;
        writeln!(
            f,
            "  field bits:    [{}:{}]",
            self.field_offset + self.field_width.max(1) - 1,
            self.field_offset
        )?;
        writeln!(f, "  register data: {}", hex_or_dash(self.register_data))?;
        writeln!(f, "  field data:    {}", hex_or_dash(self.field_data))?;
        match self.timestamp_ns {
            Some(t) => write!(f, "  time:          {} ns", t),
            None => write!(f, "  time:          -"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regen_ir::{Field, RegFile, Register};

    fn table() -> FieldTable {
        let cfg = Register::with_fields(
            "cfg",
            "",
            32,
            [Field::config("a", 4), Field::config("b", 3).at(12)],
        )
        .unwrap();
        FieldTable::from_regfile(&RegFile::new("rgf", "", [cfg]).unwrap(), 32)
    }

    #[test]
    fn test_write_encodes_register_word() {
        let tx = Transaction::write(&table(), "rgf_cfg_b", 0b101).unwrap();
        assert!(tx.is_write);
        assert_eq!(tx.register_address, 0);
        assert_eq!(tx.byte_strobe, 0b0010);
        assert_eq!(tx.register_data, Some(0b101 << 12));
        assert_eq!(tx.field_data, Some(0b101));
    }

    #[test]
    fn test_write_truncates_to_field_width() {
        let tx = Transaction::write(&table(), "rgf_cfg_a", 0x1f).unwrap();
        assert_eq!(tx.field_data, Some(0xf));
    }

    #[test]
    fn test_read_decodes_register_word() {
        let mut tx = Transaction::read(&table(), "rgf_cfg_b").unwrap();
        assert_eq!(tx.field_data, None);
        tx.set_register_data(0xffff_6fff);
        assert_eq!(tx.field_data, Some(0b110));
    }

    #[test]
    fn test_equality_ignores_timing_and_strobe() {
        let t = table();
        let mut a = Transaction::write(&t, "rgf_cfg_a", 3).unwrap();
        let mut b = a.clone();
        b.timestamp_ns = Some(120);
        b.byte_strobe = 0xf;
        b.field_name = "renamed".to_string();
        assert_eq!(a, b);

        b.field_data = Some(4);
        assert_ne!(a, b);

        a.is_write = false;
        b.field_data = a.field_data;
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let mut tx = Transaction::write(&table(), "rgf_cfg_a", 3).unwrap();
        tx.timestamp_ns = Some(40);
        let text = tx.to_string();
        assert!(text.starts_with("APB write of 'rgf_cfg_a'"));
        assert!(text.contains("register data: 0x3"));
        assert!(text.contains("field bits:    [3:0]"));
        assert!(text.ends_with("40 ns"));
    }
}
