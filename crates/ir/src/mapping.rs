// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Serializable views of a register file.
//!
//! [`RegFileMapping`] is the nested description used for documentation. [`FieldDictionary`]
//! is its flat form, the contract between generation and verification: one record per field,
//! keyed by the hardware signal name and located by address and byte strobe.

use crate::field::FieldKind;
use crate::regfile::RegFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Nested description of a whole register file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegFileMapping {
    /// Register file name.
    pub name: String,
    /// Register file description.
    pub description: String,
    /// Address bits of the bus port.
    pub address_width: u32,
    /// Registers in address order.
    pub registers: Vec<RegisterMapping>,
}

/// One register of a [`RegFileMapping`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterMapping {
    /// Register name.
    pub name: String,
    /// Register description.
    pub description: String,
    /// Byte address.
    #[serde(with = "hex_address")]
    pub address: u64,
    /// Width in bits.
    pub width: u32,
    /// Fields in declaration order.
    pub fields: Vec<FieldMapping>,
}

/// One field of a [`RegisterMapping`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Field name, local to the register.
    pub name: String,
    /// Field description.
    pub description: String,
    /// Width in bits.
    pub width: u32,
    /// Least significant bit inside the register.
    pub offset: u32,
    /// Value after reset.
    pub reset_val: u64,
    /// Behavioral variant.
    pub kind: FieldKind,
    /// Software read permission.
    pub sw_rd: bool,
    /// Software write permission.
    pub sw_wr: bool,
    /// Hardware read permission.
    pub hw_rd: bool,
    /// Hardware write permission.
    pub hw_wr: bool,
    /// Hardware writes are gated by a write-enable input.
    pub write_enable: bool,
}

/// Location record of one field in the [`FieldDictionary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLocation {
    /// Full signal name, `<regfile>_<register>_<field>`.
    pub name: String,
    /// Register byte address, serialized as a hex string.
    #[serde(with = "hex_address")]
    pub address: u64,
    /// Byte enables touched by the field, least significant byte first.
    pub strobe: Vec<bool>,
    /// Least significant bit inside the register.
    pub offset: u32,
    /// Width in bits.
    pub width: u32,
    /// Value after reset.
    #[serde(default)]
    pub reset_val: u64,
    /// Field description.
    #[serde(default)]
    pub description: String,
    /// Behavioral variant.
    #[serde(default = "default_kind")]
    pub kind: FieldKind,
    /// Software read permission.
    #[serde(default)]
    pub sw_rd: bool,
    /// Software write permission.
    #[serde(default)]
    pub sw_wr: bool,
    /// Hardware read permission.
    #[serde(default)]
    pub hw_rd: bool,
    /// Hardware write permission.
    #[serde(default)]
    pub hw_wr: bool,
}

fn default_kind() -> FieldKind {
    FieldKind::Custom
}

impl FieldLocation {
    /// Strobe as an integer, bit `i` set when byte `i` is enabled.
    ///
    /// Lanes past the 64th have no bit and are dropped.
    pub fn strobe_bits(&self) -> u64 {
        self.strobe
            .iter()
            .enumerate()
            .filter(|(_, enabled)| **enabled)
            .filter_map(|(i, _)| u32::try_from(i).ok().and_then(|i| 1u64.checked_shl(i)))
            .fold(0, |acc, bit| acc | bit)
    }
}

/// Flat field dictionary: register file name to its field records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldDictionary(pub BTreeMap<String, Vec<FieldLocation>>);

impl FieldDictionary {
    /// Parses a dictionary from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Field records of one register file.
    pub fn regfile(&self, name: &str) -> Option<&[FieldLocation]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Names of the register files present.
    pub fn regfile_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Byte enables touched by bits `[offset, offset + width)` of a `register_width`-bit word.
pub fn strobe_for(offset: u32, width: u32, register_width: u32) -> Vec<bool> {
    let end = offset + width;
    (0..register_width.div_ceil(8))
        .map(|byte| {
            let lo = byte * 8;
            let hi = lo + 8;
            offset < hi && end > lo
        })
        .collect()
}

impl RegFileMapping {
    /// Flattens the mapping into the field dictionary.
    pub fn field_dictionary(&self) -> FieldDictionary {
        let fields = self
            .registers
            .iter()
            .flat_map(|reg| {
                reg.fields.iter().map(move |f| FieldLocation {
                    name: format!("{}_{}_{}", self.name, reg.name, f.name),
                    address: reg.address,
                    strobe: strobe_for(f.offset, f.width, reg.width),
                    offset: f.offset,
                    width: f.width,
                    reset_val: f.reset_val,
                    description: f.description.clone(),
                    kind: f.kind,
                    sw_rd: f.sw_rd,
                    sw_wr: f.sw_wr,
                    hw_rd: f.hw_rd,
                    hw_wr: f.hw_wr,
                })
            })
            .collect();
        FieldDictionary(BTreeMap::from([(self.name.clone(), fields)]))
    }
}

impl RegFile {
    /// Nested mapping of the register file.
    pub fn to_mapping(&self) -> RegFileMapping {
        RegFileMapping {
            name: self.name().to_string(),
            description: self.description().to_string(),
            address_width: self.address_width(),
            registers: self
                .registers()
                .iter()
                .map(|reg| RegisterMapping {
                    name: reg.name().to_string(),
                    description: reg.description().to_string(),
                    address: reg.address(),
                    width: reg.width(),
                    fields: reg
                        .fields()
                        .iter()
                        .map(|placed| {
                            let f = placed.field();
                            let p = f.permissions();
                            FieldMapping {
                                name: f.name().to_string(),
                                description: f.description().to_string(),
                                width: f.width(),
                                offset: placed.offset(),
                                reset_val: f.reset_value(),
                                kind: f.kind(),
                                sw_rd: p.sw_rd(),
                                sw_wr: p.sw_wr(),
                                hw_rd: p.hw_rd(),
                                hw_wr: p.hw_wr(),
                                write_enable: f.has_write_enable(),
                            }
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Flat field dictionary consumed by the bus codec.
    pub fn field_dictionary(&self) -> FieldDictionary {
        self.to_mapping().field_dictionary()
    }
}

mod hex_address {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(address: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#x}", address))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let text = String::deserialize(deserializer)?;
        let trimmed = text.trim();
        match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => trimmed.parse(),
        }
        .map_err(|e| de::Error::custom(format!("invalid address '{}': {}", text, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Field, Register};

    fn fifo() -> RegFile {
        let cfg = Register::with_fields(
            "cfg",
            "configuration register",
            32,
            [
                Field::config("cfg_af_th", 4).describe("almost full threshold"),
                Field::config("cfg_ae_th", 4),
            ],
        )
        .unwrap();
        let sts = Register::with_fields(
            "sts",
            "status register",
            32,
            [Field::status("sts_full", 1), Field::status("sts_af", 1)],
        )
        .unwrap();
        RegFile::new("apb_fifo_rgf", "FIFO register file", [cfg, sts]).unwrap()
    }

    #[test]
    fn test_strobe_bits_ignores_lanes_past_64() {
        let mut location = fifo().field_dictionary().0["apb_fifo_rgf"][1].clone();
        location.strobe = vec![false; 65];
        location.strobe[1] = true;
        location.strobe[64] = true;
        assert_eq!(location.strobe_bits(), 0b10);
    }

    #[test]
    fn test_strobe_for() {
        assert_eq!(strobe_for(0, 4, 32), vec![true, false, false, false]);
        assert_eq!(strobe_for(8, 4, 32), vec![false, true, false, false]);
        assert_eq!(strobe_for(4, 8, 32), vec![true, true, false, false]);
        assert_eq!(strobe_for(0, 32, 32), vec![true; 4]);
        assert_eq!(strobe_for(24, 1, 32), vec![false, false, false, true]);
    }

    #[test]
    fn test_dictionary_records() {
        let dict = fifo().field_dictionary();
        let fields = dict.regfile("apb_fifo_rgf").unwrap();
        assert_eq!(fields.len(), 4);

        let af = &fields[0];
        assert_eq!(af.name, "apb_fifo_rgf_cfg_cfg_af_th");
        assert_eq!(af.address, 0);
        assert_eq!(af.offset, 0);
        assert_eq!(af.width, 4);
        assert_eq!(af.strobe_bits(), 0b0001);

        let sts_af = &fields[3];
        assert_eq!(sts_af.name, "apb_fifo_rgf_sts_sts_af");
        assert_eq!(sts_af.address, 4);
        assert_eq!(sts_af.offset, 8);
        assert_eq!(sts_af.strobe, vec![false, true, false, false]);
    }

    #[test]
    fn test_dictionary_json_contract() {
        let json = fifo().field_dictionary().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value["apb_fifo_rgf"][0];
        assert_eq!(first["name"], "apb_fifo_rgf_cfg_cfg_af_th");
        assert_eq!(first["address"], "0x0");
        assert_eq!(first["strobe"], serde_json::json!([true, false, false, false]));
        assert_eq!(first["offset"], 0);
        assert_eq!(first["width"], 4);
        assert_eq!(value["apb_fifo_rgf"][2]["address"], "0x4");

        let parsed = FieldDictionary::from_json(&json).unwrap();
        assert_eq!(parsed, fifo().field_dictionary());
    }

    #[test]
    fn test_minimal_records_parse() {
        let json = r#"{"rgf": [{"name": "rgf_r_f", "address": "0x10", "strobe": [false, true], "offset": 8, "width": 3}]}"#;
        let dict = FieldDictionary::from_json(json).unwrap();
        let f = &dict.regfile("rgf").unwrap()[0];
        assert_eq!(f.address, 0x10);
        assert_eq!(f.strobe_bits(), 0b10);
        assert_eq!(f.kind, FieldKind::Custom);
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let rgf = fifo();
        assert_eq!(rgf.to_mapping(), rgf.to_mapping());
        let mapping = rgf.to_mapping();
        assert_eq!(mapping.address_width, 3);
        assert_eq!(mapping.registers[1].fields[0].offset, 0);
        assert!(mapping.registers[0].fields[0].sw_wr);
        assert!(!mapping.registers[1].fields[0].sw_wr);
    }
}
