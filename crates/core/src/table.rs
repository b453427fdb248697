// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use regen_ir::{FieldDictionary, FieldLocation, RegFile};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("field '{name}' not found")]
    FieldNotFound { name: String },
    #[error("no field at address {address:#x} with strobe {strobe:#b}")]
    NoFieldAt { address: u64, strobe: u64 },
    #[error("address {address:#x} with strobe {strobe:#b} matches several fields: {candidates:?}")]
    Ambiguous {
        address: u64,
        strobe: u64,
        candidates: Vec<String>,
    },
    #[error("field '{name}' has {lanes} strobe lanes but the {bus_width}-bit bus has {bus_lanes}")]
    StrobeTooWide {
        name: String,
        lanes: usize,
        bus_width: u32,
        bus_lanes: u32,
    },
    #[error("register file '{name}' not found in field dictionary")]
    UnknownRegFile { name: String },
    #[error("invalid field dictionary: {0}")]
    Dictionary(#[from] serde_json::Error),
    #[error("failed to read field dictionary: {0}")]
    Io(#[from] std::io::Error),
}

/// Field records of one register file, searchable by name or by bus location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTable {
    regfile: String,
    bus_width: u32,
    fields: Vec<FieldLocation>,
}

impl FieldTable {
    pub fn new(regfile: impl Into<String>, bus_width: u32, fields: Vec<FieldLocation>) -> Self {
        Self {
            regfile: regfile.into(),
            bus_width,
            fields,
        }
    }

    pub fn from_regfile(rgf: &RegFile, bus_width: u32) -> Self {
        let fields = rgf
            .field_dictionary()
            .regfile(rgf.name())
            .map(<[FieldLocation]>::to_vec)
            .unwrap_or_default();
        Self::new(rgf.name(), bus_width, fields)
    }

    /// Table of one register file from an external dictionary.
    ///
    /// Every record's strobe must fit on the bus, which is at most 64 bits wide.
    pub fn from_dictionary(
        dictionary: &FieldDictionary,
        regfile: &str,
        bus_width: u32,
    ) -> Result<Self, LookupError> {
        let fields = dictionary
            .regfile(regfile)
            .ok_or_else(|| LookupError::UnknownRegFile {
                name: regfile.to_string(),
            })?;
        let bus_lanes = bus_width.min(64).div_ceil(8);
        if let Some(wide) = fields.iter().find(|f| f.strobe.len() > bus_lanes as usize) {
            return Err(LookupError::StrobeTooWide {
                name: wide.name.clone(),
                lanes: wide.strobe.len(),
                bus_width,
                bus_lanes,
            });
        }
        Ok(Self::new(regfile, bus_width, fields.to_vec()))
    }

    pub fn from_json(json: &str, regfile: &str, bus_width: u32) -> Result<Self, LookupError> {
        let dictionary = FieldDictionary::from_json(json)?;
        Self::from_dictionary(&dictionary, regfile, bus_width)
    }

    pub fn from_file<P: AsRef<Path>>(
        path: P,
        regfile: &str,
        bus_width: u32,
    ) -> Result<Self, LookupError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, regfile, bus_width)
    }

    pub fn regfile(&self) -> &str {
        &self.regfile
    }

    pub fn bus_width(&self) -> u32 {
        self.bus_width
    }

    /// Number of byte lanes on the bus.
    pub fn strobe_lanes(&self) -> u32 {
        self.bus_width.div_ceil(8)
    }

    pub fn fields(&self) -> &[FieldLocation] {
        &self.fields
    }

    /// Register width of a field, derived from its strobe list.
    pub fn register_width(location: &FieldLocation) -> u32 {
        location.strobe.len() as u32 * 8
    }

    pub fn locate_field_by_name(&self, name: &str) -> Result<&FieldLocation, LookupError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| LookupError::FieldNotFound {
                name: name.to_string(),
            })
    }

    /// Field whose address and byte strobe match exactly.
    ///
    /// `strobe` is little-endian: bit `i` enables byte lane `i`. Lanes beyond the bus width
    /// are ignored.
    pub fn locate_field_by_address(
        &self,
        address: u64,
        strobe: u64,
    ) -> Result<&FieldLocation, LookupError> {
        let lanes = self.strobe_lanes().min(64);
        let strobe = if lanes >= 64 {
            strobe
        } else {
            strobe & ((1u64 << lanes) - 1)
        };
        let mut matches = self
            .fields
            .iter()
            .filter(|f| f.address == address && f.strobe_bits() == strobe);

        let first = matches
            .next()
            .ok_or(LookupError::NoFieldAt { address, strobe })?;
        let rest: Vec<&FieldLocation> = matches.collect();
        if rest.is_empty() {
            Ok(first)
        } else {
            Err(LookupError::Ambiguous {
                address,
                strobe,
                candidates: std::iter::once(first)
                    .chain(rest)
                    .map(|f| f.name.clone())
                    .collect(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regen_ir::{Field, Register};

    fn table() -> FieldTable {
        let cfg = Register::with_fields(
            "cfg",
            "",
            32,
            [Field::config("af_th", 4), Field::config("ae_th", 4)],
        )
        .unwrap();
        let sts = Register::with_fields(
            "sts",
            "",
            32,
            [Field::status("lo", 2).at(0), Field::status("hi", 2).at(4)],
        )
        .unwrap();
        let rgf = RegFile::new("fifo", "", [cfg, sts]).unwrap();
        FieldTable::from_regfile(&rgf, 32)
    }

    #[test]
    fn test_dictionary_strobe_wider_than_bus() {
        let mut strobe = vec![false; 65];
        strobe[64] = true;
        let json = serde_json::json!({
            "wide": [{
                "name": "wide_r_f",
                "address": "0x0",
                "strobe": strobe,
                "offset": 512,
                "width": 1,
            }]
        })
        .to_string();
        let err = FieldTable::from_json(&json, "wide", 32).unwrap_err();
        assert!(matches!(
            err,
            LookupError::StrobeTooWide { lanes: 65, bus_lanes: 4, .. }
        ));

        let narrow = table();
        let json = regen_ir::FieldDictionary(
            [("fifo".to_string(), narrow.fields().to_vec())].into_iter().collect(),
        )
        .to_json()
        .unwrap();
        assert!(matches!(
            FieldTable::from_json(&json, "fifo", 16),
            Err(LookupError::StrobeTooWide { .. })
        ));
        assert_eq!(FieldTable::from_json(&json, "fifo", 32).unwrap(), narrow);
    }

    #[test]
    fn test_locate_by_name() {
        let t = table();
        let f = t.locate_field_by_name("fifo_cfg_ae_th").unwrap();
        assert_eq!(f.address, 0);
        assert_eq!(f.strobe_bits(), 0b0010);
        assert_eq!(f.offset, 8);
        assert_eq!(f.width, 4);
        assert!(matches!(
            t.locate_field_by_name("fifo_cfg_missing"),
            Err(LookupError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn test_locate_by_address() {
        let t = table();
        let f = t.locate_field_by_address(0, 0b0001).unwrap();
        assert_eq!(f.name, "fifo_cfg_af_th");
        assert_eq!(f.offset, 0);
        assert!(matches!(
            t.locate_field_by_address(0, 0b0100),
            Err(LookupError::NoFieldAt { .. })
        ));
        // strobe bits beyond the bus are ignored
        assert_eq!(
            t.locate_field_by_address(0, 0b1_0000_0010).unwrap().name,
            "fifo_cfg_ae_th"
        );
    }

    #[test]
    fn test_ambiguous_location() {
        let t = table();
        match t.locate_field_by_address(4, 0b0001) {
            Err(LookupError::Ambiguous { candidates, .. }) => {
                assert_eq!(candidates, vec!["fifo_sts_lo", "fifo_sts_hi"]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"apb_fifo_rgf": [
            {"name": "apb_fifo_rgf_cfg_cfg_af_th", "address": "0x0",
             "strobe": [true, false, false, false], "offset": 0, "width": 4}
        ]}"#;
        let t = FieldTable::from_json(json, "apb_fifo_rgf", 32).unwrap();
        assert_eq!(t.fields().len(), 1);
        assert_eq!(FieldTable::register_width(&t.fields()[0]), 32);
        assert!(matches!(
            FieldTable::from_json(json, "other", 32),
            Err(LookupError::UnknownRegFile { .. })
        ));
        assert!(matches!(
            FieldTable::from_json("not json", "x", 32),
            Err(LookupError::Dictionary(_))
        ));
    }
}
