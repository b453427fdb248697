// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Regen register-file model
//!
//! This crate defines the data structures that describe a memory-mapped register file and the
//! rules that keep them consistent. It is the common language between:
//!
//! 1. **Descriptions**: YAML files or builder calls that author fields, registers and files.
//! 2. **Generators**: renderers producing Verilog, instantiation stubs, HTML and Rust bindings.
//! 3. **Verification**: the bus codec, which reads back the flat field dictionary.
//!
//! Every structural rule (name uniqueness, bit occupancy, reset bounds, single writer) is
//! checked eagerly when a field or register is added, so a [`RegFile`] that exists is always
//! fully placed and addressed.

#![warn(missing_docs)]

mod error;
mod field;
mod mapping;
mod permissions;
mod register;
mod regfile;

pub use error::{ModelError, Result};
pub use field::{Field, FieldKind, PlacedField};
pub use mapping::{
    strobe_for, FieldDictionary, FieldLocation, FieldMapping, RegFileMapping, RegisterMapping,
};
pub use permissions::Permissions;
pub use register::{Register, DEFAULT_REGISTER_WIDTH};
pub use regfile::{RegFile, ADDRESS_STRIDE};

/// Mask with the lowest `width` bits set. Widths of 64 and above saturate.
pub fn width_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Checks that `name` is usable as a Verilog identifier.
pub(crate) fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ModelError::InvalidName {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_mask() {
        assert_eq!(width_mask(0), 0);
        assert_eq!(width_mask(1), 1);
        assert_eq!(width_mask(4), 0xF);
        assert_eq!(width_mask(32), 0xFFFF_FFFF);
        assert_eq!(width_mask(64), u64::MAX);
    }

    #[test]
    fn test_identifiers() {
        assert!(validate_identifier("cfg_af_th").is_ok());
        assert!(validate_identifier("_x9").is_ok());
        assert!(validate_identifier("9lives").is_err());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("has space").is_err());
        assert!(validate_identifier("dash-ed").is_err());
    }
}
