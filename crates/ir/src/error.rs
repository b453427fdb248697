// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use thiserror::Error;

/// Violations detected while a register file is being described.
///
/// All of them are fatal for generation: nothing is rendered from a description that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Name is not a legal Verilog identifier.
    #[error("'{name}' is not a legal identifier (expected [A-Za-z_][A-Za-z0-9_]*)")]
    InvalidName {
        /// Offending name.
        name: String,
    },
    /// A field with this name already exists in the register.
    #[error("field '{field}' already exists within register '{register}'")]
    DuplicateField {
        /// Register name.
        register: String,
        /// Field name.
        field: String,
    },
    /// A register with this name already exists in the register file.
    #[error("register '{register}' already exists within register file '{regfile}'")]
    DuplicateRegister {
        /// Register file name.
        regfile: String,
        /// Register name.
        register: String,
    },
    /// The requested bit range overlaps fields that are already placed.
    #[error("can't add field '{field}' to register '{register}': bits {bits:?} are already taken")]
    BitCollision {
        /// Register name.
        register: String,
        /// Field name.
        field: String,
        /// Bits that are occupied by other fields.
        bits: Vec<u32>,
    },
    /// The requested bit range does not fit in the register.
    #[error(
        "field '{field}' at bits [{offset}+:{width}] does not fit in the {register_width}-bit register '{register}'"
    )]
    FieldOutOfRange {
        /// Register name.
        register: String,
        /// Field name.
        field: String,
        /// Requested offset.
        offset: u32,
        /// Field width.
        width: u32,
        /// Register width.
        register_width: u32,
    },
    /// No byte-aligned slot is free for a field without an explicit offset.
    #[error("failed to infer an offset for the {width}-bit field '{field}' in register '{register}'")]
    NoFreeSlot {
        /// Register name.
        register: String,
        /// Field name.
        field: String,
        /// Field width.
        width: u32,
    },
    /// Reset value needs more bits than the field has.
    #[error("reset value {reset} is illegal for the {width}-bit field '{field}'")]
    ResetOverflow {
        /// Field name.
        field: String,
        /// Requested reset value.
        reset: u64,
        /// Field width.
        width: u32,
    },
    /// Write-enable was requested on a field hardware cannot write.
    #[error("unable to set write-enable on field '{field}' without HW write permission")]
    WriteEnableWithoutHwWrite {
        /// Field name.
        field: String,
    },
    /// Software and hardware are both allowed to write the field.
    #[error("field '{field}' grants write permission to both SW and HW")]
    ConflictingWriters {
        /// Field name.
        field: String,
    },
    /// Field width of zero.
    #[error("field '{field}' must be at least one bit wide")]
    ZeroWidth {
        /// Field name.
        field: String,
    },
    /// Register width outside 8..=64 or not a whole number of bytes.
    #[error("register '{register}' has unsupported width {width} (expected 8..=64, byte multiple)")]
    InvalidRegisterWidth {
        /// Register name.
        register: String,
        /// Requested width.
        width: u32,
    },
    /// Two items would declare the same signal in the generated module.
    #[error("register '{register}' declares signal '{signal}', which register file '{regfile}' already uses")]
    SignalClash {
        /// Register file name.
        regfile: String,
        /// Register being added.
        register: String,
        /// Composed signal name.
        signal: String,
    },
    /// A register file needs at least one register to be addressable.
    #[error("register file '{regfile}' has no registers")]
    EmptyRegFile {
        /// Register file name.
        regfile: String,
    },
}

/// Result type for model construction.
pub type Result<T> = std::result::Result<T, ModelError>;
