// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::error::{ModelError, Result};
use crate::field::{FieldKind, PlacedField};
use crate::register::Register;
use crate::validate_identifier;
use std::collections::HashSet;

/// Bytes between consecutive register addresses.
pub const ADDRESS_STRIDE: u64 = 4;

/// Module-level signals every generated register file declares.
const BUS_SIGNALS: [&str; 15] = [
    "clk", "rst_n", "paddr", "pprot", "psel", "penable", "pwrite", "pwdata", "pstrb", "pwakeup",
    "pready", "prdata", "pslverr", "sw_wr", "sw_rd",
];

/// An ordered set of registers with word-stride byte addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegFile {
    name: String,
    description: String,
    registers: Vec<Register>,
    running_address: u64,
    max_register_width: u32,
}

impl RegFile {
    /// Creates a register file, assigning addresses `0, 4, 8, ...` in list order.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        registers: impl IntoIterator<Item = Register>,
    ) -> Result<Self> {
        let name = name.into();
        validate_identifier(&name)?;
        let mut regfile = Self {
            name,
            description: description.into(),
            registers: Vec::new(),
            running_address: 0,
            max_register_width: 0,
        };
        for register in registers {
            regfile.add_register(register)?;
        }
        if regfile.registers.is_empty() {
            return Err(ModelError::EmptyRegFile {
                regfile: regfile.name,
            });
        }
        Ok(regfile)
    }

    /// Appends a register at the next free address and returns that address.
    ///
    /// Existing addresses never move.
    pub fn add_register(&mut self, mut register: Register) -> Result<u64> {
        if self.register(register.name()).is_some() {
            return Err(ModelError::DuplicateRegister {
                regfile: self.name.clone(),
                register: register.name().to_string(),
            });
        }
        let mut taken: HashSet<String> = BUS_SIGNALS.iter().map(|s| s.to_string()).collect();
        taken.insert("pstrb_mask".to_string());
        taken.insert(format!("{}___intr", self.name));
        for existing in &self.registers {
            taken.extend(self.declared_signals(existing));
        }
        for signal in self.declared_signals(&register) {
            if !taken.insert(signal.clone()) {
                return Err(ModelError::SignalClash {
                    regfile: self.name.clone(),
                    register: register.name().to_string(),
                    signal,
                });
            }
        }

        let address = self.running_address;
        register.set_address(address);
        self.max_register_width = self.max_register_width.max(register.width());
        self.registers.push(register);
        self.running_address += ADDRESS_STRIDE;
        Ok(address)
    }

    /// Register file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register file description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Registers in address order.
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Looks up a register by name.
    pub fn register(&self, name: &str) -> Option<&Register> {
        self.registers.iter().find(|r| r.name() == name)
    }

    /// Next address that would be assigned.
    pub fn running_address(&self) -> u64 {
        self.running_address
    }

    /// Number of address bits: `floor(log2(running_address))`.
    pub fn address_width(&self) -> u32 {
        if self.running_address == 0 {
            0
        } else {
            self.running_address.ilog2()
        }
    }

    /// Widest register, which is also the data width of the bus port.
    pub fn register_width(&self) -> u32 {
        self.max_register_width
    }

    /// Hardware signal name of a field: `<regfile>_<register>_<field>`.
    pub fn signal_name(&self, register: &Register, field: &PlacedField) -> String {
        format!("{}_{}_{}", self.name, register.name(), field.name())
    }

    /// Every signal the generated module declares for a register: its read-back word and,
    /// per field, the storage signal plus its permission and variant side signals.
    pub fn declared_signals(&self, register: &Register) -> Vec<String> {
        let mut signals = vec![format!("{}_{}", self.name, register.name())];
        for field in register.fields() {
            let sig = self.signal_name(register, field);
            let f = field.field();
            let perms = f.permissions();
            if perms.sw_wr() {
                signals.push(format!("{}_sw_we", sig));
            }
            if perms.hw_wr() {
                signals.push(format!("{}_hw_next", sig));
            }
            if f.has_write_enable() {
                signals.push(format!("{}_hw_we", sig));
            }
            match f.kind() {
                FieldKind::PulseOnWrite => signals.push(format!("{}_sw_wr_pulse", sig)),
                FieldKind::PulseOnRead => signals.push(format!("{}_sw_rd_pulse", sig)),
                FieldKind::Interrupt if perms.hw_wr() => signals.push(format!("{}_intr", sig)),
                _ => {}
            }
            signals.push(sig);
        }
        signals
    }

    /// Every interrupt field, in register then field order.
    pub fn interrupts(&self) -> impl Iterator<Item = (&Register, &PlacedField)> {
        self.registers.iter().flat_map(|reg| {
            reg.fields()
                .iter()
                .filter(|f| f.field().kind() == FieldKind::Interrupt)
                .map(move |f| (reg, f))
        })
    }

    /// Whether the aggregated interrupt output exists.
    pub fn has_interrupts(&self) -> bool {
        self.interrupts().next().is_some()
    }
}
