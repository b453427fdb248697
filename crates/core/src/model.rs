// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Cycle-level model of the generated register-file hardware.

use crate::apb::ApbBus;
use crate::codec::strobe_to_bit_mask;
use crate::table::LookupError;
use crate::ApbTarget;
use regen_ir::{width_mask, FieldKind, Permissions, RegFile};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
struct FieldState {
    signal: String,
    offset: u32,
    width: u32,
    permissions: Permissions,
    kind: FieldKind,
    write_enable: bool,
    reset: u64,
    value: u64,
    hw_next: u64,
    hw_we: bool,
    wr_pulse: bool,
    rd_pulse: bool,
    intr: bool,
}

impl FieldState {
    fn mask(&self) -> u64 {
        width_mask(self.width)
    }

    fn hw_latches(&self) -> bool {
        self.permissions.hw_wr() && (!self.write_enable || self.hw_we)
    }
}

#[derive(Debug, Clone)]
struct RegisterSlot {
    address: u64,
    fields: Vec<usize>,
}

/// APB slave behaving like the module emitted for a [`RegFile`].
///
/// Software writes merge under the byte strobe, hardware-written fields latch their
/// `_hw_next` input every edge (or only with `_hw_we` when gated), and the side signals
/// report what was asserted during the cycle that ended at the last edge.
#[derive(Debug, Clone)]
pub struct RegFileModel {
    name: String,
    registers: Vec<RegisterSlot>,
    fields: Vec<FieldState>,
    by_signal: HashMap<String, usize>,
    wait_states: u32,
    waited: u32,
}

impl RegFileModel {
    pub fn new(rgf: &RegFile, wait_states: u32) -> Self {
        let mut fields = Vec::new();
        let mut registers = Vec::new();
        for reg in rgf.registers() {
            let mut slot = RegisterSlot {
                address: reg.address(),
                fields: Vec::new(),
            };
            for placed in reg.fields() {
                let f = placed.field();
                slot.fields.push(fields.len());
                fields.push(FieldState {
                    signal: rgf.signal_name(reg, placed),
                    offset: placed.offset(),
                    width: placed.width(),
                    permissions: f.permissions(),
                    kind: f.kind(),
                    write_enable: f.has_write_enable(),
                    reset: f.reset_value(),
                    value: f.reset_value(),
                    hw_next: 0,
                    hw_we: false,
                    wr_pulse: false,
                    rd_pulse: false,
                    intr: false,
                });
            }
            registers.push(slot);
        }
        let by_signal = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.signal.clone(), i))
            .collect();
        Self {
            name: rgf.name().to_string(),
            registers,
            fields,
            by_signal,
            wait_states,
            waited: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Restores every field to its reset value and clears the side signals.
    pub fn reset(&mut self) {
        for f in &mut self.fields {
            f.value = f.reset;
            f.wr_pulse = false;
            f.rd_pulse = false;
            f.intr = false;
        }
        self.waited = 0;
    }

    fn field(&self, signal: &str) -> Result<&FieldState, LookupError> {
        self.by_signal
            .get(signal)
            .map(|&i| &self.fields[i])
            .ok_or_else(|| LookupError::FieldNotFound {
                name: signal.to_string(),
            })
    }

    fn field_mut(&mut self, signal: &str) -> Result<&mut FieldState, LookupError> {
        match self.by_signal.get(signal) {
            Some(&i) => Ok(&mut self.fields[i]),
            None => Err(LookupError::FieldNotFound {
                name: signal.to_string(),
            }),
        }
    }

    /// Drives the field's `_hw_next` input.
    pub fn set_hw_next(&mut self, signal: &str, value: u64) -> Result<(), LookupError> {
        let field = self.field_mut(signal)?;
        field.hw_next = value & field.mask();
        Ok(())
    }

    /// Drives the field's `_hw_we` input.
    pub fn set_hw_we(&mut self, signal: &str, enabled: bool) -> Result<(), LookupError> {
        self.field_mut(signal)?.hw_we = enabled;
        Ok(())
    }

    /// Stored value of the field, as seen on its hardware read port.
    pub fn value(&self, signal: &str) -> Result<u64, LookupError> {
        Ok(self.field(signal)?.value)
    }

    pub fn write_pulse(&self, signal: &str) -> Result<bool, LookupError> {
        Ok(self.field(signal)?.wr_pulse)
    }

    pub fn read_pulse(&self, signal: &str) -> Result<bool, LookupError> {
        Ok(self.field(signal)?.rd_pulse)
    }

    pub fn interrupt(&self, signal: &str) -> Result<bool, LookupError> {
        Ok(self.field(signal)?.intr)
    }

    /// Aggregated interrupt output: OR of the field interrupts.
    pub fn interrupt_line(&self) -> bool {
        self.fields.iter().any(|f| f.intr)
    }

    /// Software-visible word at `address`, zero for unmapped addresses.
    pub fn register_word(&self, address: u64) -> u64 {
        self.registers
            .iter()
            .find(|r| r.address == address)
            .map(|r| {
                r.fields
                    .iter()
                    .map(|&i| &self.fields[i])
                    .filter(|f| f.permissions.sw_rd())
                    .fold(0, |word, f| word | ((f.value & f.mask()) << f.offset))
            })
            .unwrap_or(0)
    }

    fn ready(&self) -> bool {
        self.waited >= self.wait_states
    }
}

impl ApbTarget for RegFileModel {
    fn respond(&self, bus: &mut ApbBus) {
        bus.pready = self.ready();
        bus.prdata = self.register_word(bus.paddr);
        bus.pslverr = false;
    }

    fn tick(&mut self, bus: &ApbBus) {
        let access = bus.in_access();
        let completing = access && self.ready();
        let slot = self
            .registers
            .iter()
            .position(|r| r.address == bus.paddr);
        let lanes = bus.config.strobe_lanes();
        let strobe_mask = strobe_to_bit_mask(bus.pstrb, lanes);

        for f in &mut self.fields {
            f.wr_pulse = false;
            f.rd_pulse = false;
            f.intr = false;
        }

        if completing {
            if let Some(slot) = slot {
                for &i in &self.registers[slot].fields {
                    let f = &mut self.fields[i];
                    let lane_mask = (strobe_mask >> f.offset) & f.mask();
                    if bus.pwrite {
                        let touched = lane_mask != 0;
                        if f.permissions.sw_wr() && touched {
                            let data = (bus.pwdata >> f.offset) & f.mask();
                            f.value = (f.value & !lane_mask) | (data & lane_mask);
                            debug!("{}: sw write -> {:#x}", f.signal, f.value);
                        }
                        if f.kind == FieldKind::PulseOnWrite
                            && (touched || !f.permissions.sw_wr())
                        {
                            f.wr_pulse = true;
                        }
                    } else if f.kind == FieldKind::PulseOnRead {
                        f.rd_pulse = true;
                    }
                }
            }
        }

        for f in &mut self.fields {
            if f.kind == FieldKind::Interrupt && f.permissions.hw_wr() {
                let gate = !f.write_enable || f.hw_we;
                f.intr = gate && f.value & 1 == 0 && f.hw_next & 1 == 1;
            }
            if f.hw_latches() {
                f.value = f.hw_next & f.mask();
            }
        }

        if access && !completing {
            self.waited += 1;
        } else {
            self.waited = 0;
        }
    }
}
