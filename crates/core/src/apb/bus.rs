// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use regen_ir::width_mask;

/// Widths of the APB port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApbConfig {
    pub address_width: u32,
    pub data_width: u32,
}

impl ApbConfig {
    pub fn strobe_lanes(&self) -> u32 {
        self.data_width.div_ceil(8)
    }
}

impl Default for ApbConfig {
    fn default() -> Self {
        Self {
            address_width: 32,
            data_width: 32,
        }
    }
}

/// Current level of every APB signal.
///
/// The master side (`paddr` to `pwakeup`) is written by the driver, the slave side (`pready`,
/// `prdata`, `pslverr`) by the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApbBus {
    pub config: ApbConfig,
    pub paddr: u64,
    pub pprot: u8,
    pub psel: bool,
    pub penable: bool,
    pub pwrite: bool,
    pub pwdata: u64,
    pub pstrb: u64,
    pub pwakeup: bool,
    pub pready: bool,
    pub prdata: u64,
    pub pslverr: bool,
}

impl ApbBus {
    pub fn new(config: ApbConfig) -> Self {
        Self {
            config,
            paddr: 0,
            pprot: 0,
            psel: false,
            penable: false,
            pwrite: false,
            pwdata: 0,
            pstrb: 0,
            pwakeup: false,
            pready: false,
            prdata: 0,
            pslverr: false,
        }
    }

    /// Drives the request phase of a transfer, clipping values to the configured widths.
    pub fn drive_setup(&mut self, address: u64, write: bool, strobe: u64, data: u64) {
        self.paddr = address & width_mask(self.config.address_width);
        self.pwrite = write;
        self.pstrb = strobe & width_mask(self.config.strobe_lanes());
        self.pwdata = if write {
            data & width_mask(self.config.data_width)
        } else {
            0
        };
        self.psel = true;
        self.penable = false;
        self.pwakeup = true;
    }

    /// Returns the master side to its idle levels.
    pub fn release(&mut self) {
        self.psel = false;
        self.penable = false;
        self.pwrite = false;
        self.pwdata = 0;
        self.pstrb = 0;
        self.pwakeup = false;
    }

    /// A transfer completes in the current cycle.
    pub fn transfer_complete(&self) -> bool {
        self.psel && self.penable && self.pready
    }

    /// The master is in the access phase.
    pub fn in_access(&self) -> bool {
        self.psel && self.penable
    }
}

impl Default for ApbBus {
    fn default() -> Self {
        Self::new(ApbConfig::default())
    }
}
