// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use bitflags::bitflags;

bitflags! {
    /// Who may read and write a field.
    ///
    /// Software accesses go through the bus; hardware accesses go through the field's ports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u8 {
        /// Software may read the field over the bus.
        const SW_RD = 0b0001;
        /// Software may write the field over the bus.
        const SW_WR = 0b0010;
        /// Hardware sees the field on an output port.
        const HW_RD = 0b0100;
        /// Hardware drives the field through a `_hw_next` input.
        const HW_WR = 0b1000;
    }
}

impl Permissions {
    /// Configuration preset: written by software, consumed by hardware.
    pub const CONFIG: Self = Self::SW_RD.union(Self::SW_WR).union(Self::HW_RD);

    /// Status preset: written by hardware, observed by software.
    pub const STATUS: Self = Self::SW_RD.union(Self::HW_WR);

    /// Builds a permission set from the four access booleans.
    pub fn from_bools(sw_rd: bool, sw_wr: bool, hw_rd: bool, hw_wr: bool) -> Self {
        let mut p = Self::empty();
        p.set(Self::SW_RD, sw_rd);
        p.set(Self::SW_WR, sw_wr);
        p.set(Self::HW_RD, hw_rd);
        p.set(Self::HW_WR, hw_wr);
        p
    }

    /// Software read permission.
    pub fn sw_rd(self) -> bool {
        self.contains(Self::SW_RD)
    }

    /// Software write permission.
    pub fn sw_wr(self) -> bool {
        self.contains(Self::SW_WR)
    }

    /// Hardware read permission.
    pub fn hw_rd(self) -> bool {
        self.contains(Self::HW_RD)
    }

    /// Hardware write permission.
    pub fn hw_wr(self) -> bool {
        self.contains(Self::HW_WR)
    }

    /// A field has a single writer: software and hardware never both write it.
    pub fn is_valid(self) -> bool {
        !(self.sw_wr() && self.hw_wr())
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::CONFIG
    }
}
