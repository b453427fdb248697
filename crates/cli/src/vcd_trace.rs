// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use regen_core::{ApbBus, ApbConfig, BusObserver};
use std::fs::File;
use std::io::BufWriter;
use std::sync::Mutex;
use vcd::{IdCode, TimescaleUnit, Value, Writer};

/// Dumps every APB signal to a VCD file, one timestamp per clock edge.
pub struct VcdObserver {
    state: Mutex<VcdState>,
    ids: VcdIds,
    widths: VcdWidths,
}

struct VcdIds {
    clk: IdCode,
    paddr: IdCode,
    psel: IdCode,
    penable: IdCode,
    pwrite: IdCode,
    pwdata: IdCode,
    pstrb: IdCode,
    pready: IdCode,
    prdata: IdCode,
    pslverr: IdCode,
}

struct VcdWidths {
    addr: u32,
    data: u32,
    strb: u32,
}

struct VcdState {
    writer: Writer<BufWriter<File>>,
    half_period: u64,
}

impl VcdObserver {
    pub fn new(
        path: std::path::PathBuf,
        config: ApbConfig,
        clock_period_ns: u64,
    ) -> anyhow::Result<Self> {
        let file = File::create(path)?;
        let buf = BufWriter::new(file);
        let mut writer = Writer::new(buf);

        let widths = VcdWidths {
            addr: config.address_width,
            data: config.data_width,
            strb: config.strobe_lanes(),
        };

        writer.timescale(1, TimescaleUnit::NS)?;
        writer.add_module("tb")?;
        let clk = writer.add_wire(1, "clk")?;

        writer.add_module("apb")?;
        let paddr = writer.add_wire(widths.addr, "paddr")?;
        let psel = writer.add_wire(1, "psel")?;
        let penable = writer.add_wire(1, "penable")?;
        let pwrite = writer.add_wire(1, "pwrite")?;
        let pwdata = writer.add_wire(widths.data, "pwdata")?;
        let pstrb = writer.add_wire(widths.strb, "pstrb")?;
        let pready = writer.add_wire(1, "pready")?;
        let prdata = writer.add_wire(widths.data, "prdata")?;
        let pslverr = writer.add_wire(1, "pslverr")?;
        writer.upscope()?; // apb

        writer.upscope()?; // tb
        writer.enddefinitions()?;

        writer.timestamp(0)?;
        writer.change_scalar(clk, Value::V0)?;
        writer.change_vector(paddr, u64_to_vec(0, widths.addr))?;
        writer.change_vector(pwdata, u64_to_vec(0, widths.data))?;
        writer.change_vector(prdata, u64_to_vec(0, widths.data))?;
        writer.change_vector(pstrb, u64_to_vec(0, widths.strb))?;
        for id in [psel, penable, pwrite, pready, pslverr] {
            writer.change_scalar(id, Value::V0)?;
        }

        Ok(Self {
            state: Mutex::new(VcdState {
                writer,
                half_period: clock_period_ns / 2,
            }),
            ids: VcdIds {
                clk,
                paddr,
                psel,
                penable,
                pwrite,
                pwdata,
                pstrb,
                pready,
                prdata,
                pslverr,
            },
            widths,
        })
    }

    fn dump(&self, state: &mut VcdState, time_ns: u64, bus: &ApbBus) -> std::io::Result<()> {
        let w = &mut state.writer;
        w.timestamp(time_ns)?;
        w.change_scalar(self.ids.clk, Value::V1)?;
        w.change_vector(self.ids.paddr, u64_to_vec(bus.paddr, self.widths.addr))?;
        w.change_scalar(self.ids.psel, bit(bus.psel))?;
        w.change_scalar(self.ids.penable, bit(bus.penable))?;
        w.change_scalar(self.ids.pwrite, bit(bus.pwrite))?;
        w.change_vector(self.ids.pwdata, u64_to_vec(bus.pwdata, self.widths.data))?;
        w.change_vector(self.ids.pstrb, u64_to_vec(bus.pstrb, self.widths.strb))?;
        w.change_scalar(self.ids.pready, bit(bus.pready))?;
        w.change_vector(self.ids.prdata, u64_to_vec(bus.prdata, self.widths.data))?;
        w.change_scalar(self.ids.pslverr, bit(bus.pslverr))?;

        if state.half_period > 0 {
            w.timestamp(time_ns + state.half_period)?;
            w.change_scalar(self.ids.clk, Value::V0)?;
        }
        Ok(())
    }
}

fn bit(level: bool) -> Value {
    if level {
        Value::V1
    } else {
        Value::V0
    }
}

// MSB first
fn u64_to_vec(val: u64, width: u32) -> Vec<Value> {
    let mut bits = Vec::with_capacity(width as usize);
    for i in (0..width.min(64)).rev() {
        bits.push(bit((val >> i) & 1 == 1));
    }
    bits
}

impl core::fmt::Debug for VcdObserver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "VcdObserver")
    }
}

impl BusObserver for VcdObserver {
    fn on_edge(&self, time_ns: u64, bus: &ApbBus) {
        if let Ok(mut state) = self.state.lock() {
            if let Err(e) = self.dump(&mut state, time_ns, bus) {
                tracing::warn!("VCD write failed at {} ns: {}", time_ns, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u64_to_vec_msb_first() {
        assert_eq!(u64_to_vec(0b10, 3), vec![Value::V0, Value::V1, Value::V0]);
    }
}
