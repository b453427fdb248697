// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! SystemVerilog register-file module and its instantiation stub.
//!
//! Text is assembled bottom-up: every field contributes its flip-flop and side signals, every
//! register wraps its fields and adds a read-back word, and the register file substitutes the
//! collected pieces into the module template.

use regen_ir::{FieldKind, PlacedField, RegFile, Register};
use std::fmt;
use tracing::debug;

const MODULE_TEMPLATE: &str = include_str!("../templates/rgf_module.v");
const INSTANCE_TEMPLATE: &str = include_str!("../templates/rgf_inst.v");

/// Direction of a hardware port, seen from the register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => f.write_str("input"),
            PortDirection::Output => f.write_str("output"),
        }
    }
}

/// One hardware-side port of the generated module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub direction: PortDirection,
    pub width: u32,
    pub signal: String,
    /// Item the port belongs to, `<rgf>_<reg>_<field>` or the register file name.
    pub owner: String,
    pub purpose: &'static str,
}

impl Port {
    /// Line of the module port list.
    pub fn module_decl(&self) -> String {
        format!(
            "    {:<6} logic [{}-1:0] {}, // {}: {}",
            self.direction.to_string(),
            self.width,
            self.signal,
            self.owner,
            self.purpose
        )
    }

    /// Line of the instantiation stub.
    pub fn instance_conn(&self) -> String {
        format!(
            "    .{sig}({sig}), // {}: {}, {}({}b)",
            self.owner,
            self.purpose,
            self.direction,
            self.width,
            sig = self.signal
        )
    }
}

/// Name of the aggregated interrupt output.
pub fn interrupt_signal(rgf: &RegFile) -> String {
    format!("{}___intr", rgf.name())
}

/// Hardware ports of one field, in the order they appear in the module.
pub fn field_ports(rgf: &RegFile, reg: &Register, field: &PlacedField) -> Vec<Port> {
    let sig = rgf.signal_name(reg, field);
    let f = field.field();
    let perms = f.permissions();
    let port = |direction, width, signal: String, purpose| Port {
        direction,
        width,
        signal,
        owner: sig.clone(),
        purpose,
    };

    let mut ports = Vec::new();
    if perms.hw_rd() {
        ports.push(port(
            PortDirection::Output,
            field.width(),
            sig.clone(),
            "HW read port",
        ));
    }
    if perms.hw_wr() {
        ports.push(port(
            PortDirection::Input,
            field.width(),
            format!("{}_hw_next", sig),
            "HW write port",
        ));
    }
    if f.has_write_enable() {
        ports.push(port(
            PortDirection::Input,
            1,
            format!("{}_hw_we", sig),
            "HW write enable bit",
        ));
    }
    match f.kind() {
        FieldKind::PulseOnWrite => ports.push(port(
            PortDirection::Output,
            1,
            format!("{}_sw_wr_pulse", sig),
            "SW write pulse",
        )),
        FieldKind::PulseOnRead => ports.push(port(
            PortDirection::Output,
            1,
            format!("{}_sw_rd_pulse", sig),
            "SW read pulse",
        )),
        _ => {}
    }
    ports
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn address_match(reg: &Register) -> String {
    format!("(paddr == ADD_W'({}))", reg.address())
}

/// Storage and side signals of one field.
pub fn field_hardware(rgf: &RegFile, reg: &Register, field: &PlacedField) -> String {
    let sig = rgf.signal_name(reg, field);
    let f = field.field();
    let perms = f.permissions();
    let width = field.width();
    let slice = format!("[{}:{}]", field.msb(), field.offset());
    let addr = address_match(reg);

    let mut out = String::new();
    out.push_str(&format!("// {}: {}\n", sig, one_line(f.description())));
    if !perms.hw_rd() {
        out.push_str(&format!("logic [{}-1:0] {};\n", width, sig));
    }
    if perms.sw_wr() {
        out.push_str(&format!("logic {}_sw_we;\n", sig));
        out.push_str(&format!(
            "assign {}_sw_we = sw_wr & {} & |pstrb_mask{};\n",
            sig, addr, slice
        ));
    }

    if perms.sw_wr() || perms.hw_wr() {
        out.push_str("always_ff @(posedge clk or negedge rst_n) begin\n");
        out.push_str("    if (!rst_n) begin\n");
        out.push_str(&format!("        {} <= {}'h{:x};\n", sig, width, f.reset_value()));
        if perms.sw_wr() {
            out.push_str(&format!("    end else if ({}_sw_we) begin\n", sig));
            out.push_str(&format!(
                "        {sig} <= ({sig} & ~pstrb_mask{s}) | (pwdata{s} & pstrb_mask{s});\n",
                sig = sig,
                s = slice
            ));
        }
        if perms.hw_wr() {
            if f.has_write_enable() {
                out.push_str(&format!("    end else if ({}_hw_we) begin\n", sig));
            } else {
                out.push_str("    end else begin\n");
            }
            out.push_str(&format!("        {} <= {}_hw_next;\n", sig, sig));
        }
        out.push_str("    end\n");
        out.push_str("end\n");
    } else {
        out.push_str(&format!("assign {} = {}'h{:x};\n", sig, width, f.reset_value()));
    }

    match f.kind() {
        FieldKind::PulseOnWrite => {
            let strobe = if perms.sw_wr() {
                format!("{}_sw_we", sig)
            } else {
                format!("sw_wr & {}", addr)
            };
            out.push_str(&format!("assign {}_sw_wr_pulse = {};\n", sig, strobe));
        }
        FieldKind::PulseOnRead => {
            out.push_str(&format!("assign {}_sw_rd_pulse = sw_rd & {};\n", sig, addr));
        }
        FieldKind::Interrupt if perms.hw_wr() => {
            let gate = if f.has_write_enable() {
                format!(" & {}_hw_we", sig)
            } else {
                String::new()
            };
            out.push_str(&format!("logic {}_intr;\n", sig));
            out.push_str(&format!(
                "assign {sig}_intr = ~{sig} & {sig}_hw_next{};\n",
                gate,
                sig = sig
            ));
        }
        _ => {}
    }
    out
}

/// Module and instance port lines of one register, in field order.
pub fn register_ports(rgf: &RegFile, reg: &Register) -> (Vec<String>, Vec<String>) {
    reg.fields()
        .iter()
        .flat_map(|field| field_ports(rgf, reg, field))
        .map(|port| (port.module_decl(), port.instance_conn()))
        .unzip()
}

/// Field text of one register followed by its read-back word.
pub fn register_hardware(rgf: &RegFile, reg: &Register) -> String {
    let word = format!("{}_{}", rgf.name(), reg.name());
    let mut out = String::new();
    out.push_str(&format!(
        "// ---- {} @ 0x{:x}: {}\n",
        word,
        reg.address(),
        one_line(reg.description())
    ));
    for field in reg.fields() {
        out.push_str(&field_hardware(rgf, reg, field));
        out.push('\n');
    }

    let readable: Vec<&PlacedField> = reg
        .fields()
        .iter()
        .filter(|f| f.field().permissions().sw_rd())
        .collect();
    out.push_str(&format!("logic [DAT_W-1:0] {};\n", word));
    if readable.is_empty() {
        out.push_str(&format!("assign {} = '0;\n", word));
    } else {
        out.push_str("always_comb begin\n");
        out.push_str(&format!("    {} = '0;\n", word));
        for field in readable {
            out.push_str(&format!(
                "    {}[{}:{}] = {};\n",
                word,
                field.msb(),
                field.offset(),
                rgf.signal_name(reg, field)
            ));
        }
        out.push_str("end\n");
    }
    out
}

fn interrupt_port(rgf: &RegFile) -> Port {
    Port {
        direction: PortDirection::Output,
        width: 1,
        signal: interrupt_signal(rgf),
        owner: rgf.name().to_string(),
        purpose: "aggregated interrupt",
    }
}

fn all_ports(rgf: &RegFile) -> (Vec<String>, Vec<String>) {
    let (mut module, mut instance): (Vec<String>, Vec<String>) = rgf
        .registers()
        .iter()
        .map(|reg| register_ports(rgf, reg))
        .fold((Vec::new(), Vec::new()), |(mut m, mut i), (rm, ri)| {
            m.extend(rm);
            i.extend(ri);
            (m, i)
        });
    if rgf.has_interrupts() {
        let port = interrupt_port(rgf);
        module.push(port.module_decl());
        instance.push(port.instance_conn());
    }
    (module, instance)
}

/// Complete register-file module.
pub fn render_verilog(rgf: &RegFile) -> String {
    debug!(
        "Rendering Verilog for '{}' ({} registers)",
        rgf.name(),
        rgf.registers().len()
    );
    let (ports, _) = all_ports(rgf);

    let content = rgf
        .registers()
        .iter()
        .map(|reg| register_hardware(rgf, reg))
        .collect::<Vec<_>>()
        .join("\n");

    let intr = if rgf.has_interrupts() {
        let sources: Vec<String> = rgf
            .interrupts()
            .map(|(reg, field)| format!("{}_intr", rgf.signal_name(reg, field)))
            .collect();
        format!(
            "assign {} = {};\n",
            interrupt_signal(rgf),
            sources.join(" | ")
        )
    } else {
        String::new()
    };

    let mux = rgf
        .registers()
        .iter()
        .map(|reg| {
            format!(
                "        ADD_W'({}): prdata = {}_{};",
                reg.address(),
                rgf.name(),
                reg.name()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let address_width = rgf.address_width().to_string();
    let register_width = rgf.register_width().to_string();
    let ports = ports.join("\n");
    fill_template(
        MODULE_TEMPLATE,
        &[
            ("{RGF_NAME}", rgf.name()),
            ("{RGF_ADD_WIDTH}", address_width.as_str()),
            ("{RGF_REG_WIDTH}", register_width.as_str()),
            ("{HW_RGF_PORTS}", ports.as_str()),
            ("{RGF_CONTENT}", content.as_str()),
            ("{RGF_INTR}", intr.as_str()),
            ("{OUTPUT_MUX}", mux.as_str()),
        ],
    )
}

/// Instantiation stub connecting every port to a same-named signal.
pub fn render_instance(rgf: &RegFile) -> String {
    let (_, ports) = all_ports(rgf);
    fill_template(
        INSTANCE_TEMPLATE,
        &[("{RGF_NAME}", rgf.name()), ("{RGF_PORTS}", ports.join("\n").as_str())],
    )
}

/// Substitutes placeholders in one pass over the template.
///
/// Inserted text is never scanned again, so descriptions may contain placeholder names.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use regen_ir::{Field, Permissions};

    #[test]
    fn test_placeholder_text_in_descriptions_is_kept() {
        let reg = Register::with_fields(
            "cfg",
            "{OUTPUT_MUX} and {RGF_INTR}",
            32,
            [Field::interrupt("ovfl").describe("raises {RGF_NAME}")],
        )
        .unwrap();
        let rgf = RegFile::new("irq", "", [reg]).unwrap();
        let text = render_verilog(&rgf);
        assert!(text.contains("// ---- irq_cfg @ 0x0: {OUTPUT_MUX} and {RGF_INTR}"));
        assert!(text.contains("// irq_cfg_ovfl: raises {RGF_NAME}"));
        assert_eq!(text.matches("ADD_W'(0): prdata = irq_cfg;").count(), 1);
        assert_eq!(text.matches("assign irq___intr = irq_cfg_ovfl_intr;").count(), 1);
        assert!(text.contains("pstrb_mask[i*8 +: 8] = {8{pstrb[i]}};"));
    }

    fn fifo() -> RegFile {
        let cfg = Register::with_fields(
            "cfg",
            "configuration",
            32,
            [
                Field::config("af_th", 4).reset(0xc).describe("almost full\nthreshold"),
                Field::pulse_on_write("flush", 1),
            ],
        )
        .unwrap();
        let sts = Register::with_fields(
            "sts",
            "status",
            32,
            [
                Field::status("level", 5).write_enable(true),
                Field::pulse_on_read("pop", 8),
            ],
        )
        .unwrap();
        let intr = Register::with_fields(
            "intr",
            "interrupts",
            32,
            [Field::interrupt("ovfl"), Field::interrupt("udfl")],
        )
        .unwrap();
        RegFile::new("fifo", "fifo registers", [cfg, sts, intr]).unwrap()
    }

    #[test]
    fn test_field_ports() {
        let rgf = fifo();
        let cfg = rgf.register("cfg").unwrap();
        let ports = field_ports(&rgf, cfg, cfg.field("af_th").unwrap());
        assert_eq!(ports.len(), 1);
        assert_eq!(
            ports[0].module_decl(),
            "    output logic [4-1:0] fifo_cfg_af_th, // fifo_cfg_af_th: HW read port"
        );
        assert_eq!(
            ports[0].instance_conn(),
            "    .fifo_cfg_af_th(fifo_cfg_af_th), // fifo_cfg_af_th: HW read port, output(4b)"
        );

        let sts = rgf.register("sts").unwrap();
        let level: Vec<String> = field_ports(&rgf, sts, sts.field("level").unwrap())
            .into_iter()
            .map(|p| p.signal)
            .collect();
        assert_eq!(level, vec!["fifo_sts_level_hw_next", "fifo_sts_level_hw_we"]);

        let pop: Vec<String> = field_ports(&rgf, sts, sts.field("pop").unwrap())
            .into_iter()
            .map(|p| p.signal)
            .collect();
        assert_eq!(pop, vec!["fifo_sts_pop_hw_next", "fifo_sts_pop_sw_rd_pulse"]);
    }

    #[test]
    fn test_config_field_flip_flop() {
        let rgf = fifo();
        let cfg = rgf.register("cfg").unwrap();
        let text = field_hardware(&rgf, cfg, cfg.field("af_th").unwrap());
        assert!(text.starts_with("// fifo_cfg_af_th: almost full threshold\n"));
        assert!(text.contains(
            "assign fifo_cfg_af_th_sw_we = sw_wr & (paddr == ADD_W'(0)) & |pstrb_mask[3:0];"
        ));
        assert!(text.contains("fifo_cfg_af_th <= 4'hc;"));
        assert!(text.contains(
            "fifo_cfg_af_th <= (fifo_cfg_af_th & ~pstrb_mask[3:0]) | (pwdata[3:0] & pstrb_mask[3:0]);"
        ));
        // hardware reads it through the output port, no local declaration
        assert!(!text.contains("logic [4-1:0] fifo_cfg_af_th;"));
        assert!(!text.contains("_hw_next"));
    }

    #[test]
    fn test_status_field_write_enable() {
        let rgf = fifo();
        let sts = rgf.register("sts").unwrap();
        let text = field_hardware(&rgf, sts, sts.field("level").unwrap());
        assert!(text.contains("logic [5-1:0] fifo_sts_level;"));
        assert!(text.contains("end else if (fifo_sts_level_hw_we) begin"));
        assert!(text.contains("fifo_sts_level <= fifo_sts_level_hw_next;"));
        assert!(!text.contains("_sw_we"));
    }

    #[test]
    fn test_pulses() {
        let rgf = fifo();
        let cfg = rgf.register("cfg").unwrap();
        let flush = field_hardware(&rgf, cfg, cfg.field("flush").unwrap());
        assert!(flush.contains("assign fifo_cfg_flush_sw_wr_pulse = fifo_cfg_flush_sw_we;"));

        let sts = rgf.register("sts").unwrap();
        let pop = field_hardware(&rgf, sts, sts.field("pop").unwrap());
        assert!(pop.contains("assign fifo_sts_pop_sw_rd_pulse = sw_rd & (paddr == ADD_W'(4));"));
    }

    #[test]
    fn test_interrupt_edge_detect() {
        let rgf = fifo();
        let intr = rgf.register("intr").unwrap();
        let text = field_hardware(&rgf, intr, intr.field("ovfl").unwrap());
        assert!(text.contains("assign fifo_intr_ovfl_intr = ~fifo_intr_ovfl & fifo_intr_ovfl_hw_next;"));

        let module = render_verilog(&rgf);
        assert!(module.contains("output logic [1-1:0] fifo___intr,"));
        assert!(module.contains("assign fifo___intr = fifo_intr_ovfl_intr | fifo_intr_udfl_intr;"));
    }

    #[test]
    fn test_no_interrupt_port_without_interrupts() {
        let reg = Register::with_fields("cfg", "", 32, [Field::config("a", 1)]).unwrap();
        let rgf = RegFile::new("plain", "", [reg]).unwrap();
        let module = render_verilog(&rgf);
        assert!(!module.contains("___intr"));
        assert!(!render_instance(&rgf).contains("___intr"));
    }

    #[test]
    fn test_read_back_word() {
        let rgf = fifo();
        let cfg = rgf.register("cfg").unwrap();
        let text = register_hardware(&rgf, cfg);
        assert!(text.contains("    fifo_cfg[3:0] = fifo_cfg_af_th;"));
        assert!(text.contains("    fifo_cfg[8:8] = fifo_cfg_flush;"));

        let write_only =
            Register::with_fields("w", "", 32, [Field::new("x", Permissions::SW_WR, 8)]).unwrap();
        let rgf = RegFile::new("r", "", [write_only]).unwrap();
        let text = register_hardware(&rgf, &rgf.registers()[0]);
        assert!(text.contains("assign r_w = '0;"));
    }

    #[test]
    fn test_module_structure() {
        let rgf = fifo();
        let module = render_verilog(&rgf);
        assert!(module.starts_with("module fifo #("));
        assert!(module.contains("parameter ADD_W = 3,"));
        assert!(module.contains("parameter DAT_W = 32,"));
        assert_eq!(module.matches("case (paddr)").count(), 1);
        assert!(module.contains("        ADD_W'(0): prdata = fifo_cfg;"));
        assert!(module.contains("        ADD_W'(4): prdata = fifo_sts;"));
        assert!(module.contains("        ADD_W'(8): prdata = fifo_intr;"));
        assert!(!module.contains("{RGF_"));
        assert!(!module.contains("{HW_RGF_PORTS}"));
        assert!(!module.contains("{OUTPUT_MUX}"));
        assert!(module.trim_end().ends_with("endmodule"));
    }

    #[test]
    fn test_instance_stub() {
        let rgf = fifo();
        let inst = render_instance(&rgf);
        assert!(inst.starts_with("fifo fifo_inst ("));
        assert!(inst.contains(".fifo_cfg_flush_sw_wr_pulse(fifo_cfg_flush_sw_wr_pulse),"));
        assert!(inst.contains(".fifo___intr(fifo___intr), // fifo: aggregated interrupt, output(1b)"));
        assert!(inst.contains("    .pslverr(pslverr)\n);"));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let rgf = fifo();
        assert_eq!(render_verilog(&rgf), render_verilog(&rgf));
        assert_eq!(render_instance(&rgf), render_instance(&rgf));
    }
}
