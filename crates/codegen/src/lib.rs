// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Renderers for [`regen_ir::RegFile`].
//!
//! Every renderer is a pure function of the model: calling it twice yields identical text.

pub mod html;
pub mod rust;
pub mod verilog;

pub use html::render_html;
pub use rust::{render_rust, BindingGenerator};
pub use verilog::{
    field_hardware, field_ports, interrupt_signal, register_hardware, register_ports,
    render_instance, render_verilog, Port, PortDirection,
};
