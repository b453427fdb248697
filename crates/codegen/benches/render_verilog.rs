// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use regen_codegen::{render_html, render_verilog};
use regen_ir::{Field, RegFile, Register};

fn wide_regfile(registers: usize) -> RegFile {
    let regs = (0..registers).map(|i| {
        Register::with_fields(
            format!("reg{}", i),
            "benchmark register",
            32,
            [
                Field::config("cfg", 4).reset(3),
                Field::status("sts", 8).write_enable(true),
                Field::pulse_on_write("kick", 1),
                Field::interrupt("irq"),
            ],
        )
        .unwrap()
    });
    RegFile::new("bench_rgf", "benchmark", regs).unwrap()
}

fn bench_render(c: &mut Criterion) {
    let rgf = wide_regfile(256);
    c.bench_function("render_verilog_256_regs", |b| {
        b.iter(|| render_verilog(black_box(&rgf)))
    });
    c.bench_function("render_html_256_regs", |b| {
        b.iter(|| render_html(black_box(&rgf)))
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
