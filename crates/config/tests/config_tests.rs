// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use regen_config::{BenchScript, RegFileDescriptor, Step};
use std::fs;

#[test]
fn test_description_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgf.yaml");
    fs::write(
        &path,
        r#"
name: "timer_rgf"
registers:
  - name: ctrl
    fields:
      - name: enable
      - name: prescaler
        width: 8
  - name: count
    fields:
      - name: value
        kind: status
        width: 32
"#,
    )
    .unwrap();

    let desc = RegFileDescriptor::from_file(&path).unwrap();
    assert_eq!(desc.schema_version, "1.0");
    let rgf = desc.to_regfile().unwrap();
    assert_eq!(rgf.registers().len(), 2);
    assert_eq!(rgf.register("ctrl").unwrap().field("prescaler").unwrap().offset(), 8);
    assert_eq!(rgf.register("count").unwrap().address(), 4);
}

#[test]
fn test_missing_description_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = RegFileDescriptor::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read register file description"));
}

#[test]
fn test_bench_script_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.yaml");
    fs::write(
        &path,
        r#"
schema_version: "1.0"
description: "timer.yaml"
limits:
  max_cycles: 500
steps:
  - write: { field: timer_rgf_ctrl_enable, value: 1 }
  - idle
"#,
    )
    .unwrap();

    let script = BenchScript::from_file(&path).unwrap();
    assert_eq!(script.limits.ready_timeout_cycles, None);
    assert_eq!(script.steps[1], Step::Idle);
    assert_eq!(script.description_path(&path), dir.path().join("timer.yaml"));
}
