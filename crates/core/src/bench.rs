// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Executes bench scripts against the behavioral register-file model.

use crate::apb::{ApbBus, ApbConfig, ApbError, ApbMasterDriver, ApbMonitor, CallbackError};
use crate::metrics::{BusMetrics, MetricsSnapshot};
use crate::model::RegFileModel;
use crate::table::FieldTable;
use crate::testbench::Testbench;
use crate::transaction::Transaction;
use crate::BusObserver;
use regen_config::{BenchScript, Step};
use regen_ir::RegFile;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Completed,
    MaxCycles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectationResult {
    pub field: String,
    pub expected: u64,
    /// `None` when the field was never read.
    pub actual: Option<u64>,
    pub passed: bool,
    pub time_ns: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub regfile: String,
    pub cycles: u64,
    pub time_ns: u64,
    pub transactions: Vec<Transaction>,
    pub expectations: Vec<ExpectationResult>,
    pub failures: Vec<String>,
    pub metrics: MetricsSnapshot,
    pub stop_reason: StopReason,
    pub passed: bool,
}

pub struct BenchRunner {
    testbench: Testbench<RegFileModel>,
    table: Arc<FieldTable>,
    metrics: Arc<BusMetrics>,
    steps: Vec<Step>,
    max_cycles: u64,
    failures: Vec<String>,
    expectations: Vec<ExpectationResult>,
}

impl std::fmt::Debug for BenchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchRunner")
            .field("regfile", &self.table.regfile())
            .field("steps", &self.steps.len())
            .field("max_cycles", &self.max_cycles)
            .finish()
    }
}

impl BenchRunner {
    pub fn new(script: &BenchScript, rgf: &RegFile) -> Result<Self, ApbError> {
        let config = ApbConfig {
            address_width: script.bus.address_width,
            data_width: script.bus.data_width,
        };
        if rgf.register_width() > config.data_width {
            return Err(ApbError::BusWidth {
                data_width: config.data_width,
                register_width: rgf.register_width(),
            });
        }

        let table = Arc::new(FieldTable::from_regfile(rgf, config.data_width));
        let mut testbench = Testbench::new(
            ApbBus::new(config),
            ApbMasterDriver::new(script.limits.ready_timeout_cycles),
            ApbMonitor::new(Arc::clone(&table)),
            RegFileModel::new(rgf, script.target.wait_states),
            script.clock_period_ns,
        );
        let metrics = Arc::new(BusMetrics::new());
        testbench.add_observer(metrics.clone());

        Ok(Self {
            testbench,
            table,
            metrics,
            steps: script.steps.clone(),
            max_cycles: script.limits.max_cycles,
            failures: Vec::new(),
            expectations: Vec::new(),
        })
    }

    pub fn add_observer(&mut self, observer: Arc<dyn BusObserver>) {
        self.testbench.add_observer(observer);
    }

    /// Registers a monitor callback run for every observed transaction.
    pub fn add_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Transaction) -> Result<(), CallbackError> + Send + 'static,
    {
        self.testbench.monitor.add_callback(callback);
    }

    pub fn table(&self) -> &FieldTable {
        &self.table
    }

    /// Advances one edge. Returns `false` once the cycle budget is spent.
    fn clock(&mut self) -> Result<bool, ApbError> {
        if self.testbench.cycles() >= self.max_cycles {
            return Ok(false);
        }
        match self.testbench.step() {
            Ok(_) => Ok(true),
            Err(e @ ApbError::ReadyTimeout { .. }) => {
                self.failures.push(e.to_string());
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    fn clock_until_idle(&mut self) -> Result<bool, ApbError> {
        while !self.testbench.driver.is_idle() {
            if !self.clock()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn execute(&mut self, step: &Step) -> Result<bool, ApbError> {
        match step {
            Step::Write { field, value } => {
                let tx = Transaction::write(&self.table, field, *value)?;
                self.testbench.submit(tx);
                Ok(true)
            }
            Step::Read { field } => {
                let tx = Transaction::read(&self.table, field)?;
                self.testbench.submit(tx);
                Ok(true)
            }
            Step::HwNext { field, value } => {
                self.testbench.target.set_hw_next(field, *value)?;
                Ok(true)
            }
            Step::HwWe { field, value } => {
                self.testbench.target.set_hw_we(field, *value)?;
                Ok(true)
            }
            Step::Idle => self.clock_until_idle(),
            Step::Wait { cycles } => {
                for _ in 0..*cycles {
                    if !self.clock()? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Step::Expect { field, value } => {
                self.table.locate_field_by_name(field)?;
                if !self.clock_until_idle()? {
                    return Ok(false);
                }
                let actual = self
                    .testbench
                    .monitor
                    .last_read(field)
                    .and_then(|tx| tx.field_data);
                let passed = actual == Some(*value);
                if !passed {
                    warn!(
                        "Expectation failed: '{}' expected {:#x}, got {:?}",
                        field, value, actual
                    );
                }
                self.expectations.push(ExpectationResult {
                    field: field.clone(),
                    expected: *value,
                    actual,
                    passed,
                    time_ns: self.testbench.time_ns(),
                });
                Ok(true)
            }
        }
    }

    /// Runs every step, then clocks until the driver is idle.
    ///
    /// Ready timeouts and failed expectations are recorded in the report; lookup and callback
    /// errors abort the run.
    pub fn run(mut self) -> Result<BenchReport, ApbError> {
        info!(
            "Running {} bench steps against '{}'",
            self.steps.len(),
            self.table.regfile()
        );
        let steps = std::mem::take(&mut self.steps);
        let mut completed = true;
        for step in &steps {
            if !self.execute(step)? {
                completed = false;
                break;
            }
        }
        if completed {
            completed = self.clock_until_idle()?;
        }
        self.testbench.finish();

        let stop_reason = if completed {
            StopReason::Completed
        } else {
            warn!("Bench stopped at the cycle limit of {}", self.max_cycles);
            StopReason::MaxCycles
        };
        let passed = stop_reason == StopReason::Completed
            && self.failures.is_empty()
            && self.expectations.iter().all(|e| e.passed);

        Ok(BenchReport {
            regfile: self.table.regfile().to_string(),
            cycles: self.testbench.cycles(),
            time_ns: self.testbench.time_ns(),
            transactions: self.testbench.monitor.observed().to_vec(),
            expectations: self.expectations,
            failures: self.failures,
            metrics: self.metrics.snapshot(),
            stop_reason,
            passed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regen_ir::{Field, Register};

    fn rgf() -> RegFile {
        let cfg = Register::with_fields("cfg", "", 32, [Field::config("th", 4).reset(2)]).unwrap();
        let sts = Register::with_fields("sts", "", 32, [Field::status("lvl", 8)]).unwrap();
        RegFile::new("b", "", [cfg, sts]).unwrap()
    }

    fn script(yaml_steps: &str) -> BenchScript {
        let yaml = format!(
            "schema_version: \"1.0\"\ndescription: b.yaml\nlimits:\n  max_cycles: 100\nsteps:\n{}",
            yaml_steps
        );
        BenchScript::from_yaml(&yaml).unwrap()
    }

    #[test]
    fn test_write_then_read_back() {
        let s = script(
            "  - write: { field: b_cfg_th, value: 9 }\n  - read: { field: b_cfg_th }\n  - expect: { field: b_cfg_th, value: 9 }\n",
        );
        let report = BenchRunner::new(&s, &rgf()).unwrap().run().unwrap();
        assert!(report.passed);
        assert_eq!(report.transactions.len(), 2);
        assert_eq!(report.expectations[0].actual, Some(9));
        assert_eq!(report.metrics.writes, 1);
        assert_eq!(report.stop_reason, StopReason::Completed);
    }

    #[test]
    fn test_hardware_value_is_read_back() {
        let s = script(
            "  - hw_next: { field: b_sts_lvl, value: 0x42 }\n  - wait: { cycles: 1 }\n  - read: { field: b_sts_lvl }\n  - expect: { field: b_sts_lvl, value: 0x42 }\n",
        );
        let report = BenchRunner::new(&s, &rgf()).unwrap().run().unwrap();
        assert!(report.passed, "{:?}", report.expectations);
    }

    #[test]
    fn test_failed_expectation_fails_the_report() {
        let s = script("  - read: { field: b_cfg_th }\n  - expect: { field: b_cfg_th, value: 3 }\n");
        let report = BenchRunner::new(&s, &rgf()).unwrap().run().unwrap();
        assert!(!report.passed);
        assert_eq!(report.expectations[0].actual, Some(2));
    }

    #[test]
    fn test_unknown_field_aborts() {
        let s = script("  - write: { field: b_cfg_nope, value: 1 }\n");
        let err = BenchRunner::new(&s, &rgf()).unwrap().run().unwrap_err();
        assert!(matches!(err, ApbError::Lookup(_)));
    }

    #[test]
    fn test_cycle_budget() {
        let mut s = script("  - wait: { cycles: 500 }\n");
        s.limits.max_cycles = 20;
        let report = BenchRunner::new(&s, &rgf()).unwrap().run().unwrap();
        assert_eq!(report.stop_reason, StopReason::MaxCycles);
        assert_eq!(report.cycles, 20);
        assert!(!report.passed);
    }

    #[test]
    fn test_ready_timeout_is_recorded() {
        let mut s = script("  - read: { field: b_cfg_th }\n  - write: { field: b_cfg_th, value: 1 }\n");
        s.target.wait_states = 8;
        s.limits.ready_timeout_cycles = Some(2);
        let report = BenchRunner::new(&s, &rgf()).unwrap().run().unwrap();
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures[0].contains("b_cfg_th"));
        assert!(!report.passed);
    }

    #[test]
    fn test_narrow_bus_is_rejected() {
        let mut s = script("  - idle\n");
        s.bus.data_width = 16;
        assert!(matches!(
            BenchRunner::new(&s, &rgf()),
            Err(ApbError::BusWidth { .. })
        ));
    }
}
