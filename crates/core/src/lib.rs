// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod apb;
pub mod bench;
pub mod codec;
pub mod metrics;
pub mod model;
pub mod table;
pub mod testbench;
pub mod transaction;

pub use apb::{ApbBus, ApbConfig, ApbError, ApbMasterDriver, ApbMonitor, DriverState};
pub use bench::{BenchReport, BenchRunner, ExpectationResult, StopReason};
pub use codec::{field_value_to_register_value, register_value_to_field_value};
pub use metrics::{BusMetrics, MetricsSnapshot};
pub use model::RegFileModel;
pub use table::{FieldTable, LookupError};
pub use testbench::Testbench;
pub use transaction::Transaction;

/// Trait for observing bus activity in a modular way.
pub trait BusObserver: std::fmt::Debug + Send + Sync {
    fn on_simulation_start(&self) {}
    fn on_simulation_stop(&self) {}
    /// Called after every rising edge with the bus as driven for the next cycle.
    fn on_edge(&self, _time_ns: u64, _bus: &ApbBus) {}
    /// Called for every transfer the monitor reconstructed at this edge.
    fn on_transaction(&self, _tx: &Transaction) {}
}

/// Slave side of the bus.
pub trait ApbTarget: std::fmt::Debug + Send {
    /// Drives `pready`, `prdata` and `pslverr` from the current request signals.
    fn respond(&self, bus: &mut ApbBus);
    /// Rising clock edge. `bus` holds the values settled during the cycle that just ended.
    fn tick(&mut self, bus: &ApbBus);
}
