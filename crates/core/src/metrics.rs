// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::apb::ApbBus;
use crate::transaction::Transaction;
use crate::BusObserver;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Bus utilisation counters collected from testbench edges.
#[derive(Debug)]
pub struct BusMetrics {
    cycle_count: AtomicU64,
    busy_cycle_count: AtomicU64,
    read_count: AtomicU64,
    write_count: AtomicU64,
    accesses_by_field: Mutex<HashMap<String, u64>>,
}

/// Point-in-time copy of [`BusMetrics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub busy_cycles: u64,
    pub reads: u64,
    pub writes: u64,
}

impl Default for BusMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl BusMetrics {
    pub fn new() -> Self {
        Self {
            cycle_count: AtomicU64::new(0),
            busy_cycle_count: AtomicU64::new(0),
            read_count: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
            accesses_by_field: Mutex::new(HashMap::new()),
        }
    }

    pub fn reset(&self) {
        self.cycle_count.store(0, Ordering::SeqCst);
        self.busy_cycle_count.store(0, Ordering::SeqCst);
        self.read_count.store(0, Ordering::SeqCst);
        self.write_count.store(0, Ordering::SeqCst);
        if let Ok(mut m) = self.accesses_by_field.lock() {
            m.clear();
        }
    }

    pub fn get_cycles(&self) -> u64 {
        self.cycle_count.load(Ordering::SeqCst)
    }

    /// Cycles in which `psel` was asserted.
    pub fn get_busy_cycles(&self) -> u64 {
        self.busy_cycle_count.load(Ordering::SeqCst)
    }

    pub fn get_reads(&self) -> u64 {
        self.read_count.load(Ordering::SeqCst)
    }

    pub fn get_writes(&self) -> u64 {
        self.write_count.load(Ordering::SeqCst)
    }

    pub fn get_transactions(&self) -> u64 {
        self.get_reads() + self.get_writes()
    }

    pub fn get_field_accesses(&self, field: &str) -> u64 {
        self.accesses_by_field
            .lock()
            .ok()
            .and_then(|m| m.get(field).copied())
            .unwrap_or(0)
    }

    /// Fraction of cycles the bus was selected.
    pub fn get_utilisation(&self) -> f64 {
        let cycles = self.get_cycles();
        if cycles > 0 {
            self.get_busy_cycles() as f64 / cycles as f64
        } else {
            0.0
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles: self.get_cycles(),
            busy_cycles: self.get_busy_cycles(),
            reads: self.get_reads(),
            writes: self.get_writes(),
        }
    }
}

impl BusObserver for BusMetrics {
    fn on_edge(&self, _time_ns: u64, bus: &ApbBus) {
        self.cycle_count.fetch_add(1, Ordering::SeqCst);
        if bus.psel {
            self.busy_cycle_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn on_transaction(&self, tx: &Transaction) {
        if tx.is_write {
            self.write_count.fetch_add(1, Ordering::SeqCst);
        } else {
            self.read_count.fetch_add(1, Ordering::SeqCst);
        }
        if let Ok(mut m) = self.accesses_by_field.lock() {
            *m.entry(tx.field_name.clone()).or_insert(0) += 1;
        }
    }
}
