// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::apb::{ApbBus, ApbError, ApbMasterDriver, ApbMonitor};
use crate::transaction::Transaction;
use crate::{ApbTarget, BusObserver};
use std::sync::Arc;
use tracing::{debug, info};

/// Clocks a driver, a monitor and a target around one shared bus.
#[derive(Debug)]
pub struct Testbench<T: ApbTarget> {
    pub bus: ApbBus,
    pub driver: ApbMasterDriver,
    pub monitor: ApbMonitor,
    pub target: T,
    clock_period_ns: u64,
    time_ns: u64,
    cycles: u64,
    observers: Vec<Arc<dyn BusObserver>>,
    started: bool,
}

impl<T: ApbTarget> Testbench<T> {
    pub fn new(
        bus: ApbBus,
        driver: ApbMasterDriver,
        monitor: ApbMonitor,
        target: T,
        clock_period_ns: u64,
    ) -> Self {
        Self {
            bus,
            driver,
            monitor,
            target,
            clock_period_ns,
            time_ns: 0,
            cycles: 0,
            observers: Vec::new(),
            started: false,
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn BusObserver>) {
        self.observers.push(observer);
    }

    pub fn time_ns(&self) -> u64 {
        self.time_ns
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn clock_period_ns(&self) -> u64 {
        self.clock_period_ns
    }

    /// Hands a transaction to the driver; never blocks.
    pub fn submit(&mut self, tx: Transaction) {
        self.driver.submit(tx, &mut self.bus);
        self.target.respond(&mut self.bus);
    }

    fn start(&mut self) {
        if !self.started {
            self.started = true;
            for observer in &self.observers {
                observer.on_simulation_start();
            }
        }
    }

    /// Notifies observers that the run is over.
    pub fn finish(&mut self) {
        if self.started {
            self.started = false;
            for observer in &self.observers {
                observer.on_simulation_stop();
            }
            info!(
                "Testbench stopped after {} cycles ({} ns)",
                self.cycles, self.time_ns
            );
        }
    }

    /// Advances one rising clock edge.
    ///
    /// Returns the transaction the monitor saw complete at this edge. A monitor error takes
    /// precedence over a driver error raised at the same edge; both leave the bench consistent.
    pub fn step(&mut self) -> Result<Option<Transaction>, ApbError> {
        self.start();
        self.target.respond(&mut self.bus);

        self.time_ns += self.clock_period_ns;
        self.cycles += 1;

        let observed = self.monitor.sample(&self.bus, self.time_ns);
        self.target.tick(&self.bus);
        let driven = self.driver.tick(&mut self.bus);
        self.target.respond(&mut self.bus);

        for observer in &self.observers {
            observer.on_edge(self.time_ns, &self.bus);
        }
        if let Ok(Some(tx)) = &observed {
            for observer in &self.observers {
                observer.on_transaction(tx);
            }
        }

        let observed = observed?;
        driven?;
        Ok(observed)
    }

    /// Advances `cycles` edges.
    pub fn run_cycles(&mut self, cycles: u64) -> Result<(), ApbError> {
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(())
    }

    /// Steps until the driver has nothing left to do.
    pub fn run_until_idle(&mut self, max_cycles: u64) -> Result<u64, ApbError> {
        let mut spent = 0;
        while !self.driver.is_idle() {
            if spent >= max_cycles {
                return Err(ApbError::CycleLimit { limit: max_cycles });
            }
            self.step()?;
            spent += 1;
        }
        debug!("Driver idle after {} cycles", spent);
        Ok(spent)
    }
}
