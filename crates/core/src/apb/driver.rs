// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{ApbBus, ApbError};
use crate::transaction::Transaction;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Phase the driver is currently presenting on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    /// `psel` high, `penable` low.
    Setup,
    /// First cycle with `penable` high.
    Access,
    /// Waiting for `pready`.
    Sample,
}

/// APB master: executes queued transactions one at a time, in submission order.
#[derive(Debug)]
pub struct ApbMasterDriver {
    queue: VecDeque<Transaction>,
    in_flight: Option<Transaction>,
    state: DriverState,
    wait_cycles: u64,
    ready_timeout: Option<u64>,
    completed: VecDeque<Transaction>,
}

impl Default for ApbMasterDriver {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ApbMasterDriver {
    /// `ready_timeout` is the number of edges without `pready` after which a transfer fails;
    /// `None` waits forever.
    pub fn new(ready_timeout: Option<u64>) -> Self {
        Self {
            queue: VecDeque::new(),
            in_flight: None,
            state: DriverState::Idle,
            wait_cycles: 0,
            ready_timeout,
            completed: VecDeque::new(),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DriverState::Idle
    }

    /// Transactions not yet completed, including the one on the bus.
    pub fn pending(&self) -> usize {
        self.queue.len() + usize::from(self.in_flight.is_some())
    }

    pub fn in_flight(&self) -> Option<&Transaction> {
        self.in_flight.as_ref()
    }

    pub fn set_ready_timeout(&mut self, ready_timeout: Option<u64>) {
        self.ready_timeout = ready_timeout;
    }

    /// Queues a transaction. When idle, the setup phase is driven immediately.
    pub fn submit(&mut self, tx: Transaction, bus: &mut ApbBus) {
        if self.state == DriverState::Idle {
            self.start(tx, bus);
        } else {
            debug!(
                "APB driver busy, queued {} of '{}' ({} pending)",
                tx.direction(),
                tx.field_name,
                self.pending() + 1
            );
            self.queue.push_back(tx);
        }
    }

    /// Completed transactions, oldest first. Reads carry the captured data.
    pub fn completed(&self) -> impl Iterator<Item = &Transaction> {
        self.completed.iter()
    }

    /// Removes and returns the completed transactions.
    pub fn drain_completed(&mut self) -> Vec<Transaction> {
        self.completed.drain(..).collect()
    }

    fn start(&mut self, tx: Transaction, bus: &mut ApbBus) {
        debug!(
            "APB SETUP: {} '{}' @ {:#x} strb={:#b}",
            tx.direction(),
            tx.field_name,
            tx.register_address,
            tx.byte_strobe
        );
        bus.drive_setup(
            tx.register_address,
            tx.is_write,
            tx.byte_strobe,
            tx.register_data.unwrap_or(0),
        );
        self.in_flight = Some(tx);
        self.wait_cycles = 0;
        self.state = DriverState::Setup;
    }

    /// Dequeues the next transaction into setup, or releases the bus.
    fn advance(&mut self, bus: &mut ApbBus) {
        match self.queue.pop_front() {
            Some(next) => self.start(next, bus),
            None => {
                bus.release();
                self.state = DriverState::Idle;
                debug!("APB driver idle");
            }
        }
    }

    /// Rising clock edge. `bus` holds the values settled during the cycle that just ended.
    pub fn tick(&mut self, bus: &mut ApbBus) -> Result<(), ApbError> {
        match self.state {
            DriverState::Idle => Ok(()),
            DriverState::Setup => {
                bus.penable = true;
                self.state = DriverState::Access;
                Ok(())
            }
            DriverState::Access | DriverState::Sample => {
                if bus.pready {
                    self.complete(bus);
                    return Ok(());
                }
                self.state = DriverState::Sample;
                self.wait_cycles += 1;
                match self.ready_timeout {
                    Some(limit) if self.wait_cycles >= limit => Err(self.time_out(bus)),
                    _ => Ok(()),
                }
            }
        }
    }

    fn complete(&mut self, bus: &mut ApbBus) {
        if let Some(mut tx) = self.in_flight.take() {
            if !tx.is_write {
                tx.set_register_data(bus.prdata);
            }
            if bus.pslverr {
                warn!(
                    "APB slave error on {} of '{}' @ {:#x}",
                    tx.direction(),
                    tx.field_name,
                    tx.register_address
                );
            }
            debug!(
                "APB done: {} '{}' data={:?}",
                tx.direction(),
                tx.field_name,
                tx.field_data
            );
            self.completed.push_back(tx);
        }
        bus.penable = false;
        self.advance(bus);
    }

    fn time_out(&mut self, bus: &mut ApbBus) -> ApbError {
        let cycles = self.wait_cycles;
        let (field, address) = self
            .in_flight
            .take()
            .map(|tx| (tx.field_name, tx.register_address))
            .unwrap_or_default();
        warn!(
            "APB ready timeout on '{}' @ {:#x} after {} cycles",
            field, address, cycles
        );
        bus.penable = false;
        self.advance(bus);
        ApbError::ReadyTimeout {
            field,
            address,
            cycles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(name: &str, address: u64, write: bool, data: u64) -> Transaction {
        Transaction {
            field_name: name.to_string(),
            register_address: address,
            byte_strobe: 0b1,
            is_write: write,
            register_width: 32,
            field_width: 8,
            field_offset: 0,
            register_data: write.then_some(data),
            field_data: write.then_some(data),
            timestamp_ns: None,
        }
    }

    #[test]
    fn test_setup_access_sample() {
        let mut bus = ApbBus::default();
        let mut drv = ApbMasterDriver::default();

        drv.submit(tx("a", 0x4, true, 0x5a), &mut bus);
        assert_eq!(drv.state(), DriverState::Setup);
        assert!(bus.psel && !bus.penable);
        assert_eq!(bus.paddr, 0x4);
        assert_eq!(bus.pwdata, 0x5a);

        drv.tick(&mut bus).unwrap();
        assert_eq!(drv.state(), DriverState::Access);
        assert!(bus.psel && bus.penable);

        bus.pready = true;
        drv.tick(&mut bus).unwrap();
        assert!(drv.is_idle());
        assert!(!bus.psel && !bus.penable);
        assert_eq!(drv.completed().count(), 1);
    }

    #[test]
    fn test_wait_for_ready_and_capture() {
        let mut bus = ApbBus::default();
        let mut drv = ApbMasterDriver::default();
        drv.submit(tx("r", 0x0, false, 0), &mut bus);
        drv.tick(&mut bus).unwrap();

        bus.pready = false;
        drv.tick(&mut bus).unwrap();
        drv.tick(&mut bus).unwrap();
        assert_eq!(drv.state(), DriverState::Sample);
        assert!(bus.penable);

        bus.pready = true;
        bus.prdata = 0x1234_56ab;
        drv.tick(&mut bus).unwrap();
        let done = drv.drain_completed();
        assert_eq!(done[0].register_data, Some(0x1234_56ab));
        assert_eq!(done[0].field_data, Some(0xab));
        assert_eq!(drv.completed().count(), 0);
    }

    #[test]
    fn test_back_to_back_goes_straight_to_setup() {
        let mut bus = ApbBus::default();
        let mut drv = ApbMasterDriver::default();
        drv.submit(tx("a", 0x0, true, 1), &mut bus);
        drv.submit(tx("b", 0x4, true, 2), &mut bus);
        assert_eq!(drv.pending(), 2);
        // the second submit must not disturb the transfer in progress
        assert_eq!(bus.paddr, 0x0);

        bus.pready = true;
        drv.tick(&mut bus).unwrap();
        drv.tick(&mut bus).unwrap();
        assert_eq!(drv.state(), DriverState::Setup);
        assert_eq!(bus.paddr, 0x4);
        assert!(bus.psel && !bus.penable);

        drv.tick(&mut bus).unwrap();
        drv.tick(&mut bus).unwrap();
        let names: Vec<String> = drv.completed().map(|t| t.field_name.clone()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(drv.is_idle());
    }

    #[test]
    fn test_ready_timeout_moves_on() {
        let mut bus = ApbBus::default();
        let mut drv = ApbMasterDriver::new(Some(3));
        drv.submit(tx("stuck", 0x8, false, 0), &mut bus);
        drv.submit(tx("next", 0xc, false, 0), &mut bus);
        drv.tick(&mut bus).unwrap();

        bus.pready = false;
        drv.tick(&mut bus).unwrap();
        drv.tick(&mut bus).unwrap();
        match drv.tick(&mut bus) {
            Err(ApbError::ReadyTimeout {
                field,
                address,
                cycles,
            }) => {
                assert_eq!(field, "stuck");
                assert_eq!(address, 0x8);
                assert_eq!(cycles, 3);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(drv.state(), DriverState::Setup);
        assert_eq!(bus.paddr, 0xc);
        assert_eq!(drv.pending(), 1);
    }
}
