// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{ApbBus, ApbError};
use crate::table::FieldTable;
use crate::transaction::Transaction;
use std::sync::Arc;
use tracing::debug;

/// Error returned by a verification callback.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Verification callback invoked with every observed transaction.
pub type MonitorCallback = Box<dyn FnMut(&Transaction) -> Result<(), CallbackError> + Send>;

/// Passive observer that turns completed bus transfers back into field transactions.
pub struct ApbMonitor {
    table: Arc<FieldTable>,
    callbacks: Vec<MonitorCallback>,
    observed: Vec<Transaction>,
}

impl std::fmt::Debug for ApbMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApbMonitor")
            .field("regfile", &self.table.regfile())
            .field("callbacks", &self.callbacks.len())
            .field("observed", &self.observed.len())
            .finish()
    }
}

impl ApbMonitor {
    pub fn new(table: Arc<FieldTable>) -> Self {
        Self {
            table,
            callbacks: Vec::new(),
            observed: Vec::new(),
        }
    }

    /// Registers a callback; callbacks run in registration order.
    pub fn add_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Transaction) -> Result<(), CallbackError> + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Every transaction observed so far.
    pub fn observed(&self) -> &[Transaction] {
        &self.observed
    }

    /// Last observed read of `field_name`.
    pub fn last_read(&self, field_name: &str) -> Option<&Transaction> {
        self.observed
            .iter()
            .rev()
            .find(|tx| !tx.is_write && tx.field_name == field_name)
    }

    /// Samples the settled bus at a rising edge at `time_ns`.
    ///
    /// Returns the reconstructed transaction when a transfer completed in the cycle. The first
    /// failing callback stops the chain and its error is returned.
    pub fn sample(&mut self, bus: &ApbBus, time_ns: u64) -> Result<Option<Transaction>, ApbError> {
        if !bus.transfer_complete() {
            return Ok(None);
        }

        let location = self.table.locate_field_by_address(bus.paddr, bus.pstrb)?;
        let mut tx = Transaction::from_location(location, bus.pwrite);
        tx.set_register_data(if bus.pwrite { bus.pwdata } else { bus.prdata });
        tx.timestamp_ns = Some(time_ns);
        debug!(
            "APB monitor @ {} ns: {} '{}' = {:?}",
            time_ns,
            tx.direction(),
            tx.field_name,
            tx.field_data
        );

        self.observed.push(tx.clone());
        for callback in &mut self.callbacks {
            callback(&tx).map_err(|source| ApbError::Callback {
                field: tx.field_name.clone(),
                direction: tx.direction(),
                source,
            })?;
        }
        Ok(Some(tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regen_ir::{Field, RegFile, Register};
    use std::sync::Mutex;

    fn monitor() -> ApbMonitor {
        let cfg = Register::with_fields(
            "cfg",
            "",
            32,
            [Field::config("a", 4), Field::config("b", 8)],
        )
        .unwrap();
        let rgf = RegFile::new("rgf", "", [cfg]).unwrap();
        ApbMonitor::new(Arc::new(FieldTable::from_regfile(&rgf, 32)))
    }

    fn completed_write(bus: &mut ApbBus, strobe: u64, data: u64) {
        bus.drive_setup(0, true, strobe, data);
        bus.penable = true;
        bus.pready = true;
    }

    #[test]
    fn test_ignores_incomplete_cycles() {
        let mut mon = monitor();
        let mut bus = ApbBus::default();
        bus.drive_setup(0, true, 0b1, 3);
        assert!(mon.sample(&bus, 10).unwrap().is_none());
        bus.penable = true;
        bus.pready = false;
        assert!(mon.sample(&bus, 20).unwrap().is_none());
        assert!(mon.observed().is_empty());
    }

    #[test]
    fn test_reconstructs_write_and_read() {
        let mut mon = monitor();
        let mut bus = ApbBus::default();
        completed_write(&mut bus, 0b10, 0xab00);
        let tx = mon.sample(&bus, 30).unwrap().unwrap();
        assert_eq!(tx.field_name, "rgf_cfg_b");
        assert!(tx.is_write);
        assert_eq!(tx.field_data, Some(0xab));
        assert_eq!(tx.timestamp_ns, Some(30));

        bus.pwrite = false;
        bus.pstrb = 0b1;
        bus.prdata = 0xab07;
        let tx = mon.sample(&bus, 40).unwrap().unwrap();
        assert_eq!(tx.field_name, "rgf_cfg_a");
        assert_eq!(tx.field_data, Some(7));
        assert_eq!(mon.last_read("rgf_cfg_a").unwrap().field_data, Some(7));
        assert!(mon.last_read("rgf_cfg_b").is_none());
    }

    #[test]
    fn test_callbacks_in_order_and_first_error_stops() {
        let mut mon = monitor();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&log);
        mon.add_callback(move |tx| {
            first.lock().unwrap().push(format!("first:{}", tx.field_name));
            Ok(())
        });
        mon.add_callback(|tx| {
            if tx.field_data == Some(0xf) {
                Err("value 0xf is forbidden".into())
            } else {
                Ok(())
            }
        });
        let third = Arc::clone(&log);
        mon.add_callback(move |tx| {
            third.lock().unwrap().push(format!("third:{}", tx.field_name));
            Ok(())
        });

        let mut bus = ApbBus::default();
        completed_write(&mut bus, 0b1, 0x1);
        mon.sample(&bus, 10).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first:rgf_cfg_a", "third:rgf_cfg_a"]);

        completed_write(&mut bus, 0b1, 0xf);
        let err = mon.sample(&bus, 20).unwrap_err();
        assert!(matches!(err, ApbError::Callback { .. }));
        assert!(err.to_string().contains("forbidden"));
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_location_is_an_error() {
        let mut mon = monitor();
        let mut bus = ApbBus::default();
        completed_write(&mut bus, 0b1000, 0);
        assert!(matches!(mon.sample(&bus, 10), Err(ApbError::Lookup(_))));
    }
}
