// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! APB protocol engine: shared signal set, master driver and passive monitor.

mod bus;
mod driver;
mod monitor;

pub use bus::{ApbBus, ApbConfig};
pub use driver::{ApbMasterDriver, DriverState};
pub use monitor::{ApbMonitor, CallbackError, MonitorCallback};

use crate::table::LookupError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApbError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("no pready for '{field}' at {address:#x} after {cycles} cycles")]
    ReadyTimeout {
        field: String,
        address: u64,
        cycles: u64,
    },
    #[error("monitor callback rejected the {direction} of '{field}': {source}")]
    Callback {
        field: String,
        direction: &'static str,
        #[source]
        source: CallbackError,
    },
    #[error("driver still busy after {limit} cycles")]
    CycleLimit { limit: u64 },
    #[error("{register_width}-bit registers do not fit a {data_width}-bit bus")]
    BusWidth {
        data_width: u32,
        register_width: u32,
    },
}
