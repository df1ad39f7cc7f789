//! Vehicle reads and commands.
//!
//! - [`VehicleCommandDispatcher`]: the single algorithm every command runs
//!   through (service token, body merge, send)
//! - [`Command`] and [`CommandSpec`]: the command table
//! - [`Vehicle`]: typed operations for one VIN
//! - [`status_value`]: lookups in the status document
//!
//! # Reads and writes
//!
//! Reads (`status`, `attributes`, `position`, ...) only need valid session
//! headers. State-changing commands additionally need a single-use service
//! token, requested anew for every call.

mod catalog;
mod dispatcher;
mod errors;
mod handle;
pub mod media_types;
mod params;
mod status;

pub use catalog::{Command, CommandSpec};
pub use dispatcher::{Payload, VehicleCommandDispatcher};
pub use errors::CommandError;
pub use handle::{Vehicle, RCC_TARGET_MAX, RCC_TARGET_MIN};
pub use params::{
    ClimatePriority, DepartureTime, DepartureTimer, ProvisioningMode, RepeatSchedule,
    TimerTarget,
};
pub use status::{status_entries, status_value};
