//! Pipeline entry points for monitor operations.
//!
//! - `Monitor`: continuous, stateful loop with debounced notifications
//! - `check_once`: one stateless cycle for scheduled invocations

pub mod check;
pub mod monitor;

pub use check::{CheckReport, check_once, check_until_in_stock};
pub use monitor::{CycleReport, Monitor, Transition, transition};
