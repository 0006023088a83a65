//! Service layer for the stock monitor.
//!
//! This module contains the collaborators of a monitor cycle:
//! - Availability reading (`AvailabilityProber`)
//! - Status-change emails (`Notifier`)
//! - Mail delivery (`Mailer`, `SmtpMailer`)

mod mailer;
mod notifier;
mod prober;

pub use mailer::{Mailer, SmtpMailer};
pub use notifier::{Email, Notifier};
pub use prober::{AvailabilityProber, GateOutcome, Probe};

#[cfg(test)]
pub(crate) use notifier::tests::{RecordingMailer, notifier as test_notifier};
