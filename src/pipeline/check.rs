// src/pipeline/check.rs

//! Single-shot check used by scheduled invocations.
//!
//! No state is read or written: every observed `InStock` sends the
//! back-in-stock email.

use std::time::Duration;

use crate::models::{NotificationKind, ProbeResult};
use crate::services::{Mailer, Notifier, Probe};

/// Result of one stateless check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    pub result: ProbeResult,
    /// Whether a back-in-stock email was attempted
    pub notified: bool,
    pub delivered: bool,
}

impl CheckReport {
    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!("Script ran and found status: {}", self.result)
    }
}

/// Probe once and email if the product is available.
pub async fn check_once<P, M>(prober: &P, notifier: &Notifier<M>) -> CheckReport
where
    P: Probe,
    M: Mailer,
{
    let result = prober.probe().await;
    let mut report = CheckReport {
        result,
        notified: false,
        delivered: false,
    };

    if result == ProbeResult::InStock {
        report.notified = true;
        report.delivered = notifier.notify(NotificationKind::BackInStock).await;
    }

    log::info!("{}", report.summary());
    report
}

/// Repeat [`check_once`] until the product is seen in stock.
///
/// Returns the report of the cycle that found it.
pub async fn check_until_in_stock<P, M>(
    prober: &P,
    notifier: &Notifier<M>,
    interval: Duration,
) -> CheckReport
where
    P: Probe,
    M: Mailer,
{
    loop {
        let report = check_once(prober, notifier).await;
        if report.result == ProbeResult::InStock {
            log::info!("The product status has changed from sold out. Exiting.");
            return report;
        }

        log::info!(
            "Status: {}. Waiting {}s before checking again...",
            report.result,
            interval.as_secs()
        );
        tokio::time::sleep(interval).await;
    }
}
