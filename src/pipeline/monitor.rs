// src/pipeline/monitor.rs

//! Continuous monitor loop.
//!
//! Each cycle probes the page, folds the result into the stored record,
//! sends at most one email, then persists. The sold-out flag debounces
//! repeated sold-out results so one streak produces one email.

use std::time::Duration;

use crate::models::{NotificationKind, ProbeResult, StatusRecord, StockStatus};
use crate::services::{Mailer, Notifier, Probe};
use crate::storage::StatusStore;

/// Effect of one probe result on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub record: StatusRecord,
    pub notify: Option<NotificationKind>,
    /// False when the probe learned nothing
    pub persist: bool,
}

/// Compute the next record and pending notification.
pub fn transition(prior: &StatusRecord, result: ProbeResult) -> Transition {
    match result {
        ProbeResult::Indeterminate => Transition {
            record: *prior,
            notify: None,
            persist: false,
        },
        ProbeResult::OutOfStock => Transition {
            record: StatusRecord::new(StockStatus::OutOfStock, true),
            notify: (!prior.sold_out_email_sent).then_some(NotificationKind::SoldOut),
            persist: true,
        },
        ProbeResult::InStock => Transition {
            record: StatusRecord::new(StockStatus::InStock, false),
            notify: (prior.status == StockStatus::OutOfStock)
                .then_some(NotificationKind::BackInStock),
            persist: true,
        },
    }
}

/// Summary of one monitor cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub result: ProbeResult,
    pub notified: Option<NotificationKind>,
    /// Whether the transport accepted the email
    pub delivered: bool,
    pub persisted: bool,
    pub record: StatusRecord,
}

/// Probe, compare, notify, persist; forever.
pub struct Monitor<P, M, S> {
    prober: P,
    notifier: Notifier<M>,
    store: S,
    record: StatusRecord,
    interval: Duration,
}

impl<P, M, S> Monitor<P, M, S>
where
    P: Probe,
    M: Mailer,
    S: StatusStore,
{
    /// Build a monitor, reading the last record from `store`.
    pub async fn start(prober: P, notifier: Notifier<M>, store: S, interval: Duration) -> Self {
        let record = store.load().await;
        log::info!(
            "Last known status: {} (sold-out email sent: {})",
            record.status,
            record.sold_out_email_sent
        );

        Self {
            prober,
            notifier,
            store,
            record,
            interval,
        }
    }

    pub fn record(&self) -> &StatusRecord {
        &self.record
    }

    pub fn notifier(&self) -> &Notifier<M> {
        &self.notifier
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run a single probe cycle.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let result = self.prober.probe().await;
        let next = transition(&self.record, result);

        let delivered = match next.notify {
            Some(kind) => self.notifier.notify(kind).await,
            None => false,
        };

        let mut persisted = false;
        if next.persist {
            self.record = next.record;
            match self.store.save(&self.record).await {
                Ok(()) => persisted = true,
                Err(e) => log::error!("Failed to save status: {}", e),
            }
        }

        match result {
            ProbeResult::OutOfStock => {
                log::info!("Product is still sold out. Waiting for a change.")
            }
            ProbeResult::InStock => log::info!("Product is in stock."),
            ProbeResult::Indeterminate => log::warn!(
                "Could not determine status. Keeping last status ({}).",
                self.record.status
            ),
        }

        CycleReport {
            result,
            notified: next.notify,
            delivered,
            persisted,
            record: self.record,
        }
    }

    /// Run cycles until the process is terminated.
    pub async fn run(&mut self) {
        log::info!(
            "Monitor started, checking every {}s",
            self.interval.as_secs()
        );
        loop {
            self.run_cycle().await;
            log::info!("Waiting {}s for the next check...", self.interval.as_secs());
            tokio::time::sleep(self.interval).await;
        }
    }
}
