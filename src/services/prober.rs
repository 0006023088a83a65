// src/services/prober.rs

//! Availability prober.
//!
//! Drives one page session through the product page: open the page, get past
//! the delivery-location modal if the storefront shows one, then read the
//! availability markers. Everything that can go wrong along the way collapses
//! into [`ProbeResult::Indeterminate`].

use async_trait::async_trait;

use crate::driver::{Condition, Locator, PageDriver, PageSession, Wait};
use crate::error::{AppError, Result};
use crate::models::{Config, ProbeConfig, ProbeResult, ProductConfig};
use crate::utils::{RetryPolicy, retry_if};

/// Anything that can report the product's current availability.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self) -> ProbeResult;
}

/// What happened at the location gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// No modal showed up; the site remembered the location or never asked
    NotShown,
    /// Pincode entered and suggestion clicked
    Resolved,
    /// Modal seen but could not be completed; the page is read anyway
    Unresolved(&'static str),
}

/// Locators derived from configuration once per prober.
#[derive(Debug, Clone)]
struct PageLocators {
    modal: Locator,
    pincode_input: Locator,
    suggestion: Locator,
    sold_out: Locator,
    add_to_cart: Locator,
}

/// Reads availability from the storefront through a [`PageDriver`].
pub struct AvailabilityProber<D> {
    driver: D,
    product: ProductConfig,
    timing: ProbeConfig,
    locators: PageLocators,
}

impl<D: PageDriver> AvailabilityProber<D> {
    pub fn new(driver: D, config: &Config) -> Self {
        let selectors = &config.selectors;
        let locators = PageLocators {
            modal: Locator::id(&selectors.location_modal_id),
            pincode_input: Locator::id(&selectors.pincode_input_id),
            suggestion: Locator::xpath(selectors.suggestion_for(&config.product.pincode)),
            sold_out: Locator::xpath(&selectors.sold_out_xpath),
            add_to_cart: Locator::xpath(&selectors.add_to_cart_xpath),
        };

        Self {
            driver,
            product: config.product.clone(),
            timing: config.probe.clone(),
            locators,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Run one probe. The session is closed on every path.
    pub async fn check(&self) -> ProbeResult {
        log::info!("--- Starting stock check ---");
        let session = match self.driver.open_session().await {
            Ok(session) => session,
            Err(e) => {
                log::error!("Failed to start page session: {}", e);
                return ProbeResult::Indeterminate;
            }
        };

        let outcome = self.inspect(&session).await;

        if let Err(e) = session.close().await {
            log::warn!("Failed to close page session, it may already be gone: {}", e);
        }
        log::info!("--- Stock check finished ---");

        match outcome {
            Ok(result) => result,
            Err(e) => {
                log::error!("Stock check failed: {}", e);
                ProbeResult::Indeterminate
            }
        }
    }

    async fn inspect(&self, session: &D::Session) -> Result<ProbeResult> {
        log::info!("Opening product page {}", self.product.url);
        session.navigate(&self.product.url).await?;
        pause(self.timing.page_load_delay()).await;

        match self.resolve_location_gate(session).await? {
            GateOutcome::NotShown => {
                log::info!("Location modal did not appear. Continuing...");
            }
            GateOutcome::Resolved => log::info!("Location applied"),
            GateOutcome::Unresolved(reason) => {
                log::warn!("Location modal left open ({}). Continuing...", reason);
            }
        }

        self.read_availability(session).await
    }

    /// Enter the pincode into the location modal when one is shown.
    ///
    /// Only driver failures and an exhausted stale-click budget are errors;
    /// every timeout degrades to [`GateOutcome`].
    async fn resolve_location_gate(&self, session: &D::Session) -> Result<GateOutcome> {
        let timing = &self.timing;
        let loc = &self.locators;

        if session
            .wait_for(&loc.modal, Condition::Present, timing.gate_timeout())
            .await?
            .timed_out()
        {
            return Ok(GateOutcome::NotShown);
        }

        let Some(input) = session
            .wait_for(&loc.pincode_input, Condition::Visible, timing.input_timeout())
            .await?
            .found()
        else {
            return Ok(GateOutcome::Unresolved("pincode input not found"));
        };

        log::info!("Entering pincode {}", self.product.pincode);
        session.send_text(&input, &self.product.pincode).await?;

        let policy = RetryPolicy::new(timing.suggestion_retries, timing.stale_retry_delay());
        let clicked = retry_if(&policy, AppError::is_stale, move |attempt| {
            self.click_suggestion(session, attempt)
        })
        .await?;

        if !clicked {
            return Ok(GateOutcome::Unresolved("no clickable pincode suggestion"));
        }
        log::info!("Clicked the pincode suggestion");

        if session
            .wait_for(&loc.modal, Condition::Invisible, timing.gate_close_timeout())
            .await?
            .timed_out()
        {
            log::warn!("Location modal still visible after selecting the pincode");
        }

        pause(timing.settle_delay()).await;
        Ok(GateOutcome::Resolved)
    }

    /// One lookup-and-click of the pincode suggestion.
    ///
    /// The suggestion list re-renders while results load, so the click can hit
    /// a detached node; that surfaces as a stale error for the caller to retry.
    async fn click_suggestion(&self, session: &D::Session, attempt: usize) -> Result<bool> {
        log::debug!("Looking for pincode suggestion (attempt {})", attempt);
        let wait = session
            .wait_for(
                &self.locators.suggestion,
                Condition::Clickable,
                self.timing.suggestion_timeout(),
            )
            .await?;

        match wait {
            Wait::Found(suggestion) => {
                session.click(&suggestion).await?;
                Ok(true)
            }
            Wait::Gone | Wait::TimedOut => Ok(false),
        }
    }

    /// Sold-out marker first, then the add-to-cart button.
    async fn read_availability(&self, session: &D::Session) -> Result<ProbeResult> {
        let timeout = self.timing.marker_timeout();

        if let Wait::Found(_) = session
            .wait_for(&self.locators.sold_out, Condition::Present, timeout)
            .await?
        {
            log::info!("Product is SOLD OUT");
            return Ok(ProbeResult::OutOfStock);
        }

        if let Wait::Found(_) = session
            .wait_for(&self.locators.add_to_cart, Condition::Clickable, timeout)
            .await?
        {
            log::info!("Product is IN STOCK");
            return Ok(ProbeResult::InStock);
        }

        log::warn!("Could not determine stock status. The page structure might have changed.");
        Ok(ProbeResult::Indeterminate)
    }
}

#[async_trait]
impl<D: PageDriver> Probe for AvailabilityProber<D> {
    async fn probe(&self) -> ProbeResult {
        self.check().await
    }
}

async fn pause(duration: std::time::Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
