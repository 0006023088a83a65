//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// The product being watched
    #[serde(default)]
    pub product: ProductConfig,

    /// Loop cadence and state file location
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Wait budgets for the page interaction sequence
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Element locators on the product page
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// WebDriver endpoint and browser launch options
    #[serde(default)]
    pub browser: BrowserConfig,

    /// SMTP relay settings
    #[serde(default)]
    pub mail: MailConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.product.url)?;
        if self.product.pincode.trim().is_empty() {
            return Err(AppError::validation("product.pincode is empty"));
        }
        if self.monitor.poll_interval_secs == 0 {
            return Err(AppError::validation("monitor.poll_interval_secs must be > 0"));
        }
        if self.probe.marker_timeout_secs == 0 {
            return Err(AppError::validation("probe.marker_timeout_secs must be > 0"));
        }
        if self.browser.wait_poll_ms == 0 {
            return Err(AppError::validation("browser.wait_poll_ms must be > 0"));
        }
        if self.probe.suggestion_retries == 0 {
            return Err(AppError::validation("probe.suggestion_retries must be > 0"));
        }
        for (name, value) in [
            ("selectors.location_modal_id", &self.selectors.location_modal_id),
            ("selectors.pincode_input_id", &self.selectors.pincode_input_id),
            ("selectors.suggestion_xpath", &self.selectors.suggestion_xpath),
            ("selectors.sold_out_xpath", &self.selectors.sold_out_xpath),
            ("selectors.add_to_cart_xpath", &self.selectors.add_to_cart_xpath),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{name} is empty")));
            }
        }
        if self.mail.smtp_host.trim().is_empty() {
            return Err(AppError::validation("mail.smtp_host is empty"));
        }
        Ok(())
    }
}

/// The watched product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    /// Product page URL
    #[serde(default = "defaults::product_url")]
    pub url: String,

    /// Human-readable name used in email subjects and bodies
    #[serde(default = "defaults::product_label")]
    pub label: String,

    /// Delivery pincode entered into the location gate
    #[serde(default = "defaults::pincode")]
    pub pincode: String,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            url: defaults::product_url(),
            label: defaults::product_label(),
            pincode: defaults::pincode(),
        }
    }
}

/// Monitor loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Sleep between probe cycles in seconds
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_secs: u64,

    /// JSON file holding the last known status
    #[serde(default = "defaults::state_file")]
    pub state_file: PathBuf,
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: defaults::poll_interval(),
            state_file: defaults::state_file(),
        }
    }
}

/// Timeouts and delays of the probe sequence, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Pause after navigation before looking for elements
    #[serde(default = "defaults::page_load_delay")]
    pub page_load_delay_secs: u64,

    /// How long the location modal may take to appear
    #[serde(default = "defaults::gate_timeout")]
    pub gate_timeout_secs: u64,

    /// How long the pincode input may take to become visible
    #[serde(default = "defaults::input_timeout")]
    pub input_timeout_secs: u64,

    /// Per-attempt wait for a clickable pincode suggestion
    #[serde(default = "defaults::suggestion_timeout")]
    pub suggestion_timeout_secs: u64,

    /// Attempts at the suggestion lookup-and-click
    #[serde(default = "defaults::suggestion_retries")]
    pub suggestion_retries: usize,

    /// Pause between attempts after a stale element
    #[serde(default = "defaults::stale_retry_delay")]
    pub stale_retry_delay_secs: u64,

    /// How long the modal may take to close after the click
    #[serde(default = "defaults::gate_close_timeout")]
    pub gate_close_timeout_secs: u64,

    /// Re-render pause after the location is applied
    #[serde(default = "defaults::settle_delay")]
    pub settle_delay_secs: u64,

    /// Wait for each availability marker
    #[serde(default = "defaults::marker_timeout")]
    pub marker_timeout_secs: u64,
}

impl ProbeConfig {
    pub fn page_load_delay(&self) -> Duration {
        Duration::from_secs(self.page_load_delay_secs)
    }

    pub fn gate_timeout(&self) -> Duration {
        Duration::from_secs(self.gate_timeout_secs)
    }

    pub fn input_timeout(&self) -> Duration {
        Duration::from_secs(self.input_timeout_secs)
    }

    pub fn suggestion_timeout(&self) -> Duration {
        Duration::from_secs(self.suggestion_timeout_secs)
    }

    pub fn stale_retry_delay(&self) -> Duration {
        Duration::from_secs(self.stale_retry_delay_secs)
    }

    pub fn gate_close_timeout(&self) -> Duration {
        Duration::from_secs(self.gate_close_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    pub fn marker_timeout(&self) -> Duration {
        Duration::from_secs(self.marker_timeout_secs)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            page_load_delay_secs: defaults::page_load_delay(),
            gate_timeout_secs: defaults::gate_timeout(),
            input_timeout_secs: defaults::input_timeout(),
            suggestion_timeout_secs: defaults::suggestion_timeout(),
            suggestion_retries: defaults::suggestion_retries(),
            stale_retry_delay_secs: defaults::stale_retry_delay(),
            gate_close_timeout_secs: defaults::gate_close_timeout(),
            settle_delay_secs: defaults::settle_delay(),
            marker_timeout_secs: defaults::marker_timeout(),
        }
    }
}

/// Element locators used by the prober.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "defaults::location_modal_id")]
    pub location_modal_id: String,

    #[serde(default = "defaults::pincode_input_id")]
    pub pincode_input_id: String,

    /// XPath template; `{pincode}` is replaced with the configured pincode
    #[serde(default = "defaults::suggestion_xpath")]
    pub suggestion_xpath: String,

    #[serde(default = "defaults::sold_out_xpath")]
    pub sold_out_xpath: String,

    #[serde(default = "defaults::add_to_cart_xpath")]
    pub add_to_cart_xpath: String,
}

impl SelectorConfig {
    /// Suggestion XPath with the pincode filled in.
    pub fn suggestion_for(&self, pincode: &str) -> String {
        self.suggestion_xpath.replace("{pincode}", pincode)
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            location_modal_id: defaults::location_modal_id(),
            pincode_input_id: defaults::pincode_input_id(),
            suggestion_xpath: defaults::suggestion_xpath(),
            sold_out_xpath: defaults::sold_out_xpath(),
            add_to_cart_xpath: defaults::add_to_cart_xpath(),
        }
    }
}

/// Browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// WebDriver server endpoint (chromedriver, geckodriver, selenium)
    #[serde(default = "defaults::webdriver_url")]
    pub webdriver_url: String,

    #[serde(default = "defaults::browser_name")]
    pub browser_name: String,

    /// Extra browser command-line arguments
    #[serde(default = "defaults::browser_args")]
    pub args: Vec<String>,

    /// Polling cadence of element waits in milliseconds
    #[serde(default = "defaults::wait_poll")]
    pub wait_poll_ms: u64,
}

impl BrowserConfig {
    pub fn wait_poll(&self) -> Duration {
        Duration::from_millis(self.wait_poll_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: defaults::webdriver_url(),
            browser_name: defaults::browser_name(),
            args: defaults::browser_args(),
            wait_poll_ms: defaults::wait_poll(),
        }
    }
}

/// SMTP relay settings. Credentials come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "defaults::smtp_host")]
    pub smtp_host: String,

    /// Implicit-TLS submission port
    #[serde(default = "defaults::smtp_port")]
    pub smtp_port: u16,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: defaults::smtp_host(),
            smtp_port: defaults::smtp_port(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Product defaults
    pub fn product_url() -> String {
        "https://shop.amul.com/en/product/amul-chocolate-whey-protein-34-g-or-pack-of-30-sachets"
            .into()
    }
    pub fn product_label() -> String {
        "Amul product".into()
    }
    pub fn pincode() -> String {
        "560102".into()
    }

    // Monitor defaults
    pub fn poll_interval() -> u64 {
        60
    }
    pub fn state_file() -> PathBuf {
        PathBuf::from("stock_status.json")
    }

    // Probe defaults
    pub fn page_load_delay() -> u64 {
        5
    }
    pub fn gate_timeout() -> u64 {
        30
    }
    pub fn input_timeout() -> u64 {
        10
    }
    pub fn suggestion_timeout() -> u64 {
        15
    }
    pub fn suggestion_retries() -> usize {
        3
    }
    pub fn stale_retry_delay() -> u64 {
        2
    }
    pub fn gate_close_timeout() -> u64 {
        15
    }
    pub fn settle_delay() -> u64 {
        5
    }
    pub fn marker_timeout() -> u64 {
        15
    }

    // Selector defaults
    pub fn location_modal_id() -> String {
        "locationWidgetModal".into()
    }
    pub fn pincode_input_id() -> String {
        "search".into()
    }
    pub fn suggestion_xpath() -> String {
        "//a[contains(@class, 'searchitem-name') and .//p[contains(text(), '{pincode}')]]".into()
    }
    pub fn sold_out_xpath() -> String {
        "//div[contains(@class, 'alert-danger') and contains(text(), 'Sold Out')]".into()
    }
    pub fn add_to_cart_xpath() -> String {
        "//button[contains(@class, 'cart-button-text') and contains(text(), 'Add to cart')]".into()
    }

    // Browser defaults
    pub fn webdriver_url() -> String {
        "http://localhost:9515".into()
    }
    pub fn browser_name() -> String {
        "chrome".into()
    }
    pub fn browser_args() -> Vec<String> {
        vec![
            "--no-sandbox".into(),
            "--disable-dev-shm-usage".into(),
            "--disable-gpu".into(),
            "--window-size=1920,1080".into(),
        ]
    }
    pub fn wait_poll() -> u64 {
        250
    }

    // Mail defaults
    pub fn smtp_host() -> String {
        "smtp.gmail.com".into()
    }
    pub fn smtp_port() -> u16 {
        465
    }
}
