//! WebDriver-backed page sessions.
//!
//! Connects to a running WebDriver server (chromedriver, geckodriver or a
//! Selenium grid) through `fantoccini`. Waits are implemented as polling
//! loops over `find` so every condition shares the same timeout handling.

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};
use tokio::time::Instant;

use crate::driver::{Condition, Locator, PageDriver, PageSession, Wait};
use crate::error::{AppError, Result};
use crate::models::BrowserConfig;

/// Session factory for a WebDriver endpoint.
#[derive(Debug, Clone)]
pub struct WebDriverBrowser {
    endpoint: String,
    capabilities: Map<String, Value>,
    poll_interval: Duration,
}

impl WebDriverBrowser {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            endpoint: config.webdriver_url.clone(),
            capabilities: Self::build_capabilities(config),
            poll_interval: config.wait_poll(),
        }
    }

    fn build_capabilities(config: &BrowserConfig) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert("browserName".into(), json!(config.browser_name));

        let options_key = match config.browser_name.as_str() {
            "firefox" => "moz:firefoxOptions",
            "MicrosoftEdge" | "msedge" => "ms:edgeOptions",
            _ => "goog:chromeOptions",
        };
        caps.insert(options_key.into(), json!({ "args": config.args }));
        caps
    }
}

#[async_trait]
impl PageDriver for WebDriverBrowser {
    type Session = WebDriverSession;

    async fn open_session(&self) -> Result<WebDriverSession> {
        log::info!("Connecting to WebDriver at {}", self.endpoint);
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities.clone());
        let client = builder.connect(&self.endpoint).await.map_err(|e| {
            AppError::driver(format!(
                "failed to open browser session at {}: {e}",
                self.endpoint
            ))
        })?;

        Ok(WebDriverSession {
            client,
            poll_interval: self.poll_interval,
        })
    }
}

/// One browser session.
pub struct WebDriverSession {
    client: Client,
    poll_interval: Duration,
}

impl WebDriverSession {
    /// Whether an element currently satisfies `condition`.
    async fn satisfies(
        element: &Element,
        condition: Condition,
    ) -> std::result::Result<bool, CmdError> {
        match condition {
            Condition::Present => Ok(true),
            Condition::Visible => element.is_displayed().await,
            Condition::Clickable => {
                Ok(element.is_displayed().await? && element.is_enabled().await?)
            }
            Condition::Invisible => Ok(!element.is_displayed().await?),
        }
    }
}

fn to_fantoccini(locator: &Locator) -> fantoccini::Locator<'_> {
    match locator {
        Locator::Id(id) => fantoccini::Locator::Id(id),
        Locator::XPath(xpath) => fantoccini::Locator::XPath(xpath),
        Locator::Css(selector) => fantoccini::Locator::Css(selector),
    }
}

fn map_cmd_error(context: &str, err: CmdError) -> AppError {
    if err.is_stale_element_reference() {
        AppError::stale(format!("{context}: {err}"))
    } else {
        AppError::driver(format!("{context}: {err}"))
    }
}

/// Decide one poll of a wait.
///
/// `observed` is the looked-up element with whether it met `condition`, or
/// the lookup error. `None` means keep polling.
fn classify<E>(
    observed: std::result::Result<(E, bool), CmdError>,
    condition: Condition,
    context: &str,
) -> Result<Option<Wait<E>>> {
    match observed {
        Ok((_, true)) if condition == Condition::Invisible => Ok(Some(Wait::Gone)),
        Ok((element, true)) => Ok(Some(Wait::Found(element))),
        Ok((_, false)) => Ok(None),
        // Absent or detached while we looked at it
        Err(e) if e.is_no_such_element() || e.is_stale_element_reference() => {
            if condition == Condition::Invisible {
                Ok(Some(Wait::Gone))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(map_cmd_error(context, e)),
    }
}

#[async_trait]
impl PageSession for WebDriverSession {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .map_err(|e| map_cmd_error(&format!("navigate to {url}"), e))
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        condition: Condition,
        timeout: Duration,
    ) -> Result<Wait<Element>> {
        let deadline = Instant::now() + timeout;
        let context = format!("wait for {locator}");

        loop {
            let observed = match self.client.find(to_fantoccini(locator)).await {
                Ok(element) => Self::satisfies(&element, condition)
                    .await
                    .map(|met| (element, met)),
                Err(e) => Err(e),
            };
            if let Some(wait) = classify(observed, condition, &context)? {
                return Ok(wait);
            }

            if Instant::now() >= deadline {
                return Ok(Wait::TimedOut);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element
            .click()
            .await
            .map_err(|e| map_cmd_error("click", e))
    }

    async fn send_text(&self, element: &Element, text: &str) -> Result<()> {
        element
            .send_keys(text)
            .await
            .map_err(|e| map_cmd_error("send keys", e))
    }

    async fn close(&self) -> Result<()> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| AppError::driver(format!("close session: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use fantoccini::error::{ErrorStatus, WebDriver};

    use super::*;

    #[test]
    fn test_chrome_capabilities() {
        let config = BrowserConfig::default();
        let caps = WebDriverBrowser::build_capabilities(&config);

        assert_eq!(caps["browserName"], json!("chrome"));
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.contains(&json!("--no-sandbox")));
    }

    #[test]
    fn test_firefox_capabilities() {
        let config = BrowserConfig {
            browser_name: "firefox".into(),
            args: vec!["-headless".into()],
            ..BrowserConfig::default()
        };
        let caps = WebDriverBrowser::build_capabilities(&config);

        assert_eq!(caps["moz:firefoxOptions"]["args"], json!(["-headless"]));
        assert!(!caps.contains_key("goog:chromeOptions"));
    }

    fn webdriver_error(status: ErrorStatus, message: &'static str) -> CmdError {
        CmdError::Standard(WebDriver::new(status, message))
    }

    const GECKO_STALE: &str = "The element with the reference 1b2c is stale; either its node \
        document is not the active document, or it is no longer connected to the DOM";

    #[test]
    fn test_stale_reference_maps_to_stale_error() {
        let mapped = map_cmd_error(
            "click",
            webdriver_error(ErrorStatus::StaleElementReference, GECKO_STALE),
        );
        assert!(mapped.is_stale());

        let mapped = map_cmd_error(
            "click",
            webdriver_error(ErrorStatus::ElementNotInteractable, "element not interactable"),
        );
        assert!(matches!(mapped, AppError::Driver(_)));
    }

    #[test]
    fn test_classify_met_condition() {
        let found = classify(Ok(((), true)), Condition::Clickable, "wait").unwrap();
        assert_eq!(found, Some(Wait::Found(())));

        let gone = classify(Ok(((), true)), Condition::Invisible, "wait").unwrap();
        assert_eq!(gone, Some(Wait::Gone));

        let pending = classify(Ok(((), false)), Condition::Visible, "wait").unwrap();
        assert_eq!(pending, None);
    }

    #[test]
    fn test_classify_missing_element() {
        let missing = || webdriver_error(ErrorStatus::NoSuchElement, "no such element");

        let pending = classify::<()>(Err(missing()), Condition::Present, "wait").unwrap();
        assert_eq!(pending, None);

        let gone = classify::<()>(Err(missing()), Condition::Invisible, "wait").unwrap();
        assert_eq!(gone, Some(Wait::Gone));
    }

    #[test]
    fn test_classify_detached_element() {
        let stale = || webdriver_error(ErrorStatus::StaleElementReference, GECKO_STALE);

        let pending = classify::<()>(Err(stale()), Condition::Clickable, "wait").unwrap();
        assert_eq!(pending, None);

        let gone = classify::<()>(Err(stale()), Condition::Invisible, "wait").unwrap();
        assert_eq!(gone, Some(Wait::Gone));
    }

    #[test]
    fn test_classify_other_errors_fail_the_wait() {
        let err = classify::<()>(
            Err(webdriver_error(ErrorStatus::InvalidSessionId, "invalid session id")),
            Condition::Invisible,
            "wait for #locationWidgetModal",
        )
        .unwrap_err();

        assert!(matches!(err, AppError::Driver(_)));
        assert!(err.to_string().contains("#locationWidgetModal"));
    }

    #[test]
    fn test_locator_mapping() {
        let locator = Locator::id("search");
        assert!(matches!(
            to_fantoccini(&locator),
            fantoccini::Locator::Id("search")
        ));
    }
}
