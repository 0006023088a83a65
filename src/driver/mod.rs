//! Page driver abstraction.
//!
//! The prober only talks to a browser through these traits, so it can be
//! exercised against a scripted session in tests. The WebDriver adapter lives
//! in [`webdriver`] behind the `webdriver` feature.

#[cfg(feature = "webdriver")]
pub mod webdriver;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

#[cfg(feature = "webdriver")]
pub use webdriver::{WebDriverBrowser, WebDriverSession};

/// How to find an element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(String),
    XPath(String),
    Css(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::XPath(xpath.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "#{id}"),
            Locator::XPath(xpath) => f.write_str(xpath),
            Locator::Css(selector) => f.write_str(selector),
        }
    }
}

/// State an element must reach before a wait completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Attached to the DOM
    Present,
    /// Present and displayed
    Visible,
    /// Displayed and enabled
    Clickable,
    /// Hidden or detached
    Invisible,
}

/// Outcome of a bounded wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wait<E> {
    /// The element reached the requested condition
    Found(E),
    /// An `Invisible` wait completed; there is no element to hand back
    Gone,
    /// The timeout expired first
    TimedOut,
}

impl<E> Wait<E> {
    pub fn found(self) -> Option<E> {
        match self {
            Wait::Found(element) => Some(element),
            Wait::Gone | Wait::TimedOut => None,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, Wait::TimedOut)
    }
}

/// A live browser session scoped to a single probe.
#[async_trait]
pub trait PageSession: Send + Sync {
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<()>;

    /// Poll for `locator` to reach `condition` for at most `timeout`.
    ///
    /// Expiry is reported as [`Wait::TimedOut`], not as an error.
    async fn wait_for(
        &self,
        locator: &Locator,
        condition: Condition,
        timeout: Duration,
    ) -> Result<Wait<Self::Element>>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    async fn send_text(&self, element: &Self::Element, text: &str) -> Result<()>;

    /// End the session. Called exactly once per opened session.
    async fn close(&self) -> Result<()>;
}

/// Opens page sessions.
#[async_trait]
pub trait PageDriver: Send + Sync {
    type Session: PageSession;

    async fn open_session(&self) -> Result<Self::Session>;
}
