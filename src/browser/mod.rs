//! Browser automation seam
//!
//! The crawl core drives a rendered browser session through this trait and
//! nothing else: open a URL, read the rendered source, dismiss the cookie
//! banner, click a control, commit a select-control value. The concrete
//! implementation is a thin WebDriver wire client; tests substitute a
//! scripted implementation.

mod webdriver;

pub use webdriver::WebDriverSession;

use async_trait::async_trait;
use thiserror::Error;

/// Selector for the site's cookie consent button
pub const COOKIE_BANNER_BUTTON: &str = "#onetrust-accept-btn-handler";

/// Errors raised by the automation collaborator
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver session error: {message}")]
    Session { message: String },

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    /// The click was blocked by an overlapping UI element (typically the
    /// cookie banner). Recoverable exactly once via banner dismissal.
    #[error("Click intercepted on {selector}")]
    ClickIntercepted { selector: String },

    #[error("WebDriver protocol error: {message}")]
    Protocol { message: String },
}

/// The five operations the crawl core needs from a browser session
#[async_trait]
pub trait Browser: Send {
    /// Navigates the session to the given URL
    async fn open(&mut self, url: &str) -> Result<(), AutomationError>;

    /// Returns the rendered HTML source of the current page
    async fn page_source(&mut self) -> Result<String, AutomationError>;

    /// Dismisses the cookie consent banner if it is present
    ///
    /// An absent banner is not an error; it may already have been accepted
    /// earlier in the session.
    async fn dismiss_cookie_banner(&mut self) -> Result<(), AutomationError>;

    /// Clicks the element matching the given CSS selector
    async fn click(&mut self, selector: &str) -> Result<(), AutomationError>;

    /// Commits a value on the select control matching the given CSS selector
    async fn select(&mut self, selector: &str, value: &str) -> Result<(), AutomationError>;
}
