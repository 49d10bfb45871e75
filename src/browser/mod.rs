//! Browser session collaborator
//!
//! The search form is only reachable through a real browser, so the crawl
//! talks to it through the [`BrowserSession`] trait. A worker opens one
//! session per chunk and never shares it.
//!
//! # Components
//!
//! - `BrowserSession`: navigation, dropdown reading/selection, clicking
//! - `SessionFactory`: opens a fresh session inside the calling worker
//! - `ChromeSession`: the `headless_chrome` implementation

mod chrome;

pub use chrome::{ChromeSession, ChromeSessionFactory};

use thiserror::Error;

/// Driver-level failures reported by a browser session
///
/// These are the failures the worker retries at combination granularity.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Element not found: {locator}")]
    ElementNotFound { locator: String },

    #[error("Option '{label}' not found in {locator}")]
    OptionNotFound { locator: String, label: String },

    #[error("Interaction with {locator} failed: {message}")]
    Interaction { locator: String, message: String },

    #[error("Browser session is closed")]
    SessionClosed,
}

/// Result type for browser session operations
pub type DriverResult<T> = Result<T, DriverError>;

/// A single browser session driving the search UI
///
/// Locators are XPath expressions taken from the site configuration.
pub trait BrowserSession {
    /// Loads a URL and waits for navigation to finish
    fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// Returns the URL the session is currently on
    fn current_url(&self) -> DriverResult<String>;

    /// Returns the visible labels of every option of a select control, in order
    fn option_labels(&mut self, locator: &str) -> DriverResult<Vec<String>>;

    /// Selects the option whose visible text matches `label`
    fn select_option(&mut self, locator: &str, label: &str) -> DriverResult<()>;

    /// Clicks an element
    fn click(&mut self, locator: &str) -> DriverResult<()>;

    /// Ends the session, releasing the browser
    fn close(self)
    where
        Self: Sized;
}

/// Opens browser sessions for workers
///
/// The factory is shared by the pool; the sessions it opens are not.
pub trait SessionFactory: Send + Sync {
    type Session: BrowserSession;

    fn open(&self) -> DriverResult<Self::Session>;
}

/// Clicks the cookie consent button if the dialog is showing
///
/// A missing button means there is nothing to dismiss.
pub fn dismiss_consent<S: BrowserSession>(session: &mut S, locator: &str) -> DriverResult<()> {
    match session.click(locator) {
        Ok(()) => {
            tracing::debug!("Dismissed consent dialog");
            Ok(())
        }
        Err(DriverError::ElementNotFound { .. }) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Loads `url` unless the session is already there
pub fn ensure_on_page<S: BrowserSession>(session: &mut S, url: &str) -> DriverResult<()> {
    if session.current_url()? != url {
        session.navigate(url)?;
    }
    Ok(())
}
