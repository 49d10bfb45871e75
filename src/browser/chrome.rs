//! `headless_chrome` implementation of [`BrowserSession`]

use crate::browser::{BrowserSession, DriverError, DriverResult, SessionFactory};
use crate::config::SiteConfig;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

/// Returns the option labels of a select control as a JSON array string
const READ_OPTIONS_JS: &str = r#"
function() {
    return JSON.stringify(Array.from(this.options, option => option.text));
}
"#;

/// Selects the option whose trimmed text equals the argument and fires `change`
const SELECT_OPTION_JS: &str = r#"
function(label) {
    const option = Array.from(this.options).find(o => o.text.trim() === label);
    if (!option) {
        return false;
    }
    this.value = option.value;
    this.dispatchEvent(new Event('change', { bubbles: true }));
    return true;
}
"#;

/// A Chrome browser with one tab
pub struct ChromeSession {
    browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    /// Launches Chrome and opens the tab the session drives
    ///
    /// The tab's default timeout is the site's page-load ceiling, so a page
    /// that takes longer surfaces as a driver error.
    pub fn launch(site: &SiteConfig) -> DriverResult<Self> {
        let args: Vec<&OsStr> = vec![OsStr::new("--disable-gpu")];

        let browser = Browser::new(LaunchOptions {
            headless: site.headless,
            window_size: Some((1920, 1080)),
            idle_browser_timeout: Duration::from_secs(60 * 60),
            args,
            ..Default::default()
        })
        .map_err(|e| DriverError::Launch(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| DriverError::Launch(e.to_string()))?;
        tab.set_default_timeout(Duration::from_secs(site.page_load_timeout_secs));

        Ok(Self { browser, tab })
    }

    fn find(&self, locator: &str) -> DriverResult<Element<'_>> {
        self.tab
            .find_element_by_xpath(locator)
            .map_err(|_| DriverError::ElementNotFound {
                locator: locator.to_string(),
            })
    }
}

impl BrowserSession for ChromeSession {
    fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map(|_| ())
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    fn current_url(&self) -> DriverResult<String> {
        Ok(self.tab.get_url())
    }

    fn option_labels(&mut self, locator: &str) -> DriverResult<Vec<String>> {
        let select = self.find(locator)?;
        let interaction = |message: String| DriverError::Interaction {
            locator: locator.to_string(),
            message,
        };

        let result = select
            .call_js_fn(READ_OPTIONS_JS, vec![], false)
            .map_err(|e| interaction(e.to_string()))?;

        let json = result
            .value
            .as_ref()
            .and_then(|value| value.as_str())
            .ok_or_else(|| interaction("option list was not returned".to_string()))?;

        serde_json::from_str(json).map_err(|e| interaction(e.to_string()))
    }

    fn select_option(&mut self, locator: &str, label: &str) -> DriverResult<()> {
        let select = self.find(locator)?;

        let result = select
            .call_js_fn(SELECT_OPTION_JS, vec![serde_json::json!(label)], false)
            .map_err(|e| DriverError::Interaction {
                locator: locator.to_string(),
                message: e.to_string(),
            })?;

        match result.value.as_ref().and_then(|value| value.as_bool()) {
            Some(true) => Ok(()),
            _ => Err(DriverError::OptionNotFound {
                locator: locator.to_string(),
                label: label.to_string(),
            }),
        }
    }

    fn click(&mut self, locator: &str) -> DriverResult<()> {
        let element = self.find(locator)?;
        element
            .click()
            .map(|_| ())
            .map_err(|e| DriverError::Interaction {
                locator: locator.to_string(),
                message: e.to_string(),
            })
    }

    fn close(self) {
        if let Err(e) = self.tab.close(true) {
            tracing::debug!("Tab did not close cleanly: {}", e);
        }
        drop(self.browser);
    }
}

/// Opens a new Chrome instance for every session request
#[derive(Debug, Clone)]
pub struct ChromeSessionFactory {
    site: SiteConfig,
}

impl ChromeSessionFactory {
    pub fn new(site: SiteConfig) -> Self {
        Self { site }
    }
}

impl SessionFactory for ChromeSessionFactory {
    type Session = ChromeSession;

    fn open(&self) -> DriverResult<ChromeSession> {
        ChromeSession::launch(&self.site)
    }
}
