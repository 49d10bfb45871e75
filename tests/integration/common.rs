//! Shared fixtures: site markup, configs and fake browser sessions

use offer_sweep::browser::{BrowserSession, DriverError, DriverResult, SessionFactory};
use offer_sweep::config::{Config, CrawlerConfig, FetchConfig, OutputConfig, SiteConfig};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SEARCH_URL: &str = "https://search.example/pcgi/mobile.cgi";
pub const MAKE_SELECT: &str = "//select[@name='marka']";
pub const MODEL_SELECT: &str = "//select[@name='model']";
pub const SEARCH_BUTTON: &str = "//input[@id='button2']";
pub const CONSENT_BUTTON: &str = "//div[@class='fc-dialog']//button";

/// Builds a config pointing at scratch directories, with no fetch backoff
pub fn test_config(scratch: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            worker_count: 2,
            max_tasks_per_worker: 2,
            chunk_multiplier: 1,
            combination_attempts: 3,
            max_pages_per_combination: 50,
            max_combinations: None,
        },
        fetch: FetchConfig {
            attempts: 2,
            timeout_secs: 5,
            backoff_base_ms: 0,
            user_agent: None,
        },
        site: SiteConfig {
            search_url: SEARCH_URL.to_string(),
            make_select: MAKE_SELECT.to_string(),
            model_select: MODEL_SELECT.to_string(),
            search_button: SEARCH_BUTTON.to_string(),
            consent_button: CONSENT_BUTTON.to_string(),
            offer_link_marker: "/pcgi/mobile.cgi?act=4&".to_string(),
            page_load_timeout_secs: 10,
            headless: true,
        },
        output: OutputConfig {
            partial_dir: scratch.join("temp").to_string_lossy().into_owned(),
            output_dir: scratch.join("output").to_string_lossy().into_owned(),
            ..OutputConfig::default()
        },
    }
}

/// A results page listing the given offer ids, with a pager
///
/// `page` is 1-based; a pager link to the next page is present unless this
/// is the last page.
pub fn results_page(offer_ids: &[u32], page: usize, last_page: usize) -> String {
    let mut html = String::from("<html><body><table>");
    for id in offer_ids {
        html.push_str(&format!(
            r#"<tr><td><a class="photoLink" href="/pcgi/mobile.cgi?act=4&adv={id}"><img></a></td></tr>"#
        ));
    }
    html.push_str(r#"<tr><td><a class="photoLink" href="/banner?id=1">ad</a></td></tr>"#);
    html.push_str("</table><div class=\"pager\">");
    for n in 1..=last_page {
        let class = if n == page { "saveSlink selected" } else { "saveSlink" };
        html.push_str(&format!(r#"<a class="{class}" href="/results/{n}">{n}</a>"#));
    }
    html.push_str("</div></body></html>");
    html
}

/// A listing detail page with a populated main attribute block
pub fn listing_page(title: &str, price: &str, views: u32) -> String {
    format!(
        r#"<html><body>
<h1>{title}</h1>
<span id="details_price">{price}</span>
<div class="adress">София, гр. София</div>
<span class="advact">{views}</span>
<ul class="dilarData">
  <li>Дата на производство</li><li>март 2015</li>
  <li>Тип двигател</li><li>Дизелов</li>
  <li>Пробег [км]</li><li>180000</li>
</ul>
<label class="extra_cat">Безопасност</label>
<div>• ABS</div><br>
<div>• ESP</div>
<label class="extra_cat">Комфорт</label>
</body></html>"#
    )
}

/// A detail page without the main attribute block
pub fn broken_listing_page() -> String {
    "<html><body><h1>Removed offer</h1></body></html>".to_string()
}

/// Scripted stand-in for a browser on the search form
///
/// Tracks the selected make and model; clicking the search button moves
/// the session to the results URL registered for that combination.
/// `failures_left` makes that many `select_option` calls fail first.
pub struct FakeSession {
    url: String,
    options: HashMap<String, Vec<String>>,
    results: HashMap<(String, String), String>,
    make: Option<String>,
    model: Option<String>,
    failures_left: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl FakeSession {
    pub fn new(makes: &[(&str, &[&str])], results: HashMap<(String, String), String>) -> Self {
        let mut options = HashMap::new();
        let mut make_labels = vec!["Марка".to_string()];
        for (make, models) in makes {
            make_labels.push(make.to_string());
            let mut model_labels = vec!["-".to_string()];
            model_labels.extend(models.iter().map(|m| m.to_string()));
            options.insert(make.to_string(), model_labels);
        }
        options.insert(String::new(), make_labels);

        Self {
            url: "about:blank".to_string(),
            options,
            results,
            make: None,
            model: None,
            failures_left: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing_first(mut self, failures: Arc<AtomicUsize>) -> Self {
        self.failures_left = failures;
        self
    }

    pub fn counting_closes(mut self, closed: Arc<AtomicUsize>) -> Self {
        self.closed = closed;
        self
    }
}

impl BrowserSession for FakeSession {
    fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.url = url.to_string();
        self.make = None;
        self.model = None;
        Ok(())
    }

    fn current_url(&self) -> DriverResult<String> {
        Ok(self.url.clone())
    }

    fn option_labels(&mut self, locator: &str) -> DriverResult<Vec<String>> {
        let key = if locator == MAKE_SELECT {
            String::new()
        } else {
            self.make.clone().unwrap_or_default()
        };
        Ok(self.options.get(&key).cloned().unwrap_or_default())
    }

    fn select_option(&mut self, locator: &str, label: &str) -> DriverResult<()> {
        let pending = self.failures_left.load(Ordering::SeqCst);
        if pending > 0 {
            self.failures_left.store(pending - 1, Ordering::SeqCst);
            return Err(DriverError::Interaction {
                locator: locator.to_string(),
                message: "element is not attached to the page document".to_string(),
            });
        }

        if locator == MAKE_SELECT {
            self.make = Some(label.to_string());
            self.model = None;
        } else {
            self.model = Some(label.to_string());
        }
        Ok(())
    }

    fn click(&mut self, locator: &str) -> DriverResult<()> {
        if locator == CONSENT_BUTTON {
            return Err(DriverError::ElementNotFound {
                locator: locator.to_string(),
            });
        }

        let key = (
            self.make.clone().unwrap_or_default(),
            self.model.clone().unwrap_or_default(),
        );
        match self.results.get(&key) {
            Some(url) => {
                self.url = url.clone();
                Ok(())
            }
            None => Err(DriverError::Navigation {
                url: self.url.clone(),
                message: format!("no results for {} {}", key.0, key.1),
            }),
        }
    }

    fn close(self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Opens fake sessions sharing one site layout
pub struct FakeFactory {
    makes: Vec<(String, Vec<String>)>,
    results: HashMap<(String, String), String>,
    pub opened: AtomicUsize,
    pub closed: Arc<AtomicUsize>,
    pub fail_open: bool,
    log: Mutex<Vec<String>>,
}

impl FakeFactory {
    pub fn new(makes: &[(&str, &[&str])], results: HashMap<(String, String), String>) -> Self {
        Self {
            makes: makes
                .iter()
                .map(|(make, models)| {
                    (make.to_string(), models.iter().map(|m| m.to_string()).collect())
                })
                .collect(),
            results,
            opened: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
            fail_open: false,
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn threads(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl SessionFactory for FakeFactory {
    type Session = FakeSession;

    fn open(&self) -> DriverResult<FakeSession> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        if let Some(name) = std::thread::current().name() {
            self.log.lock().unwrap().push(name.to_string());
        }
        if self.fail_open {
            return Err(DriverError::Launch("chrome not installed".to_string()));
        }

        let makes: Vec<(&str, Vec<&str>)> = self
            .makes
            .iter()
            .map(|(make, models)| (make.as_str(), models.iter().map(String::as_str).collect()))
            .collect();
        let borrowed: Vec<(&str, &[&str])> = makes
            .iter()
            .map(|(make, models)| (*make, models.as_slice()))
            .collect();

        let session = FakeSession::new(&borrowed, self.results.clone());
        Ok(session.counting_closes(Arc::clone(&self.closed)))
    }
}

/// Results URL map keyed by (make, model)
pub fn results_for(entries: &[(&str, &str, String)]) -> HashMap<(String, String), String> {
    entries
        .iter()
        .map(|(make, model, url)| ((make.to_string(), model.to_string()), url.clone()))
        .collect()
}
