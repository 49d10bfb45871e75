use serde::Deserialize;

/// Main configuration structure for Offer-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Work distribution and worker pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of isolated workers running at the same time
    #[serde(rename = "worker-count")]
    pub worker_count: usize,

    /// Chunks a worker processes before its browser session is recycled
    #[serde(rename = "max-tasks-per-worker")]
    pub max_tasks_per_worker: usize,

    /// Chunks produced per worker, for load balancing
    #[serde(rename = "chunk-multiplier")]
    pub chunk_multiplier: usize,

    /// Attempts per combination before it is abandoned
    #[serde(rename = "combination-attempts")]
    pub combination_attempts: u32,

    /// Upper bound on result pages walked for one combination
    #[serde(rename = "max-pages-per-combination")]
    pub max_pages_per_combination: usize,

    /// Optional cap on the number of enumerated combinations
    #[serde(rename = "max-combinations")]
    pub max_combinations: Option<usize>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            worker_count: 8,
            max_tasks_per_worker: 5,
            chunk_multiplier: 10,
            combination_attempts: 3,
            max_pages_per_combination: 500,
            max_combinations: None,
        }
    }
}

/// HTTP page fetching configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Attempts per page before giving up
    pub attempts: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Base delay for jittered exponential backoff (milliseconds), 0 disables it
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// User agent sent with page requests
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            timeout_secs: 30,
            backoff_base_ms: 500,
            user_agent: None,
        }
    }
}

/// Target site: search form locators and listing markers
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// URL of the search form page
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// XPath of the make dropdown
    #[serde(rename = "make-select")]
    pub make_select: String,

    /// XPath of the model dropdown
    #[serde(rename = "model-select")]
    pub model_select: String,

    /// XPath of the search submit button
    #[serde(rename = "search-button")]
    pub search_button: String,

    /// XPath of the cookie consent accept button
    #[serde(rename = "consent-button")]
    pub consent_button: String,

    /// Substring every offer detail link contains
    #[serde(rename = "offer-link-marker", default = "default_offer_link_marker")]
    pub offer_link_marker: String,

    /// Page load ceiling enforced by the browser session (seconds)
    #[serde(rename = "page-load-timeout-secs", default = "default_page_load_timeout")]
    pub page_load_timeout_secs: u64,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding per-worker partial files
    #[serde(rename = "partial-dir")]
    pub partial_dir: String,

    /// Directory receiving the merged dataset
    #[serde(rename = "output-dir")]
    pub output_dir: String,

    /// File name prefix of the merged dataset, the run date is appended
    #[serde(rename = "dataset-prefix")]
    pub dataset_prefix: String,

    /// Directory for dated log files, console only when unset
    #[serde(rename = "log-dir")]
    pub log_dir: Option<String>,

    /// Output columns left out of the duplicate identity check
    #[serde(rename = "dedup-ignore")]
    pub dedup_ignore: Vec<String>,

    /// Keep partial files after a successful merge
    #[serde(rename = "keep-partials")]
    pub keep_partials: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            partial_dir: "./temp".to_string(),
            output_dir: "./output".to_string(),
            dataset_prefix: "mobile.bg-offers".to_string(),
            log_dir: None,
            dedup_ignore: vec!["Model".to_string(), "Views".to_string()],
            keep_partials: false,
        }
    }
}

fn default_offer_link_marker() -> String {
    "/pcgi/mobile.cgi?act=4&".to_string()
}

fn default_page_load_timeout() -> u64 {
    60
}

fn default_headless() -> bool {
    true
}
