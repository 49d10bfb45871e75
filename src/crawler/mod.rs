//! Crawler module for enumerating, distributing and scraping combinations
//!
//! This module contains the core sweep logic, including:
//! - HTTP fetching with retry logic
//! - Results-page pagination and offer link discovery
//! - Combination enumeration through the search form
//! - Chunking, the worker pool and per-combination retries
//! - Overall sweep coordination

mod coordinator;
mod distributor;
mod enumerator;
mod fetcher;
mod paginator;
mod pool;
mod worker;

pub use coordinator::{run_sweep, Coordinator, SweepReport};
pub use distributor::{chunk_size, distribute, distribute_with_rng};
pub use enumerator::enumerate_combinations;
pub use fetcher::{build_http_client, FetchError, PageFetcher};
pub use paginator::{parse_results_page, ListingPaginator, ResultsPage};
pub use pool::{PoolReport, WorkerFailure, WorkerPool};
pub use worker::{
    open_results, scrape_combination, scrape_listing, Worker, WorkerId, WorkerReport,
};

use crate::config::Config;
use crate::SweepError;

/// Runs a complete sweep
///
/// This is the main entry point for starting a run. It will:
/// 1. Enumerate every (make, model) combination
/// 2. Shuffle and chunk them
/// 3. Scrape the chunks on the worker pool
/// 4. Merge the partial outputs into the dataset
///
/// # Arguments
///
/// * `config` - The sweep configuration
///
/// # Returns
///
/// * `Ok(SweepReport)` - Sweep completed
/// * `Err(SweepError)` - Sweep failed
pub async fn sweep(config: Config) -> Result<SweepReport, SweepError> {
    run_sweep(config).await
}
