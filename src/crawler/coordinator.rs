//! Sweep coordinator - main run orchestration
//!
//! This module drives a full run:
//! - Enumerating every (make, model) combination through one browser session
//! - Shuffling and chunking the combinations
//! - Running the worker pool until every worker has terminated
//! - Merging the partial outputs into the dated dataset

use crate::browser::{BrowserSession, ChromeSessionFactory, SessionFactory};
use crate::config::Config;
use crate::crawler::distributor::distribute;
use crate::crawler::enumerator::enumerate_combinations;
use crate::crawler::pool::{PoolReport, WorkerPool};
use crate::output::{list_partial_files, merge_partials, MergeReport, RunSummary};
use crate::record::Combination;
use crate::SweepError;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub summary: RunSummary,
    pub pool: PoolReport,
    pub merge: MergeReport,
}

/// Main sweep coordinator structure
pub struct Coordinator<F> {
    config: Arc<Config>,
    factory: Arc<F>,
}

impl Coordinator<ChromeSessionFactory> {
    /// Creates a coordinator driving real Chrome sessions
    pub fn with_chrome(config: Config) -> Self {
        let factory = ChromeSessionFactory::new(config.site.clone());
        Self::new(factory, config)
    }
}

impl<F> Coordinator<F>
where
    F: SessionFactory + 'static,
{
    pub fn new(factory: F, config: Config) -> Self {
        Self {
            config: Arc::new(config),
            factory: Arc::new(factory),
        }
    }

    /// Lists every combination the search form offers
    ///
    /// Runs on a blocking thread with its own session. Any driver failure
    /// here is fatal to the run.
    pub async fn enumerate(&self) -> Result<Vec<Combination>, SweepError> {
        let factory = Arc::clone(&self.factory);
        let config = Arc::clone(&self.config);

        let enumerated = tokio::task::spawn_blocking(move || {
            let mut session = factory.open()?;
            let combinations = enumerate_combinations(
                &mut session,
                &config.site,
                config.crawler.max_combinations,
            );
            session.close();
            combinations
        })
        .await
        .map_err(|e| SweepError::Worker {
            worker: "enumerator".to_string(),
            message: e.to_string(),
        })?;

        enumerated.map_err(SweepError::Enumeration)
    }

    /// Runs the complete sweep
    ///
    /// # Returns
    ///
    /// * `Ok(SweepReport)` - Every worker terminated and the dataset was written
    /// * `Err(SweepError)` - Enumeration failed, or the pool or merge could not run
    pub async fn run(&self) -> Result<SweepReport, SweepError> {
        let start_time = Instant::now();

        let leftovers = list_partial_files(Path::new(&self.config.output.partial_dir))?;
        if !leftovers.is_empty() {
            tracing::warn!(
                "{} partial files already in {}, they will be merged into this run",
                leftovers.len(),
                self.config.output.partial_dir
            );
        }

        tracing::info!("Enumerating combinations from {}", self.config.site.search_url);
        let combinations = self.enumerate().await?;
        let combinations_enumerated = combinations.len();
        tracing::info!("Found {} combinations", combinations_enumerated);

        let chunks = distribute(
            combinations,
            self.config.crawler.worker_count,
            self.config.crawler.chunk_multiplier,
        );
        let chunk_count = chunks.len();
        tracing::info!("Distributed into {} chunks", chunk_count);

        let pool = WorkerPool::new(Arc::clone(&self.factory), Arc::clone(&self.config));
        let pool_report = tokio::task::spawn_blocking(move || pool.run(chunks))
            .await
            .map_err(|e| SweepError::Worker {
                worker: "pool".to_string(),
                message: e.to_string(),
            })??;

        for combination in pool_report.abandoned() {
            tracing::warn!("Not scraped: {}", combination);
        }

        let merge = merge_partials(&self.config.output, chrono::Local::now().date_naive())?;

        let summary = RunSummary {
            combinations_enumerated,
            chunks: chunk_count,
            combinations_scraped: pool_report.combinations_scraped(),
            combinations_abandoned: pool_report.combinations_abandoned(),
            records_written: merge.rows_written,
            worker_failures: pool_report.failures.len(),
            elapsed: start_time.elapsed(),
        };

        tracing::info!(
            "Sweep complete: {} records from {} combinations in {:.1}s",
            summary.records_written,
            summary.combinations_scraped,
            summary.elapsed.as_secs_f64()
        );

        Ok(SweepReport {
            summary,
            pool: pool_report,
            merge,
        })
    }
}

/// Runs a complete sweep with Chrome sessions
pub async fn run_sweep(config: Config) -> Result<SweepReport, SweepError> {
    Coordinator::with_chrome(config).run().await
}
