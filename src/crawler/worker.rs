//! Worker: scrapes the combinations of its chunks
//!
//! One worker incarnation owns an HTTP client and a partial output file.
//! Every chunk it takes gets a fresh browser session that is closed once
//! the chunk is exhausted. Records of a combination are flushed as soon as
//! the combination succeeds.

use crate::browser::{
    dismiss_consent, ensure_on_page, BrowserSession, DriverError, DriverResult, SessionFactory,
};
use crate::config::{Config, SiteConfig};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::paginator::ListingPaginator;
use crate::outcome::{AttemptError, CombinationOutcome, ListingOutcome, ListingTally};
use crate::output::PartialOutput;
use crate::record::{extract_record, Combination, Record};
use crate::SweepError;
use scraper::Html;
use std::fmt;
use std::path::Path;
use url::Url;

/// Identity of one worker incarnation
///
/// `slot` is the pool position, `generation` counts recycles of that slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId {
    pub slot: usize,
    pub generation: usize,
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}-g{}", self.slot, self.generation)
    }
}

/// What one worker incarnation did
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub worker: WorkerId,
    pub chunks: usize,
    pub combinations_scraped: usize,
    pub combinations_abandoned: usize,
    pub records_written: usize,
    pub abandoned: Vec<Combination>,
}

impl WorkerReport {
    /// Report of an incarnation that could not start on `chunk`
    pub(crate) fn unprocessed(worker: WorkerId, chunk: &[Combination]) -> Self {
        let mut report = Self::new(worker);
        report.abandon(chunk);
        report
    }

    fn abandon(&mut self, combinations: &[Combination]) {
        for combination in combinations {
            tracing::error!("Abandoning {} unscraped", combination);
        }
        self.combinations_abandoned += combinations.len();
        self.abandoned.extend_from_slice(combinations);
    }

    fn new(worker: WorkerId) -> Self {
        Self {
            worker,
            chunks: 0,
            combinations_scraped: 0,
            combinations_abandoned: 0,
            records_written: 0,
            abandoned: Vec::new(),
        }
    }
}

/// A worker incarnation
pub struct Worker<'a> {
    id: WorkerId,
    config: &'a Config,
    fetcher: PageFetcher,
    output: PartialOutput,
    report: WorkerReport,
}

impl<'a> Worker<'a> {
    /// Builds the worker's HTTP client and opens its partial output file
    pub fn new(id: WorkerId, config: &'a Config) -> Result<Self, SweepError> {
        let fetcher = PageFetcher::new(&config.fetch)?;
        let output = PartialOutput::open(Path::new(&config.output.partial_dir), &id.to_string())?;

        Ok(Self {
            id,
            config,
            fetcher,
            output,
            report: WorkerReport::new(id),
        })
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn report(&self) -> &WorkerReport {
        &self.report
    }

    /// Processes one chunk with a session opened for it
    ///
    /// Opening the session is retried like a combination attempt; when it
    /// never succeeds every combination of the chunk is abandoned. A
    /// failure to persist records abandons the rest of the chunk and is
    /// returned. Driver failures while scraping are handled per combination.
    pub async fn run_chunk<F: SessionFactory>(
        &mut self,
        factory: &F,
        chunk: &[Combination],
    ) -> Result<(), SweepError> {
        tracing::info!("Scraping chunk of {} combinations", chunk.len());
        self.report.chunks += 1;

        let mut session = match self.open_session(factory) {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("No browser session for chunk: {}", e);
                self.report.abandon(chunk);
                return Ok(());
            }
        };

        let site = &self.config.site;
        let ready = session
            .navigate(&site.search_url)
            .and_then(|_| dismiss_consent(&mut session, &site.consent_button));
        if let Err(e) = ready {
            tracing::warn!("Search page not ready, attempts will retry it: {}", e);
        }

        let mut result = Ok(());
        for (index, combination) in chunk.iter().enumerate() {
            if let Err(e) = self.process_combination(&mut session, combination).await {
                tracing::error!("Cannot persist records, giving up on the chunk: {}", e);
                self.report.abandon(&chunk[index..]);
                result = Err(e);
                break;
            }
        }

        session.close();
        result
    }

    /// Opens a session, retrying up to `combination-attempts` times
    fn open_session<F: SessionFactory>(&self, factory: &F) -> DriverResult<F::Session> {
        let max_attempts = self.config.crawler.combination_attempts.max(1);
        let mut attempt = 1;

        loop {
            match factory.open() {
                Ok(session) => return Ok(session),
                Err(e) if attempt >= max_attempts => return Err(e),
                Err(e) => {
                    tracing::warn!("Opening browser session failed, attempt {}: {}", attempt, e);
                    attempt += 1;
                }
            }
        }
    }

    /// Scrapes one combination, retrying driver-level failures
    ///
    /// A combination is abandoned after the configured number of attempts;
    /// that is logged and reported but is not an error. Only a failure to
    /// persist records is returned as `Err`.
    pub async fn process_combination<S: BrowserSession>(
        &mut self,
        session: &mut S,
        combination: &Combination,
    ) -> Result<CombinationOutcome, SweepError> {
        let max_attempts = self.config.crawler.combination_attempts.max(1);
        let mut attempt = 1;

        loop {
            let scraped = scrape_combination(
                session,
                &self.fetcher,
                &self.config.site,
                self.config.crawler.max_pages_per_combination,
                combination,
            )
            .await;

            match scraped {
                Ok((batch, tally)) => {
                    self.output.append(&batch)?;
                    self.report.combinations_scraped += 1;
                    self.report.records_written += batch.len();
                    tracing::info!("Scraped {}: {}", combination, tally);

                    return Ok(CombinationOutcome::Scraped {
                        records: batch.len(),
                        attempts: attempt,
                    });
                }
                Err(e) if attempt >= max_attempts => {
                    tracing::error!(
                        "Abandoning {} after {} attempts: {}",
                        combination,
                        attempt,
                        e
                    );
                    self.report.combinations_abandoned += 1;
                    self.report.abandoned.push(combination.clone());

                    return Ok(CombinationOutcome::Abandoned {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    tracing::error!("Attempt {} for {} failed: {}", attempt, combination, e);
                    attempt += 1;
                    tracing::warn!("Retrying {}... Attempt {}", combination, attempt);
                }
            }
        }
    }

    /// Closes the partial output and returns the report
    pub fn finish(self) -> Result<WorkerReport, SweepError> {
        let path = self.output.finish()?;
        tracing::info!(
            "Worker finished: {} records in {}",
            self.report.records_written,
            path.display()
        );
        Ok(self.report)
    }
}

/// Runs the search for a combination in the browser
///
/// Leaves the session on the first results page.
pub fn open_results<S: BrowserSession>(
    session: &mut S,
    site: &SiteConfig,
    combination: &Combination,
) -> DriverResult<()> {
    ensure_on_page(session, &site.search_url)?;
    dismiss_consent(session, &site.consent_button)?;

    session.select_option(&site.make_select, &combination.make)?;
    session.select_option(&site.model_select, &combination.model)?;
    session.click(&site.search_button)?;

    tracing::info!(
        "After search button click for {} - {}",
        combination,
        session.current_url()?
    );
    Ok(())
}

/// One scrape attempt of a combination
///
/// Returns the records of every usable listing. Listings that cannot be
/// fetched or parsed are skipped here and never fail the attempt.
pub async fn scrape_combination<S: BrowserSession>(
    session: &mut S,
    fetcher: &PageFetcher,
    site: &SiteConfig,
    max_pages: usize,
    combination: &Combination,
) -> Result<(Vec<Record>, ListingTally), AttemptError> {
    open_results(session, site, combination)?;

    let current = session.current_url()?;
    let start = Url::parse(&current).map_err(|e| DriverError::Navigation {
        url: current.clone(),
        message: e.to_string(),
    })?;

    tracing::info!("Getting offers for {}", combination);

    let mut paginator =
        ListingPaginator::start(fetcher, start, &site.offer_link_marker, max_pages).await?;

    let mut batch = Vec::new();
    let mut tally = ListingTally::default();

    while let Some(url) = paginator.next_listing().await {
        let outcome = scrape_listing(fetcher, &url, combination).await;
        tally.record(&outcome);

        match outcome {
            ListingOutcome::Success(record) => batch.push(record),
            ListingOutcome::Skip(reason) => tracing::debug!("Skipping {}: {}", url, reason),
            ListingOutcome::TransientFailure(e) => tracing::warn!("Skipping {}: {}", url, e),
        }
    }

    tracing::debug!(
        "{} results pages walked for {}",
        paginator.pages_walked(),
        combination
    );

    Ok((batch, tally))
}

/// Fetches and extracts one listing
pub async fn scrape_listing(
    fetcher: &PageFetcher,
    url: &Url,
    combination: &Combination,
) -> ListingOutcome {
    tracing::info!("Scraping offer: {}", url);

    let body = match fetcher.fetch(url).await {
        Ok(body) => body,
        Err(e) => return ListingOutcome::TransientFailure(e),
    };

    let document = Html::parse_document(&body);
    match extract_record(&document, &combination.make, &combination.model) {
        Ok(record) => ListingOutcome::Success(record),
        Err(reason) => ListingOutcome::Skip(reason),
    }
}
