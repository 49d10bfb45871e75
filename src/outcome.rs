//! Outcome types for listings, scrape attempts and combinations
//!
//! The worker's retry loop branches on these kinds instead of on the error
//! types of whatever collaborator failed.

use crate::browser::DriverError;
use crate::crawler::FetchError;
use crate::record::{Record, SkipReason};
use std::fmt;
use thiserror::Error;

/// What happened to one listing
#[derive(Debug)]
pub enum ListingOutcome {
    /// The listing produced a record
    Success(Record),

    /// The listing's markup is unusable; never retried
    Skip(SkipReason),

    /// The detail page could not be fetched after every fetch attempt
    TransientFailure(FetchError),
}

/// Why one scrape attempt of a combination failed
///
/// Both kinds are retried at combination granularity.
#[derive(Debug, Clone, Error)]
pub enum AttemptError {
    #[error("driver failure: {0}")]
    Driver(#[from] DriverError),

    #[error("results page unavailable: {0}")]
    ResultsUnavailable(#[from] FetchError),
}

/// Final state of one combination in a worker's chunk
#[derive(Debug, Clone)]
pub enum CombinationOutcome {
    /// Scraped and flushed; `records` may be zero
    Scraped { records: usize, attempts: u32 },

    /// Every attempt failed; the combination's data is dropped
    Abandoned { attempts: u32, last_error: AttemptError },
}

impl CombinationOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Scraped { attempts, .. } | Self::Abandoned { attempts, .. } => *attempts,
        }
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned { .. })
    }
}

/// Tally of listing outcomes within one combination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingTally {
    pub extracted: usize,
    pub skipped: usize,
    pub unavailable: usize,
}

impl ListingTally {
    pub fn record(&mut self, outcome: &ListingOutcome) {
        match outcome {
            ListingOutcome::Success(_) => self.extracted += 1,
            ListingOutcome::Skip(_) => self.skipped += 1,
            ListingOutcome::TransientFailure(_) => self.unavailable += 1,
        }
    }
}

impl fmt::Display for ListingTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} extracted, {} skipped, {} unavailable",
            self.extracted, self.skipped, self.unavailable
        )
    }
}
