//! Worker pool
//!
//! A fixed number of worker slots share a queue of chunks. Each slot runs
//! on its own OS thread with its own single-threaded runtime, so a crashed
//! or wedged worker cannot take the others down. A slot's incarnation takes
//! at most `max-tasks-per-worker` chunks, then finishes its output file and
//! is replaced by a fresh incarnation while chunks remain.

use crate::browser::SessionFactory;
use crate::config::Config;
use crate::crawler::worker::{Worker, WorkerId, WorkerReport};
use crate::record::{Chunk, Combination};
use crate::SweepError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use tracing::Instrument;

type ChunkQueue = Arc<Mutex<VecDeque<Chunk>>>;

/// A worker incarnation that did not finish cleanly
#[derive(Debug, Clone)]
pub struct WorkerFailure {
    pub worker: String,
    pub message: String,
}

/// Aggregate of every incarnation the pool ran
#[derive(Debug, Clone, Default)]
pub struct PoolReport {
    pub workers: Vec<WorkerReport>,
    pub failures: Vec<WorkerFailure>,
}

impl PoolReport {
    pub fn chunks(&self) -> usize {
        self.workers.iter().map(|w| w.chunks).sum()
    }

    pub fn combinations_scraped(&self) -> usize {
        self.workers.iter().map(|w| w.combinations_scraped).sum()
    }

    pub fn combinations_abandoned(&self) -> usize {
        self.workers.iter().map(|w| w.combinations_abandoned).sum()
    }

    pub fn records_written(&self) -> usize {
        self.workers.iter().map(|w| w.records_written).sum()
    }

    /// Every combination that was not scraped
    pub fn abandoned(&self) -> Vec<Combination> {
        self.workers
            .iter()
            .flat_map(|w| w.abandoned.iter().cloned())
            .collect()
    }

    fn absorb(&mut self, other: PoolReport) {
        self.workers.extend(other.workers);
        self.failures.extend(other.failures);
    }
}

/// Runs chunks on a bounded set of isolated workers
pub struct WorkerPool<F> {
    factory: Arc<F>,
    config: Arc<Config>,
}

impl<F> WorkerPool<F>
where
    F: SessionFactory + 'static,
{
    pub fn new(factory: Arc<F>, config: Arc<Config>) -> Self {
        Self { factory, config }
    }

    /// Processes every chunk and waits for all workers to terminate
    ///
    /// Blocks the calling thread. Worker failures are collected in the
    /// report; only failing to start a worker thread is an error.
    pub fn run(&self, chunks: Vec<Chunk>) -> Result<PoolReport, SweepError> {
        let slots = self.config.crawler.worker_count.min(chunks.len());
        tracing::info!("Starting {} workers for {} chunks", slots, chunks.len());

        let queue: ChunkQueue = Arc::new(Mutex::new(VecDeque::from(chunks)));

        let mut handles = Vec::with_capacity(slots);
        for slot in 0..slots {
            let queue = Arc::clone(&queue);
            let factory = Arc::clone(&self.factory);
            let config = Arc::clone(&self.config);

            let handle = thread::Builder::new()
                .name(format!("worker-{}", slot))
                .spawn(move || run_slot(slot, &queue, factory.as_ref(), &config))?;
            handles.push((slot, handle));
        }

        let mut report = PoolReport::default();
        for (slot, handle) in handles {
            match handle.join() {
                Ok(slot_report) => report.absorb(slot_report),
                Err(_) => {
                    tracing::error!("Worker slot {} panicked", slot);
                    report.failures.push(WorkerFailure {
                        worker: format!("slot {}", slot),
                        message: "worker thread panicked".to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "All workers terminated: {} incarnations, {} failures",
            report.workers.len(),
            report.failures.len()
        );

        Ok(report)
    }
}

fn next_chunk(queue: &ChunkQueue) -> Option<Chunk> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

/// Runs incarnations of one slot until the queue is drained
fn run_slot<F: SessionFactory>(
    slot: usize,
    queue: &ChunkQueue,
    factory: &F,
    config: &Config,
) -> PoolReport {
    let mut report = PoolReport::default();

    let mut generation = 0;
    while let Some(first) = next_chunk(queue) {
        let id = WorkerId { slot, generation };

        let (worker_report, failure) = run_incarnation(id, first, queue, factory, config);
        report.workers.push(worker_report);

        if let Some(e) = failure {
            tracing::error!("Worker {} failed: {}", id, e);
            report.failures.push(WorkerFailure {
                worker: id.to_string(),
                message: e.to_string(),
            });
        }

        generation += 1;
    }

    report
}

/// Runs one incarnation on a fresh single-threaded runtime
///
/// Always returns a report. A chunk the incarnation took but could not
/// scrape is counted as abandoned there, and the error that ended the
/// incarnation early is returned next to it.
fn run_incarnation<F: SessionFactory>(
    id: WorkerId,
    first: Chunk,
    queue: &ChunkQueue,
    factory: &F,
    config: &Config,
) -> (WorkerReport, Option<SweepError>) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => return (WorkerReport::unprocessed(id, &first), Some(e.into())),
    };

    let span = tracing::info_span!("worker", id = %id);
    let max_tasks = config.crawler.max_tasks_per_worker.max(1);

    runtime.block_on(
        async move {
            let mut worker = match Worker::new(id, config) {
                Ok(worker) => worker,
                Err(e) => return (WorkerReport::unprocessed(id, &first), Some(e)),
            };
            let mut failure = None;

            let mut chunk = Some(first);
            let mut taken = 1;
            while let Some(current) = chunk.take() {
                if let Err(e) = worker.run_chunk(factory, &current).await {
                    failure = Some(e);
                    break;
                }

                if taken < max_tasks {
                    chunk = next_chunk(queue);
                    taken += 1;
                }
            }

            let report = worker.report().clone();
            match worker.finish() {
                Ok(report) => (report, failure),
                Err(e) => (report, failure.or(Some(e))),
            }
        }
        .instrument(span),
    )
}
