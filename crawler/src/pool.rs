use modpack_core::{ModPack, PageId};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::client::PageClient;
use crate::error::FetchError;
use crate::fetcher::Fetcher;
use crate::random::RandomSource;

/// One identifier waiting to be fetched. Enqueued exactly once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchJob {
    pub id: PageId,
}

/// Result of processing one [`FetchJob`].
#[derive(Debug)]
pub struct FetchOutcome {
    pub id: PageId,
    pub result: Result<ModPack, FetchError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Dispatching,
    Draining,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::Dispatching => "dispatching",
            RunPhase::Draining => "draining",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Wall-clock start of a run; discovery counts towards the elapsed time.
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    started: Instant,
    started_at: OffsetDateTime,
}

impl RunClock {
    pub fn start() -> Self {
        Self { started: Instant::now(), started_at: OffsetDateTime::now_utc() }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct Harvest {
    /// Successful records in arrival order.
    pub records: Vec<ModPack>,
    /// `(id, cause)` for every page that failed.
    pub failures: Vec<(PageId, String)>,
    pub elapsed: Duration,
    /// RFC 3339 start time.
    pub started_at: String,
}

impl Harvest {
    pub fn empty(clock: RunClock) -> Self {
        Self {
            records: Vec::new(),
            failures: Vec::new(),
            elapsed: clock.started.elapsed(),
            started_at: clock.started_at.format(&Rfc3339).unwrap_or_default(),
        }
    }
    pub fn succeeded(&self) -> usize { self.records.len() }
    pub fn failed(&self) -> usize { self.failures.len() }
}

/// Fetch every id in `1..max_id` with `worker_count` concurrent workers and collect the outcomes.
pub async fn run_pool<C, R>(
    fetcher: Arc<Fetcher<C, R>>,
    max_id: PageId,
    worker_count: usize,
    clock: RunClock,
) -> Harvest
where
    C: PageClient + 'static,
    R: RandomSource + 'static,
{
    let worker_count = worker_count.max(1);
    debug!(phase = %RunPhase::Idle, max_id, worker_count, "pool starting");

    let (job_tx, job_rx) = mpsc::channel::<FetchJob>(worker_count);
    let (result_tx, result_rx) = mpsc::unbounded_channel::<FetchOutcome>();

    let producer = tokio::spawn(async move {
        debug!(phase = %RunPhase::Dispatching, "queueing jobs");
        for id in 1..max_id {
            if job_tx.send(FetchJob { id }).await.is_err() {
                warn!(id, "job queue closed before all ids were queued");
                break;
            }
        }
        debug!(phase = %RunPhase::Draining, "job queue closed");
    });

    let mut workers = spawn_workers(fetcher, job_rx, result_tx.clone(), worker_count);
    let supervisor = tokio::spawn(async move {
        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "worker task failed");
            }
        }
        // last sender; dropping it closes the result queue
        drop(result_tx);
    });

    let expected = max_id.saturating_sub(1) as usize;
    let harvest = collect(result_rx, clock, expected).await;

    for handle in [producer, supervisor] {
        if let Err(err) = handle.await {
            error!(error = %err, "pool task failed");
        }
    }
    debug!(phase = %RunPhase::Done, "pool finished");
    harvest
}

fn spawn_workers<C, R>(
    fetcher: Arc<Fetcher<C, R>>,
    receiver: mpsc::Receiver<FetchJob>,
    results: mpsc::UnboundedSender<FetchOutcome>,
    worker_count: usize,
) -> JoinSet<()>
where
    C: PageClient + 'static,
    R: RandomSource + 'static,
{
    let shared_receiver = Arc::new(Mutex::new(receiver));
    let mut join_set = JoinSet::new();
    for worker in 0..worker_count {
        let rx = Arc::clone(&shared_receiver);
        let fetcher = Arc::clone(&fetcher);
        let results = results.clone();
        join_set.spawn(async move { run_worker(worker, rx, fetcher, results).await });
    }
    join_set
}

async fn run_worker<C, R>(
    worker: usize,
    receiver: Arc<Mutex<mpsc::Receiver<FetchJob>>>,
    fetcher: Arc<Fetcher<C, R>>,
    results: mpsc::UnboundedSender<FetchOutcome>,
) where
    C: PageClient,
    R: RandomSource,
{
    while let Some(job) = receive_job(&receiver).await {
        let outcome = fetcher.process(job.id).await;
        if results.send(outcome).is_err() {
            warn!(worker, id = job.id, "result queue closed; worker stopping");
            break;
        }
    }
    debug!(worker, "worker exiting (job queue drained)");
}

async fn receive_job(receiver: &Arc<Mutex<mpsc::Receiver<FetchJob>>>) -> Option<FetchJob> {
    let mut guard = receiver.lock().await;
    guard.recv().await
}

/// Drain the result queue until every worker has finished. Failures are logged and
/// counted; they never stop the drain.
pub async fn collect(
    mut results: mpsc::UnboundedReceiver<FetchOutcome>,
    clock: RunClock,
    expected: usize,
) -> Harvest {
    let mut harvest = Harvest::empty(clock);
    harvest.records.reserve(expected);

    while let Some(FetchOutcome { id, result }) = results.recv().await {
        match result {
            Ok(pack) => {
                debug!(id, title = %pack.title, "page harvested");
                harvest.records.push(pack);
            }
            Err(err) => {
                warn!(id, error = %err, "page failed");
                harvest.failures.push((id, err.to_string()));
            }
        }
    }

    harvest.elapsed = clock.started.elapsed();
    if let Some(sample) = harvest.records.first() {
        info!("sample record:\n{sample}");
    }
    info!(
        elapsed = ?harvest.elapsed,
        succeeded = harvest.succeeded(),
        failed = harvest.failed(),
        started_at = %harvest.started_at,
        "harvest finished"
    );
    harvest
}
