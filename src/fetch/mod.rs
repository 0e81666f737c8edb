//! Serialized fetch queue with in-flight coalescing
//!
//! All network lookups funnel through a single worker task so the metadata
//! provider sees at most one request at a time, with a cooldown between
//! consecutive jobs. Requests for the same `(kind, id, language)` triple that
//! arrive while a job is queued, running, or backing off attach as additional
//! waiters instead of enqueueing again; every waiter receives the same
//! outcome. A failed job is re-enqueued after its backoff delay rather than
//! held in the worker, so other jobs keep flowing while it waits.

pub mod retry;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, warn};

use crate::api::ImagesApi;
use crate::cache::CacheStore;
use crate::config::QueueConfig;
use crate::models::{CacheValue, LogoRequest, ResolvedLogo};
use crate::ranker;

/// Waiters keyed by request, in attachment order
type Waiters = Arc<Mutex<HashMap<LogoRequest, Vec<oneshot::Sender<ResolvedLogo>>>>>;

struct FetchJob {
    request: LogoRequest,
    /// 1-based attempt number this job will run as
    attempt: u32,
}

/// Handle to the queue. Cloneable; all clones feed the same worker.
#[derive(Clone)]
pub struct FetchQueue {
    waiters: Waiters,
    jobs: mpsc::UnboundedSender<FetchJob>,
}

impl FetchQueue {
    /// Start the worker task and return the submission handle. The worker
    /// runs until every handle (and its job sender) is dropped.
    pub fn new(api: Arc<dyn ImagesApi>, cache: Arc<CacheStore>, config: QueueConfig) -> Self {
        let waiters: Waiters = Arc::new(Mutex::new(HashMap::new()));
        let (jobs, rx) = mpsc::unbounded_channel();

        let worker = Worker {
            api,
            cache,
            config,
            waiters: waiters.clone(),
            // weak, so the worker exits once every queue handle is dropped
            requeue: jobs.downgrade(),
        };
        tokio::spawn(worker.run(rx));

        Self { waiters, jobs }
    }

    /// Enqueue a request, or attach to an identical one already in flight.
    ///
    /// The returned receiver yields the outcome once the worker finishes the
    /// job. A dropped receiver cancels nothing; the job still runs and
    /// populates the cache.
    pub async fn submit(&self, request: LogoRequest) -> oneshot::Receiver<ResolvedLogo> {
        let (tx, rx) = oneshot::channel();

        let mut waiters = self.waiters.lock().await;
        if let Some(pending) = waiters.get_mut(&request) {
            debug!(key = %request.storage_key(), "coalesced onto in-flight request");
            pending.push(tx);
            return rx;
        }

        waiters.insert(request.clone(), vec![tx]);
        let job = FetchJob {
            request: request.clone(),
            attempt: 1,
        };
        if self.jobs.send(job).is_err() {
            // worker gone, drop the waiters so receivers resolve to Missing
            warn!(key = %request.storage_key(), "fetch worker is not running");
            waiters.remove(&request);
        }
        rx
    }
}

struct Worker {
    api: Arc<dyn ImagesApi>,
    cache: Arc<CacheStore>,
    config: QueueConfig,
    waiters: Waiters,
    requeue: mpsc::WeakUnboundedSender<FetchJob>,
}

impl Worker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<FetchJob>) {
        while let Some(job) = rx.recv().await {
            self.process(job).await;
            tokio::time::sleep(self.config.cooldown).await;
        }
    }

    async fn process(&self, job: FetchJob) {
        let request = job.request;
        let include = format!("{},en,null", request.language);

        match self
            .api
            .logo_candidates(request.kind, &request.id, &include)
            .await
        {
            Ok(candidates) => {
                let outcome: ResolvedLogo = ranker::pick(&candidates, &request.language)
                    .map(|best| self.api.logo_url(&best.rasterized_path()))
                    .into();
                self.cache
                    .set(&request.storage_key(), &CacheValue::from_outcome(&outcome))
                    .await;
                self.flush(&request, outcome).await;
            }
            Err(e) if job.attempt < self.config.retry.max_attempts => {
                let delay = self.config.retry.delay_for(job.attempt);
                warn!(
                    key = %request.storage_key(),
                    attempt = job.attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "images lookup failed, re-queueing after backoff"
                );
                self.requeue_later(request, job.attempt + 1, delay);
            }
            Err(e) => {
                warn!(
                    key = %request.storage_key(),
                    attempts = job.attempt,
                    error = %e,
                    "images lookup failed, giving up"
                );
                if self.config.cache_network_failures {
                    self.cache
                        .set(&request.storage_key(), &CacheValue::Absent)
                        .await;
                }
                self.flush(&request, ResolvedLogo::Missing).await;
            }
        }
    }

    /// Put the job back on the queue once its backoff delay elapses. Waiters
    /// stay attached in the meantime; if the queue is gone by then, they are
    /// dropped so their receivers resolve.
    fn requeue_later(&self, request: LogoRequest, attempt: u32, delay: Duration) {
        let requeue = self.requeue.clone();
        let waiters = self.waiters.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match requeue.upgrade() {
                Some(jobs) => {
                    if let Err(e) = jobs.send(FetchJob { request, attempt }) {
                        waiters.lock().await.remove(&e.0.request);
                    }
                }
                None => {
                    waiters.lock().await.remove(&request);
                }
            }
        });
    }

    /// Deliver the outcome to every waiter, in attachment order. Waiters
    /// whose receiver was dropped are skipped silently.
    async fn flush(&self, request: &LogoRequest, outcome: ResolvedLogo) {
        let pending = self.waiters.lock().await.remove(request);
        for tx in pending.unwrap_or_default() {
            let _ = tx.send(outcome.clone());
        }
    }
}
