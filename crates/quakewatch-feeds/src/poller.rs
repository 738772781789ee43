//! Poller — the background fetch → parse → commit service.
//!
//! The poller owns the authoritative [`Snapshot`]. Readers get clones; the
//! `(records, status)` pair sits behind a single mutex and is always replaced
//! together, so a reader never sees a status that belongs to other records.
//! That lock is never held across an `.await`.
//!
//! Timed and manual cycles run the same code and are serialised by an async
//! cycle lock, so at most one fetch is in flight at any time. A cycle that is
//! dropped halfway (a caller's timeout around [`Poller::fetch_now`]) publishes
//! a failed connection rather than leaving `Fetching` behind.
//!
//! Runtime settings (interval, minimum magnitude, sort flag) are independent
//! atomics. A change is picked up by the next cycle; there is no cross-field
//! atomicity.

use crate::client::FeedSource;
use quakewatch_core::config::PollerConfig;
use quakewatch_core::{parser, FeedStatus, Quake, Snapshot};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Runtime-tunable knobs. Each is read fresh by every cycle.
#[derive(Debug)]
pub struct Settings {
    interval_ms: AtomicU64,
    min_magnitude: AtomicU64,
    sort_by_magnitude: AtomicBool,
}

impl Settings {
    pub fn new(interval: Duration, min_magnitude: f64, sort_by_magnitude: bool) -> Self {
        Self {
            interval_ms: AtomicU64::new(duration_ms(interval)),
            min_magnitude: AtomicU64::new(min_magnitude.to_bits()),
            sort_by_magnitude: AtomicBool::new(sort_by_magnitude),
        }
    }

    pub fn from_config(cfg: &PollerConfig) -> Self {
        Self::new(cfg.interval(), cfg.min_magnitude, cfg.sort_by_magnitude)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::Relaxed))
    }

    pub fn min_magnitude(&self) -> f64 {
        f64::from_bits(self.min_magnitude.load(Ordering::Relaxed))
    }

    pub fn sort_by_magnitude(&self) -> bool {
        self.sort_by_magnitude.load(Ordering::Relaxed)
    }

    fn set_interval(&self, interval: Duration) {
        self.interval_ms.store(duration_ms(interval), Ordering::Relaxed);
    }

    fn set_min_magnitude(&self, magnitude: f64) {
        self.min_magnitude.store(magnitude.to_bits(), Ordering::Relaxed);
    }

    fn set_sort_by_magnitude(&self, enable: bool) {
        self.sort_by_magnitude.store(enable, Ordering::Relaxed);
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&PollerConfig::default())
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

struct Shared {
    source: Arc<dyn FeedSource>,
    snapshot: Mutex<Snapshot>,
    settings: Settings,
    cycle: tokio::sync::Mutex<()>,
}

impl Shared {
    // The snapshot is only ever replaced whole, so a poisoned lock still
    // holds a consistent value.
    fn state(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_status(&self, status: FeedStatus) {
        self.state().status = status;
    }

    async fn run_cycle(&self) -> FeedStatus {
        let cycle = self.cycle.lock().await;
        self.cycle_locked(cycle).await
    }

    /// Body of one cycle. The caller proves it holds the cycle lock by
    /// handing over the guard, which is released when the cycle ends.
    async fn cycle_locked(&self, _cycle: tokio::sync::MutexGuard<'_, ()>) -> FeedStatus {
        let mut in_flight = InFlight::begin(self);

        let status = match self.source.fetch().await {
            Ok(body) => {
                let mut quakes = parser::parse(&body, self.settings.min_magnitude());
                if self.settings.sort_by_magnitude() {
                    parser::sort_by_magnitude(&mut quakes);
                }
                let status = FeedStatus::Updated(quakes.len());
                tracing::debug!(count = quakes.len(), bytes = body.len(), "feed cycle committed");
                {
                    let mut state = self.state();
                    *state = Snapshot {
                        quakes,
                        status: status.clone(),
                    };
                }
                status
            }
            Err(err) => {
                tracing::warn!(error = %err, "feed fetch failed; keeping previous records");
                let status = FeedStatus::connection_failed();
                self.publish_status(status.clone());
                status
            }
        };

        in_flight.settled = true;
        status
    }
}

/// Publishes `Fetching` for the lifetime of one cycle. If the cycle future is
/// dropped before it settles, the status falls back to a failed connection so
/// readers never see `Fetching` with nothing in flight.
struct InFlight<'a> {
    shared: &'a Shared,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn begin(shared: &'a Shared) -> Self {
        shared.publish_status(FeedStatus::Fetching);
        Self {
            shared,
            settled: false,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("feed cycle abandoned before it finished");
            self.shared.publish_status(FeedStatus::connection_failed());
        }
    }
}

async fn run_loop(shared: Arc<Shared>, cancel: CancellationToken) {
    tracing::info!(interval = ?shared.settings.interval(), "poller started");
    loop {
        if cancel.is_cancelled() {
            break;
        }

        // A stop request wins over waiting for a manual cycle to finish.
        let cycle = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            cycle = shared.cycle.lock() => cycle,
        };
        let status = shared.cycle_locked(cycle).await;
        tracing::info!(%status, "poll cycle finished");

        let interval = shared.settings.interval();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    tracing::info!("poller stopped");
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Background service holding the latest quake snapshot.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct Poller {
    shared: Arc<Shared>,
    worker: Mutex<Option<Worker>>,
}

impl Poller {
    pub fn new(source: Arc<dyn FeedSource>, settings: Settings) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                snapshot: Mutex::new(Snapshot::default()),
                settings,
                cycle: tokio::sync::Mutex::new(()),
            }),
            worker: Mutex::new(None),
        }
    }

    fn worker(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn the timed cycle on the current tokio runtime. The first cycle
    /// runs immediately, then one every `interval`.
    ///
    /// Returns `false` (and changes nothing) if the poller is already running.
    pub fn start(&self, interval: Duration) -> bool {
        let mut worker = self.worker();
        if worker.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            return false;
        }

        self.shared.settings.set_interval(interval);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(Arc::clone(&self.shared), cancel.clone()));
        *worker = Some(Worker { cancel, handle });
        true
    }

    /// Stop the timed cycle and wait for its task to finish. A timed fetch
    /// already in flight is allowed to complete first; once this is called
    /// the loop starts no new fetch. No-op when stopped.
    pub async fn stop(&self) {
        let worker = self.worker().take();
        let Some(worker) = worker else {
            return;
        };
        worker.cancel.cancel();
        if let Err(err) = worker.handle.await {
            if err.is_panic() {
                tracing::error!(error = %err, "poller task panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker()
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Run one cycle on the caller's task, outside the timer. Returns the
    /// status it published.
    pub async fn fetch_now(&self) -> FeedStatus {
        self.shared.run_cycle().await
    }

    /// Copy of the committed records.
    pub fn records(&self) -> Vec<Quake> {
        self.shared.state().quakes.clone()
    }

    pub fn status(&self) -> FeedStatus {
        self.shared.state().status.clone()
    }

    /// Records and status copied under one lock acquisition.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.state().clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.shared.settings
    }

    pub fn set_min_magnitude(&self, magnitude: f64) {
        self.shared.settings.set_min_magnitude(magnitude);
    }

    pub fn set_sort_by_magnitude(&self, enable: bool) {
        self.shared.settings.set_sort_by_magnitude(enable);
    }

    /// Takes effect after the current sleep ends.
    pub fn set_interval(&self, interval: Duration) {
        self.shared.settings.set_interval(interval);
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(worker) = self.worker().take() {
            worker.cancel.cancel();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
