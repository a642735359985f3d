use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Counters for the live-inspection pipeline
#[derive(Clone)]
pub struct Metrics {
    pub pushes_received: Arc<AtomicU64>,
    pub pushes_queued: Arc<AtomicU64>,
    pub pushes_dropped: Arc<AtomicU64>,
    pub sessions_opened: Arc<AtomicU64>,
    pub sessions_closed: Arc<AtomicU64>,
    pub results_delivered: Arc<AtomicU64>,
    pub lookup_misses: Arc<AtomicU64>,
    pub lookup_failures: Arc<AtomicU64>,
    pub payloads_lagged: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            pushes_received: Arc::new(AtomicU64::new(0)),
            pushes_queued: Arc::new(AtomicU64::new(0)),
            pushes_dropped: Arc::new(AtomicU64::new(0)),
            sessions_opened: Arc::new(AtomicU64::new(0)),
            sessions_closed: Arc::new(AtomicU64::new(0)),
            results_delivered: Arc::new(AtomicU64::new(0)),
            lookup_misses: Arc::new(AtomicU64::new(0)),
            lookup_failures: Arc::new(AtomicU64::new(0)),
            payloads_lagged: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_pushes_received(&self) {
        self.pushes_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_pushes_queued(&self) {
        self.pushes_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_pushes_dropped(&self) {
        self.pushes_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_sessions_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_sessions_closed(&self) {
        self.sessions_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_results_delivered(&self) {
        self.results_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_lookup_misses(&self) {
        self.lookup_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_lookup_failures(&self) {
        self.lookup_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_lagged(&self, count: u64) {
        self.payloads_lagged.fetch_add(count, Ordering::Relaxed);
    }

    /// `active_cameras` and `active_subscribers` come from the hub, not from counters.
    pub fn get_snapshot(&self, active_cameras: usize, active_subscribers: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            pushes_received: self.pushes_received.load(Ordering::Relaxed),
            pushes_queued: self.pushes_queued.load(Ordering::Relaxed),
            pushes_dropped: self.pushes_dropped.load(Ordering::Relaxed),
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
            sessions_closed: self.sessions_closed.load(Ordering::Relaxed),
            results_delivered: self.results_delivered.load(Ordering::Relaxed),
            lookup_misses: self.lookup_misses.load(Ordering::Relaxed),
            lookup_failures: self.lookup_failures.load(Ordering::Relaxed),
            payloads_lagged: self.payloads_lagged.load(Ordering::Relaxed),
            active_cameras,
            active_subscribers,
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub pushes_received: u64,
    pub pushes_queued: u64,
    pub pushes_dropped: u64,
    pub sessions_opened: u64,
    pub sessions_closed: u64,
    pub results_delivered: u64,
    pub lookup_misses: u64,
    pub lookup_failures: u64,
    pub payloads_lagged: u64,
    pub active_cameras: usize,
    pub active_subscribers: usize,
    pub uptime_seconds: u64,
}
