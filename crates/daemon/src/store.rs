use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use intel_core::model::{
    Aircraft, CrewMember, DeviceStatus, OrbitalPosition, PassPrediction, Snapshot, Source,
    DEVICE_LOG_LINES,
};
use tokio::sync::RwLock;

/// Time source for refresh stamps and cadence checks.
pub trait Clock: Send + Sync {
    /// Unix seconds.
    fn now(&self) -> f64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        intel_core::now_secs()
    }
}

/// Manually driven clock for tests and replay.
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    pub fn at(secs: f64) -> Self {
        Self {
            bits: AtomicU64::new(secs.to_bits()),
        }
    }

    pub fn set(&self, secs: f64) {
        self.bits.store(secs.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, secs: f64) {
        self.set(self.now() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

/// Shared handle to the latest value from every source.
///
/// Every setter replaces one field group and stamps its `last_update` entry
/// under a single write lock, so readers never observe a half-applied group.
/// A failed fetch must simply not call the setter.
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<RwLock<Snapshot>>,
    clock: Arc<dyn Clock>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl StateStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Snapshot::default())),
            clock,
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Consistent copy of the current snapshot.
    pub async fn get(&self) -> Snapshot {
        self.inner.read().await.clone()
    }

    pub async fn last_update(&self, source: Source) -> Option<f64> {
        self.inner.read().await.last_update_of(source)
    }

    pub async fn set_orbital_position(&self, position: OrbitalPosition) {
        let mut snap = self.inner.write().await;
        snap.orbital_position = position;
        self.stamp(&mut snap, Source::OrbitalPosition);
    }

    pub async fn set_crew_manifest(&self, crew: Vec<CrewMember>) {
        let mut snap = self.inner.write().await;
        snap.crew_manifest = crew;
        self.stamp(&mut snap, Source::CrewManifest);
    }

    pub async fn set_pass_predictions(&self, passes: Vec<PassPrediction>) {
        let mut snap = self.inner.write().await;
        snap.pass_predictions = passes;
        self.stamp(&mut snap, Source::PassPredictions);
    }

    /// Replaces the aircraft list wholesale.
    pub async fn set_aircraft(&self, aircraft: Vec<Aircraft>) {
        let mut snap = self.inner.write().await;
        snap.aircraft = aircraft;
        self.stamp(&mut snap, Source::Aircraft);
    }

    /// Stores the status and the newest [`DEVICE_LOG_LINES`] of `log_tail`.
    pub async fn set_device_status(&self, status: DeviceStatus, mut log_tail: Vec<String>) {
        if log_tail.len() > DEVICE_LOG_LINES {
            log_tail.drain(..log_tail.len() - DEVICE_LOG_LINES);
        }
        let mut snap = self.inner.write().await;
        snap.device_status = status;
        snap.device_log = log_tail;
        self.stamp(&mut snap, Source::DeviceStatus);
    }

    /// Records that the capture node could not be reached.
    ///
    /// The previous log tail and refresh stamp are kept.
    pub async fn mark_device_unreachable(&self) {
        self.inner.write().await.device_status = DeviceStatus::Unreachable;
    }

    fn stamp(&self, snap: &mut Snapshot, source: Source) {
        snap.last_update
            .insert(source.key().to_string(), self.clock.now());
    }
}
