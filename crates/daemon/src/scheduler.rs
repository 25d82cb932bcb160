use std::sync::Arc;
use std::time::Duration;

use intel_core::model::Source;
use intel_core::FetchError;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::sources::Feeds;
use crate::store::StateStore;

/// Pauses and per-source refresh intervals of the poll loop.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Pause after the position and device steps.
    pub step_pause: Duration,
    /// Pause at the end of every pass.
    pub pass_pause: Duration,
    /// Sleep after a pass aborted by a panic.
    pub error_backoff: Duration,
    pub crew_every: Duration,
    pub passes_every: Duration,
    pub aircraft_every: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            step_pause: Duration::from_secs(1),
            pass_pause: Duration::from_secs(3),
            error_backoff: Duration::from_secs(10),
            crew_every: Duration::from_secs(600),
            passes_every: Duration::from_secs(300),
            aircraft_every: Duration::from_secs(15),
        }
    }
}

impl ScheduleConfig {
    /// Same cadences, no sleeping. Used by tests that drive passes by hand.
    pub fn without_pauses() -> Self {
        Self {
            step_pause: Duration::ZERO,
            pass_pause: Duration::ZERO,
            error_backoff: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// A source is due when it has never been refreshed or its last refresh is
/// strictly older than `every`.
pub fn is_due(last: Option<f64>, now: f64, every: Duration) -> bool {
    last.map_or(true, |l| now - l > every.as_secs_f64())
}

/// Cooperative poller: one fetch in flight, sources refreshed in a fixed order.
pub struct Scheduler<F> {
    feeds: Arc<F>,
    store: StateStore,
    config: ScheduleConfig,
}

impl<F: Feeds> Scheduler<F> {
    pub fn new(feeds: Arc<F>, store: StateStore, config: ScheduleConfig) -> Self {
        Self {
            feeds,
            store,
            config,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Runs forever. Each pass is its own task so a panic inside it is
    /// contained, logged, and followed by the back-off.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                crew_every = self.config.crew_every.as_secs(),
                passes_every = self.config.passes_every.as_secs(),
                aircraft_every = self.config.aircraft_every.as_secs(),
                "poller started"
            );
            loop {
                let this = Arc::clone(&self);
                if let Err(e) = tokio::spawn(async move { this.run_pass().await }).await {
                    error!(error = %e, backoff_secs = self.config.error_backoff.as_secs(), "poll pass aborted");
                    sleep(self.config.error_backoff).await;
                }
            }
        })
    }

    /// One full pass: position, device, then whichever slow sources are due.
    pub async fn run_pass(&self) {
        self.refresh_orbital_position().await;
        self.pause(self.config.step_pause).await;

        self.refresh_device().await;
        self.pause(self.config.step_pause).await;

        let now = self.store.clock().now();
        let snap = self.store.get().await;
        if is_due(snap.last_update_of(Source::CrewManifest), now, self.config.crew_every) {
            self.refresh_crew().await;
        }
        if is_due(snap.last_update_of(Source::PassPredictions), now, self.config.passes_every) {
            self.refresh_passes().await;
        }
        if is_due(snap.last_update_of(Source::Aircraft), now, self.config.aircraft_every) {
            self.refresh_aircraft().await;
        }

        self.pause(self.config.pass_pause).await;
    }

    /// Best-effort position and crew fetch before the API starts answering.
    pub async fn warm_up(&self) {
        self.refresh_orbital_position().await;
        self.refresh_crew().await;
    }

    pub async fn refresh_orbital_position(&self) -> bool {
        match self.feeds.orbital_position().await {
            Ok(p) => {
                debug!(source = %Source::OrbitalPosition, lat = p.latitude, lon = p.longitude, "refreshed");
                self.store.set_orbital_position(p).await;
                true
            }
            Err(e) => failed(Source::OrbitalPosition, &e),
        }
    }

    pub async fn refresh_crew(&self) -> bool {
        match self.feeds.crew_manifest().await {
            Ok(crew) => {
                debug!(source = %Source::CrewManifest, count = crew.len(), "refreshed");
                self.store.set_crew_manifest(crew).await;
                true
            }
            Err(e) => failed(Source::CrewManifest, &e),
        }
    }

    pub async fn refresh_passes(&self) -> bool {
        match self.feeds.pass_predictions().await {
            Ok(passes) => {
                debug!(source = %Source::PassPredictions, count = passes.len(), "refreshed");
                self.store.set_pass_predictions(passes).await;
                true
            }
            Err(e) => failed(Source::PassPredictions, &e),
        }
    }

    pub async fn refresh_aircraft(&self) -> bool {
        match self.feeds.aircraft().await {
            Ok(aircraft) => {
                debug!(source = %Source::Aircraft, count = aircraft.len(), "refreshed");
                self.store.set_aircraft(aircraft).await;
                true
            }
            Err(e) => failed(Source::Aircraft, &e),
        }
    }

    /// On failure the node is marked unreachable; its last log tail stays.
    pub async fn refresh_device(&self) -> bool {
        match self.feeds.device_report().await {
            Ok(report) => {
                debug!(source = %Source::DeviceStatus, status = %report.status, running = report.running, "refreshed");
                self.store
                    .set_device_status(report.status, report.log_lines)
                    .await;
                true
            }
            Err(e) => {
                self.store.mark_device_unreachable().await;
                failed(Source::DeviceStatus, &e)
            }
        }
    }

    async fn pause(&self, d: Duration) {
        if !d.is_zero() {
            sleep(d).await;
        }
    }
}

fn failed(source: Source, e: &FetchError) -> bool {
    warn!(source = %source, error = %e, "refresh failed; keeping previous value");
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_refreshed_is_due() {
        assert!(is_due(None, 0.0, Duration::from_secs(600)));
    }

    #[test]
    fn due_only_strictly_after_the_interval() {
        let every = Duration::from_secs(600);
        assert!(!is_due(Some(0.0), 599.0, every));
        assert!(!is_due(Some(0.0), 600.0, every));
        assert!(is_due(Some(0.0), 601.0, every));
    }
}
