//! Upstream clients. Each one fetches a single source and parses only the
//! fields the station needs; every failure comes back as a [`FetchError`].

use std::future::Future;
use std::time::Duration;

use intel_core::model::{Aircraft, CrewMember, DeviceReport, OrbitalPosition, PassPrediction};
use intel_core::FetchError;
use intel_remote::RemoteShell;
use serde_json::Value;

pub mod aircraft;
pub mod crew;
pub mod device;
pub mod orbital;
pub mod passes;

pub use aircraft::AircraftClient;
pub use crew::CrewClient;
pub use device::DeviceLogClient;
pub use orbital::OrbitalClient;
pub use passes::PassClient;

/// Timeout for the open-notify endpoints.
pub const OPEN_NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything the poller refreshes, one method per source.
pub trait Feeds: Send + Sync + 'static {
    fn orbital_position(&self) -> impl Future<Output = Result<OrbitalPosition, FetchError>> + Send;
    fn crew_manifest(&self) -> impl Future<Output = Result<Vec<CrewMember>, FetchError>> + Send;
    fn pass_predictions(
        &self,
    ) -> impl Future<Output = Result<Vec<PassPrediction>, FetchError>> + Send;
    fn aircraft(&self) -> impl Future<Output = Result<Vec<Aircraft>, FetchError>> + Send;
    fn device_report(&self) -> impl Future<Output = Result<DeviceReport, FetchError>> + Send;
}

/// The production clients bundled behind [`Feeds`].
pub struct LiveFeeds<R> {
    pub orbital: OrbitalClient,
    pub crew: CrewClient,
    pub passes: PassClient,
    pub aircraft: AircraftClient,
    pub device: DeviceLogClient<R>,
}

impl<R> Feeds for LiveFeeds<R>
where
    R: RemoteShell + 'static,
{
    async fn orbital_position(&self) -> Result<OrbitalPosition, FetchError> {
        self.orbital.fetch().await
    }

    async fn crew_manifest(&self) -> Result<Vec<CrewMember>, FetchError> {
        self.crew.fetch().await
    }

    async fn pass_predictions(&self) -> Result<Vec<PassPrediction>, FetchError> {
        self.passes.fetch().await
    }

    async fn aircraft(&self) -> Result<Vec<Aircraft>, FetchError> {
        self.aircraft.fetch().await
    }

    async fn device_report(&self) -> Result<DeviceReport, FetchError> {
        self.device.fetch().await
    }
}

/// GETs `url` and decodes the body as JSON, mapping every failure to a [`FetchError`].
pub(crate) async fn get_json(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
    user_agent: Option<&str>,
) -> Result<Value, FetchError> {
    let mut req = http.get(url).timeout(timeout);
    if let Some(ua) = user_agent {
        req = req.header(reqwest::header::USER_AGENT, ua);
    }

    let resp = req.send().await.map_err(|e| map_reqwest(e, timeout))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    resp.json::<Value>()
        .await
        .map_err(|e| map_reqwest(e, timeout))
}

fn map_reqwest(e: reqwest::Error, timeout: Duration) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(timeout.as_secs())
    } else if e.is_decode() {
        FetchError::Malformed(e.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}

/// Open-notify wraps every payload in `{"message": "success", ...}`.
pub(crate) fn check_envelope(body: &Value) -> Result<(), FetchError> {
    match body.get("message").and_then(Value::as_str) {
        Some("success") => Ok(()),
        Some(other) => Err(FetchError::Envelope(other.to_string())),
        None => Err(FetchError::Malformed("missing \"message\" field".into())),
    }
}

pub(crate) fn trim_base(url: &str) -> &str {
    url.trim_end_matches('/')
}
