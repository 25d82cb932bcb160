//! Snapshot and source models shared by the daemon and its API.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of aircraft kept from one refresh.
pub const MAX_AIRCRAFT: usize = 50;

/// Number of capture-log lines retained in the snapshot.
pub const DEVICE_LOG_LINES: usize = 10;

/// Upstream data providers tracked in `Snapshot::last_update`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Orbital ground-point position.
    #[serde(rename = "iss_position")]
    OrbitalPosition,
    /// Crew aboard the tracked craft.
    #[serde(rename = "iss_crew")]
    CrewManifest,
    /// Upcoming visible passes over the observer.
    #[serde(rename = "iss_passes")]
    PassPredictions,
    /// ADS-B state vectors around the observer.
    Aircraft,
    /// Capture node status log.
    #[serde(rename = "sdr")]
    DeviceStatus,
}

impl Source {
    /// Key used in `last_update` maps and log fields.
    pub fn key(self) -> &'static str {
        match self {
            Source::OrbitalPosition => "iss_position",
            Source::CrewManifest => "iss_crew",
            Source::PassPredictions => "iss_passes",
            Source::Aircraft => "aircraft",
            Source::DeviceStatus => "sdr",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ground point of the tracked orbital object.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct OrbitalPosition {
    /// Degrees, [-90, 90].
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Degrees, [-180, 180].
    #[serde(rename = "lon")]
    pub longitude: f64,
    /// Unix seconds reported by the upstream.
    pub timestamp: i64,
}

impl OrbitalPosition {
    /// True when both coordinates are within their valid ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One person aboard a crewed craft.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrewMember {
    /// Full name as reported upstream.
    pub name: String,
    /// Craft identifier, e.g. `ISS`.
    pub craft: String,
}

/// Upcoming pass record. Passed through verbatim.
pub type PassPrediction = serde_json::Value;

/// One tracked aircraft, with unit conversions already applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Aircraft {
    /// Transponder hex address, empty when upstream sent none.
    pub icao24: String,
    /// Trimmed callsign, possibly empty.
    pub callsign: String,
    /// Country of registration.
    pub country: Option<String>,
    /// Degrees.
    pub lat: f64,
    /// Degrees.
    pub lon: f64,
    /// Barometric altitude (geometric when absent), meters.
    pub alt_m: f64,
    /// `alt_m` in feet.
    pub alt_ft: i64,
    /// Ground speed, knots.
    pub velocity_kt: i64,
    /// True track, degrees.
    pub heading: f64,
    /// Meters per second, positive when climbing.
    pub vertical_rate: f64,
    /// Surface position report.
    pub on_ground: Option<bool>,
    /// Transponder code.
    pub squawk: Option<String>,
}

/// Capture node state derived from its log tail and process count.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    /// Never refreshed.
    #[default]
    Unknown,
    /// Reachable, capture process not running.
    Offline,
    /// Remote command failed.
    Unreachable,
    /// Waiting for the next pass.
    Armed,
    /// Recording a pass.
    Recording,
    /// Idle between passes.
    Sleeping,
    /// Process running, log gave no hint.
    Running,
}

impl DeviceStatus {
    /// Classifies the node from its log tail and the number of running capture processes.
    ///
    /// A zero process count always means offline, whatever the log says.
    pub fn classify(log_lines: &[String], running: u32) -> Self {
        if running == 0 {
            return DeviceStatus::Offline;
        }
        let last = log_lines.last().map(String::as_str).unwrap_or("");
        if last.contains("Recording") {
            DeviceStatus::Recording
        } else if last.contains("Sleeping") {
            DeviceStatus::Sleeping
        } else if last.contains("Starting capture") || last.contains("Waiting") {
            DeviceStatus::Armed
        } else {
            DeviceStatus::Running
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceStatus::Unknown => "unknown",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Unreachable => "unreachable",
            DeviceStatus::Armed => "armed",
            DeviceStatus::Recording => "recording",
            DeviceStatus::Sleeping => "sleeping",
            DeviceStatus::Running => "running",
        };
        f.write_str(s)
    }
}

/// Parsed result of one capture-node status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceReport {
    /// Classified state.
    pub status: DeviceStatus,
    /// Log tail, newest last.
    pub log_lines: Vec<String>,
    /// Number of capture processes found.
    pub running: u32,
}

/// Full aggregate of the latest successful value from every source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// Latest ground point.
    pub orbital_position: OrbitalPosition,
    /// Crew aboard the tracked craft.
    pub crew_manifest: Vec<CrewMember>,
    /// Upcoming passes, as received.
    pub pass_predictions: Vec<PassPrediction>,
    /// Positioned aircraft near the observer, at most [`MAX_AIRCRAFT`].
    pub aircraft: Vec<Aircraft>,
    /// Capture node state.
    pub device_status: DeviceStatus,
    /// Newest last, at most [`DEVICE_LOG_LINES`].
    pub device_log: Vec<String>,
    /// Source key -> unix seconds of its last successful refresh.
    pub last_update: BTreeMap<String, f64>,
}

impl Snapshot {
    /// Last successful refresh of `source`, if any.
    pub fn last_update_of(&self, source: Source) -> Option<f64> {
        self.last_update.get(source.key()).copied()
    }
}

/// Fixed location the station observes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Observer {
    /// Degrees north.
    pub lat: f64,
    /// Degrees east.
    pub lon: f64,
    /// Meters above sea level.
    pub alt: f64,
}

impl Default for Observer {
    fn default() -> Self {
        Self {
            lat: 29.4953,
            lon: -95.1547,
            alt: 15.0,
        }
    }
}

/// A remote machine reachable over ssh/scp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RemoteHost {
    /// Hostname or address.
    pub host: String,
    /// Login user.
    pub user: String,
}

impl RemoteHost {
    /// Convenience constructor.
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
        }
    }
}

impl fmt::Display for RemoteHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.host)
    }
}

/// Phase of a push that failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PushStage {
    /// Copying the artifact to the display node.
    Transfer,
    /// Running the display script on the display node.
    RemoteTrigger,
}

/// Outcome of one push request. Never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushResult {
    /// True once the artifact was displayed.
    pub success: bool,
    /// Failed phase. Absent on success, or when the push never reached the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<PushStage>,
    /// Human-readable outcome.
    pub message: String,
}

impl PushResult {
    /// Artifact delivered and displayed.
    pub fn pushed() -> Self {
        Self {
            success: true,
            stage: None,
            message: "pushed".into(),
        }
    }

    /// Failed in `stage`.
    pub fn failed_at(stage: PushStage, message: impl Into<String>) -> Self {
        Self {
            success: false,
            stage: Some(stage),
            message: message.into(),
        }
    }

    /// Failed before anything was sent to the display node.
    pub fn not_attempted(message: impl Into<String>) -> Self {
        Self {
            success: false,
            stage: None,
            message: message.into(),
        }
    }
}

/// Latest reading of the personal weather station. All fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeatherReading {
    /// Outdoor temperature, °F.
    #[serde(default)]
    pub tempf: Option<f64>,
    /// Apparent temperature, °F.
    #[serde(default, rename = "feelsLike")]
    pub feels_like: Option<f64>,
    /// Outdoor relative humidity, percent.
    #[serde(default)]
    pub humidity: Option<f64>,
    /// Indoor relative humidity, percent.
    #[serde(default)]
    pub humidityin: Option<f64>,
    /// Indoor temperature, °F.
    #[serde(default)]
    pub tempinf: Option<f64>,
    /// Dew point, °F.
    #[serde(default, rename = "dewPoint")]
    pub dew_point: Option<f64>,
    /// Sustained wind, mph.
    #[serde(default)]
    pub windspeedmph: Option<f64>,
    /// Gust, mph.
    #[serde(default)]
    pub windgustmph: Option<f64>,
    /// Wind direction, degrees.
    #[serde(default)]
    pub winddir: Option<f64>,
    /// Relative pressure, inHg.
    #[serde(default)]
    pub baromrelin: Option<f64>,
    /// Absolute pressure, inHg.
    #[serde(default)]
    pub baromabsin: Option<f64>,
    /// Rain since midnight, inches.
    #[serde(default)]
    pub dailyrainin: Option<f64>,
    /// Rain rate, inches per hour.
    #[serde(default)]
    pub hourlyrainin: Option<f64>,
    /// UV index.
    #[serde(default)]
    pub uv: Option<f64>,
    /// Solar radiation, W/m².
    #[serde(default)]
    pub solarradiation: Option<f64>,
    /// ISO-8601 observation time.
    #[serde(default)]
    pub date: Option<String>,
}

impl WeatherReading {
    /// 16-point compass label for the wind direction.
    pub fn wind_compass(&self) -> Option<&'static str> {
        const POINTS: [&str; 16] = [
            "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
            "NW", "NNW",
        ];
        let dir = self.winddir?;
        let idx = ((dir + 11.25) / 22.5).floor() as i64;
        Some(POINTS[idx.rem_euclid(16) as usize])
    }
}
