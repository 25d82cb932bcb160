use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use intel_core::model::{Observer, RemoteHost};

use crate::scheduler::ScheduleConfig;

pub const DEFAULT_OPEN_NOTIFY_URL: &str = "http://api.open-notify.org";
pub const DEFAULT_OPENSKY_URL: &str = "https://opensky-network.org";
pub const DEFAULT_WEATHER_URL: &str = "https://rt.ambientweather.net";

/// String that never shows up in logs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(pub String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<unset>")
        } else {
            f.write_str("<redacted>")
        }
    }
}

#[derive(Debug, Clone)]
pub struct StationConfig {
    pub listen: String,
    pub observer: Observer,
    /// Capture node running the NOAA recorder.
    pub sdr: RemoteHost,
    /// E-paper display node.
    pub epaper: RemoteHost,
    pub tracked_craft: String,

    pub open_notify_url: String,
    pub opensky_url: String,
    pub weather_url: String,
    pub weather_api_key: Secret,
    pub weather_app_key: Secret,

    /// Rendered and downloaded PNGs are written here before a push.
    pub artifact_dir: PathBuf,
    pub connect_timeout: Duration,
    pub schedule: ScheduleConfig,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:5000".into(),
            observer: Observer::default(),
            sdr: RemoteHost::new("192.168.1.192", "mem"),
            epaper: RemoteHost::new("192.168.1.220", "epaper"),
            tracked_craft: "ISS".into(),
            open_notify_url: DEFAULT_OPEN_NOTIFY_URL.into(),
            opensky_url: DEFAULT_OPENSKY_URL.into(),
            weather_url: DEFAULT_WEATHER_URL.into(),
            weather_api_key: Secret::default(),
            weather_app_key: Secret::default(),
            artifact_dir: std::env::temp_dir(),
            connect_timeout: Duration::from_secs(3),
            schedule: ScheduleConfig::default(),
        }
    }
}
