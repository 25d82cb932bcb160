use std::time::Duration;

use intel_core::model::OrbitalPosition;
use intel_core::FetchError;
use serde_json::Value;

use super::{check_envelope, get_json, trim_base, OPEN_NOTIFY_TIMEOUT};

/// Current ground point from `iss-now.json`.
#[derive(Clone)]
pub struct OrbitalClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl OrbitalClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            timeout: OPEN_NOTIFY_TIMEOUT,
        }
    }

    /// Overrides the per-request timeout (defaults to [`OPEN_NOTIFY_TIMEOUT`]).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn fetch(&self) -> Result<OrbitalPosition, FetchError> {
        let url = format!("{}/iss-now.json", trim_base(&self.base_url));
        let body = get_json(&self.http, &url, self.timeout, None).await?;
        parse_position(&body)
    }
}

/// Parses `{"message": "success", "timestamp": .., "iss_position": {"latitude": .., "longitude": ..}}`.
///
/// Coordinates arrive as strings from the live service; plain numbers are accepted too.
pub fn parse_position(body: &Value) -> Result<OrbitalPosition, FetchError> {
    check_envelope(body)?;
    let pos = body
        .get("iss_position")
        .ok_or_else(|| FetchError::Malformed("missing iss_position".into()))?;

    let position = OrbitalPosition {
        latitude: coordinate(pos, "latitude")?,
        longitude: coordinate(pos, "longitude")?,
        timestamp: body
            .get("timestamp")
            .and_then(Value::as_i64)
            .ok_or_else(|| FetchError::Malformed("missing timestamp".into()))?,
    };
    if !position.is_valid() {
        return Err(FetchError::Malformed(format!(
            "coordinates out of range: {}, {}",
            position.latitude, position.longitude
        )));
    }
    Ok(position)
}

fn coordinate(pos: &Value, field: &str) -> Result<f64, FetchError> {
    let v = pos
        .get(field)
        .ok_or_else(|| FetchError::Malformed(format!("missing {field}")))?;
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| FetchError::Malformed(format!("{field} is not a number: {v}")))
}
