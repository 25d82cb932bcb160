use std::collections::HashSet;
use std::time::Duration;

use intel_core::geo::{BoundingBox, AIRCRAFT_BOX_DEGREES};
use intel_core::model::{Aircraft, Observer, MAX_AIRCRAFT};
use intel_core::FetchError;
use serde_json::Value;

use super::{get_json, trim_base};

pub const AIRCRAFT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "NeighborhoodIntelStation/1.0";

const METERS_TO_FEET: f64 = 3.281;
const MPS_TO_KNOTS: f64 = 1.944;

/// State-vector column indices of the OpenSky `states/all` rows.
mod col {
    pub const ICAO24: usize = 0;
    pub const CALLSIGN: usize = 1;
    pub const COUNTRY: usize = 2;
    pub const LON: usize = 5;
    pub const LAT: usize = 6;
    pub const BARO_ALT: usize = 7;
    pub const ON_GROUND: usize = 8;
    pub const VELOCITY: usize = 9;
    pub const HEADING: usize = 10;
    pub const VERTICAL_RATE: usize = 11;
    pub const GEO_ALT: usize = 13;
    pub const SQUAWK: usize = 14;
}

/// Aircraft inside a box of ±1.5° around the observer.
#[derive(Clone)]
pub struct AircraftClient {
    http: reqwest::Client,
    base_url: String,
    bbox: BoundingBox,
}

impl AircraftClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, observer: &Observer) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            bbox: BoundingBox::around(observer.lat, observer.lon, AIRCRAFT_BOX_DEGREES),
        }
    }

    pub fn url(&self) -> String {
        let b = &self.bbox;
        format!(
            "{}/api/states/all?lamin={}&lomin={}&lamax={}&lomax={}",
            trim_base(&self.base_url),
            b.lamin,
            b.lomin,
            b.lamax,
            b.lomax
        )
    }

    pub async fn fetch(&self) -> Result<Vec<Aircraft>, FetchError> {
        let body = get_json(&self.http, &self.url(), AIRCRAFT_TIMEOUT, Some(USER_AGENT)).await?;
        parse_states(&body)
    }
}

/// Converts the `states` array-of-arrays into typed records.
///
/// Rows without both coordinates are dropped, as are repeated ICAO24 codes
/// (rows with no code are all kept); the result keeps upstream order and is
/// cut at [`MAX_AIRCRAFT`].
/// A `null` or absent `states` means an empty sky.
pub fn parse_states(body: &Value) -> Result<Vec<Aircraft>, FetchError> {
    let rows = match body.get("states") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(rows)) => rows,
        Some(other) => {
            return Err(FetchError::Malformed(format!(
                "states is not an array: {other}"
            )))
        }
    };

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(rows.len().min(MAX_AIRCRAFT));
    for row in rows {
        let Some(row) = row.as_array() else {
            return Err(FetchError::Malformed("state vector is not an array".into()));
        };
        let Some(aircraft) = parse_row(row) else {
            continue;
        };
        if !aircraft.icao24.is_empty() && !seen.insert(aircraft.icao24.clone()) {
            continue;
        }
        out.push(aircraft);
        if out.len() == MAX_AIRCRAFT {
            break;
        }
    }
    Ok(out)
}

fn parse_row(row: &[Value]) -> Option<Aircraft> {
    let num = |i: usize| row.get(i).and_then(Value::as_f64);
    let text = |i: usize| row.get(i).and_then(Value::as_str);

    let lon = num(col::LON)?;
    let lat = num(col::LAT)?;

    // Barometric altitude first; geometric when it is missing or zero.
    let alt_m = num(col::BARO_ALT)
        .filter(|a| *a != 0.0)
        .or_else(|| num(col::GEO_ALT))
        .unwrap_or(0.0);
    let velocity = num(col::VELOCITY).unwrap_or(0.0);

    Some(Aircraft {
        icao24: text(col::ICAO24).unwrap_or_default().to_string(),
        callsign: text(col::CALLSIGN).unwrap_or_default().trim().to_string(),
        country: text(col::COUNTRY).map(str::to_string),
        lat,
        lon,
        alt_m,
        alt_ft: (alt_m * METERS_TO_FEET) as i64,
        velocity_kt: (velocity * MPS_TO_KNOTS) as i64,
        heading: num(col::HEADING).unwrap_or(0.0),
        vertical_rate: num(col::VERTICAL_RATE).unwrap_or(0.0),
        on_ground: row.get(col::ON_GROUND).and_then(Value::as_bool),
        squawk: text(col::SQUAWK).map(str::to_string),
    })
}
