//! Response bodies of the HTTP API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Aircraft, CrewMember, DeviceStatus, OrbitalPosition, PassPrediction};

/// `GET /api/status` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Capture node state.
    pub sdr_status: DeviceStatus,
    /// Capture log tail, newest last.
    pub sdr_log: Vec<String>,
    /// Latest ground point.
    pub iss: OrbitalPosition,
    /// Crew aboard the tracked craft.
    pub iss_crew: Vec<CrewMember>,
    /// Upcoming passes.
    pub iss_passes: Vec<PassPrediction>,
    /// Observer to ground point, kilometres, one decimal.
    pub distance_km: f64,
    /// Aircraft near the observer.
    pub aircraft: Vec<Aircraft>,
    /// Length of `aircraft`.
    pub aircraft_count: usize,
    /// Source key -> unix seconds of its last successful refresh.
    pub last_update: BTreeMap<String, f64>,
    /// Server time, unix seconds.
    pub timestamp: f64,
}

/// `GET /api/iss` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssResponse {
    /// Latest ground point.
    pub position: OrbitalPosition,
    /// Crew aboard the tracked craft.
    pub crew: Vec<CrewMember>,
    /// Upcoming passes.
    pub passes: Vec<PassPrediction>,
    /// Observer to ground point, kilometres, one decimal.
    pub distance_km: f64,
}

/// `GET /api/aircraft` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftResponse {
    /// Aircraft near the observer.
    pub aircraft: Vec<Aircraft>,
    /// Length of `aircraft`.
    pub count: usize,
    /// Zero when never refreshed.
    pub last_update: f64,
}

/// `GET /api/sdr` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdrResponse {
    /// Capture node state.
    pub status: DeviceStatus,
    /// Capture log tail, newest last.
    pub log: Vec<String>,
    /// Zero when never refreshed.
    pub last_update: f64,
}

/// Body of non-200 responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short description, e.g. `not found`.
    pub error: String,
}
