use std::time::{SystemTime, UNIX_EPOCH};

/// Returns current unix epoch seconds, with sub-second precision.
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Rounds to one decimal place, the precision the API reports distances in.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
