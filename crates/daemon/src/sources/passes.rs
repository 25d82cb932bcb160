use intel_core::model::{Observer, PassPrediction};
use intel_core::FetchError;
use serde_json::Value;

use super::{check_envelope, get_json, trim_base, OPEN_NOTIFY_TIMEOUT};

/// Number of upcoming passes requested.
pub const PASS_COUNT: u32 = 5;

/// Upcoming visible passes over the observer, from `iss-pass.json`.
#[derive(Clone)]
pub struct PassClient {
    http: reqwest::Client,
    base_url: String,
    observer: Observer,
}

impl PassClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, observer: Observer) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            observer,
        }
    }

    pub fn url(&self) -> String {
        format!(
            "{}/iss-pass.json?lat={}&lon={}&alt={}&n={}",
            trim_base(&self.base_url),
            self.observer.lat,
            self.observer.lon,
            self.observer.alt,
            PASS_COUNT
        )
    }

    pub async fn fetch(&self) -> Result<Vec<PassPrediction>, FetchError> {
        let body = get_json(&self.http, &self.url(), OPEN_NOTIFY_TIMEOUT, None).await?;
        parse_passes(&body)
    }
}

/// Returns the `response` array verbatim.
pub fn parse_passes(body: &Value) -> Result<Vec<PassPrediction>, FetchError> {
    check_envelope(body)?;
    body.get("response")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| FetchError::Malformed("missing response array".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn passes_records_through_untouched() {
        let body = json!({
            "message": "success",
            "request": {"latitude": 29.4953, "longitude": -95.1547},
            "response": [
                {"duration": 602, "risetime": 1700003000},
                {"duration": 311, "risetime": 1700009000, "extra": [1, 2]}
            ]
        });
        let passes = parse_passes(&body).unwrap();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[1]["extra"], json!([1, 2]));
    }

    #[test]
    fn url_carries_observer_and_count() {
        let client = PassClient::new(
            reqwest::Client::new(),
            "http://api.open-notify.org/",
            Observer {
                lat: 29.5,
                lon: -95.25,
                alt: 15.0,
            },
        );
        assert_eq!(
            client.url(),
            "http://api.open-notify.org/iss-pass.json?lat=29.5&lon=-95.25&alt=15&n=5"
        );
    }
}
