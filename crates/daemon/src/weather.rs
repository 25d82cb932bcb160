use std::time::Duration;

use intel_core::model::WeatherReading;
use intel_core::FetchError;
use serde_json::Value;

use crate::sources::{get_json, trim_base};

pub const WEATHER_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "NIS/1.0";

/// Personal weather station readings from the Ambient Weather REST API.
/// Fetched on demand for pushes, never polled.
#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    app_key: String,
}

impl WeatherClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        app_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            app_key: app_key.into(),
        }
    }

    pub fn url(&self) -> String {
        format!(
            "{}/v1/devices?apiKey={}&applicationKey={}",
            trim_base(&self.base_url),
            self.api_key,
            self.app_key
        )
    }

    pub async fn fetch(&self) -> Result<WeatherReading, FetchError> {
        let body = get_json(&self.http, &self.url(), WEATHER_TIMEOUT, Some(USER_AGENT)).await?;
        parse_devices(&body)
    }
}

/// `lastData` of the first device in the list.
pub fn parse_devices(body: &Value) -> Result<WeatherReading, FetchError> {
    let devices = body
        .as_array()
        .ok_or_else(|| FetchError::Malformed("device list is not an array".into()))?;
    let last = devices
        .first()
        .ok_or_else(|| FetchError::Malformed("no weather devices".into()))?
        .get("lastData")
        .cloned()
        .ok_or_else(|| FetchError::Malformed("device has no lastData".into()))?;
    serde_json::from_value(last).map_err(|e| FetchError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn takes_first_device_last_data() {
        let body = json!([
            {"macAddress": "00:0E:C6:20:0F:7B", "lastData": {
                "tempf": 82.4, "humidity": 71, "feelsLike": 88.1, "uv": 6,
                "winddir": 200, "date": "2026-07-01T18:05:00.000Z"
            }},
            {"macAddress": "other", "lastData": {"tempf": 10.0}}
        ]);
        let w = parse_devices(&body).unwrap();
        assert_eq!(w.tempf, Some(82.4));
        assert_eq!(w.feels_like, Some(88.1));
        assert_eq!(w.humidity, Some(71.0));
        assert_eq!(w.uv, Some(6.0));
        assert_eq!(w.baromrelin, None);
        assert_eq!(w.wind_compass(), Some("SSW"));
    }

    #[test]
    fn empty_device_list_is_an_error() {
        assert!(matches!(parse_devices(&json!([])), Err(FetchError::Malformed(_))));
        assert!(matches!(
            parse_devices(&json!([{"macAddress": "x"}])),
            Err(FetchError::Malformed(_))
        ));
        assert!(matches!(
            parse_devices(&json!({"error": "apiKey invalid"})),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn url_carries_both_keys() {
        let c = WeatherClient::new(reqwest::Client::new(), "https://rt.ambientweather.net/", "a1", "b2");
        assert_eq!(
            c.url(),
            "https://rt.ambientweather.net/v1/devices?apiKey=a1&applicationKey=b2"
        );
    }
}
