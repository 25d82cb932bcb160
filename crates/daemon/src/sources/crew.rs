use intel_core::model::CrewMember;
use intel_core::FetchError;
use serde_json::Value;

use super::{check_envelope, get_json, trim_base, OPEN_NOTIFY_TIMEOUT};

/// People currently aboard the tracked craft, from `astros.json`.
#[derive(Clone)]
pub struct CrewClient {
    http: reqwest::Client,
    base_url: String,
    craft: String,
}

impl CrewClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, craft: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            craft: craft.into(),
        }
    }

    pub async fn fetch(&self) -> Result<Vec<CrewMember>, FetchError> {
        let url = format!("{}/astros.json", trim_base(&self.base_url));
        let body = get_json(&self.http, &url, OPEN_NOTIFY_TIMEOUT, None).await?;
        parse_crew(&body, &self.craft)
    }
}

/// Keeps entries aboard `craft`, in upstream order. Zero crew is a valid answer.
pub fn parse_crew(body: &Value, craft: &str) -> Result<Vec<CrewMember>, FetchError> {
    check_envelope(body)?;
    let people = body
        .get("people")
        .cloned()
        .ok_or_else(|| FetchError::Malformed("missing people".into()))?;
    let people: Vec<CrewMember> =
        serde_json::from_value(people).map_err(|e| FetchError::Malformed(e.to_string()))?;
    Ok(people.into_iter().filter(|p| p.craft == craft).collect())
}
