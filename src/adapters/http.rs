use crate::domain::model::Executive;
use crate::utils::error::{LeadError, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Client for the executive lookup API (`GET {endpoint}?company_name={domain}`).
#[derive(Debug, Clone)]
pub struct ExecutiveClient {
    client: Client,
    endpoint: Url,
}

impl ExecutiveClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| LeadError::InvalidConfigValueError {
            field: "endpoint".to_string(),
            value: endpoint.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn request_url(&self, domain: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("company_name", domain);
        url
    }

    pub async fn fetch_executives(&self, domain: &str) -> Result<Vec<Executive>> {
        if domain.trim().is_empty() {
            return Err(LeadError::ProcessingError {
                message: "The domain must be a non-empty string".to_string(),
            });
        }

        let url = self.request_url(domain);
        tracing::debug!("Making API request to: {}", url);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body: serde_json::Value = response.json().await?;
        Ok(parse_executives(body))
    }
}

/// Anything other than a JSON array yields no executives; non-object items are skipped.
pub fn parse_executives(body: serde_json::Value) -> Vec<Executive> {
    let serde_json::Value::Array(items) = body else {
        tracing::warn!("Executive API returned a non-array body, ignoring it");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| item.as_object())
        .map(|obj| Executive {
            name: text_field(obj, "name", "Unknown"),
            title: text_field(obj, "title", "Unknown"),
            linkedin: text_field(obj, "linkedin", "N/A"),
            source: text_field(obj, "source", "N/A"),
        })
        .collect()
}

fn text_field(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    default: &str,
) -> String {
    match obj.get(key) {
        None => default.to_string(),
        Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
