use crate::errors::AppError;
use crate::models::{AgeResponse, CountryCandidate, GenderResponse, NationalityResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Infers one attribute of a person from their first name.
#[async_trait]
pub trait Lookup<V>: Send + Sync {
    async fn lookup(&self, name: &str) -> Result<V, AppError>;
}

/// Extracts the wanted scalar from a decoded response body.
pub type Decoder<V> = fn(&str, Value) -> Result<V, AppError>;

/// Client for one name-based inference endpoint.
///
/// The three enrichment services share a request shape (`GET <url>?name=..`)
/// and differ only in the endpoint and in the field they answer with, so one
/// type covers all of them.
#[derive(Clone)]
pub struct EnrichmentClient<V> {
    client: Client,
    endpoint: String,
    service: &'static str,
    decode: Decoder<V>,
}

impl<V> EnrichmentClient<V> {
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client.
    /// * `endpoint` - Full URL of the service; `name` is appended as a query parameter.
    /// * `service` - Label used in logs and errors.
    /// * `decode` - Pulls the value out of the JSON body.
    pub fn new(
        client: Client,
        endpoint: String,
        service: &'static str,
        decode: Decoder<V>,
    ) -> Self {
        Self {
            client,
            endpoint,
            service,
            decode,
        }
    }

    fn failure(&self, reason: impl Into<String>) -> AppError {
        AppError::LookupFailed {
            service: self.service,
            reason: reason.into(),
        }
    }

    async fn fetch(&self, name: &str) -> Result<Value, AppError> {
        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(&self.endpoint, &[("name", name)])
            .map_err(|e| self.failure(format!("invalid endpoint {}: {}", self.endpoint, e)))?;

        tracing::debug!("{} lookup: {}", self.service, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.failure(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(self.failure(format!("returned status {}: {}", status, error_text)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| self.failure(format!("failed to parse response: {}", e)))
    }
}

#[async_trait]
impl<V: Send + Sync + 'static> Lookup<V> for EnrichmentClient<V> {
    #[tracing::instrument(skip(self), fields(op = "enrichment.lookup"))]
    async fn lookup(&self, name: &str) -> Result<V, AppError> {
        let body = self.fetch(name).await?;
        (self.decode)(name, body)
    }
}

/// Age client; a `null` age decodes to 0.
pub fn age_client(client: Client, endpoint: String) -> EnrichmentClient<i32> {
    EnrichmentClient::new(client, endpoint, "age", decode_age)
}

/// Gender client; a `null` gender decodes to an empty string.
pub fn gender_client(client: Client, endpoint: String) -> EnrichmentClient<String> {
    EnrichmentClient::new(client, endpoint, "gender", decode_gender)
}

/// Nationality client; answers with the most probable country code.
pub fn nationality_client(client: Client, endpoint: String) -> EnrichmentClient<String> {
    EnrichmentClient::new(client, endpoint, "nationality", decode_nationality)
}

fn decode_age(_name: &str, body: Value) -> Result<i32, AppError> {
    let response: AgeResponse = serde_json::from_value(body).map_err(|e| AppError::LookupFailed {
        service: "age",
        reason: format!("unexpected response: {}", e),
    })?;
    Ok(response.age.unwrap_or_default())
}

fn decode_gender(_name: &str, body: Value) -> Result<String, AppError> {
    let response: GenderResponse =
        serde_json::from_value(body).map_err(|e| AppError::LookupFailed {
            service: "gender",
            reason: format!("unexpected response: {}", e),
        })?;
    Ok(response.gender.unwrap_or_default())
}

fn decode_nationality(name: &str, body: Value) -> Result<String, AppError> {
    let response: NationalityResponse =
        serde_json::from_value(body).map_err(|e| AppError::LookupFailed {
            service: "nationality",
            reason: format!("unexpected response: {}", e),
        })?;

    most_probable_country(&response.country)
        .map(|c| c.country_id.clone())
        .ok_or_else(|| AppError::NoCandidates(name.to_string()))
}

/// Picks the candidate with the highest probability.
///
/// Ties go to the first maximal candidate in input order; NaN probabilities
/// never win over a number.
pub fn most_probable_country(candidates: &[CountryCandidate]) -> Option<&CountryCandidate> {
    let mut best: Option<&CountryCandidate> = None;
    for candidate in candidates {
        let better = match best {
            None => true,
            Some(current) => {
                candidate.probability > current.probability
                    || (current.probability.is_nan() && !candidate.probability.is_nan())
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}
