use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::reading::{SensorReading, TimestampField, WireReading};

const READINGS_ENDPOINT: &str = "/lectura_sensor/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("authentication token not found, please sign in again")]
    MissingToken,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("session expired, please sign in again")]
    Unauthorized,

    #[error("{0}")]
    Server(String),

    #[error("unexpected response from server")]
    MalformedBody,
}

/// Seam between the viewer and the wire. The real implementation is
/// [`ReadingsClient`]; tests substitute scripted fetchers.
pub trait FetchReadings: Send + Sync {
    fn fetch_batch(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<SensorReading>, FetchError>> + Send;
}

pub struct ReadingsClient {
    http: reqwest::Client,
    base_url: String,
    timestamp_field: TimestampField,
}

impl ReadingsClient {
    pub fn new(
        base_url: impl Into<String>,
        timestamp_field: TimestampField,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            timestamp_field,
        })
    }
}

impl FetchReadings for ReadingsClient {
    async fn fetch_batch(&self, token: &str) -> Result<Vec<SensorReading>, FetchError> {
        let url = format!("{}{}", self.base_url, READINGS_ENDPOINT);

        let response = self.http.get(&url).bearer_auth(token).send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized);
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(FetchError::Server(format!("server returned {status}")));
            }
            Err(_) => return Err(FetchError::MalformedBody),
        };

        if !status.is_success() {
            return Err(match server_message(&body) {
                Some(message) => FetchError::Server(message),
                None => FetchError::Server(format!("server returned {status}")),
            });
        }

        decode_batch(body, self.timestamp_field)
    }
}

/// Turns a 200 response body into a batch. Anything that is not an
/// array is an error: the backend's own message if it sent one,
/// otherwise a generic one.
pub fn decode_batch(
    body: Value,
    timestamp_field: TimestampField,
) -> Result<Vec<SensorReading>, FetchError> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .map(|item| {
                serde_json::from_value::<WireReading>(item)
                    .map(|wire| wire.into_reading(timestamp_field))
                    .map_err(|_| FetchError::MalformedBody)
            })
            .collect(),
        other => match server_message(&other) {
            Some(message) => Err(FetchError::Server(message)),
            None => Err(FetchError::MalformedBody),
        },
    }
}

fn server_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("detail"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
