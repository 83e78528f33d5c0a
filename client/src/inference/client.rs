use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use shared::{ErrorKind, InferenceOutcome, Prediction};
use url::Url;

use crate::config::Config;

const BODY_SNIPPET_CHARS: usize = 200;

/// One POST per call, no retries, no caching.
#[derive(Clone)]
pub struct InferenceService {
    http: HttpClient,
    url: Url,
    timeout: Duration,
}

impl InferenceService {
    pub fn new(config: &Config) -> Self {
        Self {
            http: HttpClient::new(),
            url: config.predictions_url(),
            timeout: config.request_timeout,
        }
    }

    pub fn infer(&self, image_bytes: &[u8]) -> InferenceOutcome {
        let response = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .timeout(self.timeout)
            .body(image_bytes.to_vec())
            .send();

        let response = match response {
            Ok(response) => response,
            Err(e) => return self.classify_transport_error(e),
        };

        let status = response.status();
        let body = match response.text() {
            Ok(body) => body,
            // Reading the body can still hit the request deadline.
            Err(e) => return self.classify_transport_error(e),
        };

        if status == StatusCode::OK {
            parse_predictions(&body)
        } else {
            InferenceOutcome::Failure {
                kind: ErrorKind::ServerError,
                message: server_error_message(status, &body),
            }
        }
    }

    fn classify_transport_error(&self, error: reqwest::Error) -> InferenceOutcome {
        let (kind, message) = if error.is_timeout() {
            (
                ErrorKind::Timeout,
                format!("Request timed out after {:?}.", self.timeout),
            )
        } else if error.is_connect() {
            (
                ErrorKind::ConnectionError,
                format!(
                    "Cannot connect to the inference server at {}. \
                     Please ensure the server is running and reachable.",
                    self.url
                ),
            )
        } else {
            (
                ErrorKind::UnexpectedError,
                format!("Unexpected error: {}", error),
            )
        };
        log::warn!("Inference request failed ({}): {}", kind, message);
        InferenceOutcome::Failure { kind, message }
    }
}

// serde_json's preserve_order feature keeps the map in document
// order, which is the server's authoritative ranking.
fn parse_predictions(body: &str) -> InferenceOutcome {
    let entries: serde_json::Map<String, Value> = match serde_json::from_str(body) {
        Ok(entries) => entries,
        Err(e) => {
            return InferenceOutcome::Failure {
                kind: ErrorKind::ParseError,
                message: format!("Malformed prediction response: {}", e),
            };
        }
    };

    let mut predictions = Vec::with_capacity(entries.len());
    for (label, value) in entries {
        match value.as_f64() {
            Some(confidence) => predictions.push(Prediction::new(label, confidence)),
            None => {
                return InferenceOutcome::Failure {
                    kind: ErrorKind::ParseError,
                    message: format!("Non-numeric confidence for label {:?}", label),
                };
            }
        }
    }

    InferenceOutcome::Success { predictions }
}

fn server_error_message(status: StatusCode, body: &str) -> String {
    let mut message = format!("Server returned status {}", status.as_u16());

    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string));

    match detail {
        Some(detail) => {
            message.push_str(": ");
            message.push_str(&detail);
        }
        None if !body.is_empty() => {
            message.push_str(": ");
            message.extend(body.chars().take(BODY_SNIPPET_CHARS));
        }
        None => {}
    }

    message
}
