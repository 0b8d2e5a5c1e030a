//! HTTP client for the admin API.
//!
//! Thin wrapper over `reqwest` that joins resource paths onto the configured
//! base, forwards the API key, decodes the per-resource response envelopes
//! and extracts server error messages. Every operation issues exactly one
//! request; retrying is the operator's decision, not the client's.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart;
use serde_json::Value;

use crate::config::Config;
use crate::errors::SyncError;
use crate::models::Record;
use crate::resource::ResourceConfig;
use crate::submit::{Part, Payload, SubmitPlan};

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Configured HTTP client, shared by all screens. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_base: String,
}

impl ApiClient {
    /// Build a client from configuration. The API key, when present, is
    /// attached to every request as a default header.
    pub fn new(config: &Config) -> Result<Self, SyncError> {
        let mut builder = reqwest::Client::builder();

        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| SyncError::BadRequest("API key is not a valid header".to_string()))?;
            let mut headers = HeaderMap::new();
            headers.insert(API_KEY_HEADER, value);
            builder = builder.default_headers(headers);
        }

        Ok(Self {
            http: builder.build()?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// Fetch the full collection for a resource.
    pub async fn fetch_list(&self, cfg: &ResourceConfig) -> Result<Vec<Record>, SyncError> {
        let response = self.http.get(self.url(cfg.list_path)).send().await?;
        let response = check_status(response).await?;
        let body = response.text().await?;
        decode_list(serde_json::from_str(&body)?)
    }

    /// Carry a submit plan to the wire and decode the returned record.
    pub async fn execute(&self, plan: &SubmitPlan) -> Result<Record, SyncError> {
        let request = self.http.request(plan.method.clone(), self.url(&plan.path));
        let request = match &plan.payload {
            Payload::Json(body) => request.json(body),
            Payload::Multipart(parts) => request.multipart(build_form(parts)),
        };

        let response = request.send().await?;
        let response = check_status(response).await?;
        let body = response.text().await?;
        decode_record(serde_json::from_str(&body)?)
    }

    /// Delete one record. Success bodies are ignored (empty or status-only).
    pub async fn delete(&self, cfg: &ResourceConfig, id: &str) -> Result<(), SyncError> {
        let response = self
            .http
            .delete(self.url(&cfg.delete_path_for(id)))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

fn build_form(parts: &[Part]) -> multipart::Form {
    let mut form = multipart::Form::new();
    for part in parts {
        match part {
            Part::Text { name, value } => {
                form = form.text(name.clone(), value.clone());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let file_part = multipart::Part::bytes(bytes.clone()).file_name(file_name.clone());
                let file_part = match file_part.mime_str(content_type) {
                    Ok(with_mime) => with_mime,
                    Err(_) => multipart::Part::bytes(bytes.clone()).file_name(file_name.clone()),
                };
                form = form.part(name.clone(), file_part);
            }
        }
    }
    form
}

/// Pass through success responses; turn anything else into a `Server` error
/// carrying the extracted message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

    tracing::warn!("Server rejected request with status {}: {}", status.as_u16(), message);
    Err(SyncError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"message": ...}` and `{"error": {"message": ...}}`; anything
/// else yields `None` and the caller falls back to a generic message.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Decode a list body: a bare array or an array under `data`.
fn decode_list(value: Value) -> Result<Vec<Record>, SyncError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(SyncError::Decode(
                    "list response is neither an array nor a data envelope".to_string(),
                ))
            }
        },
        _ => {
            return Err(SyncError::Decode(
                "list response is not an array".to_string(),
            ))
        }
    };

    items.into_iter().map(Record::from_value).collect()
}

/// Decode a record body: a bare record, `{"data": record}`, or a
/// singular-key envelope such as `{"product": record}`.
fn decode_record(value: Value) -> Result<Record, SyncError> {
    let Value::Object(mut map) = value else {
        return Err(SyncError::Decode(
            "record response is not an object".to_string(),
        ));
    };

    if map.contains_key("_id") || map.contains_key("id") {
        return Ok(Record::new(map));
    }

    if let Some(data) = map.remove("data") {
        return Record::from_value(data);
    }

    if map.len() == 1 {
        if let Some((_, inner)) = map.into_iter().next() {
            return Record::from_value(inner);
        }
    }

    Err(SyncError::Decode(
        "record response has no recognizable envelope".to_string(),
    ))
}
