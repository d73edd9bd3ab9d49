//! Async HTTP client wrapping reqwest.
//!
//! Replays captured request configurations and issues the per-message DELETE
//! calls. Fetches retry on 5xx and transport errors with exponential backoff
//! and honor `retry-after` on 429; deletions are single-shot because the
//! sweep loop owns the pacing.

use crate::fetchcmd::RequestConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

const MAX_RETRIES: u32 = 2;

/// Errors from the request layer.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid HTTP method {0:?}")]
    Method(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A completed request with its body parsed as JSON when possible.
#[derive(Debug, Clone)]
pub struct JsonResponse {
    pub status: u16,
    /// Parsed body, or `Value::Null` when the body was empty or not JSON.
    pub body: serde_json::Value,
}

impl JsonResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outcome of a single message deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    RateLimited,
    Failed { status: u16 },
}

/// HTTP client for replaying captured sessions.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client with a browser user-agent and bounded redirects.
    pub fn new(timeout_ms: u64) -> Self {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                  AppleWebKit/537.36 (KHTML, like Gecko) \
                  Chrome/139.0.0.0 Safari/537.36";

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(ua)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// Replay a captured request and parse the response body as JSON.
    ///
    /// A string body that is itself valid JSON is re-sent as JSON (matching
    /// what the browser originally did for `content-type: application/json`
    /// requests); anything else goes out as a raw body.
    pub async fn execute(&self, cfg: &RequestConfig) -> Result<JsonResponse, HttpError> {
        let method = reqwest::Method::from_bytes(cfg.method.as_bytes())
            .map_err(|_| HttpError::Method(cfg.method.clone()))?;
        let headers = build_header_map(&cfg.headers);

        let mut retries = 0u32;
        loop {
            let mut builder = self
                .client
                .request(method.clone(), &cfg.url)
                .headers(headers.clone());

            if let Some(raw) = &cfg.body {
                match serde_json::from_str::<serde_json::Value>(raw) {
                    Ok(json) => builder = builder.json(&json),
                    Err(_) => builder = builder.body(raw.clone()),
                }
            }

            match builder.send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    if status >= 500 && retries < MAX_RETRIES {
                        retries += 1;
                        tokio::time::sleep(backoff(retries)).await;
                        continue;
                    }

                    if status == 429 && retries < MAX_RETRIES {
                        retries += 1;
                        let delay = retry_after(resp.headers());
                        tracing::debug!(delay_ms = delay.as_millis() as u64, "rate limited, backing off");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let text = resp.text().await.unwrap_or_default();
                    let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);
                    return Ok(JsonResponse { status, body });
                }
                Err(e) => {
                    if retries < MAX_RETRIES {
                        retries += 1;
                        tokio::time::sleep(backoff(retries)).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    /// Delete a single message. No internal retry: the sweep loop paces and
    /// a rate-limited message is simply picked up by the next page fetch.
    pub async fn delete(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
    ) -> Result<DeleteOutcome, HttpError> {
        let resp = self
            .client
            .delete(url)
            .headers(build_header_map(headers))
            .send()
            .await?;

        let status = resp.status().as_u16();
        Ok(match status {
            200 | 204 => DeleteOutcome::Deleted,
            429 => DeleteOutcome::RateLimited,
            _ => DeleteOutcome::Failed { status },
        })
    }
}

/// Convert a captured header map, dropping entries reqwest cannot represent.
/// Browsers include headers a client may not set (`:authority`-style pseudo
/// headers on some exports); those are warned about and skipped rather than
/// failing the whole replay.
fn build_header_map(headers: &BTreeMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(n), Ok(v)) => {
                map.insert(n, v);
            }
            _ => {
                tracing::warn!(header = %name, "skipping header reqwest cannot send");
            }
        }
    }
    map
}

fn backoff(retries: u32) -> Duration {
    Duration::from_millis(500 * 2u64.pow(retries - 1))
}

fn retry_after(headers: &HeaderMap) -> Duration {
    let secs = headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(2);
    Duration::from_secs(secs.min(10))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_header_map_skips_invalid() {
        let mut headers = BTreeMap::new();
        headers.insert("accept".to_string(), "*/*".to_string());
        headers.insert(":authority".to_string(), "discord.com".to_string());
        headers.insert("x-token".to_string(), "abc".to_string());

        let map = build_header_map(&headers);
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("accept"));
        assert!(map.contains_key("x-token"));
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff(1), Duration::from_millis(500));
        assert_eq!(backoff(2), Duration::from_millis(1000));
    }

    #[test]
    fn test_retry_after_capped() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("60"));
        assert_eq!(retry_after(&headers), Duration::from_secs(10));

        headers.insert("retry-after", HeaderValue::from_static("3"));
        assert_eq!(retry_after(&headers), Duration::from_secs(3));

        assert_eq!(retry_after(&HeaderMap::new()), Duration::from_secs(2));
    }

    #[test]
    fn test_json_response_success() {
        let ok = JsonResponse {
            status: 204,
            body: serde_json::Value::Null,
        };
        assert!(ok.is_success());
        let not = JsonResponse {
            status: 403,
            body: serde_json::Value::Null,
        };
        assert!(!not.is_success());
    }
}
