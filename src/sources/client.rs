// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Shared HTTP client

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use serde_json::Value;

use crate::config::HttpConfig;
use crate::errors::ScrapeflowError;

/// Characters of an error body kept for diagnostics
const ERROR_BODY_LIMIT: usize = 500;

/// JSON-over-HTTP client that presents itself as a browser
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    delay: Duration,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, ScrapeflowError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
        headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    /// GET `url` and decode the body as JSON
    ///
    /// Compressed bodies (gzip, deflate, brotli) are decoded by the client.
    /// A non-2xx status is an error carrying the start of the body.
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: &[(&'static str, String)],
    ) -> Result<Value, ScrapeflowError> {
        let mut request = self.client.get(url).query(query);
        for (name, value) in headers {
            let invalid = |e: &dyn std::fmt::Display| ScrapeflowError::Http {
                url: url.to_string(),
                message: format!("Invalid {} header: {}", name, e),
            };
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(&e))?;
            let value = HeaderValue::from_str(value).map_err(|e| invalid(&e))?;
            request = request.header(name, value);
        }

        tracing::debug!("GET {}", url);
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} -> {}", url, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScrapeflowError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        response.json::<Value>().await.map_err(Into::into)
    }

    /// Wait the configured delay between requests to the same site
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short"), "short");

        let long = "x".repeat(ERROR_BODY_LIMIT + 10);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.len(), ERROR_BODY_LIMIT + 3);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_client_builds_from_defaults() {
        let client = HttpClient::new(&HttpConfig::default()).unwrap();
        assert_eq!(client.delay, Duration::from_millis(1000));
    }
}
