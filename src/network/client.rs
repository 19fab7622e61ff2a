//! HTTP client for calling search providers and the language model

use crate::config::OutgoingSettings;
use crate::engines::{EngineRequest, EngineResponse};
use anyhow::{Context, Result};
use reqwest::{Client, Response};
use std::time::Duration;

/// HTTP client wrapper shared by every outbound call
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs_f64(settings.request_timeout))
            .pool_max_idle_per_host(settings.pool_maxsize)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        if !settings.extra_headers.is_empty() {
            let mut headers = reqwest::header::HeaderMap::new();
            for (key, value) in &settings.extra_headers {
                headers.insert(
                    reqwest::header::HeaderName::from_bytes(key.as_bytes())
                        .with_context(|| format!("Invalid header name: {}", key))?,
                    reqwest::header::HeaderValue::from_str(value)
                        .with_context(|| format!("Invalid value for header {}", key))?,
                );
            }
            builder = builder.default_headers(headers);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            user_agent: format!("rural-search/{}", crate::VERSION),
        })
    }

    /// Execute an engine request with custom timeout
    pub async fn execute_with_timeout(
        &self,
        request: EngineRequest,
        timeout: Duration,
    ) -> Result<EngineResponse> {
        let mut req_builder = match request.body {
            Some(ref body) => self.client.post(&request.url).json(body),
            None => self.client.get(&request.url),
        };

        req_builder = req_builder
            .timeout(timeout)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json");

        // Add custom headers
        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        // Add query parameters
        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("Request to {} failed", redact(&request.url)))?;

        Self::parse_response(response).await
    }

    /// Parse response into EngineResponse
    async fn parse_response(response: Response) -> Result<EngineResponse> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let text = response
            .text()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to read response body")?;

        Ok(EngineResponse { status, text, url })
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Strip the query string so credentials never reach the logs
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
