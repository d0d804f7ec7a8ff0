//! HTTP transport backed by `reqwest`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tracing::debug;

use super::{parse_body, Method, Request, Response, Transport};
use crate::config::ApiConfig;
use crate::error::{Result, TransportError};

/// Map reqwest errors to TransportError
fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else {
        TransportError::Network(error.to_string())
    }
}

/// Reason phrase exactly as the server sent it
///
/// hyper records the phrase only when it differs from the canonical one.
fn reason_phrase(response: &reqwest::Response) -> Option<String> {
    response
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the API rooted at `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. "http://localhost:8080/api"
    /// * `timeout` - Per-request timeout covering connect and body
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> std::result::Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let timeout = config.request_timeout()?;
        Ok(Self::new(config.base_url.clone(), timeout)?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, request: Request) -> std::result::Result<Response, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };

        if let Some(token) = &request.authorization {
            builder = builder.header(AUTHORIZATION, token.expose());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let status_text = reason_phrase(&response)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;

        debug!(status = status.as_u16(), bytes = bytes.len(), "Received response");

        Ok(Response {
            status: status.as_u16(),
            status_text,
            data: parse_body(&bytes),
        })
    }
}
