//! Transport abstraction for the posts API.
//!
//! The transport performs exactly one HTTP exchange per call and reports
//! what came back: numeric status, reason phrase and body. It never
//! retries and never interprets the body beyond parsing it as JSON.
//!
//! # Implementations
//!
//! - [`HttpTransport`]: `reqwest` client bound to an API base URL
//! - [`MockTransport`]: scripted in-memory routes for tests
//!
//! # Example
//!
//! ```no_run
//! use libpostsync::transport::{HttpTransport, Method, Request, Transport};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), libpostsync::error::TransportError> {
//! let transport = HttpTransport::new("http://localhost:8080/api", Duration::from_secs(10))?;
//! let response = transport.call(Request::new(Method::Get, "/posts")).await?;
//! println!("{} {}", response.status, response.status_text);
//! # Ok(())
//! # }
//! ```

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{MockResponse, MockTransport, RecordedRequest};

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::types::AuthToken;

/// HTTP methods used by the posts API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// One outgoing call. `path` is relative to the API base URL.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub authorization: Option<AuthToken>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            authorization: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_authorization(mut self, token: AuthToken) -> Self {
        self.authorization = Some(token);
        self
    }
}

/// What the server answered, passed through unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    /// Parsed JSON body; `Null` when empty, a JSON string when not JSON.
    pub data: Value,
}

/// Transport trait for the posts API.
///
/// Implementations must surface any received status code as `Ok`, even
/// 4xx/5xx; `Err` is reserved for exchanges that produced no response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, request: Request) -> Result<Response, TransportError>;
}

/// Parse a raw response body the way every transport does.
pub(crate) fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
