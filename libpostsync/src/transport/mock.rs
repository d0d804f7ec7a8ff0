//! Mock transport for testing
//!
//! Routes are scripted per `(method, path)`: each call pops the next queued
//! response for its route, or answers `404 Not Found` when nothing is
//! queued. Every request is recorded for later verification, and a route
//! can be told to fail at the transport level or to answer after a delay.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use super::{Method, Request, Response, Transport};
use crate::error::TransportError;

/// Canned answer for one call
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub status_text: String,
    pub data: Value,
    /// Delay before the response is delivered (simulates network latency)
    pub delay: Duration,
}

impl MockResponse {
    pub fn new(status: u16, status_text: &str, data: Value) -> Self {
        Self {
            status,
            status_text: status_text.to_string(),
            data,
            delay: Duration::ZERO,
        }
    }

    /// `200 OK` with the given body
    pub fn ok(data: Value) -> Self {
        Self::new(200, "OK", data)
    }

    /// `201 Created` with the given body
    pub fn created(data: Value) -> Self {
        Self::new(201, "Created", data)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request as the mock saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub authorization: Option<String>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    routes: HashMap<(Method, String), VecDeque<MockResponse>>,
    failures: HashMap<(Method, String), TransportError>,
    requests: Vec<RecordedRequest>,
}

/// Mock transport for testing
#[derive(Debug, Default, Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next call to `method path`
    pub fn respond(&self, method: Method, path: &str, response: MockResponse) -> &Self {
        let mut inner = self.inner.lock().unwrap();
        inner
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    /// Cause the next call to `method path` to fail without a response
    pub fn fail_next(&self, method: Method, path: &str, error: TransportError) -> &Self {
        let mut inner = self.inner.lock().unwrap();
        inner.failures.insert((method, path.to_string()), error);
        self
    }

    /// Get all requests that were made, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Get the last request that was made
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.inner.lock().unwrap().requests.last().cloned()
    }

    /// Get the number of calls made so far
    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }

    /// Get the number of responses still queued across all routes
    pub fn pending_responses(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .routes
            .values()
            .map(VecDeque::len)
            .sum()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, request: Request) -> Result<Response, TransportError> {
        let outcome = {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.push(RecordedRequest {
                method: request.method,
                path: request.path.clone(),
                body: request.body.clone(),
                authorization: request.authorization.as_ref().map(|t| t.expose().to_string()),
            });

            let key = (request.method, request.path.clone());
            match inner.failures.remove(&key) {
                Some(error) => Err(error),
                None => Ok(inner
                    .routes
                    .get_mut(&key)
                    .and_then(VecDeque::pop_front)
                    .unwrap_or_else(|| MockResponse::new(404, "Not Found", Value::Null))),
            }
        };

        let response = outcome?;
        if !response.delay.is_zero() {
            sleep(response.delay).await;
        }

        Ok(Response {
            status: response.status,
            status_text: response.status_text,
            data: response.data,
        })
    }
}
