//! Recording mock transport
//!
//! Responses are served in the order they were queued; every request is
//! kept so tests can assert on URLs, headers and signatures, or on the
//! absence of any network call.

use crate::errors::{ExchangeError, Result, TransportError};
use crate::http::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and raw body
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.push_response(status, body);
        self
    }

    /// Queue a 200 response carrying `body` serialized as JSON
    pub fn respond_json(self, body: serde_json::Value) -> Self {
        self.push_response(200, body.to_string());
        self
    }

    /// Queue a failure returned instead of a response
    pub fn fail(self, error: ExchangeError) -> Self {
        lock(&self.responses).push_back(Err(error));
        self
    }

    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        lock(&self.responses).push_back(Ok(HttpResponse::new(status, body)));
    }

    /// Every request sent so far, oldest first
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn pending_responses(&self) -> usize {
        lock(&self.responses).len()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.to_string();
        lock(&self.requests).push(request);
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect(format!("no mock response queued for {url}")).into()))
    }
}
