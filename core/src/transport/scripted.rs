//! Scripted in-memory transport for tests and demos.
//!
//! # Design
//! Rules are matched in insertion order against the request method and the
//! tail of the URL path. Nothing touches the network, so every style and
//! fan-out policy can be exercised deterministically.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{TransportError, TransportErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransportOutcome};
use crate::transport::Transport;

struct Rule {
    method: HttpMethod,
    path: String,
    delay: Option<Duration>,
    outcome: TransportOutcome,
}

/// In-memory transport that answers from a fixed script.
///
/// A rule matches when the method is equal and the request URL's path ends
/// with the rule's path (query strings are ignored). The first matching rule
/// wins; requests matching nothing get a 404. Every executed request is
/// recorded so tests can assert how many calls were issued.
pub struct ScriptedTransport {
    rules: Vec<Rule>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on(self, method: HttpMethod, path: &str, outcome: TransportOutcome) -> Self {
        self.push(method, path, None, outcome)
    }

    pub fn respond(self, method: HttpMethod, path: &str, status: u16, body: &str) -> Self {
        let outcome = TransportOutcome::Response(HttpResponse::new(status, body.as_bytes().to_vec()));
        self.push(method, path, None, outcome)
    }

    /// Like `respond`, but the answer is held back for `delay`.
    pub fn respond_after(
        self,
        delay: Duration,
        method: HttpMethod,
        path: &str,
        status: u16,
        body: &str,
    ) -> Self {
        let outcome = TransportOutcome::Response(HttpResponse::new(status, body.as_bytes().to_vec()));
        self.push(method, path, Some(delay), outcome)
    }

    pub fn fail(self, method: HttpMethod, path: &str, kind: TransportErrorKind, message: &str) -> Self {
        let outcome = TransportOutcome::Failure(TransportError::new(kind, message));
        self.push(method, path, None, outcome)
    }

    fn push(
        mut self,
        method: HttpMethod,
        path: &str,
        delay: Option<Duration>,
        outcome: TransportOutcome,
    ) -> Self {
        self.rules.push(Rule {
            method,
            path: path.to_string(),
            delay,
            outcome,
        });
        self
    }

    /// Requests executed so far, in arrival order.
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    fn lookup(&self, request: &HttpRequest) -> (Option<Duration>, TransportOutcome) {
        let path = Url::parse(&request.url)
            .map(|url| url.path().to_string())
            .unwrap_or_default();
        self.rules
            .iter()
            .find(|rule| rule.method == request.method && path.ends_with(&rule.path))
            .map(|rule| (rule.delay, rule.outcome.clone()))
            .unwrap_or_else(|| (None, TransportOutcome::Response(HttpResponse::new(404, Vec::new()))))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> TransportOutcome {
        let (delay, outcome) = self.lookup(&request);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request);
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn matches_on_method_and_path_suffix() {
        let transport = ScriptedTransport::new().respond(HttpMethod::Get, "/todos/1", 200, "{}");

        let hit = transport.execute(get("http://h/api/v2/todos/1")).await;
        assert_eq!(hit, TransportOutcome::Response(HttpResponse::new(200, b"{}".to_vec())));

        let miss = transport.execute(get("http://h/api/v2/todos/2")).await;
        assert!(matches!(miss, TransportOutcome::Response(r) if r.status == 404));

        assert_eq!(transport.call_count(), 2);
        assert_eq!(transport.calls()[0].url, "http://h/api/v2/todos/1");
    }

    #[tokio::test]
    async fn query_string_is_ignored() {
        let transport = ScriptedTransport::new().respond(HttpMethod::Get, "/todos", 500, "");
        let outcome = transport.execute(get("http://h/api/v2/todos?page=3")).await;
        assert!(matches!(outcome, TransportOutcome::Response(r) if r.status == 500));
    }
}
