//! Stateless HTTP request builder and response parser for the todos API.
//!
//! # Design
//! `TodoClient` holds only the API root (`{origin}/api/{version}`) and carries
//! no mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! a `TransportOutcome`. Whoever owns the transport runs the round-trip in
//! between, so this module stays deterministic and free of I/O.

use serde_json::{Map, Value};
use url::Url;

use crate::classify::{classify, Shape};
use crate::config::ClientConfig;
use crate::decode::{decode_item, decode_list};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, RequestBody, TransportOutcome};
use crate::types::{ItemEnvelope, ListEnvelope, Todo, TodoInput};

const ACCEPT_JSON: (&str, &str) = ("Accept", "application/json");

/// Synchronous, stateless client for the todos API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    api_root: String,
}

impl TodoClient {
    /// `origin` is scheme + host (+ port); the `/api/v2` prefix is added here.
    pub fn new(origin: &str) -> Self {
        Self::from_config(&ClientConfig::new(origin))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            api_root: config.api_root(),
        }
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn build_list_todos(&self, page: u32) -> Result<HttpRequest, ApiError> {
        let page = page.to_string();
        self.request(HttpMethod::Get, &["todos"], &[("page", page.as_str())], None)
    }

    pub fn build_get_todo(&self, id: i64) -> Result<HttpRequest, ApiError> {
        let id = id.to_string();
        self.request(HttpMethod::Get, &["todos", id.as_str()], &[], None)
    }

    pub fn build_search_todos(&self, query: &str, page: u32) -> Result<HttpRequest, ApiError> {
        let page = page.to_string();
        self.request(
            HttpMethod::Get,
            &["todos", "search"],
            &[("query", query), ("page", page.as_str())],
            None,
        )
    }

    /// Multipart create: `POST /todos` with `title` and `is_done` parts.
    pub fn build_create_todo(&self, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        let body = RequestBody::Multipart(input.form_fields());
        self.request(HttpMethod::Post, &["todos"], &[], Some(body))
    }

    pub fn build_create_todo_json(&self, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        let body = RequestBody::Json(json_object(input)?);
        self.request(HttpMethod::Post, &["todos-json"], &[], Some(body))
    }

    /// JSON update goes through `POST /todos-json/{id}`, not PUT.
    pub fn build_update_todo_json(
        &self,
        id: i64,
        input: &TodoInput,
    ) -> Result<HttpRequest, ApiError> {
        let id = id.to_string();
        let body = RequestBody::Json(json_object(input)?);
        self.request(HttpMethod::Post, &["todos-json", id.as_str()], &[], Some(body))
    }

    /// URL-encoded update: `PUT /todos/{id}`.
    pub fn build_update_todo(&self, id: i64, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        let id = id.to_string();
        let body = RequestBody::UrlEncoded(input.form_fields());
        self.request(HttpMethod::Put, &["todos", id.as_str()], &[], Some(body))
    }

    pub fn build_delete_todo(&self, id: i64) -> Result<HttpRequest, ApiError> {
        let id = id.to_string();
        self.request(HttpMethod::Delete, &["todos", id.as_str()], &[], None)
    }

    pub fn parse_list_todos(&self, outcome: TransportOutcome) -> Result<ListEnvelope<Todo>, ApiError> {
        parse_list(outcome)
    }

    pub fn parse_search_todos(&self, outcome: TransportOutcome) -> Result<ListEnvelope<Todo>, ApiError> {
        parse_list(outcome)
    }

    pub fn parse_get_todo(&self, outcome: TransportOutcome) -> Result<ItemEnvelope<Todo>, ApiError> {
        parse_item(outcome)
    }

    pub fn parse_create_todo(&self, outcome: TransportOutcome) -> Result<ItemEnvelope<Todo>, ApiError> {
        parse_item(outcome)
    }

    pub fn parse_update_todo(&self, outcome: TransportOutcome) -> Result<ItemEnvelope<Todo>, ApiError> {
        parse_item(outcome)
    }

    pub fn parse_delete_todo(&self, outcome: TransportOutcome) -> Result<ItemEnvelope<Todo>, ApiError> {
        parse_item(outcome)
    }

    fn request(
        &self,
        method: HttpMethod,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<RequestBody>,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(segments, query)?;
        let mut headers = vec![(ACCEPT_JSON.0.to_string(), ACCEPT_JSON.1.to_string())];
        let body = match body {
            Some(body) => {
                let encoded = body.encode()?;
                headers.push(("Content-Type".to_string(), encoded.content_type));
                Some(encoded.bytes)
            }
            None => None,
        };
        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<String, ApiError> {
        let mut url = Url::parse(&self.api_root).map_err(|e| {
            log::warn!("invalid api root {:?}: {e}", self.api_root);
            ApiError::NotAllowedUrl
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::NotAllowedUrl);
        }
        url.path_segments_mut()
            .map_err(|_| ApiError::NotAllowedUrl)?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url.into())
    }
}

fn parse_list(outcome: TransportOutcome) -> Result<ListEnvelope<Todo>, ApiError> {
    let response = classify(outcome, Shape::List)?;
    decode_list(&response.body)
}

fn parse_item(outcome: TransportOutcome) -> Result<ItemEnvelope<Todo>, ApiError> {
    let response = classify(outcome, Shape::Item)?;
    decode_item(&response.body)
}

fn json_object(input: &TodoInput) -> Result<Map<String, Value>, ApiError> {
    match serde_json::to_value(input).map_err(|e| ApiError::JsonEncoding(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(ApiError::JsonEncoding(format!("expected an object, got {other}"))),
    }
}
