//! `reqwest`-backed transport.
//!
//! # Design
//! Non-2xx statuses are returned as data, never as errors; only failures that
//! produced no response become `TransportOutcome::Failure`. Timeouts come
//! from `ClientConfig::timeout` and map to `TransportErrorKind::Timeout`.

use async_trait::async_trait;
use reqwest::{Client, Method};

use crate::config::ClientConfig;
use crate::error::{ApiError, TransportError, TransportErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransportOutcome};
use crate::transport::Transport;

/// Async HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Unknown(transport_error(e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> TransportOutcome {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return TransportOutcome::Failure(transport_error(e)),
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        match response.bytes().await {
            Ok(body) => TransportOutcome::Response(HttpResponse {
                status,
                headers,
                body: body.to_vec(),
            }),
            Err(e) => TransportOutcome::Failure(transport_error(e)),
        }
    }
}

fn transport_error(e: reqwest::Error) -> TransportError {
    let kind = if e.is_timeout() {
        TransportErrorKind::Timeout
    } else if e.is_connect() {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Other
    };
    TransportError::new(kind, e.to_string())
}
