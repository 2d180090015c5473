//! HTTP request/response values passed between the pipeline and a transport.
//!
//! # Design
//! Requests and responses are plain data. `TodoClient` builds `HttpRequest`
//! values without touching the network, a `Transport` executes them, and the
//! result comes back as a `TransportOutcome`: either a response with a status
//! code or a transport failure that never produced one. No runtime downcast
//! is needed to tell the two apart.
//!
//! Bodies are encoded eagerly (`RequestBody::encode`) so a JSON failure
//! surfaces at build time, before any I/O.

use std::fmt;

use serde_json::{Map, Value};
use url::form_urlencoded;
use uuid::Uuid;

use crate::error::{ApiError, TransportError};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute and already carries percent-encoded query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// What a transport hands back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    Response(HttpResponse),
    Failure(TransportError),
}

/// Request body before encoding. Each variant implies its own `Content-Type`.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `multipart/form-data` text parts, in order.
    Multipart(Vec<(String, String)>),
    /// A flat string-keyed JSON object.
    Json(Map<String, Value>),
    /// `application/x-www-form-urlencoded` key/value pairs, in order.
    UrlEncoded(Vec<(String, String)>),
}

/// An encoded body together with the `Content-Type` that describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl RequestBody {
    pub fn encode(&self) -> Result<EncodedBody, ApiError> {
        match self {
            RequestBody::Multipart(parts) => {
                let boundary = format!("Boundary-{}", Uuid::new_v4().simple());
                Ok(EncodedBody {
                    content_type: format!("multipart/form-data; boundary={boundary}"),
                    bytes: encode_multipart(&boundary, parts),
                })
            }
            RequestBody::Json(map) => {
                let bytes =
                    serde_json::to_vec(map).map_err(|e| ApiError::JsonEncoding(e.to_string()))?;
                Ok(EncodedBody {
                    content_type: "application/json".to_string(),
                    bytes,
                })
            }
            RequestBody::UrlEncoded(pairs) => {
                let encoded = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs)
                    .finish();
                Ok(EncodedBody {
                    content_type: "application/x-www-form-urlencoded".to_string(),
                    bytes: encoded.into_bytes(),
                })
            }
        }
    }
}

fn encode_multipart(boundary: &str, parts: &[(String, String)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
