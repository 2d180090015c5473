//! The I/O seam between the pipeline and the network.
//!
//! A `Transport` executes one `HttpRequest` and reports either the HTTP
//! response or a failure that produced no status. It never interprets status
//! codes; that is the classifier's job. Timeouts belong to the transport's
//! own configuration.

use async_trait::async_trait;

use crate::http::{HttpRequest, TransportOutcome};

#[cfg(feature = "reqwest")]
mod native;
mod scripted;

#[cfg(feature = "reqwest")]
pub use native::ReqwestTransport;
pub use scripted::ScriptedTransport;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> TransportOutcome;
}
