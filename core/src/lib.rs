//! Client-side access layer for the todos REST API.
//!
//! # Overview
//! One request/response pipeline (build -> transport -> classify -> decode),
//! delivered through three interchangeable styles: futures, callbacks and
//! streams. Fan-out helpers call the API concurrently for many ids.
//!
//! # Design
//! - `TodoClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` turns a `TransportOutcome` into a typed envelope or an
//!   `ApiError`. It never does I/O.
//! - `Transport` is the only I/O seam. `ReqwestTransport` talks to the real
//!   server; `ScriptedTransport` answers from a script for tests.
//! - `Pipeline` glues the two together; `TodosApi<D>` exposes every
//!   operation once and lets the `Delivery` strategy `D` pick the style.
//! - Every failure is one variant of the closed `ApiError` enum.
//!
//! ```no_run
//! # async fn demo() -> Result<(), todos_api::ApiError> {
//! use todos_api::{AsyncTodosApi, ClientConfig, Pipeline, Policy};
//!
//! let pipeline = Pipeline::from_config(&ClientConfig::from_env())?;
//! let api = AsyncTodosApi::futures(pipeline);
//! let page = api.fetch_todos(1).await?;
//! let picked = api.fetch_selected_todos(vec![1, 2, 3], Policy::BestEffort).await?;
//! # let _ = (page, picked);
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod client;
pub mod config;
pub mod decode;
pub mod delivery;
pub mod error;
pub mod fanout;
pub mod http;
pub mod pipeline;
pub mod transport;
pub mod types;

pub use client::TodoClient;
pub use config::ClientConfig;
pub use delivery::{
    subscribe, switch_latest, ApiStreamExt, AsyncTodosApi, Callback, CallbackTodosApi, Callbacks,
    Delivery, Futures, StreamTodosApi, Streams, Subscription, TodosApi,
};
pub use error::{ApiError, TransportError, TransportErrorKind};
pub use fanout::Policy;
pub use http::{HttpMethod, HttpRequest, HttpResponse, TransportOutcome};
pub use pipeline::Pipeline;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::{ScriptedTransport, Transport};
pub use types::{ItemEnvelope, ListEnvelope, Meta, Todo, TodoInput};
