//! The one request/response pipeline every delivery style drives.
//!
//! build (`TodoClient::build_*`) -> `Transport::execute` -> classify ->
//! decode (`TodoClient::parse_*`). Errors from any stage come back as a
//! single `ApiError`; nothing is swallowed here.

use std::sync::Arc;

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, TransportOutcome};
use crate::transport::Transport;
use crate::types::{ItemEnvelope, ListEnvelope, Todo, TodoInput};

#[derive(Clone)]
pub struct Pipeline {
    client: TodoClient,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    pub fn new(client: TodoClient, transport: Arc<dyn Transport>) -> Self {
        Self { client, transport }
    }

    /// Pipeline over a `reqwest` transport configured from `config`.
    #[cfg(feature = "reqwest")]
    pub fn from_config(config: &crate::config::ClientConfig) -> Result<Self, ApiError> {
        let transport = crate::transport::ReqwestTransport::new(config)?;
        Ok(Self::new(TodoClient::from_config(config), Arc::new(transport)))
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    pub async fn fetch_todos(&self, page: u32) -> Result<ListEnvelope<Todo>, ApiError> {
        let outcome = self.send(self.client.build_list_todos(page)).await?;
        self.client.parse_list_todos(outcome).inspect_err(log_failure)
    }

    pub async fn fetch_todo(&self, id: i64) -> Result<ItemEnvelope<Todo>, ApiError> {
        let outcome = self.send(self.client.build_get_todo(id)).await?;
        self.client.parse_get_todo(outcome).inspect_err(log_failure)
    }

    pub async fn search_todos(&self, query: &str, page: u32) -> Result<ListEnvelope<Todo>, ApiError> {
        let outcome = self.send(self.client.build_search_todos(query, page)).await?;
        self.client.parse_search_todos(outcome).inspect_err(log_failure)
    }

    pub async fn add_todo(&self, input: &TodoInput) -> Result<ItemEnvelope<Todo>, ApiError> {
        let outcome = self.send(self.client.build_create_todo(input)).await?;
        self.client.parse_create_todo(outcome).inspect_err(log_failure)
    }

    pub async fn add_todo_json(&self, input: &TodoInput) -> Result<ItemEnvelope<Todo>, ApiError> {
        let outcome = self.send(self.client.build_create_todo_json(input)).await?;
        self.client.parse_create_todo(outcome).inspect_err(log_failure)
    }

    pub async fn edit_todo_json(
        &self,
        id: i64,
        input: &TodoInput,
    ) -> Result<ItemEnvelope<Todo>, ApiError> {
        let outcome = self.send(self.client.build_update_todo_json(id, input)).await?;
        self.client.parse_update_todo(outcome).inspect_err(log_failure)
    }

    pub async fn edit_todo(&self, id: i64, input: &TodoInput) -> Result<ItemEnvelope<Todo>, ApiError> {
        let outcome = self.send(self.client.build_update_todo(id, input)).await?;
        self.client.parse_update_todo(outcome).inspect_err(log_failure)
    }

    pub async fn delete_todo(&self, id: i64) -> Result<ItemEnvelope<Todo>, ApiError> {
        let outcome = self.send(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(outcome).inspect_err(log_failure)
    }

    /// Create, then fetch the first page. The fetch only starts once the
    /// create has succeeded.
    pub async fn add_todo_and_fetch_todos(&self, input: &TodoInput) -> Result<Vec<Todo>, ApiError> {
        self.add_todo(input).await?;
        let page = self.fetch_todos(1).await?;
        Ok(page.data.unwrap_or_default())
    }

    async fn send(
        &self,
        request: Result<HttpRequest, ApiError>,
    ) -> Result<TransportOutcome, ApiError> {
        let request = request.inspect_err(log_failure)?;
        log::debug!("{} {}", request.method, request.url);
        Ok(self.transport.execute(request).await)
    }
}

fn log_failure(err: &ApiError) {
    log::debug!("request failed: {err}");
}
