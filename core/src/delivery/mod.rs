//! Delivery styles layered over the single `Pipeline`.
//!
//! # Design
//! `TodosApi<D>` defines every operation once. The `Delivery` strategy only
//! decides how the finished work reaches the caller:
//!
//! - `Futures`: a boxed future resolving to `Result<T, ApiError>`.
//! - `Callbacks`: a `Callback<T>` whose completion runs exactly once.
//! - `Streams`: a boxed single-element stream.
//!
//! Because all three wrap the same future, the same transport outcome always
//! yields the same `ApiError` variant or payload whichever style is used.
//!
//! Every fallible operation has a separately named `*_or_empty` /
//! `*_or_none` sibling that never fails and substitutes a fallback value.

use std::future::Future;

use futures::future::{BoxFuture, FutureExt};

use crate::error::ApiError;
use crate::fanout::{self, Policy};
use crate::pipeline::Pipeline;
use crate::types::{ItemEnvelope, ListEnvelope, Todo, TodoInput};

mod callback;
mod future;
mod stream;

pub use callback::{Callback, Callbacks};
pub use future::Futures;
pub use stream::{subscribe, switch_latest, ApiStreamExt, Streams, Subscription, SwitchLatest};

pub trait Delivery: Clone + Send + Sync + 'static {
    /// Handle for work that may fail with an `ApiError`.
    type Fallible<T: Send + 'static>;
    /// Handle for work that cannot fail.
    type Infallible<T: Send + 'static>;

    fn fallible<T: Send + 'static>(
        &self,
        work: BoxFuture<'static, Result<T, ApiError>>,
    ) -> Self::Fallible<T>;

    fn infallible<T: Send + 'static>(&self, work: BoxFuture<'static, T>) -> Self::Infallible<T>;
}

pub type AsyncTodosApi = TodosApi<Futures>;
pub type CallbackTodosApi = TodosApi<Callbacks>;
pub type StreamTodosApi = TodosApi<Streams>;

/// The todos API, delivered in style `D`.
#[derive(Clone)]
pub struct TodosApi<D: Delivery> {
    pipeline: Pipeline,
    delivery: D,
}

impl<D: Delivery> TodosApi<D> {
    pub fn new(pipeline: Pipeline, delivery: D) -> Self {
        Self { pipeline, delivery }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn fetch_todos(&self, page: u32) -> D::Fallible<ListEnvelope<Todo>> {
        self.run(move |p| async move { p.fetch_todos(page).await })
    }

    /// Never fails: any error becomes an empty list.
    pub fn fetch_todos_or_empty(&self, page: u32) -> D::Infallible<Vec<Todo>> {
        self.run_or(Vec::new(), move |p| async move {
            p.fetch_todos(page).await.map(|env| env.data.unwrap_or_default())
        })
    }

    pub fn fetch_todo(&self, id: i64) -> D::Fallible<ItemEnvelope<Todo>> {
        self.run(move |p| async move { p.fetch_todo(id).await })
    }

    /// Never fails: any error becomes `None`.
    pub fn fetch_todo_or_none(&self, id: i64) -> D::Infallible<Option<Todo>> {
        self.run_or(None, move |p| async move { p.fetch_todo(id).await.map(|env| env.data) })
    }

    pub fn search_todos(&self, query: &str, page: u32) -> D::Fallible<ListEnvelope<Todo>> {
        let query = query.to_string();
        self.run(move |p| async move { p.search_todos(&query, page).await })
    }

    /// Multipart create.
    pub fn add_todo(&self, input: TodoInput) -> D::Fallible<ItemEnvelope<Todo>> {
        self.run(move |p| async move { p.add_todo(&input).await })
    }

    pub fn add_todo_json(&self, input: TodoInput) -> D::Fallible<ItemEnvelope<Todo>> {
        self.run(move |p| async move { p.add_todo_json(&input).await })
    }

    pub fn edit_todo_json(&self, id: i64, input: TodoInput) -> D::Fallible<ItemEnvelope<Todo>> {
        self.run(move |p| async move { p.edit_todo_json(id, &input).await })
    }

    /// URL-encoded update.
    pub fn edit_todo(&self, id: i64, input: TodoInput) -> D::Fallible<ItemEnvelope<Todo>> {
        self.run(move |p| async move { p.edit_todo(id, &input).await })
    }

    pub fn delete_todo(&self, id: i64) -> D::Fallible<ItemEnvelope<Todo>> {
        self.run(move |p| async move { p.delete_todo(id).await })
    }

    /// Create, then fetch the first page. Either failure fails the chain.
    pub fn add_todo_and_fetch_todos(&self, input: TodoInput) -> D::Fallible<Vec<Todo>> {
        self.run(move |p| async move { p.add_todo_and_fetch_todos(&input).await })
    }

    /// Never fails: any error in the chain becomes an empty list.
    pub fn add_todo_and_fetch_todos_or_empty(&self, input: TodoInput) -> D::Infallible<Vec<Todo>> {
        self.run_or(Vec::new(), move |p| async move {
            p.add_todo_and_fetch_todos(&input).await
        })
    }

    /// Fetch every id concurrently; results arrive in completion order.
    pub fn fetch_selected_todos(&self, ids: Vec<i64>, policy: Policy) -> D::Fallible<Vec<Todo>> {
        self.run(move |p| async move {
            fanout::run_many(ids, |id| fetch_one(p.clone(), id), policy).await
        })
    }

    /// Delete every id concurrently; yields the ids the server confirmed.
    pub fn delete_selected_todos(&self, ids: Vec<i64>, policy: Policy) -> D::Fallible<Vec<i64>> {
        self.run(move |p| async move {
            let deleted = fanout::run_many(ids, |id| delete_one(p.clone(), id), policy).await?;
            Ok(deleted.into_iter().flatten().collect())
        })
    }

    fn run<T, F, Fut>(&self, work: F) -> D::Fallible<T>
    where
        T: Send + 'static,
        F: FnOnce(Pipeline) -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        self.delivery.fallible(work(self.pipeline.clone()).boxed())
    }

    fn run_or<T, F, Fut>(&self, fallback: T, work: F) -> D::Infallible<T>
    where
        T: Send + 'static,
        F: FnOnce(Pipeline) -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let work = work(self.pipeline.clone());
        self.delivery.infallible(
            async move {
                work.await.unwrap_or_else(|err| {
                    log::warn!("substituting fallback value after error: {err}");
                    fallback
                })
            }
            .boxed(),
        )
    }
}

pub(crate) async fn fetch_one(pipeline: Pipeline, id: i64) -> Result<Todo, ApiError> {
    pipeline
        .fetch_todo(id)
        .await?
        .data
        .ok_or(ApiError::NoContent)
}

pub(crate) async fn delete_one(pipeline: Pipeline, id: i64) -> Result<Option<i64>, ApiError> {
    let deleted = pipeline.delete_todo(id).await?;
    Ok(deleted.data.and_then(|todo| todo.id))
}
