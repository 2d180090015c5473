//! Stream delivery and the stream-only operators.
//!
//! # Design
//! Each operation is a single-element `BoxStream`. On top of that sit the
//! merged fan-out streams, `switch_latest` for chains where only the newest
//! source item matters, and `replace_error` for the no-error variants.
//! Consumers either poll the stream themselves or hand it to `subscribe`,
//! whose `Subscription` cancels the driving task when dropped.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::delivery::{delete_one, fetch_one, Delivery, TodosApi};
use crate::error::ApiError;
use crate::fanout::{self, Policy};
use crate::pipeline::Pipeline;
use crate::types::{Todo, TodoInput};

/// Stream delivery: every operation is a single-element stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct Streams;

impl Delivery for Streams {
    type Fallible<T: Send + 'static> = BoxStream<'static, Result<T, ApiError>>;
    type Infallible<T: Send + 'static> = BoxStream<'static, T>;

    fn fallible<T: Send + 'static>(
        &self,
        work: BoxFuture<'static, Result<T, ApiError>>,
    ) -> Self::Fallible<T> {
        stream::once(work).boxed()
    }

    fn infallible<T: Send + 'static>(&self, work: BoxFuture<'static, T>) -> Self::Infallible<T> {
        stream::once(work).boxed()
    }
}

impl TodosApi<Streams> {
    pub fn streams(pipeline: Pipeline) -> Self {
        Self::new(pipeline, Streams)
    }

    /// Emit each fetched todo as soon as its call completes.
    pub fn fetch_selected_todos_merged(
        &self,
        ids: Vec<i64>,
        policy: Policy,
    ) -> BoxStream<'static, Result<Todo, ApiError>> {
        let pipeline = self.pipeline().clone();
        fanout::merge_as_available(ids, move |id| fetch_one(pipeline.clone(), id), policy).boxed()
    }

    /// Emit each deleted id as soon as its call completes. Deletions whose
    /// response carries no id are skipped.
    pub fn delete_selected_todos_merged(
        &self,
        ids: Vec<i64>,
        policy: Policy,
    ) -> BoxStream<'static, Result<i64, ApiError>> {
        let pipeline = self.pipeline().clone();
        fanout::merge_as_available(ids, move |id| delete_one(pipeline.clone(), id), policy)
            .filter_map(|result| async move { result.transpose() })
            .boxed()
    }

    /// Create each input in turn; after every create, fetch the first page.
    /// A newer create supersedes a fetch still in flight, so only the list
    /// that follows the latest create is emitted. Errors become an empty list.
    pub fn add_todos_and_fetch_latest<S>(&self, inputs: S) -> BoxStream<'static, Vec<Todo>>
    where
        S: Stream<Item = TodoInput> + Send + 'static,
    {
        let adder = self.pipeline().clone();
        let fetcher = self.pipeline().clone();
        let created = inputs
            .then(move |input| {
                let pipeline = adder.clone();
                async move { pipeline.add_todo(&input).await }
            })
            .boxed();
        switch_latest(created, move |outcome| match outcome {
            Ok(_) => {
                let pipeline = fetcher.clone();
                stream::once(async move { pipeline.fetch_todos(1).await })
                    .map_ok(|page| page.data.unwrap_or_default())
                    .boxed()
            }
            Err(err) => stream::once(async move { Err(err) }).boxed(),
        })
        .replace_error(Vec::new())
    }
}

/// Combinators for streams of `Result<T, ApiError>`.
pub trait ApiStreamExt<T> {
    /// Substitute `fallback` for every error item.
    fn replace_error(self, fallback: T) -> BoxStream<'static, T>;
}

impl<S, T> ApiStreamExt<T> for S
where
    S: Stream<Item = Result<T, ApiError>> + Send + 'static,
    T: Clone + Send + 'static,
{
    fn replace_error(self, fallback: T) -> BoxStream<'static, T> {
        self.map(move |item| {
            item.unwrap_or_else(|err| {
                log::warn!("stream error replaced with fallback: {err}");
                fallback.clone()
            })
        })
        .boxed()
    }
}

/// Flatten a stream of streams, always following the newest inner stream.
///
/// Every item from `source` is mapped to an inner stream; when the source
/// emits again, the current inner stream is dropped mid-flight.
pub fn switch_latest<S, F, U>(source: S, f: F) -> SwitchLatest<S, F, U>
where
    S: Stream + Unpin,
    F: FnMut(S::Item) -> U,
    U: Stream + Unpin,
{
    SwitchLatest {
        source: Some(source),
        f,
        inner: None,
    }
}

pub struct SwitchLatest<S, F, U> {
    source: Option<S>,
    f: F,
    inner: Option<U>,
}

impl<S, F, U> Stream for SwitchLatest<S, F, U>
where
    S: Stream + Unpin,
    F: FnMut(S::Item) -> U + Unpin,
    U: Stream + Unpin,
{
    type Item = U::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        while let Some(source) = this.source.as_mut() {
            match source.poll_next_unpin(cx) {
                Poll::Ready(Some(item)) => this.inner = Some((this.f)(item)),
                Poll::Ready(None) => this.source = None,
                Poll::Pending => break,
            }
        }

        if let Some(inner) = this.inner.as_mut() {
            match inner.poll_next_unpin(cx) {
                Poll::Ready(Some(item)) => return Poll::Ready(Some(item)),
                Poll::Ready(None) => this.inner = None,
                Poll::Pending => return Poll::Pending,
            }
        }

        if this.source.is_none() && this.inner.is_none() {
            Poll::Ready(None)
        } else {
            Poll::Pending
        }
    }
}

/// A live subscription. Dropping it cancels delivery.
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the stream to run to completion.
    pub async fn join(mut self) {
        if let Err(e) = (&mut self.task).await {
            log::debug!("subscription task ended abnormally: {e}");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Drive `stream` on the runtime behind `handle`, handing every item to
/// `on_next`.
pub fn subscribe<S, F>(handle: &Handle, stream: S, mut on_next: F) -> Subscription
where
    S: Stream + Send + 'static,
    S::Item: Send,
    F: FnMut(S::Item) + Send + 'static,
{
    let task = handle.spawn(async move {
        let mut stream = std::pin::pin!(stream);
        while let Some(item) = stream.next().await {
            on_next(item);
        }
    });
    Subscription { task }
}
