//! Callback delivery.
//!
//! # Design
//! Every operation returns a `Callback<T>`: the work plus the runtime handle
//! it will be spawned on. Attaching a completion consumes the handle, so each
//! completion runs at most once and the caller's thread never blocks.
//! `call_with` keeps only a `Weak` to its owner; `IntoFuture` bridges the
//! result back into async code.

use std::future::IntoFuture;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::delivery::{Delivery, TodosApi};
use crate::error::ApiError;
use crate::pipeline::Pipeline;

/// Callback delivery: work is spawned on a tokio runtime and its result is
/// handed to a completion closure.
#[derive(Debug, Clone)]
pub struct Callbacks {
    handle: Handle,
}

impl Callbacks {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime of the calling context, if there is one.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Delivery for Callbacks {
    type Fallible<T: Send + 'static> = Callback<Result<T, ApiError>>;
    type Infallible<T: Send + 'static> = Callback<T>;

    fn fallible<T: Send + 'static>(
        &self,
        work: BoxFuture<'static, Result<T, ApiError>>,
    ) -> Self::Fallible<T> {
        Callback::new(self.handle.clone(), work)
    }

    fn infallible<T: Send + 'static>(&self, work: BoxFuture<'static, T>) -> Self::Infallible<T> {
        Callback::new(self.handle.clone(), work)
    }
}

impl TodosApi<Callbacks> {
    pub fn callbacks(pipeline: Pipeline, handle: Handle) -> Self {
        Self::new(pipeline, Callbacks::new(handle))
    }
}

/// Pending work that reports to exactly one completion.
///
/// Nothing runs until `call`, `call_with` or `wait` consumes the handle, and
/// each of them consumes it, so a completion cannot be registered twice.
#[must_use = "the request is not sent until a completion is attached"]
pub struct Callback<T> {
    handle: Handle,
    work: BoxFuture<'static, T>,
}

impl<T: Send + 'static> Callback<T> {
    fn new(handle: Handle, work: BoxFuture<'static, T>) -> Self {
        Self { handle, work }
    }

    /// Spawn the work; `completion` runs once with its result. The caller's
    /// thread is never blocked.
    pub fn call<F>(self, completion: F) -> JoinHandle<()>
    where
        F: FnOnce(T) + Send + 'static,
    {
        let work = self.work;
        self.handle.spawn(async move { completion(work.await) })
    }

    /// Like `call`, but only a weak reference to `owner` is kept. If the owner
    /// has been dropped by the time the work finishes, the completion is
    /// skipped.
    pub fn call_with<O, F>(self, owner: &Arc<O>, completion: F) -> JoinHandle<()>
    where
        O: Send + Sync + 'static,
        F: FnOnce(&O, T) + Send + 'static,
    {
        let owner = Arc::downgrade(owner);
        self.call(move |value| match owner.upgrade() {
            Some(owner) => completion(&*owner, value),
            None => log::debug!("completion owner released before the result arrived"),
        })
    }

    /// Bridge back into async code: resolves when the completion fires.
    /// `None` only if the runtime dropped the task before it finished.
    pub async fn wait(self) -> Option<T> {
        let (tx, rx) = oneshot::channel();
        self.call(move |value| {
            let _ = tx.send(value);
        });
        rx.await.ok()
    }
}

impl<T: Send + 'static> IntoFuture for Callback<T> {
    type Output = Option<T>;
    type IntoFuture = BoxFuture<'static, Option<T>>;

    /// Same as `wait`, so a `Callback` can be awaited directly.
    fn into_future(self) -> Self::IntoFuture {
        self.wait().boxed()
    }
}
