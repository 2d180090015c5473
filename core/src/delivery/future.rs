//! Async delivery.
//!
//! # Design
//! The identity strategy: the pipeline already produces boxed futures, so
//! they are handed to the caller unchanged and `ApiError` arrives as `Err`.

use futures::future::BoxFuture;

use crate::delivery::{Delivery, TodosApi};
use crate::error::ApiError;
use crate::pipeline::Pipeline;

/// Async delivery: operations return boxed futures; failures are the `Err`
/// branch of the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Futures;

impl Delivery for Futures {
    type Fallible<T: Send + 'static> = BoxFuture<'static, Result<T, ApiError>>;
    type Infallible<T: Send + 'static> = BoxFuture<'static, T>;

    fn fallible<T: Send + 'static>(
        &self,
        work: BoxFuture<'static, Result<T, ApiError>>,
    ) -> Self::Fallible<T> {
        work
    }

    fn infallible<T: Send + 'static>(&self, work: BoxFuture<'static, T>) -> Self::Infallible<T> {
        work
    }
}

impl TodosApi<Futures> {
    pub fn futures(pipeline: Pipeline) -> Self {
        Self::new(pipeline, Futures)
    }
}
