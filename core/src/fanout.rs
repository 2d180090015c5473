//! Fan-out over a set of ids: one concurrent call per id, results combined
//! at a single aggregation point.
//!
//! # Design
//! Calls run inside a `FuturesUnordered`, so the only place that sees more
//! than one result is the loop polling it. `FailFast` returns the first
//! failure observed and drops the set, which cancels the siblings still in
//! flight. `BestEffort` logs and discards failures.
//!
//! An empty id set never invokes the operation.

use std::future::{ready, Future};

use futures::future::{join_all, try_join_all};
use futures::stream::{FuturesUnordered, Stream, StreamExt};

use crate::error::ApiError;

/// How a batch reacts to a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// The first failure becomes the result of the whole batch.
    FailFast,
    /// Failures are dropped; only successes are returned.
    BestEffort,
}

/// Collect-all in completion order.
pub async fn run_many<I, F, Fut, T>(ids: I, mut op: F, policy: Policy) -> Result<Vec<T>, ApiError>
where
    I: IntoIterator<Item = i64>,
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut pending: FuturesUnordered<_> = ids
        .into_iter()
        .map(|id| {
            let call = op(id);
            async move { (id, call.await) }
        })
        .collect();

    let mut results = Vec::with_capacity(pending.len());
    while let Some((id, result)) = pending.next().await {
        match result {
            Ok(value) => results.push(value),
            Err(err) if policy == Policy::FailFast => {
                log::debug!("call for id {id} failed, aborting batch: {err}");
                return Err(err);
            }
            Err(err) => log::warn!("dropping failed call for id {id}: {err}"),
        }
    }
    Ok(results)
}

/// Collect-all in input order.
///
/// Under `FailFast` the first failure observed fails the batch at once and
/// the calls still in flight are dropped.
pub async fn run_many_ordered<I, F, Fut, T>(
    ids: I,
    op: F,
    policy: Policy,
) -> Result<Vec<T>, ApiError>
where
    I: IntoIterator<Item = i64>,
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let calls = ids.into_iter().map(op);
    match policy {
        Policy::FailFast => try_join_all(calls)
            .await
            .inspect_err(|err| log::debug!("ordered batch aborted: {err}")),
        Policy::BestEffort => Ok(join_all(calls)
            .await
            .into_iter()
            .filter_map(|result| {
                result
                    .inspect_err(|err| log::warn!("dropping failed call: {err}"))
                    .ok()
            })
            .collect()),
    }
}

/// Merge-as-available: each result is yielded as soon as its call resolves.
///
/// `BestEffort` yields only `Ok` items. `FailFast` yields successes until the
/// first failure, yields that failure, then ends.
pub fn merge_as_available<I, F, Fut, T>(
    ids: I,
    op: F,
    policy: Policy,
) -> impl Stream<Item = Result<T, ApiError>>
where
    I: IntoIterator<Item = i64>,
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    ids.into_iter()
        .map(op)
        .collect::<FuturesUnordered<_>>()
        .filter_map(move |result| {
            ready(match result {
                Err(err) if policy == Policy::BestEffort => {
                    log::warn!("dropping failed call: {err}");
                    None
                }
                other => Some(other),
            })
        })
        .scan(false, |failed, item| {
            if *failed {
                return ready(None);
            }
            *failed = item.is_err();
            ready(Some(item))
        })
}
