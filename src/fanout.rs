//! Bounded concurrent resolution that preserves input order.
//!
//! Both ledger enumeration and content resolution fan out one request per key
//! and must return results in key order no matter which response lands first.
//! Results are written into a pre-sized slot vector by input position; nothing
//! is appended in arrival order.

use futures::stream::{self, StreamExt};
use std::future::Future;

/// Default cap on in-flight requests per fan-out.
pub const DEFAULT_FANOUT_LIMIT: usize = 16;

/// Resolve every key with `resolve`, at most `limit` at a time.
///
/// The output has one element per input key, in input order. `limit` of zero is
/// treated as one.
pub async fn resolve_ordered<K, T, F, Fut>(keys: Vec<K>, limit: usize, resolve: F) -> Vec<T>
where
    F: Fn(K) -> Fut,
    Fut: Future<Output = T>,
{
    let total = keys.len();
    let mut slots: Vec<Option<T>> = Vec::with_capacity(total);
    slots.resize_with(total, || None);

    let mut in_flight = stream::iter(keys.into_iter().enumerate())
        .map(|(position, key)| {
            let pending = resolve(key);
            async move { (position, pending.await) }
        })
        .buffer_unordered(limit.max(1));

    while let Some((position, value)) = in_flight.next().await {
        slots[position] = Some(value);
    }

    // Every position is filled once the stream is drained.
    slots.into_iter().flatten().collect()
}
