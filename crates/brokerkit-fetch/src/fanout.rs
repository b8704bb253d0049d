//! Per-symbol fan-out with partial-failure aggregation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use brokerkit_types::Cancelled;
use futures::future::{self, Either, Future};
use futures::stream::{self, StreamExt};

/// Default number of calls in flight for concurrent fan-out.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Per-key outcomes of a fan-out.
///
/// Every requested key lands in exactly one of the two maps.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult<K: Ord, V, E> {
    /// Keys whose call succeeded.
    pub ok: BTreeMap<K, V>,
    /// Keys whose call failed, with the error.
    pub failed: BTreeMap<K, E>,
}

impl<K: Ord, V, E> Default for BatchResult<K, V, E> {
    fn default() -> Self {
        Self {
            ok: BTreeMap::new(),
            failed: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V, E> BatchResult<K, V, E> {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one outcome, replacing any earlier outcome for the key.
    pub fn record(&mut self, key: K, result: Result<V, E>) {
        match result {
            Ok(value) => {
                self.failed.remove(&key);
                self.ok.insert(key, value);
            }
            Err(err) => {
                self.ok.remove(&key);
                self.failed.insert(key, err);
            }
        }
    }

    /// Returns the number of keys recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ok.len() + self.failed.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ok.is_empty() && self.failed.is_empty()
    }

    /// Returns true if no key failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Returns the outcome for a key.
    pub fn get<Q>(&self, key: &Q) -> Option<Result<&V, &E>>
    where
        K: std::borrow::Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.ok
            .get(key)
            .map(Ok)
            .or_else(|| self.failed.get(key).map(Err))
    }

    /// Iterates every recorded key in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        let mut keys: Vec<&K> = self.ok.keys().chain(self.failed.keys()).collect();
        keys.sort();
        keys.into_iter()
    }

    /// Transforms the successful values, keeping failures.
    pub fn map_ok<U>(self, mut f: impl FnMut(V) -> U) -> BatchResult<K, U, E> {
        BatchResult {
            ok: self.ok.into_iter().map(|(k, v)| (k, f(v))).collect(),
            failed: self.failed,
        }
    }

    /// Splits into the success and failure maps.
    #[must_use]
    pub fn into_parts(self) -> (BTreeMap<K, V>, BTreeMap<K, E>) {
        (self.ok, self.failed)
    }
}

/// Shared flag that stops a concurrent fan-out from issuing new calls.
///
/// Calls already in flight run to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once the flag is set.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Distinct symbols in first-seen order.
pub fn distinct_symbols<I, S>(symbols: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    symbols
        .into_iter()
        .filter_map(|s| {
            let s = s.as_ref();
            seen.insert(s.to_string()).then(|| s.to_string())
        })
        .collect()
}

/// Invokes `op` once per distinct symbol and partitions the outcomes.
///
/// One symbol's failure never stops the others, and nothing is retried.
pub fn fan_out<I, S, T, E, F>(symbols: I, mut op: F) -> BatchResult<String, T, E>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(&str) -> Result<T, E>,
    E: Display,
{
    let symbols = distinct_symbols(symbols);
    tracing::debug!(symbols = symbols.len(), "fan-out started");

    let mut batch = BatchResult::new();
    for symbol in symbols {
        let result = op(&symbol);
        if let Err(err) = &result {
            tracing::warn!(%symbol, error = %err, "fan-out call failed");
        }
        batch.record(symbol, result);
    }

    tracing::debug!(ok = batch.ok.len(), failed = batch.failed.len(), "fan-out finished");
    batch
}

/// Runs `op` for every distinct symbol with at most `concurrency` calls in
/// flight.
///
/// Outcomes are gathered in the consuming loop, so the maps are only touched
/// from one place. Once `cancel` is set no further calls are issued; the
/// symbols left over are recorded as failed with [`Cancelled`].
pub async fn fan_out_concurrent<I, S, T, E, F, Fut>(
    symbols: I,
    concurrency: usize,
    cancel: &CancellationFlag,
    mut op: F,
) -> BatchResult<String, T, E>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<Cancelled> + Display,
{
    let symbols = distinct_symbols(symbols);
    tracing::debug!(symbols = symbols.len(), concurrency, "concurrent fan-out started");

    let outcomes = stream::iter(symbols)
        .map(|symbol| {
            if cancel.is_cancelled() {
                Either::Left(future::ready((symbol, Err(E::from(Cancelled)))))
            } else {
                let call = op(symbol.clone());
                Either::Right(async move { (symbol, call.await) })
            }
        })
        .buffer_unordered(concurrency.max(1));
    let mut outcomes = std::pin::pin!(outcomes);

    let mut batch = BatchResult::new();
    while let Some((symbol, result)) = outcomes.next().await {
        if let Err(err) = &result {
            tracing::warn!(%symbol, error = %err, "fan-out call failed");
        }
        batch.record(symbol, result);
    }

    tracing::debug!(ok = batch.ok.len(), failed = batch.failed.len(), "concurrent fan-out finished");
    batch
}

/// Concurrent fan-out of a synchronous operation on the blocking thread pool.
///
/// Suits blocking [`crate::RawClient`] implementations called from async
/// code. A panic inside `op` is resumed on the caller.
pub async fn fan_out_blocking<I, S, T, E, F>(
    symbols: I,
    concurrency: usize,
    cancel: &CancellationFlag,
    op: Arc<F>,
) -> BatchResult<String, T, E>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    T: Send + 'static,
    E: From<Cancelled> + Display + Send + 'static,
{
    fan_out_concurrent(symbols, concurrency, cancel, |symbol| {
        let op = Arc::clone(&op);
        async move {
            match tokio::task::spawn_blocking(move || op(&symbol)).await {
                Ok(result) => result,
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(_) => Err(E::from(Cancelled)),
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokerkit_types::BrokerError;
    use std::sync::Mutex;
    use std::time::Duration;

    fn fail_on_b(symbol: &str) -> Result<usize, BrokerError> {
        if symbol == "B" {
            Err(BrokerError::no_data(symbol))
        } else {
            Ok(symbol.len())
        }
    }

    #[test]
    fn test_partitions_success_and_failure() {
        let batch = fan_out(["A", "B", "C"], fail_on_b);
        assert_eq!(batch.ok.keys().collect::<Vec<_>>(), vec!["A", "C"]);
        assert_eq!(batch.failed.keys().collect::<Vec<_>>(), vec!["B"]);
        assert_eq!(batch.len(), 3);
        assert!(!batch.is_complete());
        assert!(matches!(batch.get("B"), Some(Err(BrokerError::NoData { .. }))));
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut calls = Vec::new();
        let batch = fan_out(["A", "B", "A", "A"], |s| {
            calls.push(s.to_string());
            Ok::<_, BrokerError>(())
        });
        assert_eq!(calls, vec!["A", "B"]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_distinct_symbols_keeps_first_seen_order() {
        assert_eq!(distinct_symbols(["C", "A", "C", "B", "A"]), vec!["C", "A", "B"]);
        assert!(distinct_symbols(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn test_empty_input() {
        let batch = fan_out(Vec::<String>::new(), fail_on_b);
        assert!(batch.is_empty());
        assert!(batch.is_complete());
    }

    #[test]
    fn test_map_ok_keeps_failures() {
        let batch = fan_out(["A", "B"], fail_on_b).map_ok(|n| n * 10);
        let (ok, failed) = batch.into_parts();
        assert_eq!(ok["A"], 10);
        assert!(failed.contains_key("B"));
    }

    #[tokio::test]
    async fn test_concurrent_partition_with_scrambled_completion() {
        let symbols = ["A", "B", "C", "D", "E"];
        let cancel = CancellationFlag::new();
        let batch = fan_out_concurrent(symbols, 3, &cancel, |symbol| async move {
            let delay = 5 * (5 - symbol.as_bytes()[0].saturating_sub(b'A')) as u64;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            fail_on_b(&symbol)
        })
        .await;
        assert_eq!(batch.ok.len(), 4);
        assert_eq!(batch.failed.keys().collect::<Vec<_>>(), vec!["B"]);
    }

    #[tokio::test]
    async fn test_cancel_stops_issuing() {
        let cancel = CancellationFlag::new();
        let issued = Mutex::new(Vec::new());
        let batch = fan_out_concurrent(["A", "B", "C"], 1, &cancel, |symbol| {
            issued.lock().unwrap().push(symbol.clone());
            cancel.cancel();
            async move { Ok::<_, BrokerError>(symbol) }
        })
        .await;
        assert_eq!(*issued.lock().unwrap(), vec!["A"]);
        assert_eq!(batch.ok.len(), 1);
        assert_eq!(batch.failed.len(), 2);
        assert!(batch.failed.values().all(|e| *e == BrokerError::Cancelled(Cancelled)));
    }

    #[tokio::test]
    async fn test_blocking_fan_out() {
        let cancel = CancellationFlag::new();
        let batch = fan_out_blocking(["A", "B", "C"], 2, &cancel, Arc::new(fail_on_b)).await;
        assert_eq!(batch.ok.len(), 2);
        assert_eq!(batch.failed.len(), 1);
    }
}
