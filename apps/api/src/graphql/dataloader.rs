//! Request-scoped batching loader
//!
//! A [`BatchLoader`] collects the keys requested by resolvers during one
//! scheduling turn and fetches them with a single call to its [`BatchFn`].
//! Every key it has seen stays in its cache for the loader's lifetime, so
//! a loader must never outlive the request it was built for.
//!
//! The batch window is explicit:
//! - [`BatchLoader::load`] and [`BatchLoader::load_many`] enqueue their keys
//!   immediately, before the returned future is first polled.
//! - [`BatchLoader::flush`] dispatches everything queued so far as one batch.
//! - An awaiting caller whose key is still queued yields to the scheduler
//!   once, so sibling resolvers get to enqueue their keys, and then flushes.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};

/// Fetches many values by key in one storage call
///
/// `keys` never contains duplicates. Keys missing from the returned map
/// resolve to `None` for their callers.
pub trait BatchFn<K>: Send + Sync + 'static
where
    K: Send + Sync + Hash + Eq + Clone + 'static,
{
    /// Type of value
    type Value: Send + Sync + Clone + 'static;

    /// Type of error
    type Error: Send + Sync + 'static;

    /// Load the values for `keys`
    fn load(
        &self,
        keys: &[K],
    ) -> impl Future<Output = Result<HashMap<K, Self::Value>, Self::Error>> + Send;
}

/// Fetches rows for a set of grouping keys, e.g. "posts whose author is any of"
///
/// Adapted into a [`BatchFn`] by [`Grouped`], which splits the rows per key
/// with [`GroupedBatchFn::group_key`].
pub trait GroupedBatchFn<K>: Send + Sync + 'static
where
    K: Send + Sync + Hash + Eq + Clone + 'static,
{
    /// Type of row
    type Row: Send + Sync + Clone + 'static;

    /// Type of error
    type Error: Send + Sync + 'static;

    /// Load every row whose grouping key is in `keys`
    fn load_rows(&self, keys: &[K])
        -> impl Future<Output = Result<Vec<Self::Row>, Self::Error>> + Send;

    /// Grouping key of a fetched row
    fn group_key(row: &Self::Row) -> K;
}

/// [`BatchFn`] adapter for grouping loaders
///
/// Every requested key maps to a `Vec`, empty when no row matched.
pub struct Grouped<G>(pub G);

impl<K, G> BatchFn<K> for Grouped<G>
where
    K: Send + Sync + Hash + Eq + Clone + 'static,
    G: GroupedBatchFn<K>,
{
    type Value = Vec<G::Row>;
    type Error = G::Error;

    async fn load(&self, keys: &[K]) -> Result<HashMap<K, Self::Value>, Self::Error> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = self.0.load_rows(keys).await?;
        Ok(group_rows(keys, rows, G::group_key))
    }
}

/// Group `rows` by `key_of`, making sure every key in `keys` has an entry
///
/// Rows keep their storage order inside a group. Rows whose key was not
/// requested are dropped.
pub fn group_rows<K, R>(keys: &[K], rows: Vec<R>, key_of: impl Fn(&R) -> K) -> HashMap<K, Vec<R>>
where
    K: Hash + Eq + Clone,
{
    let mut groups: HashMap<K, Vec<R>> = keys.iter().map(|k| (k.clone(), Vec::new())).collect();
    for row in rows {
        if let Some(group) = groups.get_mut(&key_of(&row)) {
            group.push(row);
        }
    }
    groups
}

type BatchOutcome<K, V, E> = Result<Arc<HashMap<K, V>>, Arc<E>>;
type InFlight<K, V, E> = Shared<BoxFuture<'static, BatchOutcome<K, V, E>>>;

enum Slot<K, V, E> {
    /// Waiting for the next flush
    Queued,
    /// Part of a batch that is being fetched
    Fetching(InFlight<K, V, E>),
    /// Fetched or primed; `None` when storage had no value for the key
    Ready(Option<V>),
    /// The batch containing this key failed
    Failed(Arc<E>),
}

struct LoaderState<K, V, E> {
    cache: HashMap<K, Slot<K, V, E>>,
    queue: Vec<K>,
}

impl<K, V, E> LoaderState<K, V, E>
where
    K: Hash + Eq + Clone,
{
    fn enqueue(&mut self, key: &K) {
        if !self.cache.contains_key(key) {
            self.cache.insert(key.clone(), Slot::Queued);
            self.queue.push(key.clone());
        }
    }
}

/// Deduplicating, caching batch loader for one entity kind
pub struct BatchLoader<K, F>
where
    K: Send + Sync + Hash + Eq + Clone + 'static,
    F: BatchFn<K>,
{
    fetcher: Arc<F>,
    state: Arc<Mutex<LoaderState<K, F::Value, F::Error>>>,
}

enum Next<K, V, E> {
    Done(Result<Option<V>, Arc<E>>),
    Wait(InFlight<K, V, E>),
    Flush,
}

impl<K, F> BatchLoader<K, F>
where
    K: Send + Sync + Hash + Eq + Clone + 'static,
    F: BatchFn<K>,
{
    /// Create an empty loader around a batch function
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            state: Arc::new(Mutex::new(LoaderState {
                cache: HashMap::new(),
                queue: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoaderState<K, F::Value, F::Error>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Request the value for `key`
    ///
    /// The key is enqueued right away; the returned future resolves once the
    /// batch containing it has been fetched. A key already seen by this
    /// loader is served from the cache without another fetch.
    pub fn load(
        &self,
        key: K,
    ) -> impl Future<Output = Result<Option<F::Value>, Arc<F::Error>>> + Send + '_ {
        self.lock().enqueue(&key);
        async move { self.resolve(&key).await }
    }

    /// Request the values for `keys`, keeping their order and duplicates
    ///
    /// All keys join the same batch. Fails if the batch for any of the keys
    /// failed.
    pub fn load_many(
        &self,
        keys: Vec<K>,
    ) -> impl Future<Output = Result<Vec<Option<F::Value>>, Arc<F::Error>>> + Send + '_ {
        {
            let mut state = self.lock();
            for key in &keys {
                state.enqueue(key);
            }
        }
        async move {
            let mut values = Vec::with_capacity(keys.len());
            for key in &keys {
                values.push(self.resolve(key).await?);
            }
            Ok(values)
        }
    }

    /// Seed the cache with a value obtained elsewhere
    ///
    /// A queued key is resolved and dropped from the queue. Keys that are
    /// being fetched or already settled are left alone.
    pub fn prime(&self, key: K, value: F::Value) {
        let mut state = self.lock();
        let queued = match state.cache.get(&key) {
            None => false,
            Some(Slot::Queued) => true,
            Some(_) => return,
        };
        if queued {
            state.queue.retain(|k| k != &key);
        }
        state.cache.insert(key, Slot::Ready(Some(value)));
    }

    /// Keys waiting for the next flush, in request order
    pub fn pending_keys(&self) -> Vec<K> {
        self.lock().queue.clone()
    }

    /// Dispatch every queued key as one batch and wait for it to settle
    ///
    /// Does nothing when the queue is empty.
    pub async fn flush(&self) {
        if let Some(batch) = self.dispatch() {
            let _ = batch.await;
        }
    }

    fn dispatch(&self) -> Option<InFlight<K, F::Value, F::Error>> {
        let mut state = self.lock();
        if state.queue.is_empty() {
            return None;
        }

        let keys = std::mem::take(&mut state.queue);
        let fetcher = Arc::clone(&self.fetcher);
        let shared_state = Arc::clone(&self.state);
        let batch_keys = keys.clone();

        let batch = async move {
            tracing::debug!(
                loader = std::any::type_name::<F>(),
                keys = batch_keys.len(),
                "Dispatching batch"
            );
            let outcome: BatchOutcome<K, F::Value, F::Error> = fetcher
                .load(&batch_keys)
                .await
                .map(Arc::new)
                .map_err(Arc::new);

            let mut state = shared_state.lock().unwrap_or_else(PoisonError::into_inner);
            for key in batch_keys {
                let settled = match &outcome {
                    Ok(values) => Slot::Ready(values.get(&key).cloned()),
                    Err(error) => Slot::Failed(Arc::clone(error)),
                };
                if let Some(slot) = state.cache.get_mut(&key) {
                    if matches!(slot, Slot::Fetching(_)) {
                        *slot = settled;
                    }
                }
            }
            if outcome.is_err() {
                tracing::debug!(loader = std::any::type_name::<F>(), "Batch failed");
            }
            outcome
        }
        .boxed()
        .shared();

        for key in keys {
            state.cache.insert(key, Slot::Fetching(batch.clone()));
        }
        Some(batch)
    }

    fn next_step(&self, key: &K) -> Next<K, F::Value, F::Error> {
        let mut state = self.lock();
        let next = match state.cache.get(key) {
            Some(Slot::Ready(value)) => Next::Done(Ok(value.clone())),
            Some(Slot::Failed(error)) => Next::Done(Err(Arc::clone(error))),
            Some(Slot::Fetching(batch)) => Next::Wait(batch.clone()),
            Some(Slot::Queued) | None => Next::Flush,
        };
        // no-op unless the key was never enqueued
        state.enqueue(key);
        next
    }

    async fn resolve(&self, key: &K) -> Result<Option<F::Value>, Arc<F::Error>> {
        let mut yielded = false;
        loop {
            match self.next_step(key) {
                Next::Done(result) => return result,
                Next::Wait(batch) => {
                    let _ = batch.await;
                }
                Next::Flush if !yielded => {
                    yielded = true;
                    tokio::task::yield_now().await;
                }
                Next::Flush => self.flush().await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};

    use rstest::rstest;

    /// Echoes `key * 10` for every key except those listed as missing
    #[derive(Clone, Default)]
    struct Recording {
        calls: Arc<Mutex<Vec<Vec<u32>>>>,
        missing: Vec<u32>,
        fail: Arc<AtomicBool>,
    }

    impl Recording {
        fn calls(&self) -> Vec<Vec<u32>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl BatchFn<u32> for Recording {
        type Value = u32;
        type Error = String;

        async fn load(&self, keys: &[u32]) -> Result<HashMap<u32, u32>, String> {
            self.calls.lock().unwrap().push(keys.to_vec());
            if self.fail.load(Ordering::SeqCst) {
                return Err("storage down".to_string());
            }
            // Return in reverse order to make sure callers don't rely on it
            Ok(keys
                .iter()
                .rev()
                .filter(|k| !self.missing.contains(k))
                .map(|k| (*k, k * 10))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_load_many_dedups_and_keeps_positions() {
        let fetcher = Recording::default();
        let loader: BatchLoader<u32, _> = BatchLoader::new(fetcher.clone());

        let values = loader.load_many(vec![1, 1, 2]).await.unwrap();

        assert_eq!(values, vec![Some(10), Some(10), Some(20)]);
        assert_eq!(fetcher.calls(), vec![vec![1, 2]]);
    }

    #[rstest]
    #[case(vec![1, 2, 3])]
    #[case(vec![3, 1, 2])]
    #[case(vec![2, 3, 1, 3])]
    #[tokio::test]
    async fn test_load_many_preserves_request_order(#[case] keys: Vec<u32>) {
        let loader: BatchLoader<u32, _> = BatchLoader::new(Recording::default());

        let values = loader.load_many(keys.clone()).await.unwrap();

        let expected: Vec<Option<u32>> = keys.iter().map(|k| Some(k * 10)).collect();
        assert_eq!(values, expected);
    }

    #[tokio::test]
    async fn test_missing_key_resolves_to_none() {
        let fetcher = Recording {
            missing: vec![2],
            ..Default::default()
        };
        let loader: BatchLoader<u32, _> = BatchLoader::new(fetcher);

        let values = loader.load_many(vec![1, 2, 3]).await.unwrap();

        assert_eq!(values, vec![Some(10), None, Some(30)]);
    }

    #[tokio::test]
    async fn test_cached_key_is_not_fetched_again() {
        let fetcher = Recording::default();
        let loader: BatchLoader<u32, _> = BatchLoader::new(fetcher.clone());

        assert_eq!(loader.load(7).await.unwrap(), Some(70));
        assert_eq!(loader.load(7).await.unwrap(), Some(70));

        assert_eq!(fetcher.calls(), vec![vec![7]]);
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_batch() {
        let fetcher = Recording::default();
        let loader: BatchLoader<u32, _> = BatchLoader::new(fetcher.clone());

        let (a, b, c) = tokio::join!(loader.load(1), loader.load(2), loader.load(1));

        assert_eq!(a.unwrap(), Some(10));
        assert_eq!(b.unwrap(), Some(20));
        assert_eq!(c.unwrap(), Some(10));
        assert_eq!(fetcher.calls(), vec![vec![1, 2]]);
    }

    #[tokio::test]
    async fn test_explicit_flush_dispatches_queue() {
        let fetcher = Recording::default();
        let loader: BatchLoader<u32, _> = BatchLoader::new(fetcher.clone());

        let first = loader.load(1);
        let second = loader.load(2);
        assert_eq!(loader.pending_keys(), vec![1, 2]);

        loader.flush().await;
        assert!(loader.pending_keys().is_empty());
        assert_eq!(fetcher.calls(), vec![vec![1, 2]]);

        assert_eq!(first.await.unwrap(), Some(10));
        assert_eq!(second.await.unwrap(), Some(20));
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_flush_with_empty_queue_is_noop() {
        let fetcher = Recording::default();
        let loader: BatchLoader<u32, _> = BatchLoader::new(fetcher.clone());

        loader.flush().await;

        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_prime_prevents_fetch() {
        let fetcher = Recording::default();
        let loader: BatchLoader<u32, _> = BatchLoader::new(fetcher.clone());

        loader.prime(5, 555);

        assert_eq!(loader.load(5).await.unwrap(), Some(555));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_prime_resolves_queued_key() {
        let fetcher = Recording::default();
        let loader: BatchLoader<u32, _> = BatchLoader::new(fetcher.clone());

        let pending = loader.load(5);
        loader.prime(5, 1);

        assert!(loader.pending_keys().is_empty());
        assert_eq!(pending.await.unwrap(), Some(1));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_prime_does_not_overwrite_settled_value() {
        let loader: BatchLoader<u32, _> = BatchLoader::new(Recording::default());

        assert_eq!(loader.load(3).await.unwrap(), Some(30));
        loader.prime(3, 0);

        assert_eq!(loader.load(3).await.unwrap(), Some(30));
    }

    #[tokio::test]
    async fn test_failed_batch_rejects_its_callers_only() {
        let fetcher = Recording::default();
        let loader: BatchLoader<u32, _> = BatchLoader::new(fetcher.clone());

        assert_eq!(loader.load(1).await.unwrap(), Some(10));

        fetcher.fail.store(true, Ordering::SeqCst);
        let (failed, cached) = tokio::join!(loader.load_many(vec![2, 3]), loader.load(1));

        assert_eq!(failed.unwrap_err().as_str(), "storage down");
        assert_eq!(cached.unwrap(), Some(10));
        assert_eq!(fetcher.calls(), vec![vec![1], vec![2, 3]]);
    }

    #[tokio::test]
    async fn test_separate_loaders_do_not_share_cache() {
        let fetcher = Recording::default();

        let first: BatchLoader<u32, _> = BatchLoader::new(fetcher.clone());
        assert_eq!(first.load(4).await.unwrap(), Some(40));

        let second: BatchLoader<u32, _> = BatchLoader::new(fetcher.clone());
        assert_eq!(second.load(4).await.unwrap(), Some(40));

        assert_eq!(fetcher.calls(), vec![vec![4], vec![4]]);
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        author: char,
        n: u32,
    }

    struct RowsByAuthor(Vec<Row>);

    impl GroupedBatchFn<char> for RowsByAuthor {
        type Row = Row;
        type Error = String;

        async fn load_rows(&self, keys: &[char]) -> Result<Vec<Row>, String> {
            Ok(self
                .0
                .iter()
                .filter(|r| keys.contains(&r.author))
                .cloned()
                .collect())
        }

        fn group_key(row: &Row) -> char {
            row.author
        }
    }

    #[tokio::test]
    async fn test_grouped_loader_fills_empty_groups() {
        let rows = vec![
            Row { author: 'A', n: 1 },
            Row { author: 'A', n: 2 },
            Row { author: 'B', n: 3 },
        ];
        let loader: BatchLoader<char, _> = BatchLoader::new(Grouped(RowsByAuthor(rows.clone())));

        let groups = loader.load_many(vec!['A', 'B', 'C']).await.unwrap();

        assert_eq!(
            groups,
            vec![
                Some(vec![rows[0].clone(), rows[1].clone()]),
                Some(vec![rows[2].clone()]),
                Some(vec![]),
            ]
        );
    }

    #[test]
    fn test_group_rows_drops_unrequested_keys() {
        let groups = group_rows(&[1, 2], vec![(1, 'a'), (3, 'b'), (1, 'c')], |r| r.0);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&1], vec![(1, 'a'), (1, 'c')]);
        assert!(groups[&2].is_empty());
    }
}
