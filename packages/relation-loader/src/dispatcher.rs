//! Per-execution coalescing of relation loads
//!
//! A [`Dispatcher`] lives for exactly one query execution. Resolvers call
//! [`Dispatcher::load`] while the engine walks a resolution layer; the
//! requests pile up in a per-relation queue and the first handle that is
//! awaited flushes the whole queue with a single batch call.
//!
//! Flushing takes the queue out from under its lock before the batch runs,
//! so a load issued while a batch is in flight lands in a fresh queue and
//! is served by the next cycle.
//!
//! The batch runs inside the task that flushed it and answers every waiter
//! within a single poll, so resolvers sharing that task all observe the
//! results together and queue their own loads in the same layer.

use std::any::{type_name, Any};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::{join_all, BoxFuture};
use tokio::sync::oneshot;

use crate::error::{ConfigurationError, LoadError};
use crate::handle::{LoadHandle, LoadManyHandle};
use crate::registry::RelationRegistry;
use crate::relation::{BatchFn, Cardinality, LoadKey, Relation};

static NEXT_EXECUTION_ID: AtomicU64 = AtomicU64::new(1);

/// Tuning knobs for a dispatcher
#[derive(Debug, Clone)]
pub struct DispatcherOptions {
    /// Extra wait after the first yield before a handle flushes its relation
    pub delay: Duration,

    /// Memoise successful per-key results for the dispatcher's lifetime
    pub cache: bool,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            cache: true,
        }
    }
}

/// Batch counters for one dispatcher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    /// Number of batch calls per relation
    pub batches: HashMap<&'static str, usize>,
}

impl DispatcherStats {
    pub fn batches_for(&self, relation: &str) -> usize {
        self.batches.get(relation).copied().unwrap_or(0)
    }

    pub fn total_batches(&self) -> usize {
        self.batches.values().sum()
    }
}

type Reply<T> = oneshot::Sender<Result<T, LoadError>>;
type BatchJob = BoxFuture<'static, ()>;

struct Waiter<K, T> {
    key: K,
    reply: Reply<T>,
}

/// Type-erased view of a relation's queue
trait RelationQueue: Send + Sync {
    /// Drain the pending requests into a job that runs the batch once
    fn take_batch(&mut self) -> Option<BatchJob>;

    fn pending(&self) -> usize;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct RelationState<K: LoadKey, C: Cardinality> {
    relation: &'static str,
    execution_id: u64,
    batch_fn: Arc<dyn BatchFn<K, C::Item>>,
    pending: Vec<Waiter<K, C::Output>>,
    cache: Option<Arc<Mutex<HashMap<K, C::Output>>>>,
}

impl<K: LoadKey, C: Cardinality> RelationState<K, C> {
    fn new(
        relation: &'static str,
        execution_id: u64,
        batch_fn: Arc<dyn BatchFn<K, C::Item>>,
        cache: bool,
    ) -> Self {
        Self {
            relation,
            execution_id,
            batch_fn,
            pending: Vec::new(),
            cache: cache.then(|| Arc::new(Mutex::new(HashMap::new()))),
        }
    }

    fn cached(&self, key: &K) -> Option<C::Output> {
        let cache = self.cache.as_ref()?;
        lock(cache).get(key).cloned()
    }
}

impl<K: LoadKey, C: Cardinality> RelationQueue for RelationState<K, C> {
    fn take_batch(&mut self) -> Option<BatchJob> {
        if self.pending.is_empty() {
            return None;
        }

        let waiters = std::mem::take(&mut self.pending);
        let keys = unique_keys(&waiters);
        let batch_fn = Arc::clone(&self.batch_fn);
        let cache = self.cache.clone();
        let relation = self.relation;
        let execution_id = self.execution_id;

        Some(Box::pin(async move {
            tracing::debug!(
                execution_id,
                relation,
                keys = keys.len(),
                requests = waiters.len(),
                "Dispatching batch"
            );

            match batch_fn.load(&keys).await {
                Ok(values) => {
                    let missing = keys
                        .iter()
                        .filter(|key| !values.contains_key(key))
                        .count();
                    if missing > 0 {
                        tracing::debug!(
                            execution_id,
                            relation,
                            missing,
                            "Keys absent from batch result"
                        );
                    }

                    if let Some(cache) = &cache {
                        let mut cache = lock(cache);
                        for key in &keys {
                            cache.insert(key.clone(), C::resolve(values.get(key)));
                        }
                    }

                    for waiter in waiters {
                        // The resolver may have been dropped; nothing to deliver then.
                        let _ = waiter.reply.send(Ok(C::resolve(values.get(&waiter.key))));
                    }
                }
                Err(err) => {
                    tracing::warn!(execution_id, relation, error = %err, "Batch load failed");

                    let source: Arc<dyn std::error::Error + Send + Sync> = Arc::from(err);
                    for waiter in waiters {
                        let _ = waiter.reply.send(Err(LoadError::Batch {
                            relation,
                            source: Arc::clone(&source),
                        }));
                    }
                }
            }
        }))
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A batch driven by the task that flushed it
///
/// Dropping it mid-batch (the flushing resolver was cancelled) hands the
/// remainder to the runtime so the other waiters are still answered.
struct InlineBatch {
    execution_id: u64,
    relation: &'static str,
    job: Option<BatchJob>,
}

impl Future for InlineBatch {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let Some(job) = self.job.as_mut() else {
            return Poll::Ready(());
        };

        match panic::catch_unwind(AssertUnwindSafe(|| job.as_mut().poll(cx))) {
            Ok(Poll::Pending) => Poll::Pending,
            Ok(Poll::Ready(())) => {
                self.job = None;
                Poll::Ready(())
            }
            Err(_) => {
                // Unwinding dropped the reply senders; waiters see `Cancelled`.
                tracing::error!(
                    execution_id = self.execution_id,
                    relation = self.relation,
                    "Batch function panicked"
                );
                self.job = None;
                Poll::Ready(())
            }
        }
    }
}

impl Drop for InlineBatch {
    fn drop(&mut self) {
        let Some(job) = self.job.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                tracing::debug!(
                    execution_id = self.execution_id,
                    relation = self.relation,
                    "Flushing resolver dropped, finishing batch in the background"
                );
                runtime.spawn(job);
            }
            Err(_) => tracing::warn!(
                execution_id = self.execution_id,
                relation = self.relation,
                "No runtime to finish batch, waiters are cancelled"
            ),
        }
    }
}

/// Deduplicate keys, keeping first-seen order
fn unique_keys<K: LoadKey, T>(waiters: &[Waiter<K, T>]) -> Vec<K> {
    let mut seen = HashSet::with_capacity(waiters.len());
    waiters
        .iter()
        .filter(|waiter| seen.insert(&waiter.key))
        .map(|waiter| waiter.key.clone())
        .collect()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Inner {
    execution_id: u64,
    registry: Arc<RelationRegistry>,
    options: DispatcherOptions,
    queues: DashMap<&'static str, Box<dyn RelationQueue>>,
    batches: DashMap<&'static str, usize>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let abandoned: usize = self.queues.iter().map(|queue| queue.pending()).sum();
        if abandoned > 0 {
            tracing::debug!(
                execution_id = self.execution_id,
                abandoned,
                "Dispatcher discarded with pending loads"
            );
        }
    }
}

/// Per-execution batching engine
///
/// Cloning is cheap and every clone shares the same queues, so the
/// dispatcher can be handed to each resolver of one execution. Create a
/// new one for every execution; nothing is shared between instances.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    pub fn new(registry: Arc<RelationRegistry>, options: DispatcherOptions) -> Self {
        let execution_id = NEXT_EXECUTION_ID.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(execution_id, "Dispatcher created");

        Self {
            inner: Arc::new(Inner {
                execution_id,
                registry,
                options,
                queues: DashMap::new(),
                batches: DashMap::new(),
            }),
        }
    }

    pub fn execution_id(&self) -> u64 {
        self.inner.execution_id
    }

    pub fn options(&self) -> &DispatcherOptions {
        &self.inner.options
    }

    pub fn registry(&self) -> &RelationRegistry {
        &self.inner.registry
    }

    /// Request the value of `relation` for `key`
    ///
    /// The request is queued immediately; the returned handle resolves once
    /// the relation's queue has been flushed. Unregistered relations and
    /// shape mismatches fail here rather than at await time.
    pub fn load<K, C>(
        &self,
        relation: &Relation<K, C>,
        key: K,
    ) -> Result<LoadHandle<C::Output>, LoadError>
    where
        K: LoadKey,
        C: Cardinality,
    {
        let spec = self.inner.registry.spec(relation)?;
        let name = spec.name();
        let execution_id = self.inner.execution_id;

        let mut queue = self.inner.queues.entry(name).or_insert_with(|| {
            Box::new(RelationState::<K, C>::new(
                name,
                execution_id,
                Arc::clone(&spec.batch_fn),
                self.inner.options.cache,
            )) as Box<dyn RelationQueue>
        });
        let state = queue
            .as_any_mut()
            .downcast_mut::<RelationState<K, C>>()
            .ok_or(ConfigurationError::TypeMismatch {
                name,
                expected: type_name::<C::Output>(),
                registered: "a differently typed queue",
            })?;

        if let Some(value) = state.cached(&key) {
            tracing::trace!(
                execution_id,
                relation = name,
                key = ?key,
                "Served from execution cache"
            );
            return Ok(LoadHandle::ready(value));
        }

        let (reply, receiver) = oneshot::channel();
        state.pending.push(Waiter { key, reply });
        drop(queue);

        Ok(LoadHandle::waiting(self.clone(), name, receiver))
    }

    /// Request the value of `relation` for every key in `keys`
    ///
    /// Equivalent to one [`Dispatcher::load`] per key; the handle resolves
    /// to a map from key to value.
    pub fn load_many<K, C, I>(
        &self,
        relation: &Relation<K, C>,
        keys: I,
    ) -> Result<LoadManyHandle<K, C::Output>, LoadError>
    where
        K: LoadKey,
        C: Cardinality,
        I: IntoIterator<Item = K>,
    {
        self.inner.registry.spec(relation)?;

        let handles = keys
            .into_iter()
            .map(|key| Ok((key.clone(), self.load(relation, key)?)))
            .collect::<Result<Vec<_>, LoadError>>()?;

        Ok(LoadManyHandle::new(handles))
    }

    /// Flush the pending queue of one relation and wait for its batch
    pub async fn flush<K, C>(&self, relation: &Relation<K, C>)
    where
        K: LoadKey,
        C: Cardinality,
    {
        self.flush_relation(relation.name()).await;
    }

    /// Flush every relation with pending requests
    ///
    /// For engines that flush at fixed checkpoints such as the end of a
    /// resolution level.
    pub async fn flush_all(&self) {
        let relations: Vec<&'static str> = self
            .inner
            .queues
            .iter()
            .map(|entry| *entry.key())
            .collect();
        join_all(
            relations
                .into_iter()
                .map(|relation| self.flush_relation(relation)),
        )
        .await;
    }

    pub(crate) async fn flush_relation(&self, relation: &'static str) {
        let job = self
            .inner
            .queues
            .get_mut(relation)
            .and_then(|mut queue| queue.take_batch());
        let Some(job) = job else {
            return;
        };

        *self.inner.batches.entry(relation).or_insert(0) += 1;

        InlineBatch {
            execution_id: self.inner.execution_id,
            relation,
            job: Some(job),
        }
        .await;
    }

    /// Number of requests waiting for the next flush of `relation`
    pub fn pending(&self, relation: &str) -> usize {
        self.inner
            .queues
            .get(relation)
            .map(|queue| queue.pending())
            .unwrap_or(0)
    }

    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            batches: self
                .inner
                .batches
                .iter()
                .map(|entry| (*entry.key(), *entry.value()))
                .collect(),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("execution_id", &self.inner.execution_id)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}
