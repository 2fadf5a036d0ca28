//! Recording batch function
//!
//! Uses `unwrap_or_else(|e| e.into_inner())` on its call log so one panicking
//! test cannot poison the recorder for the rest of the suite.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use brewery_relation_loader::{BatchError, BatchFn, LoadKey, RepositoryError};

/// Batch function serving a fixed map and recording each call's keys
///
/// Clones share the recorded calls, so keep one clone for assertions
/// and register the other.
pub struct RecordingBatch<K, V> {
    values: Arc<HashMap<K, V>>,
    calls: Arc<RwLock<Vec<Vec<K>>>>,
    failure: Option<String>,
    delay: Duration,
}

impl<K: LoadKey, V: Clone + Send + Sync + 'static> RecordingBatch<K, V> {
    /// Serve `values`; requested keys not in the map are left out of the result
    pub fn returning(values: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            values: Arc::new(values.into_iter().collect()),
            calls: Arc::new(RwLock::new(Vec::new())),
            failure: None,
            delay: Duration::ZERO,
        }
    }

    /// Fail every call with `RepositoryError::Unavailable(message)`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::returning([])
        }
    }

    /// Sleep before answering, to keep a batch in flight
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Key sets received so far, one entry per call
    pub fn calls(&self) -> Vec<Vec<K>> {
        self.calls.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl<K, V> Clone for RecordingBatch<K, V> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
            calls: Arc::clone(&self.calls),
            failure: self.failure.clone(),
            delay: self.delay,
        }
    }
}

#[async_trait]
impl<K, V> BatchFn<K, V> for RecordingBatch<K, V>
where
    K: LoadKey,
    V: Clone + Send + Sync + 'static,
{
    async fn load(&self, keys: &[K]) -> Result<HashMap<K, V>, BatchError> {
        self.calls
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(keys.to_vec());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(message) = &self.failure {
            return Err(RepositoryError::Unavailable(message.clone()).into());
        }

        Ok(keys
            .iter()
            .filter_map(|key| self.values.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }
}
