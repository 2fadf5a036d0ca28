//! Deferred values returned by the dispatcher

use std::collections::HashMap;
use std::fmt;
use std::future::IntoFuture;

use futures_util::future::{try_join_all, BoxFuture};
use tokio::sync::oneshot;

use crate::dispatcher::Dispatcher;
use crate::error::LoadError;
use crate::relation::LoadKey;

/// Handle to the eventual value of one load request
///
/// Awaiting the handle is the only suspension point of a load. On first
/// await it yields to the executor so sibling resolvers can enqueue their
/// keys, then flushes its relation unless another handle already did.
pub struct LoadHandle<T> {
    state: State<T>,
}

enum State<T> {
    Ready(T),
    Waiting {
        dispatcher: Dispatcher,
        relation: &'static str,
        receiver: oneshot::Receiver<Result<T, LoadError>>,
    },
}

impl<T: Send + 'static> LoadHandle<T> {
    pub(crate) fn ready(value: T) -> Self {
        Self {
            state: State::Ready(value),
        }
    }

    pub(crate) fn waiting(
        dispatcher: Dispatcher,
        relation: &'static str,
        receiver: oneshot::Receiver<Result<T, LoadError>>,
    ) -> Self {
        Self {
            state: State::Waiting {
                dispatcher,
                relation,
                receiver,
            },
        }
    }

    /// Whether the value is available without waiting for a flush
    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Wait for the value, flushing the relation if nobody has yet
    pub async fn value(self) -> Result<T, LoadError> {
        let (dispatcher, relation, mut receiver) = match self.state {
            State::Ready(value) => return Ok(value),
            State::Waiting {
                dispatcher,
                relation,
                receiver,
            } => (dispatcher, relation, receiver),
        };

        if let Ok(result) = receiver.try_recv() {
            return result;
        }

        tokio::task::yield_now().await;
        let delay = dispatcher.options().delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        dispatcher.flush_relation(relation).await;

        receiver
            .await
            .unwrap_or(Err(LoadError::Cancelled { relation }))
    }
}

impl<T: Send + 'static> IntoFuture for LoadHandle<T> {
    type Output = Result<T, LoadError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.value())
    }
}

impl<T> fmt::Debug for LoadHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Ready(_) => f.write_str("LoadHandle::Ready"),
            State::Waiting { relation, .. } => {
                f.debug_struct("LoadHandle::Waiting").field("relation", relation).finish()
            }
        }
    }
}

/// Handle to the values of several keys of one relation
pub struct LoadManyHandle<K, T> {
    handles: Vec<(K, LoadHandle<T>)>,
}

impl<K: LoadKey, T: Send + 'static> LoadManyHandle<K, T> {
    pub(crate) fn new(handles: Vec<(K, LoadHandle<T>)>) -> Self {
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every key; the first failure wins
    pub async fn value(self) -> Result<HashMap<K, T>, LoadError> {
        let (keys, handles): (Vec<K>, Vec<LoadHandle<T>>) = self.handles.into_iter().unzip();
        let values = try_join_all(handles.into_iter().map(LoadHandle::value)).await?;
        Ok(keys.into_iter().zip(values).collect())
    }
}

impl<K: fmt::Debug, T> fmt::Debug for LoadManyHandle<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handles.iter().map(|(key, _)| key))
            .finish()
    }
}

impl<K: LoadKey, T: Send + 'static> IntoFuture for LoadManyHandle<K, T> {
    type Output = Result<HashMap<K, T>, LoadError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.value())
    }
}
