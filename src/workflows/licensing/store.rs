//! Owned, in-memory record store for license applications.
//!
//! The store is constructed once at startup and injected wherever records
//! are needed; there are no ambient singletons. Every commit runs under a
//! single writer section: an update's read-modify-write can never interleave
//! with another writer on the same id, and readers only ever observe the
//! prior record or the fully mutated one. After each commit the full record
//! set is re-broadcast through a `watch` channel, so subscribers always hold
//! a consistent snapshot of committed state.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tokio::sync::watch;

use super::domain::{Application, ApplicationId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error("application {0} already exists")]
    Conflict(ApplicationId),
}

/// Failure of a conditional update: either the id is unknown, or the caller's
/// mutator rejected the current record (in which case nothing was written).
#[derive(Debug, thiserror::Error)]
pub enum UpdateError<E>
where
    E: std::error::Error,
{
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error(transparent)]
    Rejected(E),
}

#[derive(Default)]
struct StoreInner {
    /// Insertion order; `list` never re-sorts.
    order: Vec<ApplicationId>,
    records: HashMap<ApplicationId, Application>,
}

impl StoreInner {
    fn snapshot(&self) -> Vec<Application> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .cloned()
            .collect()
    }
}

pub struct ApplicationStore {
    inner: RwLock<StoreInner>,
    changes: watch::Sender<Vec<Application>>,
}

impl Default for ApplicationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationStore {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            inner: RwLock::new(StoreInner::default()),
            changes,
        }
    }

    /// Add a freshly submitted application. Duplicate ids are a conflict.
    pub fn insert(&self, application: Application) -> Result<Application, StoreError> {
        let snapshot = {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            if inner.records.contains_key(&application.id) {
                return Err(StoreError::Conflict(application.id.clone()));
            }
            inner.order.push(application.id.clone());
            inner
                .records
                .insert(application.id.clone(), application.clone());
            inner.snapshot()
        };
        self.changes.send_replace(snapshot);
        Ok(application)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<Application, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Atomically replace the record at `id` with the result of `mutate`.
    ///
    /// The mutator runs under the commit lock, so it sees the latest
    /// committed record and its result lands unbroken; when it returns an
    /// error nothing is written and the prior record stays visible.
    pub fn update<E>(
        &self,
        id: &ApplicationId,
        mutate: impl FnOnce(&Application) -> Result<Application, E>,
    ) -> Result<Application, UpdateError<E>>
    where
        E: std::error::Error,
    {
        let (updated, snapshot) = {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            let current = inner
                .records
                .get(id)
                .ok_or_else(|| UpdateError::NotFound(id.clone()))?;
            let updated = mutate(current).map_err(UpdateError::Rejected)?;
            inner.records.insert(id.clone(), updated.clone());
            (updated, inner.snapshot())
        };
        self.changes.send_replace(snapshot);
        Ok(updated)
    }

    /// All applications in storage (insertion) order.
    pub fn list(&self) -> Vec<Application> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receiver that always holds the latest committed record set.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Application>> {
        self.changes.subscribe()
    }
}
