//! Facade composing the record store, the transition engine, and the
//! notification publisher. Callers (HTTP routes, the CLI, tests) only ever
//! talk to this type; the engine stays pure and the store stays dumb.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::identity::StaffIdentity;

use super::domain::{Application, ApplicationId, AuditAction};
use super::engine::{self, Transition, TransitionError};
use super::history::{self, TimelineEntry};
use super::notify::{Notification, NotificationPublisher, NotifyError};
use super::store::{ApplicationStore, StoreError, UpdateError};
use super::submission::{self, ReferenceAllocator, SubmissionError, SubmissionForm};

pub struct LicensingService<N> {
    store: Arc<ApplicationStore>,
    notifier: Arc<N>,
    references: ReferenceAllocator,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("application not found")]
    NotFound,
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl<N> LicensingService<N>
where
    N: NotificationPublisher,
{
    pub fn new(store: Arc<ApplicationStore>, notifier: Arc<N>) -> Self {
        Self {
            store,
            notifier,
            references: ReferenceAllocator::new(),
        }
    }

    pub fn store(&self) -> &Arc<ApplicationStore> {
        &self.store
    }

    /// Accept a request form: allocate identifiers, build the
    /// `pending_sectional` record, persist it, and signal the routed manager.
    pub fn submit(
        &self,
        form: SubmissionForm,
        submitted_on: NaiveDate,
    ) -> Result<Application, ServiceError> {
        let (id, reference_number) = self.references.allocate(submitted_on);
        let application = submission::build_application(form, id, reference_number, submitted_on)?;
        let stored = self.store.insert(application)?;
        self.notifier
            .publish(Notification::for_event(&stored, AuditAction::Submitted))?;
        Ok(stored)
    }

    /// Run one workflow transition. The engine applies under the store's
    /// commit serialization, so the read-modify-write is atomic per id; on
    /// any rejection the stored record is untouched.
    pub fn execute(
        &self,
        id: &ApplicationId,
        actor: &StaffIdentity,
        occurred_on: NaiveDate,
        transition: &Transition,
    ) -> Result<Application, ServiceError> {
        let mut committed_action: Option<AuditAction> = None;
        let updated = self
            .store
            .update(id, |current| {
                let next = engine::apply(current, actor, occurred_on, transition)?;
                // An idempotent replay appends nothing and must not re-signal.
                if next.events.len() > current.events.len() {
                    committed_action = next.events.last().map(|event| event.action);
                }
                Ok(next)
            })
            .map_err(|error| match error {
                UpdateError::NotFound(_) => ServiceError::NotFound,
                UpdateError::Rejected(rejection) => ServiceError::Transition(rejection),
            })?;

        if let Some(action) = committed_action {
            self.notifier
                .publish(Notification::for_event(&updated, action))?;
        }

        Ok(updated)
    }

    pub fn application(&self, id: &ApplicationId) -> Result<Application, ServiceError> {
        self.store.get(id).map_err(|_| ServiceError::NotFound)
    }

    /// Full record set in storage order.
    pub fn applications(&self) -> Vec<Application> {
        self.store.list()
    }

    /// Audit trail for one application.
    pub fn timeline(&self, id: &ApplicationId) -> Result<Vec<TimelineEntry>, ServiceError> {
        let application = self.application(id)?;
        Ok(history::timeline(&application))
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<Vec<Application>> {
        self.store.subscribe()
    }
}
