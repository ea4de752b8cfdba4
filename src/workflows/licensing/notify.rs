//! Notification collaborator boundary.
//!
//! The core raises one abstract signal per committed transition; actual
//! e-mail/SMS delivery belongs to an external adapter behind
//! [`NotificationPublisher`].

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use super::domain::{Application, ApplicationId, AuditAction};

/// Who a notification should reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Applicant,
    SectionalManager,
    SafetyManager,
    Trainer,
    MedicalUnit,
}

/// Abstract "notify X of event Y" payload emitted after each transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub event: AuditAction,
    pub application_id: ApplicationId,
    pub reference_number: String,
    pub audiences: Vec<Audience>,
    pub details: BTreeMap<String, String>,
}

impl Notification {
    /// Build the signal for a transition that just committed.
    pub fn for_event(application: &Application, event: AuditAction) -> Self {
        let mut details = BTreeMap::new();
        details.insert(
            "applicant".to_string(),
            application.applicant.name.clone(),
        );
        details.insert("status".to_string(), application.status.label().to_string());

        Self {
            event,
            application_id: application.id.clone(),
            reference_number: application.reference_number.clone(),
            audiences: audiences_for(event),
            details,
        }
    }
}

fn audiences_for(event: AuditAction) -> Vec<Audience> {
    match event {
        AuditAction::Submitted => vec![Audience::SectionalManager],
        AuditAction::SectionalApproved => vec![Audience::Applicant, Audience::SafetyManager],
        AuditAction::CategoriesUpdated
        | AuditAction::SectionalRejected
        | AuditAction::AttachmentsAccepted
        | AuditAction::SafetyRejected
        | AuditAction::OrientationMarkedCompleted
        | AuditAction::OrientationMarkedNotCompleted
        | AuditAction::PracticalMarkedCompleted
        | AuditAction::PracticalMarkedNotCompleted
        | AuditAction::LicenseIssued => vec![Audience::Applicant],
        AuditAction::OrientationAssigned | AuditAction::PracticalAssigned => {
            vec![Audience::Applicant, Audience::Trainer]
        }
        AuditAction::ReferredForMedical
        | AuditAction::MedicalRecorded
        | AuditAction::MedicalApproved => vec![Audience::Applicant, Audience::MedicalUnit],
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Outbound notification hook implemented by delivery adapters.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Default adapter: records the signal in the service log and nothing else.
/// Stands in wherever real delivery is not wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationPublisher for TracingNotifier {
    fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        info!(
            reference = %notification.reference_number,
            event = ?notification.event,
            audiences = ?notification.audiences,
            "notification raised"
        );
        Ok(())
    }
}
