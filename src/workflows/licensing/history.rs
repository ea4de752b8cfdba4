//! Audit timeline for a single application.
//!
//! The timeline renders straight from the record's append-only event log.
//! Each event's wording is fixed at the moment it was recorded, so a later
//! transition can never rewrite what an earlier entry means.

use chrono::NaiveDate;
use serde::Serialize;

use crate::identity::StaffRole;

use super::domain::{Application, AuditAction, AuditEvent};

/// One rendered line of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub actor: String,
    pub role: StaffRole,
    pub role_label: &'static str,
    pub staff_number: String,
    pub occurred_on: NaiveDate,
    pub message: String,
}

/// Ordered audit trail for `application`: ascending by date, ties broken by
/// stage order (submission, sectional, safety, training, medical), then by
/// the order events were recorded.
pub fn timeline(application: &Application) -> Vec<TimelineEntry> {
    let mut indexed: Vec<(usize, &AuditEvent)> = application.events.iter().enumerate().collect();
    indexed.sort_by_key(|(index, event)| (event.occurred_on, stage_rank(event.action), *index));

    indexed
        .into_iter()
        .map(|(_, event)| TimelineEntry {
            actor: event.actor.name.clone(),
            role: event.actor.role,
            role_label: event.actor.role.label(),
            staff_number: event.actor.staff_number.clone(),
            occurred_on: event.occurred_on,
            message: message_for(event),
        })
        .collect()
}

/// Stage position of an action, for same-day ordering.
fn stage_rank(action: AuditAction) -> u8 {
    match action {
        AuditAction::Submitted => 0,
        AuditAction::CategoriesUpdated
        | AuditAction::SectionalApproved
        | AuditAction::SectionalRejected => 1,
        AuditAction::AttachmentsAccepted | AuditAction::SafetyRejected => 2,
        AuditAction::OrientationAssigned
        | AuditAction::OrientationMarkedCompleted
        | AuditAction::OrientationMarkedNotCompleted
        | AuditAction::PracticalAssigned
        | AuditAction::PracticalMarkedCompleted
        | AuditAction::PracticalMarkedNotCompleted => 3,
        AuditAction::ReferredForMedical
        | AuditAction::MedicalRecorded
        | AuditAction::MedicalApproved
        | AuditAction::LicenseIssued => 4,
    }
}

fn message_for(event: &AuditEvent) -> String {
    let base = match event.action {
        AuditAction::Submitted => "Request sent",
        AuditAction::CategoriesUpdated => "Updated requested categories",
        AuditAction::SectionalApproved => "Accepted request",
        AuditAction::SectionalRejected => "Rejected request",
        AuditAction::AttachmentsAccepted => "Validated attachments",
        AuditAction::SafetyRejected => "Rejected request",
        AuditAction::OrientationAssigned => "Scheduled classroom orientation",
        AuditAction::OrientationMarkedCompleted => "Marked orientation completed",
        AuditAction::OrientationMarkedNotCompleted => "Recorded orientation as not completed",
        AuditAction::PracticalAssigned => "Scheduled practical test",
        AuditAction::PracticalMarkedCompleted => "Marked practical test completed",
        AuditAction::PracticalMarkedNotCompleted => "Recorded practical test as not completed",
        AuditAction::ReferredForMedical => "Forwarded to medical unit",
        AuditAction::MedicalRecorded => "Recorded medical examination",
        AuditAction::MedicalApproved => "Approved medical fitness",
        AuditAction::LicenseIssued => "Issued operating license",
    };

    match &event.note {
        Some(note) => format!("{base} - {note}"),
        None => base.to_string(),
    }
}
