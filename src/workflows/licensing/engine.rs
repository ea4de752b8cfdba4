//! Pure transition logic for the licensing workflow.
//!
//! [`apply`] takes the current record, the caller's identity, and a requested
//! transition, and returns either a fully updated copy of the record or a
//! typed rejection. It never mutates in place and never performs I/O, so a
//! failed call provably leaves the stored record untouched.
//!
//! Role and source-status guards live in one capability table rather than in
//! each transition, so the guard policy cannot drift between operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::identity::{StaffIdentity, StaffRole};

use super::catalog;
use super::domain::{
    ActorStamp, Application, ApplicationStatus, AuditAction, AuditEvent, Orientation,
    OrientationSession, Practical, PracticalSession, StageStamp,
};

/// A requested state change with its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Transition {
    /// Sectional manager amends the requested category set without deciding.
    UpdateCategories {
        categories: Vec<String>,
        #[serde(default)]
        remarks: Option<String>,
    },
    /// Sectional manager accepts the request. `categories` omitted means
    /// "whatever stands" (the amended set, or the applicant's selection).
    ApproveSectional {
        #[serde(default)]
        categories: Option<Vec<String>>,
        #[serde(default)]
        remarks: Option<String>,
    },
    RejectSectional {
        reason: String,
    },
    /// Safety manager validates the uploaded documents.
    AcceptAttachments {
        #[serde(default)]
        remarks: Option<String>,
    },
    RejectSafety {
        reason: String,
    },
    AssignOrientation {
        session: OrientationSession,
    },
    MarkOrientation {
        outcome: TrainingOutcome,
        #[serde(default)]
        remarks: Option<String>,
    },
    AssignPractical {
        session: PracticalSession,
    },
    MarkPractical {
        outcome: TrainingOutcome,
        #[serde(default)]
        remarks: Option<String>,
    },
    SendForMedical {
        referred_on: NaiveDate,
    },
    RecordMedical {
        examined_on: NaiveDate,
        #[serde(default)]
        remarks: Option<String>,
    },
    ApproveMedical {
        #[serde(default)]
        remarks: Option<String>,
    },
    IssueLicense {
        issued_on: NaiveDate,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingOutcome {
    Completed,
    NotCompleted,
}

/// Discriminant of [`Transition`], used by the capability table and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    UpdateCategories,
    ApproveSectional,
    RejectSectional,
    AcceptAttachments,
    RejectSafety,
    AssignOrientation,
    MarkOrientation,
    AssignPractical,
    MarkPractical,
    SendForMedical,
    RecordMedical,
    ApproveMedical,
    IssueLicense,
}

impl TransitionKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::UpdateCategories => "update_categories",
            Self::ApproveSectional => "approve_sectional",
            Self::RejectSectional => "reject_sectional",
            Self::AcceptAttachments => "accept_attachments",
            Self::RejectSafety => "reject_safety",
            Self::AssignOrientation => "assign_orientation",
            Self::MarkOrientation => "mark_orientation",
            Self::AssignPractical => "assign_practical",
            Self::MarkPractical => "mark_practical",
            Self::SendForMedical => "send_for_medical",
            Self::RecordMedical => "record_medical",
            Self::ApproveMedical => "approve_medical",
            Self::IssueLicense => "issue_license",
        }
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Transition {
    pub const fn kind(&self) -> TransitionKind {
        match self {
            Self::UpdateCategories { .. } => TransitionKind::UpdateCategories,
            Self::ApproveSectional { .. } => TransitionKind::ApproveSectional,
            Self::RejectSectional { .. } => TransitionKind::RejectSectional,
            Self::AcceptAttachments { .. } => TransitionKind::AcceptAttachments,
            Self::RejectSafety { .. } => TransitionKind::RejectSafety,
            Self::AssignOrientation { .. } => TransitionKind::AssignOrientation,
            Self::MarkOrientation { .. } => TransitionKind::MarkOrientation,
            Self::AssignPractical { .. } => TransitionKind::AssignPractical,
            Self::MarkPractical { .. } => TransitionKind::MarkPractical,
            Self::SendForMedical { .. } => TransitionKind::SendForMedical,
            Self::RecordMedical { .. } => TransitionKind::RecordMedical,
            Self::ApproveMedical { .. } => TransitionKind::ApproveMedical,
            Self::IssueLicense { .. } => TransitionKind::IssueLicense,
        }
    }
}

/// Typed rejections surfaced to the caller; all local and non-fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("{action} is not available to a {role} while the application is {from}")]
    InvalidTransition {
        action: TransitionKind,
        role: StaffRole,
        from: ApplicationStatus,
    },
    #[error("{0}")]
    ValidationFailed(String),
    #[error("{0}")]
    PrerequisiteNotMet(String),
}

struct Capability {
    kind: TransitionKind,
    role: StaffRole,
    sources: &'static [ApplicationStatus],
}

const SECTIONAL_QUEUE: &[ApplicationStatus] = &[ApplicationStatus::PendingSectional];

const SAFETY_INTAKE: &[ApplicationStatus] = &[
    ApplicationStatus::ApprovedSectional,
    ApplicationStatus::PendingSafety,
];

const TRAINING_BAND: &[ApplicationStatus] = &[
    ApplicationStatus::ApprovedSectional,
    ApplicationStatus::PendingSafety,
    ApplicationStatus::ApprovedSafety,
    ApplicationStatus::OrientationAssigned,
    ApplicationStatus::OrientationCompleted,
    ApplicationStatus::PracticalAssigned,
    ApplicationStatus::PracticalCompleted,
];

/// `(transition, required role, allowed source statuses)` — the single place
/// the status graph's edges and their owners are written down.
const CAPABILITIES: &[Capability] = &[
    Capability {
        kind: TransitionKind::UpdateCategories,
        role: StaffRole::SectionalManager,
        sources: SECTIONAL_QUEUE,
    },
    Capability {
        kind: TransitionKind::ApproveSectional,
        role: StaffRole::SectionalManager,
        sources: SECTIONAL_QUEUE,
    },
    Capability {
        kind: TransitionKind::RejectSectional,
        role: StaffRole::SectionalManager,
        sources: SECTIONAL_QUEUE,
    },
    Capability {
        kind: TransitionKind::AcceptAttachments,
        role: StaffRole::SafetyManager,
        sources: SAFETY_INTAKE,
    },
    Capability {
        kind: TransitionKind::RejectSafety,
        role: StaffRole::SafetyManager,
        sources: SAFETY_INTAKE,
    },
    Capability {
        kind: TransitionKind::AssignOrientation,
        role: StaffRole::SafetyManager,
        sources: TRAINING_BAND,
    },
    Capability {
        kind: TransitionKind::MarkOrientation,
        role: StaffRole::SafetyManager,
        sources: &[ApplicationStatus::OrientationAssigned],
    },
    Capability {
        kind: TransitionKind::AssignPractical,
        role: StaffRole::SafetyManager,
        sources: TRAINING_BAND,
    },
    Capability {
        kind: TransitionKind::MarkPractical,
        role: StaffRole::SafetyManager,
        sources: &[ApplicationStatus::PracticalAssigned],
    },
    Capability {
        kind: TransitionKind::SendForMedical,
        role: StaffRole::SafetyManager,
        sources: TRAINING_BAND,
    },
    Capability {
        kind: TransitionKind::RecordMedical,
        role: StaffRole::Nurse,
        sources: &[ApplicationStatus::MedicalPending],
    },
    Capability {
        kind: TransitionKind::ApproveMedical,
        role: StaffRole::Doctor,
        sources: &[ApplicationStatus::MedicalCompleted],
    },
    Capability {
        kind: TransitionKind::IssueLicense,
        role: StaffRole::SafetyManager,
        sources: &[ApplicationStatus::DoctorApproved],
    },
];

fn capability_for(kind: TransitionKind) -> &'static Capability {
    CAPABILITIES
        .iter()
        .find(|capability| capability.kind == kind)
        .unwrap_or_else(|| unreachable!("capability table covers every transition kind"))
}

/// Apply `transition` to `application`, returning the updated record.
///
/// Guard order: capability (role + source status) first, then required-field
/// validation, then workflow prerequisites. Any failure returns before a
/// single field of the copy is produced.
pub fn apply(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    transition: &Transition,
) -> Result<Application, TransitionError> {
    let kind = transition.kind();
    let capability = capability_for(kind);
    if actor.role != capability.role || !capability.sources.contains(&application.status) {
        return Err(TransitionError::InvalidTransition {
            action: kind,
            role: actor.role,
            from: application.status,
        });
    }

    let mut updated = match transition {
        Transition::UpdateCategories { categories, remarks } => {
            update_categories(application, actor, occurred_on, categories, remarks.as_deref())?
        }
        Transition::ApproveSectional { categories, remarks } => approve_sectional(
            application,
            actor,
            occurred_on,
            categories.as_deref(),
            remarks.as_deref(),
        )?,
        Transition::RejectSectional { reason } => {
            reject_sectional(application, actor, occurred_on, reason)?
        }
        Transition::AcceptAttachments { remarks } => {
            accept_attachments(application, actor, occurred_on, remarks.as_deref())
        }
        Transition::RejectSafety { reason } => {
            reject_safety(application, actor, occurred_on, reason)?
        }
        Transition::AssignOrientation { session } => {
            assign_orientation(application, actor, occurred_on, session)?
        }
        Transition::MarkOrientation { outcome, remarks } => {
            mark_orientation(application, actor, occurred_on, *outcome, remarks.as_deref())?
        }
        Transition::AssignPractical { session } => {
            assign_practical(application, actor, occurred_on, session)?
        }
        Transition::MarkPractical { outcome, remarks } => {
            mark_practical(application, actor, occurred_on, *outcome, remarks.as_deref())?
        }
        Transition::SendForMedical { referred_on } => {
            send_for_medical(application, actor, occurred_on, *referred_on)?
        }
        Transition::RecordMedical {
            examined_on,
            remarks,
        } => record_medical(application, actor, occurred_on, *examined_on, remarks.as_deref()),
        Transition::ApproveMedical { remarks } => {
            approve_medical(application, actor, occurred_on, remarks.as_deref())
        }
        Transition::IssueLicense { issued_on } => {
            issue_license(application, actor, occurred_on, *issued_on)
        }
    };

    // The first safety-stage action on a record claims it out of the
    // unassigned pool for view scoping.
    if actor.role == StaffRole::SafetyManager && updated.safety_manager.is_none() {
        updated.safety_manager = Some(actor.staff_number.clone());
    }

    Ok(updated)
}

fn normalized_categories(categories: &[String]) -> Result<Vec<String>, TransitionError> {
    let mut normalized: Vec<String> = Vec::with_capacity(categories.len());
    for category in categories {
        let key = category.trim();
        if key.is_empty() {
            continue;
        }
        if !catalog::is_known(key) {
            return Err(TransitionError::ValidationFailed(format!(
                "unknown category key '{key}'"
            )));
        }
        if !normalized.iter().any(|existing| existing == key) {
            normalized.push(key.to_string());
        }
    }
    Ok(normalized)
}

fn normalized_remarks(remarks: Option<&str>) -> Option<String> {
    remarks
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn required_reason(reason: &str) -> Result<String, TransitionError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(TransitionError::ValidationFailed(
            "a rejection reason is required".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn stage_stamp(actor: &StaffIdentity, acted_on: NaiveDate) -> StageStamp {
    StageStamp {
        staff_number: actor.staff_number.clone(),
        staff_name: actor.name.clone(),
        acted_on,
    }
}

fn record_event(
    application: &mut Application,
    action: AuditAction,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    note: Option<String>,
) {
    application.events.push(AuditEvent {
        action,
        actor: ActorStamp {
            staff_number: actor.staff_number.clone(),
            name: actor.name.clone(),
            role: actor.role,
        },
        occurred_on,
        note,
    });
}

fn update_categories(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    categories: &[String],
    remarks: Option<&str>,
) -> Result<Application, TransitionError> {
    let categories = normalized_categories(categories)?;
    let remarks = normalized_remarks(remarks);

    // Replaying the same amendment is a no-op so the audit log stays free of
    // duplicate entries.
    if application.approved_categories.as_deref() == Some(categories.as_slice())
        && application.sectional_remarks == remarks
    {
        return Ok(application.clone());
    }

    let mut updated = application.clone();
    updated.approved_categories = Some(categories);
    updated.sectional_remarks = remarks.clone();
    record_event(
        &mut updated,
        AuditAction::CategoriesUpdated,
        actor,
        occurred_on,
        remarks,
    );
    Ok(updated)
}

fn approve_sectional(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    categories: Option<&[String]>,
    remarks: Option<&str>,
) -> Result<Application, TransitionError> {
    let approved = match categories {
        Some(explicit) => normalized_categories(explicit)?,
        None => application.effective_categories().to_vec(),
    };
    let remarks = normalized_remarks(remarks);

    let mut updated = application.clone();
    updated.status = ApplicationStatus::ApprovedSectional;
    updated.sectional_stamp = Some(stage_stamp(actor, occurred_on));
    updated.approved_categories = Some(approved);
    if remarks.is_some() {
        updated.sectional_remarks = remarks.clone();
    }
    record_event(
        &mut updated,
        AuditAction::SectionalApproved,
        actor,
        occurred_on,
        remarks,
    );
    Ok(updated)
}

fn reject_sectional(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    reason: &str,
) -> Result<Application, TransitionError> {
    let reason = required_reason(reason)?;

    let mut updated = application.clone();
    updated.status = ApplicationStatus::RejectedSectional;
    updated.sectional_stamp = Some(stage_stamp(actor, occurred_on));
    updated.sectional_remarks = Some(reason.clone());
    record_event(
        &mut updated,
        AuditAction::SectionalRejected,
        actor,
        occurred_on,
        Some(reason),
    );
    Ok(updated)
}

fn accept_attachments(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    remarks: Option<&str>,
) -> Application {
    let remarks = normalized_remarks(remarks);

    let mut updated = application.clone();
    updated.status = ApplicationStatus::PendingSafety;
    updated.safety_stamp = Some(stage_stamp(actor, occurred_on));
    if remarks.is_some() {
        updated.safety_remarks = remarks.clone();
    }
    record_event(
        &mut updated,
        AuditAction::AttachmentsAccepted,
        actor,
        occurred_on,
        remarks,
    );
    updated
}

fn reject_safety(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    reason: &str,
) -> Result<Application, TransitionError> {
    let reason = required_reason(reason)?;

    let mut updated = application.clone();
    updated.status = ApplicationStatus::RejectedSafety;
    updated.safety_stamp = Some(stage_stamp(actor, occurred_on));
    updated.safety_remarks = Some(reason.clone());
    record_event(
        &mut updated,
        AuditAction::SafetyRejected,
        actor,
        occurred_on,
        Some(reason),
    );
    Ok(updated)
}

fn assign_orientation(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    session: &OrientationSession,
) -> Result<Application, TransitionError> {
    if session.class_room.trim().is_empty() || session.trainer.trim().is_empty() {
        return Err(TransitionError::ValidationFailed(
            "classroom assignment requires a class date, room, and trainer".to_string(),
        ));
    }

    let mut updated = application.clone();
    updated.orientation = Orientation::Assigned {
        session: session.clone(),
    };
    updated.status = ApplicationStatus::OrientationAssigned;
    record_event(
        &mut updated,
        AuditAction::OrientationAssigned,
        actor,
        occurred_on,
        Some(format!(
            "{} in {} with {}",
            session.class_date, session.class_room, session.trainer
        )),
    );
    Ok(updated)
}

fn mark_orientation(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    outcome: TrainingOutcome,
    remarks: Option<&str>,
) -> Result<Application, TransitionError> {
    let session = application
        .orientation
        .session()
        .cloned()
        .ok_or_else(|| {
            TransitionError::PrerequisiteNotMet(
                "no classroom assignment on record".to_string(),
            )
        })?;

    let mut updated = application.clone();
    match outcome {
        TrainingOutcome::Completed => {
            updated.orientation = Orientation::Completed { session };
            updated.status = ApplicationStatus::OrientationCompleted;
            record_event(
                &mut updated,
                AuditAction::OrientationMarkedCompleted,
                actor,
                occurred_on,
                normalized_remarks(remarks),
            );
        }
        TrainingOutcome::NotCompleted => {
            let remarks = normalized_remarks(remarks).ok_or_else(|| {
                TransitionError::ValidationFailed(
                    "remarks are required when recording a not-completed outcome".to_string(),
                )
            })?;
            updated.orientation = Orientation::NotCompleted {
                session,
                remarks: remarks.clone(),
            };
            // Status stays at orientation_assigned so the class can re-run.
            record_event(
                &mut updated,
                AuditAction::OrientationMarkedNotCompleted,
                actor,
                occurred_on,
                Some(remarks),
            );
        }
    }
    Ok(updated)
}

fn assign_practical(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    session: &PracticalSession,
) -> Result<Application, TransitionError> {
    if !application.orientation.is_completed() {
        return Err(TransitionError::PrerequisiteNotMet(
            "classroom orientation must be completed before the practical test is scheduled"
                .to_string(),
        ));
    }
    if session.trainer.trim().is_empty() {
        return Err(TransitionError::ValidationFailed(
            "practical assignment requires a date and trainer".to_string(),
        ));
    }

    let mut updated = application.clone();
    updated.practical = Practical::Assigned {
        session: session.clone(),
    };
    updated.status = ApplicationStatus::PracticalAssigned;
    record_event(
        &mut updated,
        AuditAction::PracticalAssigned,
        actor,
        occurred_on,
        Some(format!("{} with {}", session.test_date, session.trainer)),
    );
    Ok(updated)
}

fn mark_practical(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    outcome: TrainingOutcome,
    remarks: Option<&str>,
) -> Result<Application, TransitionError> {
    let session = application
        .practical
        .session()
        .cloned()
        .ok_or_else(|| {
            TransitionError::PrerequisiteNotMet("no practical assignment on record".to_string())
        })?;

    let mut updated = application.clone();
    match outcome {
        TrainingOutcome::Completed => {
            updated.practical = Practical::Completed { session };
            updated.status = ApplicationStatus::PracticalCompleted;
            record_event(
                &mut updated,
                AuditAction::PracticalMarkedCompleted,
                actor,
                occurred_on,
                normalized_remarks(remarks),
            );
        }
        TrainingOutcome::NotCompleted => {
            let remarks = normalized_remarks(remarks).ok_or_else(|| {
                TransitionError::ValidationFailed(
                    "remarks are required when recording a not-completed outcome".to_string(),
                )
            })?;
            updated.practical = Practical::NotCompleted {
                session,
                remarks: remarks.clone(),
            };
            record_event(
                &mut updated,
                AuditAction::PracticalMarkedNotCompleted,
                actor,
                occurred_on,
                Some(remarks),
            );
        }
    }
    Ok(updated)
}

fn send_for_medical(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    referred_on: NaiveDate,
) -> Result<Application, TransitionError> {
    if !application.practical.is_completed() {
        return Err(TransitionError::PrerequisiteNotMet(
            "practical test must be completed before the medical referral".to_string(),
        ));
    }

    let mut updated = application.clone();
    updated.medical_referred_on = Some(referred_on);
    updated.status = ApplicationStatus::MedicalPending;
    record_event(
        &mut updated,
        AuditAction::ReferredForMedical,
        actor,
        occurred_on,
        None,
    );
    Ok(updated)
}

fn record_medical(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    examined_on: NaiveDate,
    remarks: Option<&str>,
) -> Application {
    let mut updated = application.clone();
    updated.medical_examined_on = Some(examined_on);
    updated.status = ApplicationStatus::MedicalCompleted;
    record_event(
        &mut updated,
        AuditAction::MedicalRecorded,
        actor,
        occurred_on,
        normalized_remarks(remarks),
    );
    updated
}

fn approve_medical(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    remarks: Option<&str>,
) -> Application {
    let mut updated = application.clone();
    updated.status = ApplicationStatus::DoctorApproved;
    record_event(
        &mut updated,
        AuditAction::MedicalApproved,
        actor,
        occurred_on,
        normalized_remarks(remarks),
    );
    updated
}

fn issue_license(
    application: &Application,
    actor: &StaffIdentity,
    occurred_on: NaiveDate,
    issued_on: NaiveDate,
) -> Application {
    let mut updated = application.clone();
    updated.license_issued_on = Some(issued_on);
    updated.status = ApplicationStatus::LicenseIssued;
    record_event(
        &mut updated,
        AuditAction::LicenseIssued,
        actor,
        occurred_on,
        None,
    );
    updated
}
