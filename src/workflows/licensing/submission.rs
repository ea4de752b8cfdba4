//! Submission collaborator: turns a request form into a stored-ready
//! [`Application`] with a unique reference number and the submission audit
//! event already recorded.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::identity::StaffRole;

use super::catalog;
use super::domain::{
    ActorStamp, ApplicantSnapshot, Application, ApplicationId, ApplicationStatus, AttachmentSet,
    AuditAction, AuditEvent, LicenseDetails, LicenseKind, Orientation, Practical,
};

/// Everything the applicant's request form captures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionForm {
    pub applicant: ApplicantSnapshot,
    pub license: LicenseDetails,
    pub selected_categories: Vec<String>,
    #[serde(default)]
    pub attachments: AttachmentSet,
    /// Sectional manager the request is routed to.
    pub sectional_manager: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    #[error("submission is missing the applicant's {0}")]
    MissingApplicantField(&'static str),
    #[error("submission must select at least one category")]
    NoCategoriesSelected,
    #[error("unknown category key '{0}'")]
    UnknownCategory(String),
    #[error("an extension request requires the current permit number and its first issue date")]
    MissingPriorLicense,
    #[error("submission must name a sectional manager")]
    MissingSectionalManager,
}

/// Allocates application ids and `AL-<year>-<seq>` reference numbers.
///
/// Owned by the service (one per process), so uniqueness holds without any
/// static state; collision avoidance against pre-existing data is this
/// collaborator's responsibility per the store contract.
#[derive(Debug)]
pub struct ReferenceAllocator {
    next: AtomicU64,
}

impl ReferenceAllocator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(next: u64) -> Self {
        Self {
            next: AtomicU64::new(next.max(1)),
        }
    }

    pub fn allocate(&self, submitted_on: NaiveDate) -> (ApplicationId, String) {
        let sequence = self.next.fetch_add(1, Ordering::Relaxed);
        let id = ApplicationId(format!("app-{sequence:06}"));
        let reference = format!("AL-{}-{sequence:04}", submitted_on.year());
        (id, reference)
    }
}

impl Default for ReferenceAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a form and build the initial `pending_sectional` record.
pub fn build_application(
    form: SubmissionForm,
    id: ApplicationId,
    reference_number: String,
    submitted_on: NaiveDate,
) -> Result<Application, SubmissionError> {
    let applicant = form.applicant;
    require(&applicant.name, "name")?;
    require(&applicant.staff_number, "staff number")?;
    require(&applicant.department, "department")?;

    if form.sectional_manager.trim().is_empty() {
        return Err(SubmissionError::MissingSectionalManager);
    }

    if form.license.kind == LicenseKind::Extension
        && (form.license.current_permit_no.is_none() || form.license.first_issued_on.is_none())
    {
        return Err(SubmissionError::MissingPriorLicense);
    }

    let mut selected: Vec<String> = Vec::with_capacity(form.selected_categories.len());
    for category in &form.selected_categories {
        let key = category.trim();
        if key.is_empty() {
            continue;
        }
        if !catalog::is_known(key) {
            return Err(SubmissionError::UnknownCategory(key.to_string()));
        }
        if !selected.iter().any(|existing| existing == key) {
            selected.push(key.to_string());
        }
    }
    if selected.is_empty() {
        return Err(SubmissionError::NoCategoriesSelected);
    }

    let submission_event = AuditEvent {
        action: AuditAction::Submitted,
        actor: ActorStamp {
            staff_number: applicant.staff_number.clone(),
            name: applicant.name.clone(),
            role: StaffRole::Applicant,
        },
        occurred_on: submitted_on,
        note: None,
    };

    Ok(Application {
        id,
        reference_number,
        submitted_on,
        status: ApplicationStatus::PendingSectional,
        applicant,
        license: form.license,
        selected_categories: selected,
        approved_categories: None,
        attachments: form.attachments,
        sectional_manager: form.sectional_manager.trim().to_string(),
        safety_manager: None,
        sectional_stamp: None,
        sectional_remarks: None,
        safety_stamp: None,
        safety_remarks: None,
        orientation: Orientation::Unassigned,
        practical: Practical::Unassigned,
        medical_referred_on: None,
        medical_examined_on: None,
        license_issued_on: None,
        events: vec![submission_event],
    })
}

fn require(value: &str, field: &'static str) -> Result<(), SubmissionError> {
    if value.trim().is_empty() {
        return Err(SubmissionError::MissingApplicantField(field));
    }
    Ok(())
}
