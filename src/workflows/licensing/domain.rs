use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::identity::StaffRole;

/// Identifier wrapper for license applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of an application across the organizational review stages.
///
/// The enum is closed: every record always carries exactly one of these
/// values, and the transition engine only ever moves along the edges encoded
/// in its capability table. `rejected_sectional`, `rejected_safety`, and
/// `license_issued` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    PendingSectional,
    ApprovedSectional,
    RejectedSectional,
    PendingSafety,
    ApprovedSafety,
    RejectedSafety,
    OrientationAssigned,
    OrientationCompleted,
    PracticalAssigned,
    PracticalCompleted,
    MedicalPending,
    MedicalCompleted,
    DoctorApproved,
    LicenseIssued,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PendingSectional => "Pending Sectional Review",
            Self::ApprovedSectional => "Approved by Sectional Manager",
            Self::RejectedSectional => "Rejected by Sectional Manager",
            Self::PendingSafety => "Validating Attachments",
            Self::ApprovedSafety => "Approved by Safety Manager",
            Self::RejectedSafety => "Rejected by Safety Manager",
            Self::OrientationAssigned => "Classroom Assigned",
            Self::OrientationCompleted => "Orientation Done",
            Self::PracticalAssigned => "Practical Assigned",
            Self::PracticalCompleted => "Practical Done",
            Self::MedicalPending => "Medical Pending",
            Self::MedicalCompleted => "Medical Completed",
            Self::DoctorApproved => "Doctor Approved",
            Self::LicenseIssued => "License Issued",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::RejectedSectional | Self::RejectedSafety | Self::LicenseIssued
        )
    }

    /// Everything the safety manager's register shows: the safety stage and
    /// every later stage, rejections included, but never the sectional queue.
    pub const fn in_safety_band(self) -> bool {
        !matches!(self, Self::PendingSectional | Self::RejectedSectional)
    }

}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether the request opens a new license or extends an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseKind {
    New,
    Extension,
}

impl LicenseKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Extension => "Extension",
        }
    }
}

/// Applicant details captured at submission time. Never re-synced from a
/// staff directory afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantSnapshot {
    pub name: String,
    pub staff_number: String,
    pub department: String,
    pub designation: String,
    pub contact_number: String,
    pub national_id: String,
}

/// License facts declared on the request form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseDetails {
    pub kind: LicenseKind,
    /// Prior permit number, required when `kind` is `Extension`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_permit_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_issued_on: Option<NaiveDate>,
    pub airside_pass_no: String,
    pub airside_pass_expires_on: NaiveDate,
    pub state_license_no: String,
    pub state_license_issued_on: NaiveDate,
    pub state_license_expires_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Pdf,
    Png,
    Jpg,
}

/// Reference to an uploaded document. The locator is opaque to the core;
/// binary handling lives with the submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub media: MediaKind,
    pub locator: String,
}

/// Fixed document slots on every application. Empty slots are valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSet {
    pub staff_id_front: Option<Attachment>,
    pub staff_id_back: Option<Attachment>,
    pub state_license_front: Option<Attachment>,
    pub state_license_back: Option<Attachment>,
    pub airside_pass_front: Option<Attachment>,
    pub airside_pass_back: Option<Attachment>,
    pub national_id_front: Option<Attachment>,
    pub national_id_back: Option<Attachment>,
    pub signature: Option<Attachment>,
}

impl AttachmentSet {
    pub fn slots(&self) -> [(&'static str, Option<&Attachment>); 9] {
        [
            ("staff_id_front", self.staff_id_front.as_ref()),
            ("staff_id_back", self.staff_id_back.as_ref()),
            ("state_license_front", self.state_license_front.as_ref()),
            ("state_license_back", self.state_license_back.as_ref()),
            ("airside_pass_front", self.airside_pass_front.as_ref()),
            ("airside_pass_back", self.airside_pass_back.as_ref()),
            ("national_id_front", self.national_id_front.as_ref()),
            ("national_id_back", self.national_id_back.as_ref()),
            ("signature", self.signature.as_ref()),
        ]
    }

    pub fn provided(&self) -> usize {
        self.slots()
            .iter()
            .filter(|(_, attachment)| attachment.is_some())
            .count()
    }
}

/// Actor identity and date recorded when a stage transition executes.
/// Present if and only if the stage has run at least once; re-running the
/// stage transition overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStamp {
    pub staff_number: String,
    pub staff_name: String,
    pub acted_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrientationSession {
    pub class_date: NaiveDate,
    pub class_room: String,
    pub trainer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticalSession {
    pub test_date: NaiveDate,
    pub trainer: String,
}

/// Classroom orientation sub-record. The session payload only exists once an
/// assignment has been made; "not yet scheduled" is its own variant rather
/// than a bundle of nullable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Unassigned,
    Assigned {
        session: OrientationSession,
    },
    Completed {
        session: OrientationSession,
    },
    NotCompleted {
        session: OrientationSession,
        remarks: String,
    },
}

impl Orientation {
    pub fn session(&self) -> Option<&OrientationSession> {
        match self {
            Self::Unassigned => None,
            Self::Assigned { session }
            | Self::Completed { session }
            | Self::NotCompleted { session, .. } => Some(session),
        }
    }

    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub const fn status_label(&self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::Assigned { .. } => "assigned",
            Self::Completed { .. } => "completed",
            Self::NotCompleted { .. } => "not_completed",
        }
    }
}

/// Practical driving-test sub-record, same shape as [`Orientation`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Practical {
    #[default]
    Unassigned,
    Assigned {
        session: PracticalSession,
    },
    Completed {
        session: PracticalSession,
    },
    NotCompleted {
        session: PracticalSession,
        remarks: String,
    },
}

impl Practical {
    pub fn session(&self) -> Option<&PracticalSession> {
        match self {
            Self::Unassigned => None,
            Self::Assigned { session }
            | Self::Completed { session }
            | Self::NotCompleted { session, .. } => Some(session),
        }
    }

    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub const fn status_label(&self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::Assigned { .. } => "assigned",
            Self::Completed { .. } => "completed",
            Self::NotCompleted { .. } => "not_completed",
        }
    }
}

/// What happened, for the append-only audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Submitted,
    CategoriesUpdated,
    SectionalApproved,
    SectionalRejected,
    AttachmentsAccepted,
    SafetyRejected,
    OrientationAssigned,
    OrientationMarkedCompleted,
    OrientationMarkedNotCompleted,
    PracticalAssigned,
    PracticalMarkedCompleted,
    PracticalMarkedNotCompleted,
    ReferredForMedical,
    MedicalRecorded,
    MedicalApproved,
    LicenseIssued,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorStamp {
    pub staff_number: String,
    pub name: String,
    pub role: StaffRole,
}

/// One entry of the per-record audit log. Events are only ever appended;
/// the history timeline renders from this list and never from final-state
/// fields, so a later transition cannot rewrite an earlier entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub actor: ActorStamp,
    pub occurred_on: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The central record: one per license request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    /// Human-facing `AL-<year>-<4 digit>` reference, assigned once at
    /// creation and never changed.
    pub reference_number: String,
    pub submitted_on: NaiveDate,
    pub status: ApplicationStatus,
    pub applicant: ApplicantSnapshot,
    pub license: LicenseDetails,
    /// Categories the applicant asked for; immutable after submission.
    pub selected_categories: Vec<String>,
    /// Categories the sectional manager settled on. May add beyond the
    /// selected set but always stays within the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_categories: Option<Vec<String>>,
    pub attachments: AttachmentSet,
    /// Sectional manager the request was routed to at submission.
    pub sectional_manager: String,
    /// Safety manager who claimed the record; `None` while it sits in the
    /// unassigned pool visible to every safety manager.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sectional_stamp: Option<StageStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sectional_remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_stamp: Option<StageStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_remarks: Option<String>,
    pub orientation: Orientation,
    pub practical: Practical,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_referred_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_examined_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_issued_on: Option<NaiveDate>,
    pub events: Vec<AuditEvent>,
}

impl Application {
    /// Category set the license would currently be issued for: the approved
    /// set once the sectional manager has touched it, otherwise the
    /// applicant's selection.
    pub fn effective_categories(&self) -> &[String] {
        self.approved_categories
            .as_deref()
            .unwrap_or(&self.selected_categories)
    }
}
