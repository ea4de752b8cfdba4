use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::RegisterConfig;
use crate::identity::{StaffIdentity, StaffRole};
use crate::workflows::licensing::notify::{Notification, NotificationPublisher, NotifyError};
use crate::workflows::licensing::router::licensing_router;
use crate::workflows::licensing::{
    ApplicantSnapshot, Application, ApplicationStore, AttachmentSet, LicenseDetails, LicenseKind,
    LicensingService, OrientationSession, PracticalSession, SubmissionForm, TrainingOutcome,
    Transition,
};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn sectional_manager() -> StaffIdentity {
    StaffIdentity::new("STF002", "Kamala Silva", StaffRole::SectionalManager)
}

pub(super) fn safety_manager() -> StaffIdentity {
    StaffIdentity::new("STF003", "Nimal Fernando", StaffRole::SafetyManager)
}

pub(super) fn second_safety_manager() -> StaffIdentity {
    StaffIdentity::new("STF007", "Ruwan Dias", StaffRole::SafetyManager)
}

pub(super) fn nurse() -> StaffIdentity {
    StaffIdentity::new("STF005", "Malini Rathnayake", StaffRole::Nurse)
}

pub(super) fn doctor() -> StaffIdentity {
    StaffIdentity::new("STF006", "Ranjan Wijesinghe", StaffRole::Doctor)
}

pub(super) fn submission_form(
    name: &str,
    staff_number: &str,
    categories: &[&str],
) -> SubmissionForm {
    SubmissionForm {
        applicant: ApplicantSnapshot {
            name: name.to_string(),
            staff_number: staff_number.to_string(),
            department: "Ground Operations".to_string(),
            designation: "Operations Officer".to_string(),
            contact_number: "077 123 4567".to_string(),
            national_id: format!("{staff_number}V"),
        },
        license: LicenseDetails {
            kind: LicenseKind::New,
            current_permit_no: None,
            first_issued_on: None,
            airside_pass_no: format!("AASL-{staff_number}"),
            airside_pass_expires_on: date(2027, 6, 30),
            state_license_no: format!("B{staff_number}"),
            state_license_issued_on: date(2021, 8, 10),
            state_license_expires_on: date(2029, 8, 10),
        },
        selected_categories: categories.iter().map(|key| key.to_string()).collect(),
        attachments: AttachmentSet::default(),
        sectional_manager: "STF002".to_string(),
    }
}

pub(super) fn submission() -> SubmissionForm {
    submission_form("Nuwan Perera", "423456", &["car", "van"])
}

pub(super) fn build_service() -> (
    Arc<LicensingService<MemoryNotifier>>,
    Arc<ApplicationStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(ApplicationStore::new());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = Arc::new(LicensingService::new(store.clone(), notifier.clone()));
    (service, store, notifier)
}

/// Submit the default form and return the stored record.
pub(super) fn submitted_application(service: &LicensingService<MemoryNotifier>) -> Application {
    service
        .submit(submission(), date(2026, 1, 24))
        .expect("submission succeeds")
}

/// Submission plus sectional approval, leaving the record at the safety gate.
pub(super) fn approved_application(service: &LicensingService<MemoryNotifier>) -> Application {
    let application = submitted_application(service);
    service
        .execute(
            &application.id,
            &sectional_manager(),
            date(2026, 1, 26),
            &Transition::ApproveSectional {
                categories: None,
                remarks: None,
            },
        )
        .expect("sectional approval succeeds")
}

/// Drive a freshly approved record through orientation and practical so the
/// medical stage is reachable.
pub(super) fn application_past_practical(
    service: &LicensingService<MemoryNotifier>,
) -> Application {
    let application = approved_application(service);
    let safety = safety_manager();
    let steps = [
        (
            date(2026, 1, 27),
            Transition::AcceptAttachments { remarks: None },
        ),
        (
            date(2026, 1, 28),
            Transition::AssignOrientation {
                session: orientation_session(),
            },
        ),
        (
            date(2026, 2, 2),
            Transition::MarkOrientation {
                outcome: TrainingOutcome::Completed,
                remarks: None,
            },
        ),
        (
            date(2026, 2, 3),
            Transition::AssignPractical {
                session: practical_session(),
            },
        ),
        (
            date(2026, 2, 6),
            Transition::MarkPractical {
                outcome: TrainingOutcome::Completed,
                remarks: None,
            },
        ),
    ];

    let mut current = application;
    for (occurred_on, transition) in steps {
        current = service
            .execute(&current.id, &safety, occurred_on, &transition)
            .expect("training step succeeds");
    }
    current
}

pub(super) fn orientation_session() -> OrientationSession {
    OrientationSession {
        class_date: date(2026, 2, 2),
        class_room: "Training Hall".to_string(),
        trainer: "Officer Jayasinghe".to_string(),
    }
}

pub(super) fn practical_session() -> PracticalSession {
    PracticalSession {
        test_date: date(2026, 2, 6),
        trainer: "Trainer Perera".to_string(),
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub(super) fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .expect("notifier mutex poisoned")
            .clone()
    }
}

impl NotificationPublisher for MemoryNotifier {
    fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        self.notifications
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

/// Notifier whose transport is always down, for propagation tests.
pub(super) struct UnreachableNotifier;

impl NotificationPublisher for UnreachableNotifier {
    fn publish(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp relay offline".to_string()))
    }
}

pub(super) fn licensing_router_with_service(
    service: Arc<LicensingService<MemoryNotifier>>,
) -> axum::Router {
    licensing_router(service, RegisterConfig::default())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
