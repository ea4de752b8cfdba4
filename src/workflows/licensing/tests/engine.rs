use super::common::*;
use crate::workflows::licensing::{
    ApplicationStatus, Orientation, Practical, ServiceError, TrainingOutcome, Transition,
    TransitionError,
};

#[test]
fn approve_with_amended_categories_stamps_and_records_the_final_set() {
    let (service, store, _) = build_service();
    let application = submitted_application(&service);
    assert_eq!(application.status, ApplicationStatus::PendingSectional);

    let approved = service
        .execute(
            &application.id,
            &sectional_manager(),
            date(2026, 1, 26),
            &Transition::ApproveSectional {
                categories: Some(vec![
                    "car".to_string(),
                    "van".to_string(),
                    "pickUp".to_string(),
                ]),
                remarks: Some("added pickup".to_string()),
            },
        )
        .expect("approval succeeds");

    assert_eq!(approved.status, ApplicationStatus::ApprovedSectional);
    assert_eq!(
        approved.approved_categories.as_deref(),
        Some(["car".to_string(), "van".to_string(), "pickUp".to_string()].as_slice())
    );
    let stamp = approved.sectional_stamp.expect("sectional stamp present");
    assert_eq!(stamp.staff_number, "STF002");
    assert_eq!(stamp.acted_on, date(2026, 1, 26));
    assert_eq!(approved.sectional_remarks.as_deref(), Some("added pickup"));
    assert_eq!(store.get(&approved.id).expect("stored").status, approved.status);
}

#[test]
fn approve_defaults_to_the_submitted_selection() {
    let (service, _, _) = build_service();
    let approved = approved_application(&service);

    assert_eq!(
        approved.approved_categories.as_deref(),
        Some(approved.selected_categories.as_slice())
    );
}

#[test]
fn approve_honors_a_prior_category_amendment() {
    let (service, _, _) = build_service();
    let application = submitted_application(&service);

    service
        .execute(
            &application.id,
            &sectional_manager(),
            date(2026, 1, 25),
            &Transition::UpdateCategories {
                categories: vec!["car".to_string(), "forkliftPalletMover".to_string()],
                remarks: Some("scope reduced to depot equipment".to_string()),
            },
        )
        .expect("amendment succeeds");

    let approved = service
        .execute(
            &application.id,
            &sectional_manager(),
            date(2026, 1, 26),
            &Transition::ApproveSectional {
                categories: None,
                remarks: None,
            },
        )
        .expect("approval succeeds");

    assert_eq!(
        approved.approved_categories.as_deref(),
        Some(["car".to_string(), "forkliftPalletMover".to_string()].as_slice())
    );
}

#[test]
fn blank_rejection_reason_fails_validation_and_leaves_the_record_unchanged() {
    let (service, store, _) = build_service();
    let application = submitted_application(&service);
    let before = store.get(&application.id).expect("stored");

    let result = service.execute(
        &application.id,
        &sectional_manager(),
        date(2026, 1, 26),
        &Transition::RejectSectional {
            reason: "   ".to_string(),
        },
    );

    match result {
        Err(ServiceError::Transition(TransitionError::ValidationFailed(_))) => {}
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(store.get(&application.id).expect("stored"), before);
}

#[test]
fn rejected_sectional_is_terminal() {
    let (service, store, _) = build_service();
    let application = submitted_application(&service);

    let rejected = service
        .execute(
            &application.id,
            &sectional_manager(),
            date(2026, 1, 26),
            &Transition::RejectSectional {
                reason: "Incomplete documentation".to_string(),
            },
        )
        .expect("rejection succeeds");
    assert_eq!(rejected.status, ApplicationStatus::RejectedSectional);
    assert_eq!(
        rejected.sectional_remarks.as_deref(),
        Some("Incomplete documentation")
    );

    let followups = [
        Transition::ApproveSectional {
            categories: None,
            remarks: None,
        },
        Transition::UpdateCategories {
            categories: vec!["car".to_string()],
            remarks: None,
        },
        Transition::AcceptAttachments { remarks: None },
        Transition::AssignOrientation {
            session: orientation_session(),
        },
    ];
    for transition in followups {
        let actor = match transition {
            Transition::AcceptAttachments { .. } | Transition::AssignOrientation { .. } => {
                safety_manager()
            }
            _ => sectional_manager(),
        };
        match service.execute(&rejected.id, &actor, date(2026, 1, 27), &transition) {
            Err(ServiceError::Transition(TransitionError::InvalidTransition { .. })) => {}
            other => panic!("expected invalid transition, got {other:?}"),
        }
    }
    assert_eq!(
        store.get(&rejected.id).expect("stored").status,
        ApplicationStatus::RejectedSectional
    );
}

#[test]
fn role_mismatch_is_an_invalid_transition() {
    let (service, _, _) = build_service();
    let application = submitted_application(&service);

    match service.execute(
        &application.id,
        &safety_manager(),
        date(2026, 1, 26),
        &Transition::ApproveSectional {
            categories: None,
            remarks: None,
        },
    ) {
        Err(ServiceError::Transition(TransitionError::InvalidTransition { .. })) => {}
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn update_categories_is_idempotent() {
    let (service, store, _) = build_service();
    let application = submitted_application(&service);
    let amendment = Transition::UpdateCategories {
        categories: vec!["car".to_string(), "van".to_string(), "buggy".to_string()],
        remarks: Some("added buggy".to_string()),
    };

    let first = service
        .execute(&application.id, &sectional_manager(), date(2026, 1, 25), &amendment)
        .expect("first amendment succeeds");
    let second = service
        .execute(&application.id, &sectional_manager(), date(2026, 1, 26), &amendment)
        .expect("replay succeeds");

    assert_eq!(first, second);
    assert_eq!(store.get(&application.id).expect("stored"), first);
    assert_eq!(
        first
            .events
            .iter()
            .filter(|event| event.note.as_deref() == Some("added buggy"))
            .count(),
        1
    );
}

#[test]
fn unknown_category_keys_fail_validation() {
    let (service, _, _) = build_service();
    let application = submitted_application(&service);

    match service.execute(
        &application.id,
        &sectional_manager(),
        date(2026, 1, 25),
        &Transition::UpdateCategories {
            categories: vec!["hovercraft".to_string()],
            remarks: None,
        },
    ) {
        Err(ServiceError::Transition(TransitionError::ValidationFailed(message))) => {
            assert!(message.contains("hovercraft"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn orientation_can_be_assigned_straight_after_sectional_approval() {
    let (service, store, _) = build_service();
    let approved = approved_application(&service);

    let assigned = service
        .execute(
            &approved.id,
            &safety_manager(),
            date(2026, 1, 28),
            &Transition::AssignOrientation {
                session: orientation_session(),
            },
        )
        .expect("assignment succeeds");

    assert_eq!(assigned.status, ApplicationStatus::OrientationAssigned);
    assert!(matches!(assigned.orientation, Orientation::Assigned { .. }));

    // Practical cannot be scheduled until the classroom outcome is recorded.
    let before = store.get(&assigned.id).expect("stored");
    match service.execute(
        &assigned.id,
        &safety_manager(),
        date(2026, 1, 28),
        &Transition::AssignPractical {
            session: practical_session(),
        },
    ) {
        Err(ServiceError::Transition(TransitionError::PrerequisiteNotMet(_))) => {}
        other => panic!("expected prerequisite failure, got {other:?}"),
    }
    assert_eq!(store.get(&assigned.id).expect("stored"), before);
}

#[test]
fn orientation_assignment_requires_every_classroom_field() {
    let (service, _, _) = build_service();
    let approved = approved_application(&service);

    let mut session = orientation_session();
    session.class_room = "  ".to_string();
    match service.execute(
        &approved.id,
        &safety_manager(),
        date(2026, 1, 28),
        &Transition::AssignOrientation { session },
    ) {
        Err(ServiceError::Transition(TransitionError::ValidationFailed(_))) => {}
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn not_completed_orientation_keeps_the_status_and_requires_remarks() {
    let (service, _, _) = build_service();
    let approved = approved_application(&service);
    let safety = safety_manager();

    service
        .execute(
            &approved.id,
            &safety,
            date(2026, 1, 28),
            &Transition::AssignOrientation {
                session: orientation_session(),
            },
        )
        .expect("assignment succeeds");

    // Missing remarks is a validation failure.
    match service.execute(
        &approved.id,
        &safety,
        date(2026, 2, 2),
        &Transition::MarkOrientation {
            outcome: TrainingOutcome::NotCompleted,
            remarks: None,
        },
    ) {
        Err(ServiceError::Transition(TransitionError::ValidationFailed(_))) => {}
        other => panic!("expected validation failure, got {other:?}"),
    }

    let not_completed = service
        .execute(
            &approved.id,
            &safety,
            date(2026, 2, 2),
            &Transition::MarkOrientation {
                outcome: TrainingOutcome::NotCompleted,
                remarks: Some("Did not attend the session".to_string()),
            },
        )
        .expect("outcome recorded");

    // Status does not advance; the class can re-run.
    assert_eq!(not_completed.status, ApplicationStatus::OrientationAssigned);
    assert!(matches!(
        not_completed.orientation,
        Orientation::NotCompleted { .. }
    ));

    let completed = service
        .execute(
            &approved.id,
            &safety,
            date(2026, 2, 9),
            &Transition::MarkOrientation {
                outcome: TrainingOutcome::Completed,
                remarks: None,
            },
        )
        .expect("re-attempt succeeds");
    assert_eq!(completed.status, ApplicationStatus::OrientationCompleted);
    assert!(completed.orientation.is_completed());
}

#[test]
fn medical_referral_requires_a_completed_practical() {
    let (service, _, _) = build_service();
    let approved = approved_application(&service);

    match service.execute(
        &approved.id,
        &safety_manager(),
        date(2026, 1, 28),
        &Transition::SendForMedical {
            referred_on: date(2026, 1, 28),
        },
    ) {
        Err(ServiceError::Transition(TransitionError::PrerequisiteNotMet(_))) => {}
        other => panic!("expected prerequisite failure, got {other:?}"),
    }
}

#[test]
fn workflow_runs_from_practical_to_license_issue() {
    let (service, _, _) = build_service();
    let past_practical = application_past_practical(&service);
    assert_eq!(past_practical.status, ApplicationStatus::PracticalCompleted);
    assert!(past_practical.practical.is_completed());
    assert!(matches!(past_practical.practical, Practical::Completed { .. }));

    let referred = service
        .execute(
            &past_practical.id,
            &safety_manager(),
            date(2026, 2, 7),
            &Transition::SendForMedical {
                referred_on: date(2026, 2, 7),
            },
        )
        .expect("referral succeeds");
    assert_eq!(referred.status, ApplicationStatus::MedicalPending);
    assert_eq!(referred.medical_referred_on, Some(date(2026, 2, 7)));

    let examined = service
        .execute(
            &referred.id,
            &nurse(),
            date(2026, 2, 10),
            &Transition::RecordMedical {
                examined_on: date(2026, 2, 10),
                remarks: None,
            },
        )
        .expect("examination recorded");
    assert_eq!(examined.status, ApplicationStatus::MedicalCompleted);

    let cleared = service
        .execute(
            &examined.id,
            &doctor(),
            date(2026, 2, 11),
            &Transition::ApproveMedical { remarks: None },
        )
        .expect("doctor approval succeeds");
    assert_eq!(cleared.status, ApplicationStatus::DoctorApproved);

    let issued = service
        .execute(
            &cleared.id,
            &safety_manager(),
            date(2026, 2, 12),
            &Transition::IssueLicense {
                issued_on: date(2026, 2, 12),
            },
        )
        .expect("license issued");
    assert_eq!(issued.status, ApplicationStatus::LicenseIssued);
    assert_eq!(issued.license_issued_on, Some(date(2026, 2, 12)));
    assert!(issued.status.is_terminal());

    match service.execute(
        &issued.id,
        &safety_manager(),
        date(2026, 2, 13),
        &Transition::AssignOrientation {
            session: orientation_session(),
        },
    ) {
        Err(ServiceError::Transition(TransitionError::InvalidTransition { .. })) => {}
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn first_safety_action_claims_the_record() {
    let (service, _, _) = build_service();
    let approved = approved_application(&service);
    assert_eq!(approved.safety_manager, None);

    let accepted = service
        .execute(
            &approved.id,
            &safety_manager(),
            date(2026, 1, 27),
            &Transition::AcceptAttachments { remarks: None },
        )
        .expect("validation succeeds");
    assert_eq!(accepted.safety_manager.as_deref(), Some("STF003"));

    // A later action by another safety manager does not steal the claim.
    let reassigned = service
        .execute(
            &accepted.id,
            &second_safety_manager(),
            date(2026, 1, 28),
            &Transition::AssignOrientation {
                session: orientation_session(),
            },
        )
        .expect("assignment succeeds");
    assert_eq!(reassigned.safety_manager.as_deref(), Some("STF003"));
}

#[test]
fn accept_attachments_can_be_replayed_while_pending_safety() {
    let (service, _, _) = build_service();
    let approved = approved_application(&service);

    let first = service
        .execute(
            &approved.id,
            &safety_manager(),
            date(2026, 1, 27),
            &Transition::AcceptAttachments {
                remarks: Some("All documents legible".to_string()),
            },
        )
        .expect("validation succeeds");
    assert_eq!(first.status, ApplicationStatus::PendingSafety);

    let replay = service
        .execute(
            &approved.id,
            &safety_manager(),
            date(2026, 1, 28),
            &Transition::AcceptAttachments {
                remarks: Some("All documents legible".to_string()),
            },
        )
        .expect("replay succeeds");
    assert_eq!(replay.status, ApplicationStatus::PendingSafety);
    let stamp = replay.safety_stamp.expect("stamp present");
    assert_eq!(stamp.acted_on, date(2026, 1, 28));
}
