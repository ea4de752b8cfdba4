use super::common::*;
use crate::workflows::licensing::submission::{self, ReferenceAllocator};
use crate::workflows::licensing::{
    Application, ApplicationStore, StoreError, TransitionError, UpdateError,
};

fn stored_application(sequence: &ReferenceAllocator, name: &str, staff: &str) -> Application {
    let (id, reference) = sequence.allocate(date(2026, 1, 20));
    submission::build_application(
        submission_form(name, staff, &["car"]),
        id,
        reference,
        date(2026, 1, 20),
    )
    .expect("form is valid")
}

#[test]
fn insert_then_get_roundtrips() {
    let store = ApplicationStore::new();
    let sequence = ReferenceAllocator::new();
    let application = stored_application(&sequence, "Amal Perera", "20018");

    let inserted = store.insert(application.clone()).expect("insert succeeds");
    assert_eq!(inserted, application);
    assert_eq!(store.get(&application.id).expect("fetch succeeds"), application);
}

#[test]
fn duplicate_ids_conflict() {
    let store = ApplicationStore::new();
    let sequence = ReferenceAllocator::new();
    let application = stored_application(&sequence, "Amal Perera", "20018");

    store.insert(application.clone()).expect("first insert");
    match store.insert(application.clone()) {
        Err(StoreError::Conflict(id)) => assert_eq!(id, application.id),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(store.len(), 1);
}

#[test]
fn unknown_ids_are_not_found() {
    let store = ApplicationStore::new();
    let sequence = ReferenceAllocator::new();
    let application = stored_application(&sequence, "Amal Perera", "20018");

    match store.get(&application.id) {
        Err(StoreError::NotFound(id)) => assert_eq!(id, application.id),
        other => panic!("expected not found, got {other:?}"),
    }

    match store.update(&application.id, |current| {
        Ok::<_, TransitionError>(current.clone())
    }) {
        Err(UpdateError::NotFound(id)) => assert_eq!(id, application.id),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn rejected_mutations_leave_the_prior_record_visible() {
    let store = ApplicationStore::new();
    let sequence = ReferenceAllocator::new();
    let application = stored_application(&sequence, "Amal Perera", "20018");
    store.insert(application.clone()).expect("insert succeeds");

    let result = store.update(&application.id, |_| {
        Err::<Application, _>(TransitionError::ValidationFailed(
            "a rejection reason is required".to_string(),
        ))
    });

    assert!(matches!(result, Err(UpdateError::Rejected(_))));
    assert_eq!(store.get(&application.id).expect("fetch succeeds"), application);
}

#[test]
fn list_preserves_insertion_order() {
    let store = ApplicationStore::new();
    let sequence = ReferenceAllocator::new();
    let first = stored_application(&sequence, "Amal Perera", "20018");
    let second = stored_application(&sequence, "Rashmi Jayasinghe", "20019");
    let third = stored_application(&sequence, "Tharindu Weerasinghe", "20020");

    for application in [&first, &second, &third] {
        store.insert(application.clone()).expect("insert succeeds");
    }

    let listed: Vec<_> = store.list().into_iter().map(|app| app.id).collect();
    assert_eq!(listed, vec![first.id, second.id, third.id]);
}

#[test]
fn subscribers_observe_each_committed_snapshot() {
    let store = ApplicationStore::new();
    let sequence = ReferenceAllocator::new();
    let application = stored_application(&sequence, "Amal Perera", "20018");

    let receiver = store.subscribe();
    assert!(receiver.borrow().is_empty());

    store.insert(application.clone()).expect("insert succeeds");
    assert_eq!(receiver.borrow().len(), 1);

    let mut mutated = application.clone();
    mutated.sectional_remarks = Some("Reviewed".to_string());
    store
        .update(&application.id, |_| Ok::<_, TransitionError>(mutated.clone()))
        .expect("update succeeds");
    assert_eq!(
        receiver.borrow()[0].sectional_remarks.as_deref(),
        Some("Reviewed")
    );
}

#[test]
fn failed_updates_do_not_disturb_the_broadcast_snapshot() {
    let store = ApplicationStore::new();
    let sequence = ReferenceAllocator::new();
    let application = stored_application(&sequence, "Amal Perera", "20018");
    store.insert(application.clone()).expect("insert succeeds");

    let receiver = store.subscribe();
    let before = receiver.borrow().clone();

    let _ = store.update(&application.id, |_| {
        Err::<Application, _>(TransitionError::PrerequisiteNotMet(
            "no classroom assignment on record".to_string(),
        ))
    });

    assert_eq!(*receiver.borrow(), before);
}
