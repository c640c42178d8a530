use gymdesk_core::{
    AttendanceKey, AttendanceRecord, AttendanceWorkflow, LoadOutcome, LoadedRoster, StaffStatus,
    StoreError, Subject, SubjectId, SubmitOutcome, WorkflowError, WorkflowState,
};

fn id(value: &str) -> SubjectId {
    SubjectId::new(value).unwrap()
}

fn date(value: &str) -> AttendanceKey {
    AttendanceKey::date(value).unwrap()
}

fn roster_for(key: &AttendanceKey, ids: &[&str]) -> LoadedRoster<StaffStatus> {
    LoadedRoster {
        subjects: ids
            .iter()
            .map(|value| Subject::new(id(value), value.to_string()))
            .collect(),
        records: vec![AttendanceRecord::new(id(ids[0]), key.clone(), StaffStatus::Absent)],
    }
}

fn ready(key: &str, ids: &[&str]) -> AttendanceWorkflow<StaffStatus> {
    let mut workflow = AttendanceWorkflow::default();
    let key = date(key);
    let ticket = workflow.begin_load(key.clone());
    let outcome = workflow.complete_load(ticket, Ok(roster_for(&key, ids)));
    assert!(matches!(outcome, LoadOutcome::Ready { .. }));
    workflow
}

#[test]
fn load_moves_through_loading_to_ready() {
    let mut workflow: AttendanceWorkflow<StaffStatus> = AttendanceWorkflow::default();
    assert_eq!(workflow.state(), &WorkflowState::Idle);
    assert_eq!(workflow.key(), None);

    let key = date("2025-01-08");
    let ticket = workflow.begin_load(key.clone());
    assert!(workflow.is_loading());
    assert_eq!(ticket.key(), &key);
    assert!(workflow.session().is_none());

    match workflow.complete_load(ticket, Ok(roster_for(&key, &["A", "B"]))) {
        LoadOutcome::Ready { subjects } => assert_eq!(subjects, 2),
        other => panic!("unexpected outcome: {other:?}"),
    }
    let session = workflow.session().unwrap();
    assert_eq!(session.get(&id("A")).unwrap().status, StaffStatus::Absent);
    assert_eq!(session.get(&id("B")).unwrap().status, StaffStatus::Present);
}

#[test]
fn stale_load_is_discarded_after_key_change() {
    let mut workflow: AttendanceWorkflow<StaffStatus> = AttendanceWorkflow::default();
    let monday = date("2025-01-06");
    let tuesday = date("2025-01-07");

    let old_ticket = workflow.begin_load(monday.clone());
    let new_ticket = workflow.begin_load(tuesday.clone());

    let outcome = workflow.complete_load(old_ticket, Ok(roster_for(&monday, &["A"])));
    assert!(matches!(outcome, LoadOutcome::Stale));
    assert!(workflow.is_loading());
    assert_eq!(workflow.key(), Some(&tuesday));

    let outcome = workflow.complete_load(new_ticket, Ok(roster_for(&tuesday, &["B", "C"])));
    assert!(matches!(outcome, LoadOutcome::Ready { subjects: 2 }));
    assert!(!workflow.session().unwrap().contains(&id("A")));
}

#[test]
fn stale_failure_cannot_overwrite_a_newer_session() {
    let mut workflow: AttendanceWorkflow<StaffStatus> = AttendanceWorkflow::default();
    let old_ticket = workflow.begin_load(date("2025-01-06"));
    let key = date("2025-01-07");
    let new_ticket = workflow.begin_load(key.clone());
    workflow.complete_load(new_ticket, Ok(roster_for(&key, &["A"])));

    let outcome = workflow.complete_load(old_ticket, Err(StoreError::Transport("timeout".into())));

    assert!(matches!(outcome, LoadOutcome::Stale));
    assert!(workflow.session().is_some());
    assert_eq!(workflow.error_message(), None);
}

#[test]
fn failed_load_ends_in_failed_state() {
    let mut workflow: AttendanceWorkflow<StaffStatus> = AttendanceWorkflow::default();
    let key = date("2025-01-08");
    let ticket = workflow.begin_load(key.clone());

    let outcome = workflow.complete_load(
        ticket,
        Err(StoreError::Status {
            code: 500,
            message: "database offline".to_string(),
        }),
    );

    assert!(matches!(outcome, LoadOutcome::Failed(_)));
    assert!(!workflow.is_loading());
    assert_eq!(workflow.key(), Some(&key));
    assert!(workflow.error_message().unwrap().contains("database offline"));
    assert!(workflow.session().is_none());
    assert_eq!(workflow.begin_submit().unwrap_err(), WorkflowError::NotReady);
}

#[test]
fn reload_reissues_the_current_key() {
    let mut workflow = ready("2025-01-08", &["A"]);
    workflow.session_mut().unwrap().set_note(&id("A"), "unsaved");

    let ticket = workflow.reload().unwrap();
    assert_eq!(ticket.key(), &date("2025-01-08"));
    assert!(workflow.is_loading());

    let mut idle: AttendanceWorkflow<StaffStatus> = AttendanceWorkflow::default();
    assert!(idle.reload().is_none());
}

#[test]
fn successful_submit_marks_session_saved() {
    let mut workflow = ready("2025-01-08", &["A", "B"]);
    workflow
        .session_mut()
        .unwrap()
        .set_status(&id("B"), StaffStatus::OnPermission);

    let (ticket, batch) = workflow.begin_submit().unwrap();
    assert_eq!(batch.len(), 2);
    assert!(workflow.is_submitting());

    let outcome = workflow.complete_submit(ticket, Ok(2));
    assert!(matches!(
        outcome,
        SubmitOutcome::Saved {
            persisted: 2,
            clean: true
        }
    ));
    assert!(!workflow.is_submitting());
    assert!(workflow.session().unwrap().is_saved());
}

#[test]
fn second_submit_is_rejected_while_one_is_in_flight() {
    let mut workflow = ready("2025-01-08", &["A"]);

    let (ticket, _) = workflow.begin_submit().unwrap();
    assert_eq!(workflow.begin_submit().unwrap_err(), WorkflowError::SubmitInFlight);
    assert!(workflow.is_submitting());

    workflow.complete_submit(ticket, Ok(1));
    assert!(workflow.begin_submit().is_ok());
}

#[test]
fn failed_submit_preserves_entries_and_stays_unsaved() {
    let mut workflow = ready("2025-01-08", &["A", "B"]);
    let session = workflow.session_mut().unwrap();
    session.set_status(&id("B"), StaffStatus::Absent);
    session.set_note(&id("B"), "sick");
    let before = workflow.session().unwrap().clone();

    let (ticket, _) = workflow.begin_submit().unwrap();
    let outcome = workflow.complete_submit(ticket, Err(StoreError::Rejected("locked".into())));

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    let after = workflow.session().unwrap();
    assert!(!after.is_saved());
    assert_eq!(after.iter().collect::<Vec<_>>(), before.iter().collect::<Vec<_>>());
    assert!(workflow.begin_submit().is_ok());
}

#[test]
fn edit_during_submit_keeps_session_dirty() {
    let mut workflow = ready("2025-01-08", &["A", "B"]);

    let (ticket, batch) = workflow.begin_submit().unwrap();
    workflow
        .session_mut()
        .unwrap()
        .set_status(&id("A"), StaffStatus::Present);

    let outcome = workflow.complete_submit(ticket, Ok(batch.len()));
    assert!(matches!(outcome, SubmitOutcome::Saved { clean: false, .. }));
    assert!(!workflow.session().unwrap().is_saved());
}

#[test]
fn key_change_during_submit_makes_result_stale() {
    let mut workflow = ready("2025-01-08", &["A"]);
    let (ticket, _) = workflow.begin_submit().unwrap();

    let next = date("2025-01-09");
    workflow.begin_load(next.clone());
    let outcome = workflow.complete_submit(ticket, Ok(1));

    assert!(matches!(outcome, SubmitOutcome::Stale));
    assert!(workflow.is_loading());
    assert_eq!(workflow.key(), Some(&next));
}
