use gymdesk_core::db::open_db_in_memory;
use gymdesk_core::model::person::EmployeeRole;
use gymdesk_core::{
    AttendanceBatch, AttendanceKey, AttendanceRate, AttendanceRecord, AttendanceService,
    AttendanceStore, ClassStatus, Employee, ServiceError, SqliteAttendanceStore, StaffStatus,
    StoreError, StoreResult, Subject, SubjectId, SubmitReport, WorkflowError,
};
use std::cell::{Cell, RefCell};

fn id(value: &str) -> SubjectId {
    SubjectId::new(value).unwrap()
}

/// In-memory class store with switchable failures.
#[derive(Default)]
struct FakeClassStore {
    members: Vec<Subject>,
    records: RefCell<Vec<AttendanceRecord<ClassStatus>>>,
    submitted: RefCell<Vec<AttendanceBatch<ClassStatus>>>,
    fail_loads: Cell<bool>,
    fail_submits: Cell<bool>,
}

impl FakeClassStore {
    fn with_members(ids: &[&str]) -> Self {
        Self {
            members: ids
                .iter()
                .map(|value| Subject::new(id(value), value.to_uppercase()))
                .collect(),
            ..Self::default()
        }
    }
}

impl AttendanceStore<ClassStatus> for FakeClassStore {
    fn load_subjects(&self, _key: &AttendanceKey) -> StoreResult<Vec<Subject>> {
        if self.fail_loads.get() {
            return Err(StoreError::Transport("connection refused".to_string()));
        }
        Ok(self.members.clone())
    }

    fn load_records(&self, key: &AttendanceKey) -> StoreResult<Vec<AttendanceRecord<ClassStatus>>> {
        Ok(self
            .records
            .borrow()
            .iter()
            .filter(|record| &record.key == key)
            .cloned()
            .collect())
    }

    fn submit_batch(&self, batch: &AttendanceBatch<ClassStatus>) -> StoreResult<usize> {
        if self.fail_submits.get() {
            return Err(StoreError::Status {
                code: 500,
                message: "Server error".to_string(),
            });
        }
        let mut records = self.records.borrow_mut();
        for entry in &batch.entries {
            records.retain(|record| !(record.key == batch.key && record.subject_id == entry.subject_id));
            let record = AttendanceRecord::new(entry.subject_id.clone(), batch.key.clone(), entry.status);
            records.push(if entry.note.is_empty() {
                record
            } else {
                record.with_note(entry.note.clone())
            });
        }
        self.submitted.borrow_mut().push(batch.clone());
        Ok(batch.len())
    }
}

fn class_service(store: &FakeClassStore) -> AttendanceService<ClassStatus, &FakeClassStore> {
    AttendanceService::new(store)
}

fn class_key() -> AttendanceKey {
    AttendanceKey::class("TC-201").unwrap()
}

#[test]
fn select_builds_an_all_present_session() {
    let store = FakeClassStore::with_members(&["m1", "m2", "m3"]);
    let mut service = class_service(&store);

    assert_eq!(service.select(class_key()).unwrap(), 3);

    let summary = service.summary().unwrap();
    assert_eq!(summary.present(), 3);
    assert_eq!(summary.rate(), AttendanceRate::Percent(100));
}

#[test]
fn toggle_submit_and_reload_round_trip() {
    let store = FakeClassStore::with_members(&["m1", "m2"]);
    let mut service = class_service(&store);
    service.select(class_key()).unwrap();

    assert!(service.toggle(&id("m2")));
    assert!(service.set_note(&id("m2"), "travelling"));
    assert!(!service.toggle(&id("ghost")));

    let report = service.submit().unwrap();
    assert_eq!(
        report,
        SubmitReport {
            persisted: 2,
            clean: true
        }
    );
    assert!(service.session().unwrap().is_saved());
    assert_eq!(store.submitted.borrow().len(), 1);

    service.reload().unwrap();
    let session = service.session().unwrap();
    assert!(!session.is_saved());
    let m2 = session.get(&id("m2")).unwrap();
    assert_eq!(m2.status, ClassStatus::Absent);
    assert_eq!(m2.note, "travelling");
    assert_eq!(service.summary().unwrap().rate(), AttendanceRate::Percent(50));
}

#[test]
fn submit_failure_keeps_edits_for_retry() {
    let store = FakeClassStore::with_members(&["m1", "m2"]);
    let mut service = class_service(&store);
    service.select(class_key()).unwrap();
    service.set_status(&id("m1"), ClassStatus::Absent);
    let before: Vec<_> = service
        .session()
        .unwrap()
        .iter()
        .map(|(id, entry)| (id.clone(), entry.clone()))
        .collect();

    store.fail_submits.set(true);
    let err = service.submit().unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::Status { code: 500, .. })));
    assert_eq!(err.user_message(), "Server error");

    let session = service.session().unwrap();
    assert!(!session.is_saved());
    let after: Vec<_> = session
        .iter()
        .map(|(id, entry)| (id.clone(), entry.clone()))
        .collect();
    assert_eq!(after, before);

    store.fail_submits.set(false);
    assert!(service.submit().unwrap().clean);
}

#[test]
fn failed_load_is_reported_and_blocks_edits() {
    let store = FakeClassStore::with_members(&["m1"]);
    store.fail_loads.set(true);
    let mut service = class_service(&store);

    let err = service.select(class_key()).unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::Transport(_))));
    assert!(service.workflow().error_message().is_some());
    assert!(!service.mark_all_present());
    assert!(!service.set_status(&id("m1"), ClassStatus::Absent));
    assert!(matches!(
        service.submit().unwrap_err(),
        ServiceError::Workflow(WorkflowError::NotReady)
    ));

    store.fail_loads.set(false);
    assert_eq!(service.reload().unwrap(), 1);
}

#[test]
fn reload_without_selection_is_not_ready() {
    let store = FakeClassStore::default();
    let mut service = class_service(&store);

    assert!(matches!(
        service.reload().unwrap_err(),
        ServiceError::Workflow(WorkflowError::NotReady)
    ));
    assert!(service.summary().is_none());
}

#[test]
fn empty_class_summarizes_to_placeholder() {
    let store = FakeClassStore::default();
    let mut service = class_service(&store);

    assert_eq!(service.select(class_key()).unwrap(), 0);
    assert_eq!(service.summary().unwrap().rate().to_string(), "—");
}

#[test]
fn staff_service_over_sqlite_navigates_dates() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteAttendanceStore::try_new(&conn).unwrap();
    store
        .upsert_employee(&Employee {
            id: id("e1"),
            employee_id: "EMP-001".to_string(),
            name: "Ana".to_string(),
            role: EmployeeRole::Trainer,
            phone: String::new(),
            email: String::new(),
            status: None,
        })
        .unwrap();

    let mut service: AttendanceService<StaffStatus, _> = AttendanceService::new(&store);
    service.select(AttendanceKey::date("2025-01-31").unwrap()).unwrap();
    service.set_status(&id("e1"), StaffStatus::OnPermission);
    service.submit().unwrap();

    service.shift_date(1).unwrap();
    assert_eq!(
        service.workflow().key(),
        Some(&AttendanceKey::date("2025-02-01").unwrap())
    );
    assert_eq!(
        service.session().unwrap().get(&id("e1")).unwrap().status,
        StaffStatus::Present
    );

    service.shift_date(-1).unwrap();
    assert_eq!(
        service.session().unwrap().get(&id("e1")).unwrap().status,
        StaffStatus::OnPermission
    );

    assert!(service.mark_all_present());
    assert_eq!(service.summary().unwrap().present(), 1);
}

#[test]
fn shift_date_needs_a_date_key() {
    let store = FakeClassStore::with_members(&["m1"]);
    let mut service = class_service(&store);
    service.select(class_key()).unwrap();

    assert!(matches!(
        service.shift_date(1).unwrap_err(),
        ServiceError::Workflow(WorkflowError::NotReady)
    ));
}
