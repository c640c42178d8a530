//! REST-backed attendance record store.
//!
//! # Responsibility
//! - Fetch rosters and attendance records from the gym API.
//! - Send submit batches as one request per session.
//!
//! # Invariants
//! - Every request carries `Content-Type: application/json` and, when
//!   configured, a bearer token.
//! - Any non-2xx or `success: false` answer is an error; nothing is retried.

use crate::api::envelope::{decode_envelope, decode_required};
use crate::api::wire::{
    class_persisted_count, collect_records, staff_persisted_count, ClassBatchRequest,
    ClassBatchSummary, ClassRecordWire, StaffMarkRequest, StaffRecordWire,
};
use crate::config::ClientConfig;
use crate::model::attendance::{
    AttendanceBatch, AttendanceKey, AttendanceRecord, ClassStatus, StaffStatus,
};
use crate::model::person::{Employee, Member, Subject};
use crate::repo::attendance_store::{AttendanceStore, StoreError, StoreResult};
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

/// Blocking HTTP client for the attendance endpoints.
pub struct HttpAttendanceStore {
    client: Client,
    config: ClientConfig,
}

impl HttpAttendanceStore {
    /// Builds a client honoring the configured timeout.
    pub fn new(config: ClientConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn get_required<T: DeserializeOwned>(&self, path: &str) -> StoreResult<T> {
        let request = self.client.get(self.config.endpoint(path));
        let (status, body) = self.send("GET", path, request)?;
        decode_required(status, &body)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> StoreResult<Option<T>> {
        let request = self.client.post(self.config.endpoint(path)).json(body);
        let (status, body) = self.send("POST", path, request)?;
        decode_envelope(status, &body)
    }

    fn send(
        &self,
        method: &'static str,
        path: &str,
        request: RequestBuilder,
    ) -> StoreResult<(u16, Vec<u8>)> {
        let started_at = Instant::now();
        let mut request = request.header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.config.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|err| {
            warn!(
                "event=http_request module=api status=error method={method} path={path} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            StoreError::Transport(err.to_string())
        })?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|err| StoreError::Transport(err.to_string()))?
            .to_vec();
        debug!(
            "event=http_request module=api status=ok method={method} path={path} http_status={status} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok((status, body))
    }
}

impl AttendanceStore<StaffStatus> for HttpAttendanceStore {
    fn load_subjects(&self, key: &AttendanceKey) -> StoreResult<Vec<Subject>> {
        if key.as_date().is_none() {
            return Err(StoreError::UnsupportedKey(key.clone()));
        }
        let employees: Vec<Employee> = self.get_required("/employees")?;
        Ok(employees.into_iter().map(Subject::from).collect())
    }

    fn load_records(&self, key: &AttendanceKey) -> StoreResult<Vec<AttendanceRecord<StaffStatus>>> {
        if key.as_date().is_none() {
            return Err(StoreError::UnsupportedKey(key.clone()));
        }
        let rows: Vec<StaffRecordWire> =
            self.get_required(&format!("/employee-attendance/date/{key}"))?;
        collect_records::<StaffStatus, _>(rows, key)
    }

    fn submit_batch(&self, batch: &AttendanceBatch<StaffStatus>) -> StoreResult<usize> {
        let request = StaffMarkRequest::from_batch(batch)?;
        let saved: Option<Vec<serde_json::Value>> = self.post("/employee-attendance", &request)?;
        Ok(staff_persisted_count(saved, batch.len()))
    }
}

impl AttendanceStore<ClassStatus> for HttpAttendanceStore {
    fn load_subjects(&self, key: &AttendanceKey) -> StoreResult<Vec<Subject>> {
        let class_id = key
            .as_class_id()
            .ok_or_else(|| StoreError::UnsupportedKey(key.clone()))?;
        let members: Vec<Member> = self.get_required(&format!("/sessions/{class_id}/members"))?;
        Ok(members.into_iter().map(Subject::from).collect())
    }

    fn load_records(&self, key: &AttendanceKey) -> StoreResult<Vec<AttendanceRecord<ClassStatus>>> {
        let class_id = key
            .as_class_id()
            .ok_or_else(|| StoreError::UnsupportedKey(key.clone()))?;
        let rows: Vec<ClassRecordWire> =
            self.get_required(&format!("/attendance/session/{class_id}"))?;
        collect_records::<ClassStatus, _>(rows, key)
    }

    fn submit_batch(&self, batch: &AttendanceBatch<ClassStatus>) -> StoreResult<usize> {
        let request = ClassBatchRequest::from_batch(batch)?;
        let summary: Option<ClassBatchSummary> = self.post("/attendance/batch", &request)?;
        Ok(class_persisted_count(summary, batch.len()))
    }
}
