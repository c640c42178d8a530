//! SQLite-backed attendance record store.
//!
//! # Responsibility
//! - Serve staff and class rosters plus their attendance records from a
//!   local database.
//! - Persist submit batches with upsert semantics.
//!
//! # Invariants
//! - One row per (employee, date) and per (class, member); a later batch
//!   overwrites the earlier row.
//! - A batch is written in one transaction: all entries or none.
//! - Read paths reject rows whose status or role text is not a known value.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::attendance::{
    AttendanceBatch, AttendanceKey, AttendanceRecord, AttendanceStatus, ClassStatus, StaffStatus,
    DATE_KEY_FORMAT,
};
use crate::model::person::{Employee, EmployeeRole, Member, Subject, SubjectId};
use crate::repo::attendance_store::{AttendanceStore, StoreError, StoreResult};
use chrono::NaiveDate;
use log::info;
use rusqlite::{params, Connection, Row};

/// Local record store over a migrated SQLite connection.
pub struct SqliteAttendanceStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceStore<'conn> {
    /// Wraps a connection whose schema is fully migrated.
    ///
    /// # Errors
    /// - `DbError::SchemaNotReady` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let db_version = current_user_version(conn)?;
        let expected = latest_version();
        if db_version != expected {
            return Err(DbError::SchemaNotReady {
                db_version,
                expected,
            }
            .into());
        }
        Ok(Self { conn })
    }

    /// Adds or replaces one employee.
    pub fn upsert_employee(&self, employee: &Employee) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO employees (id, employee_code, name, role, phone, email)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                employee_code = excluded.employee_code,
                name = excluded.name,
                role = excluded.role,
                phone = excluded.phone,
                email = excluded.email;",
            params![
                employee.id.as_str(),
                employee.employee_id.as_str(),
                employee.name.as_str(),
                employee.role.as_str(),
                employee.phone.as_str(),
                employee.email.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Adds or replaces one member.
    pub fn upsert_member(&self, member: &Member) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO members (id, name, phone, email, plan)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                phone = excluded.phone,
                email = excluded.email,
                plan = excluded.plan;",
            params![
                member.id.as_str(),
                member.name.as_str(),
                member.phone.as_str(),
                member.email.as_str(),
                member.plan.as_deref(),
            ],
        )?;
        Ok(())
    }

    /// Creates a class, or renames/reschedules an existing one.
    pub fn upsert_class(&self, class_id: &str, title: &str, date: NaiveDate) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO classes (id, title, class_date)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                class_date = excluded.class_date;",
            params![
                class_id,
                title,
                date.format(DATE_KEY_FORMAT).to_string()
            ],
        )?;
        Ok(())
    }

    /// Enrolls a member in a class. Enrolling twice is a no-op.
    pub fn enroll(&self, class_id: &str, member_id: &SubjectId) -> StoreResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO class_members (class_id, member_id) VALUES (?1, ?2);",
            params![class_id, member_id.as_str()],
        )?;
        Ok(())
    }

    /// Removes a member from a class roster. Their past records stay.
    pub fn unenroll(&self, class_id: &str, member_id: &SubjectId) -> StoreResult<()> {
        self.conn.execute(
            "DELETE FROM class_members WHERE class_id = ?1 AND member_id = ?2;",
            params![class_id, member_id.as_str()],
        )?;
        Ok(())
    }

    fn staff_roster(&self) -> StoreResult<Vec<Subject>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, employee_code, name, role, phone, email
             FROM employees
             ORDER BY name COLLATE NOCASE ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            let id = parse_subject_id(row, "id")?;
            let role_text: String = row.get("role")?;
            let role = EmployeeRole::parse(&role_text).ok_or_else(|| {
                StoreError::InvalidData(format!("invalid role `{role_text}` for employee {id}"))
            })?;
            subjects.push(Subject {
                id,
                name: row.get("name")?,
                category: role.as_str().to_string(),
                code: row.get("employee_code")?,
                phone: row.get("phone")?,
                email: row.get("email")?,
            });
        }
        Ok(subjects)
    }

    fn class_roster(&self, class_id: &str) -> StoreResult<Vec<Subject>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.id, m.name, m.phone, m.email, m.plan
             FROM class_members cm
             JOIN members m ON m.id = cm.member_id
             WHERE cm.class_id = ?1
             ORDER BY m.name COLLATE NOCASE ASC, m.id ASC;",
        )?;
        let mut rows = stmt.query([class_id])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            subjects.push(Subject {
                id: parse_subject_id(row, "id")?,
                name: row.get("name")?,
                category: row.get::<_, Option<String>>("plan")?.unwrap_or_default(),
                code: String::new(),
                phone: row.get("phone")?,
                email: row.get("email")?,
            });
        }
        Ok(subjects)
    }
}

impl AttendanceStore<StaffStatus> for SqliteAttendanceStore<'_> {
    fn load_subjects(&self, key: &AttendanceKey) -> StoreResult<Vec<Subject>> {
        require_date(key)?;
        self.staff_roster()
    }

    fn load_records(&self, key: &AttendanceKey) -> StoreResult<Vec<AttendanceRecord<StaffStatus>>> {
        let date = require_date(key)?;
        let mut stmt = self.conn.prepare(
            "SELECT employee_id, status, note
             FROM staff_attendance
             WHERE attendance_date = ?1
             ORDER BY employee_id ASC;",
        )?;
        let mut rows = stmt.query([date])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row, "employee_id", key)?);
        }
        Ok(records)
    }

    fn submit_batch(&self, batch: &AttendanceBatch<StaffStatus>) -> StoreResult<usize> {
        let date = require_date(&batch.key)?;
        let tx = self.conn.unchecked_transaction()?;
        for entry in &batch.entries {
            tx.execute(
                "INSERT INTO staff_attendance (employee_id, attendance_date, status, note)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(employee_id, attendance_date) DO UPDATE SET
                    status = excluded.status,
                    note = excluded.note,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![
                    entry.subject_id.as_str(),
                    date.as_str(),
                    entry.status.as_str(),
                    note_to_db(&entry.note),
                ],
            )?;
        }
        tx.commit()?;
        info!(
            "event=attendance_submit module=sqlite_store status=ok kind=staff key={} entries={}",
            batch.key,
            batch.len()
        );
        Ok(batch.len())
    }
}

impl AttendanceStore<ClassStatus> for SqliteAttendanceStore<'_> {
    fn load_subjects(&self, key: &AttendanceKey) -> StoreResult<Vec<Subject>> {
        let class_id = require_class(key)?;
        self.class_roster(class_id)
    }

    fn load_records(&self, key: &AttendanceKey) -> StoreResult<Vec<AttendanceRecord<ClassStatus>>> {
        let class_id = require_class(key)?;
        let mut stmt = self.conn.prepare(
            "SELECT member_id, status, note
             FROM class_attendance
             WHERE class_id = ?1
             ORDER BY member_id ASC;",
        )?;
        let mut rows = stmt.query([class_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row, "member_id", key)?);
        }
        Ok(records)
    }

    fn submit_batch(&self, batch: &AttendanceBatch<ClassStatus>) -> StoreResult<usize> {
        let class_id = require_class(&batch.key)?;
        let tx = self.conn.unchecked_transaction()?;
        for entry in &batch.entries {
            tx.execute(
                "INSERT INTO class_attendance (class_id, member_id, status, note)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(class_id, member_id) DO UPDATE SET
                    status = excluded.status,
                    note = excluded.note,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![
                    class_id,
                    entry.subject_id.as_str(),
                    entry.status.as_str(),
                    note_to_db(&entry.note),
                ],
            )?;
        }
        tx.commit()?;
        info!(
            "event=attendance_submit module=sqlite_store status=ok kind=class key={} entries={}",
            batch.key,
            batch.len()
        );
        Ok(batch.len())
    }
}

fn require_date(key: &AttendanceKey) -> StoreResult<String> {
    key.as_date()
        .map(|date| date.format(DATE_KEY_FORMAT).to_string())
        .ok_or_else(|| StoreError::UnsupportedKey(key.clone()))
}

fn require_class(key: &AttendanceKey) -> StoreResult<&str> {
    key.as_class_id()
        .ok_or_else(|| StoreError::UnsupportedKey(key.clone()))
}

fn parse_subject_id(row: &Row<'_>, column: &str) -> StoreResult<SubjectId> {
    let text: String = row.get(column)?;
    SubjectId::new(text.as_str())
        .map_err(|_| StoreError::InvalidData(format!("empty subject id in column `{column}`")))
}

fn parse_record_row<S: AttendanceStatus>(
    row: &Row<'_>,
    subject_column: &str,
    key: &AttendanceKey,
) -> StoreResult<AttendanceRecord<S>> {
    let subject_id = parse_subject_id(row, subject_column)?;
    let status_text: String = row.get("status")?;
    let status = S::parse(&status_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid status `{status_text}` for subject {subject_id}"
        ))
    })?;
    Ok(AttendanceRecord {
        subject_id,
        key: key.clone(),
        status,
        note: row.get("note")?,
    })
}

fn note_to_db(note: &str) -> Option<&str> {
    if note.is_empty() {
        None
    } else {
        Some(note)
    }
}
