//! People model: employees, members and the `Subject` projection.
//!
//! # Responsibility
//! - Mirror the employee/member records served by the record store.
//! - Project both into one `Subject` shape for roster-driven logic.
//!
//! # Invariants
//! - `SubjectId` is never empty or whitespace-only.
//! - Person records are read-only from this crate's perspective.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identity of a person whose attendance is recorded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

/// Rejected subject identity input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSubjectId;

impl Display for InvalidSubjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "subject id must not be empty")
    }
}

impl Error for InvalidSubjectId {}

impl SubjectId {
    /// Builds an id from trimmed, non-empty text.
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidSubjectId> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(InvalidSubjectId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for SubjectId {
    type Error = InvalidSubjectId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubjectId> for String {
    fn from(value: SubjectId) -> Self {
        value.0
    }
}

impl Display for SubjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Staff role as stored by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmployeeRole {
    Trainer,
    Reception,
    Manager,
    Cleaner,
}

impl EmployeeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trainer => "Trainer",
            Self::Reception => "Reception",
            Self::Manager => "Manager",
            Self::Cleaner => "Cleaner",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Trainer" => Some(Self::Trainer),
            "Reception" => Some(Self::Reception),
            "Manager" => Some(Self::Manager),
            "Cleaner" => Some(Self::Cleaner),
            _ => None,
        }
    }
}

/// Employment state; not the same thing as a daily attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentStatus {
    Active,
    #[serde(rename = "On Permission")]
    OnPermission,
    Resigned,
}

/// Employee record as served by `GET /employees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "_id")]
    pub id: SubjectId,
    /// Human-facing staff code, e.g. `EMP-004`.
    pub employee_id: String,
    pub name: String,
    pub role: EmployeeRole,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EmploymentStatus>,
}

/// Gym member record as served by the members/class endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

/// Roster entry used by attendance logic, whatever the underlying record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    /// Role for staff, plan for members. Empty when unknown.
    pub category: String,
    /// Secondary human-facing code (staff code). Empty when unused.
    pub code: String,
    pub phone: String,
    pub email: String,
}

impl Subject {
    /// Minimal subject with only identity and display name.
    pub fn new(id: SubjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: String::new(),
            code: String::new(),
            phone: String::new(),
            email: String::new(),
        }
    }
}

impl From<Employee> for Subject {
    fn from(value: Employee) -> Self {
        Self {
            id: value.id,
            name: value.name,
            category: value.role.as_str().to_string(),
            code: value.employee_id,
            phone: value.phone,
            email: value.email,
        }
    }
}

impl From<Member> for Subject {
    fn from(value: Member) -> Self {
        Self {
            id: value.id,
            name: value.name,
            category: value.plan.unwrap_or_default(),
            code: String::new(),
            phone: value.phone,
            email: value.email,
        }
    }
}
