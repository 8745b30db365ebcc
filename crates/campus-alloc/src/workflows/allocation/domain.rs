use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Registration number of a subject, unique within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub u32);

impl SubjectId {
    pub const fn is_even(self) -> bool {
        self.0 % 2 == 0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lab computer number, unique within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u32);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operating-system family a resource runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Linux,
    Windows,
    MacOs,
}

impl ResourceKind {
    pub const fn label(self) -> &'static str {
        match self {
            ResourceKind::Linux => "Linux",
            ResourceKind::Windows => "Windows",
            ResourceKind::MacOs => "macOS",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource kind '{0}'")]
pub struct UnknownResourceKind(pub String);

impl FromStr for ResourceKind {
    type Err = UnknownResourceKind;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(ResourceKind::Linux),
            "windows" => Ok(ResourceKind::Windows),
            "macos" | "mac" | "osx" => Ok(ResourceKind::MacOs),
            _ => Err(UnknownResourceKind(raw.trim().to_string())),
        }
    }
}

/// Setup-time description of a subject, as supplied by an importer or request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub id: SubjectId,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub marks: Option<String>,
}

/// Setup-time description of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: ResourceId,
    pub kind: ResourceKind,
    #[serde(default)]
    pub tools: String,
}

/// A lab computer held by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub id: ResourceId,
    pub kind: ResourceKind,
    pub tools: String,
}

impl From<ResourceRecord> for Resource {
    fn from(record: ResourceRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind,
            tools: record.tools,
        }
    }
}

/// Resource currently assigned to a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub resource: ResourceId,
    pub descriptor: String,
}

/// A student moving through the pipeline. `category` is the department the
/// student applied for; the status fields start empty and are filled in by
/// strategies, the eligibility chain and the bursary assigner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub category: String,
    pub current_department: Option<String>,
    pub details: String,
    pub marks: Option<String>,
    pub assignment: Option<Assignment>,
    pub eligible: Option<bool>,
    pub bursary: Option<u32>,
}

impl Subject {
    pub fn new(id: SubjectId, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            current_department: None,
            details: String::new(),
            marks: None,
            assignment: None,
            eligible: None,
            bursary: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn with_marks(mut self, marks: impl Into<String>) -> Self {
        self.marks = Some(marks.into());
        self
    }

    /// Whether the student applied for `category`.
    pub fn in_category(&self, category: &str) -> bool {
        self.category.trim().eq_ignore_ascii_case(category.trim())
    }

    /// Department the student currently belongs to: the admitting
    /// department once placed, otherwise the one applied for.
    pub fn department(&self) -> &str {
        self.current_department.as_deref().unwrap_or(&self.category)
    }

    pub fn in_department(&self, department: &str) -> bool {
        let department = department.trim();
        self.department().trim().eq_ignore_ascii_case(department)
    }

    /// Multi-line rendering used by listeners and the CLI.
    pub fn details_summary(&self) -> String {
        let assignment = self
            .assignment
            .as_ref()
            .map(|assignment| assignment.descriptor.clone())
            .unwrap_or_else(|| "unassigned".to_string());
        let eligibility = match self.eligible {
            Some(true) => "eligible",
            Some(false) => "not eligible",
            None => "pending",
        };

        format!(
            "Name: {}\nSelected Department: {}\nCurrent Department: {}\n\
             Marks: {}\nAssignment: {}\nEligibility: {}",
            self.name,
            self.category,
            self.current_department.as_deref().unwrap_or("-"),
            self.marks.as_deref().unwrap_or("-"),
            assignment,
            eligibility
        )
    }
}

impl From<SubjectRecord> for Subject {
    fn from(record: SubjectRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            category: record.category,
            current_department: None,
            details: record.details,
            marks: record.marks,
            assignment: None,
            eligible: None,
            bursary: None,
        }
    }
}

/// What a strategy run decided for one subject: a computer, a department
/// placement, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationResult {
    pub subject: SubjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub descriptor: String,
}

impl AllocationResult {
    /// `(subject, resource)` when a computer was allocated.
    pub fn pair(&self) -> Option<(u32, u32)> {
        self.resource.map(|resource| (self.subject.0, resource.0))
    }
}

/// Machine-readable reason a report could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    NoResourceAvailable,
}

impl ErrorCode {
    pub const fn label(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "not_found",
            ErrorCode::NoResourceAvailable => "no_resource_available",
        }
    }
}

/// Outcome of processing one subject through the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub subject: SubjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
    pub notified: usize,
}

impl Report {
    pub(crate) fn failed(subject: SubjectId, error: ErrorCode) -> Self {
        Self {
            subject,
            resource: None,
            department: None,
            eligible: false,
            decided_by: None,
            error: Some(error),
            notified: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}
