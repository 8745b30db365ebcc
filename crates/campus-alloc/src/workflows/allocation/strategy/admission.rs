use super::super::domain::{ResourceKind, Subject};
use super::AllocationStrategy;

/// Places applicants into one department. Applicants for any department
/// listed through [`AdmissionStrategy::accepting`] are placed here too, and
/// a lab computer is reserved when the department teaches on one.
#[derive(Debug, Clone)]
pub struct AdmissionStrategy {
    department: String,
    accepts: Vec<String>,
    lab: Option<ResourceKind>,
    name: String,
}

impl AdmissionStrategy {
    pub fn new(department: impl Into<String>) -> Self {
        let department = department.into();
        let name = format!("{department} admission");
        Self {
            department,
            accepts: Vec::new(),
            lab: None,
            name,
        }
    }

    pub fn computer_science() -> Self {
        Self::new("Computer Science")
    }

    pub fn mathematics() -> Self {
        Self::new("Mathematics")
    }

    /// Also admit applicants who applied for `category`.
    pub fn accepting(mut self, category: impl Into<String>) -> Self {
        self.accepts.push(category.into());
        self
    }

    pub fn with_lab(mut self, kind: ResourceKind) -> Self {
        self.lab = Some(kind);
        self
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn lab(&self) -> Option<ResourceKind> {
        self.lab
    }
}

impl AllocationStrategy for AdmissionStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn selects(&self, subject: &Subject) -> bool {
        subject.in_category(&self.department)
            || self.accepts.iter().any(|c| subject.in_category(c))
    }

    fn required_kind(&self, _subject: &Subject) -> Option<ResourceKind> {
        self.lab
    }

    fn placement(&self, _subject: &Subject) -> Option<&str> {
        Some(&self.department)
    }
}
