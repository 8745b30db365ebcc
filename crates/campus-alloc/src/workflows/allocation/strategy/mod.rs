mod admission;
mod parity;

pub use admission::AdmissionStrategy;
pub use parity::{Parity, ParityStrategy};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{AllocationResult, Resource, ResourceKind, Subject, SubjectId};
use super::registry::{RegistryError, ResourceRegistry};

/// Policy deciding which subjects a strategy handles and what they receive.
///
/// Implementors only describe selection, the computer requirement and the
/// department placement; the provided `allocate` walks subjects in input
/// order, so results are deterministic for a fixed ordering.
pub trait AllocationStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn selects(&self, subject: &Subject) -> bool;

    /// Kind of computer the subject needs, if the strategy hands one out.
    fn required_kind(&self, subject: &Subject) -> Option<ResourceKind>;

    /// Department the subject is placed in, if the strategy admits.
    fn placement(&self, _subject: &Subject) -> Option<&str> {
        None
    }

    /// Decide every selected subject. A computer comes from the first
    /// resource of the required kind; a failed lookup is recorded against
    /// that subject and the batch continues.
    fn allocate(&self, subjects: &[Subject], registry: &ResourceRegistry) -> AllocationBatch {
        let mut batch = AllocationBatch::new(self.name());

        for subject in subjects.iter().filter(|subject| self.selects(subject)) {
            let resource = match self.required_kind(subject) {
                Some(kind) => match registry.first_of_kind(kind) {
                    Ok(resource) => Some(resource),
                    Err(error) => {
                        debug!(
                            strategy = self.name(),
                            subject = %subject.id,
                            %error,
                            "allocation failed"
                        );
                        batch.failures.push(AllocationFailure {
                            subject: subject.id,
                            error,
                        });
                        continue;
                    }
                },
                None => None,
            };
            let department = self.placement(subject);

            debug!(
                strategy = self.name(),
                subject = %subject.id,
                resource = ?resource.map(|resource| resource.id),
                department,
                "allocated"
            );
            batch.results.push(AllocationResult {
                subject: subject.id,
                resource: resource.map(|resource| resource.id),
                department: department.map(str::to_string),
                descriptor: describe(self.name(), subject, department, resource),
            });
        }

        batch
    }
}

fn describe(
    strategy: &str,
    subject: &Subject,
    department: Option<&str>,
    resource: Option<&Resource>,
) -> String {
    match (department, resource) {
        (Some(department), Some(resource)) => format!(
            "{} admitted to {} and allocated {} computer {}",
            subject.name, department, resource.kind, resource.id
        ),
        (Some(department), None) => format!("{} admitted to {}", subject.name, department),
        (None, Some(resource)) => format!(
            "{} allocated {} computer {}",
            subject.name, resource.kind, resource.id
        ),
        (None, None) => format!("{} selected by {}", subject.name, strategy),
    }
}

/// Subject whose allocation could not be completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationFailure {
    pub subject: SubjectId,
    pub error: RegistryError,
}

/// Ordered output of one strategy invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationBatch {
    strategy: String,
    pub(crate) results: Vec<AllocationResult>,
    pub(crate) failures: Vec<AllocationFailure>,
}

impl AllocationBatch {
    fn new(strategy: &str) -> Self {
        Self {
            strategy: strategy.to_string(),
            results: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn results(&self) -> &[AllocationResult] {
        &self.results
    }

    pub fn failures(&self) -> &[AllocationFailure] {
        &self.failures
    }

    /// `(subject, resource)` pairs in allocation order, skipping results
    /// without a computer.
    pub fn pairs(&self) -> Vec<(u32, u32)> {
        self.results
            .iter()
            .filter_map(AllocationResult::pair)
            .collect()
    }

    /// `(subject, department)` placements in allocation order.
    pub fn placements(&self) -> Vec<(SubjectId, &str)> {
        self.results
            .iter()
            .filter_map(|result| Some((result.subject, result.department.as_deref()?)))
            .collect()
    }

    pub fn descriptors(&self) -> Vec<&str> {
        self.results
            .iter()
            .map(|result| result.descriptor.as_str())
            .collect()
    }
}

/// Named presets selectable from configuration or a request payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Odd registration numbers get Linux, even ones Windows.
    Parity,
    /// Applicants are admitted into Computer Science or Mathematics.
    Department,
}

impl AllocationPolicy {
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "parity" => Some(Self::Parity),
            "department" | "admission" => Some(Self::Department),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            AllocationPolicy::Parity => "parity",
            AllocationPolicy::Department => "department",
        }
    }

    pub fn names() -> Vec<&'static str> {
        vec![Self::Parity.name(), Self::Department.name()]
    }

    pub fn strategies(self) -> Vec<Box<dyn AllocationStrategy>> {
        match self {
            AllocationPolicy::Parity => vec![
                Box::new(ParityStrategy::odd_linux()),
                Box::new(ParityStrategy::even_windows()),
            ],
            AllocationPolicy::Department => vec![
                Box::new(AdmissionStrategy::computer_science()),
                Box::new(AdmissionStrategy::mathematics()),
            ],
        }
    }
}
