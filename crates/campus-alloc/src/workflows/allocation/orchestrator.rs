use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use super::bursary::{BursaryAssigner, BursaryAward};
use super::cursor::DepartmentRoster;
use super::domain::{
    Assignment, ErrorCode, Report, ResourceRecord, Subject, SubjectId, SubjectRecord,
};
use super::eligibility::EligibilityChain;
use super::notify::{Listener, ListenerId, NotificationBus};
use super::registry::{RegistryError, ResourceRegistry};
use super::strategy::{AllocationBatch, AllocationPolicy, AllocationStrategy};

/// Errors raised while wiring the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("subject {0} registered twice")]
    DuplicateSubject(SubjectId),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Collaborators injected into the orchestrator.
pub struct PipelineComponents {
    pub strategies: Vec<Box<dyn AllocationStrategy>>,
    pub chain: EligibilityChain,
    pub bus: NotificationBus,
}

impl PipelineComponents {
    pub fn new(
        strategies: Vec<Box<dyn AllocationStrategy>>,
        chain: EligibilityChain,
        bus: NotificationBus,
    ) -> Self {
        Self {
            strategies,
            chain,
            bus,
        }
    }

    pub fn from_policy(policy: AllocationPolicy, chain: EligibilityChain) -> Self {
        Self::new(policy.strategies(), chain, NotificationBus::new())
    }

    pub fn with_listener(mut self, listener: Arc<dyn Listener>) -> Self {
        self.bus.subscribe(listener);
        self
    }
}

/// Facade running strategy, eligibility chain, and notification per subject.
pub struct AllocationOrchestrator {
    subjects: Vec<Subject>,
    index: HashMap<SubjectId, usize>,
    registry: ResourceRegistry,
    strategies: Vec<Box<dyn AllocationStrategy>>,
    chain: EligibilityChain,
    bus: NotificationBus,
}

impl AllocationOrchestrator {
    pub fn initialize(
        subjects: Vec<SubjectRecord>,
        resources: Vec<ResourceRecord>,
        components: PipelineComponents,
    ) -> Result<Self, SetupError> {
        let mut index = HashMap::with_capacity(subjects.len());
        for (position, record) in subjects.iter().enumerate() {
            if index.insert(record.id, position).is_some() {
                return Err(SetupError::DuplicateSubject(record.id));
            }
        }

        let registry = ResourceRegistry::new(resources)?;
        let PipelineComponents {
            strategies,
            chain,
            bus,
        } = components;

        info!(
            subjects = subjects.len(),
            resources = registry.len(),
            strategies = strategies.len(),
            listeners = bus.len(),
            "allocation pipeline initialized"
        );

        Ok(Self {
            subjects: subjects.into_iter().map(Subject::from).collect(),
            index,
            registry,
            strategies,
            chain,
            bus,
        })
    }

    /// Process every subject in input order. A failing subject only affects
    /// its own report.
    pub fn run(&mut self) -> Vec<Report> {
        let reports: Vec<Report> = (0..self.subjects.len())
            .map(|position| self.process_at(position))
            .collect();

        let failed = reports.iter().filter(|r| !r.is_complete()).count();
        info!(processed = reports.len(), failed, "allocation run complete");
        reports
    }

    pub fn process_subject(&mut self, id: SubjectId) -> Report {
        match self.index.get(&id) {
            Some(&position) => self.process_at(position),
            None => {
                warn!(subject = %id, "subject not registered");
                Report::failed(id, ErrorCode::NotFound)
            }
        }
    }

    fn process_at(&mut self, position: usize) -> Report {
        let subject = &mut self.subjects[position];
        let id = subject.id;

        let mut resource = None;
        let mut department = None;
        let selected = self.strategies.iter().find(|s| s.selects(subject));
        match selected {
            Some(strategy) => {
                let mut batch = strategy.allocate(std::slice::from_ref(subject), &self.registry);
                if let Some(failure) = batch.failures.first() {
                    warn!(
                        subject = %id,
                        strategy = strategy.name(),
                        error = %failure.error,
                        "allocation step failed"
                    );
                    return Report::failed(id, error_code(&failure.error));
                }
                if let Some(result) = batch.results.pop() {
                    if let Some(assigned) = result.resource {
                        subject.assignment = Some(Assignment {
                            resource: assigned,
                            descriptor: result.descriptor,
                        });
                    }
                    if let Some(placed) = &result.department {
                        subject.current_department = Some(placed.clone());
                    }
                    resource = result.resource;
                    department = result.department;
                }
            }
            None => debug!(subject = %id, "no strategy selects subject"),
        }

        let verdict = self.chain.evaluate(subject);
        subject.eligible = Some(verdict.is_eligible());

        let summary = self.bus.publish(subject);

        debug!(
            subject = %id,
            eligible = verdict.is_eligible(),
            delivered = summary.delivered,
            listener_failures = summary.failures.len(),
            "subject processed"
        );

        Report {
            subject: id,
            resource,
            department,
            eligible: verdict.is_eligible(),
            decided_by: verdict.handler().map(str::to_string),
            error: None,
            notified: summary.delivered,
        }
    }

    /// Run one strategy across the whole subject set without touching
    /// subject state.
    pub fn allocate_with(&self, strategy: &dyn AllocationStrategy) -> AllocationBatch {
        strategy.allocate(&self.subjects, &self.registry)
    }

    pub fn department_roster(&self, department: &str) -> DepartmentRoster<'_> {
        DepartmentRoster::new(department, &self.subjects)
    }

    pub fn assign_bursaries<R: Rng>(
        &mut self,
        assigner: &mut BursaryAssigner<R>,
    ) -> Vec<BursaryAward> {
        assigner.assign(&mut self.subjects)
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        let position = *self.index.get(&id)?;
        self.subjects.get(position)
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn chain(&self) -> &EligibilityChain {
        &self.chain
    }

    pub fn bus_mut(&mut self) -> &mut NotificationBus {
        &mut self.bus
    }

    pub fn subscribe(&mut self, listener: Arc<dyn Listener>) -> ListenerId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }
}

fn error_code(error: &RegistryError) -> ErrorCode {
    match error {
        RegistryError::NoResourceAvailable(_) => ErrorCode::NoResourceAvailable,
        RegistryError::NotFound(_) | RegistryError::Duplicate(_) => ErrorCode::NotFound,
    }
}
