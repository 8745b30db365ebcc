use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::allocation::domain::{
    ResourceId, ResourceKind, ResourceRecord, Subject, SubjectId, SubjectRecord,
};
use crate::workflows::allocation::eligibility::EligibilityChain;
use crate::workflows::allocation::notify::{Listener, ListenerError, NoticeLog};
use crate::workflows::allocation::orchestrator::{AllocationOrchestrator, PipelineComponents};
use crate::workflows::allocation::registry::ResourceRegistry;
use crate::workflows::allocation::strategy::AllocationPolicy;

pub(super) fn subject_record(
    id: u32,
    name: &str,
    category: &str,
    details: &str,
    marks: Option<&str>,
) -> SubjectRecord {
    SubjectRecord {
        id: SubjectId(id),
        name: name.to_string(),
        category: category.to_string(),
        details: details.to_string(),
        marks: marks.map(str::to_string),
    }
}

/// The four students of the computer-lab roster.
pub(super) fn lab_records() -> Vec<SubjectRecord> {
    vec![
        subject_record(
            1,
            "Alice",
            "Computer Science",
            "High School Transcript: Excellent",
            Some("A+"),
        ),
        subject_record(
            2,
            "Bob",
            "Electrical Engineering",
            "High School Transcript: Good",
            Some("B"),
        ),
        subject_record(3, "Charlie", "Mechanical Engineering", "", Some("A")),
        subject_record(4, "Diana", "Physics", "", None),
    ]
}

pub(super) fn lab_subjects() -> Vec<Subject> {
    lab_records().into_iter().map(Subject::from).collect()
}

pub(super) fn resource_record(id: u32, kind: ResourceKind, tools: &str) -> ResourceRecord {
    ResourceRecord {
        id: ResourceId(id),
        kind,
        tools: tools.to_string(),
    }
}

pub(super) fn lab_resources() -> Vec<ResourceRecord> {
    vec![
        resource_record(1, ResourceKind::Linux, "Programming Tools"),
        resource_record(2, ResourceKind::Windows, "Office Suite"),
        resource_record(3, ResourceKind::Linux, "Engineering Software"),
        resource_record(4, ResourceKind::Windows, "Data Analysis Tools"),
    ]
}

pub(super) fn linux_only_resources() -> Vec<ResourceRecord> {
    vec![
        resource_record(1, ResourceKind::Linux, "Programming Tools"),
        resource_record(3, ResourceKind::Linux, "Engineering Software"),
    ]
}

pub(super) fn registry() -> ResourceRegistry {
    ResourceRegistry::new(lab_resources()).expect("registry builds")
}

pub(super) fn orchestrator_with_log(
    resources: Vec<ResourceRecord>,
) -> (AllocationOrchestrator, Arc<NoticeLog>) {
    let log = Arc::new(NoticeLog::new("registrar"));
    let components =
        PipelineComponents::from_policy(AllocationPolicy::Parity, EligibilityChain::admissions())
            .with_listener(log.clone());
    let orchestrator = AllocationOrchestrator::initialize(lab_records(), resources, components)
        .expect("orchestrator initializes");
    (orchestrator, log)
}

/// Listener that always errors, counting how often it was called.
#[derive(Default)]
pub(super) struct FailingListener {
    pub(super) calls: AtomicUsize,
}

impl Listener for FailingListener {
    fn name(&self) -> &str {
        "failing"
    }

    fn receive(&self, _subject: &Subject) -> Result<(), ListenerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ListenerError::Unavailable("mailbox offline".to_string()))
    }
}

impl FailingListener {
    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
