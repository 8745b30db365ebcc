use std::sync::Arc;

use super::common::*;
use crate::workflows::allocation::cursor::Traversable;
use crate::workflows::allocation::domain::{
    ErrorCode, ResourceId, ResourceKind, SubjectId, SubjectRecord,
};
use crate::workflows::allocation::eligibility::EligibilityChain;
use crate::workflows::allocation::notify::{NoticeLog, NotificationBus};
use crate::workflows::allocation::orchestrator::{
    AllocationOrchestrator, PipelineComponents, SetupError,
};
use crate::workflows::allocation::registry::RegistryError;
use crate::workflows::allocation::strategy::{
    AdmissionStrategy, AllocationPolicy, AllocationStrategy, ParityStrategy,
};

#[test]
fn run_reports_every_subject_in_input_order() {
    let (mut orchestrator, log) = orchestrator_with_log(lab_resources());

    let reports = orchestrator.run();

    let ids: Vec<SubjectId> = reports.iter().map(|report| report.subject).collect();
    assert_eq!(
        ids,
        vec![SubjectId(1), SubjectId(2), SubjectId(3), SubjectId(4)]
    );
    let resources: Vec<Option<ResourceId>> =
        reports.iter().map(|report| report.resource).collect();
    assert_eq!(
        resources,
        vec![
            Some(ResourceId(1)),
            Some(ResourceId(2)),
            Some(ResourceId(1)),
            Some(ResourceId(2)),
        ]
    );
    assert!(reports.iter().all(|report| report.is_complete()));
    assert!(reports.iter().all(|report| report.notified == 1));

    assert!(reports[0].eligible);
    assert_eq!(
        reports[0].decided_by.as_deref(),
        Some("Computer Science test")
    );
    assert!(!reports[1].eligible);
    assert_eq!(reports[1].decided_by, None);

    assert_eq!(log.notices().len(), 4);
}

#[test]
fn run_stores_assignment_and_eligibility_on_subjects() {
    let (mut orchestrator, log) = orchestrator_with_log(lab_resources());

    orchestrator.run();

    let alice = orchestrator.subject(SubjectId(1)).expect("alice");
    let assignment = alice.assignment.as_ref().expect("alice assigned");
    assert_eq!(assignment.resource, ResourceId(1));
    assert_eq!(assignment.descriptor, "Alice allocated Linux computer 1");
    assert_eq!(alice.eligible, Some(true));

    let first_notice = &log.notices()[0];
    let details = &first_notice.details;
    assert!(details.contains("Alice allocated Linux computer 1"));
    assert!(details.contains("Eligibility: eligible"));
}

#[test]
fn missing_resource_kind_fails_only_affected_subjects() {
    let (mut orchestrator, log) = orchestrator_with_log(linux_only_resources());

    let reports = orchestrator.run();

    assert_eq!(reports.len(), 4);
    assert!(reports[0].is_complete());
    assert_eq!(reports[1].error, Some(ErrorCode::NoResourceAvailable));
    assert_eq!(reports[1].resource, None);
    assert!(!reports[1].eligible);
    assert_eq!(reports[1].notified, 0);
    assert!(reports[2].is_complete());
    assert_eq!(reports[3].error, Some(ErrorCode::NoResourceAvailable));

    let notified: Vec<SubjectId> = log.notices().iter().map(|notice| notice.subject).collect();
    assert_eq!(notified, vec![SubjectId(1), SubjectId(3)]);
    let bob = orchestrator.subject(SubjectId(2)).expect("bob");
    assert_eq!(bob.eligible, None);
}

#[test]
fn unknown_subject_is_reported_as_not_found() {
    let (mut orchestrator, log) = orchestrator_with_log(lab_resources());

    let report = orchestrator.process_subject(SubjectId(99));

    assert_eq!(report.subject, SubjectId(99));
    assert_eq!(report.error, Some(ErrorCode::NotFound));
    assert!(!report.eligible);
    assert!(log.notices().is_empty());
}

#[test]
fn subjects_without_a_selecting_strategy_are_judged_unassigned() {
    let mut records = lab_records();
    records[0].category = "History".to_string();
    let chain = EligibilityChain::admissions();
    let components = PipelineComponents::from_policy(AllocationPolicy::Department, chain);
    let mut orchestrator = AllocationOrchestrator::initialize(records, lab_resources(), components)
        .expect("orchestrator initializes");

    let report = orchestrator.process_subject(SubjectId(1));

    assert!(report.is_complete());
    assert_eq!(report.resource, None);
    assert_eq!(report.department, None);
    // Alice's transcript still carries the general check.
    assert_eq!(report.decided_by.as_deref(), Some("general transcript"));
}

#[test]
fn failing_listener_does_not_fail_the_report() {
    let (mut orchestrator, log) = orchestrator_with_log(lab_resources());
    let failing = Arc::new(FailingListener::default());
    let failing_id = orchestrator.subscribe(failing.clone());

    let report = orchestrator.process_subject(SubjectId(1));

    assert!(report.is_complete());
    assert_eq!(report.notified, 1);
    assert_eq!(failing.calls(), 1);
    assert_eq!(log.notices().len(), 1);

    assert!(orchestrator.unsubscribe(failing_id));
    orchestrator.process_subject(SubjectId(2));
    assert_eq!(failing.calls(), 1);
}

#[test]
fn initialize_rejects_duplicate_records() {
    let mut subjects = lab_records();
    subjects.push(subject_record(3, "Charlie Clone", "Physics", "", None));
    let components =
        PipelineComponents::from_policy(AllocationPolicy::Parity, EligibilityChain::default());
    let err = AllocationOrchestrator::initialize(subjects, lab_resources(), components)
        .err()
        .expect("duplicate subject rejected");
    assert!(matches!(err, SetupError::DuplicateSubject(SubjectId(3))));

    let mut resources = lab_resources();
    resources.push(resource_record(4, ResourceKind::Linux, "Spare"));
    let components =
        PipelineComponents::from_policy(AllocationPolicy::Parity, EligibilityChain::default());
    let err = AllocationOrchestrator::initialize(lab_records(), resources, components)
        .err()
        .expect("duplicate resource rejected");
    assert!(matches!(
        err,
        SetupError::Registry(RegistryError::Duplicate(ResourceId(4)))
    ));
}

#[test]
fn allocate_with_runs_one_strategy_without_mutating_subjects() {
    let (orchestrator, _log) = orchestrator_with_log(lab_resources());

    let odd = orchestrator.allocate_with(&ParityStrategy::odd_linux());
    let even = orchestrator.allocate_with(&ParityStrategy::even_windows());

    assert_eq!(odd.pairs(), vec![(1, 1), (3, 1)]);
    assert_eq!(even.pairs(), vec![(2, 2), (4, 2)]);
    assert!(orchestrator
        .subjects()
        .iter()
        .all(|subject| subject.assignment.is_none()));
    assert_eq!(orchestrator.registry().len(), 4);
}

#[test]
fn department_roster_reflects_processed_state() {
    let (mut orchestrator, _log) = orchestrator_with_log(lab_resources());
    orchestrator.run();

    let roster = orchestrator.department_roster("Computer Science");
    let members: Vec<_> = roster
        .cursor()
        .map(|subject| (subject.name.clone(), subject.eligible))
        .collect();

    assert_eq!(members, vec![("Alice".to_string(), Some(true))]);
}

#[test]
fn failed_report_serializes_error_code() {
    let (mut orchestrator, _log) = orchestrator_with_log(linux_only_resources());

    let report = orchestrator.process_subject(SubjectId(2));
    let json = serde_json::to_value(&report).expect("report serializes");

    assert_eq!(json["subject"], 2);
    assert_eq!(json["error"], "no_resource_available");
    assert!(json.get("resource").is_none());
    assert_eq!(json["eligible"], false);
}

#[test]
fn orchestrator_accepts_listener_added_through_components() {
    let log = Arc::new(NoticeLog::new("guardian"));
    let components =
        PipelineComponents::from_policy(AllocationPolicy::Parity, EligibilityChain::admissions())
            .with_listener(log.clone());
    let mut orchestrator =
        AllocationOrchestrator::initialize(lab_records(), lab_resources(), components)
            .expect("orchestrator initializes");

    orchestrator.run();

    assert!(log.notices().iter().all(|n| n.listener == "guardian"));
    assert_eq!(orchestrator.chain().handlers().len(), 3);
}

#[test]
fn bus_mut_exposes_the_injected_bus() {
    let (mut orchestrator, log) = orchestrator_with_log(lab_resources());
    let extra = NoticeLog::new("counsellor");

    orchestrator.bus_mut().subscribe(Arc::new(extra.clone()));
    let report = orchestrator.process_subject(SubjectId(4));

    assert_eq!(report.notified, 2);
    assert_eq!(orchestrator.bus_mut().len(), 2);
    assert_eq!(log.notices().len(), 1);
    assert_eq!(extra.notices()[0].subject, SubjectId(4));
}

fn clone_applicants() -> Vec<SubjectRecord> {
    vec![
        subject_record(
            1,
            "CS Clone",
            "Computer Science",
            "High School Transcript: Excellent",
            Some("A+"),
        ),
        subject_record(
            2,
            "Math Clone",
            "Mathematics",
            "High School Transcript: Good",
            Some("B"),
        ),
    ]
}

#[test]
fn department_policy_admits_applicants_into_their_department() {
    let log = Arc::new(NoticeLog::new("teacher"));
    let chain = EligibilityChain::admissions();
    let components = PipelineComponents::from_policy(AllocationPolicy::Department, chain)
        .with_listener(log.clone());
    let mut orchestrator =
        AllocationOrchestrator::initialize(clone_applicants(), lab_resources(), components)
            .expect("orchestrator initializes");

    let reports = orchestrator.run();

    assert_eq!(reports[0].department.as_deref(), Some("Computer Science"));
    assert_eq!(reports[0].resource, None);
    assert!(reports[0].eligible);
    assert_eq!(reports[1].department.as_deref(), Some("Mathematics"));
    assert!(!reports[1].eligible);

    let math = orchestrator.subject(SubjectId(2)).expect("math clone");
    assert_eq!(math.current_department.as_deref(), Some("Mathematics"));
    assert_eq!(math.assignment, None);

    let details = &log.notices()[1].details;
    assert!(details.contains("Selected Department: Mathematics"));
    assert!(details.contains("Current Department: Mathematics"));
    assert!(details.contains("Eligibility: not eligible"));
}

#[test]
fn chain_and_roster_follow_the_assigned_department() {
    let records = vec![subject_record(
        7,
        "Noor",
        "Statistics",
        "High School Transcript: Good",
        Some("A+"),
    )];
    let statistics = AdmissionStrategy::mathematics().accepting("Statistics");
    let strategies: Vec<Box<dyn AllocationStrategy>> = vec![Box::new(statistics)];
    let chain = EligibilityChain::admissions();
    let components = PipelineComponents::new(strategies, chain, NotificationBus::new());
    let mut orchestrator = AllocationOrchestrator::initialize(records, lab_resources(), components)
        .expect("orchestrator initializes");

    assert!(orchestrator.department_roster("Mathematics").is_empty());
    let before = orchestrator.subject(SubjectId(7)).expect("noor");
    assert!(!orchestrator.chain().evaluate(before).is_eligible());

    let report = orchestrator.process_subject(SubjectId(7));

    assert_eq!(report.department.as_deref(), Some("Mathematics"));
    assert!(report.eligible);
    assert_eq!(report.decided_by.as_deref(), Some("Mathematics test"));

    let roster = orchestrator.department_roster("Mathematics");
    let names: Vec<&str> = roster
        .cursor()
        .map(|subject| subject.name.as_str())
        .collect();
    assert_eq!(names, vec!["Noor"]);
    assert!(orchestrator.department_roster("Statistics").is_empty());

    let noor = orchestrator.subject(SubjectId(7)).expect("noor");
    let summary = noor.details_summary();
    assert!(summary.contains("Selected Department: Statistics"));
    assert!(summary.contains("Current Department: Mathematics"));
}

#[test]
fn run_handles_large_rosters_in_input_order() {
    let records: Vec<SubjectRecord> = (1..=5_000)
        .rev()
        .map(|id| subject_record(id, "Student", "Physics", "", None))
        .collect();
    let components =
        PipelineComponents::from_policy(AllocationPolicy::Parity, EligibilityChain::default());
    let mut orchestrator = AllocationOrchestrator::initialize(records, lab_resources(), components)
        .expect("orchestrator initializes");

    let reports = orchestrator.run();

    assert_eq!(reports.len(), 5_000);
    assert_eq!(reports[0].subject, SubjectId(5_000));
    assert_eq!(reports[4_999].subject, SubjectId(1));
    assert!(reports.iter().all(|report| report.is_complete()));
    let last = orchestrator.subject(SubjectId(1)).expect("lowest id");
    let assignment = last.assignment.as_ref().expect("lowest id assigned");
    assert_eq!(assignment.resource, ResourceId(1));
    let rerun = orchestrator.process_subject(SubjectId(2));
    assert_eq!(rerun.resource, Some(ResourceId(2)));
}
