use crate::infra::{load_roster, pipeline_components};
use campus_alloc::config::{AppConfig, PipelineConfig};
use campus_alloc::error::AppError;
use campus_alloc::telemetry;
use campus_alloc::workflows::allocation::{
    AllocationOrchestrator, AllocationPolicy, BursaryAssigner, BursaryAward, Listener, NoticeLog,
    ParityStrategy, PipelineComponents, Report, ResourceId, ResourceKind, ResourceRecord, SubjectId,
    SubjectRecord, TracingListener, Traversable, DEFAULT_BURSARY_CEILING,
};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AllocateArgs {
    /// CSV roster of students (id,name,department,details,marks)
    #[arg(long)]
    pub(crate) subjects: PathBuf,
    /// CSV roster of computers (id,os,tools)
    #[arg(long)]
    pub(crate) resources: PathBuf,
    /// Allocation policy. Defaults to ALLOC_POLICY or parity.
    #[arg(long, value_parser = crate::infra::parse_policy)]
    pub(crate) policy: Option<AllocationPolicy>,
    /// Seed for bursary awards. Bursaries are skipped when absent.
    #[arg(long)]
    pub(crate) bursary_seed: Option<u64>,
    /// Emit the run as JSON instead of a table.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the admission portion of the demo.
    #[arg(long)]
    pub(crate) skip_admission: bool,
    /// Seed used for the demo bursary draw.
    #[arg(long, default_value_t = 7)]
    pub(crate) bursary_seed: u64,
}

#[derive(Debug, Serialize)]
struct AllocationRunOutput {
    generated_at: DateTime<Utc>,
    policy: AllocationPolicy,
    reports: Vec<Report>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bursaries: Vec<BursaryAward>,
}

/// Load configuration and install the log subscriber, so listener and
/// pipeline events from CLI runs reach stderr the same way they do for
/// `serve`.
fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

fn verdict_label(eligible: bool) -> &'static str {
    match eligible {
        true => "eligible",
        false => "not eligible",
    }
}

pub(crate) fn run_allocate(args: AllocateArgs) -> Result<(), AppError> {
    let AllocateArgs {
        subjects,
        resources,
        policy,
        bursary_seed,
        json,
    } = args;

    let mut pipeline = load_config()?.pipeline;
    if let Some(policy) = policy {
        pipeline.policy = policy;
    }
    let bursary_seed = bursary_seed.or(pipeline.bursary_seed);

    let (subjects, resources) = load_roster(&subjects, &resources)?;
    let listeners: Vec<Arc<dyn Listener>> = if json {
        Vec::new()
    } else {
        vec![Arc::new(TracingListener::new("registrar"))]
    };
    let components = pipeline_components(&pipeline, listeners);
    let mut orchestrator = AllocationOrchestrator::initialize(subjects, resources, components)?;

    let reports = orchestrator.run();
    let bursaries = match bursary_seed {
        Some(seed) => {
            let mut assigner = BursaryAssigner::seeded(seed, DEFAULT_BURSARY_CEILING);
            orchestrator.assign_bursaries(&mut assigner)
        }
        None => Vec::new(),
    };

    if json {
        let output = AllocationRunOutput {
            generated_at: Utc::now(),
            policy: pipeline.policy,
            reports,
            bursaries,
        };
        let rendered = serde_json::to_string_pretty(&output)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        println!("{rendered}");
        return Ok(());
    }

    println!(
        "Allocation run ({} policy, {} students, {} computers)",
        pipeline.policy.name(),
        orchestrator.subjects().len(),
        orchestrator.registry().len()
    );
    for report in &reports {
        let name = orchestrator
            .subject(report.subject)
            .map(|subject| subject.name.as_str())
            .unwrap_or("<unknown>");
        let subject = report.subject;
        if let Some(code) = report.error {
            let label = code.label();
            println!("- {subject:>4} {name:<16} error: {label}");
            continue;
        }
        let resource = report.resource.map(|id| id.to_string());
        println!(
            "- {:>4} {:<16} computer {:<4} {:<18} {} ({})",
            subject,
            name,
            resource.as_deref().unwrap_or("-"),
            report.department.as_deref().unwrap_or("-"),
            verdict_label(report.eligible),
            report.decided_by.as_deref().unwrap_or("default")
        );
    }

    if !bursaries.is_empty() {
        println!("\nBursaries");
        for award in &bursaries {
            println!("- {:>4} {}", award.subject, award.amount);
        }
    }

    let failed = reports.iter().filter(|r| !r.is_complete()).count();
    println!("\n{} processed | {failed} failed", reports.len());

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        skip_admission,
        bursary_seed,
    } = args;
    let config = load_config()?;

    println!("Lab allocation demo");
    let components = PipelineComponents::from_policy(AllocationPolicy::Parity, Default::default());
    let orchestrator =
        AllocationOrchestrator::initialize(lab_students(), lab_computers(), components)?;

    for strategy in [ParityStrategy::odd_linux(), ParityStrategy::even_windows()] {
        let batch = orchestrator.allocate_with(&strategy);
        let count = batch.results().len();
        println!("\n{} ({count} students):", batch.strategy());
        for result in batch.cursor() {
            println!("  - {}", result.descriptor);
        }
        for failure in batch.failures() {
            println!("  - #{} skipped: {}", failure.subject, failure.error);
        }
    }

    println!("\nComputers by id:");
    for resource in orchestrator.registry().iter() {
        println!("  - {} {} [{}]", resource.id, resource.kind, resource.tools);
    }

    if skip_admission {
        return Ok(());
    }

    println!("\nAdmission demo");
    let teacher = NoticeLog::new("teacher");
    let listeners: Vec<Arc<dyn Listener>> = vec![
        Arc::new(TracingListener::new("parent")),
        Arc::new(teacher.clone()),
    ];
    let mut admissions = admission_pipeline(config.pipeline, listeners)?;

    println!("Eligibility chain:");
    for line in admissions.chain().describe() {
        println!("  - {line}");
    }

    for report in admissions.run() {
        let Some(subject) = admissions.subject(report.subject) else {
            continue;
        };
        println!(
            "- {} (applied to {}, placed in {}): {} via {}",
            subject.name,
            subject.category,
            report.department.as_deref().unwrap_or("no department"),
            verdict_label(report.eligible),
            report.decided_by.as_deref().unwrap_or("default")
        );
    }

    for department in ["Computer Science", "Mathematics"] {
        let roster = admissions.department_roster(department);
        println!("\n{} roster ({} students):", roster.name(), roster.len());
        let mut cursor = roster.cursor();
        cursor.move_to_last();
        if let Some(last) = cursor.next() {
            println!("  latest: {}", last.name);
        }
        cursor.move_to_first();
        for member in cursor {
            println!("  - {}", member.details_summary().replace('\n', " | "));
        }
    }

    let mut assigner = BursaryAssigner::seeded(bursary_seed, DEFAULT_BURSARY_CEILING);
    println!("\nBursaries (seed {bursary_seed}):");
    for award in admissions.assign_bursaries(&mut assigner) {
        println!("  - student {}: {}", award.subject, award.amount);
    }

    let received = teacher.notices().len();
    println!("\nTeacher received {received} notices");

    Ok(())
}

/// Applicants run through the department admission policy.
fn admission_pipeline(
    config: PipelineConfig,
    listeners: Vec<Arc<dyn Listener>>,
) -> Result<AllocationOrchestrator, AppError> {
    let pipeline = PipelineConfig {
        policy: AllocationPolicy::Department,
        ..config
    };
    let components = pipeline_components(&pipeline, listeners);
    let orchestrator =
        AllocationOrchestrator::initialize(applicants(), lab_computers(), components)?;
    Ok(orchestrator)
}

fn student(
    id: u32,
    name: &str,
    department: &str,
    details: &str,
    marks: Option<&str>,
) -> SubjectRecord {
    SubjectRecord {
        id: SubjectId(id),
        name: name.to_string(),
        category: department.to_string(),
        details: details.to_string(),
        marks: marks.map(str::to_string),
    }
}

fn computer(id: u32, kind: ResourceKind, tools: &str) -> ResourceRecord {
    ResourceRecord {
        id: ResourceId(id),
        kind,
        tools: tools.to_string(),
    }
}

fn lab_students() -> Vec<SubjectRecord> {
    vec![
        student(1, "Alice", "Computer Science", "", None),
        student(2, "Bob", "Electrical Eng", "", None),
        student(3, "Charlie", "Mechanical Eng", "", None),
        student(4, "Diana", "Physics", "", None),
    ]
}

fn lab_computers() -> Vec<ResourceRecord> {
    vec![
        computer(1, ResourceKind::Linux, "gcc, python"),
        computer(2, ResourceKind::Windows, "matlab, office"),
        computer(3, ResourceKind::Linux, "cad, octave"),
        computer(4, ResourceKind::Windows, "labview"),
    ]
}

fn applicants() -> Vec<SubjectRecord> {
    vec![
        student(1, "CS Clone", "Computer Science", "Good", Some("A")),
        student(2, "Math Clone", "Mathematics", "Fair", Some("B+")),
        student(3, "Ada", "Mathematics", "Excellent", Some("A+")),
        student(4, "Grace", "Physics", "Excellent", None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_commands_install_the_log_subscriber() {
        let config = load_config().expect("cli configuration loads");

        assert!(tracing::dispatcher::has_been_set());
        assert!(telemetry::init(&config.telemetry).is_err());
    }

    #[test]
    fn admission_demo_places_applicants_by_department() {
        let log: Arc<dyn Listener> = Arc::new(NoticeLog::new("teacher"));
        let mut admissions = admission_pipeline(PipelineConfig::default(), vec![log])
            .expect("pipeline builds");

        let reports = admissions.run();
        let placed: Vec<Option<&str>> = reports
            .iter()
            .map(|report| report.department.as_deref())
            .collect();

        assert_eq!(
            placed,
            vec![
                Some("Computer Science"),
                Some("Mathematics"),
                Some("Mathematics"),
                None,
            ]
        );
        let eligible: Vec<bool> = reports.iter().map(|report| report.eligible).collect();
        assert_eq!(eligible, vec![true, false, true, true]);
        assert_eq!(admissions.department_roster("Mathematics").len(), 2);
    }
}
