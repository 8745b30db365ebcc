use campus_alloc::config::PipelineConfig;
use campus_alloc::error::AppError;
use campus_alloc::workflows::allocation::{
    AllocationPolicy, EligibilityChain, Listener, PipelineComponents, ResourceRecord, SubjectRecord,
};
use campus_alloc::workflows::roster::RosterImporter;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wire the configured strategies and admission chain with the given
/// listeners subscribed in order.
pub(crate) fn pipeline_components(
    config: &PipelineConfig,
    listeners: Vec<Arc<dyn Listener>>,
) -> PipelineComponents {
    let chain = EligibilityChain::admissions().with_default_verdict(config.default_verdict);
    listeners.into_iter().fold(
        PipelineComponents::from_policy(config.policy, chain),
        PipelineComponents::with_listener,
    )
}

pub(crate) fn load_roster(
    subjects: &Path,
    resources: &Path,
) -> Result<(Vec<SubjectRecord>, Vec<ResourceRecord>), AppError> {
    let subjects = RosterImporter::subjects_from_path(subjects)?;
    let resources = RosterImporter::resources_from_path(resources)?;
    Ok((subjects, resources))
}

pub(crate) fn parse_policy(raw: &str) -> Result<AllocationPolicy, String> {
    AllocationPolicy::from_name(raw).ok_or_else(|| {
        format!(
            "unknown policy '{raw}' (expected one of: {})",
            AllocationPolicy::names().join(", ")
        )
    })
}
