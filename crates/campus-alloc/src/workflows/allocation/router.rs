use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::PipelineConfig;
use crate::error::AppError;

use super::bursary::{BursaryAssigner, BursaryAward, DEFAULT_BURSARY_CEILING};
use super::domain::{Report, ResourceRecord, SubjectRecord};
use super::eligibility::EligibilityChain;
use super::notify::{Notice, NoticeLog};
use super::orchestrator::{AllocationOrchestrator, PipelineComponents};
use super::strategy::AllocationPolicy;

/// Payload accepted by the run endpoint. Missing policy, chain, or seed fall
/// back to the service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    pub subjects: Vec<SubjectRecord>,
    pub resources: Vec<ResourceRecord>,
    #[serde(default)]
    pub policy: Option<AllocationPolicy>,
    #[serde(default)]
    pub chain: Option<EligibilityChain>,
    #[serde(default)]
    pub bursary_seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub policy: AllocationPolicy,
    pub reports: Vec<Report>,
    pub notices: Vec<Notice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bursaries: Vec<BursaryAward>,
}

/// Router builder exposing the allocation pipeline over HTTP.
pub fn allocation_router(config: Arc<PipelineConfig>) -> Router {
    Router::new()
        .route("/api/v1/allocations/run", post(run_handler))
        .route("/api/v1/allocations/policies", get(policies_handler))
        .with_state(config)
}

pub(crate) async fn run_handler(
    State(config): State<Arc<PipelineConfig>>,
    Json(request): Json<RunRequest>,
) -> Response {
    let RunRequest {
        subjects,
        resources,
        policy,
        chain,
        bursary_seed,
    } = request;

    let policy = policy.unwrap_or(config.policy);
    let chain = chain.unwrap_or_else(|| {
        EligibilityChain::admissions().with_default_verdict(config.default_verdict)
    });
    let log = Arc::new(NoticeLog::new("registrar"));
    let components = PipelineComponents::from_policy(policy, chain)
        .with_listener(log.clone());

    let initialized = AllocationOrchestrator::initialize(subjects, resources, components);
    let mut orchestrator = match initialized {
        Ok(orchestrator) => orchestrator,
        Err(error) => return AppError::from(error).into_response(),
    };

    let bursaries = match bursary_seed.or(config.bursary_seed) {
        Some(seed) => {
            let mut assigner = BursaryAssigner::seeded(seed, DEFAULT_BURSARY_CEILING);
            orchestrator.assign_bursaries(&mut assigner)
        }
        None => Vec::new(),
    };

    let reports = orchestrator.run();

    let response = RunResponse {
        policy,
        reports,
        notices: log.notices(),
        bursaries,
    };
    (StatusCode::OK, Json(response)).into_response()
}

pub(crate) async fn policies_handler(State(config): State<Arc<PipelineConfig>>) -> Response {
    let payload = json!({
        "default": config.policy.name(),
        "policies": AllocationPolicy::names(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}
