//! Subject allocation and eligibility pipeline.
//!
//! Subjects (students) are matched to resources (lab computers) or placed in
//! departments by an allocation strategy, judged by an eligibility chain and
//! announced to listeners on a notification bus. `AllocationOrchestrator`
//! composes the steps and returns one `Report` per subject; a failure in one
//! subject never stops the batch.

pub mod bursary;
pub mod cursor;
pub mod domain;
pub mod eligibility;
pub mod notify;
pub mod orchestrator;
pub mod registry;
pub mod router;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use bursary::{BursaryAssigner, BursaryAward, DEFAULT_BURSARY_CEILING};
pub use cursor::{Cursor, DepartmentRoster, Traversable};
pub use domain::{
    AllocationResult, Assignment, ErrorCode, Report, Resource, ResourceId, ResourceKind,
    ResourceRecord, Subject, SubjectId, SubjectRecord, UnknownResourceKind,
};
pub use eligibility::{
    EligibilityChain, EligibilityChainBuilder, EligibilityHandler, EligibilityRule, Verdict,
};
pub use notify::{
    Listener, ListenerError, ListenerFailure, ListenerId, Notice, NoticeLog, NotificationBus,
    PublishSummary, TracingListener,
};
pub use orchestrator::{AllocationOrchestrator, PipelineComponents, SetupError};
pub use registry::{RegistryError, ResourceRegistry};
pub use router::{allocation_router, RunRequest, RunResponse};
pub use strategy::{
    AdmissionStrategy, AllocationBatch, AllocationFailure, AllocationPolicy, AllocationStrategy,
    Parity, ParityStrategy,
};
