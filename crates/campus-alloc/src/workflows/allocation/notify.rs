use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{Subject, SubjectId};

/// Receiver of subject updates.
pub trait Listener: Send + Sync {
    fn name(&self) -> &str;
    fn receive(&self, subject: &Subject) -> Result<(), ListenerError>;
}

/// Error a listener may raise while handling an update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListenerError {
    #[error("listener rejected update: {0}")]
    Rejected(String),
    #[error("listener unavailable: {0}")]
    Unavailable(String),
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A listener that failed during one publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    pub listener: String,
    pub subject: SubjectId,
    pub error: ListenerError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub delivered: usize,
    pub failures: Vec<ListenerFailure>,
}

/// Synchronous one-to-many delivery in subscription order.
#[derive(Default)]
pub struct NotificationBus {
    listeners: Vec<(ListenerId, Arc<dyn Listener>)>,
    next_id: u64,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Arc<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns whether the listener was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `subject` to every listener. Listener errors are logged and
    /// collected; they never stop delivery to the rest.
    pub fn publish(&self, subject: &Subject) -> PublishSummary {
        let mut summary = PublishSummary::default();

        for (_, listener) in &self.listeners {
            match listener.receive(subject) {
                Ok(()) => summary.delivered += 1,
                Err(error) => {
                    warn!(
                        listener = listener.name(),
                        subject = %subject.id,
                        %error,
                        "listener failed during publish"
                    );
                    summary.failures.push(ListenerFailure {
                        listener: listener.name().to_string(),
                        subject: subject.id,
                        error,
                    });
                }
            }
        }

        summary
    }
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self
            .listeners
            .iter()
            .map(|(_, listener)| listener.name())
            .collect();
        f.debug_struct("NotificationBus")
            .field("listeners", &names)
            .finish()
    }
}

/// Snapshot kept by `NoticeLog` for each delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub listener: String,
    pub subject: SubjectId,
    pub subject_name: String,
    pub details: String,
    pub recorded_at: DateTime<Utc>,
}

/// Listener that records every update it receives.
#[derive(Debug, Clone)]
pub struct NoticeLog {
    name: String,
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl NoticeLog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notices: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }
}

impl Listener for NoticeLog {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive(&self, subject: &Subject) -> Result<(), ListenerError> {
        let mut guard = self
            .notices
            .lock()
            .map_err(|_| ListenerError::Unavailable(format!("{} log poisoned", self.name)))?;
        guard.push(Notice {
            listener: self.name.clone(),
            subject: subject.id,
            subject_name: subject.name.clone(),
            details: subject.details_summary(),
            recorded_at: Utc::now(),
        });
        Ok(())
    }
}

/// Listener that writes each update to the tracing subscriber.
#[derive(Debug, Clone)]
pub struct TracingListener {
    name: String,
}

impl TracingListener {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Listener for TracingListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive(&self, subject: &Subject) -> Result<(), ListenerError> {
        info!(
            listener = %self.name,
            subject = %subject.id,
            name = %subject.name,
            eligible = ?subject.eligible,
            "admission update"
        );
        Ok(())
    }
}
