//! Chain of eligibility handlers.
//!
//! Each handler is optionally scoped to one department, matched against the
//! department the subject currently belongs to. A handler outside its scope
//! forwards without judging; a handler in scope either admits the
//! subject (ending the walk) or forwards. When the chain runs out the
//! configured default applies. Category handlers should therefore sit ahead
//! of the general ones, and every subject meets at most one category handler.

use serde::{Deserialize, Serialize};

use super::domain::Subject;

/// Predicate applied by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "value", rename_all = "snake_case")]
pub enum EligibilityRule {
    /// Current marks start with the given grade, e.g. `"A"`.
    MarksPrefix(String),
    /// Current marks contain the given grade, e.g. `"A+"`.
    MarksContains(String),
    /// Registration details mention the given text, e.g. `"Excellent"`.
    DetailsContains(String),
}

impl EligibilityRule {
    pub fn admits(&self, subject: &Subject) -> bool {
        match self {
            EligibilityRule::MarksPrefix(prefix) => subject
                .marks
                .as_deref()
                .is_some_and(|marks| marks.starts_with(prefix.as_str())),
            EligibilityRule::MarksContains(needle) => subject
                .marks
                .as_deref()
                .is_some_and(|marks| marks.contains(needle.as_str())),
            EligibilityRule::DetailsContains(needle) => subject.details.contains(needle.as_str()),
        }
    }

    fn describe(&self) -> String {
        match self {
            EligibilityRule::MarksPrefix(prefix) => format!("marks start with '{prefix}'"),
            EligibilityRule::MarksContains(needle) => format!("marks contain '{needle}'"),
            EligibilityRule::DetailsContains(needle) => format!("details mention '{needle}'"),
        }
    }
}

/// One link of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityHandler {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub rule: EligibilityRule,
}

impl EligibilityHandler {
    fn in_scope(&self, subject: &Subject) -> bool {
        match &self.category {
            Some(category) => subject.in_department(category),
            None => true,
        }
    }
}

/// Result of walking the chain for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Admitted { handler: String },
    Exhausted { default: bool },
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        match self {
            Verdict::Admitted { .. } => true,
            Verdict::Exhausted { default } => *default,
        }
    }

    pub fn handler(&self) -> Option<&str> {
        match self {
            Verdict::Admitted { handler } => Some(handler),
            Verdict::Exhausted { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EligibilityChain {
    handlers: Vec<EligibilityHandler>,
    #[serde(default)]
    default_verdict: bool,
}

impl EligibilityChain {
    pub fn builder() -> EligibilityChainBuilder {
        EligibilityChainBuilder::default()
    }

    /// Department tests of the admission office followed by the general
    /// transcript check.
    pub fn admissions() -> Self {
        Self::builder()
            .department(
                "Computer Science",
                EligibilityRule::MarksPrefix("A".to_string()),
            )
            .department(
                "Mathematics",
                EligibilityRule::MarksContains("A+".to_string()),
            )
            .general(
                "general transcript",
                EligibilityRule::DetailsContains("Excellent".to_string()),
            )
            .build()
    }

    pub fn evaluate(&self, subject: &Subject) -> Verdict {
        for handler in &self.handlers {
            if !handler.in_scope(subject) {
                continue;
            }
            if handler.rule.admits(subject) {
                return Verdict::Admitted {
                    handler: handler.name.clone(),
                };
            }
        }

        Verdict::Exhausted {
            default: self.default_verdict,
        }
    }

    pub fn handlers(&self) -> &[EligibilityHandler] {
        &self.handlers
    }

    pub fn default_verdict(&self) -> bool {
        self.default_verdict
    }

    pub fn with_default_verdict(mut self, default_verdict: bool) -> Self {
        self.default_verdict = default_verdict;
        self
    }

    /// Human-readable outline of the chain, one handler per line.
    pub fn describe(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .handlers
            .iter()
            .map(|handler| match &handler.category {
                Some(category) => format!(
                    "{} [{}]: {}",
                    handler.name,
                    category,
                    handler.rule.describe()
                ),
                None => format!("{}: {}", handler.name, handler.rule.describe()),
            })
            .collect();
        lines.push(format!("default: {}", self.default_verdict));
        lines
    }
}

#[derive(Debug, Default)]
pub struct EligibilityChainBuilder {
    handlers: Vec<EligibilityHandler>,
    default_verdict: bool,
}

impl EligibilityChainBuilder {
    pub fn department(mut self, category: impl Into<String>, rule: EligibilityRule) -> Self {
        let category = category.into();
        self.handlers.push(EligibilityHandler {
            name: format!("{category} test"),
            category: Some(category),
            rule,
        });
        self
    }

    pub fn general(mut self, name: impl Into<String>, rule: EligibilityRule) -> Self {
        self.handlers.push(EligibilityHandler {
            name: name.into(),
            category: None,
            rule,
        });
        self
    }

    pub fn handler(mut self, handler: EligibilityHandler) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn default_verdict(mut self, verdict: bool) -> Self {
        self.default_verdict = verdict;
        self
    }

    pub fn build(self) -> EligibilityChain {
        EligibilityChain {
            handlers: self.handlers,
            default_verdict: self.default_verdict,
        }
    }
}
