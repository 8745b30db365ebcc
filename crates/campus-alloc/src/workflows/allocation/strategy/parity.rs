use super::super::domain::{ResourceKind, Subject};
use super::AllocationStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Odd,
    Even,
}

impl Parity {
    pub const fn label(self) -> &'static str {
        match self {
            Parity::Odd => "odd",
            Parity::Even => "even",
        }
    }
}

/// Selects subjects by registration-number parity.
#[derive(Debug, Clone)]
pub struct ParityStrategy {
    parity: Parity,
    kind: ResourceKind,
    name: String,
}

impl ParityStrategy {
    pub fn new(parity: Parity, kind: ResourceKind) -> Self {
        Self {
            parity,
            kind,
            name: format!("{}-registration", parity.label()),
        }
    }

    pub fn odd_linux() -> Self {
        Self::new(Parity::Odd, ResourceKind::Linux)
    }

    pub fn even_windows() -> Self {
        Self::new(Parity::Even, ResourceKind::Windows)
    }

    pub fn parity(&self) -> Parity {
        self.parity
    }
}

impl AllocationStrategy for ParityStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn selects(&self, subject: &Subject) -> bool {
        match self.parity {
            Parity::Even => subject.id.is_even(),
            Parity::Odd => !subject.id.is_even(),
        }
    }

    fn required_kind(&self, _subject: &Subject) -> Option<ResourceKind> {
        Some(self.kind)
    }
}
