use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::domain::{Subject, SubjectId};

pub const DEFAULT_BURSARY_CEILING: u32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BursaryAward {
    pub subject: SubjectId,
    pub amount: u32,
}

/// Draws bursary amounts from an injected random source. Seeding the source
/// makes awards reproducible for a fixed subject order.
#[derive(Debug, Clone)]
pub struct BursaryAssigner<R = StdRng> {
    rng: R,
    ceiling: u32,
}

impl BursaryAssigner<StdRng> {
    pub fn seeded(seed: u64, ceiling: u32) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), ceiling)
    }
}

impl<R: Rng> BursaryAssigner<R> {
    pub fn with_rng(rng: R, ceiling: u32) -> Self {
        Self { rng, ceiling }
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Award every subject in order, overwriting any previous amount.
    pub fn assign(&mut self, subjects: &mut [Subject]) -> Vec<BursaryAward> {
        subjects
            .iter_mut()
            .map(|subject| {
                let amount = if self.ceiling == 0 {
                    0
                } else {
                    self.rng.random_range(0..self.ceiling)
                };
                subject.bursary = Some(amount);
                BursaryAward {
                    subject: subject.id,
                    amount,
                }
            })
            .collect()
    }
}
