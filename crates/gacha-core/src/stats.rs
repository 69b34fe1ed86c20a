//! Running tallies over pull outcomes.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::resolver::Outcome;
use crate::tier::Tier;

/// Counts of outcomes by tier plus SSR gap statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PullStats {
    total: u64,
    by_tier: BTreeMap<Tier, u64>,
    featured: u64,
    current_gap: u32,
    longest_gap: u32,
    gap_sum: u64,
    completed_gaps: u64,
}

impl PullStats {
    /// Empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        *self.by_tier.entry(outcome.tier).or_insert(0) += 1;
        if outcome.is_featured {
            self.featured += 1;
        }
        self.current_gap = self.current_gap.saturating_add(1);
        if outcome.tier == Tier::Ssr {
            self.longest_gap = self.longest_gap.max(self.current_gap);
            self.gap_sum += u64::from(self.current_gap);
            self.completed_gaps += 1;
            self.current_gap = 0;
        }
    }

    /// Total outcomes counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Outcomes of one tier.
    pub fn count(&self, tier: Tier) -> u64 {
        self.by_tier.get(&tier).copied().unwrap_or(0)
    }

    /// Featured outcomes.
    pub fn featured(&self) -> u64 {
        self.featured
    }

    /// Observed share of a tier, in percent.
    pub fn frequency(&self, tier: Tier) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(tier) as f64 * 100.0 / self.total as f64
    }

    /// Observed share of SSRs that were featured, in percent.
    pub fn featured_share(&self) -> f64 {
        let ssr = self.count(Tier::Ssr);
        if ssr == 0 {
            return 0.0;
        }
        self.featured as f64 * 100.0 / ssr as f64
    }

    /// Most pulls it took to reach an SSR, counting the SSR itself.
    pub fn longest_gap(&self) -> u32 {
        self.longest_gap
    }

    /// Mean pulls per SSR over completed gaps.
    pub fn mean_gap(&self) -> Option<f64> {
        (self.completed_gaps > 0).then(|| self.gap_sum as f64 / self.completed_gaps as f64)
    }

    /// Pulls since the last SSR seen.
    pub fn current_gap(&self) -> u32 {
        self.current_gap
    }
}

impl<'a> Extend<&'a Outcome> for PullStats {
    fn extend<I: IntoIterator<Item = &'a Outcome>>(&mut self, iter: I) {
        for outcome in iter {
            self.record(outcome);
        }
    }
}
