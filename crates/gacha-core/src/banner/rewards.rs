//! Reward pools and uniform selection.

use serde::{Deserialize, Serialize};

use crate::ids::RewardId;
use crate::tier::Tier;

/// Source of rewards for a resolved tier.
///
/// `roll` is a uniform value in `[0, 1)`; implementations must map it to a
/// uniformly chosen member of the requested pool so that draws stay
/// reproducible for a given random sequence.
pub trait RewardPool {
    /// Pick a reward for `tier`, from the featured pool when `featured` is set.
    /// Returns `None` when the pool is empty.
    fn pick(&self, tier: Tier, featured: bool, roll: f64) -> Option<RewardId>;
}

/// The off-banner reward lists of a banner, one per tier.
///
/// Featured rewards of a limited banner are kept separately on the banner
/// kind; the SSR list here holds only the standard (non-featured) SSRs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTable {
    /// Standard SSR rewards.
    #[serde(default)]
    pub ssr: Vec<RewardId>,
    /// SR rewards.
    #[serde(default)]
    pub sr: Vec<RewardId>,
    /// R rewards.
    #[serde(default)]
    pub r: Vec<RewardId>,
}

impl RewardTable {
    /// The reward list for a tier.
    pub fn tier(&self, tier: Tier) -> &[RewardId] {
        match tier {
            Tier::Ssr => &self.ssr,
            Tier::Sr => &self.sr,
            Tier::R => &self.r,
        }
    }
}

impl RewardPool for RewardTable {
    fn pick(&self, tier: Tier, _featured: bool, roll: f64) -> Option<RewardId> {
        pick_uniform(self.tier(tier), roll).cloned()
    }
}

/// Map a uniform `roll` in `[0, 1)` onto an element of `pool`.
pub fn pick_uniform(pool: &[RewardId], roll: f64) -> Option<&RewardId> {
    if pool.is_empty() {
        return None;
    }
    let idx = (roll.clamp(0.0, 1.0) * pool.len() as f64) as usize;
    pool.get(idx.min(pool.len() - 1))
}
