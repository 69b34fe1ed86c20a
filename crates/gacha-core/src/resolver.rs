//! Single-draw resolution.
//!
//! [`resolve_draw`] turns a banner, the current pity state, and a
//! [`DrawRoll`] into an [`Outcome`] and the next pity state. It performs no
//! I/O and consumes no hidden randomness, so the same inputs always produce
//! the same result.
//!
//! Order of rules for one draw:
//! 1. hard pity forces SSR
//! 2. otherwise the soft-pity ramp sets the effective SSR rate
//! 3. the tier roll is classified against SSR, SR, R bands (half-open,
//!    lower-inclusive)
//! 4. on limited banners an SSR is featured if guaranteed, if the featured
//!    threshold is reached, or if the featured roll wins the 50/50
//! 5. the reward roll picks uniformly from the resolved pool
//! 6. the pity state records the pull

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::banner::{Banner, RewardPool};
use crate::error::{GachaError, GachaResult};
use crate::ids::RewardId;
use crate::pity::PityState;
use crate::tier::Tier;

/// The random inputs of one draw, each uniform in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRoll {
    /// Decides the tier.
    pub tier: f64,
    /// Decides the 50/50 on limited banners.
    pub featured: f64,
    /// Decides which reward of the resolved pool is awarded.
    pub reward: f64,
}

impl DrawRoll {
    /// Create a roll from explicit values.
    pub fn new(tier: f64, featured: f64, reward: f64) -> Self {
        Self {
            tier,
            featured,
            reward,
        }
    }

    /// Draw a roll from the given RNG.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            tier: rng.random(),
            featured: rng.random(),
            reward: rng.random(),
        }
    }
}

/// What a single draw produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// The resolved tier.
    pub tier: Tier,
    /// The awarded reward.
    pub reward_id: RewardId,
    /// Whether the reward is featured. Always false below SSR.
    pub is_featured: bool,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.tier, self.reward_id)?;
        if self.is_featured {
            write!(f, " (featured)")?;
        }
        Ok(())
    }
}

/// The full result of resolving one draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The outcome of the draw.
    pub outcome: Outcome,
    /// The pity state after the draw.
    pub state: PityState,
    /// The SSR rate (percent) the tier roll was classified against.
    pub effective_ssr_rate: f64,
    /// True when hard pity forced the SSR.
    pub hard_pity: bool,
}

/// Classify a tier roll against the SSR, SR, and R bands.
///
/// `effective_ssr` is in percent. The SR and R bands split the mass left
/// after SSR in proportion to their configured rates, so below soft pity the
/// SR band is exactly `sr_rate / 100` wide.
pub fn classify_tier(effective_ssr: f64, sr_rate: f64, r_rate: f64, roll: f64) -> Tier {
    let ssr_bound = effective_ssr / 100.0;
    if roll < ssr_bound {
        return Tier::Ssr;
    }
    let rest = sr_rate + r_rate;
    let sr_width = if rest > 0.0 {
        (1.0 - ssr_bound).max(0.0) * sr_rate / rest
    } else {
        0.0
    };
    if roll < ssr_bound + sr_width {
        Tier::Sr
    } else {
        Tier::R
    }
}

/// Resolve one draw, picking rewards from the banner's own pools.
pub fn resolve_draw(banner: &Banner, state: &PityState, roll: DrawRoll) -> GachaResult<Resolution> {
    resolve_draw_with(banner, state, roll, banner)
}

/// Resolve one draw, picking rewards from an external pool.
pub fn resolve_draw_with<P: RewardPool + ?Sized>(
    banner: &Banner,
    state: &PityState,
    roll: DrawRoll,
    pool: &P,
) -> GachaResult<Resolution> {
    let cfg = banner.config();
    let hard_pity = state.is_at_hard_pity(banner);

    let effective_ssr_rate = banner.effective_ssr_rate(state.pulls_since_last_ssr());
    let tier = if hard_pity {
        Tier::Ssr
    } else {
        classify_tier(effective_ssr_rate, cfg.sr_rate, cfg.r_rate, roll.tier)
    };

    let is_featured = match (tier, banner.limited()) {
        (Tier::Ssr, Some(limited)) => {
            state.guaranteed_featured_next()
                || state.pulls_since_last_featured().saturating_add(1)
                    >= cfg.featured_guarantee_threshold
                || roll.featured < limited.featured_rate / 100.0
        }
        _ => false,
    };

    let reward_id = pool
        .pick(tier, is_featured, roll.reward)
        .ok_or(GachaError::EmptyRewardPool {
            tier,
            featured: is_featured,
        })?;

    let next = state.record_pull(tier == Tier::Ssr, is_featured)?;

    log::debug!(
        "{}: pull {} since SSR, rate {:.2}%{} -> {} {}{}",
        banner.id(),
        state.pulls_since_last_ssr().saturating_add(1),
        effective_ssr_rate,
        if hard_pity { " (hard pity)" } else { "" },
        tier,
        reward_id,
        if is_featured { " (featured)" } else { "" },
    );

    Ok(Resolution {
        outcome: Outcome {
            tier,
            reward_id,
            is_featured,
        },
        state: next,
        effective_ssr_rate,
        hard_pity,
    })
}
