//! Banner configuration and validation.
//!
//! A [`BannerConfig`] is the published description of a banner: its rate
//! table, pity thresholds, costs, reward pools, and (for limited banners) the
//! featured rate-up and validity window. It is validated exactly once by
//! [`Banner::new`]; only a [`Banner`] can be drawn against, so a config that
//! fails validation never reaches the resolver.

pub mod ramp;
pub mod rewards;

pub use ramp::PityRamp;
pub use rewards::{RewardPool, RewardTable, pick_uniform};

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GachaError, GachaResult};
use crate::ids::{BannerId, RewardId};
use crate::tier::Tier;

/// Allowed deviation of the summed tier rates from 100%.
pub const RATE_SUM_TOLERANCE: f64 = 0.01;

/// Batch size of a multi-pull when the config does not name one.
pub const DEFAULT_MULTI_PULL_SIZE: u32 = 10;

fn default_multi_pull_size() -> u32 {
    DEFAULT_MULTI_PULL_SIZE
}

/// Whether a banner is permanent or a time-limited rate-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BannerKind {
    /// Permanent banner without featured rewards.
    Standard,
    /// Time-limited banner with featured rewards and a 50/50.
    Limited(LimitedBanner),
}

/// The parts of a banner that only exist on limited banners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitedBanner {
    /// Chance (percent) that an SSR is featured when no guarantee applies.
    pub featured_rate: f64,
    /// Rewards eligible as featured SSRs.
    pub featured_ids: BTreeSet<RewardId>,
    /// When the banner opens.
    pub valid_from: DateTime<Utc>,
    /// When the banner closes (exclusive).
    pub valid_until: DateTime<Utc>,
}

/// The published description of a banner, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerConfig {
    /// Unique banner identifier.
    pub id: BannerId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Standard or limited, with the limited-only fields.
    pub kind: BannerKind,
    /// Base SSR rate in percent.
    pub ssr_rate: f64,
    /// SR rate in percent.
    pub sr_rate: f64,
    /// R rate in percent.
    pub r_rate: f64,
    /// 1-based pull number since the last SSR at which the ramp starts.
    pub soft_pity_threshold: u32,
    /// 1-based pull number since the last SSR that is a guaranteed SSR.
    pub hard_pity_threshold: u32,
    /// 1-based pull number since the last featured SSR at which an SSR is
    /// forced to be featured.
    pub featured_guarantee_threshold: u32,
    /// Shape of the soft-pity ramp.
    #[serde(default)]
    pub ramp: PityRamp,
    /// Cost of a single pull.
    pub single_pull_cost: u64,
    /// Cost of a multi-pull of `multi_pull_size` draws.
    pub multi_pull_cost: u64,
    /// Number of draws in a multi-pull.
    #[serde(default = "default_multi_pull_size")]
    pub multi_pull_size: u32,
    /// Off-banner reward pools.
    pub rewards: RewardTable,
}

impl BannerConfig {
    /// Check every invariant of the config.
    ///
    /// Fails with [`GachaError::InvalidBannerConfig`] naming the first
    /// violated rule.
    pub fn validate(&self) -> GachaResult<()> {
        let invalid = |reason: String| GachaError::InvalidBannerConfig {
            banner: self.id.clone(),
            reason,
        };

        for (name, rate) in [
            ("ssr_rate", self.ssr_rate),
            ("sr_rate", self.sr_rate),
            ("r_rate", self.r_rate),
        ] {
            if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
                return Err(invalid(format!("{name} must be within [0, 100], got {rate}")));
            }
        }

        let sum = self.ssr_rate + self.sr_rate + self.r_rate;
        if (sum - 100.0).abs() > RATE_SUM_TOLERANCE {
            return Err(invalid(format!("rates must sum to 100, got {sum}")));
        }

        if self.hard_pity_threshold == 0 {
            return Err(invalid("hard_pity_threshold must be at least 1".to_string()));
        }
        if self.soft_pity_threshold >= self.hard_pity_threshold {
            return Err(invalid(format!(
                "soft_pity_threshold ({}) must be below hard_pity_threshold ({})",
                self.soft_pity_threshold, self.hard_pity_threshold
            )));
        }
        if self.featured_guarantee_threshold < self.hard_pity_threshold {
            return Err(invalid(format!(
                "featured_guarantee_threshold ({}) must be at least hard_pity_threshold ({})",
                self.featured_guarantee_threshold, self.hard_pity_threshold
            )));
        }
        self.ramp.check().map_err(invalid)?;

        if self.multi_pull_size < 2 {
            return Err(invalid(format!(
                "multi_pull_size must be at least 2, got {}",
                self.multi_pull_size
            )));
        }
        let batch_price = u128::from(self.single_pull_cost) * u128::from(self.multi_pull_size);
        if u128::from(self.multi_pull_cost) > batch_price {
            return Err(invalid(format!(
                "multi_pull_cost ({}) exceeds {} single pulls ({batch_price})",
                self.multi_pull_cost, self.multi_pull_size
            )));
        }

        let always_featured = match &self.kind {
            BannerKind::Standard => false,
            BannerKind::Limited(limited) => {
                self.validate_limited(limited).map_err(invalid)?;
                limited.featured_rate >= 100.0
            }
        };

        if self.rewards.ssr.is_empty() && !always_featured {
            return Err(invalid("SSR reward pool is empty".to_string()));
        }
        if self.rewards.sr.is_empty() && self.sr_rate > 0.0 {
            return Err(invalid("SR reward pool is empty".to_string()));
        }
        if self.rewards.r.is_empty() && self.r_rate > 0.0 {
            return Err(invalid("R reward pool is empty".to_string()));
        }

        Ok(())
    }

    fn validate_limited(&self, limited: &LimitedBanner) -> Result<(), String> {
        let rate = limited.featured_rate;
        if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
            return Err(format!("featured_rate must be within [0, 100], got {rate}"));
        }
        if limited.featured_ids.is_empty() {
            return Err("limited banner needs at least one featured reward".to_string());
        }
        if limited.valid_until <= limited.valid_from {
            return Err(format!(
                "valid_until ({}) must be after valid_from ({})",
                limited.valid_until, limited.valid_from
            ));
        }
        if let Some(dup) = self
            .rewards
            .ssr
            .iter()
            .find(|id| limited.featured_ids.contains(*id))
        {
            return Err(format!("featured reward '{dup}' is also in the standard SSR pool"));
        }
        Ok(())
    }
}

/// A validated, immutable banner.
#[derive(Debug, Clone)]
pub struct Banner {
    config: BannerConfig,
    featured: Vec<RewardId>,
}

impl Banner {
    /// Validate a config and publish it as a banner.
    pub fn new(config: BannerConfig) -> GachaResult<Self> {
        config.validate()?;
        let featured = match &config.kind {
            BannerKind::Standard => Vec::new(),
            BannerKind::Limited(limited) => limited.featured_ids.iter().cloned().collect(),
        };
        Ok(Self { config, featured })
    }

    /// The validated config.
    pub fn config(&self) -> &BannerConfig {
        &self.config
    }

    /// The banner ID.
    pub fn id(&self) -> &BannerId {
        &self.config.id
    }

    /// Display name, falling back to the ID.
    pub fn name(&self) -> &str {
        if self.config.name.is_empty() {
            self.config.id.as_str()
        } else {
            &self.config.name
        }
    }

    /// Limited-banner details, or `None` for a standard banner.
    pub fn limited(&self) -> Option<&LimitedBanner> {
        match &self.config.kind {
            BannerKind::Standard => None,
            BannerKind::Limited(limited) => Some(limited),
        }
    }

    /// Featured rewards in a stable order (empty for standard banners).
    pub fn featured(&self) -> &[RewardId] {
        &self.featured
    }

    /// Check that the banner can be pulled on at `now`.
    pub fn check_open(&self, now: DateTime<Utc>) -> GachaResult<()> {
        let Some(limited) = self.limited() else {
            return Ok(());
        };
        if now < limited.valid_from {
            return Err(GachaError::BannerNotOpen {
                banner: self.id().clone(),
                valid_from: limited.valid_from,
            });
        }
        if now >= limited.valid_until {
            return Err(GachaError::BannerExpired {
                banner: self.id().clone(),
                valid_until: limited.valid_until,
            });
        }
        Ok(())
    }

    /// Price of a batch of `pull_count` draws.
    ///
    /// One draw costs `single_pull_cost`, exactly `multi_pull_size` draws cost
    /// `multi_pull_cost`, any other count is priced per draw.
    pub fn cost_for(&self, pull_count: u32) -> GachaResult<u64> {
        if pull_count == self.config.multi_pull_size {
            return Ok(self.config.multi_pull_cost);
        }
        self.config
            .single_pull_cost
            .checked_mul(u64::from(pull_count))
            .ok_or_else(|| GachaError::CostOverflow {
                banner: self.id().clone(),
                pull_count,
            })
    }

    /// Effective SSR rate (percent) for the next pull, given how many pulls
    /// have passed since the last SSR.
    pub fn effective_ssr_rate(&self, pulls_since_last_ssr: u32) -> f64 {
        self.config.ramp.effective_rate(
            self.config.ssr_rate,
            pulls_since_last_ssr.saturating_add(1),
            self.config.soft_pity_threshold,
            self.config.hard_pity_threshold,
        )
    }
}

impl RewardPool for Banner {
    fn pick(&self, tier: Tier, featured: bool, roll: f64) -> Option<RewardId> {
        if featured {
            pick_uniform(&self.featured, roll).cloned()
        } else {
            self.config.rewards.pick(tier, false, roll)
        }
    }
}


#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::fixtures::*;
    use super::*;

    fn reason(config: BannerConfig) -> String {
        match config.validate() {
            Err(GachaError::InvalidBannerConfig { reason, .. }) => reason,
            other => panic!("expected InvalidBannerConfig, got {other:?}"),
        }
    }

    #[test]
    fn fixtures_are_valid() {
        assert!(standard_config().validate().is_ok());
        assert!(limited_config().validate().is_ok());
    }

    #[test]
    fn rate_sum_within_tolerance() {
        let mut cfg = standard_config();
        cfg.r_rate = 94.305;
        assert!(cfg.validate().is_ok());
        cfg.r_rate = 94.0;
        assert!(reason(cfg).contains("sum to 100"));
    }

    #[test]
    fn rate_out_of_range() {
        let mut cfg = standard_config();
        cfg.ssr_rate = -0.6;
        cfg.r_rate = 95.5;
        assert!(reason(cfg).contains("ssr_rate"));

        let mut cfg = standard_config();
        cfg.sr_rate = f64::NAN;
        assert!(reason(cfg).contains("sr_rate"));
    }

    #[test]
    fn soft_must_be_below_hard() {
        let mut cfg = standard_config();
        cfg.soft_pity_threshold = 90;
        assert!(reason(cfg).contains("soft_pity_threshold"));
    }

    #[test]
    fn featured_guarantee_at_least_hard() {
        let mut cfg = standard_config();
        cfg.featured_guarantee_threshold = 89;
        assert!(reason(cfg).contains("featured_guarantee_threshold"));

        let mut cfg = standard_config();
        cfg.featured_guarantee_threshold = 90;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn multi_pull_cost_capped() {
        let mut cfg = standard_config();
        cfg.multi_pull_cost = 1601;
        assert!(reason(cfg).contains("multi_pull_cost"));
    }

    #[test]
    fn multi_pull_size_at_least_two() {
        let mut cfg = standard_config();
        cfg.multi_pull_size = 1;
        assert!(reason(cfg).contains("multi_pull_size"));
    }

    #[test]
    fn limited_needs_featured_rewards() {
        let mut cfg = limited_config();
        if let BannerKind::Limited(limited) = &mut cfg.kind {
            limited.featured_ids.clear();
        }
        assert!(reason(cfg).contains("featured reward"));
    }

    #[test]
    fn limited_needs_forward_window() {
        let mut cfg = limited_config();
        if let BannerKind::Limited(limited) = &mut cfg.kind {
            limited.valid_until = limited.valid_from;
        }
        assert!(reason(cfg).contains("valid_until"));
    }

    #[test]
    fn featured_not_in_standard_pool() {
        let mut cfg = limited_config();
        cfg.rewards.ssr.push(RewardId::new("vesna"));
        assert!(reason(cfg).contains("also in the standard SSR pool"));
    }

    #[test]
    fn empty_pools_rejected() {
        let mut cfg = standard_config();
        cfg.rewards.ssr.clear();
        assert!(reason(cfg).contains("SSR reward pool"));

        let mut cfg = standard_config();
        cfg.rewards.sr.clear();
        assert!(reason(cfg).contains("SR reward pool"));
    }

    #[test]
    fn always_featured_banner_may_skip_standard_ssrs() {
        let mut cfg = limited_config();
        cfg.rewards.ssr.clear();
        if let BannerKind::Limited(limited) = &mut cfg.kind {
            limited.featured_rate = 100.0;
        }
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn invalid_config_never_becomes_banner() {
        let mut cfg = standard_config();
        cfg.hard_pity_threshold = 0;
        assert!(matches!(
            Banner::new(cfg),
            Err(GachaError::InvalidBannerConfig { .. })
        ));
    }

    #[test]
    fn cost_for_counts() {
        let banner = standard();
        assert_eq!(banner.cost_for(1).unwrap(), 160);
        assert_eq!(banner.cost_for(10).unwrap(), 1600);
        assert_eq!(banner.cost_for(3).unwrap(), 480);
        assert_eq!(banner.cost_for(20).unwrap(), 3200);
    }

    #[test]
    fn cost_overflow_is_an_error() {
        let mut cfg = standard_config();
        cfg.single_pull_cost = u64::MAX / 2;
        cfg.multi_pull_cost = 0;
        let banner = Banner::new(cfg).unwrap();
        assert!(matches!(
            banner.cost_for(3),
            Err(GachaError::CostOverflow { pull_count: 3, .. })
        ));
    }

    #[test]
    fn standard_banner_always_open() {
        let banner = standard();
        let ancient = Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap();
        assert!(banner.check_open(ancient).is_ok());
    }

    #[test]
    fn limited_window() {
        let banner = limited();
        let before = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let during = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let at_close = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            banner.check_open(before),
            Err(GachaError::BannerNotOpen { .. })
        ));
        assert!(banner.check_open(during).is_ok());
        assert!(matches!(
            banner.check_open(at_close),
            Err(GachaError::BannerExpired { .. })
        ));
    }

    #[test]
    fn featured_pick_uses_featured_pool() {
        let banner = limited();
        assert_eq!(
            banner.pick(Tier::Ssr, true, 0.99).unwrap().as_str(),
            "vesna"
        );
        let off = banner.pick(Tier::Ssr, false, 0.0).unwrap();
        assert_eq!(off.as_str(), "sera");
    }

    #[test]
    fn name_falls_back_to_id() {
        let mut cfg = standard_config();
        cfg.name.clear();
        let banner = Banner::new(cfg).unwrap();
        assert_eq!(banner.name(), "wanderlust");
    }

    #[test]
    fn deserialize_limited_json() {
        let json = r#"{
            "id": "moonlit-tide",
            "kind": {
                "type": "limited",
                "featured_rate": 50,
                "featured_ids": ["vesna"],
                "valid_from": "2026-01-01T00:00:00Z",
                "valid_until": "2027-01-01T00:00:00Z"
            },
            "ssr_rate": 0.6, "sr_rate": 5.1, "r_rate": 94.3,
            "soft_pity_threshold": 75,
            "hard_pity_threshold": 90,
            "featured_guarantee_threshold": 180,
            "single_pull_cost": 160,
            "multi_pull_cost": 1600,
            "rewards": { "ssr": ["sera"], "sr": ["bram"], "r": ["oak-bow"] }
        }"#;
        let cfg: BannerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.multi_pull_size, DEFAULT_MULTI_PULL_SIZE);
        assert_eq!(cfg.ramp, PityRamp::Linear);
        let banner = Banner::new(cfg).unwrap();
        assert_eq!(banner.limited().unwrap().featured_rate, 50.0);
        assert_eq!(banner.featured().len(), 1);
    }
}
