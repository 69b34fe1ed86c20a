//! Per-player pity counters.
//!
//! A [`PityState`] tracks one player's progress toward the guarantees of one
//! banner. It is a value type: [`PityState::record_pull`] returns the next
//! state instead of mutating in place, and the `version` token only changes
//! when a store persists the state.
//!
//! Persisted states come back through [`PityRecord`], whose counters are
//! signed. [`PityState::restore`] rejects negative or inconsistent records
//! with [`GachaError::InvariantViolation`] rather than clamping them.

use serde::{Deserialize, Serialize};

use crate::banner::Banner;
use crate::error::{GachaError, GachaResult};

/// Fairness counters for one (player, banner) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "PityRecord", into = "PityRecord")]
pub struct PityState {
    pulls_since_last_ssr: u32,
    pulls_since_last_featured: u32,
    guaranteed_featured_next: bool,
    total_pulls: u32,
    total_ssr: u32,
    total_featured: u32,
    version: u64,
}

/// Raw persisted form of a [`PityState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PityRecord {
    /// Pulls since the last SSR.
    pub pulls_since_last_ssr: i64,
    /// Pulls since the last featured SSR.
    pub pulls_since_last_featured: i64,
    /// Whether the next SSR is guaranteed to be featured.
    pub guaranteed_featured_next: bool,
    /// Lifetime pulls.
    pub total_pulls: i64,
    /// Lifetime SSRs.
    pub total_ssr: i64,
    /// Lifetime featured SSRs.
    pub total_featured: i64,
    /// Optimistic-concurrency token.
    pub version: u64,
}

fn counter(name: &str, value: i64) -> GachaResult<u32> {
    u32::try_from(value).map_err(|_| {
        GachaError::InvariantViolation(format!("{name} out of range: {value}"))
    })
}

fn bump(name: &str, value: u32) -> GachaResult<u32> {
    value
        .checked_add(1)
        .ok_or_else(|| GachaError::InvariantViolation(format!("{name} overflowed")))
}

impl PityState {
    /// A fresh state with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a state from its persisted record, checking every invariant.
    pub fn restore(record: PityRecord) -> GachaResult<Self> {
        let state = Self {
            pulls_since_last_ssr: counter("pulls_since_last_ssr", record.pulls_since_last_ssr)?,
            pulls_since_last_featured: counter(
                "pulls_since_last_featured",
                record.pulls_since_last_featured,
            )?,
            guaranteed_featured_next: record.guaranteed_featured_next,
            total_pulls: counter("total_pulls", record.total_pulls)?,
            total_ssr: counter("total_ssr", record.total_ssr)?,
            total_featured: counter("total_featured", record.total_featured)?,
            version: record.version,
        };
        state.check_consistency()?;
        Ok(state)
    }

    /// The persisted form of this state.
    pub fn to_record(&self) -> PityRecord {
        PityRecord {
            pulls_since_last_ssr: i64::from(self.pulls_since_last_ssr),
            pulls_since_last_featured: i64::from(self.pulls_since_last_featured),
            guaranteed_featured_next: self.guaranteed_featured_next,
            total_pulls: i64::from(self.total_pulls),
            total_ssr: i64::from(self.total_ssr),
            total_featured: i64::from(self.total_featured),
            version: self.version,
        }
    }

    fn check_consistency(&self) -> GachaResult<()> {
        let fail = |msg: &str| Err(GachaError::InvariantViolation(msg.to_string()));
        if self.total_ssr > self.total_pulls {
            return fail("total_ssr exceeds total_pulls");
        }
        if self.total_featured > self.total_ssr {
            return fail("total_featured exceeds total_ssr");
        }
        if self.pulls_since_last_ssr > self.pulls_since_last_featured {
            return fail("pulls_since_last_ssr exceeds pulls_since_last_featured");
        }
        if self.pulls_since_last_featured > self.total_pulls {
            return fail("pulls_since_last_featured exceeds total_pulls");
        }
        if self.pulls_since_last_ssr > self.total_pulls - self.total_ssr {
            return fail("pulls_since_last_ssr exceeds non-SSR pulls");
        }
        if self.guaranteed_featured_next && self.total_ssr == self.total_featured {
            return fail("featured guarantee set without a lost 50/50");
        }
        Ok(())
    }

    /// The state after one more pull.
    ///
    /// A featured non-SSR is not a valid transition.
    pub fn record_pull(&self, is_ssr: bool, is_featured: bool) -> GachaResult<Self> {
        let mut next = *self;
        next.total_pulls = bump("total_pulls", self.total_pulls)?;
        match (is_ssr, is_featured) {
            (false, true) => {
                return Err(GachaError::InvariantViolation(
                    "featured outcome recorded on a non-SSR pull".to_string(),
                ));
            }
            (false, false) => {
                next.pulls_since_last_ssr = bump("pulls_since_last_ssr", self.pulls_since_last_ssr)?;
                next.pulls_since_last_featured =
                    bump("pulls_since_last_featured", self.pulls_since_last_featured)?;
            }
            (true, true) => {
                next.pulls_since_last_ssr = 0;
                next.pulls_since_last_featured = 0;
                next.guaranteed_featured_next = false;
                next.total_ssr = bump("total_ssr", self.total_ssr)?;
                next.total_featured = bump("total_featured", self.total_featured)?;
            }
            (true, false) => {
                next.pulls_since_last_ssr = 0;
                next.pulls_since_last_featured =
                    bump("pulls_since_last_featured", self.pulls_since_last_featured)?;
                next.guaranteed_featured_next = true;
                next.total_ssr = bump("total_ssr", self.total_ssr)?;
            }
        }
        Ok(next)
    }

    /// True when the next pull is inside the soft-pity ramp.
    pub fn is_at_soft_pity(&self, banner: &Banner) -> bool {
        self.next_pull_number() >= banner.config().soft_pity_threshold
    }

    /// True when the next pull is a guaranteed SSR.
    pub fn is_at_hard_pity(&self, banner: &Banner) -> bool {
        self.next_pull_number() >= banner.config().hard_pity_threshold
    }

    /// Pulls left up to and including the guaranteed SSR.
    pub fn pulls_until_hard_pity(&self, banner: &Banner) -> u32 {
        banner
            .config()
            .hard_pity_threshold
            .saturating_sub(self.pulls_since_last_ssr)
    }

    /// Pulls left up to and including the pull that forces a featured SSR.
    ///
    /// With a lost 50/50 pending, the next SSR is featured, so the bound is
    /// the nearer of hard pity and the featured threshold. Zero on standard
    /// banners, which have no featured rewards.
    pub fn pulls_until_featured_guarantee(&self, banner: &Banner) -> u32 {
        if banner.limited().is_none() {
            return 0;
        }
        let by_threshold = banner
            .config()
            .featured_guarantee_threshold
            .saturating_sub(self.pulls_since_last_featured);
        if self.guaranteed_featured_next {
            by_threshold.min(self.pulls_until_hard_pity(banner))
        } else {
            by_threshold
        }
    }

    /// Pulls since the last SSR.
    pub fn pulls_since_last_ssr(&self) -> u32 {
        self.pulls_since_last_ssr
    }

    /// Pulls since the last featured SSR.
    pub fn pulls_since_last_featured(&self) -> u32 {
        self.pulls_since_last_featured
    }

    /// Whether the next SSR is guaranteed to be featured.
    pub fn guaranteed_featured_next(&self) -> bool {
        self.guaranteed_featured_next
    }

    /// Lifetime pulls on this banner.
    pub fn total_pulls(&self) -> u32 {
        self.total_pulls
    }

    /// Lifetime SSRs on this banner.
    pub fn total_ssr(&self) -> u32 {
        self.total_ssr
    }

    /// Lifetime featured SSRs on this banner.
    pub fn total_featured(&self) -> u32 {
        self.total_featured
    }

    /// Optimistic-concurrency token.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The same counters under a new version token. Used by stores on save.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    fn next_pull_number(&self) -> u32 {
        self.pulls_since_last_ssr.saturating_add(1)
    }
}

impl TryFrom<PityRecord> for PityState {
    type Error = GachaError;

    fn try_from(record: PityRecord) -> GachaResult<Self> {
        Self::restore(record)
    }
}

impl From<PityState> for PityRecord {
    fn from(state: PityState) -> Self {
        state.to_record()
    }
}

impl std::fmt::Display for PityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} since SSR, {} since featured{}, {} pulls / {} SSR / {} featured",
            self.pulls_since_last_ssr,
            self.pulls_since_last_featured,
            if self.guaranteed_featured_next {
                " (next SSR featured)"
            } else {
                ""
            },
            self.total_pulls,
            self.total_ssr,
            self.total_featured,
        )
    }
}
