//! Error types for the gacha engine.

use chrono::{DateTime, Utc};

use crate::ids::{BannerId, PlayerId};
use crate::tier::Tier;

/// Alias for `Result<T, GachaError>`.
pub type GachaResult<T> = Result<T, GachaError>;

/// Errors that can occur while publishing banners or resolving pulls.
#[derive(Debug, thiserror::Error)]
pub enum GachaError {
    /// A banner configuration failed validation.
    #[error("invalid banner config '{banner}': {reason}")]
    InvalidBannerConfig {
        /// The banner that failed validation.
        banner: BannerId,
        /// What was wrong with it.
        reason: String,
    },

    /// No banner with the requested ID exists.
    #[error("banner not found: {0}")]
    BannerNotFound(BannerId),

    /// The banner's validity window has closed.
    #[error("banner '{banner}' expired at {valid_until}")]
    BannerExpired {
        /// The expired banner.
        banner: BannerId,
        /// When the banner closed.
        valid_until: DateTime<Utc>,
    },

    /// The banner's validity window has not opened yet.
    #[error("banner '{banner}' opens at {valid_from}")]
    BannerNotOpen {
        /// The banner that is not open yet.
        banner: BannerId,
        /// When the banner opens.
        valid_from: DateTime<Utc>,
    },

    /// The player cannot pay for the requested pulls.
    #[error("insufficient currency for {player}: need {required}, have {available}")]
    InsufficientCurrency {
        /// The player who attempted the pull.
        player: PlayerId,
        /// The cost of the batch.
        required: u64,
        /// The balance at the time of the check.
        available: u64,
    },

    /// Concurrent sessions kept winning the version race.
    #[error("concurrent modification of pity state after {attempts} attempts")]
    ConcurrentModification {
        /// How many times the batch was resolved before giving up.
        attempts: u32,
    },

    /// A pity state or transition broke its invariants.
    #[error("pity invariant violated: {0}")]
    InvariantViolation(String),

    /// The requested number of pulls is not allowed.
    #[error("invalid pull count {count}: must be between 1 and {max}")]
    InvalidPullCount {
        /// The requested count.
        count: u32,
        /// The configured session maximum.
        max: u32,
    },

    /// The price of the requested batch does not fit in a `u64`.
    #[error("cost of {pull_count} pulls on '{banner}' overflows")]
    CostOverflow {
        /// The banner being priced.
        banner: BannerId,
        /// The requested count.
        pull_count: u32,
    },

    /// A reward pool had nothing to pick from.
    #[error("no rewards available for tier {tier} (featured: {featured})")]
    EmptyRewardPool {
        /// The resolved tier.
        tier: Tier,
        /// Whether the featured pool was requested.
        featured: bool,
    },

    /// Reading a banner file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A banner file was not valid JSON for a banner config.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GachaError {
    /// Returns true if the caller may retry the same request later.
    ///
    /// Insufficient currency can be fixed by topping up; a concurrent
    /// modification clears once the competing session finishes.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientCurrency { .. } | Self::ConcurrentModification { .. }
        )
    }
}
