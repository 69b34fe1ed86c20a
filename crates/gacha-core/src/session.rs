//! Pull sessions: one player, one banner, one batch.
//!
//! A [`PullSession`] ties the pure resolver to storage. For each call to
//! [`PullSession::execute`] it loads the banner, prices the batch, checks the
//! balance, resolves every draw in order against a snapshot of the pity
//! state, and then hands the debit and the final state to
//! [`PullLedger::commit`] as one unit. If another session committed the same
//! pity state in the meantime the batch is thrown away and resolved again
//! from a fresh snapshot.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::banner::{Banner, RewardPool};
use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::{GachaError, GachaResult};
use crate::ids::{BannerId, PlayerId, PullId};
use crate::pity::PityState;
use crate::resolver::{DrawRoll, Outcome, resolve_draw_with};
use crate::store::{BannerRepository, CommitError, PullCommit, PullLedger};
use crate::tier::Tier;

/// What a committed batch produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullResult {
    /// Unique ID of this batch.
    pub pull_id: PullId,
    /// The player who paid.
    pub player_id: PlayerId,
    /// The banner pulled on.
    pub banner_id: BannerId,
    /// Currency debited.
    pub cost: u64,
    /// One outcome per draw, in draw order.
    pub outcomes: Vec<Outcome>,
    /// Pity state as committed after the last draw.
    pub pity_snapshot: PityState,
}

impl PullResult {
    /// Number of SSR outcomes.
    pub fn ssr_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.tier == Tier::Ssr).count()
    }

    /// Number of featured outcomes.
    pub fn featured_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_featured).count()
    }

    /// The rarest tier in the batch.
    pub fn best_tier(&self) -> Option<Tier> {
        self.outcomes.iter().map(|o| o.tier).min()
    }
}

/// Executes pull batches against injected storage, clock, and RNG.
///
/// Rewards come from the banner's own lists unless a pool is supplied with
/// [`PullSession::with_rewards`].
pub struct PullSession<R = StdRng> {
    banners: Arc<dyn BannerRepository>,
    ledger: Arc<dyn PullLedger>,
    clock: Arc<dyn Clock>,
    rewards: Option<Arc<dyn RewardPool + Send + Sync>>,
    config: SessionConfig,
    rng: R,
}

impl PullSession<StdRng> {
    /// Create a session with an OS-seeded RNG and the system clock.
    pub fn new(banners: Arc<dyn BannerRepository>, ledger: Arc<dyn PullLedger>) -> Self {
        Self::with_rng(banners, ledger, StdRng::from_os_rng())
    }

    /// Create a session whose draws replay exactly for the same seed.
    pub fn seeded(
        banners: Arc<dyn BannerRepository>,
        ledger: Arc<dyn PullLedger>,
        seed: u64,
    ) -> Self {
        Self::with_rng(banners, ledger, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PullSession<R> {
    /// Create a session drawing from `rng`.
    pub fn with_rng(
        banners: Arc<dyn BannerRepository>,
        ledger: Arc<dyn PullLedger>,
        rng: R,
    ) -> Self {
        Self {
            banners,
            ledger,
            clock: Arc::new(SystemClock),
            rewards: None,
            config: SessionConfig::default(),
            rng,
        }
    }

    /// Replace the clock used for validity checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Pick rewards from `pool` instead of the banner's lists.
    pub fn with_rewards(mut self, pool: Arc<dyn RewardPool + Send + Sync>) -> Self {
        self.rewards = Some(pool);
        self
    }

    /// Replace the session configuration.
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Resolve and commit a batch of `pull_count` draws.
    pub fn execute(
        &mut self,
        player: &PlayerId,
        banner_id: &BannerId,
        pull_count: u32,
    ) -> GachaResult<PullResult> {
        let banner = self.banners.load(banner_id)?;
        banner.check_open(self.clock.now())?;

        if pull_count == 0 || pull_count > self.config.max_pulls {
            return Err(GachaError::InvalidPullCount {
                count: pull_count,
                max: self.config.max_pulls,
            });
        }
        let cost = banner.cost_for(pull_count)?;

        let available = self.ledger.balance(player);
        if available < cost {
            return Err(GachaError::InsufficientCurrency {
                player: player.clone(),
                required: cost,
                available,
            });
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            let start = self.ledger.load(player, banner_id)?;
            let (outcomes, state) = self.resolve_batch(&banner, start, pull_count)?;

            let commit = PullCommit {
                player,
                banner: banner_id,
                cost,
                state,
                expected_version: start.version(),
            };
            match self.ledger.commit(&commit) {
                Ok(committed) => {
                    let result = PullResult {
                        pull_id: PullId::new(),
                        player_id: player.clone(),
                        banner_id: banner_id.clone(),
                        cost,
                        outcomes,
                        pity_snapshot: committed,
                    };
                    log::info!(
                        "pull {} by {player} on {banner_id}: {pull_count} draws, {} SSR, cost {cost}",
                        result.pull_id,
                        result.ssr_count(),
                    );
                    return Ok(result);
                }
                Err(CommitError::InsufficientCurrency {
                    required,
                    available,
                }) => {
                    return Err(GachaError::InsufficientCurrency {
                        player: player.clone(),
                        required,
                        available,
                    });
                }
                Err(CommitError::VersionOverflow { found }) => {
                    log::error!("pity state of {player} on {banner_id} is stuck at version {found}");
                    let msg = format!("version {found} overflowed");
                    return Err(GachaError::InvariantViolation(msg));
                }
                Err(CommitError::VersionConflict { expected, found }) => {
                    if attempts > self.config.max_retries {
                        return Err(GachaError::ConcurrentModification { attempts });
                    }
                    log::warn!(
                        "pity state of {player} on {banner_id} moved from version {expected} to {found}, retrying"
                    );
                }
            }
        }
    }

    fn resolve_batch(
        &mut self,
        banner: &Banner,
        start: PityState,
        pull_count: u32,
    ) -> GachaResult<(Vec<Outcome>, PityState)> {
        let pool: &dyn RewardPool = match &self.rewards {
            Some(pool) => pool.as_ref(),
            None => banner,
        };
        let mut state = start;
        let mut outcomes = Vec::with_capacity(pull_count as usize);
        for _ in 0..pull_count {
            let roll = DrawRoll::sample(&mut self.rng);
            let resolution = resolve_draw_with(banner, &state, roll, pool)
                .inspect_err(|e| {
                    if matches!(e, GachaError::InvariantViolation(_)) {
                        log::error!("aborting batch on {}: {e}", banner.id());
                    }
                })?;
            outcomes.push(resolution.outcome);
            state = resolution.state;
        }
        Ok((outcomes, state))
    }
}
