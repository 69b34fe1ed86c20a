//! Gacha draw resolution and pity tracking.
//!
//! Provides validated banner configs, the per-player pity state machine, a
//! pure single-draw resolver with soft pity, hard pity, and the limited
//! banner 50/50, and pull sessions that commit currency and pity atomically
//! with optimistic concurrency. Also ships exact odds analysis, outcome
//! statistics, and an in-memory ledger.

pub mod banner;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod odds;
pub mod pity;
pub mod resolver;
pub mod session;
pub mod stats;
pub mod store;
pub mod tier;

pub use banner::{Banner, BannerConfig, BannerKind, LimitedBanner, PityRamp, RewardPool, RewardTable};
pub use catalog::BannerCatalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SessionConfig;
pub use error::{GachaError, GachaResult};
pub use ids::{BannerId, PlayerId, PullId, RewardId};
pub use odds::{OddsReport, analyze};
pub use pity::{PityRecord, PityState};
pub use resolver::{DrawRoll, Outcome, Resolution, resolve_draw, resolve_draw_with};
pub use session::{PullResult, PullSession};
pub use stats::PullStats;
pub use store::{
    BannerRepository, CommitError, LedgerSnapshot, MemoryLedger, PityRepository, PullCommit,
    PullLedger, Wallet,
};
pub use tier::Tier;
