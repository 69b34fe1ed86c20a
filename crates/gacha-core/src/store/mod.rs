//! Storage interfaces consumed by pull sessions.
//!
//! The engine does not own persistence. It talks to banners, wallets, and
//! pity records through these traits; [`MemoryLedger`] is the in-process
//! implementation used by tests and the CLI.
//!
//! The one hard requirement on an implementation is [`PullLedger::commit`]:
//! the currency debit and the pity save of a batch must land together or not
//! at all, and the save must fail if the stored version moved since the
//! batch read it.

pub mod memory;

pub use memory::{LedgerSnapshot, MemoryLedger, PityEntry};

use std::sync::Arc;

use crate::banner::Banner;
use crate::error::GachaResult;
use crate::ids::{BannerId, PlayerId};
use crate::pity::PityState;

/// Looks up published banners.
pub trait BannerRepository: Send + Sync {
    /// Load a banner, failing with `BannerNotFound` when it does not exist.
    fn load(&self, id: &BannerId) -> GachaResult<Arc<Banner>>;
}

/// A player's currency balance.
pub trait Wallet: Send + Sync {
    /// Current balance (zero for unknown players).
    fn balance(&self, player: &PlayerId) -> u64;

    /// Debit `amount`, returning the new balance. Fails with
    /// `InsufficientCurrency` and leaves the balance unchanged when the
    /// player cannot pay.
    fn debit(&self, player: &PlayerId, amount: u64) -> GachaResult<u64>;
}

/// Stored pity state, one per (player, banner).
pub trait PityRepository: Send + Sync {
    /// Load the state, or a fresh zero state when none is stored.
    fn load(&self, player: &PlayerId, banner: &BannerId) -> GachaResult<PityState>;

    /// Store `state` if the stored version still equals `expected_version`.
    /// Returns the state as stored, with its new version.
    fn save(
        &self,
        player: &PlayerId,
        banner: &BannerId,
        state: PityState,
        expected_version: u64,
    ) -> Result<PityState, CommitError>;
}

/// Everything a batch writes when it completes.
#[derive(Debug, Clone, Copy)]
pub struct PullCommit<'a> {
    /// The paying player.
    pub player: &'a PlayerId,
    /// The banner pulled on.
    pub banner: &'a BannerId,
    /// Currency to debit.
    pub cost: u64,
    /// Pity state after the last draw of the batch.
    pub state: PityState,
    /// Version of the state the batch started from.
    pub expected_version: u64,
}

/// Why a commit was refused. Nothing was written in any case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    /// The balance no longer covers the cost.
    #[error("insufficient currency: need {required}, have {available}")]
    InsufficientCurrency {
        /// Cost of the batch.
        required: u64,
        /// Balance at commit time.
        available: u64,
    },

    /// Another session saved this pity state first.
    #[error("version conflict: expected {expected}, found {found}")]
    VersionConflict {
        /// Version the batch read.
        expected: u64,
        /// Version currently stored.
        found: u64,
    },

    /// The stored version token cannot be advanced any further.
    #[error("pity version {found} cannot be incremented")]
    VersionOverflow {
        /// Version currently stored.
        found: u64,
    },
}

/// Wallet plus pity storage with an atomic commit of both.
pub trait PullLedger: Wallet + PityRepository {
    /// Debit `commit.cost` and save `commit.state` as one atomic unit.
    fn commit(&self, commit: &PullCommit<'_>) -> Result<PityState, CommitError>;
}
