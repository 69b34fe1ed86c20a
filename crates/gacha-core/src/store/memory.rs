//! In-memory ledger: balances and pity states behind one mutex.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::{CommitError, PityRepository, PullCommit, PullLedger, Wallet};
use crate::error::{GachaError, GachaResult};
use crate::ids::{BannerId, PlayerId};
use crate::pity::PityState;

type PityKey = (PlayerId, BannerId);

fn next_version(found: u64) -> Result<u64, CommitError> {
    found
        .checked_add(1)
        .ok_or(CommitError::VersionOverflow { found })
}

#[derive(Debug, Default)]
struct LedgerInner {
    balances: HashMap<PlayerId, u64>,
    pity: HashMap<PityKey, PityState>,
}

impl LedgerInner {
    fn balance(&self, player: &PlayerId) -> u64 {
        self.balances.get(player).copied().unwrap_or(0)
    }

    fn stored_version(&self, key: &PityKey) -> u64 {
        self.pity.get(key).map_or(0, PityState::version)
    }
}

/// Thread-safe in-memory [`PullLedger`].
///
/// A single lock covers balances and pity states, so a commit observes and
/// writes both under the same critical section.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    inner: Mutex<LedgerInner>,
}

/// Serializable contents of a [`MemoryLedger`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Balance per player.
    #[serde(default)]
    pub balances: BTreeMap<PlayerId, u64>,
    /// Stored pity states.
    #[serde(default)]
    pub pity: Vec<PityEntry>,
}

/// One stored pity state in a [`LedgerSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PityEntry {
    /// Owning player.
    pub player: PlayerId,
    /// Banner the counters belong to.
    pub banner: BannerId,
    /// The counters.
    pub state: PityState,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style starting balance for a player.
    pub fn with_balance(self, player: impl Into<PlayerId>, amount: u64) -> Self {
        self.lock().balances.insert(player.into(), amount);
        self
    }

    /// Add currency to a player's balance. Returns the new balance.
    pub fn credit(&self, player: &PlayerId, amount: u64) -> u64 {
        let mut inner = self.lock();
        let balance = inner.balances.entry(player.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
        *balance
    }

    /// Copy out every balance and pity state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let inner = self.lock();
        let mut pity: Vec<PityEntry> = inner
            .pity
            .iter()
            .map(|((player, banner), state)| PityEntry {
                player: player.clone(),
                banner: banner.clone(),
                state: *state,
            })
            .collect();
        pity.sort_by(|a, b| (&a.player, &a.banner).cmp(&(&b.player, &b.banner)));
        LedgerSnapshot {
            balances: inner.balances.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            pity,
        }
    }

    /// Rebuild a ledger from a snapshot.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let inner = LedgerInner {
            balances: snapshot.balances.into_iter().collect(),
            pity: snapshot
                .pity
                .into_iter()
                .map(|e| ((e.player, e.banner), e.state))
                .collect(),
        };
        Self {
            inner: Mutex::new(inner),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Wallet for MemoryLedger {
    fn balance(&self, player: &PlayerId) -> u64 {
        self.lock().balance(player)
    }

    fn debit(&self, player: &PlayerId, amount: u64) -> GachaResult<u64> {
        let mut inner = self.lock();
        let available = inner.balance(player);
        let Some(remaining) = available.checked_sub(amount) else {
            return Err(GachaError::InsufficientCurrency {
                player: player.clone(),
                required: amount,
                available,
            });
        };
        inner.balances.insert(player.clone(), remaining);
        Ok(remaining)
    }
}

impl PityRepository for MemoryLedger {
    fn load(&self, player: &PlayerId, banner: &BannerId) -> GachaResult<PityState> {
        let key = (player.clone(), banner.clone());
        Ok(self.lock().pity.get(&key).copied().unwrap_or_default())
    }

    fn save(
        &self,
        player: &PlayerId,
        banner: &BannerId,
        state: PityState,
        expected_version: u64,
    ) -> Result<PityState, CommitError> {
        let key = (player.clone(), banner.clone());
        let mut inner = self.lock();
        let found = inner.stored_version(&key);
        if found != expected_version {
            return Err(CommitError::VersionConflict {
                expected: expected_version,
                found,
            });
        }
        let saved = state.with_version(next_version(found)?);
        inner.pity.insert(key, saved);
        Ok(saved)
    }
}

impl PullLedger for MemoryLedger {
    fn commit(&self, commit: &PullCommit<'_>) -> Result<PityState, CommitError> {
        let key = (commit.player.clone(), commit.banner.clone());
        let mut inner = self.lock();

        let available = inner.balance(commit.player);
        let Some(remaining) = available.checked_sub(commit.cost) else {
            return Err(CommitError::InsufficientCurrency {
                required: commit.cost,
                available,
            });
        };
        let found = inner.stored_version(&key);
        if found != commit.expected_version {
            return Err(CommitError::VersionConflict {
                expected: commit.expected_version,
                found,
            });
        }

        let saved = commit.state.with_version(next_version(found)?);
        inner.balances.insert(commit.player.clone(), remaining);
        inner.pity.insert(key, saved);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (PlayerId, BannerId) {
        (PlayerId::new("ayla"), BannerId::new("wanderlust"))
    }

    #[test]
    fn unknown_player_has_zero_balance() {
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.balance(&PlayerId::new("nobody")), 0);
    }

    #[test]
    fn debit_and_credit() {
        let (player, _) = ids();
        let ledger = MemoryLedger::new().with_balance("ayla", 500);
        assert_eq!(ledger.debit(&player, 160).unwrap(), 340);
        assert_eq!(ledger.credit(&player, 60), 400);
        assert_eq!(ledger.balance(&player), 400);
    }

    #[test]
    fn failed_debit_leaves_balance() {
        let (player, _) = ids();
        let ledger = MemoryLedger::new().with_balance("ayla", 100);
        let err = ledger.debit(&player, 160).unwrap_err();
        assert!(matches!(
            err,
            GachaError::InsufficientCurrency {
                required: 160,
                available: 100,
                ..
            }
        ));
        assert_eq!(ledger.balance(&player), 100);
    }

    #[test]
    fn missing_pity_loads_as_zero() {
        let (player, banner) = ids();
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.load(&player, &banner).unwrap(), PityState::new());
    }

    #[test]
    fn save_bumps_version_and_detects_conflicts() {
        let (player, banner) = ids();
        let ledger = MemoryLedger::new();
        let state = PityState::new().record_pull(false, false).unwrap();

        let saved = ledger.save(&player, &banner, state, 0).unwrap();
        assert_eq!(saved.version(), 1);

        let stale = ledger.save(&player, &banner, state, 0).unwrap_err();
        assert_eq!(
            stale,
            CommitError::VersionConflict {
                expected: 0,
                found: 1
            }
        );
        assert_eq!(ledger.load(&player, &banner).unwrap(), saved);
    }

    #[test]
    fn commit_debits_and_saves_together() {
        let (player, banner) = ids();
        let ledger = MemoryLedger::new().with_balance("ayla", 2000);
        let state = PityState::new().record_pull(false, false).unwrap();
        let commit = PullCommit {
            player: &player,
            banner: &banner,
            cost: 1600,
            state,
            expected_version: 0,
        };
        let saved = ledger.commit(&commit).unwrap();
        assert_eq!(saved.version(), 1);
        assert_eq!(ledger.balance(&player), 400);
        assert_eq!(ledger.load(&player, &banner).unwrap().total_pulls(), 1);
    }

    #[test]
    fn refused_commit_writes_nothing() {
        let (player, banner) = ids();
        let ledger = MemoryLedger::new().with_balance("ayla", 2000);
        let state = PityState::new().record_pull(false, false).unwrap();

        let poor = PullCommit {
            player: &player,
            banner: &banner,
            cost: 5000,
            state,
            expected_version: 0,
        };
        assert!(matches!(
            ledger.commit(&poor),
            Err(CommitError::InsufficientCurrency { .. })
        ));

        let stale = PullCommit {
            cost: 160,
            expected_version: 4,
            ..poor
        };
        assert!(matches!(
            ledger.commit(&stale),
            Err(CommitError::VersionConflict { .. })
        ));

        assert_eq!(ledger.balance(&player), 2000);
        assert_eq!(ledger.load(&player, &banner).unwrap(), PityState::new());
    }

    #[test]
    fn snapshot_round_trip() {
        let (player, banner) = ids();
        let ledger = MemoryLedger::new().with_balance("ayla", 800);
        let state = PityState::new().record_pull(true, false).unwrap();
        ledger.save(&player, &banner, state, 0).unwrap();

        let snapshot = ledger.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored = MemoryLedger::from_snapshot(serde_json::from_str(&json).unwrap());

        assert_eq!(restored.balance(&player), 800);
        let loaded = restored.load(&player, &banner).unwrap();
        assert!(loaded.guaranteed_featured_next());
        assert_eq!(loaded.version(), 1);
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn exhausted_version_is_refused() {
        let (player, banner) = ids();
        let ledger = MemoryLedger::from_snapshot(LedgerSnapshot {
            balances: [(player.clone(), 500)].into_iter().collect(),
            pity: vec![PityEntry {
                player: player.clone(),
                banner: banner.clone(),
                state: PityState::new().with_version(u64::MAX),
            }],
        });
        let before = ledger.snapshot();
        let state = PityState::new().record_pull(false, false).unwrap();

        let commit = PullCommit {
            player: &player,
            banner: &banner,
            cost: 160,
            state,
            expected_version: u64::MAX,
        };
        assert_eq!(
            ledger.commit(&commit),
            Err(CommitError::VersionOverflow { found: u64::MAX })
        );
        assert_eq!(
            ledger.save(&player, &banner, state, u64::MAX),
            Err(CommitError::VersionOverflow { found: u64::MAX })
        );
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn snapshot_with_corrupt_state_is_rejected() {
        let json = r#"{
            "balances": {"ayla": 10},
            "pity": [{
                "player": "ayla",
                "banner": "wanderlust",
                "state": {
                    "pulls_since_last_ssr": -3,
                    "pulls_since_last_featured": 0,
                    "guaranteed_featured_next": false,
                    "total_pulls": 0,
                    "total_ssr": 0,
                    "total_featured": 0,
                    "version": 2
                }
            }]
        }"#;
        assert!(serde_json::from_str::<LedgerSnapshot>(json).is_err());
    }
}
