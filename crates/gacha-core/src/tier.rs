//! Reward tiers.

use serde::{Deserialize, Serialize};

/// The rarity tier of a draw outcome, from rarest to most common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Super super rare. Tracked by pity.
    #[serde(rename = "SSR")]
    Ssr,
    /// Super rare.
    #[serde(rename = "SR")]
    Sr,
    /// Rare, the common tier.
    #[serde(rename = "R")]
    R,
}

impl Tier {
    /// All tiers in classification order.
    pub fn all() -> &'static [Self] {
        &[Self::Ssr, Self::Sr, Self::R]
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ssr => write!(f, "SSR"),
            Self::Sr => write!(f, "SR"),
            Self::R => write!(f, "R"),
        }
    }
}
