//! Soft-pity ramp policies.
//!
//! Between the soft-pity pull and the hard-pity pull the SSR probability
//! rises above its base rate. How it rises is a property of the banner:
//!
//! - **Linear**: from the base rate at the soft-pity pull to 100% at the
//!   hard-pity pull.
//! - **Stepped**: a fixed number of percentage points per pull, starting at
//!   the soft-pity pull, capped at 100%.

use serde::{Deserialize, Serialize};

/// How the SSR rate ramps up once soft pity is reached.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PityRamp {
    /// Linear interpolation from the base rate to 100%.
    #[default]
    Linear,
    /// Add `increment` percentage points per pull into soft pity.
    Stepped {
        /// Percentage points added per pull (must be positive).
        increment: f64,
    },
}

impl PityRamp {
    /// Effective SSR rate (in percent) for the given 1-based pull number
    /// since the last SSR.
    ///
    /// Returns 100 at or beyond `hard`, `base` before `soft`.
    pub fn effective_rate(self, base: f64, pull_number: u32, soft: u32, hard: u32) -> f64 {
        if pull_number >= hard {
            return 100.0;
        }
        if pull_number < soft {
            return base;
        }
        let into_soft = f64::from(pull_number - soft);
        let rate = match self {
            Self::Linear => {
                let span = f64::from(hard - soft);
                base + (100.0 - base) * into_soft / span
            }
            Self::Stepped { increment } => base + increment * (into_soft + 1.0),
        };
        rate.max(base).min(100.0)
    }

    /// Check that the ramp parameters are usable. Returns a reason on failure.
    pub fn check(self) -> Result<(), String> {
        match self {
            Self::Linear => Ok(()),
            Self::Stepped { increment } if increment.is_finite() && increment > 0.0 => Ok(()),
            Self::Stepped { increment } => Err(format!(
                "stepped ramp increment must be positive, got {increment}"
            )),
        }
    }
}

impl std::fmt::Display for PityRamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Stepped { increment } => write!(f, "stepped (+{increment}%/pull)"),
        }
    }
}
