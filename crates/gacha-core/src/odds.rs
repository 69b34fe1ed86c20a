//! Exact odds of a banner, derived from its rate table and pity rules.
//!
//! Because hard pity bounds the gap between SSRs, the distribution of the
//! pull on which the next SSR lands is finite and can be computed by walking
//! the survival probability pull by pull.

use serde::Serialize;

use crate::banner::Banner;
use crate::ids::BannerId;

/// Odds of one banner, starting from a fresh pity state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OddsReport {
    /// The analyzed banner.
    pub banner_id: BannerId,
    /// Effective SSR rate (percent) of pull `n` at index `n - 1`.
    pub effective_rates: Vec<f64>,
    /// Probability that the first SSR lands on pull `n`, at index `n - 1`.
    pub first_ssr: Vec<f64>,
    /// Mean number of pulls per SSR.
    pub expected_pulls_per_ssr: f64,
    /// Long-run SSR rate (percent) including pity.
    pub consolidated_ssr_rate: f64,
    /// Mean number of pulls per featured SSR (limited banners only).
    pub expected_pulls_per_featured: Option<f64>,
    /// Most pulls a featured SSR can take (limited banners only).
    pub worst_case_featured: Option<u32>,
}

impl OddsReport {
    /// Probability of at least one SSR within the first `pulls` pulls.
    pub fn ssr_within(&self, pulls: u32) -> f64 {
        let total: f64 = self.first_ssr.iter().take(pulls as usize).sum();
        total.min(1.0)
    }

    /// The pull with the highest chance of being the first SSR.
    pub fn most_likely_ssr_pull(&self) -> u32 {
        let mut best = (0, 0.0);
        for (i, p) in self.first_ssr.iter().enumerate() {
            if *p > best.1 {
                best = (i, *p);
            }
        }
        best.0 as u32 + 1
    }
}

/// Compute the odds of a banner.
pub fn analyze(banner: &Banner) -> OddsReport {
    let cfg = banner.config();
    let mut effective_rates = Vec::new();
    let mut first_ssr = Vec::new();
    let mut survival = 1.0;
    let mut expected = 0.0;

    for since in 0..cfg.hard_pity_threshold {
        let rate = banner.effective_ssr_rate(since);
        let p = rate / 100.0;
        let landed = survival * p;
        effective_rates.push(rate);
        first_ssr.push(landed);
        expected += f64::from(since + 1) * landed;
        survival *= 1.0 - p;
        if p >= 1.0 {
            break;
        }
    }

    let (expected_pulls_per_featured, worst_case_featured) = match banner.limited() {
        None => (None, None),
        Some(limited) => {
            let win = (limited.featured_rate / 100.0).min(1.0);
            let threshold = cfg.featured_guarantee_threshold;
            // A lost 50/50 guarantees the next SSR, which takes another
            // `expected` pulls on average.
            let featured: f64 = first_ssr
                .iter()
                .enumerate()
                .map(|(i, q)| {
                    let pull = i as u32 + 1;
                    let f = if pull >= threshold { 1.0 } else { win };
                    q * (f64::from(pull) + (1.0 - f) * expected)
                })
                .sum();
            let hard = cfg.hard_pity_threshold;
            let worst = if threshold == hard || win >= 1.0 {
                hard
            } else {
                hard.saturating_mul(2)
            };
            (Some(featured), Some(worst))
        }
    };

    OddsReport {
        banner_id: banner.id().clone(),
        effective_rates,
        first_ssr,
        expected_pulls_per_ssr: expected,
        consolidated_ssr_rate: if expected > 0.0 { 100.0 / expected } else { 0.0 },
        expected_pulls_per_featured,
        worst_case_featured,
    }
}
