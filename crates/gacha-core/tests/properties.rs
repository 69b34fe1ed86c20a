//! Property-based tests for gacha-core.
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use gacha_core::{
    Banner, BannerConfig, BannerId, BannerKind, DrawRoll, LimitedBanner, PityRamp, PityRecord,
    PityState, RewardId, RewardTable, Tier, resolve_draw,
};

fn ids(names: &[&str]) -> Vec<RewardId> {
    names.iter().map(|n| RewardId::new(*n)).collect()
}

fn limited_banner(ramp: PityRamp) -> Banner {
    Banner::new(BannerConfig {
        id: BannerId::new("ember-court"),
        name: "Ember Court".into(),
        kind: BannerKind::Limited(LimitedBanner {
            featured_rate: 50.0,
            featured_ids: ids(&["ignis", "cinder"]).into_iter().collect(),
            valid_from: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            valid_until: Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
        }),
        ssr_rate: 0.6,
        sr_rate: 5.1,
        r_rate: 94.3,
        soft_pity_threshold: 75,
        hard_pity_threshold: 90,
        featured_guarantee_threshold: 180,
        ramp,
        single_pull_cost: 160,
        multi_pull_cost: 1600,
        multi_pull_size: 10,
        rewards: RewardTable {
            ssr: ids(&["sera", "kael"]),
            sr: ids(&["bram", "ilse"]),
            r: ids(&["oak-bow"]),
        },
    })
    .unwrap()
}

fn rolls(max: usize) -> impl Strategy<Value = Vec<DrawRoll>> {
    // Bias the tier roll low so SSRs, and therefore 50/50s, show up often.
    let roll = (prop_oneof![0.0f64..0.05, 0.0f64..1.0], 0.0f64..1.0, 0.0f64..1.0)
        .prop_map(|(t, f, r)| DrawRoll::new(t, f, r));
    prop::collection::vec(roll, 1..max)
}

fn ramp() -> impl Strategy<Value = PityRamp> {
    prop_oneof![
        Just(PityRamp::Linear),
        (0.5f64..20.0).prop_map(|increment| PityRamp::Stepped { increment }),
    ]
}

proptest! {
    #[test]
    fn every_reachable_state_is_consistent(ramp in ramp(), rolls in rolls(400)) {
        let banner = limited_banner(ramp);
        let mut state = PityState::new();
        for roll in rolls {
            state = resolve_draw(&banner, &state, roll).unwrap().state;
            let restored = PityState::restore(state.to_record()).unwrap();
            prop_assert_eq!(restored, state);
            prop_assert!(state.pulls_since_last_ssr() < 90);
        }
    }

    #[test]
    fn ssr_resets_fairness_counters(rolls in rolls(400)) {
        let banner = limited_banner(PityRamp::Linear);
        let mut state = PityState::new();
        for roll in rolls {
            let res = resolve_draw(&banner, &state, roll).unwrap();
            if res.outcome.tier == Tier::Ssr {
                prop_assert_eq!(res.state.pulls_since_last_ssr(), 0);
            } else {
                prop_assert_eq!(res.state.pulls_since_last_ssr(), state.pulls_since_last_ssr() + 1);
            }
            if res.outcome.is_featured {
                prop_assert_eq!(res.outcome.tier, Tier::Ssr);
                prop_assert_eq!(res.state.pulls_since_last_featured(), 0);
                prop_assert!(!res.state.guaranteed_featured_next());
                prop_assert!(banner.featured().contains(&res.outcome.reward_id));
            }
            prop_assert_eq!(res.state.total_pulls(), state.total_pulls() + 1);
            state = res.state;
        }
    }

    #[test]
    fn ssr_after_lost_fifty_fifty_is_featured(rolls in rolls(400)) {
        let banner = limited_banner(PityRamp::Linear);
        let mut state = PityState::new();
        let mut lost = false;
        for roll in rolls {
            let res = resolve_draw(&banner, &state, roll).unwrap();
            if res.outcome.tier == Tier::Ssr {
                if lost {
                    prop_assert!(res.outcome.is_featured);
                }
                lost = !res.outcome.is_featured;
            }
            state = res.state;
        }
    }

    #[test]
    fn hard_pity_bounds_every_gap(rolls in rolls(600)) {
        let banner = limited_banner(PityRamp::Linear);
        let mut state = PityState::new();
        let mut gap = 0u32;
        for roll in rolls {
            let res = resolve_draw(&banner, &state, roll).unwrap();
            gap += 1;
            prop_assert!(gap <= 90);
            if res.outcome.tier == Tier::Ssr {
                gap = 0;
            }
            state = res.state;
        }
    }

    #[test]
    fn negative_counters_never_restore(value in i64::MIN..0) {
        let record = PityRecord {
            pulls_since_last_ssr: value,
            ..PityRecord::default()
        };
        prop_assert!(PityState::restore(record).is_err());
    }

    #[test]
    fn effective_rate_stays_within_base_and_hundred(ramp in ramp(), since in 0u32..200) {
        let banner = limited_banner(ramp);
        let rate = banner.effective_ssr_rate(since);
        prop_assert!((0.6..=100.0).contains(&rate));
        if since + 1 >= 90 {
            prop_assert_eq!(rate, 100.0);
        }
    }
}
