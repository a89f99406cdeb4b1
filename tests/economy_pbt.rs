//! Property tests for the coin ledger and the level schedule.

use chrono::Utc;
use proptest::prelude::*;

use tutor_backend_rust::engine::economy::{
    award_coins, award_xp, level_for_xp, spend_coins,
};
use tutor_backend_rust::store::profile::StudentProfile;

#[derive(Debug, Clone)]
enum Op {
    Award(i64),
    Spend(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0i64..=500).prop_map(Op::Award),
        (0i64..=500).prop_map(Op::Spend),
    ]
}

proptest! {
    /// Balance is never negative and always equals awards minus successful
    /// spends, whatever the operation order.
    #[test]
    fn ledger_balances(ops in proptest::collection::vec(op_strategy(), 0..200)) {
        let mut profile = StudentProfile::new("prop", Utc::now());
        let mut expected: i64 = 0;

        for op in ops {
            match op {
                Op::Award(amount) => {
                    award_coins(&mut profile, amount, 1.0, "prop").unwrap();
                    expected += amount;
                }
                Op::Spend(amount) => {
                    if spend_coins(&mut profile, amount).is_ok() {
                        expected -= amount;
                    }
                }
            }
            prop_assert!(profile.coins >= 0);
            prop_assert_eq!(profile.coins, expected);
        }
    }

    /// Level is a pure, monotone function of cumulative XP, and awarding XP
    /// never lowers it.
    #[test]
    fn level_is_monotone_in_xp(awards in proptest::collection::vec(0i64..=400, 1..100)) {
        let mut profile = StudentProfile::new("prop", Utc::now());
        let mut last_level = level_for_xp(profile.xp);

        for amount in awards {
            let change = award_xp(&mut profile, amount).unwrap();
            prop_assert!(change.new_level >= last_level);
            prop_assert_eq!(change.new_level, level_for_xp(profile.xp));
            last_level = change.new_level;
        }
    }

    /// The same cumulative XP always maps to the same level.
    #[test]
    fn level_is_deterministic(xp in 0i64..=1_000_000) {
        prop_assert_eq!(level_for_xp(xp), level_for_xp(xp));
        prop_assert!(level_for_xp(xp) >= 1);
    }
}
