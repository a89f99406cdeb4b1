use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;
use crate::store::profile::{StudentProfile, StudentRecord};

/// Coin bonus granted on reaching a new level.
const LEVEL_UP_COIN_BONUS: i64 = 20;

/// Cumulative XP required to hold `level`. Level 1 starts at 0; each further
/// level costs 100 more XP than the previous step, so the schedule is
/// strictly increasing.
pub fn cumulative_xp_for(level: u32) -> i64 {
    let l = i64::from(level);
    100 * (l - 1) * l / 2
}

/// Largest level whose threshold is within `xp`. Pure and monotonic.
pub fn level_for_xp(xp: i64) -> u32 {
    let mut level = 1u32;
    while cumulative_xp_for(level + 1) <= xp {
        level += 1;
    }
    level
}

/// XP still missing for the next level, for progress displays.
pub fn xp_to_next_level(xp: i64) -> i64 {
    let next = level_for_xp(xp) + 1;
    (cumulative_xp_for(next) - xp).max(0)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinAward {
    pub base_amount: i64,
    pub awarded: i64,
    pub multiplier: f64,
    pub balance: i64,
}

/// Adds coins to the balance. `multiplier` carries any active coin-boost perk
/// factor; pass 1.0 for unboosted awards.
pub fn award_coins(
    profile: &mut StudentProfile,
    amount: i64,
    multiplier: f64,
    reason: &str,
) -> Result<CoinAward, EngineError> {
    if amount < 0 {
        return Err(EngineError::InvalidAmount(amount));
    }

    let awarded = (amount as f64 * multiplier).round() as i64;
    profile.coins += awarded;
    profile.total_coins_earned += awarded;

    tracing::info!(
        student = %profile.student_id,
        awarded,
        reason,
        balance = profile.coins,
        "coins awarded"
    );

    Ok(CoinAward {
        base_amount: amount,
        awarded,
        multiplier,
        balance: profile.coins,
    })
}

/// Debits the balance, failing without mutation when funds are short.
pub fn spend_coins(profile: &mut StudentProfile, amount: i64) -> Result<i64, EngineError> {
    if amount < 0 {
        return Err(EngineError::InvalidAmount(amount));
    }
    if profile.coins < amount {
        return Err(EngineError::InsufficientFunds {
            needed: amount,
            available: profile.coins,
        });
    }

    profile.coins -= amount;
    Ok(profile.coins)
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelChange {
    pub old_level: u32,
    pub new_level: u32,
    pub leveled_up: bool,
    pub bonus_coins: i64,
}

/// Adds XP and reports any level change. A new level grants a coin bonus
/// proportional to the level reached.
pub fn award_xp(profile: &mut StudentProfile, amount: i64) -> Result<LevelChange, EngineError> {
    if amount < 0 {
        return Err(EngineError::InvalidAmount(amount));
    }

    let old_level = level_for_xp(profile.xp);
    profile.xp += amount;
    let new_level = level_for_xp(profile.xp);

    let mut bonus_coins = 0;
    if new_level > old_level {
        bonus_coins = LEVEL_UP_COIN_BONUS * i64::from(new_level);
        profile.coins += bonus_coins;
        profile.total_coins_earned += bonus_coins;
        tracing::info!(
            student = %profile.student_id,
            level = new_level,
            bonus_coins,
            "level up"
        );
    }

    Ok(LevelChange {
        old_level,
        new_level,
        leveled_up: new_level > old_level,
        bonus_coins,
    })
}

/// Applies an activity day to the streak counter. Same-day calls are
/// idempotent; a gap of more than one day resets the streak to 1.
pub fn update_streak(profile: &mut StudentProfile, activity_date: NaiveDate) -> u32 {
    match profile.last_activity_date {
        None => {
            profile.streak_days = 1;
            profile.last_activity_date = Some(activity_date);
        }
        Some(last) if activity_date == last => {}
        Some(last) if activity_date == last.succ_opt().unwrap_or(last) => {
            profile.streak_days += 1;
            profile.last_activity_date = Some(activity_date);
        }
        Some(last) if activity_date > last => {
            profile.streak_days = 1;
            profile.last_activity_date = Some(activity_date);
        }
        // Out-of-order activity dates are ignored.
        Some(_) => {}
    }

    if profile.streak_days > profile.longest_streak {
        profile.longest_streak = profile.streak_days;
    }
    profile.streak_days
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderMetric {
    Coins,
    Level,
    Streak,
}

impl LeaderMetric {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "coins" => Some(Self::Coins),
            "level" => Some(Self::Level),
            "streak" => Some(Self::Streak),
            _ => None,
        }
    }

    fn score(self, profile: &StudentProfile) -> i64 {
        match self {
            Self::Coins => profile.total_coins_earned,
            Self::Level => i64::from(level_for_xp(profile.xp)),
            Self::Streak => i64::from(profile.streak_days),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub student_id: String,
    pub score: i64,
    pub metric: LeaderMetric,
}

/// Top `limit` students by the metric, descending, ties broken by earliest
/// profile creation. Read-only.
pub fn leaderboard(
    records: &[StudentRecord],
    metric: LeaderMetric,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<(&StudentProfile, i64)> = records
        .iter()
        .map(|r| (&r.profile, metric.score(&r.profile)))
        .collect();

    ranked.sort_by(|(a, sa), (b, sb)| sb.cmp(sa).then(a.created_at.cmp(&b.created_at)));

    ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (profile, score))| LeaderboardEntry {
            rank: i + 1,
            student_id: profile.student_id.clone(),
            score,
            metric,
        })
        .collect()
}

/// 1-based leaderboard position of one student, if they have a record.
pub fn position_for(records: &[StudentRecord], metric: LeaderMetric, student_id: &str) -> Option<usize> {
    leaderboard(records, metric, usize::MAX)
        .iter()
        .find(|e| e.student_id == student_id)
        .map(|e| e.rank)
}
