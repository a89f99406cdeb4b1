use std::collections::HashSet;

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use crate::engine::economy;
use crate::store::profile::StudentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// One achievement: a side-effect-free predicate over the student record plus
/// a one-time reward. New achievements are added here, never in the
/// evaluation loop.
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub rarity: Rarity,
    pub reward_coins: i64,
    pub reward_xp: i64,
    predicate: fn(&StudentRecord) -> bool,
}

const REGISTRY: &[AchievementDef] = &[
    AchievementDef {
        id: "first_quiz",
        name: "Quiz Rookie",
        description: "Complete your first quiz",
        icon: "🎯",
        rarity: Rarity::Common,
        reward_coins: 25,
        reward_xp: 10,
        predicate: |r| r.profile.total_quizzes >= 1,
    },
    AchievementDef {
        id: "perfect_score",
        name: "Perfect Scholar",
        description: "Score 100% on a quiz",
        icon: "⭐",
        rarity: Rarity::Rare,
        reward_coins: 50,
        reward_xp: 25,
        predicate: |r| r.attempts.iter().any(|a| a.score >= 100),
    },
    AchievementDef {
        id: "quiz_master",
        name: "Quiz Master",
        description: "Complete 50 quizzes",
        icon: "🏆",
        rarity: Rarity::Epic,
        reward_coins: 200,
        reward_xp: 100,
        predicate: |r| r.profile.total_quizzes >= 50,
    },
    AchievementDef {
        id: "streak_week",
        name: "Week Warrior",
        description: "Study for 7 days in a row",
        icon: "🔥",
        rarity: Rarity::Rare,
        reward_coins: 75,
        reward_xp: 35,
        predicate: |r| r.profile.streak_days >= 7,
    },
    AchievementDef {
        id: "streak_month",
        name: "Monthly Champion",
        description: "Study for 30 days in a row",
        icon: "👑",
        rarity: Rarity::Legendary,
        reward_coins: 300,
        reward_xp: 150,
        predicate: |r| r.profile.streak_days >= 30,
    },
    AchievementDef {
        id: "coin_collector",
        name: "Coin Collector",
        description: "Earn 1000 total coins",
        icon: "💰",
        rarity: Rarity::Rare,
        reward_coins: 100,
        reward_xp: 50,
        predicate: |r| r.profile.total_coins_earned >= 1000,
    },
    AchievementDef {
        id: "subject_expert",
        name: "Subject Expert",
        description: "Score above 80% in 10 quizzes of one subject",
        icon: "🧮",
        rarity: Rarity::Epic,
        reward_coins: 150,
        reward_xp: 75,
        predicate: subject_expert_satisfied,
    },
    AchievementDef {
        id: "early_bird",
        name: "Early Bird",
        description: "Study before 8 AM on 5 different days",
        icon: "🌅",
        rarity: Rarity::Rare,
        reward_coins: 75,
        reward_xp: 35,
        predicate: early_bird_satisfied,
    },
];

fn subject_expert_satisfied(record: &StudentRecord) -> bool {
    let mut high_scores_by_subject: std::collections::HashMap<&str, u32> =
        std::collections::HashMap::new();
    for attempt in &record.attempts {
        if attempt.score >= 80 {
            *high_scores_by_subject.entry(attempt.subject.as_str()).or_default() += 1;
        }
    }
    high_scores_by_subject.values().any(|&n| n >= 10)
}

fn early_bird_satisfied(record: &StudentRecord) -> bool {
    let early_days: HashSet<_> = record
        .attempts
        .iter()
        .filter(|a| a.submitted_at.hour() < 8)
        .map(|a| a.submitted_at.date_naive())
        .collect();
    early_days.len() >= 5
}

pub fn registry() -> &'static [AchievementDef] {
    REGISTRY
}

pub fn find(id: &str) -> Option<&'static AchievementDef> {
    REGISTRY.iter().find(|a| a.id == id)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unlocked {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub rarity: Rarity,
    pub reward_coins: i64,
    pub reward_xp: i64,
}

/// Re-evaluates every achievement not yet unlocked and grants rewards for the
/// newly satisfied ones. Granting is recorded in the profile, so a repeated
/// evaluation can never unlock the same id twice. Achievement rewards skip
/// coin-boost perks.
pub fn evaluate(record: &mut StudentRecord, now: DateTime<Utc>) -> Vec<Unlocked> {
    let satisfied: Vec<&'static AchievementDef> = REGISTRY
        .iter()
        .filter(|def| !record.profile.achievements.contains_key(def.id))
        .filter(|def| (def.predicate)(record))
        .collect();

    let mut newly = Vec::with_capacity(satisfied.len());
    for def in satisfied {
        record.profile.achievements.insert(def.id.to_string(), now);

        if let Err(err) = economy::award_coins(&mut record.profile, def.reward_coins, 1.0, def.id) {
            tracing::warn!(error = %err, achievement = def.id, "achievement coin reward skipped");
        }
        if let Err(err) = economy::award_xp(&mut record.profile, def.reward_xp) {
            tracing::warn!(error = %err, achievement = def.id, "achievement xp reward skipped");
        }

        tracing::info!(
            student = %record.profile.student_id,
            achievement = def.id,
            "achievement unlocked"
        );

        newly.push(Unlocked {
            id: def.id.to_string(),
            name: def.name.to_string(),
            icon: def.icon.to_string(),
            rarity: def.rarity,
            reward_coins: def.reward_coins,
            reward_xp: def.reward_xp,
        });
    }

    newly
}
