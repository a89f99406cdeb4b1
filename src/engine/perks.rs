use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::engine::economy;
use crate::engine::error::EngineError;
use crate::store::profile::{PerkActivation, PerkOwnership, StudentProfile, StudentRecord};

/// Every perk effect the engine understands. Consumers never look at raw
/// flags; they ask the query functions below, which match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PerkEffect {
    /// Adds seconds to the quiz time limit while owned.
    ExtraQuizTime { seconds: u32 },
    /// One hint per redemption; inert at zero remaining uses.
    QuizHints { uses: u32 },
    /// Multiplies quiz coin rewards inside a window from purchase.
    CoinMultiplier { factor: f64, duration_hours: i64 },
    /// Display-only.
    Cosmetic,
}

#[derive(Debug, Clone, Copy)]
pub struct PerkDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub cost: i64,
    pub effect: PerkEffect,
}

const CATALOG: &[PerkDef] = &[
    PerkDef {
        id: "golden_star",
        name: "Golden Star Badge",
        description: "Show everyone you're a star student!",
        icon: "⭐",
        cost: 50,
        effect: PerkEffect::Cosmetic,
    },
    PerkDef {
        id: "superhero_avatar",
        name: "Super Learner Avatar",
        description: "Unlock a cool superhero avatar!",
        icon: "🦸",
        cost: 100,
        effect: PerkEffect::Cosmetic,
    },
    PerkDef {
        id: "speed_boost",
        name: "Speed Boost",
        description: "Get extra time for quizzes!",
        icon: "⚡",
        cost: 75,
        effect: PerkEffect::ExtraQuizTime { seconds: 30 },
    },
    PerkDef {
        id: "hint_helper",
        name: "Hint Helper",
        description: "Get one free hint per quiz!",
        icon: "💡",
        cost: 30,
        effect: PerkEffect::QuizHints { uses: 1 },
    },
    PerkDef {
        id: "rainbow_theme",
        name: "Rainbow Theme",
        description: "Make your app colorful!",
        icon: "🌈",
        cost: 80,
        effect: PerkEffect::Cosmetic,
    },
    PerkDef {
        id: "double_coins",
        name: "Double Coins",
        description: "Earn 2x coins for 24 hours!",
        icon: "💎",
        cost: 200,
        effect: PerkEffect::CoinMultiplier {
            factor: 2.0,
            duration_hours: 24,
        },
    },
];

pub fn catalog() -> &'static [PerkDef] {
    CATALOG
}

pub fn find(perk_id: &str) -> Option<&'static PerkDef> {
    CATALOG.iter().find(|p| p.id == perk_id)
}

/// The single place that decides whether an owned perk's effect currently
/// applies. Duration perks lapse at their window edge; one-shot perks go
/// inert at zero uses.
fn activation_live(activation: &PerkActivation, now: DateTime<Utc>) -> bool {
    match activation {
        PerkActivation::Timed { expires_at } => *expires_at > now,
        PerkActivation::Uses { remaining } => *remaining > 0,
        PerkActivation::Permanent => true,
    }
}

fn owned_live<'a>(
    profile: &'a StudentProfile,
    perk_id: &str,
    now: DateTime<Utc>,
) -> Option<&'a PerkOwnership> {
    profile
        .perks
        .get(perk_id)
        .filter(|owned| activation_live(&owned.activation, now))
}

/// Whether an owned perk's effect currently applies.
pub fn is_active(profile: &StudentProfile, perk_id: &str, now: DateTime<Utc>) -> bool {
    owned_live(profile, perk_id, now).is_some()
}

/// Combined coin multiplier from active boost perks; 1.0 when none apply.
pub fn coin_multiplier(profile: &StudentProfile, now: DateTime<Utc>) -> f64 {
    let mut factor = 1.0;
    for def in CATALOG {
        if let PerkEffect::CoinMultiplier { factor: f, .. } = def.effect {
            if owned_live(profile, def.id, now).is_some() {
                factor *= f;
            }
        }
    }
    factor
}

/// Extra quiz seconds granted by active time perks.
pub fn extra_quiz_time_secs(profile: &StudentProfile, now: DateTime<Utc>) -> u32 {
    let mut seconds = 0;
    for def in CATALOG {
        if let PerkEffect::ExtraQuizTime { seconds: s } = def.effect {
            if owned_live(profile, def.id, now).is_some() {
                seconds += s;
            }
        }
    }
    seconds
}

/// Whether any hint use is currently available.
pub fn hint_available(profile: &StudentProfile, now: DateTime<Utc>) -> bool {
    CATALOG.iter().any(|def| {
        matches!(def.effect, PerkEffect::QuizHints { .. }) && owned_live(profile, def.id, now).is_some()
    })
}

/// Consumes one hint use. Returns the remaining count, or None when no hint
/// perk with uses left is owned.
pub fn redeem_hint(profile: &mut StudentProfile) -> Option<u32> {
    for def in CATALOG {
        if !matches!(def.effect, PerkEffect::QuizHints { .. }) {
            continue;
        }
        if let Some(owned) = profile.perks.get_mut(def.id) {
            if let PerkActivation::Uses { remaining } = &mut owned.activation {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Some(*remaining);
                }
            }
        }
    }
    None
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOutcome {
    pub perk_id: String,
    pub cost: i64,
    pub balance: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_uses: Option<u32>,
}

/// Debits the perk cost and records ownership. Repurchasing an active
/// duration perk extends the window; repurchasing a one-shot perk adds
/// independent uses; cosmetics and permanent perks stay owned as-is.
pub fn purchase(
    record: &mut StudentRecord,
    perk_id: &str,
    now: DateTime<Utc>,
) -> Result<PurchaseOutcome, EngineError> {
    let def = find(perk_id).ok_or_else(|| EngineError::UnknownPerk(perk_id.to_string()))?;

    let balance = economy::spend_coins(&mut record.profile, def.cost)?;

    let activation = match def.effect {
        PerkEffect::CoinMultiplier { duration_hours, .. } => {
            let window = Duration::hours(duration_hours);
            let base = match record.profile.perks.get(def.id) {
                Some(PerkOwnership {
                    activation: PerkActivation::Timed { expires_at },
                    ..
                }) if *expires_at > now => *expires_at,
                _ => now,
            };
            PerkActivation::Timed {
                expires_at: base + window,
            }
        }
        PerkEffect::QuizHints { uses } => {
            let existing = match record.profile.perks.get(def.id) {
                Some(PerkOwnership {
                    activation: PerkActivation::Uses { remaining },
                    ..
                }) => *remaining,
                _ => 0,
            };
            PerkActivation::Uses {
                remaining: existing + uses,
            }
        }
        PerkEffect::ExtraQuizTime { .. } | PerkEffect::Cosmetic => PerkActivation::Permanent,
    };

    let (expires_at, remaining_uses) = match &activation {
        PerkActivation::Timed { expires_at } => (Some(*expires_at), None),
        PerkActivation::Uses { remaining } => (None, Some(*remaining)),
        PerkActivation::Permanent => (None, None),
    };

    record.profile.perks.insert(
        def.id.to_string(),
        PerkOwnership {
            perk_id: def.id.to_string(),
            purchased_at: now,
            activation,
        },
    );

    tracing::info!(
        student = %record.profile.student_id,
        perk = def.id,
        cost = def.cost,
        "perk purchased"
    );

    Ok(PurchaseOutcome {
        perk_id: def.id.to_string(),
        cost: def.cost,
        balance,
        expires_at,
        remaining_uses,
    })
}
