use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn step_up(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium => Self::Hard,
            Self::Hard => Self::Hard,
        }
    }

    pub fn step_down(self) -> Self {
        match self {
            Self::Easy => Self::Easy,
            Self::Medium => Self::Easy,
            Self::Hard => Self::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A question as supplied by the question bank. Full copies are embedded in
/// active quiz instances so scoring never depends on the bank staying stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizState {
    Created,
    InProgress,
    Submitted,
    Scored,
}

/// A quiz that has been handed to the student. Stays in the record after
/// scoring so duplicate submits can be told apart from unknown quiz ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizInstance {
    pub quiz_id: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
    pub state: QuizState,
    pub hint_available: bool,
    pub extra_time_secs: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptQuestion {
    pub question_id: String,
    pub topic: String,
    pub chosen: Option<usize>,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub quiz_id: String,
    pub subject: String,
    pub topics: Vec<String>,
    pub questions: Vec<AttemptQuestion>,
    /// Percentage score, 0-100.
    pub score: u8,
    pub difficulty: Difficulty,
    pub time_taken_secs: f64,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStats {
    pub correct: u32,
    pub total: u32,
}

impl TopicStats {
    pub fn accuracy(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(f64::from(self.correct) / f64::from(self.total))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PerkActivation {
    /// Effect active until the window elapses; repurchase extends it.
    Timed { expires_at: DateTime<Utc> },
    /// One-shot effect; inert once the counter hits zero.
    Uses { remaining: u32 },
    Permanent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkOwnership {
    pub perk_id: String,
    pub purchased_at: DateTime<Utc>,
    pub activation: PerkActivation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentalPolicy {
    pub webcam_enabled: bool,
    pub attention_monitoring: bool,
    /// Minutes per day; 0 means unlimited.
    pub daily_study_minutes_limit: u32,
    /// Quizzes per day; 0 means unlimited.
    pub daily_quiz_limit: u32,
    pub auto_adjust_difficulty: bool,
}

impl Default for ParentalPolicy {
    fn default() -> Self {
        Self {
            webcam_enabled: true,
            attention_monitoring: true,
            daily_study_minutes_limit: 120,
            daily_quiz_limit: 10,
            auto_adjust_difficulty: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionState {
    /// Most recent sample scores, newest last, bounded by the rolling window.
    pub recent: Vec<f64>,
    pub last_sample_at: Option<DateTime<Utc>>,
    pub last_alert_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub quizzes_submitted: u32,
    pub study_minutes: u32,
}

impl DailyUsage {
    pub fn fresh(date: NaiveDate) -> Self {
        Self {
            date,
            quizzes_submitted: 0,
            study_minutes: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub grade: String,
    pub board: String,
    pub subject: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub subject: String,
    pub started_at: DateTime<Utc>,
    pub alerts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub student_id: String,
    /// Spendable balance. Never negative.
    pub coins: i64,
    /// Lifetime coins earned; drives the coins leaderboard and coin-based
    /// achievements, spending does not reduce it.
    pub total_coins_earned: i64,
    /// Monotonically non-decreasing. Level is always derived from this.
    pub xp: i64,
    pub streak_days: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub total_quizzes: u32,
    pub total_focus_sessions: u32,
    pub study_minutes: u32,
    /// Achievement id -> unlock time. An id appears at most once.
    pub achievements: BTreeMap<String, DateTime<Utc>>,
    pub perks: BTreeMap<String, PerkOwnership>,
    /// subject -> topic -> lifetime stats.
    pub mastery: BTreeMap<String, BTreeMap<String, TopicStats>>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl StudentProfile {
    pub fn new(student_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            student_id: student_id.to_string(),
            coins: 0,
            total_coins_earned: 0,
            xp: 0,
            streak_days: 0,
            longest_streak: 0,
            last_activity_date: None,
            total_quizzes: 0,
            total_focus_sessions: 0,
            study_minutes: 0,
            achievements: BTreeMap::new(),
            perks: BTreeMap::new(),
            mastery: BTreeMap::new(),
            created_at: now,
            last_activity_at: now,
        }
    }
}

/// Everything persisted for one student. One record per student id; the
/// progress store swaps the whole document atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub profile: StudentProfile,
    #[serde(default)]
    pub session: Option<SessionContext>,
    #[serde(default)]
    pub policy: ParentalPolicy,
    /// Append-only, ordered by submission time.
    #[serde(default)]
    pub attempts: Vec<QuizAttempt>,
    #[serde(default)]
    pub quizzes: HashMap<String, QuizInstance>,
    #[serde(default)]
    pub focus_session: Option<FocusSession>,
    #[serde(default)]
    pub attention: AttentionState,
    pub usage: DailyUsage,
}

impl StudentRecord {
    pub fn new(student_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            profile: StudentProfile::new(student_id, now),
            session: None,
            policy: ParentalPolicy::default(),
            attempts: Vec::new(),
            quizzes: HashMap::new(),
            focus_session: None,
            attention: AttentionState::default(),
            usage: DailyUsage::fresh(now.date_naive()),
        }
    }
}
