pub mod achievements;
pub mod attention;
pub mod config;
pub mod economy;
pub mod error;
pub mod gate;
pub mod perks;
pub mod prompts;
pub mod question_bank;
pub mod quiz;

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::profile::{
    DailyUsage, Difficulty, FocusSession, ParentalPolicy, Question, QuizAttempt, QuizInstance,
    QuizState, SessionContext, StudentProfile, StudentRecord, TopicStats,
};
use crate::store::ProgressStore;

use achievements::Unlocked;
use attention::{AlertDecision, AttentionSample};
use economy::{LeaderMetric, LeaderboardEntry};
use prompts::PromptSource;
use question_bank::QuestionBank;
use quiz::{DifficultyChoice, WeakTopic};

pub use config::EngineConfig;
pub use error::EngineError;

/// Snapshot of the mutable profile fields plus the derived level figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub student_id: String,
    pub coins: i64,
    pub total_coins_earned: i64,
    pub xp: i64,
    pub level: u32,
    pub xp_to_next_level: i64,
    pub streak_days: u32,
    pub longest_streak: u32,
    pub total_quizzes: u32,
    pub total_focus_sessions: u32,
    pub study_minutes: u32,
    pub achievements_unlocked: usize,
    pub perks_owned: usize,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl ProfileSnapshot {
    fn from_profile(profile: &StudentProfile) -> Self {
        Self {
            student_id: profile.student_id.clone(),
            coins: profile.coins,
            total_coins_earned: profile.total_coins_earned,
            xp: profile.xp,
            level: economy::level_for_xp(profile.xp),
            xp_to_next_level: economy::xp_to_next_level(profile.xp),
            streak_days: profile.streak_days,
            longest_streak: profile.longest_streak,
            total_quizzes: profile.total_quizzes,
            total_focus_sessions: profile.total_focus_sessions,
            study_minutes: profile.study_minutes,
            achievements_unlocked: profile.achievements.len(),
            perks_owned: profile.perks.len(),
            created_at: profile.created_at,
            last_activity_at: profile.last_activity_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedQuiz {
    pub quiz_id: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub hint_available: bool,
    pub extra_time_secs: u32,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: String,
    pub topic: String,
    pub prompt: String,
    pub chosen: Option<usize>,
    pub correct_option: usize,
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub quiz_id: String,
    pub score: u8,
    pub coins_earned: i64,
    pub xp_earned: i64,
    pub leveled_up: bool,
    pub level: u32,
    pub streak_days: u32,
    pub next_difficulty: Difficulty,
    pub newly_unlocked: Vec<Unlocked>,
    pub question_results: Vec<QuestionResult>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRevision {
    pub topic: String,
    pub accuracy: f64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionSummary {
    pub subject: String,
    pub focus_topics: Vec<TopicRevision>,
    pub recommended_difficulty: Difficulty,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttentionOutcome {
    NoAlert,
    Alert { prompt: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusStarted {
    pub subject: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusOutcome {
    pub subject: String,
    pub minutes: u32,
    pub average_attention: f64,
    pub attention_bonus: f64,
    pub coins_earned: i64,
    pub alerts: u32,
    pub newly_unlocked: Vec<Unlocked>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatus {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub rarity: achievements::Rarity,
    pub reward_coins: i64,
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkStatus {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub cost: i64,
    pub owned: bool,
    pub active: bool,
    pub can_afford: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub profile: ProfileSnapshot,
    pub achievements: Vec<AchievementStatus>,
    pub perks: Vec<PerkStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaderboard_position: Option<usize>,
    pub weak_topics: Vec<WeakTopic>,
    pub usage: DailyUsage,
    pub policy: ParentalPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionContext>,
}

/// Partial parental-policy update; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyPatch {
    pub webcam_enabled: Option<bool>,
    pub attention_monitoring: Option<bool>,
    pub daily_study_minutes_limit: Option<u32>,
    pub daily_quiz_limit: Option<u32>,
    pub auto_adjust_difficulty: Option<bool>,
}

/// The engine facade. Every mutating operation is a single store transaction
/// so concurrent callers for the same student compose rather than clobber.
pub struct TutorEngine {
    config: EngineConfig,
    store: Arc<ProgressStore>,
    bank: Arc<dyn QuestionBank>,
    prompts: Arc<dyn PromptSource>,
}

impl TutorEngine {
    pub fn new(
        config: EngineConfig,
        store: Arc<ProgressStore>,
        bank: Arc<dyn QuestionBank>,
        prompts: Arc<dyn PromptSource>,
    ) -> Self {
        Self {
            config,
            store,
            bank,
            prompts,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Begins (or refreshes) a learning session, creating the zero-state
    /// profile on first contact.
    pub async fn setup_session(
        &self,
        student_id: &str,
        grade: &str,
        board: &str,
        subject: &str,
    ) -> Result<ProfileSnapshot, EngineError> {
        let now = Utc::now();
        let session = SessionContext {
            grade: grade.to_string(),
            board: board.to_string(),
            subject: subject.to_string(),
            started_at: now,
        };

        self.store
            .transact(student_id, move |record| {
                record.session = Some(session);
                record.profile.last_activity_at = now;
                Ok::<_, EngineError>(ProfileSnapshot::from_profile(&record.profile))
            })
            .await
    }

    pub async fn create_quiz(
        &self,
        student_id: &str,
        subject: &str,
        requested: DifficultyChoice,
        count: Option<usize>,
    ) -> Result<CreatedQuiz, EngineError> {
        let now = Utc::now();
        let today = Local::now().date_naive();
        let count = count.unwrap_or(self.config.default_quiz_len).max(1);

        let config = self.config.clone();
        let bank = Arc::clone(&self.bank);
        let subject = subject.to_string();

        self.store
            .transact(student_id, move |record| {
                gate::roll_usage(&mut record.usage, today);
                gate::authorize_session(&record.policy, &record.usage)?;

                let difficulty = quiz::resolve_difficulty(
                    &config,
                    &record.attempts,
                    &subject,
                    requested,
                    record.policy.auto_adjust_difficulty,
                );

                let weak = quiz::weak_topics(&config, &record.attempts, &subject);
                let order = quiz::topic_preference(&weak, &bank.topics(&subject));
                let questions = bank.fetch_questions(&subject, &order, difficulty, count);
                if questions.len() < count {
                    return Err(EngineError::InsufficientQuestions {
                        subject: subject.clone(),
                        difficulty,
                        requested: count,
                        available: questions.len(),
                    });
                }

                let instance = QuizInstance {
                    quiz_id: Uuid::new_v4().to_string(),
                    subject: subject.clone(),
                    difficulty,
                    questions,
                    state: QuizState::InProgress,
                    hint_available: perks::hint_available(&record.profile, now),
                    extra_time_secs: perks::extra_quiz_time_secs(&record.profile, now),
                    created_at: now,
                };

                let created = CreatedQuiz {
                    quiz_id: instance.quiz_id.clone(),
                    subject: instance.subject.clone(),
                    difficulty,
                    hint_available: instance.hint_available,
                    extra_time_secs: instance.extra_time_secs,
                    questions: instance.questions.clone(),
                };

                record.quizzes.insert(instance.quiz_id.clone(), instance);
                record.profile.last_activity_at = now;

                tracing::info!(
                    student = %record.profile.student_id,
                    quiz = %created.quiz_id,
                    subject = %created.subject,
                    difficulty = %created.difficulty,
                    "quiz created"
                );

                Ok(created)
            })
            .await
    }

    pub async fn submit_quiz(
        &self,
        student_id: &str,
        quiz_id: &str,
        answers: &[Option<usize>],
        time_taken_secs: f64,
    ) -> Result<QuizResult, EngineError> {
        let now = Utc::now();
        let today = Local::now().date_naive();
        let config = self.config.clone();
        let quiz_id = quiz_id.to_string();
        let answers = answers.to_vec();

        self.store
            .transact(student_id, move |record| {
                let (subject, difficulty, questions) = {
                    let instance = record
                        .quizzes
                        .get_mut(&quiz_id)
                        .ok_or_else(|| EngineError::UnknownQuiz(quiz_id.clone()))?;
                    if instance.state != QuizState::InProgress {
                        return Err(EngineError::AlreadySubmitted(quiz_id.clone()));
                    }
                    instance.state = QuizState::Submitted;
                    (
                        instance.subject.clone(),
                        instance.difficulty,
                        instance.questions.clone(),
                    )
                };

                let (score, rows) = quiz::score_answers(&questions, &answers);

                let mut topics: Vec<String> = Vec::new();
                for question in &questions {
                    if !topics.contains(&question.topic) {
                        topics.push(question.topic.clone());
                    }
                }

                record.attempts.push(QuizAttempt {
                    quiz_id: quiz_id.clone(),
                    subject: subject.clone(),
                    topics,
                    questions: rows.clone(),
                    score,
                    difficulty,
                    time_taken_secs,
                    submitted_at: now,
                });

                let subject_mastery = record
                    .profile
                    .mastery
                    .entry(subject.clone())
                    .or_default();
                for row in &rows {
                    let stats = subject_mastery
                        .entry(row.topic.clone())
                        .or_insert_with(TopicStats::default);
                    stats.total += 1;
                    if row.correct {
                        stats.correct += 1;
                    }
                }

                record.profile.total_quizzes += 1;

                gate::roll_usage(&mut record.usage, today);
                gate::register_quiz(&mut record.usage);
                let minutes = (time_taken_secs / 60.0).ceil().max(0.0) as u32;
                gate::register_minutes(&mut record.usage, minutes);
                record.profile.study_minutes += minutes;

                let streak_days = economy::update_streak(&mut record.profile, today);

                let multiplier = perks::coin_multiplier(&record.profile, now);
                let award = economy::award_coins(
                    &mut record.profile,
                    quiz::coin_reward(difficulty, score),
                    multiplier,
                    "quiz completion",
                )?;
                let level_change = economy::award_xp(&mut record.profile, quiz::xp_reward(score))?;

                let newly_unlocked = achievements::evaluate(record, now);

                let next_difficulty = quiz::resolve_difficulty(
                    &config,
                    &record.attempts,
                    &subject,
                    DifficultyChoice::Auto,
                    record.policy.auto_adjust_difficulty,
                );

                if let Some(instance) = record.quizzes.get_mut(&quiz_id) {
                    instance.state = QuizState::Scored;
                }
                record.profile.last_activity_at = now;

                let question_results = questions
                    .iter()
                    .zip(rows.iter())
                    .map(|(question, row)| QuestionResult {
                        question_id: question.id.clone(),
                        topic: question.topic.clone(),
                        prompt: question.prompt.clone(),
                        chosen: row.chosen,
                        correct_option: question.correct_option,
                        is_correct: row.correct,
                        explanation: question.explanation.clone(),
                    })
                    .collect();

                tracing::info!(
                    student = %record.profile.student_id,
                    quiz = %quiz_id,
                    score,
                    coins = award.awarded,
                    "quiz scored"
                );

                Ok(QuizResult {
                    quiz_id: quiz_id.clone(),
                    score,
                    coins_earned: award.awarded,
                    xp_earned: quiz::xp_reward(score),
                    leveled_up: level_change.leveled_up,
                    level: level_change.new_level,
                    streak_days,
                    next_difficulty,
                    newly_unlocked,
                    question_results,
                })
            })
            .await
    }

    pub async fn weak_topics(
        &self,
        student_id: &str,
        subject: &str,
    ) -> Result<Vec<WeakTopic>, EngineError> {
        let record = self.require_record(student_id).await?;
        Ok(quiz::weak_topics(&self.config, &record.attempts, subject))
    }

    /// Weak-topic list dressed with revision text from the content source.
    pub async fn revision_summary(
        &self,
        student_id: &str,
        subject: &str,
    ) -> Result<RevisionSummary, EngineError> {
        let record = self.require_record(student_id).await?;
        let weak = quiz::weak_topics(&self.config, &record.attempts, subject);

        let focus_topics = weak
            .iter()
            .take(5)
            .map(|w| TopicRevision {
                topic: w.topic.clone(),
                accuracy: w.accuracy,
                text: self.prompts.revision_text(subject, &w.topic),
            })
            .collect();

        let recommended_difficulty = quiz::resolve_difficulty(
            &self.config,
            &record.attempts,
            subject,
            DifficultyChoice::Auto,
            record.policy.auto_adjust_difficulty,
        );

        Ok(RevisionSummary {
            subject: subject.to_string(),
            focus_topics,
            recommended_difficulty,
        })
    }

    pub async fn purchase_perk(
        &self,
        student_id: &str,
        perk_id: &str,
    ) -> Result<perks::PurchaseOutcome, EngineError> {
        let now = Utc::now();
        let perk_id = perk_id.to_string();
        self.store
            .transact(student_id, move |record| {
                let outcome = perks::purchase(record, &perk_id, now)?;
                record.profile.last_activity_at = now;
                Ok(outcome)
            })
            .await
    }

    /// Consumes one hint use from an owned hint perk, if any remain.
    pub async fn redeem_hint(&self, student_id: &str) -> Result<Option<u32>, EngineError> {
        self.store
            .transact(student_id, |record| {
                Ok::<_, EngineError>(perks::redeem_hint(&mut record.profile))
            })
            .await
    }

    pub async fn ingest_attention(
        &self,
        student_id: &str,
        sample: AttentionSample,
    ) -> Result<AttentionOutcome, EngineError> {
        let config = self.config.clone();
        let prompts = Arc::clone(&self.prompts);

        self.store
            .transact(student_id, move |record| {
                let decision =
                    attention::ingest(&config, &record.policy, &mut record.attention, sample);

                match decision {
                    AlertDecision::NoAlert => Ok(AttentionOutcome::NoAlert),
                    AlertDecision::Alert => {
                        if let Some(session) = record.focus_session.as_mut() {
                            session.alerts += 1;
                        }

                        let subject = record
                            .focus_session
                            .as_ref()
                            .map(|s| s.subject.clone())
                            .or_else(|| record.session.as_ref().map(|s| s.subject.clone()))
                            .unwrap_or_else(|| "your studies".to_string());
                        let weakest = quiz::weak_topics(&config, &record.attempts, &subject)
                            .into_iter()
                            .next()
                            .map(|w| w.topic);

                        let prompt = prompts.socratic_prompt(&subject, weakest.as_deref());
                        Ok::<_, EngineError>(AttentionOutcome::Alert { prompt })
                    }
                }
            })
            .await
    }

    /// Starts a focus (video/attention) session once the daily limits pass.
    /// The rolling attention window starts fresh; the alert cooldown carries
    /// over.
    pub async fn start_focus_session(
        &self,
        student_id: &str,
        subject: Option<String>,
    ) -> Result<FocusStarted, EngineError> {
        let now = Utc::now();
        let today = Local::now().date_naive();

        self.store
            .transact(student_id, move |record| {
                gate::roll_usage(&mut record.usage, today);
                gate::authorize_session(&record.policy, &record.usage)?;

                let subject = subject
                    .or_else(|| record.session.as_ref().map(|s| s.subject.clone()))
                    .unwrap_or_else(|| "General".to_string());

                record.attention.recent.clear();
                record.attention.last_sample_at = None;
                record.focus_session = Some(FocusSession {
                    subject: subject.clone(),
                    started_at: now,
                    alerts: 0,
                });
                record.profile.last_activity_at = now;

                Ok::<_, EngineError>(FocusStarted {
                    subject,
                    started_at: now,
                })
            })
            .await
    }

    /// Completes the active focus session. Coins scale with watch time and
    /// the average attention held over the session.
    pub async fn complete_focus_session(
        &self,
        student_id: &str,
        minutes: u32,
    ) -> Result<Option<FocusOutcome>, EngineError> {
        let now = Utc::now();
        let today = Local::now().date_naive();

        self.store
            .transact(student_id, move |record| {
                let Some(session) = record.focus_session.take() else {
                    return Ok(None);
                };

                gate::roll_usage(&mut record.usage, today);
                gate::register_minutes(&mut record.usage, minutes);
                record.profile.study_minutes += minutes;
                record.profile.total_focus_sessions += 1;

                economy::update_streak(&mut record.profile, today);

                // Neutral midpoint when no samples arrived.
                let average_attention =
                    attention::rolling_average(&record.attention).unwrap_or(0.5);
                let attention_bonus = 1.0 + 0.1 * average_attention;
                let multiplier =
                    perks::coin_multiplier(&record.profile, now) * attention_bonus;
                let award = economy::award_coins(
                    &mut record.profile,
                    2 * i64::from(minutes),
                    multiplier,
                    "focus session",
                )?;

                let newly_unlocked = achievements::evaluate(record, now);
                record.profile.last_activity_at = now;

                Ok(Some(FocusOutcome {
                    subject: session.subject,
                    minutes,
                    average_attention,
                    attention_bonus,
                    coins_earned: award.awarded,
                    alerts: session.alerts,
                    newly_unlocked,
                }))
            })
            .await
    }

    pub async fn dashboard(&self, student_id: &str) -> Result<Dashboard, EngineError> {
        let record = self.require_record(student_id).await?;
        let all = self.store.list().await?;
        let now = Utc::now();
        let today = Local::now().date_naive();

        let achievements = achievements::registry()
            .iter()
            .map(|def| {
                let unlocked_at = record.profile.achievements.get(def.id).copied();
                AchievementStatus {
                    id: def.id.to_string(),
                    name: def.name.to_string(),
                    description: def.description.to_string(),
                    icon: def.icon.to_string(),
                    rarity: def.rarity,
                    reward_coins: def.reward_coins,
                    unlocked: unlocked_at.is_some(),
                    unlocked_at,
                }
            })
            .collect();

        let perk_statuses = perks::catalog()
            .iter()
            .map(|def| PerkStatus {
                id: def.id.to_string(),
                name: def.name.to_string(),
                description: def.description.to_string(),
                icon: def.icon.to_string(),
                cost: def.cost,
                owned: record.profile.perks.contains_key(def.id),
                active: perks::is_active(&record.profile, def.id, now),
                can_afford: record.profile.coins >= def.cost,
            })
            .collect();

        let weak_topics = record
            .session
            .as_ref()
            .map(|s| quiz::weak_topics(&self.config, &record.attempts, &s.subject))
            .unwrap_or_default();

        // Display view only; the persisted counters roll inside transactions.
        let mut usage = record.usage;
        gate::roll_usage(&mut usage, today);

        Ok(Dashboard {
            profile: ProfileSnapshot::from_profile(&record.profile),
            achievements,
            perks: perk_statuses,
            leaderboard_position: economy::position_for(&all, LeaderMetric::Coins, student_id),
            weak_topics,
            usage,
            policy: record.policy.clone(),
            session: record.session.clone(),
        })
    }

    pub async fn leaderboard(
        &self,
        metric: LeaderMetric,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, EngineError> {
        let all = self.store.list().await?;
        Ok(economy::leaderboard(&all, metric, limit))
    }

    pub async fn update_policy(
        &self,
        student_id: &str,
        patch: PolicyPatch,
    ) -> Result<ParentalPolicy, EngineError> {
        self.store
            .transact(student_id, move |record| {
                if let Some(v) = patch.webcam_enabled {
                    record.policy.webcam_enabled = v;
                }
                if let Some(v) = patch.attention_monitoring {
                    record.policy.attention_monitoring = v;
                }
                if let Some(v) = patch.daily_study_minutes_limit {
                    record.policy.daily_study_minutes_limit = v;
                }
                if let Some(v) = patch.daily_quiz_limit {
                    record.policy.daily_quiz_limit = v;
                }
                if let Some(v) = patch.auto_adjust_difficulty {
                    record.policy.auto_adjust_difficulty = v;
                }
                Ok::<_, EngineError>(record.policy.clone())
            })
            .await
    }

    /// Explicit data reset; the only way a profile is destroyed.
    pub async fn reset_student(&self, student_id: &str) -> Result<bool, EngineError> {
        Ok(self.store.reset(student_id).await?)
    }

    async fn require_record(&self, student_id: &str) -> Result<StudentRecord, EngineError> {
        self.store
            .get(student_id)
            .await?
            .ok_or_else(|| EngineError::UnknownStudent(student_id.to_string()))
    }
}
