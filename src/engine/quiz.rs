use serde::{Deserialize, Serialize};

use crate::engine::config::EngineConfig;
use crate::store::profile::{AttemptQuestion, Difficulty, Question, QuizAttempt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyChoice {
    Auto,
    Easy,
    Medium,
    Hard,
}

impl Default for DifficultyChoice {
    fn default() -> Self {
        Self::Auto
    }
}

impl DifficultyChoice {
    pub fn fixed(self) -> Option<Difficulty> {
        match self {
            Self::Auto => None,
            Self::Easy => Some(Difficulty::Easy),
            Self::Medium => Some(Difficulty::Medium),
            Self::Hard => Some(Difficulty::Hard),
        }
    }
}

/// Tier of the most recent attempt in the subject, if any.
pub fn current_tier(attempts: &[QuizAttempt], subject: &str) -> Option<Difficulty> {
    attempts
        .iter()
        .rev()
        .find(|a| a.subject == subject)
        .map(|a| a.difficulty)
}

/// Mean score (as 0..1) over the last `rolling_window` attempts in the
/// subject. None without history.
pub fn rolling_accuracy(
    config: &EngineConfig,
    attempts: &[QuizAttempt],
    subject: &str,
) -> Option<f64> {
    let recent: Vec<f64> = attempts
        .iter()
        .rev()
        .filter(|a| a.subject == subject)
        .take(config.rolling_window)
        .map(|a| f64::from(a.score) / 100.0)
        .collect();

    if recent.is_empty() {
        None
    } else {
        Some(recent.iter().sum::<f64>() / recent.len() as f64)
    }
}

/// Resolves the tier for a new quiz. A fixed request wins outright. "Auto"
/// steps the current tier up or down from rolling accuracy; with adaptive
/// adjustment disabled it sticks to the current tier. No history means easy.
pub fn resolve_difficulty(
    config: &EngineConfig,
    attempts: &[QuizAttempt],
    subject: &str,
    requested: DifficultyChoice,
    auto_adjust: bool,
) -> Difficulty {
    if let Some(fixed) = requested.fixed() {
        return fixed;
    }

    let current = match current_tier(attempts, subject) {
        Some(tier) => tier,
        None => return Difficulty::Easy,
    };

    if !auto_adjust {
        return current;
    }

    match rolling_accuracy(config, attempts, subject) {
        Some(acc) if acc >= config.promote_accuracy => current.step_up(),
        Some(acc) if acc <= config.demote_accuracy => current.step_down(),
        _ => current,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakTopic {
    pub topic: String,
    pub accuracy: f64,
    pub questions_seen: u32,
}

/// Topics whose per-question accuracy over the last `weak_topic_window`
/// attempts touching them falls below the threshold. Weakest first.
pub fn weak_topics(
    config: &EngineConfig,
    attempts: &[QuizAttempt],
    subject: &str,
) -> Vec<WeakTopic> {
    let mut topics: Vec<&str> = Vec::new();
    for attempt in attempts.iter().filter(|a| a.subject == subject) {
        for topic in &attempt.topics {
            if !topics.contains(&topic.as_str()) {
                topics.push(topic.as_str());
            }
        }
    }

    let mut weak: Vec<WeakTopic> = topics
        .into_iter()
        .filter_map(|topic| {
            let mut correct = 0u32;
            let mut total = 0u32;
            for attempt in attempts
                .iter()
                .rev()
                .filter(|a| a.subject == subject && a.topics.iter().any(|t| t == topic))
                .take(config.weak_topic_window)
            {
                for q in attempt.questions.iter().filter(|q| q.topic == topic) {
                    total += 1;
                    if q.correct {
                        correct += 1;
                    }
                }
            }

            if total == 0 {
                return None;
            }
            let accuracy = f64::from(correct) / f64::from(total);
            if accuracy < config.weak_topic_threshold {
                Some(WeakTopic {
                    topic: topic.to_string(),
                    accuracy,
                    questions_seen: total,
                })
            } else {
                None
            }
        })
        .collect();

    weak.sort_by(|a, b| {
        a.accuracy
            .partial_cmp(&b.accuracy)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.topic.cmp(&b.topic))
    });
    weak
}

/// Topic preference order for a new quiz: weak topics first (weakest first),
/// then the remaining subject topics in bank order.
pub fn topic_preference(weak: &[WeakTopic], subject_topics: &[String]) -> Vec<String> {
    let mut order: Vec<String> = weak.iter().map(|w| w.topic.clone()).collect();
    for topic in subject_topics {
        if !order.contains(topic) {
            order.push(topic.clone());
        }
    }
    order
}

/// Marks each question against the chosen answer index. Missing or
/// out-of-range answers count as incorrect. Returns the percentage score and
/// the per-question attempt rows.
pub fn score_answers(
    questions: &[Question],
    answers: &[Option<usize>],
) -> (u8, Vec<AttemptQuestion>) {
    let mut rows = Vec::with_capacity(questions.len());
    let mut correct = 0usize;

    for (i, question) in questions.iter().enumerate() {
        let chosen = answers.get(i).copied().flatten();
        let is_correct = chosen == Some(question.correct_option);
        if is_correct {
            correct += 1;
        }
        rows.push(AttemptQuestion {
            question_id: question.id.clone(),
            topic: question.topic.clone(),
            chosen,
            correct: is_correct,
        });
    }

    let score = if questions.is_empty() {
        0
    } else {
        ((correct as f64 / questions.len() as f64) * 100.0).round() as u8
    };

    (score, rows)
}

/// Base coin reward for a scored quiz. Monotonic in both tier and score.
pub fn coin_reward(difficulty: Difficulty, score: u8) -> i64 {
    let base: i64 = match difficulty {
        Difficulty::Easy => 10,
        Difficulty::Medium => 20,
        Difficulty::Hard => 30,
    };

    match score {
        90..=100 => base * 3,
        80..=89 => base * 2,
        60..=79 => base * 3 / 2,
        40..=59 => base,
        _ => (base / 2).max(5),
    }
}

/// XP tracks the percentage score directly.
pub fn xp_reward(score: u8) -> i64 {
    i64::from(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn attempt(subject: &str, score: u8, difficulty: Difficulty) -> QuizAttempt {
        QuizAttempt {
            quiz_id: uuid::Uuid::new_v4().to_string(),
            subject: subject.to_string(),
            topics: vec!["Fractions".to_string()],
            questions: vec![
                AttemptQuestion {
                    question_id: "q1".to_string(),
                    topic: "Fractions".to_string(),
                    chosen: Some(0),
                    correct: score >= 50,
                },
                AttemptQuestion {
                    question_id: "q2".to_string(),
                    topic: "Fractions".to_string(),
                    chosen: Some(1),
                    correct: score >= 90,
                },
            ],
            score,
            difficulty,
            time_taken_secs: 90.0,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_auto_difficulty_defaults_to_easy_without_history() {
        let config = EngineConfig::default();
        let resolved = resolve_difficulty(&config, &[], "Math", DifficultyChoice::Auto, true);
        assert_eq!(resolved, Difficulty::Easy);
    }

    #[test]
    fn test_auto_difficulty_steps_up_on_high_accuracy() {
        let config = EngineConfig::default();
        let attempts: Vec<_> = (0..5).map(|_| attempt("Math", 90, Difficulty::Medium)).collect();
        let resolved =
            resolve_difficulty(&config, &attempts, "Math", DifficultyChoice::Auto, true);
        assert_eq!(resolved, Difficulty::Hard);
    }

    #[test]
    fn test_auto_difficulty_steps_down_on_low_accuracy() {
        let config = EngineConfig::default();
        let attempts: Vec<_> = (0..5).map(|_| attempt("Math", 30, Difficulty::Medium)).collect();
        let resolved =
            resolve_difficulty(&config, &attempts, "Math", DifficultyChoice::Auto, true);
        assert_eq!(resolved, Difficulty::Easy);
    }

    #[test]
    fn test_auto_difficulty_holds_between_thresholds() {
        let config = EngineConfig::default();
        let attempts: Vec<_> = (0..5).map(|_| attempt("Math", 60, Difficulty::Medium)).collect();
        let resolved =
            resolve_difficulty(&config, &attempts, "Math", DifficultyChoice::Auto, true);
        assert_eq!(resolved, Difficulty::Medium);
    }

    #[test]
    fn test_auto_adjust_disabled_keeps_current_tier() {
        let config = EngineConfig::default();
        let attempts: Vec<_> = (0..5).map(|_| attempt("Math", 95, Difficulty::Medium)).collect();
        let resolved =
            resolve_difficulty(&config, &attempts, "Math", DifficultyChoice::Auto, false);
        assert_eq!(resolved, Difficulty::Medium);
    }

    #[test]
    fn test_step_caps_at_edges() {
        assert_eq!(Difficulty::Hard.step_up(), Difficulty::Hard);
        assert_eq!(Difficulty::Easy.step_down(), Difficulty::Easy);
    }

    #[test]
    fn test_coin_reward_monotonic_in_score_and_tier() {
        let tiers = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
        for tier in tiers {
            let mut last = 0;
            for score in 0..=100u8 {
                let reward = coin_reward(tier, score);
                assert!(reward >= last, "{tier} reward dipped at score {score}");
                last = reward;
            }
        }
        for score in 0..=100u8 {
            assert!(coin_reward(Difficulty::Medium, score) >= coin_reward(Difficulty::Easy, score));
            assert!(coin_reward(Difficulty::Hard, score) >= coin_reward(Difficulty::Medium, score));
        }
    }

    #[test]
    fn test_weak_topics_orders_weakest_first() {
        let config = EngineConfig::default();
        let mut low = attempt("Math", 30, Difficulty::Easy);
        low.topics = vec!["Algebra".to_string()];
        for q in &mut low.questions {
            q.topic = "Algebra".to_string();
            q.correct = false;
        }
        let mid = attempt("Math", 50, Difficulty::Easy);

        let weak = weak_topics(&config, &[low, mid], "Math");
        assert_eq!(weak.len(), 2);
        assert_eq!(weak[0].topic, "Algebra");
        assert!(weak[0].accuracy <= weak[1].accuracy);
    }

    #[test]
    fn test_score_answers_counts_missing_as_incorrect() {
        let questions = vec![
            Question {
                id: "q1".to_string(),
                subject: "Math".to_string(),
                topic: "Addition".to_string(),
                difficulty: Difficulty::Easy,
                prompt: "1+1?".to_string(),
                options: vec!["2".to_string(), "3".to_string()],
                correct_option: 0,
                explanation: String::new(),
            },
            Question {
                id: "q2".to_string(),
                subject: "Math".to_string(),
                topic: "Addition".to_string(),
                difficulty: Difficulty::Easy,
                prompt: "2+2?".to_string(),
                options: vec!["3".to_string(), "4".to_string()],
                correct_option: 1,
                explanation: String::new(),
            },
        ];

        let (score, rows) = score_answers(&questions, &[Some(0)]);
        assert_eq!(score, 50);
        assert!(rows[0].correct);
        assert!(!rows[1].correct);
        assert_eq!(rows[1].chosen, None);
    }
}
