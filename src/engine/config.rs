use serde::{Deserialize, Serialize};

/// Policy tunables. Defaults mirror the behavior the policies were designed
/// around; individual values can be overridden from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Attempts considered when resolving "auto" difficulty.
    pub rolling_window: usize,
    /// Rolling accuracy at or above which difficulty steps up a tier.
    pub promote_accuracy: f64,
    /// Rolling accuracy at or below which difficulty steps down a tier.
    pub demote_accuracy: f64,
    /// Attempts per topic considered for weak-topic detection.
    pub weak_topic_window: usize,
    /// Accuracy below which a topic counts as weak.
    pub weak_topic_threshold: f64,
    /// Samples in the attention rolling average.
    pub attention_window: usize,
    /// Rolling average below which an alert fires.
    pub attention_threshold: f64,
    /// Minimum seconds between alerts for one student.
    pub alert_cooldown_secs: i64,
    /// Questions per quiz when the caller does not ask for a count.
    pub default_quiz_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rolling_window: 5,
            promote_accuracy: 0.8,
            demote_accuracy: 0.4,
            weak_topic_window: 10,
            weak_topic_threshold: 0.6,
            attention_window: 10,
            attention_threshold: 0.5,
            alert_cooldown_secs: 30,
            default_quiz_len: 10,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_usize("TUTOR_ROLLING_WINDOW") {
            config.rolling_window = v.max(1);
        }
        if let Some(v) = env_f64("TUTOR_PROMOTE_ACCURACY") {
            config.promote_accuracy = v.clamp(0.0, 1.0);
        }
        if let Some(v) = env_f64("TUTOR_DEMOTE_ACCURACY") {
            config.demote_accuracy = v.clamp(0.0, 1.0);
        }
        if let Some(v) = env_usize("TUTOR_WEAK_TOPIC_WINDOW") {
            config.weak_topic_window = v.max(1);
        }
        if let Some(v) = env_f64("TUTOR_WEAK_TOPIC_THRESHOLD") {
            config.weak_topic_threshold = v.clamp(0.0, 1.0);
        }
        if let Some(v) = env_usize("TUTOR_ATTENTION_WINDOW") {
            config.attention_window = v.max(1);
        }
        if let Some(v) = env_f64("TUTOR_ATTENTION_THRESHOLD") {
            config.attention_threshold = v.clamp(0.0, 1.0);
        }
        if let Some(v) = env_i64("TUTOR_ALERT_COOLDOWN_SECS") {
            config.alert_cooldown_secs = v.max(0);
        }
        if let Some(v) = env_usize("TUTOR_DEFAULT_QUIZ_LEN") {
            config.default_quiz_len = v.max(1);
        }

        config
    }
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_i64(key: &str) -> Option<i64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
