use serde::Serialize;
use thiserror::Error;

use crate::store::profile::Difficulty;
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitKind {
    StudyTime,
    QuizCount,
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StudyTime => f.write_str("study-time"),
            Self::QuizCount => f.write_str("quiz-count"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("coin amount must be non-negative, got {0}")]
    InvalidAmount(i64),

    #[error("insufficient coins: need {needed}, have {available}")]
    InsufficientFunds { needed: i64, available: i64 },

    #[error("unknown perk: {0}")]
    UnknownPerk(String),

    #[error("quiz {0} has already been submitted")]
    AlreadySubmitted(String),

    #[error("unknown quiz: {0}")]
    UnknownQuiz(String),

    #[error("question bank supplied {available} of {requested} questions for {subject} ({difficulty})")]
    InsufficientQuestions {
        subject: String,
        difficulty: Difficulty,
        requested: usize,
        available: usize,
    },

    #[error("daily {kind} limit reached ({used}/{cap})")]
    DailyLimitExceeded {
        kind: LimitKind,
        used: u32,
        cap: u32,
    },

    #[error("unknown student: {0}")]
    UnknownStudent(String),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}
