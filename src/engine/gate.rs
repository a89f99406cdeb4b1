use chrono::NaiveDate;

use crate::engine::error::{EngineError, LimitKind};
use crate::store::profile::{DailyUsage, ParentalPolicy};

/// Resets the usage counters when the calendar day has rolled over. The same
/// day boundary drives streak accounting.
pub fn roll_usage(usage: &mut DailyUsage, today: NaiveDate) {
    if usage.date != today {
        *usage = DailyUsage::fresh(today);
    }
}

/// Checks the daily quiz-count cap before a quiz is created. A cap of zero
/// means unlimited. Fails without touching any counter.
pub fn authorize_quiz(policy: &ParentalPolicy, usage: &DailyUsage) -> Result<(), EngineError> {
    if policy.daily_quiz_limit > 0 && usage.quizzes_submitted >= policy.daily_quiz_limit {
        return Err(EngineError::DailyLimitExceeded {
            kind: LimitKind::QuizCount,
            used: usage.quizzes_submitted,
            cap: policy.daily_quiz_limit,
        });
    }
    Ok(())
}

/// Checks the daily study-minutes cap before a study/focus session starts.
pub fn authorize_study(policy: &ParentalPolicy, usage: &DailyUsage) -> Result<(), EngineError> {
    if policy.daily_study_minutes_limit > 0
        && usage.study_minutes >= policy.daily_study_minutes_limit
    {
        return Err(EngineError::DailyLimitExceeded {
            kind: LimitKind::StudyTime,
            used: usage.study_minutes,
            cap: policy.daily_study_minutes_limit,
        });
    }
    Ok(())
}

/// Combined gate run before a quiz or a video/attention session starts:
/// either cap being reached blocks the action. The underlying operation must
/// not be attempted on failure.
pub fn authorize_session(policy: &ParentalPolicy, usage: &DailyUsage) -> Result<(), EngineError> {
    authorize_study(policy, usage)?;
    authorize_quiz(policy, usage)
}

pub fn register_quiz(usage: &mut DailyUsage) {
    usage.quizzes_submitted += 1;
}

pub fn register_minutes(usage: &mut DailyUsage, minutes: u32) {
    usage.study_minutes += minutes;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_quiz_cap_blocks_at_limit() {
        let mut policy = ParentalPolicy::default();
        policy.daily_quiz_limit = 1;
        let mut usage = DailyUsage::fresh(day("2026-03-01"));

        assert!(authorize_quiz(&policy, &usage).is_ok());
        register_quiz(&mut usage);
        let err = authorize_quiz(&policy, &usage).unwrap_err();
        assert!(matches!(
            err,
            EngineError::DailyLimitExceeded {
                kind: LimitKind::QuizCount,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_cap_means_unlimited() {
        let mut policy = ParentalPolicy::default();
        policy.daily_quiz_limit = 0;
        policy.daily_study_minutes_limit = 0;
        let mut usage = DailyUsage::fresh(day("2026-03-01"));
        usage.quizzes_submitted = 1000;
        usage.study_minutes = 100_000;

        assert!(authorize_quiz(&policy, &usage).is_ok());
        assert!(authorize_study(&policy, &usage).is_ok());
    }

    #[test]
    fn test_counters_reset_on_day_roll() {
        let mut usage = DailyUsage::fresh(day("2026-03-01"));
        usage.quizzes_submitted = 5;
        usage.study_minutes = 90;

        roll_usage(&mut usage, day("2026-03-01"));
        assert_eq!(usage.quizzes_submitted, 5);

        roll_usage(&mut usage, day("2026-03-02"));
        assert_eq!(usage.quizzes_submitted, 0);
        assert_eq!(usage.study_minutes, 0);
        assert_eq!(usage.date, day("2026-03-02"));
    }

    #[test]
    fn test_session_gate_blocks_on_either_cap() {
        let mut policy = ParentalPolicy::default();
        policy.daily_quiz_limit = 2;
        policy.daily_study_minutes_limit = 60;

        let mut usage = DailyUsage::fresh(day("2026-03-01"));
        assert!(authorize_session(&policy, &usage).is_ok());

        usage.quizzes_submitted = 2;
        assert!(matches!(
            authorize_session(&policy, &usage).unwrap_err(),
            EngineError::DailyLimitExceeded {
                kind: LimitKind::QuizCount,
                ..
            }
        ));

        usage.quizzes_submitted = 0;
        usage.study_minutes = 60;
        assert!(matches!(
            authorize_session(&policy, &usage).unwrap_err(),
            EngineError::DailyLimitExceeded {
                kind: LimitKind::StudyTime,
                ..
            }
        ));
    }

    #[test]
    fn test_study_cap_blocks_at_limit() {
        let mut policy = ParentalPolicy::default();
        policy.daily_study_minutes_limit = 60;
        let mut usage = DailyUsage::fresh(day("2026-03-01"));
        register_minutes(&mut usage, 60);

        let err = authorize_study(&policy, &usage).unwrap_err();
        assert!(matches!(
            err,
            EngineError::DailyLimitExceeded {
                kind: LimitKind::StudyTime,
                ..
            }
        ));
    }
}
