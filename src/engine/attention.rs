use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::config::EngineConfig;
use crate::store::profile::{AttentionState, ParentalPolicy};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionSample {
    pub timestamp: DateTime<Utc>,
    /// 0.0 = fully distracted, 1.0 = fully focused.
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertDecision {
    NoAlert,
    Alert,
}

/// Folds one sample into the rolling state and decides whether to intervene.
///
/// Fires only when the rolling average over the last `attention_window`
/// samples drops below the threshold and the cooldown since the previous
/// alert has elapsed. Without monitoring consent this never fires and the
/// state is left untouched. Samples that do not advance the clock are
/// dropped, matching the sensor contract of monotonically increasing
/// timestamps.
pub fn ingest(
    config: &EngineConfig,
    policy: &ParentalPolicy,
    state: &mut AttentionState,
    sample: AttentionSample,
) -> AlertDecision {
    if !policy.webcam_enabled || !policy.attention_monitoring {
        return AlertDecision::NoAlert;
    }

    if let Some(last) = state.last_sample_at {
        if sample.timestamp <= last {
            tracing::debug!(ts = %sample.timestamp, "dropping out-of-order attention sample");
            return AlertDecision::NoAlert;
        }
    }

    state.last_sample_at = Some(sample.timestamp);
    state.recent.push(sample.score.clamp(0.0, 1.0));
    let window = config.attention_window.max(1);
    if state.recent.len() > window {
        let excess = state.recent.len() - window;
        state.recent.drain(..excess);
    }

    let average = state.recent.iter().sum::<f64>() / state.recent.len() as f64;
    if average >= config.attention_threshold {
        return AlertDecision::NoAlert;
    }

    let cooldown = Duration::seconds(config.alert_cooldown_secs);
    let cooled_down = match state.last_alert_at {
        Some(last_alert) => sample.timestamp - last_alert >= cooldown,
        None => true,
    };
    if !cooled_down {
        return AlertDecision::NoAlert;
    }

    state.last_alert_at = Some(sample.timestamp);
    tracing::info!(average, "attention alert fired");
    AlertDecision::Alert
}

/// Rolling average over whatever samples are currently held.
pub fn rolling_average(state: &AttentionState) -> Option<f64> {
    if state.recent.is_empty() {
        None
    } else {
        Some(state.recent.iter().sum::<f64>() / state.recent.len() as f64)
    }
}
