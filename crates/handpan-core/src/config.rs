use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing constants of the lookahead scheduler. Missing fields in a stored
/// config fall back to the defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Lead time between `start` and the first onset.
    pub start_offset_secs: f64,
    /// How far ahead of the next step the wake is aimed.
    pub safety_margin_secs: f64,
    pub min_wake_delay_ms: u64,
    pub tone_sustain_secs: f64,
    pub percussion_secs: f64,
    pub stop_fade_secs: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            start_offset_secs: 0.05,
            safety_margin_secs: 0.1,
            min_wake_delay_ms: 10,
            tone_sustain_secs: 3.0,
            percussion_secs: 0.06,
            stop_fade_secs: 0.1,
        }
    }
}

impl SchedulerConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Wake delay for a step boundary `secs_until_next` away on the audio clock.
    pub fn wake_delay(&self, secs_until_next: f64) -> Duration {
        let floor = Duration::from_millis(self.min_wake_delay_ms);
        let aimed = secs_until_next - self.safety_margin_secs;
        if aimed.is_finite() && aimed > floor.as_secs_f64() {
            Duration::from_secs_f64(aimed)
        } else {
            floor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SchedulerConfig::from_json(r#"{ "tone_sustain_secs": 2.4 }"#).unwrap();
        assert_eq!(config.tone_sustain_secs, 2.4);
        assert_eq!(config.min_wake_delay_ms, 10);
        assert_eq!(config.start_offset_secs, 0.05);
    }

    #[test]
    fn wake_delay_is_floored() {
        let config = SchedulerConfig::default();
        assert_eq!(config.wake_delay(0.05), Duration::from_millis(10));
        assert_eq!(config.wake_delay(f64::NAN), Duration::from_millis(10));
        assert_eq!(config.wake_delay(1.1), Duration::from_secs_f64(1.1 - 0.1));
    }
}
