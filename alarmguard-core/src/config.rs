//! Alarm configuration
//!
//! One `AlarmConfig` is loaded at startup and handed to every component
//! constructor. Nothing in the core mutates it afterwards, so a running batch
//! always sees a consistent set of limits.
//!
//! ```rust
//! use alarmguard_core::AlarmConfig;
//!
//! let config = AlarmConfig::new(200.0, 800.0)
//!     .with_threshold(0.7)
//!     .with_topic_prefix("plant-3/alarms");
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.topic_for("boiler-1"), "plant-3/alarms/boiler-1");
//! ```

use alloc::format;
use alloc::string::String;

use crate::errors::{AlarmError, AlarmResult};

/// Default temperature hard limit (raw sensor units)
pub const DEFAULT_MAX_TEMP: f64 = 200.0;

/// Default pressure hard limit (raw sensor units)
pub const DEFAULT_MAX_PRESSURE: f64 = 800.0;

/// Default classifier score above which a sub-limit reading alarms
pub const DEFAULT_ALARM_THRESHOLD: f64 = 0.6;

/// Default prefix for outbound alarm topics
pub const DEFAULT_TOPIC_PREFIX: &str = "alarms";

/// Process-wide alarm configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlarmConfig {
    /// Temperature hard limit, also the temperature normalization scale
    pub max_temp: f64,

    /// Pressure hard limit, also the pressure normalization scale
    pub max_pressure: f64,

    /// Classifier cutoff in `[0, 1]`; a score must be strictly greater to trigger
    pub alarm_threshold: f64,

    /// Topic prefix; alarms go to `<prefix>/<device_id>`
    pub output_topic_prefix: String,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            max_temp: DEFAULT_MAX_TEMP,
            max_pressure: DEFAULT_MAX_PRESSURE,
            alarm_threshold: DEFAULT_ALARM_THRESHOLD,
            output_topic_prefix: String::from(DEFAULT_TOPIC_PREFIX),
        }
    }
}

impl AlarmConfig {
    /// Create a configuration with custom hard limits and default threshold/prefix
    pub fn new(max_temp: f64, max_pressure: f64) -> Self {
        Self {
            max_temp,
            max_pressure,
            ..Self::default()
        }
    }

    /// Set the classifier alarm threshold
    pub fn with_threshold(mut self, alarm_threshold: f64) -> Self {
        self.alarm_threshold = alarm_threshold;
        self
    }

    /// Set the outbound topic prefix
    pub fn with_topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_topic_prefix = prefix.into();
        self
    }

    /// Check every field; called by every constructor that takes a config
    pub fn validate(&self) -> AlarmResult<()> {
        check_maximum("max_temp", self.max_temp)?;
        check_maximum("max_pressure", self.max_pressure)?;

        if !self.alarm_threshold.is_finite() {
            return Err(AlarmError::config("alarm_threshold", "not a valid number"));
        }
        if !(0.0..=1.0).contains(&self.alarm_threshold) {
            return Err(AlarmError::config("alarm_threshold", "must be within [0, 1]"));
        }

        Ok(())
    }

    /// Topic an alarm for `device_id` is published under
    pub fn topic_for(&self, device_id: &str) -> String {
        format!("{}/{}", self.output_topic_prefix, device_id)
    }
}

fn check_maximum(field: &'static str, value: f64) -> AlarmResult<()> {
    if !value.is_finite() {
        return Err(AlarmError::config(field, "not a valid number"));
    }
    // Zero would divide by zero during normalization; negative limits trip on every reading
    if value <= 0.0 {
        return Err(AlarmError::config(field, "must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let config = AlarmConfig::default();
        assert_eq!(config.max_temp, 200.0);
        assert_eq!(config.max_pressure, 800.0);
        assert_eq!(config.alarm_threshold, 0.6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_maxima_rejected() {
        let err = AlarmConfig::new(0.0, 800.0).validate().unwrap_err();
        assert_eq!(err, AlarmError::config("max_temp", "must be greater than zero"));

        let err = AlarmConfig::new(200.0, 0.0).validate().unwrap_err();
        assert!(matches!(err, AlarmError::Config { field: "max_pressure", .. }));
    }

    #[test]
    fn non_finite_and_negative_maxima_rejected() {
        assert!(AlarmConfig::new(f64::NAN, 800.0).validate().is_err());
        assert!(AlarmConfig::new(200.0, f64::INFINITY).validate().is_err());
        assert!(AlarmConfig::new(-5.0, 800.0).validate().is_err());
    }

    #[test]
    fn threshold_bounds() {
        assert!(AlarmConfig::default().with_threshold(0.0).validate().is_ok());
        assert!(AlarmConfig::default().with_threshold(1.0).validate().is_ok());
        assert!(AlarmConfig::default().with_threshold(1.01).validate().is_err());
        assert!(AlarmConfig::default().with_threshold(-0.1).validate().is_err());
        assert!(AlarmConfig::default().with_threshold(f64::NAN).validate().is_err());
    }

    #[test]
    fn topic_joins_prefix_and_device() {
        let config = AlarmConfig::default().with_topic_prefix("site/a");
        assert_eq!(config.topic_for("foo"), "site/a/foo");
    }
}
