//! Per-reading alarm decisions
//!
//! ## Two-Tier Decision
//!
//! ```text
//! Reading ──► hard limits breached? ──yes──► triggered, score 1.0, "hard-limit"
//!                    │
//!                    no
//!                    ▼
//!             normalize ──► classifier.score ──► triggered = score > threshold
//! ```
//!
//! Physical limits are checked first and never depend on the model: a reading
//! above `max_temp` or `max_pressure` alarms even when the classifier is
//! untrained or under-predicts. The learned tier only sees sub-limit readings,
//! where it catches combinations that are jointly risky although neither value
//! breaches its ceiling.
//!
//! Both comparisons are strict. A temperature equal to `max_temp` is not a
//! breach, and a score equal to the threshold does not trigger.

use crate::{
    config::AlarmConfig,
    errors::{AlarmError, AlarmResult},
    normalizer::FeatureNormalizer,
    reading::Reading,
    traits::BinaryClassifier,
    training::TrainingSet,
};

/// Score reported for hard-limit alarms
pub const HARD_LIMIT_SCORE: f64 = 1.0;

/// Which tier produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DecisionReason {
    /// A raw measurement exceeded its configured maximum
    HardLimit,
    /// The classifier scored a sub-limit reading
    Classifier,
}

impl DecisionReason {
    /// Stable name used in logs and payloads
    pub const fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::HardLimit => "hard-limit",
            DecisionReason::Classifier => "classifier",
        }
    }
}

impl core::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlarmDecision {
    /// Whether an alarm must be published
    pub triggered: bool,
    /// Hard-limit sentinel or classifier score
    pub score: f64,
    /// Tier that decided
    pub reason: DecisionReason,
}

impl AlarmDecision {
    /// Decision for a hard-limit breach
    pub const fn hard_limit() -> Self {
        Self {
            triggered: true,
            score: HARD_LIMIT_SCORE,
            reason: DecisionReason::HardLimit,
        }
    }

    /// Decision from a classifier score
    pub fn classifier(score: f64, threshold: f64) -> Self {
        Self {
            triggered: score > threshold,
            score,
            reason: DecisionReason::Classifier,
        }
    }
}

/// Hard limits plus a learned classifier
#[derive(Debug)]
pub struct AlarmEngine<C> {
    config: AlarmConfig,
    normalizer: FeatureNormalizer,
    classifier: C,
}

impl<C: BinaryClassifier> AlarmEngine<C> {
    /// Build an engine; rejects invalid configuration before any reading is seen
    pub fn new(config: AlarmConfig, classifier: C) -> AlarmResult<Self> {
        let normalizer = FeatureNormalizer::new(&config)?;
        Ok(Self {
            config,
            normalizer,
            classifier,
        })
    }

    /// Configuration in force
    pub fn config(&self) -> &AlarmConfig {
        &self.config
    }

    /// Normalizer derived from the configuration
    pub fn normalizer(&self) -> &FeatureNormalizer {
        &self.normalizer
    }

    /// Owned classifier
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Fit the classifier on `training`, normalized with the current limits
    pub fn train(&mut self, training: &TrainingSet) -> AlarmResult<()> {
        training.validate()?;
        let examples = training.normalized_examples(&self.normalizer);
        self.classifier.train(&examples)?;

        log_debug!(
            "{} trained on {} examples",
            self.classifier.name(),
            examples.len()
        );
        Ok(())
    }

    /// Whether the classifier is ready to score
    pub fn is_trained(&self) -> bool {
        self.classifier.is_trained()
    }

    /// Whether `reading` breaches a hard limit
    #[inline]
    pub fn exceeds_hard_limit(&self, reading: &Reading) -> bool {
        reading.temperature > self.config.max_temp || reading.pressure > self.config.max_pressure
    }

    /// Decide whether `reading` alarms.
    ///
    /// The hard limits are checked first, so a reading with one value over its
    /// maximum alarms even if the other value is not finite. NaN never compares
    /// greater, so only real breaches take this path. Anything else that is
    /// not finite fails with `AlarmError::InvalidReading`.
    pub fn decide(&self, reading: &Reading) -> AlarmResult<AlarmDecision> {
        if self.exceeds_hard_limit(reading) {
            return Ok(AlarmDecision::hard_limit());
        }

        if !reading.is_valid() {
            return Err(AlarmError::InvalidReading);
        }

        let point = self.normalizer.normalize_reading(reading);
        let score = self.classifier.score(point)?;
        Ok(AlarmDecision::classifier(score, self.config.alarm_threshold))
    }
}
