//! Fixed training data for the alarm classifier
//!
//! The labeled set spans cold/hot and low/high pressure combinations, including
//! sub-limit points that are jointly risky (e.g. 89/301) next to similar points
//! that are not (e.g. 99/275). Examples are stored in raw units and normalized
//! with the configuration in force when a batch starts.

use alloc::vec::Vec;

use crate::{
    errors::{AlarmError, AlarmResult},
    normalizer::FeatureNormalizer,
    reading::{LabeledPoint, TrainingExample},
};

use crate::reading::AlarmLabel::{Alarm, Normal};

/// Hand-labeled examples shipped with every deployment
pub const FIXED_EXAMPLES: [TrainingExample; 19] = [
    TrainingExample::new(10.0, 275.0, Normal),
    TrainingExample::new(14.0, 230.0, Normal),
    TrainingExample::new(65.0, 240.0, Normal),
    TrainingExample::new(89.0, 301.0, Alarm),
    TrainingExample::new(93.0, 290.0, Alarm),
    TrainingExample::new(20.0, 400.0, Normal),
    TrainingExample::new(32.0, 503.0, Alarm),
    TrainingExample::new(55.0, 600.0, Alarm),
    TrainingExample::new(120.0, 250.0, Alarm),
    TrainingExample::new(99.0, 275.0, Normal),
    TrainingExample::new(15.0, 104.0, Normal),
    TrainingExample::new(42.0, 400.0, Normal),
    TrainingExample::new(102.0, 275.0, Normal),
    TrainingExample::new(82.0, 302.0, Alarm),
    TrainingExample::new(51.0, 101.0, Normal),
    TrainingExample::new(10.0, 590.0, Normal),
    TrainingExample::new(51.0, 321.0, Alarm),
    TrainingExample::new(22.0, 275.0, Normal),
    TrainingExample::new(32.0, 275.0, Normal),
];

/// Ordered collection of labeled examples
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    examples: Vec<TrainingExample>,
}

impl Default for TrainingSet {
    fn default() -> Self {
        Self::fixed()
    }
}

impl TrainingSet {
    /// The built-in hand-labeled set
    pub fn fixed() -> Self {
        Self {
            examples: FIXED_EXAMPLES.to_vec(),
        }
    }

    /// Custom training data (validated when a batch trains on it)
    pub fn new(examples: Vec<TrainingExample>) -> Self {
        Self { examples }
    }

    /// Raw examples in order
    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the set has no examples
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Reject data no classifier can be fitted on
    pub fn validate(&self) -> AlarmResult<()> {
        if self.examples.is_empty() {
            return Err(AlarmError::training("training set is empty"));
        }

        if self
            .examples
            .iter()
            .any(|ex| !ex.temperature.is_finite() || !ex.pressure.is_finite())
        {
            return Err(AlarmError::training("training set contains non-finite values"));
        }

        let alarms = self.examples.iter().filter(|ex| ex.label == Alarm).count();
        if alarms == 0 || alarms == self.examples.len() {
            return Err(AlarmError::training("training set needs both labels"));
        }

        Ok(())
    }

    /// Normalize every example with the current configuration
    pub fn normalized_examples(&self, normalizer: &FeatureNormalizer) -> Vec<LabeledPoint> {
        self.examples
            .iter()
            .map(|ex| LabeledPoint {
                point: normalizer.normalize(ex.temperature, ex.pressure),
                label: ex.label,
            })
            .collect()
    }
}
