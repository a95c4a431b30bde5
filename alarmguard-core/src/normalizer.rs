//! Feature normalization
//!
//! Maps raw measurements into the classifier's input space by dividing each one
//! by its configured maximum:
//!
//! ```text
//! t = raw_temperature / max_temp
//! p = raw_pressure    / max_pressure
//! ```
//!
//! The mapping is linear and deliberately unclamped. A reading above its
//! maximum normalizes to more than 1.0, which is a stronger signal, not an
//! error. Because the scale comes from configuration, a change of maxima
//! changes every normalized training example, so classifiers are retrained per
//! batch rather than cached.

use crate::{
    config::AlarmConfig,
    errors::AlarmResult,
    reading::{NormalizedPoint, Reading},
};

/// Validated normalizer for one configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureNormalizer {
    max_temp: f64,
    max_pressure: f64,
}

impl FeatureNormalizer {
    /// Build a normalizer; fails with `AlarmError::Config` on unusable maxima
    pub fn new(config: &AlarmConfig) -> AlarmResult<Self> {
        config.validate()?;
        Ok(Self {
            max_temp: config.max_temp,
            max_pressure: config.max_pressure,
        })
    }

    /// Normalize a raw temperature/pressure pair
    #[inline]
    pub fn normalize(&self, raw_temp: f64, raw_pressure: f64) -> NormalizedPoint {
        NormalizedPoint {
            t: raw_temp / self.max_temp,
            p: raw_pressure / self.max_pressure,
        }
    }

    /// Normalize a reading
    #[inline]
    pub fn normalize_reading(&self, reading: &Reading) -> NormalizedPoint {
        self.normalize(reading.temperature, reading.pressure)
    }
}

/// One-shot normalization that validates `config` first
pub fn normalize(raw_temp: f64, raw_pressure: f64, config: &AlarmConfig) -> AlarmResult<NormalizedPoint> {
    Ok(FeatureNormalizer::new(config)?.normalize(raw_temp, raw_pressure))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AlarmError;
    use proptest::prelude::*;

    #[test]
    fn divides_by_maxima() {
        let normalizer = FeatureNormalizer::new(&AlarmConfig::new(200.0, 800.0)).unwrap();
        let point = normalizer.normalize(100.0, 200.0);
        assert_eq!(point, NormalizedPoint::new(0.5, 0.25));
    }

    #[test]
    fn values_above_max_are_not_clamped() {
        let point = normalize(300.0, 1600.0, &AlarmConfig::new(200.0, 800.0)).unwrap();
        assert_eq!(point, NormalizedPoint::new(1.5, 2.0));
    }

    #[test]
    fn zero_maximum_is_a_config_error() {
        let err = normalize(10.0, 10.0, &AlarmConfig::new(200.0, 0.0)).unwrap_err();
        assert!(matches!(err, AlarmError::Config { field: "max_pressure", .. }));
        assert!(FeatureNormalizer::new(&AlarmConfig::new(0.0, 800.0)).is_err());
    }

    proptest! {
        #[test]
        fn doubling_raw_doubles_normalized(
            raw_t in 0.0f64..10_000.0,
            raw_p in 0.0f64..10_000.0,
            max_t in 1.0f64..1_000.0,
            max_p in 1.0f64..1_000.0,
        ) {
            let normalizer = FeatureNormalizer::new(&AlarmConfig::new(max_t, max_p)).unwrap();
            let single = normalizer.normalize(raw_t, raw_p);
            let double = normalizer.normalize(2.0 * raw_t, 2.0 * raw_p);
            // Doubling is exact in binary floating point
            prop_assert_eq!(double.t, 2.0 * single.t);
            prop_assert_eq!(double.p, 2.0 * single.p);
        }
    }
}
