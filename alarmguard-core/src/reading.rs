//! Sensor readings and the points derived from them
//!
//! A [`Reading`] is what a device reports in raw physical units. The classifier
//! never sees it directly; it sees a [`NormalizedPoint`] produced by the
//! [`FeatureNormalizer`](crate::FeatureNormalizer).

use alloc::string::String;

/// One device's raw measurements for a decision cycle
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Device the measurements came from
    pub device_id: String,
    /// Raw temperature
    pub temperature: f64,
    /// Raw pressure
    pub pressure: f64,
}

impl Reading {
    /// Create a reading
    pub fn new(device_id: impl Into<String>, temperature: f64, pressure: f64) -> Self {
        Self {
            device_id: device_id.into(),
            temperature,
            pressure,
        }
    }

    /// Both measurements are finite numbers
    pub fn is_valid(&self) -> bool {
        self.temperature.is_finite() && self.pressure.is_finite()
    }

    /// Raw values as published in alarm payloads
    pub fn values(&self) -> SensorValues {
        SensorValues {
            t: self.temperature,
            p: self.pressure,
        }
    }
}

/// Raw temperature/pressure pair as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorValues {
    /// Raw temperature
    pub t: f64,
    /// Raw pressure
    pub p: f64,
}

/// Classifier input space: raw values divided by their configured maxima.
///
/// Components are not clamped. A value above 1.0 means the raw measurement
/// exceeded its configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedPoint {
    /// Normalized temperature
    pub t: f64,
    /// Normalized pressure
    pub p: f64,
}

impl NormalizedPoint {
    /// Create a point
    pub const fn new(t: f64, p: f64) -> Self {
        Self { t, p }
    }

    /// Features in the order learners consume them
    pub const fn features(&self) -> [f64; 2] {
        [self.t, self.p]
    }
}

/// Ground-truth label of a training example
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlarmLabel {
    /// No alarm expected
    Normal = 0,
    /// Alarm expected
    Alarm = 1,
}

impl AlarmLabel {
    /// Label as a regression target
    pub const fn target(self) -> f64 {
        match self {
            AlarmLabel::Normal => 0.0,
            AlarmLabel::Alarm => 1.0,
        }
    }

    /// Parse the 0/1 encoding used by hand-labeled datasets
    pub const fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(AlarmLabel::Normal),
            1 => Some(AlarmLabel::Alarm),
            _ => None,
        }
    }
}

/// Hand-labeled raw example
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingExample {
    /// Raw temperature
    pub temperature: f64,
    /// Raw pressure
    pub pressure: f64,
    /// Expected outcome
    pub label: AlarmLabel,
}

impl TrainingExample {
    /// Create an example
    pub const fn new(temperature: f64, pressure: f64, label: AlarmLabel) -> Self {
        Self {
            temperature,
            pressure,
            label,
        }
    }
}

/// Normalized example handed to a classifier's `train`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledPoint {
    /// Normalized features
    pub point: NormalizedPoint,
    /// Expected outcome
    pub label: AlarmLabel,
}
